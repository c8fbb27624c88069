//! E-mail notifications
//!
//! Thin boundary over a transactional mail HTTP API. Delivery mechanics are
//! the mail provider's problem; this service formats the three messages the
//! order flow sends and reports whether anything was actually dispatched.
//! With `MAIL_API_URL` unset every send is a logged no-op, which keeps
//! development and CI environments quiet.

use std::time::Duration;

use serde_json::json;

use crate::core::Config;
use crate::pricing::money::format_brl;
use crate::utils::{AppError, AppResult};

const MAIL_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct EmailService {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
    admin_email: Option<String>,
}

impl EmailService {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(MAIL_TIMEOUT_MS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build mail client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
            admin_email: config.admin_email.clone(),
        })
    }

    /// Send one message. Returns `Ok(false)` when mail is not configured.
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<bool> {
        let Some(url) = &self.api_url else {
            tracing::debug!(to, subject, "mail API not configured, skipping send");
            return Ok(false);
        };

        let mut request = self.client.post(url).json(&json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Mail API request failed: {e}")))?;
        response
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Mail API rejected message: {e}")))?;

        tracing::info!(to, subject, "e-mail dispatched");
        Ok(true)
    }

    /// Order confirmation to the customer after payment approval
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order_number: &str,
        total_cents: i64,
    ) -> AppResult<bool> {
        let subject = format!("Pedido {order_number} confirmado - Pizzaria Massa Nostra");
        let html = format!(
            "<h2>Pagamento aprovado!</h2>\
             <p>Seu pedido <strong>{order_number}</strong> foi confirmado e já vai para o forno.</p>\
             <p>Total: <strong>{}</strong></p>",
            format_brl(total_cents),
        );
        self.send(to, &subject, &html).await
    }

    /// Receipt delivery to the customer
    pub async fn send_receipt(
        &self,
        to: &str,
        receipt_number: &str,
        order_number: &str,
        total_cents: i64,
    ) -> AppResult<bool> {
        let subject = format!("Comprovante {receipt_number} - Pizzaria Massa Nostra");
        let html = format!(
            "<h2>Comprovante de pagamento</h2>\
             <p>Pedido: <strong>{order_number}</strong></p>\
             <p>Comprovante: <strong>{receipt_number}</strong></p>\
             <p>Valor: <strong>{}</strong></p>",
            format_brl(total_cents),
        );
        self.send(to, &subject, &html).await
    }

    /// New-order alert to the back-office inbox
    pub async fn notify_new_order(
        &self,
        order_number: &str,
        customer_name: &str,
        total_cents: i64,
    ) -> AppResult<bool> {
        let Some(admin) = &self.admin_email else {
            tracing::debug!("admin e-mail not configured, skipping new-order alert");
            return Ok(false);
        };
        let subject = format!("Novo pedido {order_number}");
        let html = format!(
            "<h2>Novo pedido recebido!</h2>\
             <p>Pedido: <strong>{order_number}</strong></p>\
             <p>Cliente: <strong>{customer_name}</strong></p>\
             <p>Total: <strong>{}</strong></p>",
            format_brl(total_cents),
        );
        self.send(admin, &subject, &html).await
    }
}
