//! Webhook signature validation
//!
//! Mercado Pago signs webhooks with `x-signature: ts=<unix>,v1=<hmac>` where
//! the HMAC-SHA256 manifest is `id:{data_id};request-id:{request_id};ts:{ts};`.
//! Validation here is advisory: the reconciler logs a failure and continues,
//! because the payment-row lookup is the real authority check.

use ring::hmac;

use crate::utils::{AppError, AppResult};

/// Verify an `x-signature` header against the shared secret.
pub fn verify(
    secret: &str,
    signature_header: &str,
    data_id: &str,
    request_id: &str,
) -> AppResult<()> {
    let (ts, v1) = parse_header(signature_header)
        .ok_or_else(|| AppError::validation("Malformed x-signature header"))?;

    let expected = sign_manifest(secret, data_id, request_id, &ts);
    if expected == v1 {
        Ok(())
    } else {
        Err(AppError::validation("Webhook signature mismatch"))
    }
}

/// HMAC-SHA256 of the provider's manifest string, hex-encoded.
///
/// The manifest id is lowercased per the provider's signing rules.
pub fn sign_manifest(secret: &str, data_id: &str, request_id: &str, ts: &str) -> String {
    let manifest = format!(
        "id:{};request-id:{};ts:{};",
        data_id.to_lowercase(),
        request_id,
        ts
    );
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, manifest.as_bytes());
    hex::encode(tag.as_ref())
}

/// Parse `ts=...,v1=...` (order-insensitive, unknown keys ignored)
fn parse_header(header: &str) -> Option<(String, String)> {
    let mut ts = None;
    let mut v1 = None;
    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key.trim() {
            "ts" => ts = Some(value.trim().to_string()),
            "v1" => v1 = Some(value.trim().to_string()),
            _ => {}
        }
    }
    Some((ts?, v1?))
}
