//! Server state
//!
//! `ServerState` holds shared handles to every service. All fields are
//! cheap `Arc`-backed clones, so axum can clone the state per request.

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{CatalogRepository, PaymentRepository};
use crate::notify::{EmailService, NotificationGateway};
use crate::orders::OrderStore;
use crate::payment::{PixService, WebhookReconciler};
use crate::pricing::PricingResolver;
use crate::receipt::ReceiptService;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite pool
    pub pool: SqlitePool,
    /// Order lifecycle service
    pub orders: OrderStore,
    /// PIX gateway adapter
    pub payments: PixService,
    /// Payment webhook pipeline
    pub reconciler: WebhookReconciler,
    /// Realtime event hub
    pub notifier: NotificationGateway,
    /// Receipt generation
    pub receipts: ReceiptService,
}

impl ServerState {
    /// Initialize everything in dependency order:
    ///
    /// 1. Work directory structure
    /// 2. Database (work_dir/database/nostra.db) + migrations
    /// 3. Services (notifier, mail, receipts, orders, gateway, reconciler)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| crate::utils::AppError::internal(format!("work dir setup failed: {e}")))?;

        let db = DbService::new(&config.database_path().to_string_lossy()).await?;
        Self::with_pool(config, db.pool)
    }

    /// Wire the services onto an existing pool. Tests use this directly
    /// with a scratch database.
    pub fn with_pool(config: &Config, pool: SqlitePool) -> AppResult<Self> {
        let notifier = NotificationGateway::new();
        let email = EmailService::from_config(config)?;
        let receipts = ReceiptService::new(pool.clone(), email.clone());
        let pricing = PricingResolver::new(CatalogRepository::new(pool.clone()));
        let orders = OrderStore::new(
            pool.clone(),
            pricing,
            receipts.clone(),
            notifier.clone(),
            config.delivery_fee_cents,
            config.estimated_time_min,
        );
        let payments = PixService::from_config(pool.clone(), config)?;
        let reconciler = WebhookReconciler::new(
            PaymentRepository::new(pool.clone()),
            orders.clone(),
            receipts.clone(),
            email,
            notifier.clone(),
            config.webhook_secret.clone(),
        );

        Ok(Self {
            config: config.clone(),
            pool,
            orders,
            payments,
            reconciler,
            notifier,
            receipts,
        })
    }
}
