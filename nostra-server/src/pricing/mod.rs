//! Pricing Resolver
//!
//! Prices a cart against the current catalog. Pure read: prices are captured
//! onto the order items at creation time and never recomputed afterwards.

pub mod money;

use crate::db::models::{NewOrderItem, OrderItemRequest};
use crate::db::repository::CatalogRepository;
use crate::utils::{AppError, AppResult};

/// Priced cart: lines ready for insertion plus their sum
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub lines: Vec<NewOrderItem>,
    pub subtotal: i64,
}

#[derive(Clone)]
pub struct PricingResolver {
    catalog: CatalogRepository,
}

impl PricingResolver {
    pub fn new(catalog: CatalogRepository) -> Self {
        Self { catalog }
    }

    /// Price every line: `quantity * (variant + crust + filling)`.
    ///
    /// An unknown variant fails the whole cart: a partially priced order
    /// must never be created. A missing crust or filling reference prices
    /// as a zero-cost modifier instead of failing; the storefront sends
    /// none for non-pizza items.
    pub async fn resolve(&self, items: &[OrderItemRequest]) -> AppResult<PricedCart> {
        let mut lines = Vec::with_capacity(items.len());
        let mut subtotal: i64 = 0;

        for item in items {
            let variant = self
                .catalog
                .find_variant(item.variant_id)
                .await?
                .ok_or_else(|| {
                    AppError::validation(format!("Variant #{} not found", item.variant_id))
                })?;

            let crust_price = match item.crust_id {
                Some(id) => self
                    .catalog
                    .find_crust(id)
                    .await?
                    .map(|c| c.price_modifier)
                    .unwrap_or(0),
                None => 0,
            };

            let filling_price = match item.filling_id {
                Some(id) => self
                    .catalog
                    .find_filling(id)
                    .await?
                    .map(|f| f.price)
                    .unwrap_or(0),
                None => 0,
            };

            let line_total = item.quantity * (variant.price + crust_price + filling_price);
            subtotal += line_total;

            lines.push(NewOrderItem {
                product_id: item.product_id,
                variant_id: item.variant_id,
                crust_id: item.crust_id,
                filling_id: item.filling_id,
                quantity: item.quantity,
                unit_price: variant.price,
                crust_price,
                filling_price,
                line_total,
                notes: item.notes.clone(),
            });
        }

        Ok(PricedCart { lines, subtotal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn setup() -> (tempfile::TempDir, PricingResolver) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pricing.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();
        let pool = db.pool;

        sqlx::query(
            "INSERT INTO products (id, name, category, created_at) VALUES \
             (1, 'Pizza Margherita', 'pizza', 0), (2, 'Guaraná Antarctica', 'drink', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO product_variants (id, product_id, name, price, created_at) VALUES \
             (1, 1, 'Grande', 2500, 0), (2, 2, 'Lata 350ml', 800, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO pizza_crusts (id, name, price_modifier, created_at) VALUES \
             (1, 'Borda Catupiry', 300, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO crust_fillings (id, name, price, created_at) VALUES (1, 'Cheddar', 200, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        (tmp, PricingResolver::new(CatalogRepository::new(pool)))
    }

    fn line(
        variant_id: i64,
        crust_id: Option<i64>,
        filling_id: Option<i64>,
        quantity: i64,
    ) -> OrderItemRequest {
        OrderItemRequest {
            product_id: 1,
            variant_id,
            crust_id,
            filling_id,
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn sums_line_totals_into_the_subtotal() {
        let (_tmp, pricing) = setup().await;

        let cart = pricing
            .resolve(&[line(1, None, None, 2), line(2, None, None, 3)])
            .await
            .unwrap();

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].line_total, 5000);
        assert_eq!(cart.lines[1].line_total, 2400);
        assert_eq!(cart.subtotal, 7400);
    }

    #[tokio::test]
    async fn modifiers_multiply_with_quantity() {
        let (_tmp, pricing) = setup().await;

        // 2 × (2500 + 300 + 200)
        let cart = pricing
            .resolve(&[line(1, Some(1), Some(1), 2)])
            .await
            .unwrap();

        assert_eq!(cart.lines[0].unit_price, 2500);
        assert_eq!(cart.lines[0].crust_price, 300);
        assert_eq!(cart.lines[0].filling_price, 200);
        assert_eq!(cart.subtotal, 6000);
    }

    #[tokio::test]
    async fn unknown_variant_fails_the_cart() {
        let (_tmp, pricing) = setup().await;

        let err = pricing
            .resolve(&[line(1, None, None, 1), line(99, None, None, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unknown_crust_and_filling_price_as_zero() {
        let (_tmp, pricing) = setup().await;

        let cart = pricing
            .resolve(&[line(1, Some(99), Some(99), 1)])
            .await
            .unwrap();
        assert_eq!(cart.lines[0].crust_price, 0);
        assert_eq!(cart.lines[0].filling_price, 0);
        assert_eq!(cart.subtotal, 2500);
    }

    #[tokio::test]
    async fn an_empty_cart_prices_to_zero() {
        let (_tmp, pricing) = setup().await;

        let cart = pricing.resolve(&[]).await.unwrap();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.subtotal, 0);
    }
}
