//! Webhook reconciliation integration tests: approval edge, idempotent
//! redelivery, soft-success paths and the PIX intent round trip.

mod support;

use nostra_server::WebhookDelivery;
use nostra_server::db::models::{OrderStatus, PaymentStatus};
use nostra_server::payment::PixRequest;
use support::{create_pending_order, delivery, insert_payment, setup, setup_with, webhook_body};

#[tokio::test]
async fn approval_webhook_confirms_the_order_exactly_once() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let mut events = env.state.notifier.subscribe();

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "approved")))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
    assert_eq!(response.order_id, Some(order.order.id));
    assert_eq!(response.order_number.as_deref(), Some(order.order.order_number.as_str()));

    // Payment approved with paid_at stamped
    let payment: (String, Option<i64>) =
        sqlx::query_as("SELECT status, paid_at FROM payments WHERE id = 'p1'")
            .fetch_one(&env.state.pool)
            .await
            .unwrap();
    assert_eq!(payment.0, "approved");
    assert!(payment.1.is_some());

    // Order confirmed with confirmed_at stamped
    let confirmed = env.state.orders.get_order(order.order.id).await.unwrap();
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
    assert!(confirmed.order.confirmed_at.is_some());

    // Exactly one new history row, noting the webhook approval
    let history = env.state.orders.history(order.order.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].status, OrderStatus::Confirmed);
    assert!(
        history[1].notes.as_deref().unwrap().contains("webhook"),
        "note was {:?}",
        history[1].notes
    );

    // Receipt persisted once
    let receipt = env
        .state
        .receipts
        .find_by_order(order.order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(receipt.receipt_number.starts_with("REC-"));

    // Realtime: paymentApproved to the customer, newOrderForAdmin to admins
    let first = events.try_recv().unwrap();
    assert_eq!(first.event, "paymentApproved");
    assert_eq!(first.data["order_id"], order.order.id);
    let second = events.try_recv().unwrap();
    assert_eq!(second.event, "newOrderForAdmin");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn redelivered_approval_is_absorbed_as_a_noop() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let first = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "approved")))
        .await;
    assert!(first.ok);

    let paid_at_before: Option<i64> =
        sqlx::query_scalar("SELECT paid_at FROM payments WHERE id = 'p1'")
            .fetch_one(&env.state.pool)
            .await
            .unwrap();
    let history_before = env.state.orders.history(order.order.id).await.unwrap().len();

    // Subscribe between deliveries: the redelivery must emit nothing
    let mut events = env.state.notifier.subscribe();

    let second = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "approved")))
        .await;
    assert!(second.ok);
    assert_eq!(second.payment_status, Some(PaymentStatus::Approved));

    // Payment untouched, order still confirmed, no new history row
    let paid_at_after: Option<i64> =
        sqlx::query_scalar("SELECT paid_at FROM payments WHERE id = 'p1'")
            .fetch_one(&env.state.pool)
            .await
            .unwrap();
    assert_eq!(paid_at_after, paid_at_before);

    let confirmed = env.state.orders.get_order(order.order.id).await.unwrap();
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
    assert_eq!(
        env.state.orders.history(order.order.id).await.unwrap().len(),
        history_before
    );

    // No duplicate receipt (UNIQUE on order) and no realtime replay
    let receipt_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE order_id = ?1")
            .bind(order.order.id)
            .fetch_one(&env.state.pool)
            .await
            .unwrap();
    assert_eq!(receipt_count, 1);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn unknown_payment_id_is_a_soft_success() {
    let env = setup().await;

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("ghost-payment", "approved")))
        .await;

    assert!(response.ok);
    assert!(
        response.message.as_deref().unwrap().contains("not found"),
        "message was {:?}",
        response.message
    );
}

#[tokio::test]
async fn non_payment_events_are_ignored() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(
            r#"{"type":"plan","data":{"id":"p1","status":"approved"}}"#.to_string(),
        ))
        .await;

    assert!(response.ok);
    let status: String = sqlx::query_scalar("SELECT status FROM payments WHERE id = 'p1'")
        .fetch_one(&env.state.pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
}

#[tokio::test]
async fn non_approved_statuses_update_the_payment_but_never_the_order() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "rejected")))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Rejected));

    let status: String = sqlx::query_scalar("SELECT status FROM payments WHERE id = 'p1'")
        .fetch_one(&env.state.pool)
        .await
        .unwrap();
    assert_eq!(status, "rejected");

    // Order untouched: still pending, one history row, no stamps
    let untouched = env.state.orders.get_order(order.order.id).await.unwrap();
    assert_eq!(untouched.order.status, OrderStatus::Pending);
    assert!(untouched.order.confirmed_at.is_none());
    assert_eq!(env.state.orders.history(order.order.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_provider_vocabulary_maps_to_pending() {
    let env = setup().await;
    insert_payment(&env.state.pool, "p1", 1, None, "rejected").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "some_future_status")))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Pending));
}

#[tokio::test]
async fn an_approved_payment_is_never_regressed() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    env.state
        .reconciler
        .handle(delivery(webhook_body("p1", "approved")))
        .await;

    // A straggling "rejected" delivery arrives out of order
    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("p1", "rejected")))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
    let status: String = sqlx::query_scalar("SELECT status FROM payments WHERE id = 'p1'")
        .fetch_one(&env.state.pool)
        .await
        .unwrap();
    assert_eq!(status, "approved");
}

#[tokio::test]
async fn missing_payment_id_is_a_bad_request_shaped_success() {
    let env = setup().await;

    let response = env
        .state
        .reconciler
        .handle(delivery(r#"{"type":"payment","data":{}}"#.to_string()))
        .await;

    assert!(!response.ok);
    assert!(response.error.is_some());
}

#[tokio::test]
async fn malformed_json_never_panics() {
    let env = setup().await;

    let response = env
        .state
        .reconciler
        .handle(delivery("{not json at all".to_string()))
        .await;

    assert!(!response.ok);
    assert!(response.error.is_some());
}

#[tokio::test]
async fn payment_id_can_come_from_the_query_parameter() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(WebhookDelivery {
            signature: None,
            request_id: None,
            data_id_query: Some("p1".to_string()),
            raw_body: r#"{"type":"payment","data":{"status":"approved"}}"#.to_string(),
        })
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
}

#[tokio::test]
async fn numeric_provider_ids_match_string_primary_keys() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "123456789", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(
            r#"{"type":"payment","data":{"id":123456789,"status":"approved"}}"#.to_string(),
        ))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
}

#[tokio::test]
async fn gateway_correlation_id_is_a_lookup_fallback() {
    let env = setup().await;
    let order = create_pending_order(&env).await;
    // insert_payment sets gateway_id = mp_p1
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("mp_p1", "approved")))
        .await;

    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
}

#[tokio::test]
async fn approval_without_a_linked_order_still_updates_the_payment() {
    let env = setup().await;
    insert_payment(&env.state.pool, "orphan", 1, None, "pending").await;

    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body("orphan", "approved")))
        .await;

    assert!(response.ok);
    assert!(
        response.message.as_deref().unwrap().contains("no order"),
        "message was {:?}",
        response.message
    );

    let status: String = sqlx::query_scalar("SELECT status FROM payments WHERE id = 'orphan'")
        .fetch_one(&env.state.pool)
        .await
        .unwrap();
    assert_eq!(status, "approved");
}

#[tokio::test]
async fn a_bad_signature_is_advisory_not_blocking() {
    let env = setup_with(|config| {
        config.webhook_secret = Some("shhh".to_string());
    })
    .await;
    let order = create_pending_order(&env).await;
    insert_payment(&env.state.pool, "p1", 1, Some(order.order.id), "pending").await;

    let response = env
        .state
        .reconciler
        .handle(WebhookDelivery {
            signature: Some("ts=1,v1=definitely-not-right".to_string()),
            request_id: Some("req-1".to_string()),
            data_id_query: None,
            raw_body: webhook_body("p1", "approved"),
        })
        .await;

    // Processed despite the forged signature; the payment lookup is the gate
    assert!(response.ok);
    assert_eq!(response.payment_status, Some(PaymentStatus::Approved));
}

#[tokio::test]
async fn pix_intent_persists_a_pending_payment_and_reconciles_later() {
    let env = setup().await;
    let order = create_pending_order(&env).await;

    // Degraded mode (no gateway token): deterministic placeholder charge
    let intent = env
        .state
        .payments
        .generate_pix_intent(
            1,
            &PixRequest {
                order_id: order.order.id,
                amount: order.order.total,
                email: "ana@example.com".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(intent.ok);
    assert!(intent.pix.qr_code.contains("br.gov.bcb"));
    assert!(!intent.pix.qr_code_base64.is_empty());
    assert_eq!(intent.pix.status, PaymentStatus::Pending);

    // The full loop: provider calls back with this payment id
    let response = env
        .state
        .reconciler
        .handle(delivery(webhook_body(&intent.pix.payment_id, "approved")))
        .await;
    assert!(response.ok);

    let confirmed = env.state.orders.get_order(order.order.id).await.unwrap();
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn pix_intent_rejects_orders_owned_by_someone_else() {
    let env = setup().await;
    let order = create_pending_order(&env).await; // belongs to customer 1

    let err = env
        .state
        .payments
        .generate_pix_intent(
            2,
            &PixRequest {
                order_id: order.order.id,
                amount: order.order.total,
                email: "bruno@example.com".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, nostra_server::AppError::Validation(_)));
}
