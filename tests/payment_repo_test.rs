mod common;

use common::*;
use pfos::adapters::sandbox::SandboxChargeProcessor;
use pfos::domain::donation::{NewPendingPayment, SettlementStatus};
use pfos::domain::error::PipelineError;
use pfos::domain::id::{PaymentId, TransactionId};
use pfos::domain::policy::FieldPolicy;
use pfos::domain::ports::{Notifier, PaymentStore};
use pfos::domain::provider::ChargeResult;
use pfos::infra::postgres::audit_repo::audit_actions;
use pfos::infra::postgres::email_queue::PgEmailQueue;
use pfos::infra::postgres::payment_repo::PgPaymentStore;
use pfos::services::payment_pipeline::{PaymentPipeline, PipelineSettings};
use std::sync::Arc;

fn new_payment(form: &Form) -> NewPendingPayment {
    pfos::domain::intake::parse(&submission(form), &FieldPolicy::default(), &image_intake())
        .unwrap()
        .to_new_payment()
        .unwrap()
}

fn unique_recipient() -> String {
    format!("{}@example.com", uuid::Uuid::now_v7())
}

// ── 1. insert_and_fetch ─────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn insert_and_fetch() {
    let store = PgPaymentStore::new(setup_pool().await);
    let payment = new_payment(&good());

    let id = store.insert_pending(&payment).await.unwrap();
    assert_eq!(id, payment.id);

    let row = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(row.status(), SettlementStatus::Pending);
    assert_eq!(row.amount().dollars(), 1000);
    assert_eq!(row.email_address(), "alice@example.com");
    assert!(row.on_mailing_list());
    assert_eq!(row.details().promotion_name, "Wonderland");

    let logo = row.details().logo.as_ref().unwrap();
    assert_eq!(logo.original, ORIGINAL);
    assert_eq!(logo.large, LARGE);
    assert_eq!(logo.small, SMALL);
    assert_eq!(logo.mime_type, "image/png");
}

// ── 2. fetch_unknown_is_none ────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn fetch_unknown_is_none() {
    let store = PgPaymentStore::new(setup_pool().await);
    assert!(store.fetch(PaymentId::new()).await.unwrap().is_none());
}

// ── 3. duplicate_id_is_a_conflict ───────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn duplicate_id_is_a_conflict() {
    let store = PgPaymentStore::new(setup_pool().await);
    let payment = new_payment(&good());
    store.insert_pending(&payment).await.unwrap();

    let err = store.insert_pending(&payment).await.unwrap_err();
    assert!(matches!(err, PipelineError::DuplicatePayment(id) if id == payment.id));
}

// ── 4. settle_succeeded ─────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn settle_succeeded() {
    let store = PgPaymentStore::new(setup_pool().await);
    let id = store.insert_pending(&new_payment(&partial())).await.unwrap();

    let txn = TransactionId::new("txn_pg_ok").unwrap();
    let settled = store
        .update_settlement(id, &ChargeResult::succeeded(txn.clone()))
        .await
        .unwrap();
    assert_eq!(settled.succeeded(), Some(true));
    assert_eq!(settled.transaction_id(), Some(&txn));
    assert!(settled.updated_at() >= settled.created_at());

    let row = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(row.status(), SettlementStatus::Succeeded);
}

// ── 5. settle_declined_keeps_reason ─────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn settle_declined_keeps_reason() {
    let store = PgPaymentStore::new(setup_pool().await);
    let id = store.insert_pending(&new_payment(&good())).await.unwrap();

    let txn = TransactionId::new("txn_pg_declined").unwrap();
    store
        .update_settlement(id, &ChargeResult::declined(txn, "Do Not Honor"))
        .await
        .unwrap();

    let row = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(row.succeeded(), Some(false));
    assert_eq!(row.decline_reason(), Some("Do Not Honor"));
}

// ── 6. settling_twice_is_rejected ───────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn settling_twice_is_rejected() {
    let store = PgPaymentStore::new(setup_pool().await);
    let id = store.insert_pending(&new_payment(&good())).await.unwrap();
    store
        .update_settlement(id, &ChargeResult::rejected("nope"))
        .await
        .unwrap();

    let err = store
        .update_settlement(id, &ChargeResult::succeeded(TransactionId::new("late").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTransition { .. }));

    let row = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(row.status(), SettlementStatus::Failed);
}

// ── 7. settle_unknown_is_not_found ──────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn settle_unknown_is_not_found() {
    let store = PgPaymentStore::new(setup_pool().await);
    let err = store
        .update_settlement(PaymentId::new(), &ChargeResult::rejected("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

// ── 8. audit_trail ──────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn audit_trail() {
    let pool = setup_pool().await;
    let store = PgPaymentStore::new(pool.clone());
    let id = store.insert_pending(&new_payment(&good())).await.unwrap();
    store
        .update_settlement(id, &ChargeResult::succeeded(TransactionId::new("txn_audit").unwrap()))
        .await
        .unwrap();

    let audits = audit_actions(&pool, id).await.unwrap();
    let actions: Vec<_> = audits.iter().map(|(action, _)| action.as_str()).collect();
    assert_eq!(actions, ["created", "settled"]);
    assert_eq!(audits[1].1["transaction_id"], "txn_audit");
    for (_, detail) in &audits {
        assert!(!detail.to_string().contains("fake-valid-nonce"));
    }
}

// ── 9. email_queue ──────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn email_queue_skips_blank_recipient() {
    let pool = setup_pool().await;
    let queue = PgEmailQueue::new(pool.clone());
    let recipient = unique_recipient();

    assert!(queue.enqueue(&recipient, "http://localhost/invoice.html").await.unwrap());
    assert!(!queue.enqueue("  ", "http://localhost/invoice.html").await.unwrap());
    queue
        .send_invoice(&recipient, "http://localhost/invoice.html")
        .await
        .unwrap();

    assert_eq!(count_queued_emails(&pool, &recipient).await, 2);
}

// ── 10. pipeline_against_postgres ───────────────────────────────────────────

#[tokio::test]
#[ignore = "needs postgres"]
async fn pipeline_against_postgres() {
    let pool = setup_pool().await;
    let recipient = unique_recipient();
    let pipeline = PaymentPipeline::new(
        Arc::new(PgPaymentStore::new(pool.clone())),
        Arc::new(SandboxChargeProcessor::new()),
        Arc::new(image_intake()),
        Arc::new(PgEmailQueue::new(pool.clone())),
        PipelineSettings::default(),
    );

    let form = with(good(), "email_address", text(recipient.clone()));
    let outcome = pipeline.pay_for_open_source(&submission(&form)).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(count_queued_emails(&pool, &recipient).await, 1);
}
