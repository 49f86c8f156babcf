use {
    super::audit_repo::insert_audit_entry,
    crate::domain::{
        donation::{NewPendingPayment, PendingPayment, SettlementStatus},
        error::PipelineError,
        id::{PaymentId, TransactionId},
        image::ImageAsset,
        money::DonationAmount,
        ports::{PaymentStore, PortFuture},
        provider::ChargeResult,
    },
    chrono::{DateTime, Utc},
    sqlx::PgPool,
    uuid::Uuid,
};

const ACTOR: &str = "intake";

const SELECT_PAYMENT: &str = r#"
    SELECT id, amount, name, email_address, on_mailing_list,
           promotion_name, promotion_url, promotion_twitter, promotion_message,
           image_original, image_large, image_small, image_type,
           status, transaction_id, decline_reason, created_at, updated_at
    FROM payments_for_open_source
    WHERE id = $1
"#;

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    amount: i64,
    name: String,
    email_address: String,
    on_mailing_list: bool,
    promotion_name: String,
    promotion_url: String,
    promotion_twitter: String,
    promotion_message: String,
    image_original: Option<Vec<u8>>,
    image_large: Option<Vec<u8>>,
    image_small: Option<Vec<u8>>,
    image_type: Option<String>,
    status: String,
    transaction_id: Option<String>,
    decline_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PendingPayment {
    type Error = PipelineError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let logo = match (row.image_original, row.image_type) {
            (Some(original), Some(mime_type)) => Some(ImageAsset {
                original,
                large: row.image_large.unwrap_or_default(),
                small: row.image_small.unwrap_or_default(),
                mime_type,
            }),
            _ => None,
        };

        let details = NewPendingPayment {
            id: PaymentId::from_uuid(row.id),
            amount: DonationAmount::try_from(row.amount)?,
            name: row.name,
            email_address: row.email_address,
            on_mailing_list: row.on_mailing_list,
            promotion_name: row.promotion_name,
            promotion_url: row.promotion_url,
            promotion_twitter: row.promotion_twitter,
            promotion_message: row.promotion_message,
            logo,
        };

        Ok(PendingPayment::restore(
            details,
            SettlementStatus::try_from(row.status.as_str())?,
            row.transaction_id.map(TransactionId::new).transpose()?,
            row.decline_reason,
            row.created_at,
            row.updated_at,
        ))
    }
}

/// Postgres-backed [`PaymentStore`]. Every write commits together with its
/// audit entry.
#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_pending_inner(
        &self,
        payment: &NewPendingPayment,
    ) -> Result<PaymentId, PipelineError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments_for_open_source
                (id, amount, name, email_address, on_mailing_list,
                 promotion_name, promotion_url, promotion_twitter, promotion_message,
                 image_original, image_large, image_small, image_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, amount, name, email_address, on_mailing_list,
                      promotion_name, promotion_url, promotion_twitter, promotion_message,
                      image_original, image_large, image_small, image_type,
                      status, transaction_id, decline_reason, created_at, updated_at
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.amount.dollars())
        .bind(&payment.name)
        .bind(&payment.email_address)
        .bind(payment.on_mailing_list)
        .bind(&payment.promotion_name)
        .bind(&payment.promotion_url)
        .bind(&payment.promotion_twitter)
        .bind(&payment.promotion_message)
        .bind(payment.logo.as_ref().map(|l| l.original.as_slice()))
        .bind(payment.logo.as_ref().map(|l| l.large.as_slice()))
        .bind(payment.logo.as_ref().map(|l| l.small.as_slice()))
        .bind(payment.logo.as_ref().map(|l| l.mime_type.as_str()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PipelineError::DuplicatePayment(payment.id)
            }
            _ => PipelineError::Database(e),
        })?;

        let stored = PendingPayment::try_from(row)?;
        insert_audit_entry(&mut tx, &stored.audit_entry(ACTOR, "created")).await?;
        tx.commit().await?;
        Ok(stored.id())
    }

    async fn update_settlement_inner(
        &self,
        id: PaymentId,
        result: &ChargeResult,
    ) -> Result<PendingPayment, PipelineError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!("{SELECT_PAYMENT} FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PipelineError::NotFound(id))?;

        let mut payment = PendingPayment::try_from(row)?;
        if let Err(e) = payment.settle(result, Utc::now()) {
            tracing::warn!(payment_id = %id, error = %e, "refusing to settle payment twice");
            tx.rollback().await?;
            return Err(e);
        }

        sqlx::query(
            r#"
            UPDATE payments_for_open_source
            SET status = $1, transaction_id = $2, decline_reason = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(payment.status().as_str())
        .bind(payment.transaction_id().map(TransactionId::as_str))
        .bind(payment.decline_reason())
        .bind(payment.updated_at())
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await?;

        insert_audit_entry(&mut tx, &payment.audit_entry(ACTOR, "settled")).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn fetch_inner(&self, id: PaymentId) -> Result<Option<PendingPayment>, PipelineError> {
        sqlx::query_as::<_, PaymentRow>(SELECT_PAYMENT)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(PendingPayment::try_from)
            .transpose()
    }
}

impl PaymentStore for PgPaymentStore {
    fn insert_pending<'a>(&'a self, payment: &'a NewPendingPayment) -> PortFuture<'a, PaymentId> {
        Box::pin(self.insert_pending_inner(payment))
    }

    fn update_settlement<'a>(
        &'a self,
        id: PaymentId,
        result: &'a ChargeResult,
    ) -> PortFuture<'a, PendingPayment> {
        Box::pin(self.update_settlement_inner(id, result))
    }

    fn fetch(&self, id: PaymentId) -> PortFuture<'_, Option<PendingPayment>> {
        Box::pin(self.fetch_inner(id))
    }
}
