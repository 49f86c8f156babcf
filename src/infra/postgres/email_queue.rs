use {
    crate::domain::{
        error::PipelineError,
        ports::{INVOICE_SUBJECT, Notifier, PortFuture},
    },
    sqlx::PgPool,
    uuid::Uuid,
};

/// Notifier that queues invoice emails in Postgres for a separate delivery
/// worker.
#[derive(Clone)]
pub struct PgEmailQueue {
    pool: PgPool,
}

impl PgEmailQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns `false` when nothing was queued (blank recipient).
    pub async fn enqueue(&self, recipient: &str, invoice_url: &str) -> Result<bool, PipelineError> {
        if recipient.trim().is_empty() {
            tracing::warn!("no email address on file, invoice not queued");
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO email_queue (id, recipient, subject, invoice_url)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(recipient)
        .bind(INVOICE_SUBJECT)
        .bind(invoice_url)
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::Notification(format!("could not queue invoice: {e}")))?;

        Ok(true)
    }
}

impl Notifier for PgEmailQueue {
    fn send_invoice<'a>(&'a self, email: &'a str, invoice_url: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.enqueue(email, invoice_url).await?;
            Ok(())
        })
    }
}
