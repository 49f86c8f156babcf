use {
    crate::domain::donation::{
        NewPendingPayment, ParsedDonation, PaymentOutcome, PendingPayment, SettlementStatus,
    },
    crate::domain::error::PipelineError,
    crate::domain::id::PaymentId,
    crate::domain::image::ImageIntake,
    crate::domain::intake,
    crate::domain::policy::FieldPolicy,
    crate::domain::ports::{Notifier, PaymentStore},
    crate::domain::provider::{ChargeProcessor, ChargeResult},
    crate::domain::submission::Submission,
    std::{sync::Arc, time::Duration},
};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub policy: FieldPolicy,
    pub charge_timeout: Duration,
    /// Prefix for invoice links, without a trailing slash.
    pub base_url: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            policy: FieldPolicy::default(),
            charge_timeout: Duration::from_secs(30),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Validate → store → charge → notify, for one submission at a time.
#[derive(Clone)]
pub struct PaymentPipeline {
    store: Arc<dyn PaymentStore>,
    processor: Arc<dyn ChargeProcessor>,
    images: Arc<dyn ImageIntake>,
    notifier: Arc<dyn Notifier>,
    settings: PipelineSettings,
}

impl PaymentPipeline {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        processor: Arc<dyn ChargeProcessor>,
        images: Arc<dyn ImageIntake>,
        notifier: Arc<dyn Notifier>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            processor,
            images,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Top-level entry point. Field errors and settlement failures come
    /// back as `Ok` outcomes; only structural faults and infrastructure
    /// failures are `Err`.
    #[tracing::instrument(
        name = "pay_for_open_source",
        skip_all,
        fields(payment_id = tracing::field::Empty)
    )]
    pub async fn pay_for_open_source(
        &self,
        submission: &Submission,
    ) -> Result<PaymentOutcome, PipelineError> {
        let parsed = self.parse(submission)?;
        if !parsed.is_clean() {
            tracing::info!(errors = ?parsed.errors(), "submission rejected");
            return Ok(PaymentOutcome::rejected(parsed.errors()));
        }

        let new = parsed.to_new_payment()?;
        let id = self.store(&new).await?;
        tracing::Span::current().record("payment_id", tracing::field::display(id));

        let payment = self.charge(id, parsed.payment_method_nonce()).await?;
        if payment.succeeded() != Some(true) {
            return Ok(PaymentOutcome::charging_failed());
        }

        let invoice_url = self.send(&payment).await?;
        Ok(PaymentOutcome::completed(invoice_url))
    }

    pub fn parse(&self, submission: &Submission) -> Result<ParsedDonation, PipelineError> {
        intake::parse(submission, &self.settings.policy, &*self.images)
    }

    /// Persist the donation as pending. The payment token is not part of
    /// `NewPendingPayment` and so is never stored.
    pub async fn store(&self, payment: &NewPendingPayment) -> Result<PaymentId, PipelineError> {
        let id = self.store.insert_pending(payment).await?;
        tracing::info!(payment_id = %id, amount = %payment.amount, "payment stored as pending");
        Ok(id)
    }

    /// Make the single settlement attempt for a stored payment and record
    /// its outcome. The amount charged is the stored one. A payment that is
    /// no longer pending never reaches the processor. A timeout counts as a
    /// rejection with no transaction id.
    pub async fn charge(&self, id: PaymentId, token: &str) -> Result<PendingPayment, PipelineError> {
        let pending = self
            .store
            .fetch(id)
            .await?
            .ok_or(PipelineError::NotFound(id))?;
        if pending.status() != SettlementStatus::Pending {
            return Err(PipelineError::AlreadySettled {
                id,
                status: pending.status(),
            });
        }

        let timeout = self.settings.charge_timeout;
        let result = tokio::time::timeout(timeout, self.processor.charge(pending.amount(), token))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(payment_id = %id, ?timeout, "charge timed out");
                ChargeResult::rejected(format!("charge timed out after {timeout:?}"))
            });

        let payment = self.store.update_settlement(id, &result).await?;

        if result.succeeded {
            tracing::info!(
                payment_id = %id,
                transaction_id = ?result.transaction_id,
                "charge succeeded"
            );
        } else {
            tracing::warn!(
                payment_id = %id,
                transaction_id = ?result.transaction_id,
                reason = result.decline_reason.as_deref().unwrap_or(""),
                "charge failed"
            );
        }
        Ok(payment)
    }

    /// Email the invoice link for a settled payment; returns the link.
    pub async fn send(&self, payment: &PendingPayment) -> Result<String, PipelineError> {
        let invoice_url = self.invoice_url(payment.id());
        self.notifier
            .send_invoice(payment.email_address(), &invoice_url)
            .await?;
        tracing::info!(payment_id = %payment.id(), "invoice sent");
        Ok(invoice_url)
    }

    pub fn invoice_url(&self, id: PaymentId) -> String {
        format!(
            "{}/browse/payments/{id}/invoice.html",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    pub async fn fetch(&self, id: PaymentId) -> Result<Option<PendingPayment>, PipelineError> {
        self.store.fetch(id).await
    }
}
