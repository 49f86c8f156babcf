use {
    crate::domain::{
        audit::NewAuditEntry,
        donation::{NewPendingPayment, PendingPayment},
        error::PipelineError,
        id::PaymentId,
        ports::{INVOICE_SUBJECT, Notifier, PaymentStore, PortFuture},
        provider::ChargeResult,
    },
    chrono::Utc,
    std::{collections::HashMap, sync::Arc},
    tokio::sync::RwLock,
};

#[derive(Default)]
struct Tables {
    payments: HashMap<PaymentId, PendingPayment>,
    audit_log: Vec<NewAuditEntry>,
}

/// A thread-safe in-memory payment store.
///
/// Used by tests and by local runs without `DATABASE_URL`. Records the
/// same audit entries as the Postgres store.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.payments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn all(&self) -> Vec<PendingPayment> {
        let mut all: Vec<_> = self.tables.read().await.payments.values().cloned().collect();
        all.sort_by_key(|p| p.created_at());
        all
    }

    pub async fn audit_entries(&self, id: PaymentId) -> Vec<NewAuditEntry> {
        self.tables
            .read()
            .await
            .audit_log
            .iter()
            .filter(|e| e.entity_id == id)
            .cloned()
            .collect()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn insert_pending<'a>(&'a self, payment: &'a NewPendingPayment) -> PortFuture<'a, PaymentId> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if tables.payments.contains_key(&payment.id) {
                return Err(PipelineError::DuplicatePayment(payment.id));
            }
            let stored = PendingPayment::stored(payment.clone(), Utc::now());
            let audit = stored.audit_entry("intake", "created");
            tables.payments.insert(payment.id, stored);
            tables.audit_log.push(audit);
            Ok(payment.id)
        })
    }

    fn update_settlement<'a>(
        &'a self,
        id: PaymentId,
        result: &'a ChargeResult,
    ) -> PortFuture<'a, PendingPayment> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let payment = tables
                .payments
                .get_mut(&id)
                .ok_or(PipelineError::NotFound(id))?;
            payment.settle(result, Utc::now())?;
            let settled = payment.clone();
            tables.audit_log.push(settled.audit_entry("intake", "settled"));
            Ok(settled)
        })
    }

    fn fetch(&self, id: PaymentId) -> PortFuture<'_, Option<PendingPayment>> {
        Box::pin(async move { Ok(self.tables.read().await.payments.get(&id).cloned()) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub invoice_url: String,
}

/// Notifier that keeps every invoice email in memory.
#[derive(Default, Clone)]
pub struct InMemoryOutbox {
    sent: Arc<RwLock<Vec<OutgoingEmail>>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.read().await.clone()
    }

    pub async fn last(&self) -> Option<OutgoingEmail> {
        self.sent.read().await.last().cloned()
    }
}

impl Notifier for InMemoryOutbox {
    fn send_invoice<'a>(&'a self, email: &'a str, invoice_url: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.sent.write().await.push(OutgoingEmail {
                to: email.to_string(),
                subject: INVOICE_SUBJECT.to_string(),
                invoice_url: invoice_url.to_string(),
            });
            Ok(())
        })
    }
}
