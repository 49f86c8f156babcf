use {
    super::donation::{NewPendingPayment, PendingPayment},
    super::error::PipelineError,
    super::id::PaymentId,
    super::provider::ChargeResult,
    std::{future::Future, pin::Pin},
};

pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

/// Durable storage for payments for open source. Each call is atomic on
/// its own; the insert and the settlement update are separate writes.
pub trait PaymentStore: Send + Sync {
    fn insert_pending<'a>(&'a self, payment: &'a NewPendingPayment) -> PortFuture<'a, PaymentId>;

    /// Record the charge outcome. Errors with `InvalidTransition` if the
    /// record is no longer pending, `NotFound` if it does not exist.
    fn update_settlement<'a>(
        &'a self,
        id: PaymentId,
        result: &'a ChargeResult,
    ) -> PortFuture<'a, PendingPayment>;

    fn fetch(&self, id: PaymentId) -> PortFuture<'_, Option<PendingPayment>>;
}

pub const INVOICE_SUBJECT: &str = "Invoice from Gratipay";

/// Hands an invoice link to the donor's mailbox. Delivery is someone
/// else's job; errors here mean the hand-off itself failed.
pub trait Notifier: Send + Sync {
    fn send_invoice<'a>(&'a self, email: &'a str, invoice_url: &'a str) -> PortFuture<'a, ()>;
}
