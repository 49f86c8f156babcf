use {
    super::id::TransactionId,
    super::money::DonationAmount,
    serde::Serialize,
    std::{future::Future, pin::Pin},
};

/// What the orchestrator gets back from a settlement attempt.
///
/// `transaction_id` is present only when the processor engaged with the
/// token; a token rejected before submission carries none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeResult {
    pub succeeded: bool,
    pub transaction_id: Option<TransactionId>,
    pub decline_reason: Option<String>,
}

impl ChargeResult {
    pub fn succeeded(transaction_id: TransactionId) -> Self {
        Self {
            succeeded: true,
            transaction_id: Some(transaction_id),
            decline_reason: None,
        }
    }

    /// The processor attempted the charge and declined it.
    pub fn declined(transaction_id: TransactionId, reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            transaction_id: Some(transaction_id),
            decline_reason: Some(reason.into()),
        }
    }

    /// The request never became a transaction: bad token, transport
    /// failure or timeout.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            transaction_id: None,
            decline_reason: Some(reason.into()),
        }
    }
}

pub trait ChargeProcessor: Send + Sync {
    /// Submit one charge. Never retried by the caller: tokens are single-use.
    fn charge<'a>(
        &'a self,
        amount: DonationAmount,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = ChargeResult> + Send + 'a>>;
}
