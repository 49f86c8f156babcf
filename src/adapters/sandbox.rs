use {
    crate::domain::{
        error::PipelineError,
        id::TransactionId,
        money::DonationAmount,
        provider::{ChargeProcessor, ChargeResult},
    },
    std::{
        future::Future,
        pin::Pin,
        sync::atomic::{AtomicU64, Ordering},
    },
};

pub const VALID_TOKEN_PREFIX: &str = "fake-valid";

/// Deterministic stand-in for a card processor.
///
/// - tokens starting with `fake-valid` are accepted for processing;
///   anything else is refused before a transaction exists
/// - amounts from 2000 to 2999 dollars are declined by the "bank"
/// - everything else settles
#[derive(Debug, Default)]
pub struct SandboxChargeProcessor {
    next_txn: AtomicU64,
}

impl SandboxChargeProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_declining_amount(amount: DonationAmount) -> bool {
        (2000..3000).contains(&amount.dollars())
    }

    fn next_transaction_id(&self) -> Result<TransactionId, PipelineError> {
        let n = self.next_txn.fetch_add(1, Ordering::Relaxed) + 1;
        TransactionId::new(format!("sandbox_txn_{n}"))
    }

    fn settle(&self, amount: DonationAmount, token: &str) -> ChargeResult {
        if !token.starts_with(VALID_TOKEN_PREFIX) {
            return ChargeResult::rejected("Unknown or expired payment_method_nonce.");
        }
        let txn = match self.next_transaction_id() {
            Ok(txn) => txn,
            Err(e) => return ChargeResult::rejected(e.to_string()),
        };
        if Self::is_declining_amount(amount) {
            ChargeResult::declined(txn, "Do Not Honor")
        } else {
            ChargeResult::succeeded(txn)
        }
    }
}

impl ChargeProcessor for SandboxChargeProcessor {
    fn charge<'a>(
        &'a self,
        amount: DonationAmount,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = ChargeResult> + Send + 'a>> {
        Box::pin(async move { self.settle(amount, token) })
    }
}
