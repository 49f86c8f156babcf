use {
    crate::domain::{
        id::TransactionId,
        money::DonationAmount,
        provider::{ChargeProcessor, ChargeResult},
    },
    std::{future::Future, pin::Pin},
};

/// Settles donations as confirmed Stripe PaymentIntents. The payment token
/// is a Stripe payment-method id (`pm_…`).
pub struct StripeChargeProcessor {
    client: stripe::Client,
}

impl StripeChargeProcessor {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: stripe::Client::new(secret_key),
        }
    }
}

impl ChargeProcessor for StripeChargeProcessor {
    fn charge<'a>(
        &'a self,
        amount: DonationAmount,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = ChargeResult> + Send + 'a>> {
        Box::pin(async move { self.charge_inner(amount, token).await })
    }
}

impl StripeChargeProcessor {
    async fn charge_inner(&self, amount: DonationAmount, token: &str) -> ChargeResult {
        // A token that is not even a payment-method id never reaches Stripe.
        let payment_method = match token.parse::<stripe::PaymentMethodId>() {
            Ok(id) => id,
            Err(e) => return ChargeResult::rejected(format!("malformed payment token: {e}")),
        };

        let mut params = stripe::CreatePaymentIntent::new(amount.cents(), stripe::Currency::USD);
        params.payment_method = Some(payment_method);
        params.payment_method_types = Some(vec!["card".to_string()]);
        params.confirm = Some(true);
        params.error_on_requires_action = Some(true);

        match stripe::PaymentIntent::create(&self.client, params).await {
            Ok(pi) => match intent_state(pi.id.as_str(), &pi.status) {
                IntentState::Settled(result) => result,
                IntentState::Open(txn) => self.close_open_intent(&pi, txn).await,
            },
            Err(stripe::StripeError::Stripe(err)) => settle_from_request_error(&err),
            Err(e) => ChargeResult::rejected(format!("Stripe API: {e}")),
        }
    }

    /// An intent that is still live could move money later, so it only
    /// counts as failed once Stripe reports it canceled. If the cancel is
    /// refused the intent is read back and settled from what Stripe says.
    async fn close_open_intent(&self, pi: &stripe::PaymentIntent, txn: TransactionId) -> ChargeResult {
        tracing::warn!(transaction_id = %txn, status = ?pi.status, "payment intent left open, canceling");

        let after = match stripe::PaymentIntent::cancel(
            &self.client,
            pi.id.as_str(),
            stripe::CancelPaymentIntent::default(),
        )
        .await
        {
            Ok(after) => after,
            Err(e) => {
                tracing::warn!(transaction_id = %txn, "cancel refused: {e}");
                match stripe::PaymentIntent::retrieve(&self.client, &pi.id, &[]).await {
                    Ok(after) => after,
                    Err(e) => {
                        tracing::error!(
                            transaction_id = %txn,
                            "payment intent state unknown, needs reconciliation: {e}"
                        );
                        return ChargeResult::declined(txn, "payment intent could not be canceled");
                    }
                }
            }
        };

        match intent_state(after.id.as_str(), &after.status) {
            IntentState::Settled(result) => result,
            IntentState::Open(txn) => {
                tracing::error!(
                    transaction_id = %txn,
                    status = ?after.status,
                    "payment intent still open, needs reconciliation"
                );
                ChargeResult::declined(txn, format!("payment intent {:?}", after.status))
            }
        }
    }
}

fn transaction_id(id: impl ToString) -> Option<TransactionId> {
    TransactionId::new(id.to_string()).ok()
}

/// Where a PaymentIntent leaves the money.
#[derive(Debug, PartialEq, Eq)]
pub enum IntentState {
    /// Terminal at Stripe: succeeded, or canceled so nothing can move.
    Settled(ChargeResult),
    /// Still live at Stripe.
    Open(TransactionId),
}

pub fn intent_state(id: &str, status: &stripe::PaymentIntentStatus) -> IntentState {
    let Some(txn) = transaction_id(id) else {
        return IntentState::Settled(ChargeResult::rejected("PaymentIntent without id"));
    };

    match status {
        stripe::PaymentIntentStatus::Succeeded => IntentState::Settled(ChargeResult::succeeded(txn)),
        stripe::PaymentIntentStatus::Canceled => {
            IntentState::Settled(ChargeResult::declined(txn, "payment intent canceled"))
        }
        _ => IntentState::Open(txn),
    }
}

/// Card errors name the charge Stripe attempted; anything else means the
/// request never became a transaction.
pub fn settle_from_request_error(err: &stripe::RequestError) -> ChargeResult {
    let reason = err
        .decline_code
        .clone()
        .or_else(|| err.message.clone())
        .unwrap_or_else(|| format!("{:?}", err.error_type));

    match err.charge.as_deref().and_then(transaction_id) {
        Some(txn) => ChargeResult::declined(txn, reason),
        None => ChargeResult::rejected(reason),
    }
}
