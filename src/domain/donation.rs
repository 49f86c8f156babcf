use {
    super::audit::NewAuditEntry,
    super::error::PipelineError,
    super::field::Field,
    super::id::{PaymentId, TransactionId},
    super::image::ImageAsset,
    super::money::DonationAmount,
    super::provider::ChargeResult,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fmt},
    uuid::Uuid,
};

/// Error token used when settlement fails, in place of field names.
pub const CHARGING: &str = "charging";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Succeeded,
    Failed,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Pending settles exactly once; settled records never move again.
    pub fn can_transition_to(&self, next: &SettlementStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Succeeded) | (Self::Pending, Self::Failed)
        )
    }

    /// Tri-state view: `None` while pending.
    pub fn succeeded(&self) -> Option<bool> {
        match self {
            Self::Pending => None,
            Self::Succeeded => Some(true),
            Self::Failed => Some(false),
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SettlementStatus {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            other => Err(PipelineError::Validation(format!(
                "unknown settlement status: {other}"
            ))),
        }
    }
}

/// Outcome of checking one field: the value to keep, and whether the
/// submitted value was acceptable as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub valid: bool,
}

impl<T> Checked<T> {
    pub fn ok(value: T) -> Self {
        Self { value, valid: true }
    }

    pub fn scrubbed(value: T) -> Self {
        Self {
            value,
            valid: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            valid: self.valid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Image(Option<ImageAsset>),
}

/// Sanitized form plus the fields that failed validation, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDonation {
    values: BTreeMap<Field, FieldValue>,
    errors: Vec<Field>,
}

impl ParsedDonation {
    pub(crate) fn new(values: BTreeMap<Field, FieldValue>, errors: Vec<Field>) -> Self {
        Self { values, errors }
    }

    pub fn errors(&self) -> &[Field] {
        &self.errors
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn values(&self) -> &BTreeMap<Field, FieldValue> {
        &self.values
    }

    /// Sanitized text of `field`; empty for the logo slot.
    pub fn text(&self, field: Field) -> &str {
        match self.values.get(&field) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn logo(&self) -> Option<&ImageAsset> {
        match self.values.get(&Field::PromotionLogo) {
            Some(FieldValue::Image(asset)) => asset.as_ref(),
            _ => None,
        }
    }

    pub fn payment_method_nonce(&self) -> &str {
        self.text(Field::PaymentMethodNonce)
    }

    /// Record to persist. The payment token is not part of it.
    pub fn to_new_payment(&self) -> Result<NewPendingPayment, PipelineError> {
        if !self.is_clean() {
            return Err(PipelineError::Validation(format!(
                "cannot store a donation with invalid fields: {:?}",
                self.errors
            )));
        }
        Ok(NewPendingPayment {
            id: PaymentId::new(),
            amount: DonationAmount::try_from(self.text(Field::Amount))?,
            name: self.text(Field::Name).to_string(),
            email_address: self.text(Field::EmailAddress).to_string(),
            on_mailing_list: self.text(Field::OnMailingList) == "yes",
            promotion_name: self.text(Field::PromotionName).to_string(),
            promotion_url: self.text(Field::PromotionUrl).to_string(),
            promotion_twitter: self.text(Field::PromotionTwitter).to_string(),
            promotion_message: self.text(Field::PromotionMessage).to_string(),
            logo: self.logo().cloned(),
        })
    }
}

/// For INSERT. The id is generated in Rust via `Uuid::now_v7()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPendingPayment {
    pub id: PaymentId,
    pub amount: DonationAmount,
    pub name: String,
    pub email_address: String,
    pub on_mailing_list: bool,
    pub promotion_name: String,
    pub promotion_url: String,
    pub promotion_twitter: String,
    pub promotion_message: String,
    pub logo: Option<ImageAsset>,
}

/// Stored payment for open source (for reads and settlement).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    details: NewPendingPayment,
    status: SettlementStatus,
    transaction_id: Option<TransactionId>,
    decline_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PendingPayment {
    pub fn stored(details: NewPendingPayment, now: DateTime<Utc>) -> Self {
        Self {
            details,
            status: SettlementStatus::Pending,
            transaction_id: None,
            decline_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(
        details: NewPendingPayment,
        status: SettlementStatus,
        transaction_id: Option<TransactionId>,
        decline_reason: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            details,
            status,
            transaction_id,
            decline_reason,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> PaymentId {
        self.details.id
    }

    pub fn details(&self) -> &NewPendingPayment {
        &self.details
    }

    pub fn amount(&self) -> DonationAmount {
        self.details.amount
    }

    pub fn email_address(&self) -> &str {
        &self.details.email_address
    }

    pub fn on_mailing_list(&self) -> bool {
        self.details.on_mailing_list
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn succeeded(&self) -> Option<bool> {
        self.status.succeeded()
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    pub fn decline_reason(&self) -> Option<&str> {
        self.decline_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a charge outcome. Fails if the record was already settled.
    pub fn settle(&mut self, result: &ChargeResult, now: DateTime<Utc>) -> Result<(), PipelineError> {
        let next = if result.succeeded {
            SettlementStatus::Succeeded
        } else {
            SettlementStatus::Failed
        };

        if !self.status.can_transition_to(&next) {
            return Err(PipelineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.transaction_id = result.transaction_id.clone();
        self.decline_reason = result.decline_reason.clone();
        self.updated_at = now;
        Ok(())
    }

    pub fn audit_entry(&self, actor: &str, action: &str) -> NewAuditEntry {
        NewAuditEntry {
            id: Uuid::now_v7(),
            entity_type: "payment_for_open_source".to_string(),
            entity_id: self.id(),
            action: action.to_string(),
            actor: actor.to_string(),
            detail: serde_json::json!({
                "amount": self.amount().dollars(),
                "status": self.status.as_str(),
                "transaction_id": self.transaction_id.as_ref().map(TransactionId::as_str),
                "decline_reason": self.decline_reason,
                "on_mailing_list": self.on_mailing_list(),
                "has_logo": self.details.logo.is_some(),
            }),
        }
    }
}

/// API-facing result of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub errors: Vec<String>,
    pub invoice_url: Option<String>,
}

impl PaymentOutcome {
    pub fn rejected(fields: &[Field]) -> Self {
        Self {
            errors: fields.iter().map(|f| f.as_str().to_string()).collect(),
            invoice_url: None,
        }
    }

    pub fn charging_failed() -> Self {
        Self {
            errors: vec![CHARGING.to_string()],
            invoice_url: None,
        }
    }

    pub fn completed(invoice_url: String) -> Self {
        Self {
            errors: Vec::new(),
            invoice_url: Some(invoice_url),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.invoice_url.is_some()
    }
}
