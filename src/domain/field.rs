use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Submission fields, declared in canonical order.
///
/// The derived `Ord` follows declaration order, and [`Field::ALL`] lists the
/// same order explicitly. Error tokens are always reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    PaymentMethodNonce,
    Name,
    EmailAddress,
    OnMailingList,
    PromotionLogo,
    PromotionName,
    PromotionUrl,
    PromotionTwitter,
    PromotionMessage,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Amount,
        Field::PaymentMethodNonce,
        Field::Name,
        Field::EmailAddress,
        Field::OnMailingList,
        Field::PromotionLogo,
        Field::PromotionName,
        Field::PromotionUrl,
        Field::PromotionTwitter,
        Field::PromotionMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::PaymentMethodNonce => "payment_method_nonce",
            Self::Name => "name",
            Self::EmailAddress => "email_address",
            Self::OnMailingList => "on_mailing_list",
            Self::PromotionLogo => "promotion_logo",
            Self::PromotionName => "promotion_name",
            Self::PromotionUrl => "promotion_url",
            Self::PromotionTwitter => "promotion_twitter",
            Self::PromotionMessage => "promotion_message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Field {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// Validation rule for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits only, at least `min` whole dollars.
    Amount { min: u64 },
    /// At most `max` characters; scrubbed to empty.
    Secret { max: usize },
    /// At most `max` characters; truncated.
    Text { max: usize },
    /// One of `allowed`; replaced with `fallback`.
    Choice {
        allowed: &'static [&'static str],
        fallback: &'static str,
    },
    /// Delegated to image intake; dropped when rejected.
    Image,
}

/// One row of the intake schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    /// Absence of the key is a structural fault rather than a field error.
    pub required: bool,
}
