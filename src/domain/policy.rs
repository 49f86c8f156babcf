use super::field::{Field, FieldKind, FieldSpec};

pub const MAILING_LIST_CHOICES: &[&str] = &["yes", "no"];

/// Intake limits. Defaults follow the donation form's documented bounds;
/// deployments may override them through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPolicy {
    pub min_amount: u64,
    pub max_nonce_len: usize,
    pub max_name_len: usize,
    pub max_email_len: usize,
    pub max_promotion_name_len: usize,
    pub max_promotion_url_len: usize,
    pub max_promotion_twitter_len: usize,
    pub max_promotion_message_len: usize,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self {
            min_amount: 10,
            max_nonce_len: 25,
            max_name_len: 255,
            max_email_len: 255,
            max_promotion_name_len: 32,
            max_promotion_url_len: 255,
            max_promotion_twitter_len: 32,
            max_promotion_message_len: 128,
        }
    }
}

impl FieldPolicy {
    /// The intake schema, one spec per field, in canonical order.
    pub fn specs(&self) -> [FieldSpec; 10] {
        let spec = |field, kind| FieldSpec {
            field,
            kind,
            required: field != Field::PromotionLogo,
        };
        [
            spec(Field::Amount, FieldKind::Amount { min: self.min_amount }),
            spec(
                Field::PaymentMethodNonce,
                FieldKind::Secret { max: self.max_nonce_len },
            ),
            spec(Field::Name, FieldKind::Text { max: self.max_name_len }),
            spec(Field::EmailAddress, FieldKind::Text { max: self.max_email_len }),
            spec(
                Field::OnMailingList,
                FieldKind::Choice {
                    allowed: MAILING_LIST_CHOICES,
                    fallback: "yes",
                },
            ),
            spec(Field::PromotionLogo, FieldKind::Image),
            spec(
                Field::PromotionName,
                FieldKind::Text { max: self.max_promotion_name_len },
            ),
            spec(
                Field::PromotionUrl,
                FieldKind::Text { max: self.max_promotion_url_len },
            ),
            spec(
                Field::PromotionTwitter,
                FieldKind::Text { max: self.max_promotion_twitter_len },
            ),
            spec(
                Field::PromotionMessage,
                FieldKind::Text { max: self.max_promotion_message_len },
            ),
        ]
    }
}
