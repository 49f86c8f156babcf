use {
    super::error::PipelineError,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// A donation in whole US dollars. Always representable in cents as `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DonationAmount(i64);

impl DonationAmount {
    pub fn from_dollars(dollars: u64) -> Result<Self, PipelineError> {
        let dollars = i64::try_from(dollars)
            .ok()
            .filter(|d| d.checked_mul(100).is_some())
            .ok_or_else(|| {
                PipelineError::Validation(format!("DonationAmount out of range: {dollars}"))
            })?;
        Ok(Self(dollars))
    }

    pub fn dollars(&self) -> i64 {
        self.0
    }

    pub fn cents(&self) -> i64 {
        // Bounded in from_dollars.
        self.0 * 100
    }
}

impl TryFrom<i64> for DonationAmount {
    type Error = PipelineError;

    fn try_from(dollars: i64) -> Result<Self, Self::Error> {
        let dollars = u64::try_from(dollars).map_err(|_| {
            PipelineError::Validation(format!("DonationAmount cannot be negative, got: {dollars}"))
        })?;
        Self::from_dollars(dollars)
    }
}

impl From<DonationAmount> for i64 {
    fn from(amount: DonationAmount) -> i64 {
        amount.0
    }
}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for DonationAmount {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PipelineError::Validation(format!(
                "amount must be whole dollars, got: {s:?}"
            )));
        }
        let dollars = s
            .parse::<u64>()
            .map_err(|_| PipelineError::Validation(format!("amount out of range: {s}")))?;
        Self::from_dollars(dollars)
    }
}
