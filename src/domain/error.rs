use {
    super::{donation::SettlementStatus, field::Field, id::PaymentId},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required key was absent from the submission. Not a field error:
    /// the request itself is malformed.
    #[error("Missing key: '{0}'")]
    MissingKey(Field),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("invalid settlement transition: {from} → {to}")]
    InvalidTransition {
        from: SettlementStatus,
        to: SettlementStatus,
    },

    /// Settlement was requested for a payment that is no longer pending.
    #[error("payment {id} is already settled: {status}")]
    AlreadySettled {
        id: PaymentId,
        status: SettlementStatus,
    },

    #[error("payment not found: {0}")]
    NotFound(PaymentId),

    #[error("duplicate payment id: {0}")]
    DuplicatePayment(PaymentId),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("notification: {0}")]
    Notification(String),
}
