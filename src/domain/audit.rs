use {super::id::PaymentId, uuid::Uuid};

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: PaymentId,
    pub action: String,
    pub actor: String,
    pub detail: serde_json::Value,
}
