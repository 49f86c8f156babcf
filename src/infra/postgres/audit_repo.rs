use {
    crate::domain::audit::NewAuditEntry, crate::domain::error::PipelineError,
    crate::domain::id::PaymentId,
};

pub async fn insert_audit_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &NewAuditEntry,
) -> Result<(), PipelineError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, entity_type, entity_id, action, actor, detail)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.entity_type)
    .bind(entry.entity_id.as_uuid())
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(&entry.detail)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Audit actions recorded for one payment, oldest first.
pub async fn audit_actions(
    pool: &sqlx::PgPool,
    entity_id: PaymentId,
) -> Result<Vec<(String, serde_json::Value)>, PipelineError> {
    let rows = sqlx::query_as::<_, (String, serde_json::Value)>(
        "SELECT action, detail FROM audit_log WHERE entity_id = $1 ORDER BY created_at",
    )
    .bind(entity_id.as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
