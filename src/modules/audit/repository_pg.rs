use crate::{
    api::error,
    modules::audit::{
        model::{LogFilter, NewLogEntry},
        repository::AuditRepository,
        schema::LogEntryRow,
    },
};

#[derive(Clone)]
pub struct AuditRepositoryPg {
    pool: sqlx::PgPool,
}

impl AuditRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn search_pattern(term: &str) -> String {
    format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"))
}

#[async_trait::async_trait]
impl AuditRepository for AuditRepositoryPg {
    async fn insert(&self, entry: &NewLogEntry) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO logs (user_id, ip, action, details, category, resource_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.ip)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(entry.category)
        .bind(entry.resource_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &LogFilter,
    ) -> Result<(Vec<LogEntryRow>, i64), error::SystemError> {
        let pattern = filter.search.as_deref().map(search_pattern);

        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::log_category IS NULL OR l.category = $1)
              AND ($2::bigint IS NULL OR l.user_id = $2)
              AND ($3::timestamptz IS NULL OR l.created_at >= $3)
              AND ($4::timestamptz IS NULL OR l.created_at <= $4)
              AND ($5::text IS NULL
                   OR l.action ILIKE $5
                   OR l.details ILIKE $5
                   OR l.ip ILIKE $5
                   OR u.username ILIKE $5)
            "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM logs l LEFT JOIN users u ON u.id = l.user_id {WHERE_CLAUSE}"
        ))
        .bind(filter.category)
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        // sort_column comes from the service's whitelist, never from input.
        let rows = sqlx::query_as::<_, LogEntryRow>(&format!(
            r#"
            SELECT l.id, l.user_id, u.username, l.ip, l.action, l.details,
                   l.category, l.resource_id, l.created_at
            FROM logs l LEFT JOIN users u ON u.id = l.user_id
            {WHERE_CLAUSE}
            ORDER BY {} {}
            LIMIT $6 OFFSET $7
            "#,
            filter.sort_column,
            if filter.ascending { "ASC" } else { "DESC" },
        ))
        .bind(filter.category)
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(pattern.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
