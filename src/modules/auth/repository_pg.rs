use crate::{
    api::error,
    modules::auth::{model::NewSession, repository::SessionRepository, schema::SessionUserRow},
};

#[derive(Clone)]
pub struct SessionRepositoryPg {
    pool: sqlx::PgPool,
}

impl SessionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionRepository for SessionRepositoryPg {
    async fn insert(&self, session: &NewSession) -> Result<(), error::SystemError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, ip, user_agent, expires_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(&session.ip)
        .bind(&session.user_agent)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<SessionUserRow>, error::SystemError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            SELECT s.token, s.expires_at,
                   u.id, u.username, u.email, u.password_hash, u.role, u.status,
                   u.is_seed_admin, u.password_changed_at, u.created_at, u.updated_at
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, token: &str) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn delete_for_user(
        &self,
        user_id: i64,
        keep_token: Option<&str>,
    ) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            "DELETE FROM sessions WHERE user_id = $1 AND ($2::text IS NULL OR token <> $2)",
        )
        .bind(user_id)
        .bind(keep_token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }

    async fn touch(&self, token: &str) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE sessions SET last_seen_at = NOW() WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
