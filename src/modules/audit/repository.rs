use crate::{
    api::error,
    modules::audit::model::{LogFilter, NewLogEntry},
    modules::audit::schema::LogEntryRow,
};

#[async_trait::async_trait]
pub trait AuditRepository {
    async fn insert(&self, entry: &NewLogEntry) -> Result<(), error::SystemError>;

    /// Returns the matching page together with the unpaged match count.
    async fn query(
        &self,
        filter: &LogFilter,
    ) -> Result<(Vec<LogEntryRow>, i64), error::SystemError>;
}
