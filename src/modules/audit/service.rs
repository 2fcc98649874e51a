use std::sync::Arc;

use crate::api::error;
use crate::modules::audit::{
    model::{LogFilter, LogPage, LogQueryModel, NewLogEntry},
    repository::AuditRepository,
    schema::LogCategory,
};
use crate::modules::policy::{self, Action, Actor, DenyReason, PolicyContext, Resource};
use crate::utils::ClientMeta;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditRepository + Send + Sync>,
}

impl AuditService {
    pub fn with_dependencies(repo: Arc<dyn AuditRepository + Send + Sync>) -> Self {
        AuditService { repo }
    }

    /// Append an entry. A failed write must never fail the operation that
    /// produced the event, so the error only reaches the operational log.
    pub async fn append(&self, entry: NewLogEntry) {
        if let Err(e) = self.repo.insert(&entry).await {
            log::error!("Audit append failed for action '{}': {:?}", entry.action, e);
        }
    }

    /// Record a security-boundary denial (permission, traversal, maintenance).
    pub async fn denied(
        &self,
        actor: Option<&Actor>,
        meta: &ClientMeta,
        action: &str,
        resource_id: Option<i64>,
        reason: DenyReason,
    ) {
        let mut entry = NewLogEntry::new(LogCategory::Security, action, &meta.ip)
            .details(format!("denied: {}", reason.message()));
        if let Some(actor) = actor {
            entry = entry.user(actor.id);
        }
        if let Some(id) = resource_id {
            entry = entry.resource(id);
        }
        self.append(entry).await;
    }

    /// Admin-only ledger query with pagination, filters and free-text search.
    pub async fn query_for(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        model: LogQueryModel,
    ) -> Result<LogPage, error::SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::Logs, Action::ViewLogs).require()
        {
            self.denied(Some(actor), meta, "logs_query", None, reason).await;
            return Err(reason.into_error());
        }

        let (filter, page, page_size) = build_filter(model)?;
        let (entries, total) = self.repo.query(&filter).await?;
        Ok(LogPage { entries, total, page, page_size })
    }
}

fn sort_column(name: &str) -> Option<&'static str> {
    match name {
        "timestamp" => Some("l.created_at"),
        "action" => Some("l.action"),
        "category" => Some("l.category"),
        "username" => Some("u.username"),
        "ip" => Some("l.ip"),
        _ => None,
    }
}

fn build_filter(model: LogQueryModel) -> Result<(LogFilter, u32, u32), error::SystemError> {
    let page = model.page.unwrap_or(1).max(1);
    let page_size = model.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let sort_by = model.sort_by.as_deref().unwrap_or("timestamp");
    let sort_column = sort_column(sort_by)
        .ok_or_else(|| error::SystemError::validation(format!("Unknown sort field '{sort_by}'")))?;
    let ascending = match model.sort_order.as_deref() {
        None | Some("desc") => false,
        Some("asc") => true,
        Some(other) => {
            return Err(error::SystemError::validation(format!("Unknown sort order '{other}'")))
        }
    };

    let search = model.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let filter = LogFilter {
        category: model.category,
        user_id: model.user_id,
        from: model.from,
        to: model.to,
        search,
        limit: i64::from(page_size),
        offset: i64::from(page - 1) * i64::from(page_size),
        sort_column,
        ascending,
    };
    Ok((filter, page, page_size))
}
