//! Planning service. Calendar events, time logs and per-project hour totals.

use super::{PageLimits, deleted, found};
use crate::domain::dto::{
    EventPatch, NewEvent, NewTimeLog, ProjectHoursQuery, TimeLogPatch, check_event_window,
};
use crate::domain::{DomainError, EntityId, Event, ListQuery, Page, ProjectHours, TimeLog};
use crate::ports::PlanningRepo;
use std::sync::Arc;

pub struct PlanningService {
    repo: Arc<dyn PlanningRepo>,
    limits: PageLimits,
}

impl PlanningService {
    pub fn new(repo: Arc<dyn PlanningRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    /// Events overlapping the query's `from`/`to` window, earliest first.
    pub async fn get_all_events(&self, query: &ListQuery) -> Result<Page<Event>, DomainError> {
        self.repo.list_events(query, self.limits.request(query)).await
    }

    pub async fn get_event(&self, id: EntityId) -> Result<Event, DomainError> {
        found("event", id, self.repo.get_event(id).await?)
    }

    pub async fn create_event(&self, dto: &NewEvent) -> Result<Event, DomainError> {
        dto.validate()?;
        self.repo.create_event(dto).await
    }

    pub async fn update_event(&self, patch: &EventPatch) -> Result<Event, DomainError> {
        patch.validate()?;
        if patch.starts_at.is_some() || patch.ends_at.is_some() {
            let current = self.get_event(patch.id).await?;
            check_event_window(
                patch.starts_at.unwrap_or(current.starts_at),
                patch.ends_at.unwrap_or(current.ends_at),
            )?;
        }
        found("event", patch.id, self.repo.update_event(patch).await?)
    }

    pub async fn delete_event(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("event", id, self.repo.delete_event(id).await))
    }

    pub async fn get_all_time_logs(&self, query: &ListQuery) -> Result<Page<TimeLog>, DomainError> {
        self.repo
            .list_time_logs(query, self.limits.request(query))
            .await
    }

    pub async fn get_time_log(&self, id: EntityId) -> Result<TimeLog, DomainError> {
        found("time log", id, self.repo.get_time_log(id).await?)
    }

    pub async fn create_time_log(&self, dto: &NewTimeLog) -> Result<TimeLog, DomainError> {
        dto.validate()?;
        self.repo.create_time_log(dto).await
    }

    pub async fn update_time_log(&self, patch: &TimeLogPatch) -> Result<TimeLog, DomainError> {
        patch.validate()?;
        found("time log", patch.id, self.repo.update_time_log(patch).await?)
    }

    pub async fn delete_time_log(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("time log", id, self.repo.delete_time_log(id).await))
    }

    pub async fn get_project_hours(
        &self,
        query: &ProjectHoursQuery,
    ) -> Result<ProjectHours, DomainError> {
        self.repo.project_hours(query.project_id).await
    }
}
