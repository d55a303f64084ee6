//! Application use cases. One service per microservice; each orchestrates
//! validation and repository calls through the outbound ports.

pub mod client_service;
pub mod document_service;
pub mod planning_service;
pub mod project_service;
pub mod resource_service;

pub use client_service::ClientService;
pub use document_service::DocumentService;
pub use planning_service::PlanningService;
pub use project_service::ProjectService;
pub use resource_service::ResourceService;

use crate::domain::dto::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::{DomainError, EntityId, ListQuery, PageRequest};
use tracing::warn;

/// Page size bounds applied to every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    pub fn request(&self, query: &ListQuery) -> PageRequest {
        query.page_request(self.default_size, self.max_size)
    }
}

/// Delete outcome as seen by callers: a store failure is logged and reported as `false`.
pub(crate) fn deleted(
    entity: &'static str,
    id: EntityId,
    result: Result<bool, DomainError>,
) -> bool {
    match result {
        Ok(removed) => removed,
        Err(e) => {
            warn!(entity, id, error = %e, "delete failed");
            false
        }
    }
}

/// `Some` or `NotFound` for the given entity.
pub(crate) fn found<T>(
    entity: &'static str,
    id: EntityId,
    value: Option<T>,
) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::not_found(entity, id))
}
