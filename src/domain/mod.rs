//! Core domain layer. No external I/O dependencies.
//!
//! Entities, request DTOs and business rules live here. Dependencies flow inward.

pub mod dto;
pub mod entities;
pub mod errors;

pub use dto::{IdPayload, ListQuery, Page, PageRequest};
pub use entities::{
    Address, Client, ClientDetail, Document, DocumentKind, EntityId, Event, Material, Project,
    ProjectDetail, ProjectHours, ProjectStatus, Stage, StageWithTasks, Staff, StaffHours, Tag,
    Task, TaskStatus, TimeLog, Vehicle,
};
pub use errors::DomainError;
