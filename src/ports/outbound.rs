//! Outbound ports. Application calls into infrastructure.
//!
//! One repository trait per microservice; all are implemented by the SQLite adapter.
//! `get_*` returns `Ok(None)` for a missing row, `update_*` returns `Ok(None)` when
//! no row matched, `delete_*` returns whether a row was removed.

use crate::domain::dto::{
    AddressPatch, AddressReassignment, ClientPatch, DocumentPatch, EventPatch, MaterialPatch,
    NewAddress, NewClient, NewDocument, NewEvent, NewMaterial, NewProject, NewStaff, NewStage,
    NewTag, NewTask, NewTimeLog, NewVehicle, PrimaryAddress, ProjectPatch, ProjectTagLink,
    StaffPatch, StagePatch, StockAdjustment, TagPatch, TaskPatch, TimeLogPatch,
    VehicleAssignment, VehiclePatch,
};
use crate::domain::{
    Address, Client, ClientDetail, Document, DomainError, EntityId, Event, ListQuery, Material,
    Page, PageRequest, Project, ProjectDetail, ProjectHours, Staff, Stage, Tag, Task, TimeLog,
    Vehicle,
};

/// Clients and their addresses.
#[async_trait::async_trait]
pub trait ClientRepo: Send + Sync {
    async fn list_clients(&self, query: &ListQuery, page: PageRequest)
    -> Result<Page<Client>, DomainError>;
    async fn get_client(&self, id: EntityId) -> Result<Option<ClientDetail>, DomainError>;
    /// Inserts the client and its inline addresses in one transaction.
    async fn create_client(&self, dto: &NewClient) -> Result<ClientDetail, DomainError>;
    async fn update_client(&self, patch: &ClientPatch) -> Result<Option<Client>, DomainError>;
    async fn delete_client(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_addresses(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Address>, DomainError>;
    async fn get_address(&self, id: EntityId) -> Result<Option<Address>, DomainError>;
    async fn create_address(&self, dto: &NewAddress) -> Result<Address, DomainError>;
    async fn update_address(&self, patch: &AddressPatch) -> Result<Option<Address>, DomainError>;
    async fn delete_address(&self, id: EntityId) -> Result<bool, DomainError>;

    /// Makes the address the client's only primary one. `Ok(None)` when the
    /// address does not belong to the client.
    async fn set_primary_address(&self, req: &PrimaryAddress)
    -> Result<Option<Address>, DomainError>;
    /// Moves the address to another client atomically. `Ok(None)` when either
    /// side does not exist.
    async fn reassign_address(
        &self,
        req: &AddressReassignment,
    ) -> Result<Option<Address>, DomainError>;
}

/// Projects, stages, tasks and tags.
#[async_trait::async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn list_projects(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Project>, DomainError>;
    async fn get_project(&self, id: EntityId) -> Result<Option<ProjectDetail>, DomainError>;
    async fn create_project(&self, dto: &NewProject) -> Result<Project, DomainError>;
    async fn update_project(&self, patch: &ProjectPatch) -> Result<Option<Project>, DomainError>;
    async fn delete_project(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_stages(&self, query: &ListQuery, page: PageRequest)
    -> Result<Page<Stage>, DomainError>;
    async fn get_stage(&self, id: EntityId) -> Result<Option<Stage>, DomainError>;
    async fn create_stage(&self, dto: &NewStage) -> Result<Stage, DomainError>;
    async fn update_stage(&self, patch: &StagePatch) -> Result<Option<Stage>, DomainError>;
    async fn delete_stage(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_tasks(&self, query: &ListQuery, page: PageRequest)
    -> Result<Page<Task>, DomainError>;
    async fn get_task(&self, id: EntityId) -> Result<Option<Task>, DomainError>;
    async fn create_task(&self, dto: &NewTask) -> Result<Task, DomainError>;
    async fn update_task(&self, patch: &TaskPatch) -> Result<Option<Task>, DomainError>;
    async fn delete_task(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_tags(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Tag>, DomainError>;
    async fn get_tag(&self, id: EntityId) -> Result<Option<Tag>, DomainError>;
    async fn create_tag(&self, dto: &NewTag) -> Result<Tag, DomainError>;
    async fn update_tag(&self, patch: &TagPatch) -> Result<Option<Tag>, DomainError>;
    async fn delete_tag(&self, id: EntityId) -> Result<bool, DomainError>;

    /// Links a tag to a project. Linking twice is a no-op.
    async fn add_project_tag(&self, link: &ProjectTagLink) -> Result<(), DomainError>;
    /// Returns whether a link was removed.
    async fn remove_project_tag(&self, link: &ProjectTagLink) -> Result<bool, DomainError>;
}

/// Staff, materials and vehicles.
#[async_trait::async_trait]
pub trait ResourceRepo: Send + Sync {
    async fn list_staff(&self, query: &ListQuery, page: PageRequest)
    -> Result<Page<Staff>, DomainError>;
    async fn get_staff(&self, id: EntityId) -> Result<Option<Staff>, DomainError>;
    async fn create_staff(&self, dto: &NewStaff) -> Result<Staff, DomainError>;
    async fn update_staff(&self, patch: &StaffPatch) -> Result<Option<Staff>, DomainError>;
    async fn delete_staff(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_materials(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Material>, DomainError>;
    async fn get_material(&self, id: EntityId) -> Result<Option<Material>, DomainError>;
    async fn create_material(&self, dto: &NewMaterial) -> Result<Material, DomainError>;
    async fn update_material(&self, patch: &MaterialPatch)
    -> Result<Option<Material>, DomainError>;
    async fn delete_material(&self, id: EntityId) -> Result<bool, DomainError>;
    /// Applies the delta atomically. Fails with `Validation` if stock would go negative.
    async fn adjust_material_stock(
        &self,
        adjustment: &StockAdjustment,
    ) -> Result<Option<Material>, DomainError>;

    async fn list_vehicles(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Vehicle>, DomainError>;
    async fn get_vehicle(&self, id: EntityId) -> Result<Option<Vehicle>, DomainError>;
    async fn create_vehicle(&self, dto: &NewVehicle) -> Result<Vehicle, DomainError>;
    async fn update_vehicle(&self, patch: &VehiclePatch) -> Result<Option<Vehicle>, DomainError>;
    async fn delete_vehicle(&self, id: EntityId) -> Result<bool, DomainError>;
    async fn assign_vehicle(
        &self,
        assignment: &VehicleAssignment,
    ) -> Result<Option<Vehicle>, DomainError>;
}

/// Calendar events and time logs.
#[async_trait::async_trait]
pub trait PlanningRepo: Send + Sync {
    async fn list_events(&self, query: &ListQuery, page: PageRequest)
    -> Result<Page<Event>, DomainError>;
    async fn get_event(&self, id: EntityId) -> Result<Option<Event>, DomainError>;
    async fn create_event(&self, dto: &NewEvent) -> Result<Event, DomainError>;
    async fn update_event(&self, patch: &EventPatch) -> Result<Option<Event>, DomainError>;
    async fn delete_event(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list_time_logs(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<TimeLog>, DomainError>;
    async fn get_time_log(&self, id: EntityId) -> Result<Option<TimeLog>, DomainError>;
    async fn create_time_log(&self, dto: &NewTimeLog) -> Result<TimeLog, DomainError>;
    async fn update_time_log(&self, patch: &TimeLogPatch) -> Result<Option<TimeLog>, DomainError>;
    async fn delete_time_log(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn project_hours(&self, project_id: EntityId) -> Result<ProjectHours, DomainError>;
}

/// Quotes, invoices, contracts and other files.
#[async_trait::async_trait]
pub trait DocumentRepo: Send + Sync {
    async fn list_documents(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Document>, DomainError>;
    async fn get_document(&self, id: EntityId) -> Result<Option<Document>, DomainError>;
    async fn create_document(&self, dto: &NewDocument) -> Result<Document, DomainError>;
    async fn update_document(&self, patch: &DocumentPatch) -> Result<Option<Document>, DomainError>;
    async fn delete_document(&self, id: EntityId) -> Result<bool, DomainError>;
}
