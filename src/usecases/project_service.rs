//! Project service. Projects with their stages, tasks and tags.

use super::{PageLimits, deleted, found};
use crate::domain::dto::{
    NewProject, NewStage, NewTag, NewTask, ProjectPatch, ProjectTagLink, StagePatch, TagPatch,
    TaskPatch, check_date_order,
};
use crate::domain::{
    DomainError, EntityId, ListQuery, Page, Project, ProjectDetail, Stage, Tag, Task,
};
use crate::ports::ProjectRepo;
use std::sync::Arc;
use tracing::info;

pub struct ProjectService {
    repo: Arc<dyn ProjectRepo>,
    limits: PageLimits,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    pub async fn get_all_projects(&self, query: &ListQuery) -> Result<Page<Project>, DomainError> {
        self.repo.list_projects(query, self.limits.request(query)).await
    }

    /// Project with its client, ordered stages (each with tasks) and tags.
    pub async fn get_project(&self, id: EntityId) -> Result<ProjectDetail, DomainError> {
        found("project", id, self.repo.get_project(id).await?)
    }

    pub async fn create_project(&self, dto: &NewProject) -> Result<Project, DomainError> {
        dto.validate()?;
        for &tag_id in &dto.tag_ids {
            self.get_tag(tag_id).await?;
        }
        self.repo.create_project(dto).await
    }

    pub async fn update_project(&self, patch: &ProjectPatch) -> Result<Project, DomainError> {
        patch.validate()?;
        if patch.start_date.is_some() || patch.end_date.is_some() {
            let current = self.get_project(patch.id).await?.project;
            check_date_order(
                patch.start_date.or(current.start_date),
                patch.end_date.or(current.end_date),
            )?;
        }
        found("project", patch.id, self.repo.update_project(patch).await?)
    }

    pub async fn delete_project(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("project", id, self.repo.delete_project(id).await))
    }

    pub async fn get_all_stages(&self, query: &ListQuery) -> Result<Page<Stage>, DomainError> {
        self.repo.list_stages(query, self.limits.request(query)).await
    }

    pub async fn get_stage(&self, id: EntityId) -> Result<Stage, DomainError> {
        found("stage", id, self.repo.get_stage(id).await?)
    }

    /// Without an explicit position the stage goes after the project's last one.
    pub async fn create_stage(&self, dto: &NewStage) -> Result<Stage, DomainError> {
        dto.validate()?;
        self.ensure_project(dto.project_id).await?;
        self.repo.create_stage(dto).await
    }

    pub async fn update_stage(&self, patch: &StagePatch) -> Result<Stage, DomainError> {
        patch.validate()?;
        found("stage", patch.id, self.repo.update_stage(patch).await?)
    }

    pub async fn delete_stage(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("stage", id, self.repo.delete_stage(id).await))
    }

    pub async fn get_all_tasks(&self, query: &ListQuery) -> Result<Page<Task>, DomainError> {
        self.repo.list_tasks(query, self.limits.request(query)).await
    }

    pub async fn get_task(&self, id: EntityId) -> Result<Task, DomainError> {
        found("task", id, self.repo.get_task(id).await?)
    }

    pub async fn create_task(&self, dto: &NewTask) -> Result<Task, DomainError> {
        dto.validate()?;
        self.get_stage(dto.stage_id).await?;
        let task = self.repo.create_task(dto).await?;
        info!(task_id = task.id, stage_id = task.stage_id, "task created");
        Ok(task)
    }

    pub async fn update_task(&self, patch: &TaskPatch) -> Result<Task, DomainError> {
        patch.validate()?;
        if let Some(stage_id) = patch.stage_id {
            self.get_stage(stage_id).await?;
        }
        found("task", patch.id, self.repo.update_task(patch).await?)
    }

    pub async fn delete_task(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("task", id, self.repo.delete_task(id).await))
    }

    pub async fn get_all_tags(&self, query: &ListQuery) -> Result<Page<Tag>, DomainError> {
        self.repo.list_tags(query, self.limits.request(query)).await
    }

    pub async fn get_tag(&self, id: EntityId) -> Result<Tag, DomainError> {
        found("tag", id, self.repo.get_tag(id).await?)
    }

    pub async fn create_tag(&self, dto: &NewTag) -> Result<Tag, DomainError> {
        dto.validate()?;
        self.repo.create_tag(dto).await
    }

    pub async fn update_tag(&self, patch: &TagPatch) -> Result<Tag, DomainError> {
        patch.validate()?;
        found("tag", patch.id, self.repo.update_tag(patch).await?)
    }

    pub async fn delete_tag(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("tag", id, self.repo.delete_tag(id).await))
    }

    /// Links a tag to a project (idempotent) and returns the project's detail.
    pub async fn add_project_tag(
        &self,
        link: &ProjectTagLink,
    ) -> Result<ProjectDetail, DomainError> {
        self.ensure_project(link.project_id).await?;
        self.get_tag(link.tag_id).await?;
        self.repo.add_project_tag(link).await?;
        self.get_project(link.project_id).await
    }

    /// Returns whether a link was removed.
    pub async fn remove_project_tag(&self, link: &ProjectTagLink) -> Result<bool, DomainError> {
        Ok(deleted(
            "project_tag",
            link.project_id,
            self.repo.remove_project_tag(link).await,
        ))
    }

    async fn ensure_project(&self, id: EntityId) -> Result<(), DomainError> {
        found("project", id, self.repo.get_project(id).await?).map(|_| ())
    }
}
