use super::{decode, encode, id_of, list_query};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use crate::usecases::ProjectService;
use serde_json::Value;
use std::sync::Arc;

const PATTERNS: &[&str] = &[
    "get_all_projects",
    "get_project",
    "create_project",
    "update_project",
    "delete_project",
    "get_all_stages",
    "get_stage",
    "create_stage",
    "update_stage",
    "delete_stage",
    "get_all_tasks",
    "get_task",
    "create_task",
    "update_task",
    "delete_task",
    "get_all_tags",
    "get_tag",
    "create_tag",
    "update_tag",
    "delete_tag",
    "add_project_tag",
    "remove_project_tag",
];

pub struct ProjectController {
    service: Arc<ProjectService>,
}

impl ProjectController {
    pub fn new(service: Arc<ProjectService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl MessageHandler for ProjectController {
    fn service(&self) -> &'static str {
        "projects"
    }

    fn patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let svc = &self.service;
        match cmd {
            "get_all_projects" => encode(&svc.get_all_projects(&list_query(data)?).await?),
            "get_project" => encode(&svc.get_project(id_of(data)?).await?),
            "create_project" => encode(&svc.create_project(&decode(data)?).await?),
            "update_project" => encode(&svc.update_project(&decode(data)?).await?),
            "delete_project" => encode(&svc.delete_project(id_of(data)?).await?),

            "get_all_stages" => encode(&svc.get_all_stages(&list_query(data)?).await?),
            "get_stage" => encode(&svc.get_stage(id_of(data)?).await?),
            "create_stage" => encode(&svc.create_stage(&decode(data)?).await?),
            "update_stage" => encode(&svc.update_stage(&decode(data)?).await?),
            "delete_stage" => encode(&svc.delete_stage(id_of(data)?).await?),

            "get_all_tasks" => encode(&svc.get_all_tasks(&list_query(data)?).await?),
            "get_task" => encode(&svc.get_task(id_of(data)?).await?),
            "create_task" => encode(&svc.create_task(&decode(data)?).await?),
            "update_task" => encode(&svc.update_task(&decode(data)?).await?),
            "delete_task" => encode(&svc.delete_task(id_of(data)?).await?),

            "get_all_tags" => encode(&svc.get_all_tags(&list_query(data)?).await?),
            "get_tag" => encode(&svc.get_tag(id_of(data)?).await?),
            "create_tag" => encode(&svc.create_tag(&decode(data)?).await?),
            "update_tag" => encode(&svc.update_tag(&decode(data)?).await?),
            "delete_tag" => encode(&svc.delete_tag(id_of(data)?).await?),
            "add_project_tag" => encode(&svc.add_project_tag(&decode(data)?).await?),
            "remove_project_tag" => encode(&svc.remove_project_tag(&decode(data)?).await?),

            other => Err(DomainError::UnknownPattern(other.to_string())),
        }
    }
}
