use super::{decode, encode, id_of, list_query};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use crate::usecases::PlanningService;
use serde_json::Value;
use std::sync::Arc;

const PATTERNS: &[&str] = &[
    "get_all_events",
    "get_event",
    "create_event",
    "update_event",
    "delete_event",
    "get_all_time_logs",
    "get_time_log",
    "create_time_log",
    "update_time_log",
    "delete_time_log",
    "get_project_hours",
];

pub struct PlanningController {
    service: Arc<PlanningService>,
}

impl PlanningController {
    pub fn new(service: Arc<PlanningService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl MessageHandler for PlanningController {
    fn service(&self) -> &'static str {
        "planning"
    }

    fn patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let svc = &self.service;
        match cmd {
            "get_all_events" => encode(&svc.get_all_events(&list_query(data)?).await?),
            "get_event" => encode(&svc.get_event(id_of(data)?).await?),
            "create_event" => encode(&svc.create_event(&decode(data)?).await?),
            "update_event" => encode(&svc.update_event(&decode(data)?).await?),
            "delete_event" => encode(&svc.delete_event(id_of(data)?).await?),

            "get_all_time_logs" => encode(&svc.get_all_time_logs(&list_query(data)?).await?),
            "get_time_log" => encode(&svc.get_time_log(id_of(data)?).await?),
            "create_time_log" => encode(&svc.create_time_log(&decode(data)?).await?),
            "update_time_log" => encode(&svc.update_time_log(&decode(data)?).await?),
            "delete_time_log" => encode(&svc.delete_time_log(id_of(data)?).await?),

            "get_project_hours" => encode(&svc.get_project_hours(&decode(data)?).await?),

            other => Err(DomainError::UnknownPattern(other.to_string())),
        }
    }
}
