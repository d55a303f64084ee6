use super::{decode, encode, id_of, list_query};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use crate::usecases::ResourceService;
use serde_json::Value;
use std::sync::Arc;

const PATTERNS: &[&str] = &[
    "get_all_staff",
    "get_staff",
    "create_staff",
    "update_staff",
    "delete_staff",
    "get_all_materials",
    "get_material",
    "create_material",
    "update_material",
    "delete_material",
    "adjust_material_stock",
    "get_all_vehicles",
    "get_vehicle",
    "create_vehicle",
    "update_vehicle",
    "delete_vehicle",
    "assign_vehicle",
];

pub struct ResourceController {
    service: Arc<ResourceService>,
}

impl ResourceController {
    pub fn new(service: Arc<ResourceService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl MessageHandler for ResourceController {
    fn service(&self) -> &'static str {
        "resources"
    }

    fn patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let svc = &self.service;
        match cmd {
            "get_all_staff" => encode(&svc.get_all_staff(&list_query(data)?).await?),
            "get_staff" => encode(&svc.get_staff(id_of(data)?).await?),
            "create_staff" => encode(&svc.create_staff(&decode(data)?).await?),
            "update_staff" => encode(&svc.update_staff(&decode(data)?).await?),
            "delete_staff" => encode(&svc.delete_staff(id_of(data)?).await?),

            "get_all_materials" => encode(&svc.get_all_materials(&list_query(data)?).await?),
            "get_material" => encode(&svc.get_material(id_of(data)?).await?),
            "create_material" => encode(&svc.create_material(&decode(data)?).await?),
            "update_material" => encode(&svc.update_material(&decode(data)?).await?),
            "delete_material" => encode(&svc.delete_material(id_of(data)?).await?),
            "adjust_material_stock" => {
                encode(&svc.adjust_material_stock(&decode(data)?).await?)
            }

            "get_all_vehicles" => encode(&svc.get_all_vehicles(&list_query(data)?).await?),
            "get_vehicle" => encode(&svc.get_vehicle(id_of(data)?).await?),
            "create_vehicle" => encode(&svc.create_vehicle(&decode(data)?).await?),
            "update_vehicle" => encode(&svc.update_vehicle(&decode(data)?).await?),
            "delete_vehicle" => encode(&svc.delete_vehicle(id_of(data)?).await?),
            "assign_vehicle" => encode(&svc.assign_vehicle(&decode(data)?).await?),

            other => Err(DomainError::UnknownPattern(other.to_string())),
        }
    }
}
