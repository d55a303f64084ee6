//! Resource service. Staff, materials with stock levels, and vehicles.

use super::{PageLimits, deleted, found};
use crate::domain::dto::{
    MaterialPatch, NewMaterial, NewStaff, NewVehicle, StaffPatch, StockAdjustment,
    VehicleAssignment, VehiclePatch,
};
use crate::domain::{DomainError, EntityId, ListQuery, Material, Page, Staff, Vehicle};
use crate::ports::ResourceRepo;
use std::sync::Arc;
use tracing::info;

pub struct ResourceService {
    repo: Arc<dyn ResourceRepo>,
    limits: PageLimits,
}

impl ResourceService {
    pub fn new(repo: Arc<dyn ResourceRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    pub async fn get_all_staff(&self, query: &ListQuery) -> Result<Page<Staff>, DomainError> {
        self.repo.list_staff(query, self.limits.request(query)).await
    }

    pub async fn get_staff(&self, id: EntityId) -> Result<Staff, DomainError> {
        found("staff", id, self.repo.get_staff(id).await?)
    }

    pub async fn create_staff(&self, dto: &NewStaff) -> Result<Staff, DomainError> {
        dto.validate()?;
        let staff = self.repo.create_staff(dto).await?;
        info!(staff_id = staff.id, name = %staff.full_name(), "staff created");
        Ok(staff)
    }

    pub async fn update_staff(&self, patch: &StaffPatch) -> Result<Staff, DomainError> {
        patch.validate()?;
        found("staff", patch.id, self.repo.update_staff(patch).await?)
    }

    pub async fn delete_staff(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("staff", id, self.repo.delete_staff(id).await))
    }

    pub async fn get_all_materials(
        &self,
        query: &ListQuery,
    ) -> Result<Page<Material>, DomainError> {
        self.repo
            .list_materials(query, self.limits.request(query))
            .await
    }

    pub async fn get_material(&self, id: EntityId) -> Result<Material, DomainError> {
        found("material", id, self.repo.get_material(id).await?)
    }

    pub async fn create_material(&self, dto: &NewMaterial) -> Result<Material, DomainError> {
        dto.validate()?;
        self.repo.create_material(dto).await
    }

    pub async fn update_material(&self, patch: &MaterialPatch) -> Result<Material, DomainError> {
        patch.validate()?;
        found("material", patch.id, self.repo.update_material(patch).await?)
    }

    pub async fn delete_material(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("material", id, self.repo.delete_material(id).await))
    }

    /// Adds `delta` (negative to consume) to the stock. Stock never drops below zero.
    pub async fn adjust_material_stock(
        &self,
        adjustment: &StockAdjustment,
    ) -> Result<Material, DomainError> {
        if !adjustment.delta.is_finite() {
            return Err(DomainError::Validation("delta must be a finite number".into()));
        }
        found(
            "material",
            adjustment.id,
            self.repo.adjust_material_stock(adjustment).await?,
        )
    }

    pub async fn get_all_vehicles(&self, query: &ListQuery) -> Result<Page<Vehicle>, DomainError> {
        self.repo
            .list_vehicles(query, self.limits.request(query))
            .await
    }

    pub async fn get_vehicle(&self, id: EntityId) -> Result<Vehicle, DomainError> {
        found("vehicle", id, self.repo.get_vehicle(id).await?)
    }

    pub async fn create_vehicle(&self, dto: &NewVehicle) -> Result<Vehicle, DomainError> {
        dto.validate()?;
        if let Some(staff_id) = dto.assigned_staff_id {
            self.get_staff(staff_id).await?;
        }
        self.repo.create_vehicle(dto).await
    }

    pub async fn update_vehicle(&self, patch: &VehiclePatch) -> Result<Vehicle, DomainError> {
        patch.validate()?;
        found("vehicle", patch.id, self.repo.update_vehicle(patch).await?)
    }

    pub async fn delete_vehicle(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("vehicle", id, self.repo.delete_vehicle(id).await))
    }

    /// Assigns the vehicle to a staff member, or unassigns it when `staff_id` is null.
    pub async fn assign_vehicle(
        &self,
        assignment: &VehicleAssignment,
    ) -> Result<Vehicle, DomainError> {
        if let Some(staff_id) = assignment.staff_id {
            self.get_staff(staff_id).await?;
        }
        let vehicle = found(
            "vehicle",
            assignment.id,
            self.repo.assign_vehicle(assignment).await?,
        )?;
        info!(vehicle_id = vehicle.id, staff_id = ?vehicle.assigned_staff_id, "vehicle assigned");
        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_repo::test_support::repo;
    use tempfile::TempDir;

    async fn service() -> (ResourceService, TempDir) {
        let (repo, dir) = repo().await;
        (ResourceService::new(Arc::new(repo), PageLimits::default()), dir)
    }

    #[tokio::test]
    async fn stock_adjustment_errors() {
        let (svc, _dir) = service().await;
        let err = svc
            .adjust_material_stock(&StockAdjustment { id: 1, delta: 2.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "material", .. }));

        let sand = svc
            .create_material(&NewMaterial {
                name: "Sand".into(),
                unit: "kg".into(),
                stock: 5.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let err = svc
            .adjust_material_stock(&StockAdjustment {
                id: sand.id,
                delta: -5.5,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let emptied = svc
            .adjust_material_stock(&StockAdjustment {
                id: sand.id,
                delta: -5.0,
            })
            .await
            .unwrap();
        assert_eq!(emptied.stock, 0.0);
    }

    #[tokio::test]
    async fn assigning_to_unknown_staff_is_not_found() {
        let (svc, _dir) = service().await;
        let van = svc
            .create_vehicle(&NewVehicle {
                name: "Van".into(),
                plate_number: "QW-1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let err = svc
            .assign_vehicle(&VehicleAssignment {
                id: van.id,
                staff_id: Some(404),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "staff", id: 404 }));
        assert_eq!(svc.get_vehicle(van.id).await.unwrap().assigned_staff_id, None);
    }

    #[tokio::test]
    async fn staff_update_keeps_other_fields() {
        let (svc, _dir) = service().await;
        let created = svc
            .create_staff(&NewStaff {
                first_name: "Eva".into(),
                last_name: "Lund".into(),
                hourly_rate: Some(42.0),
                ..Default::default()
            })
            .await
            .unwrap();
        let updated = svc
            .update_staff(&StaffPatch {
                id: created.id,
                role: Some("Foreman".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.hourly_rate, Some(42.0));
        assert_eq!(updated.last_name, "Lund");
        assert_eq!(updated.role.as_deref(), Some("Foreman"));
    }
}
