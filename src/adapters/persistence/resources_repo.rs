//! ResourceRepo over SQLite: staff, materials and vehicles.

use super::filter::SqlFilter;
use super::rows::{self, Record, SqlValue, now};
use super::sqlite_repo::{SqliteRepo, execute, find_in};
use crate::domain::dto::{
    MaterialPatch, NewMaterial, NewStaff, NewVehicle, StaffPatch, StockAdjustment,
    VehicleAssignment, VehiclePatch,
};
use crate::domain::{
    DomainError, EntityId, ListQuery, Material, Page, PageRequest, Staff, Vehicle,
};
use crate::ports::ResourceRepo;
use libsql::Row;
use tracing::{info, warn};

/// Shortfall below zero still treated as an empty stock. Fractional deltas
/// such as `0.3 - 0.1 - 0.1 - 0.1` land a hair under zero in binary floats.
const STOCK_TOLERANCE: f64 = 1e-9;

/// Stored stock is rounded to this many decimals.
const STOCK_DECIMALS: i64 = 6;

impl Record for Staff {
    const ENTITY: &'static str = "staff";
    const TABLE: &'static str = "staff";
    const COLUMNS: &'static str = "id, first_name, last_name, role, email, phone, \
        hourly_rate, active, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            first_name: rows::text(row, 1)?,
            last_name: rows::text(row, 2)?,
            role: rows::opt_text(row, 3)?,
            email: rows::opt_text(row, 4)?,
            phone: rows::opt_text(row, 5)?,
            hourly_rate: rows::opt_real(row, 6)?,
            active: rows::boolean(row, 7)?,
            created_at: rows::timestamp(row, 8)?,
            updated_at: rows::timestamp(row, 9)?,
        })
    }
}

impl Record for Material {
    const ENTITY: &'static str = "material";
    const TABLE: &'static str = "materials";
    const COLUMNS: &'static str =
        "id, name, unit, unit_price, stock, supplier, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            name: rows::text(row, 1)?,
            unit: rows::text(row, 2)?,
            unit_price: rows::opt_real(row, 3)?,
            stock: rows::real(row, 4)?,
            supplier: rows::opt_text(row, 5)?,
            created_at: rows::timestamp(row, 6)?,
            updated_at: rows::timestamp(row, 7)?,
        })
    }
}

impl Record for Vehicle {
    const ENTITY: &'static str = "vehicle";
    const TABLE: &'static str = "vehicles";
    const COLUMNS: &'static str =
        "id, name, plate_number, model, assigned_staff_id, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            name: rows::text(row, 1)?,
            plate_number: rows::text(row, 2)?,
            model: rows::opt_text(row, 3)?,
            assigned_staff_id: rows::opt_int(row, 4)?,
            created_at: rows::timestamp(row, 5)?,
            updated_at: rows::timestamp(row, 6)?,
        })
    }
}

/// `status=active|inactive` filters staff by their active flag.
fn staff_active_filter(status: Option<&str>) -> Option<bool> {
    match status? {
        "active" => Some(true),
        "inactive" => Some(false),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ResourceRepo for SqliteRepo {
    async fn list_staff(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Staff>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("active", staff_active_filter(query.status.as_deref()))
            .search(
                &["first_name", "last_name", "role", "email", "phone"],
                query.search_term(),
            );
        self.list_page(&filter, "id", page).await
    }

    async fn get_staff(&self, id: EntityId) -> Result<Option<Staff>, DomainError> {
        self.find(id).await
    }

    async fn create_staff(&self, dto: &NewStaff) -> Result<Staff, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO staff (first_name, last_name, role, email, phone, hourly_rate,
                active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            vec![
                dto.first_name.sql(),
                dto.last_name.sql(),
                dto.role.sql(),
                dto.email.sql(),
                dto.phone.sql(),
                dto.hourly_rate.sql(),
                dto.active.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_staff(&self, patch: &StaffPatch) -> Result<Option<Staff>, DomainError> {
        self.update_row(
            r#"
            UPDATE staff SET
                first_name = COALESCE(?2, first_name),
                last_name = COALESCE(?3, last_name),
                role = COALESCE(?4, role),
                email = COALESCE(?5, email),
                phone = COALESCE(?6, phone),
                hourly_rate = COALESCE(?7, hourly_rate),
                active = COALESCE(?8, active),
                updated_at = ?9
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.first_name.sql(),
                patch.last_name.sql(),
                patch.role.sql(),
                patch.email.sql(),
                patch.phone.sql(),
                patch.hourly_rate.sql(),
                patch.active.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_staff(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Staff>(id).await
    }

    async fn list_materials(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Material>, DomainError> {
        let mut filter = SqlFilter::new();
        filter.search(&["name", "unit", "supplier"], query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_material(&self, id: EntityId) -> Result<Option<Material>, DomainError> {
        self.find(id).await
    }

    async fn create_material(&self, dto: &NewMaterial) -> Result<Material, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO materials (name, unit, unit_price, stock, supplier, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            vec![
                dto.name.sql(),
                dto.unit.sql(),
                dto.unit_price.sql(),
                dto.stock.sql(),
                dto.supplier.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_material(
        &self,
        patch: &MaterialPatch,
    ) -> Result<Option<Material>, DomainError> {
        self.update_row(
            r#"
            UPDATE materials SET
                name = COALESCE(?2, name),
                unit = COALESCE(?3, unit),
                unit_price = COALESCE(?4, unit_price),
                stock = COALESCE(?5, stock),
                supplier = COALESCE(?6, supplier),
                updated_at = ?7
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.name.sql(),
                patch.unit.sql(),
                patch.unit_price.sql(),
                patch.stock.sql(),
                patch.supplier.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_material(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Material>(id).await
    }

    async fn adjust_material_stock(
        &self,
        adjustment: &StockAdjustment,
    ) -> Result<Option<Material>, DomainError> {
        let conn = self.conn().await?;
        // Guarded single statement: the check and the write cannot interleave.
        let affected = execute(
            &conn,
            "UPDATE materials
                SET stock = MAX(ROUND(stock + ?2, ?5), 0.0), updated_at = ?3
              WHERE id = ?1 AND stock + ?2 >= -?4",
            vec![
                adjustment.id.sql(),
                adjustment.delta.sql(),
                now(),
                STOCK_TOLERANCE.sql(),
                STOCK_DECIMALS.sql(),
            ],
        )
        .await?;
        if affected > 0 {
            let material = find_in::<Material>(&conn, adjustment.id).await?;
            if let Some(m) = &material {
                info!(
                    material_id = m.id,
                    delta = adjustment.delta,
                    stock = m.stock,
                    "stock adjusted"
                );
            }
            return Ok(material);
        }

        match find_in::<Material>(&conn, adjustment.id).await? {
            None => Ok(None),
            Some(current) => {
                warn!(
                    material_id = current.id,
                    stock = current.stock,
                    delta = adjustment.delta,
                    "stock adjustment rejected"
                );
                Err(DomainError::Validation(format!(
                    "insufficient stock for material {}: have {}, requested {}",
                    current.id, current.stock, -adjustment.delta
                )))
            }
        }
    }

    async fn list_vehicles(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Vehicle>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("assigned_staff_id", query.staff_id)
            .search(&["name", "plate_number", "model"], query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_vehicle(&self, id: EntityId) -> Result<Option<Vehicle>, DomainError> {
        self.find(id).await
    }

    async fn create_vehicle(&self, dto: &NewVehicle) -> Result<Vehicle, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO vehicles (name, plate_number, model, assigned_staff_id, created_at,
                updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            vec![
                dto.name.sql(),
                dto.plate_number.trim().sql(),
                dto.model.sql(),
                dto.assigned_staff_id.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_vehicle(&self, patch: &VehiclePatch) -> Result<Option<Vehicle>, DomainError> {
        self.update_row(
            r#"
            UPDATE vehicles SET
                name = COALESCE(?2, name),
                plate_number = COALESCE(?3, plate_number),
                model = COALESCE(?4, model),
                updated_at = ?5
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.name.sql(),
                patch.plate_number.as_deref().map(str::trim).sql(),
                patch.model.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_vehicle(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Vehicle>(id).await
    }

    async fn assign_vehicle(
        &self,
        assignment: &VehicleAssignment,
    ) -> Result<Option<Vehicle>, DomainError> {
        // A null staff id is written as NULL and unassigns the vehicle.
        self.update_row(
            "UPDATE vehicles SET assigned_staff_id = ?2, updated_at = ?3 WHERE id = ?1",
            vec![assignment.id.sql(), assignment.staff_id.sql(), now()],
            assignment.id,
        )
        .await
    }
}
