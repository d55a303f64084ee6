//! Request shapes accepted by create/update/list operations.
//!
//! Patch DTOs carry the row id plus optional fields; `None` means "keep the
//! stored value".

use super::entities::{DocumentKind, EntityId, ProjectStatus, TaskStatus};
use super::errors::DomainError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

// ─────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────

/// Search, filter and pagination parameters for `get_all_*` patterns.
///
/// Each repository only honours the filters that make sense for its table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<EntityId>,
    /// Status (projects, tasks) or kind (documents), snake_case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Lower bound, RFC 3339 or `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Upper bound, RFC 3339 or `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ListQuery {
    /// Search term with surrounding whitespace removed; blank terms are `None`.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Normalised pagination window: page >= 1, 1 <= limit <= `max_limit`.
    pub fn page_request(&self, default_limit: u32, max_limit: u32) -> PageRequest {
        let max_limit = max_limit.max(1);
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(default_limit)
            .clamp(1, max_limit);
        PageRequest { page, limit }
    }

    /// Parses `from`/`to` into an inclusive range. Date-only upper bounds
    /// cover the whole day.
    pub fn date_range(&self) -> Result<DateRange, DomainError> {
        Ok(DateRange {
            from: self
                .from
                .as_deref()
                .map(|s| parse_bound(s, false))
                .transpose()?,
            to: self
                .to
                .as_deref()
                .map(|s| parse_bound(s, true))
                .transpose()?,
        })
    }
}

fn parse_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DomainError::Validation(format!("invalid date bound: {raw}")))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time).and_utc())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of a list result. `total` counts every row matching the filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }
}

/// Id payload: either a bare number or `{ "id": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdPayload {
    Bare(EntityId),
    Wrapped { id: EntityId },
}

impl IdPayload {
    pub fn id(self) -> EntityId {
        match self {
            Self::Bare(id) | Self::Wrapped { id } => id,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_optional_text(field: &str, value: Option<&str>) -> Result<(), DomainError> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

fn require_non_negative(field: &str, value: Option<f64>) -> Result<(), DomainError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DomainError::Validation(format!(
            "{field} must be a non-negative number"
        ))),
        _ => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInput {
    pub label: Option<String>,
    pub street: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl AddressInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("street", &self.street)?;
        require_text("city", &self.city)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    /// Addresses inserted together with the client.
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
}

impl NewClient {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        if self.addresses.iter().filter(|a| a.is_primary).count() > 1 {
            return Err(DomainError::Validation(
                "a client can have only one primary address".into(),
            ));
        }
        self.addresses.iter().try_for_each(AddressInput::validate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ClientPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub client_id: EntityId,
    #[serde(flatten)]
    pub address: AddressInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    pub id: EntityId,
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("street", self.street.as_deref())?;
        require_optional_text("city", self.city.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryAddress {
    pub client_id: EntityId,
    pub address_id: EntityId,
}

/// Moves an address to `client_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressReassignment {
    pub address_id: EntityId,
    pub client_id: EntityId,
}

// ─────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub client_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    #[serde(default)]
    pub tag_ids: Vec<EntityId>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_non_negative("budget", self.budget)?;
        check_date_order(self.start_date, self.end_date)
    }
}

pub fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), DomainError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(DomainError::Validation(
            "end_date must not be before start_date".into(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub id: EntityId,
    pub client_id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())?;
        require_non_negative("budget", self.budget)?;
        check_date_order(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStage {
    pub project_id: EntityId,
    pub name: String,
    /// Defaults to the next free position within the project.
    pub position: Option<i64>,
}

impl NewStage {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub position: Option<i64>,
    pub completed: Option<bool>,
}

impl StagePatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub stage_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    pub assignee_id: Option<EntityId>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub id: EntityId,
    pub stage_id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<EntityId>,
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("title", self.title.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
}

impl NewTag {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagPatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TagPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTagLink {
    pub project_id: EntityId,
    pub tag_id: EntityId,
}

// ─────────────────────────────────────────────────────────────────────────
// Resources
// ─────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Default for NewStaff {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            role: None,
            email: None,
            phone: None,
            hourly_rate: None,
            active: true,
        }
    }
}

impl NewStaff {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_non_negative("hourly_rate", self.hourly_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffPatch {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
    pub active: Option<bool>,
}

impl StaffPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("first_name", self.first_name.as_deref())?;
        require_optional_text("last_name", self.last_name.as_deref())?;
        require_non_negative("hourly_rate", self.hourly_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub unit: String,
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub stock: f64,
    pub supplier: Option<String>,
}

impl NewMaterial {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_text("unit", &self.unit)?;
        require_non_negative("unit_price", self.unit_price)?;
        require_non_negative("stock", Some(self.stock))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialPatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub stock: Option<f64>,
    pub supplier: Option<String>,
}

impl MaterialPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())?;
        require_optional_text("unit", self.unit.as_deref())?;
        require_non_negative("unit_price", self.unit_price)?;
        require_non_negative("stock", self.stock)
    }
}

/// Adds `delta` (possibly negative) to a material's stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: EntityId,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub name: String,
    pub plate_number: String,
    pub model: Option<String>,
    pub assigned_staff_id: Option<EntityId>,
}

impl NewVehicle {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_text("plate_number", &self.plate_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub plate_number: Option<String>,
    pub model: Option<String>,
}

impl VehiclePatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("name", self.name.as_deref())?;
        require_optional_text("plate_number", self.plate_number.as_deref())
    }
}

/// `staff_id: null` releases the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAssignment {
    pub id: EntityId,
    #[serde(default)]
    pub staff_id: Option<EntityId>,
}

// ─────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub project_id: Option<EntityId>,
    pub client_id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub kind: DocumentKind,
    pub file_url: Option<String>,
    pub amount: Option<f64>,
    pub issued_on: Option<NaiveDate>,
}

impl NewDocument {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub client_id: Option<EntityId>,
    pub title: Option<String>,
    pub kind: Option<DocumentKind>,
    pub file_url: Option<String>,
    pub amount: Option<f64>,
    pub issued_on: Option<NaiveDate>,
}

impl DocumentPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("title", self.title.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Planning
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: Option<String>,
    pub project_id: Option<EntityId>,
    pub staff_id: Option<EntityId>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title)?;
        check_event_window(self.starts_at, self.ends_at)
    }
}

/// Rejects windows where the end is before the start.
pub fn check_event_window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), DomainError> {
    if ends_at < starts_at {
        return Err(DomainError::Validation(
            "ends_at must not be before starts_at".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub id: EntityId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub project_id: Option<EntityId>,
    pub staff_id: Option<EntityId>,
}

impl EventPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_optional_text("title", self.title.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimeLog {
    pub staff_id: EntityId,
    pub project_id: Option<EntityId>,
    pub task_id: Option<EntityId>,
    pub date: NaiveDate,
    pub hours: f64,
    pub note: Option<String>,
}

impl NewTimeLog {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_hours(self.hours)
    }
}

/// A day has at most 24 working hours; zero-hour logs are meaningless.
pub fn check_hours(hours: f64) -> Result<(), DomainError> {
    if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
        return Err(DomainError::Validation(format!(
            "hours must be in (0, 24], got {hours}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeLogPatch {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub task_id: Option<EntityId>,
    pub date: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub note: Option<String>,
}

impl TimeLogPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        self.hours.map_or(Ok(()), check_hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectHoursQuery {
    pub project_id: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_request_defaults_and_clamps() {
        let q = ListQuery::default();
        assert_eq!(q.page_request(20, 100), PageRequest { page: 1, limit: 20 });

        let q = ListQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        let req = q.page_request(20, 100);
        assert_eq!(req, PageRequest { page: 1, limit: 100 });
        assert_eq!(req.offset(), 0);

        let q = ListQuery {
            page: Some(3),
            limit: Some(0),
            ..Default::default()
        };
        let req = q.page_request(20, 100);
        assert_eq!(req, PageRequest { page: 3, limit: 1 });
        assert_eq!(req.offset(), 2);
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = ListQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_term(), None);

        let q = ListQuery {
            search: Some("  smith ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_term(), Some("smith"));
    }

    #[test]
    fn date_range_accepts_dates_and_timestamps() {
        let q = ListQuery {
            from: Some("2024-03-01".into()),
            to: Some("2024-03-02T10:00:00Z".into()),
            ..Default::default()
        };
        let range = q.date_range().unwrap();
        assert_eq!(range.from.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(range.to.unwrap().to_rfc3339(), "2024-03-02T10:00:00+00:00");

        let q = ListQuery {
            to: Some("2024-03-02".into()),
            ..Default::default()
        };
        let to = q.date_range().unwrap().to.unwrap();
        assert_eq!(to.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!(to.to_rfc3339().starts_with("2024-03-02T23:59:59"));

        let q = ListQuery {
            from: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(q.date_range(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn id_payload_accepts_bare_and_wrapped() {
        let bare: IdPayload = serde_json::from_value(json!(7)).unwrap();
        let wrapped: IdPayload = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(bare.id(), 7);
        assert_eq!(wrapped.id(), 7);
    }

    #[test]
    fn new_client_requires_name_and_single_primary() {
        let mut dto = NewClient {
            name: " ".into(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        dto.name = "Acme".into();
        let addr = AddressInput {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            is_primary: true,
            ..Default::default()
        };
        dto.addresses = vec![addr.clone(), addr];
        assert!(dto.validate().is_err());

        dto.addresses.truncate(1);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn time_log_hours_bounds() {
        assert!(check_hours(0.0).is_err());
        assert!(check_hours(24.5).is_err());
        assert!(check_hours(f64::NAN).is_err());
        assert!(check_hours(7.5).is_ok());
        assert!(check_hours(24.0).is_ok());
    }

    #[test]
    fn new_staff_defaults_to_active() {
        let staff: NewStaff =
            serde_json::from_value(json!({"first_name": "Ann", "last_name": "Lee"})).unwrap();
        assert!(staff.active);
    }

    #[test]
    fn project_dates_must_be_ordered() {
        let dto = NewProject {
            name: "Kitchen".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
