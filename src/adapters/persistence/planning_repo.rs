//! PlanningRepo over SQLite: calendar events, time logs and per-project hour totals.

use super::filter::SqlFilter;
use super::rows::{self, Record, SqlValue, now, repo_err};
use super::sqlite_repo::SqliteRepo;
use crate::domain::dto::{EventPatch, NewEvent, NewTimeLog, TimeLogPatch};
use crate::domain::{
    DomainError, EntityId, Event, ListQuery, Page, PageRequest, ProjectHours, StaffHours, TimeLog,
};
use crate::ports::PlanningRepo;
use libsql::{Row, params_from_iter};
use tracing::debug;

impl Record for Event {
    const ENTITY: &'static str = "event";
    const TABLE: &'static str = "events";
    const COLUMNS: &'static str = "id, title, description, starts_at, ends_at, location, \
        project_id, staff_id, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            title: rows::text(row, 1)?,
            description: rows::opt_text(row, 2)?,
            starts_at: rows::timestamp(row, 3)?,
            ends_at: rows::timestamp(row, 4)?,
            location: rows::opt_text(row, 5)?,
            project_id: rows::opt_int(row, 6)?,
            staff_id: rows::opt_int(row, 7)?,
            created_at: rows::timestamp(row, 8)?,
            updated_at: rows::timestamp(row, 9)?,
        })
    }
}

impl Record for TimeLog {
    const ENTITY: &'static str = "time log";
    const TABLE: &'static str = "time_logs";
    const COLUMNS: &'static str =
        "id, staff_id, project_id, task_id, date, hours, note, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            staff_id: rows::id(row, 1)?,
            project_id: rows::opt_int(row, 2)?,
            task_id: rows::opt_int(row, 3)?,
            date: rows::date(row, 4)?,
            hours: rows::real(row, 5)?,
            note: rows::opt_text(row, 6)?,
            created_at: rows::timestamp(row, 7)?,
            updated_at: rows::timestamp(row, 8)?,
        })
    }
}

#[async_trait::async_trait]
impl PlanningRepo for SqliteRepo {
    /// Events overlapping `[from, to]`; either bound may be open.
    async fn list_events(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Event>, DomainError> {
        let range = query.date_range()?;
        let mut filter = SqlFilter::new();
        filter
            .clause("ends_at >= {}", range.from)
            .clause("starts_at <= {}", range.to)
            .eq("project_id", query.project_id)
            .eq("staff_id", query.staff_id)
            .search(&["title", "description", "location"], query.search_term());
        self.list_page(&filter, "starts_at, id", page).await
    }

    async fn get_event(&self, id: EntityId) -> Result<Option<Event>, DomainError> {
        self.find(id).await
    }

    async fn create_event(&self, dto: &NewEvent) -> Result<Event, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO events (title, description, starts_at, ends_at, location,
                project_id, staff_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            vec![
                dto.title.sql(),
                dto.description.sql(),
                dto.starts_at.sql(),
                dto.ends_at.sql(),
                dto.location.sql(),
                dto.project_id.sql(),
                dto.staff_id.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_event(&self, patch: &EventPatch) -> Result<Option<Event>, DomainError> {
        self.update_row(
            r#"
            UPDATE events SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                starts_at = COALESCE(?4, starts_at),
                ends_at = COALESCE(?5, ends_at),
                location = COALESCE(?6, location),
                project_id = COALESCE(?7, project_id),
                staff_id = COALESCE(?8, staff_id),
                updated_at = ?9
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.title.sql(),
                patch.description.sql(),
                patch.starts_at.sql(),
                patch.ends_at.sql(),
                patch.location.sql(),
                patch.project_id.sql(),
                patch.staff_id.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_event(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Event>(id).await
    }

    async fn list_time_logs(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<TimeLog>, DomainError> {
        let range = query.date_range()?;
        let mut filter = SqlFilter::new();
        filter
            .eq("staff_id", query.staff_id)
            .eq("project_id", query.project_id)
            .clause("date >= {}", range.from.map(|ts| ts.date_naive()))
            .clause("date <= {}", range.to.map(|ts| ts.date_naive()))
            .search(&["note"], query.search_term());
        self.list_page(&filter, "date, id", page).await
    }

    async fn get_time_log(&self, id: EntityId) -> Result<Option<TimeLog>, DomainError> {
        self.find(id).await
    }

    async fn create_time_log(&self, dto: &NewTimeLog) -> Result<TimeLog, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO time_logs (staff_id, project_id, task_id, date, hours, note,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            vec![
                dto.staff_id.sql(),
                dto.project_id.sql(),
                dto.task_id.sql(),
                dto.date.sql(),
                dto.hours.sql(),
                dto.note.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_time_log(&self, patch: &TimeLogPatch) -> Result<Option<TimeLog>, DomainError> {
        self.update_row(
            r#"
            UPDATE time_logs SET
                project_id = COALESCE(?2, project_id),
                task_id = COALESCE(?3, task_id),
                date = COALESCE(?4, date),
                hours = COALESCE(?5, hours),
                note = COALESCE(?6, note),
                updated_at = ?7
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.project_id.sql(),
                patch.task_id.sql(),
                patch.date.sql(),
                patch.hours.sql(),
                patch.note.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_time_log(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<TimeLog>(id).await
    }

    async fn project_hours(&self, project_id: EntityId) -> Result<ProjectHours, DomainError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT staff_id, SUM(hours) FROM time_logs WHERE project_id = ?1 \
                    GROUP BY staff_id ORDER BY staff_id",
                params_from_iter(vec![project_id.sql()]),
            )
            .await
            .map_err(repo_err)?;

        let mut by_staff = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            by_staff.push(StaffHours {
                staff_id: rows::id(&row, 0)?,
                hours: rows::real(&row, 1)?,
            });
        }
        let total_hours = by_staff.iter().map(|s| s.hours).sum();
        debug!(project_id, total_hours, staff = by_staff.len(), "project hours");

        Ok(ProjectHours {
            project_id,
            total_hours,
            by_staff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_repo::test_support::repo;
    use crate::domain::dto::{NewProject, NewStaff};
    use crate::ports::{ProjectRepo, ResourceRepo};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(title: &str, start_hour: u32, end_hour: u32) -> NewEvent {
        NewEvent {
            title: title.into(),
            description: None,
            starts_at: Utc.with_ymd_and_hms(2024, 5, 10, start_hour, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 5, 10, end_hour, 0, 0).unwrap(),
            location: None,
            project_id: None,
            staff_id: None,
        }
    }

    fn log(staff_id: EntityId, project_id: EntityId, day: u32, hours: f64) -> NewTimeLog {
        NewTimeLog {
            staff_id,
            project_id: Some(project_id),
            task_id: None,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            hours,
            note: None,
        }
    }

    async fn staff(repo: &SqliteRepo, first: &str) -> EntityId {
        repo.create_staff(&NewStaff {
            first_name: first.into(),
            last_name: "Test".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn events_filter_by_overlap_and_sort_by_start() {
        let (repo, _dir) = repo().await;
        let late = repo.create_event(&event("late", 15, 17)).await.unwrap();
        let early = repo.create_event(&event("early", 8, 10)).await.unwrap();
        repo.create_event(&event("noon", 11, 12)).await.unwrap();

        let all = repo
            .list_events(&ListQuery::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.items.first().map(|e| e.id), Some(early.id));
        assert_eq!(all.items.last().map(|e| e.id), Some(late.id));
        assert_eq!(repo.get_event(early.id).await.unwrap(), Some(early));

        let window = ListQuery {
            from: Some("2024-05-10T09:30:00Z".into()),
            to: Some("2024-05-10T11:30:00Z".into()),
            ..Default::default()
        };
        let page = repo.list_events(&window, PageRequest::default()).await.unwrap();
        let titles: Vec<_> = page.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "noon"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn inverted_event_window_is_rejected_by_store() {
        let (repo, _dir) = repo().await;
        let err = repo.create_event(&event("bad", 12, 9)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn time_logs_filter_by_date_range_and_sum_per_staff() {
        let (repo, _dir) = repo().await;
        let project = repo
            .create_project(&NewProject {
                name: "Roof".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let ann = staff(&repo, "Ann").await;
        let ben = staff(&repo, "Ben").await;

        repo.create_time_log(&log(ann, project.id, 1, 8.0)).await.unwrap();
        repo.create_time_log(&log(ann, project.id, 2, 4.5)).await.unwrap();
        repo.create_time_log(&log(ben, project.id, 3, 6.0)).await.unwrap();

        let may_two_onwards = ListQuery {
            from: Some("2024-05-02".into()),
            to: Some("2024-05-03".into()),
            ..Default::default()
        };
        let page = repo
            .list_time_logs(&may_two_onwards, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].hours, 4.5);

        let hours = repo.project_hours(project.id).await.unwrap();
        assert_eq!(hours.total_hours, 18.5);
        assert_eq!(
            hours.by_staff,
            vec![
                StaffHours { staff_id: ann, hours: 12.5 },
                StaffHours { staff_id: ben, hours: 6.0 },
            ]
        );
    }

    #[tokio::test]
    async fn project_without_logs_has_zero_hours() {
        let (repo, _dir) = repo().await;
        let hours = repo.project_hours(42).await.unwrap();
        assert_eq!(hours.total_hours, 0.0);
        assert!(hours.by_staff.is_empty());
    }

    #[tokio::test]
    async fn time_log_update_keeps_other_fields() {
        let (repo, _dir) = repo().await;
        let project = repo
            .create_project(&NewProject {
                name: "Fence".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let ann = staff(&repo, "Ann").await;
        let created = repo.create_time_log(&log(ann, project.id, 7, 3.0)).await.unwrap();

        let updated = repo
            .update_time_log(&TimeLogPatch {
                id: created.id,
                note: Some("posts set".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.hours, 3.0);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.note.as_deref(), Some("posts set"));

        assert!(repo.delete_time_log(created.id).await.unwrap());
        assert!(repo.get_time_log(created.id).await.unwrap().is_none());
    }
}
