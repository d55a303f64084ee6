//! ProjectRepo over SQLite: projects, stages, tasks, tags and the project/tag join.

use super::filter::SqlFilter;
use super::rows::{self, Record, SqlValue, now, repo_err};
use super::sqlite_repo::{SqliteRepo, begin_write, execute, find_in, insert_in, query_all};
use crate::domain::dto::{
    NewProject, NewStage, NewTag, NewTask, ProjectPatch, ProjectTagLink, StagePatch, TagPatch,
    TaskPatch,
};
use crate::domain::{
    Client, DomainError, EntityId, ListQuery, Page, PageRequest, Project, ProjectDetail, Stage,
    StageWithTasks, Tag, Task,
};
use crate::ports::ProjectRepo;
use libsql::Row;
use tracing::info;

impl Record for Project {
    const ENTITY: &'static str = "project";
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static str = "id, client_id, name, description, status, start_date, \
        end_date, budget, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            client_id: rows::opt_int(row, 1)?,
            name: rows::text(row, 2)?,
            description: rows::opt_text(row, 3)?,
            status: rows::enumeration(row, 4)?,
            start_date: rows::opt_date(row, 5)?,
            end_date: rows::opt_date(row, 6)?,
            budget: rows::opt_real(row, 7)?,
            created_at: rows::timestamp(row, 8)?,
            updated_at: rows::timestamp(row, 9)?,
        })
    }
}

impl Record for Stage {
    const ENTITY: &'static str = "stage";
    const TABLE: &'static str = "stages";
    const COLUMNS: &'static str = "id, project_id, name, position, completed, created_at, \
        updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            project_id: rows::id(row, 1)?,
            name: rows::text(row, 2)?,
            position: rows::int(row, 3)?,
            completed: rows::boolean(row, 4)?,
            created_at: rows::timestamp(row, 5)?,
            updated_at: rows::timestamp(row, 6)?,
        })
    }
}

impl Record for Task {
    const ENTITY: &'static str = "task";
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static str = "id, stage_id, title, description, status, assignee_id, \
        due_date, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            stage_id: rows::id(row, 1)?,
            title: rows::text(row, 2)?,
            description: rows::opt_text(row, 3)?,
            status: rows::enumeration(row, 4)?,
            assignee_id: rows::opt_int(row, 5)?,
            due_date: rows::opt_date(row, 6)?,
            created_at: rows::timestamp(row, 7)?,
            updated_at: rows::timestamp(row, 8)?,
        })
    }
}

impl Record for Tag {
    const ENTITY: &'static str = "tag";
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static str = "id, name, color, created_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            name: rows::text(row, 1)?,
            color: rows::opt_text(row, 2)?,
            created_at: rows::timestamp(row, 3)?,
        })
    }
}

#[async_trait::async_trait]
impl ProjectRepo for SqliteRepo {
    async fn list_projects(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Project>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("client_id", query.client_id)
            .eq("status", query.status.as_deref())
            .clause(
                "id IN (SELECT project_id FROM project_tags WHERE tag_id = {})",
                query.tag_id,
            )
            .search(&["name", "description"], query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_project(&self, id: EntityId) -> Result<Option<ProjectDetail>, DomainError> {
        let conn = self.conn().await?;
        let Some(project) = find_in::<Project>(&conn, id).await? else {
            return Ok(None);
        };
        let client = match project.client_id {
            Some(client_id) => find_in::<Client>(&conn, client_id).await?,
            None => None,
        };

        let stages = query_all::<Stage>(
            &conn,
            &format!(
                "SELECT {} FROM stages WHERE project_id = ?1 ORDER BY position, id",
                Stage::COLUMNS
            ),
            vec![id.sql()],
        )
        .await?;
        let mut tasks = query_all::<Task>(
            &conn,
            &format!(
                "SELECT {} FROM tasks WHERE stage_id IN (SELECT id FROM stages \
                    WHERE project_id = ?1) ORDER BY id",
                Task::COLUMNS
            ),
            vec![id.sql()],
        )
        .await?;
        let stages = stages
            .into_iter()
            .map(|stage| {
                let (mine, rest): (Vec<Task>, Vec<Task>) =
                    tasks.drain(..).partition(|t| t.stage_id == stage.id);
                tasks = rest;
                StageWithTasks { stage, tasks: mine }
            })
            .collect();

        let tags = query_all::<Tag>(
            &conn,
            "SELECT t.id, t.name, t.color, t.created_at FROM tags t \
             JOIN project_tags pt ON pt.tag_id = t.id WHERE pt.project_id = ?1 ORDER BY t.name",
            vec![id.sql()],
        )
        .await?;

        Ok(Some(ProjectDetail {
            project,
            client,
            stages,
            tags,
        }))
    }

    async fn create_project(&self, dto: &NewProject) -> Result<Project, DomainError> {
        let conn = self.conn().await?;
        let tx = begin_write(&conn).await?;
        let project = insert_in::<Project>(
            &tx,
            r#"
            INSERT INTO projects (client_id, name, description, status, start_date,
                end_date, budget, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            vec![
                dto.client_id.sql(),
                dto.name.sql(),
                dto.description.sql(),
                dto.status.sql(),
                dto.start_date.sql(),
                dto.end_date.sql(),
                dto.budget.sql(),
                now(),
            ],
        )
        .await?;
        for tag_id in &dto.tag_ids {
            execute(
                &tx,
                "INSERT OR IGNORE INTO project_tags (project_id, tag_id) VALUES (?1, ?2)",
                vec![project.id.sql(), tag_id.sql()],
            )
            .await?;
        }
        tx.commit().await.map_err(repo_err)?;

        info!(project_id = project.id, tags = dto.tag_ids.len(), "project created");
        Ok(project)
    }

    async fn update_project(&self, patch: &ProjectPatch) -> Result<Option<Project>, DomainError> {
        self.update_row(
            r#"
            UPDATE projects SET
                client_id = COALESCE(?2, client_id),
                name = COALESCE(?3, name),
                description = COALESCE(?4, description),
                status = COALESCE(?5, status),
                start_date = COALESCE(?6, start_date),
                end_date = COALESCE(?7, end_date),
                budget = COALESCE(?8, budget),
                updated_at = ?9
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.client_id.sql(),
                patch.name.sql(),
                patch.description.sql(),
                patch.status.sql(),
                patch.start_date.sql(),
                patch.end_date.sql(),
                patch.budget.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_project(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Project>(id).await
    }

    async fn list_stages(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Stage>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("project_id", query.project_id)
            .search(&["name"], query.search_term());
        self.list_page(&filter, "project_id, position, id", page).await
    }

    async fn get_stage(&self, id: EntityId) -> Result<Option<Stage>, DomainError> {
        self.find(id).await
    }

    async fn create_stage(&self, dto: &NewStage) -> Result<Stage, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO stages (project_id, name, position, completed, created_at, updated_at)
            VALUES (
                ?1, ?2,
                COALESCE(?3, (SELECT COALESCE(MAX(position), -1) + 1 FROM stages
                    WHERE project_id = ?1)),
                0, ?4, ?4
            )
            "#,
            vec![dto.project_id.sql(), dto.name.sql(), dto.position.sql(), now()],
        )
        .await
    }

    async fn update_stage(&self, patch: &StagePatch) -> Result<Option<Stage>, DomainError> {
        self.update_row(
            r#"
            UPDATE stages SET
                name = COALESCE(?2, name),
                position = COALESCE(?3, position),
                completed = COALESCE(?4, completed),
                updated_at = ?5
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.name.sql(),
                patch.position.sql(),
                patch.completed.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_stage(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Stage>(id).await
    }

    async fn list_tasks(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Task>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .clause(
                "stage_id IN (SELECT id FROM stages WHERE project_id = {})",
                query.project_id,
            )
            .eq("assignee_id", query.staff_id)
            .eq("status", query.status.as_deref())
            .search(&["title", "description"], query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_task(&self, id: EntityId) -> Result<Option<Task>, DomainError> {
        self.find(id).await
    }

    async fn create_task(&self, dto: &NewTask) -> Result<Task, DomainError> {
        self.insert_row(
            r#"
            INSERT INTO tasks (stage_id, title, description, status, assignee_id, due_date,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            vec![
                dto.stage_id.sql(),
                dto.title.sql(),
                dto.description.sql(),
                dto.status.sql(),
                dto.assignee_id.sql(),
                dto.due_date.sql(),
                now(),
            ],
        )
        .await
    }

    async fn update_task(&self, patch: &TaskPatch) -> Result<Option<Task>, DomainError> {
        self.update_row(
            r#"
            UPDATE tasks SET
                stage_id = COALESCE(?2, stage_id),
                title = COALESCE(?3, title),
                description = COALESCE(?4, description),
                status = COALESCE(?5, status),
                assignee_id = COALESCE(?6, assignee_id),
                due_date = COALESCE(?7, due_date),
                updated_at = ?8
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.stage_id.sql(),
                patch.title.sql(),
                patch.description.sql(),
                patch.status.sql(),
                patch.assignee_id.sql(),
                patch.due_date.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_task(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Task>(id).await
    }

    async fn list_tags(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Tag>, DomainError> {
        let mut filter = SqlFilter::new();
        filter.search(&["name"], query.search_term());
        self.list_page(&filter, "name", page).await
    }

    async fn get_tag(&self, id: EntityId) -> Result<Option<Tag>, DomainError> {
        self.find(id).await
    }

    async fn create_tag(&self, dto: &NewTag) -> Result<Tag, DomainError> {
        self.insert_row(
            "INSERT INTO tags (name, color, created_at) VALUES (?1, ?2, ?3)",
            vec![dto.name.trim().sql(), dto.color.sql(), now()],
        )
        .await
    }

    async fn update_tag(&self, patch: &TagPatch) -> Result<Option<Tag>, DomainError> {
        self.update_row(
            "UPDATE tags SET name = COALESCE(?2, name), color = COALESCE(?3, color) WHERE id = ?1",
            vec![
                patch.id.sql(),
                patch.name.as_deref().map(str::trim).sql(),
                patch.color.sql(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_tag(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Tag>(id).await
    }

    async fn add_project_tag(&self, link: &ProjectTagLink) -> Result<(), DomainError> {
        let conn = self.conn().await?;
        execute(
            &conn,
            "INSERT OR IGNORE INTO project_tags (project_id, tag_id) VALUES (?1, ?2)",
            vec![link.project_id.sql(), link.tag_id.sql()],
        )
        .await?;
        Ok(())
    }

    async fn remove_project_tag(&self, link: &ProjectTagLink) -> Result<bool, DomainError> {
        let conn = self.conn().await?;
        let removed = execute(
            &conn,
            "DELETE FROM project_tags WHERE project_id = ?1 AND tag_id = ?2",
            vec![link.project_id.sql(), link.tag_id.sql()],
        )
        .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_repo::test_support::repo;
    use crate::domain::dto::NewClient;
    use crate::domain::{ProjectStatus, TaskStatus};
    use crate::ports::ClientRepo;

    async fn tag(repo: &SqliteRepo, name: &str) -> Tag {
        repo.create_tag(&NewTag {
            name: name.into(),
            color: None,
        })
        .await
        .unwrap()
    }

    fn project(name: &str) -> NewProject {
        NewProject {
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn project_detail_includes_client_stages_tasks_and_tags() {
        let (repo, _dir) = repo().await;
        let client = repo
            .create_client(&NewClient {
                name: "Leroy".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let urgent = tag(&repo, "urgent").await;
        let created = repo
            .create_project(&NewProject {
                client_id: Some(client.client.id),
                tag_ids: vec![urgent.id],
                ..project("Bathroom")
            })
            .await
            .unwrap();
        assert_eq!(created.status, ProjectStatus::Planned);

        let demo = repo
            .create_stage(&NewStage {
                project_id: created.id,
                name: "Demolition".into(),
                position: None,
            })
            .await
            .unwrap();
        let tiling = repo
            .create_stage(&NewStage {
                project_id: created.id,
                name: "Tiling".into(),
                position: None,
            })
            .await
            .unwrap();
        assert_eq!((demo.position, tiling.position), (0, 1));

        repo.create_task(&NewTask {
            stage_id: tiling.id,
            title: "Buy tiles".into(),
            ..Default::default()
        })
        .await
        .unwrap();

        let detail = repo.get_project(created.id).await.unwrap().unwrap();
        assert_eq!(detail.client.unwrap().name, "Leroy");
        assert_eq!(detail.tags, vec![urgent]);
        assert_eq!(detail.stages.len(), 2);
        assert!(detail.stages[0].tasks.is_empty());
        assert_eq!(detail.stages[1].tasks[0].title, "Buy tiles");
    }

    #[tokio::test]
    async fn list_projects_filters_by_tag_and_status() {
        let (repo, _dir) = repo().await;
        let green = tag(&repo, "green").await;
        let a = repo
            .create_project(&NewProject {
                tag_ids: vec![green.id],
                ..project("Garden")
            })
            .await
            .unwrap();
        let b = repo.create_project(&project("Garage")).await.unwrap();
        repo.update_project(&ProjectPatch {
            id: b.id,
            status: Some(ProjectStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();

        let by_tag = ListQuery {
            tag_id: Some(green.id),
            ..Default::default()
        };
        let page = repo
            .list_projects(&by_tag, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a.id]);

        let by_status = ListQuery {
            status: Some("active".into()),
            ..Default::default()
        };
        let page = repo
            .list_projects(&by_status, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Garage");
    }

    #[tokio::test]
    async fn tasks_filter_by_project_through_stage() {
        let (repo, _dir) = repo().await;
        let p1 = repo.create_project(&project("One")).await.unwrap();
        let p2 = repo.create_project(&project("Two")).await.unwrap();
        let s1 = repo
            .create_stage(&NewStage {
                project_id: p1.id,
                name: "s1".into(),
                position: Some(5),
            })
            .await
            .unwrap();
        assert_eq!(s1.position, 5);
        let s2 = repo
            .create_stage(&NewStage {
                project_id: p2.id,
                name: "s2".into(),
                position: None,
            })
            .await
            .unwrap();
        for (stage, title) in [(s1.id, "a"), (s1.id, "b"), (s2.id, "c")] {
            repo.create_task(&NewTask {
                stage_id: stage,
                title: title.into(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let query = ListQuery {
            project_id: Some(p1.id),
            ..Default::default()
        };
        let page = repo.list_tasks(&query, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let done = repo
            .update_task(&TaskPatch {
                id: page.items[0].id,
                status: Some(TaskStatus::Done),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert_eq!(done.title, "a");
    }

    #[tokio::test]
    async fn duplicate_tag_name_is_a_conflict() {
        let (repo, _dir) = repo().await;
        tag(&repo, "roof").await;
        let err = repo
            .create_tag(&NewTag {
                name: "roof".into(),
                color: Some("#f00".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn project_tag_links_are_idempotent() {
        let (repo, _dir) = repo().await;
        let p = repo.create_project(&project("Deck")).await.unwrap();
        let t = tag(&repo, "wood").await;
        let link = ProjectTagLink {
            project_id: p.id,
            tag_id: t.id,
        };
        repo.add_project_tag(&link).await.unwrap();
        repo.add_project_tag(&link).await.unwrap();
        assert_eq!(repo.get_project(p.id).await.unwrap().unwrap().tags.len(), 1);

        assert!(repo.remove_project_tag(&link).await.unwrap());
        assert!(!repo.remove_project_tag(&link).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_tag_rolls_back_the_project() {
        let (repo, _dir) = repo().await;
        let known = tag(&repo, "brick").await;
        let mut dto = project("Orphan");
        dto.tag_ids = vec![known.id, 9999];

        let err = repo.create_project(&dto).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");

        let page = repo
            .list_projects(&ListQuery::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        let tagged = ListQuery {
            tag_id: Some(known.id),
            ..Default::default()
        };
        let page = repo.list_projects(&tagged, PageRequest::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn deleting_project_cascades_stages() {
        let (repo, _dir) = repo().await;
        let p = repo.create_project(&project("Temp")).await.unwrap();
        let s = repo
            .create_stage(&NewStage {
                project_id: p.id,
                name: "only".into(),
                position: None,
            })
            .await
            .unwrap();
        assert!(repo.delete_project(p.id).await.unwrap());
        assert!(repo.get_stage(s.id).await.unwrap().is_none());
    }
}
