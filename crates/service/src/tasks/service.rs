use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, instrument};

use models::task::{validate_planned_dates, TaskStatus};

use super::domain::{NewTask, Task, TaskRequest, TaskView, Viewer};
use super::repository::TaskRepository;
use super::stats::{self, StatusCounts, TrendPoint};
use crate::errors::ServiceError;
use crate::storage::FileStore;

pub const DEFAULT_DEADLINE_WINDOW_DAYS: i64 = 7;

/// Local calendar date used for deadline arithmetic.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Set `status` and stamp actual start/end dates the first time a task
/// enters `IN_PROGRESS` / `DONE`.
pub fn apply_status(task: &mut Task, status: TaskStatus, on: NaiveDate) {
    task.status = status;
    match status {
        TaskStatus::InProgress if task.actual_start_date.is_none() => task.actual_start_date = Some(on),
        TaskStatus::Done if task.actual_end_date.is_none() => task.actual_end_date = Some(on),
        _ => {}
    }
}

pub struct TaskService<R: TaskRepository> {
    repo: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a top-level task.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::tasks::{TaskService, domain::TaskRequest, repository::mock::MockTaskRepository};
    /// use models::task::{ActionType, LicenseType, TaskStatus};
    /// let repo = Arc::new(MockTaskRepository::default());
    /// repo.add_user(1, "Иванов Иван Иванович");
    /// let svc = TaskService::new(repo);
    /// let req = TaskRequest {
    ///     title: "Получение алкогольной лицензии".into(),
    ///     license_type: Some(LicenseType::Alcohol),
    ///     action_type: Some(ActionType::New),
    ///     ..Default::default()
    /// };
    /// let view = tokio_test::block_on(svc.create_task(req, 1)).unwrap();
    /// assert_eq!(view.status, TaskStatus::Assigned);
    /// assert_eq!(view.created_by_name.as_deref(), Some("Иванов Иван Иванович"));
    /// ```
    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create_task(&self, req: TaskRequest, creator_id: i64) -> Result<TaskView, ServiceError> {
        let title = required_title(&req.title)?;
        let license_type = req.license_type.ok_or_else(|| ServiceError::Validation("licenseType is required".into()))?;
        let action_type = req.action_type.ok_or_else(|| ServiceError::Validation("actionType is required".into()))?;
        validate_planned_dates(req.planned_start_date, req.planned_end_date)?;
        self.check_refs(req.store_id, req.assignee_id).await?;

        let created = self
            .repo
            .insert(NewTask {
                title,
                description: req.description,
                license_type,
                action_type,
                status: req.status.unwrap_or(TaskStatus::Assigned),
                status_reason: req.status_reason,
                store_id: req.store_id,
                assignee_id: req.assignee_id,
                created_by_id: Some(creator_id),
                deadline_date: req.deadline_date,
                parent_task_id: None,
                subtask_type: req.subtask_type,
                planned_start_date: req.planned_start_date,
                planned_end_date: req.planned_end_date,
            })
            .await?;
        info!(task_id = created.id, creator_id, "task_created");
        self.view(created).await
    }

    /// ADMIN sees every top-level task, everyone else only tasks assigned to them.
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, viewer: Viewer) -> Result<Vec<TaskView>, ServiceError> {
        let tasks = self.visible(viewer).await?;
        self.views(tasks).await
    }

    pub async fn get_task(&self, id: i64) -> Result<TaskView, ServiceError> {
        let t = self.load(id).await?;
        self.view(t).await
    }

    /// Replace title, description and deadline; other fields change only when present.
    #[instrument(skip(self, req))]
    pub async fn update_task(&self, id: i64, req: TaskRequest) -> Result<TaskView, ServiceError> {
        let mut t = self.load(id).await?;
        t.title = required_title(&req.title)?;
        self.check_refs(req.store_id, req.assignee_id).await?;

        t.description = req.description;
        t.deadline_date = req.deadline_date;
        if let Some(lt) = req.license_type {
            t.license_type = lt;
        }
        if let Some(at) = req.action_type {
            t.action_type = at;
        }
        if let Some(status) = req.status {
            apply_status(&mut t, status, today());
        }
        if req.status_reason.is_some() {
            t.status_reason = req.status_reason;
        }
        if req.store_id.is_some() {
            t.store_id = req.store_id;
        }
        if req.assignee_id.is_some() {
            t.assignee_id = req.assignee_id;
        }
        if req.subtask_type.is_some() {
            t.subtask_type = req.subtask_type;
        }
        if req.planned_start_date.is_some() {
            t.planned_start_date = req.planned_start_date;
        }
        if req.planned_end_date.is_some() {
            t.planned_end_date = req.planned_end_date;
        }
        validate_planned_dates(t.planned_start_date, t.planned_end_date)?;
        let saved = self.persist(t).await?;
        info!(task_id = id, "task_updated");
        self.view(saved).await
    }

    /// Delete a task with its subtasks and documents, then remove the
    /// documents' files from `files`.
    #[instrument(skip(self, files))]
    pub async fn delete_task(&self, id: i64, files: &FileStore) -> Result<(), ServiceError> {
        let mut ids = vec![id];
        let mut next = 0;
        while next < ids.len() {
            let children = self.repo.list_children(ids[next]).await?;
            ids.extend(children.into_iter().map(|c| c.id));
            next += 1;
        }
        let paths = self.repo.document_paths(&ids).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("task"));
        }
        let removed = files.remove_all(&paths).await;
        info!(task_id = id, subtasks = ids.len() - 1, files_removed = removed, "task_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: TaskStatus, reason: Option<String>) -> Result<TaskView, ServiceError> {
        let mut t = self.load(id).await?;
        let from = t.status;
        apply_status(&mut t, status, today());
        if reason.is_some() {
            t.status_reason = reason;
        }
        let saved = self.persist(t).await?;
        info!(task_id = id, from = ?from, to = ?status, "task_status_changed");
        self.view(saved).await
    }

    /// Tasks whose deadline falls in `[on, on + days]`, nearest first.
    pub async fn upcoming_deadlines(&self, on: NaiveDate, days: Option<i64>) -> Result<Vec<TaskView>, ServiceError> {
        let days = days.unwrap_or(DEFAULT_DEADLINE_WINDOW_DAYS);
        if days < 0 {
            return Err(ServiceError::Validation("days must not be negative".into()));
        }
        let mut tasks = self.repo.list_deadline_between(on, on + Duration::days(days)).await?;
        tasks.sort_by_key(|t| (t.deadline_date, t.id));
        self.views(tasks).await
    }

    pub async fn subtasks(&self, parent_id: i64) -> Result<Vec<TaskView>, ServiceError> {
        self.load(parent_id).await?;
        let children = self.repo.list_children(parent_id).await?;
        self.views(children).await
    }

    /// Subtasks take license type, action type and store from the parent.
    /// Assignee falls back to the parent's.
    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create_subtask(&self, parent_id: i64, req: TaskRequest, creator_id: i64) -> Result<TaskView, ServiceError> {
        let parent = self.load(parent_id).await?;
        let title = required_title(&req.title)?;
        validate_planned_dates(req.planned_start_date, req.planned_end_date)?;
        self.check_refs(None, req.assignee_id).await?;

        let created = self
            .repo
            .insert(NewTask {
                title,
                description: req.description,
                license_type: parent.license_type,
                action_type: parent.action_type,
                status: req.status.unwrap_or(TaskStatus::Assigned),
                status_reason: req.status_reason,
                store_id: parent.store_id,
                assignee_id: req.assignee_id.or(parent.assignee_id),
                created_by_id: Some(creator_id),
                deadline_date: req.deadline_date,
                parent_task_id: Some(parent.id),
                subtask_type: req.subtask_type,
                planned_start_date: req.planned_start_date,
                planned_end_date: req.planned_end_date,
            })
            .await?;
        info!(task_id = created.id, parent_id, "subtask_created");
        self.view(created).await
    }

    pub async fn update_planned_dates(
        &self,
        id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TaskView, ServiceError> {
        validate_planned_dates(start, end)?;
        let mut t = self.load(id).await?;
        t.planned_start_date = start;
        t.planned_end_date = end;
        let saved = self.persist(t).await?;
        self.view(saved).await
    }

    pub async fn stats(&self, viewer: Viewer, on: NaiveDate) -> Result<StatusCounts, ServiceError> {
        let tasks = self.visible(viewer).await?;
        Ok(stats::status_counts(&tasks, on))
    }

    pub async fn overdue(&self, viewer: Viewer, on: NaiveDate) -> Result<Vec<TaskView>, ServiceError> {
        let tasks = self.visible(viewer).await?;
        self.views(stats::overdue(tasks, on)).await
    }

    /// Open tasks nobody has picked up yet, across all users.
    pub async fn unassigned(&self) -> Result<Vec<TaskView>, ServiceError> {
        let tasks = self.repo.list_all().await?;
        self.views(stats::unassigned(tasks)).await
    }

    pub async fn trend(&self, viewer: Viewer, on: NaiveDate, days: Option<i64>) -> Result<Vec<TrendPoint>, ServiceError> {
        let days = days.unwrap_or(stats::DEFAULT_TREND_DAYS);
        if !(1..=366).contains(&days) {
            return Err(ServiceError::Validation("days must be within 1..=366".into()));
        }
        let tasks = self.visible(viewer).await?;
        Ok(stats::trend(&tasks, on, days))
    }

    async fn visible(&self, viewer: Viewer) -> Result<Vec<Task>, ServiceError> {
        if viewer.is_admin {
            self.repo.list_top_level().await
        } else {
            self.repo.list_by_assignee(viewer.user_id).await
        }
    }

    async fn load(&self, id: i64) -> Result<Task, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("task"))
    }

    async fn persist(&self, mut t: Task) -> Result<Task, ServiceError> {
        t.updated_at = Some(Utc::now().into());
        self.repo.save(&t).await
    }

    async fn check_refs(&self, store_id: Option<i64>, assignee_id: Option<i64>) -> Result<(), ServiceError> {
        if let Some(id) = store_id {
            if !self.repo.store_exists(id).await? {
                return Err(ServiceError::Validation(format!("store {id} does not exist")));
            }
        }
        if let Some(id) = assignee_id {
            if !self.repo.user_exists(id).await? {
                return Err(ServiceError::Validation(format!("user {id} does not exist")));
            }
        }
        Ok(())
    }

    async fn view(&self, t: Task) -> Result<TaskView, ServiceError> {
        let ctx = self.repo.view_context(std::slice::from_ref(&t)).await?;
        Ok(TaskView::build(t, &ctx))
    }

    async fn views(&self, tasks: Vec<Task>) -> Result<Vec<TaskView>, ServiceError> {
        let ctx = self.repo.view_context(&tasks).await?;
        Ok(tasks.into_iter().map(|t| TaskView::build(t, &ctx)).collect())
    }
}

fn required_title(title: &str) -> Result<String, ServiceError> {
    let t = title.trim();
    if t.is_empty() {
        return Err(ServiceError::Validation("title is required".into()));
    }
    Ok(t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repository::mock::MockTaskRepository;
    use models::task::{ActionType, LicenseType, SubtaskType};

    const ADMIN: Viewer = Viewer { user_id: 1, is_admin: true };
    const MANAGER: Viewer = Viewer { user_id: 2, is_admin: false };

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (Arc<MockTaskRepository>, TaskService<MockTaskRepository>) {
        let repo = Arc::new(MockTaskRepository::default());
        repo.add_user(1, "Администратор Системы");
        repo.add_user(2, "Иванов Иван Иванович");
        repo.add_store(10, "Магазин на Тверской");
        (repo.clone(), TaskService::new(repo))
    }

    fn req(title: &str) -> TaskRequest {
        TaskRequest {
            title: title.into(),
            license_type: Some(LicenseType::Tobacco),
            action_type: Some(ActionType::Renewal),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_and_names() {
        let (repo, svc) = setup();
        let mut r = req("Продление");
        r.store_id = Some(10);
        r.assignee_id = Some(2);
        let v = svc.create_task(r, 1).await.unwrap();
        repo.set_document_count(v.id, 3);
        let v = svc.get_task(v.id).await.unwrap();
        assert_eq!(v.status, TaskStatus::Assigned);
        assert_eq!(v.store_name.as_deref(), Some("Магазин на Тверской"));
        assert_eq!(v.assignee_name.as_deref(), Some("Иванов Иван Иванович"));
        assert_eq!(v.created_by_name.as_deref(), Some("Администратор Системы"));
        assert_eq!(v.document_count, 3);
        assert_eq!(v.payment_count, 0);
    }

    #[tokio::test]
    async fn create_validates_input() {
        let (_, svc) = setup();
        assert!(matches!(svc.create_task(req("  "), 1).await, Err(ServiceError::Validation(_))));
        let mut r = req("x");
        r.license_type = None;
        assert!(matches!(svc.create_task(r, 1).await, Err(ServiceError::Validation(_))));
        let mut r = req("x");
        r.store_id = Some(999);
        assert!(matches!(svc.create_task(r, 1).await, Err(ServiceError::Validation(_))));
        let mut r = req("x");
        r.assignee_id = Some(999);
        assert!(matches!(svc.create_task(r, 1).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn list_respects_viewer() {
        let (_, svc) = setup();
        let mut mine = req("mine");
        mine.assignee_id = Some(2);
        let mine = svc.create_task(mine, 1).await.unwrap();
        svc.create_task(req("other"), 1).await.unwrap();
        svc.create_subtask(mine.id, req("sub"), 1).await.unwrap();

        assert_eq!(svc.list_tasks(ADMIN).await.unwrap().len(), 2);
        let titles: Vec<String> = svc.list_tasks(MANAGER).await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["mine".to_string(), "sub".to_string()]);
    }

    #[tokio::test]
    async fn status_transitions_stamp_dates_once() {
        let (repo, svc) = setup();
        let v = svc.create_task(req("t"), 1).await.unwrap();
        let started = svc.update_status(v.id, TaskStatus::InProgress, None).await.unwrap();
        assert!(started.actual_start_date.is_some());
        assert!(started.actual_end_date.is_none());
        assert!(started.updated_at.is_some());

        let mut stored = repo.get(v.id).await.unwrap().unwrap();
        stored.actual_start_date = Some(d("2020-01-01"));
        repo.put(stored);
        let done = svc.update_status(v.id, TaskStatus::Done, Some("готово".into())).await.unwrap();
        assert_eq!(done.actual_start_date, Some(d("2020-01-01")));
        assert!(done.actual_end_date.is_some());
        assert_eq!(done.status_reason.as_deref(), Some("готово"));
    }

    #[tokio::test]
    async fn status_change_without_reason_keeps_stored_reason() {
        let (_, svc) = setup();
        let v = svc.create_task(req("t"), 1).await.unwrap();
        let paused = svc.update_status(v.id, TaskStatus::Suspended, Some("ждём выписку ЕГРН".into())).await.unwrap();
        assert_eq!(paused.status_reason.as_deref(), Some("ждём выписку ЕГРН"));

        let resumed = svc.update_status(v.id, TaskStatus::InProgress, None).await.unwrap();
        assert_eq!(resumed.status, TaskStatus::InProgress);
        assert_eq!(resumed.status_reason.as_deref(), Some("ждём выписку ЕГРН"));

        let done = svc.update_status(v.id, TaskStatus::Done, Some("лицензия получена".into())).await.unwrap();
        assert_eq!(done.status_reason.as_deref(), Some("лицензия получена"));
    }

    #[tokio::test]
    async fn update_replaces_core_fields_and_keeps_optional_ones() {
        let (_, svc) = setup();
        let mut r = req("old");
        r.description = Some("desc".into());
        r.store_id = Some(10);
        let v = svc.create_task(r, 1).await.unwrap();

        let mut u = req("new");
        u.license_type = None;
        u.deadline_date = Some(d("2030-01-01"));
        let updated = svc.update_task(v.id, u).await.unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, None);
        assert_eq!(updated.store_id, Some(10));
        assert_eq!(updated.license_type, LicenseType::Tobacco);
        assert_eq!(updated.deadline_date, Some(d("2030-01-01")));

        assert!(matches!(svc.update_task(404, req("x")).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_, svc) = setup();
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::new(dir.path()).await.unwrap();
        let v = svc.create_task(req("t"), 1).await.unwrap();
        svc.delete_task(v.id, &files).await.unwrap();
        assert!(matches!(svc.delete_task(v.id, &files).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get_task(v.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_document_files_of_task_and_subtasks() {
        let (repo, svc) = setup();
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::new(dir.path()).await.unwrap();
        let parent = svc.create_task(req("parent"), 1).await.unwrap();
        let child = svc.create_subtask(parent.id, req("child"), 1).await.unwrap();
        let other = svc.create_task(req("other"), 1).await.unwrap();

        let lease = files.save(&format!("tasks/{}", parent.id), "a.pdf", b"%PDF").await.unwrap();
        let scan = files.save(&format!("tasks/{}", child.id), "scan.png", b"png").await.unwrap();
        let kept = files.save(&format!("tasks/{}", other.id), "keep.pdf", b"%PDF").await.unwrap();
        repo.add_document_file(parent.id, &lease.relative_path);
        repo.add_document_file(child.id, &scan.relative_path);
        repo.add_document_file(other.id, &kept.relative_path);

        svc.delete_task(parent.id, &files).await.unwrap();
        assert!(!dir.path().join(&lease.relative_path).exists());
        assert!(!dir.path().join(&scan.relative_path).exists());
        assert!(dir.path().join(&kept.relative_path).exists());
        assert!(matches!(svc.get_task(child.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn upcoming_window_is_inclusive() {
        let (_, svc) = setup();
        let on = d("2024-05-01");
        for (title, deadline) in [("a", "2024-04-30"), ("b", "2024-05-01"), ("c", "2024-05-08"), ("d", "2024-05-09")] {
            let mut r = req(title);
            r.deadline_date = Some(d(deadline));
            svc.create_task(r, 1).await.unwrap();
        }
        let titles: Vec<String> = svc.upcoming_deadlines(on, None).await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(svc.upcoming_deadlines(on, Some(0)).await.unwrap().len(), 1);
        assert!(svc.upcoming_deadlines(on, Some(-1)).await.is_err());
    }

    #[tokio::test]
    async fn subtasks_inherit_from_parent_and_report_progress() {
        let (_, svc) = setup();
        let mut r = req("parent");
        r.store_id = Some(10);
        r.assignee_id = Some(2);
        let parent = svc.create_task(r, 1).await.unwrap();

        let sub = TaskRequest {
            title: "ГИС анализ".into(),
            subtask_type: Some(SubtaskType::GisAnalysis),
            license_type: Some(LicenseType::Alcohol),
            ..Default::default()
        };
        let s1 = svc.create_subtask(parent.id, sub, 1).await.unwrap();
        assert_eq!(s1.license_type, LicenseType::Tobacco);
        assert_eq!(s1.action_type, ActionType::Renewal);
        assert_eq!(s1.store_id, Some(10));
        assert_eq!(s1.assignee_id, Some(2));
        assert_eq!(s1.parent_task_id, Some(parent.id));

        svc.create_subtask(parent.id, req("second"), 1).await.unwrap();
        svc.update_status(s1.id, TaskStatus::Done, None).await.unwrap();

        let p = svc.get_task(parent.id).await.unwrap();
        assert_eq!(p.subtask_count, 2);
        assert_eq!(p.completion_percent, 50);
        assert_eq!(svc.subtasks(parent.id).await.unwrap().len(), 2);
        assert!(matches!(svc.subtasks(404).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn planned_dates_must_be_ordered() {
        let (_, svc) = setup();
        let v = svc.create_task(req("t"), 1).await.unwrap();
        let ok = svc.update_planned_dates(v.id, Some(d("2024-01-01")), Some(d("2024-01-10"))).await.unwrap();
        assert_eq!(ok.planned_end_date, Some(d("2024-01-10")));
        let err = svc.update_planned_dates(v.id, Some(d("2024-02-01")), Some(d("2024-01-10"))).await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn dashboard_lists() {
        let (_, svc) = setup();
        let on = d("2024-06-10");
        let mut late = req("late");
        late.deadline_date = Some(d("2024-06-01"));
        late.assignee_id = Some(2);
        svc.create_task(late, 1).await.unwrap();
        svc.create_task(req("free"), 1).await.unwrap();

        let counts = svc.stats(ADMIN, on).await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.overdue, 1);
        assert_eq!(svc.overdue(MANAGER, on).await.unwrap().len(), 1);
        let free: Vec<String> = svc.unassigned().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(free, vec!["free".to_string()]);
        assert_eq!(svc.trend(ADMIN, on, None).await.unwrap().len(), 30);
        assert!(svc.trend(ADMIN, on, Some(0)).await.is_err());
    }
}
