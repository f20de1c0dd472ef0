use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{NewTask, Task, ViewContext};
use crate::errors::ServiceError;

/// Persistence for tasks and the lookups needed to render them.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task, ServiceError>;
    async fn get(&self, id: i64) -> Result<Option<Task>, ServiceError>;
    /// Write back every mutable column of `task`.
    async fn save(&self, task: &Task) -> Result<Task, ServiceError>;
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;

    async fn list_all(&self) -> Result<Vec<Task>, ServiceError>;
    async fn list_top_level(&self) -> Result<Vec<Task>, ServiceError>;
    async fn list_by_assignee(&self, user_id: i64) -> Result<Vec<Task>, ServiceError>;
    async fn list_children(&self, parent_id: i64) -> Result<Vec<Task>, ServiceError>;
    /// Inclusive on both ends.
    async fn list_deadline_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>, ServiceError>;

    async fn store_exists(&self, id: i64) -> Result<bool, ServiceError>;
    async fn user_exists(&self, id: i64) -> Result<bool, ServiceError>;
    /// Stored file paths of the documents attached to any of `task_ids`.
    async fn document_paths(&self, task_ids: &[i64]) -> Result<Vec<String>, ServiceError>;
    async fn view_context(&self, tasks: &[Task]) -> Result<ViewContext, ServiceError>;
}

/// In-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use chrono::Utc;

    #[derive(Default)]
    pub struct MockTaskRepository {
        tasks: Mutex<BTreeMap<i64, Task>>,
        stores: Mutex<HashMap<i64, String>>,
        users: Mutex<HashMap<i64, String>>,
        documents: Mutex<HashMap<i64, u64>>,
        document_files: Mutex<HashMap<i64, Vec<String>>>,
    }

    impl MockTaskRepository {
        pub fn add_store(&self, id: i64, name: &str) {
            self.stores.lock().unwrap().insert(id, name.to_string());
        }

        pub fn add_user(&self, id: i64, full_name: &str) {
            self.users.lock().unwrap().insert(id, full_name.to_string());
        }

        pub fn set_document_count(&self, task_id: i64, n: u64) {
            self.documents.lock().unwrap().insert(task_id, n);
        }

        pub fn add_document_file(&self, task_id: i64, relative_path: &str) {
            self.document_files.lock().unwrap().entry(task_id).or_default().push(relative_path.to_string());
        }

        /// Overwrite a stored task as-is (timestamps included).
        pub fn put(&self, task: Task) {
            self.tasks.lock().unwrap().insert(task.id, task);
        }

        fn filtered(&self, f: impl Fn(&Task) -> bool) -> Vec<Task> {
            self.tasks.lock().unwrap().values().filter(|t| f(t)).cloned().collect()
        }
    }

    #[async_trait]
    impl TaskRepository for MockTaskRepository {
        async fn insert(&self, n: NewTask) -> Result<Task, ServiceError> {
            let mut tasks = self.tasks.lock().unwrap();
            let id = tasks.keys().next_back().copied().unwrap_or(0) + 1;
            let t = Task {
                id,
                title: n.title,
                description: n.description,
                license_type: n.license_type,
                action_type: n.action_type,
                status: n.status,
                status_reason: n.status_reason,
                store_id: n.store_id,
                assignee_id: n.assignee_id,
                created_by_id: n.created_by_id,
                deadline_date: n.deadline_date,
                parent_task_id: n.parent_task_id,
                subtask_type: n.subtask_type,
                planned_start_date: n.planned_start_date,
                planned_end_date: n.planned_end_date,
                actual_start_date: None,
                actual_end_date: None,
                created_at: Utc::now().into(),
                updated_at: None,
            };
            tasks.insert(id, t.clone());
            Ok(t)
        }

        async fn get(&self, id: i64) -> Result<Option<Task>, ServiceError> {
            Ok(self.tasks.lock().unwrap().get(&id).cloned())
        }

        async fn save(&self, task: &Task) -> Result<Task, ServiceError> {
            let mut tasks = self.tasks.lock().unwrap();
            if !tasks.contains_key(&task.id) {
                return Err(ServiceError::not_found("task"));
            }
            tasks.insert(task.id, task.clone());
            Ok(task.clone())
        }

        async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
            let mut tasks = self.tasks.lock().unwrap();
            let existed = tasks.remove(&id).is_some();
            tasks.retain(|_, t| t.parent_task_id != Some(id));
            Ok(existed)
        }

        async fn list_all(&self) -> Result<Vec<Task>, ServiceError> {
            Ok(self.filtered(|_| true))
        }

        async fn list_top_level(&self) -> Result<Vec<Task>, ServiceError> {
            Ok(self.filtered(|t| t.parent_task_id.is_none()))
        }

        async fn list_by_assignee(&self, user_id: i64) -> Result<Vec<Task>, ServiceError> {
            Ok(self.filtered(|t| t.assignee_id == Some(user_id)))
        }

        async fn list_children(&self, parent_id: i64) -> Result<Vec<Task>, ServiceError> {
            Ok(self.filtered(|t| t.parent_task_id == Some(parent_id)))
        }

        async fn list_deadline_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>, ServiceError> {
            Ok(self.filtered(|t| t.deadline_date.is_some_and(|d| d >= from && d <= to)))
        }

        async fn store_exists(&self, id: i64) -> Result<bool, ServiceError> {
            Ok(self.stores.lock().unwrap().contains_key(&id))
        }

        async fn user_exists(&self, id: i64) -> Result<bool, ServiceError> {
            Ok(self.users.lock().unwrap().contains_key(&id))
        }

        async fn document_paths(&self, task_ids: &[i64]) -> Result<Vec<String>, ServiceError> {
            let files = self.document_files.lock().unwrap();
            Ok(task_ids.iter().filter_map(|id| files.get(id)).flatten().cloned().collect())
        }

        async fn view_context(&self, tasks: &[Task]) -> Result<ViewContext, ServiceError> {
            let mut ctx = ViewContext {
                store_names: self.stores.lock().unwrap().clone(),
                user_names: self.users.lock().unwrap().clone(),
                document_counts: self.documents.lock().unwrap().clone(),
                ..Default::default()
            };
            let all = self.tasks.lock().unwrap();
            for t in tasks {
                let children: Vec<&Task> = all.values().filter(|c| c.parent_task_id == Some(t.id)).collect();
                if !children.is_empty() {
                    let done = children.iter().filter(|c| c.is_done()).count() as u64;
                    ctx.subtask_progress.insert(t.id, (done, children.len() as u64));
                }
            }
            Ok(ctx)
        }
    }
}
