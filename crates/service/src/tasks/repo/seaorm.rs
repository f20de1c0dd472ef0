use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use models::{document, payment, store, task, user};

use crate::errors::ServiceError;
use crate::tasks::domain::{NewTask, Task, ViewContext};
use crate::tasks::repository::TaskRepository;

pub struct SeaOrmTaskRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    async fn insert(&self, n: NewTask) -> Result<Task, ServiceError> {
        let am = task::ActiveModel {
            id: NotSet,
            title: Set(n.title),
            description: Set(n.description),
            license_type: Set(n.license_type),
            action_type: Set(n.action_type),
            status: Set(n.status),
            status_reason: Set(n.status_reason),
            store_id: Set(n.store_id),
            assignee_id: Set(n.assignee_id),
            created_by_id: Set(n.created_by_id),
            deadline_date: Set(n.deadline_date),
            parent_task_id: Set(n.parent_task_id),
            subtask_type: Set(n.subtask_type),
            planned_start_date: Set(n.planned_start_date),
            planned_end_date: Set(n.planned_end_date),
            actual_start_date: Set(None),
            actual_end_date: Set(None),
            ..Default::default()
        };
        Ok(task::create(&self.db, am).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, ServiceError> {
        Ok(task::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn save(&self, t: &Task) -> Result<Task, ServiceError> {
        let am = task::ActiveModel {
            id: Set(t.id),
            title: Set(t.title.clone()),
            description: Set(t.description.clone()),
            license_type: Set(t.license_type),
            action_type: Set(t.action_type),
            status: Set(t.status),
            status_reason: Set(t.status_reason.clone()),
            store_id: Set(t.store_id),
            assignee_id: Set(t.assignee_id),
            created_by_id: NotSet,
            deadline_date: Set(t.deadline_date),
            parent_task_id: NotSet,
            subtask_type: Set(t.subtask_type),
            planned_start_date: Set(t.planned_start_date),
            planned_end_date: Set(t.planned_end_date),
            actual_start_date: Set(t.actual_start_date),
            actual_end_date: Set(t.actual_end_date),
            created_at: NotSet,
            updated_at: Set(t.updated_at),
        };
        Ok(am.update(&self.db).await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn list_all(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(task::Entity::find().order_by_asc(task::Column::Id).all(&self.db).await?)
    }

    async fn list_top_level(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(task::Entity::find()
            .filter(task::Column::ParentTaskId.is_null())
            .order_by_desc(task::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn list_by_assignee(&self, user_id: i64) -> Result<Vec<Task>, ServiceError> {
        Ok(task::Entity::find()
            .filter(task::Column::AssigneeId.eq(user_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<Task>, ServiceError> {
        Ok(task::Entity::find()
            .filter(task::Column::ParentTaskId.eq(parent_id))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_deadline_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>, ServiceError> {
        Ok(task::Entity::find()
            .filter(task::Column::DeadlineDate.between(from, to))
            .order_by_asc(task::Column::DeadlineDate)
            .all(&self.db)
            .await?)
    }

    async fn store_exists(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(store::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    async fn user_exists(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(user::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    async fn document_paths(&self, task_ids: &[i64]) -> Result<Vec<String>, ServiceError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(document::Entity::find()
            .select_only()
            .column(document::Column::FilePath)
            .filter(document::Column::TaskId.is_in(task_ids.iter().copied()))
            .into_tuple::<String>()
            .all(&self.db)
            .await?)
    }

    async fn view_context(&self, tasks: &[Task]) -> Result<ViewContext, ServiceError> {
        let mut ctx = ViewContext::default();
        if tasks.is_empty() {
            return Ok(ctx);
        }
        let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        let store_ids: Vec<i64> = tasks.iter().filter_map(|t| t.store_id).collect();
        let user_ids: Vec<i64> = tasks.iter().flat_map(|t| [t.assignee_id, t.created_by_id]).flatten().collect();

        if !store_ids.is_empty() {
            let rows: Vec<(i64, String)> = store::Entity::find()
                .select_only()
                .columns([store::Column::Id, store::Column::Name])
                .filter(store::Column::Id.is_in(store_ids))
                .into_tuple()
                .all(&self.db)
                .await?;
            ctx.store_names = rows.into_iter().collect();
        }
        if !user_ids.is_empty() {
            let rows: Vec<(i64, String)> = user::Entity::find()
                .select_only()
                .columns([user::Column::Id, user::Column::FullName])
                .filter(user::Column::Id.is_in(user_ids))
                .into_tuple()
                .all(&self.db)
                .await?;
            ctx.user_names = rows.into_iter().collect();
        }

        let docs: Vec<(i64, i64)> = document::Entity::find()
            .select_only()
            .column(document::Column::TaskId)
            .column_as(Expr::col(document::Column::Id).count(), "n")
            .filter(document::Column::TaskId.is_in(task_ids.clone()))
            .group_by(document::Column::TaskId)
            .into_tuple()
            .all(&self.db)
            .await?;
        ctx.document_counts = docs.into_iter().map(|(id, n)| (id, n as u64)).collect();

        let pays: Vec<(Option<i64>, i64)> = payment::Entity::find()
            .select_only()
            .column(payment::Column::TaskId)
            .column_as(Expr::col(payment::Column::Id).count(), "n")
            .filter(payment::Column::TaskId.is_in(task_ids.clone()))
            .group_by(payment::Column::TaskId)
            .into_tuple()
            .all(&self.db)
            .await?;
        ctx.payment_counts = pays.into_iter().filter_map(|(id, n)| id.map(|id| (id, n as u64))).collect();

        let children = task::Entity::find()
            .filter(task::Column::ParentTaskId.is_in(task_ids))
            .all(&self.db)
            .await?;
        let mut progress: HashMap<i64, (u64, u64)> = HashMap::new();
        for c in children {
            let Some(parent) = c.parent_task_id else { continue };
            let e = progress.entry(parent).or_default();
            e.1 += 1;
            if c.is_done() {
                e.0 += 1;
            }
        }
        ctx.subtask_progress = progress;
        Ok(ctx)
    }
}
