use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;

use models::task::{self, TaskStatus};
use models::user;

use crate::errors::ServiceError;

/// Minimal user reference used by assignee pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    /// Tasks assigned to the user that are not `DONE`
    pub open_tasks: u64,
}

/// List active users ordered by full name.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserSummary>, ServiceError> {
    let users = user::Entity::find()
        .filter(user::Column::IsActive.eq(true))
        .order_by_asc(user::Column::FullName)
        .all(db)
        .await?;
    Ok(users
        .into_iter()
        .map(|u| UserSummary { id: u.id, username: u.username, full_name: u.full_name })
        .collect())
}

/// Join users with their open task counts, busiest first.
pub fn tally_workload(users: Vec<user::Model>, open: &HashMap<i64, u64>) -> Vec<Workload> {
    let mut out: Vec<Workload> = users
        .into_iter()
        .map(|u| Workload {
            open_tasks: open.get(&u.id).copied().unwrap_or(0),
            user_id: u.id,
            username: u.username,
            full_name: u.full_name,
        })
        .collect();
    out.sort_by(|a, b| b.open_tasks.cmp(&a.open_tasks).then_with(|| a.full_name.cmp(&b.full_name)));
    out
}

pub async fn workload(db: &DatabaseConnection) -> Result<Vec<Workload>, ServiceError> {
    let users = user::Entity::find().filter(user::Column::IsActive.eq(true)).all(db).await?;
    let rows: Vec<(Option<i64>, i64)> = task::Entity::find()
        .select_only()
        .column(task::Column::AssigneeId)
        .column_as(Expr::col(task::Column::Id).count(), "n")
        .filter(task::Column::Status.ne(TaskStatus::Done))
        .filter(task::Column::AssigneeId.is_not_null())
        .group_by(task::Column::AssigneeId)
        .into_tuple()
        .all(db)
        .await?;
    let open: HashMap<i64, u64> = rows.into_iter().filter_map(|(id, n)| id.map(|id| (id, n as u64))).collect();
    Ok(tally_workload(users, &open))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, name: &str) -> user::Model {
        user::Model {
            id,
            username: format!("u{id}"),
            email: None,
            full_name: name.into(),
            position: None,
            department: None,
            roles: "MANAGER".into(),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn workload_sorted_by_open_tasks() {
        let open = HashMap::from([(2, 5), (3, 1)]);
        let w = tally_workload(vec![user(1, "Б"), user(2, "В"), user(3, "А"), user(4, "А2")], &open);
        let order: Vec<(i64, u64)> = w.iter().map(|w| (w.user_id, w.open_tasks)).collect();
        assert_eq!(order, vec![(2, 5), (3, 1), (4, 0), (1, 0)]);
    }

    #[tokio::test]
    async fn list_users_returns_summaries() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let name = format!("svc_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        let u = user::create(&db, &name, None, "Сервисный Тест", &["MANAGER"]).await?;
        let all = list_users(&db).await?;
        assert!(all.iter().any(|s| s.id == u.id && s.username == name));
        assert!(workload(&db).await?.iter().any(|w| w.user_id == u.id && w.open_tasks == 0));
        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }
}
