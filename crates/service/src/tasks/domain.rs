use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use models::task::{ActionType, LicenseType, SubtaskType, TaskStatus};
use sea_orm::prelude::DateTimeWithTimeZone;

pub type Task = models::task::Model;

/// Who is asking; drives list visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i64,
    pub is_admin: bool,
}

/// Body of task create/update requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub license_type: Option<LicenseType>,
    pub action_type: Option<ActionType>,
    pub store_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub deadline_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub status_reason: Option<String>,
    pub subtask_type: Option<SubtaskType>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
}

/// Insert payload handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub license_type: LicenseType,
    pub action_type: ActionType,
    pub status: TaskStatus,
    pub status_reason: Option<String>,
    pub store_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub deadline_date: Option<NaiveDate>,
    pub parent_task_id: Option<i64>,
    pub subtask_type: Option<SubtaskType>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
}

/// Names and counters joined onto tasks for responses.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub store_names: HashMap<i64, String>,
    pub user_names: HashMap<i64, String>,
    pub document_counts: HashMap<i64, u64>,
    pub payment_counts: HashMap<i64, u64>,
    /// parent id -> (done, total)
    pub subtask_progress: HashMap<i64, (u64, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub license_type: LicenseType,
    pub action_type: ActionType,
    pub status: TaskStatus,
    pub status_reason: Option<String>,
    pub store_id: Option<i64>,
    pub store_name: Option<String>,
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
    pub created_by_id: Option<i64>,
    pub created_by_name: Option<String>,
    pub deadline_date: Option<NaiveDate>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    pub document_count: u64,
    pub payment_count: u64,
    pub parent_task_id: Option<i64>,
    pub subtask_type: Option<SubtaskType>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub subtask_count: u64,
    pub completion_percent: u8,
}

impl TaskView {
    pub fn build(t: Task, ctx: &ViewContext) -> Self {
        let (done, total) = ctx.subtask_progress.get(&t.id).copied().unwrap_or((0, 0));
        Self {
            store_name: t.store_id.and_then(|id| ctx.store_names.get(&id).cloned()),
            assignee_name: t.assignee_id.and_then(|id| ctx.user_names.get(&id).cloned()),
            created_by_name: t.created_by_id.and_then(|id| ctx.user_names.get(&id).cloned()),
            document_count: ctx.document_counts.get(&t.id).copied().unwrap_or(0),
            payment_count: ctx.payment_counts.get(&t.id).copied().unwrap_or(0),
            subtask_count: total,
            completion_percent: super::stats::percent(done, total),
            id: t.id,
            title: t.title,
            description: t.description,
            license_type: t.license_type,
            action_type: t.action_type,
            status: t.status,
            status_reason: t.status_reason,
            store_id: t.store_id,
            assignee_id: t.assignee_id,
            created_by_id: t.created_by_id,
            deadline_date: t.deadline_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
            parent_task_id: t.parent_task_id,
            subtask_type: t.subtask_type,
            planned_start_date: t.planned_start_date,
            planned_end_date: t.planned_end_date,
            actual_start_date: t.actual_start_date,
            actual_end_date: t.actual_end_date,
        }
    }
}
