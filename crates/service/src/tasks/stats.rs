//! Dashboard computations over already-loaded task lists.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use models::task::TaskStatus;

use super::domain::Task;

pub const DEFAULT_TREND_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub suspended: u64,
    pub done: u64,
    pub overdue: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub created: u64,
    pub completed: u64,
}

/// Rounded share of `done` in `total`, 0 when there is nothing to complete.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done.min(total) * 100 + total / 2) / total) as u8
}

pub fn status_counts(tasks: &[Task], today: NaiveDate) -> StatusCounts {
    let mut c = StatusCounts { total: tasks.len() as u64, ..Default::default() };
    for t in tasks {
        match t.status {
            TaskStatus::Assigned => c.assigned += 1,
            TaskStatus::InProgress => c.in_progress += 1,
            TaskStatus::Suspended => c.suspended += 1,
            TaskStatus::Done => c.done += 1,
        }
        if t.is_overdue(today) {
            c.overdue += 1;
        }
    }
    c
}

/// Not done and past deadline, oldest deadline first.
pub fn overdue(tasks: Vec<Task>, today: NaiveDate) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.into_iter().filter(|t| t.is_overdue(today)).collect();
    out.sort_by_key(|t| (t.deadline_date, t.id));
    out
}

pub fn unassigned(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().filter(|t| t.assignee_id.is_none() && !t.is_done()).collect()
}

/// Per-day created/completed counts for the `days` days ending at `today`.
/// Completion is dated by `actual_end_date`.
pub fn trend(tasks: &[Task], today: NaiveDate, days: i64) -> Vec<TrendPoint> {
    let days = days.max(1);
    let start = today - Duration::days(days - 1);
    let mut points: Vec<TrendPoint> = (0..days)
        .map(|i| TrendPoint { date: start + Duration::days(i), created: 0, completed: 0 })
        .collect();
    for t in tasks {
        let created = t.created_at.date_naive();
        if created >= start && created <= today {
            points[(created - start).num_days() as usize].created += 1;
        }
        if let Some(end) = t.actual_end_date.filter(|_| t.is_done()) {
            if end >= start && end <= today {
                points[(end - start).num_days() as usize].completed += 1;
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use models::task::{ActionType, LicenseType};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: i64, status: TaskStatus, deadline: Option<&str>) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            license_type: LicenseType::Alcohol,
            action_type: ActionType::New,
            status,
            status_reason: None,
            store_id: None,
            assignee_id: Some(1),
            created_by_id: None,
            deadline_date: deadline.map(d),
            parent_task_id: None,
            subtask_type: None,
            planned_start_date: None,
            planned_end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap().into(),
            updated_at: None,
        }
    }

    #[test]
    fn percent_rounds_and_handles_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(4, 4), 100);
    }

    #[test]
    fn counts_by_status_and_overdue() {
        let today = d("2024-03-10");
        let tasks = vec![
            task(1, TaskStatus::Assigned, Some("2024-03-01")),
            task(2, TaskStatus::InProgress, Some("2024-03-20")),
            task(3, TaskStatus::Done, Some("2024-03-01")),
            task(4, TaskStatus::Suspended, None),
        ];
        let c = status_counts(&tasks, today);
        assert_eq!(c, StatusCounts { total: 4, assigned: 1, in_progress: 1, suspended: 1, done: 1, overdue: 1 });
    }

    #[test]
    fn overdue_excludes_done_and_today() {
        let today = d("2024-03-10");
        let tasks = vec![
            task(1, TaskStatus::Assigned, Some("2024-03-09")),
            task(2, TaskStatus::Assigned, Some("2024-03-10")),
            task(3, TaskStatus::Done, Some("2024-01-01")),
            task(4, TaskStatus::InProgress, Some("2024-02-01")),
        ];
        let ids: Vec<i64> = overdue(tasks, today).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn unassigned_skips_done() {
        let mut a = task(1, TaskStatus::Assigned, None);
        a.assignee_id = None;
        let mut b = task(2, TaskStatus::Done, None);
        b.assignee_id = None;
        let c = task(3, TaskStatus::Assigned, None);
        let ids: Vec<i64> = unassigned(vec![a, b, c]).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn trend_buckets_created_and_completed() {
        let today = d("2024-03-05");
        let mut done = task(1, TaskStatus::Done, None);
        done.actual_end_date = Some(d("2024-03-04"));
        let open = task(2, TaskStatus::Assigned, None);
        let pts = trend(&[done, open], today, 5);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0].date, d("2024-03-01"));
        assert_eq!(pts[0].created, 2);
        assert_eq!(pts[3].completed, 1);
        assert_eq!(pts[4].date, today);
    }
}
