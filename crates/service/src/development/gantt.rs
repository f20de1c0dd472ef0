//! Gantt chart layout for a project's tasks.
//!
//! A task's bar runs from its creation date to its normative deadline. The
//! visible range is padded by two days on each side.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use models::project_task;

pub const PADDING_DAYS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttBar {
    pub task_id: i64,
    pub name: String,
    pub status: String,
    /// Days from the first day of the range
    pub start_offset: i64,
    /// Length in days, at least one
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub bars: Vec<GanttBar>,
}

/// Lay out `tasks`. No tasks gives an empty range anchored at `today`.
pub fn timeline(tasks: &[project_task::Model], today: NaiveDate) -> Timeline {
    let spans: Vec<(NaiveDate, NaiveDate)> = tasks
        .iter()
        .map(|t| (t.created_at.date_naive(), t.normative_deadline))
        .collect();
    let Some(min) = spans.iter().flat_map(|(a, b)| [*a, *b]).min() else {
        return Timeline { start: today, end: today, days: Vec::new(), bars: Vec::new() };
    };
    let max = spans.iter().flat_map(|(a, b)| [*a, *b]).max().unwrap_or(min);
    let start = min - Duration::days(PADDING_DAYS);
    let end = max + Duration::days(PADDING_DAYS);
    let days = start.iter_days().take_while(|d| *d <= end).collect();
    let bars = tasks
        .iter()
        .zip(spans)
        .map(|(t, (from, to))| GanttBar {
            task_id: t.id,
            name: t.name.clone(),
            status: t.status.clone(),
            start_offset: (from - start).num_days().abs(),
            duration: (to - from).num_days().abs().max(1),
        })
        .collect();
    Timeline { start, end, days, bars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: i64, created: &str, deadline: &str) -> project_task::Model {
        let c = d(created);
        project_task::Model {
            id,
            project_id: 1,
            name: format!("task {id}"),
            task_type: "Планирование аудита".into(),
            responsible: "НОР".into(),
            normative_deadline: d(deadline),
            actual_date: None,
            status: "Назначена".into(),
            created_at: Utc.from_utc_datetime(&c.and_hms_opt(12, 0, 0).unwrap()).into(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_project_has_no_days() {
        let t = timeline(&[], d("2024-01-01"));
        assert!(t.days.is_empty());
        assert!(t.bars.is_empty());
    }

    #[test]
    fn range_is_padded_and_offsets_counted() {
        let tasks = vec![task(1, "2024-03-01", "2024-03-08"), task(2, "2024-03-05", "2024-03-19")];
        let t = timeline(&tasks, d("2024-03-10"));
        assert_eq!(t.start, d("2024-02-28"));
        assert_eq!(t.end, d("2024-03-21"));
        assert_eq!(t.days.len(), 23);
        assert_eq!(t.bars[0].start_offset, 2);
        assert_eq!(t.bars[0].duration, 7);
        assert_eq!(t.bars[1].start_offset, 6);
        assert_eq!(t.bars[1].duration, 14);
    }

    #[test]
    fn same_day_task_lasts_one_day() {
        let t = timeline(&[task(1, "2024-03-01", "2024-03-01")], d("2024-03-01"));
        assert_eq!(t.bars[0].duration, 1);
        assert_eq!(t.days.len(), 5);
    }
}
