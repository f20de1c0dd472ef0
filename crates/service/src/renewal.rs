//! Daily license renewal planner.
//!
//! Every active store whose alcohol or tobacco license runs out within the
//! lookahead window gets a `RENEWAL` task, unless an open renewal task for the
//! same store and license type already exists.

use std::collections::HashSet;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use configs::RenewalConfig;
use models::task::{ActionType, LicenseType, TaskStatus};
use models::{store, task, user};

use crate::errors::ServiceError;
use crate::tasks::domain::NewTask;
use crate::tasks::repo::seaorm::SeaOrmTaskRepository;
use crate::tasks::repository::TaskRepository;

pub const DESCRIPTION: &str = "Автоматически созданная задача на продление лицензии.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRenewal {
    pub store_id: i64,
    pub store_name: String,
    pub license_type: LicenseType,
    pub deadline: NaiveDate,
}

impl PlannedRenewal {
    pub fn title(&self) -> String {
        let kind = match self.license_type {
            LicenseType::Alcohol => "алкогольной",
            LicenseType::Tobacco => "табачной",
        };
        format!("Продление {kind} лицензии - {}", self.store_name)
    }

    pub fn into_task(self, assignee_id: Option<i64>) -> NewTask {
        NewTask {
            title: self.title(),
            description: Some(DESCRIPTION.to_string()),
            license_type: self.license_type,
            action_type: ActionType::Renewal,
            status: TaskStatus::Assigned,
            status_reason: None,
            store_id: Some(self.store_id),
            assignee_id,
            created_by_id: assignee_id,
            deadline_date: Some(self.deadline),
            parent_task_id: None,
            subtask_type: None,
            planned_start_date: None,
            planned_end_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalReport {
    pub created: usize,
    pub task_ids: Vec<i64>,
}

/// Pure planning step. `open_renewals` holds `(store_id, license_type)` of
/// renewal tasks that are still active.
pub fn plan_renewals(
    stores: &[store::Model],
    open_renewals: &HashSet<(i64, LicenseType)>,
    today: NaiveDate,
    lookahead_months: u32,
) -> Vec<PlannedRenewal> {
    let horizon = today.checked_add_months(Months::new(lookahead_months)).unwrap_or(NaiveDate::MAX);
    let mut out = Vec::new();
    for s in stores.iter().filter(|s| s.is_active) {
        for lt in [LicenseType::Alcohol, LicenseType::Tobacco] {
            let Some(expiry) = s.license_expiry(lt == LicenseType::Alcohol) else { continue };
            if expiry > horizon || open_renewals.contains(&(s.id, lt)) {
                continue;
            }
            out.push(PlannedRenewal {
                store_id: s.id,
                store_name: s.name.clone(),
                license_type: lt,
                deadline: expiry.max(today),
            });
        }
    }
    out
}

/// Next run at `hour:00` local time strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today_run = now.date().and_time(at);
    if today_run > now {
        today_run
    } else {
        today_run + Duration::days(1)
    }
}

async fn default_assignee(db: &DatabaseConnection) -> Result<Option<i64>, ServiceError> {
    for username in ["manager", "admin"] {
        if let Some(u) = user::Entity::find().filter(user::Column::Username.eq(username)).one(db).await? {
            return Ok(Some(u.id));
        }
    }
    Ok(None)
}

/// Plan and insert renewal tasks as of `today`.
#[instrument(skip(db, cfg))]
pub async fn run_once(db: &DatabaseConnection, cfg: &RenewalConfig, today: NaiveDate) -> Result<RenewalReport, ServiceError> {
    let stores = store::Entity::find().filter(store::Column::IsActive.eq(true)).all(db).await?;
    let open: Vec<(Option<i64>, LicenseType)> = task::Entity::find()
        .select_only()
        .columns([task::Column::StoreId, task::Column::LicenseType])
        .filter(task::Column::ActionType.eq(ActionType::Renewal))
        .filter(task::Column::Status.is_in(TaskStatus::ACTIVE))
        .into_tuple()
        .all(db)
        .await?;
    let open: HashSet<(i64, LicenseType)> = open.into_iter().filter_map(|(s, lt)| s.map(|s| (s, lt))).collect();

    let planned = plan_renewals(&stores, &open, today, cfg.lookahead_months);
    if planned.is_empty() {
        debug!("no renewals due");
        return Ok(RenewalReport::default());
    }
    let assignee = default_assignee(db).await?;
    let repo = SeaOrmTaskRepository::new(db.clone());
    let mut report = RenewalReport::default();
    for p in planned {
        let (store_id, lt) = (p.store_id, p.license_type);
        let created = repo.insert(p.into_task(assignee)).await?;
        info!(task_id = created.id, store_id, license = ?lt, "renewal_task_created");
        report.task_ids.push(created.id);
    }
    report.created = report.task_ids.len();
    Ok(report)
}

/// Run the planner every day at `cfg.run_hour` local time.
pub fn spawn(db: DatabaseConnection, cfg: RenewalConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, cfg.run_hour);
            let wait = (next - now).to_std().unwrap_or(StdDuration::from_secs(60));
            info!(next_run = %next, "renewal_scheduled");
            tokio::time::sleep(wait).await;
            match run_once(&db, &cfg, Local::now().date_naive()).await {
                Ok(r) => info!(created = r.created, "renewal_run_done"),
                Err(e) => error!(error = %e, "renewal_run_failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store(id: i64, active: bool, alcohol: Option<&str>, tobacco: Option<&str>) -> store::Model {
        store::Model {
            id,
            mvz: None,
            name: format!("Магазин №{id}"),
            address: "Москва".into(),
            cfo: None,
            oktmo: None,
            has_restriction: false,
            mun_area: None,
            mun_district: None,
            be: None,
            close_date: None,
            director_phone: None,
            inn: format!("77{:010}", id),
            kpp: None,
            contact_person: None,
            phone: None,
            email: None,
            alcohol_license_expiry: alcohol.map(d),
            tobacco_license_expiry: tobacco.map(d),
            is_active: active,
        }
    }

    #[test]
    fn plans_within_horizon_only() {
        let today = d("2024-01-10");
        let stores = vec![
            store(1, true, Some("2024-04-10"), Some("2024-04-11")),
            store(2, false, Some("2024-02-01"), None),
            store(3, true, None, Some("2023-12-01")),
        ];
        let plan = plan_renewals(&stores, &HashSet::new(), today, 3);
        let got: Vec<(i64, LicenseType, NaiveDate)> = plan.iter().map(|p| (p.store_id, p.license_type, p.deadline)).collect();
        assert_eq!(got, vec![
            (1, LicenseType::Alcohol, d("2024-04-10")),
            (3, LicenseType::Tobacco, today),
        ]);
        assert_eq!(plan[0].title(), "Продление алкогольной лицензии - Магазин №1");
        assert_eq!(plan[1].title(), "Продление табачной лицензии - Магазин №3");
    }

    #[test]
    fn skips_stores_with_open_renewal() {
        let today = d("2024-01-10");
        let stores = vec![store(1, true, Some("2024-02-01"), Some("2024-02-01"))];
        let open = HashSet::from([(1, LicenseType::Alcohol)]);
        let plan = plan_renewals(&stores, &open, today, 3);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].license_type, LicenseType::Tobacco);
    }

    #[test]
    fn planned_task_shape() {
        let p = PlannedRenewal { store_id: 5, store_name: "X".into(), license_type: LicenseType::Alcohol, deadline: d("2024-05-01") };
        let t = p.into_task(Some(2));
        assert_eq!(t.action_type, ActionType::Renewal);
        assert_eq!(t.status, TaskStatus::Assigned);
        assert_eq!(t.assignee_id, Some(2));
        assert_eq!(t.created_by_id, Some(2));
        assert_eq!(t.description.as_deref(), Some(DESCRIPTION));
    }

    #[test]
    fn next_run_today_or_tomorrow() {
        let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(next_run_after(at("2024-01-10 08:59:59"), 9), at("2024-01-10 09:00:00"));
        assert_eq!(next_run_after(at("2024-01-10 09:00:00"), 9), at("2024-01-11 09:00:00"));
        assert_eq!(next_run_after(at("2024-12-31 23:30:00"), 9), at("2025-01-01 09:00:00"));
    }

    #[tokio::test]
    async fn run_once_is_idempotent() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let today = Local::now().date_naive();
        let inn = format!("{:010}", uuid::Uuid::new_v4().as_u128() % 10_000_000_000);
        let s = store::create(&db, store::ActiveModel {
            name: sea_orm::Set(format!("Renewal {inn}")),
            address: sea_orm::Set("Москва".into()),
            inn: sea_orm::Set(inn),
            has_restriction: sea_orm::Set(false),
            is_active: sea_orm::Set(true),
            alcohol_license_expiry: sea_orm::Set(Some(today + Duration::days(10))),
            ..Default::default()
        })
        .await?;
        let cfg = RenewalConfig::default();
        let first = run_once(&db, &cfg, today).await?;
        let mine: Vec<task::Model> = task::Entity::find().filter(task::Column::StoreId.eq(s.id)).all(&db).await?;
        assert_eq!(mine.len(), 1);
        assert!(first.task_ids.contains(&mine[0].id));

        run_once(&db, &cfg, today).await?;
        let again = task::Entity::find().filter(task::Column::StoreId.eq(s.id)).all(&db).await?;
        assert_eq!(again.len(), 1);

        task::Entity::delete_by_id(mine[0].id).exec(&db).await?;
        store::Entity::delete_by_id(s.id).exec(&db).await?;
        Ok(())
    }
}
