use chrono::{Months, NaiveDate};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::errors::ModelError;
use models::store;

use crate::{errors::ServiceError, pagination::{Page, Pagination}};

/// A license counts as expiring when it runs out within this many months.
pub const EXPIRING_WITHIN_MONTHS: u32 = 3;

/// Editable store fields; update replaces all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub mvz: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub cfo: Option<String>,
    pub oktmo: Option<String>,
    #[serde(default)]
    pub has_restriction: bool,
    pub mun_area: Option<String>,
    pub mun_district: Option<String>,
    pub be: Option<String>,
    pub close_date: Option<NaiveDate>,
    pub director_phone: Option<String>,
    #[serde(default)]
    pub inn: String,
    pub kpp: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub alcohol_license_expiry: Option<NaiveDate>,
    pub tobacco_license_expiry: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl StoreRequest {
    fn into_active(self, mut am: store::ActiveModel) -> store::ActiveModel {
        am.mvz = Set(self.mvz);
        am.name = Set(self.name.trim().to_string());
        am.address = Set(self.address.trim().to_string());
        am.cfo = Set(self.cfo);
        am.oktmo = Set(self.oktmo);
        am.has_restriction = Set(self.has_restriction);
        am.mun_area = Set(self.mun_area);
        am.mun_district = Set(self.mun_district);
        am.be = Set(self.be);
        am.close_date = Set(self.close_date);
        am.director_phone = Set(self.director_phone);
        am.inn = Set(self.inn.trim().to_string());
        am.kpp = Set(self.kpp);
        am.contact_person = Set(self.contact_person);
        am.phone = Set(self.phone);
        am.email = Set(self.email);
        am.alcohol_license_expiry = Set(self.alcohol_license_expiry);
        am.tobacco_license_expiry = Set(self.tobacco_license_expiry);
        am.is_active = Set(self.is_active.unwrap_or(true));
        am
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub active: Option<bool>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCounts {
    /// Expiry today or later
    pub active: u64,
    /// Active and expiring within the window
    pub expiring: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStats {
    pub total_active_stores: u64,
    pub alcohol: LicenseCounts,
    pub tobacco: LicenseCounts,
}

/// License counters over active stores.
pub fn license_stats(stores: &[store::Model], today: NaiveDate) -> LicenseStats {
    let horizon = today.checked_add_months(Months::new(EXPIRING_WITHIN_MONTHS)).unwrap_or(NaiveDate::MAX);
    let mut stats = LicenseStats::default();
    for s in stores.iter().filter(|s| s.is_active) {
        stats.total_active_stores += 1;
        for (expiry, counts) in [(s.alcohol_license_expiry, &mut stats.alcohol), (s.tobacco_license_expiry, &mut stats.tobacco)] {
            if let Some(exp) = expiry.filter(|e| *e >= today) {
                counts.active += 1;
                if exp <= horizon {
                    counts.expiring += 1;
                }
            }
        }
    }
    stats
}

#[instrument(skip(db))]
pub async fn list_stores(
    db: &DatabaseConnection,
    filter: &StoreFilter,
    paging: Option<Pagination>,
) -> Result<Page<store::Model>, ServiceError> {
    let mut cond = Condition::all();
    if let Some(active) = filter.active {
        cond = cond.add(store::Column::IsActive.eq(active));
    }
    if let Some(q) = filter.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", q.to_lowercase());
        cond = cond.add(Expr::expr(Func::lower(Expr::col(store::Column::Name))).like(pattern));
    }
    let query = store::Entity::find().filter(cond).order_by_asc(store::Column::Name);
    match paging {
        None => Ok(Page::all(query.all(db).await?)),
        Some(p) => {
            let (page_idx, per_page) = p.normalize();
            let paginator = query.paginate(db, per_page);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page_idx).await?;
            Ok(Page { items, total, page: page_idx as u32 + 1, per_page: per_page as u32 })
        }
    }
}

pub async fn get_store(db: &DatabaseConnection, id: i64) -> Result<store::Model, ServiceError> {
    store::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("store"))
}

#[instrument(skip(db, req), fields(inn = %req.inn))]
pub async fn create_store(db: &DatabaseConnection, req: StoreRequest) -> Result<store::Model, ServiceError> {
    let am = req.into_active(store::ActiveModel { id: NotSet, ..Default::default() });
    let created = store::create(db, am).await?;
    info!(store_id = created.id, "store_created");
    Ok(created)
}

#[instrument(skip(db, req))]
pub async fn update_store(db: &DatabaseConnection, id: i64, req: StoreRequest) -> Result<store::Model, ServiceError> {
    let existing = get_store(db, id).await?;
    if req.name.trim().is_empty() || req.address.trim().is_empty() {
        return Err(ServiceError::Validation("name and address are required".into()));
    }
    store::validate_inn(&req.inn)?;
    let am = req.into_active(existing.into());
    let updated = am
        .update(db)
        .await
        .map_err(|e| ModelError::from_db(e, "store with this INN already exists"))?;
    info!(store_id = id, "store_updated");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete_store(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let res = store::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("store"));
    }
    info!(store_id = id, "store_deleted");
    Ok(())
}

pub async fn store_license_stats(db: &DatabaseConnection, today: NaiveDate) -> Result<LicenseStats, ServiceError> {
    let stores = store::Entity::find()
        .filter(store::Column::IsActive.eq(true))
        .all(db)
        .await?;
    Ok(license_stats(&stores, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store(id: i64, active: bool, alcohol: Option<&str>, tobacco: Option<&str>) -> store::Model {
        store::Model {
            id,
            mvz: None,
            name: format!("Магазин {id}"),
            address: "Москва".into(),
            cfo: None,
            oktmo: None,
            has_restriction: false,
            mun_area: None,
            mun_district: None,
            be: None,
            close_date: None,
            director_phone: None,
            inn: "7707083893".into(),
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
    fn license_stats_counts_active_and_expiring() {
        let today = d("2024-01-15");
        let stores = vec![
            store(1, true, Some("2024-03-01"), Some("2025-01-01")),
            store(2, true, Some("2024-01-14"), Some("2024-04-15")),
            store(3, true, None, Some("2024-04-16")),
            store(4, false, Some("2024-02-01"), Some("2024-02-01")),
        ];
        let s = license_stats(&stores, today);
        assert_eq!(s.total_active_stores, 3);
        assert_eq!(s.alcohol, LicenseCounts { active: 1, expiring: 1 });
        assert_eq!(s.tobacco, LicenseCounts { active: 3, expiring: 1 });
    }

    #[tokio::test]
    async fn store_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let inn = format!("{:010}", uuid::Uuid::new_v4().as_u128() % 10_000_000_000);
        let req = StoreRequest {
            name: "Тестовый магазин".into(),
            address: "г. Москва, ул. Тверская, 1".into(),
            inn: inn.clone(),
            alcohol_license_expiry: Some(d("2030-01-01")),
            ..Default::default()
        };
        let created = create_store(&db, req.clone()).await?;
        assert!(created.is_active);
        assert!(matches!(create_store(&db, req.clone()).await, Err(ServiceError::Conflict(_))));

        let page = list_stores(&db, &StoreFilter { active: Some(true), search: Some("естовый".into()) }, None).await?;
        assert!(page.items.iter().any(|s| s.id == created.id));

        let mut upd = req;
        upd.name = "Переименован".into();
        upd.is_active = Some(false);
        let updated = update_store(&db, created.id, upd).await?;
        assert_eq!(updated.name, "Переименован");
        assert!(!updated.is_active);

        delete_store(&db, created.id).await?;
        assert!(matches!(get_store(&db, created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
