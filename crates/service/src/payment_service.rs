use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::payment::{self, PaymentStatus, PaymentType};
use models::{payment_store, store, task};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub task_id: Option<i64>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<FixedOffset>>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub region: Option<String>,
    pub retail_network: Option<String>,
    pub legal_entity: Option<String>,
    pub payment_recipient: Option<String>,
    pub oktmo: Option<String>,
    #[serde(default)]
    pub bank_mark_required: bool,
    /// Stores covered by a mass payment
    #[serde(default)]
    pub store_ids: Vec<i64>,
}

/// Payment with the ids of the stores it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: payment::Model,
    pub store_ids: Vec<i64>,
}

#[instrument(skip(db, req), fields(task_id = ?req.task_id, stores = req.store_ids.len()))]
pub async fn create_payment(db: &DatabaseConnection, req: PaymentRequest) -> Result<PaymentView, ServiceError> {
    let amount = req.amount.ok_or_else(|| ServiceError::Validation("amount is required".into()))?;
    payment::validate_amount(amount)?;
    if let Some(task_id) = req.task_id {
        if task::Entity::find_by_id(task_id).count(db).await? == 0 {
            return Err(ServiceError::Validation(format!("task {task_id} does not exist")));
        }
    }
    let mut store_ids = req.store_ids.clone();
    store_ids.sort_unstable();
    store_ids.dedup();
    if !store_ids.is_empty() {
        let found = store::Entity::find()
            .filter(store::Column::Id.is_in(store_ids.clone()))
            .count(db)
            .await?;
        if found != store_ids.len() as u64 {
            return Err(ServiceError::Validation("one or more stores do not exist".into()));
        }
    }

    let am = payment::ActiveModel {
        task_id: Set(req.task_id),
        amount: Set(amount),
        payment_type: Set(req.payment_type),
        status: req.status.map(Set).unwrap_or_default(),
        payment_date: Set(req.payment_date),
        payment_reference: Set(req.payment_reference),
        notes: Set(req.notes),
        region: Set(req.region),
        retail_network: Set(req.retail_network),
        legal_entity: Set(req.legal_entity),
        payment_recipient: Set(req.payment_recipient),
        oktmo: Set(req.oktmo),
        bank_mark_required: Set(req.bank_mark_required),
        ..Default::default()
    };
    let txn = db.begin().await?;
    let created = payment::create(&txn, am, &store_ids).await?;
    txn.commit().await?;
    info!(payment_id = created.id, amount = %created.amount, "payment_created");
    Ok(PaymentView { payment: created, store_ids })
}

pub async fn list_payments(db: &DatabaseConnection) -> Result<Vec<PaymentView>, ServiceError> {
    let rows = payment::Entity::find().order_by_desc(payment::Column::CreatedAt).all(db).await?;
    with_stores(db, rows).await
}

pub async fn get_payment(db: &DatabaseConnection, id: i64) -> Result<PaymentView, ServiceError> {
    let p = payment::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("payment"))?;
    let store_ids = payment_store::store_ids(db, p.id).await?;
    Ok(PaymentView { payment: p, store_ids })
}

pub async fn payments_by_task(db: &DatabaseConnection, task_id: i64) -> Result<Vec<PaymentView>, ServiceError> {
    let rows = payment::Entity::find()
        .filter(payment::Column::TaskId.eq(task_id))
        .order_by_desc(payment::Column::CreatedAt)
        .all(db)
        .await?;
    with_stores(db, rows).await
}

/// Stamp the payment date on first completion.
pub fn completion_date(
    status: PaymentStatus,
    current: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    match (status, current) {
        (PaymentStatus::Completed, None) => Some(now),
        (_, current) => current,
    }
}

#[instrument(skip(db))]
pub async fn update_payment_status(db: &DatabaseConnection, id: i64, status: PaymentStatus) -> Result<PaymentView, ServiceError> {
    let existing = payment::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("payment"))?;
    let from = existing.status;
    let payment_date = completion_date(status, existing.payment_date, Utc::now().into());
    let mut am: payment::ActiveModel = existing.into();
    am.status = Set(status);
    am.payment_date = Set(payment_date);
    let updated = am.update(db).await?;
    info!(payment_id = id, from = ?from, to = ?status, "payment_status_changed");
    let store_ids = payment_store::store_ids(db, id).await?;
    Ok(PaymentView { payment: updated, store_ids })
}

async fn with_stores(db: &DatabaseConnection, rows: Vec<payment::Model>) -> Result<Vec<PaymentView>, ServiceError> {
    let mut out = Vec::with_capacity(rows.len());
    for p in rows {
        let store_ids = payment_store::store_ids(db, p.id).await?;
        out.push(PaymentView { payment: p, store_ids });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn completion_stamps_once() {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let earlier = now - chrono::Duration::days(3);
        assert_eq!(completion_date(PaymentStatus::Completed, None, now), Some(now));
        assert_eq!(completion_date(PaymentStatus::Completed, Some(earlier), now), Some(earlier));
        assert_eq!(completion_date(PaymentStatus::Failed, None, now), None);
    }

    #[test]
    fn request_uses_type_key() {
        let req: PaymentRequest = serde_json::from_str(
            r#"{"amount": 3500.0, "type": "STATE_FEE", "storeIds": [1, 2], "bankMarkRequired": true}"#,
        )
        .unwrap();
        assert_eq!(req.payment_type, Some(PaymentType::StateFee));
        assert_eq!(req.store_ids, vec![1, 2]);
        assert!(req.bank_mark_required);
    }

    #[tokio::test]
    async fn create_and_complete_payment() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let req = PaymentRequest { amount: Some(Decimal::from_str("3500.00")?), ..Default::default() };
        let created = create_payment(&db, req).await?;
        assert_eq!(created.payment.status, PaymentStatus::Pending);
        assert!(created.store_ids.is_empty());

        let done = update_payment_status(&db, created.payment.id, PaymentStatus::Completed).await?;
        assert!(done.payment.payment_date.is_some());

        let bad = PaymentRequest { amount: Some(Decimal::ZERO), ..Default::default() };
        assert!(matches!(create_payment(&db, bad).await, Err(ServiceError::Validation(_))));
        let missing_task = PaymentRequest { amount: Some(Decimal::ONE), task_id: Some(i64::MAX), ..Default::default() };
        assert!(matches!(create_payment(&db, missing_task).await, Err(ServiceError::Validation(_))));

        payment::Entity::delete_by_id(created.payment.id).exec(&db).await?;
        Ok(())
    }
}
