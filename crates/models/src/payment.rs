use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[sea_orm(string_value = "STATE_FEE")]
    StateFee,
    #[sea_orm(string_value = "FINE")]
    Fine,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub payment_date: Option<DateTimeWithTimeZone>,
    pub payment_reference: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub region: Option<String>,
    pub retail_network: Option<String>,
    pub legal_entity: Option<String>,
    pub payment_recipient: Option<String>,
    pub oktmo: Option<String>,
    pub bank_mark_required: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Task,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Task => Entity::belongs_to(crate::task::Entity)
                .from(Column::TaskId)
                .to(crate::task::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<crate::store::Entity> for Entity {
    fn to() -> RelationDef {
        crate::payment_store::Relation::Store.def()
    }

    fn via() -> Option<RelationDef> {
        Some(crate::payment_store::Relation::Payment.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Largest value the `decimal(10,2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub fn validate_amount(amount: Decimal) -> Result<(), ModelError> {
    if amount <= Decimal::ZERO {
        return Err(ModelError::Validation("amount must be positive".into()));
    }
    if amount.normalize().scale() > 2 {
        return Err(ModelError::Validation("amount must have at most 2 decimal places".into()));
    }
    if amount > MAX_AMOUNT {
        return Err(ModelError::Validation(format!("amount must not exceed {MAX_AMOUNT}")));
    }
    Ok(())
}

/// Insert a payment and link it to `store_ids`. Status defaults to `PENDING`.
pub async fn create<C: ConnectionTrait>(db: &C, mut am: ActiveModel, store_ids: &[i64]) -> Result<Model, ModelError> {
    match am.amount.try_as_ref() {
        Some(a) => validate_amount(*a)?,
        None => return Err(ModelError::Validation("amount is required".into())),
    }
    if am.status.is_not_set() {
        am.status = Set(PaymentStatus::Pending);
    }
    if am.bank_mark_required.is_not_set() {
        am.bank_mark_required = Set(false);
    }
    am.id = NotSet;
    am.created_at = Set(Utc::now().into());
    let created = am.insert(db).await.map_err(errors::db_err)?;
    crate::payment_store::link(db, created.id, store_ids).await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(Decimal::from_str("3500.00").unwrap()).is_ok());
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from_str("-1").unwrap()).is_err());
        assert!(validate_amount(Decimal::from_str("1.005").unwrap()).is_err());
        assert!(validate_amount(Decimal::from_str("1.500").unwrap()).is_ok());
    }

    #[test]
    fn amount_fits_column_precision() {
        assert_eq!(MAX_AMOUNT, Decimal::from_str("99999999.99").unwrap());
        assert!(validate_amount(Decimal::from_str("99999999.99").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("100000000.00").unwrap()).is_err());
        assert!(validate_amount(Decimal::from_str("1000000000.5").unwrap()).is_err());
    }
}
