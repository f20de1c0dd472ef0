use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EgrnStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "egrn_extract")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub applicant_type: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cadastral_number: String,
    pub object_type: Option<String>,
    pub mvz: Option<String>,
    pub status: EgrnStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Cadastral numbers look like `77:01:0001001:1234`: colon separated digit groups.
pub fn validate_cadastral_number(value: &str) -> Result<(), ModelError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let ok = parts.len() >= 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if !ok {
        return Err(ModelError::Validation("cadastral number must look like 77:01:0001001:1234".into()));
    }
    Ok(())
}

/// Insert an extract request. Submitting through the portal always yields `SUBMITTED`.
pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    match am.cadastral_number.try_as_ref() {
        Some(n) => validate_cadastral_number(n)?,
        None => return Err(ModelError::Validation("cadastralNumber is required".into())),
    }
    am.id = NotSet;
    am.status = Set(EgrnStatus::Submitted);
    am.created_at = Set(Utc::now().into());
    am.insert(db).await.map_err(errors::db_err)
}
