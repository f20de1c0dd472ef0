use chrono::NaiveDate;
use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub mvz: Option<String>,
    pub name: String,
    pub address: String,
    pub cfo: Option<String>,
    pub oktmo: Option<String>,
    pub has_restriction: bool,
    pub mun_area: Option<String>,
    pub mun_district: Option<String>,
    pub be: Option<String>,
    pub close_date: Option<Date>,
    pub director_phone: Option<String>,
    #[sea_orm(unique)]
    pub inn: String,
    pub kpp: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub alcohol_license_expiry: Option<Date>,
    pub tobacco_license_expiry: Option<Date>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::task::Entity")]
    Task,
}

impl Related<crate::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn license_expiry(&self, alcohol: bool) -> Option<NaiveDate> {
        if alcohol { self.alcohol_license_expiry } else { self.tobacco_license_expiry }
    }
}

/// INN of a legal entity has 10 digits, of an individual entrepreneur 12.
pub fn validate_inn(inn: &str) -> Result<(), ModelError> {
    let inn = inn.trim();
    if !(inn.len() == 10 || inn.len() == 12) || !inn.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("inn must be 10 or 12 digits".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, mut am: ActiveModel) -> Result<Model, ModelError> {
    errors::required_value("name", &am.name)?;
    errors::required_value("address", &am.address)?;
    match am.inn.try_as_ref() {
        Some(inn) => validate_inn(inn)?,
        None => return Err(ModelError::Validation("inn is required".into())),
    }
    am.id = NotSet;
    am.insert(db)
        .await
        .map_err(|e| ModelError::from_db(e, "store with this INN already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inn_lengths() {
        assert!(validate_inn("7707083893").is_ok());
        assert!(validate_inn("500100732259").is_ok());
        assert!(validate_inn("77070838").is_err());
        assert!(validate_inn("77070838AB").is_err());
        assert!(validate_inn("").is_err());
    }
}
