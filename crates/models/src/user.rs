use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_MANAGER: &str = "MANAGER";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub roles: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "crate::user_credentials::Entity")]
    Credentials,
}

impl Related<crate::user_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credentials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role_list(&self) -> Vec<String> {
        split_roles(&self.roles)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.split(',').any(|r| r.trim().eq_ignore_ascii_case(role))
    }
}

pub fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty())
        .collect()
}

pub fn join_roles<S: AsRef<str>>(roles: &[S]) -> String {
    roles.iter().map(|r| r.as_ref().trim().to_uppercase()).collect::<Vec<_>>().join(",")
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(ModelError::Validation("username must be 3-64 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(ModelError::Validation("username may contain letters, digits, '.', '_' and '-'".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let ok = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !ok {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    username: &str,
    email: Option<&str>,
    full_name: &str,
    roles: &[&str],
) -> Result<Model, ModelError> {
    validate_username(username)?;
    if let Some(e) = email {
        validate_email(e)?;
    }
    errors::required("fullName", full_name)?;
    let am = ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.map(str::to_string)),
        full_name: Set(full_name.to_string()),
        roles: Set(join_roles(roles)),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| ModelError::from_db(e, "username already exists"))
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(errors::db_err)
}
