use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::egrn_extract;

use crate::errors::ServiceError;

/// EGRN extract request form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgrnRequest {
    pub applicant_type: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub cadastral_number: String,
    pub object_type: Option<String>,
    pub mvz: Option<String>,
}

#[instrument(skip(db, req), fields(cadastral = %req.cadastral_number))]
pub async fn create_extract(db: &DatabaseConnection, req: EgrnRequest) -> Result<egrn_extract::Model, ServiceError> {
    if let Some(email) = req.email.as_deref().filter(|e| !e.trim().is_empty()) {
        models::user::validate_email(email.trim())?;
    }
    let am = egrn_extract::ActiveModel {
        applicant_type: Set(req.applicant_type),
        phone: Set(req.phone),
        email: Set(req.email),
        cadastral_number: Set(req.cadastral_number.trim().to_string()),
        object_type: Set(req.object_type),
        mvz: Set(req.mvz),
        ..Default::default()
    };
    let created = egrn_extract::create(db, am).await?;
    info!(extract_id = created.id, "egrn_extract_submitted");
    Ok(created)
}

pub async fn get_extract(db: &DatabaseConnection, id: i64) -> Result<egrn_extract::Model, ServiceError> {
    egrn_extract::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("egrn extract"))
}

/// Newest first.
pub async fn list_extracts(db: &DatabaseConnection) -> Result<Vec<egrn_extract::Model>, ServiceError> {
    Ok(egrn_extract::Entity::find()
        .order_by_desc(egrn_extract::Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::egrn_extract::EgrnStatus;

    #[tokio::test]
    async fn submitted_extract_roundtrip() -> Result<(), anyhow::Error> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let created = create_extract(&db, EgrnRequest {
            applicant_type: Some("Юридическое лицо".into()),
            cadastral_number: "77:01:0001001:1234".into(),
            email: Some("egrn@licensing.com".into()),
            ..Default::default()
        })
        .await?;
        assert_eq!(created.status, EgrnStatus::Submitted);
        assert_eq!(get_extract(&db, created.id).await?.cadastral_number, "77:01:0001001:1234");
        assert!(list_extracts(&db).await?.iter().any(|e| e.id == created.id));
        egrn_extract::Entity::delete_by_id(created.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn bad_input_is_validation_error() {
        let Some(db) = crate::test_support::get_db().await else { return };
        let bad_number = EgrnRequest { cadastral_number: "not-a-number".into(), ..Default::default() };
        assert!(matches!(create_extract(&db, bad_number).await, Err(ServiceError::Validation(_))));
        let bad_email = EgrnRequest {
            cadastral_number: "77:01:0001001:1".into(),
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(create_extract(&db, bad_email).await, Err(ServiceError::Validation(_))));
    }
}
