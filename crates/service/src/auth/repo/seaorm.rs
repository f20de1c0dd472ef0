use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::auth::domain::{AuthUser, Credentials, RegisterInput};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use models::errors::ModelError;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, input: &RegisterInput) -> Result<AuthUser, AuthError> {
        let roles: Vec<&str> = input.roles.iter().map(String::as_str).collect();
        let created = models::user::create(&self.db, &input.username, input.email.as_deref(), &input.full_name, &roles)
            .await
            .map_err(|e| match e {
                ModelError::Conflict(_) => AuthError::Conflict,
                ModelError::Validation(m) => AuthError::Validation(m),
                other => AuthError::Repository(other.to_string()),
            })?;
        if input.position.is_none() && input.department.is_none() {
            return Ok(created.into());
        }
        let mut am: models::user::ActiveModel = created.into();
        am.position = Set(input.position.clone());
        am.department = Set(input.department.clone());
        let updated = am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(updated.into())
    }

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: i64, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }
}
