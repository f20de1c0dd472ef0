use async_trait::async_trait;

use super::domain::{AuthUser, Credentials, RegisterInput};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, input: &RegisterInput) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: i64, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: username
        creds: Mutex<HashMap<i64, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        /// Flip the active flag of a stored user.
        pub fn set_active(&self, username: &str, active: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(username) {
                u.is_active = active;
            }
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(username).cloned())
        }

        async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, input: &RegisterInput) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&input.username) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: users.len() as i64 + 1,
                username: input.username.clone(),
                email: input.email.clone(),
                full_name: input.full_name.clone(),
                position: input.position.clone(),
                department: input.department.clone(),
                roles: models::user::split_roles(&models::user::join_roles(&input.roles)),
                is_active: true,
            };
            users.insert(input.username.clone(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: i64, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
