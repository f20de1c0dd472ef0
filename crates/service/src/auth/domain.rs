use serde::{Deserialize, Serialize};

/// Registration input (admin/seed operation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub roles: Vec<String>,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == models::user::ROLE_ADMIN)
    }
}

impl From<models::user::Model> for AuthUser {
    fn from(u: models::user::Model) -> Self {
        let roles = u.role_list();
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            position: u.position,
            department: u.department,
            roles,
            is_active: u.is_active,
        }
    }
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: i64,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// JWT payload carried by every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// username
    pub sub: String,
    pub uid: i64,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == models::user::ROLE_ADMIN)
    }
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}
