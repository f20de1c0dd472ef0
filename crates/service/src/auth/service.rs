use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, Claims};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl_hours: c.token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "s".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
    /// let input = RegisterInput {
    ///     username: "manager".into(), email: Some("manager@licensing.com".into()), full_name: "Иванов Иван".into(),
    ///     position: None, department: None, roles: vec!["MANAGER".into()], password: "manager123".into(),
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "manager");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input).await?;
        let hash = hash_password(&input.password)?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = user.id, username = %user.username, roles = ?user.roles, "user_registered");
        Ok(user)
    }

    /// Authenticate by username/password and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 12, password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput {
    ///     username: "admin".into(), email: None, full_name: "Admin".into(), position: None, department: None,
    ///     roles: vec!["ADMIN".into()], password: "admin123".into(),
    /// }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "admin".into(), password: "admin123".into() })).unwrap();
    /// assert_eq!(session.user.username, "admin");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_username(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = user.id, "login_failed");
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            return Err(AuthError::Disabled);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, "login_ok");
        Ok(AuthSession { user, token })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: user.username.clone(), uid: user.id, roles: user.roles.clone(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and validate a bearer token (signature and expiry).
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation)
            .map(|d| d.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Current user behind a token's `uid`.
    pub async fn current_user(&self, user_id: i64) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    /// Replace a user's password.
    pub async fn set_password(&self, user_id: i64, password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let hash = hash_password(password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}
