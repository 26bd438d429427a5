//! Admin accounts.

use chrono::Utc;
use marketplace_common::{AppError, AppResult, IdGenerator};
use marketplace_db::{entities::admin, repositories::AdminRepository};
use rand::Rng;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::auth::{Role, TokenService, hash_password, validate_password, verify_password};
use super::form::normalize_email;

const REFERRAL_PREFIX: &str = "ADMIN-REF-";
const MAX_CODE_ATTEMPTS: usize = 16;

/// Input for the bootstrap admin.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminRegistration {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Registration or login result.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub admin: admin::Model,
    pub token: String,
}

/// Admin service.
#[derive(Clone)]
pub struct AdminService {
    admin_repo: AdminRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(admin_repo: AdminRepository, tokens: TokenService) -> Self {
        Self {
            admin_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create the first admin. Refused once any admin exists.
    pub async fn register(&self, input: AdminRegistration) -> AppResult<AdminSession> {
        input.validate()?;
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        if self.admin_repo.count().await? > 0 {
            return Err(AppError::Forbidden(
                "Admin registration is closed".to_string(),
            ));
        }

        let model = admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password: Set(hash_password(&input.password)?),
            role: Set("admin".to_string()),
            referral_code: Set(self.unique_referral_code().await?),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let admin = self.admin_repo.create(model).await?;
        info!(admin_id = %admin.id, "Admin registered");
        self.session(admin)
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AdminSession> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = normalize_email(email).map_err(|_| invalid())?;
        let admin = self
            .admin_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &admin.password)? {
            return Err(invalid());
        }
        self.session(admin)
    }

    fn session(&self, admin: admin::Model) -> AppResult<AdminSession> {
        let token = self.tokens.issue(Role::Admin, &admin.id, &admin.email)?;
        Ok(AdminSession { admin, token })
    }

    async fn unique_referral_code(&self) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = format!(
                "{REFERRAL_PREFIX}{}",
                rand::thread_rng().gen_range(1000..=9999)
            );
            if self.admin_repo.find_by_referral_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::Internal(
            "Could not allocate a unique referral code".to_string(),
        ))
    }
}
