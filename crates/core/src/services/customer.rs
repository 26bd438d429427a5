//! Customer service: OTP-gated signup, login, profile and admin review.

use chrono::Utc;
use marketplace_common::{AppError, AppResult, Config, IdGenerator};
use marketplace_db::{
    entities::customer::{self, CustomerStatus},
    repositories::{AdminRepository, CustomerRepository, PageRequest, Paged},
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{Role, TokenService, hash_password, validate_password, verify_password};
use super::form::{normalize_email, normalize_mobile, split_full_name};
use super::otp::OtpGate;
use super::referral::{CUSTOMER_CODE_FALLBACK, generate_unique_code, normalize_code};
use super::review::{ReviewDecision, ReviewStamps, parse_status_filter};

/// Default admin list page size.
pub const CUSTOMER_PAGE_SIZE: u64 = 12;

/// Signup fields submitted together with the emailed code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSignup {
    pub email: String,
    #[serde(alias = "emailOtp")]
    pub otp: String,
    #[serde(alias = "fullName")]
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
    pub referral_code: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub agree_to_terms: bool,
}

impl CustomerSignup {
    /// `name`, or first and last name joined.
    fn full_name(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if !name.is_empty() {
            return Some(name.to_string());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Some(joined).filter(|n| !n.is_empty())
    }
}

/// Profile fields a customer may change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
}

/// Signup or login result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSession {
    pub customer: customer::Model,
    pub token: String,
}

/// Per-status customer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total: u64,
    pub pending: u64,
    pub active: u64,
    pub rejected: u64,
    pub suspended: u64,
}

/// Customer service for business logic.
#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    admin_repo: AdminRepository,
    otp: OtpGate,
    tokens: TokenService,
    id_gen: IdGenerator,
    referral_fallback: String,
}

impl CustomerService {
    /// Create a new customer service.
    #[must_use]
    pub fn new(
        customer_repo: CustomerRepository,
        admin_repo: AdminRepository,
        otp: OtpGate,
        tokens: TokenService,
        config: &Config,
    ) -> Self {
        Self {
            customer_repo,
            admin_repo,
            otp,
            tokens,
            id_gen: IdGenerator::new(),
            referral_fallback: config.referral.customer_fallback_code.clone(),
        }
    }

    /// Verify the emailed code and create the account.
    ///
    /// The code is only consumed once the input is known to be acceptable, so
    /// a rejected signup can be retried with the same code.
    pub async fn register_verified(&self, signup: CustomerSignup) -> AppResult<CustomerSession> {
        let full_name = signup
            .full_name()
            .ok_or_else(|| AppError::Validation("Full name is required".to_string()))?;
        let email = normalize_email(&signup.email)?;
        validate_password(&signup.password)?;
        if signup.otp.trim().is_empty() {
            return Err(AppError::Validation("OTP is required".to_string()));
        }

        if self.customer_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "A customer with this email already exists".to_string(),
            ));
        }

        self.otp.verify(&email, signup.otp.trim()).await?;

        let referral_code_used = self.resolve_referral_code(signup.referral_code.as_deref()).await?;
        let referred_by = self
            .customer_repo
            .find_by_own_code(&referral_code_used)
            .await?
            .map(|referrer| referrer.id);
        let own_code =
            generate_unique_code(&self.customer_repo, &full_name, CUSTOMER_CODE_FALLBACK).await?;

        let (first_name, last_name) = split_full_name(&full_name);
        let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();

        let model = customer::ActiveModel {
            id: Set(self.id_gen.generate()),
            full_name: Set(full_name),
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            password: Set(hash_password(&signup.password)?),
            mobile: Set(signup.mobile.as_deref().map(normalize_mobile).unwrap_or_default()),
            address: Set(text(signup.address)),
            city: Set(text(signup.city)),
            state: Set(text(signup.state)),
            country: Set(text(signup.country)),
            pincode: Set(text(signup.pincode)),
            gender: Set(text(signup.gender)),
            dob: Set(text(signup.dob)),
            customer_own_code: Set(own_code),
            referral_code_used: Set(referral_code_used),
            referred_by: Set(referred_by),
            agree_to_terms: Set(signup.agree_to_terms),
            status: Set(CustomerStatus::Pending),
            status_reason: Set(String::new()),
            approved_at: Set(None),
            suspended_at: Set(None),
            is_email_verified: Set(true),
            last_login_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let customer = self.customer_repo.create(model).await?;
        info!(customer_id = %customer.id, "Customer registered");
        self.session(customer)
    }

    /// Log in with an email or mobile number.
    pub async fn login(&self, email_or_mobile: &str, password: &str) -> AppResult<CustomerSession> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let identifier = email_or_mobile.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email/Mobile and password are required".to_string(),
            ));
        }

        let customer = if identifier.contains('@') {
            self.customer_repo
                .find_by_email(&identifier.to_lowercase())
                .await?
        } else {
            self.customer_repo
                .find_by_mobile(&normalize_mobile(identifier))
                .await?
        }
        .ok_or_else(invalid)?;

        if !verify_password(password, &customer.password)? {
            return Err(invalid());
        }

        let mut active = customer.into_active_model();
        active.last_login_at = Set(Some(Utc::now().into()));
        let customer = self.customer_repo.update(active).await?;

        self.session(customer)
    }

    /// Update the caller's own profile.
    pub async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> AppResult<customer::Model> {
        let customer = self.customer_repo.get_by_id(id).await?;
        let new_email = match update.email.as_deref() {
            Some(email) => {
                let email = normalize_email(email)?;
                if email != customer.email
                    && self.customer_repo.find_by_email(&email).await?.is_some()
                {
                    return Err(AppError::Conflict(
                        "A customer with this email already exists".to_string(),
                    ));
                }
                Some(email)
            }
            None => None,
        };

        let mut active = customer.into_active_model();
        let mut changed = false;

        if let Some(full_name) = update.full_name.map(|n| n.trim().to_string()) {
            if full_name.is_empty() {
                return Err(AppError::Validation("Full name cannot be empty".to_string()));
            }
            let (first, last) = split_full_name(&full_name);
            active.full_name = Set(full_name);
            active.first_name = Set(first);
            active.last_name = Set(last);
            changed = true;
        }
        if let Some(email) = new_email {
            active.email = Set(email);
            changed = true;
        }
        if let Some(mobile) = update.mobile {
            active.mobile = Set(normalize_mobile(&mobile));
            changed = true;
        }
        for (slot, value) in [
            (&mut active.address, update.address),
            (&mut active.city, update.city),
            (&mut active.state, update.state),
            (&mut active.country, update.country),
            (&mut active.pincode, update.pincode),
            (&mut active.gender, update.gender),
            (&mut active.dob, update.dob),
        ] {
            if let Some(value) = value {
                *slot = Set(value.trim().to_string());
                changed = true;
            }
        }

        if !changed {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        active.updated_at = Set(Some(Utc::now().into()));
        self.customer_repo.update(active).await
    }

    /// Admin listing. `status = all` means no filter.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paged<customer::Model>> {
        let status = parse_status_filter(status)?.map(CustomerStatus::from);
        self.customer_repo
            .list(search, status, PageRequest::new(page, limit, CUSTOMER_PAGE_SIZE))
            .await
    }

    /// Per-status counts.
    pub async fn stats(&self) -> AppResult<CustomerStats> {
        Ok(CustomerStats {
            total: self.customer_repo.count(None).await?,
            pending: self.customer_repo.count(Some(CustomerStatus::Pending)).await?,
            active: self.customer_repo.count(Some(CustomerStatus::Active)).await?,
            rejected: self.customer_repo.count(Some(CustomerStatus::Rejected)).await?,
            suspended: self.customer_repo.count(Some(CustomerStatus::Suspended)).await?,
        })
    }

    /// Get a customer by ID.
    pub async fn get(&self, id: &str) -> AppResult<customer::Model> {
        self.customer_repo.get_by_id(id).await
    }

    /// Approve (to active) or reject.
    pub async fn approve(
        &self,
        id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> AppResult<customer::Model> {
        self.decide(id, ReviewDecision::from_approval(approved, reason))
            .await
    }

    /// Move to any status.
    pub async fn set_status(
        &self,
        id: &str,
        status: &str,
        reason: Option<String>,
    ) -> AppResult<customer::Model> {
        self.decide(id, ReviewDecision::new(status.parse()?, reason))
            .await
    }

    /// Delete a customer.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.customer_repo.delete(id).await? {
            return Err(AppError::NotFound("Customer not found".to_string()));
        }
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    async fn decide(&self, id: &str, decision: ReviewDecision) -> AppResult<customer::Model> {
        let customer = self.customer_repo.get_by_id(id).await?;
        let stamps = decision.stamps(ReviewStamps {
            approved_at: customer.approved_at.map(|t| t.with_timezone(&Utc)),
            suspended_at: customer.suspended_at.map(|t| t.with_timezone(&Utc)),
        });

        let mut active = customer.into_active_model();
        active.status = Set(decision.target.into());
        active.status_reason = Set(decision.reason.clone());
        active.approved_at = Set(stamps.approved_at.map(Into::into));
        active.suspended_at = Set(stamps.suspended_at.map(Into::into));
        active.updated_at = Set(Some(decision.decided_at.into()));
        let customer = self.customer_repo.update(active).await?;

        info!(customer_id = %customer.id, status = %decision.target, "Customer reviewed");
        Ok(customer)
    }

    /// Supplied code, else the first admin's code, else the configured fallback.
    async fn resolve_referral_code(&self, supplied: Option<&str>) -> AppResult<String> {
        if let Some(code) = supplied.and_then(normalize_code) {
            return Ok(code);
        }
        Ok(self
            .admin_repo
            .find_first()
            .await?
            .map_or_else(|| self.referral_fallback.clone(), |admin| admin.referral_code))
    }

    fn session(&self, customer: customer::Model) -> AppResult<CustomerSession> {
        let token = self
            .tokens
            .issue(Role::Customer, &customer.id, &customer.email)?;
        Ok(CustomerSession { customer, token })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::otp::{InMemoryOtpStore, OtpNotifier, OtpStore};
    use async_trait::async_trait;
    use marketplace_common::OtpConfig;
    use marketplace_db::entities::admin;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct CapturingNotifier {
        last: Mutex<Option<String>>,
    }

    #[async_trait]
    impl OtpNotifier for CapturingNotifier {
        async fn send_otp(&self, _email: &str, code: &str, _ttl_minutes: i64) -> AppResult<()> {
            *self.last.lock().unwrap() = Some(code.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        let source = r#"
            [database]
            url = "postgres://localhost/test"

            [auth]
            jwt_secret = "test-secret"
        "#;
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    struct Fixture {
        service: CustomerService,
        otp: OtpGate,
        notifier: Arc<CapturingNotifier>,
        store: InMemoryOtpStore,
    }

    fn fixture(db: DatabaseConnection) -> Fixture {
        let db = Arc::new(db);
        let config = test_config();
        let notifier = Arc::new(CapturingNotifier::default());
        let store = InMemoryOtpStore::new();
        let otp = OtpGate::new(
            Arc::new(store.clone()),
            notifier.clone(),
            &OtpConfig::default(),
        );
        let service = CustomerService::new(
            CustomerRepository::new(db.clone()),
            AdminRepository::new(db),
            otp.clone(),
            TokenService::new(&config.auth),
            &config,
        );
        Fixture {
            service,
            otp,
            notifier,
            store,
        }
    }

    fn create_test_customer(id: &str, email: &str) -> customer::Model {
        customer::Model {
            id: id.to_string(),
            full_name: "Ravi Kumar".to_string(),
            first_name: "Ravi".to_string(),
            last_name: "Kumar".to_string(),
            email: email.to_string(),
            password: hash_password("secret1").unwrap(),
            mobile: "+919876543210".to_string(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            country: String::new(),
            pincode: String::new(),
            gender: String::new(),
            dob: String::new(),
            customer_own_code: "RAV12345".to_string(),
            referral_code_used: "ADMIN123".to_string(),
            referred_by: None,
            agree_to_terms: true,
            status: CustomerStatus::Pending,
            status_reason: String::new(),
            approved_at: None,
            suspended_at: None,
            is_email_verified: true,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn signup(otp: &str) -> CustomerSignup {
        CustomerSignup {
            email: "Ravi@Example.com".to_string(),
            otp: otp.to_string(),
            name: Some("Ravi Kumar".to_string()),
            password: "secret1".to_string(),
            mobile: Some("9876543210".to_string()),
            agree_to_terms: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_signup_accepts_original_field_names() {
        let signup: CustomerSignup = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "emailOtp": "123456",
            "fullName": "Asha Rao",
            "password": "secret1",
            "agreeToTerms": true
        }))
        .unwrap();

        assert_eq!(signup.otp, "123456");
        assert_eq!(signup.full_name().as_deref(), Some("Asha Rao"));
        assert!(signup.agree_to_terms);
    }

    #[test]
    fn test_full_name_from_parts() {
        let signup = CustomerSignup {
            first_name: Some(" Asha ".to_string()),
            last_name: Some("Rao".to_string()),
            ..Default::default()
        };
        assert_eq!(signup.full_name().as_deref(), Some("Asha Rao"));
        assert_eq!(CustomerSignup::default().full_name(), None);
    }

    #[tokio::test]
    async fn test_register_requires_otp() {
        let fx = fixture(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = fx.service.register_verified(signup("")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_without_issued_otp_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customer::Model>::new()])
            .into_connection();
        let fx = fixture(db);

        let result = fx.service.register_verified(signup("123456")).await;
        assert!(matches!(result, Err(AppError::OtpNotFound)));
    }

    #[tokio::test]
    async fn test_register_conflict_keeps_otp() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_customer("c1", "ravi@example.com")]])
            .into_connection();
        let fx = fixture(db);
        fx.otp.issue("ravi@example.com").await.unwrap();
        let code = fx.notifier.last.lock().unwrap().clone().unwrap();

        let result = fx.service.register_verified(signup(&code)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(fx.store.get("ravi@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_consumes_otp_and_creates_customer() {
        let created = create_test_customer("c2", "ravi@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // email lookup
            .append_query_results([Vec::<customer::Model>::new()])
            // first admin
            .append_query_results([[admin::Model {
                id: "a1".to_string(),
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password: "hash".to_string(),
                role: "admin".to_string(),
                referral_code: "ADMIN-REF-4821".to_string(),
                created_at: Utc::now().into(),
                updated_at: None,
            }]])
            // referrer lookup
            .append_query_results([Vec::<customer::Model>::new()])
            // own code collision check
            .append_query_results([Vec::<customer::Model>::new()])
            // insert
            .append_query_results([[created]])
            .into_connection();
        let fx = fixture(db);
        fx.otp.issue("ravi@example.com").await.unwrap();
        let code = fx.notifier.last.lock().unwrap().clone().unwrap();

        let session = fx.service.register_verified(signup(&code)).await.unwrap();

        assert_eq!(session.customer.id, "c2");
        assert!(!session.token.is_empty());
        assert!(fx.store.get("ravi@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_by_mobile() {
        let customer = create_test_customer("c1", "ravi@example.com");
        let mut logged_in = customer.clone();
        logged_in.last_login_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[customer]])
            .append_query_results([[logged_in]])
            .into_connection();
        let fx = fixture(db);

        let session = fx.service.login("09876543210", "secret1").await.unwrap();
        assert!(session.customer.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_unknown_customer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customer::Model>::new()])
            .into_connection();
        let fx = fixture(db);

        let result = fx.service.login("nobody@example.com", "secret1").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_approve_maps_to_active() {
        let pending = create_test_customer("c1", "ravi@example.com");
        let mut active = pending.clone();
        active.status = CustomerStatus::Active;
        active.approved_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending]])
            .append_query_results([[active]])
            .into_connection();
        let fx = fixture(db);

        let customer = fx.service.approve("c1", true, None).await.unwrap();
        assert_eq!(customer.status, CustomerStatus::Active);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let fx = fixture(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = fx.service.list(None, Some("gone"), None, None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_profile_update_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_customer("c1", "ravi@example.com")]])
            .into_connection();
        let fx = fixture(db);

        let result = fx.service.update_profile("c1", ProfileUpdate::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
