//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use marketplace_common::{Config, StorageBackend};
use marketplace_core::{
    AdminService, CategoryService, ContactService, CustomerService, MailService, OtpGate,
    OtpStore, ProductService, SellerService, TokenService,
};
use marketplace_db::repositories::{
    AdminRepository, CategoryRepository, ContactMessageRepository, CustomerRepository,
    ProductRepository, SellerRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub otp_gate: OtpGate,
    pub seller_service: SellerService,
    pub customer_service: CustomerService,
    pub product_service: ProductService,
    pub admin_service: AdminService,
    pub contact_service: ContactService,
    pub category_service: CategoryService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        otp_store: Arc<dyn OtpStore>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let seller_repo = SellerRepository::new(Arc::clone(&db));
        let customer_repo = CustomerRepository::new(Arc::clone(&db));
        let product_repo = ProductRepository::new(Arc::clone(&db));
        let admin_repo = AdminRepository::new(Arc::clone(&db));
        let contact_repo = ContactMessageRepository::new(Arc::clone(&db));
        let category_repo = CategoryRepository::new(db);

        let tokens = TokenService::new(&config.auth);
        let mail = MailService::new(config.mail.clone());
        let otp_gate = OtpGate::new(otp_store, Arc::new(mail.clone()), &config.otp);

        Self {
            seller_service: SellerService::new(
                seller_repo.clone(),
                admin_repo.clone(),
                storage,
                mail.clone(),
                tokens.clone(),
                config,
            ),
            customer_service: CustomerService::new(
                customer_repo,
                admin_repo.clone(),
                otp_gate.clone(),
                tokens.clone(),
                config,
            ),
            product_service: ProductService::new(product_repo, seller_repo),
            admin_service: AdminService::new(admin_repo, tokens.clone()),
            contact_service: ContactService::new(contact_repo, mail),
            category_service: CategoryService::new(category_repo),
            otp_gate,
            tokens,
        }
    }
}

/// Authentication middleware.
///
/// Attaches verified claims to the request; role checks happen in the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.tokens.verify(token.trim()) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!(error = %e, "Rejected bearer token"),
        }
    }

    next.run(req).await
}
