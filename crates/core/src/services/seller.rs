//! Seller service: multipart registration, login, password reset and admin review.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use marketplace_common::{
    AppError, AppResult, Config, IdGenerator, StorageBackend, UploadedFile, document_key,
};
use marketplace_db::{
    entities::seller::{
        self, AgreementApproval, AgreementStatus, BankDetails, BusinessDocuments, CompanyDetails,
        LlpDetails, PartnershipDetails, PickupDetails, ProprietorshipDetails, SellerStatus,
        StoreDetails,
    },
    repositories::{AdminRepository, PageRequest, Paged, SellerRepository},
};
use rand::RngCore;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::auth::{Role, TokenService, hash_password, validate_password, verify_password};
use super::form::{FormFields, normalize_email};
use super::mail::{DeliveryStatus, MailService};
use super::referral::{SELLER_CODE_FALLBACK, generate_unique_code, normalize_code};
use super::review::{ReviewDecision, ReviewStamps, parse_status_filter};

/// Multipart fields that carry documents.
pub const SELLER_DOCUMENT_FIELDS: [&str; 23] = [
    "gstFile",
    "proprietorPanCard",
    "proprietorAadhaarCard",
    "proprietorPhoto",
    "partnershipDeed",
    "llpCertificate",
    "llpAgreement",
    "incorporationCertificate",
    "moaDocument",
    "aoaDocument",
    "publicIncorporationCertificate",
    "publicMoaDocument",
    "publicAoaDocument",
    "storeLogo",
    "storeBanner",
    "esignature",
    "addressProof",
    "photoId",
    "businessLicense",
    "taxCertificate",
    "identityProof",
    "bankStatement",
    "signedAgreement",
];

/// Default admin list page size.
pub const SELLER_PAGE_SIZE: u64 = 10;

const RESET_TOKEN_TTL_MINUTES: i64 = 10;
const DEFAULT_AGREEMENT_VERSION: &str = "v1.0";

/// One uploaded file from the registration form.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Stored document URLs by field name. Missing fields read as empty strings.
#[derive(Debug, Clone, Default)]
pub struct DocumentRefs(HashMap<String, String>);

impl DocumentRefs {
    #[must_use]
    pub fn get(&self, field: &str) -> String {
        self.0.get(field).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, field: impl Into<String>, url: impl Into<String>) {
        self.0.insert(field.into(), url.into());
    }
}

/// Server-assigned values for a new seller.
#[derive(Debug, Clone)]
pub struct SellerAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub business_name: String,
    pub referral_code: String,
    pub referred_by: String,
}

/// Registration or login result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSession {
    pub seller: seller::Model,
    pub token: String,
    pub is_approved: bool,
}

/// Per-status seller counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub suspended: u64,
}

/// Whether a business-type document was provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub field: &'static str,
    pub provided: bool,
}

/// Admin detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDetail {
    pub seller: seller::Model,
    pub document_checklist: Vec<ChecklistItem>,
}

/// Fields an admin may edit. Anything else in the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_reg_number: Option<String>,
    pub tax_id: Option<String>,
    pub business_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub nature_of_concern: Option<String>,
    pub firm_name: Option<String>,
    pub name_as_per_pan: Option<String>,
    pub has_gst: Option<String>,
    pub gst_number: Option<String>,
    pub proprietorship: Option<ProprietorshipDetails>,
    pub partnership: Option<PartnershipDetails>,
    pub llp: Option<LlpDetails>,
    pub private_limited: Option<CompanyDetails>,
    pub public_limited: Option<CompanyDetails>,
    pub store: Option<StoreDetails>,
    pub pickup: Option<PickupDetails>,
    pub bank: Option<BankDetails>,
    pub terms_accepted: Option<bool>,
}

/// Seller service for business logic.
#[derive(Clone)]
pub struct SellerService {
    seller_repo: SellerRepository,
    admin_repo: AdminRepository,
    storage: Arc<dyn StorageBackend>,
    mail: MailService,
    tokens: TokenService,
    id_gen: IdGenerator,
    referral_fallback: String,
    client_url: String,
    max_file_size: usize,
}

impl SellerService {
    /// Create a new seller service.
    #[must_use]
    pub fn new(
        seller_repo: SellerRepository,
        admin_repo: AdminRepository,
        storage: Arc<dyn StorageBackend>,
        mail: MailService,
        tokens: TokenService,
        config: &Config,
    ) -> Self {
        Self {
            seller_repo,
            admin_repo,
            storage,
            mail,
            tokens,
            id_gen: IdGenerator::new(),
            referral_fallback: config.referral.seller_fallback_code.clone(),
            client_url: config.client.base_url.trim_end_matches('/').to_string(),
            max_file_size: config.uploads.max_file_size,
        }
    }

    /// Register a seller from a multipart form.
    ///
    /// Everything is validated before any file is written. Files stored for a
    /// registration that then fails to insert are removed again.
    pub async fn register(
        &self,
        form: FormFields,
        uploads: Vec<DocumentUpload>,
    ) -> AppResult<SellerSession> {
        if form.optional("firstName").is_none() {
            return Err(AppError::Validation("First name is required".to_string()));
        }
        let email = normalize_email(&form.text("email"))?;
        let password = form.raw("password");
        validate_password(&password)?;
        let business_name = form
            .first_of(&["businessName", "firmName"])
            .ok_or_else(|| AppError::Validation("Business name is required".to_string()))?;
        let uploads = self.check_uploads(uploads)?;

        if self.seller_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "A seller with this email already exists".to_string(),
            ));
        }

        let referred_by = self.resolve_referrer(form.optional("referralCode")).await?;
        let referral_code = generate_unique_code(
            &self.seller_repo,
            &form.text("firstName"),
            SELLER_CODE_FALLBACK,
        )
        .await?;

        let account = SellerAccount {
            id: self.id_gen.generate(),
            email,
            password_hash: hash_password(&password)?,
            business_name,
            referral_code,
            referred_by,
        };

        let stored = self.store_uploads(&account.id, uploads).await?;
        let mut docs = DocumentRefs::default();
        for (field, file) in &stored {
            docs.insert(field.clone(), file.url.clone());
        }

        let model = assemble_seller(&form, &docs, account, Utc::now());
        let seller = match self
            .seller_repo
            .create(model.into_active_model().reset_all())
            .await
        {
            Ok(seller) => seller,
            Err(e) => {
                self.discard_uploads(&stored).await;
                return Err(e);
            }
        };

        info!(seller_id = %seller.id, business = %seller.business_name, "Seller registered");
        self.session(seller)
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<SellerSession> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = normalize_email(email).map_err(|_| invalid())?;
        let seller = self
            .seller_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &seller.password)? {
            return Err(invalid());
        }

        self.session(seller)
    }

    /// Public profile.
    pub async fn get(&self, id: &str) -> AppResult<seller::Model> {
        self.seller_repo.get_by_id(id).await
    }

    /// Mail a password reset link.
    pub async fn forgot_password(&self, email: &str) -> AppResult<DeliveryStatus> {
        let email = normalize_email(email)?;
        let seller = self
            .seller_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("No seller registered with this email".to_string()))?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        let name = seller.first_name.clone();
        let mut active = seller.into_active_model();
        active.reset_password_token = Set(Some(hash_reset_token(&token)));
        active.reset_password_expires_at = Set(Some(expires_at.into()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.seller_repo.update(active).await?;

        let link = format!("{}/seller/reset-password/{token}", self.client_url);
        let delivery = DeliveryStatus::from_result(
            self.mail.send_password_reset(&email, &name, &link).await,
        );
        Ok(delivery)
    }

    /// Set a new password using an emailed reset token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        validate_password(new_password)?;

        let seller = self
            .seller_repo
            .find_by_reset_token(&hash_reset_token(token), Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Reset link is invalid or has expired".to_string())
            })?;

        let seller_id = seller.id.clone();
        let mut active = seller.into_active_model();
        active.password = Set(hash_password(new_password)?);
        active.reset_password_token = Set(None);
        active.reset_password_expires_at = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.seller_repo.update(active).await?;

        info!(seller_id = %seller_id, "Seller password reset");
        Ok(())
    }

    /// Admin listing.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paged<seller::Model>> {
        let status = parse_status_filter(status)?.map(SellerStatus::from);
        self.seller_repo
            .list(search, status, PageRequest::new(page, limit, SELLER_PAGE_SIZE))
            .await
    }

    /// Per-status counts.
    pub async fn stats(&self) -> AppResult<SellerStats> {
        Ok(SellerStats {
            total: self.seller_repo.count(None).await?,
            pending: self.seller_repo.count(Some(SellerStatus::Pending)).await?,
            approved: self.seller_repo.count(Some(SellerStatus::Approved)).await?,
            rejected: self.seller_repo.count(Some(SellerStatus::Rejected)).await?,
            suspended: self.seller_repo.count(Some(SellerStatus::Suspended)).await?,
        })
    }

    /// Admin detail view with the business-type document checklist.
    pub async fn detail(&self, id: &str) -> AppResult<SellerDetail> {
        let seller = self.seller_repo.get_by_id(id).await?;
        let document_checklist = document_checklist(&seller);
        Ok(SellerDetail {
            seller,
            document_checklist,
        })
    }

    /// Approve or reject.
    pub async fn approve(
        &self,
        id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> AppResult<seller::Model> {
        let decision = ReviewDecision::from_approval(approved, reason);
        let seller = self.seller_repo.get_by_id(id).await?;

        let mut active = apply_decision(seller, &decision);
        active.approval_reason = Set(decision.reason.clone());
        active.status_reason = Set(decision.reason.clone());
        let seller = self.seller_repo.update(active).await?;

        info!(seller_id = %seller.id, status = %decision.target, "Seller reviewed");
        Ok(seller)
    }

    /// Move to any status.
    pub async fn set_status(
        &self,
        id: &str,
        status: &str,
        reason: Option<String>,
    ) -> AppResult<seller::Model> {
        let decision = ReviewDecision::new(status.parse()?, reason);
        let seller = self.seller_repo.get_by_id(id).await?;

        let mut active = apply_decision(seller, &decision);
        active.status_reason = Set(decision.reason.clone());
        let seller = self.seller_repo.update(active).await?;

        info!(seller_id = %seller.id, status = %decision.target, "Seller status changed");
        Ok(seller)
    }

    /// Review the signed agreement. Leaves the account status alone.
    pub async fn review_agreement(
        &self,
        id: &str,
        status: &str,
        remarks: Option<String>,
        admin_id: &str,
    ) -> AppResult<seller::Model> {
        let status = parse_agreement_status(status)?;
        let seller = self.seller_repo.get_by_id(id).await?;
        let now = Utc::now();

        let mut active = seller.into_active_model();
        active.admin_agreement_approval = Set(AgreementApproval {
            status,
            approved_by: admin_id.to_string(),
            approved_at: (status == AgreementStatus::Approved).then_some(now),
            remarks: remarks.map(|r| r.trim().to_string()).unwrap_or_default(),
        });
        active.updated_at = Set(Some(now.into()));
        self.seller_repo.update(active).await
    }

    /// Edit profile fields. Never touches the password.
    pub async fn patch(&self, id: &str, patch: SellerPatch) -> AppResult<seller::Model> {
        let seller = self.seller_repo.get_by_id(id).await?;
        let mut active = seller.into_active_model();
        if !apply_patch(&mut active, patch) {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        active.updated_at = Set(Some(Utc::now().into()));
        self.seller_repo.update(active).await
    }

    /// Delete a seller and, through the foreign key, their products.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.seller_repo.delete(id).await? {
            return Err(AppError::NotFound("Seller not found".to_string()));
        }
        info!(seller_id = %id, "Seller deleted");
        Ok(())
    }

    fn session(&self, seller: seller::Model) -> AppResult<SellerSession> {
        let token = self.tokens.issue(Role::Seller, &seller.id, &seller.email)?;
        let is_approved = seller.status == SellerStatus::Approved;
        Ok(SellerSession {
            seller,
            token,
            is_approved,
        })
    }

    /// A supplied code must belong to a seller or admin. Without one, the
    /// first admin's code is used, then the configured fallback.
    async fn resolve_referrer(&self, supplied: Option<String>) -> AppResult<String> {
        if let Some(code) = supplied.as_deref().and_then(normalize_code) {
            let known = self.seller_repo.find_by_referral_code(&code).await?.is_some()
                || self.admin_repo.find_by_referral_code(&code).await?.is_some();
            if !known {
                return Err(AppError::Validation("Invalid referral code".to_string()));
            }
            return Ok(code);
        }

        Ok(self
            .admin_repo
            .find_first()
            .await?
            .map_or_else(|| self.referral_fallback.clone(), |admin| admin.referral_code))
    }

    fn check_uploads(&self, uploads: Vec<DocumentUpload>) -> AppResult<Vec<DocumentUpload>> {
        let mut accepted = Vec::with_capacity(uploads.len());
        for upload in uploads {
            if !SELLER_DOCUMENT_FIELDS.contains(&upload.field.as_str()) {
                warn!(field = %upload.field, "Ignoring unknown document field");
                continue;
            }
            if upload.data.is_empty() {
                continue;
            }
            if upload.data.len() > self.max_file_size {
                return Err(AppError::Validation(format!(
                    "{} exceeds the maximum file size of {} bytes",
                    upload.field, self.max_file_size
                )));
            }
            accepted.push(upload);
        }
        Ok(accepted)
    }

    async fn store_uploads(
        &self,
        seller_id: &str,
        uploads: Vec<DocumentUpload>,
    ) -> AppResult<Vec<(String, UploadedFile)>> {
        let namespace = format!("sellers/{seller_id}");
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let key = document_key(&namespace, &upload.field, &upload.file_name);
            match self
                .storage
                .upload(&key, &upload.data, &upload.content_type)
                .await
            {
                Ok(file) => stored.push((upload.field, file)),
                Err(e) => {
                    self.discard_uploads(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    async fn discard_uploads(&self, stored: &[(String, UploadedFile)]) {
        for (_, file) in stored {
            if let Err(e) = self.storage.delete(&file.key).await {
                warn!(key = %file.key, error = %e, "Failed to remove orphaned upload");
            }
        }
    }
}

/// Build the seller row from form fields, stored documents and assigned values.
#[must_use]
pub fn assemble_seller(
    form: &FormFields,
    docs: &DocumentRefs,
    account: SellerAccount,
    now: DateTime<Utc>,
) -> seller::Model {
    let signed_agreement_url = docs.get("signedAgreement");
    let is_agreement_uploaded = !signed_agreement_url.is_empty() || form.flag("isAgreementUploaded");

    seller::Model {
        id: account.id,
        first_name: form.text("firstName"),
        last_name: form.text("lastName"),
        email: account.email,
        password: account.password_hash,
        phone: form.text("phone"),
        date_of_birth: form.text("dateOfBirth"),
        referral_code: account.referral_code,
        referred_by: account.referred_by,
        agreement_version: form.text_or("agreementVersion", DEFAULT_AGREEMENT_VERSION),
        is_agreement_uploaded,
        agreement_uploaded_at: is_agreement_uploaded.then(|| now.into()),
        signed_agreement_url,
        admin_agreement_approval: AgreementApproval::default(),
        business_name: account.business_name,
        business_type: form.text("businessType").to_lowercase(),
        business_reg_number: form.text("businessRegNumber"),
        tax_id: form.text("taxId"),
        business_address: form.text("businessAddress"),
        city: form.text("city"),
        state: form.text("state"),
        zip_code: form.text("zipCode"),
        country: form.text("country"),
        nature_of_concern: form.text("natureOfConcern"),
        firm_name: form.text("firmName"),
        name_as_per_pan: form.text("nameAsPerPan"),
        has_gst: form.text("hasGst"),
        gst_number: form.text("gstNumber"),
        gst_file: docs.get("gstFile"),
        proprietorship: ProprietorshipDetails {
            name: form.text("proprietorName"),
            dob: form.text("proprietorDob"),
            pan: form.text("proprietorPan"),
            aadhaar: form.text("proprietorAadhaar"),
            mobile: form.text("proprietorMobile"),
            email: form.text("proprietorEmail"),
            address: form.text("proprietorAddress"),
            pan_card: docs.get("proprietorPanCard"),
            aadhaar_card: docs.get("proprietorAadhaarCard"),
            photo: docs.get("proprietorPhoto"),
        },
        partnership: PartnershipDetails {
            number_of_partners: form.number("numberOfPartners"),
            partners: form.json_list("partners"),
            deed_date: form.text("partnershipDeedDate"),
            pan: form.text("partnershipPan"),
            deed: docs.get("partnershipDeed"),
        },
        llp: LlpDetails {
            name: form.text("llpName"),
            registration_no: form.text("llpRegistrationNo"),
            pan: form.text("llpPan"),
            incorporation_date: form.text("llpIncorporationDate"),
            number_of_designated_partners: form.number("numberOfDesignatedPartners"),
            designated_partners: form.json_list("designatedPartners"),
            certificate: docs.get("llpCertificate"),
            agreement: docs.get("llpAgreement"),
        },
        private_limited: CompanyDetails {
            name: form.text("pvtLtdName"),
            cin_number: form.text("cinNumber"),
            pan: form.text("pvtLtdPan"),
            incorporation_date: form.text("incorporationDate"),
            authorized_capital: form.text("authorizedCapital"),
            paid_up_capital: form.text("paidUpCapital"),
            number_of_directors: form.number("numberOfDirectors"),
            directors: form.json_list("directors"),
            incorporation_certificate: docs.get("incorporationCertificate"),
            moa_document: docs.get("moaDocument"),
            aoa_document: docs.get("aoaDocument"),
            listed_status: String::new(),
            stock_exchange: String::new(),
        },
        public_limited: CompanyDetails {
            name: form.text("publicLtdName"),
            cin_number: form.text("publicCinNumber"),
            pan: form.text("publicLtdPan"),
            incorporation_date: form.text("publicIncorporationDate"),
            authorized_capital: form.text("publicAuthorizedCapital"),
            paid_up_capital: form.text("publicPaidUpCapital"),
            number_of_directors: form.number("publicNumberOfDirectors"),
            directors: form.json_list("publicDirectors"),
            incorporation_certificate: docs.get("publicIncorporationCertificate"),
            moa_document: docs.get("publicMoaDocument"),
            aoa_document: docs.get("publicAoaDocument"),
            listed_status: form.text("listedStatus"),
            stock_exchange: form.text("stockExchange"),
        },
        store: StoreDetails {
            gstin: form.text("storeGstin"),
            pan: form.text("storePan"),
            name: form.text("storeName"),
            description: form.text("storeDescription"),
            address: form.text("storeAddress"),
            city: form.text("storeCity"),
            state: form.text("storeState"),
            pincode: form.text("storePincode"),
            categories: form.string_list("storeCategories"),
            logo: docs.get("storeLogo"),
            banner: docs.get("storeBanner"),
        },
        pickup: PickupDetails {
            address: form.text("pickupAddress"),
            pincode: form.text("pickupPincode"),
            contact: form.text("pickupContact"),
            esignature: docs.get("esignature"),
            address_proof: docs.get("addressProof"),
            photo_id: docs.get("photoId"),
        },
        documents: BusinessDocuments {
            business_license: docs.get("businessLicense"),
            tax_certificate: docs.get("taxCertificate"),
            identity_proof: docs.get("identityProof"),
        },
        bank: BankDetails {
            bank_name: form.text("bankName"),
            account_holder_name: form.text("accountHolderName"),
            account_number: form.text("accountNumber"),
            routing_number: form.text("routingNumber"),
            account_type: form.text("accountType"),
            branch_name: form.text("branchName"),
            ifsc_code: form.text("ifscCode"),
            statement: docs.get("bankStatement"),
        },
        terms_accepted: form.flag("termsAccepted"),
        status: SellerStatus::Pending,
        approval_reason: String::new(),
        status_reason: String::new(),
        approved_at: None,
        suspended_at: None,
        reset_password_token: None,
        reset_password_expires_at: None,
        created_at: now.into(),
        updated_at: None,
    }
}

/// Stored URL of a document field.
#[must_use]
pub fn document_url<'a>(seller: &'a seller::Model, field: &str) -> Option<&'a str> {
    let url = match field {
        "gstFile" => &seller.gst_file,
        "proprietorPanCard" => &seller.proprietorship.pan_card,
        "proprietorAadhaarCard" => &seller.proprietorship.aadhaar_card,
        "proprietorPhoto" => &seller.proprietorship.photo,
        "partnershipDeed" => &seller.partnership.deed,
        "llpCertificate" => &seller.llp.certificate,
        "llpAgreement" => &seller.llp.agreement,
        "incorporationCertificate" => &seller.private_limited.incorporation_certificate,
        "moaDocument" => &seller.private_limited.moa_document,
        "aoaDocument" => &seller.private_limited.aoa_document,
        "publicIncorporationCertificate" => &seller.public_limited.incorporation_certificate,
        "publicMoaDocument" => &seller.public_limited.moa_document,
        "publicAoaDocument" => &seller.public_limited.aoa_document,
        "storeLogo" => &seller.store.logo,
        "storeBanner" => &seller.store.banner,
        "esignature" => &seller.pickup.esignature,
        "addressProof" => &seller.pickup.address_proof,
        "photoId" => &seller.pickup.photo_id,
        "businessLicense" => &seller.documents.business_license,
        "taxCertificate" => &seller.documents.tax_certificate,
        "identityProof" => &seller.documents.identity_proof,
        "bankStatement" => &seller.bank.statement,
        "signedAgreement" => &seller.signed_agreement_url,
        _ => return None,
    };
    Some(url.as_str()).filter(|u| !u.is_empty())
}

/// Documents expected for a business type.
#[must_use]
pub fn required_documents(business_type: &str) -> &'static [&'static str] {
    match business_type
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
        .as_str()
    {
        "proprietorship" => &["proprietorPanCard", "proprietorAadhaarCard", "proprietorPhoto"],
        "partnership" => &["partnershipDeed"],
        "llp" => &["llpCertificate", "llpAgreement"],
        "private_limited" | "pvt_ltd" => &["incorporationCertificate", "moaDocument", "aoaDocument"],
        "public_limited" | "public_ltd" => &[
            "publicIncorporationCertificate",
            "publicMoaDocument",
            "publicAoaDocument",
        ],
        _ => &[],
    }
}

fn document_checklist(seller: &seller::Model) -> Vec<ChecklistItem> {
    required_documents(&seller.business_type)
        .iter()
        .chain(["bankStatement", "signedAgreement"].iter())
        .map(|&field| ChecklistItem {
            field,
            provided: document_url(seller, field).is_some(),
        })
        .collect()
}

fn apply_decision(seller: seller::Model, decision: &ReviewDecision) -> seller::ActiveModel {
    let previous = ReviewStamps {
        approved_at: seller.approved_at.map(|t| t.with_timezone(&Utc)),
        suspended_at: seller.suspended_at.map(|t| t.with_timezone(&Utc)),
    };
    let stamps = decision.stamps(previous);

    let mut active = seller.into_active_model();
    active.status = Set(decision.target.into());
    active.approved_at = Set(stamps.approved_at.map(Into::into));
    active.suspended_at = Set(stamps.suspended_at.map(Into::into));
    active.updated_at = Set(Some(decision.decided_at.into()));
    active
}

/// Returns whether any field was set.
fn apply_patch(active: &mut seller::ActiveModel, patch: SellerPatch) -> bool {
    let mut changed = false;
    macro_rules! set {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = patch.$field {
                    active.$field = Set(value);
                    changed = true;
                }
            )*
        };
    }
    set!(
        first_name,
        last_name,
        phone,
        date_of_birth,
        business_name,
        business_type,
        business_reg_number,
        tax_id,
        business_address,
        city,
        state,
        zip_code,
        country,
        nature_of_concern,
        firm_name,
        name_as_per_pan,
        has_gst,
        gst_number,
        proprietorship,
        partnership,
        llp,
        private_limited,
        public_limited,
        store,
        pickup,
        bank,
        terms_accepted,
    );
    changed
}

fn parse_agreement_status(input: &str) -> AppResult<AgreementStatus> {
    match input.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(AgreementStatus::Pending),
        "approved" => Ok(AgreementStatus::Approved),
        "rejected" => Ok(AgreementStatus::Rejected),
        other => Err(AppError::Validation(format!(
            "Invalid agreement status: {other}"
        ))),
    }
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{bound, executed, first, is_null};
    use marketplace_common::LocalStorage;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn account() -> SellerAccount {
        SellerAccount {
            id: "s1".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "hash".to_string(),
            business_name: "Rao Traders".to_string(),
            referral_code: "ASH12345".to_string(),
            referred_by: "ADMIN-REF-1001".to_string(),
        }
    }

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    fn registration_form() -> FormFields {
        form(&[
            ("firstName", "Asha"),
            ("lastName", "Rao"),
            ("email", " Asha@Example.com "),
            ("password", "secret1"),
            ("businessName", "Rao Traders"),
            ("businessType", "proprietorship"),
        ])
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

    fn service(db: DatabaseConnection) -> SellerService {
        service_on(Arc::new(db))
    }

    fn service_on(db: Arc<DatabaseConnection>) -> SellerService {
        let config = test_config();
        let storage_dir = std::env::temp_dir().join(format!("sellers-{}", IdGenerator::new().generate()));
        SellerService::new(
            SellerRepository::new(db.clone()),
            AdminRepository::new(db),
            Arc::new(LocalStorage::new(storage_dir, "/uploads".to_string())),
            MailService::new(config.mail.clone()),
            TokenService::new(&config.auth),
            &config,
        )
    }

    fn stored_seller() -> seller::Model {
        let mut model = assemble_seller(&registration_form(), &DocumentRefs::default(), account(), Utc::now());
        model.password = hash_password("secret1").unwrap();
        model
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    #[test]
    fn test_assemble_coerces_missing_fields() {
        let form = form(&[
            ("firstName", "Asha"),
            ("numberOfPartners", "x"),
            ("storeCategories", "not json"),
            ("termsAccepted", "yes"),
        ]);

        let model = assemble_seller(&form, &DocumentRefs::default(), account(), Utc::now());

        assert_eq!(model.last_name, "");
        assert_eq!(model.partnership.number_of_partners, 0);
        assert!(model.store.categories.is_empty());
        assert!(!model.terms_accepted);
        assert_eq!(model.gst_file, "");
        assert_eq!(model.proprietorship.pan_card, "");
        assert_eq!(model.agreement_version, "v1.0");
        assert_eq!(model.status, SellerStatus::Pending);
    }

    #[test]
    fn test_assemble_places_documents() {
        let mut docs = DocumentRefs::default();
        docs.insert("proprietorPanCard", "/uploads/sellers/s1/pan.pdf");
        docs.insert("publicMoaDocument", "/uploads/sellers/s1/moa.pdf");

        let model = assemble_seller(&registration_form(), &docs, account(), Utc::now());

        assert_eq!(model.proprietorship.pan_card, "/uploads/sellers/s1/pan.pdf");
        assert_eq!(model.public_limited.moa_document, "/uploads/sellers/s1/moa.pdf");
        assert_eq!(model.private_limited.moa_document, "");
        assert_eq!(
            document_url(&model, "proprietorPanCard"),
            Some("/uploads/sellers/s1/pan.pdf")
        );
        assert_eq!(document_url(&model, "gstFile"), None);
    }

    #[test]
    fn test_agreement_flag_or_upload() {
        let flagged = form(&[("isAgreementUploaded", "true")]);
        let model = assemble_seller(&flagged, &DocumentRefs::default(), account(), Utc::now());
        assert!(model.is_agreement_uploaded);
        assert!(model.agreement_uploaded_at.is_some());

        let mut docs = DocumentRefs::default();
        docs.insert("signedAgreement", "/uploads/a.pdf");
        let model = assemble_seller(&form(&[]), &docs, account(), Utc::now());
        assert!(model.is_agreement_uploaded);
        assert_eq!(model.signed_agreement_url, "/uploads/a.pdf");

        let model = assemble_seller(&form(&[]), &DocumentRefs::default(), account(), Utc::now());
        assert!(!model.is_agreement_uploaded);
        assert!(model.agreement_uploaded_at.is_none());
    }

    #[test]
    fn test_checklist_follows_business_type() {
        let mut model = stored_seller();
        model.proprietorship.photo = "/uploads/p.jpg".to_string();

        let checklist = document_checklist(&model);
        let fields: Vec<_> = checklist.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            [
                "proprietorPanCard",
                "proprietorAadhaarCard",
                "proprietorPhoto",
                "bankStatement",
                "signedAgreement"
            ]
        );
        assert!(checklist[2].provided);
        assert!(!checklist[0].provided);

        assert_eq!(required_documents("Private Limited").len(), 3);
        assert!(required_documents("cooperative").is_empty());
    }

    #[test]
    fn test_reset_token_hash_is_stable() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
        assert_ne!(hash_reset_token(&token), token);
    }

    #[tokio::test]
    async fn test_register_requires_business_name() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let form = form(&[
            ("firstName", "Asha"),
            ("email", "asha@example.com"),
            ("password", "secret1"),
        ]);

        let result = svc.register(form, Vec::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let form = form(&[
            ("firstName", "Asha"),
            ("email", "asha@example.com"),
            ("password", "abc"),
            ("firmName", "Rao & Sons"),
        ]);

        let result = svc.register(form, Vec::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_seller()]])
            .into_connection();
        let svc = service(db);

        let result = svc.register(registration_form(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_oversized_upload_rejected_before_queries() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let upload = DocumentUpload {
            field: "gstFile".to_string(),
            file_name: "gst.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from(vec![0u8; 10 * 1024 * 1024 + 1]),
        };

        let result = svc.register(registration_form(), vec![upload]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_unknown_referral_code_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<seller::Model>::new()])
            .append_query_results([Vec::<seller::Model>::new()])
            .append_query_results([Vec::<marketplace_db::entities::admin::Model>::new()])
            .into_connection();
        let svc = service(db);

        let mut form = registration_form();
        form.insert("referralCode", "nobody1");

        let result = svc.register(form, Vec::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_creates_pending_seller() {
        let created = stored_seller();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // email lookup
                .append_query_results([Vec::<seller::Model>::new()])
                // first admin
                .append_query_results([Vec::<marketplace_db::entities::admin::Model>::new()])
                // referral code collision check
                .append_query_results([Vec::<seller::Model>::new()])
                // insert
                .append_query_results([[created.clone()]])
                .into_connection(),
        );
        let svc = service_on(db.clone());

        let session = svc.register(registration_form(), Vec::new()).await.unwrap();
        assert!(!session.is_approved);
        assert!(!session.token.is_empty());
        drop(svc);

        let statements = executed(db);
        let insert = first(&statements, "INSERT");
        assert_eq!(
            bound(insert, "email"),
            sea_orm::Value::String(Some(Box::new("asha@example.com".to_string())))
        );
        assert_eq!(
            bound(insert, "status"),
            sea_orm::Value::String(Some(Box::new("pending".to_string())))
        );
        assert!(is_null(insert, "approved_at"));
        assert!(matches!(
            bound(insert, "proprietorship"),
            sea_orm::Value::Json(Some(ref details)) if details["pan"] == ""
        ));
        assert!(matches!(
            bound(insert, "password"),
            sea_orm::Value::String(Some(ref hash)) if verify_password("secret1", hash).unwrap()
        ));
    }

    #[tokio::test]
    async fn test_register_race_on_email_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<seller::Model>::new()])
            .append_query_results([Vec::<marketplace_db::entities::admin::Model>::new()])
            .append_query_results([Vec::<seller::Model>::new()])
            .append_query_errors([sea_orm::DbErr::Query(sea_orm::RuntimeErr::Internal(
                "duplicate key value violates unique constraint \"seller_email_key\"".to_string(),
            ))])
            .into_connection();
        let svc = service(db);

        let result = svc.register(registration_form(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_seller()]])
            .into_connection();
        let svc = service(db);

        let result = svc.login("asha@example.com", "wrong-pass").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_reports_approval() {
        let mut approved = stored_seller();
        approved.status = SellerStatus::Approved;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[approved]])
            .into_connection();
        let svc = service(db);

        let session = svc.login("ASHA@example.com", "secret1").await.unwrap();
        assert!(session.is_approved);
    }

    #[tokio::test]
    async fn test_set_status_invalid_does_not_query() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = svc.set_status("s1", "archived", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_stamps_approved_at() {
        let pending = stored_seller();
        let mut approved = pending.clone();
        approved.status = SellerStatus::Approved;
        approved.approved_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_query_results([[approved]])
                .into_connection(),
        );
        let svc = service_on(db.clone());

        svc.approve("s1", true, Some(" documents verified ".to_string()))
            .await
            .unwrap();
        drop(svc);

        let statements = executed(db);
        let update = first(&statements, "UPDATE");
        assert_eq!(
            bound(update, "status"),
            sea_orm::Value::String(Some(Box::new("approved".to_string())))
        );
        assert!(!is_null(update, "approved_at"));
        assert!(is_null(update, "suspended_at"));
        let reason = sea_orm::Value::String(Some(Box::new("documents verified".to_string())));
        assert_eq!(bound(update, "approval_reason"), reason);
        assert_eq!(bound(update, "status_reason"), reason);
    }

    #[tokio::test]
    async fn test_suspend_clears_approved_at() {
        let mut approved = stored_seller();
        approved.status = SellerStatus::Approved;
        approved.approved_at = Some(Utc::now().into());
        let mut suspended = approved.clone();
        suspended.status = SellerStatus::Suspended;
        suspended.approved_at = None;
        suspended.suspended_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[approved]])
                .append_query_results([[suspended]])
                .into_connection(),
        );
        let svc = service_on(db.clone());

        svc.set_status("s1", "suspended", Some("expired licence".to_string()))
            .await
            .unwrap();
        drop(svc);

        let statements = executed(db);
        let update = first(&statements, "UPDATE");
        assert_eq!(
            bound(update, "status"),
            sea_orm::Value::String(Some(Box::new("suspended".to_string())))
        );
        assert!(is_null(update, "approved_at"));
        assert!(!is_null(update, "suspended_at"));
    }

    #[tokio::test]
    async fn test_review_agreement_rejects_unknown_status() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = svc.review_agreement("s1", "maybe", None, "a1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_seller()]])
            .into_connection();
        let svc = service(db);

        let result = svc.patch("s1", SellerPatch::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_patch_ignores_password() {
        let patch: SellerPatch =
            serde_json::from_value(serde_json::json!({ "password": "x", "city": "Pune" })).unwrap();
        let mut active = stored_seller().into_active_model();
        assert!(apply_patch(&mut active, patch));
        assert!(!active.password.is_set());
    }

    #[tokio::test]
    async fn test_stats_counts_each_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(9)]])
            .append_query_results([[count_row(4)]])
            .append_query_results([[count_row(3)]])
            .append_query_results([[count_row(1)]])
            .append_query_results([[count_row(1)]])
            .into_connection();
        let svc = service(db);

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            SellerStats {
                total: 9,
                pending: 4,
                approved: 3,
                rejected: 1,
                suspended: 1
            }
        );
    }

    #[tokio::test]
    async fn test_delete_missing_seller() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let svc = service(db);

        assert!(matches!(svc.delete("nope").await, Err(AppError::NotFound(_))));
    }
}
