//! Business logic services.

pub mod admin;
pub mod auth;
pub mod category;
pub mod contact;
pub mod customer;
pub mod form;
pub mod mail;
pub mod otp;
pub mod product;
pub mod referral;
pub mod review;
pub mod seller;

#[cfg(test)]
mod test_support;

pub use admin::{AdminRegistration, AdminService, AdminSession};
pub use auth::{Claims, Role, TokenService};
pub use category::CategoryService;
pub use contact::{ContactReceipt, ContactService, ContactSubmission};
pub use customer::{
    CustomerService, CustomerSession, CustomerSignup, CustomerStats, ProfileUpdate,
};
pub use form::FormFields;
pub use mail::{DeliveryStatus, MailMessage, MailService};
pub use otp::{
    InMemoryOtpStore, IssuedOtp, OtpGate, OtpNotifier, OtpRecord, OtpStore, RedisOtpStore,
};
pub use product::{BulkReviewResult, ProductPatch, ProductService, ProductSubmission};
pub use review::{ProductAction, ReviewDecision, ReviewStatus};
pub use seller::{
    DocumentUpload, SellerDetail, SellerPatch, SellerService, SellerSession, SellerStats,
};
