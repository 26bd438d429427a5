//! Database entities.

#![allow(missing_docs)]

pub mod admin;
pub mod category;
pub mod contact_message;
pub mod customer;
pub mod product;
pub mod seller;

pub use admin::Entity as Admin;
pub use category::Entity as Category;
pub use contact_message::Entity as ContactMessage;
pub use customer::Entity as Customer;
pub use product::Entity as Product;
pub use seller::Entity as Seller;
