//! Referral code generation.

use async_trait::async_trait;
use marketplace_common::{AppError, AppResult};
use marketplace_db::repositories::{CustomerRepository, SellerRepository};
use rand::Rng;

/// Fallback prefix for sellers without a usable name.
pub const SELLER_CODE_FALLBACK: &str = "SEL";
/// Fallback prefix for customers without a usable name.
pub const CUSTOMER_CODE_FALLBACK: &str = "CUS";

const MAX_ATTEMPTS: usize = 32;

/// A set of referral codes that must stay unique.
#[async_trait]
pub trait ReferralCodeRegistry: Send + Sync {
    /// Whether `code` is already assigned.
    async fn is_taken(&self, code: &str) -> AppResult<bool>;
}

#[async_trait]
impl ReferralCodeRegistry for SellerRepository {
    async fn is_taken(&self, code: &str) -> AppResult<bool> {
        Ok(self.find_by_referral_code(code).await?.is_some())
    }
}

#[async_trait]
impl ReferralCodeRegistry for CustomerRepository {
    async fn is_taken(&self, code: &str) -> AppResult<bool> {
        Ok(self.find_by_own_code(code).await?.is_some())
    }
}

/// Up to three leading alphanumerics of the first word, uppercased.
#[must_use]
pub fn referral_prefix(name: &str, fallback: &str) -> String {
    let prefix: String = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();

    if prefix.is_empty() {
        fallback.to_string()
    } else {
        prefix
    }
}

/// One candidate code: prefix plus a five-digit suffix.
#[must_use]
pub fn candidate_code(name: &str, fallback: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10_000..=99_999);
    format!("{}{suffix}", referral_prefix(name, fallback))
}

/// Generate a code not yet present in `registry`.
pub async fn generate_unique_code<R>(registry: &R, name: &str, fallback: &str) -> AppResult<String>
where
    R: ReferralCodeRegistry + ?Sized,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = candidate_code(name, fallback);
        if !registry.is_taken(&code).await? {
            return Ok(code);
        }
        tracing::debug!(code = %code, "Referral code collision, retrying");
    }
    Err(AppError::Internal(
        "Could not allocate a unique referral code".to_string(),
    ))
}

/// Normalize a user-supplied referral code for lookup.
#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    Some(code.trim().to_uppercase()).filter(|c| !c.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Registry that records every code it has handed out.
    #[derive(Default)]
    struct MemoryRegistry {
        codes: Mutex<HashSet<String>>,
        lookups: AtomicUsize,
        reject_first: usize,
    }

    #[async_trait]
    impl ReferralCodeRegistry for MemoryRegistry {
        async fn is_taken(&self, code: &str) -> AppResult<bool> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            if n < self.reject_first {
                return Ok(true);
            }
            Ok(self.codes.lock().unwrap().contains(code))
        }
    }

    #[test]
    fn test_prefix_from_first_word() {
        assert_eq!(referral_prefix("asha rao", SELLER_CODE_FALLBACK), "ASH");
        assert_eq!(referral_prefix("Al", SELLER_CODE_FALLBACK), "AL");
        assert_eq!(referral_prefix("  ", SELLER_CODE_FALLBACK), "SEL");
        assert_eq!(referral_prefix("", CUSTOMER_CODE_FALLBACK), "CUS");
        assert_eq!(referral_prefix("o'neil", SELLER_CODE_FALLBACK), "ONE");
    }

    #[test]
    fn test_candidate_suffix_is_five_digits() {
        for _ in 0..100 {
            let code = candidate_code("Meera", SELLER_CODE_FALLBACK);
            let suffix: u32 = code.strip_prefix("MEE").unwrap().parse().unwrap();
            assert!((10_000..=99_999).contains(&suffix));
        }
    }

    #[tokio::test]
    async fn test_retries_past_collisions() {
        let registry = MemoryRegistry {
            reject_first: 3,
            ..Default::default()
        };

        let code = generate_unique_code(&registry, "Ravi", SELLER_CODE_FALLBACK)
            .await
            .unwrap();

        assert!(code.starts_with("RAV"));
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_generated_codes_are_distinct() {
        let registry = MemoryRegistry::default();

        for _ in 0..200 {
            let code = generate_unique_code(&registry, "Ravi", SELLER_CODE_FALLBACK)
                .await
                .unwrap();
            assert!(registry.codes.lock().unwrap().insert(code));
        }
    }

    #[tokio::test]
    async fn test_gives_up_when_registry_is_full() {
        let registry = MemoryRegistry {
            reject_first: usize::MAX,
            ..Default::default()
        };

        let result = generate_unique_code(&registry, "Ravi", SELLER_CODE_FALLBACK).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" ash12345 ").as_deref(), Some("ASH12345"));
        assert_eq!(normalize_code("  "), None);
    }
}
