//! One-time password gate.
//!
//! A code is issued per email and lives in an [`OtpStore`] until it is
//! consumed or found expired. Issuing again overwrites the previous code.
//! Verification has three distinct failures: no record, expired record (which
//! is removed), and a wrong code (the record stays so the user can retry).
//!
//! Attempts are not throttled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use marketplace_common::{AppError, AppResult, OtpConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::form::normalize_email;
use super::mail::{DeliveryStatus, MailService};

/// Smallest issued code.
pub const OTP_MIN: u32 = 100_000;
/// Largest issued code.
pub const OTP_MAX: u32 = 999_999;

/// A stored code and the instant after which it is no longer accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Key-value store holding at most one record per key.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert or overwrite. The store may drop the record after `retain_for`.
    async fn put(&self, key: &str, record: &OtpRecord, retain_for: Duration) -> AppResult<()>;

    async fn get(&self, key: &str) -> AppResult<Option<OtpRecord>>;

    /// Remove a record. Only one of several concurrent callers sees `true`.
    async fn remove(&self, key: &str) -> AppResult<bool>;
}

/// Process-local store.
#[derive(Clone, Default)]
pub struct InMemoryOtpStore {
    records: Arc<RwLock<HashMap<String, (OtpRecord, Instant)>>>,
}

impl InMemoryOtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop records past their retention period.
    pub async fn purge(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, (_, evict_at)| *evict_at > now);
        before - records.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, key: &str, record: &OtpRecord, retain_for: Duration) -> AppResult<()> {
        let evict_at = Instant::now() + retain_for;
        self.records
            .write()
            .await
            .insert(key.to_string(), (record.clone(), evict_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<OtpRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(key)
            .filter(|(_, evict_at)| *evict_at > Instant::now())
            .map(|(record, _)| record.clone()))
    }

    async fn remove(&self, key: &str) -> AppResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }
}

/// Redis-backed store. Records expire through key TTL.
#[derive(Clone)]
pub struct RedisOtpStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisOtpStore {
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, key: &str, record: &OtpRecord, retain_for: Duration) -> AppResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| AppError::Internal(format!("Failed to encode OTP record: {e}")))?;
        let ttl = i64::try_from(retain_for.as_secs()).unwrap_or(i64::MAX).max(1);

        self.redis
            .set::<(), _, _>(self.key(key), json, Some(Expiration::EX(ttl)), None, false)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }

    async fn get(&self, key: &str) -> AppResult<Option<OtpRecord>> {
        let raw: Option<String> = self
            .redis
            .get(self.key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::Internal(format!("Corrupt OTP record: {e}")))
        })
        .transpose()
    }

    async fn remove(&self, key: &str) -> AppResult<bool> {
        let removed: i64 = self
            .redis
            .del(self.key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;
        Ok(removed > 0)
    }
}

/// Channel that delivers an issued code to its owner.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(&self, email: &str, code: &str, ttl_minutes: i64) -> AppResult<()>;
}

#[async_trait]
impl OtpNotifier for MailService {
    async fn send_otp(&self, email: &str, code: &str, ttl_minutes: i64) -> AppResult<()> {
        Self::send_otp(self, email, code, ttl_minutes).await
    }
}

/// Result of issuing a code. The code itself is never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedOtp {
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub delivery: DeliveryStatus,
}

/// Issues and verifies one-time codes.
#[derive(Clone)]
pub struct OtpGate {
    store: Arc<dyn OtpStore>,
    notifier: Arc<dyn OtpNotifier>,
    ttl: chrono::Duration,
}

impl OtpGate {
    /// Create a gate with the configured code lifetime.
    #[must_use]
    pub fn new(store: Arc<dyn OtpStore>, notifier: Arc<dyn OtpNotifier>, config: &OtpConfig) -> Self {
        let secs = i64::try_from(config.ttl_secs).unwrap_or(i64::MAX);
        Self {
            store,
            notifier,
            ttl: chrono::Duration::seconds(secs),
        }
    }

    /// Issue a fresh code for `email`, replacing any live one.
    pub async fn issue(&self, email: &str) -> AppResult<IssuedOtp> {
        self.issue_at(email, Utc::now()).await
    }

    /// Issue with an explicit clock reading.
    ///
    /// The record is written before dispatch; a failed dispatch is reported in
    /// [`IssuedOtp::delivery`] and the record stays valid.
    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> AppResult<IssuedOtp> {
        let email = normalize_email(email)?;
        let record = OtpRecord {
            code: generate_code(),
            expires_at: now + self.ttl,
        };

        self.store.put(&email, &record, self.retention()).await?;
        debug!(email = %email, expires_at = %record.expires_at, "OTP issued");

        let delivery = DeliveryStatus::from_result(
            self.notifier
                .send_otp(&email, &record.code, self.ttl.num_minutes())
                .await,
        );

        Ok(IssuedOtp {
            email,
            expires_at: record.expires_at,
            delivery,
        })
    }

    /// Verify and consume a code.
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<()> {
        self.verify_at(email, code, Utc::now()).await
    }

    /// Verify with an explicit clock reading.
    pub async fn verify_at(&self, email: &str, code: &str, now: DateTime<Utc>) -> AppResult<()> {
        let email = normalize_email(email)?;
        let record = self.store.get(&email).await?.ok_or(AppError::OtpNotFound)?;

        if now > record.expires_at {
            self.store.remove(&email).await?;
            debug!(email = %email, "OTP expired");
            return Err(AppError::OtpExpired);
        }

        if record.code != code {
            return Err(AppError::OtpInvalid);
        }

        // A concurrent verify may have consumed the record first.
        if !self.store.remove(&email).await? {
            return Err(AppError::OtpNotFound);
        }

        info!(email = %email, "OTP verified");
        Ok(())
    }

    /// How long the store keeps a record. Longer than the code lifetime so a
    /// late verify reports expiry rather than a missing code.
    fn retention(&self) -> Duration {
        let secs = u64::try_from(self.ttl.num_seconds()).unwrap_or(0);
        Duration::from_secs(secs.saturating_mul(2).max(1))
    }
}

/// Uniform six-digit code.
#[must_use]
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Notifier that records what it was asked to send.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().1.clone()
        }
    }

    #[async_trait]
    impl OtpNotifier for RecordingNotifier {
        async fn send_otp(&self, email: &str, code: &str, _ttl_minutes: i64) -> AppResult<()> {
            if self.fail {
                return Err(AppError::ExternalService("mail down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn gate(notifier: Arc<RecordingNotifier>) -> (OtpGate, InMemoryOtpStore) {
        let store = InMemoryOtpStore::new();
        let gate = OtpGate::new(Arc::new(store.clone()), notifier, &OtpConfig::default());
        (gate, store)
    }

    fn t0() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_code_is_six_digits_in_range() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&n));
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify_consumes_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, _) = gate(notifier.clone());
        let now = t0();

        let issued = gate.issue_at("A@X.com", now).await.unwrap();
        assert_eq!(issued.email, "a@x.com");
        assert_eq!(issued.expires_at, now + chrono::Duration::minutes(10));
        assert!(issued.delivery.is_sent());

        let code = notifier.last_code();
        gate.verify_at("a@x.com", &code, now).await.unwrap();

        let second = gate.verify_at("a@x.com", &code, now).await;
        assert!(matches!(second, Err(AppError::OtpNotFound)));
    }

    #[tokio::test]
    async fn test_verify_without_issue_is_not_found() {
        let (gate, _) = gate(Arc::new(RecordingNotifier::default()));
        let result = gate.verify("nobody@x.com", "123456").await;
        assert!(matches!(result, Err(AppError::OtpNotFound)));
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected_and_removed() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, store) = gate(notifier.clone());
        let now = t0();

        gate.issue_at("a@x.com", now).await.unwrap();
        let code = notifier.last_code();

        let later = now + chrono::Duration::minutes(11);
        let result = gate.verify_at("a@x.com", &code, later).await;
        assert!(matches!(result, Err(AppError::OtpExpired)));
        assert!(store.get("a@x.com").await.unwrap().is_none());

        let again = gate.verify_at("a@x.com", &code, later).await;
        assert!(matches!(again, Err(AppError::OtpNotFound)));
    }

    #[tokio::test]
    async fn test_exact_expiry_instant_is_still_valid() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, _) = gate(notifier.clone());
        let now = t0();

        let issued = gate.issue_at("a@x.com", now).await.unwrap();
        let code = notifier.last_code();

        gate.verify_at("a@x.com", &code, issued.expires_at).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_record() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, _) = gate(notifier.clone());
        let now = t0();

        gate.issue_at("a@x.com", now).await.unwrap();
        let code = notifier.last_code();
        let wrong = if code == "100000" { "100001" } else { "100000" };

        let result = gate.verify_at("a@x.com", wrong, now).await;
        assert!(matches!(result, Err(AppError::OtpInvalid)));

        gate.verify_at("a@x.com", &code, now).await.unwrap();
    }

    #[tokio::test]
    async fn test_reissue_overwrites_previous_code() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, store) = gate(notifier.clone());
        let now = t0();

        gate.issue_at("a@x.com", now).await.unwrap();
        gate.issue_at("a@x.com", now).await.unwrap();

        let live = store.get("a@x.com").await.unwrap().unwrap();
        assert_eq!(live.code, notifier.last_code());
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_failure_still_issues() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let (gate, store) = gate(notifier);

        let issued = gate.issue("a@x.com").await.unwrap();
        assert!(matches!(issued.delivery, DeliveryStatus::Failed { .. }));
        assert!(store.get("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_verifies_consume_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (gate, _) = gate(notifier.clone());
        let now = t0();

        gate.issue_at("a@x.com", now).await.unwrap();
        let code = notifier.last_code();

        let (a, b) = tokio::join!(
            gate.verify_at("a@x.com", &code, now),
            gate.verify_at("a@x.com", &code, now)
        );
        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_before_store() {
        let (gate, _) = gate(Arc::new(RecordingNotifier::default()));
        let result = gate.issue("not-an-email").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_memory_store_evicts_after_retention() {
        let store = InMemoryOtpStore::new();
        let record = OtpRecord {
            code: "123456".to_string(),
            expires_at: Utc::now(),
        };
        store
            .put("a@x.com", &record, Duration::from_millis(0))
            .await
            .unwrap();

        assert!(store.get("a@x.com").await.unwrap().is_none());
        assert_eq!(store.purge().await, 1);
    }
}
