//! Review lifecycle shared by sellers, products and customers.
//!
//! Every reviewable record carries a flat status that an admin may reassign at
//! any time. This module owns the canonical status, parses admin input, and
//! computes the timestamp and visibility columns a decision implies. Each
//! entity keeps its own stored enum; the conversions live here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use marketplace_common::{AppError, AppResult};
use marketplace_db::entities::{
    customer::CustomerStatus, product::ProductApprovalStatus, seller::SellerStatus,
};
use serde::{Deserialize, Serialize};

/// Canonical review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl ReviewStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = AppError;

    /// Case-insensitive. `active` is accepted for customers' approved state.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" | "active" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "suspended" => Ok(Self::Suspended),
            other => Err(AppError::Validation(format!("Invalid status: {other}"))),
        }
    }
}

/// Admin action on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    Approve,
    Reject,
}

impl ProductAction {
    /// Status the action moves a product to.
    #[must_use]
    pub const fn target(self) -> ReviewStatus {
        match self {
            Self::Approve => ReviewStatus::Approved,
            Self::Reject => ReviewStatus::Rejected,
        }
    }
}

impl FromStr for ProductAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(AppError::Validation("Invalid action".to_string())),
        }
    }
}

/// Timestamp columns of a reviewable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewStamps {
    pub approved_at: Option<DateTime<Utc>>,
    pub suspended_at: Option<DateTime<Utc>>,
}

/// One admin decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    pub target: ReviewStatus,
    pub reason: String,
    pub decided_at: DateTime<Utc>,
}

impl ReviewDecision {
    /// Decision taken now.
    #[must_use]
    pub fn new(target: ReviewStatus, reason: Option<String>) -> Self {
        Self::at(target, reason, Utc::now())
    }

    /// Decision taken at a given instant.
    #[must_use]
    pub fn at(target: ReviewStatus, reason: Option<String>, decided_at: DateTime<Utc>) -> Self {
        Self {
            target,
            reason: reason.map(|r| r.trim().to_string()).unwrap_or_default(),
            decided_at,
        }
    }

    /// Approved/rejected decision from the `{approved: bool}` admin form.
    #[must_use]
    pub fn from_approval(approved: bool, reason: Option<String>) -> Self {
        let target = if approved {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Rejected
        };
        Self::new(target, reason)
    }

    /// Stamps after this decision.
    ///
    /// Approval stamps `approved_at`; any other target clears it. Suspension
    /// stamps `suspended_at`; other targets leave it as it was.
    #[must_use]
    pub fn stamps(&self, previous: ReviewStamps) -> ReviewStamps {
        ReviewStamps {
            approved_at: (self.target == ReviewStatus::Approved).then_some(self.decided_at),
            suspended_at: if self.target == ReviewStatus::Suspended {
                Some(self.decided_at)
            } else {
                previous.suspended_at
            },
        }
    }

    /// Products are public exactly while approved.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.target == ReviewStatus::Approved
    }
}

impl From<ReviewStatus> for SellerStatus {
    fn from(status: ReviewStatus) -> Self {
        match status {
            ReviewStatus::Pending => Self::Pending,
            ReviewStatus::Approved => Self::Approved,
            ReviewStatus::Rejected => Self::Rejected,
            ReviewStatus::Suspended => Self::Suspended,
        }
    }
}

impl From<ReviewStatus> for CustomerStatus {
    fn from(status: ReviewStatus) -> Self {
        match status {
            ReviewStatus::Pending => Self::Pending,
            ReviewStatus::Approved => Self::Active,
            ReviewStatus::Rejected => Self::Rejected,
            ReviewStatus::Suspended => Self::Suspended,
        }
    }
}

impl TryFrom<ReviewStatus> for ProductApprovalStatus {
    type Error = AppError;

    fn try_from(status: ReviewStatus) -> Result<Self, Self::Error> {
        match status {
            ReviewStatus::Pending => Ok(Self::Pending),
            ReviewStatus::Approved => Ok(Self::Approved),
            ReviewStatus::Rejected => Ok(Self::Rejected),
            ReviewStatus::Suspended => Err(AppError::Validation(
                "Products cannot be suspended".to_string(),
            )),
        }
    }
}

/// Parse an optional status filter. Blank and `all` mean no filter.
pub fn parse_status_filter(input: Option<&str>) -> AppResult<Option<ReviewStatus>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("APPROVED".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        assert_eq!(" Suspended ".parse::<ReviewStatus>().unwrap(), ReviewStatus::Suspended);
        assert_eq!("active".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        assert!(matches!(
            "archived".parse::<ReviewStatus>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_product_action_parse() {
        assert_eq!("Approve".parse::<ProductAction>().unwrap(), ProductAction::Approve);
        assert_eq!(ProductAction::Reject.target(), ReviewStatus::Rejected);
        assert!(matches!(
            "publish".parse::<ProductAction>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_approval_sets_approved_at() {
        let decision = ReviewDecision::at(ReviewStatus::Approved, None, t0());
        let stamps = decision.stamps(ReviewStamps::default());

        assert_eq!(stamps.approved_at, Some(t0()));
        assert_eq!(stamps.suspended_at, None);
    }

    #[test]
    fn test_leaving_approved_clears_approved_at() {
        let approved = ReviewStamps {
            approved_at: Some(t0()),
            suspended_at: None,
        };
        let later = t0() + Duration::days(2);

        for target in [
            ReviewStatus::Pending,
            ReviewStatus::Rejected,
            ReviewStatus::Suspended,
        ] {
            let stamps = ReviewDecision::at(target, None, later).stamps(approved);
            assert_eq!(stamps.approved_at, None, "{target} should clear approved_at");
        }
    }

    #[test]
    fn test_suspension_stamp_survives_reinstatement() {
        let suspended = ReviewDecision::at(ReviewStatus::Suspended, None, t0())
            .stamps(ReviewStamps::default());
        assert_eq!(suspended.suspended_at, Some(t0()));

        let later = t0() + Duration::hours(5);
        let reinstated = ReviewDecision::at(ReviewStatus::Approved, None, later).stamps(suspended);
        assert_eq!(reinstated.approved_at, Some(later));
        assert_eq!(reinstated.suspended_at, Some(t0()));
    }

    #[test]
    fn test_visibility_follows_approval() {
        assert!(ReviewDecision::new(ReviewStatus::Approved, None).is_public());
        assert!(!ReviewDecision::new(ReviewStatus::Rejected, None).is_public());
        assert!(!ReviewDecision::new(ReviewStatus::Pending, None).is_public());
    }

    #[test]
    fn test_from_approval_flag() {
        let decision = ReviewDecision::from_approval(false, Some("  blurry documents ".into()));
        assert_eq!(decision.target, ReviewStatus::Rejected);
        assert_eq!(decision.reason, "blurry documents");
    }

    #[test]
    fn test_entity_status_mapping() {
        assert_eq!(CustomerStatus::from(ReviewStatus::Approved), CustomerStatus::Active);
        assert_eq!(SellerStatus::from(ReviewStatus::Suspended), SellerStatus::Suspended);
        assert_eq!(
            ProductApprovalStatus::try_from(ReviewStatus::Approved).unwrap(),
            ProductApprovalStatus::Approved
        );
        assert!(ProductApprovalStatus::try_from(ReviewStatus::Suspended).is_err());
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("Pending")).unwrap(),
            Some(ReviewStatus::Pending)
        );
        assert!(parse_status_filter(Some("bogus")).is_err());
    }
}
