// src/memory/tiers.rs

//! Tier assignment and retention policy.

use super::types::MemoryTier;
use crate::config::CONFIG;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct TierPolicy {
    session_days: i64,
    sub_temporary_days: i64,
    temporary_days: i64,
}

impl TierPolicy {
    pub fn from_config() -> Self {
        Self {
            session_days: CONFIG.retention_session_days,
            sub_temporary_days: CONFIG.retention_sub_temporary_days,
            temporary_days: CONFIG.retention_temporary_days,
        }
    }

    /// Personal information outranks importance; otherwise thresholds decide.
    pub fn determine_tier(&self, importance: f32, is_personal_info: bool) -> MemoryTier {
        if is_personal_info {
            return MemoryTier::Personal;
        }
        if importance >= 0.9 {
            MemoryTier::Permanent
        } else if importance >= 0.7 {
            MemoryTier::Temporary
        } else if importance >= 0.5 {
            MemoryTier::SubTemporary
        } else {
            MemoryTier::Session
        }
    }

    pub fn retention_days(&self, tier: MemoryTier) -> Option<i64> {
        match tier {
            MemoryTier::Session => Some(self.session_days),
            MemoryTier::SubTemporary => Some(self.sub_temporary_days),
            MemoryTier::Temporary => Some(self.temporary_days),
            MemoryTier::Personal | MemoryTier::Permanent => None,
        }
    }

    /// Expiry instant for a record stored at `now`; durable tiers get none.
    pub fn expiry(&self, tier: MemoryTier, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.retention_days(tier).map(|days| now + Duration::days(days))
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::from_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_flag_wins_over_importance() {
        let policy = TierPolicy::from_config();
        assert_eq!(policy.determine_tier(0.95, true), MemoryTier::Personal);
    }

    #[test]
    fn importance_thresholds() {
        let policy = TierPolicy::from_config();
        assert_eq!(policy.determine_tier(0.95, false), MemoryTier::Permanent);
        assert_eq!(policy.determine_tier(0.75, false), MemoryTier::Temporary);
        assert_eq!(policy.determine_tier(0.55, false), MemoryTier::SubTemporary);
        assert_eq!(policy.determine_tier(0.2, false), MemoryTier::Session);
    }

    #[test]
    fn durable_tiers_never_expire() {
        let policy = TierPolicy::from_config();
        let now = Utc::now();
        assert!(policy.expiry(MemoryTier::Permanent, now).is_none());
        assert!(policy.expiry(MemoryTier::Personal, now).is_none());
        assert!(policy.expiry(MemoryTier::Session, now).is_some());
    }
}
