//! Tunables for zone operations.

use std::{fmt::Debug, time::Duration};

use uuid::Uuid;

/// Largest page the Route53 listing calls accept
pub const MAX_ITEMS: u32 = 100;
pub const CALLER_REF_PREFIX: &str = "r53utils";
/// TTL for delegation NS records created in parent zones
pub const NS_TTL: u32 = 86400;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

pub type CallerRefGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Returns a fresh caller reference, `<prefix>.<random uuid>`
pub fn random_caller_ref(prefix: &str) -> String {
    format!("{}.{}", prefix, Uuid::new_v4().simple())
}

/// Configuration for a [`crate::zone::ZoneManager`]
pub struct ManagerConfig {
    /// Number of items requested per listing page, clamped to [`MAX_ITEMS`]
    pub page_size: u32,
    /// Produces the idempotency token for each zone creation. Must never repeat a value
    pub caller_ref: CallerRefGenerator,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            page_size: MAX_ITEMS,
            caller_ref: Box::new(|| random_caller_ref(CALLER_REF_PREFIX)),
        }
    }
}

impl Debug for ManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// How to wait for a change to propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    /// Give up after this long. [`None`] waits until the change is in sync or cancelled
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_WAIT_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn should_generate_unique_caller_refs() {
        let next_ref = ManagerConfig::default().caller_ref;
        let refs: HashSet<String> = (0..1000).map(|_| next_ref()).collect();
        assert_eq!(refs.len(), 1000);
        assert!(refs.iter().all(|r| r.starts_with("r53utils.")));
    }
}
