use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::ForgeError;

/// Keyed request quotas per `ClientId::partition_key`.
///
/// `threadgen` guards every endpoint that spends model tokens: 20 per day
/// per caller. `general` covers the cheap read endpoints at 100 per minute.
/// GCRA semantics: the daily budget is a burst of 20 replenishing one
/// permit roughly every 72 minutes.
pub struct ApiLimits {
    threadgen: DefaultKeyedRateLimiter<String>,
    general: DefaultKeyedRateLimiter<String>,
}

impl ApiLimits {
    pub fn new() -> Self {
        let day_per_permit = Duration::from_secs(86_400 / 20);
        let threadgen_quota = Quota::with_period(day_per_permit)
            .expect("non-zero period")
            .allow_burst(NonZeroU32::new(20).expect("non-zero burst"));
        let general_quota = Quota::per_minute(NonZeroU32::new(100).expect("non-zero burst"));

        Self {
            threadgen: RateLimiter::keyed(threadgen_quota),
            general: RateLimiter::keyed(general_quota),
        }
    }

    pub fn check_threadgen(&self, key: &str) -> Result<(), ForgeError> {
        self.threadgen
            .check_key(&key.to_string())
            .map_err(|_| ForgeError::RateLimited)
    }

    pub fn check_general(&self, key: &str) -> Result<(), ForgeError> {
        self.general
            .check_key(&key.to_string())
            .map_err(|_| ForgeError::RateLimited)
    }
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self::new()
    }
}
