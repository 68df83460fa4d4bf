use std::{net::IpAddr, num::NonZeroU32, time::Duration};

use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use thiserror::Error;

const LOGIN_ATTEMPT_BURST: u32 = 5;

/// Rate limiter shared for login and signup attempts, keyed by client IP and
/// by the submitted username.
pub struct LoginRateLimiter {
    ip_limiter: RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>,
    username_limiter: RateLimiter<String, DashMapStateStore<String>, DefaultClock>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        let burst = NonZeroU32::new(LOGIN_ATTEMPT_BURST).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(burst);
        Self {
            ip_limiter: RateLimiter::keyed(quota),
            username_limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check_ip(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        match self.ip_limiter.check_key(&ip) {
            Ok(_) => {
                self.ip_limiter.retain_recent();
                Ok(())
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(RateLimitError::Ip(wait))
            }
        }
    }

    pub fn check_username(&self, username: &str) -> Result<(), RateLimitError> {
        let key = username.to_owned();
        match self.username_limiter.check_key(&key) {
            Ok(_) => {
                self.username_limiter.retain_recent();
                Ok(())
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(RateLimitError::Username(wait))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Too many attempts from this IP. Try again in {0:?}.")]
    Ip(Duration),
    #[error("Too many attempts for this username. Try again in {0:?}.")]
    Username(Duration),
}

impl RateLimitError {
    pub fn retry_after(&self) -> Duration {
        match self {
            RateLimitError::Ip(duration) | RateLimitError::Username(duration) => *duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn burst_is_allowed_then_limited() {
        let limiter = LoginRateLimiter::new();
        let ip = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

        for _ in 0..LOGIN_ATTEMPT_BURST {
            assert!(limiter.check_ip(ip).is_ok());
        }

        let err = limiter.check_ip(ip).unwrap_err();
        assert!(err.retry_after() > Duration::ZERO);
    }

    #[test]
    fn usernames_are_limited_independently() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..LOGIN_ATTEMPT_BURST {
            assert!(limiter.check_username("alice").is_ok());
        }

        assert!(limiter.check_username("alice").is_err());
        assert!(limiter.check_username("bob").is_ok());
    }
}
