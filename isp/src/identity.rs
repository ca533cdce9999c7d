//! The anonymous user id cookie.
//!
//! The id is `{8 random chars}{8 digit timestamp}`. The timestamp field holds
//! the leading 8 digits of the 10 digit Unix time at creation, so it counts
//! in steps of 100 seconds. Readiness is measured from the last second of
//! that step, so the delay is never shortened.
//!
//! It gates A/B testing: a browser may still have an older request in flight
//! that was sent without the id, and that request would get a bucket keyed
//! off its IP. Waiting out the activation delay before bucketing by id keeps
//! the two from fighting over the bucket cookie.

use crate::cookie::{find_cookie, set_cookie_value};
use crate::errors::ApiError;
use crate::response::ResponseDescriptor;
use http::header::{HeaderMap, SET_COOKIE};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::time::{Duration, SystemTime};

pub const IDENTITY_COOKIE_NAME: &str = "neonglobaluserid";
pub const RANDOM_LEN: usize = 8;
pub const TIMESTAMP_LEN: usize = 8;
pub const IDENTITY_LEN: usize = RANDOM_LEN + TIMESTAMP_LEN;
pub const ACTIVATION_DELAY: Duration = Duration::from_secs(120);

const TIMESTAMP_RESOLUTION_SECS: u64 = 100;
const TIMESTAMP_MODULUS: u64 = 100_000_000;
// Effectively never expires.
const IDENTITY_EXPIRES: &str = "Thu, 31-Dec-37 23:59:59 GMT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn generate(now: SystemTime) -> Self {
        let random: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_LEN)
            .map(char::from)
            .collect();
        Identity(format!("{random}{}", encode_timestamp(now)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Latest second the id can have been created in: the last second of the
    /// 100 second step its timestamp field names. `None` when the field is
    /// not 8 decimal digits.
    pub fn created_at(&self) -> Option<u64> {
        let field = self.0.as_bytes().get(RANDOM_LEN..IDENTITY_LEN)?;
        if !field.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let field = std::str::from_utf8(field).ok()?;
        field
            .parse::<u64>()
            .ok()
            .map(|ts| ts * TIMESTAMP_RESOLUTION_SECS + (TIMESTAMP_RESOLUTION_SECS - 1))
    }

    /// Whether enough time has passed since creation to bucket by this id.
    pub fn is_ab_test_ready_at(&self, now: SystemTime) -> bool {
        match self.created_at() {
            Some(created) => unix_secs(now) >= created + ACTIVATION_DELAY.as_secs(),
            None => false,
        }
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity(value.to_string())
    }
}

// Only 8 digits fit the wire format; this wraps once Unix time needs 11
// digits.
fn encode_timestamp(now: SystemTime) -> String {
    let ts = (unix_secs(now) / TIMESTAMP_RESOLUTION_SECS) % TIMESTAMP_MODULUS;
    format!("{ts:0width$}", width = TIMESTAMP_LEN)
}

pub(crate) fn unix_secs(at: SystemTime) -> u64 {
    at.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbTestReadiness {
    pub ready: bool,
    pub identity: Option<Identity>,
}

/// Reads and writes the user id cookie.
#[derive(Clone, Debug)]
pub struct IdentityCookie {
    domain: String,
}

impl IdentityCookie {
    pub fn new(domain: impl Into<String>) -> Self {
        IdentityCookie {
            domain: domain.into(),
        }
    }

    pub fn is_present(&self, headers: &HeaderMap) -> bool {
        find_cookie(headers, IDENTITY_COOKIE_NAME).is_some()
    }

    pub fn generate(&self, now: SystemTime) -> Identity {
        Identity::generate(now)
    }

    pub fn set_on_response(
        &self,
        response: &mut ResponseDescriptor,
        identity: &Identity,
    ) -> Result<(), ApiError> {
        let cookie = set_cookie_value(
            IDENTITY_COOKIE_NAME,
            identity.as_str(),
            IDENTITY_EXPIRES,
            &self.domain,
            "/",
        );
        response.append_header(SET_COOKIE, &cookie)
    }

    pub fn is_ab_test_ready(&self, headers: &HeaderMap, now: SystemTime) -> AbTestReadiness {
        match find_cookie(headers, IDENTITY_COOKIE_NAME) {
            Some(value) => {
                let identity = Identity::from(value);
                AbTestReadiness {
                    ready: identity.is_ab_test_ready_at(now),
                    identity: Some(identity),
                }
            }
            None => AbTestReadiness {
                ready: false,
                identity: None,
            },
        }
    }
}
