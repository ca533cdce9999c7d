//! Decides when to issue the user id and per-video bucket cookies.

use crate::bucket::{self, BucketId};
use crate::cookie::{cookie_date, find_cookie, set_cookie_value};
use crate::errors::ApiError;
use crate::identity::{Identity, IdentityCookie};
use crate::metrics_defs::{BUCKET_COOKIE_SET, COOKIE_SET_FAIL, IDENTITY_COOKIE_PRESENT, IDENTITY_COOKIE_SET};
use crate::response::ResponseDescriptor;
use http::HeaderMap;
use http::header::SET_COOKIE;
use shared::counter;
use std::time::{Duration, SystemTime};

pub const BUCKET_COOKIE_PREFIX: &str = "neonimg_";
pub const BUCKET_COOKIE_TTL: Duration = Duration::from_secs(10 * 60);
/// Bucket cookies are scoped below the client API path of their video.
pub const BUCKET_COOKIE_PATH_PREFIX: &str = "/v1/client/";

pub fn bucket_cookie_name(publisher_id: &str, video_id: &str) -> String {
    format!("{BUCKET_COOKIE_PREFIX}{publisher_id}_{video_id}")
}

#[derive(Clone, Debug)]
pub struct AbCookieController {
    identity: IdentityCookie,
    domain: String,
}

impl AbCookieController {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        AbCookieController {
            identity: IdentityCookie::new(domain.clone()),
            domain,
        }
    }

    pub fn identity(&self) -> &IdentityCookie {
        &self.identity
    }

    /// Issues a user id cookie unless the request already carries one.
    /// Returns the id that was issued, if any.
    pub fn ensure_identity(
        &self,
        headers: &HeaderMap,
        response: &mut ResponseDescriptor,
        now: SystemTime,
    ) -> Option<Identity> {
        if self.identity.is_present(headers) {
            counter!(IDENTITY_COOKIE_PRESENT).increment(1);
            return None;
        }

        let identity = self.identity.generate(now);
        match self.identity.set_on_response(response, &identity) {
            Ok(()) => {
                counter!(IDENTITY_COOKIE_SET).increment(1);
                Some(identity)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to set user id cookie");
                counter!(COOKIE_SET_FAIL, "cookie" => "identity").increment(1);
                None
            }
        }
    }

    /// Returns the bucket cookie of this video if the request carries one,
    /// without touching the response. Otherwise, once the user id is old
    /// enough, derives the bucket from it and sets the cookie. Returns `None`
    /// while the user is not ready for A/B testing.
    pub fn maybe_set_bucket_cookie(
        &self,
        headers: &HeaderMap,
        response: &mut ResponseDescriptor,
        publisher_id: &str,
        video_id: &str,
        now: SystemTime,
    ) -> Option<BucketId> {
        let name = bucket_cookie_name(publisher_id, video_id);
        if let Some(existing) = find_cookie(headers, &name) {
            return Some(BucketId::from(existing));
        }

        let readiness = self.identity.is_ab_test_ready(headers, now);
        let identity = match readiness.identity {
            Some(identity) if readiness.ready => identity,
            _ => return None,
        };

        let bucket = bucket::assign(identity.as_str().as_bytes(), video_id);
        if let Err(err) = self.set_bucket_cookie(response, &name, &bucket, publisher_id, video_id, now) {
            tracing::warn!(cookie = %name, error = %err, "Failed to set bucket cookie");
            counter!(COOKIE_SET_FAIL, "cookie" => "bucket").increment(1);
        } else {
            counter!(BUCKET_COOKIE_SET).increment(1);
        }
        Some(bucket)
    }

    /// Bucket for a directive lookup that does not rely on the bucket cookie:
    /// keyed off the user id once it is ready, otherwise off the client IP.
    pub fn resolve_bucket_for_lookup(
        &self,
        headers: &HeaderMap,
        ip: &str,
        video_id: &str,
        now: SystemTime,
    ) -> BucketId {
        let readiness = self.identity.is_ab_test_ready(headers, now);
        match readiness.identity {
            Some(identity) if readiness.ready => bucket::assign(identity.as_str().as_bytes(), video_id),
            _ => bucket::assign(ip.as_bytes(), video_id),
        }
    }

    fn set_bucket_cookie(
        &self,
        response: &mut ResponseDescriptor,
        name: &str,
        bucket: &BucketId,
        publisher_id: &str,
        video_id: &str,
        now: SystemTime,
    ) -> Result<(), ApiError> {
        let expires = cookie_date(now + BUCKET_COOKIE_TTL)
            .map_err(|err| ApiError::Allocation(err.to_string()))?;
        // Uses the stripped video id, so the path does not cover the
        // `neonvid_` request path. Kept for compatibility with issued cookies.
        let path = format!("{BUCKET_COOKIE_PATH_PREFIX}{publisher_id}/{video_id}");
        let cookie = set_cookie_value(name, bucket.as_str(), &expires, &self.domain, &path);
        response.append_header(SET_COOKIE, &cookie)
    }
}
