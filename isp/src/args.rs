//! Extraction of the publisher, video, size and client address from a request.

use crate::errors::ApiError;
use http::request::Parts;
use http::{HeaderMap, Uri};
use mastermind::AccountResolver;
use std::borrow::Cow;
use std::net::Ipv4Addr;

/// Prefix the client API requires on video ids.
pub const CLIENT_VIDEO_PREFIX: &str = "neonvid_";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

const MAX_NUMBER_LEN: usize = 15;
const MAX_IPV4_LEN: usize = 15;
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg"];

#[derive(Clone, Debug, PartialEq)]
pub struct RequestArgs {
    pub publisher_id: String,
    pub video_id: String,
    pub account_id: String,
    /// `None` when the argument is absent or not a valid number.
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub client_ip: String,
}

/// Returns the `index`th non-empty token of the path after `base_path`,
/// splitting on `/` and `?`.
pub fn uri_token<'a>(path: &'a str, base_path: &str, index: usize) -> Result<&'a str, ApiError> {
    path.strip_prefix(base_path)
        .and_then(|rest| {
            rest.split(['/', '?'])
                .filter(|token| !token.is_empty())
                .nth(index)
        })
        .ok_or(ApiError::TokenNotFound(index))
}

pub fn strip_image_extension(video_id: &str) -> &str {
    IMAGE_EXTENSIONS
        .iter()
        .find_map(|ext| {
            let split = video_id.len().checked_sub(ext.len())?;
            let (stem, suffix) = (video_id.get(..split)?, video_id.get(split..)?);
            suffix.eq_ignore_ascii_case(ext).then_some(stem)
        })
        .unwrap_or(video_id)
}

/// Decoded value of the first query argument named `key`.
pub fn query_arg<'a>(uri: &'a Uri, key: &str) -> Option<Cow<'a, str>> {
    url::form_urlencoded::parse(uri.query()?.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Parses a base 10 dimension. Anything that is not entirely a number that
/// fits the 15 character limit yields `None`.
pub fn parse_dimension(value: &str) -> Option<i64> {
    if value.is_empty() || value.len() > MAX_NUMBER_LEN {
        return None;
    }
    value.parse::<i64>().ok()
}

/// The `X-Forwarded-For` value, if it is a single IPv4 literal.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.parse::<Ipv4Addr>().is_ok())
}

/// `cip` wins when it looks like it could be an IPv4 literal; otherwise a
/// valid forwarded-for address is used, falling back to `cip` as given.
pub fn client_ip(uri: &Uri, headers: &HeaderMap) -> String {
    let cip = query_arg(uri, "cip").unwrap_or_default();
    if cip.is_empty() || cip.len() > MAX_IPV4_LEN {
        if let Some(ip) = forwarded_ip(headers) {
            return ip.to_string();
        }
    }
    cip.into_owned()
}

/// Parses the path tokens and query arguments shared by the server and
/// client APIs and resolves the publisher to its account.
pub fn parse_args(
    request: &Parts,
    base_path: &str,
    strip_client_prefix: bool,
    accounts: &dyn AccountResolver,
) -> Result<RequestArgs, ApiError> {
    let path = request.uri.path();
    let publisher_id = uri_token(path, base_path, 0)?;
    let video_token = strip_image_extension(uri_token(path, base_path, 1)?);

    let video_id = if strip_client_prefix {
        video_token
            .strip_prefix(CLIENT_VIDEO_PREFIX)
            .ok_or(ApiError::PrefixMismatch)?
    } else {
        video_token
    };

    let width = query_arg(&request.uri, "width").and_then(|v| parse_dimension(&v));
    let height = query_arg(&request.uri, "height").and_then(|v| parse_dimension(&v));
    let client_ip = client_ip(&request.uri, &request.headers);

    let account_id = accounts
        .resolve_account(publisher_id)
        .map_err(|_| ApiError::AccountNotFound(publisher_id.to_string()))?;

    Ok(RequestArgs {
        publisher_id: publisher_id.to_string(),
        video_id: video_id.to_string(),
        account_id,
        width,
        height,
        client_ip,
    })
}
