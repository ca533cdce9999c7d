//! Batch thumbnail id lookup: `/v1/getthumbnailid/{publisher}[.html]?params=v1,v2`
//! answers the thumbnail id of every listed video, in order, `null` where a
//! video has none. The `.html` form wraps the list in a page that posts it
//! to the parent frame.

use super::{ApiContext, Handler, record_error};
use crate::args::{forwarded_ip, query_arg, uri_token};
use crate::errors::ApiError;
use crate::response::ResponseDescriptor;
use http::request::Parts;
use std::time::SystemTime;

pub const THUMBNAIL_API_PATH: &str = "/v1/getthumbnailid/";

const HTML_PROLOGUE: &str =
    "<!DOCTYPE html><html><head><script type='text/javascript'>window.parent.postMessage('";
const HTML_EPILOGUE: &str = "', '*')</script></head><body></body></html>";
const NO_THUMBNAIL: &str = "null";
const ITEM_SEPARATOR: &str = ",";
const PARAM_SEPARATORS: [char; 3] = [',', ' ', '\n'];

/// Splits `pub1.html` into the publisher id and whether html was requested.
fn split_publisher_token(token: &str) -> Option<(&str, bool)> {
    let mut parts = token.split('.').filter(|part| !part.is_empty());
    let publisher_id = parts.next()?;
    Some((publisher_id, parts.next() == Some("html")))
}

pub struct ThumbnailApi;

impl ThumbnailApi {
    fn compose(
        &self,
        ctx: &ApiContext,
        request: &Parts,
        now: SystemTime,
    ) -> Result<ResponseDescriptor, ApiError> {
        let token = uri_token(request.uri.path(), THUMBNAIL_API_PATH, 0)?;
        let (publisher_id, html) = split_publisher_token(token).ok_or(ApiError::TokenNotFound(0))?;
        let account_id = ctx
            .accounts
            .resolve_account(publisher_id)
            .map_err(|_| ApiError::AccountNotFound(publisher_id.to_string()))?;

        let params = query_arg(&request.uri, "params").ok_or(ApiError::ArgMissing("params"))?;
        let video_ids: Vec<&str> = params
            .split(PARAM_SEPARATORS)
            .filter(|id| !id.is_empty())
            .collect();
        if video_ids.is_empty() {
            return Err(ApiError::ArgMissing("params"));
        }

        // Batch calls come through the proxy; only the forwarded address is trusted.
        let ip = forwarded_ip(&request.headers).unwrap_or_default();

        let mut response = ResponseDescriptor::new();
        let body = response.body_mut();
        if html {
            body.push(HTML_PROLOGUE);
        }
        for (i, video_id) in video_ids.iter().enumerate() {
            if i > 0 {
                body.push(ITEM_SEPARATOR);
            }
            let bucket = ctx
                .ab_cookies
                .resolve_bucket_for_lookup(&request.headers, ip, video_id, now);
            match ctx
                .directives
                .resolve_thumbnail_id(&account_id, video_id, bucket.as_str())
            {
                Some(tid) => body.push(tid),
                None => body.push(NO_THUMBNAIL),
            }
        }
        if html {
            body.push(HTML_EPILOGUE);
        }

        response.set_batch_headers(html);
        Ok(response)
    }
}

impl Handler for ThumbnailApi {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn handle(&self, ctx: &ApiContext, request: &Parts, now: SystemTime) -> ResponseDescriptor {
        self.compose(ctx, request, now).unwrap_or_else(|err| {
            record_error(self.name(), &err);
            let mut response = ResponseDescriptor::new();
            response.set_no_content_headers();
            response
        })
    }
}
