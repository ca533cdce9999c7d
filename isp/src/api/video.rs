//! Video status: `/v1/video?publisher_id=..&video_id=..` reports whether a
//! directive exists for the video.

use super::{ApiContext, Handler, record_error};
use crate::args::query_arg;
use crate::errors::ApiError;
use crate::response::ResponseDescriptor;
use http::StatusCode;
use http::request::Parts;
use std::time::SystemTime;

pub const VIDEO_API_PATH: &str = "/v1/video";

const MISSING_ARGS_BODY: &str =
    r#"{"error": "publisher_id and video_id are required query parameters"}"#;
const FOUND_BODY: &str = r#"{"message": "found directive"}"#;

pub struct VideoStatusApi;

impl VideoStatusApi {
    fn directive_exists(&self, ctx: &ApiContext, request: &Parts) -> Result<bool, ApiError> {
        let publisher_id =
            query_arg(&request.uri, "publisher_id").ok_or(ApiError::ArgMissing("publisher_id"))?;
        let video_id = query_arg(&request.uri, "video_id").ok_or(ApiError::ArgMissing("video_id"))?;

        Ok(match ctx.accounts.resolve_account(&publisher_id) {
            Ok(account_id) => ctx.directives.directive_exists(&account_id, &video_id),
            Err(_) => false,
        })
    }
}

impl Handler for VideoStatusApi {
    fn name(&self) -> &'static str {
        "video"
    }

    fn handle(&self, ctx: &ApiContext, request: &Parts, _now: SystemTime) -> ResponseDescriptor {
        let mut response = ResponseDescriptor::new();

        match self.directive_exists(ctx, request) {
            Ok(true) => {
                response.body_mut().push(FOUND_BODY);
                response.set_json_headers(StatusCode::OK);
            }
            Ok(false) => response.set_no_content_headers(),
            Err(err) => {
                record_error(self.name(), &err);
                response.body_mut().push(MISSING_ARGS_BODY);
                response.set_json_headers(StatusCode::BAD_REQUEST);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ab_cookie::AbCookieController;
    use crate::testutils::{get_request, test_mastermind};
    use std::sync::Arc;

    fn handle(uri: &str) -> ResponseDescriptor {
        let mastermind = Arc::new(test_mastermind());
        let ctx = ApiContext::new(
            mastermind.clone(),
            mastermind,
            AbCookieController::new(".neon-images.com"),
        );
        VideoStatusApi.handle(&ctx, &get_request(uri, &[]), SystemTime::now())
    }

    #[test]
    fn test_found_directive() {
        let response = handle("/v1/video?publisher_id=p1&video_id=abc");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().to_bytes().as_ref(), FOUND_BODY.as_bytes());
    }

    #[test]
    fn test_unknown_video_or_publisher() {
        let response = handle("/v1/video?publisher_id=p1&video_id=nope");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());

        let response = handle("/v1/video?publisher_id=nobody&video_id=abc");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_missing_arguments() {
        for uri in ["/v1/video?publisher_id=p1", "/v1/video?video_id=abc", "/v1/video"] {
            let response = handle(uri);
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                response.body().to_bytes().as_ref(),
                MISSING_ARGS_BODY.as_bytes()
            );
        }
    }
}
