//! Server API: `/v1/server/{publisher}/{video}` answers the image url as JSON.

use super::{ApiContext, Handler, record_error};
use crate::args::parse_args;
use crate::errors::ApiError;
use crate::response::ResponseDescriptor;
use http::StatusCode;
use http::request::Parts;
use std::time::SystemTime;

pub const SERVER_API_PATH: &str = "/v1/server/";

const NOT_FOUND_BODY: &str = r#"{"error":"thumbnail for video id not found"}"#;

pub struct ServerApi;

impl ServerApi {
    fn lookup(&self, ctx: &ApiContext, request: &Parts) -> Result<String, ApiError> {
        let args = parse_args(request, SERVER_API_PATH, false, ctx.accounts.as_ref())?;

        // Server calls carry no cookies, so there is no bucket to look up by.
        ctx.directives
            .resolve_image_url(&args.account_id, &args.video_id, "", args.width, args.height)
            .ok_or(ApiError::DirectiveNotFound(args.video_id))
    }
}

impl Handler for ServerApi {
    fn name(&self) -> &'static str {
        "server"
    }

    fn handle(&self, ctx: &ApiContext, request: &Parts, _now: SystemTime) -> ResponseDescriptor {
        let mut response = ResponseDescriptor::new();

        match self.lookup(ctx, request) {
            Ok(url) => {
                let body = response.body_mut();
                body.push(r#"{"data":"#);
                body.push(serde_json::Value::String(url).to_string());
                body.push(r#","error":""}"#);
                response.set_json_headers(StatusCode::OK);
            }
            Err(err) => {
                record_error(self.name(), &err);
                response.body_mut().push(NOT_FOUND_BODY);
                response.set_json_headers(StatusCode::BAD_REQUEST);
            }
        }

        response
    }
}
