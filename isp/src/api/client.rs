//! Client API: `/v1/client/{publisher}/neonvid_{video}[.jpg]` redirects the
//! browser to the image for its A/B bucket and manages the tracking cookies.

use super::{ApiContext, Handler, record_error};
use crate::args::parse_args;
use crate::bucket;
use crate::errors::ApiError;
use crate::response::ResponseDescriptor;
use http::request::Parts;
use std::time::SystemTime;

pub const CLIENT_API_PATH: &str = "/v1/client/";

const REDIRECT_BODY: &str = "redirect to image";

pub struct ClientApi;

impl ClientApi {
    fn redirect(
        &self,
        ctx: &ApiContext,
        request: &Parts,
        response: &mut ResponseDescriptor,
        now: SystemTime,
    ) -> Result<(), ApiError> {
        let args = parse_args(request, CLIENT_API_PATH, true, ctx.accounts.as_ref())?;

        ctx.ab_cookies.ensure_identity(&request.headers, response, now);

        let bucket = match ctx.ab_cookies.maybe_set_bucket_cookie(
            &request.headers,
            response,
            &args.publisher_id,
            &args.video_id,
            now,
        ) {
            Some(bucket) => bucket,
            None => bucket::assign(args.client_ip.as_bytes(), &args.video_id),
        };

        let url = ctx
            .directives
            .resolve_image_url(
                &args.account_id,
                &args.video_id,
                bucket.as_str(),
                args.width,
                args.height,
            )
            .ok_or(ApiError::DirectiveNotFound(args.video_id))?;

        response.body_mut().push(REDIRECT_BODY);
        response.set_redirect_headers(&url)
    }
}

impl Handler for ClientApi {
    fn name(&self) -> &'static str {
        "client"
    }

    fn handle(&self, ctx: &ApiContext, request: &Parts, now: SystemTime) -> ResponseDescriptor {
        let mut response = ResponseDescriptor::new();

        if let Err(err) = self.redirect(ctx, request, &mut response, now) {
            record_error(self.name(), &err);
            // Cookies issued before the failure are still delivered.
            response.set_no_content_headers();
        }

        response
    }
}
