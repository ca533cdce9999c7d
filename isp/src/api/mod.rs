pub mod client;
pub mod server;
pub mod thumbnail;
pub mod video;

use crate::ab_cookie::AbCookieController;
use crate::errors::ApiError;
use crate::metrics_defs::API_ERRORS;
use crate::response::ResponseDescriptor;
use http::request::Parts;
use mastermind::{AccountResolver, DirectiveStore};
use shared::counter;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::Level;

/// Collaborators shared by all endpoints.
pub struct ApiContext {
    pub accounts: Arc<dyn AccountResolver>,
    pub directives: Arc<dyn DirectiveStore>,
    pub ab_cookies: AbCookieController,
}

impl ApiContext {
    pub fn new(
        accounts: Arc<dyn AccountResolver>,
        directives: Arc<dyn DirectiveStore>,
        ab_cookies: AbCookieController,
    ) -> Self {
        ApiContext {
            accounts,
            directives,
            ab_cookies,
        }
    }
}

/// One endpoint. Handlers are terminal: every outcome, including failures,
/// is rendered into the returned descriptor.
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, ctx: &ApiContext, request: &Parts, now: SystemTime) -> ResponseDescriptor;
}

/// Misses on the image paths are routine and only counted; an unknown
/// publisher points at stale or missing mastermind data.
fn error_level(err: &ApiError) -> Level {
    match err {
        ApiError::AccountNotFound(_) => Level::WARN,
        _ => Level::DEBUG,
    }
}

fn record_error(handler: &'static str, err: &ApiError) {
    if error_level(err) == Level::WARN {
        tracing::warn!(handler, error = %err, "Publisher lookup failed");
    } else {
        tracing::debug!(handler, error = %err, "Request degraded to error response");
    }
    counter!(API_ERRORS, "handler" => handler, "kind" => err.kind()).increment(1);
}
