use crate::api::client::{CLIENT_API_PATH, ClientApi};
use crate::api::server::{SERVER_API_PATH, ServerApi};
use crate::api::thumbnail::{THUMBNAIL_API_PATH, ThumbnailApi};
use crate::api::video::{VIDEO_API_PATH, VideoStatusApi};
use crate::api::{ApiContext, Handler};
use crate::metrics_defs::API_REQUESTS;
use crate::response::ResponseDescriptor;
use http::request::Parts;
use http::{Method, StatusCode};
use shared::counter;
use std::time::SystemTime;

/// How a route matches the request path.
#[derive(Clone, Copy, Debug)]
enum PathMatch {
    Exact(&'static str),
    Prefix(&'static str),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(expected) => path == *expected,
            PathMatch::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

struct Route {
    path: PathMatch,
    handler: Box<dyn Handler>,
}

/// Result of routing one request.
#[derive(Debug)]
pub struct RouteOutcome {
    /// Name of the handler that answered, or `none` for router level errors.
    pub handler: &'static str,
    pub response: ResponseDescriptor,
}

/// Dispatches requests to the endpoint handlers by path.
pub struct Router {
    ctx: ApiContext,
    routes: Vec<Route>,
}

impl Router {
    pub fn new(ctx: ApiContext) -> Self {
        let routes = vec![
            Route {
                path: PathMatch::Prefix(SERVER_API_PATH),
                handler: Box::new(ServerApi),
            },
            Route {
                path: PathMatch::Prefix(CLIENT_API_PATH),
                handler: Box::new(ClientApi),
            },
            Route {
                path: PathMatch::Exact(VIDEO_API_PATH),
                handler: Box::new(VideoStatusApi),
            },
            Route {
                path: PathMatch::Prefix(THUMBNAIL_API_PATH),
                handler: Box::new(ThumbnailApi),
            },
        ];
        Router { ctx, routes }
    }

    /// Routes a request to the first handler whose path matches.
    pub fn route(&self, request: &Parts, now: SystemTime) -> RouteOutcome {
        let path = request.uri.path();

        let Some(route) = self.routes.iter().find(|route| route.path.matches(path)) else {
            tracing::debug!(method = %request.method, path, "No route matched");
            return RouteOutcome {
                handler: "none",
                response: ResponseDescriptor::error(StatusCode::NOT_FOUND),
            };
        };

        let handler = route.handler.name();
        if request.method != Method::GET && request.method != Method::HEAD {
            tracing::debug!(method = %request.method, path, handler, "Method not allowed");
            return RouteOutcome {
                handler,
                response: ResponseDescriptor::error(StatusCode::METHOD_NOT_ALLOWED),
            };
        }

        counter!(API_REQUESTS, "handler" => handler).increment(1);
        RouteOutcome {
            handler,
            response: route.handler.handle(&self.ctx, request, now),
        }
    }
}
