use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with status, handler.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of requests currently being processed",
};

pub const API_REQUESTS: MetricDef = MetricDef {
    name: "api.requests",
    metric_type: MetricType::Counter,
    description: "Requests dispatched to an endpoint. Tagged with handler.",
};

pub const API_ERRORS: MetricDef = MetricDef {
    name: "api.errors",
    metric_type: MetricType::Counter,
    description: "Requests that degraded to an error response. Tagged with handler, kind.",
};

pub const IDENTITY_COOKIE_PRESENT: MetricDef = MetricDef {
    name: "cookie.identity.present",
    metric_type: MetricType::Counter,
    description: "Client requests that already carried the user id cookie",
};

pub const IDENTITY_COOKIE_SET: MetricDef = MetricDef {
    name: "cookie.identity.set",
    metric_type: MetricType::Counter,
    description: "User id cookies issued",
};

pub const BUCKET_COOKIE_SET: MetricDef = MetricDef {
    name: "cookie.bucket.set",
    metric_type: MetricType::Counter,
    description: "A/B test bucket cookies issued",
};

pub const COOKIE_SET_FAIL: MetricDef = MetricDef {
    name: "cookie.set.fail",
    metric_type: MetricType::Counter,
    description: "Cookies that could not be added to the response. Tagged with cookie.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REQUESTS_INFLIGHT,
    API_REQUESTS,
    API_ERRORS,
    IDENTITY_COOKIE_PRESENT,
    IDENTITY_COOKIE_SET,
    BUCKET_COOKIE_SET,
    COOKIE_SET_FAIL,
];
