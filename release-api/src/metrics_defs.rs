//! Metrics definitions for the release API.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "release_api.requests",
    metric_type: MetricType::Counter,
    description: "Requests handled, tagged by method, route and status",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "release_api.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to handle a request in seconds, tagged by method and route",
};

pub const BACKEND_DURATION: MetricDef = MetricDef {
    name: "release_api.backend.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent in a backend call in seconds, tagged by operation",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUESTS, REQUEST_DURATION, BACKEND_DURATION];
