//! Metrics definitions for chart resolution.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "chart_repo.cache.hit",
    metric_type: MetricType::Counter,
    description: "Chart archives served from the local cache",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "chart_repo.cache.miss",
    metric_type: MetricType::Counter,
    description: "Chart archives downloaded from a repository",
};

pub const ALL_METRICS: &[MetricDef] = &[CACHE_HIT, CACHE_MISS];
