//! Metrics definitions for the mastermind loader.

use shared::metrics_defs::{MetricDef, MetricType};

pub const MASTERMIND_LOAD_SUCCESS: MetricDef = MetricDef {
    name: "mastermind.load.success",
    metric_type: MetricType::Counter,
    description: "Number of mastermind files loaded and installed",
};

pub const MASTERMIND_LOAD_FAIL: MetricDef = MetricDef {
    name: "mastermind.load.fail",
    metric_type: MetricType::Counter,
    description: "Number of mastermind loads that failed; the previous snapshot stays active",
};

pub const MASTERMIND_INVALID_RECORD: MetricDef = MetricDef {
    name: "mastermind.record.invalid",
    metric_type: MetricType::Counter,
    description: "Mastermind lines skipped because they could not be parsed or were incomplete. Tagged with kind.",
};

pub const MASTERMIND_PUBLISHERS: MetricDef = MetricDef {
    name: "mastermind.publishers",
    metric_type: MetricType::Gauge,
    description: "Publishers in the active snapshot",
};

pub const MASTERMIND_DIRECTIVES: MetricDef = MetricDef {
    name: "mastermind.directives",
    metric_type: MetricType::Gauge,
    description: "Directives in the active snapshot",
};

pub const ALL_METRICS: &[MetricDef] = &[
    MASTERMIND_LOAD_SUCCESS,
    MASTERMIND_LOAD_FAIL,
    MASTERMIND_INVALID_RECORD,
    MASTERMIND_PUBLISHERS,
    MASTERMIND_DIRECTIVES,
];
