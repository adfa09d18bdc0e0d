// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use parking_lot::{RwLock, RwLockWriteGuard};
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{
        counter::Counter,
        family::Family,
        histogram::{Histogram, exponential_buckets},
    },
    registry::Registry,
};
use std::sync::LazyLock;
use std::time::Instant;

static DEFAULT_REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(Default::default);

pub fn default_registry<'a>() -> RwLockWriteGuard<'a, Registry> {
    DEFAULT_REGISTRY.write()
}

/// Encodes every registered metric in the Prometheus text format.
pub fn encode_default_registry() -> anyhow::Result<String> {
    let mut metrics = String::new();
    prometheus_client::encoding::text::encode(&mut metrics, &DEFAULT_REGISTRY.read())?;
    Ok(metrics)
}

pub static APPLY_MESSAGE_DURATION: LazyLock<Family<MethodLabel, Histogram>> =
    LazyLock::new(|| {
        let metric = Family::<MethodLabel, Histogram>::new_with_constructor(|| {
            // 5 buckets from 0.1ms to 1s, each 10 times as big as the last.
            Histogram::new(exponential_buckets(0.1, 10., 5))
        });
        default_registry().register(
            "apply_message_duration_ms",
            "Duration of message application in milliseconds, by method",
            metric.clone(),
        );
        metric
    });

pub static MESSAGE_REJECTIONS: LazyLock<Family<RejectionLabel, Counter>> = LazyLock::new(|| {
    let metric = Family::default();
    default_registry().register(
        "message_rejections",
        "Number of messages rejected before execution, by reason",
        metric.clone(),
    );
    metric
});

pub static TIPSET_PROCESSING_TIME: LazyLock<Histogram> = LazyLock::new(|| {
    let metric = default_histogram();
    default_registry().register(
        "tipset_processing_time",
        "Duration of tipset processing in seconds",
        metric.clone(),
    );
    metric
});

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet, derive_more::Constructor)]
pub struct MethodLabel {
    method: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet, derive_more::Constructor)]
pub struct RejectionLabel {
    reason: &'static str,
}

pub fn default_histogram() -> Histogram {
    Histogram::new([
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ])
}

/// Observes the elapsed time in seconds when dropped.
pub struct HistogramTimer<'a> {
    histogram: &'a Histogram,
    start: Instant,
}

impl Drop for HistogramTimer<'_> {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

pub trait HistogramTimerExt {
    fn start_timer(&self) -> HistogramTimer<'_>;
}

impl HistogramTimerExt for Histogram {
    fn start_timer(&self) -> HistogramTimer<'_> {
        HistogramTimer {
            histogram: self,
            start: Instant::now(),
        }
    }
}
