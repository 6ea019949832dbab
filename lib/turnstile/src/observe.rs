//! Metrics hooks, recorded through the `metrics` facade.
//!
//! Compiled to no-ops unless the `metrics` feature is enabled.
//!
//! - `turnstile_outcomes_total` (counter): settled requests, labeled by outcome
//! - `turnstile_duplicates_suppressed_total` (counter): in-flight requests cancelled by a duplicate
//! - `turnstile_pending_requests` (gauge): keys currently in the registry

#![cfg_attr(not(feature = "metrics"), allow(unused_variables))]

#[cfg(feature = "metrics")]
const LABEL_OUTCOME: &str = "outcome";

#[cfg(feature = "metrics")]
const METRIC_OUTCOMES_TOTAL: &str = "turnstile_outcomes_total";
#[cfg(feature = "metrics")]
const METRIC_DUPLICATES_TOTAL: &str = "turnstile_duplicates_suppressed_total";
#[cfg(feature = "metrics")]
const METRIC_PENDING: &str = "turnstile_pending_requests";

pub(crate) fn outcome(label: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(METRIC_OUTCOMES_TOTAL, LABEL_OUTCOME => label).increment(1);
}

pub(crate) fn duplicate_suppressed() {
    #[cfg(feature = "metrics")]
    metrics::counter!(METRIC_DUPLICATES_TOTAL).increment(1);
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn pending(count: usize) {
    #[cfg(feature = "metrics")]
    metrics::gauge!(METRIC_PENDING).set(count as f64);
}
