//! Prometheus counters for registry activity.

use metrics::{counter, describe_counter};
use tracing::debug;

// === Metric Name Constants ===

/// Pets created counter metric name.
pub const METRIC_PETS_CREATED: &str = "pets_created_total";
/// Pets updated counter metric name.
pub const METRIC_PETS_UPDATED: &str = "pets_updated_total";
/// Pets deleted counter metric name.
pub const METRIC_PETS_DELETED: &str = "pets_deleted_total";
/// Groups created counter metric name.
pub const METRIC_GROUPS_CREATED: &str = "groups_created_total";
/// Traits created counter metric name.
pub const METRIC_TRAITS_CREATED: &str = "traits_created_total";

/// Initialize all metric descriptions.
/// Call this once at startup after the recorder is installed.
pub fn init_metrics() {
    describe_counter!(METRIC_PETS_CREATED, "Total number of pets created");
    describe_counter!(METRIC_PETS_UPDATED, "Total number of pets updated");
    describe_counter!(METRIC_PETS_DELETED, "Total number of pets deleted");
    describe_counter!(
        METRIC_GROUPS_CREATED,
        "Total number of groups created as a side effect of pet writes"
    );
    describe_counter!(
        METRIC_TRAITS_CREATED,
        "Total number of traits created as a side effect of pet writes"
    );

    debug!("Metrics initialized");
}

/// Increment pets created counter.
pub fn inc_pets_created() {
    counter!(METRIC_PETS_CREATED).increment(1);
}

/// Increment pets updated counter.
pub fn inc_pets_updated() {
    counter!(METRIC_PETS_UPDATED).increment(1);
}

/// Increment pets deleted counter.
pub fn inc_pets_deleted() {
    counter!(METRIC_PETS_DELETED).increment(1);
}

/// Increment groups created counter.
pub fn inc_groups_created() {
    counter!(METRIC_GROUPS_CREATED).increment(1);
}

/// Increment traits created counter.
pub fn inc_traits_created() {
    counter!(METRIC_TRAITS_CREATED).increment(1);
}
