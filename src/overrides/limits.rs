//! Per-tenant limit overrides and their semantic checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied to one tenant.
///
/// Fields missing from a tenant's record decode to zero, so a present record
/// is never the same thing as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Samples per second a tenant may push.
    pub ingestion_rate: f64,

    /// Burst size allowed on top of `ingestion_rate`.
    pub ingestion_burst_size: i64,

    /// Accept samples from HA pairs.
    pub accept_ha_samples: bool,

    pub max_label_names_per_series: i64,
    pub max_label_value_length: i64,

    /// Series per tenant across the whole cluster. Only enforceable when
    /// distributors shard by all labels.
    pub max_global_series_per_user: i64,
    pub max_global_series_per_metric: i64,

    /// Exemplars kept in memory per tenant. Zero disables exemplars.
    pub max_exemplars: i64,

    pub max_native_histogram_buckets: i64,

    /// Ingesters a tenant is sharded across. Zero means all of them.
    pub ingestion_tenant_shard_size: i64,

    pub max_fetched_series_per_query: i64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub max_series_per_label_set: Vec<LabelSetLimit>,
}

/// A series cap for the series matching one label set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelSetLimit {
    pub label_set: BTreeMap<String, String>,
    pub max_series: i64,
}

/// A tenant's limits are inconsistent with this process's configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitsError {
    #[error("max_global_series_per_user is unsupported when distributor shard_by_all_labels is disabled")]
    GlobalSeriesRequiresShardByAllLabels,

    #[error("max_series_per_label_set requires ingester active series metrics to be enabled")]
    LabelSetLimitRequiresActiveSeries,

    #[error("max_series_per_label_set entry {index} has an empty label set")]
    EmptyLabelSet { index: usize },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: String },
}

impl Limits {
    /// Built-in process defaults, used when nothing overrides a tenant.
    pub fn process_defaults() -> Self {
        Self {
            ingestion_rate: 25_000.0,
            ingestion_burst_size: 50_000,
            accept_ha_samples: false,
            max_label_names_per_series: 30,
            max_label_value_length: 2048,
            max_global_series_per_user: 0,
            max_global_series_per_metric: 0,
            max_exemplars: 0,
            max_native_histogram_buckets: 0,
            ingestion_tenant_shard_size: 0,
            max_fetched_series_per_query: 0,
            max_series_per_label_set: Vec::new(),
        }
    }

    /// Check the limits against the two process toggles they depend on.
    pub fn validate(
        &self,
        shard_by_all_labels: bool,
        active_series_metrics_enabled: bool,
    ) -> Result<(), LimitsError> {
        if self.ingestion_rate < 0.0 {
            return Err(LimitsError::Negative {
                field: "ingestion_rate",
                value: self.ingestion_rate.to_string(),
            });
        }

        let non_negative = [
            ("ingestion_burst_size", self.ingestion_burst_size),
            ("max_exemplars", self.max_exemplars),
            ("max_native_histogram_buckets", self.max_native_histogram_buckets),
            ("ingestion_tenant_shard_size", self.ingestion_tenant_shard_size),
        ];
        if let Some((field, value)) = non_negative.into_iter().find(|(_, v)| *v < 0) {
            return Err(LimitsError::Negative {
                field,
                value: value.to_string(),
            });
        }

        if self.max_global_series_per_user > 0 && !shard_by_all_labels {
            return Err(LimitsError::GlobalSeriesRequiresShardByAllLabels);
        }

        if !self.max_series_per_label_set.is_empty() && !active_series_metrics_enabled {
            return Err(LimitsError::LabelSetLimitRequiresActiveSeries);
        }

        if let Some(index) = self
            .max_series_per_label_set
            .iter()
            .position(|l| l.label_set.is_empty())
        {
            return Err(LimitsError::EmptyLabelSet { index });
        }

        Ok(())
    }
}
