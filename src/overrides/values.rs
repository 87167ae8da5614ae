//! The runtime configuration document served to every component.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::limits::Limits;

/// Values that can be reloaded while the process is running.
///
/// A new document replaces the previous snapshot as a whole; nothing is
/// merged across reloads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfigValues {
    /// Per-tenant overrides. A tenant mapped to `null` has no override.
    #[serde(rename = "overrides", skip_serializing_if = "BTreeMap::is_empty")]
    pub tenant_limits: BTreeMap<String, Option<Limits>>,

    #[serde(rename = "multi_kv_config", skip_serializing_if = "MultiRuntimeConfig::is_empty")]
    pub multi_kv: MultiRuntimeConfig,

    #[serde(
        rename = "ingester_stream_chunks_when_using_blocks",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingester_chunk_streaming: Option<bool>,

    #[serde(rename = "ingester_limits", skip_serializing_if = "Option::is_none")]
    pub ingester_limits: Option<InstanceLimits>,
}

/// Which key-value store the coordination layer treats as primary, and
/// whether writes are mirrored to the secondary stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiRuntimeConfig {
    #[serde(rename = "primary", skip_serializing_if = "String::is_empty")]
    pub primary_store: String,

    #[serde(rename = "mirror_enabled", skip_serializing_if = "Option::is_none")]
    pub mirroring: Option<bool>,

    /// Per-store mirror switches, keyed by store name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mirrors: BTreeMap<String, bool>,
}

impl MultiRuntimeConfig {
    pub fn is_empty(&self) -> bool {
        self.primary_store.is_empty() && self.mirroring.is_none() && self.mirrors.is_empty()
    }
}

/// Process-wide safety limits for ingesters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceLimits {
    pub max_ingestion_rate: f64,
    pub max_tenants: i64,
    pub max_series: i64,
    pub max_inflight_push_requests: i64,
    pub max_inflight_query_requests: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::codec::decode_single_document;

    #[test]
    fn test_null_tenant_decodes_as_absent_record() {
        let cfg: RuntimeConfigValues =
            decode_single_document(b"overrides:\n  tenant1: ~\n  tenant2: {}\n").unwrap();
        assert_eq!(cfg.tenant_limits.get("tenant1"), Some(&None));
        assert_eq!(cfg.tenant_limits.get("tenant2"), Some(&Some(Limits::default())));
    }

    #[test]
    fn test_unknown_nested_field_rejected() {
        let err = decode_single_document::<RuntimeConfigValues>(
            b"overrides:\n  tenant1:\n    ingestion_rte: 10\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("ingestion_rte"), "{err}");
    }

    #[test]
    fn test_tri_state_chunk_streaming() {
        let unset: RuntimeConfigValues = decode_single_document(b"").unwrap();
        assert_eq!(unset.ingester_chunk_streaming, None);

        let off: RuntimeConfigValues =
            decode_single_document(b"ingester_stream_chunks_when_using_blocks: false\n").unwrap();
        assert_eq!(off.ingester_chunk_streaming, Some(false));
    }

    #[test]
    fn test_empty_values_serialize_to_empty_mapping() {
        let yaml = serde_yaml::to_string(&RuntimeConfigValues::default()).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }
}
