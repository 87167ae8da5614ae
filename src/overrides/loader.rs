//! Loader for [`RuntimeConfigValues`] with role-gated tenant validation.

use crate::config::schema::ProcessConfig;
use crate::runtime::codec::decode_single_document;
use crate::runtime::{LoadError, Loader};

use super::roles::{RoleSet, UnknownRole};
use super::values::RuntimeConfigValues;

/// Decodes the runtime configuration document and, for processes running a
/// role that enforces tenant limits, validates every tenant override.
///
/// The first invalid tenant fails the whole load.
#[derive(Debug, Clone)]
pub struct RuntimeConfigLoader {
    roles: RoleSet,
    shard_by_all_labels: bool,
    active_series_metrics_enabled: bool,
}

impl RuntimeConfigLoader {
    pub fn new(roles: RoleSet, shard_by_all_labels: bool, active_series_metrics_enabled: bool) -> Self {
        Self {
            roles,
            shard_by_all_labels,
            active_series_metrics_enabled,
        }
    }

    pub fn from_config(cfg: &ProcessConfig) -> Result<Self, UnknownRole> {
        Ok(Self::new(
            cfg.roles()?,
            cfg.distributor.shard_by_all_labels,
            cfg.ingester.active_series_metrics_enabled,
        ))
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }
}

impl Loader<RuntimeConfigValues> for RuntimeConfigLoader {
    fn load(&self, raw: &[u8]) -> Result<RuntimeConfigValues, LoadError> {
        let values: RuntimeConfigValues = decode_single_document(raw)?;

        if self.roles.requires_tenant_validation() {
            for (tenant, limits) in &values.tenant_limits {
                let Some(limits) = limits else { continue };
                limits
                    .validate(self.shard_by_all_labels, self.active_series_metrics_enabled)
                    .map_err(|source| LoadError::Validation {
                        tenant: tenant.clone(),
                        source,
                    })?;
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::limits::{Limits, LimitsError};

    const SCENARIO: &str = r#"
overrides:
  tenant1:
    ingestion_rate: 10000
    max_exemplars: 1
  tenant2:
    ingestion_rate: 10000
multi_kv_config:
  primary: memberlist
  mirror_enabled: false
ingester_limits:
  max_ingestion_rate: 42000
  max_inflight_push_requests: 10000
"#;

    const GLOBAL_SERIES: &str = "overrides:\n  user-1:\n    max_global_series_per_user: 15000\n";

    fn loader(target: &str, shard_by_all_labels: bool) -> RuntimeConfigLoader {
        RuntimeConfigLoader::new(target.parse().unwrap(), shard_by_all_labels, true)
    }

    #[test]
    fn test_loads_full_document() {
        let cfg = loader("all", true).load(SCENARIO.as_bytes()).unwrap();

        let tenant1 = cfg.tenant_limits["tenant1"].as_ref().unwrap();
        assert_eq!(tenant1.ingestion_rate, 10000.0);
        assert_eq!(tenant1.max_exemplars, 1);

        let tenant2 = cfg.tenant_limits["tenant2"].as_ref().unwrap();
        assert_eq!(tenant2.ingestion_rate, 10000.0);
        assert_eq!(tenant2.max_exemplars, 0);

        assert_eq!(cfg.multi_kv.primary_store, "memberlist");
        assert_eq!(cfg.multi_kv.mirroring, Some(false));

        let limits = cfg.ingester_limits.unwrap();
        assert_eq!(limits.max_ingestion_rate, 42000.0);
        assert_eq!(limits.max_inflight_push_requests, 10000);
    }

    #[test]
    fn test_invalid_tenant_rejected_under_enforcing_roles() {
        for target in ["all", "distributor", "querier", "ruler"] {
            let err = loader(target, false).load(GLOBAL_SERIES.as_bytes()).unwrap_err();
            match err {
                LoadError::Validation { tenant, source } => {
                    assert_eq!(tenant, "user-1");
                    assert_eq!(source, LimitsError::GlobalSeriesRequiresShardByAllLabels);
                }
                other => panic!("{target}: unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_tenant_accepted_under_other_roles() {
        for target in ["ingester", "store-gateway", "query-frontend", "query-scheduler", "alertmanager"] {
            let cfg = loader(target, false).load(GLOBAL_SERIES.as_bytes()).unwrap();
            assert_eq!(
                cfg.tenant_limits["user-1"].as_ref().map(|l| l.max_global_series_per_user),
                Some(15000),
                "{target}"
            );
        }
    }

    #[test]
    fn test_one_bad_tenant_blocks_all() {
        let doc = "overrides:\n  a:\n    ingestion_rate: 5\n  b:\n    max_exemplars: -3\n";
        let err = loader("distributor", true).load(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Validation { ref tenant, .. } if tenant == "b"));
    }

    #[test]
    fn test_null_tenant_skips_validation() {
        let cfg = loader("all", false).load(b"overrides:\n  user-1: ~\n").unwrap();
        assert_eq!(cfg.tenant_limits.get("user-1"), Some(&None::<Limits>));
    }

    #[test]
    fn test_concatenated_documents_rejected() {
        let doc = format!("{SCENARIO}---\noverrides: {{}}\n");
        let err = loader("all", true).load(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MultipleDocuments));
    }

    #[test]
    fn test_repeated_tenant_rejected() {
        let doc = "overrides:\n  t1:\n    ingestion_rate: 1\n  t1:\n    ingestion_rate: 2\n";
        let err = loader("ingester", true).load(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)), "got {err:?}");
    }
}
