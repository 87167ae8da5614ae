//! Read-only views over the manager's current snapshot, shaped for
//! individual consumers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::runtime::Manager;

use super::limits::Limits;
use super::values::{InstanceLimits, MultiRuntimeConfig, RuntimeConfigValues};

/// Per-tenant limit overrides backed by a runtime config manager.
#[derive(Clone)]
pub struct TenantLimitsSource {
    manager: Manager<RuntimeConfigValues>,
}

impl TenantLimitsSource {
    pub fn new(manager: Manager<RuntimeConfigValues>) -> Self {
        Self { manager }
    }

    /// Override for one tenant, if the current snapshot has one.
    pub fn by_tenant(&self, tenant: &str) -> Option<Limits> {
        self.all_tenants().get(tenant).cloned()
    }

    /// Every override in the current snapshot. Empty before the first load.
    pub fn all_tenants(&self) -> TenantOverrides {
        TenantOverrides {
            snapshot: self.manager.current(),
        }
    }
}

/// Borrowed view of the overrides in one snapshot.
///
/// Holding it keeps that snapshot alive; later reloads are not observed.
#[derive(Debug, Clone, Default)]
pub struct TenantOverrides {
    snapshot: Option<Arc<RuntimeConfigValues>>,
}

impl TenantOverrides {
    pub fn get(&self, tenant: &str) -> Option<&Limits> {
        self.snapshot.as_ref()?.tenant_limits.get(tenant)?.as_ref()
    }

    pub fn contains(&self, tenant: &str) -> bool {
        self.get(tenant).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Limits)> + '_ {
        self.snapshot.iter().flat_map(|cfg| {
            cfg.tenant_limits
                .iter()
                .filter_map(|(tenant, limits)| Some((tenant.as_str(), limits.as_ref()?)))
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pushes multi-KV store selections to the coordination layer.
#[derive(Clone)]
pub struct MultiKvConfigProvider {
    manager: Manager<RuntimeConfigValues>,
}

/// Returns `None` when runtime configuration is disabled.
pub fn multi_kv_config_channel(
    manager: Option<&Manager<RuntimeConfigValues>>,
) -> Option<MultiKvConfigProvider> {
    Some(MultiKvConfigProvider {
        manager: manager?.clone(),
    })
}

impl MultiKvConfigProvider {
    /// Open a stream of selections: the current one first (if non-empty),
    /// then each non-empty selection carried by a later reload.
    ///
    /// Must be called within a Tokio runtime. The stream ends when the
    /// manager stops.
    pub fn subscribe(&self) -> mpsc::Receiver<MultiRuntimeConfig> {
        let (tx, rx) = mpsc::channel(1);
        let mut listener = self.manager.subscribe(1);

        tokio::spawn(async move {
            loop {
                let snapshot = tokio::select! {
                    _ = tx.closed() => break,
                    next = listener.recv() => match next {
                        Some(snapshot) => snapshot,
                        None => break,
                    },
                };
                if snapshot.multi_kv.is_empty() {
                    continue;
                }
                if tx.send(snapshot.multi_kv.clone()).await.is_err() {
                    break;
                }
            }
            tracing::debug!("Multi KV config forwarder exiting");
        });

        rx
    }
}

/// Returns `None` when runtime configuration is disabled. The getter yields
/// `None` while no instance limits are configured.
pub fn instance_limits_getter(
    manager: Option<&Manager<RuntimeConfigValues>>,
) -> Option<impl Fn() -> Option<InstanceLimits> + Send + Sync + 'static> {
    let manager = manager?.clone();
    Some(move || manager.current().and_then(|cfg| cfg.ingester_limits))
}
