//! Functional roles a process can run as.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One component role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    All,
    Distributor,
    Ingester,
    Querier,
    QueryFrontend,
    QueryScheduler,
    Ruler,
    StoreGateway,
    Compactor,
    Alertmanager,
    OverridesExporter,
}

/// Roles whose processes enforce tenant overrides and therefore must reject
/// invalid ones at load time. Other roles only read a subset of the fields.
pub const TENANT_LIMIT_CHECK_ROLES: [Role; 4] =
    [Role::All, Role::Distributor, Role::Querier, Role::Ruler];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::All => "all",
            Role::Distributor => "distributor",
            Role::Ingester => "ingester",
            Role::Querier => "querier",
            Role::QueryFrontend => "query-frontend",
            Role::QueryScheduler => "query-scheduler",
            Role::Ruler => "ruler",
            Role::StoreGateway => "store-gateway",
            Role::Compactor => "compactor",
            Role::Alertmanager => "alertmanager",
            Role::OverridesExporter => "overrides-exporter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s {
            "all" => Role::All,
            "distributor" => Role::Distributor,
            "ingester" => Role::Ingester,
            "querier" => Role::Querier,
            "query-frontend" => Role::QueryFrontend,
            "query-scheduler" => Role::QueryScheduler,
            "ruler" => Role::Ruler,
            "store-gateway" => Role::StoreGateway,
            "compactor" => Role::Compactor,
            "alertmanager" => Role::Alertmanager,
            "overrides-exporter" => Role::OverridesExporter,
            other => return Err(UnknownRole(other.to_string())),
        };
        Ok(role)
    }
}

/// The set of roles one process runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Whether tenant overrides must be validated before a snapshot is
    /// accepted. Membership is exact: `query-frontend` does not imply
    /// `querier`.
    pub fn requires_tenant_validation(&self) -> bool {
        TENANT_LIMIT_CHECK_ROLES.iter().any(|r| self.contains(*r))
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for RoleSet {
    type Err = UnknownRole;

    /// Parse a comma-separated target list such as `distributor,querier`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(Role::from_str)
            .collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{role}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_list() {
        let roles: RoleSet = "distributor, querier".parse().unwrap();
        assert!(roles.contains(Role::Distributor));
        assert!(roles.contains(Role::Querier));
        assert_eq!(roles.to_string(), "distributor,querier");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert_eq!(
            "querier,frontend".parse::<RoleSet>(),
            Err(UnknownRole("frontend".into()))
        );
    }

    #[test]
    fn test_validation_roles() {
        for target in ["all", "distributor", "querier", "ruler", "ingester,ruler"] {
            let roles: RoleSet = target.parse().unwrap();
            assert!(roles.requires_tenant_validation(), "{target}");
        }
        for target in ["ingester", "store-gateway", "query-frontend", "query-scheduler", "compactor"] {
            let roles: RoleSet = target.parse().unwrap();
            assert!(!roles.requires_tenant_validation(), "{target}");
        }
    }
}
