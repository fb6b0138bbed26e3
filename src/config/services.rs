use std::fmt;

use crate::error::FatalError;

/// A role a running server process provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Master,
    Backup,
    Membership,
    Ping,
}

impl ServiceKind {
    /// Canonical listing order, used by `ServiceSet`'s display form.
    const ALL: [ServiceKind; 4] = [
        ServiceKind::Master,
        ServiceKind::Backup,
        ServiceKind::Membership,
        ServiceKind::Ping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Master => "MASTER",
            ServiceKind::Backup => "BACKUP",
            ServiceKind::Membership => "MEMBERSHIP",
            ServiceKind::Ping => "PING",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            ServiceKind::Master => 1 << 0,
            ServiceKind::Backup => 1 << 1,
            ServiceKind::Membership => 1 << 2,
            ServiceKind::Ping => 1 << 3,
        }
    }
}

/// The set of services a process starts. Duplicates are unrepresentable, and
/// the resolver only ever produces the three canonical combinations.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ServiceSet(u8);

impl ServiceSet {
    pub const fn of(kinds: &[ServiceKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        ServiceSet(bits)
    }

    pub fn contains(self, kind: ServiceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Display for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceSet({self})")
    }
}

/// Reconcile the two mutually exclusive role flags into one of the three
/// canonical service sets.
pub fn resolve_services(master_only: bool, backup_only: bool) -> Result<ServiceSet, FatalError> {
    if master_only && backup_only {
        return Err(FatalError::ConfigConflict);
    }

    let services = if master_only {
        ServiceSet::of(&[ServiceKind::Master, ServiceKind::Membership, ServiceKind::Ping])
    } else if backup_only {
        ServiceSet::of(&[ServiceKind::Backup, ServiceKind::Membership, ServiceKind::Ping])
    } else {
        ServiceSet::of(&[
            ServiceKind::Master,
            ServiceKind::Backup,
            ServiceKind::Membership,
            ServiceKind::Ping,
        ])
    };
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_role_flags_conflict() {
        let err = resolve_services(true, true).unwrap_err();
        assert!(matches!(err, FatalError::ConfigConflict));
    }

    #[test]
    fn master_only_drops_backup() {
        let services = resolve_services(true, false).unwrap();
        assert!(services.contains(ServiceKind::Master));
        assert!(!services.contains(ServiceKind::Backup));
        assert!(services.contains(ServiceKind::Membership));
        assert!(services.contains(ServiceKind::Ping));
        assert_eq!(services.iter().count(), 3);
    }

    #[test]
    fn backup_only_drops_master() {
        let services = resolve_services(false, true).unwrap();
        assert!(!services.contains(ServiceKind::Master));
        assert!(services.contains(ServiceKind::Backup));
        assert!(services.contains(ServiceKind::Membership));
        assert!(services.contains(ServiceKind::Ping));
        assert_eq!(services.iter().count(), 3);
    }

    #[test]
    fn default_runs_all_four_services() {
        let services = resolve_services(false, false).unwrap();
        for kind in ServiceKind::ALL {
            assert!(services.contains(kind));
        }
    }

    #[test]
    fn duplicate_kinds_collapse() {
        let services = ServiceSet::of(&[ServiceKind::Ping, ServiceKind::Ping]);
        assert_eq!(services.iter().count(), 1);
    }

    #[test]
    fn display_uses_canonical_order() {
        let services = resolve_services(false, false).unwrap();
        assert_eq!(services.to_string(), "MASTER, BACKUP, MEMBERSHIP, PING");

        let services = resolve_services(false, true).unwrap();
        assert_eq!(services.to_string(), "BACKUP, MEMBERSHIP, PING");
    }
}
