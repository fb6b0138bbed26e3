pub mod memory;
pub mod services;

use std::fmt;
use std::path::PathBuf;

use crate::cluster::ClusterName;
use crate::error::FatalError;
use crate::options::ServerOptions;

pub use memory::SizeSpec;
pub use services::{ServiceKind, ServiceSet, resolve_services};

/// Replica placement policy a backup advertises, carried on the wire as a
/// small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupStrategy {
    #[default]
    RandomRefineMin,
    RandomRefineAvg,
    EvenDistribution,
    UniformRandom,
}

impl BackupStrategy {
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(BackupStrategy::RandomRefineMin),
            1 => Some(BackupStrategy::RandomRefineAvg),
            2 => Some(BackupStrategy::EvenDistribution),
            3 => Some(BackupStrategy::UniformRandom),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u32 {
        match self {
            BackupStrategy::RandomRefineMin => 0,
            BackupStrategy::RandomRefineAvg => 1,
            BackupStrategy::EvenDistribution => 2,
            BackupStrategy::UniformRandom => 3,
        }
    }
}

impl fmt::Display for BackupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_value())
    }
}

/// Settings consumed by the backup service.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Keep segment replicas in memory instead of on storage.
    pub in_memory: bool,
    /// Path to the backup storage file.
    pub file: PathBuf,
    pub strategy: BackupStrategy,
    /// Number of segment frames available in backup storage.
    pub segment_frames: u32,
}

/// Settings consumed by the master service. The two byte quantities start at
/// zero and are filled in by `set_log_and_hash_table_size`; they stay zero
/// (and unused) when the process runs without a master role.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Backup copies to make for each segment.
    pub num_replicas: u32,
    pub disable_log_cleaner: bool,
    /// Bytes of memory for the master's log.
    pub log_bytes: u64,
    /// Bytes of memory for the master's hash table.
    pub hash_table_bytes: u64,
}

/// Fully resolved configuration for one server process. Built exactly once,
/// mutated only by the bootstrap sequence (sizing, then the post-bind locator
/// update), read-only to everything downstream.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub services: ServiceSet,
    /// Listening locator. Holds the requested value until the transport is
    /// bound, after which it is replaced wholesale with the effective one.
    pub local_locator: String,
    pub coordinator_locator: String,
    pub cluster_name: ClusterName,
    pub backup: BackupConfig,
    pub master: MasterConfig,
    pub detect_failures: bool,
}

impl ServerConfig {
    /// Derive a configuration from bound options. Rejects the conflicting
    /// role pair; performs no memory resolution (that happens later, against
    /// the host total).
    pub fn from_options(options: &ServerOptions) -> Result<ServerConfig, FatalError> {
        let services = resolve_services(options.master_only, options.backup_only)?;

        Ok(ServerConfig {
            services,
            local_locator: options.local.clone(),
            coordinator_locator: options.coordinator.clone(),
            cluster_name: ClusterName::new(&options.cluster_name),
            backup: BackupConfig {
                in_memory: options.backup_in_memory,
                file: options.file.clone(),
                strategy: options.backup_strategy,
                segment_frames: options.segment_frames,
            },
            master: MasterConfig {
                num_replicas: options.replicas,
                disable_log_cleaner: options.disable_log_cleaner,
                log_bytes: 0,
                hash_table_bytes: 0,
            },
            detect_failures: options.detect_failures,
        })
    }

    pub fn has_master_role(&self) -> bool {
        self.services.contains(ServiceKind::Master)
    }

    /// Resolve the two master memory directives against the same total and
    /// store the resulting byte counts. Percentages scale with `total_memory`;
    /// absolute megabyte counts ignore it.
    pub fn set_log_and_hash_table_size(
        &mut self,
        total_master_memory: &str,
        hash_table_memory: &str,
        total_memory: u64,
    ) -> Result<(), FatalError> {
        self.master.log_bytes = total_master_memory.parse::<SizeSpec>()?.bytes(total_memory);
        self.master.hash_table_bytes = hash_table_memory.parse::<SizeSpec>()?.bytes(total_memory);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::memory::MEGABYTE;
    use super::*;

    fn config_from(args: &[&str]) -> Result<ServerConfig, FatalError> {
        let options = ServerOptions::try_parse_from(args).unwrap();
        ServerConfig::from_options(&options)
    }

    #[test]
    fn defaults_map_through() {
        let config = config_from(&["segstore"]).unwrap();
        assert_eq!(config.services.iter().count(), 4);
        assert_eq!(config.local_locator, "tcp:host=127.0.0.1,port=11100");
        assert_eq!(config.coordinator_locator, "tcp:host=127.0.0.1,port=12246");
        assert!(!config.backup.in_memory);
        assert_eq!(config.backup.file, PathBuf::from("/var/tmp/backup.log"));
        assert_eq!(config.backup.strategy, BackupStrategy::RandomRefineMin);
        assert_eq!(config.backup.segment_frames, 512);
        assert_eq!(config.master.num_replicas, 0);
        assert!(!config.master.disable_log_cleaner);
        assert_eq!(config.master.log_bytes, 0);
        assert_eq!(config.master.hash_table_bytes, 0);
        assert!(config.detect_failures);
    }

    #[test]
    fn conflicting_role_flags_are_fatal() {
        let err = config_from(&["segstore", "-B", "-M"]).unwrap_err();
        assert!(matches!(err, FatalError::ConfigConflict));
    }

    #[test]
    fn master_only_with_mixed_directives() {
        // -M --totalMasterMemory=2048 --hashTableMemory=10% on an 8 GB host.
        let options = ServerOptions::try_parse_from([
            "segstore",
            "-M",
            "--totalMasterMemory=2048",
            "--hashTableMemory=10%",
        ])
        .unwrap();
        let mut config = ServerConfig::from_options(&options).unwrap();
        config
            .set_log_and_hash_table_size(
                &options.total_master_memory,
                &options.hash_table_memory,
                8192 * MEGABYTE,
            )
            .unwrap();

        assert!(config.services.contains(ServiceKind::Master));
        assert!(!config.services.contains(ServiceKind::Backup));
        assert!(config.services.contains(ServiceKind::Membership));
        assert!(config.services.contains(ServiceKind::Ping));
        assert_eq!(config.master.log_bytes, 2048 * MEGABYTE);
        assert_eq!(config.master.hash_table_bytes, (8192 * MEGABYTE) / 10);
    }

    #[test]
    fn default_sizes_on_a_16g_host() {
        let options = ServerOptions::try_parse_from(["segstore"]).unwrap();
        let mut config = ServerConfig::from_options(&options).unwrap();
        config
            .set_log_and_hash_table_size(
                &options.total_master_memory,
                &options.hash_table_memory,
                16384 * MEGABYTE,
            )
            .unwrap();

        assert_eq!(config.services.iter().count(), 4);
        let tenth = (16384 * MEGABYTE) / 10;
        assert_eq!(config.master.log_bytes, tenth);
        assert_eq!(config.master.hash_table_bytes, tenth);
    }

    #[test]
    fn bad_directive_surfaces_during_sizing() {
        let options = ServerOptions::try_parse_from(["segstore"]).unwrap();
        let mut config = ServerConfig::from_options(&options).unwrap();
        let err = config
            .set_log_and_hash_table_size("abc", "10%", 8192 * MEGABYTE)
            .unwrap_err();
        assert!(matches!(err, FatalError::InvalidSizeSpec { directive, .. } if directive == "abc"));
    }

    #[test]
    fn backup_only_skips_master_role() {
        let config = config_from(&["segstore", "-B"]).unwrap();
        assert!(!config.has_master_role());
        assert_eq!(config.master.log_bytes, 0);
        assert_eq!(config.master.hash_table_bytes, 0);
    }

    #[test]
    fn backup_strategy_wire_values_round_trip() {
        for value in 0..=3 {
            let strategy = BackupStrategy::from_wire(value).unwrap();
            assert_eq!(strategy.wire_value(), value);
            assert_eq!(strategy.to_string(), value.to_string());
        }
        assert!(BackupStrategy::from_wire(4).is_none());
    }
}
