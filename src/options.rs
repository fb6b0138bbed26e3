use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::BackupStrategy;
use crate::error::FatalError;

/// Command-line options for the storage server.
///
/// `hashTableMemory` owns the `-h` short flag, so clap's automatic help short
/// is disabled and long-form `--help` is redeclared by hand.
#[derive(Debug, Clone, Parser)]
#[command(name = "segstore", version, disable_help_flag = true)]
pub struct ServerOptions {
    /// Backup will store segment replicas in memory
    #[arg(short = 'm', long = "backupInMemory")]
    pub backup_in_memory: bool,

    /// The server should run the backup service only (no master)
    #[arg(short = 'B', long = "backupOnly")]
    pub backup_only: bool,

    /// 0 random refine min, 1 random refine avg, 2 even distribution,
    /// 3 uniform random
    #[arg(
        long = "backupStrategy",
        value_parser = parse_backup_strategy,
        default_value_t = BackupStrategy::RandomRefineMin
    )]
    pub backup_strategy: BackupStrategy,

    /// Disable the log cleaner entirely. You will eventually run out of
    /// memory, but at least you can do so faster this way.
    #[arg(short = 'd', long = "disableLogCleaner")]
    pub disable_log_cleaner: bool,

    /// The file path to the backup storage.
    #[arg(short = 'f', long = "file", default_value = "/var/tmp/backup.log")]
    pub file: PathBuf,

    /// Percentage of total system memory, or megabytes, allocated to the
    /// hash table
    #[arg(short = 'h', long = "hashTableMemory", default_value = "10%")]
    pub hash_table_memory: String,

    /// The server should run the master service only (no backup)
    #[arg(short = 'M', long = "masterOnly")]
    pub master_only: bool,

    /// Percentage of total system memory, or megabytes, for the master log
    /// and hash table
    #[arg(short = 't', long = "totalMasterMemory", default_value = "10%")]
    pub total_master_memory: String,

    /// Number of backup copies to make for each segment
    #[arg(short = 'r', long = "replicas", default_value_t = 0)]
    pub replicas: u32,

    /// Number of segment frames in backup storage
    #[arg(long = "segmentFrames", default_value_t = 512)]
    pub segment_frames: u32,

    /// Whether to use the randomized failure detector
    #[arg(long = "detectFailures", default_value_t = true, action = ArgAction::Set)]
    pub detect_failures: bool,

    /// Tags replicas created on this backup; stored replicas are discarded
    /// unless their tag matches, and replicas written by this process are only
    /// reused by future processes with the same tag. The name "__unnamed__"
    /// never matches any cluster name (even itself), so it guarantees all
    /// stored replicas are discarded on start.
    #[arg(long = "clusterName", default_value = "")]
    pub cluster_name: String,

    /// Locator the server should listen on
    #[arg(
        short = 'L',
        long = "local",
        env = "SEGSTORE_LOCAL",
        default_value = "tcp:host=127.0.0.1,port=11100"
    )]
    pub local: String,

    /// Locator of the cluster coordinator
    #[arg(
        short = 'C',
        long = "coordinator",
        env = "SEGSTORE_COORDINATOR",
        default_value = "tcp:host=127.0.0.1,port=12246"
    )]
    pub coordinator: String,

    /// Transport session timeout in milliseconds; 0 keeps the transport's
    /// default behavior
    #[arg(long = "timeout", env = "SEGSTORE_TIMEOUT", default_value_t = 0)]
    pub timeout: u32,

    /// Print help
    #[arg(long = "help", action = ArgAction::HelpLong)]
    help: Option<bool>,
}

impl ServerOptions {
    /// Bind the process arguments. Help and version requests print and exit
    /// zero right here; any malformed input becomes a fatal error so the
    /// top-level handler owns the nonzero exit.
    pub fn from_args() -> Result<Self, FatalError> {
        Self::try_parse().map_err(|err| match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                err.exit()
            }
            _ => FatalError::OptionParse(err),
        })
    }
}

fn parse_backup_strategy(raw: &str) -> Result<BackupStrategy, String> {
    let value: u32 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not an integer"))?;
    BackupStrategy::from_wire(value).ok_or_else(|| format!("strategy {value} is out of range (0-3)"))
}
