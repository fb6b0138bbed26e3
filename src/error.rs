use std::io;

/// Every failure in the startup path is unrecoverable: nothing is retried,
/// nothing is handled locally. Each variant tags one abort cause and carries
/// enough context for the single top-level handler to log and exit.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// Malformed or unknown command-line input. The parser's message already
    /// names the offending flag.
    #[error("{0}")]
    OptionParse(clap::Error),

    #[error("cannot specify both -B and -M options")]
    ConfigConflict,

    /// A memory directive that is neither a percentage in (0, 100] nor a
    /// non-negative megabyte count.
    #[error("invalid size specification {directive:?}: {reason}")]
    InvalidSizeSpec { directive: String, reason: String },

    #[error("cannot determine total system memory: {0}")]
    HostProbe(#[source] io::Error),

    #[error("cannot listen on {locator}: {source}")]
    TransportBind {
        locator: String,
        #[source]
        source: io::Error,
    },

    /// Anything surfacing from the server run after configuration handoff.
    #[error("server terminated: {0}")]
    ServerRuntime(#[from] io::Error),
}
