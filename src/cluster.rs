use std::fmt;

/// Cluster name that matches no other name, not even itself. Replicas tagged
/// with it are discarded by every restart, including a restart of the process
/// that wrote them.
pub const UNNAMED: &str = "__unnamed__";

/// Opaque tag restricting backup replica reuse to processes sharing the tag.
///
/// Reuse decisions must go through [`ClusterName::matches`]; the type has no
/// equality operator on purpose, since the sentinel rule is not string
/// equality.
#[derive(Debug, Clone)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Replica-reuse rule: two tags match when they are identical, except
    /// that `__unnamed__` on either side never matches anything.
    pub fn matches(&self, other: &ClusterName) -> bool {
        if self.0 == UNNAMED || other.0 == UNNAMED {
            return false;
        }
        self.0 == other.0
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
