use std::str::FromStr;

use crate::error::FatalError;

pub const MEGABYTE: u64 = 1024 * 1024;

/// A memory sizing directive from the command line: either a share of total
/// system memory ("10%") or an absolute megabyte count ("2048").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// Integer percentage of total system memory, in (0, 100].
    Percent(u64),
    /// Absolute size in megabytes, independent of the system total.
    Megabytes(u64),
}

impl SizeSpec {
    /// Resolve to a concrete byte count against `total` bytes of system
    /// memory. Percentages round to the nearest byte; the total is ignored
    /// for absolute directives.
    pub fn bytes(self, total: u64) -> u64 {
        match self {
            // Exact integer arithmetic; the widening keeps total * percent
            // from overflowing.
            SizeSpec::Percent(percent) => {
                ((u128::from(total) * u128::from(percent) + 50) / 100) as u64
            }
            SizeSpec::Megabytes(megabytes) => megabytes * MEGABYTE,
        }
    }
}

impl FromStr for SizeSpec {
    type Err = FatalError;

    fn from_str(directive: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FatalError::InvalidSizeSpec {
            directive: directive.to_string(),
            reason: reason.to_string(),
        };

        if let Some(number) = directive.strip_suffix('%') {
            let percent: u64 = number
                .parse()
                .map_err(|_| invalid("percentage is not an unsigned integer"))?;
            if percent == 0 || percent > 100 {
                return Err(invalid("percentage must be in (0, 100]"));
            }
            Ok(SizeSpec::Percent(percent))
        } else {
            let megabytes: u64 = directive
                .parse()
                .map_err(|_| invalid("not an unsigned integer megabyte count"))?;
            if megabytes > u64::MAX / MEGABYTE {
                return Err(invalid("megabyte count too large"));
            }
            Ok(SizeSpec::Megabytes(megabytes))
        }
    }
}
