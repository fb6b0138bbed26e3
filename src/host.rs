use std::fs;
use std::io;

/// Total physical memory of the host in bytes, read from `/proc/meminfo`.
/// Memory sizing treats this as an external fact; if it cannot be determined
/// while a master role needs sizing, startup aborts.
pub fn total_system_memory() -> io::Result<u64> {
    parse_meminfo(&fs::read_to_string("/proc/meminfo")?)
}

fn parse_meminfo(contents: &str) -> io::Result<u64> {
    for line in contents.lines() {
        let Some(rest) = line.strip_prefix("MemTotal:") else {
            continue;
        };
        // Format: "MemTotal:       16384256 kB"
        let kilobytes: u64 = rest
            .trim()
            .trim_end_matches("kB")
            .trim_end()
            .parse()
            .map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed MemTotal line: {err}"),
                )
            })?;
        return Ok(kilobytes * 1024);
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "no MemTotal entry in /proc/meminfo",
    ))
}
