//! `/proc/<pid>/maps` parsing and module base lookup.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::process::Pid;

/// One mapped region of a process's address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRegion {
    pub start: u64,
    pub end: u64,
    pub perms: String,
    pub path: Option<String>,
}

impl MapRegion {
    pub fn is_executable(&self) -> bool {
        self.perms.contains('x')
    }

    /// Whether this region is backed by a file with the given name.
    pub fn names_file(&self, file_name: &str) -> bool {
        self.path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == file_name)
    }
}

/// Parse one maps line, e.g.
/// `08048000-08056000 r-xp 00000000 08:01 64593 /games/Stronghold2.exe`.
///
/// Malformed lines yield `None` and are skipped by the callers. A path
/// containing spaces is reassembled from the tail fields; runs of multiple
/// spaces inside a file name are not preserved.
pub fn parse_line(line: &str) -> Option<MapRegion> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let (start, end) = parts[0].split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;

    let path = if parts.len() > 5 {
        Some(parts[5..].join(" "))
    } else {
        None
    };

    Some(MapRegion {
        start,
        end,
        perms: parts[1].to_owned(),
        path,
    })
}

fn regions_from_path(path: &Path) -> std::io::Result<Vec<MapRegion>> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().filter_map(parse_line).collect())
}

/// All parseable regions of `pid`'s address space.
pub fn read_regions(pid: Pid) -> crate::Result<Vec<MapRegion>> {
    regions_from_path(Path::new(&format!("/proc/{pid}/maps")))
        .map_err(|source| Error::MapsUnreadable { pid, source })
}

/// Lowest load address of the executable mapping of `module` in `pid`.
///
/// Only regions mapped with execute permission count; the same image file
/// also appears as data segments, which live above the code. `None` when the
/// maps file cannot be read (process exited, permission denied) or no
/// matching mapping exists.
pub fn module_base(pid: Pid, module: &str) -> Option<u64> {
    let regions = match read_regions(pid) {
        Ok(regions) => regions,
        Err(e) => {
            debug!("{e}");
            return None;
        }
    };
    lowest_executable_base(&regions, module)
}

fn lowest_executable_base(regions: &[MapRegion], module: &str) -> Option<u64> {
    regions
        .iter()
        .filter(|r| r.is_executable() && r.names_file(module))
        .map(|r| r.start)
        .min()
}
