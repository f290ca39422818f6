//! Module Map Reader (spec section 4.2): parses `/proc/<pid>/maps` to
//! answer "where is this module loaded" and "what module backs this
//! address", in either the caller's own address space or a target's.

use crate::error::{InjectError, Result};
use nix::unistd::Pid;
use std::fs;

/// One parsed line of `/proc/<pid>/maps`: `start-end perms offset dev inode path`.
/// `path` is `None` for anonymous mappings and bracketed pseudo-mappings
/// like `[heap]` that don't begin with `/`.
struct MapsLine {
    start: u64,
    end: u64,
    path: Option<String>,
}

fn parse_line(line: &str) -> Option<MapsLine> {
    let (addr_range, rest) = line.split_once(' ')?;
    let (start_hex, end_hex) = addr_range.split_once('-')?;
    let start = u64::from_str_radix(start_hex, 16).ok()?;
    let end = u64::from_str_radix(end_hex, 16).ok()?;

    // The path, if any, is the absolute filesystem path beginning at the
    // first '/' on the line (spec section 4.2), trailing newline stripped.
    let path = rest.find('/').map(|idx| rest[idx..].trim_end().to_string());

    Some(MapsLine { start, end, path })
}

fn maps_path(pid: Option<Pid>) -> String {
    match pid {
        Some(pid) => format!("/proc/{pid}/maps"),
        None => "/proc/self/maps".to_string(),
    }
}

/// Returns the load base (`start` of the first matching mapping) of the
/// first module whose path contains `needle` as a substring. `pid =
/// None` reads the caller's own maps.
pub fn base_of(pid: Option<Pid>, needle: &str) -> Result<u64> {
    if needle.is_empty() {
        return Err(InjectError::InvalidArgument(
            "module needle must not be empty".into(),
        ));
    }

    let contents = fs::read_to_string(maps_path(pid))?;
    for line in contents.lines() {
        if let Some(parsed) = parse_line(line) {
            if let Some(path) = &parsed.path {
                if path.contains(needle) {
                    return Ok(parsed.start);
                }
            }
        }
    }

    Err(InjectError::NotFound(format!(
        "no module matching {needle:?} in {}",
        maps_path(pid)
    )))
}

/// Returns the canonical path of the module containing `addr` in the
/// caller's own address space (spec section 4.4 uses this to identify the
/// local module backing a function pointer).
pub fn containing_module(addr: u64) -> Result<String> {
    let contents = fs::read_to_string(maps_path(None))?;
    for line in contents.lines() {
        if let Some(parsed) = parse_line(line) {
            if addr >= parsed.start && addr <= parsed.end {
                return parsed
                    .path
                    .ok_or_else(|| InjectError::NotFound(format!("{addr:#x} has no backing file")));
            }
        }
    }

    Err(InjectError::NotFound(format!(
        "no mapping contains {addr:#x}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
55a1a1a1a000-55a1a1a1b000 r--p 00000000 08:01 123456 /usr/bin/cat
55a1a1a1b000-55a1a1a1c000 r-xp 00001000 08:01 123456 /usr/bin/cat
7f0a00000000-7f0a00021000 r--p 00000000 08:01 654321 /usr/lib/x86_64-linux-gnu/libc.so.6
7f0a00200000-7f0a00221000 rw-p 00000000 00:00 0
7f0a00300000-7f0a00321000 rw-p 00000000 00:00 0 [heap]
";

    #[test]
    fn parses_start_end_and_path() {
        let line = parse_line(
            "7f0a00000000-7f0a00021000 r--p 00000000 08:01 654321 /usr/lib/libc.so.6",
        )
        .unwrap();
        assert_eq!(line.start, 0x7f0a00000000);
        assert_eq!(line.end, 0x7f0a00021000);
        assert_eq!(line.path.as_deref(), Some("/usr/lib/libc.so.6"));
    }

    #[test]
    fn anonymous_and_bracketed_mappings_have_no_path() {
        assert!(parse_line("7f0a00200000-7f0a00221000 rw-p 00000000 00:00 0")
            .unwrap()
            .path
            .is_none());
        assert!(
            parse_line("7f0a00300000-7f0a00321000 rw-p 00000000 00:00 0 [heap]")
                .unwrap()
                .path
                .is_none()
        );
    }

    #[test]
    fn base_of_matches_by_substring_first_hit() {
        let mut base = None;
        for line in SAMPLE.lines() {
            if let Some(parsed) = parse_line(line) {
                if let Some(path) = &parsed.path {
                    if path.contains("libc.so") {
                        base = Some(parsed.start);
                        break;
                    }
                }
            }
        }
        assert_eq!(base, Some(0x7f0a00000000));
    }

    #[test]
    fn containing_module_picks_first_enclosing_mapping() {
        let mut found = None;
        let addr = 0x55a1a1a1b500u64;
        for line in SAMPLE.lines() {
            if let Some(parsed) = parse_line(line) {
                if addr >= parsed.start && addr <= parsed.end {
                    found = parsed.path;
                    break;
                }
            }
        }
        assert_eq!(found.as_deref(), Some("/usr/bin/cat"));
    }
}
