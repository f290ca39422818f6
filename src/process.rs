//! Process Locator (spec section 4.1): scans `/proc` to translate a
//! literal command-line string into a process identifier.

use crate::error::{InjectError, Result};
use nix::unistd::Pid;
use std::fs;

const CMDLINE_READ_CAP: usize = 128;

/// Finds the first process whose `/proc/<pid>/cmdline` bytes exactly match
/// `cmdline_literal`, including any embedded NULs the caller supplied.
/// Empty input is `InvalidArgument`.
pub fn locate(cmdline_literal: &[u8]) -> Result<Pid> {
    if cmdline_literal.is_empty() {
        return Err(InjectError::InvalidArgument(
            "command-line literal must not be empty".into(),
        ));
    }

    for entry in fs::read_dir("/proc")? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue, // vanished mid-scan; spec section 4.1 says skip silently
        };
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i32>().ok())
            .filter(|pid| *pid > 0)
        else {
            continue;
        };

        let cmdline_path = format!("/proc/{pid}/cmdline");
        let buf = match fs::read(&cmdline_path) {
            Ok(buf) => buf,
            Err(_) => continue, // process exited between readdir and open
        };

        if matches_cmdline(&buf, cmdline_literal) {
            return Ok(Pid::from_raw(pid));
        }
    }

    Err(InjectError::NotFound(format!(
        "no process with cmdline matching {cmdline_literal:?}"
    )))
}

/// The exact-match comparison at the heart of `locate`, isolated so it's
/// testable without a real `/proc`. Reads at most `CMDLINE_READ_CAP` bytes
/// of the pseudo-file, mirroring `examples/original_source/src/Memory.c`'s
/// fixed-size `cmdline[128]` buffer.
fn matches_cmdline(proc_cmdline_bytes: &[u8], needle: &[u8]) -> bool {
    let capped = &proc_cmdline_bytes[..proc_cmdline_bytes.len().min(CMDLINE_READ_CAP)];
    capped == needle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_argv_joined_by_nuls() {
        assert!(matches_cmdline(b"target-process\0", b"target-process\0"));
    }

    #[test]
    fn does_not_fuzzy_match() {
        assert!(!matches_cmdline(b"target-process-v2\0", b"target-process\0"));
        assert!(!matches_cmdline(b"target-process\0", b"target-process-v2\0"));
    }

    #[test]
    fn respects_embedded_nuls_in_multi_arg_cmdlines() {
        assert!(matches_cmdline(b"/usr/bin/app\0--flag\0value\0", b"/usr/bin/app\0--flag\0value\0"));
        assert!(!matches_cmdline(b"/usr/bin/app\0--flag\0value\0", b"/usr/bin/app\0"));
    }

    #[test]
    fn ignores_bytes_past_the_read_cap() {
        let mut long = vec![b'a'; CMDLINE_READ_CAP + 10];
        long[CMDLINE_READ_CAP - 1] = 0;
        let needle = vec![b'a'; CMDLINE_READ_CAP - 1]
            .into_iter()
            .chain(std::iter::once(0))
            .collect::<Vec<_>>();
        // proc_cmdline_bytes passed to matches_cmdline would already have
        // been capped by the actual read in `locate`; here we exercise the
        // capping logic itself.
        assert!(matches_cmdline(&long, &needle));
    }

    #[test]
    fn empty_literal_is_invalid_argument() {
        let err = locate(b"").unwrap_err();
        assert!(matches!(err, InjectError::InvalidArgument(_)));
    }
}
