//! Thread enumeration — supplemental, grounded in the "Multi-threaded
//! targets" design note (spec section 9) and adapted from the teacher's
//! `ThreadGroup` concept (`rd::thread_group::ThreadGroup`), stripped of
//! everything that only made sense for scheduling a record/replay session
//! (checkpoint cloning, destabilization, parent/child thread-group trees).
//!
//! `ptrace(2)` attaches to a single thread. Spec section 1 explicitly
//! treats the target as a single scheduling entity and puts thread
//! selection out of scope; this module exists only to make that
//! limitation visible and inspectable, not to work around it.

use crate::error::Result;
use nix::unistd::Pid;
use std::fs;

/// Lists every thread ID of `pid`'s thread group other than `pid` itself,
/// by reading `/proc/<pid>/task`.
///
/// Nothing in this crate's default `remote_call` path consults this list:
/// other threads keep running during a remote call and may observe or
/// mutate the allocated scratch buffer concurrently (spec section 9). A
/// caller that wants to reduce that risk can use this list to `SIGSTOP`
/// siblings before calling `TargetSession::attach`, but doing so
/// unconditionally would silently change the single-thread semantics this
/// spec is written against, so it stays opt-in.
pub fn sibling_threads(pid: Pid) -> Result<Vec<Pid>> {
    let task_dir = format!("/proc/{pid}/task");
    let mut siblings = Vec::new();
    for entry in fs::read_dir(task_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            // A thread can exit between readdir and stat; spec section 4.1
            // applies the same "skip silently" rule to /proc races.
            Err(_) => continue,
        };
        if let Some(tid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i32>().ok())
        {
            if tid != pid.as_raw() {
                siblings.push(Pid::from_raw(tid));
            }
        }
    }
    Ok(siblings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::getpid;

    #[test]
    fn excludes_the_queried_pid_itself() {
        let siblings = sibling_threads(getpid()).unwrap();
        assert!(!siblings.contains(&getpid()));
    }
}
