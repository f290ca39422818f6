//! Target Handle (spec section 3): a process identifier plus the implicit
//! `ptrace` attachment state. Every core operation beyond process location
//! takes a `&TargetSession` (or consumes the attach/detach transitions),
//! so "is the target attached and stopped" is a property of a value
//! instead of ambient global state (spec section 9, "Global PID").

use crate::error::{InjectError, Result};
use crate::registers::Registers;
use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

pub struct TargetSession {
    pid: Pid,
    attached: bool,
}

impl TargetSession {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attaches to `pid` and blocks until the resulting stop is observed.
    /// Spec section 3's invariant ("all remote-call operations require the
    /// target be attached and stopped") starts here.
    pub fn attach(pid: Pid) -> Result<TargetSession> {
        ptrace::attach(pid).map_err(|e| InjectError::Debugger(format!("PTRACE_ATTACH: {e}")))?;

        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Stopped(_, _)) => Ok(TargetSession {
                pid,
                attached: true,
            }),
            Ok(other) => Err(InjectError::Debugger(format!(
                "expected a stop after attach, observed {other:?}"
            ))),
            Err(e) => Err(InjectError::Debugger(format!("waitpid after attach: {e}"))),
        }
    }

    pub fn detach(mut self) -> Result<()> {
        self.detach_mut()
    }

    fn detach_mut(&mut self) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        ptrace::detach(self.pid, None)
            .map_err(|e| InjectError::Debugger(format!("PTRACE_DETACH: {e}")))?;
        self.attached = false;
        Ok(())
    }

    pub fn get_regs(&self) -> Result<Registers> {
        self.require_attached()?;
        let raw = ptrace::getregs(self.pid)
            .map_err(|e| InjectError::Debugger(format!("PTRACE_GETREGS: {e}")))?;
        Ok(Registers::from_raw(raw))
    }

    pub fn set_regs(&self, regs: &Registers) -> Result<()> {
        self.require_attached()?;
        ptrace::setregs(self.pid, regs.as_raw())
            .map_err(|e| InjectError::Debugger(format!("PTRACE_SETREGS: {e}")))
    }

    pub fn resume(&self) -> Result<()> {
        self.require_attached()?;
        ptrace::cont(self.pid, None)
            .map_err(|e| InjectError::Debugger(format!("PTRACE_CONT: {e}")))
    }

    /// Blocks until the next status change, interpreting exited/signaled
    /// statuses as `TargetGone` (spec section 4.5 step 8).
    pub fn wait_for_stop(&self) -> Result<WaitOutcome> {
        self.require_attached()?;
        match waitpid(self.pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Stopped(_, sig)) => Ok(WaitOutcome::Stopped(sig)),
            Ok(WaitStatus::Exited(_, _)) | Ok(WaitStatus::Signaled(_, _, _)) => {
                Err(InjectError::TargetGone)
            }
            Ok(other) => Ok(WaitOutcome::Other(format!("{other:?}"))),
            Err(e) => Err(InjectError::Debugger(format!("waitpid: {e}"))),
        }
    }

    fn require_attached(&self) -> Result<()> {
        if self.attached {
            Ok(())
        } else {
            Err(InjectError::Debugger(
                "operation requires an attached, stopped target".into(),
            ))
        }
    }
}

impl Drop for TargetSession {
    fn drop(&mut self) {
        // Best-effort: a session dropped without an explicit `detach()`
        // (e.g. an error path that bails with `?`) still releases the
        // tracer so the target isn't left stopped forever.
        if self.attached {
            let _ = self.detach_mut();
        }
    }
}

#[derive(Debug)]
pub enum WaitOutcome {
    Stopped(Signal),
    Other(String),
}
