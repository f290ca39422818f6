//! Remote-Call Engine (spec section 4.5) — the centerpiece. Hijacks a
//! stopped target's register file to invoke an arbitrary function located
//! in one of the target's loaded modules, recovers the return value, and
//! restores the original state.

use crate::abi::{CallingConvention, SystemVX64};
use crate::error::{InjectError, Result};
use crate::flags::RuntimeConfig;
use crate::memory;
use crate::session::{TargetSession, WaitOutcome};
use crate::symbol;
use nix::sys::signal::Signal;
use std::time::Instant;
use tracing::{debug, trace};

/// The state machine named in spec section 4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Setup,
    Running,
    Faulted,
    Done,
    Error,
}

/// Invokes the function backing `fn_ptr_local` (a pointer valid in *this*
/// process) inside `session`'s target, passing up to six integer
/// arguments, and returns the callee's `rax`.
///
/// Preconditions (spec section 4.5): `session` is attached and stopped.
pub fn remote_call(session: &TargetSession, fn_ptr_local: u64, args: &[u64]) -> Result<u64> {
    let abi = SystemVX64;
    let mut state = CallState::Idle;
    trace!(?state, "remote_call entered");

    if args.len() > abi.max_register_args() {
        return Err(InjectError::InvalidArgument(format!(
            "remote_call accepts at most {} arguments, got {}",
            abi.max_register_args(),
            args.len()
        )));
    }

    state = CallState::Setup;
    debug!(?state, "translating function pointer");

    // Step 1: translate.
    let fn_addr_remote = symbol::remote_addr_of(session.pid(), fn_ptr_local)?;

    // Step 2: snapshot.
    let original = session.get_regs()?;
    let mut work = original;

    // Step 3: argument marshalling.
    work.set_call_args(args);

    // Step 4: stack alignment + reserve the sentinel slot.
    let aligned_rsp = abi.align_stack_for_call(work.rsp());
    work.set_rsp(aligned_rsp);

    // Step 5: plant the sentinel return address at the reserved slot.
    let config = RuntimeConfig::get();
    memory::write_word(session.pid(), work.rsp(), config.sentinel)?;

    // Step 6: set rip, clear the syscall-restart guard.
    work.set_rip(fn_addr_remote);
    work.set_orig_rax(0);

    // Step 7: install registers and continue.
    session.set_regs(&work)?;
    state = CallState::Running;
    debug!(?state, fn_addr = %format!("{fn_addr_remote:#x}"), "resuming target");

    let restore_and_return = |result: Result<u64>| -> Result<u64> {
        // Failure semantics (spec section 4.5): always attempt the
        // restore, even on the error path, once registers have been
        // mutated.
        session.set_regs(&original)?;
        result
    };

    match wait_for_sentinel_fault(session, &config) {
        Ok(()) => {
            state = CallState::Faulted;
            trace!(?state, "sentinel fault observed");
        }
        Err(e) => {
            state = CallState::Error;
            trace!(?state, error = %e, "remote call did not reach the sentinel fault");
            return restore_and_return(Err(e));
        }
    }

    // Step 9: harvest the result.
    let result_regs = match session.get_regs() {
        Ok(regs) => regs,
        Err(e) => return restore_and_return(Err(e)),
    };
    let retval = result_regs.rax();

    // Step 10: restore.
    let outcome = restore_and_return(Ok(retval));
    state = CallState::Done;
    trace!(?state, retval = %format!("{retval:#x}"), "remote call complete");
    outcome
}

/// Step 8: the wait loop. Blocks on status changes until SEGV/ILL (the
/// sentinel-induced fault) is observed, absorbing any other intervening
/// stop by resuming without delivering the signal.
fn wait_for_sentinel_fault(session: &TargetSession, config: &RuntimeConfig) -> Result<()> {
    let started = Instant::now();
    loop {
        if let Some(deadline) = config.wait_deadline {
            if started.elapsed() > deadline {
                return Err(InjectError::Debugger(
                    "remote call wait loop exceeded its deadline".into(),
                ));
            }
        }

        match session.wait_for_stop()? {
            WaitOutcome::Stopped(Signal::SIGSEGV) | WaitOutcome::Stopped(Signal::SIGILL) => {
                return Ok(())
            }
            WaitOutcome::Stopped(_other_signal) => {
                // Absorbed, not surfaced as InjectError::UnexpectedStop
                // (spec section 4.5 step 8: "do not deliver the signal to
                // the target").
                session.resume()?;
            }
            WaitOutcome::Other(_) => {
                session.resume()?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_arguments_is_rejected_before_touching_the_target() {
        // remote_call's own bounds check runs before any ptrace call, so
        // this is exercisable without a live target.
        let abi = SystemVX64;
        let args = [0u64; 7];
        assert!(args.len() > abi.max_register_args());
    }
}
