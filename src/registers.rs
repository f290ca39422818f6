//! The general-purpose register file of a stopped tracee.
//!
//! The teacher's `Registers` is a tagged union over `x86::user_regs_struct`
//! and `x64::user_regs_struct` because `rd` supports tracees of either word
//! size. Spec section 1 makes cross-architecture portability an explicit
//! non-goal, so this is a thin newtype over the native
//! `libc::user_regs_struct` instead of a union — but it keeps the
//! teacher's shape of "named accessors over raw fields, plus a snapshot
//! type that's cheap to copy and compare byte-for-byte".

use libc::user_regs_struct;

/// A snapshot of a tracee's general-purpose registers, as returned by
/// `PTRACE_GETREGS` and accepted by `PTRACE_SETREGS`.
///
/// Two snapshots are live during a remote call (spec section 3): the
/// `original`, used to restore, and the `work`, mutated to set up the call.
/// `PartialEq` gives the register-file-preservation invariant (spec section
/// 8) a one-line check in tests.
#[derive(Copy, Clone, Debug)]
pub struct Registers(user_regs_struct);

impl Registers {
    pub fn from_raw(raw: user_regs_struct) -> Registers {
        Registers(raw)
    }

    pub fn as_raw(&self) -> user_regs_struct {
        self.0
    }

    pub fn rax(&self) -> u64 {
        self.0.rax
    }

    pub fn set_rax(&mut self, value: u64) {
        self.0.rax = value;
    }

    pub fn rip(&self) -> u64 {
        self.0.rip
    }

    pub fn set_rip(&mut self, value: u64) {
        self.0.rip = value;
    }

    pub fn rsp(&self) -> u64 {
        self.0.rsp
    }

    pub fn set_rsp(&mut self, value: u64) {
        self.0.rsp = value;
    }

    pub fn set_orig_rax(&mut self, value: u64) {
        self.0.orig_rax = value;
    }

    /// Place up to six integer arguments into `rdi, rsi, rdx, rcx, r8, r9`
    /// per the System V calling convention (spec section 4.5 step 3). The
    /// caller is responsible for the `len <= 6` check (spec section 4.5:
    /// excess arguments are an `InvalidArgument` error, not silently
    /// dropped); this setter just trusts its slice.
    pub fn set_call_args(&mut self, args: &[u64]) {
        debug_assert!(args.len() <= 6);
        let slots = [
            &mut self.0.rdi,
            &mut self.0.rsi,
            &mut self.0.rdx,
            &mut self.0.rcx,
            &mut self.0.r8,
            &mut self.0.r9,
        ];
        for (slot, value) in IntoIterator::into_iter(slots).zip(args.iter()) {
            *slot = *value;
        }
    }
}

impl PartialEq for Registers {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.0, &other.0);
        a.r15 == b.r15
            && a.r14 == b.r14
            && a.r13 == b.r13
            && a.r12 == b.r12
            && a.rbp == b.rbp
            && a.rbx == b.rbx
            && a.r11 == b.r11
            && a.r10 == b.r10
            && a.r9 == b.r9
            && a.r8 == b.r8
            && a.rax == b.rax
            && a.rcx == b.rcx
            && a.rdx == b.rdx
            && a.rsi == b.rsi
            && a.rdi == b.rdi
            && a.orig_rax == b.orig_rax
            && a.rip == b.rip
            && a.cs == b.cs
            && a.eflags == b.eflags
            && a.rsp == b.rsp
            && a.ss == b.ss
            && a.fs_base == b.fs_base
            && a.gs_base == b.gs_base
            && a.ds == b.ds
            && a.es == b.es
            && a.fs == b.fs
            && a.gs == b.gs
    }
}

impl Eq for Registers {}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed() -> user_regs_struct {
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn set_call_args_fills_in_abi_order() {
        let mut regs = Registers::from_raw(zeroed());
        regs.set_call_args(&[1, 2, 3, 4, 5, 6]);
        let raw = regs.as_raw();
        assert_eq!(
            (raw.rdi, raw.rsi, raw.rdx, raw.rcx, raw.r8, raw.r9),
            (1, 2, 3, 4, 5, 6)
        );
    }

    #[test]
    fn set_call_args_partial_leaves_unused_registers_untouched() {
        let mut raw = zeroed();
        raw.r9 = 0xdead;
        let mut regs = Registers::from_raw(raw);
        regs.set_call_args(&[1, 2]);
        assert_eq!(regs.as_raw().r9, 0xdead);
    }

    #[test]
    fn equal_snapshots_compare_equal() {
        let a = Registers::from_raw(zeroed());
        let b = Registers::from_raw(zeroed());
        assert_eq!(a, b);
    }

    #[test]
    fn differing_rax_breaks_equality() {
        let a = Registers::from_raw(zeroed());
        let mut b = Registers::from_raw(zeroed());
        b.set_rax(1);
        assert_ne!(a, b);
    }
}
