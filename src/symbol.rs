//! Symbol Translator (spec section 4.4): maps a function pointer valid in
//! the caller's own address space to the equivalent virtual address in the
//! target, using only base-delta arithmetic — ASLR randomizes each
//! process's module base independently, but a shared object's internal
//! layout is identical across every process that mapped it, so no
//! symbol-table parsing is needed.

use crate::error::Result;
use crate::maps;
use nix::unistd::Pid;

/// Computes `fn_ptr_local - local_base + remote_base` for the module
/// backing `fn_ptr_local`. Fails if the target doesn't have the same
/// shared object mapped under a path containing the same name.
pub fn remote_addr_of(target: Pid, fn_ptr_local: u64) -> Result<u64> {
    let module_path = maps::containing_module(fn_ptr_local)?;
    let local_base = maps::base_of(None, &module_path)?;
    let remote_base = maps::base_of(Some(target), &module_path)?;
    Ok(base_delta(fn_ptr_local, local_base, remote_base))
}

/// The arithmetic core of the translator, split out so the identity in
/// spec section 8 ("remote_addr_of(p) - base_of(target, ...) =
/// p - base_of(self, ...)") is directly testable without touching
/// `/proc`.
pub fn base_delta(fn_ptr_local: u64, local_base: u64, remote_base: u64) -> u64 {
    fn_ptr_local - local_base + remote_base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_identity_holds() {
        let local_base = 0x7f0000000000u64;
        let remote_base = 0x5500000000u64;
        let fn_ptr_local = local_base + 0x1234;

        let remote = base_delta(fn_ptr_local, local_base, remote_base);

        // remote_addr_of(p) - base_of(target, ...) == p - base_of(self, ...)
        assert_eq!(remote - remote_base, fn_ptr_local - local_base);
    }

    #[test]
    fn identical_bases_yield_identity_translation() {
        assert_eq!(base_delta(0x1000, 0x1000, 0x1000), 0x1000);
    }
}
