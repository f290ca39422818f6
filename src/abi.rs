//! The calling-convention strategy the remote-call engine is built against.
//!
//! Spec section 9 ("Architecture") asks the rewrite to factor the register
//! layout, argument-register list, and alignment rule into an "ABI
//! strategy abstraction" so a second architecture is a new implementation
//! rather than a rewrite of the engine. `x86-64 System V` is the only
//! implementation spec section 1 asks for; the trait exists so that stays
//! true by construction.

/// One machine word, the unit the engine deals in throughout.
pub const WORD_SIZE: u64 = 8;

pub trait CallingConvention {
    /// Maximum number of integer arguments passable in registers.
    fn max_register_args(&self) -> usize;

    /// Given the tracee's current stack pointer, return the stack pointer
    /// to use for a remote call: 16-byte aligned at the callee's entry
    /// point, with room already reserved for the planted return address.
    fn align_stack_for_call(&self, rsp: u64) -> u64;
}

/// x86-64 System V: the only calling convention spec section 1 requires.
pub struct SystemVX64;

impl CallingConvention for SystemVX64 {
    fn max_register_args(&self) -> usize {
        6
    }

    /// Resolves the Open Question in spec section 9.
    ///
    /// The System V ABI states the invariant at the callee's entry point
    /// as: "%rsp + 8 is a multiple of 16 when control is transferred to the
    /// function entry point" (this accounts for the `call` instruction
    /// having just pushed an 8-byte return address onto a stack that was
    /// 16-aligned immediately beforehand). Equivalently, `rsp % 16 == 8` at
    /// entry.
    ///
    /// We aren't executing a real `call`; we emulate one by writing the
    /// sentinel return address ourselves. So the `rsp` we hand back here
    /// *is* the entry-point `rsp`, and it must satisfy `rsp % 16 == 8`
    /// directly — derived from the ABI text, not from
    /// `examples/original_source/src/Memory.c`'s
    /// `(rsp - space - 8) & 0xF` loop (which arrives at the same final
    /// value, but via an expression that doesn't read back to the ABI
    /// clause it's implementing).
    fn align_stack_for_call(&self, rsp: u64) -> u64 {
        let sixteen_aligned = rsp & !0xF;
        sixteen_aligned - WORD_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_rsp_is_valid(rsp: u64) -> bool {
        (rsp + WORD_SIZE) % 16 == 0
    }

    #[test]
    fn aligns_an_already_16_aligned_pointer() {
        let aligned = SystemVX64.align_stack_for_call(0x7fff_ffff_e000);
        assert!(entry_rsp_is_valid(aligned));
        assert_eq!(aligned % 16, 8);
    }

    #[test]
    fn aligns_an_arbitrarily_misaligned_pointer() {
        for offset in 0u64..32 {
            let rsp = 0x7fff_ffff_e000 + offset;
            let aligned = SystemVX64.align_stack_for_call(rsp);
            assert!(entry_rsp_is_valid(aligned), "offset {offset} produced {aligned:#x}");
            assert!(aligned <= rsp, "alignment must only move the pointer down");
        }
    }

    #[test]
    fn matches_the_original_c_loops_final_value() {
        // Memory.c: while ((rsp - 8 - 8) & 0xF != 0) rsp--; rsp -= 8;
        fn original_c_algorithm(mut rsp: u64) -> u64 {
            let space = WORD_SIZE;
            while (rsp.wrapping_sub(space).wrapping_sub(8)) & 0xF != 0 {
                rsp -= 1;
            }
            rsp - WORD_SIZE
        }

        for offset in 0u64..32 {
            let rsp = 0x7fff_ffff_e000 + offset;
            assert_eq!(SystemVX64.align_stack_for_call(rsp), original_c_algorithm(rsp));
        }
    }

    #[test]
    fn max_register_args_is_six() {
        assert_eq!(SystemVX64.max_register_args(), 6);
    }
}
