//! Property-based tests using proptest.
//!
//! These verify encoder invariants across large, randomly generated input
//! spaces: determinism, instruction length bounds, REX minimality, the
//! disp8/disp32 and imm8/imm32 selection boundaries, and relaxation
//! convergence.  They complement the targeted exact-byte tests.

use iced_x86::{Decoder, DecoderOptions, Mnemonic};
use proptest::prelude::*;
use x64emit::{Assembler, AsmError, Cond, Mem, Reg32, Reg64, Scale};

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_reg64() -> impl Strategy<Value = Reg64> {
    prop::sample::select(vec![
        Reg64::Rax,
        Reg64::Rcx,
        Reg64::Rdx,
        Reg64::Rbx,
        Reg64::Rsp,
        Reg64::Rbp,
        Reg64::Rsi,
        Reg64::Rdi,
        Reg64::R8,
        Reg64::R9,
        Reg64::R10,
        Reg64::R11,
        Reg64::R12,
        Reg64::R13,
        Reg64::R14,
        Reg64::R15,
    ])
}

fn arb_classic_reg32() -> impl Strategy<Value = Reg32> {
    prop::sample::select(vec![
        Reg32::Eax,
        Reg32::Ecx,
        Reg32::Edx,
        Reg32::Ebx,
        Reg32::Esp,
        Reg32::Ebp,
        Reg32::Esi,
        Reg32::Edi,
    ])
}

fn arb_scale() -> impl Strategy<Value = Scale> {
    prop::sample::select(vec![Scale::X1, Scale::X2, Scale::X4, Scale::X8])
}

/// Any memory operand the hardware can express (RSP never as index).
fn arb_mem() -> impl Strategy<Value = Mem> {
    (
        prop::option::of(arb_reg64()),
        prop::option::of((arb_reg64().prop_filter("rsp is not an index", |r| *r != Reg64::Rsp), arb_scale())),
        any::<i32>(),
    )
        .prop_map(|(base, index, disp)| {
            let mut mem = match base {
                Some(b) => Mem::base(b),
                None => Mem::abs(0),
            };
            if let Some((idx, scale)) = index {
                mem = mem.index(idx, scale);
            }
            mem.disp(disp)
        })
}

/// Encode one instruction, return its bytes.
fn encode<F>(f: F) -> Vec<u8>
where
    F: FnOnce(&mut Assembler) -> Result<(), AsmError>,
{
    let mut asm = Assembler::new();
    f(&mut asm).unwrap();
    asm.finish().unwrap().into_bytes()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    /// Identical inputs produce identical bytes.
    #[test]
    fn deterministic_encoding(dst in arb_reg64(), mem in arb_mem()) {
        let a = encode(|asm| asm.mov_r64_m(dst, mem));
        let b = encode(|asm| asm.mov_r64_m(dst, mem));
        prop_assert_eq!(a, b);
    }

    /// No single instruction exceeds the architectural 15-byte limit.
    #[test]
    fn instruction_length_bound(dst in arb_reg64(), src in arb_reg64(), mem in arb_mem(), imm in any::<i32>()) {
        prop_assert!(encode(|a| a.mov_r64_m(dst, mem)).len() <= 15);
        prop_assert!(encode(|a| a.add_r64_r64(dst, src)).len() <= 15);
        prop_assert!(encode(|a| a.cmp_m32_i32(mem, imm)).len() <= 15);
    }

    /// Classic 32-bit reg-reg operations never carry a REX prefix.
    #[test]
    fn rex_minimality_classic_r32(dst in arb_classic_reg32(), src in arb_classic_reg32()) {
        let bytes = encode(|a| a.add_r32_r32(dst, src));
        prop_assert_eq!(bytes.len(), 2);
        prop_assert!(!(0x40..=0x4F).contains(&bytes[0]));
    }

    /// Every memory form decodes cleanly as exactly one instruction.
    #[test]
    fn memory_forms_decode(dst in arb_reg64(), mem in arb_mem()) {
        let bytes = encode(|a| a.mov_r64_m(dst, mem));
        let mut decoder = Decoder::with_ip(64, &bytes, 0, DecoderOptions::NONE);
        let instr = decoder.decode();
        prop_assert_eq!(instr.mnemonic(), Mnemonic::Mov);
        prop_assert_eq!(instr.len(), bytes.len());
    }

    /// The displacement width tracks the value: disp8 iff it fits i8
    /// (except forced disp8 for RBP/R13 bases at zero).
    #[test]
    fn disp_width_is_minimal(disp in any::<i32>()) {
        let bytes = encode(|a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::Rbx).disp(disp)));
        let expected = if disp == 0 {
            3
        } else if (-128..=127).contains(&disp) {
            4
        } else {
            7
        };
        prop_assert_eq!(bytes.len(), expected);
    }

    /// ALU immediates shrink to the sign-extended byte form exactly when
    /// the value fits.
    #[test]
    fn imm_width_is_minimal(imm in any::<i32>()) {
        let bytes = encode(|a| a.add_r64_i32(Reg64::Rax, imm));
        if (-128..=127).contains(&imm) {
            prop_assert_eq!(bytes.len(), 4);
            prop_assert_eq!(bytes[1], 0x83);
        } else {
            prop_assert_eq!(bytes.len(), 7);
            prop_assert_eq!(bytes[1], 0x81);
        }
    }

    /// Relaxation always converges and picks the short form exactly when
    /// the forward distance fits rel8.
    #[test]
    fn relaxation_picks_minimal_width(padding in 0usize..400) {
        let mut asm = Assembler::new();
        let l = asm.label();
        asm.jcc(Cond::E, l).unwrap();
        asm.emit_bytes(&vec![0x90; padding]);
        asm.bind(l).unwrap();
        let code = asm.finish().unwrap();
        let expected = if padding <= 127 { 2 + padding } else { 6 + padding };
        prop_assert_eq!(code.len(), expected);
        prop_assert_eq!(code.label_offset(l), Some(expected as u64));
    }

    /// A failed instruction leaves the unit byte-for-byte unchanged.
    #[test]
    fn errors_emit_nothing(dst in arb_reg64(), scale in arb_scale()) {
        let mut asm = Assembler::new();
        asm.nop().unwrap();
        let bad = Mem::base(Reg64::Rax).index(Reg64::Rsp, scale);
        prop_assert_eq!(asm.mov_r64_m(dst, bad), Err(AsmError::RspIndex));
        let code = asm.finish().unwrap();
        prop_assert_eq!(code.bytes(), &[0x90]);
    }

    /// Label ids are dense and independent across assemblers.
    #[test]
    fn label_allocation_is_dense(n in 1usize..64) {
        let mut asm = Assembler::new();
        let labels: Vec<_> = (0..n).map(|_| asm.label()).collect();
        for l in &labels {
            asm.bind(*l).unwrap();
        }
        asm.ret().unwrap();
        let code = asm.finish().unwrap();
        for l in &labels {
            prop_assert_eq!(code.label_offset(*l), Some(0));
        }
    }
}
