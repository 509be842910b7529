//! Serde round-trip tests for the public value types.
//!
//! Run with: `cargo test --features serde`

#![cfg(feature = "serde")]

use x64emit::{Assembler, CmpPredicate, Cond, Mem, Reg16, Reg32, Reg64, Reg8, Scale, Xmm};

/// Serialize to JSON, deserialize back, assert equality.
fn round_trip<T>(val: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + core::fmt::Debug,
{
    let json = serde_json::to_string(val).expect("serialize");
    let back: T = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(val, &back, "round-trip mismatch for JSON: {json}");
}

#[test]
fn serde_registers() {
    round_trip(&Reg64::Rax);
    round_trip(&Reg64::R15);
    round_trip(&Reg32::Esp);
    round_trip(&Reg16::Bx);
    round_trip(&Reg8::Ah);
    round_trip(&Reg8::Spl);
    round_trip(&Reg8::R8b);
    round_trip(&Xmm::Xmm15);
}

#[test]
fn serde_scale_cond_predicate() {
    for scale in [Scale::X1, Scale::X2, Scale::X4, Scale::X8] {
        round_trip(&scale);
    }
    round_trip(&Cond::E);
    round_trip(&Cond::G);
    round_trip(&CmpPredicate::Unord);
}

#[test]
fn serde_mem() {
    round_trip(&Mem::base(Reg64::Rbx).index(Reg64::Rcx, Scale::X4).disp(-8));
    round_trip(&Mem::rip(0x100));
    round_trip(&Mem::abs(0x1000));
}

#[test]
fn serde_code_with_labels() {
    let mut asm = Assembler::new();
    let l = asm.label();
    round_trip(&l);
    asm.jcc(Cond::E, l).unwrap();
    asm.bind(l).unwrap();
    asm.ret().unwrap();
    round_trip(&asm.finish().unwrap());
}
