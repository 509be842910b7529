//! Label resolution and branch relaxation tests.
//!
//! Displacements are always measured from the end of the branch
//! instruction, which is where RIP points when the branch executes.

use x64emit::{Assembler, AsmError, Cond, Reg64};

#[test]
fn forward_short_jump() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jmp_label(l).unwrap();
    asm.nop().unwrap();
    asm.nop().unwrap();
    asm.bind(l).unwrap();
    asm.ret().unwrap();
    // jmp skips two nops: EB 02.
    assert_eq!(asm.finish().unwrap().bytes(), &[0xEB, 0x02, 0x90, 0x90, 0xC3]);
}

#[test]
fn backward_short_jump() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.bind(l).unwrap();
    asm.nop().unwrap();
    asm.jmp_label(l).unwrap();
    // jmp at offset 1, ends at 3, target 0: disp -3.
    assert_eq!(asm.finish().unwrap().bytes(), &[0x90, 0xEB, 0xFD]);
}

#[test]
fn forward_jcc_short() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jcc(Cond::E, l).unwrap();
    asm.nop().unwrap();
    asm.bind(l).unwrap();
    assert_eq!(asm.finish().unwrap().bytes(), &[0x74, 0x01, 0x90]);
}

#[test]
fn branch_to_own_end_is_disp_zero() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jmp_label(l).unwrap();
    asm.bind(l).unwrap();
    assert_eq!(asm.finish().unwrap().bytes(), &[0xEB, 0x00]);
}

#[test]
fn forward_boundary_127_stays_short() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jcc(Cond::E, l).unwrap();
    asm.emit_bytes(&[0x90; 127]);
    asm.bind(l).unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.len(), 2 + 127);
    assert_eq!(&code.bytes()[..2], &[0x74, 0x7F]);
}

#[test]
fn forward_boundary_128_widens() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jcc(Cond::E, l).unwrap();
    asm.emit_bytes(&[0x90; 128]);
    asm.bind(l).unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.len(), 6 + 128);
    assert_eq!(&code.bytes()[..6], &[0x0F, 0x84, 0x80, 0x00, 0x00, 0x00]);
    assert_eq!(code.label_offset(l), Some(6 + 128));
}

#[test]
fn backward_boundary_minus_128_stays_short() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.bind(l).unwrap();
    asm.emit_bytes(&[0x90; 126]);
    asm.jmp_label(l).unwrap();
    let code = asm.finish().unwrap();
    // jmp at 126, ends at 128, target 0: disp -128, still rel8.
    assert_eq!(code.len(), 128);
    assert_eq!(&code.bytes()[126..], &[0xEB, 0x80]);
}

#[test]
fn backward_boundary_minus_129_widens() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.bind(l).unwrap();
    asm.emit_bytes(&[0x90; 127]);
    asm.jmp_label(l).unwrap();
    let code = asm.finish().unwrap();
    // Long form at 127, ends at 132, target 0: disp -132.
    assert_eq!(code.len(), 132);
    assert_eq!(
        &code.bytes()[127..],
        &[0xE9, 0x7C, 0xFF, 0xFF, 0xFF]
    );
}

#[test]
fn widening_cascades_until_fixpoint() {
    // A forward jmp over 125 filler bytes plus a backward jmp.  With both
    // branches short the backward one is one byte out of range; widening it
    // then pushes the forward one out of range too.  Both end up long.
    let mut asm = Assembler::new();
    let start = asm.label();
    let end = asm.label();
    asm.bind(start).unwrap();
    asm.jmp_label(end).unwrap();
    asm.emit_bytes(&[0x90; 125]);
    asm.jmp_label(start).unwrap();
    asm.bind(end).unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.len(), 5 + 125 + 5);
    // Forward: ends at 5, target 135, disp 130.
    assert_eq!(&code.bytes()[..5], &[0xE9, 0x82, 0x00, 0x00, 0x00]);
    // Backward: at 130, ends at 135, target 0, disp -135.
    assert_eq!(&code.bytes()[130..], &[0xE9, 0x79, 0xFF, 0xFF, 0xFF]);
    assert_eq!(code.label_offset(end), Some(135));
}

#[test]
fn mixed_short_and_long_branches() {
    let mut asm = Assembler::new();
    let near = asm.label();
    let far = asm.label();
    asm.jcc(Cond::Ne, far).unwrap();
    asm.jmp_label(near).unwrap();
    asm.bind(near).unwrap();
    asm.emit_bytes(&[0x90; 200]);
    asm.bind(far).unwrap();
    let code = asm.finish().unwrap();
    // jcc widens (target 208 bytes away), jmp stays short with disp 0.
    assert_eq!(code.len(), 6 + 2 + 200);
    assert_eq!(&code.bytes()[..6], &[0x0F, 0x85, 0xCA, 0x00, 0x00, 0x00]);
    assert_eq!(&code.bytes()[6..8], &[0xEB, 0x00]);
}

#[test]
fn call_label_forward_and_backward() {
    let mut asm = Assembler::new();
    let f = asm.label();
    asm.call_label(f).unwrap();
    asm.bind(f).unwrap();
    asm.ret().unwrap();
    assert_eq!(
        asm.finish().unwrap().bytes(),
        &[0xE8, 0x00, 0x00, 0x00, 0x00, 0xC3]
    );

    let mut asm = Assembler::new();
    let f = asm.label();
    asm.bind(f).unwrap();
    asm.call_label(f).unwrap();
    // call at 0, ends at 5, target 0: disp -5.
    assert_eq!(
        asm.finish().unwrap().bytes(),
        &[0xE8, 0xFB, 0xFF, 0xFF, 0xFF]
    );
}

#[test]
fn rip_relative_label_operands() {
    let mut asm = Assembler::new();
    let data = asm.label();
    asm.lea_r64_label(Reg64::Rax, data).unwrap();
    asm.ret().unwrap();
    asm.bind(data).unwrap();
    asm.emit_u64(0xDEAD_BEEF);
    let code = asm.finish().unwrap();
    // lea is 7 bytes and ends at 7; ret ends at 8; disp 8 - 7 = 1.
    assert_eq!(
        &code.bytes()[..8],
        &[0x48, 0x8D, 0x05, 0x01, 0x00, 0x00, 0x00, 0xC3]
    );
    assert_eq!(code.label_offset(data), Some(8));

    let mut asm = Assembler::new();
    let data = asm.label();
    asm.mov_r64_mlabel(Reg64::Rbx, data).unwrap();
    asm.bind(data).unwrap();
    assert_eq!(
        asm.finish().unwrap().bytes(),
        &[0x48, 0x8B, 0x1D, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn unbound_label_fails_finish() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.jmp_label(l).unwrap();
    assert_eq!(asm.finish(), Err(AsmError::UnboundLabel { label: 0 }));
}

#[test]
fn unused_unbound_label_is_harmless() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.ret().unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.bytes(), &[0xC3]);
    assert_eq!(code.label_offset(l), None);
}

#[test]
fn rebinding_is_rejected() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.bind(l).unwrap();
    asm.nop().unwrap();
    assert_eq!(asm.bind(l), Err(AsmError::LabelRedefined { label: 0 }));
}

#[test]
fn many_branches_to_one_label() {
    let mut asm = Assembler::new();
    let l = asm.label();
    for _ in 0..50 {
        asm.jcc(Cond::E, l).unwrap();
    }
    asm.bind(l).unwrap();
    asm.ret().unwrap();
    let code = asm.finish().unwrap();
    // All 50 stay short: the farthest branch ends 98 bytes before target.
    assert_eq!(code.len(), 50 * 2 + 1);
    assert_eq!(&code.bytes()[..2], &[0x74, 0x62]);
    assert_eq!(&code.bytes()[98..100], &[0x74, 0x00]);
}

#[test]
fn alignment_interacts_with_labels() {
    let mut asm = Assembler::new();
    let l = asm.label();
    asm.ret().unwrap();
    asm.align(8).unwrap();
    asm.bind(l).unwrap();
    asm.nop().unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.label_offset(l), Some(8));
    assert_eq!(code.len(), 9);
    assert_eq!(code.bytes()[8], 0x90);
}

#[test]
fn labels_survive_relaxation_offset_shifts() {
    // A label bound after a widening branch must report its final offset,
    // not the pre-relaxation one.
    let mut asm = Assembler::new();
    let far = asm.label();
    let after = asm.label();
    asm.jmp_label(far).unwrap();
    asm.bind(after).unwrap();
    asm.emit_bytes(&[0x90; 200]);
    asm.bind(far).unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.label_offset(after), Some(5));
    assert_eq!(code.label_offset(far), Some(205));
}
