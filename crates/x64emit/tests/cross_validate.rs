//! Cross-validation tests: encode with x64emit, decode with iced-x86.
//!
//! Every encoding is fed to iced-x86, an independent, battle-tested x86-64
//! decoder, and the decoded mnemonic plus Intel-syntax disassembly are
//! checked against expectations.  This catches byte-level mistakes that
//! hand-written expected sequences could share with the encoder.

use iced_x86::{Decoder, DecoderOptions, Formatter, IntelFormatter, Mnemonic};
use x64emit::{Assembler, AsmError, CmpPredicate, Cond, Mem, Reg16, Reg32, Reg64, Reg8, Scale, Xmm};

// ─── Helpers ──────────────────────────────────────────────────────────────

/// Encode one instruction, decode it with iced-x86, return (mnemonic,
/// formatted disassembly).
fn encode_and_decode<F>(f: F) -> (Mnemonic, String)
where
    F: FnOnce(&mut Assembler) -> Result<(), AsmError>,
{
    let mut asm = Assembler::new();
    f(&mut asm).unwrap();
    let bytes = asm.finish().unwrap().into_bytes();
    assert!(!bytes.is_empty());

    let mut decoder = Decoder::with_ip(64, &bytes, 0, DecoderOptions::NONE);
    let instr = decoder.decode();
    assert_ne!(
        instr.mnemonic(),
        Mnemonic::INVALID,
        "iced-x86 decoded INVALID for {bytes:02X?}"
    );
    assert_eq!(
        instr.len(),
        bytes.len(),
        "iced-x86 consumed {} of {} bytes: {bytes:02X?}",
        instr.len(),
        bytes.len()
    );

    let mut formatter = IntelFormatter::new();
    let mut output = String::new();
    formatter.format(&instr, &mut output);
    (instr.mnemonic(), output)
}

/// Encode + decode, assert the decoded mnemonic.
fn verify<F>(f: F, expected: Mnemonic)
where
    F: FnOnce(&mut Assembler) -> Result<(), AsmError>,
{
    let (mnemonic, formatted) = encode_and_decode(f);
    assert_eq!(mnemonic, expected, "decoded as `{formatted}`");
}

/// Encode + decode, assert the full Intel-syntax disassembly.
fn verify_text<F>(f: F, expected: &str)
where
    F: FnOnce(&mut Assembler) -> Result<(), AsmError>,
{
    let (_, formatted) = encode_and_decode(f);
    assert_eq!(formatted, expected);
}

/// Decode a whole unit instruction by instruction and return the listing.
fn disassemble_all(bytes: &[u8]) -> Vec<String> {
    let mut decoder = Decoder::with_ip(64, bytes, 0, DecoderOptions::NONE);
    let mut formatter = IntelFormatter::new();
    let mut listing = Vec::new();
    while decoder.can_decode() {
        let instr = decoder.decode();
        assert_ne!(instr.mnemonic(), Mnemonic::INVALID, "bad bytes: {bytes:02X?}");
        let mut s = String::new();
        formatter.format(&instr, &mut s);
        listing.push(s);
    }
    listing
}

// ─── Register-register forms ──────────────────────────────────────────────

#[test]
fn xv_alu_reg_reg() {
    verify_text(|a| a.add_r64_r64(Reg64::Rax, Reg64::Rbx), "add rax,rbx");
    verify_text(|a| a.sub_r32_r32(Reg32::Ecx, Reg32::Edx), "sub ecx,edx");
    verify_text(|a| a.xor_r64_r64(Reg64::R8, Reg64::R15), "xor r8,r15");
    verify_text(|a| a.and_r16_r16(Reg16::Ax, Reg16::Bx), "and ax,bx");
    verify_text(|a| a.or_r8_r8(Reg8::Al, Reg8::Dh), "or al,dh");
    verify_text(|a| a.cmp_r64_r64(Reg64::Rdi, Reg64::Rsi), "cmp rdi,rsi");
    verify_text(|a| a.adc_r32_r32(Reg32::Eax, Reg32::Ebx), "adc eax,ebx");
    verify_text(|a| a.sbb_r64_r64(Reg64::Rax, Reg64::Rcx), "sbb rax,rcx");
}

#[test]
fn xv_every_gp64_register_encodes_correctly() {
    const REGS: [(Reg64, &str); 16] = [
        (Reg64::Rax, "rax"),
        (Reg64::Rcx, "rcx"),
        (Reg64::Rdx, "rdx"),
        (Reg64::Rbx, "rbx"),
        (Reg64::Rsp, "rsp"),
        (Reg64::Rbp, "rbp"),
        (Reg64::Rsi, "rsi"),
        (Reg64::Rdi, "rdi"),
        (Reg64::R8, "r8"),
        (Reg64::R9, "r9"),
        (Reg64::R10, "r10"),
        (Reg64::R11, "r11"),
        (Reg64::R12, "r12"),
        (Reg64::R13, "r13"),
        (Reg64::R14, "r14"),
        (Reg64::R15, "r15"),
    ];
    for (reg, name) in REGS {
        verify_text(|a| a.mov_r64_r64(reg, Reg64::Rax), &format!("mov {name},rax"));
        verify_text(|a| a.mov_r64_r64(Reg64::Rax, reg), &format!("mov rax,{name}"));
    }
}

#[test]
fn xv_byte_registers() {
    verify_text(|a| a.mov_r8_r8(Reg8::Ah, Reg8::Bl), "mov ah,bl");
    verify_text(|a| a.mov_r8_r8(Reg8::Spl, Reg8::Al), "mov spl,al");
    verify_text(|a| a.mov_r8_r8(Reg8::Dil, Reg8::Sil), "mov dil,sil");
    verify_text(|a| a.mov_r8_r8(Reg8::R8b, Reg8::R15b), "mov r8b,r15b");
}

// ─── Memory operands ──────────────────────────────────────────────────────

#[test]
fn xv_memory_addressing_modes() {
    verify_text(
        |a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::Rbx)),
        "mov rax,[rbx]",
    );
    verify_text(
        |a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::Rbp)),
        "mov rax,[rbp]",
    );
    verify_text(
        |a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::Rsp)),
        "mov rax,[rsp]",
    );
    verify_text(
        |a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::R12).disp(8)),
        "mov rax,[r12+8]",
    );
    verify_text(
        |a| a.mov_r64_m(Reg64::Rax, Mem::base(Reg64::R13)),
        "mov rax,[r13]",
    );
    verify_text(
        |a| a.mov_r64_m(Reg64::Rcx, Mem::base(Reg64::Rax).index(Reg64::Rdx, Scale::X8).disp(-4)),
        "mov rcx,[rax+rdx*8-4]",
    );
    verify_text(
        |a| a.mov_r32_m(Reg32::Eax, Mem::index_only(Reg64::Rcx, Scale::X4)),
        "mov eax,[rcx*4]",
    );
    verify_text(
        |a| a.mov_r32_m(Reg32::Eax, Mem::abs(0x1000)),
        "mov eax,[1000h]",
    );
}

#[test]
fn xv_extended_base_and_index() {
    verify_text(
        |a| a.mov_r64_m(Reg64::R10, Mem::base(Reg64::R8).index(Reg64::R9, Scale::X2)),
        "mov r10,[r8+r9*2]",
    );
    verify_text(
        |a| a.add_m_r64(Mem::base(Reg64::R14).disp(0x40), Reg64::R11),
        "add [r14+40h],r11",
    );
}

// ─── Immediates ───────────────────────────────────────────────────────────

#[test]
fn xv_immediates() {
    verify_text(|a| a.mov_r64_i32(Reg64::Rax, 42), "mov rax,2Ah");
    verify_text(|a| a.mov_r32_i32(Reg32::Eax, 7), "mov eax,7");
    verify_text(
        |a| a.mov_r64_i64(Reg64::Rcx, 0x1122_3344_5566_7788),
        "mov rcx,1122334455667788h",
    );
    verify_text(|a| a.add_r64_i32(Reg64::Rax, 1), "add rax,1");
    verify_text(|a| a.add_r64_i32(Reg64::Rax, 1000), "add rax,3E8h");
    verify_text(|a| a.cmp_r8_i8(Reg8::Al, 7), "cmp al,7");
}

// ─── Other shapes ─────────────────────────────────────────────────────────

#[test]
fn xv_widening_and_select() {
    verify(|a| a.movzx_r32_r8(Reg32::Eax, Reg8::Cl), Mnemonic::Movzx);
    verify(|a| a.movsx_r64_r16(Reg64::Rax, Reg16::Dx), Mnemonic::Movsx);
    verify(|a| a.movsxd_r64_r32(Reg64::Rax, Reg32::Ecx), Mnemonic::Movsxd);
    verify_text(
        |a| a.cmovcc_r64_r64(Cond::E, Reg64::Rax, Reg64::Rbx),
        "cmove rax,rbx",
    );
    verify_text(|a| a.setcc_r8(Cond::A, Reg8::Cl), "seta cl");
}

#[test]
fn xv_every_condition_code() {
    const CONDS: [(Cond, Mnemonic); 16] = [
        (Cond::O, Mnemonic::Jo),
        (Cond::No, Mnemonic::Jno),
        (Cond::B, Mnemonic::Jb),
        (Cond::Ae, Mnemonic::Jae),
        (Cond::E, Mnemonic::Je),
        (Cond::Ne, Mnemonic::Jne),
        (Cond::Be, Mnemonic::Jbe),
        (Cond::A, Mnemonic::Ja),
        (Cond::S, Mnemonic::Js),
        (Cond::Ns, Mnemonic::Jns),
        (Cond::P, Mnemonic::Jp),
        (Cond::Np, Mnemonic::Jnp),
        (Cond::L, Mnemonic::Jl),
        (Cond::Ge, Mnemonic::Jge),
        (Cond::Le, Mnemonic::Jle),
        (Cond::G, Mnemonic::Jg),
    ];
    for (cond, expected) in CONDS {
        verify(|a| a.jcc_rel8(cond, 0), expected);
        verify(|a| a.jcc_rel32(cond, 0x100), expected);
    }
}

#[test]
fn xv_stack_and_control() {
    verify(|a| a.push_r64(Reg64::Rbp), Mnemonic::Push);
    verify(|a| a.pop_r64(Reg64::R15), Mnemonic::Pop);
    verify(|a| a.call_r64(Reg64::Rax), Mnemonic::Call);
    verify(|a| a.jmp_m(Mem::base(Reg64::Rax)), Mnemonic::Jmp);
    verify(|a| a.ret(), Mnemonic::Ret);
    verify(|a| a.leave(), Mnemonic::Leave);
    verify(|a| a.ud2(), Mnemonic::Ud2);
    verify(|a| a.cqo(), Mnemonic::Cqo);
}

#[test]
fn xv_shifts_and_unary() {
    verify_text(|a| a.shl_r64_i8(Reg64::Rax, 3), "shl rax,3");
    verify_text(|a| a.sar_r32_cl(Reg32::Ecx), "sar ecx,cl");
    verify_text(|a| a.neg_r64(Reg64::Rdx), "neg rdx");
    verify_text(|a| a.not_r32(Reg32::Eax), "not eax");
    verify_text(|a| a.inc_r64(Reg64::R9), "inc r9");
    verify_text(|a| a.imul_r64_r64(Reg64::Rax, Reg64::Rbx), "imul rax,rbx");
}

// ─── SSE ──────────────────────────────────────────────────────────────────

#[test]
fn xv_sse() {
    verify_text(|a| a.addsd_xmm_xmm(Xmm::Xmm0, Xmm::Xmm1), "addsd xmm0,xmm1");
    verify_text(|a| a.mulss_xmm_xmm(Xmm::Xmm2, Xmm::Xmm3), "mulss xmm2,xmm3");
    verify_text(
        |a| a.divsd_xmm_m(Xmm::Xmm4, Mem::base(Reg64::Rax)),
        "divsd xmm4,[rax]",
    );
    verify_text(|a| a.xorps_xmm_xmm(Xmm::Xmm8, Xmm::Xmm8), "xorps xmm8,xmm8");
    verify_text(
        |a| a.movsd_m_xmm(Mem::base(Reg64::Rsp).disp(8), Xmm::Xmm0),
        "movsd [rsp+8],xmm0",
    );
    verify_text(
        |a| a.cvtsi2sd_xmm_r64(Xmm::Xmm0, Reg64::Rdi),
        "cvtsi2sd xmm0,rdi",
    );
    verify_text(
        |a| a.cvttsd2si_r64_xmm(Reg64::Rax, Xmm::Xmm1),
        "cvttsd2si rax,xmm1",
    );
    verify_text(
        |a| a.ucomisd_xmm_xmm(Xmm::Xmm0, Xmm::Xmm15),
        "ucomisd xmm0,xmm15",
    );
    verify(|a| a.movq_xmm_r64(Xmm::Xmm0, Reg64::Rax), Mnemonic::Movq);
    verify(
        |a| a.cmpsd_xmm_xmm(Xmm::Xmm0, Xmm::Xmm1, CmpPredicate::Lt),
        Mnemonic::Cmpsd,
    );
}

// ─── Whole-unit round trips ───────────────────────────────────────────────

#[test]
fn xv_function_with_labels() {
    // abs(x): mov rax, rdi; test rax, rax; jns done; neg rax; done: ret
    let mut asm = Assembler::new();
    let done = asm.label();
    asm.mov_r64_r64(Reg64::Rax, Reg64::Rdi).unwrap();
    asm.test_r64_r64(Reg64::Rax, Reg64::Rax).unwrap();
    asm.jcc(Cond::Ns, done).unwrap();
    asm.neg_r64(Reg64::Rax).unwrap();
    asm.bind(done).unwrap();
    asm.ret().unwrap();
    let code = asm.finish().unwrap();

    let listing = disassemble_all(code.bytes());
    assert_eq!(
        listing,
        [
            "mov rax,rdi",
            "test rax,rax",
            "jns short 000000000000000Bh",
            "neg rax",
            "ret",
        ]
    );
    assert_eq!(code.label_offset(done), Some(0xB));
}

#[test]
fn xv_relaxed_branch_decodes_as_near_jump() {
    let mut asm = Assembler::new();
    let far = asm.label();
    asm.jmp_label(far).unwrap();
    for _ in 0..200 {
        asm.nop().unwrap();
    }
    asm.bind(far).unwrap();
    asm.ret().unwrap();
    let code = asm.finish().unwrap();

    let listing = disassemble_all(code.bytes());
    assert_eq!(listing[0], "jmp 00000000000000CDh");
    assert_eq!(listing.last().map(String::as_str), Some("ret"));
    assert_eq!(code.label_offset(far), Some(0xCD));
}

#[test]
fn xv_nop_padding_is_all_valid_nops() {
    let mut asm = Assembler::new();
    asm.ret().unwrap();
    asm.align(64).unwrap();
    asm.ret().unwrap();
    let code = asm.finish().unwrap();
    assert_eq!(code.len(), 65);

    let listing = disassemble_all(&code.bytes()[1..64]);
    assert!(listing.iter().all(|s| s.starts_with("nop")), "{listing:?}");
}
