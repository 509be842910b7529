//! Primitive instruction encoders.
//!
//! One parameterized routine per distinct operand-shape and field-layout
//! combination.  Every routine writes into an [`InstrBytes`] in strict
//! order: mandatory prefix, operand-size override, REX, opcode byte(s),
//! ModR/M, SIB, displacement, immediate.  The public mnemonic surface in
//! `insn.rs` supplies only literal opcode bytes and /digit constants.
//!
//! REX emission policy: for default (32-bit) operand size the prefix is
//! emitted only when at least one of W/R/X/B is set or an SPL/BPL/SIL/DIL
//! byte register demands it, keeping encodings minimal.  64-bit shapes
//! always carry REX with W set.

use alloc::string::ToString;

use crate::buffer::InstrBytes;
use crate::error::AsmError;
use crate::operand::{Mem, Reg16, Reg32, Reg64, Reg8, Xmm};

// ─── Register views ────────────────────────────────────────

/// Minimal register view used by shapes that only need the encoding index.
pub(crate) trait RegCode: Copy {
    /// The 4-bit encoding index.
    fn code(self) -> u8;
    /// Whether bit 3 of the index must travel in the REX prefix.
    fn is_extended(self) -> bool;
}

/// General-purpose register view for width-polymorphic shapes.
pub(crate) trait GpReg: RegCode + core::fmt::Display {
    /// Operand width in bits (8, 16, 32 or 64).
    fn size_bits(self) -> u8;
    /// Legacy high-byte alias (AH/CH/DH/BH)?
    fn is_high_byte(self) -> bool {
        false
    }
    /// Forces a REX byte even with all flag bits clear (SPL/BPL/SIL/DIL)?
    fn needs_rex_byte(self) -> bool {
        false
    }
}

macro_rules! impl_reg_code {
    ($($ty:ty => $bits:expr),* $(,)?) => {
        $(
            impl RegCode for $ty {
                #[inline]
                fn code(self) -> u8 {
                    <$ty>::code(self)
                }
                #[inline]
                fn is_extended(self) -> bool {
                    <$ty>::is_extended(self)
                }
            }

            impl GpReg for $ty {
                #[inline]
                fn size_bits(self) -> u8 {
                    $bits
                }
            }
        )*
    };
}

impl_reg_code!(Reg64 => 64, Reg32 => 32, Reg16 => 16);

impl RegCode for Reg8 {
    #[inline]
    fn code(self) -> u8 {
        Reg8::code(self)
    }
    #[inline]
    fn is_extended(self) -> bool {
        Reg8::is_extended(self)
    }
}

impl GpReg for Reg8 {
    #[inline]
    fn size_bits(self) -> u8 {
        8
    }
    #[inline]
    fn is_high_byte(self) -> bool {
        Reg8::is_high_byte(self)
    }
    #[inline]
    fn needs_rex_byte(self) -> bool {
        Reg8::needs_rex(self)
    }
}

impl RegCode for Xmm {
    #[inline]
    fn code(self) -> u8 {
        Xmm::code(self)
    }
    #[inline]
    fn is_extended(self) -> bool {
        Xmm::is_extended(self)
    }
}

// ─── Bit assembly ──────────────────────────────────────────

/// Build a REX prefix byte: 0100WRXB.
#[inline]
pub(crate) fn rex(w: bool, r: bool, x: bool, b: bool) -> u8 {
    let mut val: u8 = 0x40;
    if w {
        val |= 0x08;
    }
    if r {
        val |= 0x04;
    }
    if x {
        val |= 0x02;
    }
    if b {
        val |= 0x01;
    }
    val
}

/// Whether a REX prefix with at least one flag is needed.
#[inline]
pub(crate) fn needs_rex(w: bool, r: bool, x: bool, b: bool) -> bool {
    w || r || x || b
}

/// Build a ModR/M byte.
#[inline]
pub(crate) fn modrm(mod_: u8, reg: u8, rm: u8) -> u8 {
    (mod_ << 6) | ((reg & 7) << 3) | (rm & 7)
}

/// Build a SIB byte from the 2-bit scale field and 4-bit register indexes.
#[inline]
pub(crate) fn sib(scale_bits: u8, index: u8, base: u8) -> u8 {
    (scale_bits << 6) | ((index & 7) << 3) | (base & 7)
}

#[inline]
fn high_byte_err<R: GpReg>(reg: R) -> AsmError {
    AsmError::HighByteRex {
        reg: reg.to_string(),
    }
}

// ─── Prefix emission ───────────────────────────────────────

/// Emit the 0x66 operand-size override and REX prefix for a reg,reg form.
///
/// `rm` lands in ModR/M.rm (REX.B), `reg` in ModR/M.reg (REX.R).
fn emit_rex_rr<R: GpReg>(buf: &mut InstrBytes, rm: R, reg: R) -> Result<(), AsmError> {
    let w = rm.size_bits() == 64;
    let r = reg.is_extended();
    let b = rm.is_extended();

    if rm.size_bits() == 16 {
        buf.push(0x66);
    }

    let need = needs_rex(w, r, false, b) || rm.needs_rex_byte() || reg.needs_rex_byte();
    if need {
        if rm.is_high_byte() {
            return Err(high_byte_err(rm));
        }
        if reg.is_high_byte() {
            return Err(high_byte_err(reg));
        }
        buf.push(rex(w, r, false, b));
    }
    Ok(())
}

/// Emit the 0x66 operand-size override and REX prefix for a reg,mem form.
fn emit_rex_rm<R: GpReg>(buf: &mut InstrBytes, reg: R, mem: &Mem) -> Result<(), AsmError> {
    let w = reg.size_bits() == 64;
    let r = reg.is_extended();
    let x = mem.index.is_some_and(|(i, _)| i.is_extended());
    let b = mem.base.is_some_and(|b| b.is_extended());

    if reg.size_bits() == 16 {
        buf.push(0x66);
    }

    let need = needs_rex(w, r, x, b) || reg.needs_rex_byte();
    if need {
        if reg.is_high_byte() {
            return Err(high_byte_err(reg));
        }
        buf.push(rex(w, r, x, b));
    }
    Ok(())
}

// ─── ModR/M + SIB + displacement layout ────────────────────

/// Emit ModR/M, optional SIB, and displacement bytes for a memory operand.
///
/// Returns the buffer offset of the displacement field when one was
/// emitted, so label-relative forms know where to patch.
///
/// Two decoder quirks are handled here:
///
/// * A base whose low 3 bits are 4 (RSP, R12) collides with the "SIB byte
///   follows" marker, so a redundant SIB byte with index=4 ("none") is
///   emitted even when no index register was requested.
/// * A base whose low 3 bits are 5 (RBP, R13) in mod=00 form would be
///   decoded as RIP-relative/no-base addressing, so a zero displacement is
///   widened to the mod=01 disp8=0 form instead.
pub(crate) fn emit_mem_modrm(
    buf: &mut InstrBytes,
    reg_field: u8,
    mem: &Mem,
) -> Result<Option<usize>, AsmError> {
    // RSP's index code (4) means "no index" in the SIB byte; R12 is fine
    // because REX.X disambiguates it.
    if let Some((idx, _)) = mem.index {
        if idx == Reg64::Rsp {
            return Err(AsmError::RspIndex);
        }
    }

    // RIP-relative: [rip + disp32].  The form has no SIB byte, so an
    // index register is inexpressible.
    if mem.rip {
        if mem.index.is_some() {
            return Err(AsmError::RipIndex);
        }
        buf.push(modrm(0b00, reg_field, 0b101));
        let disp_off = buf.len();
        buf.extend_from_slice(&mem.disp.to_le_bytes());
        return Ok(Some(disp_off));
    }

    let base = match (mem.base, mem.index) {
        // Absolute [disp32]: in 64-bit mode mod=00 rm=101 means
        // RIP-relative, so absolute addressing needs a base-less SIB byte.
        (None, None) => {
            buf.push(modrm(0b00, reg_field, 0b100));
            buf.push(sib(0, 0b100, 0b101));
            let disp_off = buf.len();
            buf.extend_from_slice(&mem.disp.to_le_bytes());
            return Ok(Some(disp_off));
        }
        // [index*scale + disp32] with no base: mod=00, SIB base=101.
        (None, Some((idx, scale))) => {
            buf.push(modrm(0b00, reg_field, 0b100));
            buf.push(sib(scale.bits(), idx.code(), 0b101));
            let disp_off = buf.len();
            buf.extend_from_slice(&mem.disp.to_le_bytes());
            return Ok(Some(disp_off));
        }
        (Some(base), _) => base,
    };

    let need_sib = mem.index.is_some() || base.code() & 7 == 4;

    let (mod_bits, disp_size) = if mem.disp == 0 && base.code() & 7 != 5 {
        (0b00, 0)
    } else if (-128..=127).contains(&mem.disp) {
        (0b01, 1)
    } else {
        (0b10, 4)
    };

    if need_sib {
        let (idx_code, scale_bits) = match mem.index {
            Some((idx, scale)) => (idx.code(), scale.bits()),
            None => (0b100, 0), // index=4: none
        };
        buf.push(modrm(mod_bits, reg_field, 0b100));
        buf.push(sib(scale_bits, idx_code, base.code()));
    } else {
        buf.push(modrm(mod_bits, reg_field, base.code()));
    }

    let disp_off = if disp_size > 0 { Some(buf.len()) } else { None };
    match disp_size {
        1 => buf.push(mem.disp as i8 as u8),
        4 => buf.extend_from_slice(&mem.disp.to_le_bytes()),
        _ => {}
    }
    Ok(disp_off)
}

// ─── General-purpose shapes ────────────────────────────────

/// reg,reg form: [66] [REX] opcode ModRM(11, reg, rm).
pub(crate) fn encode_rr<R: GpReg>(
    buf: &mut InstrBytes,
    opcode: &[u8],
    rm: R,
    reg: R,
) -> Result<(), AsmError> {
    emit_rex_rr(buf, rm, reg)?;
    buf.extend_from_slice(opcode);
    buf.push(modrm(0b11, reg.code(), rm.code()));
    Ok(())
}

/// reg,mem form: [66] [REX] opcode ModRM [SIB] [disp].
///
/// The same layout serves both load and store direction; the opcode byte
/// decides which operand is the source.
pub(crate) fn encode_rm<R: GpReg>(
    buf: &mut InstrBytes,
    opcode: &[u8],
    reg: R,
    mem: &Mem,
) -> Result<Option<usize>, AsmError> {
    emit_rex_rm(buf, reg, mem)?;
    buf.extend_from_slice(opcode);
    emit_mem_modrm(buf, reg.code(), mem)
}

/// Mixed-width reg,reg form (movzx/movsx/cmovcc/imul): `reg` is the
/// destination in ModR/M.reg and decides operand size, `rm` is the source.
pub(crate) fn encode_ext_rr<D: GpReg, S: GpReg>(
    buf: &mut InstrBytes,
    opcode: &[u8],
    reg: D,
    rm: S,
) -> Result<(), AsmError> {
    let w = reg.size_bits() == 64;
    let r = reg.is_extended();
    let b = rm.is_extended();

    if reg.size_bits() == 16 {
        buf.push(0x66);
    }

    let need = needs_rex(w, r, false, b) || rm.needs_rex_byte();
    if need {
        if rm.is_high_byte() {
            return Err(high_byte_err(rm));
        }
        buf.push(rex(w, r, false, b));
    }

    buf.extend_from_slice(opcode);
    buf.push(modrm(0b11, reg.code(), rm.code()));
    Ok(())
}

/// /digit with a register r/m: [66] [REX] opcode ModRM(11, digit, rm).
pub(crate) fn encode_digit_rr<R: GpReg>(
    buf: &mut InstrBytes,
    opcode: &[u8],
    digit: u8,
    rm: R,
) -> Result<(), AsmError> {
    let w = rm.size_bits() == 64;
    let b = rm.is_extended();

    if rm.size_bits() == 16 {
        buf.push(0x66);
    }

    let need = needs_rex(w, false, false, b) || rm.needs_rex_byte();
    if need {
        if rm.is_high_byte() {
            return Err(high_byte_err(rm));
        }
        buf.push(rex(w, false, false, b));
    }

    buf.extend_from_slice(opcode);
    buf.push(modrm(0b11, digit, rm.code()));
    Ok(())
}

/// /digit with a 64-bit register r/m for default-64 instructions
/// (call/jmp/push/pop): REX carries only B, never W.
pub(crate) fn encode_digit_r64_no_w(
    buf: &mut InstrBytes,
    opcode: &[u8],
    digit: u8,
    rm: Reg64,
) -> Result<(), AsmError> {
    if rm.is_extended() {
        buf.push(rex(false, false, false, true));
    }
    buf.extend_from_slice(opcode);
    buf.push(modrm(0b11, digit, rm.code()));
    Ok(())
}

/// /digit with a memory r/m: [66] [REX] opcode ModRM [SIB] [disp].
///
/// `size_bits` selects the operand-size prefixes: 16 adds 0x66, 64 adds
/// REX.W, 0 means "no operand-size effect" (push/pop/call/jmp default to
/// 64-bit operand size without REX.W).
pub(crate) fn encode_digit_m(
    buf: &mut InstrBytes,
    size_bits: u8,
    opcode: &[u8],
    digit: u8,
    mem: &Mem,
) -> Result<Option<usize>, AsmError> {
    let w = size_bits == 64;
    let x = mem.index.is_some_and(|(i, _)| i.is_extended());
    let b = mem.base.is_some_and(|b| b.is_extended());

    if size_bits == 16 {
        buf.push(0x66);
    }
    if needs_rex(w, false, x, b) {
        buf.push(rex(w, false, x, b));
    }

    buf.extend_from_slice(opcode);
    emit_mem_modrm(buf, digit, mem)
}

/// Register folded into the opcode byte (push/pop/mov-imm forms): the low
/// 3 bits of the register are added to `base_opcode`, bit 3 travels in
/// REX.B.
pub(crate) fn encode_opreg<R: GpReg>(
    buf: &mut InstrBytes,
    base_opcode: u8,
    rex_w: bool,
    reg: R,
) -> Result<(), AsmError> {
    let b = reg.is_extended();

    if reg.size_bits() == 16 {
        buf.push(0x66);
    }

    let need = needs_rex(rex_w, false, false, b) || reg.needs_rex_byte();
    if need {
        if reg.is_high_byte() {
            return Err(high_byte_err(reg));
        }
        buf.push(rex(rex_w, false, false, b));
    }

    buf.push(base_opcode + (reg.code() & 7));
    Ok(())
}

// ─── SSE shapes ────────────────────────────────────────────

/// SSE reg,reg form: [prefix] [REX] opcode ModRM(11, reg, rm).
///
/// `prefix` is the mandatory instruction-selection byte (0x66/0xF2/0xF3),
/// or 0 for none.  It precedes REX.  No high-byte registers can reach this
/// shape, so it is infallible.
pub(crate) fn encode_sse_rr<D: RegCode, S: RegCode>(
    buf: &mut InstrBytes,
    prefix: u8,
    opcode: &[u8],
    rex_w: bool,
    reg: D,
    rm: S,
) {
    if prefix != 0 {
        buf.push(prefix);
    }
    let r = reg.is_extended();
    let b = rm.is_extended();
    if needs_rex(rex_w, r, false, b) {
        buf.push(rex(rex_w, r, false, b));
    }
    buf.extend_from_slice(opcode);
    buf.push(modrm(0b11, reg.code(), rm.code()));
}

/// SSE reg,mem form: [prefix] [REX] opcode ModRM [SIB] [disp].
pub(crate) fn encode_sse_rm<D: RegCode>(
    buf: &mut InstrBytes,
    prefix: u8,
    opcode: &[u8],
    rex_w: bool,
    reg: D,
    mem: &Mem,
) -> Result<Option<usize>, AsmError> {
    if prefix != 0 {
        buf.push(prefix);
    }
    let r = reg.is_extended();
    let x = mem.index.is_some_and(|(i, _)| i.is_extended());
    let b = mem.base.is_some_and(|b| b.is_extended());
    if needs_rex(rex_w, r, x, b) {
        buf.push(rex(rex_w, r, x, b));
    }
    buf.extend_from_slice(opcode);
    emit_mem_modrm(buf, reg.code(), mem)
}
