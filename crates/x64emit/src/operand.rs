//! Typed operand model: registers, scale factors, condition codes,
//! comparison predicates, and memory operands.
//!
//! Register widths are separate closed enums so that an instruction's
//! operand shape is fixed by its method signature.  Requesting a mnemonic
//! with an operand combination the ISA does not support is a compile error,
//! not a runtime check.
//!
//! Each register carries a 0-15 encoding index ([`Reg64::code`] etc.).
//! Only the low 3 bits ever land in a ModR/M or SIB field; bit 3 travels
//! exclusively in the REX prefix.

use core::fmt;

// ─── General-purpose registers ─────────────────────────────

/// 64-bit general-purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Reg64 {
    /// RAX — accumulator.
    Rax = 0,
    /// RCX — counter.
    Rcx = 1,
    /// RDX — data.
    Rdx = 2,
    /// RBX — base.
    Rbx = 3,
    /// RSP — stack pointer.
    Rsp = 4,
    /// RBP — frame pointer.
    Rbp = 5,
    /// RSI — source index.
    Rsi = 6,
    /// RDI — destination index.
    Rdi = 7,
    /// Extended register (requires REX.B/R/X).
    R8 = 8,
    /// Extended register.
    R9 = 9,
    /// Extended register.
    R10 = 10,
    /// Extended register.
    R11 = 11,
    /// Extended register.
    R12 = 12,
    /// Extended register.
    R13 = 13,
    /// Extended register.
    R14 = 14,
    /// Extended register.
    R15 = 15,
}

/// 32-bit general-purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg32 {
    Eax = 0,
    Ecx = 1,
    Edx = 2,
    Ebx = 3,
    Esp = 4,
    Ebp = 5,
    Esi = 6,
    Edi = 7,
    R8d = 8,
    R9d = 9,
    R10d = 10,
    R11d = 11,
    R12d = 12,
    R13d = 13,
    R14d = 14,
    R15d = 15,
}

/// 16-bit general-purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg16 {
    Ax = 0,
    Cx = 1,
    Dx = 2,
    Bx = 3,
    Sp = 4,
    Bp = 5,
    Si = 6,
    Di = 7,
    R8w = 8,
    R9w = 9,
    R10w = 10,
    R11w = 11,
    R12w = 12,
    R13w = 13,
    R14w = 14,
    R15w = 15,
}

/// 8-bit general-purpose register.
///
/// The four legacy high-byte aliases (AH, CH, DH, BH) share encoding
/// indexes 4-7 with SPL, BPL, SIL and DIL.  The decoder disambiguates on
/// the *presence* of a REX prefix: with REX the codes mean SPL/BPL/SIL/DIL,
/// without it they mean AH/CH/DH/BH.  Combining a high-byte alias with any
/// operand that forces REX is therefore an encoding error
/// ([`crate::AsmError::HighByteRex`]), not a valid instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Reg8 {
    Al,
    Cl,
    Dl,
    Bl,
    /// Requires a REX prefix (even with all flag bits clear).
    Spl,
    /// Requires a REX prefix.
    Bpl,
    /// Requires a REX prefix.
    Sil,
    /// Requires a REX prefix.
    Dil,
    R8b,
    R9b,
    R10b,
    R11b,
    R12b,
    R13b,
    R14b,
    R15b,
    /// Legacy high-byte alias of AX bits 8-15. Incompatible with REX.
    Ah,
    /// Legacy high-byte alias. Incompatible with REX.
    Ch,
    /// Legacy high-byte alias. Incompatible with REX.
    Dh,
    /// Legacy high-byte alias. Incompatible with REX.
    Bh,
}

/// 128-bit SSE vector register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Xmm {
    Xmm0 = 0,
    Xmm1 = 1,
    Xmm2 = 2,
    Xmm3 = 3,
    Xmm4 = 4,
    Xmm5 = 5,
    Xmm6 = 6,
    Xmm7 = 7,
    Xmm8 = 8,
    Xmm9 = 9,
    Xmm10 = 10,
    Xmm11 = 11,
    Xmm12 = 12,
    Xmm13 = 13,
    Xmm14 = 14,
    Xmm15 = 15,
}

impl Reg64 {
    /// The 4-bit register encoding index (0-15).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the register needs REX.B/R/X (encoding index ≥ 8).
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= 8
    }
}

impl Reg32 {
    /// The 4-bit register encoding index (0-15).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the register needs REX.B/R/X (encoding index ≥ 8).
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= 8
    }
}

impl Reg16 {
    /// The 4-bit register encoding index (0-15).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the register needs REX.B/R/X (encoding index ≥ 8).
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= 8
    }
}

impl Reg8 {
    /// The 4-bit register encoding index (0-15).
    ///
    /// High-byte aliases share indexes 4-7 with SPL/BPL/SIL/DIL; the REX
    /// prefix (or its absence) selects which set the decoder sees.
    pub fn code(self) -> u8 {
        use Reg8::*;
        match self {
            Al => 0,
            Cl => 1,
            Dl => 2,
            Bl => 3,
            Spl | Ah => 4,
            Bpl | Ch => 5,
            Sil | Dh => 6,
            Dil | Bh => 7,
            R8b => 8,
            R9b => 9,
            R10b => 10,
            R11b => 11,
            R12b => 12,
            R13b => 13,
            R14b => 14,
            R15b => 15,
        }
    }

    /// Whether the register needs REX.B/R (encoding index ≥ 8).
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= 8 && !self.is_high_byte()
    }

    /// Whether this is a legacy high-byte alias (AH, CH, DH, BH).
    #[inline]
    pub fn is_high_byte(self) -> bool {
        use Reg8::*;
        matches!(self, Ah | Ch | Dh | Bh)
    }

    /// Whether this register is addressable only with a REX prefix present
    /// (SPL, BPL, SIL, DIL), even when every REX flag bit is zero.
    #[inline]
    pub fn needs_rex(self) -> bool {
        use Reg8::*;
        matches!(self, Spl | Bpl | Sil | Dil)
    }
}

impl Xmm {
    /// The 4-bit register encoding index (0-15).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the register needs REX.B/R/X (encoding index ≥ 8).
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= 8
    }
}

impl fmt::Display for Reg64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 16] = [
            "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11",
            "r12", "r13", "r14", "r15",
        ];
        f.write_str(NAMES[self.code() as usize])
    }
}

impl fmt::Display for Reg32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 16] = [
            "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi", "r8d", "r9d", "r10d", "r11d",
            "r12d", "r13d", "r14d", "r15d",
        ];
        f.write_str(NAMES[self.code() as usize])
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 16] = [
            "ax", "cx", "dx", "bx", "sp", "bp", "si", "di", "r8w", "r9w", "r10w", "r11w", "r12w",
            "r13w", "r14w", "r15w",
        ];
        f.write_str(NAMES[self.code() as usize])
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Reg8::*;
        f.write_str(match self {
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Spl => "spl",
            Bpl => "bpl",
            Sil => "sil",
            Dil => "dil",
            R8b => "r8b",
            R9b => "r9b",
            R10b => "r10b",
            R11b => "r11b",
            R12b => "r12b",
            R13b => "r13b",
            R14b => "r14b",
            R15b => "r15b",
            Ah => "ah",
            Ch => "ch",
            Dh => "dh",
            Bh => "bh",
        })
    }
}

impl fmt::Display for Xmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xmm{}", self.code())
    }
}

// ─── Scale factor ──────────────────────────────────────────

/// Scaled-index multiplier for SIB addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Scale {
    /// ×1.
    #[default]
    X1 = 0,
    /// ×2.
    X2 = 1,
    /// ×4.
    X4 = 2,
    /// ×8.
    X8 = 3,
}

impl Scale {
    /// The 2-bit SIB scale field value.
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

// ─── Condition codes ───────────────────────────────────────

/// Condition code for `jcc`, `setcc` and `cmovcc`.
///
/// The 4-bit value is added to the family's base opcode (0x70+cc for short
/// jumps, 0x0F 0x80+cc for near jumps, 0x0F 0x90+cc for setcc, 0x0F 0x40+cc
/// for cmovcc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Cond {
    /// Overflow (OF=1).
    O = 0,
    /// No overflow.
    No = 1,
    /// Below (unsigned, CF=1).
    B = 2,
    /// Above or equal (unsigned).
    Ae = 3,
    /// Equal (ZF=1).
    E = 4,
    /// Not equal.
    Ne = 5,
    /// Below or equal (unsigned).
    Be = 6,
    /// Above (unsigned).
    A = 7,
    /// Sign (SF=1).
    S = 8,
    /// No sign.
    Ns = 9,
    /// Parity even.
    P = 10,
    /// Parity odd.
    Np = 11,
    /// Less (signed).
    L = 12,
    /// Greater or equal (signed).
    Ge = 13,
    /// Less or equal (signed).
    Le = 14,
    /// Greater (signed).
    G = 15,
}

impl Cond {
    /// The 4-bit condition code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

// ─── SSE comparison predicates ─────────────────────────────

/// Comparison predicate for `cmpps`/`cmppd`/`cmpss`/`cmpsd`.
///
/// The ordinal is emitted verbatim as the trailing immediate byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CmpPredicate {
    /// Equal (ordered, non-signaling).
    Eq = 0,
    /// Less-than (ordered, signaling).
    Lt = 1,
    /// Less-than-or-equal (ordered, signaling).
    Le = 2,
    /// Unordered (non-signaling).
    Unord = 3,
    /// Not-equal (unordered, non-signaling).
    Neq = 4,
    /// Not-less-than (unordered, signaling).
    Nlt = 5,
    /// Not-less-than-or-equal (unordered, signaling).
    Nle = 6,
    /// Ordered (non-signaling).
    Ord = 7,
}

impl CmpPredicate {
    /// The immediate byte value.
    #[inline]
    pub fn imm(self) -> u8 {
        self as u8
    }
}

// ─── Memory operands ───────────────────────────────────────

/// A memory operand: `[base + index*scale + disp]`, `[rip + disp]`, or an
/// absolute `[disp32]`.
///
/// Construction is total and side-effect-free.  The one combination the
/// hardware cannot express, RSP as an index register, is rejected when the
/// operand is encoded ([`crate::AsmError::RspIndex`]), since index code 4
/// in the SIB byte means "no index".
///
/// ```rust
/// use x64emit::{Mem, Reg64, Scale};
///
/// let m = Mem::base(Reg64::Rbx).index(Reg64::Rcx, Scale::X4).disp(8);
/// let rip = Mem::rip(0x100);
/// # let _ = (m, rip);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mem {
    pub(crate) base: Option<Reg64>,
    pub(crate) index: Option<(Reg64, Scale)>,
    pub(crate) disp: i32,
    pub(crate) rip: bool,
}

impl Mem {
    /// `[base]` register-indirect addressing.
    pub fn base(base: Reg64) -> Self {
        Self {
            base: Some(base),
            index: None,
            disp: 0,
            rip: false,
        }
    }

    /// `[index*scale + disp32]` with no base register.
    pub fn index_only(index: Reg64, scale: Scale) -> Self {
        Self {
            base: None,
            index: Some((index, scale)),
            disp: 0,
            rip: false,
        }
    }

    /// `[rip + disp32]` RIP-relative addressing.
    pub fn rip(disp: i32) -> Self {
        Self {
            base: None,
            index: None,
            disp,
            rip: true,
        }
    }

    /// Absolute `[disp32]` addressing (encoded via a base-less SIB byte).
    pub fn abs(disp: i32) -> Self {
        Self {
            base: None,
            index: None,
            disp,
            rip: false,
        }
    }

    /// Add a scaled index register.
    pub fn index(mut self, index: Reg64, scale: Scale) -> Self {
        self.index = Some((index, scale));
        self
    }

    /// Set the displacement.
    pub fn disp(mut self, disp: i32) -> Self {
        self.disp = disp;
        self
    }
}
