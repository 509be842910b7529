//! The public per-mnemonic instruction surface.
//!
//! Every method is a pure dispatcher: it hands literal opcode bytes and
//! /digit constants to the one primitive encoder matching its operand-type
//! signature, then appends the encoded bytes as a fragment.  No method has
//! encoding logic of its own.  Method names follow `mnemonic_shape`
//! (`add_r64_r64`, `mov_m_r32`, `cmp_r64_i32`), so each name fixes both
//! the mnemonic and the operand shape at compile time.
//!
//! The repetitive families (ALU group, unary group, shifts, inc/dec, SSE
//! binops) are generated from opcode tables via `macro_rules!`.

use crate::assembler::{Assembler, Label};
use crate::buffer::InstrBytes;
use crate::encode::{
    encode_digit_m, encode_digit_r64_no_w, encode_digit_rr, encode_ext_rr, encode_opreg,
    encode_rm, encode_rr, encode_sse_rm, encode_sse_rr, GpReg,
};
use crate::error::AsmError;
use crate::operand::{CmpPredicate, Cond, Mem, Reg16, Reg32, Reg64, Reg8, Xmm};

// ─── Immediate helpers ─────────────────────────────────────

/// ALU r/m, imm: 0x80 /d ib for 8-bit, otherwise 0x81 /d with a full-width
/// immediate, shrunk to 0x83 /d ib when the value fits a sign-extended
/// byte.  The shrink is value-driven and deterministic.
fn alu_rr_imm<R: GpReg>(
    buf: &mut InstrBytes,
    digit: u8,
    rm: R,
    imm: i32,
) -> Result<(), AsmError> {
    if rm.size_bits() == 8 {
        encode_digit_rr(buf, &[0x80], digit, rm)?;
        buf.push(imm as u8);
    } else if (-128..=127).contains(&imm) {
        encode_digit_rr(buf, &[0x83], digit, rm)?;
        buf.push(imm as i8 as u8);
    } else {
        encode_digit_rr(buf, &[0x81], digit, rm)?;
        push_imm(buf, rm.size_bits(), imm);
    }
    Ok(())
}

/// ALU mem, imm counterpart of [`alu_rr_imm`].
fn alu_m_imm(
    buf: &mut InstrBytes,
    size_bits: u8,
    digit: u8,
    mem: Mem,
    imm: i32,
) -> Result<(), AsmError> {
    if size_bits == 8 {
        encode_digit_m(buf, 8, &[0x80], digit, &mem)?;
        buf.push(imm as u8);
    } else if (-128..=127).contains(&imm) {
        encode_digit_m(buf, size_bits, &[0x83], digit, &mem)?;
        buf.push(imm as i8 as u8);
    } else {
        encode_digit_m(buf, size_bits, &[0x81], digit, &mem)?;
        push_imm(buf, size_bits, imm);
    }
    Ok(())
}

/// Emit an immediate of the operand's width (16 or 32 bits), LSB first.
fn push_imm(buf: &mut InstrBytes, size_bits: u8, imm: i32) {
    if size_bits == 16 {
        buf.extend_from_slice(&(imm as i16).to_le_bytes());
    } else {
        buf.extend_from_slice(&imm.to_le_bytes());
    }
}

// ─── Family generators ─────────────────────────────────────

/// The eight-member ALU group shares one opcode pattern: the /digit is the
/// group member, the opcode byte is `digit*8` plus the direction/width
/// selector, and the immediate forms are the 0x80/0x81/0x83 group.
macro_rules! alu_family {
    (
        $digit:expr,
        $r64_r64:ident, $r32_r32:ident, $r16_r16:ident, $r8_r8:ident,
        $r64_m:ident, $r32_m:ident, $r16_m:ident, $r8_m:ident,
        $m_r64:ident, $m_r32:ident, $m_r16:ident, $m_r8:ident,
        $r64_i32:ident, $r32_i32:ident, $r16_i16:ident, $r8_i8:ident,
        $m64_i32:ident, $m32_i32:ident, $m16_i16:ident, $m8_i8:ident
    ) => {
        /// reg64, reg64.
        pub fn $r64_r64(&mut self, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
            self.fixed(|b| encode_rr(b, &[$digit * 8 + 1], dst, src))
        }

        /// reg32, reg32.
        pub fn $r32_r32(&mut self, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
            self.fixed(|b| encode_rr(b, &[$digit * 8 + 1], dst, src))
        }

        /// reg16, reg16.
        pub fn $r16_r16(&mut self, dst: Reg16, src: Reg16) -> Result<(), AsmError> {
            self.fixed(|b| encode_rr(b, &[$digit * 8 + 1], dst, src))
        }

        /// reg8, reg8.
        pub fn $r8_r8(&mut self, dst: Reg8, src: Reg8) -> Result<(), AsmError> {
            self.fixed(|b| encode_rr(b, &[$digit * 8], dst, src))
        }

        /// reg64, mem64.
        pub fn $r64_m(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 3], dst, &src).map(|_| ()))
        }

        /// reg32, mem32.
        pub fn $r32_m(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 3], dst, &src).map(|_| ()))
        }

        /// reg16, mem16.
        pub fn $r16_m(&mut self, dst: Reg16, src: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 3], dst, &src).map(|_| ()))
        }

        /// reg8, mem8.
        pub fn $r8_m(&mut self, dst: Reg8, src: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 2], dst, &src).map(|_| ()))
        }

        /// mem64, reg64.
        pub fn $m_r64(&mut self, dst: Mem, src: Reg64) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 1], src, &dst).map(|_| ()))
        }

        /// mem32, reg32.
        pub fn $m_r32(&mut self, dst: Mem, src: Reg32) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 1], src, &dst).map(|_| ()))
        }

        /// mem16, reg16.
        pub fn $m_r16(&mut self, dst: Mem, src: Reg16) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8 + 1], src, &dst).map(|_| ()))
        }

        /// mem8, reg8.
        pub fn $m_r8(&mut self, dst: Mem, src: Reg8) -> Result<(), AsmError> {
            self.fixed(|b| encode_rm(b, &[$digit * 8], src, &dst).map(|_| ()))
        }

        /// reg64, imm32 (sign-extended; shrunk to imm8 when it fits).
        pub fn $r64_i32(&mut self, dst: Reg64, imm: i32) -> Result<(), AsmError> {
            self.fixed(|b| alu_rr_imm(b, $digit, dst, imm))
        }

        /// reg32, imm32 (shrunk to imm8 when it fits).
        pub fn $r32_i32(&mut self, dst: Reg32, imm: i32) -> Result<(), AsmError> {
            self.fixed(|b| alu_rr_imm(b, $digit, dst, imm))
        }

        /// reg16, imm16 (shrunk to imm8 when it fits).
        pub fn $r16_i16(&mut self, dst: Reg16, imm: i16) -> Result<(), AsmError> {
            self.fixed(|b| alu_rr_imm(b, $digit, dst, i32::from(imm)))
        }

        /// reg8, imm8.
        pub fn $r8_i8(&mut self, dst: Reg8, imm: i8) -> Result<(), AsmError> {
            self.fixed(|b| alu_rr_imm(b, $digit, dst, i32::from(imm)))
        }

        /// mem64, imm32 (sign-extended; shrunk to imm8 when it fits).
        pub fn $m64_i32(&mut self, dst: Mem, imm: i32) -> Result<(), AsmError> {
            self.fixed(|b| alu_m_imm(b, 64, $digit, dst, imm))
        }

        /// mem32, imm32 (shrunk to imm8 when it fits).
        pub fn $m32_i32(&mut self, dst: Mem, imm: i32) -> Result<(), AsmError> {
            self.fixed(|b| alu_m_imm(b, 32, $digit, dst, imm))
        }

        /// mem16, imm16 (shrunk to imm8 when it fits).
        pub fn $m16_i16(&mut self, dst: Mem, imm: i16) -> Result<(), AsmError> {
            self.fixed(|b| alu_m_imm(b, 16, $digit, dst, i32::from(imm)))
        }

        /// mem8, imm8.
        pub fn $m8_i8(&mut self, dst: Mem, imm: i8) -> Result<(), AsmError> {
            self.fixed(|b| alu_m_imm(b, 8, $digit, dst, i32::from(imm)))
        }
    };
}

/// F7/F6 /digit unary group (not/neg/mul/imul/div/idiv) and the FF/FE
/// inc/dec pair, over register and memory r/m of every width.
macro_rules! unary_family {
    (
        $opc_wide:expr, $opc_byte:expr, $digit:expr,
        $r64:ident, $r32:ident, $r16:ident, $r8:ident,
        $m64:ident, $m32:ident, $m16:ident, $m8:ident
    ) => {
        /// reg64 operand.
        pub fn $r64(&mut self, rm: Reg64) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[$opc_wide], $digit, rm))
        }

        /// reg32 operand.
        pub fn $r32(&mut self, rm: Reg32) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[$opc_wide], $digit, rm))
        }

        /// reg16 operand.
        pub fn $r16(&mut self, rm: Reg16) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[$opc_wide], $digit, rm))
        }

        /// reg8 operand.
        pub fn $r8(&mut self, rm: Reg8) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[$opc_byte], $digit, rm))
        }

        /// mem64 operand.
        pub fn $m64(&mut self, rm: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_m(b, 64, &[$opc_wide], $digit, &rm).map(|_| ()))
        }

        /// mem32 operand.
        pub fn $m32(&mut self, rm: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_m(b, 32, &[$opc_wide], $digit, &rm).map(|_| ()))
        }

        /// mem16 operand.
        pub fn $m16(&mut self, rm: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_m(b, 16, &[$opc_wide], $digit, &rm).map(|_| ()))
        }

        /// mem8 operand.
        pub fn $m8(&mut self, rm: Mem) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_m(b, 8, &[$opc_byte], $digit, &rm).map(|_| ()))
        }
    };
}

/// C1/C0 /digit imm8 and D3/D2 /digit CL shift group.
macro_rules! shift_family {
    (
        $digit:expr,
        $r64_i8:ident, $r32_i8:ident, $r16_i8:ident, $r8_i8:ident,
        $r64_cl:ident, $r32_cl:ident, $r16_cl:ident, $r8_cl:ident
    ) => {
        /// reg64, imm8 shift count.
        pub fn $r64_i8(&mut self, rm: Reg64, imm: u8) -> Result<(), AsmError> {
            self.fixed(|b| {
                encode_digit_rr(b, &[0xC1], $digit, rm)?;
                b.push(imm);
                Ok(())
            })
        }

        /// reg32, imm8 shift count.
        pub fn $r32_i8(&mut self, rm: Reg32, imm: u8) -> Result<(), AsmError> {
            self.fixed(|b| {
                encode_digit_rr(b, &[0xC1], $digit, rm)?;
                b.push(imm);
                Ok(())
            })
        }

        /// reg16, imm8 shift count.
        pub fn $r16_i8(&mut self, rm: Reg16, imm: u8) -> Result<(), AsmError> {
            self.fixed(|b| {
                encode_digit_rr(b, &[0xC1], $digit, rm)?;
                b.push(imm);
                Ok(())
            })
        }

        /// reg8, imm8 shift count.
        pub fn $r8_i8(&mut self, rm: Reg8, imm: u8) -> Result<(), AsmError> {
            self.fixed(|b| {
                encode_digit_rr(b, &[0xC0], $digit, rm)?;
                b.push(imm);
                Ok(())
            })
        }

        /// reg64 shifted by CL.
        pub fn $r64_cl(&mut self, rm: Reg64) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[0xD3], $digit, rm))
        }

        /// reg32 shifted by CL.
        pub fn $r32_cl(&mut self, rm: Reg32) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[0xD3], $digit, rm))
        }

        /// reg16 shifted by CL.
        pub fn $r16_cl(&mut self, rm: Reg16) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[0xD3], $digit, rm))
        }

        /// reg8 shifted by CL.
        pub fn $r8_cl(&mut self, rm: Reg8) -> Result<(), AsmError> {
            self.fixed(|b| encode_digit_rr(b, &[0xD2], $digit, rm))
        }
    };
}

/// SSE binop with a mandatory prefix: xmm, xmm and xmm, mem forms.
macro_rules! sse_family {
    ($( $prefix:expr, $opc:expr, $rr:ident, $rm:ident; )*) => {
        $(
            /// xmm, xmm.
            pub fn $rr(&mut self, dst: Xmm, src: Xmm) -> Result<(), AsmError> {
                self.fixed(|b| {
                    encode_sse_rr(b, $prefix, &[0x0F, $opc], false, dst, src);
                    Ok(())
                })
            }

            /// xmm, mem.
            pub fn $rm(&mut self, dst: Xmm, src: Mem) -> Result<(), AsmError> {
                self.fixed(|b| {
                    encode_sse_rm(b, $prefix, &[0x0F, $opc], false, dst, &src).map(|_| ())
                })
            }
        )*
    };
}

impl Assembler {
    /// Encode one instruction into a fresh buffer and append it as a fixed
    /// fragment.  On error nothing is appended: a failed instruction emits
    /// zero bytes.
    fn fixed<F>(&mut self, f: F) -> Result<(), AsmError>
    where
        F: FnOnce(&mut InstrBytes) -> Result<(), AsmError>,
    {
        let mut buf = InstrBytes::new();
        f(&mut buf)?;
        self.push_fixed(buf);
        Ok(())
    }

    // ── ALU group ──────────────────────────────────────────

    alu_family!(
        0, add_r64_r64, add_r32_r32, add_r16_r16, add_r8_r8, add_r64_m, add_r32_m, add_r16_m,
        add_r8_m, add_m_r64, add_m_r32, add_m_r16, add_m_r8, add_r64_i32, add_r32_i32,
        add_r16_i16, add_r8_i8, add_m64_i32, add_m32_i32, add_m16_i16, add_m8_i8
    );
    alu_family!(
        1, or_r64_r64, or_r32_r32, or_r16_r16, or_r8_r8, or_r64_m, or_r32_m, or_r16_m, or_r8_m,
        or_m_r64, or_m_r32, or_m_r16, or_m_r8, or_r64_i32, or_r32_i32, or_r16_i16, or_r8_i8,
        or_m64_i32, or_m32_i32, or_m16_i16, or_m8_i8
    );
    alu_family!(
        2, adc_r64_r64, adc_r32_r32, adc_r16_r16, adc_r8_r8, adc_r64_m, adc_r32_m, adc_r16_m,
        adc_r8_m, adc_m_r64, adc_m_r32, adc_m_r16, adc_m_r8, adc_r64_i32, adc_r32_i32,
        adc_r16_i16, adc_r8_i8, adc_m64_i32, adc_m32_i32, adc_m16_i16, adc_m8_i8
    );
    alu_family!(
        3, sbb_r64_r64, sbb_r32_r32, sbb_r16_r16, sbb_r8_r8, sbb_r64_m, sbb_r32_m, sbb_r16_m,
        sbb_r8_m, sbb_m_r64, sbb_m_r32, sbb_m_r16, sbb_m_r8, sbb_r64_i32, sbb_r32_i32,
        sbb_r16_i16, sbb_r8_i8, sbb_m64_i32, sbb_m32_i32, sbb_m16_i16, sbb_m8_i8
    );
    alu_family!(
        4, and_r64_r64, and_r32_r32, and_r16_r16, and_r8_r8, and_r64_m, and_r32_m, and_r16_m,
        and_r8_m, and_m_r64, and_m_r32, and_m_r16, and_m_r8, and_r64_i32, and_r32_i32,
        and_r16_i16, and_r8_i8, and_m64_i32, and_m32_i32, and_m16_i16, and_m8_i8
    );
    alu_family!(
        5, sub_r64_r64, sub_r32_r32, sub_r16_r16, sub_r8_r8, sub_r64_m, sub_r32_m, sub_r16_m,
        sub_r8_m, sub_m_r64, sub_m_r32, sub_m_r16, sub_m_r8, sub_r64_i32, sub_r32_i32,
        sub_r16_i16, sub_r8_i8, sub_m64_i32, sub_m32_i32, sub_m16_i16, sub_m8_i8
    );
    alu_family!(
        6, xor_r64_r64, xor_r32_r32, xor_r16_r16, xor_r8_r8, xor_r64_m, xor_r32_m, xor_r16_m,
        xor_r8_m, xor_m_r64, xor_m_r32, xor_m_r16, xor_m_r8, xor_r64_i32, xor_r32_i32,
        xor_r16_i16, xor_r8_i8, xor_m64_i32, xor_m32_i32, xor_m16_i16, xor_m8_i8
    );
    alu_family!(
        7, cmp_r64_r64, cmp_r32_r32, cmp_r16_r16, cmp_r8_r8, cmp_r64_m, cmp_r32_m, cmp_r16_m,
        cmp_r8_m, cmp_m_r64, cmp_m_r32, cmp_m_r16, cmp_m_r8, cmp_r64_i32, cmp_r32_i32,
        cmp_r16_i16, cmp_r8_i8, cmp_m64_i32, cmp_m32_i32, cmp_m16_i16, cmp_m8_i8
    );

    // ── unary group, inc/dec ───────────────────────────────

    unary_family!(
        0xF7, 0xF6, 2, not_r64, not_r32, not_r16, not_r8, not_m64, not_m32, not_m16, not_m8
    );
    unary_family!(
        0xF7, 0xF6, 3, neg_r64, neg_r32, neg_r16, neg_r8, neg_m64, neg_m32, neg_m16, neg_m8
    );
    unary_family!(
        0xF7, 0xF6, 4, mul_r64, mul_r32, mul_r16, mul_r8, mul_m64, mul_m32, mul_m16, mul_m8
    );
    unary_family!(
        0xF7, 0xF6, 5, imul_r64, imul_r32, imul_r16, imul_r8, imul_m64, imul_m32, imul_m16,
        imul_m8
    );
    unary_family!(
        0xF7, 0xF6, 6, div_r64, div_r32, div_r16, div_r8, div_m64, div_m32, div_m16, div_m8
    );
    unary_family!(
        0xF7, 0xF6, 7, idiv_r64, idiv_r32, idiv_r16, idiv_r8, idiv_m64, idiv_m32, idiv_m16,
        idiv_m8
    );
    unary_family!(
        0xFF, 0xFE, 0, inc_r64, inc_r32, inc_r16, inc_r8, inc_m64, inc_m32, inc_m16, inc_m8
    );
    unary_family!(
        0xFF, 0xFE, 1, dec_r64, dec_r32, dec_r16, dec_r8, dec_m64, dec_m32, dec_m16, dec_m8
    );

    // ── shifts ─────────────────────────────────────────────

    shift_family!(
        0, rol_r64_i8, rol_r32_i8, rol_r16_i8, rol_r8_i8, rol_r64_cl, rol_r32_cl, rol_r16_cl,
        rol_r8_cl
    );
    shift_family!(
        1, ror_r64_i8, ror_r32_i8, ror_r16_i8, ror_r8_i8, ror_r64_cl, ror_r32_cl, ror_r16_cl,
        ror_r8_cl
    );
    shift_family!(
        4, shl_r64_i8, shl_r32_i8, shl_r16_i8, shl_r8_i8, shl_r64_cl, shl_r32_cl, shl_r16_cl,
        shl_r8_cl
    );
    shift_family!(
        5, shr_r64_i8, shr_r32_i8, shr_r16_i8, shr_r8_i8, shr_r64_cl, shr_r32_cl, shr_r16_cl,
        shr_r8_cl
    );
    shift_family!(
        7, sar_r64_i8, sar_r32_i8, sar_r16_i8, sar_r8_i8, sar_r64_cl, sar_r32_cl, sar_r16_cl,
        sar_r8_cl
    );

    // ── mov ────────────────────────────────────────────────

    /// `mov reg64, reg64`: REX.W 89 /r.
    pub fn mov_r64_r64(&mut self, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x89], dst, src))
    }

    /// `mov reg32, reg32`: 89 /r.
    pub fn mov_r32_r32(&mut self, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x89], dst, src))
    }

    /// `mov reg16, reg16`: 66 89 /r.
    pub fn mov_r16_r16(&mut self, dst: Reg16, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x89], dst, src))
    }

    /// `mov reg8, reg8`: 88 /r.
    pub fn mov_r8_r8(&mut self, dst: Reg8, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x88], dst, src))
    }

    /// `mov reg64, mem64`: REX.W 8B /r.
    pub fn mov_r64_m(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8B], dst, &src).map(|_| ()))
    }

    /// `mov reg32, mem32`: 8B /r.
    pub fn mov_r32_m(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8B], dst, &src).map(|_| ()))
    }

    /// `mov reg16, mem16`: 66 8B /r.
    pub fn mov_r16_m(&mut self, dst: Reg16, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8B], dst, &src).map(|_| ()))
    }

    /// `mov reg8, mem8`: 8A /r.
    pub fn mov_r8_m(&mut self, dst: Reg8, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8A], dst, &src).map(|_| ()))
    }

    /// `mov mem64, reg64`: REX.W 89 /r.
    pub fn mov_m_r64(&mut self, dst: Mem, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x89], src, &dst).map(|_| ()))
    }

    /// `mov mem32, reg32`: 89 /r.
    pub fn mov_m_r32(&mut self, dst: Mem, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x89], src, &dst).map(|_| ()))
    }

    /// `mov mem16, reg16`: 66 89 /r.
    pub fn mov_m_r16(&mut self, dst: Mem, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x89], src, &dst).map(|_| ()))
    }

    /// `mov mem8, reg8`: 88 /r.
    pub fn mov_m_r8(&mut self, dst: Mem, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x88], src, &dst).map(|_| ()))
    }

    /// `mov reg64, imm64` (movabs): REX.W B8+rd io.
    pub fn mov_r64_i64(&mut self, dst: Reg64, imm: i64) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_opreg(b, 0xB8, true, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov reg64, imm32` sign-extended: REX.W C7 /0 id.
    pub fn mov_r64_i32(&mut self, dst: Reg64, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_rr(b, &[0xC7], 0, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov reg32, imm32`: B8+rd id.
    pub fn mov_r32_i32(&mut self, dst: Reg32, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_opreg(b, 0xB8, false, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov reg16, imm16`: 66 B8+rd iw.
    pub fn mov_r16_i16(&mut self, dst: Reg16, imm: i16) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_opreg(b, 0xB8, false, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov reg8, imm8`: B0+rb ib.
    pub fn mov_r8_i8(&mut self, dst: Reg8, imm: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_opreg(b, 0xB0, false, dst)?;
            b.push(imm as u8);
            Ok(())
        })
    }

    /// `mov mem64, imm32` sign-extended: REX.W C7 /0 id.
    pub fn mov_m64_i32(&mut self, dst: Mem, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_m(b, 64, &[0xC7], 0, &dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov mem32, imm32`: C7 /0 id.
    pub fn mov_m32_i32(&mut self, dst: Mem, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_m(b, 32, &[0xC7], 0, &dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov mem16, imm16`: 66 C7 /0 iw.
    pub fn mov_m16_i16(&mut self, dst: Mem, imm: i16) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_m(b, 16, &[0xC7], 0, &dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `mov mem8, imm8`: C6 /0 ib.
    pub fn mov_m8_i8(&mut self, dst: Mem, imm: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_m(b, 8, &[0xC6], 0, &dst)?;
            b.push(imm as u8);
            Ok(())
        })
    }

    // ── widening moves ─────────────────────────────────────

    /// `movzx reg32, reg8`: 0F B6 /r.
    pub fn movzx_r32_r8(&mut self, dst: Reg32, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xB6], dst, src))
    }

    /// `movzx reg64, reg8`: REX.W 0F B6 /r.
    pub fn movzx_r64_r8(&mut self, dst: Reg64, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xB6], dst, src))
    }

    /// `movzx reg32, reg16`: 0F B7 /r.
    pub fn movzx_r32_r16(&mut self, dst: Reg32, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xB7], dst, src))
    }

    /// `movzx reg64, reg16`: REX.W 0F B7 /r.
    pub fn movzx_r64_r16(&mut self, dst: Reg64, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xB7], dst, src))
    }

    /// `movzx reg32, mem8`: 0F B6 /r.
    pub fn movzx_r32_m8(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xB6], dst, &src).map(|_| ()))
    }

    /// `movzx reg64, mem8`: REX.W 0F B6 /r.
    pub fn movzx_r64_m8(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xB6], dst, &src).map(|_| ()))
    }

    /// `movzx reg32, mem16`: 0F B7 /r.
    pub fn movzx_r32_m16(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xB7], dst, &src).map(|_| ()))
    }

    /// `movzx reg64, mem16`: REX.W 0F B7 /r.
    pub fn movzx_r64_m16(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xB7], dst, &src).map(|_| ()))
    }

    /// `movsx reg32, reg8`: 0F BE /r.
    pub fn movsx_r32_r8(&mut self, dst: Reg32, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xBE], dst, src))
    }

    /// `movsx reg64, reg8`: REX.W 0F BE /r.
    pub fn movsx_r64_r8(&mut self, dst: Reg64, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xBE], dst, src))
    }

    /// `movsx reg32, mem8`: 0F BE /r.
    pub fn movsx_r32_m8(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xBE], dst, &src).map(|_| ()))
    }

    /// `movsx reg64, mem8`: REX.W 0F BE /r.
    pub fn movsx_r64_m8(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xBE], dst, &src).map(|_| ()))
    }

    /// `movsx reg32, reg16`: 0F BF /r.
    pub fn movsx_r32_r16(&mut self, dst: Reg32, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xBF], dst, src))
    }

    /// `movsx reg64, reg16`: REX.W 0F BF /r.
    pub fn movsx_r64_r16(&mut self, dst: Reg64, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xBF], dst, src))
    }

    /// `movsxd reg64, reg32`: REX.W 63 /r.
    pub fn movsxd_r64_r32(&mut self, dst: Reg64, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x63], dst, src))
    }

    /// `movsxd reg64, mem32`: REX.W 63 /r.
    pub fn movsxd_r64_m32(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x63], dst, &src).map(|_| ()))
    }

    // ── test / xchg ────────────────────────────────────────

    /// `test reg64, reg64`: REX.W 85 /r.
    pub fn test_r64_r64(&mut self, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x85], dst, src))
    }

    /// `test reg32, reg32`: 85 /r.
    pub fn test_r32_r32(&mut self, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x85], dst, src))
    }

    /// `test reg16, reg16`: 66 85 /r.
    pub fn test_r16_r16(&mut self, dst: Reg16, src: Reg16) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x85], dst, src))
    }

    /// `test reg8, reg8`: 84 /r.
    pub fn test_r8_r8(&mut self, dst: Reg8, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x84], dst, src))
    }

    /// `test reg64, imm32`: REX.W F7 /0 id.
    pub fn test_r64_i32(&mut self, dst: Reg64, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_rr(b, &[0xF7], 0, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `test reg32, imm32`: F7 /0 id.
    pub fn test_r32_i32(&mut self, dst: Reg32, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_rr(b, &[0xF7], 0, dst)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `test reg8, imm8`: F6 /0 ib.
    pub fn test_r8_i8(&mut self, dst: Reg8, imm: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_digit_rr(b, &[0xF6], 0, dst)?;
            b.push(imm as u8);
            Ok(())
        })
    }

    /// `xchg reg64, reg64`: REX.W 87 /r.
    pub fn xchg_r64_r64(&mut self, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x87], dst, src))
    }

    /// `xchg reg32, reg32`: 87 /r.
    pub fn xchg_r32_r32(&mut self, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x87], dst, src))
    }

    /// `xchg reg8, reg8`: 86 /r.
    pub fn xchg_r8_r8(&mut self, dst: Reg8, src: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_rr(b, &[0x86], dst, src))
    }

    /// `xchg reg64, mem64`: REX.W 87 /r.
    pub fn xchg_r64_m(&mut self, reg: Reg64, mem: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x87], reg, &mem).map(|_| ()))
    }

    // ── imul (two- and three-operand) ──────────────────────

    /// `imul reg64, reg64`: REX.W 0F AF /r.
    pub fn imul_r64_r64(&mut self, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xAF], dst, src))
    }

    /// `imul reg32, reg32`: 0F AF /r.
    pub fn imul_r32_r32(&mut self, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0xAF], dst, src))
    }

    /// `imul reg64, mem64`: REX.W 0F AF /r.
    pub fn imul_r64_m(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0xAF], dst, &src).map(|_| ()))
    }

    /// `imul reg64, reg64, imm32`: REX.W 69 /r id.
    pub fn imul_r64_r64_i32(&mut self, dst: Reg64, src: Reg64, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_ext_rr(b, &[0x69], dst, src)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `imul reg32, reg32, imm32`: 69 /r id.
    pub fn imul_r32_r32_i32(&mut self, dst: Reg32, src: Reg32, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_ext_rr(b, &[0x69], dst, src)?;
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    // ── lea ────────────────────────────────────────────────

    /// `lea reg64, mem`: REX.W 8D /r.
    pub fn lea_r64_m(&mut self, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8D], dst, &src).map(|_| ()))
    }

    /// `lea reg32, mem`: 8D /r.
    pub fn lea_r32_m(&mut self, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x8D], dst, &src).map(|_| ()))
    }

    // ── push / pop ─────────────────────────────────────────

    /// `push reg64`: 50+rd (default 64-bit, no REX.W).
    pub fn push_r64(&mut self, reg: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_opreg(b, 0x50, false, reg))
    }

    /// `pop reg64`: 58+rd.
    pub fn pop_r64(&mut self, reg: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_opreg(b, 0x58, false, reg))
    }

    /// `push imm8` sign-extended: 6A ib.
    pub fn push_i8(&mut self, imm: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0x6A, imm as u8]);
            Ok(())
        })
    }

    /// `push imm32` sign-extended: 68 id.
    pub fn push_i32(&mut self, imm: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0x68);
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `push mem64`: FF /6.
    pub fn push_m(&mut self, mem: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_m(b, 0, &[0xFF], 6, &mem).map(|_| ()))
    }

    /// `pop mem64`: 8F /0.
    pub fn pop_m(&mut self, mem: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_m(b, 0, &[0x8F], 0, &mem).map(|_| ()))
    }

    // ── no-operand instructions ────────────────────────────

    /// `ret`: C3.
    pub fn ret(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xC3);
            Ok(())
        })
    }

    /// `ret imm16` (pop stack args): C2 iw.
    pub fn ret_i16(&mut self, imm: u16) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xC2);
            b.extend_from_slice(&imm.to_le_bytes());
            Ok(())
        })
    }

    /// `nop`: 90.
    pub fn nop(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0x90);
            Ok(())
        })
    }

    /// `int3` breakpoint: CC.
    pub fn int3(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xCC);
            Ok(())
        })
    }

    /// `hlt`: F4.
    pub fn hlt(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xF4);
            Ok(())
        })
    }

    /// `ud2` invalid-opcode trap: 0F 0B.
    pub fn ud2(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0x0F, 0x0B]);
            Ok(())
        })
    }

    /// `leave`: C9.
    pub fn leave(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xC9);
            Ok(())
        })
    }

    /// `cdq` sign-extend EAX into EDX: 99.
    pub fn cdq(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0x99);
            Ok(())
        })
    }

    /// `cqo` sign-extend RAX into RDX: REX.W 99.
    pub fn cqo(&mut self) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0x48, 0x99]);
            Ok(())
        })
    }

    // ── calls and jumps ────────────────────────────────────

    /// `call rel32` with a literal displacement: E8 cd.
    pub fn call_rel32(&mut self, rel: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xE8);
            b.extend_from_slice(&rel.to_le_bytes());
            Ok(())
        })
    }

    /// `call label`: E8 cd with the displacement patched at resolution.
    /// Only a 4-byte form exists, so this is a fixed-size fragment.
    pub fn call_label(&mut self, target: Label) -> Result<(), AsmError> {
        let bytes = InstrBytes::from_slice(&[0xE8, 0, 0, 0, 0]);
        self.push_patched(bytes, 1, target);
        Ok(())
    }

    /// `call reg64`: FF /2.
    pub fn call_r64(&mut self, reg: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_r64_no_w(b, &[0xFF], 2, reg))
    }

    /// `call mem64`: FF /2.
    pub fn call_m(&mut self, mem: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_m(b, 0, &[0xFF], 2, &mem).map(|_| ()))
    }

    /// `jmp rel8` with a literal displacement: EB cb.
    pub fn jmp_rel8(&mut self, rel: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0xEB, rel as u8]);
            Ok(())
        })
    }

    /// `jmp rel32` with a literal displacement: E9 cd.
    pub fn jmp_rel32(&mut self, rel: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.push(0xE9);
            b.extend_from_slice(&rel.to_le_bytes());
            Ok(())
        })
    }

    /// `jmp label`: emitted short (EB cb) and widened to E9 cd during
    /// resolution only if the target is out of rel8 range.
    pub fn jmp_label(&mut self, target: Label) -> Result<(), AsmError> {
        self.push_relaxable(
            InstrBytes::from_slice(&[0xEB, 0x00]),
            1,
            InstrBytes::from_slice(&[0xE9, 0, 0, 0, 0]),
            1,
            target,
        );
        Ok(())
    }

    /// `jmp reg64`: FF /4.
    pub fn jmp_r64(&mut self, reg: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_r64_no_w(b, &[0xFF], 4, reg))
    }

    /// `jmp mem64`: FF /4.
    pub fn jmp_m(&mut self, mem: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_m(b, 0, &[0xFF], 4, &mem).map(|_| ()))
    }

    /// `jcc rel8` with a literal displacement: 70+cc cb.
    pub fn jcc_rel8(&mut self, cc: Cond, rel: i8) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0x70 + cc.code(), rel as u8]);
            Ok(())
        })
    }

    /// `jcc rel32` with a literal displacement: 0F 80+cc cd.
    pub fn jcc_rel32(&mut self, cc: Cond, rel: i32) -> Result<(), AsmError> {
        self.fixed(|b| {
            b.extend_from_slice(&[0x0F, 0x80 + cc.code()]);
            b.extend_from_slice(&rel.to_le_bytes());
            Ok(())
        })
    }

    /// `jcc label`: emitted short (70+cc cb) and widened to 0F 80+cc cd
    /// during resolution only if the target is out of rel8 range.
    pub fn jcc(&mut self, cc: Cond, target: Label) -> Result<(), AsmError> {
        self.push_relaxable(
            InstrBytes::from_slice(&[0x70 + cc.code(), 0x00]),
            1,
            InstrBytes::from_slice(&[0x0F, 0x80 + cc.code(), 0, 0, 0, 0]),
            2,
            target,
        );
        Ok(())
    }

    // ── RIP-relative label operands ────────────────────────

    /// `lea reg64, [rip + label]`: REX.W 8D /r with the disp32 patched at
    /// resolution.
    pub fn lea_r64_label(&mut self, dst: Reg64, target: Label) -> Result<(), AsmError> {
        let mut buf = InstrBytes::new();
        let off = encode_rm(&mut buf, &[0x8D], dst, &Mem::rip(0))?;
        let off = off.unwrap_or(buf.len() - 4); // RIP form always has a disp32
        self.push_patched(buf, off, target);
        Ok(())
    }

    /// `mov reg64, [rip + label]` load: REX.W 8B /r with the disp32
    /// patched at resolution.
    pub fn mov_r64_mlabel(&mut self, dst: Reg64, target: Label) -> Result<(), AsmError> {
        let mut buf = InstrBytes::new();
        let off = encode_rm(&mut buf, &[0x8B], dst, &Mem::rip(0))?;
        let off = off.unwrap_or(buf.len() - 4);
        self.push_patched(buf, off, target);
        Ok(())
    }

    // ── conditional select / set ───────────────────────────

    /// `setcc reg8`: 0F 90+cc /0.
    pub fn setcc_r8(&mut self, cc: Cond, dst: Reg8) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_rr(b, &[0x0F, 0x90 + cc.code()], 0, dst))
    }

    /// `setcc mem8`: 0F 90+cc /0.
    pub fn setcc_m8(&mut self, cc: Cond, dst: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_digit_m(b, 8, &[0x0F, 0x90 + cc.code()], 0, &dst).map(|_| ()))
    }

    /// `cmovcc reg64, reg64`: REX.W 0F 40+cc /r.
    pub fn cmovcc_r64_r64(&mut self, cc: Cond, dst: Reg64, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0x40 + cc.code()], dst, src))
    }

    /// `cmovcc reg32, reg32`: 0F 40+cc /r.
    pub fn cmovcc_r32_r32(&mut self, cc: Cond, dst: Reg32, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| encode_ext_rr(b, &[0x0F, 0x40 + cc.code()], dst, src))
    }

    /// `cmovcc reg64, mem64`: REX.W 0F 40+cc /r.
    pub fn cmovcc_r64_m(&mut self, cc: Cond, dst: Reg64, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0x40 + cc.code()], dst, &src).map(|_| ()))
    }

    /// `cmovcc reg32, mem32`: 0F 40+cc /r.
    pub fn cmovcc_r32_m(&mut self, cc: Cond, dst: Reg32, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_rm(b, &[0x0F, 0x40 + cc.code()], dst, &src).map(|_| ()))
    }

    // ── SSE scalar arithmetic ──────────────────────────────

    sse_family!(
        0xF2, 0x58, addsd_xmm_xmm, addsd_xmm_m;
        0xF3, 0x58, addss_xmm_xmm, addss_xmm_m;
        0xF2, 0x5C, subsd_xmm_xmm, subsd_xmm_m;
        0xF3, 0x5C, subss_xmm_xmm, subss_xmm_m;
        0xF2, 0x59, mulsd_xmm_xmm, mulsd_xmm_m;
        0xF3, 0x59, mulss_xmm_xmm, mulss_xmm_m;
        0xF2, 0x5E, divsd_xmm_xmm, divsd_xmm_m;
        0xF3, 0x5E, divss_xmm_xmm, divss_xmm_m;
        0xF2, 0x51, sqrtsd_xmm_xmm, sqrtsd_xmm_m;
        0xF3, 0x51, sqrtss_xmm_xmm, sqrtss_xmm_m;
        0xF2, 0x5D, minsd_xmm_xmm, minsd_xmm_m;
        0xF2, 0x5F, maxsd_xmm_xmm, maxsd_xmm_m;
        0x66, 0x2E, ucomisd_xmm_xmm, ucomisd_xmm_m;
        0x00, 0x2E, ucomiss_xmm_xmm, ucomiss_xmm_m;
        0x66, 0x2F, comisd_xmm_xmm, comisd_xmm_m;
        0x00, 0x2F, comiss_xmm_xmm, comiss_xmm_m;
        0x00, 0x57, xorps_xmm_xmm, xorps_xmm_m;
        0x66, 0x57, xorpd_xmm_xmm, xorpd_xmm_m;
        0x00, 0x54, andps_xmm_xmm, andps_xmm_m;
        0x66, 0x54, andpd_xmm_xmm, andpd_xmm_m;
        0xF2, 0x5A, cvtsd2ss_xmm_xmm, cvtsd2ss_xmm_m;
        0xF3, 0x5A, cvtss2sd_xmm_xmm, cvtss2sd_xmm_m;
        0x00, 0x28, movaps_xmm_xmm, movaps_xmm_m;
        0x66, 0x28, movapd_xmm_xmm, movapd_xmm_m;
    );

    // ── SSE moves ──────────────────────────────────────────

    /// `movsd xmm, xmm`: F2 0F 10 /r.
    pub fn movsd_xmm_xmm(&mut self, dst: Xmm, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0x10], false, dst, src);
            Ok(())
        })
    }

    /// `movsd xmm, mem64` load: F2 0F 10 /r.
    pub fn movsd_xmm_m(&mut self, dst: Xmm, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0xF2, &[0x0F, 0x10], false, dst, &src).map(|_| ()))
    }

    /// `movsd mem64, xmm` store: F2 0F 11 /r.
    pub fn movsd_m_xmm(&mut self, dst: Mem, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0xF2, &[0x0F, 0x11], false, src, &dst).map(|_| ()))
    }

    /// `movss xmm, xmm`: F3 0F 10 /r.
    pub fn movss_xmm_xmm(&mut self, dst: Xmm, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0x10], false, dst, src);
            Ok(())
        })
    }

    /// `movss xmm, mem32` load: F3 0F 10 /r.
    pub fn movss_xmm_m(&mut self, dst: Xmm, src: Mem) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0xF3, &[0x0F, 0x10], false, dst, &src).map(|_| ()))
    }

    /// `movss mem32, xmm` store: F3 0F 11 /r.
    pub fn movss_m_xmm(&mut self, dst: Mem, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0xF3, &[0x0F, 0x11], false, src, &dst).map(|_| ()))
    }

    /// `movaps mem, xmm` store: 0F 29 /r.
    pub fn movaps_m_xmm(&mut self, dst: Mem, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0, &[0x0F, 0x29], false, src, &dst).map(|_| ()))
    }

    /// `movapd mem, xmm` store: 66 0F 29 /r.
    pub fn movapd_m_xmm(&mut self, dst: Mem, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| encode_sse_rm(b, 0x66, &[0x0F, 0x29], false, src, &dst).map(|_| ()))
    }

    /// `movd xmm, reg32`: 66 0F 6E /r.
    pub fn movd_xmm_r32(&mut self, dst: Xmm, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0x66, &[0x0F, 0x6E], false, dst, src);
            Ok(())
        })
    }

    /// `movd reg32, xmm`: 66 0F 7E /r.
    pub fn movd_r32_xmm(&mut self, dst: Reg32, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0x66, &[0x0F, 0x7E], false, src, dst);
            Ok(())
        })
    }

    /// `movq xmm, reg64`: 66 REX.W 0F 6E /r.
    pub fn movq_xmm_r64(&mut self, dst: Xmm, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0x66, &[0x0F, 0x6E], true, dst, src);
            Ok(())
        })
    }

    /// `movq reg64, xmm`: 66 REX.W 0F 7E /r.
    pub fn movq_r64_xmm(&mut self, dst: Reg64, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0x66, &[0x0F, 0x7E], true, src, dst);
            Ok(())
        })
    }

    // ── int ↔ float conversions ────────────────────────────

    /// `cvtsi2sd xmm, reg32`: F2 0F 2A /r.
    pub fn cvtsi2sd_xmm_r32(&mut self, dst: Xmm, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0x2A], false, dst, src);
            Ok(())
        })
    }

    /// `cvtsi2sd xmm, reg64`: F2 REX.W 0F 2A /r.
    pub fn cvtsi2sd_xmm_r64(&mut self, dst: Xmm, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0x2A], true, dst, src);
            Ok(())
        })
    }

    /// `cvtsi2ss xmm, reg32`: F3 0F 2A /r.
    pub fn cvtsi2ss_xmm_r32(&mut self, dst: Xmm, src: Reg32) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0x2A], false, dst, src);
            Ok(())
        })
    }

    /// `cvtsi2ss xmm, reg64`: F3 REX.W 0F 2A /r.
    pub fn cvtsi2ss_xmm_r64(&mut self, dst: Xmm, src: Reg64) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0x2A], true, dst, src);
            Ok(())
        })
    }

    /// `cvttsd2si reg32, xmm`: F2 0F 2C /r.
    pub fn cvttsd2si_r32_xmm(&mut self, dst: Reg32, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0x2C], false, dst, src);
            Ok(())
        })
    }

    /// `cvttsd2si reg64, xmm`: F2 REX.W 0F 2C /r.
    pub fn cvttsd2si_r64_xmm(&mut self, dst: Reg64, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0x2C], true, dst, src);
            Ok(())
        })
    }

    /// `cvttss2si reg32, xmm`: F3 0F 2C /r.
    pub fn cvttss2si_r32_xmm(&mut self, dst: Reg32, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0x2C], false, dst, src);
            Ok(())
        })
    }

    /// `cvttss2si reg64, xmm`: F3 REX.W 0F 2C /r.
    pub fn cvttss2si_r64_xmm(&mut self, dst: Reg64, src: Xmm) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0x2C], true, dst, src);
            Ok(())
        })
    }

    // ── SSE predicate compares ─────────────────────────────

    /// `cmpsd xmm, xmm, pred`: F2 0F C2 /r ib, trailing predicate byte.
    pub fn cmpsd_xmm_xmm(
        &mut self,
        dst: Xmm,
        src: Xmm,
        pred: CmpPredicate,
    ) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF2, &[0x0F, 0xC2], false, dst, src);
            b.push(pred.imm());
            Ok(())
        })
    }

    /// `cmpss xmm, xmm, pred`: F3 0F C2 /r ib.
    pub fn cmpss_xmm_xmm(
        &mut self,
        dst: Xmm,
        src: Xmm,
        pred: CmpPredicate,
    ) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0xF3, &[0x0F, 0xC2], false, dst, src);
            b.push(pred.imm());
            Ok(())
        })
    }

    /// `cmppd xmm, xmm, pred`: 66 0F C2 /r ib.
    pub fn cmppd_xmm_xmm(
        &mut self,
        dst: Xmm,
        src: Xmm,
        pred: CmpPredicate,
    ) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0x66, &[0x0F, 0xC2], false, dst, src);
            b.push(pred.imm());
            Ok(())
        })
    }

    /// `cmpps xmm, xmm, pred`: 0F C2 /r ib.
    pub fn cmpps_xmm_xmm(
        &mut self,
        dst: Xmm,
        src: Xmm,
        pred: CmpPredicate,
    ) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rr(b, 0, &[0x0F, 0xC2], false, dst, src);
            b.push(pred.imm());
            Ok(())
        })
    }

    /// `cmpsd xmm, mem64, pred`: F2 0F C2 /r ib.
    pub fn cmpsd_xmm_m(&mut self, dst: Xmm, src: Mem, pred: CmpPredicate) -> Result<(), AsmError> {
        self.fixed(|b| {
            encode_sse_rm(b, 0xF2, &[0x0F, 0xC2], false, dst, &src)?;
            b.push(pred.imm());
            Ok(())
        })
    }
}
