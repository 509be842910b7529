//! # x64emit — Typed AMD64/x86-64 Machine-Code Emitter
//!
//! `x64emit` is a pure Rust, zero-C-dependency runtime assembler core for
//! x86-64.  Instructions are requested through typed methods (mnemonic plus
//! operand shape); the crate produces the exact byte sequence the CPU's
//! instruction decoder expects, including REX prefixes, ModR/M and SIB
//! bytes, displacements and immediates.
//!
//! There is no text parser: the typed method surface *is* the interface.
//!
//! ## Quick Start
//!
//! ```rust
//! use x64emit::{Assembler, Reg64};
//!
//! let mut asm = Assembler::new();
//! asm.mov_r64_i32(Reg64::Rax, 42)?;
//! asm.ret()?;
//! let code = asm.finish()?;
//! assert_eq!(code.bytes(), &[0x48, 0xC7, 0xC0, 0x2A, 0x00, 0x00, 0x00, 0xC3]);
//! # Ok::<(), x64emit::AsmError>(())
//! ```
//!
//! ## Labels and branch relaxation
//!
//! Branch targets may be unresolved [`Label`]s.  Relaxable branches
//! (`jmp`/`jcc`) start in their short rel8 form and are widened to rel32
//! during [`Assembler::finish`] only when the final distance requires it
//! (Szymanski-style monotonic relaxation, iterated to a fixpoint).
//!
//! ```rust
//! use x64emit::{Assembler, Cond, Reg64};
//!
//! let mut asm = Assembler::new();
//! let done = asm.label();
//! asm.test_r64_r64(Reg64::Rdi, Reg64::Rdi)?;
//! asm.jcc(Cond::E, done)?;
//! asm.add_r64_i32(Reg64::Rax, 1)?;
//! asm.bind(done)?;
//! asm.ret()?;
//! let code = asm.finish()?;
//! assert_eq!(code.label_offset(done), Some(9));
//! # Ok::<(), x64emit::AsmError>(())
//! ```
//!
//! ## Features
//!
//! - **Pure Rust** — no C/C++ FFI, no LLVM, no system assembler at runtime.
//! - **Typed operands** — invalid mnemonic/operand-shape combinations are
//!   compile errors, not runtime checks.
//! - **Labels & branch relaxation** — automatic forward/backward label
//!   resolution with rel8/rel32 width selection.
//! - **`no_std` + `alloc`** — embeddable in firmware, kernels, WASM.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// An encoder intentionally performs many narrowing / sign-changing casts
// between integer widths (i32→u8, u8→u32, etc.) and uses dense hex literals
// without separators (0x0F, 0xFFD0).  The lints below are expected and
// acceptable in this context.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::return_self_not_must_use,
    clippy::many_single_char_names
)]

extern crate alloc;

mod assembler;
mod buffer;
mod encode;
mod error;
mod insn;
mod operand;

pub use assembler::{Assembler, Code, Label};
pub use buffer::InstrBytes;
pub use error::AsmError;
pub use operand::{CmpPredicate, Cond, Mem, Reg16, Reg32, Reg64, Reg8, Scale, Xmm};
