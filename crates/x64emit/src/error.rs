//! Error types for encoding and label resolution failures.
//!
//! Every error is raised synchronously at the point of detection and an
//! erroring instruction emits zero bytes.  There is no recovery: all
//! variants indicate caller misuse or an unsatisfiable request, never a
//! transient condition.

use core::fmt;

/// An encoding or resolution error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsmError {
    /// A legacy high-byte register (AH, CH, DH, BH) was combined with an
    /// operand that forces a REX prefix.  A REX byte changes the meaning of
    /// register codes 4-7 from AH/CH/DH/BH to SPL/BPL/SIL/DIL, so the
    /// hardware would decode a different register than requested.
    HighByteRex {
        /// Name of the offending high-byte register.
        reg: alloc::string::String,
    },

    /// RSP was used as a scaled-index register.  Index code 4 in the SIB
    /// byte means "no index"; RSP cannot be an index.
    RspIndex,

    /// A scaled-index register was combined with RIP-relative addressing.
    /// The RIP-relative form (mod=00, rm=101) has no SIB byte, so the
    /// hardware cannot express `[rip + index*scale + disp]`.
    RipIndex,

    /// A relative displacement does not fit the encoding's width.
    DisplacementOverflow {
        /// The displacement that overflowed.
        disp: i64,
        /// Width of the displacement field in bytes (1 or 4).
        width: u8,
    },

    /// A patch record's target label was never bound.  Fatal for the whole
    /// unit: no partial output is usable.
    UnboundLabel {
        /// The raw label id.
        label: u32,
    },

    /// A label was bound twice.
    LabelRedefined {
        /// The raw label id.
        label: u32,
    },

    /// A label handle does not belong to this assembler.
    InvalidLabel {
        /// The raw label id.
        label: u32,
    },

    /// Branch relaxation failed to converge within the iteration limit.
    /// Widening is monotonic, so reaching this limit indicates an internal
    /// inconsistency rather than a pathological input.
    RelaxationLimit {
        /// The iteration limit that was exceeded.
        max: usize,
    },

    /// Alignment argument was not a power of two.
    BadAlignment {
        /// The rejected alignment value.
        alignment: u32,
    },
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::HighByteRex { reg } => write!(
                f,
                "high-byte register {reg} cannot be encoded with a REX prefix \
                 (conflicts with SPL/BPL/SIL/DIL and R8-R15 encodings)"
            ),
            AsmError::RspIndex => {
                write!(f, "rsp cannot be used as a scaled-index register")
            }
            AsmError::RipIndex => {
                write!(f, "rip-relative addressing cannot carry an index register")
            }
            AsmError::DisplacementOverflow { disp, width } => write!(
                f,
                "relative displacement {disp} does not fit in {width} byte(s)"
            ),
            AsmError::UnboundLabel { label } => {
                write!(f, "label {label} was referenced but never bound")
            }
            AsmError::LabelRedefined { label } => {
                write!(f, "label {label} was bound more than once")
            }
            AsmError::InvalidLabel { label } => {
                write!(f, "label {label} does not belong to this assembler")
            }
            AsmError::RelaxationLimit { max } => {
                write!(f, "branch relaxation did not converge in {max} iterations")
            }
            AsmError::BadAlignment { alignment } => {
                write!(f, "alignment {alignment} is not a power of two")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}
