//! The assembly unit: fragment list, labels, branch relaxation, and final
//! layout.
//!
//! Each instruction is encoded immediately into its own byte buffer and
//! appended as a fragment.  Instructions whose target is an unresolved
//! [`Label`] carry a patch record (label-relative forms) or both a short
//! and a long pre-encoded form (relaxable `jmp`/`jcc`).  [`Assembler::finish`]
//! resolves labels with Szymanski-style branch relaxation: short branches
//! that cannot reach their targets are widened, widening is irreversible
//! (monotonic growth), and the pass iterates to a fixpoint, which bounds
//! and guarantees convergence.

use alloc::vec::Vec;

use crate::buffer::InstrBytes;
use crate::error::AsmError;

/// Maximum number of relaxation iterations before giving up.
const MAX_RELAXATION_ITERS: usize = 100;

/// A symbolic position in the output byte stream.
///
/// Created unbound by [`Assembler::label`], bound to the current position
/// by [`Assembler::bind`].  Handles are plain ids and must only be used
/// with the assembler that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(pub(crate) u32);

/// A deferred displacement patch: a disp32/rel32 field inside an already
/// emitted instruction whose value becomes known once `label` is bound.
/// The displacement is measured from the fragment's end, which is where
/// the CPU's RIP points for both rel32 branches and RIP-relative operands
/// with no trailing immediate.
#[derive(Debug, Clone)]
pub(crate) struct Patch {
    pub(crate) offset: u8,
    pub(crate) label: Label,
}

/// A fragment of assembled output.  During relaxation a `Relaxable`
/// fragment only ever grows (short to long, never back); `Align` padding
/// is recomputed from its position each pass and may shrink when an
/// earlier branch widens across the boundary.
#[derive(Debug, Clone)]
enum Fragment {
    /// An encoded instruction, optionally with a rel32/disp32 patch.
    Fixed {
        bytes: InstrBytes,
        patch: Option<Patch>,
    },
    /// Raw inline data.
    Data(Vec<u8>),
    /// NOP padding up to a power-of-two boundary.
    Align { alignment: u32 },
    /// A branch with a short (rel8) and a long (rel32) form.  Starts
    /// short; promoted to long if the target is out of rel8 range.
    Relaxable {
        short: InstrBytes,
        short_patch: u8,
        long: InstrBytes,
        long_patch: u8,
        label: Label,
        is_long: bool,
    },
}

impl Fragment {
    /// Current size in bytes, given the position the fragment starts at.
    fn size_at(&self, position: u64) -> u64 {
        match self {
            Fragment::Fixed { bytes, .. } => bytes.len() as u64,
            Fragment::Data(bytes) => bytes.len() as u64,
            Fragment::Align { alignment } => {
                let a = u64::from(*alignment);
                if a > 1 {
                    position.div_ceil(a) * a - position
                } else {
                    0
                }
            }
            Fragment::Relaxable {
                short,
                long,
                is_long,
                ..
            } => {
                if *is_long {
                    long.len() as u64
                } else {
                    short.len() as u64
                }
            }
        }
    }
}

/// The assembler for one code unit.
///
/// Owns the fragment list and label table for a single unit (conceptually
/// one function body).  Plain owned state, no interior mutability: one
/// unit is assembled by one logical thread of control, and concurrent
/// callers each own an independent `Assembler`.
#[derive(Debug, Default)]
pub struct Assembler {
    fragments: Vec<Fragment>,
    /// Bound fragment index per label id, `None` while unbound.
    labels: Vec<Option<u32>>,
}

impl Assembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    // ── labels ─────────────────────────────────────────────

    /// Create a fresh, unbound label.
    pub fn label(&mut self) -> Label {
        let id = self.labels.len() as u32;
        self.labels.push(None);
        Label(id)
    }

    /// Bind `label` to the current position.
    ///
    /// Binding the same label twice is an error, as is a handle from a
    /// different assembler.
    pub fn bind(&mut self, label: Label) -> Result<(), AsmError> {
        let slot = self
            .labels
            .get_mut(label.0 as usize)
            .ok_or(AsmError::InvalidLabel { label: label.0 })?;
        if slot.is_some() {
            return Err(AsmError::LabelRedefined { label: label.0 });
        }
        *slot = Some(self.fragments.len() as u32);
        Ok(())
    }

    /// Whether `label` has been bound.  Foreign handles report `false`.
    pub fn is_bound(&self, label: Label) -> bool {
        self.labels
            .get(label.0 as usize)
            .is_some_and(Option::is_some)
    }

    // ── raw emission ───────────────────────────────────────

    /// The current byte position, assuming every relaxable branch keeps
    /// its widest form.  Exact once [`Assembler::finish`] runs only if no
    /// branch relaxes shorter; treat it as an upper bound.
    pub fn position(&self) -> u64 {
        let mut pos = 0u64;
        for frag in &self.fragments {
            pos += match frag {
                Fragment::Relaxable { long, .. } => long.len() as u64,
                other => other.size_at(pos),
            };
        }
        pos
    }

    /// Append raw data bytes to the instruction stream.
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.fragments.push(Fragment::Data(bytes.to_vec()));
    }

    /// Append one raw byte.
    pub fn emit_u8(&mut self, value: u8) {
        self.emit_bytes(&[value]);
    }

    /// Append a little-endian 16-bit value.
    pub fn emit_u16(&mut self, value: u16) {
        self.emit_bytes(&value.to_le_bytes());
    }

    /// Append a little-endian 32-bit value.
    pub fn emit_u32(&mut self, value: u32) {
        self.emit_bytes(&value.to_le_bytes());
    }

    /// Append a little-endian 64-bit value.
    pub fn emit_u64(&mut self, value: u64) {
        self.emit_bytes(&value.to_le_bytes());
    }

    /// Pad with multi-byte NOP sequences to a power-of-two boundary.
    pub fn align(&mut self, alignment: u32) -> Result<(), AsmError> {
        if !alignment.is_power_of_two() {
            return Err(AsmError::BadAlignment { alignment });
        }
        self.fragments.push(Fragment::Align { alignment });
        Ok(())
    }

    // ── fragment plumbing for the instruction surface ──────

    pub(crate) fn push_fixed(&mut self, bytes: InstrBytes) {
        self.fragments.push(Fragment::Fixed { bytes, patch: None });
    }

    pub(crate) fn push_patched(&mut self, bytes: InstrBytes, offset: usize, label: Label) {
        self.fragments.push(Fragment::Fixed {
            bytes,
            patch: Some(Patch {
                offset: offset as u8,
                label,
            }),
        });
    }

    pub(crate) fn push_relaxable(
        &mut self,
        short: InstrBytes,
        short_patch: usize,
        long: InstrBytes,
        long_patch: usize,
        label: Label,
    ) {
        self.fragments.push(Fragment::Relaxable {
            short,
            short_patch: short_patch as u8,
            long,
            long_patch: long_patch as u8,
            label,
            is_long: false,
        });
    }

    // ── resolution ─────────────────────────────────────────

    /// Resolve all labels, relax branches, and emit the final byte stream.
    pub fn finish(mut self) -> Result<Code, AsmError> {
        let offsets = self.relax()?;
        let label_offsets = self
            .labels
            .iter()
            .map(|slot| slot.map(|fi| offsets[fi as usize]))
            .collect();
        let bytes = self.emit_final(&offsets)?;
        Ok(Code {
            bytes,
            label_offsets,
        })
    }

    /// Build the offset table: `offsets[i]` is the position of fragment
    /// `i`, with a sentinel for the total size (labels may be bound past
    /// the last fragment).
    fn compute_offsets_into(&self, offsets: &mut Vec<u64>) {
        offsets.clear();
        let mut current = 0u64;
        for frag in &self.fragments {
            offsets.push(current);
            current += frag.size_at(current);
        }
        offsets.push(current);
    }

    fn label_target(&self, label: Label, offsets: &[u64]) -> Result<u64, AsmError> {
        match self.labels.get(label.0 as usize) {
            Some(Some(fi)) => Ok(offsets[*fi as usize]),
            _ => Err(AsmError::UnboundLabel { label: label.0 }),
        }
    }

    /// Iteratively widen short branches that cannot reach their targets.
    fn relax(&mut self) -> Result<Vec<u64>, AsmError> {
        let mut offsets = Vec::with_capacity(self.fragments.len() + 1);
        let mut to_expand: Vec<usize> = Vec::new();

        for _iter in 0..MAX_RELAXATION_ITERS {
            self.compute_offsets_into(&mut offsets);
            to_expand.clear();

            for (i, frag) in self.fragments.iter().enumerate() {
                if let Fragment::Relaxable {
                    short,
                    label,
                    is_long: false,
                    ..
                } = frag
                {
                    let frag_end = offsets[i] + short.len() as u64;
                    match self.label_target(*label, &offsets) {
                        Ok(target) => {
                            let disp = target as i64 - frag_end as i64;
                            if !(-128..=127).contains(&disp) {
                                to_expand.push(i);
                            }
                        }
                        // Unbound label: conservatively take the long
                        // form; the real error surfaces in emit_final.
                        Err(_) => to_expand.push(i),
                    }
                }
            }

            if to_expand.is_empty() {
                return Ok(offsets);
            }
            for &idx in &to_expand {
                if let Fragment::Relaxable { is_long, .. } = &mut self.fragments[idx] {
                    *is_long = true;
                }
            }
        }

        Err(AsmError::RelaxationLimit {
            max: MAX_RELAXATION_ITERS,
        })
    }

    fn emit_final(&mut self, offsets: &[u64]) -> Result<Vec<u8>, AsmError> {
        let total = offsets.last().copied().unwrap_or(0);
        let mut output = Vec::with_capacity(total as usize);

        let mut fragments = core::mem::take(&mut self.fragments);
        for (i, frag) in fragments.iter_mut().enumerate() {
            match frag {
                Fragment::Fixed { bytes, patch } => {
                    if let Some(p) = patch {
                        let target = self.label_target(p.label, offsets)?;
                        let frag_end = offsets[i] + bytes.len() as u64;
                        let disp = target as i64 - frag_end as i64;
                        let disp32 =
                            i32::try_from(disp).map_err(|_| AsmError::DisplacementOverflow {
                                disp,
                                width: 4,
                            })?;
                        let off = p.offset as usize;
                        bytes[off..off + 4].copy_from_slice(&disp32.to_le_bytes());
                    }
                    output.extend_from_slice(bytes);
                }

                Fragment::Data(bytes) => output.extend_from_slice(bytes),

                Fragment::Align { alignment } => {
                    let a = u64::from(*alignment);
                    if a > 1 {
                        let current = offsets[i];
                        let padding = (current.div_ceil(a) * a - current) as usize;
                        emit_nop_padding(&mut output, padding);
                    }
                }

                Fragment::Relaxable {
                    short,
                    short_patch,
                    long,
                    long_patch,
                    label,
                    is_long,
                } => {
                    let target = self.label_target(*label, offsets)?;
                    if *is_long {
                        let frag_end = offsets[i] + long.len() as u64;
                        let disp = target as i64 - frag_end as i64;
                        let disp32 =
                            i32::try_from(disp).map_err(|_| AsmError::DisplacementOverflow {
                                disp,
                                width: 4,
                            })?;
                        let off = *long_patch as usize;
                        long[off..off + 4].copy_from_slice(&disp32.to_le_bytes());
                        output.extend_from_slice(long);
                    } else {
                        let frag_end = offsets[i] + short.len() as u64;
                        let disp = target as i64 - frag_end as i64;
                        let disp8 =
                            i8::try_from(disp).map_err(|_| AsmError::DisplacementOverflow {
                                disp,
                                width: 1,
                            })?;
                        short[*short_patch as usize] = disp8 as u8;
                        output.extend_from_slice(short);
                    }
                }
            }
        }
        Ok(output)
    }
}

/// Pad `output` with Intel-recommended multi-byte NOP sequences.
fn emit_nop_padding(output: &mut Vec<u8>, mut padding: usize) {
    const NOPS: [&[u8]; 9] = [
        &[0x90],
        &[0x66, 0x90],
        &[0x0F, 0x1F, 0x00],
        &[0x0F, 0x1F, 0x40, 0x00],
        &[0x0F, 0x1F, 0x44, 0x00, 0x00],
        &[0x66, 0x0F, 0x1F, 0x44, 0x00, 0x00],
        &[0x0F, 0x1F, 0x80, 0x00, 0x00, 0x00, 0x00],
        &[0x0F, 0x1F, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
        &[0x66, 0x0F, 0x1F, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
    ];
    while padding > 0 {
        let n = padding.min(NOPS.len());
        output.extend_from_slice(NOPS[n - 1]);
        padding -= n;
    }
}

/// The result of a successful [`Assembler::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Code {
    bytes: Vec<u8>,
    label_offsets: Vec<Option<u64>>,
}

impl Code {
    /// The assembled machine code.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The byte count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the unit is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The final position a label was bound at, or `None` if it was never
    /// bound.
    #[must_use]
    pub fn label_offset(&self, label: Label) -> Option<u64> {
        self.label_offsets.get(label.0 as usize).copied().flatten()
    }
}
