//! Reference alignment by whole-sample shifts.
//!
//! A reference profile looked up from recorded positions can lag or lead the
//! recorded elevation by a few samples. Shifting the reference by an integer
//! offset lines the two profiles up again:
//!
//! - positive offsets delay the reference (sample `i` moves to `i + offset`)
//! - negative offsets advance it
//! - samples exposed by the shift stay at `0.0`; they are never padded with a
//!   boundary value
//!
//! The difference series is only meaningful where the shifted reference is
//! valid, so it is computed over that region and left at `0.0` elsewhere.

use std::ops::Range;

/// Clamp `offset` into `[-(len - 1), len - 1]`.
pub fn clamp_offset(offset: i64, len: usize) -> i64 {
    let limit = len.saturating_sub(1) as i64;
    offset.clamp(-limit, limit)
}

/// Index range of the output that receives shifted source values.
pub fn valid_range(len: usize, offset: i64) -> Range<usize> {
    let offset = clamp_offset(offset, len);
    let magnitude = offset.unsigned_abs() as usize;
    if offset >= 0 {
        magnitude..len
    } else {
        0..len - magnitude
    }
}

/// Shift `reference` by `offset` samples.
pub fn shift(reference: &[f64], offset: i64) -> Vec<f64> {
    let len = reference.len();
    let offset = clamp_offset(offset, len);
    let mut out = vec![0.0; len];

    let dest = valid_range(len, offset);
    let src_start = if offset >= 0 { 0 } else { offset.unsigned_abs() as usize };
    let count = dest.len();

    out[dest].copy_from_slice(&reference[src_start..src_start + count]);
    out
}

/// `shifted_reference - elevation` over the valid region, `0.0` elsewhere.
pub fn shifted_diff(elevation: &[f64], shifted_reference: &[f64], offset: i64) -> Vec<f64> {
    let len = elevation.len().min(shifted_reference.len());
    let mut diff = vec![0.0; elevation.len()];
    for i in valid_range(len, offset) {
        diff[i] = shifted_reference[i] - elevation[i];
    }
    diff
}

/// A reference series (and its imperial variant) moved by one offset.
#[derive(Debug, Clone)]
pub struct ReferenceAlignment {
    /// Offset actually applied (after clamping).
    pub offset: i64,
    pub reference: Vec<f64>,
    pub reference_imperial: Option<Vec<f64>>,
    pub diff: Vec<f64>,
}

/// Shift both reference variants in lockstep and recompute the difference.
pub fn align(
    elevation: &[f64],
    reference: &[f64],
    reference_imperial: Option<&[f64]>,
    offset: i64,
) -> ReferenceAlignment {
    let offset = clamp_offset(offset, reference.len());
    let shifted = shift(reference, offset);
    let shifted_imperial = reference_imperial.map(|r| shift(r, offset));
    let diff = shifted_diff(elevation, &shifted, offset);

    log::debug!(
        "reference shifted by {offset} samples ({} valid of {})",
        valid_range(reference.len(), offset).len(),
        reference.len()
    );

    ReferenceAlignment {
        offset,
        reference: shifted,
        reference_imperial: shifted_imperial,
        diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: [f64; 6] = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];

    #[test]
    fn zero_shift_is_identity() {
        assert_eq!(shift(&REF, 0), REF.to_vec());
    }

    #[test]
    fn positive_shift_delays_and_leaves_zeros() {
        assert_eq!(shift(&REF, 2), vec![0.0, 0.0, 10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn negative_shift_advances_and_leaves_zeros() {
        assert_eq!(shift(&REF, -2), vec![12.0, 13.0, 14.0, 15.0, 0.0, 0.0]);
    }

    #[test]
    fn shift_back_restores_overlap() {
        for k in -5i64..=5 {
            let round = shift(&shift(&REF, k), -k);
            let overlap = valid_range(REF.len(), k.abs());
            let overlap = if k >= 0 { 0..overlap.len() } else { overlap };
            for i in overlap {
                assert_eq!(round[i], REF[i], "k={k} i={i}");
            }
        }
    }

    #[test]
    fn offset_is_clamped() {
        assert_eq!(clamp_offset(100, 6), 5);
        assert_eq!(clamp_offset(-100, 6), -5);
        assert_eq!(shift(&REF, 100), vec![0.0, 0.0, 0.0, 0.0, 0.0, 10.0]);
        assert_eq!(clamp_offset(3, 0), 0);
        assert!(shift(&[], 3).is_empty());
    }

    #[test]
    fn diff_only_over_valid_region() {
        let elevation = [9.0; 6];
        let a = align(&elevation, &REF, None, 2);
        assert_eq!(a.diff, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.offset, 2);
    }

    #[test]
    fn imperial_variant_moves_in_lockstep() {
        let imperial: Vec<f64> = REF.iter().map(|v| v * 2.0).collect();
        let a = align(&REF, &REF, Some(&imperial), -1);
        let imp = a.reference_imperial.unwrap();
        for (m, f) in a.reference.iter().zip(imp.iter()) {
            assert_eq!(*m * 2.0, *f);
        }
    }
}
