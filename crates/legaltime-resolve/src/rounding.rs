//! Remainder-preserving rounding of percentage weights.
//!
//! Naive per-value rounding of area weights does not sum back to 100, which
//! would skew the weighted resample. This largest-remainder scheme floors
//! every value and hands the leftover units to the largest fractional
//! remainders, so the rounded weights always sum to exactly the target.
//! Remainder ties break by slice order, keeping the result deterministic.

use crate::error::ResolveError;

/// Round non-negative percentages to integers summing to exactly `target`.
///
/// # Errors
///
/// Returns [`ResolveError::WeightRounding`] when the inputs cannot reach
/// the target — floors already above it, or a leftover larger than the
/// number of values (inputs that were never percentages of a whole).
pub fn saferound(values: &[f64], target: u32) -> Result<Vec<u32>, ResolveError> {
    let floors: Vec<u32> = values
        .iter()
        .map(|v| {
            let clamped = v.max(0.0).min(f64::from(u32::MAX));
            clamped.floor() as u32
        })
        .collect();
    let floor_sum: u32 = floors.iter().fold(0u32, |acc, v| acc.saturating_add(*v));

    let leftover = target
        .checked_sub(floor_sum)
        .ok_or(ResolveError::WeightRounding {
            sum: floor_sum,
            target,
        })?;
    let leftover = usize::try_from(leftover).map_err(|_err| ResolveError::WeightRounding {
        sum: floor_sum,
        target,
    })?;
    if leftover > values.len() {
        return Err(ResolveError::WeightRounding {
            sum: floor_sum,
            target,
        });
    }

    // Indices by descending fractional remainder; stable sort keeps slice
    // order on ties.
    let mut by_remainder: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .map(|(idx, v)| (idx, v - v.floor()))
        .collect();
    by_remainder.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(core::cmp::Ordering::Equal));

    let mut rounded = floors;
    for (idx, _) in by_remainder.into_iter().take(leftover) {
        if let Some(slot) = rounded.get_mut(idx) {
            *slot = slot.saturating_add(1);
        }
    }
    Ok(rounded)
}
