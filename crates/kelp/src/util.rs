//! Permutation and array helpers shared by the solvers.

use crate::error::{OrderError, Result};

/// Multiplies `1..=n`, stopping as soon as the product exceeds `limit`.
pub fn limited_factorial(n: usize, limit: usize) -> Option<usize> {
    let mut product: usize = 1;
    for i in 2..=n {
        product = product.checked_mul(i)?;
        if product > limit {
            return None;
        }
    }
    Some(product)
}

/// All permutations of `items` (Heap's algorithm), or `None` when the
/// permutation count would exceed `limit`.
pub fn limited_permutations<T: Clone>(items: &[T], limit: usize) -> Option<Vec<Vec<T>>> {
    limited_factorial(items.len(), limit)?;

    let mut scratch: Vec<T> = items.to_vec();
    let length = scratch.len();
    let mut result = vec![scratch.clone()];
    let mut counters = vec![0usize; length];

    let mut i = 1;
    while i < length {
        if counters[i] < i {
            let k = if i % 2 == 1 { counters[i] } else { 0 };
            scratch.swap(i, k);
            counters[i] += 1;
            i = 1;
            result.push(scratch.clone());
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    Some(result)
}

/// Applies `order` as an index permutation over `items`.
///
/// Fails when the lengths differ or `order` is not a permutation of
/// `0..items.len()`.
pub fn rearrange<T: Clone>(items: &[T], order: &[usize]) -> Result<Vec<T>> {
    if order.len() != items.len() {
        return Err(OrderError::OverrideLengthMismatch {
            expected: items.len(),
            got: order.len(),
        });
    }

    let mut seen = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    for &index in order {
        if index >= items.len() || seen[index] {
            return Err(OrderError::OverrideIndexInvalid {
                index,
                len: items.len(),
            });
        }
        seen[index] = true;
        out.push(items[index].clone());
    }
    Ok(out)
}
