//! Exact crossing count between two ordered cluster layers.

/// Counts the line crossings implied by a `connections[to][from]` weight matrix.
///
/// Two connectors `(from1 -> to1)` and `(from2 -> to2)` cross iff exactly one of
/// `from2 > from1` and `to2 > to1` holds. Each crossing pair is counted once,
/// from the cell with the smaller source index, weighted by the product of the
/// two cells' connection weights.
pub fn cross_count(connections: &[Vec<f64>]) -> f64 {
    let to_len = connections.len();
    if to_len == 0 {
        return 0.0;
    }
    let from_len = connections[0].len();

    let mut crossings = 0.0;
    for to in 0..to_len {
        for from in 0..from_len {
            // the first target row and the last source column cannot open a crossing
            if to == 0 || from + 1 == from_len {
                continue;
            }
            let current = connections[to][from];
            if current == 0.0 {
                continue;
            }
            for other in connections.iter().take(to) {
                for &weight in &other[from + 1..] {
                    crossings += weight * current;
                }
            }
        }
    }
    crossings
}
