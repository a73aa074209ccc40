use nalgebra::{Point3, Vector3};

/// Minimum Euclidean distance from `point` to any of `targets`, or `None` if `targets` is empty.
pub fn min_distance_to_set(point: &Point3<f64>, targets: &[Point3<f64>]) -> Option<f64> {
    targets
        .iter()
        .map(|t| (point - t).norm())
        .min_by(|a, b| a.total_cmp(b))
}

/// Enumerates every unordered pair `(i, j)` with `i < j` whose separation lies in
/// `(0, cutoff]`, yielding the pair and the separation vector `positions[j] - positions[i]`.
pub fn pairs_within_cutoff(
    positions: &[Point3<f64>],
    i: usize,
    cutoff: f64,
) -> Vec<(usize, usize, Vector3<f64>)> {
    let cutoff_sq = cutoff * cutoff;
    let origin = positions[i];
    positions
        .iter()
        .enumerate()
        .skip(i + 1)
        .filter_map(|(j, p)| {
            let d = p - origin;
            let dist_sq = d.norm_squared();
            (dist_sq > 0.0 && dist_sq <= cutoff_sq).then_some((i, j, d))
        })
        .collect()
}
