use crate::player::PlayerId;

/// Pairwise Euclidean distances for one statistic over a pool.
///
/// Row and column order follow `ids`. Entries are non-negative and finite;
/// anything that came out NaN or infinite is stored as 0 and counted in
/// `non_finite`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    ids: Vec<PlayerId>,
    data: Vec<f64>,
    non_finite: usize,
}

impl DistanceMatrix {
    #[cfg(test)]
    pub(crate) fn from_entries(ids: Vec<PlayerId>, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), ids.len() * ids.len());
        Self {
            ids,
            data,
            non_finite: 0,
        }
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.ids
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.ids.len() + col]
    }

    pub fn entries(&self) -> &[f64] {
        &self.data
    }

    pub fn non_finite(&self) -> usize {
        self.non_finite
    }

    /// Min and max over every entry, diagonal included.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Distance matrix for a scalar statistic, `value` looked up per pool member.
pub fn factor_distances(pool: &[PlayerId], value: impl Fn(PlayerId) -> f64) -> DistanceMatrix {
    let values: Vec<f64> = pool.iter().map(|id| value(*id)).collect();
    euclidean_distances(pool, &values, 1)
}

/// Distance matrix for `dim`-dimensional factor vectors stored row-major in
/// `rows` (one row per pool member).
///
/// Uses the Gram identity d(i,j)^2 = H_i + H_j - 2 G_ij with H_i = G_ii, so
/// the diagonal is exactly 0 and the result is exactly symmetric.
pub fn euclidean_distances(ids: &[PlayerId], rows: &[f64], dim: usize) -> DistanceMatrix {
    let n = ids.len();
    debug_assert_eq!(rows.len(), n * dim);
    let row = |i: usize| &rows[i * dim..(i + 1) * dim];

    let mut gram = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            let g: f64 = row(i).iter().zip(row(j)).map(|(a, b)| a * b).sum();
            gram[i * n + j] = g;
            gram[j * n + i] = g;
        }
    }

    let mut non_finite = 0usize;
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        let h_i = gram[i * n + i];
        for j in 0..n {
            let h_j = gram[j * n + j];
            let squared = h_i + h_j - 2.0 * gram[i * n + j];
            // NaN must be caught before the clamp, which would swallow it.
            data[i * n + j] = if squared.is_nan() {
                non_finite += 1;
                0.0
            } else {
                // Clamp absorbs cancellation just below zero.
                let d = squared.max(0.0).sqrt();
                if d.is_finite() {
                    d
                } else {
                    non_finite += 1;
                    0.0
                }
            };
        }
    }

    DistanceMatrix {
        ids: ids.to_vec(),
        data,
        non_finite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_run_example() {
        let hr = [(1, 10.0), (2, 12.0), (3, 30.0)];
        let d = factor_distances(&[1, 2, 3], |id| {
            hr.iter().find(|(p, _)| *p == id).map(|(_, v)| *v).unwrap()
        });
        assert_eq!(d.get(0, 1), 2.0);
        assert_eq!(d.get(0, 2), 20.0);
        assert_eq!(d.get(1, 2), 18.0);
        assert_eq!(d.min_max(), Some((0.0, 20.0)));
    }

    #[test]
    fn vector_factors_use_full_norm() {
        let d = euclidean_distances(&[1, 2], &[0.0, 0.0, 3.0, 4.0], 2);
        assert!((d.get(0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(d.get(1, 1), 0.0);
    }

    #[test]
    fn overflow_is_zeroed_and_counted() {
        let d = factor_distances(&[1, 2], |id| if id == 1 { f64::MAX } else { 0.0 });
        assert!(d.entries().iter().all(|v| v.is_finite()));
        assert!(d.non_finite() > 0);
    }

    #[test]
    fn cancelling_infinities_are_counted_not_hidden() {
        // H overflows to inf, so H_i + H_j - 2G is inf - inf = NaN.
        let d = factor_distances(&[1, 2], |_| 1e200);
        assert!(d.entries().iter().all(|v| *v == 0.0));
        assert_eq!(d.non_finite(), 4);

        let d = factor_distances(&[1, 2], |id| if id == 1 { 1e200 } else { 3e200 });
        assert!(d.entries().iter().all(|v| v.is_finite()));
        assert_eq!(d.non_finite(), 4);
    }

    #[test]
    fn empty_pool() {
        let d = factor_distances(&[], |_| 1.0);
        assert_eq!(d.size(), 0);
        assert_eq!(d.min_max(), None);
    }
}
