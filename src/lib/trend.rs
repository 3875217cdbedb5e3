//! Least-squares polynomial fit for smoothed trend lines

/// A polynomial fitted over a scaled domain
///
/// `x` values are mapped linearly from `[min, max]` onto `[-1, 1]` before
/// evaluation, which keeps the normal equations well conditioned for
/// day-of-year abscissas.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// lowest degree first, in the scaled domain
    coefs: Vec<f64>,
    offset: f64,
    scale: f64,
}

impl Polynomial {
    /// Fit of degree at most `degree` through `(xs[i], ys[i])`
    ///
    /// The degree is lowered to one less than the number of distinct `x`
    /// values so the system always has a unique solution. Returns `None` when
    /// there are no points or the slices differ in length.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }
        let mut distinct = xs.to_vec();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup();
        let degree = degree.min(distinct.len() - 1);

        let (lo, hi) = (distinct[0], distinct[distinct.len() - 1]);
        let (offset, scale) = if hi > lo {
            ((hi + lo) / 2.0, (hi - lo) / 2.0)
        } else {
            (lo, 1.0)
        };
        let scaled = xs.iter().map(|x| (x - offset) / scale).collect::<Vec<_>>();

        // normal equations: (V^T V) c = V^T y
        let n = degree + 1;
        let mut system = vec![vec![0.0; n + 1]; n];
        for (x, y) in scaled.iter().zip(ys) {
            let powers = (0..n).map(|k| x.powi(k as i32)).collect::<Vec<_>>();
            for (i, row) in system.iter_mut().enumerate() {
                for j in 0..n {
                    row[j] += powers[i] * powers[j];
                }
                row[n] += powers[i] * y;
            }
        }
        let coefs = solve(system)?;
        Some(Self { coefs, offset, scale })
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.offset) / self.scale;
        self.coefs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix
fn solve(mut m: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = m.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        let p = m[col][col];
        for v in m[col].iter_mut() {
            *v /= p;
        }
        for row in 0..n {
            if row != col {
                let factor = m[row][col];
                if factor != 0.0 {
                    for k in col..=n {
                        let sub = factor * m[col][k];
                        m[row][k] -= sub;
                    }
                }
            }
        }
    }
    Some(m.into_iter().map(|row| row[n]).collect())
}

#[cfg(test)]
impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coefs.len() - 1
    }
}
