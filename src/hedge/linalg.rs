//! Small dense linear solves.
//!
//! Gauss-Jordan elimination with partial pivoting on an `N x N` system.
//! Rank-deficient systems are not an error: unknowns without a pivot are
//! fixed at zero and the remaining ones are read off the reduced rows,
//! which gives one feasible solution when the system is consistent.

/// Result of reducing `A x = b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSolution<const N: usize> {
    /// Solution vector. Free unknowns are zero.
    pub values: [f64; N],
    /// Number of pivots found.
    pub rank: usize,
    /// False when a zero row of `A` has a non-zero right-hand side.
    pub consistent: bool,
}

impl<const N: usize> LinearSolution<N> {
    pub fn is_singular(&self) -> bool {
        self.rank < N
    }
}

/// Solve `matrix * x = rhs`.
///
/// `tolerance` is relative: a pivot is treated as zero when it is at most
/// `tolerance` times the largest coefficient in `matrix`.
pub fn solve<const N: usize>(matrix: [[f64; N]; N], rhs: [f64; N], tolerance: f64) -> LinearSolution<N> {
    let mut a = matrix;
    let mut b = rhs;

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let pivot_tol = tolerance * if scale > 0.0 { scale } else { 1.0 };
    let rhs_scale = b.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let rhs_tol = tolerance * rhs_scale.max(1.0);

    let mut pivots: Vec<(usize, usize)> = Vec::with_capacity(N);
    let mut row = 0;

    for col in 0..N {
        if row == N {
            break;
        }

        let mut best = row;
        for r in row + 1..N {
            if a[r][col].abs() > a[best][col].abs() {
                best = r;
            }
        }
        if a[best][col].abs() <= pivot_tol {
            continue;
        }

        a.swap(row, best);
        b.swap(row, best);

        let pivot = a[row][col];
        for c in col..N {
            a[row][c] /= pivot;
        }
        b[row] /= pivot;

        for r in 0..N {
            if r == row {
                continue;
            }
            let factor = a[r][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..N {
                a[r][c] -= factor * a[row][c];
            }
            b[r] -= factor * b[row];
        }

        pivots.push((row, col));
        row += 1;
    }

    let rank = pivots.len();
    let consistent = b[rank..].iter().all(|v| v.abs() <= rhs_tol);

    let mut values = [0.0; N];
    for &(r, c) in &pivots {
        values[c] = b[r];
    }

    LinearSolution {
        values,
        rank,
        consistent,
    }
}
