//! Truncated singular value decomposition (latent semantic analysis).
//!
//! Randomized range finder followed by an exact SVD of the small projected
//! matrix:
//!
//! 1. Draw a seeded Gaussian test matrix `Ω` (`n_features x l`, where
//!    `l = n_components + n_oversamples`).
//! 2. Power iterations `Q = qr(X · Q)`, `Q = qr(Xᵀ · Q)`, `n_iter` times.
//! 3. `Q = qr(X · Q)`, so that `X ≈ Q · B` with `B = Qᵀ · X`.
//! 4. Eigen-decompose `B · Bᵀ` (an `l x l` symmetric matrix) to get the left
//!    singular vectors and singular values of `B`.
//! 5. Return `U · Σ` for the top `n_components` directions.
//!
//! Sparse products go through `sprs`; the small dense factorizations
//! through `nalgebra`.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprs::CsMat;
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Reduces a sparse matrix to `n_components` dense columns.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    pub n_components: usize,
    pub n_oversamples: usize,
    pub n_iter: usize,
    pub seed: u64,
}

impl TruncatedSvd {
    /// Create a decomposition with 10 oversamples, 5 power iterations and seed 0.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            n_oversamples: 10,
            n_iter: 5,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit on `x` and return its projection, `n_rows x n_components`.
    ///
    /// When `x` has rank room for fewer than `n_components` directions
    /// (few rows or few terms) the trailing columns are zero.
    pub fn fit_transform(&self, x: &CsMat<f64>) -> Array2<f64> {
        let (n_rows, n_cols) = (x.rows(), x.cols());
        let mut reduced = Array2::zeros((n_rows, self.n_components));

        let size = (self.n_components + self.n_oversamples).min(n_rows.min(n_cols));
        if size == 0 || self.n_components == 0 {
            return reduced;
        }

        let xt = x.transpose_view();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut q = gaussian_matrix(n_cols, size, &mut rng);

        for _ in 0..self.n_iter {
            q = orthonormalize(&(x * &q));
            q = orthonormalize(&(&xt * &q));
        }
        let q = orthonormalize(&(x * &q));

        // Bᵀ = Xᵀ · Q, so B · Bᵀ = (Bᵀ)ᵀ · Bᵀ
        let bt: Array2<f64> = &xt * &q;
        let gram = bt.t().dot(&bt);
        let (eigenvalues, eigenvectors) = symmetric_eigen(&gram);

        let u = q.dot(&eigenvectors);
        for (col, &lambda) in eigenvalues.iter().take(self.n_components).enumerate() {
            let sigma = lambda.max(0.0).sqrt();
            let mut column = u.column(col).to_owned();
            flip_sign(&mut column);
            reduced.column_mut(col).assign(&(column * sigma));
        }
        reduced
    }
}

/// Standard normal samples via Box-Muller.
fn gaussian_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, cols), || {
        // 1 - [0, 1) keeps the logarithm finite
        let u1: f64 = 1.0 - rng.random::<f64>();
        let u2: f64 = rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    })
}

fn to_nalgebra(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn from_nalgebra(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Orthonormal basis for the columns of a tall matrix (thin Householder QR).
fn orthonormalize(a: &Array2<f64>) -> Array2<f64> {
    from_nalgebra(&to_nalgebra(a).qr().q())
}

/// Eigen-decomposition of a symmetric matrix, largest eigenvalue first.
///
/// Eigenvectors are returned as columns, in the same order as the values.
fn symmetric_eigen(a: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let eigen = SymmetricEigen::new(to_nalgebra(a));

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let vectors = Array2::from_shape_fn((eigen.eigenvectors.nrows(), order.len()), |(i, j)| {
        eigen.eigenvectors[(i, order[j])]
    });
    (values, vectors)
}

/// Make the largest-magnitude entry of a singular vector positive.
fn flip_sign(column: &mut Array1<f64>) {
    let pivot = column
        .iter()
        .copied()
        .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal));
    if pivot.is_some_and(|p| p < 0.0) {
        column.mapv_inplace(|v| -v);
    }
}
