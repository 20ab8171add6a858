//! Matrix-multiplication workload.

use std::hint::black_box;

use crate::params::{int_param, Bounds, QueryParams};
use crate::timing::Stopwatch;
use crate::WorkloadResult;

/// Default matrix dimension.
pub const DEFAULT_SIZE: usize = 400;
/// Allowed matrix dimension.
pub const SIZE_BOUNDS: Bounds = Bounds::new(50, 1200);

/// Modulus of the fill pattern.
const FILL_MODULUS: usize = 13;

/// Dense square matrix of `f64`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create an all-zero matrix.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Create a matrix whose entry `(i, j)` is `(i + j) mod 13`.
    pub fn filled(size: usize) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                data.push(((i + j) % FILL_MODULUS) as f64);
            }
        }

        Self { size, data }
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "index ({i}, {j}) out of range");
        self.data[i * self.size + j]
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// Compute `self × other` with the row / inner / column loop order.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.size, other.size, "dimension mismatch");

        let n = self.size;
        let mut out = Matrix::zeros(n);

        for i in 0..n {
            let out_row = &mut out.data[i * n..(i + 1) * n];
            for k in 0..n {
                let aik = self.data[i * n + k];
                for (c, b) in out_row.iter_mut().zip(other.row(k)) {
                    *c += aik * b;
                }
            }
        }

        out
    }
}

/// Clamped parameters for the matrix-multiplication workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixParams {
    size: usize,
}

impl MatrixParams {
    /// Create parameters, clamping `size` into range.
    pub fn new(size: i64) -> Self {
        Self {
            size: SIZE_BOUNDS.clamp(size) as usize,
        }
    }

    /// Build from the `n` query parameter.
    pub fn from_query(query: &QueryParams) -> Self {
        Self::new(int_param(query, "n", DEFAULT_SIZE as i64))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Build both operands and multiply them on the calling thread.
    pub fn run(&self) -> WorkloadResult {
        let watch = Stopwatch::start();
        let a = Matrix::filled(self.size);
        let b = Matrix::filled(self.size);
        black_box(a.multiply(&b));

        WorkloadResult::Matmul {
            n: self.size,
            ms: watch.elapsed_ms(),
        }
    }
}

impl Default for MatrixParams {
    fn default() -> Self {
        Self::from_query(&QueryParams::new())
    }
}
