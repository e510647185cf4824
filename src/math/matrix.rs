use std::fmt;
use std::ops::{AddAssign, DivAssign, Mul, MulAssign, Neg, SubAssign};

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::{NnError, Result};
use crate::math::scalar::Scalar;

/// Dense row-major matrix over a [`Scalar`] element type.
///
/// The backing buffer always holds exactly `rows * cols` values. A `0x0`
/// matrix stands in for "not allocated" (e.g. the weights of an input layer).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

impl<T: Scalar> Matrix<T> {
    /// A `rows x cols` matrix with every cell set to `default_value`.
    pub fn new(rows: usize, cols: usize, default_value: T) -> Matrix<T> {
        Matrix {
            rows,
            cols,
            values: vec![default_value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix<T> {
        Matrix::new(rows, cols, T::zero())
    }

    /// Builds a matrix from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<T>) -> Result<Matrix<T>> {
        if values.len() != rows * cols {
            return Err(NnError::mismatch("from_vec", (rows, cols), (1, values.len())));
        }
        Ok(Matrix { rows, cols, values })
    }

    /// Builds a matrix from nested rows; every row must be `cols` long.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<Vec<T>>) -> Result<Matrix<T>> {
        if data.len() != rows {
            return Err(NnError::mismatch("from_rows", (rows, cols), (data.len(), cols)));
        }
        let mut values = Vec::with_capacity(rows * cols);
        for row in data {
            if row.len() != cols {
                return Err(NnError::mismatch("from_rows", (rows, cols), (rows, row.len())));
            }
            values.extend(row);
        }
        Ok(Matrix { rows, cols, values })
    }

    /// A `1 x n` matrix holding `values`.
    pub fn row_vector(values: Vec<T>) -> Matrix<T> {
        Matrix {
            rows: 1,
            cols: values.len(),
            values,
        }
    }

    /// Samples every cell independently from `U[low, high]`.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: T,
        high: T,
        rng: &mut R,
    ) -> Matrix<T> {
        let mut res = Matrix::zeros(rows, cols);
        res.fill_uniform(low, high, rng);
        res
    }

    /// Overwrites every cell with an independent draw from `U[low, high]`.
    pub fn fill_uniform<R: Rng + ?Sized>(&mut self, low: T, high: T, rng: &mut R) {
        let distribution = Uniform::new_inclusive(low, high);
        for v in self.values.iter_mut() {
            *v = distribution.sample(rng);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// The cells of row `row`.
    pub fn row(&self, row: usize) -> Result<&[T]> {
        if row >= self.rows {
            return Err(self.out_of_bounds(row, 0));
        }
        Ok(&self.values[row * self.cols..(row + 1) * self.cols])
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let idx = self.index_of(row, col)?;
        Ok(self.values[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let idx = self.index_of(row, col)?;
        self.values[idx] = value;
        Ok(())
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(self.out_of_bounds(row, col));
        }
        Ok(row * self.cols + col)
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> NnError {
        NnError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    fn ensure_same_shape(&self, rhs: &Matrix<T>, operation: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(NnError::mismatch(operation, self.shape(), rhs.shape()));
        }
        Ok(())
    }

    pub fn add_assign_matrix(&mut self, rhs: &Matrix<T>) -> Result<()> {
        self.ensure_same_shape(rhs, "add")?;
        for (l, r) in self.values.iter_mut().zip(rhs.values.iter()) {
            *l = *l + *r;
        }
        Ok(())
    }

    pub fn sub_assign_matrix(&mut self, rhs: &Matrix<T>) -> Result<()> {
        self.ensure_same_shape(rhs, "subtract")?;
        for (l, r) in self.values.iter_mut().zip(rhs.values.iter()) {
            *l = *l - *r;
        }
        Ok(())
    }

    /// Element-wise (Hadamard) product, in place.
    pub fn hadamard_assign(&mut self, rhs: &Matrix<T>) -> Result<()> {
        self.ensure_same_shape(rhs, "hadamard")?;
        for (l, r) in self.values.iter_mut().zip(rhs.values.iter()) {
            *l = *l * *r;
        }
        Ok(())
    }

    /// Replaces `self` with `self · rhs`; the shape becomes `(self.rows, rhs.cols)`.
    pub fn mul_assign_matrix(&mut self, rhs: &Matrix<T>) -> Result<()> {
        *self = self.dot(rhs)?;
        Ok(())
    }

    pub fn add(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        let mut res = self.clone();
        res.add_assign_matrix(rhs)?;
        Ok(res)
    }

    pub fn sub(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        let mut res = self.clone();
        res.sub_assign_matrix(rhs)?;
        Ok(res)
    }

    /// Matrix product using the textbook triple loop.
    pub fn dot(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != rhs.rows {
            return Err(NnError::mismatch("product", self.shape(), rhs.shape()));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut sum = T::zero();

                for k in 0..self.cols {
                    sum = sum + self.values[i * self.cols + k] * rhs.values[k * rhs.cols + j];
                }

                res.values[i * rhs.cols + j] = sum;
            }
        }

        Ok(res)
    }

    pub fn transpose(&self) -> Matrix<T> {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.values[j * self.rows + i] = self.values[i * self.cols + j];
            }
        }

        res
    }

    /// Applies `functor` to every cell in place, row-major.
    pub fn apply<F>(&mut self, functor: F)
    where
        F: Fn(T) -> T,
    {
        for v in self.values.iter_mut() {
            *v = functor(*v);
        }
    }

    pub fn map<F>(&self, functor: F) -> Matrix<T>
    where
        F: Fn(T) -> T,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            values: self.values.iter().map(|&v| functor(v)).collect(),
        }
    }

    /// Index of the largest cell in row-major order; the first one wins ties.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &v) in self.values.iter().enumerate() {
            match best {
                None => best = Some(i),
                Some(b) if v > self.values[b] => best = Some(i),
                _ => {}
            }
        }
        best
    }
}

impl<T: Scalar> Default for Matrix<T> {
    fn default() -> Self {
        Matrix {
            rows: 0,
            cols: 0,
            values: vec![],
        }
    }
}

impl<T: Scalar> AddAssign<T> for Matrix<T> {
    fn add_assign(&mut self, rhs: T) {
        self.apply(|v| v + rhs);
    }
}

impl<T: Scalar> SubAssign<T> for Matrix<T> {
    fn sub_assign(&mut self, rhs: T) {
        self.apply(|v| v - rhs);
    }
}

impl<T: Scalar> MulAssign<T> for Matrix<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.apply(|v| v * rhs);
    }
}

impl<T: Scalar> DivAssign<T> for Matrix<T> {
    fn div_assign(&mut self, rhs: T) {
        self.apply(|v| v / rhs);
    }
}

impl<T: Scalar> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(mut self, rhs: T) -> Self::Output {
        self *= rhs;
        self
    }
}

impl<T: Scalar> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(mut self) -> Self::Output {
        self.apply(|v| -v);
        self
    }
}

/// Rows are space-separated and newline-separated, with no trailing newline.
/// A precision on the formatter (`{:.20}`) is applied to every value.
impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for j in 0..self.cols {
                if j > 0 {
                    f.write_str(" ")?;
                }
                let v = self.values[i * self.cols + j];
                match f.precision() {
                    Some(p) => write!(f, "{:.*}", p, v)?,
                    None => write!(f, "{}", v)?,
                }
            }
            if i + 1 < self.rows {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
