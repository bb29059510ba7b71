//! Lagrange basis polynomials and interpolation over a prime field.
//!
//! Reconstruction mostly needs a single evaluation at `x = 0`, for which
//! [`interpolate_at_zero`] avoids building the full polynomial. The symbolic
//! forms ([`lagrange_basis`], [`interpolate`]) are used where the whole
//! polynomial matters, e.g. for degree checks and for deriving the
//! pseudorandom-sharing coefficients.

use std::collections::HashSet;

use ark_ff::{Field, One, PrimeField, Zero};
use ark_poly::univariate::DensePolynomial;

use crate::error::SharingError;

fn contains_duplicates<F: PrimeField>(xs: &[F]) -> bool {
    let mut seen = HashSet::new();
    xs.iter().any(|x| !seen.insert(*x))
}

/// computes polynomial c . f(x), for some constant c and input polynomial f(x)
fn mul_constant<F: PrimeField>(f: &DensePolynomial<F>, c: &F) -> DensePolynomial<F> {
    DensePolynomial {
        coeffs: f.coeffs.iter().map(|a| *a * c).collect(),
    }
}

/// Builds the Lagrange basis over the given abscissas: the i-th polynomial
/// has degree `xs.len() - 1`, equals 1 at `xs[i]` and 0 at every other
/// abscissa.
pub fn lagrange_basis<F: PrimeField>(
    xs: &[F],
) -> Result<Vec<DensePolynomial<F>>, SharingError> {
    if xs.is_empty() {
        return Err(SharingError::InvalidInterpolationInput(
            "no abscissas".into(),
        ));
    }
    if contains_duplicates(xs) {
        return Err(SharingError::InvalidInterpolationInput(
            "duplicate abscissas".into(),
        ));
    }

    let mut basis = Vec::with_capacity(xs.len());
    for (i, &x_i) in xs.iter().enumerate() {
        let mut numerator = DensePolynomial {
            coeffs: vec![F::one()],
        };
        let mut denominator = F::one();
        for (j, &x_j) in xs.iter().enumerate() {
            if i != j {
                numerator = numerator.naive_mul(&DensePolynomial {
                    coeffs: vec![-x_j, F::one()],
                });
                denominator *= x_i - x_j;
            }
        }
        // one field inversion per basis polynomial
        let inv = denominator.inverse().ok_or_else(|| {
            SharingError::InvalidInterpolationInput("duplicate abscissas".into())
        })?;
        basis.push(mul_constant(&numerator, &inv));
    }
    Ok(basis)
}

/// The unique polynomial of degree `< xs.len()` through the given points,
/// with ascending coefficients and no trailing zeros.
pub fn interpolate<F: PrimeField>(
    xs: &[F],
    ys: &[F],
) -> Result<DensePolynomial<F>, SharingError> {
    if xs.len() != ys.len() {
        return Err(SharingError::InvalidInterpolationInput(format!(
            "{} abscissas against {} ordinates",
            xs.len(),
            ys.len()
        )));
    }
    let basis = lagrange_basis(xs)?;

    let mut sum = DensePolynomial { coeffs: Vec::new() };
    for (l_i, y_i) in basis.iter().zip(ys) {
        sum = &sum + &mul_constant(l_i, y_i);
    }
    // canonical form: strip trailing zero coefficients
    while sum.coeffs.last().map_or(false, |c| c.is_zero()) {
        sum.coeffs.pop();
    }
    Ok(sum)
}

/// Compute the Lagrange coefficients at x=0.
///
/// The i-th coefficient is `numerator_i / denominator_i` where
/// `numerator_i` is the product of all `xs[j]` for `j != i` (the usual
/// subtractions drop out at zero) and `denominator_i` is the product of
/// `xs[j] - xs[i]` over `j != i`. Numerators are assembled from running
/// prefix and suffix products, so the whole vector costs two passes plus
/// one inversion per coefficient.
pub fn lagrange_coefficients_at_zero<F: PrimeField>(
    xs: &[F],
) -> Result<Vec<F>, SharingError> {
    let len = xs.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    if len == 1 {
        return Ok(vec![F::one()]);
    }
    if contains_duplicates(xs) {
        return Err(SharingError::InvalidInterpolationInput(
            "duplicate abscissas".into(),
        ));
    }

    let mut coefficients: Vec<F> = Vec::with_capacity(len);
    let mut tmp = F::one();
    coefficients.push(tmp);
    for x in xs.iter().take(len - 1) {
        tmp *= x;
        coefficients.push(tmp);
    }
    tmp = F::one();
    for (i, x) in xs[1..].iter().enumerate().rev() {
        tmp *= x;
        coefficients[i] *= tmp;
    }

    for (i, (coefficient, &x_i)) in coefficients.iter_mut().zip(xs).enumerate() {
        let mut denom = F::one();
        for (_, &x_j) in xs.iter().enumerate().filter(|(j, _)| *j != i) {
            denom *= x_j - x_i;
        }
        let inv = denom.inverse().ok_or_else(|| {
            SharingError::InvalidInterpolationInput("duplicate abscissas".into())
        })?;
        *coefficient *= inv;
    }
    Ok(coefficients)
}

/// Evaluation-only fast path: the value at zero of the unique polynomial
/// through the given points.
pub fn interpolate_at_zero<F: PrimeField>(
    points: &[(F, F)],
) -> Result<F, SharingError> {
    let xs: Vec<F> = points.iter().map(|(x, _)| *x).collect();
    let coefficients = lagrange_coefficients_at_zero(&xs)?;
    let value = points
        .iter()
        .zip(coefficients.iter())
        .fold(F::zero(), |acc, ((_, y), c)| acc + *y * c);
    Ok(value)
}
