//! # Shamir Secret Sharing
//!
//! Splits a secret into `N` shares such that any `T + 1` of them reconstruct
//! the secret, while `T` or fewer reveal nothing about it. The secret is
//! encoded as the constant term of a random degree-`T` polynomial and shares
//! are its evaluations at the fixed party abscissas `1..=N`.
//!
//! `T + 1` is both the minimum reconstruction quorum and the upper bound on
//! tolerated corruptions; [`ShamirSharer`] keeps the two sides of that
//! trade-off on a single pair of parameters so `share` and `recover` cannot
//! drift apart.

use std::collections::HashSet;
use std::marker::PhantomData;

use ark_ff::{One, PrimeField, UniformRand, Zero};
use ark_poly::{univariate::DensePolynomial, Polynomial};
use log::warn;
use rand::Rng;

use crate::error::SharingError;
use crate::poly;

/// Fixed public abscissa of a party, in `1..=N`. Stable for the lifetime of
/// a deployment.
pub type PartyId = u32;

pub(crate) fn abscissa<F: PrimeField>(id: PartyId) -> F {
    F::from(u64::from(id))
}

/// Splits and reconstructs secrets for a fixed `(N, T)` deployment.
#[derive(Clone, Debug)]
pub struct ShamirSharer<F: PrimeField> {
    parties: u32,
    threshold: u32,
    _field: PhantomData<F>,
}

impl<F: PrimeField> ShamirSharer<F> {
    /// `parties` is the network size `N`, `threshold` the corruption bound
    /// `T < N`. Correctness against `T` corrupted or unavailable parties
    /// additionally needs `N >= 2T + 1`, which is warned about but not
    /// enforced.
    pub fn new(parties: u32, threshold: u32) -> Result<Self, SharingError> {
        if parties == 0 {
            return Err(SharingError::InvalidParameters(
                "network size must be positive".into(),
            ));
        }
        if threshold >= parties {
            return Err(SharingError::InvalidParameters(format!(
                "threshold {threshold} must be below the network size {parties}"
            )));
        }
        if parties < 2 * threshold + 1 {
            warn!(
                "{parties} parties cannot tolerate {threshold} corruptions; \
                 at least {} are needed",
                2 * threshold + 1
            );
        }
        Ok(Self {
            parties,
            threshold,
            _field: PhantomData,
        })
    }

    pub fn parties(&self) -> u32 {
        self.parties
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    // degree-T polynomial whose evaluation at x = 0 is the secret
    fn sample_poly<R: Rng>(&self, secret: &F, rng: &mut R) -> DensePolynomial<F> {
        let coeffs: Vec<F> = (0..=self.threshold)
            .map(|i| if i == 0 { *secret } else { F::rand(rng) })
            .collect();
        DensePolynomial { coeffs }
    }

    /// Splits `secret` into one share per party. Any `T` or fewer of the
    /// returned shares are information-theoretically independent of the
    /// secret.
    pub fn share<R: Rng>(&self, secret: &F, rng: &mut R) -> Vec<(PartyId, F)> {
        let poly = self.sample_poly(secret, rng);
        (1..=self.parties)
            .map(|i| (i, poly.evaluate(&abscissa(i))))
            .collect()
    }

    /// Component-wise batched variant of [`share`](Self::share): each party
    /// receives a vector with its share of every secret.
    pub fn share_many<R: Rng>(&self, secrets: &[F], rng: &mut R) -> Vec<(PartyId, Vec<F>)> {
        let polys: Vec<DensePolynomial<F>> = secrets
            .iter()
            .map(|s| self.sample_poly(s, rng))
            .collect();
        (1..=self.parties)
            .map(|i| {
                let x = abscissa(i);
                (i, polys.iter().map(|p| p.evaluate(&x)).collect())
            })
            .collect()
    }

    fn check_quorum(&self, ids: &[PartyId]) -> Result<(), SharingError> {
        if ids.iter().any(|&i| i == 0 || i > self.parties) {
            return Err(SharingError::InvalidParameters(format!(
                "share abscissa outside 1..={}",
                self.parties
            )));
        }
        let mut seen = HashSet::new();
        if ids.iter().any(|i| !seen.insert(*i)) {
            return Err(SharingError::InvalidInterpolationInput(
                "duplicate party abscissas".into(),
            ));
        }
        let needed = self.threshold as usize + 1;
        if ids.len() < needed {
            return Err(SharingError::InsufficientShares {
                needed,
                got: ids.len(),
            });
        }
        Ok(())
    }

    /// Reconstructs the secret from at least `T + 1` distinct shares by
    /// interpolating through all supplied points and evaluating at zero.
    ///
    /// Extra consistent points of a degree-`T` sharing do not change the
    /// result, and full-width interpolation also reconstructs the
    /// degree-`2T` zero-sharings produced by the pseudorandom layer when all
    /// `N` shares are supplied.
    pub fn recover(&self, shares: &[(PartyId, F)]) -> Result<F, SharingError> {
        let ids: Vec<PartyId> = shares.iter().map(|(i, _)| *i).collect();
        self.check_quorum(&ids)?;
        let points: Vec<(F, F)> = shares
            .iter()
            .map(|(i, y)| (abscissa::<F>(*i), *y))
            .collect();
        poly::interpolate_at_zero(&points)
    }

    /// Like [`recover`](Self::recover), but additionally fails with
    /// [`SharingError::InconsistentShares`] unless every supplied share lies
    /// on one degree-`<= T` polynomial. Only applicable to plain degree-`T`
    /// sharings; zero-sharings are degree `2T` by construction and go
    /// through `recover`.
    pub fn recover_checked(&self, shares: &[(PartyId, F)]) -> Result<F, SharingError> {
        let ids: Vec<PartyId> = shares.iter().map(|(i, _)| *i).collect();
        self.check_quorum(&ids)?;
        let xs: Vec<F> = ids.iter().map(|&i| abscissa(i)).collect();
        let ys: Vec<F> = shares.iter().map(|(_, y)| *y).collect();
        let f = poly::interpolate(&xs, &ys)?;
        if f.degree() > self.threshold as usize {
            return Err(SharingError::InconsistentShares(self.threshold));
        }
        Ok(f.coeffs.first().copied().unwrap_or_else(F::zero))
    }

    /// Batched reconstruction: the Lagrange coefficients at zero are
    /// computed once and reused across every component.
    pub fn recover_many(&self, shares: &[(PartyId, Vec<F>)]) -> Result<Vec<F>, SharingError> {
        let ids: Vec<PartyId> = shares.iter().map(|(i, _)| *i).collect();
        self.check_quorum(&ids)?;
        let width = shares.first().map_or(0, |(_, v)| v.len());
        if shares.iter().any(|(_, v)| v.len() != width) {
            return Err(SharingError::MismatchedShareLengths);
        }
        let xs: Vec<F> = ids.iter().map(|&i| abscissa(i)).collect();
        let coefficients = poly::lagrange_coefficients_at_zero(&xs)?;
        let values = (0..width)
            .map(|k| {
                shares
                    .iter()
                    .zip(coefficients.iter())
                    .fold(F::zero(), |acc, ((_, v), c)| acc + v[k] * c)
            })
            .collect();
        Ok(values)
    }
}
