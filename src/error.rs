use thiserror::Error;

/// Failures surfaced by the sharing core. All of these are local and
/// synchronous; the core never retries and never degrades to a
/// plausible-but-wrong secret.
#[derive(Error, Debug)]
pub enum SharingError {
    #[error("invalid deployment parameters: {0}")]
    InvalidParameters(String),
    #[error("invalid interpolation input: {0}")]
    InvalidInterpolationInput(String),
    #[error("reconstruction needs at least {needed} shares, got {got}")]
    InsufficientShares { needed: usize, got: usize },
    #[error("batched shares have mismatched lengths")]
    MismatchedShareLengths,
    #[error("shares do not lie on a single degree-{0} polynomial")]
    InconsistentShares(u32),
    #[error("missing share under key {0}")]
    MissingShare(String),
    #[error("missing open value under key {0}")]
    MissingOpen(String),
    #[error("no pseudorandom seed material held for this derivation")]
    UnknownSubset,
    #[error("invalid pseudorandom setup material: {0}")]
    InvalidSubset(String),
    #[error("pseudorandom counter exhausted")]
    CounterExhausted,
}
