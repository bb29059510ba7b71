// SPDX-License-Identifier: Apache-2.0

//! # BGW-style threshold secret sharing
//!
//! The sharing, reconstruction, and pseudorandom-sharing substrate of a
//! passive-security multi-party computation: Shamir secret sharing over a
//! prime field, Lagrange-interpolation reconstruction, and non-interactive
//! pseudorandom secret sharing (PRSS) that lets every party locally derive
//! fresh shares of random values and fresh sharings of zero from
//! pre-distributed per-subset seeds.
//!
//! ## Overview
//!
//! - [`poly`] — Lagrange basis polynomials, symbolic interpolation, and the
//!   evaluation-at-zero fast path used for recovery.
//! - [`shamir`] — [`ShamirSharer`]: split a secret into `N` shares with
//!   reconstruction threshold `T + 1`, reconstruct from any quorum.
//! - [`node`] — [`Node`]: one party's keyed share/open stores, the wire-key
//!   contract, and reconstruction from delivered shares.
//! - [`prss`] — [`PseudoNode`]: non-interactive derivation of random and
//!   zero sharings, plus the trusted dealer for simulated deployments.
//! - [`cluster`] — [`LocalCluster`]: an in-process deployment that routes
//!   explicit messages between independently-owned nodes.
//!
//! The crate is generic over the field: anything implementing `ark-ff`'s
//! `PrimeField` works, and all protocol values are elements of that one
//! field for the lifetime of a deployment. Network transport, the secure
//! seed-distribution step, and the arithmetic-circuit layer on top are all
//! consumed at interfaces only.

pub mod cluster;
pub mod error;
pub mod node;
pub mod poly;
pub mod prss;
pub mod shamir;

pub use cluster::LocalCluster;
pub use error::SharingError;
pub use node::{wire_key, Node, ShareMessage};
pub use prss::{qualified_subsets, PrssSetup, PseudoNode, SubsetKey};
pub use shamir::{PartyId, ShamirSharer};
