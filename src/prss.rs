//! # Pseudorandom Secret Sharing
//!
//! Lets every party locally derive fresh secret shares of a random value, or
//! a fresh sharing of zero, without exchanging a single message. The trick
//! is pre-distributed correlated seed material: every qualified subset `A`
//! of `N - T` parties holds a common seed, and a party's share is
//!
//! ```text
//! share = sum over held subsets A of  c_A * PRG(seed_A, counter)
//! ```
//!
//! where `c_A` is the evaluation at this party's abscissa of a polynomial
//! that vanishes on the complement of `A`. Parties outside `A` would
//! contribute a zero coefficient, which is why restricting the sum to held
//! subsets still yields one consistent global sharing. The coefficients are
//! precomputed at construction; the only run-time state is a counter that
//! every party advances identically by making the same sequence of calls.
//!
//! Getting a coefficient wrong does not produce obviously broken output,
//! it produces a *biased* random share. The derivations below therefore
//! lean entirely on the interpolation layer rather than on any closed-form
//! shortcut.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use ark_ff::{One, PrimeField, UniformRand, Zero};
use ark_poly::Polynomial;
use ark_serialize::CanonicalSerialize;
use log::debug;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::error::SharingError;
use crate::node::Node;
use crate::poly;
use crate::shamir::{abscissa, PartyId};

/// Strictly ascending tuple of the `N - T` party ids sharing one
/// pre-distributed seed.
pub type SubsetKey = Vec<PartyId>;

/// All qualified subsets of a deployment: the ascending `(N - T)`-subsets
/// of `1..=N`, in lexicographic order. Returns nothing for degenerate
/// parameters.
pub fn qualified_subsets(parties: u32, threshold: u32) -> Vec<SubsetKey> {
    if parties == 0 || threshold >= parties {
        return Vec::new();
    }
    let n = parties as usize;
    let k = (parties - threshold) as usize;

    let mut subsets = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        subsets.push(idx.iter().map(|&i| (i + 1) as PartyId).collect());
        let mut i = k;
        while i > 0 && idx[i - 1] == i - 1 + n - k {
            i -= 1;
        }
        if i == 0 {
            break;
        }
        idx[i - 1] += 1;
        for j in i..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
    subsets
}

fn validate_subset(
    subset: &[PartyId],
    parties: u32,
    threshold: u32,
    owner: PartyId,
) -> Result<(), SharingError> {
    let expected = (parties - threshold) as usize;
    if subset.len() != expected {
        return Err(SharingError::InvalidSubset(format!(
            "subset {subset:?} must name exactly {expected} parties"
        )));
    }
    if !subset.windows(2).all(|w| w[0] < w[1]) {
        return Err(SharingError::InvalidSubset(format!(
            "subset {subset:?} is not strictly ascending"
        )));
    }
    if subset.iter().any(|&p| p == 0 || p > parties) {
        return Err(SharingError::InvalidSubset(format!(
            "subset {subset:?} names parties outside 1..={parties}"
        )));
    }
    if !subset.contains(&owner) {
        return Err(SharingError::InvalidSubset(format!(
            "subset {subset:?} does not contain this party ({owner})"
        )));
    }
    Ok(())
}

// Evaluation at `id` of the unique degree-T polynomial that is 1 at zero
// and 0 at every party outside the subset.
fn random_coefficient<F: PrimeField>(
    subset: &[PartyId],
    parties: u32,
    id: PartyId,
) -> Result<F, SharingError> {
    let mut xs = vec![F::zero()];
    let mut ys = vec![F::one()];
    for p in 1..=parties {
        if !subset.contains(&p) {
            xs.push(abscissa(p));
            ys.push(F::zero());
        }
    }
    let f = poly::interpolate(&xs, &ys)?;
    Ok(f.evaluate(&abscissa(id)))
}

// Evaluations at `id` of the degree-2T polynomials that vanish at zero and
// at every party outside the subset, with rank `r` injected on the
// extension points N+1..=N+T: 1 on the first `r` of them, 0 on the rest.
// Together the T ranks span exactly the fresh randomness of a degree-2T
// sharing of zero.
fn zero_coefficients<F: PrimeField>(
    subset: &[PartyId],
    parties: u32,
    threshold: u32,
    id: PartyId,
) -> Result<Vec<F>, SharingError> {
    let mut xs = vec![F::zero()];
    for p in 1..=parties {
        if !subset.contains(&p) {
            xs.push(abscissa(p));
        }
    }
    let extension_base = xs.len();
    for e in parties + 1..=parties + threshold {
        xs.push(abscissa(e));
    }

    let own = abscissa::<F>(id);
    let mut coefficients = Vec::with_capacity(threshold as usize);
    for rank in 1..=threshold as usize {
        let mut ys = vec![F::zero(); xs.len()];
        for k in 0..rank {
            ys[extension_base + k] = F::one();
        }
        let g = poly::interpolate(&xs, &ys)?;
        coefficients.push(g.evaluate(&own));
    }
    Ok(coefficients)
}

// Deterministic expansion of one (seed, counter) pair into `batch` field
// elements: the mixed seed is canonically serialized, hashed to a 32-byte
// key, and the key drives a ChaCha20 stream.
fn prg_elements<F: PrimeField>(seed: &F, counter: u64, batch: usize) -> Vec<F> {
    let mixed = *seed + F::from(counter);
    let mut buf = Vec::new();
    // serialization into a growable buffer cannot fail
    mixed.serialize_compressed(&mut buf).unwrap();
    let mut hasher = Sha256::new();
    hasher.update(&buf);
    let key: [u8; 32] = hasher.finalize().into();
    let mut rng = ChaCha20Rng::from_seed(key);
    (0..batch).map(|_| F::rand(&mut rng)).collect()
}

/// Trusted-dealer stand-in for the secure offline seed distribution.
///
/// Real deployments obtain their seed maps out of band from a setup
/// protocol this crate does not define; the dealer exists so one process
/// can set up a simulated deployment and hand every party exactly the
/// material for the subsets it belongs to.
#[derive(Clone, Debug)]
pub struct PrssSetup<F: PrimeField> {
    parties: u32,
    threshold: u32,
    random_seeds: BTreeMap<SubsetKey, F>,
    zero_seeds: BTreeMap<SubsetKey, Vec<F>>,
}

impl<F: PrimeField> PrssSetup<F> {
    /// Draws one seed per qualified subset for the random derivation and an
    /// ordered list of `T` seeds per subset for the zero derivation.
    pub fn deal<R: Rng>(parties: u32, threshold: u32, rng: &mut R) -> Result<Self, SharingError> {
        if parties == 0 || threshold >= parties {
            return Err(SharingError::InvalidParameters(format!(
                "cannot deal seeds for {parties} parties at threshold {threshold}"
            )));
        }
        let mut random_seeds = BTreeMap::new();
        let mut zero_seeds = BTreeMap::new();
        for subset in qualified_subsets(parties, threshold) {
            random_seeds.insert(subset.clone(), F::rand(rng));
            zero_seeds.insert(subset, (0..threshold).map(|_| F::rand(rng)).collect());
        }
        debug!(
            "dealt seeds for {} qualified subsets ({parties} parties, threshold {threshold})",
            random_seeds.len()
        );
        Ok(Self {
            parties,
            threshold,
            random_seeds,
            zero_seeds,
        })
    }

    /// The random-derivation seed map for one party: only the subsets the
    /// party belongs to.
    pub fn random_seeds_for(&self, id: PartyId) -> BTreeMap<SubsetKey, F> {
        self.random_seeds
            .iter()
            .filter(|(subset, _)| subset.contains(&id))
            .map(|(subset, seed)| (subset.clone(), *seed))
            .collect()
    }

    /// The zero-derivation seed map for one party.
    pub fn zero_seeds_for(&self, id: PartyId) -> BTreeMap<SubsetKey, Vec<F>> {
        self.zero_seeds
            .iter()
            .filter(|(subset, _)| subset.contains(&id))
            .map(|(subset, seeds)| (subset.clone(), seeds.clone()))
            .collect()
    }

    /// Builds the party's node seeded with its slice of the material.
    pub fn pseudo_node(&self, id: PartyId) -> Result<PseudoNode<F>, SharingError> {
        PseudoNode::new(
            id,
            self.parties,
            self.threshold,
            self.random_seeds_for(id),
            self.zero_seeds_for(id),
        )
    }
}

/// A [`Node`] that can additionally derive fresh shares of random values
/// and fresh sharings of zero without communication.
///
/// The two derivations hold independent seed maps and independent counters.
/// Counters start at 0, advance exactly once per derivation call and never
/// roll back; outputs reconstruct consistently across parties as long as
/// every party makes the same sequence of calls.
pub struct PseudoNode<F: PrimeField> {
    node: Node<F>,
    // per subset: (seed, precomputed coefficient at this party's abscissa)
    random: BTreeMap<SubsetKey, (F, F)>,
    random_counter: u64,
    // per subset and rank: (seed, precomputed coefficient)
    zero: BTreeMap<SubsetKey, Vec<(F, F)>>,
    zero_counter: u64,
}

impl<F: PrimeField> PseudoNode<F> {
    /// Validates the injected setup material and precomputes the
    /// interpolation coefficients once.
    pub fn new(
        id: PartyId,
        parties: u32,
        threshold: u32,
        random_seeds: BTreeMap<SubsetKey, F>,
        zero_seeds: BTreeMap<SubsetKey, Vec<F>>,
    ) -> Result<Self, SharingError> {
        let node = Node::new(id, parties, threshold)?;

        let mut random = BTreeMap::new();
        for (subset, seed) in random_seeds {
            validate_subset(&subset, parties, threshold, id)?;
            let coefficient = random_coefficient(&subset, parties, id)?;
            random.insert(subset, (seed, coefficient));
        }

        let mut zero = BTreeMap::new();
        for (subset, seeds) in zero_seeds {
            validate_subset(&subset, parties, threshold, id)?;
            if seeds.len() != threshold as usize {
                return Err(SharingError::InvalidSubset(format!(
                    "subset {subset:?} carries {} zero seeds, expected {threshold}",
                    seeds.len()
                )));
            }
            let coefficients = zero_coefficients(&subset, parties, threshold, id)?;
            zero.insert(subset, seeds.into_iter().zip(coefficients).collect());
        }

        Ok(Self {
            node,
            random,
            random_counter: 0,
            zero,
            zero_counter: 0,
        })
    }

    pub fn random_counter(&self) -> u64 {
        self.random_counter
    }

    pub fn zero_counter(&self) -> u64 {
        self.zero_counter
    }

    /// Derives this party's share vector of `batch` fresh uniformly random
    /// field elements. Across parties the vectors form degree-`T` sharings
    /// of values no coalition of `T` or fewer parties can predict.
    pub fn next_random_share(&mut self, batch: usize) -> Result<Vec<F>, SharingError> {
        if self.random.is_empty() {
            return Err(SharingError::UnknownSubset);
        }
        // refuse to derive output for a counter value that could not be
        // advanced past afterwards
        let next = self
            .random_counter
            .checked_add(1)
            .ok_or(SharingError::CounterExhausted)?;

        let mut share = vec![F::zero(); batch];
        for (seed, coefficient) in self.random.values() {
            let stream = prg_elements(seed, self.random_counter, batch);
            for (acc, v) in share.iter_mut().zip(stream) {
                *acc += *coefficient * v;
            }
        }
        self.random_counter = next;
        Ok(share)
    }

    /// Derives this party's share vector of `batch` fresh sharings of zero.
    /// Across parties the vectors form degree-`2T` sharings that
    /// reconstruct to exactly zero, used to re-randomize masked values
    /// without revealing anything.
    pub fn next_zero_share(&mut self, batch: usize) -> Result<Vec<F>, SharingError> {
        if self.zero.is_empty() {
            return Err(SharingError::UnknownSubset);
        }
        let next = self
            .zero_counter
            .checked_add(1)
            .ok_or(SharingError::CounterExhausted)?;

        let mut share = vec![F::zero(); batch];
        for ranks in self.zero.values() {
            for (seed, coefficient) in ranks {
                let stream = prg_elements(seed, self.zero_counter, batch);
                for (acc, v) in share.iter_mut().zip(stream) {
                    *acc += *coefficient * v;
                }
            }
        }
        self.zero_counter = next;
        Ok(share)
    }
}

impl<F: PrimeField> Deref for PseudoNode<F> {
    type Target = Node<F>;

    fn deref(&self) -> &Node<F> {
        &self.node
    }
}

impl<F: PrimeField> DerefMut for PseudoNode<F> {
    fn deref_mut(&mut self) -> &mut Node<F> {
        &mut self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shamir::ShamirSharer;
    use rand_chacha::ChaCha8Rng;

    type F = ark_bls12_381::Fr;

    fn seeded_nodes(parties: u32, threshold: u32, seed: u8) -> Vec<PseudoNode<F>> {
        let mut rng = ChaCha8Rng::from_seed([seed; 32]);
        let setup = PrssSetup::<F>::deal(parties, threshold, &mut rng).unwrap();
        (1..=parties).map(|i| setup.pseudo_node(i).unwrap()).collect()
    }

    #[test]
    fn qualified_subsets_enumeration() {
        let subsets = qualified_subsets(4, 1);
        assert_eq!(
            subsets,
            vec![
                vec![1, 2, 3],
                vec![1, 2, 4],
                vec![1, 3, 4],
                vec![2, 3, 4],
            ]
        );
        // C(5, 3) qualified subsets for N=5, T=2
        assert_eq!(qualified_subsets(5, 2).len(), 10);
        assert!(qualified_subsets(3, 3).is_empty());
    }

    #[test]
    fn random_shares_reconstruct_consistently() {
        let mut nodes = seeded_nodes(4, 1, 31);
        let shares: Vec<(PartyId, Vec<F>)> = nodes
            .iter_mut()
            .map(|n| (n.id(), n.next_random_share(3).unwrap()))
            .collect();

        let sharer = ShamirSharer::<F>::new(4, 1).unwrap();
        let reference = sharer.recover_many(&shares[..2]).unwrap();
        assert_eq!(reference.len(), 3);
        // every T+1 quorum agrees on the derived values
        for a in 0..4 {
            for b in a + 1..4 {
                let quorum = vec![shares[a].clone(), shares[b].clone()];
                assert_eq!(sharer.recover_many(&quorum).unwrap(), reference);
            }
        }

        // the next batch is fresh
        let again: Vec<(PartyId, Vec<F>)> = nodes
            .iter_mut()
            .map(|n| (n.id(), n.next_random_share(3).unwrap()))
            .collect();
        assert_ne!(sharer.recover_many(&again).unwrap(), reference);
    }

    #[test]
    fn zero_shares_reconstruct_to_zero() {
        let mut nodes = seeded_nodes(4, 1, 37);
        let shares: Vec<(PartyId, Vec<F>)> = nodes
            .iter_mut()
            .map(|n| (n.id(), n.next_zero_share(2).unwrap()))
            .collect();
        // the shares themselves are not all zero
        assert!(shares.iter().any(|(_, v)| v.iter().any(|y| !y.is_zero())));

        let sharer = ShamirSharer::<F>::new(4, 1).unwrap();
        // zero-sharings are degree 2T, so every 2T+1 quorum reconstructs them
        for skip in 0..4 {
            let quorum: Vec<(PartyId, Vec<F>)> = shares
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != skip)
                .map(|(_, s)| s.clone())
                .collect();
            assert_eq!(
                sharer.recover_many(&quorum).unwrap(),
                vec![F::zero(), F::zero()]
            );
        }
        assert_eq!(
            sharer.recover_many(&shares).unwrap(),
            vec![F::zero(), F::zero()]
        );
    }

    #[test]
    fn counters_advance_once_per_call_and_independently() {
        let mut nodes = seeded_nodes(3, 1, 41);
        let node = &mut nodes[0];
        assert_eq!(node.random_counter(), 0);
        assert_eq!(node.zero_counter(), 0);

        node.next_random_share(4).unwrap();
        node.next_random_share(1).unwrap();
        node.next_zero_share(2).unwrap();
        assert_eq!(node.random_counter(), 2);
        assert_eq!(node.zero_counter(), 1);
    }

    #[test]
    fn derivation_is_deterministic_per_counter() {
        let mut rng = ChaCha8Rng::from_seed([43u8; 32]);
        let setup = PrssSetup::<F>::deal(3, 1, &mut rng).unwrap();
        let mut a = setup.pseudo_node(2).unwrap();
        let mut b = setup.pseudo_node(2).unwrap();
        assert_eq!(
            a.next_random_share(5).unwrap(),
            b.next_random_share(5).unwrap()
        );
        assert_eq!(a.next_zero_share(5).unwrap(), b.next_zero_share(5).unwrap());
    }

    #[test]
    fn missing_seed_material_is_surfaced() {
        let mut node =
            PseudoNode::<F>::new(1, 4, 1, BTreeMap::new(), BTreeMap::new()).unwrap();
        assert!(matches!(
            node.next_random_share(1),
            Err(SharingError::UnknownSubset)
        ));
        assert!(matches!(
            node.next_zero_share(1),
            Err(SharingError::UnknownSubset)
        ));
    }

    #[test]
    fn malformed_setup_material_is_rejected() {
        let seed = F::from(3u64);

        // wrong subset size
        let mut seeds = BTreeMap::new();
        seeds.insert(vec![1, 2], seed);
        assert!(matches!(
            PseudoNode::<F>::new(1, 4, 1, seeds, BTreeMap::new()),
            Err(SharingError::InvalidSubset(_))
        ));

        // owner not a member
        let mut seeds = BTreeMap::new();
        seeds.insert(vec![2, 3, 4], seed);
        assert!(matches!(
            PseudoNode::<F>::new(1, 4, 1, seeds, BTreeMap::new()),
            Err(SharingError::InvalidSubset(_))
        ));

        // out-of-range member
        let mut seeds = BTreeMap::new();
        seeds.insert(vec![1, 2, 5], seed);
        assert!(matches!(
            PseudoNode::<F>::new(1, 4, 1, seeds, BTreeMap::new()),
            Err(SharingError::InvalidSubset(_))
        ));

        // wrong zero-seed list length
        let mut zero_seeds = BTreeMap::new();
        zero_seeds.insert(vec![1, 2, 3], vec![seed, seed]);
        assert!(matches!(
            PseudoNode::<F>::new(1, 4, 1, BTreeMap::new(), zero_seeds),
            Err(SharingError::InvalidSubset(_))
        ));
    }
}
