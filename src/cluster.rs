//! In-process simulation of a whole deployment.
//!
//! Drives `N` independently-owned parties inside one process and routes
//! explicit [`ShareMessage`] values between them. No node ever observes
//! another node's stores; everything crosses the party boundary through a
//! delivered message, exactly as a real transport would carry it.

use ark_ff::PrimeField;
use rand::Rng;

use crate::error::SharingError;
use crate::node::ShareMessage;
use crate::prss::{PrssSetup, PseudoNode};
use crate::shamir::{PartyId, ShamirSharer};

pub struct LocalCluster<F: PrimeField> {
    nodes: Vec<PseudoNode<F>>,
    sharer: ShamirSharer<F>,
}

impl<F: PrimeField> LocalCluster<F> {
    /// Builds `parties` nodes and deals them fresh pseudorandom seed
    /// material.
    pub fn new<R: Rng>(parties: u32, threshold: u32, rng: &mut R) -> Result<Self, SharingError> {
        let setup = PrssSetup::deal(parties, threshold, rng)?;
        let nodes = (1..=parties)
            .map(|i| setup.pseudo_node(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            nodes,
            sharer: ShamirSharer::new(parties, threshold)?,
        })
    }

    pub fn parties(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Read-only access to one node, for assertions.
    pub fn node(&self, id: PartyId) -> Option<&PseudoNode<F>> {
        self.nodes.get(id.checked_sub(1)? as usize)
    }

    /// Runs a local step on every node in turn, the way protocol building
    /// blocks iterate over parties.
    pub fn for_each_node(
        &mut self,
        mut step: impl FnMut(&mut PseudoNode<F>) -> Result<(), SharingError>,
    ) -> Result<(), SharingError> {
        for node in &mut self.nodes {
            step(node)?;
        }
        Ok(())
    }

    /// Trusted-input path: splits each value and stores party `i`'s share
    /// vector at node `i` only. Models the out-of-scope input-distribution
    /// channel.
    pub fn share_input<R: Rng>(&mut self, values: &[F], id: &str, rng: &mut R) {
        for (party, share) in self.sharer.share_many(values, rng) {
            self.nodes[party as usize - 1].set_share(id, share);
        }
    }

    /// Files a public value in every node's opens map, as a broadcast
    /// would.
    pub fn broadcast_open(&mut self, values: &[F], id: &str) {
        for node in &mut self.nodes {
            node.set_open(id, values.to_vec());
        }
    }

    fn route_all(&mut self, shares_id: &str) -> Result<(), SharingError> {
        let messages: Vec<ShareMessage<F>> = self
            .nodes
            .iter()
            .map(|n| n.share_message(shares_id))
            .collect::<Result<_, _>>()?;
        for node in &mut self.nodes {
            for msg in &messages {
                node.deliver(msg)?;
            }
        }
        Ok(())
    }

    /// Every node announces its share of `shares_id`; all announcements are
    /// delivered everywhere; every node reconstructs the public value under
    /// `open_id`.
    pub fn reveal(&mut self, shares_id: &str, open_id: &str) -> Result<(), SharingError> {
        self.route_all(shares_id)?;
        for node in &mut self.nodes {
            node.recover_open(shares_id, open_id)?;
        }
        Ok(())
    }

    /// As [`reveal`](Self::reveal), but the reconstructed value stays in
    /// the shares map under `dest_id`.
    pub fn reveal_to_share(&mut self, shares_id: &str, dest_id: &str) -> Result<(), SharingError> {
        self.route_all(shares_id)?;
        for node in &mut self.nodes {
            node.recover_share(shares_id, dest_id)?;
        }
        Ok(())
    }

    /// Every node locally derives its share of `batch` fresh random values
    /// and files it under `id`.
    pub fn derive_random(&mut self, id: &str, batch: usize) -> Result<(), SharingError> {
        for node in &mut self.nodes {
            let share = node.next_random_share(batch)?;
            node.set_share(id, share);
        }
        Ok(())
    }

    /// Every node locally derives its share of `batch` fresh sharings of
    /// zero and files it under `id`.
    pub fn derive_zero(&mut self, id: &str, batch: usize) -> Result<(), SharingError> {
        for node in &mut self.nodes {
            let share = node.next_zero_share(batch)?;
            node.set_share(id, share);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{UniformRand, Zero};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type F = ark_bls12_381::Fr;

    #[test]
    fn input_reveal_round_trip() {
        let mut rng = ChaCha8Rng::from_seed([51u8; 32]);
        let mut cluster = LocalCluster::<F>::new(4, 1, &mut rng).unwrap();
        let inputs = vec![F::rand(&mut rng), F::rand(&mut rng)];

        cluster.share_input(&inputs, "in", &mut rng);
        cluster.reveal("in", "in").unwrap();
        for i in 1..=4 {
            assert_eq!(cluster.node(i).unwrap().get_open("in").unwrap(), &inputs[..]);
        }
    }

    #[test]
    fn derived_randomness_opens_to_one_consistent_value() {
        let mut rng = ChaCha8Rng::from_seed([52u8; 32]);
        let mut cluster = LocalCluster::<F>::new(4, 1, &mut rng).unwrap();

        cluster.derive_random("r", 2).unwrap();
        cluster.reveal("r", "r").unwrap();
        let reference = cluster.node(1).unwrap().get_open("r").unwrap().to_vec();
        assert_eq!(reference.len(), 2);
        for i in 2..=4 {
            assert_eq!(cluster.node(i).unwrap().get_open("r").unwrap(), &reference[..]);
        }
    }

    #[test]
    fn derived_zero_opens_to_zero() {
        let mut rng = ChaCha8Rng::from_seed([53u8; 32]);
        let mut cluster = LocalCluster::<F>::new(4, 1, &mut rng).unwrap();

        cluster.derive_zero("z", 3).unwrap();
        cluster.reveal("z", "z").unwrap();
        for i in 1..=4 {
            assert_eq!(
                cluster.node(i).unwrap().get_open("z").unwrap(),
                &[F::zero(), F::zero(), F::zero()]
            );
        }
    }

    #[test]
    fn zero_share_rerandomizes_without_changing_the_value() {
        let mut rng = ChaCha8Rng::from_seed([54u8; 32]);
        let mut cluster = LocalCluster::<F>::new(4, 1, &mut rng).unwrap();
        let x = F::from(77u64);

        cluster.share_input(&[x], "x", &mut rng);
        cluster.derive_zero("z", 1).unwrap();
        cluster
            .for_each_node(|node| {
                let masked = node.get_share("x")?[0] + node.get_share("z")?[0];
                node.set_share("masked", vec![masked]);
                Ok(())
            })
            .unwrap();

        cluster.reveal("masked", "masked").unwrap();
        for i in 1..=4 {
            assert_eq!(
                cluster.node(i).unwrap().get_open("masked").unwrap(),
                &[x]
            );
        }
    }

    #[test]
    fn reveal_to_share_keeps_the_result_in_the_shares_store() {
        let mut rng = ChaCha8Rng::from_seed([55u8; 32]);
        let mut cluster = LocalCluster::<F>::new(3, 1, &mut rng).unwrap();
        let x = F::from(13u64);

        cluster.share_input(&[x], "x", &mut rng);
        cluster.reveal_to_share("x", "x_rec").unwrap();
        for i in 1..=3 {
            let node = cluster.node(i).unwrap();
            assert_eq!(node.get_share("x_rec").unwrap(), &[x]);
            assert!(node.get_open("x_rec").is_err());
        }
    }

    #[test]
    fn broadcasts_are_visible_everywhere() {
        let mut rng = ChaCha8Rng::from_seed([56u8; 32]);
        let mut cluster = LocalCluster::<F>::new(3, 1, &mut rng).unwrap();
        cluster.broadcast_open(&[F::from(2u64)], "c");
        for i in 1..=3 {
            assert_eq!(
                cluster.node(i).unwrap().get_open("c").unwrap(),
                &[F::from(2u64)]
            );
        }
    }
}
