//! Per-party protocol state: a keyed store of secret shares, a keyed store
//! of publicly opened values, and the reconstruction step that turns
//! delivered shares back into a value.
//!
//! A `Node` is exclusively owned by one logical party. Nothing here reaches
//! into another party's state; everything that crosses a party boundary is
//! packaged as a [`ShareMessage`] and has to be [`deliver`](Node::deliver)ed
//! explicitly by whatever transport the host provides.

use std::collections::HashMap;

use ark_ff::PrimeField;
use log::debug;

use crate::error::SharingError;
use crate::shamir::{PartyId, ShamirSharer};

/// Store key under which party `sender`'s announced share of `shares_id`
/// must be delivered before reconstruction. This is the only cross-party
/// naming convention the core assumes.
pub fn wire_key(shares_id: &str, sender: PartyId) -> String {
    format!("_{shares_id}_node_{sender}")
}

/// One party's announced share of a named sharing, in transit.
#[derive(Clone, Debug)]
pub struct ShareMessage<F: PrimeField> {
    pub sender: PartyId,
    pub shares_id: String,
    pub values: Vec<F>,
}

/// One party's view of in-flight secret-sharing state. Entries are
/// vector-valued so batched sharings travel the same paths as scalars
/// (a scalar is a length-1 vector).
#[derive(Debug)]
pub struct Node<F: PrimeField> {
    id: PartyId,
    sharer: ShamirSharer<F>,
    shares: HashMap<String, Vec<F>>,
    opens: HashMap<String, Vec<F>>,
}

impl<F: PrimeField> Node<F> {
    pub fn new(id: PartyId, parties: u32, threshold: u32) -> Result<Self, SharingError> {
        if id == 0 || id > parties {
            return Err(SharingError::InvalidParameters(format!(
                "party id {id} outside 1..={parties}"
            )));
        }
        Ok(Self {
            id,
            sharer: ShamirSharer::new(parties, threshold)?,
            shares: HashMap::new(),
            opens: HashMap::new(),
        })
    }

    pub fn id(&self) -> PartyId {
        self.id
    }

    pub fn parties(&self) -> u32 {
        self.sharer.parties()
    }

    pub fn threshold(&self) -> u32 {
        self.sharer.threshold()
    }

    pub fn sharer(&self) -> &ShamirSharer<F> {
        &self.sharer
    }

    pub fn set_share(&mut self, id: &str, values: Vec<F>) {
        self.shares.insert(id.to_string(), values);
    }

    pub fn get_share(&self, id: &str) -> Result<&[F], SharingError> {
        self.shares
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| SharingError::MissingShare(id.to_string()))
    }

    /// Removes and returns, so a consumed share cannot be reused stale.
    pub fn pop_share(&mut self, id: &str) -> Result<Vec<F>, SharingError> {
        self.shares
            .remove(id)
            .ok_or_else(|| SharingError::MissingShare(id.to_string()))
    }

    pub fn set_open(&mut self, id: &str, values: Vec<F>) {
        self.opens.insert(id.to_string(), values);
    }

    pub fn get_open(&self, id: &str) -> Result<&[F], SharingError> {
        self.opens
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| SharingError::MissingOpen(id.to_string()))
    }

    pub fn pop_open(&mut self, id: &str) -> Result<Vec<F>, SharingError> {
        self.opens
            .remove(id)
            .ok_or_else(|| SharingError::MissingOpen(id.to_string()))
    }

    /// Packages this node's own share of `shares_id` for announcement to the
    /// other parties. Non-destructive; the local entry stays in place.
    pub fn share_message(&self, shares_id: &str) -> Result<ShareMessage<F>, SharingError> {
        let values = self.get_share(shares_id)?.to_vec();
        Ok(ShareMessage {
            sender: self.id,
            shares_id: shares_id.to_string(),
            values,
        })
    }

    /// Files a received announcement under its wire key.
    pub fn deliver(&mut self, msg: &ShareMessage<F>) -> Result<(), SharingError> {
        if msg.sender == 0 || msg.sender > self.parties() {
            return Err(SharingError::InvalidParameters(format!(
                "message from unknown party {}",
                msg.sender
            )));
        }
        self.shares
            .insert(wire_key(&msg.shares_id, msg.sender), msg.values.clone());
        Ok(())
    }

    // All-or-nothing: the store is left untouched unless every party's
    // share has been delivered.
    fn take_delivered(&mut self, shares_id: &str) -> Result<Vec<(PartyId, Vec<F>)>, SharingError> {
        for i in 1..=self.parties() {
            let key = wire_key(shares_id, i);
            if !self.shares.contains_key(&key) {
                return Err(SharingError::MissingShare(key));
            }
        }
        let mut collected = Vec::with_capacity(self.parties() as usize);
        for i in 1..=self.parties() {
            collected.push((i, self.pop_share(&wire_key(shares_id, i))?));
        }
        Ok(collected)
    }

    /// Consumes the delivered shares of `shares_id` from every party,
    /// reconstructs component-wise, and stores the result as the public
    /// value `open_id`.
    pub fn recover_open(&mut self, shares_id: &str, open_id: &str) -> Result<(), SharingError> {
        let collected = self.take_delivered(shares_id)?;
        let values = self.sharer.recover_many(&collected)?;
        debug!(
            "node {}: opened {} value(s) of {shares_id} as {open_id}",
            self.id,
            values.len()
        );
        self.set_open(open_id, values);
        Ok(())
    }

    /// As [`recover_open`](Self::recover_open), but the reconstructed value
    /// is re-stored as a share under `dest_id`, for when it must remain part
    /// of a larger secret-shared computation.
    pub fn recover_share(&mut self, shares_id: &str, dest_id: &str) -> Result<(), SharingError> {
        let collected = self.take_delivered(shares_id)?;
        let values = self.sharer.recover_many(&collected)?;
        self.set_share(dest_id, values);
        Ok(())
    }
}
