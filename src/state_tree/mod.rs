// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod cached;

pub use cached::{CachedTree, StateDelta};

use crate::shim::{ActorID, econ::TokenAmount};
use crate::utils::db::CborStoreExt as _;
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use std::collections::BTreeMap;

/// State of all actor implementations.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ActorState {
    /// Link to code for the actor.
    pub code: Cid,
    /// Link to the state of the actor.
    pub state: Cid,
    /// Sequence of the actor.
    pub sequence: u64,
    /// Tokens available to the actor.
    pub balance: TokenAmount,
}

impl ActorState {
    pub fn new(code: Cid, state: Cid, balance: TokenAmount, sequence: u64) -> Self {
        Self {
            code,
            state,
            sequence,
            balance,
        }
    }

    /// Safely deducts funds from an Actor
    pub fn deduct_funds(&mut self, amt: &TokenAmount) -> anyhow::Result<()> {
        if &self.balance < amt {
            anyhow::bail!("not enough funds: {} < {}", self.balance, amt);
        }
        self.balance -= amt;
        Ok(())
    }

    /// Deposits funds to an Actor
    pub fn deposit_funds(&mut self, amt: &TokenAmount) {
        self.balance += amt;
    }
}

/// Read access to a versioned mapping from actor IDs to actor states.
///
/// A missing actor is `Ok(None)`, distinguishable from a storage failure.
pub trait StateTree {
    fn get_actor(&self, id: ActorID) -> anyhow::Result<Option<ActorState>>;

    /// Root reference of the committed state.
    fn root(&self) -> Cid;
}

impl<T: StateTree + ?Sized> StateTree for &T {
    fn get_actor(&self, id: ActorID) -> anyhow::Result<Option<ActorState>> {
        (**self).get_actor(id)
    }

    fn root(&self) -> Cid {
        (**self).root()
    }
}

/// A state tree that accepts the changes accumulated by a [`CachedTree`].
pub trait StateTreeMut: StateTree {
    /// Applies every change of `delta` and returns the new root. Either all
    /// changes become visible or, on error, none do.
    fn commit(&mut self, delta: StateDelta) -> anyhow::Result<Cid>;
}

/// Serialized form of a [`MemStateTree`] root.
#[derive(Serialize_tuple, Deserialize_tuple)]
struct StateRoot {
    version: u64,
    actors: Vec<(ActorID, ActorState)>,
}

const STATE_ROOT_VERSION: u64 = 0;

/// State tree held in memory and flushed to a block store on every commit.
///
/// This structure is not thread-safe for writers; concurrent readers share it
/// through `&MemStateTree`.
pub struct MemStateTree<BS> {
    store: BS,
    actors: BTreeMap<ActorID, ActorState>,
    root: Cid,
}

impl<BS: Blockstore> MemStateTree<BS> {
    /// Creates an empty tree and persists its root.
    pub fn new(store: BS) -> anyhow::Result<Self> {
        let actors = BTreeMap::new();
        let root = Self::flush(&store, &actors)?;
        Ok(Self {
            store,
            actors,
            root,
        })
    }

    /// Loads a tree from a root previously returned by [`StateTreeMut::commit`].
    pub fn new_from_root(store: BS, root: &Cid) -> anyhow::Result<Self> {
        let StateRoot { version, actors } = store
            .get_cbor_required(root)
            .with_context(|| format!("failed to load state root {root}"))?;
        anyhow::ensure!(
            version == STATE_ROOT_VERSION,
            "unsupported state tree version {version}"
        );
        Ok(Self {
            store,
            actors: actors.into_iter().collect(),
            root: *root,
        })
    }

    /// Retrieve store reference to modify db.
    pub fn store(&self) -> &BS {
        &self.store
    }

    /// Number of actors in the tree.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Iterates the actors in ascending ID order.
    pub fn actors(&self) -> impl Iterator<Item = (&ActorID, &ActorState)> {
        self.actors.iter()
    }

    fn flush(store: &BS, actors: &BTreeMap<ActorID, ActorState>) -> anyhow::Result<Cid> {
        let root = StateRoot {
            version: STATE_ROOT_VERSION,
            actors: actors.iter().map(|(id, a)| (*id, a.clone())).collect(),
        };
        store
            .put_cbor_default(&root)
            .context("failed to flush state root")
    }
}

impl<BS: Blockstore> StateTree for MemStateTree<BS> {
    fn get_actor(&self, id: ActorID) -> anyhow::Result<Option<ActorState>> {
        Ok(self.actors.get(&id).cloned())
    }

    fn root(&self) -> Cid {
        self.root
    }
}

impl<BS: Blockstore> StateTreeMut for MemStateTree<BS> {
    fn commit(&mut self, delta: StateDelta) -> anyhow::Result<Cid> {
        if delta.is_empty() {
            return Ok(self.root);
        }
        let mut actors = self.actors.clone();
        actors.extend(delta.into_actors());
        // Flush before swapping so a storage failure leaves the tree untouched.
        let root = Self::flush(&self.store, &actors)?;
        self.actors = actors;
        self.root = root;
        Ok(root)
    }
}
