// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{ActorState, StateTree};
use crate::shim::ActorID;
use ahash::HashMap;
use cid::Cid;
use std::collections::BTreeMap;

/// Actor changes accumulated by a [`CachedTree`], ready to be committed to the
/// underlying tree.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct StateDelta {
    actors: BTreeMap<ActorID, ActorState>,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn into_actors(self) -> impl Iterator<Item = (ActorID, ActorState)> {
        self.actors.into_iter()
    }
}

/// A copy-on-write overlay over a [`StateTree`] with nested snapshots.
///
/// Reads fall through the layers from newest to oldest and finally to the base
/// tree. Writes always land in the newest layer, so reverting a snapshot
/// discards exactly the writes made since it was taken.
pub struct CachedTree<S> {
    base: S,
    layers: Vec<HashMap<ActorID, ActorState>>,
}

impl<S: StateTree> CachedTree<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            layers: vec![HashMap::default()],
        }
    }

    /// Base tree this overlay reads through to.
    pub fn base(&self) -> &S {
        &self.base
    }

    /// Number of open snapshots, not counting the root layer.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Opens a new snapshot. Must be paired with either
    /// [`CachedTree::revert_to_snapshot`] or [`CachedTree::clear_snapshot`].
    pub fn snapshot(&mut self) {
        self.layers.push(HashMap::default());
    }

    /// Discards every write since the most recent snapshot.
    pub fn revert_to_snapshot(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(self.layers.len() > 1, "no snapshot to revert to");
        self.layers.pop();
        Ok(())
    }

    /// Keeps every write since the most recent snapshot by folding it into the
    /// enclosing layer.
    pub fn clear_snapshot(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(self.layers.len() > 1, "no snapshot to clear");
        let top = self
            .layers
            .pop()
            .ok_or_else(|| anyhow::anyhow!("layer stack is empty"))?;
        self.top_mut()?.extend(top);
        Ok(())
    }

    pub fn set_actor(&mut self, id: ActorID, actor: ActorState) -> anyhow::Result<()> {
        self.top_mut()?.insert(id, actor);
        Ok(())
    }

    /// Loads an actor, applies `mutate` and writes it back. Fails if the actor
    /// does not exist.
    pub fn mutate_actor<T>(
        &mut self,
        id: ActorID,
        mutate: impl FnOnce(&mut ActorState) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut actor = self
            .get_actor(id)?
            .ok_or_else(|| anyhow::anyhow!("actor {id} not found"))?;
        let ret = mutate(&mut actor)?;
        self.set_actor(id, actor)?;
        Ok(ret)
    }

    /// Finishes the overlay, returning every write. All snapshots must have
    /// been closed.
    pub fn into_delta(mut self) -> anyhow::Result<StateDelta> {
        anyhow::ensure!(
            self.layers.len() == 1,
            "tried to flush state with {} open snapshots",
            self.layers.len() - 1
        );
        let actors = self.layers.pop().unwrap_or_default().into_iter().collect();
        Ok(StateDelta { actors })
    }

    fn top_mut(&mut self) -> anyhow::Result<&mut HashMap<ActorID, ActorState>> {
        self.layers
            .last_mut()
            .ok_or_else(|| anyhow::anyhow!("layer stack is empty"))
    }
}

impl<S: StateTree> StateTree for CachedTree<S> {
    fn get_actor(&self, id: ActorID) -> anyhow::Result<Option<ActorState>> {
        for layer in self.layers.iter().rev() {
            if let Some(actor) = layer.get(&id) {
                return Ok(Some(actor.clone()));
            }
        }
        self.base.get_actor(id)
    }

    /// Root of the base tree; pending writes are not reflected until committed.
    fn root(&self) -> Cid {
        self.base.root()
    }
}
