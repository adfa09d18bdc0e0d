// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::apply::ApplyMessageResult;
use super::errors::{Error, FaultContext as _};
use super::gas_tracker::GasTracker;
use super::resolver::Resolver;
use super::validator::MessageValidator;
use super::Processor;
use crate::blocks::{FullTipset, Tipset};
use crate::message::{ChainMessage, Message, MessageReceipt};
use crate::metrics::{HistogramTimerExt as _, TIPSET_PROCESSING_TIME};
use crate::shim::{
    METHOD_SEND,
    address::{Address, REWARD_ACTOR_ADDR},
    clock::ChainEpoch,
    econ::TokenAmount,
};
use crate::state_tree::{CachedTree, StateDelta, StateTree, StateTreeMut};
use crate::vm::builtin::REWARD_ACTOR_ID;
use crate::vm::{InvocationContext, Vm};
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use num_traits::Zero as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// New state root and the receipt of every message of a tipset, in
/// application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipsetOutput {
    pub state_root: Cid,
    pub receipts: Vec<MessageReceipt>,
}

/// Per-message results of a reward-and-apply batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    pub results: Vec<ApplyMessageResult>,
    pub state_root: Cid,
}

/// Pays the mining reward of a block.
pub trait BlockRewarder {
    /// Credits the reward of the block at `epoch` to `miner_owner`. Any error
    /// is a fault.
    fn pay_block_reward<V, S, BS>(
        &self,
        resolver: &Resolver<'_, V>,
        tree: &mut CachedTree<S>,
        store: &BS,
        miner_owner: &Address,
        epoch: ChainEpoch,
    ) -> anyhow::Result<()>
    where
        V: Vm,
        S: StateTree,
        BS: Blockstore;
}

/// Transfers a fixed reward out of the reward actor's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardActorRewarder {
    reward: TokenAmount,
    gas_limit: u64,
}

impl RewardActorRewarder {
    pub fn new(reward: TokenAmount, gas_limit: u64) -> Self {
        Self { reward, gas_limit }
    }

    pub fn reward(&self) -> &TokenAmount {
        &self.reward
    }
}

impl BlockRewarder for RewardActorRewarder {
    fn pay_block_reward<V, S, BS>(
        &self,
        resolver: &Resolver<'_, V>,
        tree: &mut CachedTree<S>,
        store: &BS,
        miner_owner: &Address,
        epoch: ChainEpoch,
    ) -> anyhow::Result<()>
    where
        V: Vm,
        S: StateTree,
        BS: Blockstore,
    {
        if self.reward.is_zero() {
            return Ok(());
        }

        let (owner_actor, owner_addr) = resolver.get_or_create_actor(tree, store, miner_owner)?;
        let msg = Message {
            from: REWARD_ACTOR_ADDR,
            to: owner_addr,
            sequence: 0,
            value: self.reward.clone(),
            method_num: METHOD_SEND,
            params: RawBytes::default(),
            gas_price: TokenAmount::zero(),
            gas_limit: self.gas_limit,
        };
        let mut gas_tracker = GasTracker::for_message_limit(self.gas_limit);
        let mut ctx = InvocationContext {
            from: REWARD_ACTOR_ID,
            from_actor: None,
            to: owner_actor,
            to_addr: owner_addr,
            message: &msg,
            state: tree,
            store,
            gas_tracker: &mut gas_tracker,
            epoch: Some(epoch),
            ancestors: &[],
            actors: resolver.registry(),
        };
        let out = resolver
            .vm()
            .send(&mut ctx)
            .context("failed to send block reward")?;
        anyhow::ensure!(
            out.is_success(),
            "block reward transfer to {owner_addr} exited with {}",
            out.exit_code
        );
        debug!(owner = %owner_addr, reward = %self.reward, "paid block reward");
        Ok(())
    }
}

impl<V, MV, R> Processor<V, MV, R>
where
    V: Vm,
    MV: MessageValidator,
    R: BlockRewarder,
{
    /// Applies every message of `tipset` on top of `tree` and commits the
    /// result.
    ///
    /// Blocks are applied in ticket order, each with its own block gas budget
    /// and paying gas to its own miner. Rejected messages are recorded as
    /// zero-gas receipts. On a fault or cancellation nothing is committed.
    #[tracing::instrument(skip_all, fields(epoch))]
    pub fn process_tipset<T, BS>(
        &self,
        tree: &mut T,
        store: &BS,
        tipset: &FullTipset,
        ancestors: &[Tipset],
        cancel: &CancellationToken,
    ) -> Result<TipsetOutput, Error>
    where
        T: StateTreeMut,
        BS: Blockstore,
    {
        let _timer = TIPSET_PROCESSING_TIME.start_timer();
        if tipset.is_empty() {
            return Err(Error::fault("cannot process an empty tipset"));
        }
        let epoch = tipset
            .epoch()
            .or_fault("failed to determine tipset epoch")?;
        tracing::Span::current().record("epoch", epoch);

        let mut cached = CachedTree::new(&*tree);
        let mut receipts = Vec::new();
        for block in tipset.blocks() {
            let miner = block.header().miner_address();
            let mut gas_tracker = GasTracker::new(self.config.block_gas_limit);
            for msg in block.messages() {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let result = self.apply_message(
                    &mut cached,
                    store,
                    &msg,
                    miner,
                    epoch,
                    &mut gas_tracker,
                    ancestors,
                )?;
                receipts.push(result.into_receipt());
            }
            debug!(%miner, gas_used = gas_tracker.block_gas_used(), "applied block");
        }

        let delta = finish(cached, cancel)?;
        let state_root = tree.commit(delta).or_fault("failed to commit tipset state")?;
        info!(%state_root, messages = receipts.len(), "processed tipset");
        Ok(TipsetOutput {
            state_root,
            receipts,
        })
    }

    /// Pays the block reward to `miner_owner`, then applies `messages` in
    /// order and commits the result.
    ///
    /// Rejections are recorded per message and processing continues; a fault
    /// aborts the whole batch without committing anything.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip_all, fields(epoch = epoch, messages = messages.len()))]
    pub fn apply_messages_and_pay_rewards<T, BS>(
        &self,
        tree: &mut T,
        store: &BS,
        messages: &[ChainMessage],
        miner_owner: &Address,
        epoch: ChainEpoch,
        ancestors: &[Tipset],
        cancel: &CancellationToken,
    ) -> Result<BatchOutput, Error>
    where
        T: StateTreeMut,
        BS: Blockstore,
    {
        let mut cached = CachedTree::new(&*tree);
        self.rewarder
            .pay_block_reward(&self.resolver(), &mut cached, store, miner_owner, epoch)
            .or_fault("failed to pay block reward")?;

        let mut gas_tracker = GasTracker::new(self.config.block_gas_limit);
        let mut results = Vec::with_capacity(messages.len());
        for msg in messages {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            results.push(self.apply_message(
                &mut cached,
                store,
                msg,
                miner_owner,
                epoch,
                &mut gas_tracker,
                ancestors,
            )?);
        }

        let delta = finish(cached, cancel)?;
        let state_root = tree.commit(delta).or_fault("failed to commit batch state")?;
        Ok(BatchOutput {
            results,
            state_root,
        })
    }
}

/// Turns the overlay of a finished run into a delta, unless the run was
/// cancelled in the meantime.
fn finish<S: StateTree>(
    cached: CachedTree<S>,
    cancel: &CancellationToken,
) -> Result<StateDelta, Error> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    cached
        .into_delta()
        .or_fault("unbalanced snapshots after applying messages")
}
