// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::{Error, FaultContext as _, RejectReason};
use super::gas_tracker::GasTracker;
use super::validator::MessageValidator;
use super::Processor;
use crate::blocks::Tipset;
use crate::message::{ChainMessage, MessageReceipt};
use crate::metrics::{APPLY_MESSAGE_DURATION, MESSAGE_REJECTIONS, MethodLabel, RejectionLabel};
use crate::shim::{address::Address, clock::ChainEpoch};
use crate::state_tree::{ActorState, CachedTree, StateTree};
use crate::utils::db::CborStoreExt as _;
use crate::vm::builtin::account;
use crate::vm::{ActorError, InvocationContext, Vm};
use fvm_ipld_blockstore::Blockstore;
use std::time::Instant;
use tracing::{debug, trace};

/// A message that reached the VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationResult {
    pub receipt: MessageReceipt,
    /// Failure raised by the invoked method. The receipt, the gas charge and
    /// the sequence bump are committed regardless.
    pub execution_error: Option<ActorError>,
}

/// Outcome of applying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyMessageResult {
    Applied(ApplicationResult),
    /// Turned away before execution. Nothing was changed in state.
    Rejected {
        reason: RejectReason,
        permanent: bool,
    },
}

impl ApplyMessageResult {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected {
            reason,
            permanent: reason.is_permanent(),
        }
    }

    pub fn receipt(&self) -> Option<&MessageReceipt> {
        match self {
            Self::Applied(applied) => Some(&applied.receipt),
            Self::Rejected { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<RejectReason> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// `true` when the message was rejected and can never succeed as written.
    pub fn failure_is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { permanent: true, .. })
    }

    /// Receipt recorded in a tipset's receipt list. Rejections record a
    /// zero-gas receipt carrying the rejection's exit code.
    pub fn into_receipt(self) -> MessageReceipt {
        match self {
            Self::Applied(applied) => applied.receipt,
            Self::Rejected { reason, .. } => reason.receipt(),
        }
    }
}

impl<V, MV, R> Processor<V, MV, R>
where
    V: Vm,
    MV: MessageValidator,
{
    /// Applies a single on-chain message on top of `tree`.
    ///
    /// Rejections leave `tree` untouched and are returned as
    /// [`ApplyMessageResult::Rejected`]. A fault leaves `tree` in an
    /// unspecified state: the caller must discard the overlay.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_message<S, BS>(
        &self,
        tree: &mut CachedTree<S>,
        store: &BS,
        msg: &ChainMessage,
        miner_owner: &Address,
        epoch: ChainEpoch,
        gas_tracker: &mut GasTracker,
        ancestors: &[Tipset],
    ) -> Result<ApplyMessageResult, Error>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let start = Instant::now();
        let method = msg.message().method_num();

        tree.snapshot();
        let outcome =
            self.attempt_apply_message(tree, store, msg, miner_owner, epoch, gas_tracker, ancestors);
        let result = match outcome {
            Ok(applied) => {
                tree.clear_snapshot()
                    .or_fault("failed to merge message snapshot")?;
                gas_tracker.commit_message();
                trace!(
                    method,
                    exit_code = %applied.receipt.exit_code,
                    gas_used = gas_tracker.gas_used(),
                    "applied message"
                );
                ApplyMessageResult::Applied(applied)
            }
            Err(Error::Rejected(reason)) => {
                tree.revert_to_snapshot()
                    .or_fault("failed to revert message snapshot")?;
                MESSAGE_REJECTIONS
                    .get_or_create(&RejectionLabel::new(reason.as_str()))
                    .inc();
                debug!(
                    method,
                    permanent = reason.is_permanent(),
                    "message rejected: {reason}"
                );
                ApplyMessageResult::rejected(reason)
            }
            Err(fault) => return Err(fault),
        };

        APPLY_MESSAGE_DURATION
            .get_or_create(&MethodLabel::new(method.to_string()))
            .observe(start.elapsed().as_secs_f64() * 1000.0);
        Ok(result)
    }

    /// Runs the message state machine. Rejections surface as
    /// [`Error::Rejected`]; the caller owns the message snapshot.
    #[allow(clippy::too_many_arguments)]
    fn attempt_apply_message<S, BS>(
        &self,
        tree: &mut CachedTree<S>,
        store: &BS,
        msg: &ChainMessage,
        miner_owner: &Address,
        epoch: ChainEpoch,
        gas_tracker: &mut GasTracker,
        ancestors: &[Tipset],
    ) -> Result<ApplicationResult, Error>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let message = msg.message();

        gas_tracker.reset_for_new_message(message);
        if gas_tracker.gas_above_block_limit() {
            return Err(RejectReason::GasAboveBlockLimit.into());
        }
        if gas_tracker.gas_too_high_for_current_block() {
            return Err(RejectReason::GasTooHighForCurrentBlock.into());
        }

        let resolver = self.resolver();
        let from_addr = resolver
            .resolve_address(tree, store, message.from())
            .or_fault("failed to resolve sender address")?
            .ok_or(RejectReason::SenderNotFound)?;
        let from = from_addr
            .id()
            .or_fault("sender did not resolve to an ID address")?;
        let from_actor = tree
            .get_actor(from)
            .or_fault("failed to load sender actor")?
            .ok_or(RejectReason::SenderNotFound)?;

        let signer = self.signer_address(store, &from_actor, message.from())?;
        self.validator.validate(msg, &from_actor, &signer)?;

        // A freshly provisioned receiver cannot be the sender, and the message
        // snapshot discards it if this check fails.
        let (to_actor, to_addr) = resolver
            .get_or_create_actor(tree, store, message.to())
            .or_fault("failed to get or create receiver actor")?;
        if to_addr == from_addr {
            return Err(RejectReason::SelfSend.into());
        }

        tree.mutate_actor(from, |actor| {
            actor.sequence += 1;
            Ok(())
        })
        .or_fault("failed to increment sender sequence")?;

        tree.snapshot();
        let mut ctx = InvocationContext {
            from,
            from_actor: Some(from_actor),
            to: to_actor,
            to_addr,
            message,
            state: &mut *tree,
            store,
            gas_tracker: &mut *gas_tracker,
            epoch: Some(epoch),
            ancestors,
            actors: &self.actors,
        };
        let output = self
            .vm
            .send(&mut ctx)
            .or_fault("VM failed to execute message")?;
        if output.is_success() {
            tree.clear_snapshot()
        } else {
            tree.revert_to_snapshot()
        }
        .or_fault("failed to settle execution snapshot")?;

        let gas_used = gas_tracker.gas_used();
        let gas_charge = message.gas_price() * gas_used;
        // Validation guarantees the balance covers the largest possible charge.
        tree.mutate_actor(from, |actor| actor.deduct_funds(&gas_charge))
            .or_fault("failed to charge gas to sender")?;
        if !gas_charge.is_zero() {
            let (_, owner_addr) = resolver
                .get_or_create_actor(tree, store, miner_owner)
                .or_fault("failed to get or create miner owner actor")?;
            let owner = owner_addr
                .id()
                .or_fault("miner owner did not resolve to an ID address")?;
            tree.mutate_actor(owner, |actor| {
                actor.deposit_funds(&gas_charge);
                Ok(())
            })
            .or_fault("failed to pay gas to miner owner")?;
        }

        if let Some(err) = &output.error {
            debug!(
                from = %from_addr,
                to = %to_addr,
                exit_code = %err.exit_code(),
                "message execution failed: {}",
                err.msg()
            );
        }

        Ok(ApplicationResult {
            receipt: MessageReceipt {
                exit_code: output.exit_code,
                gas_charge,
                return_data: output.return_data,
            },
            execution_error: output.error,
        })
    }

    /// Key address that must have signed a message from `from_actor`: the
    /// address bound in its account state. Other actors sign as `from`.
    fn signer_address<BS: Blockstore>(
        &self,
        store: &BS,
        from_actor: &ActorState,
        from: &Address,
    ) -> Result<Address, Error> {
        if !self.actors.is_account(&from_actor.code) {
            return Ok(*from);
        }
        let state: account::State = store
            .get_cbor_required(&from_actor.state)
            .or_fault("failed to load sender account state")?;
        Ok(state.address)
    }
}
