// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::{Error, FaultContext as _, RejectReason};
use super::gas_tracker::GasTracker;
use super::Processor;
use crate::message::Message;
use crate::shim::{
    MethodNum,
    address::{Address, SYSTEM_ACTOR_ADDR},
    clock::ChainEpoch,
    econ::TokenAmount,
    error::ExitCode,
};
use crate::state_tree::{ActorState, CachedTree, StateTree};
use crate::vm::{InvocationContext, InvocationOutput, Vm};
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use num_traits::Zero as _;
use tracing::debug;

/// Result of a read-only method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub return_data: Vec<RawBytes>,
    pub exit_code: ExitCode,
}

impl<V: Vm, MV, R> Processor<V, MV, R> {
    /// Calls `method` on the existing actor at `to` against a throwaway
    /// overlay of `tree`. Nothing is ever written to `tree`.
    ///
    /// The call runs as `from`, or as the system actor when no sender is
    /// given, with the whole block gas limit available. An unknown target is
    /// rejected with [`RejectReason::ReceiverNotFound`].
    #[allow(clippy::too_many_arguments)]
    pub fn call_query_method<S, BS>(
        &self,
        tree: &S,
        store: &BS,
        to: &Address,
        method: MethodNum,
        params: RawBytes,
        from: Option<Address>,
        epoch: Option<ChainEpoch>,
    ) -> Result<QueryOutput, Error>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let mut cached = CachedTree::new(tree);
        let resolver = self.resolver();
        let to_addr = resolver
            .resolve_address(&mut cached, store, to)
            .or_fault("failed to resolve query target")?
            .ok_or(RejectReason::ReceiverNotFound)?;
        let to_actor = cached
            .get_actor(to_addr.id().or_fault("query target is not an ID address")?)
            .or_fault("failed to load query target")?
            .ok_or(RejectReason::ReceiverNotFound)?;

        let (output, _) = self.run_query(
            &mut cached, store, to_actor, to_addr, method, params, from, epoch,
        )?;
        Ok(QueryOutput {
            return_data: output.return_data,
            exit_code: output.exit_code,
        })
    }

    /// Estimates the gas units consumed by calling `method` on `to`,
    /// provisioning the target first when it does not exist yet.
    ///
    /// Gas is reported even when the method exits with an error.
    #[allow(clippy::too_many_arguments)]
    pub fn preview_query_method<S, BS>(
        &self,
        tree: &S,
        store: &BS,
        to: &Address,
        method: MethodNum,
        params: RawBytes,
        from: Option<Address>,
        epoch: Option<ChainEpoch>,
    ) -> Result<u64, Error>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let mut cached = CachedTree::new(tree);
        let (to_actor, to_addr) = self
            .resolver()
            .get_or_create_actor(&mut cached, store, to)
            .or_fault("failed to get or create preview target")?;

        let (output, gas_used) = self.run_query(
            &mut cached, store, to_actor, to_addr, method, params, from, epoch,
        )?;
        if let Some(err) = &output.error {
            debug!(to = %to_addr, method, gas_used, "previewed method failed: {err}");
        }
        Ok(gas_used)
    }

    #[allow(clippy::too_many_arguments)]
    fn run_query<S, BS>(
        &self,
        cached: &mut CachedTree<S>,
        store: &BS,
        to: ActorState,
        to_addr: Address,
        method_num: MethodNum,
        params: RawBytes,
        from: Option<Address>,
        epoch: Option<ChainEpoch>,
    ) -> Result<(InvocationOutput, u64), Error>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let from_addr = match from {
            Some(addr) => self
                .resolver()
                .resolve_address(cached, store, &addr)
                .or_fault("failed to resolve query sender")?
                .ok_or(RejectReason::SenderNotFound)?,
            None => SYSTEM_ACTOR_ADDR,
        };
        let from = from_addr
            .id()
            .or_fault("query sender is not an ID address")?;

        let gas_limit = self.config.block_gas_limit;
        let mut gas_tracker = GasTracker::for_message_limit(gas_limit);
        let message = Message {
            from: from_addr,
            to: to_addr,
            sequence: 0,
            value: TokenAmount::zero(),
            method_num,
            params,
            gas_price: TokenAmount::zero(),
            gas_limit,
        };
        let mut ctx = InvocationContext {
            from,
            from_actor: None,
            to,
            to_addr,
            message: &message,
            state: cached,
            store,
            gas_tracker: &mut gas_tracker,
            epoch,
            ancestors: &[],
            actors: &self.actors,
        };
        let output = self
            .vm
            .send(&mut ctx)
            .or_fault("VM failed to execute query")?;
        Ok((output, gas_tracker.gas_used()))
    }
}
