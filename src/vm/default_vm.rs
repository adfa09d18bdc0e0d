// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::builtin::{self, EMPTY_STATE};
use super::{
    ActorError, ActorRegistry, BuiltinActor, ClassifyResult as _, ExecutionError,
    InvocationContext, InvocationOutput, Result, Vm,
};
use crate::interpreter::{GasCharge, GasTracker, PriceList, price_list};
use crate::shim::{ActorID, METHOD_SEND, MethodNum, econ::TokenAmount, error::ExitCode};
use crate::state_tree::{ActorState, CachedTree, StateTree};
use crate::utils::db::CborStoreExt as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use num_traits::Zero as _;
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;

/// Maximum depth of nested sends.
pub const MAX_CALL_DEPTH: u32 = 1024;

/// Reference VM running the builtin actors of an [`ActorRegistry`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultVm;

impl Vm for DefaultVm {
    fn send<S, BS>(&self, ctx: &mut InvocationContext<'_, S, BS>) -> anyhow::Result<InvocationOutput>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let from = ctx.from;
        let to = ctx.to_id()?;
        let on_chain = ctx.is_on_chain();
        let msg = ctx.message;
        let msg_size = if on_chain {
            fvm_ipld_encoding::to_vec(msg)?.len()
        } else {
            0
        };

        let mut rt = Runtime {
            state: &mut *ctx.state,
            store: ctx.store,
            gas_tracker: &mut *ctx.gas_tracker,
            price_list: price_list(),
            actors: ctx.actors,
            caller: from,
            receiver: to,
            value_received: TokenAmount::zero(),
            depth: 0,
        };

        let res = (|| -> Result<RawBytes> {
            if on_chain {
                rt.charge_gas(rt.price_list.on_chain_message(msg_size))?;
            }
            let ret = rt.invoke(from, to, msg.method_num(), msg.params(), msg.value())?;
            if on_chain {
                rt.charge_gas(rt.price_list.on_chain_return_value(ret.bytes().len()))?;
            }
            Ok(ret)
        })();

        match res {
            Ok(ret) => Ok(InvocationOutput::ok(ret)),
            Err(ExecutionError::Actor(e)) => {
                trace!(exit_code = %e.exit_code(), "invocation failed: {}", e.msg());
                Ok(InvocationOutput::failed(e))
            }
            Err(ExecutionError::Fatal(e)) => Err(e),
        }
    }
}

/// Execution environment of a single top-level invocation, shared by every
/// nested call it makes.
pub struct Runtime<'a, S, BS> {
    state: &'a mut CachedTree<S>,
    store: &'a BS,
    gas_tracker: &'a mut GasTracker,
    price_list: &'static PriceList,
    actors: &'a ActorRegistry,
    caller: ActorID,
    receiver: ActorID,
    value_received: TokenAmount,
    depth: u32,
}

impl<S, BS> Runtime<'_, S, BS>
where
    S: StateTree,
    BS: Blockstore,
{
    /// Immediate caller of the running method.
    pub fn caller(&self) -> ActorID {
        self.caller
    }

    /// Actor whose method is running.
    pub fn receiver(&self) -> ActorID {
        self.receiver
    }

    pub fn value_received(&self) -> &TokenAmount {
        &self.value_received
    }

    pub fn registry(&self) -> &ActorRegistry {
        self.actors
    }

    pub fn store(&self) -> &BS {
        self.store
    }

    pub fn charge_gas(&mut self, charge: GasCharge) -> Result<()> {
        self.gas_tracker.charge_gas(charge)?;
        Ok(())
    }

    pub fn validate_immediate_caller_is(&self, allowed: &[ActorID]) -> Result<()> {
        if allowed.contains(&self.caller) {
            Ok(())
        } else {
            Err(ActorError::new(
                ExitCode::USR_FORBIDDEN,
                format!("caller {} is not one of {:?}", self.caller, allowed),
            )
            .into())
        }
    }

    /// Loads the state object of the receiver.
    pub fn state<T: DeserializeOwned>(&mut self) -> Result<T> {
        let actor = self.receiver_actor()?;
        self.charge_gas(self.price_list.on_ipld_get())?;
        self.store.get_cbor_required(&actor.state).or_fatal()
    }

    /// Stores a new state object for the receiver.
    pub fn set_state<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        self.charge_gas(self.price_list.on_ipld_put())?;
        let state = self.store.put_cbor_default(obj).or_fatal()?;
        let id = self.receiver;
        self.state
            .mutate_actor(id, |actor| {
                actor.state = state;
                Ok(())
            })
            .or_fatal()
    }

    /// Installs an empty actor running `code` at `id`.
    pub fn create_actor(&mut self, code: Cid, id: ActorID) -> Result<()> {
        if self.actors.get(&code).is_none() {
            return Err(ActorError::new(
                ExitCode::USR_ILLEGAL_ARGUMENT,
                format!("unknown actor code {code}"),
            )
            .into());
        }
        if self.state.get_actor(id).or_fatal()?.is_some() {
            return Err(ActorError::new(
                ExitCode::USR_FORBIDDEN,
                format!("actor {id} already exists"),
            )
            .into());
        }
        self.charge_gas(self.price_list.on_create_actor())?;
        self.state
            .set_actor(
                id,
                ActorState::new(code, *EMPTY_STATE, TokenAmount::zero(), 0),
            )
            .or_fatal()
    }

    /// Sends a nested message from the receiver. Effects of a failing call are
    /// reverted before the error is returned.
    pub fn send(
        &mut self,
        to: ActorID,
        method: MethodNum,
        params: &RawBytes,
        value: &TokenAmount,
    ) -> Result<RawBytes> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(ActorError::new(
                ExitCode::USR_FORBIDDEN,
                "message execution exceeds call depth",
            )
            .into());
        }
        let from = self.receiver;
        self.state.snapshot();
        self.depth += 1;
        let res = self.invoke(from, to, method, params, value);
        self.depth -= 1;
        match &res {
            Ok(_) => self.state.clear_snapshot().or_fatal()?,
            Err(_) => self.state.revert_to_snapshot().or_fatal()?,
        }
        res
    }

    fn receiver_actor(&self) -> Result<ActorState> {
        self.state
            .get_actor(self.receiver)
            .or_fatal()?
            .ok_or_else(|| {
                ExecutionError::Fatal(anyhow::anyhow!(
                    "running actor {} not found in state",
                    self.receiver
                ))
            })
    }

    /// Transfers `value` and dispatches `method` on `to` with `from` as the
    /// caller.
    fn invoke(
        &mut self,
        from: ActorID,
        to: ActorID,
        method: MethodNum,
        params: &RawBytes,
        value: &TokenAmount,
    ) -> Result<RawBytes> {
        self.charge_gas(self.price_list.on_method_invocation(value, method))?;

        let to_actor = self.state.get_actor(to).or_fatal()?.ok_or_else(|| {
            ActorError::new(
                ExitCode::SYS_INVALID_RECEIVER,
                format!("receiver actor {to} not found"),
            )
        })?;

        if !value.is_zero() {
            self.transfer(from, to, value)?;
        }

        if method == METHOD_SEND {
            return Ok(RawBytes::default());
        }

        let actor = self.actors.get(&to_actor.code).ok_or_else(|| {
            ExecutionError::Fatal(anyhow::anyhow!(
                "no builtin actor registered for code {}",
                to_actor.code
            ))
        })?;

        let prev_caller = std::mem::replace(&mut self.caller, from);
        let prev_receiver = std::mem::replace(&mut self.receiver, to);
        let prev_value = std::mem::replace(&mut self.value_received, value.clone());
        let res = match actor {
            BuiltinActor::Init => builtin::init::invoke_method(self, method, params),
            BuiltinActor::Account => builtin::account::invoke_method(self, method, params),
            BuiltinActor::System | BuiltinActor::Reward => Err(ActorError::new(
                ExitCode::USR_UNHANDLED_MESSAGE,
                format!("{actor} actor has no method {method}"),
            )
            .into()),
        };
        self.caller = prev_caller;
        self.receiver = prev_receiver;
        self.value_received = prev_value;
        res
    }

    fn transfer(&mut self, from: ActorID, to: ActorID, value: &TokenAmount) -> Result<()> {
        if value.is_negative() {
            return Err(ActorError::new(
                ExitCode::USR_ILLEGAL_ARGUMENT,
                "attempted to transfer negative value",
            )
            .into());
        }
        if from == to {
            return Ok(());
        }

        let mut from_actor = self.state.get_actor(from).or_fatal()?.ok_or_else(|| {
            ActorError::new(
                ExitCode::SYS_SENDER_INVALID,
                format!("sender actor {from} not found"),
            )
        })?;
        from_actor
            .deduct_funds(value)
            .or_error(ExitCode::SYS_INSUFFICIENT_FUNDS)?;
        self.state.set_actor(from, from_actor).or_fatal()?;
        self.state
            .mutate_actor(to, |actor| {
                actor.deposit_funds(value);
                Ok(())
            })
            .or_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDB;
    use crate::message::Message;
    use crate::shim::address::Address;
    use crate::state_tree::MemStateTree;

    fn actor(code: Cid, balance: u64) -> ActorState {
        ActorState::new(code, *EMPTY_STATE, TokenAmount::from_atto(balance), 0)
    }

    fn setup() -> (MemoryDB, ActorRegistry) {
        (MemoryDB::default(), ActorRegistry::default())
    }

    fn send_message(
        tree: &mut CachedTree<&MemStateTree<&MemoryDB>>,
        store: &MemoryDB,
        actors: &ActorRegistry,
        msg: &Message,
        gas_limit: u64,
    ) -> (InvocationOutput, u64) {
        let from = msg.from().id().unwrap();
        let to_addr = *msg.to();
        let to = tree.get_actor(to_addr.id().unwrap()).unwrap().unwrap();
        let from_actor = tree.get_actor(from).unwrap();
        let mut gas_tracker = GasTracker::for_message_limit(gas_limit);
        let mut ctx = InvocationContext {
            from,
            from_actor,
            to,
            to_addr,
            message: msg,
            state: tree,
            store,
            gas_tracker: &mut gas_tracker,
            epoch: None,
            ancestors: &[],
            actors,
        };
        let out = DefaultVm.send(&mut ctx).unwrap();
        (out, gas_tracker.gas_used())
    }

    #[test]
    fn transfer_moves_balance() {
        let (store, actors) = setup();
        let base = MemStateTree::new(&store).unwrap();
        let mut tree = CachedTree::new(&base);
        let account = BuiltinActor::Account.code();
        tree.set_actor(100, actor(account, 50)).unwrap();
        tree.set_actor(101, actor(account, 0)).unwrap();

        let msg = Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .value(TokenAmount::from_atto(20))
            .build()
            .unwrap();
        let (out, gas_used) = send_message(&mut tree, &store, &actors, &msg, 10_000);

        assert!(out.is_success());
        assert!(out.return_data.is_empty());
        assert!(gas_used > 0);
        assert_eq!(
            tree.get_actor(100).unwrap().unwrap().balance,
            TokenAmount::from_atto(30)
        );
        assert_eq!(
            tree.get_actor(101).unwrap().unwrap().balance,
            TokenAmount::from_atto(20)
        );
    }

    #[test]
    fn insufficient_funds_is_an_actor_error() {
        let (store, actors) = setup();
        let base = MemStateTree::new(&store).unwrap();
        let mut tree = CachedTree::new(&base);
        let account = BuiltinActor::Account.code();
        tree.set_actor(100, actor(account, 5)).unwrap();
        tree.set_actor(101, actor(account, 0)).unwrap();

        let msg = Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .value(TokenAmount::from_atto(20))
            .build()
            .unwrap();
        let (out, _) = send_message(&mut tree, &store, &actors, &msg, 10_000);
        assert_eq!(out.exit_code, ExitCode::SYS_INSUFFICIENT_FUNDS);
        assert!(out.error.is_some());
    }

    #[test]
    fn out_of_gas_uses_whole_limit() {
        let (store, actors) = setup();
        let base = MemStateTree::new(&store).unwrap();
        let mut tree = CachedTree::new(&base);
        let account = BuiltinActor::Account.code();
        tree.set_actor(100, actor(account, 5)).unwrap();
        tree.set_actor(101, actor(account, 0)).unwrap();

        let msg = Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .build()
            .unwrap();
        let (out, gas_used) = send_message(&mut tree, &store, &actors, &msg, 10);
        assert_eq!(out.exit_code, ExitCode::SYS_OUT_OF_GAS);
        assert_eq!(gas_used, 10);
    }

    #[test]
    fn unknown_code_is_fatal() {
        let (store, actors) = setup();
        let base = MemStateTree::new(&store).unwrap();
        let mut tree = CachedTree::new(&base);
        tree.set_actor(100, actor(BuiltinActor::Account.code(), 5))
            .unwrap();
        tree.set_actor(101, actor(Cid::default(), 0)).unwrap();

        let msg = Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .method_num(2)
            .build()
            .unwrap();
        let to = tree.get_actor(101).unwrap().unwrap();
        let mut gas_tracker = GasTracker::for_message_limit(10_000);
        let mut ctx = InvocationContext {
            from: 100,
            from_actor: None,
            to,
            to_addr: Address::new_id(101),
            message: &msg,
            state: &mut tree,
            store: &store,
            gas_tracker: &mut gas_tracker,
            epoch: None,
            ancestors: &[],
            actors: &actors,
        };
        assert!(DefaultVm.send(&mut ctx).is_err());
    }

    #[test]
    fn unhandled_method_on_system_actor() {
        let (store, actors) = setup();
        let base = MemStateTree::new(&store).unwrap();
        let mut tree = CachedTree::new(&base);
        tree.set_actor(0, actor(BuiltinActor::System.code(), 0))
            .unwrap();
        tree.set_actor(100, actor(BuiltinActor::Account.code(), 5))
            .unwrap();

        let msg = Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(0))
            .method_num(5)
            .build()
            .unwrap();
        let (out, _) = send_message(&mut tree, &store, &actors, &msg, 10_000);
        assert_eq!(out.exit_code, ExitCode::USR_UNHANDLED_MESSAGE);
    }
}
