// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::gas_tracker::GasTracker;
use crate::message::Message;
use crate::shim::{
    ActorID, MethodNum,
    address::{Address, INIT_ACTOR_ADDR, SYSTEM_ACTOR_ADDR, is_id_address},
    econ::TokenAmount,
};
use crate::state_tree::{ActorState, CachedTree, StateTree};
use crate::vm::builtin::{INIT_ACTOR_ID, SYSTEM_ACTOR_ID, init};
use crate::vm::{ActorRegistry, BuiltinActor, InvocationContext, Vm};
use anyhow::Context as _;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use num_traits::Zero as _;
use tracing::debug;

/// Maps addresses of any protocol to ID addresses through the init actor,
/// provisioning account actors for addresses seen for the first time.
///
/// Every failure here is a fault: provisioning must always succeed.
pub struct Resolver<'a, V> {
    vm: &'a V,
    actors: &'a ActorRegistry,
    provisioning_gas_limit: u64,
}

impl<'a, V: Vm> Resolver<'a, V> {
    pub fn new(vm: &'a V, actors: &'a ActorRegistry, provisioning_gas_limit: u64) -> Self {
        Self {
            vm,
            actors,
            provisioning_gas_limit,
        }
    }

    pub fn vm(&self) -> &'a V {
        self.vm
    }

    pub fn registry(&self) -> &'a ActorRegistry {
        self.actors
    }

    /// Returns the ID address of `addr`, or `None` when the init actor has no
    /// mapping for it. ID addresses are returned as-is without touching state.
    pub fn resolve_address<S, BS>(
        &self,
        tree: &mut CachedTree<S>,
        store: &BS,
        addr: &Address,
    ) -> anyhow::Result<Option<Address>>
    where
        S: StateTree,
        BS: Blockstore,
    {
        if is_id_address(addr) {
            return Ok(Some(*addr));
        }

        let mut gas_tracker = GasTracker::for_message_limit(self.provisioning_gas_limit);
        let ret = self.call_init(
            tree,
            store,
            &mut gas_tracker,
            init::Method::GetActorIdForAddress as MethodNum,
            RawBytes::serialize(addr)?,
        )?;
        let id: Option<ActorID> = ret
            .deserialize()
            .context("non-integer return from GetActorIdForAddress")?;
        Ok(id.map(Address::new_id))
    }

    /// Loads the actor behind `addr`, creating an account actor bound to it
    /// first if the address is unknown. Returns the actor and its ID address.
    pub fn get_or_create_actor<S, BS>(
        &self,
        tree: &mut CachedTree<S>,
        store: &BS,
        addr: &Address,
    ) -> anyhow::Result<(ActorState, Address)>
    where
        S: StateTree,
        BS: Blockstore,
    {
        if let Some(id_addr) = self.resolve_address(tree, store, addr)? {
            let actor = tree
                .get_actor(id_addr.id()?)?
                .with_context(|| format!("actor {id_addr} not found in state"))?;
            return Ok((actor, id_addr));
        }

        let code_cid = self
            .actors
            .code_of(BuiltinActor::Account)
            .context("actor registry has no account actor")?;
        let params = init::ExecParams {
            code_cid,
            constructor_params: RawBytes::serialize(addr)?,
        };
        let mut gas_tracker = GasTracker::for_message_limit(self.provisioning_gas_limit);
        self.call_init(
            tree,
            store,
            &mut gas_tracker,
            init::Method::Exec as MethodNum,
            RawBytes::serialize(&params)?,
        )?;

        let id_addr = self
            .resolve_address(tree, store, addr)?
            .with_context(|| format!("address {addr} is not mapped after exec"))?;
        let actor = tree
            .get_actor(id_addr.id()?)?
            .with_context(|| format!("provisioned actor {id_addr} not found in state"))?;
        debug!(address = %addr, id = %id_addr, gas_used = gas_tracker.gas_used(), "provisioned account actor");
        Ok((actor, id_addr))
    }

    /// Invokes a method of the init actor on behalf of the system actor.
    fn call_init<S, BS>(
        &self,
        tree: &mut CachedTree<S>,
        store: &BS,
        gas_tracker: &mut GasTracker,
        method_num: MethodNum,
        params: RawBytes,
    ) -> anyhow::Result<RawBytes>
    where
        S: StateTree,
        BS: Blockstore,
    {
        let init_actor = tree
            .get_actor(INIT_ACTOR_ID)?
            .context("init actor not found in state")?;
        let msg = Message {
            from: SYSTEM_ACTOR_ADDR,
            to: INIT_ACTOR_ADDR,
            sequence: 0,
            value: TokenAmount::zero(),
            method_num,
            params,
            gas_price: TokenAmount::zero(),
            gas_limit: gas_tracker.gas_limit(),
        };
        let mut ctx = InvocationContext {
            from: SYSTEM_ACTOR_ID,
            from_actor: None,
            to: init_actor,
            to_addr: INIT_ACTOR_ADDR,
            message: &msg,
            state: tree,
            store,
            gas_tracker,
            epoch: None,
            ancestors: &[],
            actors: self.actors,
        };
        let out = self.vm.send(&mut ctx)?;
        if let Some(err) = out.error {
            anyhow::bail!("init actor method {method_num} failed: {err}");
        }
        anyhow::ensure!(
            out.exit_code.is_success(),
            "init actor method {method_num} exited with {}",
            out.exit_code
        );
        Ok(out.return_data.into_iter().next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDB;
    use crate::genesis::GenesisBuilder;
    use crate::state_tree::MemStateTree;
    use crate::vm::DefaultVm;

    fn key_address(seed: u8) -> Address {
        Address::new_secp256k1(&[seed; 65]).unwrap()
    }

    #[test]
    fn id_address_resolves_without_state() {
        let store = MemoryDB::default();
        // An empty tree has no init actor, so any state access would fail.
        let tree = MemStateTree::new(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10_000);

        let addr = Address::new_id(1234);
        let once = resolver.resolve_address(&mut cached, &store, &addr).unwrap();
        assert_eq!(once, Some(addr));
        let twice = resolver
            .resolve_address(&mut cached, &store, &once.unwrap())
            .unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn unknown_address_is_not_found() {
        let store = MemoryDB::default();
        let tree = GenesisBuilder::default().build(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10_000);

        let found = resolver
            .resolve_address(&mut cached, &store, &key_address(9))
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn provisioning_is_idempotent() {
        let store = MemoryDB::default();
        let tree = GenesisBuilder::default().build(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10_000);
        let addr = key_address(7);

        let (first, first_id) = resolver
            .get_or_create_actor(&mut cached, &store, &addr)
            .unwrap();
        let (second, second_id) = resolver
            .get_or_create_actor(&mut cached, &store, &addr)
            .unwrap();

        assert_eq!(first_id, second_id);
        assert_eq!(first, second);
        assert!(actors.is_account(&first.code));
        assert_eq!(
            resolver.resolve_address(&mut cached, &store, &addr).unwrap(),
            Some(first_id)
        );
    }

    #[test]
    fn provisioned_ids_are_sequential() {
        let store = MemoryDB::default();
        let tree = GenesisBuilder::default().build(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10_000);

        let (_, a) = resolver
            .get_or_create_actor(&mut cached, &store, &key_address(1))
            .unwrap();
        let (_, b) = resolver
            .get_or_create_actor(&mut cached, &store, &key_address(2))
            .unwrap();
        assert_eq!(b.id().unwrap(), a.id().unwrap() + 1);
    }

    #[test]
    fn missing_init_actor_is_a_fault() {
        let store = MemoryDB::default();
        let tree = MemStateTree::new(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10_000);
        assert!(
            resolver
                .get_or_create_actor(&mut cached, &store, &key_address(1))
                .is_err()
        );
    }

    #[test]
    fn starved_provisioning_budget_is_a_fault() {
        let store = MemoryDB::default();
        let tree = GenesisBuilder::default().build(&store).unwrap();
        let mut cached = CachedTree::new(&tree);
        let actors = ActorRegistry::default();
        let resolver = Resolver::new(&DefaultVm, &actors, 10);
        assert!(
            resolver
                .get_or_create_actor(&mut cached, &store, &key_address(1))
                .is_err()
        );
    }
}
