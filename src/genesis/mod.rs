// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{address::Address, econ::TokenAmount};
use crate::state_tree::{ActorState, CachedTree, MemStateTree, StateTreeMut as _};
use crate::utils::db::CborStoreExt as _;
use crate::vm::builtin::{
    EMPTY_STATE, INIT_ACTOR_ID, REWARD_ACTOR_ID, SYSTEM_ACTOR_ID, account, init,
};
use crate::vm::BuiltinActor;
use fvm_ipld_blockstore::Blockstore;
use num_traits::Zero as _;
use tracing::info;

const DEFAULT_NETWORK_NAME: &str = "localnet";

/// Builds the initial state tree: the system, init and reward singletons plus
/// any pre-funded account actors.
///
/// Accounts receive IDs in the order they are added, starting right after the
/// reserved singleton range.
#[derive(Debug, Clone)]
pub struct GenesisBuilder {
    network_name: String,
    reward_balance: TokenAmount,
    accounts: Vec<(Address, TokenAmount)>,
}

impl Default for GenesisBuilder {
    fn default() -> Self {
        Self {
            network_name: DEFAULT_NETWORK_NAME.into(),
            reward_balance: TokenAmount::zero(),
            accounts: Vec::new(),
        }
    }
}

impl GenesisBuilder {
    pub fn network_name(mut self, name: impl Into<String>) -> Self {
        self.network_name = name.into();
        self
    }

    /// Funds the reward actor, the source of block rewards.
    pub fn reward_balance(mut self, balance: TokenAmount) -> Self {
        self.reward_balance = balance;
        self
    }

    /// Adds an account actor bound to the key address `addr`.
    pub fn with_account(mut self, addr: Address, balance: TokenAmount) -> Self {
        self.accounts.push((addr, balance));
        self
    }

    pub fn build<BS: Blockstore>(self, store: BS) -> anyhow::Result<MemStateTree<BS>> {
        let mut tree = MemStateTree::new(store)?;
        let store = tree.store();
        let mut init_state = init::State::new(self.network_name);
        let mut cached = CachedTree::new(&tree);

        cached.set_actor(
            SYSTEM_ACTOR_ID,
            ActorState::new(
                BuiltinActor::System.code(),
                *EMPTY_STATE,
                TokenAmount::zero(),
                0,
            ),
        )?;
        cached.set_actor(
            REWARD_ACTOR_ID,
            ActorState::new(
                BuiltinActor::Reward.code(),
                *EMPTY_STATE,
                self.reward_balance,
                0,
            ),
        )?;

        for (address, balance) in self.accounts {
            anyhow::ensure!(
                !crate::shim::address::is_id_address(&address),
                "genesis account {address} must be a key address"
            );
            let id = init_state.map_address_to_new_id(&address)?;
            let state = store.put_cbor_default(&account::State { address })?;
            cached.set_actor(
                id,
                ActorState::new(BuiltinActor::Account.code(), state, balance, 0),
            )?;
        }

        let init_head = store.put_cbor_default(&init_state)?;
        cached.set_actor(
            INIT_ACTOR_ID,
            ActorState::new(
                BuiltinActor::Init.code(),
                init_head,
                TokenAmount::zero(),
                0,
            ),
        )?;

        let delta = cached.into_delta()?;
        let root = tree.commit(delta)?;
        info!(%root, actors = tree.len(), "built genesis state");
        Ok(tree)
    }
}
