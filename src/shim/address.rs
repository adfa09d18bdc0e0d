// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use fvm_shared4::address::{Address, Error as AddressError, Payload, Protocol};

/// Singleton system actor. Also the conventional sender of query messages.
pub const SYSTEM_ACTOR_ADDR: Address = Address::new_id(0);
/// Singleton init actor, owner of the address-to-ID mapping.
pub const INIT_ACTOR_ADDR: Address = Address::new_id(1);
/// Singleton reward actor, source of block rewards.
pub const REWARD_ACTOR_ADDR: Address = Address::new_id(2);

/// Returns `true` when the address is already canonical, i.e. usable as a
/// state-tree key without consulting the init actor.
pub fn is_id_address(addr: &Address) -> bool {
    addr.protocol() == Protocol::ID
}
