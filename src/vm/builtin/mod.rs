// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Minimal builtin actors: just enough behaviour for address provisioning and
//! value transfers.

pub mod account;
pub mod init;

use super::{ClassifyResult as _, Result};
use crate::shim::{ActorID, error::ExitCode};
use cid::Cid;
use fvm_ipld_encoding::{DAG_CBOR, RawBytes};
use multihash_codetable::{Code, MultihashDigest};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::LazyLock;

pub const SYSTEM_ACTOR_ID: ActorID = 0;
pub const INIT_ACTOR_ID: ActorID = 1;
pub const REWARD_ACTOR_ID: ActorID = 2;

/// First ID handed out by the init actor. Lower IDs are reserved for
/// singletons.
pub const FIRST_NON_SINGLETON_ADDR: ActorID = 100;

/// State of actors that hold nothing but a balance: the `dag-cbor` empty list.
pub static EMPTY_STATE: LazyLock<Cid> =
    LazyLock::new(|| Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&[0x80])));

fn deserialize_params<T: DeserializeOwned>(params: &RawBytes) -> Result<T> {
    params.deserialize().or_error(ExitCode::USR_SERIALIZATION)
}

fn serialize_return<T: Serialize>(ret: &T) -> Result<RawBytes> {
    RawBytes::serialize(ret).or_error(ExitCode::USR_SERIALIZATION)
}
