// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{INIT_ACTOR_ID, SYSTEM_ACTOR_ID, deserialize_params, serialize_return};
use crate::shim::{
    METHOD_CONSTRUCTOR, MethodNum,
    address::{Address, Protocol},
    error::ExitCode,
};
use crate::state_tree::StateTree;
use crate::vm::{ActorError, Result, Runtime};
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

/// Account actor methods available
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
    PubkeyAddress = 2,
}

/// State includes the address for the actor
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub address: Address,
}

pub(in crate::vm) fn invoke_method<S, BS>(
    rt: &mut Runtime<'_, S, BS>,
    method: MethodNum,
    params: &RawBytes,
) -> Result<RawBytes>
where
    S: StateTree,
    BS: Blockstore,
{
    match Method::from_u64(method) {
        Some(Method::Constructor) => {
            constructor(rt, deserialize_params(params)?)?;
            Ok(RawBytes::default())
        }
        Some(Method::PubkeyAddress) => {
            let st: State = rt.state()?;
            serialize_return(&st.address)
        }
        None => Err(ActorError::new(
            ExitCode::USR_UNHANDLED_MESSAGE,
            format!("account actor has no method {method}"),
        )
        .into()),
    }
}

/// Binds the account to its robust address.
fn constructor<S, BS>(rt: &mut Runtime<'_, S, BS>, address: Address) -> Result<()>
where
    S: StateTree,
    BS: Blockstore,
{
    rt.validate_immediate_caller_is(&[SYSTEM_ACTOR_ID, INIT_ACTOR_ID])?;
    if address.protocol() == Protocol::ID {
        return Err(ActorError::new(
            ExitCode::USR_ILLEGAL_ARGUMENT,
            format!("account address must not be an ID address: {address}"),
        )
        .into());
    }
    rt.set_state(&State { address })
}
