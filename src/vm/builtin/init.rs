// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{FIRST_NON_SINGLETON_ADDR, deserialize_params, serialize_return};
use crate::shim::{
    ActorID, METHOD_CONSTRUCTOR, MethodNum,
    address::{Address, Payload},
    error::ExitCode,
};
use crate::state_tree::StateTree;
use crate::vm::{ActorError, ClassifyResult as _, ExecutionError, Result, Runtime};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

/// Init actor methods available
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Exec = 2,
    GetActorIdForAddress = 3,
}

/// Init actor state: the mapping of robust addresses to actor IDs.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub address_map: Vec<(Address, ActorID)>,
    pub next_id: ActorID,
    pub network_name: String,
}

impl State {
    pub fn new(network_name: impl Into<String>) -> Self {
        Self {
            address_map: Vec::new(),
            next_id: FIRST_NON_SINGLETON_ADDR,
            network_name: network_name.into(),
        }
    }

    /// Allocates a new ID address and stores a mapping of the argument address to it.
    /// Fails if the argument address is already present in the map.
    pub fn map_address_to_new_id(
        &mut self,
        addr: &Address,
    ) -> std::result::Result<ActorID, ActorError> {
        if self.address_map.iter().any(|(a, _)| a == addr) {
            return Err(ActorError::new(
                ExitCode::USR_FORBIDDEN,
                format!("robust address {addr} is already allocated in the address map"),
            ));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.address_map.push((*addr, id));
        Ok(id)
    }

    /// Resolves an address to an actor ID, if possible. ID addresses pass
    /// through unchanged.
    pub fn resolve_address(&self, addr: &Address) -> Option<ActorID> {
        if let &Payload::ID(id) = addr.payload() {
            return Some(id);
        }
        self.address_map
            .iter()
            .find(|(a, _)| a == addr)
            .map(|(_, id)| *id)
    }
}

/// Init actor Exec Params
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ExecParams {
    pub code_cid: Cid,
    pub constructor_params: RawBytes,
}

/// Init actor Exec Return value
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ExecReturn {
    /// ID based address for created actor
    pub id_address: Address,
    /// Robust address of the created actor
    pub robust_address: Address,
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
        Some(Method::Exec) => {
            let ret = exec(rt, deserialize_params(params)?)?;
            serialize_return(&ret)
        }
        Some(Method::GetActorIdForAddress) => {
            let ret = get_actor_id_for_address(rt, deserialize_params(params)?)?;
            serialize_return(&ret)
        }
        None => Err(ActorError::new(
            ExitCode::USR_UNHANDLED_MESSAGE,
            format!("init actor has no method {method}"),
        )
        .into()),
    }
}

/// Creates an account actor bound to the robust address carried in the
/// constructor parameters.
fn exec<S, BS>(rt: &mut Runtime<'_, S, BS>, params: ExecParams) -> Result<ExecReturn>
where
    S: StateTree,
    BS: Blockstore,
{
    if !rt.registry().is_account(&params.code_cid) {
        return Err(ActorError::new(
            ExitCode::USR_FORBIDDEN,
            format!("init actor cannot exec actor type {}", params.code_cid),
        )
        .into());
    }
    let robust_address: Address = params
        .constructor_params
        .deserialize()
        .or_error(ExitCode::USR_ILLEGAL_ARGUMENT)?;

    let mut st: State = rt.state()?;
    let id = st.map_address_to_new_id(&robust_address)?;
    rt.set_state(&st)?;

    rt.create_actor(params.code_cid, id)?;
    let value = rt.value_received().clone();
    rt.send(id, METHOD_CONSTRUCTOR, &params.constructor_params, &value)
        .map_err(|e| match e {
            ExecutionError::Actor(e) => ExecutionError::Actor(e.wrap("constructor failed")),
            fatal => fatal,
        })?;

    Ok(ExecReturn {
        id_address: Address::new_id(id),
        robust_address,
    })
}

fn get_actor_id_for_address<S, BS>(
    rt: &mut Runtime<'_, S, BS>,
    addr: Address,
) -> Result<Option<ActorID>>
where
    S: StateTree,
    BS: Blockstore,
{
    let st: State = rt.state()?;
    Ok(st.resolve_address(&addr))
}
