// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blocks::Ticket;
use crate::shim::{address::Address, clock::ChainEpoch};
use crate::utils::cid::CidCborExt as _;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;

/// The header fields the processor relies on: who mined the block, its
/// ticket, its height and the tipset it builds on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct BlockHeader {
    pub miner_address: Address,
    pub ticket: Ticket,
    pub parents: Vec<Cid>,
    pub epoch: ChainEpoch,
}

impl BlockHeader {
    pub fn miner_address(&self) -> &Address {
        &self.miner_address
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn parents(&self) -> &[Cid] {
        &self.parents
    }

    pub fn epoch(&self) -> ChainEpoch {
        self.epoch
    }

    pub fn cid(&self) -> anyhow::Result<Cid> {
        Ok(Cid::from_cbor_blake2b256(self)?)
    }
}
