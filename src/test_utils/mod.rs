// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blocks::{Block, BlockHeader, Ticket, VRFProof};
use crate::message::{ChainMessage, Message};
use crate::shim::{METHOD_SEND, address::Address, clock::ChainEpoch, econ::TokenAmount};
use std::sync::Once;

/// Deterministic BLS key address derived from `seed`. Messages from it may
/// be applied unsigned.
pub fn key_address(seed: u8) -> Address {
    Address::new_bls(&[seed; 48]).unwrap()
}

/// Deterministic secp256k1 key address derived from `seed`.
pub fn secp_address(seed: u8) -> Address {
    Address::new_secp256k1(&[seed; 65]).unwrap()
}

/// Plain value transfer priced at one attoFIL per gas unit.
pub fn transfer(from: Address, to: Address, sequence: u64, value: u64) -> Message {
    Message::builder()
        .from(from)
        .to(to)
        .sequence(sequence)
        .value(TokenAmount::from_atto(value))
        .method_num(METHOD_SEND)
        .gas_price(TokenAmount::from_atto(1))
        .gas_limit(10_000)
        .build()
        .unwrap()
}

pub fn block(ticket: u8, epoch: ChainEpoch, miner: Address, messages: Vec<Message>) -> Block {
    Block {
        header: BlockHeader {
            miner_address: miner,
            ticket: Ticket::new(VRFProof::new(vec![ticket])),
            parents: vec![],
            epoch,
        },
        bls_messages: messages,
        secp_messages: vec![],
    }
}

pub fn chain_messages(messages: impl IntoIterator<Item = Message>) -> Vec<ChainMessage> {
    messages.into_iter().map(ChainMessage::from).collect()
}

/// Routes `tracing` output through the test harness writer.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
