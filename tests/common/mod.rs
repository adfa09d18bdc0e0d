// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

#![allow(dead_code)]

use forest_processor::blocks::{Block, BlockHeader, FullTipset, Ticket, VRFProof};
use forest_processor::db::MemoryDB;
use forest_processor::genesis::GenesisBuilder;
use forest_processor::message::{Message, SignedMessage};
use forest_processor::shim::{
    ActorID, METHOD_SEND, address::Address, clock::ChainEpoch, econ::TokenAmount,
};
use forest_processor::state_tree::{MemStateTree, StateTree as _};
use fvm_shared4::crypto::signature::Signature;
use num_traits::Zero as _;

/// ID of the funded account created by [`genesis`].
pub const ALICE: ActorID = 100;
/// ID of the unfunded account created by [`genesis`].
pub const BOB: ActorID = 101;
/// ID of the miner owner account created by [`genesis`].
pub const MINER: ActorID = 102;

/// Deterministic BLS key address. Messages from BLS keys may travel unsigned
/// in a block's BLS list.
pub fn key_address(seed: u8) -> Address {
    Address::new_bls(&[seed; 48]).unwrap()
}

/// Deterministic secp256k1 key address. Messages from it must be signed.
pub fn secp_address(seed: u8) -> Address {
    Address::new_secp256k1(&[seed; 65]).unwrap()
}

/// Wraps `msg` with a secp256k1 signature of the expected shape.
pub fn secp_signed(msg: Message) -> SignedMessage {
    SignedMessage::new_unchecked(msg, Signature::new_secp256k1(vec![0; 65]))
}

/// Genesis with a well funded reward actor and the accounts [`ALICE`],
/// [`BOB`] and [`MINER`].
pub fn genesis(store: &MemoryDB) -> MemStateTree<&MemoryDB> {
    GenesisBuilder::default()
        .reward_balance(TokenAmount::from_whole(1_000_000))
        .with_account(key_address(1), TokenAmount::from_whole(1))
        .with_account(key_address(2), TokenAmount::zero())
        .with_account(key_address(3), TokenAmount::zero())
        .build(store)
        .unwrap()
}

/// ID of the secp256k1 account created by [`genesis_with_secp_account`].
pub const CAROL: ActorID = 103;

/// [`genesis`] plus a funded secp256k1 account [`CAROL`] bound to
/// `secp_address(9)`.
pub fn genesis_with_secp_account(store: &MemoryDB) -> MemStateTree<&MemoryDB> {
    GenesisBuilder::default()
        .reward_balance(TokenAmount::from_whole(1_000_000))
        .with_account(key_address(1), TokenAmount::from_whole(1))
        .with_account(key_address(2), TokenAmount::zero())
        .with_account(key_address(3), TokenAmount::zero())
        .with_account(secp_address(9), TokenAmount::from_whole(1))
        .build(store)
        .unwrap()
}

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

pub fn block(
    ticket: u8,
    epoch: ChainEpoch,
    bls_messages: Vec<Message>,
    secp_messages: Vec<SignedMessage>,
) -> Block {
    Block {
        header: BlockHeader {
            miner_address: key_address(3),
            ticket: Ticket::new(VRFProof(vec![ticket])),
            parents: vec![],
            epoch,
        },
        bls_messages,
        secp_messages,
    }
}

/// Tipset whose blocks carry only BLS-list messages, one entry per block.
pub fn tipset(epoch: ChainEpoch, blocks: Vec<(u8, Vec<Message>)>) -> FullTipset {
    FullTipset::new(
        blocks
            .into_iter()
            .map(|(ticket, messages)| block(ticket, epoch, messages, vec![]))
            .collect(),
    )
    .unwrap()
}

pub fn actor_sequence(tree: &MemStateTree<&MemoryDB>, id: ActorID) -> u64 {
    tree.get_actor(id).unwrap().unwrap().sequence
}

pub fn actor_balance(tree: &MemStateTree<&MemoryDB>, id: ActorID) -> TokenAmount {
    tree.get_actor(id).unwrap().unwrap().balance
}
