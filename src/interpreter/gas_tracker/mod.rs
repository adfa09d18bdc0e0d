// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod gas_charge;
mod price_list;

pub use self::gas_charge::GasCharge;
pub use self::price_list::{PriceList, price_list};
use crate::message::Message;
use thiserror::Error;

/// Default gas capacity of a single block.
pub const BLOCK_GAS_LIMIT: u64 = 10_000_000;

/// Returned by [`GasTracker::charge_gas`] when a charge does not fit in the
/// message's limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not enough gas for {charge}: used={used}, limit={limit}")]
pub struct OutOfGas {
    pub charge: &'static str,
    pub used: u64,
    pub limit: u64,
}

/// Tracks gas consumption of the message being applied, and of the block it
/// belongs to.
///
/// The block-level counters only move through [`GasTracker::commit_message`],
/// so a rejected message never consumes block capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasTracker {
    block_gas_limit: u64,
    block_gas_used: u64,
    msg_gas_limit: u64,
    msg_gas_used: u64,
}

impl GasTracker {
    /// Creates a tracker for a fresh block of the given capacity.
    pub fn new(block_gas_limit: u64) -> Self {
        Self {
            block_gas_limit,
            block_gas_used: 0,
            msg_gas_limit: 0,
            msg_gas_used: 0,
        }
    }

    /// Creates a tracker whose single message may consume up to `limit`.
    /// Used for queries and for internal sub-calls such as actor provisioning.
    pub fn for_message_limit(limit: u64) -> Self {
        Self {
            block_gas_limit: limit,
            block_gas_used: 0,
            msg_gas_limit: limit,
            msg_gas_used: 0,
        }
    }

    /// Prepares the tracker for the next message: adopts its gas limit and
    /// clears the usage counter.
    pub fn reset_for_new_message(&mut self, msg: &Message) {
        self.msg_gas_limit = msg.gas_limit();
        self.msg_gas_used = 0;
    }

    /// `true` if the message limit exceeds the absolute capacity of a block.
    pub fn gas_above_block_limit(&self) -> bool {
        self.msg_gas_limit > self.block_gas_limit
    }

    /// `true` if the message limit exceeds what is left in the current block.
    pub fn gas_too_high_for_current_block(&self) -> bool {
        self.msg_gas_limit > self.block_gas_remaining()
    }

    /// Charges gas to the current message. On overflow usage is pinned to the
    /// limit, so that the sender pays for everything it was allowed to burn.
    pub fn charge_gas(&mut self, charge: GasCharge) -> Result<(), OutOfGas> {
        let total = self.msg_gas_used.saturating_add(charge.total());
        if total > self.msg_gas_limit {
            self.msg_gas_used = self.msg_gas_limit;
            return Err(OutOfGas {
                charge: charge.name,
                used: total,
                limit: self.msg_gas_limit,
            });
        }
        self.msg_gas_used = total;
        Ok(())
    }

    /// Gas units consumed by the current message so far.
    pub fn gas_used(&self) -> u64 {
        self.msg_gas_used
    }

    pub fn gas_limit(&self) -> u64 {
        self.msg_gas_limit
    }

    pub fn gas_remaining(&self) -> u64 {
        self.msg_gas_limit - self.msg_gas_used
    }

    pub fn block_gas_limit(&self) -> u64 {
        self.block_gas_limit
    }

    pub fn block_gas_used(&self) -> u64 {
        self.block_gas_used
    }

    pub fn block_gas_remaining(&self) -> u64 {
        self.block_gas_limit.saturating_sub(self.block_gas_used)
    }

    /// Folds the usage of the current message into the block total.
    pub fn commit_message(&mut self) {
        self.block_gas_used = self.block_gas_used.saturating_add(self.msg_gas_used);
        self.msg_gas_used = 0;
    }
}
