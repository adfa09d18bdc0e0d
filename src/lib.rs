// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! State-transition processor for a Filecoin node.
//!
//! The [`interpreter::Processor`] applies the messages of a tipset to a
//! [`state_tree::StateTree`], charging gas, resolving addresses through the
//! init actor and producing one [`message::MessageReceipt`] per message.
//! Message-level rejections are reported per message; only faults abort the
//! whole tipset.

pub mod blocks;
pub mod db;
pub mod genesis;
pub mod interpreter;
pub mod message;
pub mod metrics;
pub mod shim;
pub mod state_tree;
#[cfg(test)]
mod test_utils;
pub mod utils;
pub mod vm;
