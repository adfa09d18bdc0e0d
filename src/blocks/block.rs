// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::message::{ChainMessage, Message, SignedMessage};

use super::BlockHeader;

/// A complete Filecoin block. This contains the block header as well as all BLS
/// and SECP messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub bls_messages: Vec<Message>,
    pub secp_messages: Vec<SignedMessage>,
}

impl Block {
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Messages in application order: BLS messages first, then SECP messages,
    /// each in the order they are listed in the block. BLS messages are
    /// unsigned; their senders must hold BLS keys.
    pub fn messages(&self) -> impl Iterator<Item = ChainMessage> + '_ {
        self.bls_messages
            .iter()
            .cloned()
            .map(ChainMessage::Unsigned)
            .chain(self.secp_messages.iter().cloned().map(ChainMessage::Signed))
    }
}
