// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Message, SignedMessage};
use cid::Cid;
use serde::{Deserialize, Serialize};

/// `ChainMessage` is either a signed message or an unsigned message whose
/// signature is covered by the block's aggregate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChainMessage {
    Unsigned(Message),
    Signed(SignedMessage),
}

impl ChainMessage {
    pub fn message(&self) -> &Message {
        match self {
            Self::Unsigned(m) => m,
            Self::Signed(sm) => sm.message(),
        }
    }

    pub fn signed(&self) -> Option<&SignedMessage> {
        match self {
            Self::Unsigned(_) => None,
            Self::Signed(sm) => Some(sm),
        }
    }

    pub fn cid(&self) -> anyhow::Result<Cid> {
        match self {
            ChainMessage::Unsigned(msg) => msg.cid(),
            ChainMessage::Signed(msg) => msg.cid(),
        }
    }
}

impl From<Message> for ChainMessage {
    fn from(msg: Message) -> Self {
        Self::Unsigned(msg)
    }
}

impl From<SignedMessage> for ChainMessage {
    fn from(msg: SignedMessage) -> Self {
        Self::Signed(msg)
    }
}
