// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Message;
use crate::utils::cid::CidCborExt as _;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared4::crypto::signature::{Signature, SignatureType};

/// Message together with the signature of its sender.
#[derive(PartialEq, Clone, Debug, Serialize_tuple, Deserialize_tuple, Eq)]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

impl SignedMessage {
    /// Pairs `message` with `signature` without checking it. Signatures are
    /// verified by the message validator at application time.
    pub fn new_unchecked(message: Message, signature: Signature) -> SignedMessage {
        SignedMessage { message, signature }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_bls(&self) -> bool {
        self.signature.signature_type() == SignatureType::BLS
    }

    // BLS messages are identified by the unsigned message, the signature
    // being aggregated at the block level.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        if self.is_bls() {
            self.message.cid()
        } else {
            Ok(Cid::from_cbor_blake2b256(self)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChainMessage;
    use crate::shim::address::Address;

    fn message() -> Message {
        Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .build()
            .unwrap()
    }

    #[test]
    fn bls_message_shares_unsigned_cid() {
        let signed = SignedMessage::new_unchecked(message(), Signature::new_bls(vec![0; 96]));
        assert!(signed.is_bls());
        assert_eq!(signed.cid().unwrap(), message().cid().unwrap());
        assert_eq!(
            ChainMessage::from(signed).cid().unwrap(),
            ChainMessage::from(message()).cid().unwrap()
        );
    }

    #[test]
    fn secp_message_cid_covers_signature() {
        let signed =
            SignedMessage::new_unchecked(message(), Signature::new_secp256k1(vec![0; 65]));
        assert!(!signed.is_bls());
        assert_ne!(signed.cid().unwrap(), message().cid().unwrap());
    }
}
