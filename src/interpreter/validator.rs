// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::RejectReason;
use crate::message::ChainMessage;
use crate::shim::address::{Address, Protocol};
use crate::state_tree::ActorState;
use crate::vm::{ActorRegistry, BuiltinActor};
use cid::Cid;
use fvm_shared4::crypto::signature::{Signature, SignatureType};
use std::cmp::Ordering;

/// Checks a message against its sender before it may reach the VM.
///
/// `signer` is the key address of the sender: the address bound in its
/// account state, or the message sender for non-account actors.
pub trait MessageValidator {
    fn validate(
        &self,
        msg: &ChainMessage,
        from_actor: &ActorState,
        signer: &Address,
    ) -> Result<(), RejectReason>;
}

impl<T: MessageValidator + ?Sized> MessageValidator for &T {
    fn validate(
        &self,
        msg: &ChainMessage,
        from_actor: &ActorState,
        signer: &Address,
    ) -> Result<(), RejectReason> {
        (**self).validate(msg, from_actor, signer)
    }
}

/// Verifies a signature over message bytes. Cryptography is provided by the
/// embedding node.
pub trait SignatureVerifier {
    fn verify(&self, signature: &Signature, signer: &Address, plaintext: &[u8])
    -> anyhow::Result<()>;
}

/// Accepts a signature whose type matches the protocol of the signer address.
///
/// Only checks the shape of the signature; plug a real verifier into
/// [`DefaultMessageValidator::with_verifier`] to check the bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureTypeVerifier;

impl SignatureVerifier for SignatureTypeVerifier {
    fn verify(
        &self,
        signature: &Signature,
        signer: &Address,
        _plaintext: &[u8],
    ) -> anyhow::Result<()> {
        let expected = match signer.protocol() {
            Protocol::BLS => SignatureType::BLS,
            Protocol::Secp256k1 => SignatureType::Secp256k1,
            _ => anyhow::bail!("address {signer} cannot sign messages"),
        };
        anyhow::ensure!(
            signature.signature_type() == expected,
            "{:?} signature from {signer}",
            signature.signature_type()
        );
        Ok(())
    }
}

/// Validator applied to every on-chain message.
///
/// Unsigned messages are only accepted from BLS keys, whose signatures are
/// aggregated at the block level.
///
/// Checks, in order: signature, self-send, negative value, account-type
/// sender, funds for `value + gas_price * gas_limit`, and finally the nonce
/// against the sender's sequence.
pub struct DefaultMessageValidator<SV = SignatureTypeVerifier> {
    account_code: Option<Cid>,
    verifier: SV,
}

impl DefaultMessageValidator {
    pub fn new(actors: &ActorRegistry) -> Self {
        Self::with_verifier(actors, SignatureTypeVerifier)
    }
}

impl<SV: SignatureVerifier> DefaultMessageValidator<SV> {
    pub fn with_verifier(actors: &ActorRegistry, verifier: SV) -> Self {
        Self {
            account_code: actors.code_of(BuiltinActor::Account),
            verifier,
        }
    }
}

impl<SV: SignatureVerifier> MessageValidator for DefaultMessageValidator<SV> {
    fn validate(
        &self,
        msg: &ChainMessage,
        from_actor: &ActorState,
        signer: &Address,
    ) -> Result<(), RejectReason> {
        let message = msg.message();

        match msg.signed() {
            Some(signed) => {
                let plaintext = message
                    .cid()
                    .map_err(|_| RejectReason::InvalidSignature)?
                    .to_bytes();
                self.verifier
                    .verify(signed.signature(), signer, &plaintext)
                    .map_err(|_| RejectReason::InvalidSignature)?;
            }
            None if signer.protocol() != Protocol::BLS => {
                return Err(RejectReason::InvalidSignature);
            }
            None => {}
        }

        if message.from() == message.to() {
            return Err(RejectReason::SelfSend);
        }

        if message.value().is_negative() || message.gas_price().is_negative() {
            return Err(RejectReason::NegativeValue);
        }

        if self.account_code != Some(from_actor.code) {
            return Err(RejectReason::NonAccountActor);
        }

        if from_actor.balance < message.required_funds() {
            return Err(RejectReason::InsufficientFunds);
        }

        match message.sequence().cmp(&from_actor.sequence) {
            Ordering::Less => Err(RejectReason::NonceTooLow),
            Ordering::Greater => Err(RejectReason::NonceTooHigh),
            Ordering::Equal => Ok(()),
        }
    }
}
