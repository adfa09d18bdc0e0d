// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod chain_message;
mod receipt;
pub mod signed_message;

use crate::shim::{MethodNum, address::Address, econ::TokenAmount};
use crate::utils::cid::CidCborExt as _;
use cid::Cid;
use derive_builder::Builder;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;

pub use chain_message::ChainMessage;
pub use receipt::MessageReceipt;
pub use signed_message::SignedMessage;

/// An unsigned state-transition message.
///
/// Messages are immutable values: every field is set at construction time
/// through [`MessageBuilder`] and only read afterwards.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple, Builder)]
#[builder(name = "MessageBuilder")]
pub struct Message {
    #[builder(setter(into))]
    pub from: Address,
    #[builder(setter(into))]
    pub to: Address,
    #[builder(default)]
    pub sequence: u64,
    #[builder(default)]
    pub value: TokenAmount,
    #[builder(default)]
    pub method_num: MethodNum,
    #[builder(default)]
    pub params: RawBytes,
    #[builder(default)]
    pub gas_price: TokenAmount,
    #[builder(default)]
    pub gas_limit: u64,
}

impl Message {
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    pub fn from(&self) -> &Address {
        &self.from
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn value(&self) -> &TokenAmount {
        &self.value
    }

    pub fn method_num(&self) -> MethodNum {
        self.method_num
    }

    pub fn params(&self) -> &RawBytes {
        &self.params
    }

    pub fn gas_price(&self) -> &TokenAmount {
        &self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Largest gas charge this message can incur: `gas_price * gas_limit`.
    pub fn max_gas_charge(&self) -> TokenAmount {
        &self.gas_price * self.gas_limit
    }

    /// Funds the sender must hold for the message to be admissible.
    pub fn required_funds(&self) -> TokenAmount {
        self.max_gas_charge() + &self.value
    }

    /// Content identifier of the `dag-cbor` encoded message.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        Ok(Cid::from_cbor_blake2b256(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::builder()
            .from(Address::new_id(100))
            .to(Address::new_id(101))
            .sequence(5)
            .value(TokenAmount::from_atto(10))
            .gas_price(TokenAmount::from_atto(3))
            .gas_limit(1_000)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let msg = Message::builder()
            .from(Address::new_id(1))
            .to(Address::new_id(2))
            .build()
            .unwrap();
        assert_eq!(msg.sequence(), 0);
        assert_eq!(msg.gas_limit(), 0);
        assert!(msg.params().bytes().is_empty());
    }

    #[test]
    fn builder_requires_addresses() {
        assert!(Message::builder().to(Address::new_id(2)).build().is_err());
    }

    #[test]
    fn required_funds_covers_value_and_gas() {
        let msg = message();
        assert_eq!(msg.max_gas_charge(), TokenAmount::from_atto(3_000));
        assert_eq!(msg.required_funds(), TokenAmount::from_atto(3_010));
    }

    #[test]
    fn cid_depends_on_content() {
        let a = message();
        let mut b = a.clone();
        b.sequence += 1;
        assert_eq!(a.cid().unwrap(), a.clone().cid().unwrap());
        assert_ne!(a.cid().unwrap(), b.cid().unwrap());
    }
}
