// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::GasCharge;
use crate::shim::{METHOD_SEND, MethodNum, econ::TokenAmount};

static BASE_PRICES: PriceList = PriceList {
    on_chain_message_base: 100,
    on_chain_message_per_byte: 1,

    on_chain_return_value_per_byte: 1,

    send_base: 50,
    send_transfer_funds: 20,
    send_invoke_method: 30,

    ipld_get_base: 10,
    ipld_put_base: 20,

    create_actor_compute: 500,
};

/// Returns the price list used by the processor.
pub fn price_list() -> &'static PriceList {
    &BASE_PRICES
}

/// Provides prices for operations in the VM
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceList {
    /// Gas cost charged to the originator of an on-chain message (regardless of
    /// whether it succeeds or fails in application) is given by:
    ///   OnChainMessageBase + len(serialized message)*OnChainMessagePerByte
    pub(crate) on_chain_message_base: u64,
    pub(crate) on_chain_message_per_byte: u64,

    /// Gas cost charged to the originator of a non-nil return value produced
    /// by an on-chain message is given by:
    ///   len(return value)*OnChainReturnValuePerByte
    pub(crate) on_chain_return_value_per_byte: u64,

    /// Gas cost for any message send execution (including the top-level one
    /// initiated by an on-chain message).
    pub(crate) send_base: u64,

    /// Gas cost charged, in addition to SendBase, if a message send
    /// is accompanied by any nonzero currency amount.
    pub(crate) send_transfer_funds: u64,

    /// Gas cost charged, in addition to SendBase, if a message invokes
    /// a method on the receiver.
    pub(crate) send_invoke_method: u64,

    /// Flat gas cost for any Get operation to the IPLD store in the runtime
    /// VM context.
    pub(crate) ipld_get_base: u64,

    /// Flat gas cost for any Put operation to the IPLD store. Kept flat so that
    /// actor provisioning stays within its fixed budget as the init actor's
    /// address map grows.
    pub(crate) ipld_put_base: u64,

    /// Gas cost for creating a new actor (via InitActor's Exec method).
    pub(crate) create_actor_compute: u64,
}

impl PriceList {
    /// Returns the gas required for storing a message of a given size in the chain.
    #[inline]
    pub fn on_chain_message(&self, msg_size: usize) -> GasCharge {
        GasCharge::new(
            "OnChainMessage",
            self.on_chain_message_base,
            self.on_chain_message_per_byte * msg_size as u64,
        )
    }
    /// Returns the gas required for storing the response of a message in the chain.
    #[inline]
    pub fn on_chain_return_value(&self, data_size: usize) -> GasCharge {
        GasCharge::new(
            "OnChainReturnValue",
            0,
            data_size as u64 * self.on_chain_return_value_per_byte,
        )
    }
    /// Returns the gas required when invoking a method.
    #[inline]
    pub fn on_method_invocation(&self, value: &TokenAmount, method_num: MethodNum) -> GasCharge {
        let mut ret = self.send_base;
        if !value.is_zero() {
            ret += self.send_transfer_funds;
        }
        if method_num != METHOD_SEND {
            ret += self.send_invoke_method;
        }
        GasCharge::new("OnMethodInvocation", ret, 0)
    }
    /// Returns the gas required for loading an object.
    #[inline]
    pub fn on_ipld_get(&self) -> GasCharge {
        GasCharge::new("OnIpldGet", self.ipld_get_base, 0)
    }
    /// Returns the gas required for storing an object.
    #[inline]
    pub fn on_ipld_put(&self) -> GasCharge {
        GasCharge::new("OnIpldPut", self.ipld_put_base, 0)
    }
    /// Returns the gas required for creating an actor.
    #[inline]
    pub fn on_create_actor(&self) -> GasCharge {
        GasCharge::new("OnCreateActor", self.create_actor_compute, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero as _;

    #[test]
    fn method_invocation_charges() {
        let pl = price_list();
        let zero = TokenAmount::zero();
        let one = TokenAmount::from_atto(1);
        assert_eq!(pl.on_method_invocation(&zero, METHOD_SEND).total(), 50);
        assert_eq!(pl.on_method_invocation(&one, METHOD_SEND).total(), 70);
        assert_eq!(pl.on_method_invocation(&zero, 2).total(), 80);
        assert_eq!(pl.on_method_invocation(&one, 2).total(), 100);
    }

    #[test]
    fn message_size_is_charged_per_byte() {
        let pl = price_list();
        assert_eq!(pl.on_chain_message(0).total(), 100);
        assert_eq!(pl.on_chain_message(64).total(), 164);
        assert_eq!(pl.on_chain_return_value(8).total(), 8);
    }
}
