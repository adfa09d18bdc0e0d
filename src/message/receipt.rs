// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{econ::TokenAmount, error::ExitCode};
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;
use num_traits::Zero as _;

/// Result of a state transition from a message.
///
/// `gas_charge` is the fixed-point amount paid by the sender, i.e.
/// `gas_used * gas_price`. `return_data` keeps the ordered return segments
/// produced by the invoked method.
#[derive(Debug, PartialEq, Eq, Clone, Serialize_tuple, Deserialize_tuple)]
pub struct MessageReceipt {
    pub exit_code: ExitCode,
    pub gas_charge: TokenAmount,
    pub return_data: Vec<RawBytes>,
}

impl MessageReceipt {
    /// Receipt of a message that was turned away before reaching the VM. No
    /// gas is charged and nothing is returned.
    pub fn zero_gas(exit_code: ExitCode) -> Self {
        Self {
            exit_code,
            gas_charge: TokenAmount::zero(),
            return_data: Vec::new(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    pub fn gas_charge(&self) -> &TokenAmount {
        &self.gas_charge
    }

    pub fn return_data(&self) -> &[RawBytes] {
        &self.return_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero as _;

    #[test]
    fn zero_gas_receipt() {
        let receipt = MessageReceipt::zero_gas(ExitCode::SYS_SENDER_INVALID);
        assert!(receipt.gas_charge().is_zero());
        assert!(receipt.return_data().is_empty());
        assert!(!receipt.exit_code().is_success());
    }

    #[test]
    fn receipt_cbor_shape() {
        let receipt = MessageReceipt {
            exit_code: ExitCode::OK,
            gas_charge: TokenAmount::from_atto(42),
            return_data: vec![RawBytes::new(vec![1, 2]), RawBytes::new(vec![3])],
        };
        let bytes = fvm_ipld_encoding::to_vec(&receipt).unwrap();
        // 3-tuple: exit code, token amount, list of byte strings
        assert_eq!(bytes[0], 0x83);
        let decoded: MessageReceipt = fvm_ipld_encoding::from_slice(&bytes).unwrap();
        assert_eq!(decoded, receipt);
    }
}
