// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
use fvm_shared4::error::ExitCode as ExitCode_latest;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// `Newtype` wrapper for the FVM `ExitCode`.
///
/// Receipts persist the numeric value. [`fmt::Display`] prints the
/// conventional name next to it for the codes the processor produces.
#[derive(
    PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize, derive_more::From, derive_more::Into,
)]
#[serde(transparent)]
pub struct ExitCode(ExitCode_latest);

impl PartialOrd for ExitCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.value().cmp(&other.value()))
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            ExitCode_latest::OK => Some("Ok"),
            ExitCode_latest::SYS_SENDER_INVALID => Some("SysErrSenderInvalid"),
            ExitCode_latest::SYS_SENDER_STATE_INVALID => Some("SysErrSenderStateInvalid"),
            ExitCode_latest::SYS_INVALID_RECEIVER => Some("SysErrInvalidReceiver"),
            ExitCode_latest::SYS_INSUFFICIENT_FUNDS => Some("SysErrInsufficientFunds"),
            ExitCode_latest::SYS_OUT_OF_GAS => Some("SysErrOutOfGas"),
            ExitCode_latest::USR_ILLEGAL_ARGUMENT => Some("ErrIllegalArgument"),
            ExitCode_latest::USR_NOT_FOUND => Some("ErrNotFound"),
            ExitCode_latest::USR_FORBIDDEN => Some("ErrForbidden"),
            ExitCode_latest::USR_ILLEGAL_STATE => Some("ErrIllegalState"),
            ExitCode_latest::USR_SERIALIZATION => Some("ErrSerialization"),
            ExitCode_latest::USR_UNHANDLED_MESSAGE => Some("ErrUnhandledMessage"),
            _ => None,
        };
        match name {
            Some(name) => write!(f, "{}({})", name, self.value()),
            None => write!(f, "{}", self.value()),
        }
    }
}

impl ExitCode {
    pub const OK: Self = Self::new(ExitCode_latest::OK);

    /// The message sender doesn't exist.
    pub const SYS_SENDER_INVALID: Self = Self::new(ExitCode_latest::SYS_SENDER_INVALID);

    /// The message sender was not in a valid state to send this message.
    pub const SYS_SENDER_STATE_INVALID: Self =
        Self::new(ExitCode_latest::SYS_SENDER_STATE_INVALID);

    /// The message receiver could not be resolved or loaded.
    pub const SYS_INVALID_RECEIVER: Self = Self::new(ExitCode_latest::SYS_INVALID_RECEIVER);

    /// Message execution (including sub-calls) used more gas than the specified limit.
    pub const SYS_OUT_OF_GAS: Self = Self::new(ExitCode_latest::SYS_OUT_OF_GAS);

    /// The message sender didn't have the requisite funds.
    pub const SYS_INSUFFICIENT_FUNDS: Self = Self::new(ExitCode_latest::SYS_INSUFFICIENT_FUNDS);

    pub const USR_ILLEGAL_ARGUMENT: Self = Self::new(ExitCode_latest::USR_ILLEGAL_ARGUMENT);
    pub const USR_NOT_FOUND: Self = Self::new(ExitCode_latest::USR_NOT_FOUND);
    pub const USR_FORBIDDEN: Self = Self::new(ExitCode_latest::USR_FORBIDDEN);
    pub const USR_ILLEGAL_STATE: Self = Self::new(ExitCode_latest::USR_ILLEGAL_STATE);
    pub const USR_SERIALIZATION: Self = Self::new(ExitCode_latest::USR_SERIALIZATION);
    pub const USR_UNHANDLED_MESSAGE: Self = Self::new(ExitCode_latest::USR_UNHANDLED_MESSAGE);

    pub fn value(&self) -> u32 {
        self.0.value()
    }

    pub fn is_success(&self) -> bool {
        self.0.is_success()
    }

    pub const fn new(value: ExitCode_latest) -> Self {
        Self(value)
    }
}

impl From<u32> for ExitCode {
    fn from(value: u32) -> Self {
        Self(ExitCode_latest::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_known_names() {
        assert_eq!(ExitCode::OK.to_string(), "Ok(0)");
        assert_eq!(ExitCode::SYS_OUT_OF_GAS.to_string(), "SysErrOutOfGas(7)");
        assert_eq!(ExitCode::from(4242).to_string(), "4242");
    }

    #[test]
    fn ordering_follows_value() {
        assert!(ExitCode::OK < ExitCode::SYS_SENDER_INVALID);
        assert!(ExitCode::USR_FORBIDDEN > ExitCode::SYS_OUT_OF_GAS);
    }
}
