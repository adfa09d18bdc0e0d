// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::message::MessageReceipt;
use crate::shim::error::ExitCode;
use thiserror::Error;

/// Why a message was turned away before (or instead of) executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    #[error("from (sender) account not found")]
    SenderNotFound,
    #[error("message gas limit above block gas limit")]
    GasAboveBlockLimit,
    #[error("message gas limit too high for current block")]
    GasTooHighForCurrentBlock,
    #[error("nonce too high")]
    NonceTooHigh,
    #[error("nonce too low")]
    NonceTooLow,
    #[error("message from non-account actor")]
    NonAccountActor,
    #[error("negative value")]
    NegativeValue,
    #[error("balance insufficient to cover transfer+gas")]
    InsufficientFunds,
    #[error("invalid signature by sender over message data")]
    InvalidSignature,
    #[error("cannot send to self")]
    SelfSend,
    #[error("failed to resolve To actor")]
    ReceiverNotFound,
}

/// Whether a rejected message may succeed if resubmitted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permanence {
    /// The message can never succeed as written and is consumed.
    Permanent,
    /// The message may succeed in a later block.
    Temporary,
}

impl RejectReason {
    pub const fn permanence(self) -> Permanence {
        use RejectReason::*;
        match self {
            SenderNotFound | NonceTooHigh | GasTooHighForCurrentBlock => Permanence::Temporary,
            GasAboveBlockLimit | NonceTooLow | NonAccountActor | NegativeValue
            | InsufficientFunds | InvalidSignature | SelfSend | ReceiverNotFound => {
                Permanence::Permanent
            }
        }
    }

    pub const fn is_permanent(self) -> bool {
        matches!(self.permanence(), Permanence::Permanent)
    }

    /// Exit code recorded in the zero-gas receipt of a rejected message.
    pub const fn exit_code(self) -> ExitCode {
        use RejectReason::*;
        match self {
            SenderNotFound | NonAccountActor | InvalidSignature => ExitCode::SYS_SENDER_INVALID,
            NonceTooHigh | NonceTooLow => ExitCode::SYS_SENDER_STATE_INVALID,
            GasAboveBlockLimit | GasTooHighForCurrentBlock => ExitCode::SYS_OUT_OF_GAS,
            InsufficientFunds => ExitCode::SYS_INSUFFICIENT_FUNDS,
            NegativeValue => ExitCode::USR_ILLEGAL_ARGUMENT,
            SelfSend => ExitCode::USR_FORBIDDEN,
            ReceiverNotFound => ExitCode::SYS_INVALID_RECEIVER,
        }
    }

    /// Zero-gas receipt recorded for a message rejected for this reason.
    pub fn receipt(self) -> MessageReceipt {
        MessageReceipt::zero_gas(self.exit_code())
    }

    /// Label used for metrics.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Classification of a failure, governing retry and abort behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Internal invariant violation. Aborts the whole tipset or batch.
    Fault,
    PermanentRejection(RejectReason),
    TemporaryRejection(RejectReason),
}

impl ErrorKind {
    pub const fn classify(reason: RejectReason) -> Self {
        match reason.permanence() {
            Permanence::Permanent => Self::PermanentRejection(reason),
            Permanence::Temporary => Self::TemporaryRejection(reason),
        }
    }

    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault)
    }
}

/// Interpreter error.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage corruption or another internal inconsistency.
    #[error("fault: {0:#}")]
    Fault(#[from] anyhow::Error),
    #[error("message rejected: {0}")]
    Rejected(RejectReason),
    /// Processing was cancelled by the caller. Treated as a fault: nothing is
    /// committed.
    #[error("processing cancelled")]
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fault(_) | Self::Cancelled => ErrorKind::Fault,
            Self::Rejected(reason) => ErrorKind::classify(*reason),
        }
    }

    pub fn is_fault(&self) -> bool {
        self.kind().is_fault()
    }

    pub fn fault(msg: impl std::fmt::Display) -> Self {
        Self::Fault(anyhow::anyhow!("{msg}"))
    }
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

/// Attaches context to a collaborator failure and turns it into a fault.
pub(crate) trait FaultContext<T> {
    fn or_fault(self, context: &'static str) -> Result<T, Error>;
}

impl<T, E> FaultContext<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_fault(self, context: &'static str) -> Result<T, Error> {
        self.map_err(|e| Error::Fault(e.into().context(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero as _;
    use rstest::rstest;
    use strum::IntoEnumIterator as _;

    #[rstest]
    #[case(RejectReason::SenderNotFound, false)]
    #[case(RejectReason::NonceTooHigh, false)]
    #[case(RejectReason::GasTooHighForCurrentBlock, false)]
    #[case(RejectReason::GasAboveBlockLimit, true)]
    #[case(RejectReason::NonceTooLow, true)]
    #[case(RejectReason::NonAccountActor, true)]
    #[case(RejectReason::NegativeValue, true)]
    #[case(RejectReason::InsufficientFunds, true)]
    #[case(RejectReason::InvalidSignature, true)]
    #[case(RejectReason::SelfSend, true)]
    #[case(RejectReason::ReceiverNotFound, true)]
    fn permanence(#[case] reason: RejectReason, #[case] permanent: bool) {
        assert_eq!(reason.is_permanent(), permanent);
        let kind = Error::Rejected(reason).kind();
        if permanent {
            assert_eq!(kind, ErrorKind::PermanentRejection(reason));
        } else {
            assert_eq!(kind, ErrorKind::TemporaryRejection(reason));
        }
    }

    #[test]
    fn rejections_have_failing_zero_gas_receipts() {
        for reason in RejectReason::iter() {
            let receipt = reason.receipt();
            assert!(!receipt.exit_code().is_success(), "{reason:?}");
            assert!(receipt.gas_charge().is_zero());
        }
    }

    #[test]
    fn faults_and_cancellation_classify_as_fault() {
        assert!(Error::fault("boom").is_fault());
        assert!(Error::Cancelled.is_fault());
        assert!(!Error::Rejected(RejectReason::SelfSend).is_fault());
    }

    #[test]
    fn messages_match_wire_text() {
        assert_eq!(RejectReason::NonceTooHigh.to_string(), "nonce too high");
        assert_eq!(
            RejectReason::SenderNotFound.to_string(),
            "from (sender) account not found"
        );
        assert_eq!(RejectReason::SelfSend.as_str(), "self_send");
    }
}
