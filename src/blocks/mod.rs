// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

mod block;
mod header;
mod ticket;
mod tipset;
mod vrf_proof;

pub use block::Block;
pub use header::BlockHeader;
pub use ticket::Ticket;
pub use tipset::{FullTipset, Tipset};
pub use vrf_proof::VRFProof;

/// Blockchain blocks error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Tipset contains invalid data, as described by the string parameter.
    #[error("Invalid tipset: {0}")]
    InvalidTipset(String),
    /// The given tipset has no blocks
    #[error("No blocks for tipset")]
    NoBlocks,
    /// Error in validating arbitrary data
    #[error("Error validating data: {0}")]
    Validation(String),
}
