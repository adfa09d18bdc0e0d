// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod address;
pub mod econ;
pub mod error;

pub mod clock {
    pub use fvm_shared4::clock::ChainEpoch;
}

pub use fvm_shared4::{ActorID, METHOD_CONSTRUCTOR, METHOD_SEND, MethodNum};
