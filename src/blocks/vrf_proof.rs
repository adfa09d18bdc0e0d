// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::strict_bytes;
use multihash_codetable::{Code, MultihashDigest};
use serde::{Deserialize, Serialize};

/// The output from running a VRF proof.
#[cfg_attr(test, derive(derive_more::Constructor))]
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, Hash)]
pub struct VRFProof(#[serde(with = "strict_bytes")] pub Vec<u8>);

impl VRFProof {
    /// Returns reference to underlying proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Compute the `BLAKE2b256` digest of the proof.
    pub fn digest(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(Code::Blake2b256.digest(&self.0).digest());
        out
    }
}
