// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Single gas charge in the VM. Contains information about what gas was for, as well
/// as the amount of gas needed for computation and storage respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasCharge {
    pub name: &'static str,
    pub compute_gas: u64,
    pub storage_gas: u64,
}

impl GasCharge {
    pub fn new(name: &'static str, compute_gas: u64, storage_gas: u64) -> Self {
        Self {
            name,
            compute_gas,
            storage_gas,
        }
    }

    /// Calculates total gas charge based on compute and storage gas.
    pub fn total(&self) -> u64 {
        self.compute_gas.saturating_add(self.storage_gas)
    }
}
