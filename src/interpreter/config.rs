// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::gas_tracker::BLOCK_GAS_LIMIT;
use crate::shim::econ::TokenAmount;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gas allowance of the synthetic sub-calls that provision a new account
/// actor (init `Exec`, account constructor, init `GetActorIdForAddress`).
/// Provisioning must never fail for lack of gas; the budget only guards
/// against runaway execution.
pub const PROVISIONING_GAS_LIMIT: u64 = 10_000;

/// Default block reward, 1000 FIL.
const DEFAULT_BLOCK_REWARD_FIL: u64 = 1_000;

/// Structure that defines processor configuration options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Gas capacity of a single block.
    pub block_gas_limit: u64,
    /// Gas allowance of actor provisioning and other internal sub-calls.
    pub provisioning_gas_limit: u64,
    /// Reward paid to the miner owner of a block, in attoFIL.
    #[serde(with = "atto_string")]
    pub block_reward: TokenAmount,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            block_gas_limit: BLOCK_GAS_LIMIT,
            provisioning_gas_limit: PROVISIONING_GAS_LIMIT,
            block_reward: TokenAmount::from_whole(DEFAULT_BLOCK_REWARD_FIL),
        }
    }
}

impl ProcessorConfig {
    /// Loads the configuration from a TOML document. Missing keys take their
    /// default value.
    pub fn from_toml(toml: &str) -> anyhow::Result<Self> {
        toml::from_str(toml).context("invalid processor configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&toml)
    }
}

/// Token amounts as decimal attoFIL strings, which TOML integers cannot hold.
mod atto_string {
    use crate::shim::econ::TokenAmount;
    use num_bigint::BigInt;
    use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};
    use std::str::FromStr as _;

    pub fn serialize<S: Serializer>(amount: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.atto().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenAmount, D::Error> {
        let s = String::deserialize(deserializer)?;
        let atto = BigInt::from_str(s.trim()).map_err(D::Error::custom)?;
        Ok(TokenAmount::from_atto(atto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.block_gas_limit, 10_000_000);
        assert_eq!(config.provisioning_gas_limit, 10_000);
        assert_eq!(config.block_reward, TokenAmount::from_whole(1_000));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ProcessorConfig::from_toml("block_gas_limit = 5000\n").unwrap();
        assert_eq!(
            config,
            ProcessorConfig {
                block_gas_limit: 5_000,
                ..Default::default()
            }
        );
    }

    #[test]
    fn block_reward_round_trips_through_toml() {
        let config = ProcessorConfig::from_toml(
            r#"
            provisioning_gas_limit = 20000
            block_reward = "123456789012345678901234"
            "#,
        )
        .unwrap();
        assert_eq!(config.provisioning_gas_limit, 20_000);
        assert_eq!(
            config.block_reward.atto().to_string(),
            "123456789012345678901234"
        );
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(ProcessorConfig::from_toml(&serialized).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ProcessorConfig::from_file("/nonexistent/processor.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/processor.toml"));
    }

    #[test]
    fn invalid_reward_is_rejected() {
        assert!(ProcessorConfig::from_toml("block_reward = \"lots\"\n").is_err());
    }
}
