// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Applies messages to a state tree.
//!
//! [`Processor`] owns the collaborators of a state transition: the VM, the
//! message validator, the block rewarder and the actor registry. Every entry
//! point works on a [`CachedTree`](crate::state_tree::CachedTree) overlay and
//! only touches the base tree through an explicit commit.

mod apply;
mod config;
mod errors;
mod gas_tracker;
mod query;
mod resolver;
mod tipset;
mod validator;

pub use apply::{ApplicationResult, ApplyMessageResult};
pub use config::{PROVISIONING_GAS_LIMIT, ProcessorConfig};
pub use errors::{Error, ErrorKind, Permanence, RejectReason};
pub use gas_tracker::{BLOCK_GAS_LIMIT, GasCharge, GasTracker, OutOfGas, PriceList, price_list};
pub use query::QueryOutput;
pub use resolver::Resolver;
pub use tipset::{BatchOutput, BlockRewarder, RewardActorRewarder, TipsetOutput};
pub use validator::{
    DefaultMessageValidator, MessageValidator, SignatureTypeVerifier, SignatureVerifier,
};

use crate::vm::{ActorRegistry, DefaultVm, Vm};

/// The tipset state-transition processor.
pub struct Processor<V = DefaultVm, MV = DefaultMessageValidator, R = RewardActorRewarder> {
    vm: V,
    validator: MV,
    rewarder: R,
    actors: ActorRegistry,
    config: ProcessorConfig,
}

impl Processor {
    /// Creates a processor running the builtin actors on the reference VM.
    pub fn new(config: ProcessorConfig) -> Self {
        let actors = ActorRegistry::default();
        Self {
            vm: DefaultVm,
            validator: DefaultMessageValidator::new(&actors),
            rewarder: RewardActorRewarder::new(
                config.block_reward.clone(),
                config.provisioning_gas_limit,
            ),
            actors,
            config,
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl<V, MV, R> Processor<V, MV, R> {
    pub fn new_configured(
        vm: V,
        validator: MV,
        rewarder: R,
        actors: ActorRegistry,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            vm,
            validator,
            rewarder,
            actors,
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.actors
    }

    pub fn vm(&self) -> &V {
        &self.vm
    }
}

impl<V: Vm, MV, R> Processor<V, MV, R> {
    /// Address resolver bound to this processor's VM and registry.
    pub fn resolver(&self) -> Resolver<'_, V> {
        Resolver::new(&self.vm, &self.actors, self.config.provisioning_gas_limit)
    }
}
