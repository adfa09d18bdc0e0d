// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The virtual machine collaborator of the processor.
//!
//! The processor only talks to the VM through [`Vm::send`]. [`DefaultVm`] is a
//! small reference implementation that transfers value, meters gas and
//! dispatches to the builtin actors named by an [`ActorRegistry`].

pub mod builtin;
mod default_vm;
mod registry;

pub use default_vm::{DefaultVm, MAX_CALL_DEPTH, Runtime};
pub use registry::{ActorRegistry, BuiltinActor};

use crate::blocks::Tipset;
use crate::interpreter::{GasTracker, OutOfGas};
use crate::message::Message;
use crate::shim::{ActorID, address::Address, clock::ChainEpoch, error::ExitCode};
use crate::state_tree::{ActorState, CachedTree, StateTree};
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use thiserror::Error;

/// Everything a single VM invocation may read or mutate.
pub struct InvocationContext<'a, S, BS> {
    /// Resolved sender. Queries and internal calls run as the system actor.
    pub from: ActorID,
    /// Sender actor as loaded before validation. Present only for on-chain
    /// messages.
    pub from_actor: Option<ActorState>,
    pub to: ActorState,
    /// ID address of `to`.
    pub to_addr: Address,
    pub message: &'a Message,
    pub state: &'a mut CachedTree<S>,
    pub store: &'a BS,
    pub gas_tracker: &'a mut GasTracker,
    pub epoch: Option<ChainEpoch>,
    /// Ancestry of the block being applied, most recent first.
    pub ancestors: &'a [Tipset],
    pub actors: &'a ActorRegistry,
}

impl<S, BS> InvocationContext<'_, S, BS> {
    /// `true` for messages included in a block, as opposed to queries and
    /// internal calls.
    pub fn is_on_chain(&self) -> bool {
        self.from_actor.is_some()
    }

    pub fn to_id(&self) -> anyhow::Result<ActorID> {
        Ok(self.to_addr.id()?)
    }
}

/// Outcome of an invocation that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutput {
    pub return_data: Vec<RawBytes>,
    pub exit_code: ExitCode,
    /// Set whenever `exit_code` is not successful.
    pub error: Option<ActorError>,
}

impl InvocationOutput {
    pub fn ok(return_data: RawBytes) -> Self {
        Self {
            return_data: if return_data.bytes().is_empty() {
                Vec::new()
            } else {
                vec![return_data]
            },
            exit_code: ExitCode::OK,
            error: None,
        }
    }

    pub fn failed(error: ActorError) -> Self {
        Self {
            return_data: Vec::new(),
            exit_code: error.exit_code(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code.is_success()
    }
}

/// Executes messages against actors.
pub trait Vm {
    /// Invokes `ctx.message` on the receiver in `ctx`.
    ///
    /// `Err` is reserved for faults, i.e. storage failures or broken
    /// invariants. Failures of the invoked actor are reported through
    /// [`InvocationOutput::exit_code`].
    fn send<S, BS>(&self, ctx: &mut InvocationContext<'_, S, BS>) -> anyhow::Result<InvocationOutput>
    where
        S: StateTree,
        BS: Blockstore;
}

impl<V: Vm + ?Sized> Vm for &V {
    fn send<S, BS>(&self, ctx: &mut InvocationContext<'_, S, BS>) -> anyhow::Result<InvocationOutput>
    where
        S: StateTree,
        BS: Blockstore,
    {
        (**self).send(ctx)
    }
}

/// The error type returned by actor method calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ActorError(exit_code: {exit_code}, msg: {msg})")]
pub struct ActorError {
    /// The exit code for this invocation.
    exit_code: ExitCode,
    /// Message for debugging purposes.
    msg: String,
}

impl ActorError {
    pub fn new(exit_code: ExitCode, msg: impl Into<String>) -> Self {
        Self {
            exit_code,
            msg: msg.into(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Prefixes the error message with a string.
    pub fn wrap(mut self, msg: impl AsRef<str>) -> Self {
        self.msg = format!("{}: {}", msg.as_ref(), self.msg);
        self
    }
}

/// Error raised while executing inside the VM.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The invoked actor failed. The invocation is reverted and the exit code
    /// lands in the receipt.
    #[error(transparent)]
    Actor(#[from] ActorError),
    /// The VM cannot continue. Surfaces as a fault.
    #[error("fatal error: {0:#}")]
    Fatal(anyhow::Error),
}

impl From<OutOfGas> for ExecutionError {
    fn from(e: OutOfGas) -> Self {
        Self::Actor(ActorError::new(ExitCode::SYS_OUT_OF_GAS, e.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Converts foreign errors into [`ExecutionError`]s.
pub trait ClassifyResult: Sized {
    type Value;

    /// Treats the error as a fault of the VM itself.
    fn or_fatal(self) -> Result<Self::Value>;

    /// Treats the error as a failure of the invoked actor.
    fn or_error(self, code: ExitCode) -> Result<Self::Value>;
}

impl<T, E> ClassifyResult for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    type Value = T;

    fn or_fatal(self) -> Result<T> {
        self.map_err(|e| ExecutionError::Fatal(e.into()))
    }

    fn or_error(self, code: ExitCode) -> Result<T> {
        self.map_err(|e| ExecutionError::Actor(ActorError::new(code, format!("{:#}", e.into()))))
    }
}
