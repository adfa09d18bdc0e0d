// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::utils::cid::CidCborExt as _;
use ahash::HashMap;
use cid::Cid;
use strum::IntoEnumIterator as _;

/// Behaviours the reference VM knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinActor {
    System,
    Init,
    Account,
    Reward,
}

impl BuiltinActor {
    /// Canonical code identifier of the behaviour: a `raw` CID over
    /// `fil/1/<name>`.
    pub fn code(self) -> Cid {
        Cid::from_raw_blake2b256(format!("fil/1/{self}").as_bytes())
    }
}

/// Maps actor code identifiers to builtin behaviours.
///
/// The registry is an explicit value handed to every processor and VM call.
/// Codes missing from it cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRegistry {
    actors: HashMap<Cid, BuiltinActor>,
}

impl Default for ActorRegistry {
    /// Registry with every builtin actor under its canonical code.
    fn default() -> Self {
        Self::new(BuiltinActor::iter().map(|actor| (actor.code(), actor)))
    }
}

impl ActorRegistry {
    pub fn new(actors: impl IntoIterator<Item = (Cid, BuiltinActor)>) -> Self {
        Self {
            actors: actors.into_iter().collect(),
        }
    }

    /// Registry without any code. Useful to build custom registries.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn with(mut self, code: Cid, actor: BuiltinActor) -> Self {
        self.actors.insert(code, actor);
        self
    }

    pub fn get(&self, code: &Cid) -> Option<BuiltinActor> {
        self.actors.get(code).copied()
    }

    /// Code registered for `actor`. Picks the canonical code when a behaviour
    /// is registered under several codes.
    pub fn code_of(&self, actor: BuiltinActor) -> Option<Cid> {
        let canonical = actor.code();
        if self.get(&canonical) == Some(actor) {
            return Some(canonical);
        }
        self.actors
            .iter()
            .filter(|(_, a)| **a == actor)
            .map(|(code, _)| *code)
            .min()
    }

    pub fn is_account(&self, code: &Cid) -> bool {
        self.get(code) == Some(BuiltinActor::Account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_builtins() {
        let registry = ActorRegistry::default();
        for actor in BuiltinActor::iter() {
            assert_eq!(registry.get(&actor.code()), Some(actor));
            assert_eq!(registry.code_of(actor), Some(actor.code()));
        }
        assert!(registry.is_account(&BuiltinActor::Account.code()));
        assert!(!registry.is_account(&BuiltinActor::Init.code()));
    }

    #[test]
    fn codes_are_distinct() {
        let codes: ahash::HashSet<_> = BuiltinActor::iter().map(BuiltinActor::code).collect();
        assert_eq!(codes.len(), BuiltinActor::iter().count());
    }

    #[test]
    fn custom_registry() {
        let code = Cid::from_raw_blake2b256(b"custom/account");
        let registry = ActorRegistry::empty().with(code, BuiltinActor::Account);
        assert!(registry.is_account(&code));
        assert_eq!(registry.get(&BuiltinActor::Account.code()), None);
        assert_eq!(registry.code_of(BuiltinActor::Account), Some(code));
        assert_eq!(registry.code_of(BuiltinActor::Init), None);
    }
}
