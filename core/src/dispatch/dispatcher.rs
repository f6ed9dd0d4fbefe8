use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::errors::DispatchError;
use super::key::RegistrationKey;
use super::overload::{Kwargs, Overload};

// ---------------------------------------------------------------------------
// Dispatcher — routes a call to the overload matching its arity
// ---------------------------------------------------------------------------

/// All overloads of one method name within one namespace.
///
/// The dispatcher holds no per-call state: `dispatch` counts the positional
/// arguments, picks the overload registered for that count and invokes it.
/// Argument types and keyword arguments never take part in the choice.
pub struct Dispatcher<R, O = Value> {
    namespace: String,
    name: String,
    methods: BTreeMap<usize, Overload<R, O>>,
}

impl<R, O> Dispatcher<R, O> {
    /// Create a dispatcher with no overloads.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Dispatcher {
            namespace: namespace.into(),
            name: name.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an overload under its arity. Rejects a second overload with the
    /// same arity, and an overload built for a different namespace.
    pub fn register(&mut self, overload: Overload<R, O>) -> Result<(), DispatchError> {
        let key = self.key(overload.arity());
        if overload.namespace() != self.namespace {
            return Err(DispatchError::NamespaceMismatch {
                key,
                found: overload.namespace().to_string(),
            });
        }
        match self.methods.entry(overload.arity()) {
            Entry::Occupied(_) => Err(DispatchError::DuplicateRegistration { key }),
            Entry::Vacant(slot) => {
                tracing::debug!(key = %key, "registered overload");
                slot.insert(overload);
                Ok(())
            }
        }
    }

    /// Find the overload for `arity` without calling it.
    pub fn resolve(&self, arity: usize) -> Result<&Overload<R, O>, DispatchError> {
        self.methods
            .get(&arity)
            .ok_or_else(|| DispatchError::NoMatchingOverload {
                key: self.key(arity),
                available: self.arities(),
            })
    }

    /// Route a call by positional-argument count and return the overload's
    /// output unchanged.
    pub fn dispatch(
        &self,
        receiver: &mut R,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<O, DispatchError> {
        let overload = match self.resolve(args.len()) {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!(error = %e, "dispatch failed");
                return Err(e);
            }
        };
        Ok(overload.invoke(receiver, args, kwargs))
    }

    /// Registered arities in ascending order.
    pub fn arities(&self) -> Vec<usize> {
        self.methods.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn key(&self, arity: usize) -> RegistrationKey {
        RegistrationKey::new(self.namespace.as_str(), self.name.as_str(), arity)
    }
}

impl<R, O> fmt::Debug for Dispatcher<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("arities", &self.arities())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
