use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::dispatcher::Dispatcher;
use super::errors::DispatchError;
use super::key::RegistrationKey;
use super::overload::{Kwargs, Overload};

// ---------------------------------------------------------------------------
// DispatchRegistry — namespace -> method name -> dispatcher
// ---------------------------------------------------------------------------

/// Owns every registered overload, grouped by namespace and method name.
///
/// The registry is populated once (registration takes `&mut self`) and then
/// only read (dispatch takes `&self`), so a fully loaded registry can be
/// shared behind an `Arc` without further locking.
pub struct DispatchRegistry<R, O = Value> {
    namespaces: HashMap<String, HashMap<String, Dispatcher<R, O>>>,
}

impl<R, O> DispatchRegistry<R, O> {
    /// Create an empty registry.
    pub fn new() -> Self {
        DispatchRegistry {
            namespaces: HashMap::new(),
        }
    }

    /// Return the dispatcher for `name` within `namespace`, creating an
    /// empty one if this is the first time the name is seen.
    pub fn get_or_create_dispatcher(&mut self, namespace: &str, name: &str) -> &mut Dispatcher<R, O> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| Dispatcher::new(namespace, name))
    }

    /// Register `callable` as the overload of `namespace.name` taking
    /// `arity` positional arguments.
    pub fn register_overload<F>(
        &mut self,
        namespace: &str,
        name: &str,
        arity: usize,
        callable: F,
    ) -> Result<(), DispatchError>
    where
        F: Fn(&mut R, &[Value], &Kwargs) -> O + Send + Sync + 'static,
    {
        if namespace.is_empty() {
            return Err(DispatchError::EmptyNamespace);
        }
        if name.is_empty() {
            return Err(DispatchError::EmptyMethodName {
                namespace: namespace.to_string(),
            });
        }
        self.get_or_create_dispatcher(namespace, name)
            .register(Overload::new(namespace, arity, callable))
    }

    /// A builder that registers overloads under `namespace`.
    pub fn registrar<'r>(&'r mut self, namespace: &str) -> Registrar<'r, R, O> {
        Registrar {
            registry: self,
            namespace: namespace.to_string(),
        }
    }

    /// Look up the dispatcher for `namespace.name`, if any overload exists.
    pub fn dispatcher(&self, namespace: &str, name: &str) -> Option<&Dispatcher<R, O>> {
        self.namespaces.get(namespace)?.get(name)
    }

    /// Call `namespace.name` on `receiver`, selecting the overload by the
    /// number of positional arguments.
    pub fn dispatch(
        &self,
        namespace: &str,
        name: &str,
        receiver: &mut R,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<O, DispatchError> {
        match self.dispatcher(namespace, name) {
            Some(d) => d.dispatch(receiver, args, kwargs),
            None => {
                tracing::debug!(namespace, name, arity = args.len(), "no dispatcher for method");
                Err(DispatchError::NoMatchingOverload {
                    key: RegistrationKey::new(namespace, name, args.len()),
                    available: Vec::new(),
                })
            }
        }
    }

    /// Namespaces with at least one dispatcher, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.namespaces.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Method names registered under `namespace`, sorted.
    pub fn methods(&self, namespace: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .namespaces
            .get(namespace)
            .map(|m| m.keys().map(|s| s.as_str()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Total number of overloads across all namespaces.
    pub fn len(&self) -> usize {
        self.namespaces
            .values()
            .flat_map(|m| m.values())
            .map(|d| d.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration, returning the registry to its initial state.
    pub fn reset(&mut self) {
        self.namespaces.clear();
    }
}

impl<R: Overloaded<O>, O> DispatchRegistry<R, O> {
    /// Register all overloads `R` declares, under `R::NAMESPACE`.
    ///
    /// Installing the same type twice fails with `DuplicateRegistration` on
    /// its first overload.
    pub fn install(&mut self) -> Result<(), DispatchError> {
        let mut registrar = self.registrar(R::NAMESPACE);
        R::register_overloads(&mut registrar)
    }
}

impl<R, O> Default for DispatchRegistry<R, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, O> fmt::Debug for DispatchRegistry<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registrar — explicit per-namespace registration
// ---------------------------------------------------------------------------

/// Registers overloads into a registry under one fixed namespace.
///
/// ```ignore
/// registry
///     .registrar("shapes")
///     .overload("area", 1, circle_area)?
///     .overload("area", 2, rect_area)?;
/// ```
pub struct Registrar<'r, R, O = Value> {
    registry: &'r mut DispatchRegistry<R, O>,
    namespace: String,
}

impl<'r, R, O> Registrar<'r, R, O> {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Register one overload of `name` taking `arity` positional arguments.
    pub fn overload<F>(&mut self, name: &str, arity: usize, callable: F) -> Result<&mut Self, DispatchError>
    where
        F: Fn(&mut R, &[Value], &Kwargs) -> O + Send + Sync + 'static,
    {
        self.registry
            .register_overload(&self.namespace, name, arity, callable)?;
        Ok(self)
    }
}

/// A receiver type that exposes arity-overloaded methods.
///
/// Implementors list their overloads once in `register_overloads`; the
/// registry calls it from `DispatchRegistry::install`.
pub trait Overloaded<O = Value>: Sized {
    /// Namespace the overloads are registered under.
    const NAMESPACE: &'static str;

    fn register_overloads(registrar: &mut Registrar<'_, Self, O>) -> Result<(), DispatchError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
