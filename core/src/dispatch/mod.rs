//! Arity-based method dispatch.
//!
//! A type can expose several methods sharing one name that differ only in how
//! many positional arguments they take. Each overload is registered once,
//! explicitly, under `(namespace, name, arity)`; a call is routed by counting
//! its positional arguments. Argument types and keyword arguments are never
//! consulted, and there is no loose matching: a call whose argument count has
//! no overload fails with [`DispatchError::NoMatchingOverload`].
//!
//! ```ignore
//! let mut registry: DispatchRegistry<Shape> = DispatchRegistry::new();
//! registry
//!     .registrar("shapes.Shape")
//!     .overload("area", 1, |_, args, _| circle(&args[0]))?
//!     .overload("area", 2, |_, args, _| rect(&args[0], &args[1]))?;
//!
//! let a = registry.dispatch("shapes.Shape", "area", &mut shape, &[r], &Kwargs::new())?;
//! ```

pub mod dispatcher;
pub mod errors;
pub mod key;
pub mod overload;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use errors::DispatchError;
pub use key::RegistrationKey;
pub use overload::{Kwargs, Overload};
pub use registry::{DispatchRegistry, Overloaded, Registrar};
