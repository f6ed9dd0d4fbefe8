use std::fmt;

/// Composite identity of one overload: namespace, method name, and the
/// number of positional arguments it takes (receiver excluded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationKey {
    pub namespace: String,
    pub name: String,
    pub arity: usize,
}

impl RegistrationKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, arity: usize) -> Self {
        RegistrationKey {
            namespace: namespace.into(),
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.name, self.arity)
    }
}
