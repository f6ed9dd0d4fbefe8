use super::key::RegistrationKey;

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Errors raised while registering or dispatching overloads.
///
/// Both `DuplicateRegistration` and `NoMatchingOverload` describe a static
/// call-shape mismatch: nothing about them is transient, so callers should
/// surface them rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// An overload already exists for the exact (namespace, name, arity) key.
    #[error("duplicate registration: {key}")]
    DuplicateRegistration {
        /// The key that was registered twice.
        key: RegistrationKey,
    },

    /// No overload accepts the number of positional arguments supplied.
    #[error("no overload matches {key}{}", describe_available(.available))]
    NoMatchingOverload {
        /// The key computed from the call.
        key: RegistrationKey,
        /// Arities registered under the same method name, ascending.
        available: Vec<usize>,
    },

    /// An overload built for one namespace was handed to a dispatcher of
    /// another.
    #[error("overload for namespace '{found}' registered on {key}")]
    NamespaceMismatch {
        key: RegistrationKey,
        found: String,
    },

    /// Registration was attempted with an empty namespace.
    #[error("namespace must not be empty")]
    EmptyNamespace,

    /// Registration was attempted with an empty method name.
    #[error("method name must not be empty (namespace '{namespace}')")]
    EmptyMethodName {
        namespace: String,
    },
}

fn describe_available(available: &[usize]) -> String {
    if available.is_empty() {
        return " (no overloads registered)".into();
    }
    let list: Vec<String> = available.iter().map(|a| a.to_string()).collect();
    format!(" (registered arities: {})", list.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_full_key() {
        let err = DispatchError::DuplicateRegistration {
            key: RegistrationKey::new("shapes", "area", 2),
        };
        assert_eq!(err.to_string(), "duplicate registration: shapes.area.2");
    }

    #[test]
    fn no_match_message_lists_arities() {
        let err = DispatchError::NoMatchingOverload {
            key: RegistrationKey::new("shapes", "area", 3),
            available: vec![1, 2],
        };
        assert_eq!(
            err.to_string(),
            "no overload matches shapes.area.3 (registered arities: 1, 2)"
        );
    }

    #[test]
    fn no_match_message_without_dispatcher() {
        let err = DispatchError::NoMatchingOverload {
            key: RegistrationKey::new("shapes", "volume", 0),
            available: Vec::new(),
        };
        assert!(err.to_string().ends_with("(no overloads registered)"));
    }

    #[test]
    fn namespace_mismatch_message() {
        let err = DispatchError::NamespaceMismatch {
            key: RegistrationKey::new("shapes", "area", 1),
            found: "solids".into(),
        };
        assert_eq!(
            err.to_string(),
            "overload for namespace 'solids' registered on shapes.area.1"
        );
    }
}
