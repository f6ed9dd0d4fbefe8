use std::fmt;

use serde_json::{Map, Value};

/// Keyword arguments forwarded untouched to the selected overload.
pub type Kwargs = Map<String, Value>;

type Callable<R, O> = dyn Fn(&mut R, &[Value], &Kwargs) -> O + Send + Sync;

/// One registered implementation of a method, owned by its dispatcher for
/// the lifetime of the registry.
pub struct Overload<R, O = Value> {
    namespace: String,
    arity: usize,
    callable: Box<Callable<R, O>>,
}

impl<R, O> Overload<R, O> {
    pub fn new<F>(namespace: impl Into<String>, arity: usize, callable: F) -> Self
    where
        F: Fn(&mut R, &[Value], &Kwargs) -> O + Send + Sync + 'static,
    {
        Overload {
            namespace: namespace.into(),
            arity,
            callable: Box::new(callable),
        }
    }

    /// Namespace the overload was registered from.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of positional arguments this overload takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Call the implementation bound to `receiver`. The output is returned
    /// exactly as the callable produced it.
    pub fn invoke(&self, receiver: &mut R, args: &[Value], kwargs: &Kwargs) -> O {
        (self.callable)(receiver, args, kwargs)
    }
}

impl<R, O> fmt::Debug for Overload<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("namespace", &self.namespace)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoke_passes_receiver_args_and_kwargs() {
        let overload: Overload<Vec<String>, usize> =
            Overload::new("ns", 2, |log: &mut Vec<String>, args: &[Value], kw: &Kwargs| {
                log.push(format!("{} {}", args[0], args[1]));
                log.len() + kw.len()
            });

        let mut log = Vec::new();
        let mut kw = Kwargs::new();
        kw.insert("verbose".into(), json!(true));

        let out = overload.invoke(&mut log, &[json!("a"), json!(1)], &kw);
        assert_eq!(out, 2);
        assert_eq!(log, vec!["\"a\" 1".to_string()]);
        assert_eq!(overload.arity(), 2);
        assert_eq!(overload.namespace(), "ns");
    }

    #[test]
    fn debug_omits_callable() {
        let overload: Overload<(), Value> = Overload::new("ns", 0, |_: &mut (), _: &[Value], _: &Kwargs| Value::Null);
        let text = format!("{:?}", overload);
        assert!(text.contains("arity: 0"));
        assert!(text.contains(".."));
    }
}
