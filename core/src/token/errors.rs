use std::path::PathBuf;

/// Failures while resolving a token. A token that simply does not exist is
/// never an error; it resolves to the anonymous token instead.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// A token or config file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `dl.conf` is not a valid INI document.
    #[error("{}:{line}: {message}", .path.display())]
    Config {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
