//! Auth token resolution.
//!
//! A Data Lab call needs a token. When the caller does not pass one, the
//! resolver looks in the Data Lab state directory (`~/.datalab` by default):
//!
//! 1. A value with at least four dot-separated segments is already a token
//!    and is returned unchanged.
//! 2. A single bare segment is a user name: `id_token.<user>` is read.
//! 3. Nothing at all: `dl.conf` names the logged-in user, if any; without
//!    `dl.conf` the current OS user's token file is tried.
//!
//! Every path that finds no token ends at [`ANON_TOKEN`], including a
//! process with no known home directory.

pub mod errors;
pub mod login;

pub use errors::TokenError;
pub use login::LoginState;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::os_user;
use crate::settings::Settings;

/// Token used when no user token can be found.
pub const ANON_TOKEN: &str = "anonymous.0.0.anon_access";
/// Login-state file inside the Data Lab directory.
pub const CONFIG_FILE: &str = "dl.conf";
/// Prefix of per-user token files (`id_token.<user>`).
pub const TOKEN_FILE_PREFIX: &str = "id_token.";
/// Bytes read from a token file unless configured otherwise.
pub const DEFAULT_READ_LIMIT: usize = 128;


/// True if `s` has the shape of a token (at least four dot-separated
/// segments).
pub fn looks_like_token(s: &str) -> bool {
    s.split('.').count() >= 4
}

/// Read a token file: its first `limit` bytes with surrounding newlines
/// stripped, or [`ANON_TOKEN`] if the file does not exist.
pub fn read_token_file(path: &Path, limit: usize) -> Result<String, TokenError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "token file missing, using anonymous token");
        return Ok(ANON_TOKEN.to_string());
    }

    let io_err = |source| TokenError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf).map_err(io_err)?;

    let token = String::from_utf8_lossy(&buf)
        .trim_matches(|c: char| c == '\n' || c == '\r')
        .to_string();
    tracing::debug!(path = %path.display(), "read user token");
    Ok(token)
}

/// Resolve a token using the default Data Lab directory and the current OS
/// user, with default settings.
pub fn def_token(tok: Option<&str>) -> Result<String, TokenError> {
    TokenResolver::from_env(&Settings::default()).resolve(tok)
}


// ---------------------------------------------------------------------------
// TokenResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TokenResolver {
    dir: Option<PathBuf>,
    os_user: Option<String>,
    read_limit: usize,
}

impl TokenResolver {
    /// A resolver over `dir` with no OS-user fallback.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TokenResolver {
            dir: Some(dir.into()),
            os_user: None,
            read_limit: DEFAULT_READ_LIMIT,
        }
    }

    /// A resolver over the configured Data Lab directory, falling back to
    /// the login name of the current process.
    pub fn from_env(settings: &Settings) -> Self {
        TokenResolver {
            dir: settings.datalab_dir(),
            os_user: os_user::login_name(),
            read_limit: settings.token_read_limit,
        }
    }

    /// Replace the Data Lab directory. `None` makes every lookup anonymous.
    pub fn with_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dir = dir;
        self
    }

    pub fn with_os_user(mut self, user: Option<String>) -> Self {
        self.os_user = user;
        self
    }

    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit;
        self
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn os_user(&self) -> Option<&str> {
        self.os_user.as_deref()
    }

    /// Path of the token file for `user`, if the directory is known.
    pub fn token_file_path(&self, user: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}{}", TOKEN_FILE_PREFIX, user)))
    }

    /// Resolve `tok` (a token, a user name, or nothing) to a token string.
    pub fn resolve(&self, tok: Option<&str>) -> Result<String, TokenError> {
        let tok = match tok {
            Some(t) if !t.is_empty() => t,
            _ => return self.resolve_default(),
        };

        if looks_like_token(tok) {
            tracing::debug!("input is already a token");
            return Ok(tok.to_string());
        }

        if !tok.contains('.') {
            return self.read_user_token(tok);
        }

        tracing::debug!(input = tok, "neither token nor user name, using anonymous token");
        Ok(ANON_TOKEN.to_string())
    }

    fn resolve_default(&self) -> Result<String, TokenError> {
        let dir = match &self.dir {
            Some(dir) => dir,
            None => {
                tracing::debug!("no Data Lab directory known, using anonymous token");
                return Ok(ANON_TOKEN.to_string());
            }
        };
        let conf = dir.join(CONFIG_FILE);
        if conf.exists() {
            let state = LoginState::load(&conf)?;
            return match state.logged_in_user() {
                Some(user) => {
                    tracing::debug!(user, "using logged-in user");
                    self.read_user_token(user)
                }
                None => {
                    if state.is_logged_in() {
                        tracing::warn!(path = %conf.display(), "status is loggedin but no user is recorded");
                    } else {
                        tracing::debug!("nobody logged in, using anonymous token");
                    }
                    Ok(ANON_TOKEN.to_string())
                }
            };
        }

        let user = match self.os_user.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => {
                tracing::debug!("no current user, using anonymous token");
                return Ok(ANON_TOKEN.to_string());
            }
        };
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "no Data Lab directory, using anonymous token");
            return Ok(ANON_TOKEN.to_string());
        }
        self.read_user_token(user)
    }

    fn read_user_token(&self, user: &str) -> Result<String, TokenError> {
        if user.contains(['/', '\\']) || user == ".." {
            tracing::warn!(user, "user name contains a path separator, using anonymous token");
            return Ok(ANON_TOKEN.to_string());
        }
        match self.token_file_path(user) {
            Some(path) => read_token_file(&path, self.read_limit),
            None => {
                tracing::debug!(user, "no Data Lab directory known, using anonymous token");
                Ok(ANON_TOKEN.to_string())
            }
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn resolver(dir: &Path) -> TokenResolver {
        TokenResolver::new(dir)
    }

    #[test]
    fn nothing_configured_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resolver(tmp.path()).with_os_user(Some("nobody".into()));
        assert_eq!(r.resolve(None).unwrap(), "anonymous.0.0.anon_access");
        assert_eq!(r.resolve(Some("")).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn missing_directory_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resolver(&tmp.path().join("absent")).with_os_user(Some("alice".into()));
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn unknown_os_user_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token."), "x.y.z.w").unwrap();
        let r = resolver(tmp.path()).with_os_user(None);
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn four_segments_returned_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("a.b.c.d")).unwrap(), "a.b.c.d");
        assert_eq!(r.resolve(Some("a.b.c.d.e")).unwrap(), "a.b.c.d.e");
    }

    #[test]
    fn two_or_three_segments_are_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token.a.b"), "a.1.2.h").unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("a.b")).unwrap(), ANON_TOKEN);
        assert_eq!(r.resolve(Some("a.b.c")).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn user_name_reads_token_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token.alice"), "alice.100.100.$1$abc\n").unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("alice")).unwrap(), "alice.100.100.$1$abc");
    }

    #[test]
    fn user_without_token_file_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("bob")).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn path_like_user_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("../etc/passwd")).unwrap(), ANON_TOKEN);
        assert_eq!(r.resolve(Some("sub/dir")).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn logged_in_user_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[login]\nstatus = loggedin\nuser = carol\n",
        )
        .unwrap();
        fs::write(tmp.path().join("id_token.carol"), "carol.1.1.tok").unwrap();
        fs::write(tmp.path().join("id_token.dave"), "dave.2.2.tok").unwrap();

        let r = resolver(tmp.path()).with_os_user(Some("dave".into()));
        assert_eq!(r.resolve(None).unwrap(), "carol.1.1.tok");
    }

    #[test]
    fn logged_out_config_is_anonymous_even_with_os_token() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[login]\nstatus = loggedout\nuser = carol\n",
        )
        .unwrap();
        fs::write(tmp.path().join("id_token.dave"), "dave.2.2.tok").unwrap();

        let r = resolver(tmp.path()).with_os_user(Some("dave".into()));
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn logged_in_user_without_token_file_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[login]\nstatus = loggedin\nuser = erin\n",
        )
        .unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn config_without_login_section_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[other]\nkey = value\n").unwrap();
        let r = resolver(tmp.path());
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "status = loggedin\n").unwrap();
        let r = resolver(tmp.path());
        assert!(matches!(r.resolve(None), Err(TokenError::Config { .. })));
    }

    #[test]
    fn os_user_token_used_without_config() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token.frank"), "\nfrank.3.3.tok\n\n").unwrap();
        let r = resolver(tmp.path()).with_os_user(Some("frank".into()));
        assert_eq!(r.resolve(None).unwrap(), "frank.3.3.tok");
    }

    #[test]
    fn token_file_truncated_to_read_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let long = "x".repeat(300);
        fs::write(tmp.path().join("id_token.gina"), &long).unwrap();

        let r = resolver(tmp.path());
        assert_eq!(r.resolve(Some("gina")).unwrap().len(), 128);

        let r = r.with_read_limit(10);
        assert_eq!(r.resolve(Some("gina")).unwrap(), "x".repeat(10));
    }

    #[test]
    fn unreadable_token_path_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory exists at the path but cannot be read as a file.
        fs::create_dir(tmp.path().join("id_token.henry")).unwrap();
        let r = resolver(tmp.path());
        match r.resolve(Some("henry")) {
            Err(TokenError::Io { path, .. }) => assert!(path.ends_with("id_token.henry")),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }

    #[test]
    fn looks_like_token_counts_segments() {
        assert!(looks_like_token("a.b.c.d"));
        assert!(looks_like_token("...."));
        assert!(!looks_like_token("a.b.c"));
        assert!(!looks_like_token("alice"));
    }

    #[test]
    fn token_file_path_layout() {
        let r = TokenResolver::new("/home/u/.datalab");
        assert_eq!(
            r.token_file_path("alice"),
            Some(PathBuf::from("/home/u/.datalab/id_token.alice"))
        );
        assert_eq!(r.with_dir(None).token_file_path("alice"), None);
    }

    #[test]
    fn unknown_directory_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token.alice"), "alice.1.1.tok").unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[login]\nstatus = loggedin\nuser = alice\n",
        )
        .unwrap();

        let r = resolver(tmp.path())
            .with_dir(None)
            .with_os_user(Some("alice".into()));
        assert_eq!(r.dir(), None);
        assert_eq!(r.resolve(Some("alice")).unwrap(), ANON_TOKEN);
        assert_eq!(r.resolve(None).unwrap(), ANON_TOKEN);
        assert_eq!(r.resolve(Some("a.b.c.d")).unwrap(), "a.b.c.d");
    }

    #[test]
    fn from_env_uses_configured_dir_and_limit() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("id_token.ivan"), "ivan.4.4.tokentail").unwrap();
        let settings = Settings {
            datalab_dir: Some(tmp.path().to_string_lossy().into_owned()),
            token_read_limit: 12,
            ..Settings::default()
        };

        let r = TokenResolver::from_env(&settings);
        assert_eq!(r.dir(), Some(tmp.path()));
        assert_eq!(r.resolve(Some("ivan")).unwrap(), "ivan.4.4.tok");
    }

    #[test]
    fn def_token_passes_tokens_through() {
        assert_eq!(def_token(Some("x.1.2.sig")).unwrap(), "x.1.2.sig");
        assert_eq!(def_token(Some("a.b")).unwrap(), ANON_TOKEN);
    }
}
