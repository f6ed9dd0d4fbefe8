use std::collections::HashMap;
use std::path::Path;

use super::errors::TokenError;

// ---------------------------------------------------------------------------
// LoginState — the [login] section of dl.conf
// ---------------------------------------------------------------------------

/// Login state recorded by the Data Lab client in `dl.conf`:
///
/// ```text
/// [login]
/// status = loggedin
/// user = alice
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub status: Option<String>,
    pub user: Option<String>,
}

impl LoginState {
    pub const STATUS_LOGGED_IN: &'static str = "loggedin";

    /// Read and parse `dl.conf`.
    pub fn load(path: &Path) -> Result<LoginState, TokenError> {
        let content = std::fs::read_to_string(path).map_err(|source| TokenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|(line, message)| TokenError::Config {
            path: path.to_path_buf(),
            line,
            message,
        })
    }

    /// Parse `dl.conf` content. Errors carry the 1-based line number.
    pub fn parse(content: &str) -> Result<LoginState, (usize, String)> {
        let ini = parse_ini(content)?;
        let login = match ini.get("login") {
            Some(section) => section,
            None => return Ok(LoginState::default()),
        };
        let value = |key: &str| login.get(key).cloned().flatten();
        Ok(LoginState {
            status: value("status"),
            user: value("user"),
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.status.as_deref() == Some(Self::STATUS_LOGGED_IN)
    }

    /// The logged-in user, when the status says so and a user is recorded.
    pub fn logged_in_user(&self) -> Option<&str> {
        if !self.is_logged_in() {
            return None;
        }
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}

// ---------------------------------------------------------------------------
// INI parsing
// ---------------------------------------------------------------------------

type Section = HashMap<String, Option<String>>;

/// Minimal INI reader: `[section]` headers, `key = value` or `key: value`
/// pairs (keys lower-cased), bare keys with no value, full-line `#`/`;`
/// comments, and indented continuation lines. A bare key has no value to
/// continue, so an indented line after one is read as an entry of its own.
fn parse_ini(content: &str) -> Result<HashMap<String, Section>, (usize, String)> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Continuation of the previous value
        if raw_line.starts_with(char::is_whitespace) {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                if let Some(Some(value)) = sections.get_mut(section).and_then(|s| s.get_mut(key)) {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if trimmed.starts_with('[') {
            if !trimmed.ends_with(']') {
                return Err((lineno, format!("malformed section header: {}", trimmed)));
            }
            let name = trimmed[1..trimmed.len() - 1].trim().to_string();
            if sections.contains_key(&name) {
                return Err((lineno, format!("duplicate section '{}'", name)));
            }
            sections.insert(name.clone(), Section::new());
            current = Some(name);
            last_key = None;
            continue;
        }

        let section = match &current {
            Some(s) => s,
            None => return Err((lineno, "entry before any section header".into())),
        };

        let (key, value) = match trimmed.find(['=', ':']) {
            Some(pos) => (
                trimmed[..pos].trim().to_lowercase(),
                Some(trimmed[pos + 1..].trim().to_string()),
            ),
            None => (trimmed.to_lowercase(), None),
        };
        if key.is_empty() {
            return Err((lineno, "empty key".into()));
        }

        let entries = sections.entry(section.clone()).or_default();
        if entries.contains_key(&key) {
            return Err((lineno, format!("duplicate option '{}' in section '{}'", key, section)));
        }
        entries.insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(sections)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
