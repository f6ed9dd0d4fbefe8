//! Command — the typed interface for every `dlutil` operation.
//!
//! Commands are serialized as JSON objects with a `"command"` discriminant:
//!
//! ```json
//! {"command": "token", "input": "alice"}
//! {"command": "multipart", "fields": [{"name": "FIELD", "value": "VALUE"}], "boundary": "B"}
//! {"command": "help"}
//! ```

use serde::{Deserialize, Serialize};


/// A typed `dlutil` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    /// Resolve an auth token from a token, a user name, or nothing.
    #[serde(rename = "token")]
    Token {
        /// Token or user name. Omitted: logged-in user, then OS user.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<String>,
    },

    /// Encode form fields and files as a multipart/form-data body.
    #[serde(rename = "multipart")]
    Multipart {
        #[serde(default)]
        fields: Vec<FieldArg>,
        #[serde(default)]
        files: Vec<FileArg>,
        /// Boundary to use; random when omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        boundary: Option<String>,
        /// What to print: "body" (default), "headers", or "json".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },

    /// Show usage, optionally for one topic.
    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}


/// A `name=value` form field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldArg {
    pub name: String,
    pub value: String,
}

/// A `name=path[;type=mime]` file part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileArg {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}
