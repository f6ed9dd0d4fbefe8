//! Data Lab client utilities.
//!
//! - [`dispatch`] — overloaded methods selected by positional-argument count
//! - [`token`] — auth token resolution from `~/.datalab`
//! - [`multipart`] — `multipart/form-data` body encoding
//! - [`settings`] — the `dlutil.yaml` settings file
//! - [`command`], [`cli`], [`help`] — the command surface of the `dlutil` binary

pub mod cli;
pub mod command;
pub mod dispatch;
pub mod help;
pub mod multipart;
pub mod os_user;
pub mod settings;
pub mod token;

pub use dispatch::{DispatchError, DispatchRegistry, Dispatcher, Kwargs, Overloaded, Registrar};
pub use multipart::{encode_multipart, EncodedForm, FilePart, FormData, MultipartError};
pub use settings::{Settings, SettingsError};
pub use token::{def_token, TokenError, TokenResolver, ANON_TOKEN};
