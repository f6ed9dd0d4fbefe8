//! Command-line argument parsing.

pub mod parse;

pub use parse::parse_args;
