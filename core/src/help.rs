//! Help system — usage text for the `dlutil` commands.
//!
//! 1. **Overview** (`dlutil help`) — lists all commands
//! 2. **Command help** (`dlutil help token`) — detailed usage for one command


/// Generate help text for a given topic.
///
/// - `None` → overview of all commands
/// - `Some("token")` → detailed help for `token`
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => command_help(t).unwrap_or_else(|| {
            format!("Unknown help topic: '{}'. Run 'dlutil help' for a list of commands.", t)
        }),
    }
}


fn overview() -> String {
    "\
dlutil — Data Lab client utilities

Usage: dlutil <command> [args...]

Commands:
  token [<user-or-token>]     Resolve the auth token to send with a request
  multipart [flags]           Encode fields and files as multipart/form-data
  help [topic]                Show help (this message, or help on a command)

Environment:
  DATALAB_DIR                 Data Lab state directory (default ~/.datalab)
  DLUTIL_CONFIG               Settings file (default <DATALAB_DIR>/dlutil.yaml)
  RUST_LOG                    Log filter, e.g. RUST_LOG=dlutil_core=debug
"
    .into()
}


fn command_help(topic: &str) -> Option<String> {
    let text = match topic {
        "token" => "\
dlutil token [<user-or-token>]

Print the auth token for a Data Lab request.

  <token>     A value with four or more dot-separated parts is printed as is.
  <user>      A bare user name: reads <DATALAB_DIR>/id_token.<user>.
  (nothing)   Uses the logged-in user from <DATALAB_DIR>/dl.conf, or the
              current OS user when dl.conf is absent.

Falls back to the anonymous token when no token file is found.
",
        "multipart" => "\
dlutil multipart [--field name=value]... [--file name=path[;type=mime]]...
                 [--boundary B] [--headers | --json]

Encode a multipart/form-data body and write it to stdout.

  --field name=value          Add a form field (repeatable)
  --file name=path            Add a file part read from path (repeatable);
                              append ;type=mime to set its Content-Type
  --boundary B                Use B as the boundary (default: random)
  --headers                   Print the request headers instead of the body
  --json                      Print headers and body as a JSON object
                              (the body must be UTF-8 text)
",
        "help" => "\
dlutil help [topic]

Show the command overview, or detailed help for one command.
",
        _ => return None,
    };
    Some(text.to_string())
}
