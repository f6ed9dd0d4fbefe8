use crate::command::{Command, FieldArg, FileArg};


/// Parse CLI arguments into a typed Command enum.
///
/// Arguments are expected WITHOUT the program name (i.e., `args` should
/// be `["token", "alice"]`, not `["dlutil", "token", "alice"]`).
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'dlutil help' for usage.".into());
    }

    match args[0] {
        "token" => parse_token(args),
        "multipart" => parse_multipart(args),
        "help" | "--help" | "-h" => parse_help(args),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `dlutil token [<user-or-token>]`
fn parse_token(args: &[&str]) -> Result<Command, String> {
    match args.len() {
        1 => Ok(Command::Token { input: None }),
        2 => Ok(Command::Token {
            input: Some(args[1].into()),
        }),
        _ => Err("Usage: dlutil token [<user-or-token>]".into()),
    }
}

/// `dlutil help [topic]`
fn parse_help(args: &[&str]) -> Result<Command, String> {
    let topic = if args.len() > 1 {
        Some(args[1..].join(" "))
    } else {
        None
    };
    Ok(Command::Help { topic })
}

/// `dlutil multipart [--field n=v]... [--file n=path[;type=mime]]... [--boundary B] [--headers|--json]`
fn parse_multipart(args: &[&str]) -> Result<Command, String> {
    let mut fields = Vec::new();
    let mut files = Vec::new();
    let mut boundary = None;
    let mut output: Option<String> = None;

    let rest = &args[1..];
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--field" => {
                i += 1;
                fields.push(parse_field(&take_arg(rest, i, "--field")?)?);
            }
            "--file" => {
                i += 1;
                files.push(parse_file(&take_arg(rest, i, "--file")?)?);
            }
            "--boundary" => {
                i += 1;
                boundary = Some(take_arg(rest, i, "--boundary")?);
            }
            "--headers" | "--json" => {
                let mode = rest[i].trim_start_matches("--").to_string();
                if let Some(prev) = &output {
                    if *prev != mode {
                        return Err("--headers and --json are mutually exclusive".into());
                    }
                }
                output = Some(mode);
            }
            other => return Err(format!("Unknown flag for multipart: '{}'", other)),
        }
        i += 1;
    }

    Ok(Command::Multipart {
        fields,
        files,
        boundary,
        output,
    })
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `name=value`; the value may itself contain `=`.
fn parse_field(spec: &str) -> Result<FieldArg, String> {
    match spec.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(FieldArg {
            name: name.into(),
            value: value.into(),
        }),
        _ => Err(format!("--field expects name=value, got '{}'", spec)),
    }
}

/// `name=path` or `name=path;type=mime`.
fn parse_file(spec: &str) -> Result<FileArg, String> {
    let (name, rest) = match spec.split_once('=') {
        Some((name, rest)) if !name.is_empty() && !rest.is_empty() => (name, rest),
        _ => return Err(format!("--file expects name=path[;type=mime], got '{}'", spec)),
    };
    let (path, mimetype) = match rest.rsplit_once(";type=") {
        Some((path, mime)) if !mime.is_empty() => (path, Some(mime.to_string())),
        Some(_) => return Err(format!("--file has an empty type in '{}'", spec)),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(format!("--file has an empty path in '{}'", spec));
    }
    Ok(FileArg {
        name: name.into(),
        path: path.into(),
        mimetype,
    })
}

fn take_arg(args: &[&str], index: usize, flag: &str) -> Result<String, String> {
    if index >= args.len() {
        return Err(format!("{} requires a value", flag));
    }
    Ok(args[index].into())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
