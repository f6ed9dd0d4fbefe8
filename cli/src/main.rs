//! dlutil — the command-line entry point for the Data Lab client utilities.
//!
//! # Usage
//!
//! ```text
//! dlutil token
//! dlutil token alice
//! dlutil multipart --field FIELD=VALUE --file FILE=./F.TXT --boundary BOUNDARY
//! dlutil multipart --file upload=table.csv --headers
//! ```

use std::io::Write;
use std::path::Path;
use std::process;

use dlutil_core::cli::parse_args;
use dlutil_core::command::{Command, FieldArg, FileArg};
use dlutil_core::help::help_text;
use dlutil_core::multipart::{EncodedForm, FilePart, FormData, MultipartEncoder};
use dlutil_core::settings::{self, Settings};
use dlutil_core::token::TokenResolver;
use tracing_subscriber::EnvFilter;


fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let cmd = match parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("dlutil: {}", e);
            process::exit(1);
        }
    };

    let settings = match settings::settings_path() {
        Some(path) => match settings::load(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("dlutil: {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    match execute(cmd, &settings) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&output).and_then(|_| stdout.flush()) {
                eprintln!("dlutil: cannot write output: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("dlutil: {}", e);
            process::exit(1);
        }
    }
}


/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}


/// Run a parsed command and return the bytes to print.
fn execute(cmd: Command, settings: &Settings) -> Result<Vec<u8>, String> {
    match cmd {
        Command::Token { input } => {
            let token = TokenResolver::from_env(settings)
                .resolve(input.as_deref())
                .map_err(|e| e.to_string())?;
            Ok(format!("{}\n", token).into_bytes())
        }
        Command::Multipart {
            fields,
            files,
            boundary,
            output,
        } => {
            let form = build_form(&fields, &files)?;
            let encoded = MultipartEncoder::from_settings(settings)
                .encode(&form, boundary.as_deref())
                .map_err(|e| e.to_string())?;
            render(&encoded, output.as_deref())
        }
        Command::Help { topic } => Ok(help_text(topic.as_deref()).into_bytes()),
    }
}


fn build_form(fields: &[FieldArg], files: &[FileArg]) -> Result<FormData, String> {
    let mut form = FormData::new();
    for f in fields {
        form = form.field(f.name.as_str(), f.value.as_str());
    }
    for f in files {
        let path = Path::new(&f.path);
        let content = std::fs::read(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| f.path.clone());
        let mut part = FilePart::new(filename, content);
        if let Some(mime) = &f.mimetype {
            part = part.with_mimetype(mime.as_str());
        }
        form = form.file(f.name.as_str(), part);
    }
    Ok(form)
}


fn render(encoded: &EncodedForm, output: Option<&str>) -> Result<Vec<u8>, String> {
    match output {
        None | Some("body") => Ok(encoded.body.clone()),
        Some("headers") => {
            let mut text = String::new();
            for (name, value) in &encoded.headers {
                text.push_str(&format!("{}: {}\n", name, value));
            }
            Ok(text.into_bytes())
        }
        Some("json") => {
            let body = std::str::from_utf8(&encoded.body).map_err(|_| {
                "--json needs a UTF-8 body; drop --json to write binary file parts".to_string()
            })?;
            let doc = serde_json::json!({
                "headers": encoded.headers,
                "body": body,
            });
            let mut text = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
            text.push('\n');
            Ok(text.into_bytes())
        }
        Some(other) => Err(format!("unknown output mode '{}'", other)),
    }
}
