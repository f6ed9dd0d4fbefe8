//! `multipart/form-data` body encoding for file uploads.
//!
//! ```text
//! --BOUNDARY
//! Content-Disposition: form-data; name="FIELD"
//!
//! VALUE
//! --BOUNDARY
//! Content-Disposition: form-data; name="FILE"; filename="F.TXT"
//! Content-Type: text/plain
//!
//! CONTENT
//! --BOUNDARY--
//! ```
//!
//! Lines are joined with CRLF and the body ends with a trailing CRLF.

pub mod errors;
pub mod mime;

pub use errors::MultipartError;

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::settings::Settings;

const CRLF: &[u8] = b"\r\n";

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";


// ---------------------------------------------------------------------------
// Form contents
// ---------------------------------------------------------------------------

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub content: Vec<u8>,
    /// Explicit MIME type; guessed from `filename` when absent.
    pub mimetype: Option<String>,
}

impl FilePart {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        FilePart {
            filename: filename.into(),
            content: content.into(),
            mimetype: None,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }
}

/// Form fields and files, encoded in insertion order (fields first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, FilePart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.files.push((name.into(), part));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[(String, FilePart)] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Encode with default settings.
    pub fn encode(&self, boundary: Option<&str>) -> Result<EncodedForm, MultipartError> {
        encode_multipart(self, boundary)
    }
}


// ---------------------------------------------------------------------------
// Encoded output
// ---------------------------------------------------------------------------

/// An encoded body plus the headers a request needs to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedForm {
    pub body: Vec<u8>,
    pub boundary: String,
    /// `Content-Type` and `Content-Length`.
    pub headers: BTreeMap<String, String>,
}

impl EncodedForm {
    pub fn content_type(&self) -> &str {
        self.headers.get(CONTENT_TYPE).map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}


// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encoding options: generated boundary length and the fallback MIME type.
#[derive(Debug, Clone)]
pub struct MultipartEncoder {
    boundary_length: usize,
    default_mimetype: String,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl MultipartEncoder {
    pub fn from_settings(settings: &Settings) -> Self {
        MultipartEncoder {
            boundary_length: settings.boundary_length,
            default_mimetype: settings.default_mimetype.clone(),
        }
    }

    /// Encode `form`. A `None` boundary is replaced by a random one.
    pub fn encode(&self, form: &FormData, boundary: Option<&str>) -> Result<EncodedForm, MultipartError> {
        let boundary = match boundary {
            Some(b) => {
                validate_boundary(b)?;
                b.to_string()
            }
            None => random_boundary(self.boundary_length),
        };
        let delimiter = format!("--{}", boundary);

        let mut lines: Vec<Vec<u8>> = Vec::new();
        for (name, value) in &form.fields {
            lines.push(delimiter.clone().into_bytes());
            lines.push(
                format!("Content-Disposition: form-data; name=\"{}\"", escape_quote(name)).into_bytes(),
            );
            lines.push(Vec::new());
            lines.push(value.clone().into_bytes());
        }

        for (name, part) in &form.files {
            let mimetype = match &part.mimetype {
                Some(m) => m.as_str(),
                None => mime::guess_type(&part.filename).unwrap_or(self.default_mimetype.as_str()),
            };
            lines.push(delimiter.clone().into_bytes());
            lines.push(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                    escape_quote(name),
                    escape_quote(&part.filename)
                )
                .into_bytes(),
            );
            lines.push(format!("Content-Type: {}", mimetype).into_bytes());
            lines.push(Vec::new());
            lines.push(part.content.clone());
        }

        lines.push(format!("{}--", delimiter).into_bytes());
        lines.push(Vec::new());

        let body = lines.join(CRLF);

        let mut headers = BTreeMap::new();
        headers.insert(
            CONTENT_TYPE.to_string(),
            format!("multipart/form-data; boundary={}", boundary),
        );
        headers.insert(CONTENT_LENGTH.to_string(), body.len().to_string());

        tracing::debug!(
            fields = form.fields.len(),
            files = form.files.len(),
            bytes = body.len(),
            "encoded multipart body"
        );

        Ok(EncodedForm {
            body,
            boundary,
            headers,
        })
    }
}

/// Encode `form` with default settings.
pub fn encode_multipart(form: &FormData, boundary: Option<&str>) -> Result<EncodedForm, MultipartError> {
    MultipartEncoder::default().encode(form, boundary)
}

/// A boundary of `len` characters drawn from `[0-9A-Za-z]`.
pub fn random_boundary(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    let reason = if boundary.is_empty() {
        "must not be empty"
    } else if boundary.contains(['\r', '\n']) {
        "must not contain line breaks"
    } else {
        return Ok(());
    };
    Err(MultipartError::InvalidBoundary {
        boundary: boundary.to_string(),
        reason,
    })
}

fn escape_quote(s: &str) -> String {
    s.replace('"', "\\\"")
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormData {
        FormData::new()
            .field("FIELD", "VALUE")
            .file("FILE", FilePart::new("F.TXT", "CONTENT"))
    }

    #[test]
    fn reference_body_layout() {
        let encoded = sample().encode(Some("BOUNDARY")).unwrap();
        let text = String::from_utf8(encoded.body.clone()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "--BOUNDARY",
                "Content-Disposition: form-data; name=\"FIELD\"",
                "",
                "VALUE",
                "--BOUNDARY",
                "Content-Disposition: form-data; name=\"FILE\"; filename=\"F.TXT\"",
                "Content-Type: text/plain",
                "",
                "CONTENT",
                "--BOUNDARY--",
                "",
            ]
        );
        assert_eq!(encoded.body.len(), 193);
    }

    #[test]
    fn reference_headers() {
        let encoded = sample().encode(Some("BOUNDARY")).unwrap();
        let headers: Vec<(&str, &str)> = encoded
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            headers,
            vec![
                ("Content-Length", "193"),
                ("Content-Type", "multipart/form-data; boundary=BOUNDARY"),
            ]
        );
        assert_eq!(encoded.content_type(), "multipart/form-data; boundary=BOUNDARY");
        assert_eq!(encoded.content_length(), 193);
    }

    #[test]
    fn empty_form_is_just_terminator() {
        let encoded = FormData::new().encode(Some("B")).unwrap();
        assert_eq!(encoded.body, b"--B--\r\n".to_vec());
        assert_eq!(encoded.headers[CONTENT_LENGTH], "7");
    }

    #[test]
    fn explicit_mimetype_wins() {
        let form = FormData::new().file(
            "data",
            FilePart::new("table.csv", "a,b\n1,2\n").with_mimetype("application/x-votable+xml"),
        );
        let text = String::from_utf8(form.encode(Some("X")).unwrap().body).unwrap();
        assert!(text.contains("Content-Type: application/x-votable+xml\r\n"));
        assert!(!text.contains("text/csv"));
    }

    #[test]
    fn unknown_extension_uses_default_mimetype() {
        let form = FormData::new().file("img", FilePart::new("image.fits", vec![0u8, 1, 2]));
        let text = String::from_utf8_lossy(&form.encode(Some("X")).unwrap().body).into_owned();
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));

        let settings = Settings {
            default_mimetype: "application/fits".into(),
            ..Settings::default()
        };
        let encoded = MultipartEncoder::from_settings(&settings)
            .encode(&form, Some("X"))
            .unwrap();
        let text = String::from_utf8_lossy(&encoded.body).into_owned();
        assert!(text.contains("Content-Type: application/fits\r\n"));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let form = FormData::new()
            .field("say \"hi\"", "v")
            .file("f", FilePart::new("a\"b.txt", "x"));
        let text = String::from_utf8(form.encode(Some("X")).unwrap().body).unwrap();
        assert!(text.contains("name=\"say \\\"hi\\\"\""));
        assert!(text.contains("filename=\"a\\\"b.txt\""));
    }

    #[test]
    fn binary_content_and_byte_length() {
        let payload = vec![0u8, 0xff, b'\r', b'\n', 0x80];
        let form = FormData::new()
            .field("name", "héllo")
            .file("blob", FilePart::new("blob.bin", payload.clone()));
        let encoded = form.encode(Some("Z")).unwrap();

        assert!(encoded
            .body
            .windows(payload.len())
            .any(|w| w == payload.as_slice()));
        assert_eq!(
            encoded.headers[CONTENT_LENGTH],
            encoded.body.len().to_string()
        );
    }

    #[test]
    fn insertion_order_preserved() {
        let form = FormData::new().field("b", "2").field("a", "1").field("c", "3");
        let text = String::from_utf8(form.encode(Some("X")).unwrap().body).unwrap();
        let b = text.find("name=\"b\"").unwrap();
        let a = text.find("name=\"a\"").unwrap();
        let c = text.find("name=\"c\"").unwrap();
        assert!(b < a && a < c);
    }

    #[test]
    fn generated_boundary_is_alphanumeric() {
        let encoded = sample().encode(None).unwrap();
        assert_eq!(encoded.boundary.len(), 30);
        assert!(encoded.boundary.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(
            encoded.content_type(),
            format!("multipart/form-data; boundary={}", encoded.boundary)
        );
        assert!(encoded.body.starts_with(format!("--{}\r\n", encoded.boundary).as_bytes()));

        let short = MultipartEncoder::from_settings(&Settings {
            boundary_length: 8,
            ..Settings::default()
        });
        assert_eq!(short.encode(&sample(), None).unwrap().boundary.len(), 8);
    }

    #[test]
    fn invalid_boundary_rejected() {
        assert!(matches!(
            sample().encode(Some("")),
            Err(MultipartError::InvalidBoundary { .. })
        ));
        let err = sample().encode(Some("a\r\nb")).unwrap_err();
        assert_eq!(
            err,
            MultipartError::InvalidBoundary {
                boundary: "a\r\nb".into(),
                reason: "must not contain line breaks",
            }
        );
    }
}
