//! Just enough MIME to pull named attachments out of a stored message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MimeError {
    #[error("Invalid base64 body for '{0}': {1}")]
    Base64Error(String, base64::DecodeError),

    #[error("Multipart message without boundary")]
    MissingBoundary,
}

/// `name=value` and `name="quoted value"` parameters of a header
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*([a-z0-9*_.-]+)\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^;\s]*))"#).expect("Hardcode regex pattern")
});

/// RFC 2047 encoded word, `=?charset?B|Q?text?=`
static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=\?([^?]+)\?([BbQq])\?([^?]*)\?=").expect("Hardcode regex pattern")
});

/// A decoded attachment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Header block of a message or body part
struct Headers(Vec<(String, String)>);

impl Headers {
    /// Parses `Name: value` lines, joining folded continuation lines
    fn parse(block: &str) -> Headers {
        let mut headers = Vec::<(String, String)>::new();
        for line in block.lines() {
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = headers.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
            } else if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
            }
        }
        Headers(headers)
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Lowercased media type of `Content-Type`, `text/plain` by default
    fn media_type(&self) -> String {
        self.get("content-type")
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "text/plain".to_owned())
    }

    /// A parameter of a header, with RFC 2231 and RFC 2047 forms decoded
    fn parameter(&self, header: &str, name: &str) -> Option<String> {
        let value = self.get(header)?;
        let mut plain = None::<String>;
        let mut extended = None::<String>;
        for captures in PARAMETER.captures_iter(value) {
            let key = captures[1].to_ascii_lowercase();
            let raw = captures
                .get(2)
                .or_else(|| captures.get(3))
                .map(|matcher| matcher.as_str().replace("\\\"", "\""))
                .unwrap_or_default();
            if key == name {
                plain = Some(decode_encoded_words(&raw));
            } else if key == format!("{name}*") {
                // charset'language'percent-encoded
                let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(&raw).to_owned();
                extended = Some(String::from_utf8_lossy(&percent_decode(&encoded)).into_owned());
            }
        }
        extended.or(plain)
    }

    /// File name of a body part, from `Content-Disposition` or the `Content-Type` name
    fn file_name(&self) -> Option<String> {
        self.parameter("content-disposition", "filename")
            .or_else(|| self.parameter("content-type", "name"))
            .filter(|name| !name.is_empty())
    }
}

/// Position of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Splits a message or part into its header block and body
fn split_headers(entity: &[u8]) -> (&[u8], &[u8]) {
    for separator in [b"\r\n\r\n".as_slice(), b"\n\n".as_slice()] {
        if let Some(index) = find(entity, separator) {
            return (&entity[..index], &entity[index + separator.len()..]);
        }
    }
    (entity, &[])
}

/// Collects every named part of a raw message, walking nested multiparts.
///
/// Bodies that are neither base64 nor quoted-printable are kept byte for byte.
pub fn attachments(raw: &[u8]) -> Result<Vec<Attachment>, MimeError> {
    let mut found = Vec::new();
    collect(raw, &mut found)?;
    Ok(found)
}

fn collect(entity: &[u8], found: &mut Vec<Attachment>) -> Result<(), MimeError> {
    let (block, body) = split_headers(entity);
    let headers = Headers::parse(&String::from_utf8_lossy(block));
    if headers.media_type().starts_with("multipart/") {
        let boundary = headers
            .parameter("content-type", "boundary")
            .ok_or(MimeError::MissingBoundary)?;
        for part in split_multipart(body, &boundary) {
            collect(part, found)?;
        }
    } else if let Some(file_name) = headers.file_name() {
        let encoding = headers
            .get("content-transfer-encoding")
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let bytes = match encoding.as_str() {
            "base64" => {
                let compact: Vec<u8> = body.iter().copied().filter(|byte| !byte.is_ascii_whitespace()).collect();
                STANDARD
                    .decode(&compact)
                    .map_err(|error| MimeError::Base64Error(file_name.to_owned(), error))?
            }
            "quoted-printable" => quoted_printable_decode(body, false),
            _ => body.to_vec(),
        };
        found.push(Attachment { file_name, bytes });
    }
    Ok(())
}

/// Body parts between `--boundary` delimiter lines, stopping at `--boundary--`
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let closing = format!("{delimiter}--");
    let mut parts = Vec::new();
    let mut start = None::<usize>;
    let mut offset = 0usize;
    for line in body.split_inclusive(|byte| *byte == b'\n') {
        let trimmed = line.trim_ascii_end();
        let is_closing = trimmed == closing.as_bytes();
        if trimmed == delimiter.as_bytes() || is_closing {
            if let Some(start) = start {
                // the line break before the delimiter belongs to the delimiter
                let part = &body[start..offset];
                let part = part.strip_suffix(b"\n").unwrap_or(part);
                parts.push(part.strip_suffix(b"\r").unwrap_or(part));
            }
            if is_closing {
                break;
            }
            start = Some(offset + line.len());
        }
        offset += line.len();
    }
    parts
}

fn percent_decode(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' && index + 2 < bytes.len() {
            let value = std::str::from_utf8(&bytes[index + 1..index + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(value) = value {
                decoded.push(value);
                index += 3;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }
    decoded
}

/// Decodes quoted-printable text; `underscore_is_space` for RFC 2047 `Q` words
fn quoted_printable_decode(bytes: &[u8], underscore_is_space: bool) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'=' if bytes[index + 1..].starts_with(b"\r\n") => index += 3,
            b'=' if bytes[index + 1..].starts_with(b"\n") => index += 2,
            b'=' if index + 2 < bytes.len() => {
                match std::str::from_utf8(&bytes[index + 1..index + 3]).ok().and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                    Some(value) => {
                        decoded.push(value);
                        index += 3;
                    }
                    None => {
                        decoded.push(b'=');
                        index += 1;
                    }
                }
            }
            b'_' if underscore_is_space => {
                decoded.push(b' ');
                index += 1;
            }
            byte => {
                decoded.push(byte);
                index += 1;
            }
        }
    }
    decoded
}

/// Replaces RFC 2047 encoded words; only UTF-8 and Latin-1 charsets are decoded as such
fn decode_encoded_words(text: &str) -> String {
    ENCODED_WORD
        .replace_all(text, |captures: &regex::Captures| {
            let bytes = match &captures[2] {
                "B" | "b" => STANDARD.decode(captures[3].as_bytes()).unwrap_or_default(),
                _ => quoted_printable_decode(captures[3].as_bytes(), true),
            };
            if captures[1].eq_ignore_ascii_case("iso-8859-1") || captures[1].eq_ignore_ascii_case("windows-1252") {
                encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes).0.into_owned()
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            }
        })
        .into_owned()
}
