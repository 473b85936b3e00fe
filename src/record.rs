// SPDX-License-Identifier: MIT
// Record payloads and on-disk line framing

use crate::severity::Severity;
use serde_json::Value;
use std::io::Write;

/// What a producer hands to the logger.
///
/// `Text` and `Bytes` become one plain record body; `Fields` becomes a JSON
/// object in structured mode and `key=value` pairs otherwise.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Fields(&'a [(&'a str, Value)]),
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(value: &'a str) -> Self {
        Payload::Text(value)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(value: &'a String) -> Self {
        Payload::Text(value)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(value: &'a [u8]) -> Self {
        Payload::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Payload::Bytes(value)
    }
}

impl<'a> From<&'a [(&'a str, Value)]> for Payload<'a> {
    fn from(value: &'a [(&'a str, Value)]) -> Self {
        Payload::Fields(value)
    }
}

/// Fast-path work item: severity plus a borrowed body, framed by the writer.
pub(crate) struct Event {
    pub severity: Severity,
    pub body: EventBody,
}

pub(crate) enum EventBody {
    Text(&'static str),
    Bytes(&'static [u8]),
}

impl EventBody {
    #[inline]
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            EventBody::Text(s) => s.as_bytes(),
            EventBody::Bytes(b) => b,
        }
    }
}

/// Strip trailing newlines so every frame ends with exactly one.
fn trim_newlines(body: &[u8]) -> &[u8] {
    let mut end = body.len();
    while end > 0 && body[end - 1] == b'\n' {
        end -= 1;
    }
    &body[..end]
}

/// Plain-text frame: `<ts> [<LEVEL>] <body>\n`.
pub(crate) fn frame_text(out: &mut Vec<u8>, ts: &str, severity: Severity, body: &[u8]) {
    let body = trim_newlines(body);
    out.reserve(ts.len() + severity.label().len() + body.len() + 5);
    out.extend_from_slice(ts.as_bytes());
    out.extend_from_slice(b" [");
    out.extend_from_slice(severity.label());
    out.extend_from_slice(b"] ");
    out.extend_from_slice(body);
    out.push(b'\n');
}

/// Plain-text frame with the body rendered from format arguments.
pub(crate) fn frame_args(out: &mut Vec<u8>, ts: &str, severity: Severity, args: std::fmt::Arguments<'_>) {
    out.extend_from_slice(ts.as_bytes());
    out.extend_from_slice(b" [");
    out.extend_from_slice(severity.label());
    out.extend_from_slice(b"] ");
    let _ = out.write_fmt(args);
    while out.last() == Some(&b'\n') {
        out.pop();
    }
    out.push(b'\n');
}

/// Plain-text frame for a fields payload: the body is `key=value` pairs.
pub(crate) fn frame_text_kv(
    out: &mut Vec<u8>,
    ts: &str,
    severity: Severity,
    fields: &[(&str, Value)],
) {
    out.extend_from_slice(ts.as_bytes());
    out.extend_from_slice(b" [");
    out.extend_from_slice(severity.label());
    out.extend_from_slice(b"] ");
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(key.as_bytes());
        out.push(b'=');
        match value {
            Value::String(s) => out.extend_from_slice(s.as_bytes()),
            other => {
                let _ = write!(out, "{other}");
            }
        }
    }
    out.push(b'\n');
}

/// Structured frame for a non-map body: `{"ts":…,"level":…,"msg":…}\n`.
pub(crate) fn frame_json_msg(out: &mut Vec<u8>, ts: &str, severity: Severity, body: &[u8]) {
    let start = out.len();
    if let Err(err) = try_json_msg(out, ts, severity, trim_newlines(body)) {
        out.truncate(start);
        marshal_fallback(out, ts, &err.to_string());
    }
}

/// Structured frame for a fields payload; `ts` and `level` are written first
/// and caller fields with those names are dropped.
pub(crate) fn frame_json_fields(
    out: &mut Vec<u8>,
    ts: &str,
    severity: Severity,
    fields: &[(&str, Value)],
) {
    let start = out.len();
    if let Err(err) = try_json_fields(out, ts, severity, fields) {
        out.truncate(start);
        marshal_fallback(out, ts, &err.to_string());
    }
}

fn json_header(out: &mut Vec<u8>, ts: &str, severity: Severity) -> serde_json::Result<()> {
    out.extend_from_slice(b"{\"ts\":");
    serde_json::to_writer(&mut *out, ts)?;
    out.extend_from_slice(b",\"level\":");
    serde_json::to_writer(&mut *out, severity.as_str())?;
    Ok(())
}

fn try_json_msg(
    out: &mut Vec<u8>,
    ts: &str,
    severity: Severity,
    body: &[u8],
) -> serde_json::Result<()> {
    json_header(out, ts, severity)?;
    out.extend_from_slice(b",\"msg\":");
    match std::str::from_utf8(body) {
        Ok(text) => serde_json::to_writer(&mut *out, text)?,
        Err(_) => serde_json::to_writer(&mut *out, &String::from_utf8_lossy(body))?,
    }
    out.extend_from_slice(b"}\n");
    Ok(())
}

fn try_json_fields(
    out: &mut Vec<u8>,
    ts: &str,
    severity: Severity,
    fields: &[(&str, Value)],
) -> serde_json::Result<()> {
    json_header(out, ts, severity)?;
    for (key, value) in fields {
        if *key == "ts" || *key == "level" {
            continue;
        }
        out.push(b',');
        serde_json::to_writer(&mut *out, key)?;
        out.push(b':');
        serde_json::to_writer(&mut *out, value)?;
    }
    out.extend_from_slice(b"}\n");
    Ok(())
}

/// Replacement line emitted when a structured record cannot be marshalled,
/// preserving record order instead of crashing or dropping.
fn marshal_fallback(out: &mut Vec<u8>, ts: &str, reason: &str) {
    let ts = serde_json::to_string(ts).unwrap_or_else(|_| "\"\"".to_string());
    let msg = serde_json::to_string(&format!("marshal failed: {reason}"))
        .unwrap_or_else(|_| "\"marshal failed\"".to_string());
    let _ = write!(out, "{{\"ts\":{ts},\"level\":\"CRITICAL\",\"msg\":{msg}}}");
    out.push(b'\n');
}
