//! Purpose: Execute parsed CLI commands against a directory-backed codec.
//! Exports: `dispatch_command`.
//! Role: Thin glue between clap types and `api::Codec`; owns stdout payload shapes.
//! Invariants: Each command builds exactly one codec from `--dir` and `--date-format`.
//! Invariants: Errors propagate to `main` unchanged apart from attached context.
#![allow(clippy::result_large_err)]

use std::io::{self, Write};
use std::path::PathBuf;

use jsonbundle::api::{Codec, DirProvider, Error, ErrorKind, Timestamp};
use serde_json::{Value, json};

use crate::{Command, emit_json};

pub(crate) fn dispatch_command(
    command: Command,
    dir: PathBuf,
    date_format: &str,
) -> Result<(), Error> {
    let codec = Codec::new(DirProvider::new(dir)).with_date_format(date_format)?;

    match command {
        Command::List => {
            let names = codec.provider().names()?;
            emit_json(json!(names));
        }
        Command::Cat { name } => {
            let raw = codec.fetch(&name)?;
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(raw.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| write_error(err).with_resource(raw.name()))?;
        }
        Command::Check { name } => {
            let raw = codec.fetch(&name)?;
            codec
                .decode::<Value>(raw.as_bytes())
                .map_err(|err| err.with_resource(raw.name()))?;
            emit_json(json!({
                "resource": raw.name(),
                "ok": true,
                "bytes": raw.len(),
            }));
        }
        Command::Fmt { name, pretty } => {
            let value: Value = codec.load(&name)?;
            let out = codec.encode(&value, pretty)?;
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&out)
                .and_then(|()| stdout.write_all(b"\n"))
                .and_then(|()| stdout.flush())
                .map_err(write_error)?;
        }
        Command::Date { text } => {
            let quoted = serde_json::to_vec(&text).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to quote date input")
                    .with_source(err)
            })?;
            let stamp: Timestamp = codec.decode(&quoted)?;
            let encoded: String = serde_json::from_slice(&codec.encode(&stamp, false)?).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("encoded date is not a JSON string")
                    .with_source(err)
            })?;
            emit_json(json!({
                "input": text,
                "decode_format": codec.date_format(),
                "encode_format": codec.encode_date_format(),
                "encoded": encoded,
                "unix_seconds": stamp.0.unix_timestamp(),
            }));
        }
    }
    Ok(())
}

fn write_error(err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write to stdout")
        .with_source(err)
}
