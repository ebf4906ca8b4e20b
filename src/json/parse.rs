//! Purpose: Provide the internal JSON decode entrypoint and failure categorisation.
//! Exports: `from_slice`, `categorize_error`, `hint_for_category`, `decode_error`.
//! Role: Parser boundary that centralizes serde_json usage and error mapping.
//! Invariants: Exactly one JSON document is accepted; trailing non-whitespace is a syntax error.
//! Invariants: Categories are stable labels; messages never embed payload bytes beyond serde_json's own.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::core::error::{DecodeCategory, Error, ErrorKind};

pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> DecodeCategory {
    match err.classify() {
        Category::Syntax => DecodeCategory::Syntax,
        Category::Data => DecodeCategory::Data,
        Category::Eof => DecodeCategory::Eof,
        Category::Io => DecodeCategory::Io,
    }
}

pub(crate) fn hint_for_category(category: DecodeCategory) -> &'static str {
    match category {
        DecodeCategory::Syntax => "The resource is not valid JSON; check for stray or missing punctuation.",
        DecodeCategory::Data => {
            "The JSON does not match the expected shape; check field types, date formats, and base64 payloads."
        }
        DecodeCategory::Eof => "The JSON document ends early; the resource may be truncated.",
        DecodeCategory::Io => "The input could not be read while decoding.",
    }
}

pub(crate) fn decode_error(err: serde_json::Error) -> Error {
    let category = categorize_error(&err);
    let (line, column) = (err.line(), err.column());
    Error::new(ErrorKind::Decode)
        .with_message(format!("failed to decode JSON: {err}"))
        .with_category(category)
        .with_position(line, column)
        .with_hint(hint_for_category(category))
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{categorize_error, decode_error, from_slice};
    use crate::core::error::{DecodeCategory, ErrorKind};
    use serde_json::Value;

    #[test]
    fn category_mapping_covers_syntax_eof_and_data() {
        let syntax = from_slice::<Value>(br#"{"a":}"#).unwrap_err();
        assert_eq!(categorize_error(&syntax), DecodeCategory::Syntax);

        let eof = from_slice::<Value>(br#"{"a":1"#).unwrap_err();
        assert_eq!(categorize_error(&eof), DecodeCategory::Eof);

        let data = from_slice::<u8>(b"300").unwrap_err();
        assert_eq!(categorize_error(&data), DecodeCategory::Data);
    }

    #[test]
    fn trailing_content_is_rejected() {
        let err = from_slice::<Value>(b"{} {}").unwrap_err();
        assert_eq!(categorize_error(&err), DecodeCategory::Syntax);
    }

    #[test]
    fn decode_error_carries_position_and_hint() {
        let err = decode_error(from_slice::<Value>(b"{\n  \"a\": nope\n}").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.category(), Some(DecodeCategory::Syntax));
        assert_eq!(err.position().map(|(line, _)| line), Some(2));
        assert!(err.hint().unwrap().contains("not valid JSON"));
    }
}
