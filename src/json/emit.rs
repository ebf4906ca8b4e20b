//! Purpose: Serialize values to compact or indented JSON bytes.
//! Exports: `to_vec`.
//! Role: Encode half of the JSON boundary; maps serde_json failures to `ErrorKind::Encode`.
//! Invariants: Pretty output uses two-space indentation and parses to the same value as compact output.

use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

pub(crate) fn to_vec<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>, Error> {
    let result = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    result.map_err(|err| {
        Error::new(ErrorKind::Encode)
            .with_message(format!("failed to encode JSON: {err}"))
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::to_vec;
    use crate::core::error::ErrorKind;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn pretty_output_is_indented() {
        let value = json!({"a": [1, 2]});
        let text = String::from_utf8(to_vec(&value, true).expect("pretty")).expect("utf8");
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
        let compact = String::from_utf8(to_vec(&value, false).expect("compact")).expect("utf8");
        assert_eq!(compact, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = to_vec(&map, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }
}
