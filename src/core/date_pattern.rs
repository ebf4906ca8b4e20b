//! Purpose: Compile LDML-style date patterns (`yyyy-MM-dd'T'HH:mm:ssZ`) into `time` descriptions.
//! Exports: `DatePattern`, `DEFAULT_DECODE_PATTERN`, `ENCODE_PATTERN`.
//! Role: Date convention engine behind the codec; parse and format sides compile separately.
//! Invariants: Parsing and formatting are locale-invariant, ISO-8601 calendar, and UTC-based.
//! Invariants: Formatting always converts to UTC first, so ISO zone letters (`X`) render as `Z`.
//! Invariants: Fields absent from a pattern default to 1970-01-01, midnight, and UTC.
//! Invariants: A 12-hour field without a period (`a`) reads as AM.
//! Notes: Only the pattern letters listed in `translate_field` are supported; others are Usage errors.

use std::fmt;
use std::num::NonZeroU8;

use time::format_description::OwnedFormatItem;
use time::parsing::Parsed;
use time::{Month, OffsetDateTime, UtcOffset};

use crate::core::error::{Error, ErrorKind};

/// Pattern applied to date fields on decode unless a codec is configured otherwise.
pub const DEFAULT_DECODE_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ssZ";

/// Pattern applied to date fields on encode. Deliberately differs from the decode default.
pub const ENCODE_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ss.SSSXXXXX";

const OFFSET_HM: &str = "[offset_hour sign:mandatory][offset_minute]";
const OFFSET_H_COLON_M: &str = "[offset_hour sign:mandatory]:[offset_minute]";

#[derive(Clone)]
pub struct DatePattern {
    source: String,
    parse: OwnedFormatItem,
    format: OwnedFormatItem,
}

impl fmt::Debug for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DatePattern").field(&self.source).finish()
    }
}

impl PartialEq for DatePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for DatePattern {}

impl DatePattern {
    pub fn compile(pattern: &str) -> Result<Self, Error> {
        let translated = translate(pattern)?;
        let parse = compile_description(pattern, &translated.parse)?;
        let format = compile_description(pattern, &translated.format)?;
        Ok(Self {
            source: pattern.to_string(),
            parse,
            format,
        })
    }

    pub fn default_decode() -> Self {
        Self::compile(DEFAULT_DECODE_PATTERN).expect("default decode pattern compiles")
    }

    pub fn encode() -> Self {
        Self::compile(ENCODE_PATTERN).expect("encode pattern compiles")
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn parse(&self, text: &str) -> Result<OffsetDateTime, Error> {
        let mut parsed = Parsed::new();
        let rest = parsed
            .parse_item(text.as_bytes(), &self.parse)
            .map_err(|err| self.parse_error(text).with_source(err))?;
        if !rest.is_empty() {
            return Err(self.parse_error(text));
        }

        if parsed.year().is_none() {
            let _ = parsed.set_year(1970);
        }
        if parsed.ordinal().is_none() {
            if parsed.month().is_none() {
                let _ = parsed.set_month(Month::January);
            }
            if parsed.day().is_none() {
                let _ = parsed.set_day(NonZeroU8::MIN);
            }
        }
        if parsed.hour_24().is_none() && parsed.hour_12().is_none() {
            let _ = parsed.set_hour_24(0);
        }
        if parsed.hour_12().is_some() && parsed.hour_12_is_pm().is_none() {
            let _ = parsed.set_hour_12_is_pm(false);
        }
        if parsed.minute().is_none() {
            let _ = parsed.set_minute(0);
        }
        if parsed.second().is_none() {
            let _ = parsed.set_second(0);
        }
        if parsed.offset_hour().is_none() {
            let _ = parsed.set_offset_hour(0);
        }

        let value = OffsetDateTime::try_from(parsed)
            .map_err(|err| self.parse_error(text).with_source(err))?;
        Ok(value.to_offset(UtcOffset::UTC))
    }

    pub fn format(&self, value: OffsetDateTime) -> Result<String, Error> {
        value
            .to_offset(UtcOffset::UTC)
            .format(&self.format)
            .map_err(|err| {
                Error::new(ErrorKind::Encode)
                    .with_message(format!("date cannot be formatted as \"{}\"", self.source))
                    .with_source(err)
            })
    }

    fn parse_error(&self, text: &str) -> Error {
        Error::new(ErrorKind::Decode).with_message(format!(
            "date \"{text}\" does not match pattern \"{}\"",
            self.source
        ))
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self::default_decode()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Translated {
    parse: String,
    format: String,
}

impl Translated {
    fn push_both(&mut self, text: &str) {
        self.parse.push_str(text);
        self.format.push_str(text);
    }

    fn push_literal(&mut self, ch: char) {
        let escaped = match ch {
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            other => other.to_string(),
        };
        self.push_both(&escaped);
    }
}

fn translate(pattern: &str) -> Result<Translated, Error> {
    if pattern.is_empty() {
        return Err(pattern_error(pattern, "date pattern must not be empty"));
    }

    let mut out = Translated::default();
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push_literal('\'');
                continue;
            }
            let mut closed = false;
            while let Some(inner) = chars.next() {
                if inner == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        out.push_literal('\'');
                        continue;
                    }
                    closed = true;
                    break;
                }
                out.push_literal(inner);
            }
            if !closed {
                return Err(pattern_error(pattern, "unterminated quoted literal"));
            }
        } else if ch.is_ascii_alphabetic() {
            let mut count = 1;
            while chars.peek() == Some(&ch) {
                chars.next();
                count += 1;
            }
            translate_field(pattern, ch, count, &mut out)?;
        } else {
            out.push_literal(ch);
        }
    }
    Ok(out)
}

fn translate_field(pattern: &str, letter: char, count: usize, out: &mut Translated) -> Result<(), Error> {
    let both = match (letter, count) {
        ('y', 1) => "[year padding:none]",
        ('y', 3 | 4) => "[year]",
        ('M', 1) => "[month padding:none]",
        ('M', 2) => "[month]",
        ('M', 3) => "[month repr:short]",
        ('M', 4) => "[month repr:long]",
        ('d', 1) => "[day padding:none]",
        ('d', 2) => "[day]",
        ('E', 1..=3) => "[weekday repr:short]",
        ('E', 4) => "[weekday repr:long]",
        ('H', 1) => "[hour padding:none]",
        ('H', 2) => "[hour]",
        ('h', 1) => "[hour repr:12 padding:none]",
        ('h', 2) => "[hour repr:12]",
        ('a', 1) => "[period]",
        ('m', 1) => "[minute padding:none]",
        ('m', 2) => "[minute]",
        ('s', 1) => "[second padding:none]",
        ('s', 2) => "[second]",
        ('S', 1..=9) => {
            out.push_both(&format!("[subsecond digits:{count}]"));
            return Ok(());
        }
        ('Z', 1..=3) => {
            out.parse.push_str(
                "[first [Z] [[offset_hour sign:mandatory][optional [:]][offset_minute]]]",
            );
            out.format.push_str(OFFSET_HM);
            return Ok(());
        }
        ('Z', 5) | ('X', 5) => {
            out.parse.push_str(&format!(
                "[first [Z] [{OFFSET_H_COLON_M}[optional [:[offset_second]]]]]"
            ));
            out.format.push('Z');
            return Ok(());
        }
        ('X', 1) => {
            out.parse.push_str(
                "[first [Z] [[offset_hour sign:mandatory][optional [[offset_minute]]]]]",
            );
            out.format.push('Z');
            return Ok(());
        }
        ('X', 2 | 4) => {
            out.parse.push_str(&format!("[first [Z] [{OFFSET_HM}]]"));
            out.format.push('Z');
            return Ok(());
        }
        ('X', 3) => {
            out.parse.push_str(&format!("[first [Z] [{OFFSET_H_COLON_M}]]"));
            out.format.push('Z');
            return Ok(());
        }
        ('x', 1) => "[offset_hour sign:mandatory]",
        ('x', 2 | 4) => OFFSET_HM,
        ('x', 3 | 5) => OFFSET_H_COLON_M,
        ('y', 2) => {
            return Err(pattern_error(
                pattern,
                "two-digit years (`yy`) are ambiguous and not supported",
            ));
        }
        _ => {
            let field: String = std::iter::repeat_n(letter, count).collect();
            return Err(pattern_error(
                pattern,
                &format!("unsupported pattern field `{field}`"),
            ));
        }
    };
    out.push_both(both);
    Ok(())
}

fn compile_description(pattern: &str, description: &str) -> Result<OwnedFormatItem, Error> {
    time::format_description::parse_owned::<2>(description).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("date pattern \"{pattern}\" produced an invalid description"))
            .with_source(err)
    })
}

fn pattern_error(pattern: &str, reason: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid date pattern \"{pattern}\": {reason}"))
        .with_hint("Use LDML letters such as yyyy, MM, dd, HH, mm, ss, SSS, Z, or XXXXX; quote literal text with '.")
}
