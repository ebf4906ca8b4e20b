//! Purpose: Apply the date and base64 conventions to opted-in serde fields.
//! Exports: `Timestamp`, `Binary`, `timestamp` and `binary` serde adapters, `ConventionScope`.
//! Role: Bridges the codec's per-instance date pattern into field-level (de)serialization.
//! Invariants: A scope covers exactly one decode or encode call and restores the prior state on drop.
//! Invariants: Outside any scope, decoding uses the default decode pattern and encoding the encode pattern.
//! Invariants: Binary fields are standard base64 with padding in both directions.
//! Notes: State is thread-local; serde_json (de)serializes on the calling thread.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::{Arc, LazyLock};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::core::date_pattern::DatePattern;

static DEFAULT_DECODE: LazyLock<DatePattern> = LazyLock::new(DatePattern::default_decode);
static DEFAULT_ENCODE: LazyLock<DatePattern> = LazyLock::new(DatePattern::encode);

thread_local! {
    static ACTIVE_DATES: RefCell<Option<Arc<DatePattern>>> = const { RefCell::new(None) };
}

/// Installs a date pattern for the current thread until dropped.
pub(crate) struct ConventionScope {
    previous: Option<Arc<DatePattern>>,
    _not_send: PhantomData<*const ()>,
}

impl ConventionScope {
    pub(crate) fn enter(dates: Arc<DatePattern>) -> Self {
        let previous = ACTIVE_DATES.with(|active| active.borrow_mut().replace(dates));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ConventionScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_DATES.with(|active| *active.borrow_mut() = previous);
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Decode,
    Encode,
}

fn with_dates<R>(direction: Direction, f: impl FnOnce(&DatePattern) -> R) -> R {
    let active = ACTIVE_DATES.with(|active| active.borrow().clone());
    match (active, direction) {
        (Some(pattern), _) => f(&*pattern),
        (None, Direction::Decode) => f(&*DEFAULT_DECODE),
        (None, Direction::Encode) => f(&*DEFAULT_ENCODE),
    }
}

fn format_date<S: Serializer>(value: OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = with_dates(Direction::Encode, |pattern| pattern.format(value))
        .map_err(|err| {
            <S::Error as serde::ser::Error>::custom(err.message().unwrap_or("date format failed"))
        })?;
    serializer.serialize_str(&text)
}

struct DateVisitor;

impl Visitor<'_> for DateVisitor {
    type Value = OffsetDateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        with_dates(Direction::Decode, |pattern| pattern.parse(text))
            .map_err(|err| E::custom(err.message().unwrap_or("invalid date")))
    }
}

struct Base64Visitor;

impl Visitor<'_> for Base64Visitor {
    type Value = Vec<u8>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a base64 string")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        STANDARD
            .decode(text)
            .map_err(|err| E::custom(format!("invalid base64 data: {err}")))
    }
}

/// A date field encoded with the active date convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub OffsetDateTime);

impl Timestamp {
    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for OffsetDateTime {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        format_date(self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DateVisitor).map(Self)
    }
}

/// A binary field encoded as base64 text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Binary {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Binary {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(Base64Visitor).map(Self)
    }
}

/// `#[serde(with = "jsonbundle::api::timestamp")]` for `OffsetDateTime` fields.
pub mod timestamp {
    use serde::{Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        super::format_date(*value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        deserializer.deserialize_str(super::DateVisitor)
    }

    /// Same convention for `Option<OffsetDateTime>`; `null` maps to `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};
        use time::OffsetDateTime;

        use crate::core::convention::Timestamp;

        pub fn serialize<S: Serializer>(
            value: &Option<OffsetDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(Timestamp).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            Ok(Option::<Timestamp>::deserialize(deserializer)?.map(Timestamp::into_inner))
        }
    }
}

/// `#[serde(with = "jsonbundle::api::binary")]` for `Vec<u8>` fields.
pub mod binary {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        deserializer.deserialize_str(super::Base64Visitor)
    }
}
