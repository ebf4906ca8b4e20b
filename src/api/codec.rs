//! Purpose: Typed JSON codec over named resources with fixed date and base64 conventions.
//! Exports: `Codec`.
//! Role: Public entrypoint; composes resource fetch, convention scoping, and the JSON boundary.
//! Invariants: Every operation returns `Result`; nothing here terminates the process.
//! Invariants: Decode uses the configurable decode pattern; encode always uses `ENCODE_PATTERN`.
//! Invariants: The decode/encode pattern asymmetry is intentional and covered by tests.
//! Invariants: `load_async` resolves exactly once, after fetch and decode have both finished.
#![allow(clippy::result_large_err)]

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::resource::{RawResource, ResourceName, ResourceProvider};
use crate::core::convention::ConventionScope;
use crate::core::date_pattern::{DatePattern, ENCODE_PATTERN};
use crate::core::error::{Error, ErrorKind};
use crate::json::{emit, parse};

#[derive(Clone)]
pub struct Codec {
    provider: Arc<dyn ResourceProvider>,
    decode_dates: Arc<DatePattern>,
    encode_dates: Arc<DatePattern>,
}

impl Codec {
    pub fn new(provider: impl ResourceProvider + 'static) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    pub fn from_shared(provider: Arc<dyn ResourceProvider>) -> Self {
        Self {
            provider,
            decode_dates: Arc::new(DatePattern::default_decode()),
            encode_dates: Arc::new(DatePattern::encode()),
        }
    }

    pub fn with_date_format(mut self, pattern: &str) -> Result<Self, Error> {
        self.set_date_format(pattern)?;
        Ok(self)
    }

    /// Replaces the decode pattern. Rejected patterns leave the current one in place.
    pub fn set_date_format(&mut self, pattern: &str) -> Result<(), Error> {
        self.decode_dates = Arc::new(DatePattern::compile(pattern)?);
        Ok(())
    }

    pub fn date_format(&self) -> &str {
        self.decode_dates.as_str()
    }

    pub fn encode_date_format(&self) -> &str {
        ENCODE_PATTERN
    }

    pub fn provider(&self) -> &dyn ResourceProvider {
        self.provider.as_ref()
    }

    pub fn fetch(&self, name: &str) -> Result<RawResource, Error> {
        let name = ResourceName::parse(name)?;
        let raw = self.provider.fetch(&name)?;
        tracing::debug!(
            resource = %name,
            bytes = raw.len(),
            mapped = raw.is_mapped(),
            "fetched resource"
        );
        Ok(raw)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        let _scope = ConventionScope::enter(Arc::clone(&self.decode_dates));
        tracing::debug!(bytes = bytes.len(), date_format = self.date_format(), "decoding");
        parse::from_slice(bytes).map_err(parse::decode_error)
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T, pretty: bool) -> Result<Vec<u8>, Error> {
        let _scope = ConventionScope::enter(Arc::clone(&self.encode_dates));
        let out = emit::to_vec(value, pretty)?;
        tracing::debug!(bytes = out.len(), pretty, "encoded");
        Ok(out)
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        let raw = self.fetch(name)?;
        self.decode(raw.as_bytes()).map_err(|err| {
            tracing::warn!(resource = raw.name(), error = %err, "bundled resource failed to decode");
            err.with_resource(raw.name())
        })
    }

    /// Runs `load` on the tokio blocking pool. Must be awaited inside a tokio runtime.
    pub async fn load_async<T>(&self, name: impl Into<String>) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let codec = self.clone();
        let name = name.into();
        tokio::task::spawn_blocking(move || codec.load::<T>(&name))
            .await
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("resource load task did not complete")
                    .with_source(err)
            })?
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("date_format", &self.date_format())
            .field("encode_date_format", &self.encode_date_format())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Codec;
    use crate::api::{Binary, MemoryProvider, Timestamp};
    use crate::core::date_pattern::{DEFAULT_DECODE_PATTERN, ENCODE_PATTERN};
    use crate::core::error::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Stamp {
        at: Timestamp,
        blob: Binary,
    }

    fn codec() -> Codec {
        Codec::new(MemoryProvider::new())
    }

    #[test]
    fn defaults_keep_asymmetric_patterns() {
        let codec = codec();
        assert_eq!(codec.date_format(), DEFAULT_DECODE_PATTERN);
        assert_eq!(codec.encode_date_format(), ENCODE_PATTERN);
    }

    #[test]
    fn rejected_pattern_keeps_previous() {
        let mut codec = codec().with_date_format("yyyy/MM/dd").expect("pattern");
        let err = codec.set_date_format("QQQ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(codec.date_format(), "yyyy/MM/dd");
    }

    #[test]
    fn bad_base64_is_a_data_decode_error() {
        let err = codec()
            .decode::<Stamp>(br#"{"at":"2020-01-01T00:00:00Z","blob":"%%%"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.category(), Some(crate::core::error::DecodeCategory::Data));
        assert!(err.message().unwrap().contains("base64"));
    }

    #[test]
    fn clones_carry_their_own_pattern() {
        let base = codec();
        let custom = base.clone().with_date_format("dd.MM.yyyy").expect("pattern");
        let input = br#"{"at":"01.02.2021","blob":""}"#;
        assert!(custom.decode::<Stamp>(input).is_ok());
        assert!(base.decode::<Stamp>(input).is_err());
    }
}
