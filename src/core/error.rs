//! Purpose: Structured error model shared by the codec, resource providers, and CLI.
//! Exports: `Error`, `ErrorKind`, `DecodeCategory`, `to_exit_code`.
//! Role: Single error type; context is attached through builder methods at each layer.
//! Invariants: Library code returns errors; only the binary maps them to process exit.
//! Invariants: Exit code mapping is stable once published.
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    Permission,
    Io,
    Decode,
    Encode,
}

/// Coarse classification of a JSON decode failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeCategory {
    /// Input is not well-formed JSON.
    Syntax,
    /// Well-formed JSON that does not fit the target shape (types, dates, base64).
    Data,
    /// Input ended before the document was complete.
    Eof,
    Io,
}

impl DecodeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeCategory::Syntax => "syntax",
            DecodeCategory::Data => "data",
            DecodeCategory::Eof => "eof",
            DecodeCategory::Io => "io",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    resource: Option<String>,
    path: Option<PathBuf>,
    category: Option<DecodeCategory>,
    position: Option<(usize, usize)>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            resource: None,
            path: None,
            category: None,
            position: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn category(&self) -> Option<DecodeCategory> {
        self.category
    }

    /// One-based `(line, column)` of a decode failure, when the parser reported one.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_category(mut self, category: DecodeCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        if line > 0 {
            self.position = Some((line, column));
        }
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " (resource: {resource})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(category) = self.category {
            write!(f, " (category: {})", category.as_str())?;
        }
        if let Some((line, column)) = self.position {
            write!(f, " (line {line}, column {column})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Permission => 4,
        ErrorKind::Io => 5,
        ErrorKind::Decode => 6,
        ErrorKind::Encode => 7,
    }
}

pub(crate) fn map_io_error_kind(err: &std::io::Error) -> ErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        std::io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeCategory, Error, ErrorKind, to_exit_code};
    use std::error::Error as _;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::Permission, 4),
            (ErrorKind::Io, 5),
            (ErrorKind::Decode, 6),
            (ErrorKind::Encode, 7),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_attached_context() {
        let err = Error::new(ErrorKind::Decode)
            .with_message("expected value")
            .with_resource("catalog")
            .with_category(DecodeCategory::Syntax)
            .with_position(1, 2);
        assert_eq!(
            err.to_string(),
            "Decode: expected value (resource: catalog) (category: syntax) (line 1, column 2)"
        );
    }

    #[test]
    fn zero_line_position_is_dropped() {
        let err = Error::new(ErrorKind::Encode).with_position(0, 0);
        assert_eq!(err.position(), None);
    }

    #[test]
    fn source_chain_is_exposed() {
        let io = std::io::Error::other("disk gone");
        let err = Error::new(ErrorKind::Io).with_source(io);
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "disk gone");
    }
}
