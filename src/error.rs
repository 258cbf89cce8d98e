use std::fmt;

/// Error raised while converting SVG into IconVG
#[derive(Debug)]
pub enum Error {
    /// IO error propagated while reading input file
    InputRead(std::io::Error),
    /// Document is not a well formed SVG document
    MarkupParse(String),
    /// Element which can not be converted
    UnsupportedElement(String),
    /// No drawable elements left after exclusion
    EmptyDrawing,
    /// Failed to parse path data (`d` attribute)
    MalformedPathData {
        reason: String,
        /// byte offset of the offending token
        offset: usize,
        /// input text starting at the offending token
        fragment: String,
    },
    /// Failed to parse converter options
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputRead(error) => write!(f, "failed to read input: {error}"),
            Error::MarkupParse(reason) => write!(f, "malformed SVG document: {reason}"),
            Error::UnsupportedElement(name) => write!(f, "unsupported SVG element: <{name}>"),
            Error::EmptyDrawing => write!(f, "no path or shape found in the SVG document"),
            Error::MalformedPathData {
                reason,
                offset,
                fragment,
            } => write!(
                f,
                "malformed path data at offset {offset}: {reason} (near {fragment:?})"
            ),
            #[cfg(feature = "serde")]
            Error::Json(error) => write!(f, "malformed converter options: {error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InputRead(error) => Some(error),
            #[cfg(feature = "serde")]
            Error::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::InputRead(error)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(error: roxmltree::Error) -> Self {
        Self::MarkupParse(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::InputRead(error) => error,
            _ => Self::new(std::io::ErrorKind::InvalidData, error),
        }
    }
}
