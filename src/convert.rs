//! SVG to IconVG conversion pipeline
use crate::{Drawing, Element, Encoder, Error, Exclusions, Rgba, Scalar};
use std::path::Path;

/// Default size of the icon in the IconVG coordinate space
pub const DEFAULT_OUTPUT_SIZE: Scalar = 48.0;

/// Conversion options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConvertOptions {
    /// Size of the icon, the view box is scaled to fit `output_size x output_size`
    pub output_size: Scalar,
    /// Elements dropped before encoding
    pub exclusions: Exclusions,
    /// Color stored as the first entry of the suggested palette
    pub foreground: Rgba,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            exclusions: Exclusions::default(),
            foreground: Rgba::BLACK,
        }
    }
}

impl ConvertOptions {
    pub fn with_output_size(self, output_size: Scalar) -> Self {
        Self {
            output_size,
            ..self
        }
    }

    pub fn with_foreground(self, foreground: Rgba) -> Self {
        Self { foreground, ..self }
    }

    /// Replace all exclusion rules, including defaults, with exact matches of `elements`
    pub fn replace_excluded(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.exclusions.replace(elements);
        self
    }

    /// Exclude elements equal to any of `elements` in addition to the current rules
    pub fn add_excluded(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.exclusions.extend_exact(elements);
        self
    }

    /// Load options from JSON, missing fields are set to their defaults
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encoder(&self) -> Encoder {
        Encoder::new(self.output_size, self.foreground)
    }
}

/// Convert SVG document into IconVG
pub fn convert(content: impl AsRef<[u8]>, options: &ConvertOptions) -> Result<Vec<u8>, Error> {
    let _span = tracing::debug_span!("[convert]").entered();
    let text = std::str::from_utf8(content.as_ref())
        .map_err(|error| Error::MarkupParse(format!("document is not UTF-8: {error}")))?;
    let drawing =
        tracing::debug_span!("[normalize]").in_scope(|| Drawing::parse(text, &options.exclusions))?;
    convert_drawing(&drawing, options)
}

/// Read SVG file and convert it into IconVG
pub fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Vec<u8>, Error> {
    let path = path.as_ref();
    tracing::debug!("[convert:file] {}", path.display());
    let content = std::fs::read(path)?;
    convert(content, options)
}

/// Encode already normalized drawing
pub fn convert_drawing(drawing: &Drawing, options: &ConvertOptions) -> Result<Vec<u8>, Error> {
    tracing::debug_span!("[encode]").in_scope(|| options.encoder().encode(drawing))
}
