/// Represents the type of a line in an M3U8 playlist, as far as rewriting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Empty,
    /// Comment or tag that carries no rewritable URI.
    Directive,
    /// `#EXT-X-MAP:` init segment tag.
    ExtXMap,
    /// `#EXT-X-MEDIA:` alternate rendition tag.
    ExtXMedia,
    Uri,
}

impl LineType {
    pub fn is_uri(&self) -> bool {
        matches!(self, Self::Uri)
    }

    /// Tags whose `URI="..."` attribute is routed back through the proxy.
    pub fn carries_uri_attribute(&self) -> bool {
        matches!(self, Self::ExtXMap | Self::ExtXMedia)
    }
}

/// Classifier for M3U8 lines.
pub struct LineClassifier;

impl LineClassifier {
    /// Classify a line from an M3U8 playlist.
    pub fn classify(line: &str) -> LineType {
        let line = line.trim();

        if line.is_empty() {
            return LineType::Empty;
        }

        if !line.starts_with('#') {
            return LineType::Uri;
        }

        if line.starts_with("#EXT-X-MAP:") {
            LineType::ExtXMap
        } else if line.starts_with("#EXT-X-MEDIA:") {
            LineType::ExtXMedia
        } else {
            LineType::Directive
        }
    }
}
