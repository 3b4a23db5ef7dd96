use url::Url;

/// Represents the format of a proxied media segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentFormat {
    MpegTS,
    Mp4,
}

impl SegmentFormat {
    /// Extension used by the segment render endpoint.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::MpegTS => "ts",
            Self::Mp4 => "mp4",
        }
    }
}

/// What a manifest reference points at, judged by its path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Playlist,
    Segment(SegmentFormat),
    Other,
}

impl ResourceKind {
    /// Detect from a resolved URL. Query and fragment are ignored.
    pub fn from_url(url: &Url) -> Self {
        Self::from_path(url.path())
    }

    pub fn from_path(path: &str) -> Self {
        let filename = path.rsplit('/').next().unwrap_or(path);
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return Self::Other;
        };

        match ext.to_ascii_lowercase().as_str() {
            "m3u8" => Self::Playlist,
            "ts" => Self::Segment(SegmentFormat::MpegTS),
            "mp4" => Self::Segment(SegmentFormat::Mp4),
            _ => Self::Other,
        }
    }
}
