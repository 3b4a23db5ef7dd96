use crate::{
    Result,
    hls::{ResourceKind, SegmentFormat},
    proxy::UrlCodec,
};
use url::Url;

/// Context for rewriting one manifest.
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// URL the manifest was fetched from. Relative references resolve against it.
    pub base_url: Url,

    /// Whether this is the channel's top-level (master) manifest.
    pub is_master: bool,

    /// Scheme and authority clients use to reach this proxy, without a trailing slash.
    pub proxy_origin: String,

    /// Route prefix of the provider serving the render endpoints.
    pub provider: &'static str,

    pub codec: UrlCodec,
}

impl TransformContext {
    pub fn new(
        base_url: Url,
        is_master: bool,
        proxy_origin: impl Into<String>,
        provider: &'static str,
        codec: UrlCodec,
    ) -> Self {
        let proxy_origin = proxy_origin.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            is_master,
            proxy_origin,
            provider,
            codec,
        }
    }

    /// Resolve a relative URL against the manifest URL.
    pub fn resolve_url(&self, relative: &str) -> Result<Url> {
        self.base_url.join(relative).map_err(Into::into)
    }

    /// Rewrite a manifest reference to where the client should fetch it.
    ///
    /// Sub-playlists always go through the playlist endpoint. Segments go
    /// through the segment endpoint only from media manifests; anything else
    /// falls back to the absolute upstream URL.
    pub fn route(&self, reference: &str) -> String {
        let resolved = match self.resolve_url(reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Leaving unresolvable reference {:?}: {}", reference, e);
                return reference.to_string();
            }
        };

        let endpoint = match ResourceKind::from_url(&resolved) {
            ResourceKind::Playlist => "playlist.m3u8",
            ResourceKind::Segment(SegmentFormat::MpegTS) if !self.is_master => "segment.ts",
            ResourceKind::Segment(SegmentFormat::Mp4) if !self.is_master => "segment.mp4",
            _ => return resolved.into(),
        };

        match self.codec.encode(resolved.as_str()) {
            Ok(token) => self.build_render_url(endpoint, &token),
            Err(e) => {
                tracing::warn!("Failed to encode {}: {}", resolved, e);
                resolved.into()
            }
        }
    }

    /// Build a URL for one of the provider's render endpoints.
    pub fn build_render_url(&self, endpoint: &str, token: &str) -> String {
        format!(
            "{}/{}/render/{}?auth={}",
            self.proxy_origin,
            self.provider,
            endpoint,
            urlencoding::encode(token)
        )
    }
}
