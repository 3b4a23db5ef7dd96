use super::{LineType, TransformContext, TransformRule};

/// Rule for rewriting bare URI lines (variant playlists and segments).
pub struct UriLineRewriteRule;

impl TransformRule for UriLineRewriteRule {
    fn matches(&self, line_type: &LineType, _context: &TransformContext) -> bool {
        line_type.is_uri()
    }

    fn transform(&self, line: &str, context: &TransformContext) -> String {
        context.route(line.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::UrlCodec;
    use url::Url;

    fn create_test_context(is_master: bool) -> TransformContext {
        TransformContext::new(
            Url::parse("https://cdn.example.com/master.m3u8").unwrap(),
            is_master,
            "http://localhost:8080",
            "zee5",
            UrlCodec::new(b"uri-line-test"),
        )
    }

    #[test]
    fn test_transform_relative_variant() {
        let rule = UriLineRewriteRule;
        let context = create_test_context(true);

        let result = rule.transform("720p/playlist.m3u8", &context);

        assert!(result.starts_with("http://localhost:8080/zee5/render/playlist.m3u8?auth="));
    }

    #[test]
    fn test_transform_trims_whitespace() {
        let rule = UriLineRewriteRule;
        let context = create_test_context(false);

        let result = rule.transform("  seg-1.ts\t", &context);

        assert!(result.starts_with("http://localhost:8080/zee5/render/segment.ts?auth="));
    }

    #[test]
    fn test_matches_uri_only() {
        let rule = UriLineRewriteRule;
        let context = create_test_context(true);

        assert!(rule.matches(&LineType::Uri, &context));
        assert!(!rule.matches(&LineType::Empty, &context));
        assert!(!rule.matches(&LineType::ExtXMap, &context));
    }
}
