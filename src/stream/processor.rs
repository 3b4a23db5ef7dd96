use super::{
    classifier::{LineClassifier, LineType},
    context::TransformContext,
    rules::{self, TransformRule},
};

/// Line-oriented M3U8 rewriter.
pub struct StreamProcessor {
    context: TransformContext,
    rules: Vec<Box<dyn TransformRule>>,
}

impl StreamProcessor {
    pub fn new(context: TransformContext, rules: Vec<Box<dyn TransformRule>>) -> Self {
        Self { context, rules }
    }

    /// Processor with the default URI rewriting rules.
    pub fn with_default_rules(context: TransformContext) -> Self {
        Self::new(context, rules::default_rules())
    }

    /// Process entire playlist content and return transformed content.
    ///
    /// Every input line yields exactly one output line, in order.
    pub fn process(&self, input: &str) -> String {
        input
            .lines()
            .map(|line| self.process_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Process a single line.
    pub fn process_line(&self, line: &str) -> String {
        let line_type = LineClassifier::classify(line);

        if matches!(line_type, LineType::Empty | LineType::Directive) {
            return line.to_string();
        }

        // Find first matching rule and apply it
        for rule in &self.rules {
            if rule.matches(&line_type, &self.context) {
                return rule.transform(line, &self.context);
            }
        }

        // Default: passthrough
        line.to_string()
    }

    /// Get context (for inspection/testing).
    pub fn context(&self) -> &TransformContext {
        &self.context
    }
}

/// Rewrite a manifest body so every reference routes back through the proxy.
pub fn rewrite(
    body: &str,
    base_url: url::Url,
    is_master: bool,
    proxy_origin: &str,
    provider: &'static str,
    codec: crate::proxy::UrlCodec,
) -> String {
    let context = TransformContext::new(base_url, is_master, proxy_origin, provider, codec);
    StreamProcessor::with_default_rules(context).process(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::UrlCodec;
    use url::Url;

    fn codec() -> UrlCodec {
        UrlCodec::new(b"processor-test")
    }

    fn create_test_context(is_master: bool) -> TransformContext {
        TransformContext::new(
            Url::parse("https://cdn.example/path/manifest.m3u8").unwrap(),
            is_master,
            "https://proxy.local",
            "zee5",
            codec(),
        )
    }

    #[test]
    fn test_passthrough_without_rules() {
        let processor = StreamProcessor::new(create_test_context(false), vec![]);
        assert!(!processor.context().is_master);
        assert_eq!(processor.context().proxy_origin, "https://proxy.local");

        let input = "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:6.0,\nsegment.ts";
        assert_eq!(processor.process(input), input);
    }

    #[test]
    fn test_blank_and_comment_lines_verbatim() {
        let processor = StreamProcessor::with_default_rules(create_test_context(false));

        for line in ["", "   ", "\t", "# just a comment ", "#EXT-X-KEY:METHOD=NONE", "#EXTM3U"] {
            assert_eq!(processor.process_line(line), line);
        }
    }

    #[test]
    fn test_line_count_and_order_preserved() {
        let processor = StreamProcessor::with_default_rules(create_test_context(false));

        let input = "#EXTM3U\n\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\na.ts\n\n#EXTINF:6.0,\nb.ts\n#EXT-X-ENDLIST";
        let output = processor.process(input);
        let lines: Vec<&str> = output.split('\n').collect();

        assert_eq!(lines.len(), input.split('\n').count());
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(lines[1], "");
        assert_eq!(lines[3], "#EXTINF:6.0,");
        assert!(lines[4].contains("/zee5/render/segment.ts?auth="));
        assert_eq!(lines[5], "");
        assert!(lines[7].contains("/zee5/render/segment.ts?auth="));
        assert_eq!(lines[8], "#EXT-X-ENDLIST");
    }

    #[test]
    fn test_master_vs_media_asymmetry() {
        let input = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=800000\nlow/index.m3u8\nstray.ts";

        let master = rewrite(
            input,
            Url::parse("https://cdn.example/path/master.m3u8").unwrap(),
            true,
            "https://proxy.local",
            "zee5",
            codec(),
        );
        let lines: Vec<&str> = master.lines().collect();
        assert!(lines[2].starts_with("https://proxy.local/zee5/render/playlist.m3u8?auth="));
        assert_eq!(lines[3], "https://cdn.example/path/stray.ts");

        let media = rewrite(
            "#EXTM3U\n#EXTINF:4.0,\nstray.ts",
            Url::parse("https://cdn.example/path/low/index.m3u8").unwrap(),
            false,
            "https://proxy.local",
            "zee5",
            codec(),
        );
        assert!(
            media
                .lines()
                .nth(2)
                .unwrap()
                .starts_with("https://proxy.local/zee5/render/segment.ts?auth=")
        );
    }

    #[test]
    fn test_end_to_end_segment_line() {
        let output = rewrite(
            "segment0.ts",
            Url::parse("https://cdn.example/path/manifest.m3u8").unwrap(),
            false,
            "https://proxy.local",
            "zee5",
            codec(),
        );

        let token = output
            .strip_prefix("https://proxy.local/zee5/render/segment.ts?auth=")
            .unwrap();
        assert!(!token.is_empty());
        assert_eq!(
            codec().decode(token).unwrap(),
            "https://cdn.example/path/segment0.ts"
        );
    }

    #[test]
    fn test_crlf_input() {
        let processor = StreamProcessor::with_default_rules(create_test_context(true));
        let output = processor.process("#EXTM3U\r\n#EXT-X-VERSION:3\r\n");

        assert_eq!(output, "#EXTM3U\n#EXT-X-VERSION:3");
    }
}
