use regex::Regex;
use std::sync::LazyLock;

use super::{LineType, TransformContext, TransformRule};

static URI_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"URI="([^"]+)""#).expect("valid URI attribute pattern"));

/// Rule for rewriting the `URI` attribute of #EXT-X-MAP and #EXT-X-MEDIA tags.
pub struct UriTagRewriteRule;

impl TransformRule for UriTagRewriteRule {
    fn matches(&self, line_type: &LineType, _context: &TransformContext) -> bool {
        line_type.carries_uri_attribute()
    }

    fn transform(&self, line: &str, context: &TransformContext) -> String {
        let Some(value) = URI_ATTRIBUTE.captures(line).and_then(|caps| caps.get(1)) else {
            return line.to_string();
        };

        // Splice the new value in place so every other attribute stays byte-identical
        let routed = context.route(value.as_str());
        let mut result = String::with_capacity(line.len() + routed.len());
        result.push_str(&line[..value.start()]);
        result.push_str(&routed);
        result.push_str(&line[value.end()..]);
        result
    }
}
