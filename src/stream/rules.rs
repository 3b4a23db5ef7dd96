pub mod uri_line;
pub mod uri_tag;

use super::{classifier::LineType, context::TransformContext};

pub use uri_line::UriLineRewriteRule;
pub use uri_tag::UriTagRewriteRule;

/// Trait for transform rules.
pub trait TransformRule: Send + Sync {
    /// Check if this rule should be applied.
    fn matches(&self, line_type: &LineType, context: &TransformContext) -> bool;

    /// Transform the line. Exactly one output line per input line.
    fn transform(&self, line: &str, context: &TransformContext) -> String;
}

/// Create default set of transform rules.
pub fn default_rules() -> Vec<Box<dyn TransformRule>> {
    vec![Box::new(UriTagRewriteRule), Box::new(UriLineRewriteRule)]
}
