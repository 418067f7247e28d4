//! Template delimiter and block-kind configuration
//!
//! Every delimiter can be changed, and whole block kinds can be switched
//! off. A deactivated kind's delimiters are ordinary text to the tokenizer,
//! and they are exempt from validation.

/// Delimiters and evaluation flags for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    pub left_content_delimiter: String,
    pub right_content_delimiter: String,
    /// Separates a content expression from its optional format, e.g. the
    /// `:` in `{{ total :000.00}}`.
    pub content_format_delimiter: String,
    pub left_statement_delimiter: String,
    pub right_statement_delimiter: String,
    pub left_comment_delimiter: String,
    pub right_comment_delimiter: String,
    pub left_custom_block_delimiter: String,
    pub right_custom_block_delimiter: String,
    /// Separates a custom block's identifier from its payload.
    pub custom_block_identifier_delimiter: String,

    /// When false, content delimiters render as literal text.
    pub evaluate_content_blocks: bool,
    /// When false, statement delimiters render as literal text.
    pub evaluate_statement_blocks: bool,
    /// When false, comment blocks render verbatim instead of disappearing.
    pub remove_comment_blocks: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            left_content_delimiter: "{{".into(),
            right_content_delimiter: "}}".into(),
            content_format_delimiter: ":".into(),
            left_statement_delimiter: "{%".into(),
            right_statement_delimiter: "%}".into(),
            left_comment_delimiter: "{#".into(),
            right_comment_delimiter: "#}".into(),
            left_custom_block_delimiter: "{$".into(),
            right_custom_block_delimiter: "$}".into(),
            custom_block_identifier_delimiter: ":".into(),
            evaluate_content_blocks: true,
            evaluate_statement_blocks: true,
            remove_comment_blocks: true,
        }
    }
}

impl TemplateConfig {
    /// Check the configuration, considering only active block kinds.
    ///
    /// Custom blocks are active exactly when at least one handler is
    /// registered, which the caller knows and this type does not. Returns
    /// every failure found, not just the first.
    pub(crate) fn validate(&self, custom_blocks_active: bool) -> Vec<String> {
        let mut failures = Vec::new();
        let mut left_delimiters: Vec<(&str, &str)> = Vec::new();

        let require = |name: &str, value: &str, failures: &mut Vec<String>| {
            if value.is_empty() {
                failures.push(format!("{name} must not be empty"));
            }
        };

        if self.evaluate_content_blocks {
            require(
                "left content delimiter",
                &self.left_content_delimiter,
                &mut failures,
            );
            require(
                "right content delimiter",
                &self.right_content_delimiter,
                &mut failures,
            );
            require(
                "content format delimiter",
                &self.content_format_delimiter,
                &mut failures,
            );
            left_delimiters.push(("left content delimiter", &self.left_content_delimiter));
        }
        if self.evaluate_statement_blocks {
            require(
                "left statement delimiter",
                &self.left_statement_delimiter,
                &mut failures,
            );
            require(
                "right statement delimiter",
                &self.right_statement_delimiter,
                &mut failures,
            );
            left_delimiters.push(("left statement delimiter", &self.left_statement_delimiter));
        }
        if self.remove_comment_blocks {
            require(
                "left comment delimiter",
                &self.left_comment_delimiter,
                &mut failures,
            );
            require(
                "right comment delimiter",
                &self.right_comment_delimiter,
                &mut failures,
            );
            left_delimiters.push(("left comment delimiter", &self.left_comment_delimiter));
        }
        if custom_blocks_active {
            require(
                "left custom block delimiter",
                &self.left_custom_block_delimiter,
                &mut failures,
            );
            require(
                "right custom block delimiter",
                &self.right_custom_block_delimiter,
                &mut failures,
            );
            require(
                "custom block identifier delimiter",
                &self.custom_block_identifier_delimiter,
                &mut failures,
            );
            left_delimiters.push((
                "left custom block delimiter",
                &self.left_custom_block_delimiter,
            ));
        }

        // A left delimiter that is a prefix of another makes tokenization
        // ambiguous; check every active pair in both directions.
        for (i, &(first_name, first)) in left_delimiters.iter().enumerate() {
            for &(second_name, second) in &left_delimiters[i + 1..] {
                if first.is_empty() || second.is_empty() {
                    continue;
                }
                if second.starts_with(first) {
                    failures.push(format!(
                        "{first_name} ({first:?}) is a prefix of {second_name} ({second:?})"
                    ));
                }
                if first.starts_with(second) {
                    failures.push(format!(
                        "{second_name} ({second:?}) is a prefix of {first_name} ({first:?})"
                    ));
                }
            }
        }

        failures
    }
}
