//! Custom block handlers
//!
//! A custom block like `{$ENV:HOME$}` pairs an identifier with a payload;
//! the handler registered for that identifier turns the payload into
//! replacement text at build time. The replacement is embedded as literal
//! output, never parsed as code.

/// A pluggable payload-to-text transform, resolved by identifier while the
/// unit is generated.
pub trait CustomBlock: Send + Sync {
    /// Identifier used when the block is registered without an explicit one.
    fn default_identifier(&self) -> &str;

    /// Transform the raw block payload into replacement text.
    fn evaluate(&self, payload: &str) -> String;
}

/// Resolves payloads against an environment-style lookup, with an optional
/// `NAME<sep>default` fallback form.
pub struct EnvBlock {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
    default_separator: Option<String>,
}

impl EnvBlock {
    /// A block whose whole payload is the variable name.
    pub fn new(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            default_separator: None,
        }
    }

    /// A block whose payload may carry a fallback after `separator`, used
    /// when the variable is missing or empty.
    pub fn with_default_separator(
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            lookup: Box::new(lookup),
            default_separator: Some(separator.into()),
        }
    }

    /// A block reading the process environment.
    pub fn from_process_env() -> Self {
        Self::new(|name| std::env::var(name).ok())
    }
}

impl CustomBlock for EnvBlock {
    fn default_identifier(&self) -> &str {
        "ENV"
    }

    fn evaluate(&self, payload: &str) -> String {
        let (name, default) = match &self.default_separator {
            Some(sep) => match payload.split_once(sep.as_str()) {
                Some((name, default)) => (name, Some(default)),
                None => (payload, None),
            },
            None => (payload, None),
        };
        match (self.lookup)(name.trim()) {
            Some(value) if !value.is_empty() => value,
            _ => default.unwrap_or("").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/test".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn test_resolves_variable() {
        let block = EnvBlock::new(lookup);
        assert_eq!(block.evaluate("HOME"), "/home/test");
        assert_eq!(block.evaluate(" HOME "), "/home/test");
    }

    #[test]
    fn test_missing_variable_is_empty_without_default() {
        let block = EnvBlock::new(lookup);
        assert_eq!(block.evaluate("MISSING"), "");
    }

    #[test]
    fn test_default_after_separator() {
        let block = EnvBlock::with_default_separator(lookup, ":");
        assert_eq!(block.evaluate("MISSING:fallback"), "fallback");
        assert_eq!(block.evaluate("HOME:fallback"), "/home/test");
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        let block = EnvBlock::with_default_separator(lookup, ":");
        assert_eq!(block.evaluate("EMPTY:fallback"), "fallback");
    }

    #[test]
    fn test_payload_without_separator_has_no_default() {
        let block = EnvBlock::with_default_separator(lookup, ":");
        assert_eq!(block.evaluate("MISSING"), "");
    }
}
