//! Compiler configuration.

use keyform_attr::AttributeKind;

/// Configuration for compiling entity definitions.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Whether to run the sortability advisor on sort keys.
    pub check_sortability: bool,

    /// Whether to log sortability diagnostics as warnings.
    pub log_diagnostics: bool,

    /// Attribute kind used by key definitions that do not name one.
    pub default_attribute_kind: AttributeKind,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            check_sortability: true,
            log_diagnostics: true,
            default_attribute_kind: AttributeKind::String,
        }
    }
}

impl CompilerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to check sort keys for ordering hazards.
    #[must_use]
    pub const fn check_sortability(mut self, value: bool) -> Self {
        self.check_sortability = value;
        self
    }

    /// Sets whether to log sortability diagnostics.
    #[must_use]
    pub const fn log_diagnostics(mut self, value: bool) -> Self {
        self.log_diagnostics = value;
        self
    }

    /// Sets the default attribute kind.
    #[must_use]
    pub const fn default_attribute_kind(mut self, kind: AttributeKind) -> Self {
        self.default_attribute_kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CompilerConfig::default();
        assert!(config.check_sortability);
        assert!(config.log_diagnostics);
        assert_eq!(config.default_attribute_kind, AttributeKind::String);
    }

    #[test]
    fn builder_pattern() {
        let config = CompilerConfig::new()
            .check_sortability(false)
            .log_diagnostics(false)
            .default_attribute_kind(AttributeKind::Binary);

        assert!(!config.check_sortability);
        assert!(!config.log_diagnostics);
        assert_eq!(config.default_attribute_kind, AttributeKind::Binary);
    }
}
