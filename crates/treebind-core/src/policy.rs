#![forbid(unsafe_code)]

//! Tunables for locate-expand-reveal.
//!
//! [`RevealPolicy::default()`] reproduces the stock behavior: select the
//! match, focus it, scroll it into view, then focus the widget itself.
//!
//! # Loading
//!
//! With the `policy-config` feature the policy loads from TOML or JSON:
//!
//! ```toml
//! # treebind.toml
//! focus_host = false
//! max_depth = 32
//! ```
//!
//! ```rust,ignore
//! let policy = RevealPolicy::from_toml_file("treebind.toml")?;
//! ```

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

/// How a reveal walks and what it does once the target is found.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct RevealPolicy {
    /// Give the matched container input focus. Default: true.
    pub focus_container: bool,
    /// Scroll the matched container into view. Default: true.
    pub bring_into_view: bool,
    /// Focus the widget after a successful reveal so the active-selection
    /// highlight renders even if another control held focus. Default: true.
    pub focus_host: bool,
    /// Collapse containers the walk expanded when their subtree did not hold
    /// the target. Default: true.
    pub restore_expansion: bool,
    /// Deepest level the walk descends into (roots are depth 0).
    /// `None` walks the whole tree. Default: None.
    pub max_depth: Option<usize>,
    /// Reveal the slot's current value when a widget is attached.
    /// Default: false.
    pub reveal_on_attach: bool,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            focus_container: true,
            bring_into_view: true,
            focus_host: true,
            restore_expansion: true,
            max_depth: None,
            reveal_on_attach: false,
        }
    }
}

impl RevealPolicy {
    /// Set whether the matched container receives focus.
    #[must_use]
    pub fn with_focus_container(mut self, enabled: bool) -> Self {
        self.focus_container = enabled;
        self
    }

    /// Set whether the matched container is scrolled into view.
    #[must_use]
    pub fn with_bring_into_view(mut self, enabled: bool) -> Self {
        self.bring_into_view = enabled;
        self
    }

    /// Set whether the widget itself is focused after a reveal.
    #[must_use]
    pub fn with_focus_host(mut self, enabled: bool) -> Self {
        self.focus_host = enabled;
        self
    }

    /// Set whether dead-end expansions are rolled back.
    #[must_use]
    pub fn with_restore_expansion(mut self, enabled: bool) -> Self {
        self.restore_expansion = enabled;
        self
    }

    /// Bound the walk depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether attaching reveals the current slot value.
    #[must_use]
    pub fn with_reveal_on_attach(mut self, enabled: bool) -> Self {
        self.reveal_on_attach = enabled;
        self
    }

    /// Validate field combinations.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut errors = Vec::new();
        if self.max_depth == Some(0) {
            errors.push("max_depth must be at least 1 (or unset)".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PolicyError::Validation(errors))
        }
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(source).map_err(PolicyError::Toml)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read, parse and validate a TOML file.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let source = std::fs::read_to_string(path).map_err(PolicyError::Io)?;
        Self::from_toml_str(&source)
    }

    /// Parse and validate a JSON document.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(source: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(source).map_err(PolicyError::Json)?;
        policy.validate()?;
        Ok(policy)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a reveal policy.
#[derive(Debug)]
pub enum PolicyError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behavior() {
        let policy = RevealPolicy::default();
        assert!(policy.focus_container);
        assert!(policy.bring_into_view);
        assert!(policy.focus_host);
        assert!(policy.restore_expansion);
        assert_eq!(policy.max_depth, None);
        assert!(!policy.reveal_on_attach);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let policy = RevealPolicy::default()
            .with_focus_host(false)
            .with_max_depth(Some(4))
            .with_reveal_on_attach(true);
        assert!(!policy.focus_host);
        assert_eq!(policy.max_depth, Some(4));
        assert!(policy.reveal_on_attach);
    }

    #[test]
    fn zero_depth_rejected() {
        let err = RevealPolicy::default()
            .with_max_depth(Some(0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, PolicyError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("max_depth"));
    }

    #[cfg(feature = "policy-config")]
    mod loading {
        use super::super::*;
        use std::io::Write;

        #[test]
        fn toml_partial_document_keeps_defaults() {
            let policy = RevealPolicy::from_toml_str("focus_host = false\nmax_depth = 8\n")
                .expect("valid toml");
            assert!(!policy.focus_host);
            assert_eq!(policy.max_depth, Some(8));
            assert!(policy.restore_expansion);
        }

        #[test]
        fn json_round_trip() {
            let policy = RevealPolicy::default().with_bring_into_view(false);
            let json = serde_json::to_string(&policy).expect("serialize");
            assert_eq!(RevealPolicy::from_json_str(&json).expect("parse"), policy);
        }

        #[test]
        fn toml_file_validation_error() {
            let mut file = tempfile::NamedTempFile::new().expect("temp file");
            writeln!(file, "max_depth = 0").expect("write");
            let err = RevealPolicy::from_toml_file(file.path()).unwrap_err();
            assert!(matches!(err, PolicyError::Validation(_)));
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = RevealPolicy::from_toml_file("/nonexistent/treebind.toml").unwrap_err();
            assert!(matches!(err, PolicyError::Io(_)));
        }

        #[test]
        fn malformed_toml() {
            let err = RevealPolicy::from_toml_str("focus_host = 3").unwrap_err();
            assert!(matches!(err, PolicyError::Toml(_)));
        }
    }
}
