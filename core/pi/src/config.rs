//! Pipeline configuration, read from TOML.
//!
//! ```toml
//! fun_internal = true
//! recovery = "resync"
//! max_parse_errors = 10
//!
//! [langs.go]
//! comment_ln = "// "
//! flags = ["IndentTab"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use pi_parse::{Abandon, RecoveryPolicy};
use serde::{Deserialize, Serialize};

use crate::lang::Lang;
use crate::props::{LangFlags, LangProps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    #[default]
    Abandon,
    Resync,
}

/// Overrides for one language's [`LangProps`]; unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LangOverride {
    pub comment_ln: Option<String>,
    pub comment_st: Option<String>,
    pub comment_ed: Option<String>,
    pub flags: Option<Vec<LangFlags>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PiConfig {
    /// Keep function-local symbols after inference.
    pub fun_internal: bool,
    /// Log every symbol left unresolved after inference.
    pub trace_types: bool,
    /// Resync gives up after this many errors in one file; 0 means no limit.
    pub max_parse_errors: usize,
    pub recovery: RecoveryMode,
    /// Keyed by language name, matched case-insensitively.
    pub langs: BTreeMap<String, LangOverride>,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            fun_internal: false,
            trace_types: false,
            max_parse_errors: 20,
            recovery: RecoveryMode::Abandon,
            langs: BTreeMap::new(),
        }
    }
}

impl PiConfig {
    /// # Errors
    ///
    /// Returns an error for invalid TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid pi configuration")
    }

    /// Reads the configuration at `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn apply_props(&self, props: &mut LangProps) {
        let Some(ov) = self
            .langs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(props.sup.name()))
            .map(|(_, ov)| ov)
        else {
            return;
        };
        if let Some(v) = &ov.comment_ln {
            props.comment_ln.clone_from(v);
        }
        if let Some(v) = &ov.comment_st {
            props.comment_st.clone_from(v);
        }
        if let Some(v) = &ov.comment_ed {
            props.comment_ed.clone_from(v);
        }
        if let Some(v) = &ov.flags {
            props.flags.clone_from(v);
        }
    }

    /// The recovery policy for parsing `lang`.
    #[must_use]
    pub fn recovery_policy(&self, lang: &dyn Lang) -> Box<dyn RecoveryPolicy> {
        match self.recovery {
            RecoveryMode::Abandon => Box::new(Abandon),
            RecoveryMode::Resync => Box::new(lang.resync().max_errors(self.max_parse_errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Supported;

    #[test]
    fn defaults_when_empty() {
        let cfg = PiConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PiConfig::default());
        assert_eq!(cfg.recovery, RecoveryMode::Abandon);
    }

    #[test]
    fn overrides_apply_by_name() {
        let cfg = PiConfig::from_toml_str(
            "recovery = \"resync\"\n[langs.PYTHON]\ncomment_ln = \"## \"\nflags = [\"IndentSpace\", \"ReAutoIndent\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.recovery, RecoveryMode::Resync);
        let mut props = LangProps::new(Supported::Python, "# ", "", "");
        cfg.apply_props(&mut props);
        assert_eq!(props.comment_ln, "## ");
        assert!(props.has_flag(LangFlags::ReAutoIndent));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PiConfig::from_toml_str("fun_intern = true").is_err());
    }
}
