//! Process-wide language registry.
//!
//! [`LangSupport::global`] is built once on first use with the standard
//! properties table and no plugins. Plugins are added with explicit
//! registration calls, which are serialized; lookups take a shared lock and
//! may run concurrently with each other.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use pi_lex::LexGrammar;
use pi_parse::{ParseError, Parser};
use rustc_hash::FxHashMap;
use tracing::{debug, error};

use crate::config::PiConfig;
use crate::errors::LangError;
use crate::lang::{GrammarLang, Lang};
use crate::props::{LangProps, Supported, std_lang_props};

static LANG_SUPPORT: Lazy<LangSupport> = Lazy::new(LangSupport::with_std_props);

#[derive(Clone)]
struct Entry {
    props: LangProps,
    lang: Option<Arc<dyn Lang>>,
    disabled: Option<String>,
}

impl Entry {
    fn bare(sup: Supported) -> Self {
        Self {
            props: LangProps::new(sup, "", "", ""),
            lang: None,
            disabled: None,
        }
    }
}

pub struct LangSupport {
    langs: RwLock<FxHashMap<Supported, Entry>>,
    registering: Mutex<()>,
}

impl Default for LangSupport {
    fn default() -> Self {
        Self::with_std_props()
    }
}

impl LangSupport {
    /// A registry that knows no languages at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            langs: RwLock::new(FxHashMap::default()),
            registering: Mutex::new(()),
        }
    }

    /// A registry with properties for every standard language and no plugins.
    #[must_use]
    pub fn with_std_props() -> Self {
        let reg = Self::empty();
        {
            let mut langs = reg.langs.write();
            for props in std_lang_props() {
                langs.insert(
                    props.sup,
                    Entry {
                        props,
                        lang: None,
                        disabled: None,
                    },
                );
            }
        }
        reg
    }

    #[must_use]
    pub fn global() -> &'static LangSupport {
        &LANG_SUPPORT
    }

    /// Attaches a plugin to its language.
    pub fn register(&self, lang: Arc<dyn Lang>) {
        let _guard = self.registering.lock();
        self.install(lang.sup(), lang);
    }

    /// Builds and attaches a plugin. A build failure (typically a malformed
    /// grammar) is logged once and disables the language; other languages
    /// are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`LangError::Disabled`] when `build` fails.
    pub fn register_with<F>(&self, sup: Supported, build: F) -> Result<(), LangError>
    where
        F: FnOnce() -> Result<Arc<dyn Lang>, ParseError>,
    {
        let _guard = self.registering.lock();
        match build() {
            Ok(lang) => {
                self.install(sup, lang);
                Ok(())
            }
            Err(err) => Err(self.disable(sup, &err)),
        }
    }

    /// Registers a language known only by its rule trees, as a JSON document
    /// with `lexer` and `grammar` fields.
    ///
    /// # Errors
    ///
    /// Returns [`LangError::Disabled`] when the document is invalid.
    pub fn register_json(&self, sup: Supported, json: &str) -> Result<(), LangError> {
        self.register_with(sup, || {
            let parser = Parser::from_json(json)?;
            Ok(Arc::new(GrammarLang::new(sup, parser)) as Arc<dyn Lang>)
        })
    }

    fn install(&self, sup: Supported, lang: Arc<dyn Lang>) {
        let mut langs = self.langs.write();
        let entry = langs.entry(sup).or_insert_with(|| Entry::bare(sup));
        debug!(lang = %sup, "registered language support");
        entry.lang = Some(lang);
        entry.disabled = None;
    }

    fn disable(&self, sup: Supported, err: &ParseError) -> LangError {
        error!(lang = %sup, error = %err, "language support disabled");
        let mut langs = self.langs.write();
        let entry = langs.entry(sup).or_insert_with(|| Entry::bare(sup));
        entry.lang = None;
        entry.disabled = Some(err.to_string());
        LangError::Disabled {
            lang: sup.to_string(),
            reason: err.to_string(),
        }
    }

    /// Applies per-language property overrides from `config`.
    pub fn configure(&self, config: &PiConfig) {
        let _guard = self.registering.lock();
        let mut langs = self.langs.write();
        for entry in langs.values_mut() {
            config.apply_props(&mut entry.props);
        }
    }

    /// # Errors
    ///
    /// Returns [`LangError::Unsupported`] for a language with no properties.
    pub fn props(&self, sup: Supported) -> Result<LangProps, LangError> {
        self.langs
            .read()
            .get(&sup)
            .map(|e| e.props.clone())
            .ok_or_else(|| LangError::Unsupported(sup.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`LangError::Unsupported`] for an unknown name.
    pub fn props_by_name(&self, name: &str) -> Result<LangProps, LangError> {
        self.props(Supported::by_name(name)?)
    }

    /// The plugin for `sup`.
    ///
    /// # Errors
    ///
    /// [`LangError::Disabled`] when its registration failed,
    /// [`LangError::NoParser`] when none was registered.
    pub fn lang(&self, sup: Supported) -> Result<Arc<dyn Lang>, LangError> {
        let langs = self.langs.read();
        let entry = langs
            .get(&sup)
            .ok_or_else(|| LangError::Unsupported(sup.to_string()))?;
        if let Some(reason) = &entry.disabled {
            return Err(LangError::Disabled {
                lang: sup.to_string(),
                reason: reason.clone(),
            });
        }
        entry
            .lang
            .clone()
            .ok_or_else(|| LangError::NoParser(sup.to_string()))
    }

    /// The lexer of the language called `name`, if it has a parser.
    #[must_use]
    pub fn lexer_by_name(&self, name: &str) -> Option<LexGrammar> {
        let sup = Supported::by_name(name).ok()?;
        match self.lang(sup) {
            Ok(lang) => lang.parser().map(|p| p.lexer().clone()),
            Err(err) => {
                debug!(lang = name, error = %err, "no lexer");
                None
            }
        }
    }

    /// Languages with a working plugin, in declaration order.
    #[must_use]
    pub fn parsed_langs(&self) -> Vec<Supported> {
        let langs = self.langs.read();
        Supported::ALL
            .into_iter()
            .filter(|s| langs.get(s).is_some_and(|e| e.lang.is_some()))
            .collect()
    }
}
