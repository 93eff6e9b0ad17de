#![warn(clippy::pedantic)]
//! Reference language plugins for the pi parsing framework.
//!
//! - [`golang::GoLang`]: Go lexer and grammar, symbol population, type
//!   inference hooks, completion and lookup.
//! - [`tex::TexLang`]: TeX command completion and `\cite` completion from
//!   the `.bib` files next to the document.
//!
//! [`register_std`] attaches both to a registry; [`global`] is the
//! process-wide registry with both attached.

pub mod golang;
pub mod tex;

use std::sync::Arc;

use once_cell::sync::Lazy;
use pi::{Lang, LangError, LangSupport, Supported};
use tracing::debug;

use crate::golang::GoLang;
use crate::tex::TexLang;

static STD_REGISTERED: Lazy<()> = Lazy::new(|| {
    if let Err(e) = register_std(LangSupport::global()) {
        debug!(error = %e, "standard plugins partially registered");
    }
});

/// Registers the Go and TeX plugins with `support`. A plugin whose rule
/// trees fail validation is disabled; the other is still registered.
///
/// # Errors
///
/// Returns the first registration failure.
pub fn register_std(support: &LangSupport) -> Result<(), LangError> {
    let go = support.register_with(Supported::Go, || {
        Ok(Arc::new(GoLang::new()?) as Arc<dyn Lang>)
    });
    let tex = support.register_with(Supported::TeX, || {
        Ok(Arc::new(TexLang::new()?) as Arc<dyn Lang>)
    });
    go.and(tex)
}

/// [`LangSupport::global`] with the standard plugins registered on first
/// use.
#[must_use]
pub fn global() -> &'static LangSupport {
    Lazy::force(&STD_REGISTERED);
    LangSupport::global()
}
