//! Per-language properties: comment syntax and indentation policy.

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::errors::LangError;

/// Languages with known properties. Only some of them have a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Supported {
    Ada,
    Bash,
    Csh,
    C,
    CSharp,
    D,
    ObjC,
    Go,
    Java,
    JavaScript,
    Eiffel,
    Haskell,
    Lisp,
    Lua,
    Makefile,
    Matlab,
    OCaml,
    Pascal,
    Perl,
    Python,
    Php,
    R,
    Ruby,
    Rust,
    Scala,
    Html,
    TeX,
    Markdown,
    Yaml,
}

impl Supported {
    pub const ALL: [Supported; 29] = [
        Supported::Ada,
        Supported::Bash,
        Supported::Csh,
        Supported::C,
        Supported::CSharp,
        Supported::D,
        Supported::ObjC,
        Supported::Go,
        Supported::Java,
        Supported::JavaScript,
        Supported::Eiffel,
        Supported::Haskell,
        Supported::Lisp,
        Supported::Lua,
        Supported::Makefile,
        Supported::Matlab,
        Supported::OCaml,
        Supported::Pascal,
        Supported::Perl,
        Supported::Python,
        Supported::Php,
        Supported::R,
        Supported::Ruby,
        Supported::Rust,
        Supported::Scala,
        Supported::Html,
        Supported::TeX,
        Supported::Markdown,
        Supported::Yaml,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Supported::Ada => "Ada",
            Supported::Bash => "Bash",
            Supported::Csh => "Csh",
            Supported::C => "C",
            Supported::CSharp => "CSharp",
            Supported::D => "D",
            Supported::ObjC => "ObjC",
            Supported::Go => "Go",
            Supported::Java => "Java",
            Supported::JavaScript => "JavaScript",
            Supported::Eiffel => "Eiffel",
            Supported::Haskell => "Haskell",
            Supported::Lisp => "Lisp",
            Supported::Lua => "Lua",
            Supported::Makefile => "Makefile",
            Supported::Matlab => "Matlab",
            Supported::OCaml => "OCaml",
            Supported::Pascal => "Pascal",
            Supported::Perl => "Perl",
            Supported::Python => "Python",
            Supported::Php => "Php",
            Supported::R => "R",
            Supported::Ruby => "Ruby",
            Supported::Rust => "Rust",
            Supported::Scala => "Scala",
            Supported::Html => "Html",
            Supported::TeX => "TeX",
            Supported::Markdown => "Markdown",
            Supported::Yaml => "Yaml",
        }
    }

    /// Case-insensitive lookup by name.
    ///
    /// # Errors
    ///
    /// Returns [`LangError::Unsupported`] for an unknown name.
    pub fn by_name(name: &str) -> Result<Self, LangError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| LangError::Unsupported(name.to_string()))
    }

    /// Language of a file, from its extension (or its name, for makefiles).
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        if base.eq_ignore_ascii_case("makefile") {
            return Some(Supported::Makefile);
        }
        let (_, ext) = base.rsplit_once('.')?;
        let sup = match ext.to_ascii_lowercase().as_str() {
            "ada" | "adb" | "ads" => Supported::Ada,
            "sh" | "bash" => Supported::Bash,
            "csh" | "tcsh" => Supported::Csh,
            "c" | "h" => Supported::C,
            "cs" => Supported::CSharp,
            "d" => Supported::D,
            "m" => Supported::ObjC,
            "go" => Supported::Go,
            "java" => Supported::Java,
            "js" => Supported::JavaScript,
            "e" => Supported::Eiffel,
            "hs" => Supported::Haskell,
            "lisp" | "el" | "cl" => Supported::Lisp,
            "lua" => Supported::Lua,
            "mk" => Supported::Makefile,
            "mat" => Supported::Matlab,
            "ml" | "mli" => Supported::OCaml,
            "pas" | "p" => Supported::Pascal,
            "pl" | "pm" => Supported::Perl,
            "py" => Supported::Python,
            "php" => Supported::Php,
            "r" => Supported::R,
            "rb" => Supported::Ruby,
            "rs" => Supported::Rust,
            "scala" => Supported::Scala,
            "html" | "htm" => Supported::Html,
            "tex" => Supported::TeX,
            "md" => Supported::Markdown,
            "yaml" | "yml" => Supported::Yaml,
            _ => return None,
        };
        Some(sup)
    }
}

impl Display for Supported {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LangFlags {
    /// Indent with spaces only.
    IndentSpace,
    /// Indent with tabs only.
    IndentTab,
    /// Re-indent the current line when a newline is typed.
    ReAutoIndent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangProps {
    pub sup: Supported,
    /// Single-line comment marker, including any trailing space.
    pub comment_ln: String,
    pub comment_st: String,
    pub comment_ed: String,
    pub flags: Vec<LangFlags>,
}

impl LangProps {
    #[must_use]
    pub fn new(sup: Supported, comment_ln: &str, comment_st: &str, comment_ed: &str) -> Self {
        Self {
            sup,
            comment_ln: comment_ln.to_string(),
            comment_st: comment_st.to_string(),
            comment_ed: comment_ed.to_string(),
            flags: Vec::new(),
        }
    }

    #[must_use]
    pub fn flag(mut self, flag: LangFlags) -> Self {
        self.flags.push(flag);
        self
    }

    #[must_use]
    pub fn has_flag(&self, flag: LangFlags) -> bool {
        self.flags.contains(&flag)
    }
}

/// Built-in properties for every [`Supported`] language.
#[must_use]
pub fn std_lang_props() -> Vec<LangProps> {
    use Supported as S;
    let p = LangProps::new;
    vec![
        p(S::Ada, "--", "", ""),
        p(S::Bash, "# ", "", ""),
        p(S::Csh, "# ", "", ""),
        p(S::C, "// ", "/* ", " */"),
        p(S::CSharp, "// ", "/* ", " */"),
        p(S::D, "// ", "/* ", " */"),
        p(S::ObjC, "// ", "/* ", " */"),
        p(S::Go, "// ", "/* ", " */").flag(LangFlags::IndentTab),
        p(S::Java, "// ", "/* ", " */"),
        p(S::JavaScript, "// ", "/* ", " */"),
        p(S::Eiffel, "--", "", ""),
        p(S::Haskell, "--", "{- ", "-}"),
        p(S::Lisp, "; ", "", ""),
        p(S::Lua, "--", "---[[ ", "--]]"),
        p(S::Makefile, "# ", "", "").flag(LangFlags::IndentTab),
        p(S::Matlab, "% ", "%{ ", " %}"),
        p(S::OCaml, "", "(* ", " *)"),
        p(S::Pascal, "// ", " ", " }"),
        p(S::Perl, "# ", "", ""),
        p(S::Python, "# ", "", "").flag(LangFlags::IndentSpace),
        p(S::Php, "// ", "/* ", " */"),
        p(S::R, "# ", "", ""),
        p(S::Ruby, "# ", "", ""),
        p(S::Rust, "// ", "/* ", " */"),
        p(S::Scala, "// ", "/* ", " */"),
        p(S::Html, "", "<!-- ", " -->"),
        p(S::TeX, "% ", "", ""),
        p(S::Markdown, "", "<!--- ", " -->").flag(LangFlags::IndentSpace),
        p(S::Yaml, "#", "", "").flag(LangFlags::IndentSpace),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_props() {
        let props = std_lang_props();
        assert_eq!(props.len(), Supported::ALL.len());
        for sup in Supported::ALL {
            assert!(props.iter().any(|p| p.sup == sup), "{sup}");
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Supported::by_name("go"), Ok(Supported::Go));
        assert_eq!(Supported::by_name("TEX"), Ok(Supported::TeX));
        assert!(Supported::by_name("cobol").is_err());
    }

    #[test]
    fn filenames() {
        assert_eq!(Supported::from_filename("a/b/main.go"), Some(Supported::Go));
        assert_eq!(Supported::from_filename("Makefile"), Some(Supported::Makefile));
        assert_eq!(Supported::from_filename("paper.TeX"), Some(Supported::TeX));
        assert_eq!(Supported::from_filename("README"), None);
    }
}
