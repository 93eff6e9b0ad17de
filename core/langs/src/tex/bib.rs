//! BibTeX entries for `\cite` completion.
//!
//! Every `.bib` file in the directory of the document is read. Parsed files
//! are cached and re-read only when their modification time changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibEntry {
    /// Entry type, e.g. `article`, lowercased.
    pub kind: String,
    pub key: String,
    /// Field names lowercased, values with outer delimiters removed.
    pub fields: Vec<(String, String)>,
    /// Source text of the whole entry.
    pub text: String,
    /// Zero-based line range, end exclusive.
    pub start_line: u32,
    pub end_line: u32,
}

impl BibEntry {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `Author (Year): Title`, with missing parts left out.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = self.field("author").unwrap_or_default().to_string();
        if let Some(year) = self.field("year") {
            out.push_str(&format!(" ({year})"));
        }
        if let Some(title) = self.field("title") {
            if !out.is_empty() {
                out.push_str(": ");
            }
            out.push_str(title);
        }
        out.trim().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct BibFile {
    pub path: PathBuf,
    pub entries: Vec<BibEntry>,
}

impl BibFile {
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&BibEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Byte index of the delimiter closing the one at `s[0]`.
fn closing(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut prev = '\0';
    for (i, c) in s.char_indices() {
        match c {
            '"' if open == '{' && prev != '\\' && depth == 1 => quoted = !quoted,
            c if c == open && !quoted => depth += 1,
            c if c == close && !quoted => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        prev = c;
    }
    None
}

/// Splits at commas outside braces and quotes.
fn split_fields(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => quoted = !quoted,
            ',' if depth == 0 && !quoted => {
                out.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&body[start..]);
    out
}

fn field_value(raw: &str) -> String {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .or_else(|| raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')))
        .unwrap_or(raw);
    inner.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn line_of(src: &str, offset: usize) -> u32 {
    u32::try_from(src[..offset].matches('\n').count()).unwrap_or(u32::MAX)
}

/// Parses the entries of a BibTeX source. `@comment`, `@string` and
/// `@preamble` blocks are skipped, as is anything malformed.
#[must_use]
pub fn parse_bib(src: &str) -> Vec<BibEntry> {
    let mut entries = Vec::new();
    let mut at = 0;
    while let Some(found) = src[at..].find('@') {
        let start = at + found;
        let rest = &src[start + 1..];
        let kind_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let kind = rest[..kind_len].to_ascii_lowercase();
        let after_kind = rest[kind_len..].trim_start();
        let body_at = src.len() - after_kind.len();
        let close = match after_kind.chars().next() {
            Some('{') => closing(after_kind, '{', '}'),
            Some('(') => closing(after_kind, '(', ')'),
            _ => None,
        };
        let Some(close) = close else {
            at = start + 1;
            continue;
        };
        let end = body_at + close + 1;
        at = end;
        if kind.is_empty() || matches!(kind.as_str(), "comment" | "string" | "preamble") {
            continue;
        }
        let mut parts = split_fields(&after_kind[1..close]).into_iter();
        let key = parts.next().unwrap_or_default().trim().to_string();
        if key.is_empty() {
            continue;
        }
        let fields = parts
            .filter_map(|f| f.split_once('='))
            .map(|(n, v)| (n.trim().to_ascii_lowercase(), field_value(v)))
            .filter(|(n, _)| !n.is_empty())
            .collect();
        entries.push(BibEntry {
            kind,
            key,
            fields,
            text: src[start..end].to_string(),
            start_line: line_of(src, start),
            end_line: line_of(src, end) + 1,
        });
    }
    entries
}

struct Cached {
    modified: SystemTime,
    file: BibFile,
}

/// Parsed `.bib` files by path.
#[derive(Default)]
pub struct BibCache {
    files: Mutex<FxHashMap<PathBuf, Cached>>,
}

impl BibCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bibliography files next to `doc`. Unreadable files are skipped.
    pub fn files_for(&self, doc: &Path) -> Vec<BibFile> {
        let dir = match doc.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|x| x == "bib"))
            .filter_map(|e| self.load(e.path()))
            .collect()
    }

    fn load(&self, path: &Path) -> Option<BibFile> {
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat bibliography");
                return None;
            }
        };
        let mut files = self.files.lock();
        if let Some(cached) = files.get(path).filter(|c| c.modified == modified) {
            return Some(cached.file.clone());
        }
        let src = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read bibliography");
                return None;
            }
        };
        let file = BibFile {
            path: path.to_path_buf(),
            entries: parse_bib(&src),
        };
        debug!(path = %path.display(), entries = file.entries.len(), "bibliography loaded");
        files.insert(
            path.to_path_buf(),
            Cached {
                modified,
                file: file.clone(),
            },
        );
        Some(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIB: &str = r#"@comment{ignored, x = 1}
@article{knuth84,
  author = {Donald E. Knuth},
  title  = "Literate {P}rogramming",
  year   = 1984,
}

@book(lamport94, title = {\LaTeX: A Document
  Preparation System}, author = {Leslie Lamport})
"#;

    #[test]
    fn parses_entries_and_fields() {
        let entries = parse_bib(BIB);
        assert_eq!(entries.len(), 2);
        let k = &entries[0];
        assert_eq!(k.kind, "article");
        assert_eq!(k.key, "knuth84");
        assert_eq!(k.field("title"), Some("Literate {P}rogramming"));
        assert_eq!(k.field("year"), Some("1984"));
        assert_eq!((k.start_line, k.end_line), (1, 6));
        assert_eq!(k.summary(), "Donald E. Knuth (1984): Literate {P}rogramming");
        let l = &entries[1];
        assert_eq!(l.key, "lamport94");
        assert_eq!(l.field("title"), Some(r"\LaTeX: A Document Preparation System"));
    }

    #[test]
    fn unterminated_entry_is_skipped() {
        assert!(parse_bib("@article{broken, title = {x}").is_empty());
    }
}
