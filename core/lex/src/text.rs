//! Character classes and small text helpers shared by lexers and completers.

/// Letters include `_`, as in every identifier grammar this engine targets.
#[must_use]
pub fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[must_use]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[must_use]
pub fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || c.is_numeric()
}

/// Last whitespace-separated field of `s`, or `""`.
#[must_use]
pub fn last_field(s: &str) -> &str {
    s.split_whitespace().next_back().unwrap_or("")
}

/// Last field of `s`, further cut at the innermost unclosed bracket and at any
/// character that cannot appear in a dotted name path.
///
/// `fmt.Println(x.Na` yields `x.Na`; `\cite{key` yields `key`.
#[must_use]
pub fn last_scoped_string(s: &str) -> &str {
    let field = last_field(s);
    let mut depth = 0usize;
    for (i, c) in field.char_indices().rev() {
        match c {
            ')' | ']' | '}' => depth += 1,
            '(' | '[' | '{' => {
                if depth == 0 {
                    return &field[i + c.len_utf8()..];
                }
                depth -= 1;
            }
            '.' => {}
            c if is_letter_or_digit(c) => {}
            _ if depth > 0 => {}
            _ => return &field[i + c.len_utf8()..],
        }
    }
    field
}

/// Byte offset of the start of `line` (zero-based) in `src`.
#[must_use]
pub fn line_start_offset(src: &str, line: u32) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    src.match_indices('\n')
        .nth(line as usize - 1)
        .map(|(i, _)| i + 1)
}
