use nu_ansi_term::{Color, Style};
use reedline::{Completer, Highlighter, Span, StyledText, Suggestion};

/// T-SQL keywords offered for completion and highlighted at the prompt
pub const SQL_KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "TOP",
    "DISTINCT",
    "JOIN",
    "INNER",
    "LEFT",
    "RIGHT",
    "OUTER",
    "CROSS",
    "APPLY",
    "ON",
    "GROUP",
    "BY",
    "ORDER",
    "HAVING",
    "ASC",
    "DESC",
    "OFFSET",
    "FETCH",
    "ROWS",
    "ONLY",
    "AS",
    "UNION",
    "ALL",
    "EXCEPT",
    "INTERSECT",
    "INSERT",
    "INTO",
    "VALUES",
    "UPDATE",
    "SET",
    "DELETE",
    "MERGE",
    "OUTPUT",
    "CREATE",
    "ALTER",
    "DROP",
    "TRUNCATE",
    "TABLE",
    "VIEW",
    "INDEX",
    "PROCEDURE",
    "FUNCTION",
    "EXEC",
    "EXECUTE",
    "DECLARE",
    "USE",
    "GO",
    "AND",
    "OR",
    "NOT",
    "IN",
    "EXISTS",
    "BETWEEN",
    "LIKE",
    "IS",
    "NULL",
    "CASE",
    "WHEN",
    "THEN",
    "ELSE",
    "END",
    "COUNT",
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "CAST",
    "CONVERT",
    "COALESCE",
    "ISNULL",
    "GETDATE",
    "NOLOCK",
    "WITH",
    "INFORMATION_SCHEMA",
    "TABLES",
    "COLUMNS",
    "sys.databases",
    "sys.tables",
    "sys.columns",
    "sys.objects",
];

/// Minimum prefix length before suggestions are offered.
const MIN_PREFIX_LEN: usize = 1;

/// Case-insensitive keyword completer for the prompt.
#[derive(Debug, Default, Clone)]
pub struct SqlCompleter;

impl SqlCompleter {
    pub fn new() -> Self {
        SqlCompleter
    }

    /// Returns the start of the word under the cursor and the matching keywords.
    pub fn complete_word(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let pos = pos.min(line.len());
        let before = &line[..pos];
        let start = before
            .rfind(|c: char| !is_word_char(c))
            .map(|i| i + before[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let prefix = &before[start..];
        (start, filter_keywords(SQL_KEYWORDS, prefix))
    }
}

impl Completer for SqlCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let (start, matches) = self.complete_word(line, pos);
        matches
            .into_iter()
            .map(|value| Suggestion {
                value,
                span: Span::new(start, pos),
                append_whitespace: true,
                ..Default::default()
            })
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Keywords starting with `prefix`, ignoring case, in list order.
fn filter_keywords(keywords: &[&str], prefix: &str) -> Vec<String> {
    if prefix.chars().count() < MIN_PREFIX_LEN {
        return Vec::new();
    }
    let prefix = prefix.to_uppercase();
    keywords
        .iter()
        .filter(|kw| kw.to_uppercase().starts_with(&prefix))
        .map(|kw| kw.to_string())
        .collect()
}

fn is_keyword(word: &str) -> bool {
    SQL_KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}

/// Colours every keyword in the buffer as it is typed; string literals are
/// left alone even when they contain keywords.
#[derive(Debug, Clone)]
pub struct SqlHighlighter {
    keyword: Style,
    literal: Style,
}

impl Default for SqlHighlighter {
    fn default() -> Self {
        SqlHighlighter {
            keyword: Style::new().fg(Color::Blue).bold(),
            literal: Style::new().fg(Color::Green),
        }
    }
}

impl SqlHighlighter {
    pub fn new() -> Self {
        SqlHighlighter::default()
    }

    /// `sys.databases` is a keyword as a whole; otherwise each dotted part
    /// is checked on its own (`mydb.INFORMATION_SCHEMA.tables`).
    fn push_word(&self, styled: &mut StyledText, word: &str) {
        if is_keyword(word) {
            styled.push((self.keyword, word.to_string()));
            return;
        }
        for (i, part) in word.split('.').enumerate() {
            if i > 0 {
                styled.push((Style::new(), ".".to_string()));
            }
            if part.is_empty() {
                continue;
            }
            let style = if is_keyword(part) {
                self.keyword
            } else {
                Style::new()
            };
            styled.push((style, part.to_string()));
        }
    }
}

impl Highlighter for SqlHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let mut rest = line;
        while let Some(first) = rest.chars().next() {
            let len = if first == '\'' {
                string_literal_len(rest)
            } else if is_word_char(first) {
                rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len())
            } else {
                rest.find(|c: char| is_word_char(c) || c == '\'')
                    .unwrap_or(rest.len())
            };
            let (token, tail) = rest.split_at(len);
            if first == '\'' {
                styled.push((self.literal, token.to_string()));
            } else if is_word_char(first) {
                self.push_word(&mut styled, token);
            } else {
                styled.push((Style::new(), token.to_string()));
            }
            rest = tail;
        }
        styled
    }
}

/// Length of the quoted literal at the start of `text`, up to its closing
/// quote (`''` is an escaped quote) or the end of the buffer.
fn string_literal_len(text: &str) -> usize {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
            } else {
                return i + 1;
            }
        }
    }
    text.len()
}
