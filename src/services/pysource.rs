//! Python source lexing for migration files.
//!
//! Covers as much of Python's lexical grammar as locating and rewriting a
//! migration's `dependencies` list needs: names, numbers, string literals
//! (prefixes, triple quotes, escapes), comments, brackets and logical lines.
//! Every token keeps its byte span so that an edit can be spliced into the
//! original text while every other byte stays as written.

use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PySourceError {
    #[error("unterminated string starting at line {line}")]
    UnterminatedString { line: usize },
    #[error("unmatched '{found}' at line {line}")]
    UnmatchedBracket { found: char, line: usize },
    #[error("'{open}' opened at line {line} is never closed")]
    UnclosedBracket { open: char, line: usize },
    #[error("unexpected character {ch:?} at line {line}")]
    UnexpectedChar { ch: char, line: usize },
    #[error("empty element in list at line {line}")]
    EmptyElement { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    Str(StrLit),
    Op,
    Open(char),
    Close(char),
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub value: Option<String>,
    pub quote: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub line: usize,
}

impl Token {
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.span.clone()]
    }

    fn is_op(&self, src: &str, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text(src) == op
    }

    fn is_name(&self, src: &str, name: &str) -> bool {
        self.kind == TokenKind::Name && self.text(src) == name
    }
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, PySourceError> {
    Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        line: 1,
        tokens: Vec::new(),
        brackets: Vec::new(),
    }
    .run()
}

struct Lexer<'s> {
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    brackets: Vec<(char, usize)>,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, PySourceError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\x0c' | b'\r' => self.pos += 1,
                b'\n' => {
                    self.end_logical_line();
                    self.pos += 1;
                    self.line += 1;
                }
                b'#' => {
                    while self.bytes.get(self.pos).is_some_and(|&c| c != b'\n') {
                        self.pos += 1;
                    }
                }
                b'\\' => self.continuation()?,
                b'"' | b'\'' => self.string(self.pos, false, false)?,
                b'0'..=b'9' => self.number(),
                b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                b'(' | b'[' | b'{' => self.open(b as char),
                b')' | b']' | b'}' => self.close(b as char)?,
                _ if is_ident_start(b) => self.name_or_prefixed_string()?,
                _ => self.operator()?,
            }
        }
        if let Some(&(open, line)) = self.brackets.last() {
            return Err(PySourceError::UnclosedBracket { open, line });
        }
        self.end_logical_line();
        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            span: start..self.pos,
            line,
        });
    }

    fn end_logical_line(&mut self) {
        if !self.brackets.is_empty() {
            return;
        }
        if self
            .tokens
            .last()
            .is_some_and(|t| t.kind != TokenKind::Newline)
        {
            self.tokens.push(Token {
                kind: TokenKind::Newline,
                span: self.pos..self.pos,
                line: self.line,
            });
        }
    }

    fn continuation(&mut self) -> Result<(), PySourceError> {
        match (self.peek(1), self.peek(2)) {
            (Some(b'\n'), _) => self.pos += 2,
            (Some(b'\r'), Some(b'\n')) => self.pos += 3,
            _ => {
                return Err(PySourceError::UnexpectedChar {
                    ch: '\\',
                    line: self.line,
                })
            }
        }
        self.line += 1;
        Ok(())
    }

    fn name_or_prefixed_string(&mut self) -> Result<(), PySourceError> {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&c| is_ident_continue(c)) {
            self.pos += 1;
        }
        if matches!(self.peek(0), Some(b'"' | b'\'')) {
            let prefix = self.src[start..self.pos].to_ascii_lowercase();
            if let Some((raw, non_constant)) = string_prefix(&prefix) {
                return self.string(start, raw, non_constant);
            }
        }
        self.push(TokenKind::Name, start, self.line);
        Ok(())
    }

    fn string(&mut self, start: usize, raw: bool, non_constant: bool) -> Result<(), PySourceError> {
        let start_line = self.line;
        let quote = self.bytes[self.pos];
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        let body_start = self.pos + if triple { 3 } else { 1 };
        let mut i = body_start;
        let body_end = loop {
            let Some(&c) = self.bytes.get(i) else {
                return Err(PySourceError::UnterminatedString { line: start_line });
            };
            match c {
                b'\\' => {
                    if self.bytes.get(i + 1) == Some(&b'\n') {
                        self.line += 1;
                    }
                    i += 2;
                    continue;
                }
                b'\n' if !triple => {
                    return Err(PySourceError::UnterminatedString { line: start_line });
                }
                b'\n' => self.line += 1,
                _ if c == quote && !triple => {
                    let end = i;
                    i += 1;
                    break end;
                }
                _ if c == quote
                    && self.bytes.get(i + 1) == Some(&quote)
                    && self.bytes.get(i + 2) == Some(&quote) =>
                {
                    let end = i;
                    i += 3;
                    break end;
                }
                _ => {}
            }
            i += 1;
        };
        self.pos = i;

        let body = &self.src[body_start..body_end];
        let value = if non_constant {
            None
        } else if raw {
            Some(body.to_string())
        } else {
            Some(unescape(body))
        };
        self.push(
            TokenKind::Str(StrLit {
                value,
                quote: quote as char,
            }),
            start,
            start_line,
        );
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        while let Some(&c) = self.bytes.get(self.pos) {
            let exponent_sign = matches!(c, b'+' | b'-')
                && matches!(self.bytes[self.pos - 1], b'e' | b'E')
                && !self.src[start..self.pos].to_ascii_lowercase().starts_with("0x");
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, self.line);
    }

    fn open(&mut self, c: char) {
        let start = self.pos;
        self.pos += 1;
        self.brackets.push((c, self.line));
        self.push(TokenKind::Open(c), start, self.line);
    }

    fn close(&mut self, c: char) -> Result<(), PySourceError> {
        match self.brackets.pop() {
            Some((open, _)) if closing(open) == c => {
                let start = self.pos;
                self.pos += 1;
                self.push(TokenKind::Close(c), start, self.line);
                Ok(())
            }
            _ => Err(PySourceError::UnmatchedBracket {
                found: c,
                line: self.line,
            }),
        }
    }

    fn operator(&mut self) -> Result<(), PySourceError> {
        let start = self.pos;
        let b = self.bytes[start];
        let next = self.peek(1);
        let len = match b {
            b',' | b';' | b'.' | b'~' => 1,
            b'-' if next == Some(b'>') => 2,
            b'+' | b'-' | b'*' | b'/' | b'%' | b'@' | b'&' | b'|' | b'^' | b'<' | b'>' | b'='
            | b'!' | b':' => {
                let doubled = matches!(
                    (b, next),
                    (b'*', Some(b'*')) | (b'/', Some(b'/')) | (b'<', Some(b'<')) | (b'>', Some(b'>'))
                );
                let base = if doubled { 2 } else { 1 };
                if self.bytes.get(start + base) == Some(&b'=') {
                    base + 1
                } else {
                    base
                }
            }
            _ => {
                return Err(PySourceError::UnexpectedChar {
                    ch: self.src[start..].chars().next().unwrap_or('?'),
                    line: self.line,
                })
            }
        };
        self.pos += len;
        self.push(TokenKind::Op, start, self.line);
        Ok(())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn string_prefix(prefix: &str) -> Option<(bool, bool)> {
    match prefix {
        "u" => Some((false, false)),
        "r" => Some((true, false)),
        "b" | "f" | "t" => Some((false, true)),
        "br" | "rb" | "fr" | "rf" | "tr" | "rt" => Some((true, true)),
        _ => None,
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(e) = chars.next() else {
            out.push('\\');
            break;
        };
        match e {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(e),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = e.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(code));
            }
            'x' | 'u' | 'U' => {
                let width = match e {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) if digits.len() == width => out.push(ch),
                    _ => {
                        out.push('\\');
                        out.push(e);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPair {
    pub app: String,
    pub name: String,
    pub name_span: Range<usize>,
    pub quote: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub span: Range<usize>,
    pub literal: Option<LiteralPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyList {
    pub span: Range<usize>,
    pub entries: Vec<DependencyEntry>,
}

impl DependencyList {
    pub fn literal_pairs(&self) -> impl Iterator<Item = &LiteralPair> {
        self.entries.iter().filter_map(|e| e.literal.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSource {
    pub dependencies: Option<DependencyList>,
    pub initial: bool,
}

pub fn parse_migration(src: &str) -> Result<MigrationSource, PySourceError> {
    let tokens = tokenize(src)?;
    let mut parsed = MigrationSource::default();
    for stmt in simple_statements(src, &tokens) {
        if parsed.dependencies.is_none() {
            if let Some(value) = assigned_value(src, stmt, "dependencies") {
                if matches!(value.first().map(|t| &t.kind), Some(TokenKind::Open('[' | '('))) {
                    parsed.dependencies = Some(parse_list(src, value)?);
                }
            }
        }
        if let Some(value) = assigned_value(src, stmt, "initial") {
            parsed.initial = value.len() == 1 && value[0].is_name(src, "True");
        }
    }
    Ok(parsed)
}

const COMPOUND_KEYWORDS: [&str; 12] = [
    "async", "class", "def", "elif", "else", "except", "finally", "for", "if", "try", "while",
    "with",
];

fn simple_statements<'t>(src: &str, tokens: &'t [Token]) -> Vec<&'t [Token]> {
    let mut statements = Vec::new();
    for line in tokens.split(|t| t.kind == TokenKind::Newline) {
        let mut line = line;
        let header = line.first().is_some_and(|t| {
            t.kind == TokenKind::Name && COMPOUND_KEYWORDS.iter().any(|k| *k == t.text(src))
        });
        if header {
            let Some(colon) = top_level_ops(src, line, ":").first().copied() else {
                continue;
            };
            line = &line[colon + 1..];
        }
        let mut start = 0;
        for semi in top_level_ops(src, line, ";") {
            statements.push(&line[start..semi]);
            start = semi + 1;
        }
        statements.push(&line[start..]);
    }
    statements.retain(|stmt| !stmt.is_empty());
    statements
}

fn top_level_ops(src: &str, tokens: &[Token], op: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        match t.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 && t.is_op(src, op) => found.push(i),
            _ => {}
        }
    }
    found
}

fn strip_grouping<'t>(src: &str, mut tokens: &'t [Token]) -> &'t [Token] {
    while tokens.len() >= 2
        && tokens[0].kind == TokenKind::Open('(')
        && matching_close(tokens) == Some(tokens.len() - 1)
    {
        let inner = &tokens[1..tokens.len() - 1];
        if inner.is_empty() || !top_level_ops(src, inner, ",").is_empty() {
            break;
        }
        tokens = inner;
    }
    tokens
}

fn assigned_value<'t>(src: &str, line: &'t [Token], target: &str) -> Option<&'t [Token]> {
    let (first, rest) = line.split_first()?;
    if !first.is_name(src, target) {
        return None;
    }
    let second = rest.first()?;
    if second.is_op(src, "=") {
        return Some(&rest[1..]);
    }
    if !second.is_op(src, ":") {
        return None;
    }
    let mut depth = 0usize;
    for (i, t) in rest.iter().enumerate().skip(1) {
        match t.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 && t.is_op(src, "=") => return Some(&rest[i + 1..]),
            _ => {}
        }
    }
    None
}

fn matching_close(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        match t.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_list(src: &str, tokens: &[Token]) -> Result<DependencyList, PySourceError> {
    let close = matching_close(tokens).ok_or(PySourceError::UnclosedBracket {
        open: '[',
        line: tokens[0].line,
    })?;
    let entries = split_top_level(src, &tokens[1..close])?
        .into_iter()
        .map(|group| DependencyEntry {
            span: group[0].span.start..group[group.len() - 1].span.end,
            literal: literal_pair(src, group),
        })
        .collect();
    Ok(DependencyList {
        span: tokens[0].span.start..tokens[close].span.end,
        entries,
    })
}

fn split_top_level<'t>(src: &str, tokens: &'t [Token]) -> Result<Vec<&'t [Token]>, PySourceError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        match t.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 && t.is_op(src, ",") => {
                if i == start {
                    return Err(PySourceError::EmptyElement { line: t.line });
                }
                groups.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        groups.push(&tokens[start..]);
    }
    Ok(groups)
}

fn literal_pair(src: &str, group: &[Token]) -> Option<LiteralPair> {
    let group = strip_grouping(src, group);
    let TokenKind::Open(open @ ('(' | '[')) = group.first()?.kind else {
        return None;
    };
    if group.len() < 2 || matching_close(group)? != group.len() - 1 {
        return None;
    }
    if group[group.len() - 1].kind != TokenKind::Close(closing(open)) {
        return None;
    }
    let elements = split_top_level(src, &group[1..group.len() - 1]).ok()?;
    let [app, name] = elements.as_slice() else {
        return None;
    };
    let (app, name) = (strip_grouping(src, app), strip_grouping(src, name));
    let (app_value, _) = string_constant(app)?;
    let (name_value, quote) = string_constant(name)?;
    Some(LiteralPair {
        app: app_value,
        name: name_value,
        name_span: name[0].span.start..name[name.len() - 1].span.end,
        quote,
    })
}

fn string_constant(tokens: &[Token]) -> Option<(String, char)> {
    let mut value = String::new();
    let mut quote = None;
    for t in tokens {
        let TokenKind::Str(lit) = &t.kind else {
            return None;
        };
        value.push_str(lit.value.as_deref()?);
        quote.get_or_insert(lit.quote);
    }
    Some((value, quote?))
}

pub fn quote_str(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ if c == quote => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn splice(src: &str, span: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(src.len() + replacement.len());
    out.push_str(&src[..span.start]);
    out.push_str(replacement);
    out.push_str(&src[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIGRATION: &str = "from django.db import migrations\n\n\nclass Migration(migrations.Migration):\n    initial = True\n\n    dependencies = [\n        ('testapp', '0001_initial'),  # own app\n        (\"otherapp\", \"0001_initial\"),\n        migrations.swappable_dependency(settings.AUTH_USER_MODEL),\n    ]\n\n    operations = []\n";

    #[test]
    fn finds_entries_and_classifies_literals() {
        let parsed = parse_migration(MIGRATION).unwrap();
        assert!(parsed.initial);
        let deps = parsed.dependencies.unwrap();
        assert_eq!(deps.entries.len(), 3);
        let pairs: Vec<_> = deps
            .literal_pairs()
            .map(|p| (p.app.as_str(), p.name.as_str(), p.quote))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("testapp", "0001_initial", '\''),
                ("otherapp", "0001_initial", '"')
            ]
        );
        let dynamic = &deps.entries[2];
        assert!(dynamic.literal.is_none());
        assert_eq!(
            &MIGRATION[dynamic.span.clone()],
            "migrations.swappable_dependency(settings.AUTH_USER_MODEL)"
        );
        assert!(MIGRATION[deps.span.clone()].starts_with('['));
        assert!(MIGRATION[deps.span.clone()].ends_with(']'));
    }

    #[test]
    fn ignores_brackets_inside_strings_and_comments() {
        let src = "doc = \"\"\"dependencies = [\n(\"\"\"\n# dependencies = [(]\nclass Migration:\n    dependencies = [('a', 'b]')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        let pair = deps.literal_pairs().next().unwrap();
        assert_eq!(pair.app, "a");
        assert_eq!(pair.name, "b]");
    }

    #[test]
    fn accepts_annotated_assignment_and_list_entries() {
        let src = "class Migration:\n    dependencies: list[tuple[str, str]] = [\n        [\"shop\", \"0003_x\"],\n    ]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        let pair = deps.literal_pairs().next().unwrap();
        assert_eq!((pair.app.as_str(), pair.name.as_str()), ("shop", "0003_x"));
    }

    #[test]
    fn implicit_concatenation_is_one_constant() {
        let src = "dependencies = [('shop', '0002_' 'long_name')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        let pair = deps.literal_pairs().next().unwrap();
        assert_eq!(pair.name, "0002_long_name");
        assert_eq!(&src[pair.name_span.clone()], "'0002_' 'long_name'");
    }

    #[test]
    fn bytes_and_fstrings_are_not_literals() {
        let src = "dependencies = [(b'shop', '0001'), (f'{app}', '0001'), ('shop',), ('a', 'b', 'c')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        assert_eq!(deps.entries.len(), 4);
        assert_eq!(deps.literal_pairs().count(), 0);
    }

    #[test]
    fn escapes_are_decoded() {
        let src = "dependencies = [('sh\\x6fp', '0001_\\u00e9')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        let pair = deps.literal_pairs().next().unwrap();
        assert_eq!(pair.app, "shop");
        assert_eq!(pair.name, "0001_\u{e9}");
    }

    #[test]
    fn one_line_class_body_and_semicolons() {
        let src = "class Migration(migrations.Migration): dependencies = [('testapp', '0001_initial')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        assert_eq!(deps.literal_pairs().next().unwrap().name, "0001_initial");

        let src = "x = 1; initial = True; dependencies = [('testapp', '0002_a')]; operations = []\n";
        let parsed = parse_migration(src).unwrap();
        assert!(parsed.initial);
        let deps = parsed.dependencies.unwrap();
        assert_eq!(deps.entries.len(), 1);
        assert_eq!(&src[deps.span.clone()], "[('testapp', '0002_a')]");
    }

    #[test]
    fn class_header_alone_is_not_a_statement() {
        let src = "class Migration(migrations.Migration):\n    dependencies = [('a', 'b')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        assert_eq!(deps.literal_pairs().count(), 1);
    }

    #[test]
    fn grouping_parentheses_are_not_tuples() {
        let src = "dependencies = [(('testapp'), ('0001_' 'initial')), ((\"shop\", \"0002_x\")), (('solo',), 'x')]\n";
        let deps = parse_migration(src).unwrap().dependencies.unwrap();
        let pairs: Vec<_> = deps
            .literal_pairs()
            .map(|p| (p.app.as_str(), p.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![("testapp", "0001_initial"), ("shop", "0002_x")]);
        let first = deps.literal_pairs().next().unwrap();
        assert_eq!(&src[first.name_span.clone()], "'0001_' 'initial'");
    }

    #[test]
    fn missing_assignment_is_none() {
        let src = "class Migration:\n    operations = []\n    dependencies_extra = [('a', 'b')]\n";
        assert_eq!(parse_migration(src).unwrap().dependencies, None);
    }

    #[test]
    fn comparison_is_not_an_assignment() {
        let src = "dependencies == [('a', 'b')]\n";
        assert_eq!(parse_migration(src).unwrap().dependencies, None);
    }

    #[test]
    fn unmatched_bracket_reports_line() {
        let src = "class Migration:\n\n    operations = []\n    dependencies = [(]\n";
        assert_eq!(
            parse_migration(src),
            Err(PySourceError::UnmatchedBracket {
                found: ']',
                line: 4
            })
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let src = "dependencies = [('a', 'b)]\n";
        assert_eq!(
            tokenize(src),
            Err(PySourceError::UnterminatedString { line: 1 })
        );
    }

    #[test]
    fn empty_element_is_an_error() {
        let src = "dependencies = [('a', 'b'),, ('c', 'd')]\n";
        assert_eq!(
            parse_migration(src),
            Err(PySourceError::EmptyElement { line: 1 })
        );
    }

    #[test]
    fn newlines_inside_brackets_do_not_end_the_line() {
        let tokens = tokenize("x = [\n  1,\n  2,\n]\ny = 3\n").unwrap();
        let newlines = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn quote_str_escapes_the_quote_char() {
        assert_eq!(quote_str("it's", '\''), "'it\\'s'");
        assert_eq!(quote_str("plain", '"'), "\"plain\"");
    }

    #[test]
    fn splice_keeps_surrounding_text() {
        assert_eq!(splice("abc'old'def", 3..8, "'new'"), "abc'new'def");
    }
}
