//! Query text matching for the in-memory provider.
//!
//! Text is split into lowercase alphanumeric tokens. Terms are `shoe`,
//! `title:shoe`, `run*` (prefix) or a quoted phrase. Adjacent terms must all
//! match (`AND` is optional), `OR` separates alternatives of which at least
//! one must match, and parentheses group. Parentheses and quotes must
//! balance and may nest at most [`MAX_NESTING`] levels.

use std::collections::BTreeMap;

use crate::errors::IndexError;

/// Deepest parenthesis nesting a query may use.
pub(crate) const MAX_NESTING: usize = 64;

/// One query term.
#[derive(Debug, Clone, PartialEq)]
struct Term {
    field: Option<String>,
    tokens: Vec<String>,
    prefix: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Term(Term),
    All(Vec<Node>),
    Any(Vec<Node>),
}

/// A parsed query text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextQuery {
    root: Node,
    terms: Vec<Term>,
}

/// Split text into lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// Key under which a promotion is stored for a query string.
pub(crate) fn promotion_key(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

impl TextQuery {
    /// Parse query text.
    pub(crate) fn parse(text: &str) -> Result<Self, IndexError> {
        if text.trim().is_empty() {
            return Err(IndexError::invalid_syntax("empty query"));
        }
        check_balanced(text)?;

        let mut parser = QueryParser {
            words: split_words(text),
            pos: 0,
            depth: 0,
        };
        let root = parser.alternatives()?;
        if parser.pos != parser.words.len() {
            return Err(IndexError::invalid_syntax("unbalanced ')' in query"));
        }
        let root = root.ok_or_else(|| {
            IndexError::invalid_syntax(format!("query {:?} has no searchable terms", text))
        })?;

        let mut terms = Vec::new();
        root.collect_terms(&mut terms);
        Ok(Self { root, terms })
    }

    /// Relevance of a document's fields, or `None` if the query does not match.
    ///
    /// Relevance counts occurrences of the matching terms.
    pub(crate) fn score(&self, fields: &BTreeMap<String, String>) -> Option<f64> {
        self.root.score(fields).map(|total| total as f64)
    }

    /// Wrap matching words of `text` in `<b>` tags.
    pub(crate) fn snippet(&self, field: &str, text: &str) -> String {
        text.split(' ')
            .map(|word| {
                let matched = tokenize(word).any(|token| {
                    self.terms
                        .iter()
                        .filter(|term| term.field.as_deref().map_or(true, |f| f == field))
                        .any(|term| term.matches_token(&token))
                });
                if matched {
                    format!("<b>{}</b>", word)
                } else {
                    word.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Node {
    fn score(&self, fields: &BTreeMap<String, String>) -> Option<usize> {
        match self {
            Node::Term(term) => {
                let occurrences: usize = fields
                    .iter()
                    .filter(|(name, _)| term.field.as_deref().map_or(true, |f| f == name.as_str()))
                    .map(|(_, text)| term.occurrences(text))
                    .sum();
                (occurrences > 0).then_some(occurrences)
            }
            Node::All(children) => children
                .iter()
                .map(|child| child.score(fields))
                .sum::<Option<usize>>(),
            Node::Any(children) => children
                .iter()
                .filter_map(|child| child.score(fields))
                .reduce(|a, b| a + b),
        }
    }

    fn collect_terms(&self, out: &mut Vec<Term>) {
        match self {
            Node::Term(term) => out.push(term.clone()),
            Node::All(children) | Node::Any(children) => {
                for child in children {
                    child.collect_terms(out);
                }
            }
        }
    }

    fn from_parts(mut parts: Vec<Node>, combine: fn(Vec<Node>) -> Node) -> Option<Node> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(combine(parts)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Word {
    Open,
    Close,
    Text(String),
}

struct QueryParser {
    words: Vec<Word>,
    pos: usize,
    depth: usize,
}

impl QueryParser {
    /// `group ('OR' group)*`
    fn alternatives(&mut self) -> Result<Option<Node>, IndexError> {
        let mut parts = Vec::new();
        let mut after_or = false;
        loop {
            let (group, consumed) = self.group()?;
            if !consumed && (after_or || self.at_or()) {
                return Err(IndexError::invalid_syntax("OR needs a term on each side"));
            }
            parts.extend(group);

            if !self.at_or() {
                break;
            }
            self.pos += 1;
            after_or = true;
        }
        Ok(Node::from_parts(parts, Node::Any))
    }

    /// Adjacent terms and parenthesized groups, all of which must match.
    fn group(&mut self) -> Result<(Option<Node>, bool), IndexError> {
        let mut parts = Vec::new();
        let mut consumed = false;
        while let Some(word) = self.words.get(self.pos).cloned() {
            match word {
                Word::Close => break,
                Word::Text(text) if text == "OR" => break,
                Word::Text(text) if text == "AND" => self.pos += 1,
                Word::Text(text) => {
                    self.pos += 1;
                    consumed = true;
                    parts.extend(parse_term(&text)?.map(Node::Term));
                }
                Word::Open => {
                    self.pos += 1;
                    consumed = true;
                    if self.depth >= MAX_NESTING {
                        return Err(IndexError::invalid_syntax("query nested too deeply"));
                    }
                    self.depth += 1;
                    let inner = self.alternatives()?;
                    self.depth -= 1;
                    if self.words.get(self.pos) != Some(&Word::Close) {
                        return Err(IndexError::invalid_syntax("unbalanced '(' in query"));
                    }
                    self.pos += 1;
                    parts.extend(inner);
                }
            }
        }
        Ok((Node::from_parts(parts, Node::All), consumed))
    }

    fn at_or(&self) -> bool {
        matches!(self.words.get(self.pos), Some(Word::Text(text)) if text == "OR")
    }
}

fn parse_term(word: &str) -> Result<Option<Term>, IndexError> {
    let (field, value) = match word.split_once(':') {
        Some((field, value)) => {
            if field.is_empty() || value.is_empty() {
                return Err(IndexError::invalid_syntax(format!(
                    "incomplete field term {:?}",
                    word
                )));
            }
            (Some(field.to_string()), value)
        }
        None => (None, word),
    };

    let (value, prefix) = match value.strip_suffix('*') {
        Some(stem) => (stem, true),
        None => (value, false),
    };
    let tokens: Vec<String> = tokenize(value).collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(Term {
        field,
        tokens,
        prefix,
    }))
}

impl Term {
    fn matches_token(&self, token: &str) -> bool {
        self.tokens.iter().enumerate().any(|(i, wanted)| {
            let is_last = i + 1 == self.tokens.len();
            if self.prefix && is_last {
                token.starts_with(wanted.as_str())
            } else {
                token == wanted
            }
        })
    }

    /// Number of places the term's token sequence occurs in `text`.
    fn occurrences(&self, text: &str) -> usize {
        let tokens: Vec<String> = tokenize(text).collect();
        let len = self.tokens.len();
        if tokens.len() < len {
            return 0;
        }

        (0..=tokens.len() - len)
            .filter(|&start| {
                self.tokens.iter().enumerate().all(|(i, wanted)| {
                    let token = &tokens[start + i];
                    if self.prefix && i + 1 == len {
                        token.starts_with(wanted.as_str())
                    } else {
                        token == wanted
                    }
                })
            })
            .count()
    }
}

/// Split on whitespace and parentheses, keeping quoted phrases whole.
fn split_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let flush = |current: &mut String, words: &mut Vec<Word>| {
        if !current.is_empty() {
            words.push(Word::Text(std::mem::take(current)));
        }
    };

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                if !in_quotes {
                    flush(&mut current, &mut words);
                }
            }
            '(' if !in_quotes => {
                flush(&mut current, &mut words);
                words.push(Word::Open);
            }
            ')' if !in_quotes => {
                flush(&mut current, &mut words);
                words.push(Word::Close);
            }
            c if c.is_whitespace() && !in_quotes => flush(&mut current, &mut words),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut words);
    words
}

fn check_balanced(text: &str) -> Result<(), IndexError> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for c in text.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth < 0 {
                    return Err(IndexError::invalid_syntax("unbalanced ')' in query"));
                }
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(IndexError::invalid_syntax("unterminated quote in query"));
    }
    if depth != 0 {
        return Err(IndexError::invalid_syntax("unbalanced '(' in query"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("Red Shoe, size-42!").collect();
        assert_eq!(tokens, vec!["red", "shoe", "size", "42"]);
    }

    #[test]
    fn test_all_terms_must_match() {
        let doc = fields(&[("title", "Red running shoe")]);

        assert_eq!(TextQuery::parse("shoe").unwrap().score(&doc), Some(1.0));
        assert_eq!(TextQuery::parse("red AND shoe").unwrap().score(&doc), Some(2.0));
        assert_eq!(TextQuery::parse("blue shoe").unwrap().score(&doc), None);
    }

    #[test]
    fn test_or_matches_either_side() {
        let red = fields(&[("text", "red shoe")]);
        let blue = fields(&[("text", "blue shoe")]);
        let green = fields(&[("text", "green shoe")]);
        let query = TextQuery::parse("red OR blue").unwrap();

        assert_eq!(query.score(&red), Some(1.0));
        assert_eq!(query.score(&blue), Some(1.0));
        assert_eq!(query.score(&green), None);
    }

    #[test]
    fn test_or_binds_looser_than_adjacent_terms() {
        let red_boot = fields(&[("text", "red boot")]);
        let blue_shoe = fields(&[("text", "blue shoe")]);

        let query = TextQuery::parse("red shoe OR blue").unwrap();
        assert_eq!(query.score(&red_boot), None);
        assert_eq!(query.score(&blue_shoe), Some(1.0));

        let grouped = TextQuery::parse("(red OR blue) AND shoe").unwrap();
        assert_eq!(grouped.score(&red_boot), None);
        assert_eq!(grouped.score(&blue_shoe), Some(2.0));
    }

    #[test]
    fn test_query_nesting_limit() {
        let shallow = format!("{}shoe{}", "(".repeat(10), ")".repeat(10));
        let doc = fields(&[("text", "shoe")]);
        assert_eq!(TextQuery::parse(&shallow).unwrap().score(&doc), Some(1.0));

        let deep = format!("{}shoe{}", "(".repeat(100_000), ")".repeat(100_000));
        match TextQuery::parse(&deep) {
            Err(IndexError::InvalidSyntax(message)) => assert!(message.contains("too deeply")),
            other => panic!("expected InvalidSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_field_term() {
        let doc = fields(&[("title", "shoe"), ("text", "a boot")]);

        assert!(TextQuery::parse("title:shoe").unwrap().score(&doc).is_some());
        assert!(TextQuery::parse("title:boot").unwrap().score(&doc).is_none());
    }

    #[test]
    fn test_prefix_and_phrase() {
        let doc = fields(&[("text", "trail running shoes")]);

        assert!(TextQuery::parse("run*").unwrap().score(&doc).is_some());
        assert!(TextQuery::parse("\"running shoes\"").unwrap().score(&doc).is_some());
        assert!(TextQuery::parse("\"shoes running\"").unwrap().score(&doc).is_none());
        assert!(TextQuery::parse("text:\"trail running\"").unwrap().score(&doc).is_some());
    }

    #[test]
    fn test_invalid_queries() {
        for text in [
            "", "   ", "(shoe", "shoe)", "\"shoe", "title:", "AND", "!!", "OR shoe", "shoe OR",
            "red OR OR blue", "()",
        ] {
            assert!(
                matches!(TextQuery::parse(text), Err(IndexError::InvalidSyntax(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_snippet_highlights_matches() {
        let query = TextQuery::parse("shoe").unwrap();
        assert_eq!(
            query.snippet("text", "a red shoe for running"),
            "a red <b>shoe</b> for running"
        );
    }

    #[test]
    fn test_promotion_key_normalizes() {
        assert_eq!(promotion_key("  Red   Shoe "), "red shoe");
    }
}
