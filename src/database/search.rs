//! Web-style search queries for the in-memory backend.
//!
//! Follows the syntax PostgreSQL's `websearch_to_tsquery` accepts: bare words
//! are ANDed, `"quoted text"` is a phrase, a leading `-` negates a word or
//! phrase and `or` separates alternatives. Matching is on whole words,
//! case-insensitively, with English stop words ignored. Words are not stemmed.

/// Common English words the PostgreSQL `english` configuration drops.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "did", "do", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
    "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "other", "our", "out", "over", "own", "s",
    "same", "she", "should", "so", "some", "such", "t", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "you", "your",
];

/// Lowercased words of `text`, split on anything that is not alphanumeric.
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn significant_words(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// One word (or phrase when more than one) that must be present, or absent
/// when negated.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    negated: bool,
    words: Vec<String>,
}

impl Clause {
    fn occurs_in(&self, doc: &[String]) -> bool {
        doc.windows(self.words.len()).any(|window| window == self.words.as_slice())
    }
}

/// A parsed query: alternatives of clauses that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WebQuery {
    alternatives: Vec<Vec<Clause>>,
}

enum Token {
    Or,
    Term { negated: bool, text: String },
}

fn tokenize(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let negated = c == '-';
        if negated {
            chars.next();
        }

        let mut text = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                text.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                text.push(c);
                chars.next();
            }
            if !negated && text.eq_ignore_ascii_case("or") {
                tokens.push(Token::Or);
                continue;
            }
        }

        tokens.push(Token::Term { negated, text });
    }

    tokens
}

impl WebQuery {
    pub(crate) fn parse(query: &str) -> Self {
        let mut alternatives: Vec<Vec<Clause>> = Vec::new();
        let mut current: Vec<Clause> = Vec::new();

        for token in tokenize(query) {
            match token {
                Token::Or => {
                    if !current.is_empty() {
                        alternatives.push(std::mem::take(&mut current));
                    }
                }
                Token::Term { negated, text } => {
                    let words = significant_words(&text);
                    if !words.is_empty() {
                        current.push(Clause { negated, words });
                    }
                }
            }
        }
        if !current.is_empty() {
            alternatives.push(current);
        }

        Self { alternatives }
    }

    /// Whether a document with the given title and body words satisfies the
    /// query. A query with no usable words matches nothing.
    pub(crate) fn matches(&self, title: &[String], content: &[String]) -> bool {
        self.alternatives.iter().any(|clauses| {
            clauses.iter().all(|clause| {
                let present = clause.occurs_in(title) || clause.occurs_in(content);
                present != clause.negated
            })
        })
    }

    /// Relevance: each positive clause scores 2 when in the title and 1 when
    /// in the content.
    pub(crate) fn score(&self, title: &[String], content: &[String]) -> usize {
        self.alternatives
            .iter()
            .flatten()
            .filter(|clause| !clause.negated)
            .map(|clause| {
                let in_title = if clause.occurs_in(title) { 2 } else { 0 };
                let in_content = if clause.occurs_in(content) { 1 } else { 0 };
                in_title + in_content
            })
            .sum()
    }
}
