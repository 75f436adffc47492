use crate::{
    catalog::{Condition, Operator},
    query::TranslateError,
};

///
/// StringMatch
///
/// The regular-expression shapes the catalog's `like` operator can express.
/// A pattern is a literal, optionally wrapped in `.*` on either side. The
/// literal may be quoted as `\Q...\E` or use backslash escapes; a bare `*`
/// at either end also counts as a wildcard.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StringMatch {
    Contains(String),
    EndsWith(String),
    Exact(String),
    StartsWith(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Token {
    Literal(char),
    Wildcard,
}

impl StringMatch {
    pub fn parse(pattern: &str) -> Result<Self, TranslateError> {
        let unsupported = || TranslateError::UnsupportedPattern {
            pattern: pattern.to_string(),
        };

        let body = pattern.strip_prefix('^').unwrap_or(pattern);
        let body = match body.strip_suffix('$') {
            Some(rest) if !rest.ends_with('\\') => rest,
            _ => body,
        };

        let tokens = tokenize(body).ok_or_else(unsupported)?;
        if tokens == [Token::Wildcard] {
            return Ok(Self::Contains(String::new()));
        }

        let leading = tokens.first() == Some(&Token::Wildcard);
        let trailing = tokens.len() > usize::from(leading) && tokens.last() == Some(&Token::Wildcard);
        let inner = &tokens[usize::from(leading)..tokens.len() - usize::from(trailing)];

        let mut literal = String::with_capacity(inner.len());
        for token in inner {
            match token {
                Token::Literal(c) => literal.push(*c),
                Token::Wildcard => return Err(unsupported()),
            }
        }

        Ok(match (leading, trailing) {
            (true, true) => Self::Contains(literal),
            (true, false) => Self::EndsWith(literal),
            (false, true) => Self::StartsWith(literal),
            (false, false) => Self::Exact(literal),
        })
    }

    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Contains(s) | Self::EndsWith(s) | Self::Exact(s) | Self::StartsWith(s) => s,
        }
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        match self {
            Self::Contains(_) => Operator::LikeContains,
            Self::EndsWith(_) => Operator::LikeEndsWith,
            Self::Exact(_) => Operator::Eq,
            Self::StartsWith(_) => Operator::LikeStartsWith,
        }
    }

    /// Condition applying this shape to a catalog field.
    #[must_use]
    pub fn condition(&self, field: &str) -> Condition {
        Condition::new(field, self.operator(), self.literal())
    }

    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Contains(s) => candidate.contains(s.as_str()),
            Self::EndsWith(s) => candidate.ends_with(s.as_str()),
            Self::Exact(s) => candidate == s,
            Self::StartsWith(s) => candidate.starts_with(s.as_str()),
        }
    }
}

/// Split a pattern into literal characters and `.*` wildcards. Any other
/// regex construct yields `None`.
fn tokenize(body: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = body.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let next = *chars.get(i + 1)?;
                if next == 'Q' {
                    // quoted run up to \E or the end of the pattern
                    i += 2;
                    while i < chars.len() && !(chars[i] == '\\' && chars.get(i + 1) == Some(&'E')) {
                        tokens.push(Token::Literal(chars[i]));
                        i += 1;
                    }
                    i += 2;
                    continue;
                }
                if !next.is_ascii_punctuation() {
                    return None;
                }
                tokens.push(Token::Literal(next));
                i += 2;
            }
            '.' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Wildcard);
                i += 2;
            }
            '*' if i == 0 || i == last => {
                tokens.push(Token::Wildcard);
                i += 1;
            }
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' => {
                return None;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }

    Some(tokens)
}
