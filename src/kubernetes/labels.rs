// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Kubernetes label selectors
//!
//! A selector is a conjunction of requirements evaluated against an object's
//! labels. The string form follows the Kubernetes API conventions:
//!
//! - Equality: `env=prod`, `env==prod`, `env!=prod`
//! - Set membership: `tier in (web,api)`, `tier notin (cache)`
//! - Existence: `app`, `!legacy`
//! - Numeric comparison: `replicas>2`, `replicas<10`
//!
//! Requirements are comma-separated and must all hold for a match.
//! An empty string selects everything.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of a label name (the part after an optional prefix)
const MAX_NAME_LENGTH: usize = 63;

/// Maximum length of a label key prefix (a DNS subdomain)
const MAX_PREFIX_LENGTH: usize = 253;

/// Maximum length of a label value
const MAX_VALUE_LENGTH: usize = 63;

/// Errors produced while building or parsing a selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("invalid label key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid label value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("invalid requirement for key {key:?}: {reason}")]
    InvalidRequirement { key: String, reason: String },

    #[error("unsupported selector operator {0:?}")]
    UnsupportedOperator(String),

    #[error("unable to parse selector {input:?}: {reason}")]
    Syntax { input: String, reason: String },
}

/// Operator of a single selector requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `key=value` or `key==value`
    Equals,
    /// `key!=value`
    NotEquals,
    /// `key in (v1,v2)`
    In,
    /// `key notin (v1,v2)`
    NotIn,
    /// `key`
    Exists,
    /// `!key`
    DoesNotExist,
    /// `key>N`
    GreaterThan,
    /// `key<N`
    LessThan,
}

impl Operator {
    /// Parse the operator names used by `LabelSelectorRequirement`
    fn from_expression(op: &str) -> Result<Self, SelectorError> {
        match op {
            "In" => Ok(Operator::In),
            "NotIn" => Ok(Operator::NotIn),
            "Exists" => Ok(Operator::Exists),
            "DoesNotExist" => Ok(Operator::DoesNotExist),
            other => Err(SelectorError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// A single `key <op> values` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    /// Build a validated requirement
    ///
    /// - `In`/`NotIn` need at least one value
    /// - `Equals`/`NotEquals` need exactly one value
    /// - `Exists`/`DoesNotExist` take no values
    /// - `GreaterThan`/`LessThan` need exactly one integer value
    pub fn new<I, V>(key: &str, operator: Operator, values: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        validate_key(key)?;
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();

        let invalid = |reason: &str| SelectorError::InvalidRequirement {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        match operator {
            Operator::In | Operator::NotIn => {
                if values.is_empty() {
                    return Err(invalid("for 'in', 'notin' operators, values set can't be empty"));
                }
            }
            Operator::Equals | Operator::NotEquals => {
                if values.len() != 1 {
                    return Err(invalid("exact-match compatibility requires one single value"));
                }
            }
            Operator::Exists | Operator::DoesNotExist => {
                if !values.is_empty() {
                    return Err(invalid("values set must be empty for exists and does not exist"));
                }
            }
            Operator::GreaterThan | Operator::LessThan => {
                if values.len() != 1 {
                    return Err(invalid("for 'Gt', 'Lt' operators, exactly one value is required"));
                }
                for value in &values {
                    if value.parse::<i64>().is_err() {
                        return Err(invalid("for 'Gt', 'Lt' operators, the value must be an integer"));
                    }
                }
            }
        }

        for value in &values {
            validate_value(value)?;
        }

        Ok(Self {
            key: key.to_string(),
            operator,
            values,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Check whether a label set satisfies this requirement
    ///
    /// `NotEquals` and `NotIn` hold for objects that lack the key entirely.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => value.is_some_and(|v| self.values.contains(v)),
            Operator::NotEquals | Operator::NotIn => value.is_none_or(|v| !self.values.contains(v)),
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
            Operator::GreaterThan | Operator::LessThan => {
                let Some(actual) = value.and_then(|v| v.parse::<i64>().ok()) else {
                    return false;
                };
                self.values
                    .iter()
                    .filter_map(|v| v.parse::<i64>().ok())
                    .all(|bound| match self.operator {
                        Operator::GreaterThan => actual > bound,
                        _ => actual < bound,
                    })
            }
        }
    }

    fn joined_values(&self) -> String {
        self.values.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.joined_values()),
            Operator::NotEquals => write!(f, "{}!={}", self.key, self.joined_values()),
            Operator::In => write!(f, "{} in ({})", self.key, self.joined_values()),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, self.joined_values()),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::GreaterThan => write!(f, "{}>{}", self.key, self.joined_values()),
            Operator::LessThan => write!(f, "{}<{}", self.key, self.joined_values()),
        }
    }
}

/// A conjunction of label requirements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    requirements: Vec<Requirement>,
    matches_nothing: bool,
}

impl Selector {
    /// Selector that matches every object
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector that matches no object
    pub fn nothing() -> Self {
        Self {
            requirements: Vec::new(),
            matches_nothing: true,
        }
    }

    /// Equality selector built from a label set, e.g. `{env: prod}` -> `env=prod`
    ///
    /// Keys and values are not validated.
    pub fn from_labels<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let requirements = labels
            .into_iter()
            .map(|(k, v)| Requirement {
                key: k.into(),
                operator: Operator::Equals,
                values: BTreeSet::from([v.into()]),
            })
            .collect();
        Self::from_requirements(requirements)
    }

    /// Convert a `metav1.LabelSelector`
    ///
    /// `None` selects nothing, an empty selector selects everything.
    pub fn from_label_selector(selector: Option<&LabelSelector>) -> Result<Self, SelectorError> {
        match selector {
            Some(selector) => Self::try_from(selector),
            None => Ok(Self::nothing()),
        }
    }

    /// Parse the string form of a selector
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let tokens = Lexer::new(input).tokenize();
        let requirements = Parser::new(input, tokens).parse()?;
        Ok(Self::from_requirements(requirements))
    }

    /// Add a requirement, keeping requirements sorted by key
    pub fn add(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self.requirements.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// True for the select-everything selector
    pub fn is_everything(&self) -> bool {
        !self.matches_nothing && self.requirements.is_empty()
    }

    /// Check whether a label set satisfies every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        if self.matches_nothing {
            return false;
        }
        self.requirements.iter().all(|r| r.matches(labels))
    }

    fn from_requirements(mut requirements: Vec<Requirement>) -> Self {
        requirements.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            requirements,
            matches_nothing: false,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&LabelSelector> for Selector {
    type Error = SelectorError;

    fn try_from(selector: &LabelSelector) -> Result<Self, Self::Error> {
        let mut requirements = Vec::new();

        if let Some(match_labels) = &selector.match_labels {
            for (key, value) in match_labels {
                requirements.push(Requirement::new(key, Operator::Equals, [value.as_str()])?);
            }
        }

        if let Some(expressions) = &selector.match_expressions {
            for expression in expressions {
                let operator = Operator::from_expression(&expression.operator)?;
                let values = expression.values.clone().unwrap_or_default();
                requirements.push(Requirement::new(&expression.key, operator, values)?);
            }
        }

        Ok(Self::from_requirements(requirements))
    }
}

/// Validate a label key: an optional DNS subdomain prefix and a name
fn validate_key(key: &str) -> Result<(), SelectorError> {
    let invalid = |reason: String| SelectorError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            return Err(invalid("prefix part must be non-empty".to_string()));
        }
        if prefix.len() > MAX_PREFIX_LENGTH {
            return Err(invalid(format!(
                "prefix part must be no more than {} characters",
                MAX_PREFIX_LENGTH
            )));
        }
        if !is_dns_subdomain(prefix) {
            return Err(invalid(
                "prefix part must be a lowercase RFC 1123 subdomain".to_string(),
            ));
        }
    }

    if name.is_empty() {
        return Err(invalid("name part must be non-empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "name part must be no more than {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !is_label_name(name) {
        return Err(invalid(
            "name part must consist of alphanumeric characters, '-', '_' or '.', \
             and must start and end with an alphanumeric character"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate a label value: empty, or a name of at most 63 characters
fn validate_value(value: &str) -> Result<(), SelectorError> {
    if value.len() > MAX_VALUE_LENGTH {
        return Err(SelectorError::InvalidValue {
            value: value.to_string(),
            reason: format!("must be no more than {} characters", MAX_VALUE_LENGTH),
        });
    }
    if !value.is_empty() && !is_label_name(value) {
        return Err(SelectorError::InvalidValue {
            value: value.to_string(),
            reason: "must consist of alphanumeric characters, '-', '_' or '.', \
                     and must start and end with an alphanumeric character"
                .to_string(),
        });
    }
    Ok(())
}

/// `[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?`
fn is_label_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Lowercase RFC 1123 subdomain: dot-separated labels of `[a-z0-9]([-a-z0-9]*[a-z0-9])?`
fn is_dns_subdomain(s: &str) -> bool {
    s.split('.').all(|label| {
        let bytes = label.as_bytes();
        let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
            return false;
        };
        let lower_alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
        lower_alnum(first)
            && lower_alnum(last)
            && bytes.iter().all(|b| lower_alnum(b) || *b == b'-')
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    /// `!` not followed by `=`
    Bang,
    Equals,
    DoubleEquals,
    NotEquals,
    In,
    NotIn,
    OpenParen,
    CloseParen,
    Comma,
    Greater,
    Less,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Identifier(s) => format!("'{}'", s),
            Token::Bang => "'!'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::DoubleEquals => "'=='".to_string(),
            Token::NotEquals => "'!='".to_string(),
            Token::In => "'in'".to_string(),
            Token::NotIn => "'notin'".to_string(),
            Token::OpenParen => "'('".to_string(),
            Token::CloseParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Greater => "'>'".to_string(),
            Token::Less => "'<'".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '=' | '!' | '(' | ')' | ',' | '>' | '<')
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = if is_special(c) {
                self.chars.next();
                match c {
                    '=' if self.chars.next_if_eq(&'=').is_some() => Token::DoubleEquals,
                    '=' => Token::Equals,
                    '!' if self.chars.next_if_eq(&'=').is_some() => Token::NotEquals,
                    '!' => Token::Bang,
                    '(' => Token::OpenParen,
                    ')' => Token::CloseParen,
                    ',' => Token::Comma,
                    '>' => Token::Greater,
                    _ => Token::Less,
                }
            } else {
                let mut ident = String::new();
                while let Some(c) = self
                    .chars
                    .next_if(|c| !c.is_whitespace() && !is_special(*c))
                {
                    ident.push(c);
                }
                match ident.as_str() {
                    "in" => Token::In,
                    "notin" => Token::NotIn,
                    _ => Token::Identifier(ident),
                }
            };
            tokens.push(token);
        }
        tokens.push(Token::End);
        tokens
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::End)
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn syntax_error(&self, reason: String) -> SelectorError {
        SelectorError::Syntax {
            input: self.input.to_string(),
            reason,
        }
    }

    fn parse(&mut self) -> Result<Vec<Requirement>, SelectorError> {
        let mut requirements = Vec::new();
        if *self.peek() == Token::End {
            return Ok(requirements);
        }
        loop {
            match self.peek() {
                Token::Identifier(_) | Token::Bang => {
                    requirements.push(self.parse_requirement()?);
                    match self.next() {
                        Token::End => return Ok(requirements),
                        Token::Comma => {
                            if !matches!(self.peek(), Token::Identifier(_) | Token::Bang) {
                                return Err(self.syntax_error(format!(
                                    "found {}, expected: identifier after ','",
                                    self.peek().describe()
                                )));
                            }
                        }
                        other => {
                            return Err(self.syntax_error(format!(
                                "found {}, expected: ',' or end of input",
                                other.describe()
                            )));
                        }
                    }
                }
                other => {
                    return Err(self.syntax_error(format!(
                        "found {}, expected: !, identifier, or end of input",
                        other.describe()
                    )));
                }
            }
        }
    }

    fn parse_requirement(&mut self) -> Result<Requirement, SelectorError> {
        let (key, inferred) = self.parse_key_and_infer_operator()?;
        if let Some(operator) = inferred {
            return Requirement::new(&key, operator, Vec::<String>::new());
        }

        let operator = self.parse_operator()?;
        let values = match operator {
            Operator::In | Operator::NotIn => self.parse_value_list()?,
            _ => vec![self.parse_single_value()?],
        };
        Requirement::new(&key, operator, values)
    }

    /// Returns the key and, for existence checks, the operator
    fn parse_key_and_infer_operator(&mut self) -> Result<(String, Option<Operator>), SelectorError> {
        let negated = if *self.peek() == Token::Bang {
            self.next();
            true
        } else {
            false
        };

        let key = match self.next() {
            Token::Identifier(key) => key,
            other => {
                return Err(self.syntax_error(format!(
                    "found {}, expected: identifier",
                    other.describe()
                )));
            }
        };
        validate_key(&key)?;

        if negated {
            return Ok((key, Some(Operator::DoesNotExist)));
        }
        if matches!(self.peek(), Token::End | Token::Comma) {
            return Ok((key, Some(Operator::Exists)));
        }
        Ok((key, None))
    }

    fn parse_operator(&mut self) -> Result<Operator, SelectorError> {
        match self.next() {
            Token::Equals | Token::DoubleEquals => Ok(Operator::Equals),
            Token::NotEquals => Ok(Operator::NotEquals),
            Token::In => Ok(Operator::In),
            Token::NotIn => Ok(Operator::NotIn),
            Token::Greater => Ok(Operator::GreaterThan),
            Token::Less => Ok(Operator::LessThan),
            other => Err(self.syntax_error(format!(
                "found {}, expected: =, !=, ==, in, notin, >, <",
                other.describe()
            ))),
        }
    }

    /// Value after `=`, `!=`, `>` or `<`; a missing value is the empty string
    fn parse_single_value(&mut self) -> Result<String, SelectorError> {
        if matches!(self.peek(), Token::End | Token::Comma) {
            return Ok(String::new());
        }
        match self.next() {
            Token::Identifier(value) => Ok(value),
            // `in` and `notin` are valid label values
            Token::In => Ok("in".to_string()),
            Token::NotIn => Ok("notin".to_string()),
            other => Err(self.syntax_error(format!(
                "found {}, expected: identifier",
                other.describe()
            ))),
        }
    }

    /// `( v1, v2, ... )`, where empty slots are empty-string values
    fn parse_value_list(&mut self) -> Result<Vec<String>, SelectorError> {
        match self.next() {
            Token::OpenParen => {}
            other => {
                return Err(self.syntax_error(format!(
                    "found {}, expected: '('",
                    other.describe()
                )));
            }
        }

        let mut values = Vec::new();
        if *self.peek() == Token::CloseParen {
            self.next();
            return Ok(values);
        }

        loop {
            match self.next() {
                Token::Comma => values.push(String::new()),
                Token::CloseParen => {
                    values.push(String::new());
                    return Ok(values);
                }
                token => {
                    let value = match token {
                        Token::Identifier(value) => value,
                        // `in` and `notin` are valid label values
                        Token::In => "in".to_string(),
                        Token::NotIn => "notin".to_string(),
                        other => {
                            return Err(self.syntax_error(format!(
                                "found {}, expected: ',', ')' or identifier",
                                other.describe()
                            )));
                        }
                    };
                    values.push(value);
                    match self.next() {
                        Token::Comma => continue,
                        Token::CloseParen => return Ok(values),
                        other => {
                            return Err(self.syntax_error(format!(
                                "found {}, expected: ',' or ')'",
                                other.describe()
                            )));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelectorRequirement;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_everything_and_nothing() {
        let set = labels(&[("env", "prod")]);
        assert!(Selector::everything().matches(&set));
        assert!(Selector::everything().matches(&BTreeMap::new()));
        assert!(!Selector::nothing().matches(&set));
        assert!(!Selector::nothing().matches(&BTreeMap::new()));
        assert!(Selector::everything().is_everything());
        assert!(!Selector::nothing().is_everything());
    }

    #[test]
    fn test_parse_empty_selects_everything() {
        let selector = Selector::parse("").unwrap();
        assert!(selector.is_everything());
        let selector = Selector::parse("   ").unwrap();
        assert!(selector.is_everything());
    }

    #[test]
    fn test_parse_equality() {
        let selector = Selector::parse("env=prod").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&BTreeMap::new()));

        let double = Selector::parse("env==prod").unwrap();
        assert_eq!(selector, double);
    }

    #[test]
    fn test_parse_not_equals_matches_missing_key() {
        let selector = Selector::parse("env!=prod").unwrap();
        assert!(!selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "dev")])));
        assert!(selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_parse_set_operators() {
        let selector = Selector::parse("tier in (web, api)").unwrap();
        assert!(selector.matches(&labels(&[("tier", "web")])));
        assert!(selector.matches(&labels(&[("tier", "api")])));
        assert!(!selector.matches(&labels(&[("tier", "cache")])));
        assert!(!selector.matches(&BTreeMap::new()));

        let selector = Selector::parse("tier notin (cache)").unwrap();
        assert!(selector.matches(&labels(&[("tier", "web")])));
        assert!(!selector.matches(&labels(&[("tier", "cache")])));
        assert!(selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_parse_existence() {
        let selector = Selector::parse("app,!legacy").unwrap();
        assert!(selector.matches(&labels(&[("app", "x")])));
        assert!(!selector.matches(&labels(&[("app", "x"), ("legacy", "true")])));
        assert!(!selector.matches(&labels(&[("other", "x")])));
    }

    #[test]
    fn test_parse_numeric_comparison() {
        let selector = Selector::parse("replicas>2").unwrap();
        assert!(selector.matches(&labels(&[("replicas", "3")])));
        assert!(!selector.matches(&labels(&[("replicas", "2")])));
        assert!(!selector.matches(&labels(&[("replicas", "many")])));
        assert!(!selector.matches(&BTreeMap::new()));

        let selector = Selector::parse("replicas<10").unwrap();
        assert!(selector.matches(&labels(&[("replicas", "3")])));
        assert!(!selector.matches(&labels(&[("replicas", "10")])));

        assert!(Selector::parse("replicas>two").is_err());
    }

    #[test]
    fn test_parse_conjunction() {
        let selector = Selector::parse("env=prod,tier in (web),!legacy").unwrap();
        assert_eq!(selector.requirements().len(), 3);
        assert!(selector.matches(&labels(&[("env", "prod"), ("tier", "web")])));
        assert!(!selector.matches(&labels(&[("env", "prod"), ("tier", "api")])));
        assert!(!selector.matches(&labels(&[("env", "dev"), ("tier", "web")])));
    }

    #[test]
    fn test_parse_empty_value() {
        let selector = Selector::parse("env=").unwrap();
        assert!(selector.matches(&labels(&[("env", "")])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));

        let selector = Selector::parse("env in (prod,)").unwrap();
        assert!(selector.requirements()[0].values().contains(""));
        assert!(selector.requirements()[0].values().contains("prod"));
    }

    #[test]
    fn test_parse_prefixed_key() {
        let selector = Selector::parse("cert-manager.io/issuer-kind=ClusterIssuer").unwrap();
        assert!(selector.matches(&labels(&[("cert-manager.io/issuer-kind", "ClusterIssuer")])));
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "env=prod,",
            ",env=prod",
            "env in prod",
            "env in (prod",
            "env in ()",
            "env notin ()",
            "env=prod env=dev",
            "!",
            "=prod",
            "env=(prod)",
        ] {
            assert!(Selector::parse(input).is_err(), "expected error for {:?}", input);
        }
    }

    #[test]
    fn test_invalid_keys_and_values() {
        assert!(matches!(
            Selector::parse("-env=prod"),
            Err(SelectorError::InvalidKey { .. })
        ));
        assert!(matches!(
            Selector::parse("Example.COM/env=prod"),
            Err(SelectorError::InvalidKey { .. })
        ));
        assert!(matches!(
            Selector::parse("/env=prod"),
            Err(SelectorError::InvalidKey { .. })
        ));
        let long_name = "a".repeat(64);
        assert!(Selector::parse(&format!("{}=x", long_name)).is_err());
        assert!(matches!(
            Selector::parse("env=prod-"),
            Err(SelectorError::InvalidValue { .. })
        ));
        let long_value = "v".repeat(64);
        assert!(Selector::parse(&format!("env={}", long_value)).is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        let selector = Selector::parse("tier in (web,api), env = prod, !legacy").unwrap();
        assert_eq!(selector.to_string(), "env=prod,!legacy,tier in (api,web)");

        let reparsed: Selector = selector.to_string().parse().unwrap();
        assert_eq!(reparsed, selector);
    }

    #[test]
    fn test_parse_keyword_values_in_set() {
        let selector = Selector::parse("mode in (in,out)").unwrap();
        assert!(selector.matches(&labels(&[("mode", "in")])));
        assert!(selector.matches(&labels(&[("mode", "out")])));
        assert!(!selector.matches(&labels(&[("mode", "notin")])));

        let selector = Selector::parse("mode notin (notin, in)").unwrap();
        assert!(!selector.matches(&labels(&[("mode", "notin")])));
        assert!(!selector.matches(&labels(&[("mode", "in")])));
        assert!(selector.matches(&labels(&[("mode", "out")])));
        assert_eq!(selector.to_string(), "mode notin (in,notin)");
    }

    #[test]
    fn test_label_selector_keyword_value_reparses() {
        let label_selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![LabelSelectorRequirement {
                key: "mode".to_string(),
                operator: "In".to_string(),
                values: Some(vec!["in".to_string()]),
            }]),
        };
        let selector = Selector::try_from(&label_selector).unwrap();
        assert_eq!(selector.to_string(), "mode in (in)");

        let reparsed: Selector = selector.to_string().parse().unwrap();
        assert_eq!(reparsed, selector);
        assert!(reparsed.matches(&labels(&[("mode", "in")])));
    }

    #[test]
    fn test_numeric_comparison_values_are_validated() {
        assert!(matches!(
            Selector::parse("replicas>-1"),
            Err(SelectorError::InvalidValue { .. })
        ));
        assert!(matches!(
            Requirement::new("replicas", Operator::LessThan, ["-5"]),
            Err(SelectorError::InvalidValue { .. })
        ));
        assert!(Requirement::new("replicas", Operator::GreaterThan, ["0"]).is_ok());
    }

    #[test]
    fn test_selector_add_keeps_requirements_sorted() {
        let selector = Selector::everything()
            .add(Requirement::new("tier", Operator::In, ["web"]).unwrap())
            .add(Requirement::new("env", Operator::Equals, ["prod"]).unwrap());

        let keys: Vec<&str> = selector.requirements().iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["env", "tier"]);
        assert_eq!(selector.to_string(), "env=prod,tier in (web)");
        assert!(!selector.is_everything());
        assert!(selector.matches(&labels(&[("env", "prod"), ("tier", "web")])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
        assert_eq!(selector, Selector::parse("tier in (web),env=prod").unwrap());
    }

    #[test]
    fn test_from_labels() {
        let selector = Selector::from_labels([("env", "prod"), ("app", "issuer")]);
        assert_eq!(selector.to_string(), "app=issuer,env=prod");
        assert!(selector.matches(&labels(&[("env", "prod"), ("app", "issuer"), ("x", "y")])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_requirement_value_count_rules() {
        assert!(Requirement::new("env", Operator::Equals, ["a", "b"]).is_err());
        assert!(Requirement::new("env", Operator::In, Vec::<String>::new()).is_err());
        assert!(Requirement::new("env", Operator::Exists, ["a"]).is_err());
        assert!(Requirement::new("env", Operator::GreaterThan, ["1", "2"]).is_err());
        assert!(Requirement::new("env", Operator::NotIn, ["a", "b"]).is_ok());
    }

    #[test]
    fn test_try_from_label_selector() {
        let label_selector = LabelSelector {
            match_labels: Some(labels(&[("env", "prod")])),
            match_expressions: Some(vec![
                LabelSelectorRequirement {
                    key: "tier".to_string(),
                    operator: "In".to_string(),
                    values: Some(vec!["web".to_string(), "api".to_string()]),
                },
                LabelSelectorRequirement {
                    key: "legacy".to_string(),
                    operator: "DoesNotExist".to_string(),
                    values: None,
                },
            ]),
        };

        let selector = Selector::try_from(&label_selector).unwrap();
        assert!(selector.matches(&labels(&[("env", "prod"), ("tier", "api")])));
        assert!(!selector.matches(&labels(&[("env", "prod"), ("tier", "api"), ("legacy", "y")])));
        assert!(!selector.matches(&labels(&[("env", "dev"), ("tier", "api")])));
    }

    #[test]
    fn test_label_selector_empty_and_missing() {
        let empty = Selector::from_label_selector(Some(&LabelSelector::default())).unwrap();
        assert!(empty.is_everything());

        let missing = Selector::from_label_selector(None).unwrap();
        assert!(!missing.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_label_selector_unsupported_operator() {
        let label_selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![LabelSelectorRequirement {
                key: "env".to_string(),
                operator: "Gt".to_string(),
                values: Some(vec!["1".to_string()]),
            }]),
        };
        assert_eq!(
            Selector::try_from(&label_selector),
            Err(SelectorError::UnsupportedOperator("Gt".to_string()))
        );
    }
}
