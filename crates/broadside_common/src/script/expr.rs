//! Argument expressions of item scripts.
//!
//! An expression is a chain of terms joined by `+` and `-`, evaluated left to
//! right. A term is an integer literal, a caller parameter (`$x` or a bare
//! `FIELD_SIZE`), `RAND` for a fresh board coordinate or `PREV_RAND` for the
//! latest draw of the current run. The keywords are also accepted in their
//! object spelling, `{"RAND":"None"}` and `{"PREV_RAND":"None"}`.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::script::rng::ScriptRng;
use crate::script::ExpressionError;

pub type Params = HashMap<String, i64>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Literal(i64),
    Param(String),
    Rand,
    PrevRand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    terms: Vec<(Sign, Term)>,
}

/// Per-run evaluation state shared by all expressions of one script run.
pub struct EvalContext<'a> {
    pub params: &'a Params,
    pub rng: &'a mut ScriptRng,
    pub prev_rand: Option<i64>,
}

impl<'a> EvalContext<'a> {
    pub fn new(params: &'a Params, rng: &'a mut ScriptRng) -> Self {
        EvalContext {
            params,
            rng,
            prev_rand: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Word(String),
    Param(String),
    Plus,
    Minus,
}

impl Expression {
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<i64, ExpressionError> {
        self.terms.iter().try_fold(0i64, |acc, (sign, term)| {
            let value = match term {
                Term::Literal(v) => *v,
                Term::Param(name) => *ctx
                    .params
                    .get(name)
                    .ok_or_else(|| ExpressionError::UnknownParameter(name.clone()))?,
                Term::Rand => {
                    let drawn = ctx.rng.draw_coordinate() as i64;
                    ctx.prev_rand = Some(drawn);
                    drawn
                }
                Term::PrevRand => ctx.prev_rand.unwrap_or(0),
            };
            match sign {
                Sign::Plus => acc.checked_add(value),
                Sign::Minus => acc.checked_sub(value),
            }
            .ok_or(ExpressionError::Overflow)
        })
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ExpressionError::Malformed {
            expression: source.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = tokenize(source).map_err(|reason| malformed(&reason))?.into_iter();
        let mut terms = Vec::new();

        let mut sign = match tokens.next() {
            None => return Err(malformed("empty expression")),
            Some(Token::Plus) => Sign::Plus,
            Some(Token::Minus) => Sign::Minus,
            Some(operand) => {
                terms.push((Sign::Plus, term_of(operand)?));
                match tokens.next() {
                    None => return Ok(Expression { terms }),
                    Some(Token::Plus) => Sign::Plus,
                    Some(Token::Minus) => Sign::Minus,
                    Some(_) => return Err(malformed("expected + or - between terms")),
                }
            }
        };

        loop {
            match tokens.next() {
                Some(operand @ (Token::Number(_) | Token::Word(_) | Token::Param(_))) => {
                    terms.push((sign, term_of(operand)?))
                }
                _ => return Err(malformed("expected a term")),
            }
            sign = match tokens.next() {
                None => return Ok(Expression { terms }),
                Some(Token::Plus) => Sign::Plus,
                Some(Token::Minus) => Sign::Minus,
                Some(_) => return Err(malformed("expected + or - between terms")),
            };
        }
    }
}

fn term_of(token: Token) -> Result<Term, ExpressionError> {
    Ok(match token {
        Token::Number(v) => Term::Literal(v),
        Token::Param(name) => Term::Param(name),
        Token::Word(word) if word.eq_ignore_ascii_case("RAND") => Term::Rand,
        Token::Word(word) if word.eq_ignore_ascii_case("PREV_RAND") => Term::PrevRand,
        Token::Word(word) => Term::Param(word),
        Token::Plus | Token::Minus => unreachable!("operators are not terms"),
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = source.trim_start();

    while let Some(c) = rest.chars().next() {
        let consumed = match c {
            '+' => {
                tokens.push(Token::Plus);
                1
            }
            '-' => {
                tokens.push(Token::Minus);
                1
            }
            '0'..='9' => {
                let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                let value = rest[..end]
                    .parse()
                    .map_err(|_| format!("number {} is too large", &rest[..end]))?;
                tokens.push(Token::Number(value));
                end
            }
            '$' => {
                let end = rest[1..]
                    .find(|c: char| !is_word_char(c))
                    .map_or(rest.len(), |i| i + 1);
                if end == 1 {
                    return Err("missing parameter name after $".to_string());
                }
                tokens.push(Token::Param(rest[1..end].to_string()));
                end
            }
            '{' => {
                let end = rest
                    .find('}')
                    .map(|i| i + 1)
                    .ok_or_else(|| "unterminated {".to_string())?;
                tokens.push(Token::Word(keyword_object(&rest[..end])?));
                end
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
                tokens.push(Token::Word(rest[..end].to_string()));
                end
            }
            c => return Err(format!("unexpected character {c:?}")),
        };
        rest = rest[consumed..].trim_start();
    }

    Ok(tokens)
}

/// `{"RAND":"None"}` names its keyword through the single key of the object.
fn keyword_object(raw: &str) -> Result<String, String> {
    let object: Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| format!("invalid keyword object {raw}: {e}"))?;
    let mut keys = object.keys();
    match (keys.next(), keys.next()) {
        (Some(key), None)
            if key.eq_ignore_ascii_case("RAND") || key.eq_ignore_ascii_case("PREV_RAND") =>
        {
            Ok(key.clone())
        }
        _ => Err(format!("unknown keyword object {raw}")),
    }
}
