//! Restricted arithmetic evaluator.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```
//!
//! Names, calls and any other syntax are rejected at tokenization.

use std::fmt;
use thiserror::Error;

/// Why an expression could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected '{0}' at position {1}")]
    UnexpectedToken(String, usize),

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Evaluation result. Integer arithmetic stays integral until a division or
/// a float operand is involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip float text with scientific notation outside
/// `[1e-4, 1e16)`, e.g. `2.0`, `0.30000000000000004`, `1e+16`, `1e-05`.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let magnitude = v.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return format!("{:?}", v);
    }

    let sci = format!("{:e}", v);
    match sci.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => sci,
        },
        None => sci,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Num(n) => n.to_string(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let token = match c {
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = pos;
                let (number, end) = scan_number(&chars, start)?;
                tokens.push((Token::Num(number), start));
                pos = end;
                continue;
            }
            other => return Err(ExprError::UnexpectedChar(other, pos)),
        };
        tokens.push((token, pos));
        pos += 1;
    }

    Ok(tokens)
}

/// Scan a numeric literal starting at `start`: digits, an optional fraction
/// and an optional exponent. Returns the value and the index after it.
fn scan_number(chars: &[char], start: usize) -> Result<(Number, usize), ExprError> {
    let mut pos = start;
    let mut is_float = false;

    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < chars.len() && chars[pos] == '.' {
        is_float = true;
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut exp_end = pos + 1;
        if exp_end < chars.len() && matches!(chars[exp_end], '+' | '-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end == digits_start {
            let text: String = chars[start..exp_end].iter().collect();
            return Err(ExprError::InvalidNumber(text));
        }
        is_float = true;
        pos = exp_end;
    }

    let text: String = chars[start..pos].iter().collect();
    if text == "." {
        return Err(ExprError::InvalidNumber(text));
    }

    let number = if is_float {
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ExprError::InvalidNumber(text.clone()))?
    } else {
        text.parse::<i64>().map(Number::Int).map_err(|_| ExprError::Overflow)?
    };

    Ok((number, pos))
}

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Number, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = add(value, self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = sub(value, self.term()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Number, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = mul(value, self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value = div(value, self.unary()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Number, ExprError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                neg(self.nested(Self::unary)?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Number, ExprError> {
        match self.next() {
            Some((Token::Num(n), _)) => Ok(n),
            Some((Token::LParen, _)) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((token, at)) => Err(ExprError::UnexpectedToken(token.text(), at)),
                    None => Err(ExprError::UnbalancedParens),
                }
            }
            Some((Token::RParen, _)) => Err(ExprError::UnbalancedParens),
            Some((token, at)) => Err(ExprError::UnexpectedToken(token.text(), at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn add(a: Number, b: Number) -> Result<Number, ExprError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_add(y).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, ExprError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_sub(y).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, ExprError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_mul(y).map(Number::Int).ok_or(ExprError::Overflow),
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

fn div(a: Number, b: Number) -> Result<Number, ExprError> {
    if b.is_zero() {
        return Err(ExprError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

fn neg(a: Number) -> Result<Number, ExprError> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(ExprError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Number, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.next() {
        None => Ok(value),
        Some((Token::RParen, _)) => Err(ExprError::UnbalancedParens),
        Some((token, at)) => Err(ExprError::UnexpectedToken(token.text(), at)),
    }
}
