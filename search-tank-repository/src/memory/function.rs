//! Scoring function expressions.
//!
//! Grammar accepted by the in-memory provider:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := number
//!          | 'relevance' | 'rel' | 'r'
//!          | 'age' | 'a'
//!          | ('doc.var' | 'd') '[' integer ']'
//!          | ('query.var' | 'q') '[' integer ']'
//!          | builtin '(' expr (',' expr)* ')'
//!          | '(' expr ')'
//! ```
//!
//! Unary minus binds looser than `^`, so `-2 ^ 2` is `-4`. Nesting deeper
//! than [`MAX_DEPTH`] is rejected.

use std::collections::BTreeMap;

use crate::errors::IndexError;

/// Deepest nesting of parentheses, calls and operators a definition may use.
pub(crate) const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Ident(usize, usize),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Op(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Log,
    Sqrt,
    Abs,
    Max,
    Min,
    Pow,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "log" | "ln" => Some(Self::Log),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "pow" => Some(Self::Pow),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Log | Self::Sqrt | Self::Abs => 1,
            Self::Max | Self::Min | Self::Pow => 2,
        }
    }
}

/// A parsed scoring function.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Relevance,
    Age,
    DocVar(u32),
    QueryVar(u32),
    Neg(Box<Expr>),
    Binary(char, Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}

/// Values a scoring function can reference.
pub(crate) struct ScoringContext<'a> {
    pub relevance: f64,
    /// Seconds since the document was indexed.
    pub age: f64,
    pub doc_vars: &'a BTreeMap<u32, f32>,
    pub query_vars: &'a BTreeMap<u32, f32>,
}

impl Expr {
    /// Parse a function definition.
    pub(crate) fn parse(definition: &str) -> Result<Self, IndexError> {
        let tokens = tokenize(definition)?;
        if tokens.is_empty() {
            return Err(IndexError::invalid_syntax("empty function definition"));
        }

        let mut parser = Parser {
            source: definition,
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(IndexError::invalid_syntax(format!(
                "unexpected {:?} in function definition",
                token
            ))),
        }
    }

    /// Evaluate against a document. Missing variables read as zero.
    pub(crate) fn evaluate(&self, ctx: &ScoringContext<'_>) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Relevance => ctx.relevance,
            Expr::Age => ctx.age,
            Expr::DocVar(i) => ctx.doc_vars.get(i).copied().unwrap_or(0.0) as f64,
            Expr::QueryVar(i) => ctx.query_vars.get(i).copied().unwrap_or(0.0) as f64,
            Expr::Neg(inner) => -inner.evaluate(ctx),
            Expr::Binary(op, lhs, rhs) => {
                let (lhs, rhs) = (lhs.evaluate(ctx), rhs.evaluate(ctx));
                match op {
                    '+' => lhs + rhs,
                    '-' => lhs - rhs,
                    '*' => lhs * rhs,
                    '/' => lhs / rhs,
                    _ => lhs.powf(rhs),
                }
            }
            Expr::Call(builtin, args) => {
                let values: Vec<f64> = args.iter().map(|arg| arg.evaluate(ctx)).collect();
                match builtin {
                    Builtin::Log => values[0].ln(),
                    Builtin::Sqrt => values[0].sqrt(),
                    Builtin::Abs => values[0].abs(),
                    Builtin::Max => values[0].max(values[1]),
                    Builtin::Min => values[0].min(values[1]),
                    Builtin::Pow => values[0].powf(values[1]),
                }
            }
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, IndexError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            c if c.is_ascii_whitespace() => i += 1,
            '(' | ')' | '[' | ']' | ',' => {
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    _ => Token::Comma,
                });
                i += 1;
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let number = source[start..i].parse().map_err(|_| {
                    IndexError::invalid_syntax(format!("invalid number {:?}", &source[start..i]))
                })?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(start, i));
            }
            _ => {
                return Err(IndexError::invalid_syntax(format!(
                    "unexpected character {:?} in function definition",
                    c
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token, IndexError> {
        let token = self
            .peek()
            .ok_or_else(|| IndexError::invalid_syntax("unexpected end of function definition"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), IndexError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(IndexError::invalid_syntax(format!(
                "expected {:?}, found {:?}",
                expected, token
            )))
        }
    }

    /// Run `parse` one nesting level down.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        if self.depth >= MAX_DEPTH {
            return Err(IndexError::invalid_syntax(
                "function definition nested too deeply",
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<Expr, IndexError> {
        self.nested(|parser| {
            let mut lhs = parser.term()?;
            while let Some(Token::Op(op @ ('+' | '-'))) = parser.peek() {
                parser.pos += 1;
                let rhs = parser.term()?;
                lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        })
    }

    fn term(&mut self) -> Result<Expr, IndexError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, IndexError> {
        if let Some(Token::Op('-')) = self.peek() {
            self.pos += 1;
            let inner = self.nested(Self::unary)?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, IndexError> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary('^', Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, IndexError> {
        match self.next()? {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(start, end) => {
                let source = self.source;
                self.identifier(&source[start..end])
            }
            token => Err(IndexError::invalid_syntax(format!(
                "unexpected {:?} in function definition",
                token
            ))),
        }
    }

    fn identifier(&mut self, name: &str) -> Result<Expr, IndexError> {
        match name {
            "relevance" | "rel" | "r" => Ok(Expr::Relevance),
            "age" | "a" => Ok(Expr::Age),
            "doc.var" | "d" => Ok(Expr::DocVar(self.slot()?)),
            "query.var" | "q" => Ok(Expr::QueryVar(self.slot()?)),
            _ => {
                let builtin = Builtin::from_name(name).ok_or_else(|| {
                    IndexError::invalid_syntax(format!("unknown identifier {:?}", name))
                })?;
                self.expect(Token::LParen)?;
                let mut args = vec![self.expr()?];
                while let Some(Token::Comma) = self.peek() {
                    self.pos += 1;
                    args.push(self.expr()?);
                }
                self.expect(Token::RParen)?;

                if args.len() != builtin.arity() {
                    return Err(IndexError::invalid_syntax(format!(
                        "{} takes {} argument(s), got {}",
                        name,
                        builtin.arity(),
                        args.len()
                    )));
                }
                Ok(Expr::Call(builtin, args))
            }
        }
    }

    fn slot(&mut self) -> Result<u32, IndexError> {
        self.expect(Token::LBracket)?;
        let slot = match self.next()? {
            Token::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => n as u32,
            token => {
                return Err(IndexError::invalid_syntax(format!(
                    "expected variable index, found {:?}",
                    token
                )))
            }
        };
        self.expect(Token::RBracket)?;
        Ok(slot)
    }
}
