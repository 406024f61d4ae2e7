//! Precedence-climbing parser for binding expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or         := and ("||" and)*
//! and        := equality ("&&" equality)*
//! equality   := comparison (("==" | "!=") comparison)*
//! comparison := additive (("<" | "<=" | ">" | ">=") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("!" | "-") unary | postfix
//! postfix    := primary ("." ident | "." number | "[" or "]")*
//! ```

use crate::ast::{BinaryOp, Expression, UnaryOp};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex, SpannedToken, Token};
use serde_json::Value;

/// Longest expression source accepted, in bytes
pub const MAX_SOURCE_LEN: usize = 1024;

/// Deepest nesting of unary operators, parentheses and brackets
pub const MAX_NESTING: usize = 64;

/// Parse an expression source string
pub fn parse(source: &str) -> ParseResult<Expression> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(ParseError::invalid_syntax(
            MAX_SOURCE_LEN,
            format!("expression longer than {} bytes", MAX_SOURCE_LEN),
        ));
    }
    let tokens = lex(source).map_err(|span| ParseError::lexer_error(span.start))?;
    let mut parser = Parser::new(tokens, source.len());
    let expr = parser.parse_expression()?;

    if let Some(token) = parser.peek() {
        return Err(ParseError::unexpected_token(
            token.span.start,
            "end of expression",
            token.token.describe(),
        ));
    }

    Ok(expr)
}

pub struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
    source_len: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<SpannedToken<'src>>, source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&SpannedToken<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<SpannedToken<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.span.start).unwrap_or(self.source_len)
    }

    fn match_token(&mut self, expected: Token<'src>) -> bool {
        if self.peek().map(|t| t.token == expected).unwrap_or(false) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token<'src>) -> ParseResult<()> {
        match self.peek() {
            Some(token) if token.token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(ParseError::unexpected_token(
                token.span.start,
                expected.describe(),
                token.token.describe(),
            )),
            None => Err(ParseError::unexpected_eof(self.source_len)),
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::invalid_syntax(
                self.current_pos(),
                "expression nested too deeply",
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse an expression with full operator precedence
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and_expression()?;

        while self.match_token(Token::Or) {
            let right = self.parse_and_expression()?;
            left = binary(left, BinaryOp::Or, right);
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_equality_expression()?;

        while self.match_token(Token::And) {
            let right = self.parse_equality_expression()?;
            left = binary(left, BinaryOp::And, right);
        }

        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_comparison_expression()?;

        loop {
            let op = if self.match_token(Token::EqEq) {
                BinaryOp::Equals
            } else if self.match_token(Token::NotEq) {
                BinaryOp::NotEquals
            } else {
                break;
            };
            let right = self.parse_comparison_expression()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_comparison_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_additive_expression()?;

        loop {
            let op = if self.match_token(Token::Lte) {
                BinaryOp::LessThanOrEqual
            } else if self.match_token(Token::Gte) {
                BinaryOp::GreaterThanOrEqual
            } else if self.match_token(Token::Lt) {
                BinaryOp::LessThan
            } else if self.match_token(Token::Gt) {
                BinaryOp::GreaterThan
            } else {
                break;
            };
            let right = self.parse_additive_expression()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let op = if self.match_token(Token::Plus) {
                BinaryOp::Add
            } else if self.match_token(Token::Minus) {
                BinaryOp::Subtract
            } else {
                break;
            };
            let right = self.parse_multiplicative_expression()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op = if self.match_token(Token::Star) {
                BinaryOp::Multiply
            } else if self.match_token(Token::Slash) {
                BinaryOp::Divide
            } else if self.match_token(Token::Percent) {
                BinaryOp::Modulo
            } else {
                break;
            };
            let right = self.parse_unary_expression()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let operator = if self.match_token(Token::Bang) {
            UnaryOp::Not
        } else if self.match_token(Token::Minus) {
            UnaryOp::Negate
        } else {
            return self.parse_postfix_expression();
        };

        let operand = self.nested(Self::parse_unary_expression)?;
        Ok(Expression::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            if self.match_token(Token::Dot) {
                let pos = self.current_pos();
                match self.advance() {
                    Some(SpannedToken {
                        token: Token::Ident(name),
                        ..
                    }) => {
                        expr = Expression::Member {
                            object: Box::new(expr),
                            property: name.to_string(),
                        };
                    }
                    // `items.0` and, because the lexer reads `0.1` as one number, `items.0.1`
                    Some(SpannedToken {
                        token: Token::Number(digits),
                        ..
                    }) => {
                        for part in digits.split('.') {
                            let index: u64 = part.parse().map_err(|_| {
                                ParseError::invalid_syntax(pos, format!("invalid index '{}'", part))
                            })?;
                            expr = Expression::Index {
                                object: Box::new(expr),
                                index: Box::new(Expression::Literal(Value::from(index))),
                            };
                        }
                    }
                    Some(other) => {
                        return Err(ParseError::unexpected_token(
                            other.span.start,
                            "property name",
                            other.token.describe(),
                        ))
                    }
                    None => return Err(ParseError::unexpected_eof(self.source_len)),
                }
            } else if self.match_token(Token::LBracket) {
                let index = self.nested(Self::parse_expression)?;
                self.expect(Token::RBracket)?;
                expr = Expression::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let pos = self.current_pos();
        let Some(spanned) = self.advance() else {
            return Err(ParseError::unexpected_eof(pos));
        };

        match spanned.token {
            Token::True => Ok(Expression::Literal(Value::Bool(true))),
            Token::False => Ok(Expression::Literal(Value::Bool(false))),
            Token::Null => Ok(Expression::Literal(Value::Null)),
            Token::Ident(name) => Ok(Expression::Variable(name.to_string())),
            Token::String(s) | Token::SingleQuoteString(s) => {
                Ok(Expression::Literal(Value::String(unescape(s))))
            }
            Token::Number(n) => {
                let value: f64 = n
                    .parse()
                    .map_err(|_| ParseError::invalid_syntax(pos, format!("invalid number '{}'", n)))?;
                Ok(Expression::Literal(crate::value::number(value)))
            }
            Token::LParen => {
                let expr = self.nested(Self::parse_expression)?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => Err(ParseError::unexpected_token(
                spanned.span.start,
                "expression",
                other.describe(),
            )),
        }
    }
}

fn binary(left: Expression, operator: BinaryOp, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let expr = parse("_item.name").unwrap();
        assert_eq!(
            expr,
            Expression::Member {
                object: Box::new(Expression::Variable("_item".to_string())),
                property: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_numeric_member_as_index() {
        let expr = parse("items.0.name").unwrap();
        match expr {
            Expression::Member { object, property } => {
                assert_eq!(property, "name");
                assert!(matches!(*object, Expression::Index { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        // a || b && c parses as a || (b && c)
        let expr = parse("a || b && c").unwrap();
        match expr {
            Expression::Binary { operator, right, .. } => {
                assert_eq!(operator, BinaryOp::Or);
                assert!(matches!(
                    *right,
                    Expression::Binary {
                        operator: BinaryOp::And,
                        ..
                    }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_string_escapes() {
        let expr = parse(r#""say \"hi\"""#).unwrap();
        assert_eq!(expr, Expression::Literal(Value::String("say \"hi\"".to_string())));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("a b").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { pos: 2, .. }));
    }

    #[test]
    fn test_empty_expression_is_eof() {
        assert_eq!(parse("   ").unwrap_err(), ParseError::unexpected_eof(3));
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}a{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse(&ok).is_ok());

        let deep = format!("{}a", "-".repeat(MAX_NESTING + 1));
        assert!(matches!(parse(&deep), Err(ParseError::InvalidSyntax { .. })));
    }

    #[test]
    fn test_overlong_source_rejected() {
        let long = "a + ".repeat(MAX_SOURCE_LEN) + "a";
        assert_eq!(parse(&long).unwrap_err().pos(), MAX_SOURCE_LEN);
    }

    #[test]
    fn test_variables_listed_once() {
        let expr = parse("user.name + ' ' + user.surname + suffix").unwrap();
        assert_eq!(expr.variables(), vec!["user", "suffix"]);
    }
}
