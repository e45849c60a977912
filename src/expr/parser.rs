//! Recursive-descent parser for formulas.
//!
//! Precedence, lowest first: `+ -`, then `* /`, then unary `-`. All binary
//! operators are left-associative. Nesting through parentheses, calls and
//! unary minus is limited to [`MAX_DEPTH`] levels, and no binary operator may
//! grow the tree past [`MAX_HEIGHT`] levels.

use super::ast::{BinaryOp, Expr};
use super::error::CompileError;
use super::token::{Token, TokenKind};

/// Deepest nesting of parentheses, calls and unary minus a formula may use.
pub const MAX_DEPTH: usize = 256;

/// Tallest expression tree the parser will build.
pub const MAX_HEIGHT: usize = 1024;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// A parsed subtree and its height.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as a single expression.
    pub fn parse(&mut self) -> Result<Expr, CompileError> {
        if self.is_at_end() {
            let t = self.peek();
            return Err(CompileError::parse("empty expression", t.line, t.col));
        }

        let node = self.parse_sum()?;

        if !self.is_at_end() {
            let t = self.peek();
            return Err(CompileError::parse(
                format!("unexpected {} after expression", t.kind.describe()),
                t.line,
                t.col,
            ));
        }

        Ok(node.expr)
    }

    fn parse_sum(&mut self) -> Result<Node, CompileError> {
        let mut lhs = self.parse_product()?;
        loop {
            let t = self.peek();
            let op = match t.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let (line, col) = (t.line, t.col);
            self.advance();
            let rhs = self.parse_product()?;
            lhs = binary(op, lhs, rhs, line, col)?;
        }
        Ok(lhs)
    }

    fn parse_product(&mut self) -> Result<Node, CompileError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let t = self.peek();
            let op = match t.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            let (line, col) = (t.line, t.col);
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs, line, col)?;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Node, CompileError> {
        let t = self.peek();
        match t.kind {
            TokenKind::Minus => {
                let (line, col) = (t.line, t.col);
                self.advance();
                self.enter(line, col)?;
                let operand = self.parse_unary();
                self.depth -= 1;
                let operand = operand?;
                Ok(Node {
                    expr: Expr::Neg(Box::new(operand.expr)),
                    height: operand.height + 1,
                })
            }
            TokenKind::Plus => Err(CompileError::parse(
                "unexpected unary operator: +",
                t.line,
                t.col,
            )),
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Node, CompileError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Node::leaf(Expr::Number {
                    value,
                    line: t.line,
                    col: t.col,
                }))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if !self.check(&TokenKind::LParen) {
                    return Ok(Node::leaf(Expr::Ident {
                        name,
                        line: t.line,
                        col: t.col,
                    }));
                }
                self.advance();
                self.enter(t.line, t.col)?;
                let args = self.parse_args();
                self.depth -= 1;
                let args = args?;
                let height = args.iter().map(|a| a.height).max().unwrap_or(0) + 1;
                Ok(Node {
                    expr: Expr::Call {
                        name,
                        args: args.into_iter().map(|a| a.expr).collect(),
                        line: t.line,
                        col: t.col,
                    },
                    height,
                })
            }
            TokenKind::LParen => {
                self.advance();
                self.enter(t.line, t.col)?;
                let inner = self.parse_sum();
                self.depth -= 1;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                if self.check(&TokenKind::LParen) {
                    let p = self.peek();
                    return Err(CompileError::parse(
                        "expected a function name, found something else",
                        p.line,
                        p.col,
                    ));
                }
                Ok(inner)
            }
            other => Err(CompileError::parse(
                format!("unexpected {}", other.describe()),
                t.line,
                t.col,
            )),
        }
    }

    /// Parse a comma-separated argument list. The opening `(` is consumed.
    fn parse_args(&mut self) -> Result<Vec<Node>, CompileError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_sum()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn enter(&mut self, line: usize, col: usize) -> Result<(), CompileError> {
        if self.depth >= MAX_DEPTH {
            return Err(CompileError::parse("expression nested too deeply", line, col));
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end()
            && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, CompileError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(CompileError::parse(
                format!("expected {}, got {}", kind.describe(), t.kind.describe()),
                t.line,
                t.col,
            ))
        }
    }
}

fn binary(
    op: BinaryOp,
    lhs: Node,
    rhs: Node,
    line: usize,
    col: usize,
) -> Result<Node, CompileError> {
    let height = lhs.height.max(rhs.height) + 1;
    if height > MAX_HEIGHT {
        return Err(CompileError::parse("expression too long", line, col));
    }
    Ok(Node {
        expr: Expr::Binary {
            op,
            lhs: Box::new(lhs.expr),
            rhs: Box::new(rhs.expr),
        },
        height,
    })
}
