use log::debug;

use crate::ast::{
    Addop, AddopKind, Assign, Block, BoolExpr, Expr, Fact, If, Mulop, MulopKind, Number, Program,
    Read, Relop, RelopKind, Statement, Term, While, Write,
};
use crate::lexer::{LexError, Lexer};
use crate::token::{Token, TokenKind};

pub mod error;

pub use error::{Expected, ParseResult, SyntaxError};

/// Recursive-descent parser with one token of lookahead, one method per
/// grammar rule:
///
/// ```text
/// block    := { stmt ";" }
/// stmt     := assign | read | write | if | while | "begin" block "end"
/// assign   := id "=" expr
/// read     := "rd" id
/// write    := "wr" expr
/// if       := "if" boolexpr "then" stmt [ "else" stmt ]
/// while    := "while" boolexpr "do" stmt
/// boolexpr := expr relop expr
/// expr     := term { addop term }
/// term     := fact { mulop fact }
/// fact     := "-" fact | "(" expr ")" | id | num
/// ```
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let block = self.parse_block()?;
        self.expect(TokenKind::EOF)?;
        debug!("parsed fragment with {} statements", block.statements.len());
        Ok(Program { block })
    }

    /// Lexical diagnostics seen so far. Scanning is lazy, so this only covers
    /// input up to the current token.
    pub fn diagnostics(&self) -> &[LexError] {
        self.lexer.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<LexError> {
        self.lexer.into_diagnostics()
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let mut statements = Vec::new();
        while !self.at(TokenKind::EOF) && !self.at(TokenKind::End) {
            statements.push(self.parse_statement()?);
            self.expect(TokenKind::Semicolon)?;
        }
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Identifier => self.parse_assign().map(Statement::Assign),
            TokenKind::Rd => self.parse_read().map(Statement::Read),
            TokenKind::Wr => self.parse_write().map(Statement::Write),
            TokenKind::If => self.parse_if().map(Statement::If),
            TokenKind::While => self.parse_while().map(Statement::While),
            TokenKind::Begin => self.parse_begin_end().map(Statement::Block),
            _ => Err(self.error(Expected::Statement)),
        }
    }

    fn parse_assign(&mut self) -> ParseResult<Assign> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Assign { name, value })
    }

    fn parse_read(&mut self) -> ParseResult<Read> {
        let pos = self.expect(TokenKind::Rd)?.span.start;
        let name = self.expect_identifier()?;
        Ok(Read { pos, name })
    }

    fn parse_write(&mut self) -> ParseResult<Write> {
        let pos = self.expect(TokenKind::Wr)?.span.start;
        let value = self.parse_expr()?;
        Ok(Write { pos, value })
    }

    fn parse_if(&mut self) -> ParseResult<If> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_bool_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.at(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<While> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_bool_expr()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        Ok(While { condition, body })
    }

    fn parse_begin_end(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::Begin)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::End)?;
        Ok(block)
    }

    fn parse_bool_expr(&mut self) -> ParseResult<BoolExpr> {
        let left = self.parse_expr()?;
        let relop = self.parse_relop()?;
        let right = self.parse_expr()?;
        Ok(BoolExpr { left, relop, right })
    }

    fn parse_relop(&mut self) -> ParseResult<Relop> {
        let kind = match self.current.kind {
            TokenKind::Less => RelopKind::Less,
            TokenKind::LessEqual => RelopKind::LessEqual,
            TokenKind::Greater => RelopKind::Greater,
            TokenKind::GreaterEqual => RelopKind::GreaterEqual,
            TokenKind::NotEqual => RelopKind::NotEqual,
            TokenKind::EqualEqual => RelopKind::Equal,
            _ => return Err(self.error(Expected::Relop)),
        };
        let pos = self.advance().span.start;
        Ok(Relop { pos, kind })
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let head = self.parse_term()?;
        let mut tail = Vec::new();
        while let Some(kind) = self.addop() {
            let pos = self.advance().span.start;
            tail.push((Addop { pos, kind }, self.parse_term()?));
        }
        Ok(Expr { head, tail })
    }

    fn parse_term(&mut self) -> ParseResult<Term> {
        let head = self.parse_fact()?;
        let mut tail = Vec::new();
        while let Some(kind) = self.mulop() {
            let pos = self.advance().span.start;
            tail.push((Mulop { pos, kind }, self.parse_fact()?));
        }
        Ok(Term { head, tail })
    }

    fn parse_fact(&mut self) -> ParseResult<Fact> {
        match self.current.kind {
            TokenKind::Minus => {
                let pos = self.advance().span.start;
                let operand = Box::new(self.parse_fact()?);
                Ok(Fact::Negate { pos, operand })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Fact::Paren(Box::new(expr)))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Fact::Identifier {
                    pos: token.span.start,
                    name: token.lexeme.to_string(),
                })
            }
            TokenKind::Number => {
                let value = self
                    .current
                    .lexeme
                    .parse::<f64>()
                    .map_err(|_| self.error(Expected::Token(TokenKind::Number)))?;
                let token = self.advance();
                Ok(Fact::Number(Number::new(token.lexeme, value)))
            }
            _ => Err(self.error(Expected::Fact)),
        }
    }

    fn addop(&self) -> Option<AddopKind> {
        match self.current.kind {
            TokenKind::Plus => Some(AddopKind::Add),
            TokenKind::Minus => Some(AddopKind::Sub),
            _ => None,
        }
    }

    fn mulop(&self) -> Option<MulopKind> {
        match self.current.kind {
            TokenKind::Star => Some(MulopKind::Mul),
            TokenKind::Slash => Some(MulopKind::Div),
            _ => None,
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(token.lexeme.to_string())
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'a>> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(Expected::Token(kind)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn advance(&mut self) -> Token<'a> {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn error(&self, expected: Expected) -> SyntaxError {
        SyntaxError {
            pos: self.current.span.start,
            expected,
            found: self.current.into(),
        }
    }
}

pub fn parse(input: &str) -> ParseResult<Program> {
    Parser::new(input).parse_program()
}
