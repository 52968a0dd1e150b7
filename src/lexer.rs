use std::{iter::Peekable, str::CharIndices};

use log::{trace, warn};

use crate::token::{Span, Token, TokenKind};

pub mod error;

pub use error::LexError;

const COMMENT_MARKER: &str = "//";

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    diagnostics: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            diagnostics: Vec::new(),
        }
    }

    /// Scans the next token. Once the input is exhausted every call returns
    /// an `EOF` token positioned at the end of the input.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            self.skip_trivia();

            let Some(&(start, ch)) = self.chars.peek() else {
                return Token::eof(self.input.len());
            };

            let token = if ch.is_ascii_digit() {
                Some(self.read_number(start))
            } else if ch.is_ascii_alphabetic() {
                Some(self.read_word(start))
            } else {
                self.read_operator(start, ch)
            };

            match token {
                Some(token) => {
                    trace!("scanned {token} at {}", token.span.start);
                    return token;
                }
                None => {
                    self.chars.next();
                    warn!("illegal character '{ch}' at position {start}");
                    self.diagnostics.push(LexError::IllegalCharacter {
                        character: ch,
                        position: start,
                    });
                }
            }
        }
    }

    /// Diagnostics collected so far, in source order.
    pub fn diagnostics(&self) -> &[LexError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<LexError> {
        self.diagnostics
    }

    fn skip_trivia(&mut self) {
        loop {
            while let Some(&(_, c)) = self.chars.peek() {
                if matches!(c, ' ' | '\t' | '\n' | '\r') {
                    self.chars.next();
                } else {
                    break;
                }
            }

            let at = self.current_index();
            if !self.input[at..].starts_with(COMMENT_MARKER) {
                return;
            }
            // Comment runs through the newline, which is consumed too.
            for (_, c) in self.chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
        }
    }

    fn read_number(&mut self, start: usize) -> Token<'a> {
        self.consume_while(|c| c.is_ascii_digit());
        if let Some(&(_, '.')) = self.chars.peek() {
            self.chars.next();
            self.consume_while(|c| c.is_ascii_digit());
        }
        self.token_from(TokenKind::Number, start)
    }

    fn read_word(&mut self, start: usize) -> Token<'a> {
        self.consume_while(|c| c.is_ascii_alphanumeric());
        let end = self.current_index();
        let lexeme = &self.input[start..end];
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, Span { start, end })
    }

    /// Two-character operators win over their one-character prefixes, but the
    /// second character is only consumed when the pair is a known operator.
    fn read_operator(&mut self, start: usize, first: char) -> Option<Token<'a>> {
        let one_end = start + first.len_utf8();
        if let Some((_, second)) = self.chars.clone().nth(1) {
            let two_end = one_end + second.len_utf8();
            let pair = &self.input[start..two_end];
            if let Some(kind) = TokenKind::operator(pair) {
                self.chars.next();
                self.chars.next();
                return Some(Token::new(kind, pair, Span { start, end: two_end }));
            }
        }

        let single = &self.input[start..one_end];
        let kind = TokenKind::operator(single)?;
        self.chars.next();
        Some(Token::new(kind, single, Span { start, end: one_end }))
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(&(_, c)) = self.chars.peek() {
            if predicate(c) {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn token_from(&mut self, kind: TokenKind, start: usize) -> Token<'a> {
        let end = self.current_index();
        Token::new(kind, &self.input[start..end], Span { start, end })
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

/// Result of scanning a whole fragment up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexed<'a> {
    pub tokens: Vec<Token<'a>>,
    pub diagnostics: Vec<LexError>,
}

/// Scans the whole input. The returned token list always ends with `EOF`.
pub fn tokenize(input: &str) -> Lexed<'_> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.is(TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Lexed {
        tokens,
        diagnostics: lexer.into_diagnostics(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .tokens
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_program() {
        let input = indoc! {"
            rd x;
            while x <> 0 do begin
                wr x * 2.5;
                x = x - 1;
            end;
        "};
        let expected = vec![
            TokenKind::Rd,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::While,
            TokenKind::Identifier,
            TokenKind::NotEqual,
            TokenKind::Number,
            TokenKind::Do,
            TokenKind::Begin,
            TokenKind::Wr,
            TokenKind::Identifier,
            TokenKind::Star,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Identifier,
            TokenKind::Minus,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::End,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn two_character_operators_are_greedy() {
        let lexed = tokenize("a<=b");
        assert_eq!(lexed.tokens[1].kind, TokenKind::LessEqual);
        assert_eq!(lexed.tokens[1].lexeme, "<=");
        assert_eq!(lexed.tokens.len(), 4);
    }

    #[test]
    fn unknown_pair_only_consumes_first_character() {
        assert_eq!(
            kinds("x=-1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::EOF,
            ]
        );
        assert_eq!(
            kinds("a<-b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        let lexed = tokenize("if iffy then end2 wr");
        let pairs: Vec<_> = lexed
            .tokens
            .iter()
            .map(|token| (token.kind, token.lexeme))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (TokenKind::If, "if"),
                (TokenKind::Identifier, "iffy"),
                (TokenKind::Then, "then"),
                (TokenKind::Identifier, "end2"),
                (TokenKind::Wr, "wr"),
                (TokenKind::EOF, ""),
            ]
        );
    }

    #[test]
    fn numbers_with_and_without_fraction() {
        let lexed = tokenize("12 3.25 7.");
        let lexemes: Vec<_> = lexed.tokens.iter().map(|token| token.lexeme).collect();
        assert_eq!(lexemes, vec!["12", "3.25", "7.", ""]);
    }

    #[test]
    fn comments_do_not_affect_following_lines() {
        let input = indoc! {"
            // wr 1; this whole line is ignored <= ==
            // another comment
            x = 2;
        "};
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn comment_at_end_of_input_without_newline() {
        assert_eq!(
            kinds("x = 1; // trailing"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn illegal_characters_are_reported_and_skipped() {
        let lexed = tokenize("x = 1 @ 2 $;");
        let lexemes: Vec<_> = lexed.tokens.iter().map(|token| token.lexeme).collect();
        assert_eq!(lexemes, vec!["x", "=", "1", "2", ";", ""]);
        assert_eq!(
            lexed.diagnostics,
            vec![
                LexError::IllegalCharacter {
                    character: '@',
                    position: 6,
                },
                LexError::IllegalCharacter {
                    character: '$',
                    position: 10,
                },
            ]
        );
    }

    #[test]
    fn eof_repeats_forever() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        for _ in 0..3 {
            let token = lexer.next_token();
            assert_eq!(token.kind, TokenKind::EOF);
            assert_eq!(token.span.start, 1);
        }
    }

    #[test]
    fn spans_point_into_source() {
        let lexed = tokenize("  abc >= 10");
        assert_eq!(lexed.tokens[0].span, Span { start: 2, end: 5 });
        assert_eq!(lexed.tokens[1].span, Span { start: 6, end: 8 });
        assert_eq!(lexed.tokens[2].span, Span { start: 9, end: 11 });
    }
}
