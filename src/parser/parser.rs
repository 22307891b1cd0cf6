//! Recursive-descent expression parser.
//!
//! Each grammar level is a method that parses its own operators and calls
//! the next, tighter-binding level for operands. The four plain binary
//! levels (equality, comparison, term, factor) are identical in shape and
//! are driven by one static rule table, which also carries each level's
//! "missing left-hand operand" lookahead set.
//!
//! Errors split two ways: a leading binary operator is reported and locally
//! recovered (the right operand stands in for the whole expression), while
//! a malformed primary, a missing `)` or a missing `:` unwinds the ladder
//! as a [`ParseError`] and makes the parse yield nothing.

use thiserror::Error;

use super::lexer::{Token, TokenKind};
use crate::ast::{Expr, Value};
use crate::error::Reporter;

/// Marker for a diagnostic that has already been handed to the reporter.
/// It only unwinds the precedence ladder back to [`Parser::parse`].
#[derive(Error, Debug)]
#[error("parse error")]
pub struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// Parses one expression from an EOF-terminated token sequence.
///
/// Returns `None` when the parse failed; the diagnostic has already been
/// reported at the point of detection.
pub fn parse_tokens(tokens: Vec<Token>, reporter: &mut Reporter) -> Option<Expr> {
    let mut parser = Parser::new(tokens, reporter);
    parser.parse()
}

/// One left-associative binary precedence level. `leading` is checked
/// before the left operand is parsed; a hit means the operand is missing
/// and the level recovers with its right side alone.
struct BinaryRule {
    operators: &'static [TokenKind],
    leading: &'static [TokenKind],
}

// Levels from loosest to tightest binding; each row takes its operands
// from the next row, the last row from `unary`. The term row's leading
// set holds only '+': a leading '-' is a valid unary prefix.
const BINARY_RULES: [BinaryRule; 4] = [
    // equality
    BinaryRule {
        operators: &[TokenKind::BangEqual, TokenKind::EqualEqual],
        leading: &[TokenKind::BangEqual, TokenKind::EqualEqual],
    },
    // comparison
    BinaryRule {
        operators: &[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ],
        leading: &[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ],
    },
    // term
    BinaryRule {
        operators: &[TokenKind::Minus, TokenKind::Plus],
        leading: &[TokenKind::Plus],
    },
    // factor
    BinaryRule {
        operators: &[TokenKind::Slash, TokenKind::Star],
        leading: &[TokenKind::Slash, TokenKind::Star],
    },
];

pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    reporter: &'a mut Reporter,
}

impl<'a> Parser<'a> {
    /// The sequence must end with an `Eof` token, as [`tokenize`] ensures.
    ///
    /// [`tokenize`]: super::lexer::tokenize
    pub fn new(tokens: Vec<Token>, reporter: &'a mut Reporter) -> Self {
        Self {
            tokens,
            position: 0,
            reporter,
        }
    }

    /// Parses a single expression, leaving the cursor after it.
    pub fn parse(&mut self) -> Option<Expr> {
        self.expression().ok()
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.comma()
    }

    // Lowest precedence, left-associative.
    fn comma(&mut self) -> ParseResult<Expr> {
        let mut expr = self.conditional()?;

        while self.match_kinds(&[TokenKind::Comma]) {
            let operator = self.previous().clone();
            let right = self.conditional()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    // Right-associative: the else branch recurses into this level.
    fn conditional(&mut self) -> ParseResult<Expr> {
        let expr = self.binary_level(0)?;

        if self.match_kinds(&[TokenKind::Question]) {
            let then_branch = self.expression()?;
            self.consume(
                TokenKind::Colon,
                "Expect ':' after then branch of conditional expression.",
            )?;
            let else_branch = self.conditional()?;
            return Ok(Expr::Conditional {
                condition: Box::new(expr),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(expr)
    }

    fn binary_level(&mut self, level: usize) -> ParseResult<Expr> {
        let rule = &BINARY_RULES[level];

        // Error production: a leading operator means the left operand is
        // missing. Report it, then let the right side stand alone.
        if self.match_kinds(rule.leading) {
            let operator = self.previous().clone();
            self.error(&operator, "Missing left-hand operand.");
            return self.operand(level);
        }

        let mut expr = self.operand(level)?;

        while self.match_kinds(rule.operators) {
            let operator = self.previous().clone();
            let right = self.operand(level)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn operand(&mut self, level: usize) -> ParseResult<Expr> {
        if level + 1 < BINARY_RULES.len() {
            self.binary_level(level + 1)
        } else {
            self.unary()
        }
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_kinds(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_kinds(&[TokenKind::False]) {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.match_kinds(&[TokenKind::True]) {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.match_kinds(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Value::Nil));
        }

        if self.match_kinds(&[TokenKind::Number, TokenKind::String]) {
            let value = self.previous().literal.clone().unwrap_or(Value::Nil);
            return Ok(Expr::Literal(value));
        }

        if self.match_kinds(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        let token = self.peek().clone();
        Err(self.error(&token, "Expect expression."))
    }

    /// Skips ahead to a plausible statement boundary after a failed parse,
    /// for callers that parse several top-level constructs in a row. The
    /// single-expression entry point never calls this.
    ///
    /// Statement keywords are not lexed as keyword tokens yet, so they are
    /// matched by identifier spelling.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            if self.peek().kind == TokenKind::Identifier
                && matches!(
                    self.peek().lexeme.as_str(),
                    "class" | "fun" | "var" | "for" | "if" | "while" | "print"
                        | "return"
                )
            {
                return;
            }

            self.advance();
        }
    }

    // Cursor primitives. The cursor only ever moves forward.

    fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<()> {
        if self.check(kind) {
            self.advance();
            return Ok(());
        }

        let token = self.peek().clone();
        Err(self.error(&token, message))
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    /// Reports a diagnostic with token context and returns the unwinding
    /// marker; callers decide whether to raise it or recover.
    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        if token.kind == TokenKind::Eof {
            self.reporter.report(token.line, &format!("at end: {message}"));
        } else {
            self.reporter
                .report(token.line, &format!("at '{}': {}", token.lexeme, message));
        }
        ParseError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse_source(source: &str) -> (Option<Expr>, Reporter) {
        let mut reporter = Reporter::new();
        let tokens = tokenize(source, &mut reporter);
        let expr = parse_tokens(tokens, &mut reporter);
        (expr, reporter)
    }

    fn parse_ok(source: &str) -> String {
        let (expr, reporter) = parse_source(source);
        assert!(
            !reporter.had_error(),
            "unexpected diagnostics: {:?}",
            reporter.diagnostics()
        );
        expr.unwrap().to_string()
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        assert_eq!(parse_ok("1 + 2 * 3"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn equality_is_left_associative() {
        assert_eq!(parse_ok("1 == 2 == 3"), "(== (== 1 2) 3)");
    }

    #[test]
    fn comparison_sits_between_equality_and_term() {
        assert_eq!(parse_ok("1 + 2 < 3 == true"), "(== (< (+ 1 2) 3) true)");
    }

    #[test]
    fn conditional_parses_and_nests_to_the_right() {
        assert_eq!(parse_ok("true ? 1 : 2"), "(?: true 1 2)");
        assert_eq!(parse_ok("1 ? 2 : 3 ? 4 : 5"), "(?: 1 2 (?: 3 4 5))");
    }

    #[test]
    fn comma_is_lowest_and_left_associative() {
        assert_eq!(parse_ok("1, 2, 3"), "(, (, 1 2) 3)");
        assert_eq!(parse_ok("1 ? 2 : 3, 4"), "(, (?: 1 2 3) 4)");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(parse_ok("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(parse_ok("!!true"), "(! (! true))");
        assert_eq!(parse_ok("--5"), "(- (- 5))");
    }

    #[test]
    fn literals() {
        assert_eq!(parse_ok("nil"), "nil");
        assert_eq!(parse_ok("false"), "false");
        assert_eq!(parse_ok("\"hi\""), "hi");
        let (expr, _) = parse_source("\"hi\"");
        assert_eq!(expr, Some(Expr::Literal(Value::Str("hi".to_string()))));
    }

    #[test]
    fn missing_left_operand_recovers_with_right_side() {
        let (expr, reporter) = parse_source("== 1");
        assert_eq!(expr, Some(Expr::Literal(Value::Number(1.0))));
        assert_eq!(reporter.diagnostics().len(), 1);
        assert_eq!(
            reporter.diagnostics()[0].message,
            "at '==': Missing left-hand operand."
        );
    }

    #[test]
    fn leading_plus_recovers_at_factor_level() {
        let (expr, reporter) = parse_source("+ 1 * 2");
        assert_eq!(expr.unwrap().to_string(), "(* 1 2)");
        assert!(reporter.had_error());
    }

    #[test]
    fn leading_minus_is_unary_not_an_error() {
        let (expr, reporter) = parse_source("-1");
        assert_eq!(expr.unwrap().to_string(), "(- 1)");
        assert!(!reporter.had_error());
    }

    #[test]
    fn unclosed_grouping_fails_the_parse() {
        let (expr, reporter) = parse_source("(1 + 2");
        assert_eq!(expr, None);
        assert_eq!(
            reporter.diagnostics()[0].message,
            "at end: Expect ')' after expression."
        );
    }

    #[test]
    fn missing_colon_fails_the_parse() {
        let (expr, reporter) = parse_source("1 ? 2 3");
        assert_eq!(expr, None);
        assert_eq!(
            reporter.diagnostics()[0].message,
            "at '3': Expect ':' after then branch of conditional expression."
        );
    }

    #[test]
    fn bare_operator_token_is_not_an_expression() {
        let (expr, reporter) = parse_source(")");
        assert_eq!(expr, None);
        assert_eq!(
            reporter.diagnostics()[0].message,
            "at ')': Expect expression."
        );
    }

    #[test]
    fn identifier_is_not_a_valid_primary_yet() {
        let (expr, reporter) = parse_source("foo");
        assert_eq!(expr, None);
        assert_eq!(
            reporter.diagnostics()[0].message,
            "at 'foo': Expect expression."
        );
    }

    #[test]
    fn synchronize_skips_past_a_semicolon() {
        let mut reporter = Reporter::new();
        let tokens = tokenize("1 ; 2", &mut reporter);
        let mut parser = Parser::new(tokens, &mut reporter);
        assert!(parser.parse().is_some());

        parser.synchronize();
        assert_eq!(parser.peek().lexeme, "2");
    }

    #[test]
    fn synchronize_stops_before_a_statement_keyword() {
        let mut reporter = Reporter::new();
        let tokens = tokenize("1 2 while 3", &mut reporter);
        let mut parser = Parser::new(tokens, &mut reporter);
        assert!(parser.parse().is_some());

        parser.synchronize();
        assert_eq!(parser.peek().lexeme, "while");
    }
}
