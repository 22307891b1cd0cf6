pub mod lexer;
pub mod parser;

use crate::ast::Expr;
use crate::error::Reporter;

/// Full front end: source text to a single expression tree.
///
/// Returns `None` when the parse failed. Diagnostics for every problem
/// found along the way are in `reporter` either way.
pub fn parse(source: &str, reporter: &mut Reporter) -> Option<Expr> {
    let tokens = lexer::tokenize(source, reporter);
    parser::parse_tokens(tokens, reporter)
}
