//! Lexical analysis and expression parsing for the miniscript language.
//!
//! The pipeline is linear: [`parser::lexer::tokenize`] turns source text
//! into a token sequence, [`parser::parser::parse_tokens`] turns that
//! sequence into one [`ast::Expr`]. Malformed input is reported to an
//! [`error::Reporter`] instead of aborting: the lexer always produces a
//! token stream, and a failed parse yields `None` with the diagnostics
//! already recorded.

pub mod ast;
pub mod error;
pub mod parser;
