//! An interpreter for the untyped lambda calculus.
//!
//! Source bytes go through [`classify`] and [`lexer`] into [`parser`], which
//! records `name = term` bindings as it goes. Each remaining formula is
//! resolved with [`subst`] and reduced by [`eval`]; [`session`] ties the
//! stages together and prints the results.

pub mod ast;
pub mod bindings;
pub mod classify;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod subst;
