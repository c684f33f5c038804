pub mod pause;
pub mod repl;
