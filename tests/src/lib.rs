//! End to end tests for the pi framework: lexing, parsing, symbol
//! population and inference through the language plugins, and completion.

#[cfg(test)]
mod utils;

mod complete;
mod infer;
mod lex;
mod parse;
mod pipeline;
