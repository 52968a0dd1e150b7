pub mod ast;
pub mod backend;
pub mod emitter;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod token;
