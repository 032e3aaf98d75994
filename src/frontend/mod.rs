//! Grammar Front-End
//!
//! A front end turns raw source text into a depth-first stream of
//! statement enter/exit events. The tree builder never sees grammar rules.
//!
//! The built-in [`DmlScanner`] covers SQL and PL/SQL sources; other
//! grammars plug in through [`GrammarFrontEnd`].

pub mod framework;
pub mod lexer;
pub mod dml;

pub use framework::GrammarFrontEnd;
pub use dml::DmlScanner;
