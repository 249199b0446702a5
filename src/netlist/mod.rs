//! Text format for transistor netlists.
//!
//! Netlists come from an external extraction process. This module reads
//! them from a line-oriented, SPICE-inspired text form so a chip can be
//! loaded without compiling its data into the binary.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | transistor | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".vss" node | ".vcc" node
//!             | ".node" id ["pullup"]
//!             | ".name" identifier id
//! transistor  = identifier node node node      (name, gate, c1, c2)
//!
//! node        = id | identifier
//! id          = digit+
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! Transistor order is preserved: it defines the order in which each node's
//! terminal connections are walked, which decides pull conflicts.
//!
//! # Example
//!
//! ```text
//! # NMOS inverter
//! .vss 0
//! .vcc 1
//! .node 3 pullup
//! .name in  2
//! .name out 3
//!
//! t1 in out vss
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Largest node id a netlist may use. The node array is sized from the
/// largest id, so ids are capped well above any real chip.
pub const MAX_NODE_ID: usize = 1 << 20;

/// Parse netlist text into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::ChipsimError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
