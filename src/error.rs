//! Error types for the chipsim netlist simulator.
//!
//! This module provides a unified error type [`ChipsimError`] that covers
//! netlist parsing, network construction, pin access and the diagnostics
//! raised while the network relaxes.

use thiserror::Error;

/// Result type alias using [`ChipsimError`].
pub type Result<T> = std::result::Result<T, ChipsimError>;

/// Unified error type for all chipsim operations.
#[derive(Error, Debug)]
pub enum ChipsimError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Node id declared twice
    #[error("Duplicate node {id} at line {line}")]
    DuplicateNode { id: usize, line: usize },

    /// Pin name declared twice
    #[error("Duplicate pin name '{name}' at line {line}")]
    DuplicateName { name: String, line: usize },

    /// Transistor name declared twice
    #[error("Duplicate transistor name '{name}' at line {line}")]
    DuplicateTransistor { name: String, line: usize },

    /// Missing `.vss` or `.vcc` directive
    #[error("Netlist has no {rail} rail (use '.{rail} <node>')")]
    MissingRail { rail: &'static str },

    // ============ Network Construction Errors ============
    /// Named node reference that the name table does not contain
    #[error("Node '{node}' not found in netlist")]
    NodeNotFound { node: String },

    /// Transistor referencing a node outside the node list
    #[error("Transistor '{name}' references node {node} outside the node list")]
    InvalidTransistor { name: String, node: usize },

    /// Invalid network topology
    #[error("Invalid network topology: {message}")]
    InvalidTopology { message: String },

    // ============ Pin Access Errors ============
    /// Pin name that the pin table does not contain
    #[error("Unknown pin '{name}'")]
    UnknownPin { name: String },

    // ============ Simulation Diagnostics ============
    /// A group had no ground, power, pull or floating evidence
    #[error("Indeterminate group value while recalculating node {seed}")]
    IndeterminateGroup { seed: usize },

    /// The relaxation loop hit its pass cap with work still queued
    #[error(
        "Network did not settle after {passes} passes ({pending} nodes still pending)"
    )]
    NonConvergence { passes: usize, pending: usize },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ I/O Errors ============
    /// Error reading a netlist or program file
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ChipsimError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an unknown pin error
    pub fn unknown_pin(name: impl Into<String>) -> Self {
        Self::UnknownPin { name: name.into() }
    }

    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }

    /// Create a non-convergence diagnostic
    pub fn non_convergence(passes: usize, pending: usize) -> Self {
        Self::NonConvergence { passes, pending }
    }
}
