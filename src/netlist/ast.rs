//! Abstract Syntax Tree types for the netlist format.

use std::fmt;

/// Complete AST representation of a parsed netlist.
///
/// Declarations keep their source order; transistor order in particular is
/// significant because it fixes every node's terminal adjacency order.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// `.node` declarations
    pub nodes: Vec<NodeDecl>,
    /// `.name` entries of the pin-name table
    pub names: Vec<NameDecl>,
    /// Transistor definitions
    pub transistors: Vec<TransistorDecl>,
    /// Ground rail reference
    pub vss: Option<NodeRef>,
    /// Power rail reference
    pub vcc: Option<NodeRef>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A reference to a node, either by id or by pin name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// Numeric node id
    Id(usize),
    /// Name from the `.name` table
    Name(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A `.node` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    /// Node id
    pub id: usize,
    /// Static pullup flag
    pub pullup: bool,
    /// Source line number
    pub line: usize,
}

/// A `.name` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDecl {
    /// Pin name
    pub name: String,
    /// Node the name refers to
    pub id: usize,
    /// Source line number
    pub line: usize,
}

/// A transistor definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransistorDecl {
    /// Transistor name
    pub name: String,
    /// Gate node
    pub gate: NodeRef,
    /// First switched terminal
    pub c1: NodeRef,
    /// Second switched terminal
    pub c2: NodeRef,
    /// Source line number
    pub line: usize,
}
