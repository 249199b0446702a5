//! Parser for the netlist format.

use std::collections::HashSet;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use super::MAX_NODE_ID;
use crate::error::{ChipsimError, Result};

/// Parser for netlist text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        let mut node_ids = HashSet::new();
        let mut names = HashSet::new();
        let mut transistors = HashSet::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast, &mut node_ids, &mut names)?,
                TokenKind::Identifier => {
                    let transistor = self.parse_transistor()?;
                    if !transistors.insert(transistor.name.clone()) {
                        return Err(ChipsimError::DuplicateTransistor {
                            name: transistor.name,
                            line: transistor.line,
                        });
                    }
                    ast.transistors.push(transistor);
                }
                TokenKind::Number | TokenKind::Eof => {
                    return Err(ChipsimError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(ChipsimError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(ChipsimError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    fn parse_id(&mut self) -> Result<usize> {
        let tok = self.expect(TokenKind::Number)?;
        match tok.text.parse::<usize>() {
            Ok(id) if id <= MAX_NODE_ID => Ok(id),
            _ => Err(ChipsimError::parse(
                tok.line,
                format!("node id {} is not in 0..={}", tok.text, MAX_NODE_ID),
            )),
        }
    }

    fn parse_node_ref(&mut self) -> Result<NodeRef> {
        match self.current.kind {
            TokenKind::Number => Ok(NodeRef::Id(self.parse_id()?)),
            TokenKind::Identifier => Ok(NodeRef::Name(self.expect(TokenKind::Identifier)?.text)),
            _ => Err(ChipsimError::parse(
                self.current.line,
                format!("expected node reference, got {:?}", self.current.kind),
            )),
        }
    }

    fn parse_directive(
        &mut self,
        ast: &mut NetlistAst,
        node_ids: &mut HashSet<usize>,
        names: &mut HashSet<String>,
    ) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".vss" => {
                if ast.vss.is_some() {
                    return Err(ChipsimError::parse(line, "vss rail declared twice"));
                }
                ast.vss = Some(self.parse_node_ref()?);
            }
            ".vcc" => {
                if ast.vcc.is_some() {
                    return Err(ChipsimError::parse(line, "vcc rail declared twice"));
                }
                ast.vcc = Some(self.parse_node_ref()?);
            }
            ".node" => {
                let id = self.parse_id()?;
                let pullup = if self.current.kind == TokenKind::Identifier {
                    let flag = self.expect(TokenKind::Identifier)?;
                    match flag.text.to_lowercase().as_str() {
                        "pullup" | "pu" => true,
                        other => {
                            return Err(ChipsimError::parse(
                                line,
                                format!("unknown node flag: {}", other),
                            ))
                        }
                    }
                } else {
                    false
                };
                if !node_ids.insert(id) {
                    return Err(ChipsimError::DuplicateNode { id, line });
                }
                ast.nodes.push(NodeDecl { id, pullup, line });
            }
            ".name" => {
                let name = self.expect(TokenKind::Identifier)?.text;
                let id = self.parse_id()?;
                if !names.insert(name.clone()) {
                    return Err(ChipsimError::DuplicateName { name, line });
                }
                ast.names.push(NameDecl { name, id, line });
            }
            _ => {
                return Err(ChipsimError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_transistor(&mut self) -> Result<TransistorDecl> {
        let line = self.current.line;
        let name = self.expect(TokenKind::Identifier)?.text;
        let gate = self.parse_node_ref()?;
        let c1 = self.parse_node_ref()?;
        let c2 = self.parse_node_ref()?;

        Ok(TransistorDecl {
            name,
            gate,
            c1,
            c2,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inverter() {
        let input = "\
.vss 0
.vcc 1
.node 3 pullup
.name in 2
.name out 3
t1 in out 0
";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.vss, Some(NodeRef::Id(0)));
        assert_eq!(ast.vcc, Some(NodeRef::Id(1)));
        assert_eq!(
            ast.nodes,
            vec![NodeDecl {
                id: 3,
                pullup: true,
                line: 3,
            }]
        );
        assert_eq!(ast.names.len(), 2);
        assert_eq!(ast.transistors.len(), 1);
        let t = &ast.transistors[0];
        assert_eq!(t.name, "t1");
        assert_eq!(t.gate, NodeRef::Name("in".to_string()));
        assert_eq!(t.c1, NodeRef::Name("out".to_string()));
        assert_eq!(t.c2, NodeRef::Id(0));
        assert_eq!(t.line, 6);
    }

    #[test]
    fn test_parse_keeps_transistor_order() {
        let input = "tb 1 2 3\nta 1 3 4\ntc 2 4 5";
        let ast = super::super::parse(input).unwrap();
        let order: Vec<&str> = ast.transistors.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, vec!["tb", "ta", "tc"]);
    }

    #[test]
    fn test_parse_duplicates() {
        assert!(matches!(
            super::super::parse(".node 4\n.node 4 pullup"),
            Err(ChipsimError::DuplicateNode { id: 4, line: 2 })
        ));
        assert!(matches!(
            super::super::parse(".name a 1\n.name a 2"),
            Err(ChipsimError::DuplicateName { .. })
        ));
        assert!(matches!(
            super::super::parse("t1 1 2 3\nt1 2 3 4"),
            Err(ChipsimError::DuplicateTransistor { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        // Missing terminal
        assert!(matches!(
            super::super::parse("t1 1 2\n"),
            Err(ChipsimError::ParseError { line: 1, .. })
        ));
        // Trailing garbage
        assert!(matches!(
            super::super::parse("t1 1 2 3 4"),
            Err(ChipsimError::ParseError { .. })
        ));
        // Unknown directive
        assert!(matches!(
            super::super::parse(".model x"),
            Err(ChipsimError::ParseError { .. })
        ));
        // Unknown node flag
        assert!(matches!(
            super::super::parse(".node 1 pulldown"),
            Err(ChipsimError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_oversized_ids() {
        assert!(matches!(
            super::super::parse(".vss 0\n.vcc 1\n.node 18446744073709551615\nt1 1 2 0"),
            Err(ChipsimError::ParseError { line: 3, .. })
        ));
        assert!(matches!(
            super::super::parse(".vss 0\n.vcc 1\nt1 1 4000000000 0"),
            Err(ChipsimError::ParseError { line: 3, .. })
        ));
        assert!(matches!(
            super::super::parse(".name big 99999999999999999999999"),
            Err(ChipsimError::ParseError { line: 1, .. })
        ));

        let ast = super::super::parse(&format!(".node {}", MAX_NODE_ID)).unwrap();
        assert_eq!(ast.nodes[0].id, MAX_NODE_ID);
    }
}
