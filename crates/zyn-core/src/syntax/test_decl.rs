//! Test declaration wrapper.

use std::cell::OnceCell;

use crate::provider::{NodeTag, SyntaxNode};

use super::NodeError;

/// A `test` block, named or anonymous.
///
/// Named tests keep the surrounding quotes in their name so the original
/// spelling survives a round trip.
#[derive(Debug)]
pub struct TestDeclaration<'unit> {
    node: SyntaxNode<'unit>,
    name: OnceCell<Option<String>>,
    body: OnceCell<String>,
}

impl<'unit> TestDeclaration<'unit> {
    pub fn is_node_valid(node: SyntaxNode<'_>) -> bool {
        node.tag() == NodeTag::TestDecl
    }

    pub fn from_node(node: SyntaxNode<'unit>) -> Result<Self, NodeError> {
        if !Self::is_node_valid(node) {
            return Err(NodeError::NodeMismatch {
                tag: node.tag(),
                expected: "test declaration",
            });
        }
        Ok(Self {
            node,
            name: OnceCell::new(),
            body: OnceCell::new(),
        })
    }

    /// Quoted test name, `None` for anonymous tests.
    pub fn name(&self) -> Option<&str> {
        self.name
            .get_or_init(|| {
                let spelling = self.node.spelling();
                if spelling.is_empty() {
                    None
                } else {
                    Some(spelling.to_string())
                }
            })
            .as_deref()
    }

    pub fn body(&self) -> &str {
        self.body
            .get_or_init(|| self.node.body().unwrap_or_default().to_string())
    }

    pub fn node(&self) -> SyntaxNode<'unit> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TranslationUnit;

    #[test]
    fn named_test_keeps_quotes() {
        let unit = TranslationUnit::from_source("test \"addition works\" { try expect(true); }");
        let test = TestDeclaration::from_node(unit.root_nodes()[0]).unwrap();

        assert_eq!(test.name(), Some("\"addition works\""));
        assert_eq!(test.body(), "{ try expect(true); }");
    }

    #[test]
    fn anonymous_test_has_no_name() {
        let unit = TranslationUnit::from_source("test {}");
        let test = TestDeclaration::from_node(unit.root_nodes()[0]).unwrap();

        assert_eq!(test.name(), None);
        assert_eq!(test.body(), "{}");
    }

    #[test]
    fn non_test_node_is_rejected() {
        let unit = TranslationUnit::from_source("const x = 1;");
        let err = TestDeclaration::from_node(unit.root_nodes()[0]).unwrap_err();
        assert_eq!(
            err,
            NodeError::NodeMismatch {
                tag: NodeTag::SimpleVarDecl,
                expected: "test declaration",
            }
        );
    }
}
