//! Semantic node model over provider syntax trees
//!
//! Typed wrappers classifying raw nodes into function, variable and test
//! declarations. Every semantic attribute is resolved on first read and
//! cached, so construction is cheap and callers pay only for the fields they
//! touch.

mod lazy;

pub mod function;
pub mod test_decl;
pub mod type_expr;
pub mod variable;

pub use function::{FunctionDeclaration, FunctionParam};
pub use test_decl::TestDeclaration;
pub use type_expr::{PrimitiveType, TypeExpr, TypeName};
pub use variable::VariableDeclaration;

use crate::provider::{NodeTag, SyntaxNode};

/// Failure to classify a raw node or resolve one of its semantic fields.
///
/// `Clone` so a lazily cached failure can be replayed on every later read of
/// the same field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("node tag {0:?} is not a supported type node")]
    UnsupportedTypeNode(NodeTag),
    #[error("node tag {tag:?} is not a valid {expected}")]
    NodeMismatch {
        tag: NodeTag,
        expected: &'static str,
    },
    #[error("{0} has no declared type node")]
    MissingTypeNode(&'static str),
}

/// A recognized top-level element of a source unit.
#[derive(Debug)]
pub enum SourceElement<'unit> {
    Function(FunctionDeclaration<'unit>),
    Variable(VariableDeclaration<'unit>),
    Test(TestDeclaration<'unit>),
}

impl<'unit> SourceElement<'unit> {
    /// Classifies a root node, testing variants in fixed priority order:
    /// test declaration, function declaration, variable declaration. Nodes
    /// matching none are not an error; they are simply not content.
    pub fn classify(node: SyntaxNode<'unit>) -> Option<Self> {
        if TestDeclaration::is_node_valid(node) {
            return TestDeclaration::from_node(node).ok().map(Self::Test);
        }
        if FunctionDeclaration::is_node_valid(node) {
            return FunctionDeclaration::from_node(node).ok().map(Self::Function);
        }
        if VariableDeclaration::is_node_valid(node) {
            return VariableDeclaration::from_node(node).ok().map(Self::Variable);
        }
        None
    }

    /// Declared name, `None` for anonymous tests.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function(func) => Some(func.name()),
            Self::Variable(var) => Some(var.name()),
            Self::Test(test) => test.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TranslationUnit;

    #[test]
    fn classify_covers_all_modelled_variants() {
        let unit = TranslationUnit::from_source(
            "test {}\nfn f() void {}\nconst x = 1;\ncomptime {}",
        );
        let elements: Vec<_> = unit
            .root_nodes()
            .into_iter()
            .filter_map(SourceElement::classify)
            .collect();

        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[0], SourceElement::Test(_)));
        assert!(matches!(elements[1], SourceElement::Function(_)));
        assert!(matches!(elements[2], SourceElement::Variable(_)));
    }

    #[test]
    fn element_names_are_exposed() {
        let unit = TranslationUnit::from_source("fn f() void {}\nconst x = 1;\ntest {}");
        let elements: Vec<_> = unit
            .root_nodes()
            .into_iter()
            .filter_map(SourceElement::classify)
            .collect();

        assert_eq!(elements[0].name(), Some("f"));
        assert_eq!(elements[1].name(), Some("x"));
        assert_eq!(elements[2].name(), None);
    }
}
