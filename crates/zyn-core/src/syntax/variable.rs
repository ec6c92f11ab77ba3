//! Variable declaration wrapper.

use std::cell::OnceCell;

use crate::provider::{NodeTag, SyntaxNode};

use super::lazy::LazyField;
use super::type_expr::TypeExpr;
use super::NodeError;

/// A `const` or `var` declaration at the top level of a unit.
#[derive(Debug)]
pub struct VariableDeclaration<'unit> {
    node: SyntaxNode<'unit>,
    name: OnceCell<String>,
    type_hint: LazyField<Option<TypeExpr>>,
    value: OnceCell<Option<String>>,
    alignment: OnceCell<Option<String>>,
}

impl<'unit> VariableDeclaration<'unit> {
    pub fn is_node_valid(node: SyntaxNode<'_>) -> bool {
        matches!(
            node.tag(),
            NodeTag::SimpleVarDecl | NodeTag::AlignedVarDecl | NodeTag::GlobalVarDecl
        )
    }

    pub fn from_node(node: SyntaxNode<'unit>) -> Result<Self, NodeError> {
        if !Self::is_node_valid(node) {
            return Err(NodeError::NodeMismatch {
                tag: node.tag(),
                expected: "variable declaration",
            });
        }
        Ok(Self {
            node,
            name: OnceCell::new(),
            type_hint: LazyField::new(),
            value: OnceCell::new(),
            alignment: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.name.get_or_init(|| self.node.spelling().to_string())
    }

    /// The declared type annotation, `None` when the declaration is inferred.
    pub fn type_hint(&self) -> Result<Option<&TypeExpr>, NodeError> {
        self.type_hint
            .get_or_resolve(|| self.node.type_node().map(TypeExpr::from_node).transpose())
            .map(Option::as_ref)
    }

    /// Initializer source text. Absent exactly when the declaration is
    /// extern; extern declarations carry no initializer.
    pub fn value(&self) -> Option<&str> {
        self.value
            .get_or_init(|| {
                if self.node.is_extern() {
                    None
                } else {
                    self.node.rhs_source().map(str::to_string)
                }
            })
            .as_deref()
    }

    /// Alignment expression text, when declared.
    pub fn alignment(&self) -> Option<&str> {
        self.alignment
            .get_or_init(|| self.node.align().map(str::to_string))
            .as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.node.is_public()
    }

    pub fn is_const(&self) -> bool {
        self.node.is_const()
    }

    pub fn is_extern(&self) -> bool {
        self.node.is_extern()
    }

    pub fn is_export(&self) -> bool {
        self.node.is_export()
    }

    pub fn node(&self) -> SyntaxNode<'unit> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TranslationUnit;
    use crate::syntax::{PrimitiveType, TypeName};

    fn variable(unit: &TranslationUnit) -> VariableDeclaration<'_> {
        VariableDeclaration::from_node(unit.root_nodes()[0]).unwrap()
    }

    #[test]
    fn inferred_declaration_has_no_hint() {
        let unit = TranslationUnit::from_source("const x = 42;");
        let var = variable(&unit);

        assert_eq!(var.name(), "x");
        assert!(var.is_const());
        assert_eq!(var.type_hint().unwrap(), None);
        assert_eq!(var.value(), Some("42"));
        assert_eq!(var.alignment(), None);
    }

    #[test]
    fn annotated_declaration_resolves_hint() {
        let unit = TranslationUnit::from_source("pub var count: usize = 0;");
        let var = variable(&unit);

        assert!(var.is_public());
        assert!(!var.is_const());
        let hint = var.type_hint().unwrap().unwrap();
        assert_eq!(
            hint.absolute_type(),
            &TypeName::Primitive(PrimitiveType::Usize)
        );
    }

    #[test]
    fn extern_declaration_has_no_value() {
        let unit = TranslationUnit::from_source("extern const errno: c_int;");
        let var = variable(&unit);

        assert!(var.is_extern());
        assert!(var.is_const());
        assert_eq!(var.value(), None);
        assert!(var.type_hint().unwrap().is_some());
    }

    #[test]
    fn aligned_declaration_exposes_alignment() {
        let unit = TranslationUnit::from_source("var buffer: [64]u8 align(16) = undefined;");
        let var = variable(&unit);

        assert_eq!(var.alignment(), Some("16"));
        let hint = var.type_hint().unwrap().unwrap();
        assert!(hint.is_array());
        assert_eq!(hint.array_length(), Some("64"));
    }

    #[test]
    fn function_node_is_rejected() {
        let unit = TranslationUnit::from_source("fn f() void {}");
        let err = VariableDeclaration::from_node(unit.root_nodes()[0]).unwrap_err();
        assert_eq!(
            err,
            NodeError::NodeMismatch {
                tag: NodeTag::FnDecl,
                expected: "variable declaration",
            }
        );
    }
}
