//! Function declaration wrapper.

use std::cell::OnceCell;

use crate::provider::{NodeTag, SyntaxNode};

use super::lazy::LazyField;
use super::type_expr::TypeExpr;
use super::NodeError;

/// A resolved function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParam {
    pub name: String,
    pub ty: TypeExpr,
    pub is_comptime: bool,
}

/// A function definition or an extern prototype.
///
/// Fields resolve lazily from the underlying node and are cached after the
/// first read, failed resolutions included.
#[derive(Debug)]
pub struct FunctionDeclaration<'unit> {
    node: SyntaxNode<'unit>,
    name: OnceCell<String>,
    body: OnceCell<Option<String>>,
    return_type: LazyField<TypeExpr>,
    params: LazyField<Vec<FunctionParam>>,
}

impl<'unit> FunctionDeclaration<'unit> {
    /// Whether `node` can back a function declaration: a definition, or a
    /// bodiless prototype when the prototype is extern.
    pub fn is_node_valid(node: SyntaxNode<'_>) -> bool {
        match node.tag() {
            NodeTag::FnDecl => true,
            NodeTag::FnProto => node.is_extern(),
            _ => false,
        }
    }

    pub fn from_node(node: SyntaxNode<'unit>) -> Result<Self, NodeError> {
        if !Self::is_node_valid(node) {
            return Err(NodeError::NodeMismatch {
                tag: node.tag(),
                expected: "function declaration",
            });
        }
        Ok(Self {
            node,
            name: OnceCell::new(),
            body: OnceCell::new(),
            return_type: LazyField::new(),
            params: LazyField::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.name.get_or_init(|| self.node.spelling().to_string())
    }

    /// Raw body block text, `None` for extern prototypes.
    pub fn body(&self) -> Option<&str> {
        self.body
            .get_or_init(|| self.node.body().map(str::to_string))
            .as_deref()
    }

    pub fn return_type(&self) -> Result<&TypeExpr, NodeError> {
        self.return_type.get_or_resolve(|| {
            let node = self
                .node
                .type_node()
                .ok_or(NodeError::MissingTypeNode("function declaration"))?;
            TypeExpr::from_node(node)
        })
    }

    /// Declared parameters in source order. Fails if any parameter's type
    /// node falls outside the modelled type grammar, e.g. an inline container.
    pub fn params(&self) -> Result<&[FunctionParam], NodeError> {
        self.params
            .get_or_resolve(|| {
                self.node
                    .params()
                    .into_iter()
                    .map(|param| {
                        Ok(FunctionParam {
                            name: param.name.to_string(),
                            ty: TypeExpr::from_node(param.type_node)?,
                            is_comptime: param.is_comptime,
                        })
                    })
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn is_public(&self) -> bool {
        self.node.is_public()
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
