//! Recursive type-expression resolver.
//!
//! A type expression is exactly one of: a named leaf, an optional wrapper, a
//! pointer wrapper or an array wrapper. Const-ness and error-union-ness are
//! properties of the named leaf only; wrapper layers never carry them.

use std::fmt;
use std::str::FromStr;

use crate::provider::{NodeTag, SyntaxNode};

use super::NodeError;

/// A fully resolved type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named {
        name: TypeName,
        is_const: bool,
        is_error_union: bool,
    },
    Optional(Box<TypeExpr>),
    Pointer(Box<TypeExpr>),
    Array {
        length: String,
        element: Box<TypeExpr>,
    },
}

impl TypeExpr {
    pub fn is_node_valid(node: SyntaxNode<'_>) -> bool {
        matches!(
            node.tag(),
            NodeTag::Identifier | NodeTag::OptionalType | NodeTag::PtrType | NodeTag::ArrayType
        )
    }

    /// Builds a type expression from a provider node, recursing through
    /// wrapper layers. Fails with [`NodeError::UnsupportedTypeNode`] for any
    /// tag outside the supported set.
    pub fn from_node(node: SyntaxNode<'_>) -> Result<Self, NodeError> {
        match node.tag() {
            NodeTag::Identifier => Ok(Self::Named {
                name: TypeName::parse(node.spelling()),
                is_const: node.is_const(),
                is_error_union: node.is_error_union(),
            }),
            NodeTag::OptionalType => Ok(Self::Optional(Box::new(Self::inner(
                node,
                "optional type",
            )?))),
            NodeTag::PtrType => Ok(Self::Pointer(Box::new(Self::inner(node, "pointer type")?))),
            NodeTag::ArrayType => Ok(Self::Array {
                length: node.body().unwrap_or_default().to_string(),
                element: Box::new(Self::inner(node, "array type")?),
            }),
            tag => Err(NodeError::UnsupportedTypeNode(tag)),
        }
    }

    fn inner(node: SyntaxNode<'_>, what: &'static str) -> Result<Self, NodeError> {
        let child = node.type_node().ok_or(NodeError::MissingTypeNode(what))?;
        Self::from_node(child)
    }

    /// Resolves the base named type by unwrapping optional/pointer/array
    /// layers in whatever order they are nested. Terminates because each
    /// step strictly descends toward the leaf.
    pub fn absolute_type(&self) -> &TypeName {
        let mut current = self;
        loop {
            match current {
                Self::Named { name, .. } => return name,
                Self::Optional(inner) | Self::Pointer(inner) => current = inner,
                Self::Array { element, .. } => current = element,
            }
        }
    }

    /// Whether the named leaf is an error union.
    pub fn is_error_union(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Self::Named { is_error_union, .. } => return *is_error_union,
                Self::Optional(inner) | Self::Pointer(inner) => current = inner,
                Self::Array { element, .. } => current = element,
            }
        }
    }

    /// Const qualifier of this node; always false for wrapper layers.
    pub fn is_const(&self) -> bool {
        matches!(self, Self::Named { is_const: true, .. })
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named { .. })
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// The immediate name, if this is a named leaf.
    pub fn name(&self) -> Option<&TypeName> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The inner type of an optional, `None` otherwise.
    pub fn optional_type(&self) -> Option<&TypeExpr> {
        match self {
            Self::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    /// The pointed-to type, `None` otherwise.
    pub fn pointer_type(&self) -> Option<&TypeExpr> {
        match self {
            Self::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The element type of an array, `None` otherwise.
    pub fn array_type(&self) -> Option<&TypeExpr> {
        match self {
            Self::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Declared array length text. Kept as a string because it may be a
    /// numeric literal or a symbolic expression.
    pub fn array_length(&self) -> Option<&str> {
        match self {
            Self::Array { length, .. } => Some(length),
            _ => None,
        }
    }
}

/// The base name of a type: a recognized primitive or a custom identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Primitive(PrimitiveType),
    Custom(String),
}

impl TypeName {
    pub fn parse(spelling: &str) -> Self {
        match PrimitiveType::from_str(spelling) {
            Ok(primitive) => Self::Primitive(primitive),
            Err(_) => Self::Custom(spelling.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Primitive(primitive) => primitive.as_str(),
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive type keywords of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F16,
    F32,
    F64,
    F80,
    F128,
    Bool,
    Void,
    Noreturn,
    Type,
    Anyerror,
    Anyopaque,
    ComptimeInt,
    ComptimeFloat,
    CChar,
    CShort,
    CUshort,
    CInt,
    CUint,
    CLong,
    CUlong,
    CLonglong,
    CUlonglong,
    CLongdouble,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::F80 => "f80",
            Self::F128 => "f128",
            Self::Bool => "bool",
            Self::Void => "void",
            Self::Noreturn => "noreturn",
            Self::Type => "type",
            Self::Anyerror => "anyerror",
            Self::Anyopaque => "anyopaque",
            Self::ComptimeInt => "comptime_int",
            Self::ComptimeFloat => "comptime_float",
            Self::CChar => "c_char",
            Self::CShort => "c_short",
            Self::CUshort => "c_ushort",
            Self::CInt => "c_int",
            Self::CUint => "c_uint",
            Self::CLong => "c_long",
            Self::CUlong => "c_ulong",
            Self::CLonglong => "c_longlong",
            Self::CUlonglong => "c_ulonglong",
            Self::CLongdouble => "c_longdouble",
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primitive = match s {
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "isize" => Self::Isize,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "usize" => Self::Usize,
            "f16" => Self::F16,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "f80" => Self::F80,
            "f128" => Self::F128,
            "bool" => Self::Bool,
            "void" => Self::Void,
            "noreturn" => Self::Noreturn,
            "type" => Self::Type,
            "anyerror" => Self::Anyerror,
            "anyopaque" => Self::Anyopaque,
            "comptime_int" => Self::ComptimeInt,
            "comptime_float" => Self::ComptimeFloat,
            "c_char" => Self::CChar,
            "c_short" => Self::CShort,
            "c_ushort" => Self::CUshort,
            "c_int" => Self::CInt,
            "c_uint" => Self::CUint,
            "c_long" => Self::CLong,
            "c_ulong" => Self::CUlong,
            "c_longlong" => Self::CLonglong,
            "c_ulonglong" => Self::CUlonglong,
            "c_longdouble" => Self::CLongdouble,
            _ => return Err(()),
        };
        Ok(primitive)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TranslationUnit;
    use crate::syntax::VariableDeclaration;

    fn type_of(source: &str) -> TypeExpr {
        let unit = TranslationUnit::from_source(source);
        let roots = unit.root_nodes();
        let var = VariableDeclaration::from_node(roots[0]).unwrap();
        var.type_hint().unwrap().unwrap().clone()
    }

    #[test]
    fn named_primitive_resolves() {
        let ty = type_of("const x: usize = 0;");
        assert_eq!(
            ty.absolute_type(),
            &TypeName::Primitive(PrimitiveType::Usize)
        );
        assert!(ty.is_named());
        assert!(!ty.is_const());
    }

    #[test]
    fn custom_name_resolves() {
        let ty = type_of("const x: MyStruct = undefined;");
        assert_eq!(
            ty.absolute_type(),
            &TypeName::Custom("MyStruct".to_string())
        );
    }

    #[test]
    fn absolute_type_unwraps_arbitrary_nesting() {
        let ty = type_of("const x: ?*[ABC]usize = undefined;");

        assert!(ty.is_optional());
        let ptr = ty.optional_type().unwrap();
        assert!(ptr.is_pointer());
        let array = ptr.pointer_type().unwrap();
        assert_eq!(array.array_length(), Some("ABC"));
        assert_eq!(
            ty.absolute_type(),
            &TypeName::Primitive(PrimitiveType::Usize)
        );
    }

    #[test]
    fn const_and_error_union_live_on_the_leaf() {
        let ty = type_of("const x: *const u32 = undefined;");
        assert!(!ty.is_const());
        assert!(ty.pointer_type().unwrap().is_const());

        let unit = TranslationUnit::from_source("fn f() !?u8 {}");
        let func = crate::syntax::FunctionDeclaration::from_node(unit.root_nodes()[0]).unwrap();
        let ret = func.return_type().unwrap();
        assert!(ret.is_error_union());
        assert!(ret.is_optional());
    }

    #[test]
    fn mismatched_accessors_yield_empty_results() {
        let ty = type_of("const x: ?u8 = 0;");
        assert_eq!(ty.pointer_type(), None);
        assert_eq!(ty.array_type(), None);
        assert_eq!(ty.array_length(), None);
        assert_eq!(ty.name(), None);
    }

    #[test]
    fn container_type_node_is_unsupported() {
        let unit = TranslationUnit::from_source("fn f(s: struct { x: u32 }) void {}");
        let node = unit.root_nodes()[0].params()[0].type_node;
        assert_eq!(
            TypeExpr::from_node(node),
            Err(NodeError::UnsupportedTypeNode(NodeTag::ContainerDecl))
        );
    }
}
