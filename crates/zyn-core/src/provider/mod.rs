//! External syntax provider for Zig source text
//!
//! Produces immutable translation units behind a narrow surface: node, token
//! and error collections plus structural queries on individual nodes. The
//! semantic layer consumes only this surface and never reaches into how the
//! raw tree is built.

mod grammar;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use id_arena::{Arena, Id};
use tracing::debug;

pub(crate) type NodeId = Id<RawNode>;

/// Syntactic kind of a raw node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    FnDecl,
    FnProto,
    SimpleVarDecl,
    AlignedVarDecl,
    GlobalVarDecl,
    TestDecl,
    Identifier,
    OptionalType,
    PtrType,
    ArrayType,
    ContainerDecl,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Struct,
    Union,
    Opaque,
    Enum,
}

/// Lexical kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Identifier,
    StringLiteral,
    NumberLiteral,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Equal,
    Bang,
    Question,
    Asterisk,
    KeywordPub,
    KeywordExtern,
    KeywordExport,
    KeywordConst,
    KeywordVar,
    KeywordFn,
    KeywordTest,
    KeywordComptime,
    KeywordAlign,
    KeywordStruct,
    KeywordEnum,
    KeywordUnion,
    KeywordOpaque,
    Other,
}

/// A single token with its byte range in the unit source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub tag: TokenTag,
    pub start: usize,
    pub end: usize,
}

/// A recoverable error encountered while parsing a unit.
///
/// Parsing continues past these, so a unit may expose both valid root nodes
/// and a non-empty error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Failure to produce a translation unit at all.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Byte range into the unit source, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Modifiers {
    pub is_public: bool,
    pub is_extern: bool,
    pub is_export: bool,
    pub is_const: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RawParam {
    pub name: Span,
    pub type_node: NodeId,
    pub is_comptime: bool,
}

/// One entry in a unit's node table. Opaque outside the provider; consumers
/// go through [`SyntaxNode`] accessors.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub(crate) tag: NodeTag,
    pub(crate) span: Span,
    pub(crate) name: Option<Span>,
    pub(crate) type_node: Option<NodeId>,
    pub(crate) body: Option<Span>,
    pub(crate) value: Option<Span>,
    pub(crate) align: Option<Span>,
    pub(crate) params: Vec<RawParam>,
    pub(crate) flags: Modifiers,
    pub(crate) is_error_union: bool,
    pub(crate) container: Option<ContainerKind>,
}

impl RawNode {
    pub(crate) fn new(tag: NodeTag, span: Span) -> Self {
        Self {
            tag,
            span,
            name: None,
            type_node: None,
            body: None,
            value: None,
            align: None,
            params: Vec::new(),
            flags: Modifiers::default(),
            is_error_union: false,
            container: None,
        }
    }
}

static PROVIDER: OnceLock<SyntaxProvider> = OnceLock::new();

/// Process-wide parser state shared by every translation unit.
///
/// Created at most once; [`SyntaxProvider::initialize`] is the barrier callers
/// use before handing parsing work to a pool of workers.
pub struct SyntaxProvider {
    keywords: HashMap<&'static str, TokenTag>,
}

impl SyntaxProvider {
    pub fn global() -> &'static SyntaxProvider {
        PROVIDER.get_or_init(Self::build)
    }

    /// Idempotent get-or-create of the global provider handle.
    pub fn initialize() {
        let _ = Self::global();
    }

    fn build() -> Self {
        let keywords = HashMap::from([
            ("pub", TokenTag::KeywordPub),
            ("extern", TokenTag::KeywordExtern),
            ("export", TokenTag::KeywordExport),
            ("const", TokenTag::KeywordConst),
            ("var", TokenTag::KeywordVar),
            ("fn", TokenTag::KeywordFn),
            ("test", TokenTag::KeywordTest),
            ("comptime", TokenTag::KeywordComptime),
            ("align", TokenTag::KeywordAlign),
            ("struct", TokenTag::KeywordStruct),
            ("enum", TokenTag::KeywordEnum),
            ("union", TokenTag::KeywordUnion),
            ("opaque", TokenTag::KeywordOpaque),
        ]);
        Self { keywords }
    }

    pub(crate) fn keyword(&self, ident: &str) -> Option<TokenTag> {
        self.keywords.get(ident).copied()
    }
}

/// A parsed unit of Zig source: one file or one in-memory string, owning its
/// node, token and error collections.
///
/// Node handles borrow the unit, so the unit must outlive every semantic node
/// derived from it; [`TranslationUnit::release`] consumes the unit and the
/// borrow checker rejects any later access.
pub struct TranslationUnit {
    source: String,
    path: Option<PathBuf>,
    nodes: Arena<RawNode>,
    order: Vec<NodeId>,
    roots: Vec<NodeId>,
    tokens: Vec<Token>,
    errors: Vec<ErrorReport>,
}

impl fmt::Debug for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationUnit")
            .field("path", &self.path)
            .field("nodes", &self.order.len())
            .field("tokens", &self.tokens.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl TranslationUnit {
    /// Parses the given source text into a unit.
    ///
    /// Always yields a unit; syntax problems are reported through
    /// [`TranslationUnit::errors`] while node production continues.
    pub fn from_source(source: impl Into<String>) -> Self {
        let source = source.into();
        let outcome = grammar::parse(&source);
        debug!(
            nodes = outcome.order.len(),
            tokens = outcome.tokens.len(),
            errors = outcome.errors.len(),
            "parsed translation unit"
        );
        Self {
            source,
            path: None,
            nodes: outcome.nodes,
            order: outcome.order,
            roots: outcome.roots,
            tokens: outcome.tokens,
            errors: outcome.errors,
        }
    }

    /// Reads and parses the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UnitError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| UnitError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut unit = Self::from_source(source);
        unit.path = Some(path.to_path_buf());
        Ok(unit)
    }

    pub fn nodes_count(&self) -> usize {
        self.order.len()
    }

    pub fn tokens_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn errors_count(&self) -> usize {
        self.errors.len()
    }

    /// Every node in the unit, in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = SyntaxNode<'_>> {
        self.order.iter().map(|id| SyntaxNode { unit: self, id: *id })
    }

    /// Root-level nodes, in source order.
    pub fn root_nodes(&self) -> Vec<SyntaxNode<'_>> {
        self.roots
            .iter()
            .map(|id| SyntaxNode { unit: self, id: *id })
            .collect()
    }

    /// Resolves a node by its position in the node table.
    pub fn node(&self, index: usize) -> Option<SyntaxNode<'_>> {
        self.order.get(index).map(|id| SyntaxNode { unit: self, id: *id })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn errors(&self) -> &[ErrorReport] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Releases the unit's resources.
    ///
    /// Consumes the unit, so nodes borrowed from it cannot be used afterwards;
    /// use-after-release is rejected at compile time instead of surfacing
    /// stale data at run time.
    pub fn release(self) {}

    pub(crate) fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }
}

/// Handle to one node of a translation unit.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'unit> {
    unit: &'unit TranslationUnit,
    id: NodeId,
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxNode(tag={:?})", self.tag())
    }
}

/// A function parameter as reported by the provider: a name and its declared
/// type node.
#[derive(Debug, Clone, Copy)]
pub struct NodeParam<'unit> {
    pub name: &'unit str,
    pub type_node: SyntaxNode<'unit>,
    pub is_comptime: bool,
}

impl<'unit> SyntaxNode<'unit> {
    fn raw(&self) -> &'unit RawNode {
        &self.unit.nodes[self.id]
    }

    pub fn tag(&self) -> NodeTag {
        self.raw().tag
    }

    /// Identifier text of the node, empty when the node has none.
    pub fn spelling(&self) -> &'unit str {
        self.raw().name.map(|s| self.unit.text(s)).unwrap_or("")
    }

    /// Raw body text: a function or test block, or an array length expression.
    pub fn body(&self) -> Option<&'unit str> {
        self.raw().body.map(|s| self.unit.text(s))
    }

    /// Source text of the node's right-hand side, e.g. a variable initializer.
    pub fn rhs_source(&self) -> Option<&'unit str> {
        self.raw().value.map(|s| self.unit.text(s))
    }

    /// Full source text covered by the node.
    pub fn source_text(&self) -> &'unit str {
        self.unit.text(self.raw().span)
    }

    /// Alignment expression text, if the node declares one.
    pub fn align(&self) -> Option<&'unit str> {
        self.raw().align.map(|s| self.unit.text(s))
    }

    /// The node's declared type: a function's return type or a variable's
    /// type hint. `None` when absent.
    pub fn type_node(&self) -> Option<SyntaxNode<'unit>> {
        self.raw().type_node.map(|id| SyntaxNode { unit: self.unit, id })
    }

    /// Declared parameters, empty for non-function nodes.
    pub fn params(&self) -> Vec<NodeParam<'unit>> {
        self.raw()
            .params
            .iter()
            .map(|p| NodeParam {
                name: self.unit.text(p.name),
                type_node: SyntaxNode {
                    unit: self.unit,
                    id: p.type_node,
                },
                is_comptime: p.is_comptime,
            })
            .collect()
    }

    pub fn is_public(&self) -> bool {
        self.raw().flags.is_public
    }

    pub fn is_extern(&self) -> bool {
        self.raw().flags.is_extern
    }

    pub fn is_export(&self) -> bool {
        self.raw().flags.is_export
    }

    pub fn is_const(&self) -> bool {
        self.raw().flags.is_const
    }

    pub fn is_error_union(&self) -> bool {
        self.raw().is_error_union
    }

    pub fn is_container(&self) -> bool {
        self.raw().container.is_some()
    }

    pub fn is_struct(&self) -> bool {
        self.raw().container == Some(ContainerKind::Struct)
    }

    pub fn is_union(&self) -> bool {
        self.raw().container == Some(ContainerKind::Union)
    }

    pub fn is_opaque(&self) -> bool {
        self.raw().container == Some(ContainerKind::Opaque)
    }

    pub fn is_enum(&self) -> bool {
        self.raw().container == Some(ContainerKind::Enum)
    }

    pub fn unit(&self) -> &'unit TranslationUnit {
        self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_declaration_produces_root_node() {
        let unit = TranslationUnit::from_source("pub fn main() void {}");
        let roots = unit.root_nodes();

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].tag(), NodeTag::FnDecl);
        assert_eq!(roots[0].spelling(), "main");
        assert!(roots[0].is_public());
        assert_eq!(roots[0].body(), Some("{}"));
        assert!(unit.errors().is_empty());
        assert!(unit.tokens_count() > 0);
        assert!(unit.nodes_count() >= 2);
    }

    #[test]
    fn extern_prototype_has_no_body() {
        let unit = TranslationUnit::from_source("extern fn write(fd: usize) isize;");
        let roots = unit.root_nodes();

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].tag(), NodeTag::FnProto);
        assert!(roots[0].is_extern());
        assert_eq!(roots[0].body(), None);

        let params = roots[0].params();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "fd");
        assert_eq!(params[0].type_node.tag(), NodeTag::Identifier);
        assert_eq!(params[0].type_node.spelling(), "usize");
    }

    #[test]
    fn variable_tags_follow_type_hint_and_alignment() {
        let unit = TranslationUnit::from_source(
            "const a = 1;\nvar b align(8) = 0;\nvar c: u32 align(4) = 1;",
        );
        let roots = unit.root_nodes();

        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0].tag(), NodeTag::SimpleVarDecl);
        assert!(roots[0].is_const());
        assert_eq!(roots[1].tag(), NodeTag::AlignedVarDecl);
        assert_eq!(roots[1].align(), Some("8"));
        assert_eq!(roots[2].tag(), NodeTag::GlobalVarDecl);
        assert_eq!(roots[2].align(), Some("4"));
        assert_eq!(roots[2].rhs_source(), Some("1"));
    }

    #[test]
    fn test_declaration_keeps_quoted_name() {
        let unit = TranslationUnit::from_source("test \"empty\" {}");
        let roots = unit.root_nodes();

        assert_eq!(roots[0].tag(), NodeTag::TestDecl);
        assert_eq!(roots[0].spelling(), "\"empty\"");
        assert_eq!(roots[0].body(), Some("{}"));
    }

    #[test]
    fn errors_do_not_stop_node_production() {
        let unit = TranslationUnit::from_source("fn ;\nconst x = 1;");

        assert!(!unit.errors().is_empty());
        let roots = unit.root_nodes();
        assert!(roots.iter().any(|n| n.tag() == NodeTag::SimpleVarDecl));
    }

    #[test]
    fn unmodelled_roots_get_unknown_tag() {
        let unit = TranslationUnit::from_source("comptime {}\nconst x = 1;");
        let roots = unit.root_nodes();

        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].tag(), NodeTag::Unknown);
        assert_eq!(roots[1].tag(), NodeTag::SimpleVarDecl);
    }

    #[test]
    fn container_parameter_type_is_reported() {
        let unit = TranslationUnit::from_source("fn f(s: struct { x: u32 }) void {}");
        let roots = unit.root_nodes();
        let params = roots[0].params();

        assert_eq!(params.len(), 1);
        assert_eq!(params[0].type_node.tag(), NodeTag::ContainerDecl);
        assert!(params[0].type_node.is_struct());
        assert!(params[0].type_node.is_container());
    }

    #[test]
    fn node_lookup_by_index_round_trips() {
        let unit = TranslationUnit::from_source("const x = 1;");

        for index in 0..unit.nodes_count() {
            assert!(unit.node(index).is_some());
        }
        assert!(unit.node(unit.nodes_count()).is_none());
    }

    #[test]
    fn unterminated_literal_with_trailing_escape_stays_in_bounds() {
        for source in ["@foo\"a\\", "const c = 'x\\", "test \"nearly\\"] {
            let unit = TranslationUnit::from_source(source);
            assert!(unit.tokens().iter().all(|t| t.end <= unit.source().len()));
            for node in unit.root_nodes() {
                let _ = node.source_text();
            }
        }
    }

    #[test]
    fn missing_file_is_a_unit_error() {
        let result = TranslationUnit::from_path("/nonexistent/definitely/missing.zig");
        assert!(matches!(result, Err(UnitError::Read { .. })));
    }

    #[test]
    fn provider_initialization_is_idempotent() {
        SyntaxProvider::initialize();
        let first = SyntaxProvider::global() as *const SyntaxProvider;
        SyntaxProvider::initialize();
        let second = SyntaxProvider::global() as *const SyntaxProvider;
        assert_eq!(first, second);
    }
}
