//! Round-trip printing with pluggable renderers.
//!
//! A [`PrinterDispatcher`] is an explicit per-instance registry from node
//! variant to renderer. Nothing self-registers at process start; callers
//! either build an empty dispatcher and add their own renderers, or start
//! from [`PrinterDispatcher::with_defaults`] for full coverage of the
//! built-in variants.

pub mod premade;

use std::collections::HashMap;

use crate::syntax::{
    FunctionDeclaration, NodeError, SourceElement, TestDeclaration, TypeExpr, VariableDeclaration,
};

/// Default text joined between consecutive top-level elements.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Registry key: the variant of a printable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintKind {
    Type,
    Function,
    Variable,
    Test,
    Unit,
}

/// A borrowed view of one printable node.
#[derive(Clone, Copy)]
pub enum Printable<'a, 'unit> {
    Type(&'a TypeExpr),
    Function(&'a FunctionDeclaration<'unit>),
    Variable(&'a VariableDeclaration<'unit>),
    Test(&'a TestDeclaration<'unit>),
    Unit(&'a [SourceElement<'unit>]),
}

impl Printable<'_, '_> {
    pub fn kind(&self) -> PrintKind {
        match self {
            Self::Type(_) => PrintKind::Type,
            Self::Function(_) => PrintKind::Function,
            Self::Variable(_) => PrintKind::Variable,
            Self::Test(_) => PrintKind::Test,
            Self::Unit(_) => PrintKind::Unit,
        }
    }
}

impl<'a, 'unit> From<&'a SourceElement<'unit>> for Printable<'a, 'unit> {
    fn from(element: &'a SourceElement<'unit>) -> Self {
        match element {
            SourceElement::Function(func) => Self::Function(func),
            SourceElement::Variable(var) => Self::Variable(var),
            SourceElement::Test(test) => Self::Test(test),
        }
    }
}

/// Failure during a print call.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("no renderer registered for {0:?}")]
    NoRenderer(PrintKind),
    #[error("renderer for {registered:?} received a {received:?} node")]
    KindMismatch {
        registered: PrintKind,
        received: PrintKind,
    },
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Converts one node variant back into canonical source text.
///
/// Renderers receive the dispatcher so nested nodes go back through the
/// registry, letting overridden renderers compose transparently.
pub trait Renderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError>;
}

/// Explicit per-instance renderer registry.
pub struct PrinterDispatcher {
    renderers: HashMap<PrintKind, Box<dyn Renderer>>,
    separator: String,
}

impl PrinterDispatcher {
    /// An empty dispatcher with no renderers registered.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// A dispatcher preloaded with the built-in renderers for every variant.
    pub fn with_defaults() -> Self {
        let mut dispatcher = Self::new();
        premade::register_defaults(&mut dispatcher);
        dispatcher
    }

    /// Registers a renderer for a variant, replacing any previous entry for
    /// the same variant.
    pub fn add(&mut self, kind: PrintKind, renderer: Box<dyn Renderer>) {
        self.renderers.insert(kind, renderer);
    }

    /// Unregisters the renderer for a variant, restricting coverage. Later
    /// prints of that variant fail with [`PrintError::NoRenderer`]. Returns
    /// whether a renderer was registered.
    pub fn remove(&mut self, kind: PrintKind) -> bool {
        self.renderers.remove(&kind).is_some()
    }

    /// Renders one node. Fails hard when no renderer covers the node's
    /// variant; there is no fallback textual form.
    pub fn print(&self, item: &Printable<'_, '_>) -> Result<String, PrintError> {
        let kind = item.kind();
        let renderer = self
            .renderers
            .get(&kind)
            .ok_or(PrintError::NoRenderer(kind))?;
        renderer.render(item, self)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }
}

impl Default for PrinterDispatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
