//! Typed semantic views over Zig syntax trees.
//!
//! The provider parses source text into immutable translation units; the
//! syntax layer classifies root nodes into typed declarations whose fields
//! materialize lazily; the printer turns declarations back into canonical
//! source text through a pluggable renderer registry; source units and
//! modules orchestrate parsing over files and directories; the lint layer is
//! a reference tool built on top of all of it.

pub mod config;
pub mod lint;
pub mod printer;
pub mod provider;
pub mod source;
pub mod syntax;

pub use printer::{Printable, PrintError, PrinterDispatcher};
pub use provider::{SyntaxProvider, TranslationUnit, UnitError};
pub use source::{SemanticSource, SourceCode, SourceFile, SourceModule};
pub use syntax::{
    FunctionDeclaration, NodeError, SourceElement, TestDeclaration, TypeExpr,
    VariableDeclaration,
};
