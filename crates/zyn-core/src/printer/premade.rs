//! Built-in renderers producing the canonical textual form.

use crate::syntax::TypeExpr;

use super::{Printable, PrintError, PrintKind, PrinterDispatcher, Renderer};

/// Registers one built-in renderer per variant.
pub fn register_defaults(dispatcher: &mut PrinterDispatcher) {
    dispatcher.add(PrintKind::Type, Box::new(TypeRenderer));
    dispatcher.add(PrintKind::Function, Box::new(FunctionRenderer));
    dispatcher.add(PrintKind::Variable, Box::new(VariableRenderer));
    dispatcher.add(PrintKind::Test, Box::new(TestRenderer));
    dispatcher.add(PrintKind::Unit, Box::new(UnitRenderer));
}

fn mismatch(registered: PrintKind, item: &Printable<'_, '_>) -> PrintError {
    PrintError::KindMismatch {
        registered,
        received: item.kind(),
    }
}

/// Canonical type form: a leading `!` when the leaf is an error union, then
/// wrapper sigils outside-in, then `const ` and the base name at the leaf.
pub struct TypeRenderer;

impl TypeRenderer {
    // The bang is a leaf property but prints outermost, so wrapper layers
    // are walked here instead of re-entering the dispatcher.
    fn layers(ty: &TypeExpr, out: &mut String) {
        match ty {
            TypeExpr::Named { name, is_const, .. } => {
                if *is_const {
                    out.push_str("const ");
                }
                out.push_str(name.as_str());
            }
            TypeExpr::Optional(inner) => {
                out.push('?');
                Self::layers(inner, out);
            }
            TypeExpr::Pointer(inner) => {
                out.push('*');
                Self::layers(inner, out);
            }
            TypeExpr::Array { length, element } => {
                out.push('[');
                out.push_str(length);
                out.push(']');
                Self::layers(element, out);
            }
        }
    }
}

impl Renderer for TypeRenderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        _dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError> {
        let Printable::Type(ty) = item else {
            return Err(mismatch(PrintKind::Type, item));
        };
        let mut out = String::new();
        if ty.is_error_union() {
            out.push('!');
        }
        Self::layers(ty, &mut out);
        Ok(out)
    }
}

/// Canonical function form; extern wins over export, and a bodiless
/// declaration terminates with `;`.
pub struct FunctionRenderer;

impl Renderer for FunctionRenderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError> {
        let Printable::Function(func) = item else {
            return Err(mismatch(PrintKind::Function, item));
        };

        let mut out = String::new();
        if func.is_public() {
            out.push_str("pub ");
        }
        if func.is_extern() {
            out.push_str("extern ");
        } else if func.is_export() {
            out.push_str("export ");
        }
        out.push_str("fn ");
        out.push_str(func.name());
        out.push('(');
        for (index, param) in func.params()?.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            if param.is_comptime {
                out.push_str("comptime ");
            }
            out.push_str(&param.name);
            out.push_str(": ");
            out.push_str(&dispatcher.print(&Printable::Type(&param.ty))?);
        }
        out.push_str(") ");
        out.push_str(&dispatcher.print(&Printable::Type(func.return_type()?))?);

        match func.body() {
            Some(body) => {
                out.push(' ');
                out.push_str(body);
            }
            None => out.push(';'),
        }
        Ok(out)
    }
}

/// Canonical variable form; extern declarations carry no initializer.
pub struct VariableRenderer;

impl Renderer for VariableRenderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError> {
        let Printable::Variable(var) = item else {
            return Err(mismatch(PrintKind::Variable, item));
        };

        let mut out = String::new();
        if var.is_public() {
            out.push_str("pub ");
        }
        if var.is_extern() {
            out.push_str("extern ");
        }
        if var.is_export() {
            out.push_str("export ");
        }
        out.push_str(if var.is_const() { "const " } else { "var " });
        out.push_str(var.name());
        if let Some(hint) = var.type_hint()? {
            out.push_str(": ");
            out.push_str(&dispatcher.print(&Printable::Type(hint))?);
        }
        // extern declarations never carry a value; valueless ones also
        // terminate without an initializer
        match var.value() {
            Some(value) => {
                out.push_str(" = ");
                out.push_str(value);
                out.push(';');
            }
            None => out.push(';'),
        }
        Ok(out)
    }
}

pub struct TestRenderer;

impl Renderer for TestRenderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        _dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError> {
        let Printable::Test(test) = item else {
            return Err(mismatch(PrintKind::Test, item));
        };
        match test.name() {
            Some(name) => Ok(format!("test {} {}", name, test.body())),
            None => Ok(format!("test {}", test.body())),
        }
    }
}

/// Joins the rendering of each top-level element with the dispatcher's
/// separator, in source order.
pub struct UnitRenderer;

impl Renderer for UnitRenderer {
    fn render(
        &self,
        item: &Printable<'_, '_>,
        dispatcher: &PrinterDispatcher,
    ) -> Result<String, PrintError> {
        let Printable::Unit(elements) = item else {
            return Err(mismatch(PrintKind::Unit, item));
        };
        let rendered: Vec<String> = elements
            .iter()
            .map(|element| dispatcher.print(&element.into()))
            .collect::<Result<_, _>>()?;
        Ok(rendered.join(dispatcher.separator()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TranslationUnit;
    use crate::syntax::SourceElement;

    fn print_roundtrip(source: &str) -> String {
        let unit = TranslationUnit::from_source(source);
        let elements: Vec<_> = unit
            .root_nodes()
            .into_iter()
            .filter_map(SourceElement::classify)
            .collect();
        let dispatcher = PrinterDispatcher::with_defaults();
        dispatcher.print(&Printable::Unit(&elements)).unwrap()
    }

    #[test]
    fn type_expressions_round_trip() {
        for source in ["?*[8]usize", "!?u8", "*const u32", "[]const u8", "MyType"] {
            let text = format!("fn f() {source} {{}}");
            let unit = TranslationUnit::from_source(&text);
            let func =
                crate::syntax::FunctionDeclaration::from_node(unit.root_nodes()[0]).unwrap();
            let dispatcher = PrinterDispatcher::with_defaults();
            let rendered = dispatcher
                .print(&Printable::Type(func.return_type().unwrap()))
                .unwrap();
            assert_eq!(rendered, source);
        }
    }

    #[test]
    fn function_definition_prints_canonically() {
        let rendered = print_roundtrip("pub fn add(a: u32, b: u32) u32 { return a + b; }");
        assert_eq!(rendered, "pub fn add(a: u32, b: u32) u32 { return a + b; }");
    }

    #[test]
    fn extern_prototype_prints_with_semicolon() {
        let rendered = print_roundtrip("pub extern fn f(a: *const u32) ?void;");
        assert_eq!(rendered, "pub extern fn f(a: *const u32) ?void;");
    }

    #[test]
    fn export_function_prints_modifier() {
        let rendered = print_roundtrip("export fn handler() void {}");
        assert_eq!(rendered, "export fn handler() void {}");
    }

    #[test]
    fn extern_takes_priority_over_export() {
        let unit = TranslationUnit::from_source("extern fn raw() void;");
        let func = crate::syntax::FunctionDeclaration::from_node(unit.root_nodes()[0]).unwrap();
        let dispatcher = PrinterDispatcher::with_defaults();
        let rendered = dispatcher.print(&Printable::Function(&func)).unwrap();
        assert_eq!(rendered, "extern fn raw() void;");
    }

    #[test]
    fn comptime_parameter_prints_marker() {
        let rendered = print_roundtrip("fn make(comptime T: type) void {}");
        assert_eq!(rendered, "fn make(comptime T: type) void {}");
    }

    #[test]
    fn variables_print_canonically() {
        assert_eq!(print_roundtrip("const x = 42;"), "const x = 42;");
        assert_eq!(
            print_roundtrip("pub var count: usize = 0;"),
            "pub var count: usize = 0;"
        );
        assert_eq!(
            print_roundtrip("extern const errno: c_int;"),
            "extern const errno: c_int;"
        );
    }

    #[test]
    fn valueless_variable_prints_without_initializer() {
        assert_eq!(print_roundtrip("var x: u32;"), "var x: u32;");
    }

    #[test]
    fn tests_print_canonically() {
        assert_eq!(print_roundtrip("test {}"), "test {}");
        assert_eq!(
            print_roundtrip("test \"empty\" {}"),
            "test \"empty\" {}"
        );
    }

    #[test]
    fn unit_joins_with_configured_separator() {
        let unit = TranslationUnit::from_source("const a = 1;\nconst b = 2;\nconst c = 3;");
        let elements: Vec<_> = unit
            .root_nodes()
            .into_iter()
            .filter_map(SourceElement::classify)
            .collect();

        let mut dispatcher = PrinterDispatcher::with_defaults();
        let rendered = dispatcher.print(&Printable::Unit(&elements)).unwrap();
        assert_eq!(rendered, "const a = 1;\n\nconst b = 2;\n\nconst c = 3;");
        assert_eq!(rendered.matches("\n\n").count(), 2);

        dispatcher.set_separator("\n");
        let rendered = dispatcher.print(&Printable::Unit(&elements)).unwrap();
        assert_eq!(rendered, "const a = 1;\nconst b = 2;\nconst c = 3;");
    }
}
