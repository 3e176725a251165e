//! Tree-building helpers shared by the integration tests.
#![allow(dead_code)]

use jacsym::hir::{DiagnosticCollector, ModuleScopes, ResolvedModules, SourceRoot, build_module_scopes};
use jacsym::syntax::{ArchType, Ast, AstBuilder, NodeId, NodeKind, RefKind, RefName};
use jacsym::FileId;

pub const MAIN: FileId = FileId(0);
pub const LIB: FileId = FileId(1);

/// Source root with `main.jac` and `lib.jac` registered.
pub fn source_root() -> SourceRoot {
    let mut root = SourceRoot::new();
    root.insert(MAIN, "/work/main.jac", "main.jac");
    root.insert(LIB, "/work/lib.jac", "lib.jac");
    root
}

/// Build a module tree: `Module > Elements > body`.
pub fn module(file: FileId, body: impl FnOnce(&mut AstBuilder)) -> Ast {
    let mut b = AstBuilder::new(file);
    b.node(NodeKind::Module { name: "main".into() }, 1, |b| {
        b.node(NodeKind::Elements, 1, body);
    });
    b.build()
}

/// Run the pass over `ast` with the default source root.
pub fn resolve(ast: &mut Ast, resolved: &ResolvedModules) -> (ModuleScopes, DiagnosticCollector) {
    resolve_with(ast, &source_root(), resolved)
}

pub fn resolve_with(
    ast: &mut Ast,
    source_root: &SourceRoot,
    resolved: &ResolvedModules,
) -> (ModuleScopes, DiagnosticCollector) {
    let mut diagnostics = DiagnosticCollector::new();
    let scopes = build_module_scopes(ast, source_root, resolved, &mut diagnostics)
        .expect("walk should stay balanced");
    (scopes, diagnostics)
}

pub fn messages(diagnostics: &DiagnosticCollector) -> Vec<String> {
    diagnostics.diagnostics().iter().map(|d| d.message.to_string()).collect()
}

/// `glob name = 1;` on one line.
pub fn global(b: &mut AstBuilder, name: &str, line: u32) -> NodeId {
    let mut assign = None;
    b.node(NodeKind::GlobalVars { is_frozen: false }, line, |b| {
        b.node(NodeKind::AssignmentList, line, |b| {
            assign = Some(assignment(b, name, line));
        });
    });
    assign.expect("assignment was built")
}

pub fn assignment(b: &mut AstBuilder, target: &str, line: u32) -> NodeId {
    b.node(NodeKind::Assignment, line, |b| {
        b.leaf(NodeKind::Name { value: target.into() }, line);
        b.leaf(NodeKind::Constant { value: "1".into() }, line);
    })
}

/// An object architype whose body is filled by `body`.
pub fn architype(b: &mut AstBuilder, name: &str, line: u32, body: impl FnOnce(&mut AstBuilder)) -> NodeId {
    b.node(
        NodeKind::Architype {
            name: name.into(),
            arch_type: ArchType::Object,
        },
        line,
        |b| {
            b.node(NodeKind::ArchBlock, line, body);
        },
    )
}

pub fn ability(b: &mut AstBuilder, name: impl Into<RefName>, line: u32) -> NodeId {
    b.node(NodeKind::Ability { name: name.into() }, line, |b| {
        b.leaf(NodeKind::CodeBlock, line);
    })
}

/// `:obj:Owner:can:name { }` with the target path `owner`.
pub fn ability_def(b: &mut AstBuilder, owner: &str, name: &str, line: u32) -> NodeId {
    b.node(NodeKind::AbilityDef, line, |b| {
        b.node(NodeKind::DottedNameList, line, |b| {
            b.leaf(
                NodeKind::ArchRef {
                    name: owner.into(),
                    kind: RefKind::Object,
                },
                line,
            );
        });
        b.leaf(
            NodeKind::ArchRef {
                name: name.into(),
                kind: RefKind::Ability,
            },
            line,
        );
        b.leaf(NodeKind::CodeBlock, line);
    })
}

pub fn enumeration(b: &mut AstBuilder, name: &str, line: u32) -> NodeId {
    b.node(NodeKind::Enum { name: name.into() }, line, |b| {
        b.node(NodeKind::EnumBlock, line, |b| {
            b.leaf(NodeKind::Name { value: "A".into() }, line);
        });
    })
}

pub fn test_block(b: &mut AstBuilder, name: Option<&str>, line: u32) -> NodeId {
    b.node(NodeKind::Test { name: name.map(Into::into) }, line, |b| {
        b.leaf(NodeKind::CodeBlock, line);
    })
}

/// `import:py from path { name as alias, .. }`.
pub fn import_items(b: &mut AstBuilder, path: &str, items: &[(&str, Option<&str>)], line: u32) -> NodeId {
    b.node(
        NodeKind::Import {
            lang: "py".into(),
            is_absorb: false,
            sub_module: None,
        },
        line,
        |b| {
            b.leaf(NodeKind::ModulePath { path: path.into() }, line);
            b.node(NodeKind::ModuleItems, line, |b| {
                for (name, alias) in items {
                    b.leaf(
                        NodeKind::ModuleItem {
                            name: (*name).into(),
                            alias: alias.map(Into::into),
                        },
                        line,
                    );
                }
            });
        },
    )
}

/// `include:jac path;` linked to `target`.
pub fn include(b: &mut AstBuilder, path: &str, target: Option<FileId>, line: u32) -> NodeId {
    b.node(
        NodeKind::Import {
            lang: "jac".into(),
            is_absorb: true,
            sub_module: target,
        },
        line,
        |b| {
            b.leaf(NodeKind::ModulePath { path: path.into() }, line);
        },
    )
}
