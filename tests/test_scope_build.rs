//! Symbol-table build pass over single modules.
//!
//! Covers which constructs open scopes, where each name lands, and the
//! duplicate-binding and internal-error diagnostics.

mod common;

use common::*;
use jacsym::hir::{ResolvedModules, SourceRoot, SymbolHit};
use jacsym::syntax::{AstBuilder, NodeKind, SpecialVar};
use rstest::rstest;

// ============================================================================
// NO FALSE POSITIVES
// ============================================================================

#[test]
fn test_distinct_names_produce_no_diagnostics() {
    let mut ast = module(MAIN, |b| {
        import_items(b, "os", &[("path", None), ("sep", Some("separator"))], 1);
        global(b, "count", 2);
        architype(b, "Foo", 3, |b| {
            ability(b, SpecialVar::Init, 4);
            ability(b, "talk", 5);
        });
        enumeration(b, "Color", 7);
        test_block(b, Some("check_count"), 8);
        test_block(b, None, 9);
        ability_def(b, "Foo", "talk", 10);
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let root = scopes.root_table().unwrap();
    let names: Vec<&str> = root.names().collect();
    assert_eq!(
        names,
        vec!["path", "separator", "count", "Foo", "Color", "check_count", "Foo.talk"]
    );
}

// ============================================================================
// DUPLICATES
// ============================================================================

#[test]
fn test_duplicate_global_cites_first_site() {
    let mut ast = module(MAIN, |b| {
        global(b, "x", 2);
        global(b, "x", 3);
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(
        messages(&diagnostics),
        vec!["Name used for global var 'x' already declared at main.jac, line 2"]
    );

    let diag = &diagnostics.diagnostics()[0];
    assert_eq!(diag.code, "E0004");
    assert_eq!(diag.pos.line_one_indexed(), 3);
    assert_eq!(diag.related.len(), 1);
    assert_eq!(diag.related[0].pos.line_one_indexed(), 2);

    // The first occupant survives.
    let record = scopes.root_table().unwrap().lookup_local("x").unwrap();
    assert_eq!(record.occurrence_count(), 1);
    assert_eq!(record.declaration().unwrap().pos.line_one_indexed(), 2);
}

#[test]
fn test_two_assignments_in_one_global_block() {
    let mut b = AstBuilder::new(MAIN);
    b.node(NodeKind::Module { name: "main".into() }, 1, |b| {
        b.node(NodeKind::GlobalVars { is_frozen: true }, 2, |b| {
            assignment(b, "a", 2);
            assignment(b, "a", 2);
        });
    });
    let mut ast = b.build();

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(diagnostics.duplicate_count(), 1);
}

#[rstest]
#[case::architype_over_global("architype 'Shape' already declared at main.jac, line 2")]
#[case::enum_over_architype("enum 'Shape' already declared at main.jac, line 2")]
#[case::test_over_test("test 'Shape' already declared at main.jac, line 2")]
#[case::import_over_global("import item 'Shape' already declared at main.jac, line 2")]
fn test_duplicate_label_follows_second_construct(#[case] expected_tail: &str) {
    let label = expected_tail.split(' ').next().unwrap();
    let mut ast = module(MAIN, |b| {
        match label {
            "architype" | "import" => {
                global(b, "Shape", 2);
            }
            "enum" => {
                architype(b, "Shape", 2, |_| {});
            }
            _ => {
                test_block(b, Some("Shape"), 2);
            }
        }
        match label {
            "architype" => {
                architype(b, "Shape", 5, |_| {});
            }
            "enum" => {
                enumeration(b, "Shape", 5);
            }
            "import" => {
                import_items(b, "shapes", &[("Square", Some("Shape"))], 5);
            }
            _ => {
                test_block(b, Some("Shape"), 5);
            }
        }
    });

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(
        messages(&diagnostics),
        vec![format!("Name used for {expected_tail}")]
    );
    assert_eq!(diagnostics.diagnostics()[0].pos.line_one_indexed(), 5);
}

#[test]
fn test_duplicate_ability_in_one_body() {
    let mut ast = module(MAIN, |b| {
        architype(b, "Foo", 2, |b| {
            ability(b, SpecialVar::Init, 3);
            ability(b, SpecialVar::Init, 6);
        });
    });

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(
        messages(&diagnostics),
        vec!["Name used for ability 'Foo.__init__' already declared at main.jac, line 3"]
    );
}

#[test]
fn test_duplicate_ability_definition() {
    let mut ast = module(MAIN, |b| {
        ability_def(b, "Foo", "talk", 4);
        ability_def(b, "Foo", "talk", 9);
    });

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(
        messages(&diagnostics),
        vec!["Name used for ability def 'Foo.talk' already declared at main.jac, line 4"]
    );
}

#[test]
fn test_same_name_in_different_scopes_is_allowed() {
    let mut ast = module(MAIN, |b| {
        test_block(b, Some("run"), 2);
        architype(b, "Foo", 3, |b| {
            architype(b, "run", 4, |_| {});
        });
    });

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

// ============================================================================
// ABILITY QUALIFICATION
// ============================================================================

#[test]
fn test_constructors_of_different_types_do_not_collide() {
    let mut foo = None;
    let mut bar = None;
    let mut ast = module(MAIN, |b| {
        architype(b, "Foo", 2, |b| {
            foo = Some(ability(b, SpecialVar::Init, 3));
        });
        architype(b, "Bar", 5, |b| {
            bar = Some(ability(b, SpecialVar::Init, 6));
        });
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert!(diagnostics.is_empty());

    // Each ability is keyed in its own architype's body table.
    let foo = foo.unwrap();
    let foo_arch = ast.parent(ast.parent(foo).unwrap()).unwrap();
    let foo_table = &scopes.tree[ast.scope_of(foo_arch).unwrap()];
    assert!(foo_table.contains("Foo.__init__"));
    assert!(!foo_table.contains("Bar.__init__"));

    let bar = bar.unwrap();
    let bar_arch = ast.parent(ast.parent(bar).unwrap()).unwrap();
    assert!(scopes.tree[ast.scope_of(bar_arch).unwrap()].contains("Bar.__init__"));
}

#[test]
fn test_declaration_and_definition_share_a_key() {
    let mut arch = None;
    let mut def = None;
    let mut ast = module(MAIN, |b| {
        arch = Some(architype(b, "Foo", 2, |b| {
            ability(b, "talk", 3);
        }));
        def = Some(ability_def(b, "Foo", "talk", 8));
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let body = &scopes.tree[ast.scope_of(arch.unwrap()).unwrap()];
    let declared = body.lookup_local("Foo.talk").unwrap();
    assert_eq!(declared.representative().unwrap().0, SymbolHit::Declaration);

    let root = scopes.root_table().unwrap();
    let defined = root.lookup_local("Foo.talk").unwrap();
    assert_eq!(defined.declaration(), None);
    assert_eq!(defined.definitions().len(), 1);
    assert_eq!(defined.definitions()[0].node.node, def.unwrap());
}

#[test]
fn test_bad_definition_target_falls_back_to_simple_name() {
    let mut ast = module(MAIN, |b| {
        b.node(NodeKind::AbilityDef, 4, |b| {
            b.node(NodeKind::DottedNameList, 4, |b| {
                b.leaf(NodeKind::Name { value: "Foo".into() }, 4);
            });
            b.leaf(
                NodeKind::ArchRef {
                    name: "talk".into(),
                    kind: jacsym::syntax::RefKind::Ability,
                },
                4,
            );
        });
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(diagnostics.internal_count(), 1);
    assert!(diagnostics.diagnostics()[0].message.starts_with("Expected reference to Architype!"));
    assert!(scopes.root_table().unwrap().contains("talk"));
}

// ============================================================================
// SCOPE SHAPE
// ============================================================================

#[test]
fn test_scope_owners_are_bound_to_their_body() {
    let mut arch = None;
    let mut talk = None;
    let mut ast = module(MAIN, |b| {
        arch = Some(architype(b, "Foo", 2, |b| {
            talk = Some(ability(b, "talk", 3));
        }));
    });

    let (scopes, _) = resolve(&mut ast, &ResolvedModules::new());
    let root = scopes.root.unwrap();
    let module_node = ast.root().unwrap();
    assert_eq!(ast.scope_of(module_node), Some(root));

    let arch_scope = ast.scope_of(arch.unwrap()).unwrap();
    assert_eq!(scopes.tree[arch_scope].parent(), Some(root));

    let talk_scope = ast.scope_of(talk.unwrap()).unwrap();
    assert_eq!(scopes.tree[talk_scope].parent(), Some(arch_scope));
    // The module root is parentless.
    assert_eq!(scopes.tree[root].parent(), None);
}

#[test]
fn test_every_node_is_bound() {
    let mut ast = module(MAIN, |b| {
        global(b, "x", 2);
        architype(b, "Foo", 3, |b| {
            ability(b, "go", 4);
        });
        enumeration(b, "E", 6);
    });

    resolve(&mut ast, &ResolvedModules::new());
    assert!(ast.iter().all(|(_, node)| node.scope.is_some()));
}

#[test]
fn test_implementation_blocks_share_enclosing_scope() {
    let mut inner = None;
    let mut ast = module(MAIN, |b| {
        b.node(NodeKind::ArchDef, 2, |b| {
            b.node(NodeKind::ArchBlock, 2, |b| {
                inner = Some(b.leaf(NodeKind::HasVar, 3));
            });
        });
    });

    let (scopes, _) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(ast.scope_of(inner.unwrap()), scopes.root);
}

#[test]
fn test_enum_scope_is_closed_on_exit() {
    let mut after = None;
    let mut ast = module(MAIN, |b| {
        enumeration(b, "Color", 2);
        after = Some(global(b, "late", 4));
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert!(diagnostics.is_empty());
    assert_eq!(ast.scope_of(after.unwrap()), scopes.root);

    let root = scopes.root_table().unwrap();
    assert!(root.contains("Color"));
    assert!(root.contains("late"));
}

#[test]
fn test_import_items_use_alias_and_import_node() {
    let mut import = None;
    let mut ast = module(MAIN, |b| {
        import = Some(import_items(b, "os", &[("path", Some("p")), ("sep", None)], 2));
    });

    let (scopes, _) = resolve(&mut ast, &ResolvedModules::new());
    let root = scopes.root_table().unwrap();
    assert!(!root.contains("path"));
    let p = root.lookup_local("p").unwrap();
    assert_eq!(p.declaration().unwrap().node.node, import.unwrap());
    assert!(root.contains("sep"));
}

// ============================================================================
// INTERNAL ERRORS
// ============================================================================

#[test]
fn test_missing_module_link_is_internal_error() {
    let mut ast = module(MAIN, |b| {
        b.node(NodeKind::GlobalVars { is_frozen: false }, 2, |b| {
            b.unlinked();
            assignment(b, "x", 2);
        });
        global(b, "x", 3);
    });

    let (_, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(diagnostics.internal_count(), 1);
    assert_eq!(diagnostics.duplicate_count(), 1);

    let dup = diagnostics
        .diagnostics()
        .iter()
        .find(|d| !d.is_internal())
        .unwrap();
    assert!(dup.message.contains("<unknown module>"), "{}", dup.message);
    assert_eq!(dup.related[0].file, None);
}

#[test]
fn test_unregistered_module_is_internal_error() {
    let mut ast = module(MAIN, |b| {
        global(b, "x", 2);
        global(b, "x", 3);
    });

    let (_, diagnostics) = resolve_with(&mut ast, &SourceRoot::new(), &ResolvedModules::new());
    assert_eq!(diagnostics.internal_count(), 1);
    assert_eq!(diagnostics.duplicate_count(), 1);
    assert!(
        diagnostics
            .diagnostics()
            .iter()
            .any(|d| &*d.message == "Name used for global var 'x' already declared at module#0, line 2")
    );
}

#[test]
fn test_global_target_must_be_a_name() {
    let mut ast = module(MAIN, |b| {
        b.node(NodeKind::GlobalVars { is_frozen: false }, 2, |b| {
            b.node(NodeKind::Assignment, 2, |b| {
                b.leaf(NodeKind::AtomTrailer, 2);
                b.leaf(NodeKind::Constant { value: "1".into() }, 2);
            });
        });
    });

    let (scopes, diagnostics) = resolve(&mut ast, &ResolvedModules::new());
    assert_eq!(diagnostics.internal_count(), 1);
    assert!(diagnostics.diagnostics()[0].message.contains("atom trailer"));
    assert!(scopes.root_table().unwrap().is_empty());
}
