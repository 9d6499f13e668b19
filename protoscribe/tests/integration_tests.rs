//! Integration tests for the protoscribe pipeline.
//!
//! These tests exercise the full compile path: packaging, name resolution,
//! import graph resolution, planning and emission.

use protoscribe::ir::{
    Field, FieldLabel, FieldType, IrNamespace, IrProgram, ScalarType, TypeDef,
};
use protoscribe::{
    CompileError, CompilerConfig, ManualPackaging, PackagingPolicy, ProtoCompiler, Syntax,
    DUMP_FILE_NAME,
};

/// Namespace with one message referencing the given identities.
fn node_namespace(name: &str, refs: &[&str]) -> IrNamespace {
    let fields = refs
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Field::new(
                format!("link{i}"),
                i as u32 + 1,
                FieldLabel::Optional,
                FieldType::reference(*r),
            )
        })
        .collect();
    IrNamespace::new(name).with_type(TypeDef::message("Node", format!("{name}.Node"), fields))
}

/// Namespace defining one message `Bar`.
fn bar_namespace(name: &str) -> IrNamespace {
    IrNamespace::new(name).with_type(TypeDef::message(
        "Bar",
        format!("{name}.Bar"),
        vec![Field::new(
            "value",
            1,
            FieldLabel::Optional,
            FieldType::Scalar(ScalarType::String),
        )],
    ))
}

fn shared_manual() -> PackagingPolicy {
    PackagingPolicy::Manual(
        ManualPackaging::from_entries(vec![
            ("A".to_string(), "shared".to_string()),
            ("B".to_string(), "shared".to_string()),
        ])
        .unwrap(),
    )
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_compile_twice_is_byte_identical() {
    let build = || {
        IrProgram::new()
            .with_namespace(node_namespace("My.Game", &["My.Shared.Node"]))
            .with_namespace(node_namespace("My.Shared", &[]))
            .with_namespace(bar_namespace("Other"))
    };
    let config = CompilerConfig {
        syntax: Syntax::Proto3,
        ..CompilerConfig::default()
    };

    let first = ProtoCompiler::new(build(), config.clone()).compile().unwrap();
    let second = ProtoCompiler::new(build(), config).compile().unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Import graph
// =============================================================================

#[test]
fn test_imports_match_edges_exactly() {
    let program = IrProgram::new()
        .with_namespace(node_namespace("A", &["B.Node", "C.Node"]))
        .with_namespace(node_namespace("B", &["C.Node"]))
        .with_namespace(node_namespace("C", &[]));

    let outputs = ProtoCompiler::new(program, CompilerConfig::default())
        .compile()
        .unwrap();

    let content = |name: &str| {
        outputs
            .iter()
            .find(|o| o.path.to_string_lossy() == name)
            .unwrap()
            .content
            .clone()
    };

    let a = content("A.proto");
    assert!(a.contains("import \"B.proto\";"));
    assert!(a.contains("import \"C.proto\";"));
    assert!(!a.contains("import \"A.proto\";"));

    let b = content("B.proto");
    assert!(b.contains("import \"C.proto\";"));
    assert!(!b.contains("import \"B.proto\";"));

    assert!(!content("C.proto").contains("import"));
}

#[test]
fn test_cycle_fails_without_resolution() {
    let program = IrProgram::new()
        .with_namespace(node_namespace("A", &["B.Node"]))
        .with_namespace(node_namespace("B", &["A.Node"]));

    let err = ProtoCompiler::new(program, CompilerConfig::default())
        .compile()
        .unwrap_err();

    match err {
        CompileError::CircularDependency(err) => {
            assert_eq!(err.cycle, vec!["A.proto", "B.proto", "A.proto"]);
        }
        other => panic!("expected circular dependency error, got {other}"),
    }
}

#[test]
fn test_cycle_resolution_inlines_files() {
    let program = IrProgram::new()
        .with_namespace(node_namespace("A", &["B.Node"]))
        .with_namespace(node_namespace("B", &["A.Node"]))
        .with_namespace(node_namespace("Z", &[]));

    let config = CompilerConfig {
        resolve_circular_dependencies: true,
        // Inlining A and B into one file makes both `Node` messages share a
        // scope, so renaming must be on as well.
        resolve_name_collisions: true,
        ..CompilerConfig::default()
    };
    let outputs = ProtoCompiler::new(program, config).compile().unwrap();

    assert_eq!(outputs.len(), 2);
    let merged = outputs
        .iter()
        .find(|o| o.path.to_string_lossy() == "A.proto")
        .unwrap();
    assert!(merged.content.contains("Node_A"));
    assert!(merged.content.contains("Node_B"));
    assert!(!merged.content.contains("import"));
}

// =============================================================================
// Name collisions
// =============================================================================

#[test]
fn test_automatic_packaging_keeps_foo_namespaces_apart() {
    let program = IrProgram::new()
        .with_namespace(bar_namespace("A.Foo"))
        .with_namespace(bar_namespace("B.Foo"));

    let config = CompilerConfig {
        packaging: PackagingPolicy::Automatic { min_depth: 2 },
        ..CompilerConfig::default()
    };
    let outputs = ProtoCompiler::new(program, config).compile().unwrap();

    // Top-level segments differ, so no grouping and no collision.
    assert_eq!(outputs.len(), 2);
}

#[test]
fn test_manual_merge_collision_fails_without_resolution() {
    let program = IrProgram::new()
        .with_namespace(bar_namespace("A"))
        .with_namespace(bar_namespace("B"));

    let config = CompilerConfig {
        packaging: shared_manual(),
        ..CompilerConfig::default()
    };
    let err = ProtoCompiler::new(program, config).compile().unwrap_err();

    match err {
        CompileError::NameCollision(err) => {
            assert_eq!(err.name, "Bar");
            assert_eq!(err.first, "A.Bar");
            assert_eq!(err.second, "B.Bar");
        }
        other => panic!("expected name collision error, got {other}"),
    }
}

#[test]
fn test_manual_merge_collision_renames_deterministically() {
    let program = IrProgram::new()
        .with_namespace(bar_namespace("A"))
        .with_namespace(bar_namespace("B"));

    let config = CompilerConfig {
        packaging: shared_manual(),
        resolve_name_collisions: true,
        ..CompilerConfig::default()
    };
    let outputs = ProtoCompiler::new(program, config).compile().unwrap();

    assert_eq!(outputs.len(), 1);
    let content = &outputs[0].content;
    assert!(content.contains("message Bar_A {"));
    assert!(content.contains("message Bar_B {"));
    assert!(content.contains("package shared;"));
}

// =============================================================================
// Dump mode
// =============================================================================

#[test]
fn test_dump_mode_collapses_everything() {
    let program = IrProgram::new()
        .with_namespace(node_namespace("A", &["B.Node"]))
        .with_namespace(node_namespace("B", &["C.Node"]))
        .with_namespace(node_namespace("C", &["A.Node"]));

    let config = CompilerConfig {
        dump_mode: true,
        resolve_name_collisions: true,
        ..CompilerConfig::default()
    };
    let outputs = ProtoCompiler::new(program, config).compile().unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].path.to_string_lossy(), DUMP_FILE_NAME);
    assert!(!outputs[0].content.contains("import"));
    // All three Node messages are present under distinct names.
    assert!(outputs[0].content.contains("Node_A"));
    assert!(outputs[0].content.contains("Node_B"));
    assert!(outputs[0].content.contains("Node_C"));
}

// =============================================================================
// File options and layout
// =============================================================================

#[test]
fn test_file_options_apply_to_every_file() {
    let program = IrProgram::new()
        .with_namespace(bar_namespace("My.Game"))
        .with_namespace(bar_namespace("My.Util"));

    let mut compiler = ProtoCompiler::new(program, CompilerConfig::default());
    compiler
        .register_file_option("csharp_namespace", |ns, _| ns.name.clone())
        .unwrap();
    let outputs = compiler.compile().unwrap();

    assert_eq!(outputs.len(), 2);
    for output in &outputs {
        assert!(output.content.contains("option csharp_namespace = \""));
    }
}

#[test]
fn test_structured_layout_mirrors_packages() {
    let program = IrProgram::new().with_namespace(bar_namespace("My.Game.Net"));

    let outputs = ProtoCompiler::new(program.clone(), CompilerConfig::default())
        .compile()
        .unwrap();
    assert_eq!(outputs[0].path.to_string_lossy(), "My/Game/Net.proto");

    let flat = CompilerConfig {
        package_structured: false,
        ..CompilerConfig::default()
    };
    let outputs = ProtoCompiler::new(program, flat).compile().unwrap();
    assert_eq!(outputs[0].path.to_string_lossy(), "My.Game.Net.proto");
}

// =============================================================================
// Syntax dialects
// =============================================================================

#[test]
fn test_proto2_and_proto3_field_keywords() {
    let program = || {
        IrProgram::new().with_namespace(IrNamespace::new("A").with_type(TypeDef::message(
            "M",
            "A.M",
            vec![
                Field::new("a", 1, FieldLabel::Required, FieldType::Scalar(ScalarType::Int32)),
                Field::new("b", 2, FieldLabel::Optional, FieldType::Scalar(ScalarType::Bool)),
                Field::new("c", 3, FieldLabel::Repeated, FieldType::Scalar(ScalarType::Bytes)),
            ],
        )))
    };

    let proto2 = ProtoCompiler::new(program(), CompilerConfig::default())
        .compile()
        .unwrap();
    let content = &proto2[0].content;
    assert!(!content.contains("syntax ="));
    assert!(content.contains("required int32 a = 1;"));
    assert!(content.contains("optional bool b = 2;"));
    assert!(content.contains("repeated bytes c = 3;"));

    let proto3 = ProtoCompiler::new(
        program(),
        CompilerConfig {
            syntax: Syntax::Proto3,
            ..CompilerConfig::default()
        },
    )
    .compile()
    .unwrap();
    let content = &proto3[0].content;
    assert!(content.starts_with("syntax = \"proto3\";"));
    assert!(content.contains("int32 a = 1;"));
    assert!(!content.contains("required"));
    assert!(!content.contains("optional"));
    assert!(content.contains("repeated bytes c = 3;"));
}
