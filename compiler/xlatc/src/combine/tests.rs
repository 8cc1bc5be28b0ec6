#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use xlat_codegen::{Artifact, Supertype};

use super::*;

fn name(dotted: &str) -> QualifiedName {
    QualifiedName::top_level(dotted)
}

fn generated(dotted: &str, objc: &str) -> GeneratedType {
    GeneratedType {
        name: name(dotted),
        objc_name: objc.to_owned(),
        header: format!("{}.h", dotted.replace('.', "/")),
        exported: true,
        declaration: Artifact {
            text: format!("@interface {objc} : NSObject\n@end\n"),
            mappings: Vec::new(),
        },
        private_declaration: Artifact::default(),
        implementation: Artifact {
            text: format!("@implementation {objc}\n@end\n"),
            mappings: Vec::new(),
        },
        forward: Vec::new(),
        supertypes: Vec::new(),
        references: Vec::new(),
        body_includes: BTreeSet::new(),
    }
}

// ── Header mapping ──

#[test]
fn mapping_lines_are_sorted_by_type_name() {
    let mut mapping = HeaderMapping::new();
    mapping.insert(&name("com.example.Zed"), "com/example/Zed.h");
    mapping.insert(&name("com.example.Foo"), "com/example/Foo.h");
    assert_eq!(
        mapping.to_string(),
        "com.example.Foo=com/example/Foo.h\ncom.example.Zed=com/example/Zed.h\n"
    );
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.get(&name("com.example.Foo")), Some("com/example/Foo.h"));
}

#[test]
fn first_header_wins() {
    let mut mapping = HeaderMapping::new();
    mapping.insert(&name("a.A"), "a/A.h");
    mapping.insert(&name("a.A"), "Other.h");
    assert_eq!(mapping.get(&name("a.A")), Some("a/A.h"));
}

#[test]
fn parse_reads_written_mappings() {
    let text = "# generated\n\ncom.example.Foo = com/example/Foo.h\na.B=All.h\n";
    let mapping = HeaderMapping::parse(text).unwrap();
    let entries: Vec<(&str, &str)> = mapping.iter().collect();
    assert_eq!(
        entries,
        vec![("a.B", "All.h"), ("com.example.Foo", "com/example/Foo.h")]
    );
    assert_eq!(HeaderMapping::parse(&mapping.to_string()).unwrap(), mapping);
}

#[test]
fn parse_rejects_lines_without_a_path() {
    let err = HeaderMapping::parse("a.A=a/A.h\na.B=\n").unwrap_err();
    assert_eq!(
        err,
        MappingError {
            line: 2,
            text: "a.B=".to_owned(),
        }
    );
    assert!(HeaderMapping::parse("just-a-name").is_err());
    assert!(HeaderMapping::parse("").unwrap().is_empty());
}

// ── Combining ──

#[test]
fn combine_orders_supertypes_first() {
    let mut sub = generated("p.Sub", "PSub");
    sub.supertypes = vec![Supertype {
        name: name("p.Base"),
        objc_name: "PBase".to_owned(),
        header: Some("p/Base.h".to_owned()),
    }];
    let base = generated("p.Base", "PBase");
    let out = combine("All", &["p/Sub.java", "p/Base.java"], &[&sub, &base], &Options::default());
    assert_eq!(out.files.len(), 2);
    let header = &out.files[0].text;
    assert!(header.find("@interface PBase") < header.find("@interface PSub"));
    assert!(out.notes.is_empty());
    assert_eq!(out.mapping.get(&name("p.Sub")), Some("All.h"));
}

#[test]
fn reference_cycles_are_noted() {
    let mut node = generated("p.Node", "PNode");
    node.references = vec![name("p.Tree")];
    let mut tree = generated("p.Tree", "PTree");
    tree.references = vec![name("p.Node")];
    let out = combine("All", &["p/Node.java"], &[&node, &tree], &Options::default());
    assert_eq!(out.notes.len(), 1);
    assert!(matches!(out.notes[0], OrderNote::ForwardDeclared { .. }));
    assert_eq!(out.mapping.len(), 2);
}

#[test]
fn hidden_types_are_not_mapped() {
    let main = generated("p.Main", "PMain");
    let mut hidden = generated("p.Main.1", "PMain_1");
    hidden.exported = false;
    let out = combine("All", &["p/Main.java"], &[&main, &hidden], &Options::default());
    assert_eq!(out.mapping.len(), 1);
    assert!(out.files[1].text.contains("@interface PMain_1"));
}
