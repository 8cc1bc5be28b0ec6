use pretty_assertions::assert_eq;
use xlat_ir::{QualifiedName, Span};

use super::*;
use crate::{MemoryManagement, Supertype};

fn name(dotted: &str) -> QualifiedName {
    QualifiedName::top_level(dotted)
}

fn artifact(text: &str) -> Artifact {
    Artifact {
        text: text.to_owned(),
        mappings: Vec::new(),
    }
}

fn generated(objc: &str, header: &str) -> GeneratedType {
    GeneratedType {
        name: name(&format!("unit.{objc}")),
        objc_name: objc.to_owned(),
        header: header.to_owned(),
        exported: true,
        declaration: artifact(&format!("@interface {objc} : NSObject\n@end\n")),
        private_declaration: Artifact::default(),
        implementation: artifact(&format!("@implementation {objc}\n@end\n")),
        forward: Vec::new(),
        supertypes: Vec::new(),
        references: Vec::new(),
        body_includes: BTreeSet::new(),
    }
}

fn supertype(objc: &str, header: Option<&str>) -> Supertype {
    Supertype {
        name: name(&format!("unit.{objc}")),
        objc_name: objc.to_owned(),
        header: header.map(str::to_owned),
    }
}

fn files(types: &[GeneratedType], options: &Options) -> Vec<GeneratedFile> {
    unit_files("unit/Example", "unit/Example.java", types, options)
}

// ── Headers ──

#[test]
fn segmented_header_layout() {
    let mut ty = generated("UnitExample", "unit/Example.h");
    ty.supertypes = vec![supertype("UnitBase", Some("unit/Base.h"))];
    ty.forward = vec!["@class UnitOther;".to_owned()];
    let out = files(&[ty], &Options::default());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].path, "unit/Example.h");
    assert_eq!(out[0].kind, FileKind::Header);
    assert_eq!(
        out[0].text,
        "//\n\
         //  Generated by the J2ObjC translator.  DO NOT EDIT!\n\
         //  source: unit/Example.java\n\
         //\n\
         \n\
         #include \"J2ObjC_header.h\"\n\
         \n\
         #pragma push_macro(\"INCLUDE_ALL_UnitExample\")\n\
         #ifdef RESTRICT_UnitExample\n\
         #define INCLUDE_ALL_UnitExample 0\n\
         #else\n\
         #define INCLUDE_ALL_UnitExample 1\n\
         #endif\n\
         #undef RESTRICT_UnitExample\n\
         \n\
         #if !defined (UnitExample_) && (INCLUDE_ALL_UnitExample || defined(INCLUDE_UnitExample))\n\
         #define UnitExample_\n\
         \n\
         #define RESTRICT_UnitBase 1\n\
         #define INCLUDE_UnitBase 1\n\
         #include \"unit/Base.h\"\n\
         \n\
         @class UnitOther;\n\
         \n\
         @interface UnitExample : NSObject\n\
         @end\n\
         \n\
         #endif\n\
         \n\
         #pragma pop_macro(\"INCLUDE_ALL_UnitExample\")\n"
    );
}

#[test]
fn local_supertypes_are_enabled_by_their_subtypes() {
    let base = generated("UnitExample", "unit/Example.h");
    let mut sub = generated("UnitExample_Sub", "unit/Example.h");
    sub.supertypes = vec![supertype("UnitExample", Some("unit/Example.h"))];
    let out = files(&[base, sub], &Options::default());
    let header = &out[0].text;
    assert!(header.contains(
        "#undef RESTRICT_UnitExample\n\
         #ifdef INCLUDE_UnitExample_Sub\n\
         #define INCLUDE_UnitExample 1\n\
         #endif\n"
    ));
    assert!(!header.contains("#include \"unit/Example.h\""));
    let base_at = header.find("#define UnitExample_\n");
    let sub_at = header.find("#define UnitExample_Sub_\n");
    assert!(base_at < sub_at);
}

#[test]
fn plain_header_layout() {
    let mut ty = generated("UnitExample", "unit/Example.h");
    ty.supertypes = vec![
        supertype("UnitZeta", Some("unit/Zeta.h")),
        supertype("UnitAlpha", Some("unit/Alpha.h")),
        supertype("JavaLangRunnable", None),
    ];
    ty.forward = vec!["@class UnitOther;".to_owned()];
    let options = Options {
        segmented_headers: false,
        ..Options::default()
    };
    let out = files(&[ty], &options);
    assert_eq!(
        out[0].text,
        "//\n\
         //  Generated by the J2ObjC translator.  DO NOT EDIT!\n\
         //  source: unit/Example.java\n\
         //\n\
         \n\
         #ifndef UnitExample_H\n\
         #define UnitExample_H\n\
         \n\
         #include \"J2ObjC_header.h\"\n\
         #include \"unit/Alpha.h\"\n\
         #include \"unit/Zeta.h\"\n\
         \n\
         @class UnitOther;\n\
         \n\
         @interface UnitExample : NSObject\n\
         @end\n\
         \n\
         #endif // UnitExample_H\n"
    );
}

#[test]
fn nullability_wraps_declarations() {
    let options = Options {
        nullability: true,
        ..Options::default()
    };
    let out = files(&[generated("UnitExample", "unit/Example.h")], &options);
    let header = &out[0].text;
    let begin = header.find("NS_ASSUME_NONNULL_BEGIN");
    let decl = header.find("@interface UnitExample");
    let end = header.find("NS_ASSUME_NONNULL_END");
    assert!(begin.is_some());
    assert!(begin < decl && decl < end);
}

// ── Implementation files ──

#[test]
fn implementation_layout() {
    let mut ty = generated("UnitExample", "unit/Example.h");
    ty.supertypes = vec![supertype("UnitBase", Some("unit/Base.h"))];
    ty.body_includes = ["java/util/List.h", "unit/Base.h", "unit/Example.h"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    ty.private_declaration = artifact("@interface UnitExample () {\n}\n@end\n");
    let out = files(&[ty], &Options::default());
    assert_eq!(out[1].path, "unit/Example.m");
    assert_eq!(out[1].kind, FileKind::Implementation);
    assert_eq!(
        out[1].text,
        "//\n\
         //  Generated by the J2ObjC translator.  DO NOT EDIT!\n\
         //  source: unit/Example.java\n\
         //\n\
         \n\
         #include \"J2ObjC_source.h\"\n\
         #include \"unit/Example.h\"\n\
         #include \"java/util/List.h\"\n\
         \n\
         #if __has_feature(objc_arc)\n\
         #error \"unit/Example must not be compiled with ARC (-fobjc-arc)\"\n\
         #endif\n\
         \n\
         @interface UnitExample () {\n\
         }\n\
         @end\n\
         \n\
         @implementation UnitExample\n\
         @end\n"
    );
}

#[test]
fn arc_guard() {
    let options = Options {
        memory_management: MemoryManagement::Arc,
        ..Options::default()
    };
    let out = files(&[generated("UnitExample", "unit/Example.h")], &options);
    assert!(out[1].text.contains(
        "#if !__has_feature(objc_arc)\n\
         #error \"unit/Example must be compiled with ARC (-fobjc-arc)\"\n\
         #endif\n"
    ));
}

#[test]
fn hidden_types_are_declared_in_the_implementation() {
    let main = generated("UnitExample", "unit/Example.h");
    let mut hidden = generated("UnitExample_1", "unit/Example.h");
    hidden.exported = false;
    hidden.forward = vec!["@protocol JavaLangRunnable;".to_owned()];
    hidden.supertypes = vec![supertype("UnitTask", Some("unit/Task.h"))];
    let out = files(&[main, hidden], &Options::default());
    assert!(!out[0].text.contains("UnitExample_1"));
    let m = &out[1].text;
    assert!(m.contains("#include \"unit/Task.h\"\n"));
    assert!(m.contains(
        "@protocol JavaLangRunnable;\n\
         \n\
         @interface UnitExample_1 : NSObject\n\
         @end\n"
    ));
    let decl = m.find("@interface UnitExample_1");
    let body = m.find("@implementation UnitExample\n");
    assert!(decl < body);
}

#[test]
fn separate_headers_split_nested_types() {
    let main = generated("UnitExample", "unit/Example.h");
    let inner = generated("UnitExample_Inner", "unit/Example_Inner.h");
    let mut hidden = generated("UnitExample_Secret", "unit/Example_Secret.h");
    hidden.exported = false;
    let out = files(&[main, inner, hidden], &Options::default());
    let paths: Vec<&str> = out.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "unit/Example.h",
            "unit/Example.m",
            "unit/Example_Inner.h",
            "unit/Example_Inner.m",
        ]
    );
    assert!(out[1].text.contains("@interface UnitExample_Secret"));
    assert!(out[2]
        .text
        .contains("#pragma push_macro(\"INCLUDE_ALL_UnitExample_Inner\")"));
}

#[test]
fn empty_unit_has_no_files() {
    assert!(files(&[], &Options::default()).is_empty());
}

// ── Mappings ──

#[test]
fn mappings_are_shifted_into_file_offsets() {
    let mut ty = generated("UnitExample", "unit/Example.h");
    ty.declaration = Artifact {
        text: "- (void)run;\n".to_owned(),
        mappings: vec![SourceMapping {
            identifier: "run".to_owned(),
            source: Span::new(10, 13),
            generated: 8..11,
        }],
    };
    let out = files(&[ty], &Options::default());
    let header = &out[0];
    let mapping = &header.mappings[0];
    assert_eq!(&header.text[mapping.generated.clone()], "run");
}

// ── Combined output ──

#[test]
fn combined_pair() {
    let a = generated("UnitA", "unit/A.h");
    let mut b = generated("UnitB", "unit/B.h");
    b.supertypes = vec![supertype("UnitA", Some("unit/A.h"))];
    let out = combined_files(
        "combined.h",
        &["unit/A.java", "unit/B.java"],
        &[&a, &b],
        &Options::default(),
    );
    assert_eq!(out[0].path, "combined.h");
    assert_eq!(out[1].path, "combined.m");
    let header = &out[0].text;
    assert!(header.contains("//  source: unit/A.java\n//  source: unit/B.java\n"));
    assert!(header.contains("#pragma push_macro(\"INCLUDE_ALL_Combined\")"));
    assert!(!header.contains("#include \"unit/A.h\""));
    let m = &out[1].text;
    assert!(m.contains("#include \"combined.h\"\n"));
    assert!(!m.contains("#include \"unit/A.h\""));
    assert!(!m.contains("#include \"unit/B.h\""));
}
