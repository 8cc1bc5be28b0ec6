use pretty_assertions::assert_eq;

use super::*;

#[test]
fn resolves_both_ends_to_line_and_column() {
    let source = "class Foo {\n  void bar() {}\n}\n";
    let generated = "@interface Foo\n- (void)bar;\n@end\n";
    let mappings = vec![SourceMapping {
        identifier: "bar".to_owned(),
        source: Span::new(19, 22),
        generated: 23..26,
    }];
    let resolved = resolve(&mappings, &LineIndex::build(source), generated);
    assert_eq!(
        resolved,
        vec![LineMapping {
            identifier: "bar".to_owned(),
            source_line: 2,
            source_column: 8,
            generated_line: 2,
            generated_column: 9,
        }]
    );
}

#[test]
fn shifting_moves_the_generated_range() {
    let m = SourceMapping {
        identifier: "x".to_owned(),
        source: Span::new(0, 1),
        generated: 3..4,
    };
    assert_eq!(m.shifted(10).generated, 13..14);
}
