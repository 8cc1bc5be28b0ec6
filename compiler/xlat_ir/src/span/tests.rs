use pretty_assertions::assert_eq;

use super::*;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 9);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 9));
}

#[test]
fn slice_reads_source() {
    let src = "int x = a < b;";
    assert_eq!(Span::new(8, 13).slice(src), Some("a < b"));
    assert_eq!(Span::new(8, 99).slice(src), None);
}

#[test]
fn line_index_lookups() {
    let src = "class A {\n  int x;\n}\n";
    let index = LineIndex::build(src);
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.line(0), 1);
    assert_eq!(index.line(9), 1);
    assert_eq!(index.line(10), 2);
    assert_eq!(index.line_col(12), (2, 3));
    assert_eq!(index.line(19), 3);
}

#[test]
fn dummy_span() {
    assert!(Span::DUMMY.is_dummy());
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::new(3, 7).len(), 4);
}

mod proptest_lines {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Lookups agree with counting newlines before the offset.
        #[test]
        fn line_col_counts_newlines(src in "[a-z \n]{1,80}", pick in any::<prop::sample::Index>()) {
            let offset = pick.index(src.len());
            let before = &src[..offset];
            let line = before.matches('\n').count() + 1;
            let line_start = before.rfind('\n').map_or(0, |i| i + 1);
            let index = LineIndex::build(&src);
            prop_assert_eq!(
                index.line_col(u32::try_from(offset).unwrap_or(u32::MAX)),
                (
                    u32::try_from(line).unwrap_or(u32::MAX),
                    u32::try_from(offset - line_start + 1).unwrap_or(u32::MAX),
                )
            );
        }
    }
}
