//! Fixed diff scenarios covering merge pairing, revert and empty inputs.

use diff_engine::{DiffView, LineKind, RowKind, diff_lines};

fn kinds(original: &str, candidate: &str) -> Vec<LineKind> {
    diff_lines(original, candidate).iter().map(|l| l.kind).collect()
}

#[test]
fn replaced_line_is_one_modification() {
    let lines = diff_lines("a\nb\nc", "a\nX\nc");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].kind, LineKind::Unchanged);
    assert_eq!(lines[1].kind, LineKind::Modified);
    assert_eq!(lines[1].old_content.as_deref(), Some("b"));
    assert_eq!(lines[1].content, "X");
    assert_eq!(lines[2].kind, LineKind::Unchanged);
}

#[test]
fn revert_is_relative_to_true_original() {
    let original = "a\nb\nc\nd";
    let view = DiffView::compute(original, "a\nX\nc\nY");
    assert_eq!(view.changed_block_count(), 2);

    let first_changed = view
        .blocks()
        .iter()
        .find(|b| b.has_changes)
        .map(|b| b.index)
        .unwrap();
    let candidate = view.revert_block(first_changed);
    assert_eq!(candidate, "a\nb\nc\nY");

    let refreshed = DiffView::compute(original, &candidate);
    assert_eq!(refreshed.changed_block_count(), 1);
    let lines: Vec<_> = refreshed.lines().collect();
    assert_eq!(lines[1].kind, LineKind::Unchanged);
    assert_eq!(lines[1].content, "b");
    assert_eq!(lines[3].kind, LineKind::Modified);
    assert_eq!(lines[3].content, "Y");

    // A second revert on the refreshed view lands back on the original.
    let last = refreshed.blocks().len() - 1;
    assert_eq!(refreshed.revert_block(last), original);
}

#[test]
fn empty_sides() {
    assert_eq!(kinds("", "x\ny"), [LineKind::Added, LineKind::Added]);
    assert_eq!(kinds("x\ny", ""), [LineKind::Removed, LineKind::Removed]);
    assert!(kinds("", "").is_empty());
    assert!(DiffView::compute("", "").is_identical());
}

#[test]
fn new_note_renders_all_rows_editable() {
    let view = DiffView::compute("", "# Title\nbody");
    let rows: Vec<_> = view.render().into_iter().flat_map(|b| b.rows).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.kind == RowKind::Added && r.is_editable()));
}

#[test]
fn growing_candidate_converges() {
    // Streamed prefixes of the final candidate diff cleanly at every step.
    let original = "fn main() {\n    println!(\"hi\");\n}";
    let candidate = "fn main() {\n    println!(\"hello\");\n    run();\n}";
    let mut streamed = String::new();
    for ch in candidate.chars() {
        streamed.push(ch);
        let view = DiffView::compute(original, &streamed);
        assert_eq!(view.candidate_text(), streamed);
    }
    let stats = DiffView::compute(original, candidate).stats();
    assert_eq!((stats.modified, stats.added, stats.unchanged), (1, 1, 2));
}
