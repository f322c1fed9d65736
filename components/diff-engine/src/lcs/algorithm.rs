//! LCS table construction and backtracking.
use crate::traits::{DiffAlgorithm, EditOp};

/// Longest-common-subsequence line diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcsDiff;

impl LcsDiff {
    /// Creates new instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DiffAlgorithm for LcsDiff {
    fn edit_script(&self, base: &[&str], target: &[&str]) -> Vec<EditOp> {
        // The backtrack always matches equal trailing lines first, so the
        // common suffix can be peeled off before building the table.
        let suffix = common_suffix_len(base, target);
        let base_head = &base[..base.len() - suffix];
        let target_head = &target[..target.len() - suffix];

        let mut ops = if base_head.is_empty() {
            vec![EditOp::Insert; target_head.len()]
        } else if target_head.is_empty() {
            vec![EditOp::Delete; base_head.len()]
        } else {
            let table = LcsTable::build(base_head, target_head);
            backtrack(base_head, target_head, &table)
        };
        ops.extend(std::iter::repeat_n(EditOp::Keep, suffix));
        ops
    }
}

fn common_suffix_len(base: &[&str], target: &[&str]) -> usize {
    base.iter()
        .rev()
        .zip(target.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Row-major `(m + 1) x (n + 1)` table of LCS lengths.
pub(crate) struct LcsTable {
    cols: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    pub(crate) fn build(base: &[&str], target: &[&str]) -> Self {
        let cols = target.len() + 1;
        let mut cells = vec![0u32; (base.len() + 1) * cols];

        for i in 1..=base.len() {
            for j in 1..=target.len() {
                cells[i * cols + j] = if base[i - 1] == target[j - 1] {
                    cells[(i - 1) * cols + (j - 1)] + 1
                } else {
                    cells[(i - 1) * cols + j].max(cells[i * cols + (j - 1)])
                };
            }
        }

        Self { cols, cells }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.cols + j]
    }
}

/// Walks the table from `(m, n)` back to `(0, 0)`.
///
/// Equal lines are always taken as a match. Otherwise the larger neighbour
/// wins and ties go to an insertion, which places deletions ahead of
/// insertions in the forward script.
pub(crate) fn backtrack(base: &[&str], target: &[&str], table: &LcsTable) -> Vec<EditOp> {
    let (mut i, mut j) = (base.len(), target.len());
    let mut ops = Vec::with_capacity(i + j);

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && base[i - 1] == target[j - 1] {
            ops.push(EditOp::Keep);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table.get(i, j - 1) >= table.get(i - 1, j)) {
            ops.push(EditOp::Insert);
            j -= 1;
        } else {
            ops.push(EditOp::Delete);
            i -= 1;
        }
    }

    ops.reverse();
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_holds_lcs_length() {
        let base = ["a", "b", "c", "d"];
        let target = ["a", "c", "d", "e"];
        let table = LcsTable::build(&base, &target);
        assert_eq!(table.get(4, 4), 3);
        assert_eq!(table.get(0, 4), 0);
    }

    #[test]
    fn replacement_deletes_before_inserting() {
        let ops = LcsDiff::new().edit_script(&["a", "b", "c"], &["a", "X", "c"]);
        assert_eq!(
            ops,
            [EditOp::Keep, EditOp::Delete, EditOp::Insert, EditOp::Keep]
        );
    }

    #[test]
    fn disjoint_inputs_delete_everything_first() {
        let ops = LcsDiff::new().edit_script(&["a", "b"], &["x", "y"]);
        assert_eq!(
            ops,
            [EditOp::Delete, EditOp::Delete, EditOp::Insert, EditOp::Insert]
        );
    }

    #[test]
    fn suffix_is_kept() {
        let ops = LcsDiff::new().edit_script(&["x", "z"], &["z"]);
        assert_eq!(ops, [EditOp::Delete, EditOp::Keep]);
    }

    #[test]
    fn empty_sides() {
        assert!(LcsDiff::new().edit_script(&[], &[]).is_empty());
        assert_eq!(LcsDiff::new().edit_script(&[], &["a"]), [EditOp::Insert]);
        assert_eq!(LcsDiff::new().edit_script(&["a"], &[]), [EditOp::Delete]);
    }

    #[test]
    fn script_consumes_both_sides() {
        let base = ["1", "2", "3", "2", "1"];
        let target = ["2", "1", "3", "1", "2", "4"];
        let ops = LcsDiff::new().edit_script(&base, &target);
        let kept = ops.iter().filter(|op| **op == EditOp::Keep).count();
        let deleted = ops.iter().filter(|op| **op == EditOp::Delete).count();
        let inserted = ops.iter().filter(|op| **op == EditOp::Insert).count();
        assert_eq!(kept + deleted, base.len());
        assert_eq!(kept + inserted, target.len());
    }
}
