//! Diff algorithm traits and edit script types.
//!
//! The line diff is computed behind the [`DiffAlgorithm`] seam so that a
//! faster algorithm can replace the LCS table, provided it yields the same
//! edit scripts.

/// A single step of an edit script, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// The next base line and the next target line are equal.
    Keep,
    /// The next base line does not appear in the target.
    Delete,
    /// The next target line does not appear in the base.
    Insert,
}

/// Trait for line diff algorithms.
///
/// The trait uses `Send + Sync` bounds so one algorithm instance can be
/// shared by every session of a host.
pub trait DiffAlgorithm: Send + Sync {
    /// Computes the edit script that transforms `base` into `target`.
    ///
    /// The script must consume every line of both inputs exactly once:
    /// the number of `Keep` + `Delete` steps equals `base.len()` and the
    /// number of `Keep` + `Insert` steps equals `target.len()`. Within a
    /// run of changes, deletions are expected before insertions so that the
    /// modification pass can pair them.
    fn edit_script(&self, base: &[&str], target: &[&str]) -> Vec<EditOp>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Replace;

    impl DiffAlgorithm for Replace {
        fn edit_script(&self, base: &[&str], target: &[&str]) -> Vec<EditOp> {
            let mut ops = vec![EditOp::Delete; base.len()];
            ops.extend(std::iter::repeat_n(EditOp::Insert, target.len()));
            ops
        }
    }

    #[test]
    fn trait_objects_are_usable() {
        let algorithm: Box<dyn DiffAlgorithm> = Box::new(Replace);
        let ops = algorithm.edit_script(&["a"], &["b", "c"]);
        assert_eq!(ops, [EditOp::Delete, EditOp::Insert, EditOp::Insert]);
    }
}
