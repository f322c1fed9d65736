//! Diff engine for AI-assisted note edits.
//!
//! The pipeline is:
//! 1. [`diff_lines`] computes an LCS line diff and pairs adjacent
//!    removal/addition runs into `modified` lines.
//! 2. [`group_blocks`] partitions the script into maximal changed/unchanged blocks.
//! 3. [`diff_chars`] decorates modified lines with character-level segments.
//! 4. [`revert_block`] rebuilds a candidate text with one block undone.
//! 5. [`render`] flattens everything into rows a presentation layer can draw.
//!
//! [`DiffView`] bundles steps 1 and 2 and is the unit recomputed on every
//! streamed chunk.
//!
//! # Example
//!
//! ```
//! use diff_engine::{DiffView, LineKind};
//!
//! let view = DiffView::compute("a\nb\nc", "a\nX\nc");
//! let kinds: Vec<LineKind> = view.lines().map(|l| l.kind).collect();
//! assert_eq!(kinds, [LineKind::Unchanged, LineKind::Modified, LineKind::Unchanged]);
//! assert_eq!(view.changed_block_count(), 1);
//! ```

pub mod blocks;
pub mod intraline;
pub mod lcs;
pub mod render;
pub mod revert;
pub mod traits;
pub mod types;
pub mod view;

pub use blocks::group_blocks;
pub use intraline::{CharOp, CharSegment, diff_chars};
pub use lcs::{LcsDiff, diff_lines, diff_lines_with, split_lines};
pub use render::{LineId, ParseLineIdError, RenderBlock, RenderRow, RowKind, render};
pub use revert::{candidate_text, revert_block};
pub use traits::{DiffAlgorithm, EditOp};
pub use types::{DiffBlock, DiffLine, DiffStats, LineKind};
pub use view::DiffView;
