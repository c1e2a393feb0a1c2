//! The three toggle algorithms.
//!
//! Each one validates the selection against the caller's document, decides on a no-op
//! before cloning anything, and otherwise mutates a private clone that is only handed
//! back once [`commit`] has re-checked every invariant.

pub(crate) mod block;
pub(crate) mod inline;
pub(crate) mod list;

use log::trace;

use crate::editing::{Bias, Document, FormatError, NodeId, NodeKind, Patch, Position, Selection};

/// Finish a changed document: bump its version and verify the result before returning it
pub(crate) fn commit(
    mut document: Document,
    selection: Selection,
    changed: Vec<NodeId>,
) -> Result<Patch, FormatError> {
    document.bump_version();
    document.check_invariants()?;
    selection
        .validate(&document)
        .map_err(|err| FormatError::violation(format!("returned selection is invalid: {err}")))?;
    Ok(Patch {
        version: document.version(),
        document,
        new_selection: selection,
        changed,
    })
}

/// Cut the range `start..end` out of the document for the "no enclosing block" cases.
///
/// `start` addresses the root. Returns the root index the replacement block belongs at
/// and a detached text node holding the removed text (the empty placeholder when
/// nothing was selected).
pub(crate) fn detach_root_range(
    document: &mut Document,
    start: &Position,
    end: &Position,
) -> Result<(usize, NodeId), FormatError> {
    let text = if start == end {
        String::new()
    } else {
        let from = document.leaf_point(start, Bias::Forward);
        let to = document.leaf_point(end, Bias::Backward);
        if document.kind(from.node).is_some_and(NodeKind::is_text)
            && document.compare_positions(&from, &to)?.is_lt()
        {
            document.extract_range(&from, &to)?
        } else {
            String::new()
        }
    };
    trace!("root range {start:?}..{end:?} held {text:?}");
    let index = start.offset.min(document.children(document.root()).len());
    Ok((index, document.alloc(NodeKind::Text(text))))
}
