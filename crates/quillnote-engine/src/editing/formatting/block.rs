use log::trace;

use crate::editing::formatting::{commit, detach_root_range};
use crate::editing::{BlockKind, Document, FormatError, NodeKind, Patch, Selection};

/// Convert the block holding the selection start to `kind`, or back to a paragraph when
/// it already is one. Only that single block is touched.
///
/// List items are left alone: list membership only changes through the list toggle.
pub(crate) fn toggle_block_format(
    document: &Document,
    kind: BlockKind,
    selection: &Selection,
) -> Result<Patch, FormatError> {
    selection.validate(document)?;
    if kind == BlockKind::ListItem {
        return Ok(Patch::unchanged(document, *selection));
    }

    let (start, end) = selection.ordered(document)?;
    let start = document.retarget_list_position(start);
    let end = document.retarget_list_position(end);

    let Some(block) = document.find_nearest_ancestor(&start, NodeKind::is_block) else {
        let mut doc = document.clone();
        let (index, content) = detach_root_range(&mut doc, &start, &end)?;
        let block = doc.alloc(NodeKind::Block(kind));
        doc.append_child(block, content)?;
        let root = doc.root();
        doc.insert_child(root, index, block)?;
        trace!("new {kind:?} block {block} at root index {index}");
        let selection = Selection::collapsed(doc.end_of(block));
        return commit(doc, selection, vec![block]);
    };

    let current = match document.kind(block) {
        Some(NodeKind::Block(current)) => *current,
        _ => return Err(FormatError::violation(format!("{block} is not a block"))),
    };
    if current == BlockKind::ListItem {
        return Ok(Patch::unchanged(document, *selection));
    }
    let target = if current == kind {
        BlockKind::Paragraph
    } else {
        kind
    };
    if target == current {
        return Ok(Patch::unchanged(
            document,
            Selection::collapsed(document.end_of(block)),
        ));
    }

    let mut doc = document.clone();
    let replacement = doc.alloc(NodeKind::Block(target));
    doc.move_children(block, replacement)?;
    doc.replace_node(block, replacement)?;
    trace!("{current:?} block {block} -> {target:?} {replacement}");
    let selection = Selection::collapsed(doc.end_of(replacement));
    commit(doc, selection, vec![replacement])
}
