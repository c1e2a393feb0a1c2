use log::trace;

use crate::editing::formatting::{commit, detach_root_range};
use crate::editing::{BlockKind, Document, FormatError, ListKind, NodeKind, Patch, Selection};

/// Move the block holding the selection start into or out of a `kind` list.
///
/// Inside a list of the other kind the enclosing list switches kind in place, keeping
/// its items; lists are never nested.
pub(crate) fn toggle_list(
    document: &Document,
    kind: ListKind,
    selection: &Selection,
) -> Result<Patch, FormatError> {
    selection.validate(document)?;
    let (start, end) = selection.ordered(document)?;
    let start = document.retarget_list_position(start);
    let end = document.retarget_list_position(end);

    if let Some(list) = document.find_nearest_ancestor(&start, NodeKind::is_list) {
        let item = document
            .find_nearest_ancestor(&start, NodeKind::is_list_item)
            .ok_or_else(|| FormatError::violation(format!("no list item around {start:?}")))?;
        let mut doc = document.clone();

        if document.kind(list) != Some(&NodeKind::List(kind)) {
            let switched = doc.alloc(NodeKind::List(kind));
            doc.move_children(list, switched)?;
            doc.replace_node(list, switched)?;
            trace!("list {list} switched to {kind:?} as {switched}");
            let selection = Selection::collapsed(doc.end_of(item));
            return commit(doc, selection, vec![switched]);
        }

        let paragraph = doc.alloc(NodeKind::Block(BlockKind::Paragraph));
        doc.move_children(item, paragraph)?;
        if document.children(list).len() == 1 {
            doc.replace_node(list, paragraph)?;
            trace!("single-item list {list} collapsed into {paragraph}");
        } else {
            let was_first = document.index_in_parent(item) == Some(0);
            doc.remove_node(item)?;
            let (parent, index) = match (doc.parent(list), doc.index_in_parent(list)) {
                (Some(parent), Some(index)) => (parent, index),
                _ => return Err(FormatError::violation(format!("{list} is not attached"))),
            };
            let at = if was_first { index } else { index + 1 };
            doc.insert_child(parent, at, paragraph)?;
            trace!("item {item} left list {list} as {paragraph}");
        }
        let selection = Selection::collapsed(doc.end_of(paragraph));
        return commit(doc, selection, vec![paragraph]);
    }

    let mut doc = document.clone();
    let item = doc.alloc(NodeKind::Block(BlockKind::ListItem));
    let list = doc.alloc(NodeKind::List(kind));
    match document.find_nearest_ancestor(&start, NodeKind::is_block) {
        Some(block) => {
            doc.move_children(block, item)?;
            doc.append_child(list, item)?;
            doc.replace_node(block, list)?;
            trace!("block {block} became {kind:?} list {list}");
        }
        None => {
            let (index, content) = detach_root_range(&mut doc, &start, &end)?;
            doc.append_child(item, content)?;
            doc.append_child(list, item)?;
            let root = doc.root();
            doc.insert_child(root, index, list)?;
            trace!("new {kind:?} list {list} at root index {index}");
        }
    }
    let selection = Selection::collapsed(doc.end_of(item));
    commit(doc, selection, vec![list])
}
