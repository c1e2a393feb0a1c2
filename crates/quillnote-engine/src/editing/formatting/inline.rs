use std::cmp::Ordering;

use log::trace;

use crate::editing::formatting::commit;
use crate::editing::{Bias, Document, FormatError, NodeKind, Patch, Selection, StyleKind};

/// Apply `style` over the selected text, or remove it when the selection is exactly one
/// span of that style.
///
/// Both ends are resolved to text points inside the block holding the start; an end
/// beyond that block is clamped to the block's end.
pub(crate) fn toggle_inline_style(
    document: &Document,
    style: StyleKind,
    selection: &Selection,
) -> Result<Patch, FormatError> {
    selection.validate(document)?;
    if selection.is_collapsed() {
        return Ok(Patch::unchanged(document, *selection));
    }

    let (start, end) = selection.ordered(document)?;
    let first = document.leaf_point(&document.retarget_list_position(start), Bias::Forward);
    let last = document.leaf_point(&document.retarget_list_position(end), Bias::Backward);
    let Some(block) = document.find_nearest_ancestor(&first, NodeKind::is_block) else {
        return Ok(Patch::unchanged(document, *selection));
    };

    let from = document
        .text_offset_in(block, &first)
        .ok_or_else(|| FormatError::violation("start point left its own block"))?;
    let to = match document.text_offset_in(block, &last) {
        Some(to) => to,
        None if document.compare_positions(&last, &first)? == Ordering::Greater => {
            document.text_len(block)
        }
        None => from,
    };
    if from >= to {
        trace!("empty text extent in {block}, nothing to style");
        return Ok(Patch::unchanged(document, *selection));
    }

    let mut doc = document.clone();
    let first = doc.point_at_offset(block, from, Bias::Forward);
    let last = doc.point_at_offset(block, to, Bias::Backward);
    let range = Selection::new(first, last);

    // Toggle off when one of the same-style spans around the start is exactly selected
    let mut current = doc.parent(first.node);
    let mut covering = None;
    while let Some(id) = current
        && id != block
    {
        if doc.kind(id).is_some_and(|kind| kind.is_styled(style))
            && doc.range_exactly_covered_by(&range, id)?
        {
            covering = Some(id);
            break;
        }
        current = doc.parent(id);
    }

    if let Some(span) = covering {
        trace!("removing {style:?} span {span}");
        doc.unwrap(span)?;
        let selection = Selection::new(
            doc.point_at_offset(block, from, Bias::Forward),
            doc.point_at_offset(block, to, Bias::Backward),
        );
        return commit(doc, selection, vec![block]);
    }

    let container = doc
        .common_ancestor(first.node, last.node)
        .ok_or_else(|| FormatError::violation("selection ends share no container"))?;
    let (Some(inner_from), Some(inner_to)) = (
        doc.text_offset_in(container, &first),
        doc.text_offset_in(container, &last),
    ) else {
        return Err(FormatError::violation(format!(
            "selection ends are not inside {container}"
        )));
    };
    let left = doc.split_container_at(container, inner_from)?;
    let right = doc.split_container_at(container, inner_to)?;
    let run = doc.children(container)[left..right].to_vec();
    let span = doc.wrap(&run, NodeKind::Styled(style))?;
    trace!("wrapped {} nodes of {container} in {style:?} span {span}", run.len());

    let selection = Selection::new(doc.start_of(span), doc.end_of(span));
    commit(doc, selection, vec![span])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{BlockKind, ListKind, Node, Position};
    use pretty_assertions::assert_eq;

    fn paragraph_doc(children: Vec<Node>) -> Document {
        Document::from_nodes(vec![Node::paragraph(children)]).unwrap()
    }

    fn select(doc: &Document, from: usize, to: usize) -> Selection {
        let block = doc.blocks()[0];
        Selection::new(
            doc.point_at_offset(block, from, Bias::Forward),
            doc.point_at_offset(block, to, Bias::Backward),
        )
    }

    #[test]
    fn test_hello_world_bold() {
        let doc = paragraph_doc(vec![Node::text("hello world")]);
        let patch = toggle_inline_style(&doc, StyleKind::Bold, &select(&doc, 0, 5)).unwrap();

        assert_eq!(
            patch.document.to_nodes(),
            vec![Node::paragraph(vec![
                Node::styled(StyleKind::Bold, vec![Node::text("hello")]),
                Node::text(" world"),
            ])]
        );
        let span = patch.changed[0];
        let leaf = patch.document.children(span)[0];
        assert_eq!(patch.new_selection.anchor, Position::new(leaf, 0));
        assert_eq!(patch.new_selection.focus, Position::new(leaf, 5));
        assert_eq!(patch.version, doc.version() + 1);
    }

    #[test]
    fn test_toggle_off_restores_original() {
        let doc = paragraph_doc(vec![Node::text("hello world")]);
        let on = toggle_inline_style(&doc, StyleKind::Italic, &select(&doc, 6, 11)).unwrap();
        let off =
            toggle_inline_style(&on.document, StyleKind::Italic, &on.new_selection).unwrap();

        assert_eq!(off.document.to_nodes(), doc.to_nodes());
        let block = off.document.blocks()[0];
        let leaf = off.document.children(block)[0];
        assert_eq!(
            off.new_selection,
            Selection::new(Position::new(leaf, 6), Position::new(leaf, 11))
        );
    }

    #[test]
    fn test_collapsed_selection_is_noop() {
        let doc = paragraph_doc(vec![Node::text("hello")]);
        let leaf = doc.text_leaves(doc.root())[0];
        let cursor = Selection::collapsed(Position::new(leaf, 2));
        let patch = toggle_inline_style(&doc, StyleKind::Bold, &cursor).unwrap();

        assert!(patch.is_noop());
        assert_eq!(patch.new_selection, cursor);
        assert_eq!(patch.document.to_nodes(), doc.to_nodes());
        assert_eq!(patch.version, 0);
    }

    #[test]
    fn test_partial_overlap_nests_inside_other_style() {
        let doc = paragraph_doc(vec![
            Node::text("ab"),
            Node::styled(StyleKind::Italic, vec![Node::text("cd")]),
            Node::text("ef"),
        ]);
        let patch = toggle_inline_style(&doc, StyleKind::Bold, &select(&doc, 1, 3)).unwrap();

        assert_eq!(
            patch.document.to_nodes(),
            vec![Node::paragraph(vec![
                Node::text("a"),
                Node::styled(
                    StyleKind::Bold,
                    vec![
                        Node::text("b"),
                        Node::styled(StyleKind::Italic, vec![Node::text("c")]),
                    ]
                ),
                Node::styled(StyleKind::Italic, vec![Node::text("d")]),
                Node::text("ef"),
            ])]
        );

        let off = toggle_inline_style(&patch.document, StyleKind::Bold, &patch.new_selection)
            .unwrap();
        assert_eq!(off.document.normalized_nodes(), doc.normalized_nodes());
    }

    #[test]
    fn test_selection_inside_styled_span_nests() {
        let doc = paragraph_doc(vec![Node::styled(StyleKind::Italic, vec![Node::text("abcd")])]);
        let patch = toggle_inline_style(&doc, StyleKind::Bold, &select(&doc, 1, 3)).unwrap();

        assert_eq!(
            patch.document.to_nodes(),
            vec![Node::paragraph(vec![Node::styled(
                StyleKind::Italic,
                vec![
                    Node::text("a"),
                    Node::styled(StyleKind::Bold, vec![Node::text("bc")]),
                    Node::text("d"),
                ]
            )])]
        );
    }

    #[test]
    fn test_end_in_later_block_is_clamped() {
        let doc = Document::from_nodes(vec![
            Node::block(BlockKind::Heading1, vec![Node::text("title")]),
            Node::list(ListKind::Unordered, vec![Node::item(vec![Node::text("item")])]),
        ])
        .unwrap();
        let leaves = doc.text_leaves(doc.root());
        let selection = Selection::new(Position::new(leaves[1], 2), Position::new(leaves[0], 2));
        let patch = toggle_inline_style(&doc, StyleKind::Underline, &selection).unwrap();

        assert_eq!(
            patch.document.to_nodes(),
            vec![
                Node::block(
                    BlockKind::Heading1,
                    vec![
                        Node::text("ti"),
                        Node::styled(StyleKind::Underline, vec![Node::text("tle")]),
                    ]
                ),
                Node::list(ListKind::Unordered, vec![Node::item(vec![Node::text("item")])]),
            ]
        );
    }

    #[test]
    fn test_node_created_by_patch_is_unknown_to_the_source() {
        let doc = paragraph_doc(vec![Node::text("hello world")]);
        let patch = toggle_inline_style(&doc, StyleKind::Bold, &select(&doc, 0, 5)).unwrap();
        let fresh = patch.changed[0];
        let selection = Selection::collapsed(Position::new(fresh, 0));
        let err = toggle_inline_style(&doc, StyleKind::Bold, &selection).unwrap_err();
        assert!(err.is_invalid_selection());
    }
}
