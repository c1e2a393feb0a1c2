use std::cmp::Ordering;

use crate::editing::{Document, FormatError, NodeId, NodeKind};

/// A point in the document.
///
/// For text nodes `offset` is a UTF-8 byte offset into the content and must fall on a
/// char boundary; for containers it indexes the gap before child `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Which leaf wins when a text offset falls exactly between two leaves.
///
/// Range starts lean forward onto the following leaf, range ends lean back onto the
/// preceding one, so a resolved range never starts or ends in a neighbour it does not
/// cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Forward,
    Backward,
}

/// The user's current range. `anchor` may come before or after `focus`; use
/// [`Selection::ordered`] to get `(start, end)` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// A plain cursor
    pub fn collapsed(at: Position) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Reject selections whose positions are not valid for `document`
    pub fn validate(&self, document: &Document) -> Result<(), FormatError> {
        document.validate_position(&self.anchor)?;
        document.validate_position(&self.focus)
    }

    /// `(start, end)` by document order; equal positions keep the anchor first
    pub fn ordered(&self, document: &Document) -> Result<(Position, Position), FormatError> {
        match document.compare_positions(&self.anchor, &self.focus)? {
            Ordering::Greater => Ok((self.focus, self.anchor)),
            _ => Ok((self.anchor, self.focus)),
        }
    }
}

impl Document {
    pub fn validate_position(&self, position: &Position) -> Result<(), FormatError> {
        if !self.contains(position.node) {
            return Err(FormatError::unknown_node(position.node));
        }
        let slot = self.slot(position.node)?;
        match &slot.kind {
            NodeKind::Text(content) => {
                if position.offset > content.len() {
                    return Err(FormatError::invalid_selection(format!(
                        "offset {} past the end of text {} (length {})",
                        position.offset,
                        position.node,
                        content.len()
                    )));
                }
                if !content.is_char_boundary(position.offset) {
                    return Err(FormatError::invalid_selection(format!(
                        "offset {} splits a character in text {}",
                        position.offset, position.node
                    )));
                }
            }
            _ => {
                if position.offset > slot.children.len() {
                    return Err(FormatError::invalid_selection(format!(
                        "offset {} past the last child of {} ({} children)",
                        position.offset,
                        position.node,
                        slot.children.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Document order of two positions
    pub fn compare_positions(&self, a: &Position, b: &Position) -> Result<Ordering, FormatError> {
        Ok(self.position_key(a)?.cmp(&self.position_key(b)?))
    }

    /// Tree path of the node followed by the offset; lexicographic order of keys is
    /// document order.
    pub(crate) fn position_key(&self, position: &Position) -> Result<Vec<usize>, FormatError> {
        let mut key = self
            .path(position.node)
            .ok_or_else(|| FormatError::unknown_node(position.node))?;
        key.push(position.offset);
        Ok(key)
    }

    /// Move a position that addresses a list container onto the neighbouring list item
    pub fn retarget_list_position(&self, position: Position) -> Position {
        if !matches!(self.kind(position.node), Some(NodeKind::List(_))) {
            return position;
        }
        let items = self.children(position.node);
        match (items.get(position.offset), items.last()) {
            (Some(&item), _) => Position::new(item, 0),
            (None, Some(&last)) => Position::new(last, self.children(last).len()),
            (None, None) => position,
        }
    }

    /// Bytes of text between the start of `ancestor` and `position`, or `None` when the
    /// position lies outside `ancestor`
    pub fn text_offset_in(&self, ancestor: NodeId, position: &Position) -> Option<usize> {
        let mut offset = match self.kind(position.node)? {
            NodeKind::Text(_) => position.offset,
            _ => self.children_len_before(position.node, position.offset),
        };
        let mut current = position.node;
        while current != ancestor {
            let parent = self.parent(current)?;
            let index = self.index_in_parent(current)?;
            offset += self.children_len_before(parent, index);
            current = parent;
        }
        Some(offset)
    }

    fn children_len_before(&self, container: NodeId, index: usize) -> usize {
        self.children(container)
            .iter()
            .take(index)
            .map(|&child| self.text_len(child))
            .sum()
    }

    /// The text point `offset` bytes into `container`.
    ///
    /// Offsets past the end clamp to the end of the last leaf.
    pub fn point_at_offset(&self, container: NodeId, offset: usize, bias: Bias) -> Position {
        if let Some(NodeKind::Text(content)) = self.kind(container) {
            return Position::new(container, offset.min(content.len()));
        }
        let children = self.children(container);
        let Some(last) = children.len().checked_sub(1) else {
            return Position::new(container, 0);
        };
        let mut cursor = 0;
        for (index, &child) in children.iter().enumerate() {
            let end = cursor + self.text_len(child);
            let take = match bias {
                Bias::Forward => offset < end || index == last,
                Bias::Backward => offset <= end || index == last,
            };
            if take {
                return self.point_at_offset(child, offset.saturating_sub(cursor), bias);
            }
            cursor = end;
        }
        Position::new(container, children.len())
    }

    /// Resolve a container position down to a point inside a text leaf
    pub fn leaf_point(&self, position: &Position, bias: Bias) -> Position {
        match self.kind(position.node) {
            Some(NodeKind::Text(_)) | None => *position,
            Some(_) => {
                let offset = self.children_len_before(position.node, position.offset);
                self.point_at_offset(position.node, offset, bias)
            }
        }
    }

    /// Start of the first leaf below `node`
    pub fn start_of(&self, node: NodeId) -> Position {
        match self.first_leaf(node) {
            Some(leaf) => Position::new(leaf, 0),
            None => Position::new(node, 0),
        }
    }

    /// End of the last leaf below `node`
    pub fn end_of(&self, node: NodeId) -> Position {
        match self.last_leaf(node) {
            Some(leaf) => Position::new(leaf, self.text_len(leaf)),
            None => Position::new(node, self.children(node).len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{ListKind, Node, StyleKind};
    use pretty_assertions::assert_eq;

    /// `[P["ab", B["cd"], "ef"], UL[LI["gh"]]]`
    fn sample() -> Document {
        Document::from_nodes(vec![
            Node::paragraph(vec![
                Node::text("ab"),
                Node::styled(StyleKind::Bold, vec![Node::text("cd")]),
                Node::text("ef"),
            ]),
            Node::list(ListKind::Unordered, vec![Node::item(vec![Node::text("gh")])]),
        ])
        .unwrap()
    }

    fn leaves(doc: &Document) -> Vec<NodeId> {
        doc.text_leaves(doc.root())
    }

    #[test]
    fn test_collapsed() {
        let doc = sample();
        let at = Position::new(leaves(&doc)[0], 1);
        assert!(Selection::collapsed(at).is_collapsed());
        assert!(!Selection::new(at, Position::new(leaves(&doc)[0], 2)).is_collapsed());
    }

    #[test]
    fn test_ordered_normalises_backwards_selection() {
        let doc = sample();
        let leaves = leaves(&doc);
        let early = Position::new(leaves[0], 1);
        let late = Position::new(leaves[2], 1);

        let (start, end) = Selection::new(late, early).ordered(&doc).unwrap();
        assert_eq!((start, end), (early, late));

        let (start, end) = Selection::new(early, late).ordered(&doc).unwrap();
        assert_eq!((start, end), (early, late));
    }

    #[test]
    fn test_container_positions_order_against_text_positions() {
        let doc = sample();
        let paragraph = doc.children(doc.root())[0];
        let before_bold = Position::new(paragraph, 1);
        let inside_bold = Position::new(leaves(&doc)[1], 0);
        let after_bold = Position::new(paragraph, 2);

        assert_eq!(
            doc.compare_positions(&before_bold, &inside_bold).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            doc.compare_positions(&after_bold, &inside_bold).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_offsets() {
        let doc = sample();
        let leaf = leaves(&doc)[0];
        assert!(doc.validate_position(&Position::new(leaf, 2)).is_ok());

        let err = doc.validate_position(&Position::new(leaf, 3)).unwrap_err();
        assert!(err.is_invalid_selection());

        let paragraph = doc.children(doc.root())[0];
        assert!(doc.validate_position(&Position::new(paragraph, 3)).is_ok());
        assert!(doc.validate_position(&Position::new(paragraph, 4)).is_err());
    }

    #[test]
    fn test_validate_rejects_char_splits() {
        let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("héllo")])]).unwrap();
        let leaf = leaves(&doc)[0];
        assert!(doc.validate_position(&Position::new(leaf, 1)).is_ok());
        assert!(doc.validate_position(&Position::new(leaf, 2)).is_err());
        assert!(doc.validate_position(&Position::new(leaf, 3)).is_ok());
    }

    #[test]
    fn test_validate_rejects_foreign_nodes() {
        let doc = sample();
        let other = sample();
        let selection = Selection::collapsed(Position::new(leaves(&other)[0], 0));
        assert!(matches!(
            selection.validate(&doc),
            Err(FormatError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_text_offsets_round_trip_through_points() {
        let doc = sample();
        let paragraph = doc.children(doc.root())[0];
        let leaves = leaves(&doc);

        assert_eq!(
            doc.text_offset_in(paragraph, &Position::new(leaves[1], 1)),
            Some(3)
        );
        assert_eq!(doc.text_offset_in(paragraph, &Position::new(paragraph, 2)), Some(4));
        assert_eq!(doc.text_offset_in(paragraph, &Position::new(leaves[3], 0)), None);

        assert_eq!(
            doc.point_at_offset(paragraph, 3, Bias::Forward),
            Position::new(leaves[1], 1)
        );
    }

    #[test]
    fn test_bias_picks_neighbour_at_leaf_boundaries() {
        let doc = sample();
        let paragraph = doc.children(doc.root())[0];
        let leaves = leaves(&doc);

        assert_eq!(
            doc.point_at_offset(paragraph, 2, Bias::Forward),
            Position::new(leaves[1], 0)
        );
        assert_eq!(
            doc.point_at_offset(paragraph, 2, Bias::Backward),
            Position::new(leaves[0], 2)
        );
        assert_eq!(
            doc.point_at_offset(paragraph, 6, Bias::Forward),
            Position::new(leaves[2], 2)
        );
    }

    #[test]
    fn test_list_positions_are_retargeted_to_items() {
        let doc = sample();
        let list = doc.children(doc.root())[1];
        let item = doc.children(list)[0];

        assert_eq!(
            doc.retarget_list_position(Position::new(list, 0)),
            Position::new(item, 0)
        );
        assert_eq!(
            doc.retarget_list_position(Position::new(list, 1)),
            Position::new(item, 1)
        );
        let leaf = leaves(&doc)[3];
        assert_eq!(
            doc.retarget_list_position(Position::new(leaf, 1)),
            Position::new(leaf, 1)
        );
    }

    #[test]
    fn test_leaf_point_descends_from_root() {
        let doc = sample();
        let leaves = leaves(&doc);
        assert_eq!(
            doc.leaf_point(&Position::new(doc.root(), 1), Bias::Forward),
            Position::new(leaves[3], 0)
        );
        assert_eq!(
            doc.leaf_point(&Position::new(doc.root(), 1), Bias::Backward),
            Position::new(leaves[2], 2)
        );
    }
}
