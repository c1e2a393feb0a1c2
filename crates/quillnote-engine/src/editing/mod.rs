/*!
 * # Formatting Engine
 *
 * The structural model of a note and the toggle operations that edit it.
 *
 * ## Architecture Overview
 *
 * ### 1. Arena Document Tree
 * - A [`Document`] is an arena of node slots under a single root, addressed by [`NodeId`]
 * - Top-level nodes are blocks or lists; text and styled spans only live inside blocks
 * - Slots are never reused, and ids carry the lineage of the document that made them, so
 *   a stale or foreign id is detected instead of aliasing another node
 *
 * ### 2. Values In, Values Out
 * - Hosts pass a document, a [`Selection`] and a [`Cmd`]
 * - The engine mutates a private clone and returns a [`Patch`] with the new document and
 *   the new selection; the caller's document is never touched
 * - Every returned document has passed [`Document::check_invariants`]
 *
 * ### 3. Structural Mutators
 * - Split, wrap, unwrap, replace and merge primitives in `mutators`
 * - The three toggles in `formatting` are written only in terms of those primitives
 *
 * ### 4. Read API
 * - [`Snapshot`]s flatten the tree into render blocks with styled spans and map flat
 *   `(block, offset)` points back to engine positions
 *
 * ## Usage Pattern
 *
 * ```rust
 * use quillnote_engine::editing::*;
 *
 * let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("hello world")])]).unwrap();
 * let snapshot = doc.snapshot();
 * let selection = Selection::new(
 *     snapshot.position_at(0, 0).unwrap(),
 *     snapshot.position_at(0, 5).unwrap(),
 * );
 *
 * let patch = doc.apply(Cmd::ToggleInlineStyle(StyleKind::Bold), &selection).unwrap();
 * let doc = patch.document;
 * assert_eq!(
 *     doc.to_nodes(),
 *     vec![Node::paragraph(vec![
 *         Node::styled(StyleKind::Bold, vec![Node::text("hello")]),
 *         Node::text(" world"),
 *     ])]
 * );
 * ```
 */

pub mod commands;
pub mod document;
pub mod error;
mod formatting;
pub mod mutators;
pub mod patch;
pub mod selection;
pub mod snapshot;

pub use commands::Cmd;
pub use document::{BlockKind, Document, ListKind, Node, NodeId, NodeKind, StyleKind};
pub use error::FormatError;
pub use patch::Patch;
pub use selection::{Bias, Position, Selection};
pub use snapshot::{ContentGroup, ListMarker, RenderBlock, Snapshot, StyledSpan};
