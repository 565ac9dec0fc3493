//! Pure queries over a node map snapshot.
//!
//! Nothing in this module mutates its input. Traversals are breadth-first and
//! guard against revisiting ids, so a malformed snapshot (a child listed twice,
//! a cycle) still yields each node at most once.

use std::collections::{HashSet, VecDeque};

use crate::geometry::{Point, Rect, Size};
use crate::node::{Node, NodeId, NodeMap};

/// Horizontal distance from a parent to a newly placed child.
pub const CHILD_OFFSET_X: f64 = 180.0;

/// Minimum vertical gap between a new child and the lowest sibling.
pub const CHILD_GAP_Y: f64 = 80.0;

/// Nominal node footprint used before any measurement exists.
pub const NOMINAL_SIZE: Size = Size::new(180.0, 60.0);

/// Nodes reachable from `root` without descending into collapsed nodes.
///
/// A collapsed node is itself visible; only its descendants are hidden.
/// Returns nothing when `root` is `None` or does not resolve.
pub fn visible<'a>(nodes: &'a NodeMap, root: Option<&NodeId>) -> Vec<&'a Node> {
    let Some(root) = root.and_then(|id| nodes.get(id)) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen: HashSet<&NodeId> = HashSet::new();
    let mut queue: VecDeque<&Node> = VecDeque::new();
    seen.insert(&root.id);
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        out.push(node);
        if node.collapsed {
            continue;
        }
        for child_id in &node.children {
            if let Some(child) = nodes.get(child_id) {
                if seen.insert(&child.id) {
                    queue.push_back(child);
                }
            }
        }
    }

    out
}

/// `id` followed by every node reachable through `children`, ignoring collapse.
///
/// This is the deletion set for `id`. The starting id is always first and
/// appears once; unresolved child ids are skipped.
pub fn descendants(nodes: &NodeMap, id: &NodeId) -> Vec<NodeId> {
    let mut out = vec![id.clone()];
    let mut seen: HashSet<&NodeId> = HashSet::new();
    seen.insert(id);

    let mut queue: VecDeque<&NodeId> = VecDeque::new();
    if let Some(start) = nodes.get(id) {
        queue.extend(start.children.iter());
    }

    while let Some(current) = queue.pop_front() {
        let Some(node) = nodes.get(current) else {
            continue;
        };
        if !seen.insert(&node.id) {
            continue;
        }
        out.push(node.id.clone());
        queue.extend(node.children.iter());
    }

    out
}

/// Initial position for a new child of `parent`.
///
/// The child goes one step to the right of the parent. Vertically it sits
/// level with the parent when there are no siblings yet, otherwise one gap
/// below the lowest sibling. Existing nodes are never moved.
pub fn place_child(parent: &Node, siblings: &[Point]) -> Point {
    let y = siblings
        .iter()
        .map(|p| p.y)
        .reduce(f64::max)
        .map_or(parent.position.y, |lowest| lowest + CHILD_GAP_Y);

    Point::new(parent.position.x + CHILD_OFFSET_X, y)
}

/// Nominal dimensions of a node, independent of its content.
pub fn node_dimensions(_node: &Node) -> Size {
    NOMINAL_SIZE
}

/// Measured size when usable, nominal dimensions otherwise.
pub fn footprint(node: &Node) -> Size {
    node.size
        .filter(Size::is_usable)
        .unwrap_or_else(|| node_dimensions(node))
}

/// Parent/child pairs where both ends are visible, in visibility order.
pub fn connectors<'a>(nodes: &'a NodeMap, root: Option<&NodeId>) -> Vec<(&'a Node, &'a Node)> {
    let shown = visible(nodes, root);
    let ids: HashSet<&NodeId> = shown.iter().map(|n| &n.id).collect();

    shown
        .iter()
        .flat_map(|parent| {
            parent
                .children
                .iter()
                .filter(|child| ids.contains(child))
                .filter_map(|child| nodes.get(child))
                .map(move |child| (*parent, child))
        })
        .collect()
}

/// End points of a connector: right-middle of the parent to left-middle of the child.
pub fn connector_anchors(parent: &Node, child: &Node) -> (Point, Point) {
    let p = node_dimensions(parent);
    let c = node_dimensions(child);
    (
        Point::new(parent.position.x + p.width, parent.position.y + p.height / 2.0),
        Point::new(child.position.x, child.position.y + c.height / 2.0),
    )
}

/// Bounding box of every visible node, grown by `margin` on each side.
pub fn bounding_box(nodes: &NodeMap, root: Option<&NodeId>, margin: f64) -> Option<Rect> {
    visible(nodes, root)
        .into_iter()
        .map(|n| Rect::from_origin_size(n.position, footprint(n)))
        .reduce(|a, b| a.union(&b))
        .map(|r| r.inflate(margin))
}
