//! Layer attribute inheritance.
//!
//! Each field follows its own policy:
//!
//! | field                          | policy                                   |
//! |--------------------------------|------------------------------------------|
//! | attribution, min/max scale     | own value if declared, else parent's     |
//! | available CRS                  | parent's list, then own additions        |
//! | bounding boxes                 | parent's map, own entries win per CRS    |
//! | styles                         | own list if non-empty, else parent's     |
//! | everything else (keywords too) | own value only                           |

use crate::tree::Arena;

use super::model::LayerNode;

/// Compute the effective attributes of `own` given its parent's effective node.
///
/// The parent's children are never looked at, so it can be passed detached.
pub fn inherit(mut own: LayerNode, parent: Option<&LayerNode>) -> LayerNode {
    let Some(parent) = parent else {
        return own;
    };

    if own.attribution.is_none() {
        own.attribution = parent.attribution.clone();
    }
    if own.min_scale_denominator.is_none() {
        own.min_scale_denominator = parent.min_scale_denominator;
    }
    if own.max_scale_denominator.is_none() {
        own.max_scale_denominator = parent.max_scale_denominator;
    }

    let mut available_crs = parent.available_crs.clone();
    for crs in own.available_crs.drain(..) {
        if !available_crs.contains(&crs) {
            available_crs.push(crs);
        }
    }
    own.available_crs = available_crs;

    let mut bounding_boxes = parent.bounding_boxes.clone();
    bounding_boxes.append(&mut own.bounding_boxes);
    own.bounding_boxes = bounding_boxes;

    if own.styles.is_empty() {
        own.styles = parent.styles.clone();
    }

    own
}

/// Resolve a whole pre-order arena in place. Parents are resolved before
/// their children, so every node inherits from already-effective values.
pub fn resolve_arena(arena: &mut Arena<LayerNode>) {
    arena.for_each_with_parent(|parent, node| {
        let own = std::mem::take(node);
        *node = inherit(own, parent);
    });
}

/// Resolve inheritance over a forest of layers whose nodes hold their own
/// declarations. Applying it to an already-resolved forest changes nothing.
pub fn resolve_layers(roots: Vec<LayerNode>) -> Vec<LayerNode> {
    let mut arena = Arena::from_tree(roots);
    resolve_arena(&mut arena);
    arena.into_tree()
}
