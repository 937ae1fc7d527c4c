//! Stack-free tree plumbing.
//!
//! Capability trees can be arbitrarily deep, so nothing here recurses: trees
//! are flattened into a pre-order [`Arena`] where every parent index is lower
//! than its children's, worked on in place, then reassembled.

/// A node owning an ordered list of children of its own type
pub trait TreeNode: Sized {
    fn children(&self) -> &[Self];
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

/// Pre-order list of childless nodes with their parent index
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<(Option<usize>, T)>,
}

impl<T: TreeNode> Default for Arena<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: TreeNode> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. The parent, if any, must already be in the arena.
    pub fn push(&mut self, parent: Option<usize>, node: T) -> usize {
        debug_assert!(parent.is_none_or(|p| p < self.slots.len()));
        self.slots.push((parent, node));
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Flatten an owned forest, detaching every node's children
    pub fn from_tree(roots: Vec<T>) -> Self {
        let mut arena = Self::new();
        let mut stack: Vec<(Option<usize>, T)> =
            roots.into_iter().rev().map(|node| (None, node)).collect();

        while let Some((parent, mut node)) = stack.pop() {
            let children = std::mem::take(node.children_mut());
            let idx = arena.push(parent, node);
            stack.extend(children.into_iter().rev().map(|child| (Some(idx), child)));
        }
        arena
    }

    /// Visit every node in pre-order together with its (already visited) parent
    pub fn for_each_with_parent(&mut self, mut f: impl FnMut(Option<&T>, &mut T)) {
        for idx in 0..self.slots.len() {
            let (before, rest) = self.slots.split_at_mut(idx);
            let (parent, node) = &mut rest[0];
            f(parent.map(|p| &before[p].1), node);
        }
    }

    /// Rebuild the forest, preserving sibling order
    pub fn into_tree(self) -> Vec<T> {
        let mut children: Vec<Vec<T>> = (0..self.slots.len()).map(|_| Vec::new()).collect();
        let mut roots = Vec::new();

        for (idx, (parent, mut node)) in self.slots.into_iter().enumerate().rev() {
            let mut own = std::mem::take(&mut children[idx]);
            own.reverse();
            *node.children_mut() = own;
            match parent {
                Some(p) => children[p].push(node),
                None => roots.push(node),
            }
        }
        roots.reverse();
        roots
    }
}

/// Pre-order iterator over a borrowed forest
pub struct PreOrder<'a, T> {
    stack: Vec<&'a T>,
}

impl<'a, T: TreeNode> Iterator for PreOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub fn pre_order<T: TreeNode>(roots: &[T]) -> PreOrder<'_, T> {
    PreOrder {
        stack: roots.iter().rev().collect(),
    }
}

/// Project a forest onto another node type, keeping its shape
pub fn map_tree<T: TreeNode, U: TreeNode>(roots: &[T], mut f: impl FnMut(&T) -> U) -> Vec<U> {
    let mut arena = Arena::new();
    let mut stack: Vec<(Option<usize>, &T)> = roots.iter().rev().map(|node| (None, node)).collect();

    while let Some((parent, node)) = stack.pop() {
        let idx = arena.push(parent, f(node));
        stack.extend(node.children().iter().rev().map(|child| (Some(idx), child)));
    }
    arena.into_tree()
}
