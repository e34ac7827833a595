//! Sparse per-face quadtree storage.
//!
//! One tree per base face, addressed by nested pixel index. A tree of depth
//! `log2(nside)` has its leaves at level 0; each level consumes two bits of
//! the face-local index, most significant pair first. Missing subtrees stand
//! for cells that are all null, so memory grows with the number of populated
//! cells rather than with `npix`.

use skymap_pixel::{FACES, Nside, SkyError};

/// One child position of a node.
#[derive(Debug, Clone)]
enum Slot<T> {
    /// Nothing stored below here.
    Empty,
    /// A populated cell (only at level 0).
    Leaf(T),
    /// An interior node.
    Branch(Box<Node<T>>),
}

impl<T> Slot<T> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// An interior node with four quadrants.
#[derive(Debug, Clone)]
struct Node<T> {
    children: [Slot<T>; 4],
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            children: [Slot::Empty, Slot::Empty, Slot::Empty, Slot::Empty],
        }
    }

    fn is_bare(&self) -> bool {
        self.children.iter().all(Slot::is_empty)
    }
}

/// Quadrant of `local` at `level`, counting levels from the leaves.
fn quadrant(local: u64, level: u32) -> usize {
    ((local >> (2 * level)) & 3) as usize
}

/// Sparse cell storage for a single resolution.
#[derive(Debug, Clone)]
pub struct SparseTree<T> {
    nside: Nside,
    roots: Vec<Slot<T>>,
    nodes: usize,
    leaves: usize,
}

impl<T: Copy> SparseTree<T> {
    /// An empty tree covering all `12·nside²` cells.
    #[must_use]
    pub fn new(nside: Nside) -> Self {
        Self {
            nside,
            roots: (0..FACES).map(|_| Slot::Empty).collect(),
            nodes: 0,
            leaves: 0,
        }
    }

    /// Resolution the tree addresses.
    #[must_use]
    pub fn nside(&self) -> Nside {
        self.nside
    }

    /// Heap bytes taken by one interior node.
    #[must_use]
    pub fn node_bytes() -> usize {
        std::mem::size_of::<Node<T>>()
    }

    /// Number of interior nodes currently allocated.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of populated cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves
    }

    /// Returns true if no cell is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    fn split(&self, pix: u64) -> Result<(usize, u64), SkyError> {
        self.nside.check_pixel(pix)?;
        let face = pix >> (2 * self.nside.factor());
        let local = pix & (self.nside.face_pixels() - 1);
        Ok((face as usize, local))
    }

    /// Value at nested index `pix`, or `None` if nothing is stored there.
    /// Never allocates.
    pub fn get(&self, pix: u64) -> Result<Option<T>, SkyError> {
        let (face, local) = self.split(pix)?;
        let mut slot = &self.roots[face];
        let mut level = self.nside.factor();
        loop {
            match slot {
                Slot::Empty => return Ok(None),
                Slot::Leaf(value) => return Ok(Some(*value)),
                Slot::Branch(node) => {
                    level -= 1;
                    slot = &node.children[quadrant(local, level)];
                }
            }
        }
    }

    /// Store `value` at nested index `pix`, or remove the cell for `None`.
    ///
    /// Insertion creates the missing nodes on the path. Removal frees every
    /// node on the path left without children.
    pub fn set(&mut self, pix: u64, value: Option<T>) -> Result<(), SkyError> {
        let (face, local) = self.split(pix)?;
        let depth = self.nside.factor();
        let Self {
            roots,
            nodes,
            leaves,
            ..
        } = self;
        let root = &mut roots[face];
        match value {
            Some(value) => {
                if insert(root, local, depth, value, nodes) {
                    *leaves += 1;
                }
            }
            None => {
                if remove(root, local, depth, nodes) {
                    *leaves -= 1;
                }
            }
        }
        Ok(())
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        for root in &mut self.roots {
            *root = Slot::Empty;
        }
        self.nodes = 0;
        self.leaves = 0;
    }

    /// Populated cells as `(nested_pix, value)` in ascending index order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        let stack = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(face, slot)| (slot, face as u64))
            .collect();
        Iter { stack }
    }
}

fn insert<T>(slot: &mut Slot<T>, local: u64, level: u32, value: T, nodes: &mut usize) -> bool {
    if level == 0 {
        let fresh = slot.is_empty();
        *slot = Slot::Leaf(value);
        return fresh;
    }
    if !matches!(slot, Slot::Branch(_)) {
        *slot = Slot::Branch(Box::new(Node::new()));
        *nodes += 1;
    }
    match slot {
        Slot::Branch(node) => {
            let child = &mut node.children[quadrant(local, level - 1)];
            insert(child, local, level - 1, value, nodes)
        }
        _ => false,
    }
}

fn remove<T>(slot: &mut Slot<T>, local: u64, level: u32, nodes: &mut usize) -> bool {
    match slot {
        Slot::Empty => false,
        Slot::Leaf(_) => {
            *slot = Slot::Empty;
            true
        }
        Slot::Branch(node) => {
            let removed = remove(
                &mut node.children[quadrant(local, level - 1)],
                local,
                level - 1,
                nodes,
            );
            if node.is_bare() {
                *slot = Slot::Empty;
                *nodes -= 1;
            }
            removed
        }
    }
}

/// Iterator over the populated cells of a [`SparseTree`].
pub struct Iter<'a, T> {
    /// Pending slots with the index prefix they cover.
    stack: Vec<(&'a Slot<T>, u64)>,
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = (u64, T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((slot, prefix)) = self.stack.pop() {
            match slot {
                Slot::Empty => {}
                Slot::Leaf(value) => return Some((prefix, *value)),
                Slot::Branch(node) => {
                    for (quad, child) in node.children.iter().enumerate().rev() {
                        self.stack.push((child, (prefix << 2) | quad as u64));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(n: u32) -> SparseTree<f64> {
        SparseTree::new(Nside::new(n).unwrap())
    }

    #[test]
    fn test_empty_tree_reads_none() {
        let t = tree(8);
        for pix in 0..768 {
            assert_eq!(t.get(pix).unwrap(), None);
        }
        assert_eq!(t.node_count(), 0);
        assert!(t.is_empty());
    }

    #[test]
    fn test_set_creates_path() {
        let mut t = tree(8);
        t.set(100, Some(2.5)).unwrap();
        assert_eq!(t.get(100).unwrap(), Some(2.5));
        assert_eq!(t.get(101).unwrap(), None);
        // depth 3: a branch at each of the levels 3, 2, 1
        assert_eq!(t.node_count(), 3);
        assert_eq!(t.len(), 1);

        t.set(101, Some(1.0)).unwrap();
        assert_eq!(t.node_count(), 3);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_overwrite_keeps_counts() {
        let mut t = tree(4);
        t.set(5, Some(1.0)).unwrap();
        t.set(5, Some(2.0)).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(5).unwrap(), Some(2.0));
    }

    #[test]
    fn test_remove_prunes_whole_path() {
        let mut t = tree(16);
        t.set(1234, Some(9.0)).unwrap();
        assert_eq!(t.node_count(), 4);
        t.set(1234, None).unwrap();
        assert_eq!(t.node_count(), 0);
        assert!(t.is_empty());
        assert_eq!(t.get(1234).unwrap(), None);
    }

    #[test]
    fn test_remove_stops_at_shared_node() {
        let mut t = tree(16);
        // Same level-1 node, different leaves.
        t.set(0, Some(1.0)).unwrap();
        t.set(1, Some(2.0)).unwrap();
        // Shares only the two top nodes with the cells above.
        t.set(16, Some(3.0)).unwrap();
        assert_eq!(t.node_count(), 6);

        t.set(0, None).unwrap();
        assert_eq!(t.node_count(), 6);
        t.set(1, None).unwrap();
        assert_eq!(t.node_count(), 4);
        assert_eq!(t.get(16).unwrap(), Some(3.0));
    }

    #[test]
    fn test_removing_absent_cell_is_noop() {
        let mut t = tree(4);
        t.set(3, None).unwrap();
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_nside_one_stores_at_root() {
        let mut t = tree(1);
        for pix in 0..12 {
            t.set(pix, Some(pix as f64)).unwrap();
        }
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.len(), 12);
        assert_eq!(t.get(7).unwrap(), Some(7.0));
        t.set(7, None).unwrap();
        assert_eq!(t.get(7).unwrap(), None);
        assert_eq!(t.len(), 11);
    }

    #[test]
    fn test_out_of_range() {
        let mut t = tree(2);
        assert!(t.get(48).is_err());
        assert!(t.set(48, Some(1.0)).is_err());
    }

    #[test]
    fn test_iter_ascending() {
        let mut t = tree(8);
        for pix in [700, 3, 64, 65, 5, 0] {
            t.set(pix, Some(pix as f64 * 0.5)).unwrap();
        }
        let cells: Vec<(u64, f64)> = t.iter().collect();
        let indices: Vec<u64> = cells.iter().map(|(p, _)| *p).collect();
        assert_eq!(indices, vec![0, 3, 5, 64, 65, 700]);
        assert!(cells.iter().all(|(p, v)| *v == *p as f64 * 0.5));
    }

    #[test]
    fn test_clear() {
        let mut t = tree(4);
        t.set(10, Some(1.0)).unwrap();
        t.set(150, Some(1.0)).unwrap();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.iter().count(), 0);
    }
}
