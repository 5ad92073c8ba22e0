//! Binomial-tree topology.
//!
//! For group size `n` and root 0:
//!
//! - `parent(r) = r & (r - 1)` for `r > 0`; the root has no parent. This
//!   clears the lowest set bit of `r`, so odd ranks are always leaves.
//! - `children(r)` is the set of ranks whose `parent` is `r`; every
//!   non-root rank has exactly one parent, so this is a proper spanning
//!   tree (not every rank satisfying a bit-test on `r` belongs to it —
//!   only the ones `parent_logical` actually maps back to `r`).
//!
//! `D = ceil(log2(n))` is the tree depth.
//!
//! For a root other than 0, the topology is computed over the logical rank
//! `r XOR root` and ranks are rotated back into real space.

/// Depth of the binomial tree for `n` participants: `ceil(log2(n))`.
pub fn depth(n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    32 - (n - 1).leading_zeros()
}

/// Parent of logical rank `r` (root is logical rank 0), or `None` if `r`
/// is the root.
pub fn parent_logical(r: u32) -> Option<u32> {
    if r == 0 {
        None
    } else {
        Some(r & (r - 1))
    }
}

/// Children of logical rank `r` within a group of logical size `n`.
///
/// Derived as the inverse of `parent_logical` rather than re-deriving it
/// from a bit-pattern formula directly: scanning candidate children by
/// "does `parent_logical(c) == r`" is what actually keeps every non-root
/// rank with exactly one parent. A candidate's distance from `r` is
/// always a power of two, and candidates come out in ascending distance
/// order for free since we scan `c` ascending.
pub fn children_logical(r: u32, n: u32) -> Vec<u32> {
    (r + 1..n)
        .filter(|&c| parent_logical(c) == Some(r))
        .collect()
}

/// A binomial-tree topology rooted at an arbitrary rank.
///
/// Internally operates on "logical" ranks (`real XOR root`) and converts
/// back to real ranks at the API boundary: for a root other than 0 the
/// tree is computed over the logical rank `r XOR root`.
#[derive(Clone, Copy, Debug)]
pub struct Topology {
    n: u32,
    root: u32,
}

impl Topology {
    pub fn for_root(n: u32, root: u32) -> Self {
        assert!(root < n, "root {} out of range for n={}", root, n);
        Topology { n, root }
    }

    #[inline]
    fn to_logical(&self, real: u32) -> u32 {
        real ^ self.root
    }

    #[inline]
    fn to_real(&self, logical: u32) -> u32 {
        logical ^ self.root
    }

    /// Tree depth, `ceil(log2(n))`.
    pub fn depth(&self) -> u32 {
        depth(self.n)
    }

    /// Parent of `real` rank, in real rank space. `None` for the root.
    pub fn parent(&self, real: u32) -> Option<u32> {
        parent_logical(self.to_logical(real)).map(|p| self.to_real(p))
    }

    /// Children of `real` rank, in real rank space, ascending `2^i` order.
    pub fn children(&self, real: u32) -> Vec<u32> {
        children_logical(self.to_logical(real), self.n)
            .into_iter()
            .map(|c| self.to_real(c))
            .collect()
    }

    /// The logical rank of a real rank (`real XOR root`); exposed for
    /// engines that need the logical rank directly (e.g. to compute
    /// binomial broadcast/reduce step membership).
    pub fn logical(&self, real: u32) -> u32 {
        self.to_logical(real)
    }

    /// The real rank of a logical rank.
    pub fn real(&self, logical: u32) -> u32 {
        self.to_real(logical)
    }
}
