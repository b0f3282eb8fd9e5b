//! Dense square matrices indexed by core index.

use serde::Serialize;

/// Routing-matrix default: no direct transmission between the pair.
pub const NO_SEND: i32 = 0;

/// Routing-matrix value for "forward upward to the parent".
pub const ROUTE_TO_PARENT: i32 = 99;

/// Every tree node, the root included, must have fewer children than this
/// so send orders stay below the parent sentinel.
pub const MAX_CHILDREN: usize = 90;

/// Next-hop default for pairs without a route.
pub const NEXT_HOP_UNSET: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    dim: usize,
    default: i32,
    cells: Vec<i32>,
}

impl Matrix {
    pub fn new(dim: usize, default: i32) -> Self {
        Self {
            dim,
            default,
            cells: vec![default; dim * dim],
        }
    }

    /// All-zero send-order matrix.
    pub fn routing(dim: usize) -> Self {
        Self::new(dim, NO_SEND)
    }

    /// Next-hop table with every pair unset.
    pub fn next_hop(dim: usize) -> Self {
        Self::new(dim, NEXT_HOP_UNSET)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.cells[row * self.dim + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        self.cells[row * self.dim + col] = value;
    }

    pub fn is_default(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == self.default
    }

    pub fn row(&self, row: usize) -> &[i32] {
        &self.cells[row * self.dim..(row + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        (0..self.dim).map(move |r| self.row(r))
    }
}
