//! Constant 3-D offsets addressing neighbouring grid points.
//!
//! Offsets compose by vector addition: an access at `o1` into a value that was
//! itself read at `o2` reads the original field at `o1 + o2`.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index, Neg, Sub};

/// Constant integer displacement along the three grid dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset([i64; 3]);

impl Offset {
    pub const ZERO: Offset = Offset([0; 3]);

    pub const fn new(i: i64, j: i64, k: i64) -> Self {
        Self([i, j, k])
    }

    pub const fn as_array(&self) -> [i64; 3] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Offset of an access nested under an access at `outer`.
    pub fn compose(self, outer: Offset) -> Offset {
        self + outer
    }
}

impl From<[i64; 3]> for Offset {
    fn from(value: [i64; 3]) -> Self {
        Self(value)
    }
}

impl Index<usize> for Offset {
    type Output = i64;

    fn index(&self, dim: usize) -> &i64 {
        &self.0[dim]
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        *self = *self + rhs;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        self + -rhs
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl Sum for Offset {
    fn sum<I: Iterator<Item = Offset>>(iter: I) -> Offset {
        iter.fold(Offset::ZERO, Add::add)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [i, j, k] = self.0;
        write!(f, "[{i}, {j}, {k}]")
    }
}
