//! Def-use index kept beside the node arena.
//!
//! Nodes never hold back-pointers to their users. Instead the graph owns one
//! index from each value to the sites that reference it, updated in the same
//! call that changes the site.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::arena::{NodeId, ValueId};

/// A site referencing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Use {
    /// Operand `index` of apply `node`.
    Operand { node: NodeId, index: usize },
    /// Position `index` in the region's external output list.
    Output { index: usize },
}

impl Use {
    /// Consuming node, if the site is an operand.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Operand { node, .. } => Some(*node),
            Self::Output { .. } => None,
        }
    }
}

pub(crate) type UseList = SmallVec<[Use; 4]>;

#[derive(Debug, Clone, Default)]
pub(crate) struct UseIndex {
    uses: HashMap<ValueId, UseList>,
}

impl UseIndex {
    pub(crate) fn get(&self, value: ValueId) -> &[Use] {
        self.uses.get(&value).map(|list| list.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn add(&mut self, value: ValueId, site: Use) {
        self.uses.entry(value).or_default().push(site);
    }

    pub(crate) fn remove(&mut self, value: ValueId, site: Use) {
        if let Some(list) = self.uses.get_mut(&value) {
            if let Some(pos) = list.iter().position(|&u| u == site) {
                list.remove(pos);
            }
            if list.is_empty() {
                self.uses.remove(&value);
            }
        }
    }

    /// Detaches and returns every use of `value`.
    pub(crate) fn take(&mut self, value: ValueId) -> UseList {
        self.uses.remove(&value).unwrap_or_default()
    }

    pub(crate) fn extend(&mut self, value: ValueId, sites: impl IntoIterator<Item = Use>) {
        let list = self.uses.entry(value).or_default();
        list.extend(sites);
        if list.is_empty() {
            self.uses.remove(&value);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ValueId, &[Use])> {
        self.uses.iter().map(|(value, list)| (*value, list.as_slice()))
    }
}
