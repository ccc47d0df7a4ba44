//! Structural invariant checks.

use std::collections::HashMap;

use smallvec::SmallVec;
use snafu::ensure;

use super::uses::Use;
use super::{Graph, NodeKind, ValueDef};
use crate::arena::ValueId;
use crate::error::*;

impl Graph {
    /// Checks every structural invariant of the region.
    ///
    /// - program order lists each live node exactly once;
    /// - operands are produced strictly earlier in program order (hence acyclic);
    /// - body parameters match operands in count and type;
    /// - return operands match results in count and type;
    /// - each value's def-use list is exactly the set of sites referencing it.
    pub fn verify(&self) -> Result<()> {
        ensure!(
            self.order.len() == self.nodes.len() && self.positions.len() == self.nodes.len(),
            OrderMismatchSnafu { ordered: self.order.len(), live: self.nodes.len() }
        );

        let mut expected: HashMap<ValueId, SmallVec<[Use; 4]>> = HashMap::new();

        for (pos, &node) in self.order.iter().enumerate() {
            let data = self.node(node)?;
            ensure!(self.positions.get(&node) == Some(&pos), OrderMismatchSnafu { ordered: self.order.len(), live: self.nodes.len() });

            for (index, &result) in data.results().iter().enumerate() {
                let def = self.value_def(result)?;
                ensure!(def == ValueDef::Result { node, index }, DefUseMismatchSnafu { value: result });
            }

            let NodeKind::Apply { operands, body } = data.kind() else {
                ensure!(data.results().len() == 1, ReturnArityMismatchSnafu { node, returned: 1usize, results: data.results().len() });
                continue;
            };

            let params = body.params();
            ensure!(
                operands.len() == params.len(),
                ParameterCountMismatchSnafu { operands: operands.len(), params: params.len() }
            );
            for (index, (&operand, &param)) in operands.iter().zip(params).enumerate() {
                let operand_ty = self.value_type(operand)?;
                ensure!(operand_ty == param, ParameterTypeMismatchSnafu { index, operand: operand_ty, param });
                if let Some(producer) = self.producer(operand)? {
                    ensure!(self.position(producer)? < pos, UseBeforeDefSnafu { node, value: operand, producer });
                }
                expected.entry(operand).or_default().push(Use::Operand { node, index });
            }

            let returned = body.result_types();
            ensure!(
                returned.len() == data.results().len(),
                ReturnArityMismatchSnafu { node, returned: returned.len(), results: data.results().len() }
            );
            for (index, (&result, &returned)) in data.results().iter().zip(&returned).enumerate() {
                let result_ty = self.value_type(result)?;
                ensure!(result_ty == returned, ResultTypeMismatchSnafu { node, index, result: result_ty, returned });
            }
        }

        for (index, &output) in self.outputs.iter().enumerate() {
            self.value_type(output)?;
            expected.entry(output).or_default().push(Use::Output { index });
        }

        for (value, actual) in self.uses.iter() {
            let mut actual: SmallVec<[Use; 4]> = actual.iter().copied().collect();
            let mut wanted = expected.remove(&value).unwrap_or_default();
            actual.sort_unstable();
            wanted.sort_unstable();
            ensure!(actual == wanted, DefUseMismatchSnafu { value });
        }
        if let Some((&value, _)) = expected.iter().next() {
            return DefUseMismatchSnafu { value }.fail();
        }

        Ok(())
    }
}
