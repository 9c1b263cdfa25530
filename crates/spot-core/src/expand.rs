//! Cartesian expansion of converted parameter values.

use indexmap::IndexMap;

use crate::converter::ParamValue;
use crate::error::ExecutionError;

/// One concrete binding of every parameter name to a single value.
pub type Assignment = IndexMap<String, ParamValue>;

/// The product space of per-parameter value lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    names: Vec<String>,
    values: Vec<Vec<ParamValue>>,
    len: usize,
}

impl ParameterSpace {
    /// Build a space from name → values, keeping the map's order.
    ///
    /// A parameter with an empty value list makes the whole space empty.
    /// Fails when the number of assignments does not fit in a `usize`.
    pub fn new(converted: IndexMap<String, Vec<ParamValue>>) -> Result<Self, ExecutionError> {
        let (names, values): (Vec<String>, Vec<Vec<ParamValue>>) = converted.into_iter().unzip();
        let len = if values.iter().any(Vec::is_empty) {
            0
        } else {
            values
                .iter()
                .try_fold(1usize, |acc, v| acc.checked_mul(v.len()))
                .ok_or_else(|| ExecutionError::SpaceTooLarge {
                    parameters: names.clone(),
                })?
        };
        Ok(Self { names, values, len })
    }

    /// Number of assignments in the space.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every assignment, last parameter varying fastest.
    ///
    /// Each call starts over from the first assignment.
    pub fn assignments(&self) -> Assignments<'_> {
        Assignments {
            space: self,
            indices: vec![0; self.names.len()],
            remaining: self.len,
        }
    }
}

/// Iterator over the assignments of a [`ParameterSpace`].
#[derive(Debug, Clone)]
pub struct Assignments<'a> {
    space: &'a ParameterSpace,
    indices: Vec<usize>,
    remaining: usize,
}

impl Iterator for Assignments<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.remaining == 0 {
            return None;
        }

        let assignment = self
            .space
            .names
            .iter()
            .zip(&self.space.values)
            .zip(&self.indices)
            .map(|((name, values), &index)| (name.clone(), values[index].clone()))
            .collect();

        self.remaining -= 1;
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.space.values[position].len() {
                break;
            }
            self.indices[position] = 0;
        }

        Some(assignment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Assignments<'_> {}
