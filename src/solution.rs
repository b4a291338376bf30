// Accepted input paths

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::action::{describe_inputs, format_codes, Action};

/// One input path that reaches a goal on its final frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Solution {
    pub inputs: Vec<Action>,
}

impl Solution {
    pub fn new(inputs: Vec<Action>) -> Self {
        Solution { inputs }
    }

    /// Frames consumed when replayed, forced frames included
    pub fn frames(&self) -> usize {
        self.inputs.len()
    }

    pub fn to_english(&self) -> String {
        describe_inputs(&self.inputs)
    }

    pub fn to_codes(&self) -> String {
        format_codes(&self.inputs)
    }
}

/// Append-only, ordered collection of solutions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionSet {
    solutions: Vec<Solution>,
}

impl SolutionSet {
    pub fn new() -> Self {
        SolutionSet::default()
    }

    pub fn push(&mut self, solution: Solution) {
        self.solutions.push(solution);
    }

    /// Appends every solution of `other`, preserving its order
    pub fn append(&mut self, other: SolutionSet) {
        self.solutions.extend(other.solutions);
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn first(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    pub fn get(&self, index: usize) -> Option<&Solution> {
        self.solutions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    /// Shortest solution found; the earliest one wins ties
    pub fn shortest(&self) -> Option<&Solution> {
        self.solutions
            .iter()
            .enumerate()
            .min_by_key(|(i, s)| (s.frames(), *i))
            .map(|(_, s)| s)
    }

    /// Order-insensitive view used to compare runs with different thread counts
    pub fn to_unordered(&self) -> BTreeSet<Solution> {
        self.solutions.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

impl FromIterator<Solution> for SolutionSet {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        SolutionSet {
            solutions: iter.into_iter().collect(),
        }
    }
}
