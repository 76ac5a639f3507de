//! Group-type stratified k-fold cross-validation.
//!
//! Samples belong to groups (trials) and groups belong to group types (trial
//! types).  Within every group type the groups are dealt round-robin over the
//! folds, so each fold gets a balanced share of every type while a group is
//! never split across folds.
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::error::SplitError;

/// One train/test partition of `0..n_samples`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold splitter balancing group types across folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTypeKFold {
    n_splits: usize,
}

impl Default for GroupTypeKFold {
    /// Five folds.
    fn default() -> Self {
        Self { n_splits: 5 }
    }
}

/// Distinct values of `labels` in order of first appearance.
fn unique_in_order<T: Eq + Hash + Clone>(labels: &[T]) -> Vec<T> {
    let mut seen: HashSet<&T> = HashSet::new();
    let mut out = Vec::new();
    for label in labels {
        if seen.insert(label) {
            out.push(label.clone());
        }
    }
    out
}

impl GroupTypeKFold {
    /// Splitter with `n_splits` folds (at least 2).
    pub fn new(n_splits: usize) -> Result<Self, SplitError> {
        if n_splits < 2 {
            return Err(SplitError::TooFewSplits(n_splits));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Fold index of every sample.
    ///
    /// Group types are visited in order of first appearance; within a type,
    /// its groups (also in order of first appearance) go to folds
    /// `0, 1, …, k-1, 0, …`.  A group that appears under several types ends up
    /// in the fold assigned by the last of them.
    pub fn assign_folds<G, T>(
        &self,
        n_samples: usize,
        groups: Option<&[G]>,
        group_types: Option<&[T]>,
    ) -> Result<Vec<usize>, SplitError>
    where
        G: Eq + Hash + Clone,
        T: Eq + Hash + Clone,
    {
        let (Some(groups), Some(group_types)) = (groups, group_types) else {
            return Err(SplitError::MissingGroups);
        };
        for (name, got) in [("groups", groups.len()), ("group_types", group_types.len())] {
            if got != n_samples {
                return Err(SplitError::LengthMismatch { name, expected: n_samples, got });
            }
        }

        let mut fold_of_group: HashMap<G, usize> = HashMap::new();
        for group_type in unique_in_order(group_types) {
            let type_groups: Vec<G> = groups
                .iter()
                .zip(group_types)
                .filter(|(_, t)| **t == group_type)
                .map(|(g, _)| g.clone())
                .collect();
            for (k, group) in unique_in_order(&type_groups).into_iter().enumerate() {
                fold_of_group.insert(group, k % self.n_splits);
            }
        }

        Ok(groups.iter().map(|g| fold_of_group[g]).collect())
    }

    /// Train/test indices for folds `0..k`.
    ///
    /// # Errors
    ///
    /// [`SplitError::MissingGroups`] when either label slice is `None`;
    /// [`SplitError::LengthMismatch`] when a slice is not `n_samples` long.
    ///
    /// # Examples
    ///
    /// ```
    /// use operant::GroupTypeKFold;
    ///
    /// let cv = GroupTypeKFold::new(2).unwrap();
    /// let groups = [1, 1, 2, 2, 3, 3];
    /// let types = ["A", "A", "A", "A", "B", "B"];
    /// let folds = cv.split(6, Some(&groups[..]), Some(&types[..])).unwrap();
    /// assert_eq!(folds[0].test, vec![0, 1, 4, 5]);
    /// assert_eq!(folds[1].test, vec![2, 3]);
    /// ```
    pub fn split<G, T>(
        &self,
        n_samples: usize,
        groups: Option<&[G]>,
        group_types: Option<&[T]>,
    ) -> Result<Vec<Fold>, SplitError>
    where
        G: Eq + Hash + Clone,
        T: Eq + Hash + Clone,
    {
        let assignment = self.assign_folds(n_samples, groups, group_types)?;
        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..n_samples).partition(|&i| assignment[i] == fold);
                Fold { train, test }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_within_type() {
        let cv = GroupTypeKFold::new(2).unwrap();
        let folds = cv
            .assign_folds(6, Some(&[1, 1, 2, 2, 3, 3][..]), Some(&['A', 'A', 'A', 'A', 'B', 'B'][..]))
            .unwrap();
        assert_eq!(folds, vec![0, 0, 1, 1, 0, 0]);
    }

    #[test]
    fn first_appearance_order() {
        let cv = GroupTypeKFold::new(3).unwrap();
        let groups = [9, 4, 9, 7, 4];
        let types = [0, 0, 0, 0, 0];
        let folds = cv.assign_folds(5, Some(&groups[..]), Some(&types[..])).unwrap();
        // 9 → 0, 4 → 1, 7 → 2
        assert_eq!(folds, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn partitions_are_complementary() {
        let cv = GroupTypeKFold::default();
        let groups: Vec<u32> = (0..40).map(|i| i / 3).collect();
        let types: Vec<&str> = groups.iter().map(|g| if g % 2 == 0 { "free" } else { "forced" }).collect();
        let folds = cv.split(40, Some(&groups[..]), Some(&types[..])).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; 40];
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 40);
            for &i in &fold.test {
                seen[i] += 1;
                assert!(!fold.train.contains(&i));
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn errors() {
        assert_eq!(GroupTypeKFold::new(1), Err(SplitError::TooFewSplits(1)));
        let cv = GroupTypeKFold::new(2).unwrap();
        assert_eq!(
            cv.split::<i32, i32>(2, None, Some(&[0, 0][..])),
            Err(SplitError::MissingGroups)
        );
        assert_eq!(
            cv.split(3, Some(&[0, 1][..]), Some(&[0, 0, 0][..])),
            Err(SplitError::LengthMismatch { name: "groups", expected: 3, got: 2 })
        );
    }
}
