use thiserror::Error;

/// A pairwise experiment was requested over fewer than two nodes.
///
/// This is a recoverable condition: the estimators log it and return an
/// empty result rather than aborting the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("pairwise probing needs at least two nodes, got {found}")]
pub struct InsufficientNodes {
    pub found: usize,
}

/// Enumerate every unordered index pair `(i, j)` with `i < j < n`.
///
/// The pairs come out in lexicographic order, so an N-node sweep always
/// visits the same C(N, 2) experiments in the same order.
///
/// ```
/// # use wtopo_core::index_pairs;
/// let pairs: Vec<_> = index_pairs(3).collect();
/// assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
/// ```
pub fn index_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
}

/// All unordered pairs of `nodes`, in enumeration order.
pub fn node_pairs<T>(nodes: &[T]) -> Result<Vec<(&T, &T)>, InsufficientNodes> {
    if nodes.len() < 2 {
        return Err(InsufficientNodes { found: nodes.len() });
    }

    Ok(index_pairs(nodes.len())
        .map(|(i, j)| (&nodes[i], &nodes[j]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_and_singleton_are_errors() {
        assert_eq!(
            node_pairs::<u8>(&[]).unwrap_err(),
            InsufficientNodes { found: 0 }
        );
        assert_eq!(
            node_pairs(&[1u8]).unwrap_err(),
            InsufficientNodes { found: 1 }
        );
    }

    #[test]
    fn two_nodes_one_pair() {
        assert_eq!(node_pairs(&['a', 'b']).unwrap(), vec![(&'a', &'b')]);
    }

    #[test]
    fn enumeration_order() {
        let pairs: Vec<_> = index_pairs(4).collect();
        assert_eq!(
            pairs,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn count_unique_and_self_free() {
        const N: usize = 9;

        let pairs: Vec<_> = index_pairs(N).collect();
        assert_eq!(pairs.len(), N * (N - 1) / 2);

        let unique: HashSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());

        for (i, j) in pairs {
            assert!(i < j, "({i}, {j}) is not ordered");
        }
    }
}
