use std::collections::{HashMap, VecDeque};

use crate::keyboard::key::KeyId;

/// Neighbor offsets in enumeration order: up, down, left, right. Breadth-first
/// search visits neighbors in this order, which decides between equally short
/// paths.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Grid adjacency between physical keys, used only for finger navigation.
#[derive(Clone, Debug, Default)]
pub struct KeyGraph {
    adjacency: HashMap<KeyId, Vec<KeyId>>,
}

impl KeyGraph {
    /// Build the adjacency map from a ragged key grid. `None` cells and
    /// positions past the end of a row have no key and produce no edge.
    pub fn from_grid(rows: &[Vec<Option<KeyId>>]) -> Self {
        let cell = |r: isize, c: isize| -> Option<KeyId> {
            if r < 0 || c < 0 {
                return None;
            }
            rows.get(r as usize)?.get(c as usize).copied().flatten()
        };

        let mut adjacency = HashMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, key) in row.iter().enumerate() {
                let Some(key) = key else { continue };
                let neighbors = NEIGHBOR_OFFSETS
                    .iter()
                    .filter_map(|&(dr, dc)| cell(row_idx as isize + dr, col_idx as isize + dc))
                    .collect();
                adjacency.insert(*key, neighbors);
            }
        }
        Self { adjacency }
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.adjacency.contains_key(&key)
    }

    pub fn neighbors(&self, key: KeyId) -> &[KeyId] {
        self.adjacency.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Shortest path from `start` to `end`, both inclusive.
    ///
    /// Returns `[start]` when both ends are the same key and an empty path when
    /// either key is missing from the graph or `end` is unreachable.
    pub fn shortest_path(&self, start: KeyId, end: KeyId) -> Vec<KeyId> {
        if !self.contains(start) || !self.contains(end) {
            return Vec::new();
        }
        if start == end {
            return vec![start];
        }

        let mut previous: HashMap<KeyId, KeyId> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if next == start || previous.contains_key(&next) {
                    continue;
                }
                previous.insert(next, current);
                if next == end {
                    return walk_back(&previous, start, end);
                }
                queue.push_back(next);
            }
        }

        Vec::new()
    }
}

fn walk_back(previous: &HashMap<KeyId, KeyId>, start: KeyId, end: KeyId) -> Vec<KeyId> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match previous.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeyId::*;

    fn small_grid() -> Vec<Vec<Option<KeyId>>> {
        vec![
            vec![Some(KeyQ), Some(KeyW), Some(KeyE), Some(KeyR), Some(KeyT)],
            vec![Some(KeyA), Some(KeyS), Some(KeyD), Some(KeyF), Some(KeyG)],
            vec![Some(KeyZ), None, Some(KeyC)],
        ]
    }

    #[test]
    fn test_neighbors_follow_up_down_left_right() {
        let graph = KeyGraph::from_grid(&small_grid());
        assert_eq!(graph.neighbors(KeyS), &[KeyW, KeyA, KeyD]);
        assert_eq!(graph.neighbors(KeyD), &[KeyE, KeyC, KeyS, KeyF]);
        assert_eq!(graph.neighbors(KeyT), &[KeyG, KeyR]);
    }

    #[test]
    fn test_gaps_and_ragged_rows_have_no_edges() {
        let graph = KeyGraph::from_grid(&small_grid());
        // KeyS sits above the gap, KeyF above nothing.
        assert!(!graph.neighbors(KeyS).contains(&KeyZ));
        assert_eq!(graph.neighbors(KeyF), &[KeyR, KeyD, KeyG]);
        assert_eq!(graph.neighbors(KeyZ), &[KeyA]);
        assert_eq!(graph.len(), 12);
    }

    #[test]
    fn test_path_to_self() {
        let graph = KeyGraph::from_grid(&small_grid());
        assert_eq!(graph.shortest_path(KeyF, KeyF), vec![KeyF]);
    }

    #[test]
    fn test_path_unknown_keys_is_empty() {
        let graph = KeyGraph::from_grid(&small_grid());
        assert!(graph.shortest_path(KeyF, KeyP).is_empty());
        assert!(graph.shortest_path(KeyP, KeyF).is_empty());
        assert!(graph.shortest_path(KeyP, KeyP).is_empty());
    }

    #[test]
    fn test_path_disconnected_is_empty() {
        let grid = vec![vec![Some(KeyA), None, Some(KeyD)]];
        let graph = KeyGraph::from_grid(&grid);
        assert!(graph.shortest_path(KeyA, KeyD).is_empty());
    }

    #[test]
    fn test_path_prefers_vertical_moves_first() {
        let graph = KeyGraph::from_grid(&small_grid());
        // Two shortest paths exist (F-R-T and F-G-T); up is tried before right.
        assert_eq!(graph.shortest_path(KeyF, KeyT), vec![KeyF, KeyR, KeyT]);
    }

    #[test]
    fn test_path_is_shortest() {
        let graph = KeyGraph::from_grid(&small_grid());
        let path = graph.shortest_path(KeyZ, KeyT);
        assert_eq!(path.first(), Some(&KeyZ));
        assert_eq!(path.last(), Some(&KeyT));
        // Z -> A -> S -> D -> F -> G -> T (or via the top row), six hops.
        assert_eq!(path.len(), 7);
        for pair in path.windows(2) {
            assert!(graph.neighbors(pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn test_empty_graph() {
        let graph = KeyGraph::from_grid(&[]);
        assert!(graph.is_empty());
        assert!(graph.shortest_path(KeyA, KeyA).is_empty());
    }
}
