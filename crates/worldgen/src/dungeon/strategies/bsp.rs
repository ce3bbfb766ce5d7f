//! Binary space partition: split the floor recursively, put one room in each leaf, then join
//! sibling subtrees bottom-up.

use slotmap::{SlotMap, new_key_type};

use crate::seed::DeterministicRng;

use super::super::definition::GenerationParams;
use super::super::grid::{Grid, Rect};
use super::super::pipeline::{CarveHints, FloorGenerator};

new_key_type! {
    struct NodeKey;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BspRooms;

#[derive(Debug)]
struct Node {
    area: Rect,
    children: Option<(NodeKey, NodeKey)>,
    room: Option<Rect>,
}

struct Partition {
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
}

impl Partition {
    fn build(area: Rect, rng: &mut DeterministicRng, min_leaf: usize, max_depth: usize) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node { area, children: None, room: None });
        let mut pending = vec![(root, 0_usize)];
        while let Some((key, depth)) = pending.pop() {
            if depth >= max_depth {
                continue;
            }
            let Some((first, second)) = split_area(nodes[key].area, rng, min_leaf) else {
                continue;
            };
            let first = nodes.insert(Node { area: first, children: None, room: None });
            let second = nodes.insert(Node { area: second, children: None, room: None });
            nodes[key].children = Some((first, second));
            pending.push((second, depth + 1));
            pending.push((first, depth + 1));
        }
        Self { nodes, root }
    }

    fn leaves(&self) -> Vec<NodeKey> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            match self.nodes[key].children {
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => leaves.push(key),
            }
        }
        leaves
    }

    /// Room of the leftmost (or rightmost) leaf under `key`.
    fn edge_room(&self, mut key: NodeKey, rightmost: bool) -> Option<Rect> {
        while let Some((first, second)) = self.nodes[key].children {
            key = if rightmost { second } else { first };
        }
        self.nodes[key].room
    }
}

fn split_area(area: Rect, rng: &mut DeterministicRng, min_leaf: usize) -> Option<(Rect, Rect)> {
    let can_cut_x = area.width >= min_leaf * 2;
    let can_cut_y = area.height >= min_leaf * 2;
    let cut_x = match (can_cut_x, can_cut_y) {
        (false, false) => return None,
        (true, false) => true,
        (false, true) => false,
        _ if area.width * 4 >= area.height * 5 => true,
        _ if area.height * 4 >= area.width * 5 => false,
        _ => rng.chance(0.5),
    };
    if cut_x {
        let cut = rng.range_inclusive_usize(min_leaf, area.width - min_leaf);
        Some((
            Rect { width: cut, ..area },
            Rect { x: area.x + cut, width: area.width - cut, ..area },
        ))
    } else {
        let cut = rng.range_inclusive_usize(min_leaf, area.height - min_leaf);
        Some((
            Rect { height: cut, ..area },
            Rect { y: area.y + cut, height: area.height - cut, ..area },
        ))
    }
}

/// A room inside `area` keeping a one-tile margin, so neighbouring leaves never touch.
fn room_in(area: Rect, rng: &mut DeterministicRng) -> Option<Rect> {
    let available_width = area.width.checked_sub(2)?;
    let available_height = area.height.checked_sub(2)?;
    if available_width == 0 || available_height == 0 {
        return None;
    }
    let width = rng.range_inclusive_usize(available_width.min(3), available_width);
    let height = rng.range_inclusive_usize(available_height.min(3), available_height);
    let x = area.x + 1 + rng.range_inclusive_usize(0, available_width - width);
    let y = area.y + 1 + rng.range_inclusive_usize(0, available_height - height);
    Some(Rect { x, y, width, height })
}

impl FloorGenerator for BspRooms {
    fn name(&self) -> &'static str {
        "bsp"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let min_leaf = params.min_leaf_size.unwrap_or(6).clamp(5, 32);
        let max_depth = params.max_depth.unwrap_or(5).min(10);
        let interior = Rect { x: 1, y: 1, width: grid.width() - 2, height: grid.height() - 2 };
        let mut partition = Partition::build(interior, rng, min_leaf, max_depth);

        for key in partition.leaves() {
            let room = room_in(partition.nodes[key].area, rng);
            if let Some(room) = room {
                grid.carve_rect(&room);
            }
            partition.nodes[key].room = room;
        }

        // Joining the leftmost rooms of each sibling pair links every subtree to its parent.
        let joins: Vec<(NodeKey, NodeKey)> =
            partition.nodes.values().filter_map(|node| node.children).collect();
        for (first, second) in joins {
            let from = partition.edge_room(first, false);
            let to = partition.edge_room(second, false);
            if let (Some(from), Some(to)) = (from, to) {
                grid.carve_l_corridor(from.center(), to.center(), rng.chance(0.5));
            }
        }

        let entry =
            partition.edge_room(partition.root, false).map_or_else(|| grid.center(), Rect::center);
        let exit = partition.edge_room(partition.root, true).map(Rect::center);
        CarveHints { entry, exit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileKind;

    #[test]
    fn leaves_tile_the_root_without_overlap() {
        let area = Rect { x: 1, y: 1, width: 62, height: 38 };
        let partition = Partition::build(area, &mut DeterministicRng::new(3), 6, 5);
        let leaves = partition.leaves();
        assert!(leaves.len() > 1);
        let covered: usize = leaves
            .iter()
            .map(|&key| partition.nodes[key].area)
            .inspect(|leaf| assert!(leaf.width >= 6 && leaf.height >= 6))
            .map(|leaf| leaf.width * leaf.height)
            .sum();
        assert_eq!(covered, area.width * area.height);
    }

    #[test]
    fn every_leaf_room_connects_to_the_first() {
        for seed in 0..6 {
            let mut grid = Grid::filled(64, 40, TileKind::Wall);
            let mut rng = DeterministicRng::new(seed);
            let hints = BspRooms.carve(&mut grid, &mut rng, &GenerationParams::default());
            let distances = grid.distances_from(hints.entry);
            let walkable = grid.walkable_count();
            let reachable = distances.iter().filter(|distance| distance.is_some()).count();
            assert_eq!(reachable, walkable, "seed {seed} left a room unconnected");
            let exit = hints.exit.unwrap_or(hints.entry);
            assert!(grid.is_walkable(exit));
        }
    }
}
