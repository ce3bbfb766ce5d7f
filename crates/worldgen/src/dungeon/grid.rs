//! Dense tile grid and tile-space primitives shared by every layout strategy.

use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::types::{Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn right(self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }

    pub fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Row-major tile grid. Reads outside the grid see `Wall`; writes outside it are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, kind: TileKind) -> Self {
        Self { width, height, tiles: vec![kind; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub(super) fn into_tiles(self) -> Vec<TileKind> {
        self.tiles
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.height / 2) as i32, x: (self.width / 2) as i32 }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Inside the grid and off the outer border.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width.saturating_sub(1)
            && (pos.y as usize) < self.height.saturating_sub(1)
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn get(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn set(&mut self, pos: Pos, kind: TileKind) {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            self.tiles[index] = kind;
        }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.get(pos).walkable()
    }

    /// Sets `Floor` on interior tiles only, so carving never breaches the border.
    pub fn carve(&mut self, pos: Pos) {
        if self.is_interior(pos) {
            self.set(pos, TileKind::Floor);
        }
    }

    pub fn carve_rect(&mut self, rect: &Rect) {
        for y in rect.y..=rect.bottom() {
            for x in rect.x..=rect.right() {
                self.carve(Pos { y: y as i32, x: x as i32 });
            }
        }
    }

    pub fn carve_horizontal(&mut self, y: i32, from_x: i32, to_x: i32) {
        for x in from_x.min(to_x)..=from_x.max(to_x) {
            self.carve(Pos { y, x });
        }
    }

    pub fn carve_vertical(&mut self, x: i32, from_y: i32, to_y: i32) {
        for y in from_y.min(to_y)..=from_y.max(to_y) {
            self.carve(Pos { y, x });
        }
    }

    pub fn carve_l_corridor(&mut self, start: Pos, end: Pos, horizontal_first: bool) {
        if horizontal_first {
            self.carve_horizontal(start.y, start.x, end.x);
            self.carve_vertical(end.x, start.y, end.y);
        } else {
            self.carve_vertical(start.x, start.y, end.y);
            self.carve_horizontal(end.y, start.x, end.x);
        }
    }

    /// Steps one axis at a time so consecutive tiles always share an edge.
    pub fn line_4(start: Pos, end: Pos) -> Vec<Pos> {
        let dx = i64::from(end.x) - i64::from(start.x);
        let dy = i64::from(end.y) - i64::from(start.y);
        let (span_x, span_y) = (dx.abs(), dy.abs());
        let (step_x, step_y) = (dx.signum() as i32, dy.signum() as i32);
        let mut points = vec![start];
        let (mut x, mut y) = (start.x, start.y);
        let (mut moved_x, mut moved_y) = (0_i64, 0_i64);
        while moved_x < span_x || moved_y < span_y {
            // Advance whichever axis lags further behind the ideal line.
            let x_lags = (1 + 2 * moved_x) * span_y < (1 + 2 * moved_y) * span_x;
            if moved_y >= span_y || (moved_x < span_x && x_lags) {
                x += step_x;
                moved_x += 1;
            } else {
                y += step_y;
                moved_y += 1;
            }
            points.push(Pos { y, x });
        }
        points
    }

    /// Bresenham line; walls drawn along it block 4-connected movement.
    pub fn line_8(start: Pos, end: Pos) -> Vec<Pos> {
        let mut points = Vec::new();
        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        let step_x = if start.x < end.x { 1 } else { -1 };
        let step_y = if start.y < end.y { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (start.x, start.y);
        loop {
            points.push(Pos { y, x });
            if x == end.x && y == end.y {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
        points
    }

    pub fn seal_border(&mut self) {
        for x in 0..self.width {
            self.set(Pos { y: 0, x: x as i32 }, TileKind::Wall);
            self.set(Pos { y: self.height as i32 - 1, x: x as i32 }, TileKind::Wall);
        }
        for y in 0..self.height {
            self.set(Pos { y: y as i32, x: 0 }, TileKind::Wall);
            self.set(Pos { y: y as i32, x: self.width as i32 - 1 }, TileKind::Wall);
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 }))
    }

    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|kind| kind.walkable()).count()
    }

    /// 4-connected walking distance from `start` to every tile; `None` when unreachable.
    pub fn distances_from(&self, start: Pos) -> Vec<Option<u32>> {
        let mut distances = vec![None; self.tiles.len()];
        if !self.is_walkable(start) {
            return distances;
        }
        let start_index = self.index(start);
        distances[start_index] = Some(0);
        let mut open = VecDeque::from([start]);
        while let Some(pos) = open.pop_front() {
            let distance = distances[self.index(pos)].unwrap_or(0);
            for next in pos.neighbors() {
                if !self.is_walkable(next) {
                    continue;
                }
                let next_index = self.index(next);
                if distances[next_index].is_some() {
                    continue;
                }
                distances[next_index] = Some(distance + 1);
                open.push_back(next);
            }
        }
        distances
    }

    /// Walls off every walkable tile not connected to `anchor`; returns how many were sealed.
    pub fn retain_region(&mut self, anchor: Pos) -> usize {
        let distances = self.distances_from(anchor);
        let mut sealed = 0;
        for (index, distance) in distances.iter().enumerate() {
            if distance.is_none() && self.tiles[index].walkable() {
                self.tiles[index] = TileKind::Wall;
                sealed += 1;
            }
        }
        sealed
    }

    /// Connected walkable regions, largest first; ties keep scan order.
    pub fn regions(&self) -> Vec<Vec<Pos>> {
        let mut seen = vec![false; self.tiles.len()];
        let mut regions = Vec::new();
        for start in self.positions() {
            let start_index = self.index(start);
            if seen[start_index] || !self.tiles[start_index].walkable() {
                continue;
            }
            seen[start_index] = true;
            let mut region = vec![start];
            let mut open = VecDeque::from([start]);
            while let Some(pos) = open.pop_front() {
                for next in pos.neighbors() {
                    if !self.is_walkable(next) {
                        continue;
                    }
                    let next_index = self.index(next);
                    if seen[next_index] {
                        continue;
                    }
                    seen[next_index] = true;
                    region.push(next);
                    open.push_back(next);
                }
            }
            regions.push(region);
        }
        regions.sort_by_key(|region| Reverse(region.len()));
        regions
    }

    pub fn nearest_walkable(&self, desired: Pos) -> Option<Pos> {
        if self.is_walkable(desired) {
            return Some(desired);
        }
        let mut best: Option<(u32, Pos)> = None;
        for pos in self.positions() {
            if !self.is_walkable(pos) {
                continue;
            }
            let distance = pos.manhattan(desired);
            let should_replace = match best {
                None => true,
                Some((best_distance, best_pos)) => {
                    (distance, pos.y, pos.x) < (best_distance, best_pos.y, best_pos.x)
                }
            };
            if should_replace {
                best = Some((distance, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Reachable tile with the greatest walking distance from `start`; ties go to the larger
    /// `(y, x)`.
    pub fn farthest_from(&self, start: Pos) -> Pos {
        let distances = self.distances_from(start);
        let mut best = start;
        let mut best_distance = 0_u32;
        for pos in self.positions() {
            let Some(distance) = distances[self.index(pos)] else {
                continue;
            };
            if distance > best_distance
                || (distance == best_distance && (pos.y, pos.x) > (best.y, best.x))
            {
                best = pos;
                best_distance = distance;
            }
        }
        best
    }
}
