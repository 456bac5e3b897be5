//! A* pathfinding over the strategic grid
//!
//! Step cost comes from the caller, so the same search serves every military
//! kind. A cost of `f32::INFINITY` marks a cell that is never entered, and
//! negative costs are treated the same way. The heuristic is the taxicab
//! distance scaled by the cheapest step the caller can produce, which keeps it
//! admissible on maps with cheap roads.
//! Occupancy is not considered here: other units move between days, so it is
//! re-checked each step while the unit walks the path.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::types::Point;

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    point: Point,
    f_cost: OrderedFloat<f32>, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.f_cost == other.f_cost
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties broken by point for stable results
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.point.cmp(&self.point))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest 4-connected path from `start` to `goal`
///
/// `step_cost(p)` is the cost of entering `p` and is never below `min_step`.
/// The returned path includes both endpoints. Returns None if no finite-cost
/// route exists.
pub fn find_path<F>(start: Point, goal: Point, min_step: f32, step_cost: F) -> Option<Vec<Point>>
where
    F: Fn(Point) -> f32,
{
    if start == goal {
        return Some(vec![start]);
    }

    let min_step = if min_step.is_finite() { min_step.max(0.0) } else { 0.0 };
    let heuristic = |p: Point| p.taxi_distance(&goal) as f32 * min_step;

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<Point, Point> = AHashMap::new();
    let mut g_scores: AHashMap<Point, f32> = AHashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        point: start,
        f_cost: OrderedFloat(heuristic(start)),
    });

    while let Some(current) = open_set.pop() {
        if current.point == goal {
            return Some(reconstruct_path(&came_from, current.point));
        }

        let current_g = *g_scores.get(&current.point).unwrap_or(&f32::INFINITY);

        // Skip entries superseded by a cheaper route
        if current.f_cost.0 > current_g + heuristic(current.point) {
            continue;
        }

        for neighbor in current.point.neighbors() {
            let move_cost = step_cost(neighbor);
            if !move_cost.is_finite() || move_cost < 0.0 {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.point);
                g_scores.insert(neighbor, tentative_g);

                let f_cost = tentative_g + heuristic(neighbor);
                open_set.push(PathNode {
                    point: neighbor,
                    f_cost: OrderedFloat(f_cost),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<Point, Point>, mut current: Point) -> Vec<Point> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Cost of walking a path, excluding the start cell
pub fn path_cost<F>(path: &[Point], step_cost: F) -> f32
where
    F: Fn(Point) -> f32,
{
    path.iter().skip(1).map(|&p| step_cost(p)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    /// 10x10 grid with cost 1 everywhere except the listed walls
    fn grid(walls: &[Point]) -> impl Fn(Point) -> f32 + '_ {
        move |p: Point| {
            if p.x < 0 || p.y < 0 || p.x >= 10 || p.y >= 10 || walls.contains(&p) {
                f32::INFINITY
            } else {
                1.0
            }
        }
    }

    fn is_connected(path: &[Point]) -> bool {
        path.windows(2).all(|w| w[0].taxi_distance(&w[1]) == 1)
    }

    #[test]
    fn test_pathfind_straight_line() {
        let start = Point::new(0, 0);
        let goal = Point::new(5, 0);

        let path = find_path(start, goal, 1.0, grid(&[])).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 6);
        assert!(is_connected(&path));
    }

    #[test]
    fn test_detour_around_single_blocked_cell() {
        let start = Point::new(2, 2);
        let goal = Point::new(4, 2);
        let wall = [Point::new(3, 2)];

        let path = find_path(start, goal, 1.0, grid(&wall)).unwrap();

        assert!(!path.is_empty());
        assert!(!path.contains(&wall[0]));
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(is_connected(&path));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_pathfind_no_path() {
        let goal = Point::new(5, 5);
        let walls = goal.neighbors().to_vec();

        assert!(find_path(Point::new(0, 0), goal, 1.0, grid(&walls)).is_none());
    }

    #[test]
    fn test_pathfind_same_start_goal() {
        let start = Point::new(5, 5);
        assert_eq!(find_path(start, start, 1.0, grid(&[])), Some(vec![start]));
    }

    #[test]
    fn test_prefers_cheaper_terrain() {
        // Row y=0 is swamp (cost 5), row y=1 is road (cost 0.5)
        let cost = |p: Point| {
            if p.x < 0 || p.y < 0 || p.x >= 10 || p.y >= 3 {
                f32::INFINITY
            } else if p.y == 0 {
                5.0
            } else {
                0.5
            }
        };

        let path = find_path(Point::new(0, 0), Point::new(6, 0), 0.5, cost).unwrap();
        let visited: AHashSet<Point> = path.iter().copied().collect();

        assert!(visited.contains(&Point::new(3, 1)));
        assert!(path_cost(&path, cost) < 6.0 * 5.0);
    }

    #[test]
    fn test_cheap_road_path_is_optimal() {
        // Direct row costs 1 per cell; a road two rows down costs 0.1
        let cost = |p: Point| {
            if p.x < 0 || p.y < 0 || p.x >= 10 || p.y >= 3 {
                f32::INFINITY
            } else if p.y == 2 {
                0.1
            } else {
                1.0
            }
        };
        let start = Point::new(0, 0);
        let goal = Point::new(9, 0);

        let path = find_path(start, goal, 0.1, cost).unwrap();

        // Two steps down, ten road cells, two steps up
        assert!((path_cost(&path, cost) - 4.0).abs() < 1e-4);
        assert!(is_connected(&path));
    }

    #[test]
    fn test_negative_cost_cell_never_entered() {
        let hole = Point::new(5, 5);
        let cost = |p: Point| {
            if p.x < 0 || p.y < 0 || p.x >= 11 || p.y >= 11 {
                f32::INFINITY
            } else if p == hole {
                -2.0
            } else {
                1.0
            }
        };

        let path = find_path(Point::new(5, 3), Point::new(5, 7), 0.0, cost).unwrap();

        assert!(!path.contains(&hole));
        assert_eq!(path_cost(&path, cost), 6.0);
    }

    #[test]
    fn test_path_cost() {
        let path = vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)];
        let cost = |p: Point| if p.x == 1 { 1.5 } else { 1.0 };

        // Start cell is free: 1.5 + 1.0
        assert_eq!(path_cost(&path, cost), 2.5);
    }
}
