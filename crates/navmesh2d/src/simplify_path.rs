//! Reduces dense paths, like the ones coming out of a grid search, to the few points that matter.

use glam::Vec2;

use crate::math::distance_point_segment_sq;

/// Simplifies polylines by stretching a rope between their ends.
///
/// The rope starts as the segment from the first to the last point. On every pass, each rope
/// segment is pulled to the point of the path it skips that deviates the most, if that point
/// is further than the allowed gap. Passes repeat until the rope stops growing.
///
/// This gives the same result as Ramer-Douglas-Peucker, computed breadth first.
/// The simplifier keeps its working buffers between calls, so reusing it avoids allocations.
#[derive(Debug, Clone, Default)]
pub struct PathSimplifier {
    rope: Vec<usize>,
    next_rope: Vec<usize>,
}

impl PathSimplifier {
    /// Creates a simplifier with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the points of `path` to keep so that every point of `path` lies within `max_gap`
    /// of the simplified path. The first and last points are always kept.
    ///
    /// Paths of 2 points or less are returned unchanged.
    pub fn simplify(&mut self, path: &[Vec2], max_gap: f32) -> Vec<Vec2> {
        self.simplify_indices(path, max_gap)
            .iter()
            .map(|&index| path[index])
            .collect()
    }

    /// Like [`PathSimplifier::simplify`], but returns the indices of the kept points.
    ///
    /// The returned slice borrows the simplifier's buffer and is overwritten by the next call.
    pub fn simplify_indices(&mut self, path: &[Vec2], max_gap: f32) -> &[usize] {
        self.rope.clear();
        if path.len() <= 2 {
            self.rope.extend(0..path.len());
            return &self.rope;
        }
        let max_gap_sq = max_gap * max_gap;
        self.rope.push(0);
        self.rope.push(path.len() - 1);

        loop {
            self.next_rope.clear();
            self.next_rope.push(self.rope[0]);
            for segment in self.rope.windows(2) {
                let (start, end) = (segment[0], segment[1]);
                if let Some(furthest) = furthest_point(path, start, end, max_gap_sq) {
                    self.next_rope.push(furthest);
                }
                self.next_rope.push(end);
            }
            if self.next_rope.len() == self.rope.len() {
                break;
            }
            std::mem::swap(&mut self.rope, &mut self.next_rope);
        }
        &self.rope
    }
}

/// Finds the point strictly between `start` and `end` that is the furthest from their segment,
/// if it is further than the allowed gap.
fn furthest_point(path: &[Vec2], start: usize, end: usize, max_gap_sq: f32) -> Option<usize> {
    let a = path[start];
    let b = path[end];
    let mut max_distance_sq = max_gap_sq;
    let mut furthest = None;
    for (index, point) in path.iter().enumerate().take(end).skip(start + 1) {
        let distance_sq = distance_point_segment_sq(*point, a, b);
        if distance_sq > max_distance_sq {
            max_distance_sq = distance_sq;
            furthest = Some(index);
        }
    }
    furthest
}

/// Simplifies `path` with a throwaway [`PathSimplifier`].
pub fn simplify_path(path: &[Vec2], max_gap: f32) -> Vec<Vec2> {
    PathSimplifier::new().simplify(path, max_gap)
}
