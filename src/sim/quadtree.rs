use eframe::egui::{vec2, Vec2};

const LEAF_CAPACITY: usize = 10;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center,
            half_extent: (span * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };
        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let lower = point.y >= self.center.y;
        match (right, lower) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let dx = (self.center.x - other.center.x).abs() - (self.half_extent + other.half_extent);
        let dy = (self.center.y - other.center.y).abs() - (self.half_extent + other.half_extent);
        let dx = dx.max(0.0);
        let dy = dy.max(0.0);
        (dx * dx) + (dy * dy)
    }
}

/// Barnes-Hut quadtree over body positions. Interior nodes carry a
/// charge-weighted center so high-importance hubs repel harder than their
/// point count alone would.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_charge: Vec2,
    pub(super) charge: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], charges: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, charges, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        charges: &[f32],
        depth: usize,
    ) -> Self {
        let mut center_of_charge = Vec2::ZERO;
        let mut charge = 0.0f32;
        for &index in &indices {
            let weight = charges.get(index).copied().unwrap_or(1.0);
            center_of_charge += positions[index] * weight;
            charge += weight;
        }
        if charge > 0.0 {
            center_of_charge /= charge;
        }

        let mut node = Self {
            bounds,
            center_of_charge,
            charge,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        // A degenerate cluster that refuses to split stays a leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                charges,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_partitions_spread_points() {
        let positions = (0..64)
            .map(|i| vec2((i % 8) as f32 * 50.0, (i / 8) as f32 * 50.0))
            .collect::<Vec<_>>();
        let charges = vec![1.0; positions.len()];

        let tree = QuadNode::build(&positions, &charges).unwrap();
        assert!(!tree.is_leaf());
        assert!((tree.charge - 64.0).abs() < 1e-3);
        assert!(tree.bounds.contains(tree.center_of_charge));
    }

    #[test]
    fn charge_weighting_shifts_the_center() {
        let positions = vec![vec2(-100.0, 0.0), vec2(100.0, 0.0)];
        let charges = vec![1.0, 3.0];

        let tree = QuadNode::build(&positions, &charges).unwrap();
        assert!(tree.center_of_charge.x > 0.0);
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(QuadNode::build(&[], &[]).is_none());
    }
}
