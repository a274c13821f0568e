use eframe::egui::{Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 12;
const QUADTREE_MAX_DEPTH: usize = 10;

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
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let half_extent = (span_x.max(span_y) * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let min = self.center - vec2(self.half_extent, self.half_extent);
        let max = self.center + vec2(self.half_extent, self.half_extent);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
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
        let upper = point.y >= self.center.y;
        match (right, upper) {
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
        let clamped_dx = dx.max(0.0);
        let clamped_dy = dy.max(0.0);
        (clamped_dx * clamped_dx) + (clamped_dy * clamped_dy)
    }
}

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
        // Signed sums for far-field strength, |charge|-weighted centers.
        let mut center_of_charge = Vec2::ZERO;
        let mut charge = 0.0_f32;
        let mut weight = 0.0_f32;
        for &index in &indices {
            let magnitude = charges[index].abs();
            charge += charges[index];
            weight += magnitude;
            center_of_charge += positions[index] * magnitude;
        }

        if weight > 0.0 {
            center_of_charge /= weight;
        } else if !indices.is_empty() {
            for &index in &indices {
                center_of_charge += positions[index];
            }
            center_of_charge /= indices.len() as f32;
        }

        let mut node = Self {
            bounds,
            center_of_charge,
            charge,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            let quadrant = bounds.quadrant_for(positions[index]);
            buckets[quadrant].push(index);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            let child_bounds = bounds.child(quadrant);
            node.children[quadrant] = Some(Box::new(Self::build_node(
                child_bounds,
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

    fn collect_leaf_indices(node: &QuadNode, into: &mut Vec<usize>) {
        into.extend_from_slice(&node.indices);
        for child in node.children.iter().flatten() {
            collect_leaf_indices(child, into);
        }
    }

    #[test]
    fn empty_input_builds_no_tree() {
        assert!(QuadNode::build(&[], &[]).is_none());
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..40)
            .map(|index| {
                vec2(
                    ((index % 8) as f32) * 37.0,
                    ((index / 8) as f32) * 53.0 - 100.0,
                )
            })
            .collect::<Vec<_>>();
        let charges = vec![-300.0; positions.len()];

        let tree = QuadNode::build(&positions, &charges).expect("tree for non-empty input");

        let mut seen = Vec::new();
        collect_leaf_indices(&tree, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..positions.len()).collect::<Vec<_>>());

        for position in &positions {
            assert!(tree.bounds.contains(*position));
        }
    }

    #[test]
    fn root_aggregates_signed_charge() {
        let positions = vec![vec2(0.0, 0.0), vec2(200.0, 0.0), vec2(0.0, 200.0)];
        let charges = vec![-600.0, -150.0, -300.0];

        let tree = QuadNode::build(&positions, &charges).expect("tree");
        assert!((tree.charge - (-1050.0)).abs() < 1e-3);
    }

    #[test]
    fn charge_weighted_center_leans_toward_strong_nodes() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let charges = vec![-600.0, -150.0];

        let tree = QuadNode::build(&positions, &charges).expect("tree");
        // 600:150 split puts the center at x = 20.
        assert!((tree.center_of_charge.x - 20.0).abs() < 1e-3);
        assert!(tree.center_of_charge.y.abs() < 1e-3);
    }
}
