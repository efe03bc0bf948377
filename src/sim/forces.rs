use eframe::egui::{vec2, Vec2};

use super::quadtree::QuadNode;
use super::{BodyState, SpringLink};

fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn repulsion_between(
    point: Vec2,
    other: Vec2,
    other_charge: f32,
    strength: f32,
    softening: f32,
) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        vec2(1.0, 0.0)
    };
    direction * ((strength * other_charge) / (distance_sq + softening))
}

/// Barnes-Hut repulsion for one body. Contributions past `cutoff` are
/// dropped entirely; far cells inside the cutoff collapse to their
/// charge-weighted center when they subtend less than `theta`.
#[allow(clippy::too_many_arguments)]
pub(super) fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    softening: f32,
    theta: f32,
    cutoff_sq: f32,
    force: &mut Vec2,
) {
    if node.charge <= 0.0 {
        return;
    }

    let point = positions[index];
    let delta = point - node.center_of_charge;
    let distance_sq = delta.length_sq().max(0.0001);

    if !node.bounds.contains(point) {
        let slack = node.bounds.side_length();
        if distance_sq > cutoff_sq + slack * slack {
            return;
        }
    }

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let other_delta = point - positions[other];
            if other_delta.length_sq() > cutoff_sq {
                continue;
            }
            *force += repulsion_between(point, positions[other], 1.0, strength, softening);
        }
        return;
    }

    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < theta
        && node.charge > 1.0;
    if can_approximate {
        *force += repulsion_between(
            point,
            node.center_of_charge,
            node.charge,
            strength,
            softening,
        );
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion(
            child, index, positions, strength, softening, theta, cutoff_sq, force,
        );
    }
}

/// Spring attraction along links, damped by relative velocity so chains do
/// not oscillate.
pub(super) fn accumulate_springs(
    bodies: &[BodyState],
    links: &[SpringLink],
    spring_scale: f32,
    spring_damping: f32,
    forces: &mut [Vec2],
) {
    let count = bodies.len();
    for link in links {
        if link.source >= count || link.target >= count || link.source == link.target {
            continue;
        }

        let delta = bodies[link.source].pos - bodies[link.target].pos;
        let distance_sq = delta.length_sq();
        if distance_sq <= 0.0001 * 0.0001 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta / distance;

        let stretch = (distance - link.rest_length) * link.strength * spring_scale;
        let relative = bodies[link.source].vel - bodies[link.target].vel;
        let damping = relative.dot(direction) * spring_damping;
        let correction = direction * (stretch + damping);

        forces[link.source] -= correction;
        forces[link.target] += correction;
    }
}

/// Pulls every body toward the centroid of its group.
pub(super) fn accumulate_cohesion(
    bodies: &[BodyState],
    group_count: usize,
    strength: f32,
    centroids: &mut Vec<(Vec2, f32)>,
    forces: &mut [Vec2],
) {
    if group_count == 0 || strength <= 0.0 {
        return;
    }

    centroids.clear();
    centroids.resize(group_count, (Vec2::ZERO, 0.0));
    for body in bodies {
        if let Some(entry) = centroids.get_mut(body.group) {
            entry.0 += body.pos;
            entry.1 += 1.0;
        }
    }

    for (index, body) in bodies.iter().enumerate() {
        let Some(&(sum, members)) = centroids.get(body.group) else {
            continue;
        };
        if members < 2.0 {
            continue;
        }
        let centroid = sum / members;
        forces[index] += (centroid - body.pos) * strength;
    }
}

/// Global centering plus circular confinement: drift toward the origin, and
/// a push back inside once a body crosses the boundary radius.
pub(super) fn accumulate_containment(
    bodies: &[BodyState],
    center_pull: f32,
    boundary_radius: f32,
    boundary_strength: f32,
    forces: &mut [Vec2],
) {
    for (index, body) in bodies.iter().enumerate() {
        forces[index] -= body.pos * center_pull;

        let distance = body.pos.length();
        let limit = (boundary_radius - body.radius).max(1.0);
        if distance > limit {
            let direction = body.pos / distance;
            forces[index] -= direction * (distance - limit) * boundary_strength;
        }
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) padding: f32,
    pub(super) max_distance_sq: f32,
}

fn resolve_overlap(
    positions: &mut [Vec2],
    pinned: &[bool],
    radii: &[f32],
    a: usize,
    b: usize,
    params: CollisionParams,
) {
    let delta = positions[a] - positions[b];
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let min_distance = radii[a] + radii[b] + params.padding;
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        fallback_direction(a, b)
    };
    let overlap = min_distance - distance;

    match (pinned[a], pinned[b]) {
        (true, true) => {}
        (true, false) => positions[b] -= direction * overlap,
        (false, true) => positions[a] += direction * overlap,
        (false, false) => {
            positions[a] += direction * (overlap * 0.5);
            positions[b] -= direction * (overlap * 0.5);
        }
    }
}

fn collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &mut [Vec2],
    pinned: &[bool],
    radii: &[f32],
    params: CollisionParams,
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    resolve_overlap(
                        positions,
                        pinned,
                        radii,
                        node_a.indices[i],
                        node_a.indices[j],
                        params,
                    );
                }
            }
        } else {
            for &a in &node_a.indices {
                for &b in &node_b.indices {
                    resolve_overlap(positions, pinned, radii, a, b, params);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };
            collision_pairs(child_a, child_a, true, positions, pinned, radii, params);
            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                collision_pairs(child_a, child_b, false, positions, pinned, radii, params);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            collision_pairs(child, node_b, false, positions, pinned, radii, params);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            collision_pairs(node_a, child, false, positions, pinned, radii, params);
        }
    }
}

/// Iterative positional collision solve: a few relaxation sweeps directly
/// separating overlapping radii, rebuilding the tree between sweeps so
/// chained overlaps settle. Pinned bodies never move; their partner takes
/// the whole correction.
pub(super) fn relax_collisions(
    positions: &mut [Vec2],
    pinned: &[bool],
    radii: &[f32],
    charges: &[f32],
    padding: f32,
    passes: usize,
) {
    let max_radius = radii.iter().copied().fold(0.0f32, f32::max);
    if max_radius <= 0.0 {
        return;
    }
    let reach = (max_radius * 2.0) + padding;
    let params = CollisionParams {
        padding,
        max_distance_sq: reach * reach,
    };

    for _ in 0..passes {
        let Some(tree) = QuadNode::build(positions, charges) else {
            return;
        };
        collision_pairs(&tree, &tree, true, positions, pinned, radii, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32) -> BodyState {
        BodyState {
            pos: vec2(x, y),
            vel: Vec2::ZERO,
            pinned: None,
            radius: 10.0,
            charge: 1.0,
            group: 0,
        }
    }

    #[test]
    fn repulsion_pushes_apart() {
        let positions = vec![vec2(-10.0, 0.0), vec2(10.0, 0.0)];
        let charges = vec![1.0, 1.0];
        let tree = QuadNode::build(&positions, &charges).unwrap();

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, 5000.0, 100.0, 0.7, 1.0e9, &mut force);
        assert!(force.x < 0.0, "left body pushed further left");
    }

    #[test]
    fn repulsion_respects_cutoff() {
        let positions = vec![vec2(0.0, 0.0), vec2(5000.0, 0.0)];
        let charges = vec![1.0, 1.0];
        let tree = QuadNode::build(&positions, &charges).unwrap();

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, 5000.0, 100.0, 0.7, 400.0 * 400.0, &mut force);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn springs_pull_stretched_links_together() {
        let bodies = vec![body(-100.0, 0.0), body(100.0, 0.0)];
        let links = vec![SpringLink {
            source: 0,
            target: 1,
            rest_length: 50.0,
            strength: 0.1,
        }];
        let mut forces = vec![Vec2::ZERO; 2];
        accumulate_springs(&bodies, &links, 1.0, 0.0, &mut forces);
        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
    }

    #[test]
    fn cohesion_pulls_toward_group_centroid() {
        let mut bodies = vec![body(0.0, 0.0), body(100.0, 0.0), body(500.0, 500.0)];
        bodies[2].group = 1;
        let mut centroids = Vec::new();
        let mut forces = vec![Vec2::ZERO; 3];
        accumulate_cohesion(&bodies, 2, 0.1, &mut centroids, &mut forces);

        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        // Singleton groups feel no cohesion.
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn containment_pushes_back_inside_the_boundary() {
        let bodies = vec![body(900.0, 0.0)];
        let mut forces = vec![Vec2::ZERO];
        accumulate_containment(&bodies, 0.0, 500.0, 0.1, &mut forces);
        assert!(forces[0].x < 0.0);
    }

    #[test]
    fn collision_relaxation_separates_overlaps() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(5.0, 0.0)];
        let pinned = vec![false, false];
        let radii = vec![10.0, 10.0];
        let charges = vec![1.0, 1.0];

        relax_collisions(&mut positions, &pinned, &radii, &charges, 2.0, 3);

        let distance = (positions[0] - positions[1]).length();
        assert!(distance >= 21.9, "bodies separated to radii sum: {distance}");
    }

    #[test]
    fn pinned_bodies_do_not_move_during_collision() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(5.0, 0.0)];
        let pinned = vec![true, false];
        let radii = vec![10.0, 10.0];
        let charges = vec![1.0, 1.0];

        relax_collisions(&mut positions, &pinned, &radii, &charges, 0.0, 3);

        assert_eq!(positions[0], vec2(0.0, 0.0));
        assert!((positions[1] - positions[0]).length() >= 19.9);
    }
}
