use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;
use crate::config::SimulationConfig;

const COINCIDENT_EPSILON: f32 = 1e-4;

/// Unit vector pushing `index` away from `other` when the two share a
/// position. Derived from the index pair only, and antisymmetric, so the
/// pair separates the same way on every run.
pub(super) fn separation_direction(index: usize, other: usize) -> Vec2 {
    let (low, high, sign) = if index <= other {
        (index, other, 1.0)
    } else {
        (other, index, -1.0)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin()) * sign
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

impl ChargeParams {
    pub(super) fn from_config(config: &SimulationConfig) -> Self {
        Self {
            strength: config.charge_strength,
            min_distance: config.charge_min_distance.max(COINCIDENT_EPSILON),
            theta: config.theta,
        }
    }
}

/// Force on `index` from a charge of size `mass` at offset `-delta`.
/// Magnitude is `strength * mass / distance`, with the distance floored.
fn charge_between(index: usize, other: usize, delta: Vec2, mass: f32, params: ChargeParams) -> Vec2 {
    let distance = delta.length();
    let scale = -params.strength * mass / distance.max(params.min_distance);
    if distance <= COINCIDENT_EPSILON {
        return separation_direction(index, other) * scale;
    }
    delta / distance * scale
}

pub(super) fn repel_exact(positions: &[Vec2], params: ChargeParams, forces: &mut [Vec2]) {
    for index in 0..positions.len() {
        for other in (index + 1)..positions.len() {
            let push = charge_between(
                index,
                other,
                positions[index] - positions[other],
                1.0,
                params,
            );
            forces[index] += push;
            forces[other] -= push;
        }
    }
}

pub(super) fn repel_approximate(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    force: &mut Vec2,
) {
    if cell.count <= 0.0 {
        return;
    }

    let point = positions[index];
    if cell.is_leaf() {
        for &other in &cell.points {
            if other != index {
                *force += charge_between(index, other, point - positions[other], 1.0, params);
            }
        }
        return;
    }

    let delta = point - cell.centroid;
    let distance = delta.length().max(COINCIDENT_EPSILON);
    let far_enough = !cell.square.contains(point) && (cell.square.half * 2.0 / distance) < params.theta;
    if far_enough {
        *force += charge_between(index, index, delta, cell.count, params);
        return;
    }

    for child in cell.children() {
        repel_approximate(child, index, positions, params, force);
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) weight: f32,
    /// Inverse of the smaller endpoint link count; hubs get softer springs.
    pub(super) stiffness: f32,
    /// Share of the correction applied to the target endpoint.
    pub(super) bias: f32,
}

/// Springs toward `config.link_rest_length(weight)`, proportional to the
/// stretch.
pub(super) fn pull_links(
    links: &[Link],
    positions: &[Vec2],
    config: &SimulationConfig,
    forces: &mut [Vec2],
) {
    for link in links {
        let delta = positions[link.target] - positions[link.source];
        let distance = delta.length();
        let direction = if distance > COINCIDENT_EPSILON {
            delta / distance
        } else {
            separation_direction(link.target, link.source)
        };

        let stretch = (distance - config.link_rest_length(link.weight))
            * link.stiffness
            * config.link_strength;
        let correction = direction * stretch;
        forces[link.target] -= correction * link.bias;
        forces[link.source] += correction * (1.0 - link.bias);
    }
}

/// Uniform pull moving the centroid of the free nodes toward `center`.
pub(super) fn pull_to_center(
    positions: &[Vec2],
    pinned: &[bool],
    center: Vec2,
    strength: f32,
    forces: &mut [Vec2],
) {
    let (sum, count) = positions
        .iter()
        .zip(pinned)
        .filter(|(_, pinned)| !**pinned)
        .fold((Vec2::ZERO, 0usize), |(sum, count), (position, _)| {
            (sum + *position, count + 1)
        });
    if count == 0 {
        return;
    }

    let shift = (center - sum / count as f32) * strength;
    for (force, pinned) in forces.iter_mut().zip(pinned) {
        if !*pinned {
            *force += shift;
        }
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    /// Squared largest possible contact distance; farther cells are skipped.
    pub(super) reach_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    let contact = radii[from] + radii[to];
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= contact * contact {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > COINCIDENT_EPSILON {
        delta / distance
    } else {
        separation_direction(from, to)
    };
    let push = direction * ((contact - distance) * strength * 0.5);
    forces[from] += push;
    forces[to] -= push;
}

pub(super) fn collide_exact(positions: &[Vec2], radii: &[f32], strength: f32, forces: &mut [Vec2]) {
    for from in 0..positions.len() {
        for to in (from + 1)..positions.len() {
            collide_pair(from, to, positions, radii, strength, forces);
        }
    }
}

/// Visits every pair of leaves whose squares are within contact reach, each
/// unordered pair once.
pub(super) fn collide_cells(
    cell_a: &Cell,
    cell_b: &Cell,
    same_cell: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if cell_a.square.gap_sq(cell_b.square) > params.reach_sq {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.points.iter().enumerate() {
                for &to in &cell_a.points[offset + 1..] {
                    collide_pair(from, to, positions, radii, params.strength, forces);
                }
            }
        } else {
            for &from in &cell_a.points {
                for &to in &cell_b.points {
                    collide_pair(from, to, positions, radii, params.strength, forces);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            collide_cells(child, child, true, positions, radii, params, forces);
            for sibling in &children[offset + 1..] {
                collide_cells(child, sibling, false, positions, radii, params, forces);
            }
        }
        return;
    }

    let split_a = !cell_a.is_leaf() && (cell_b.is_leaf() || cell_a.square.half >= cell_b.square.half);
    if split_a {
        for child in cell_a.children() {
            collide_cells(child, cell_b, false, positions, radii, params, forces);
        }
    } else {
        for child in cell_b.children() {
            collide_cells(cell_a, child, false, positions, radii, params, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChargeParams {
        ChargeParams::from_config(&SimulationConfig::default())
    }

    #[test]
    fn separation_is_antisymmetric_and_unit_length() {
        for (a, b) in [(0, 1), (3, 9), (12, 4)] {
            let forward = separation_direction(a, b);
            let backward = separation_direction(b, a);
            assert!((forward + backward).length() < 1e-6);
            assert!((forward.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn repulsion_falls_off_with_distance() {
        let near = charge_between(0, 1, vec2(10.0, 0.0), 1.0, params());
        let far = charge_between(0, 1, vec2(40.0, 0.0), 1.0, params());
        assert!(near.x > 0.0);
        assert!((near.x - 12.0).abs() < 1e-4);
        assert!((far.x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn coincident_charges_separate_without_nan() {
        let mut forces = vec![Vec2::ZERO; 2];
        repel_exact(&[vec2(3.0, 3.0), vec2(3.0, 3.0)], params(), &mut forces);
        assert!(forces.iter().all(|force| force.is_finite()));
        assert!(forces[0].length() > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-4);
    }

    #[test]
    fn barnes_hut_tracks_exact_sum() {
        let positions = (0..150)
            .map(|index| {
                let angle = index as f32 * 2.399_963;
                let radius = 12.0 * (index as f32 + 0.5).sqrt();
                vec2(angle.cos() * radius, angle.sin() * radius)
            })
            .collect::<Vec<_>>();
        let mut exact = vec![Vec2::ZERO; positions.len()];
        repel_exact(&positions, params(), &mut exact);

        let root = Cell::build(&positions).unwrap();
        let mut error = 0.0;
        let mut magnitude = 0.0;
        for (index, expected) in exact.iter().enumerate() {
            let mut approximate = Vec2::ZERO;
            repel_approximate(&root, index, &positions, params(), &mut approximate);
            assert!(approximate.is_finite());
            error += (approximate - *expected).length();
            magnitude += expected.length();
        }
        assert!(error / magnitude < 0.1, "relative error {}", error / magnitude);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let config = SimulationConfig::default();
        let links = [Link {
            source: 0,
            target: 1,
            weight: 1.0,
            stiffness: 1.0,
            bias: 0.5,
        }];
        let mut forces = vec![Vec2::ZERO; 2];
        pull_links(&links, &[vec2(0.0, 0.0), vec2(150.0, 0.0)], &config, &mut forces);

        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        assert!((forces[0].x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn centering_skips_pinned_nodes() {
        let mut forces = vec![Vec2::ZERO; 3];
        pull_to_center(
            &[vec2(10.0, 0.0), vec2(30.0, 0.0), vec2(500.0, 500.0)],
            &[false, false, true],
            vec2(0.0, 0.0),
            0.5,
            &mut forces,
        );
        assert_eq!(forces[0], vec2(-10.0, 0.0));
        assert_eq!(forces[1], vec2(-10.0, 0.0));
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn quadtree_collision_matches_exact() {
        let positions = (0..90)
            .map(|index| vec2((index % 9) as f32 * 9.0, (index / 9) as f32 * 9.0))
            .collect::<Vec<_>>();
        let radii = vec![6.0; positions.len()];

        let mut exact = vec![Vec2::ZERO; positions.len()];
        collide_exact(&positions, &radii, 0.7, &mut exact);

        let mut tree = vec![Vec2::ZERO; positions.len()];
        let root = Cell::build(&positions).unwrap();
        collide_cells(
            &root,
            &root,
            true,
            &positions,
            &radii,
            CollisionParams {
                strength: 0.7,
                reach_sq: 12.0 * 12.0,
            },
            &mut tree,
        );

        for (a, b) in exact.iter().zip(&tree) {
            assert!((*a - *b).length() < 1e-3);
        }
    }
}
