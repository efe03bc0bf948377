mod forces;
mod quadtree;
pub mod radial;

use eframe::egui::{vec2, Vec2};
use log::debug;

use forces::{
    accumulate_cohesion, accumulate_containment, accumulate_repulsion, accumulate_springs,
    relax_collisions,
};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.72;
const SPRING_DAMPING: f32 = 0.22;
const COLLISION_PASSES: usize = 3;
const SETTLING_ALPHA: f32 = 0.03;
const DRAG_ALPHA_TARGET: f32 = 0.3;

/// Kinetic state of one laid-out node, in untransformed model space. The
/// view transform never touches these coordinates.
#[derive(Clone, Debug)]
pub struct BodyState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Pinned bodies are excluded from the free solve; the position is held
    /// verbatim until release.
    pub pinned: Option<Vec2>,
    pub radius: f32,
    /// Repulsion weight, importance-scaled.
    pub charge: f32,
    pub group: usize,
}

/// Spring along a displayed edge, with a per-edge-kind rest length and
/// strength resolved at render-graph build time.
#[derive(Clone, Copy, Debug)]
pub struct SpringLink {
    pub source: usize,
    pub target: usize,
    pub rest_length: f32,
    pub strength: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPhase {
    Initializing,
    Running,
    Settling,
    Stopped,
}

/// Runtime-tunable force parameters, fed from the controls panel each tick.
#[derive(Clone, Copy, Debug)]
pub struct SimParams {
    pub repulsion: f32,
    pub repulsion_cutoff: f32,
    pub spring: f32,
    pub collision_padding: f32,
    pub cohesion: f32,
    pub center_pull: f32,
    pub boundary_radius: f32,
    pub velocity_decay: f32,
    pub alpha_decay: f32,
    pub delta_seconds: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            repulsion: 36_000.0,
            repulsion_cutoff: 900.0,
            spring: 1.0,
            collision_padding: 4.0,
            cohesion: 0.06,
            center_pull: 0.0012,
            boundary_radius: 1600.0,
            velocity_decay: 0.6,
            alpha_decay: 0.028,
            delta_seconds: 1.0 / 60.0,
        }
    }
}

#[derive(Default)]
pub struct ForceScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    charges: Vec<f32>,
    pinned: Vec<bool>,
    centroids: Vec<(Vec2, f32)>,
}

/// Force-directed layout engine. Owns the temperature bookkeeping; per-body
/// kinetic state lives in the caller's `BodyState` slice, mutated only
/// through [`ForceSimulation::step`] on the single UI thread.
pub struct ForceSimulation {
    alpha: f32,
    alpha_min: f32,
    alpha_target: f32,
    phase: SimPhase,
}

impl Default for ForceSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSimulation {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_target: 0.0,
            phase: SimPhase::Initializing,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == SimPhase::Stopped
    }

    /// Drag start: raise the temperature floor so the layout re-settles
    /// smoothly around the pinned body instead of jumping.
    pub fn reheat(&mut self) {
        self.alpha_target = DRAG_ALPHA_TARGET;
        self.alpha = self.alpha.max(self.alpha_target);
        if self.phase == SimPhase::Stopped || self.phase == SimPhase::Settling {
            debug!("simulation reheated from {:?}", self.phase);
            self.phase = SimPhase::Running;
        }
    }

    /// Drag end: let alpha cool back toward zero.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Restart after a rebuild: full temperature, free solve.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.phase = SimPhase::Initializing;
    }

    /// One synchronous tick. Returns true while anything is still moving; a
    /// stopped simulation is a no-op, so a late tick after teardown cannot
    /// mutate state.
    pub fn step(
        &mut self,
        bodies: &mut [BodyState],
        links: &[SpringLink],
        group_count: usize,
        params: &SimParams,
        scratch: &mut ForceScratch,
    ) -> bool {
        if self.phase == SimPhase::Stopped {
            return false;
        }
        if self.phase == SimPhase::Initializing {
            self.phase = SimPhase::Running;
        }

        let count = bodies.len();
        if count < 2 {
            self.phase = SimPhase::Stopped;
            return false;
        }

        // Geometric decay toward the target; monotone non-increasing while
        // the target stays at zero.
        self.alpha += (self.alpha_target - self.alpha) * params.alpha_decay.clamp(0.0001, 1.0);
        if self.alpha < self.alpha_min && self.alpha_target < self.alpha_min {
            debug!("simulation stopped at alpha {}", self.alpha);
            self.phase = SimPhase::Stopped;
            return false;
        }
        self.phase = if self.alpha < SETTLING_ALPHA && self.alpha_target < SETTLING_ALPHA {
            SimPhase::Settling
        } else {
            SimPhase::Running
        };

        scratch.forces.clear();
        scratch.forces.resize(count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.radii.clear();
        scratch.charges.clear();
        scratch.pinned.clear();
        for body in bodies.iter() {
            scratch.positions.push(body.pos);
            scratch.radii.push(body.radius);
            scratch.charges.push(body.charge);
            scratch.pinned.push(body.pinned.is_some());
        }

        let cutoff_sq = params.repulsion_cutoff * params.repulsion_cutoff;
        if let Some(tree) = QuadNode::build(&scratch.positions, &scratch.charges) {
            for (index, force) in scratch.forces.iter_mut().enumerate() {
                accumulate_repulsion(
                    &tree,
                    index,
                    &scratch.positions,
                    params.repulsion,
                    620.0,
                    BARNES_HUT_THETA,
                    cutoff_sq,
                    force,
                );
            }
        }

        accumulate_springs(bodies, links, params.spring, SPRING_DAMPING, &mut scratch.forces);
        accumulate_cohesion(
            bodies,
            group_count,
            params.cohesion,
            &mut scratch.centroids,
            &mut scratch.forces,
        );
        accumulate_containment(
            bodies,
            params.center_pull,
            params.boundary_radius,
            0.08,
            &mut scratch.forces,
        );

        // Integrate: forces scale with alpha, velocity decays, pins hold.
        let time_scale = (params.delta_seconds * 60.0).clamp(0.25, 3.0);
        let decay = (1.0 - params.velocity_decay.clamp(0.0, 0.99)).powf(time_scale * 0.5);
        let max_speed = 14.0 + self.alpha * 40.0;
        let mut any_motion = false;

        for (index, body) in bodies.iter_mut().enumerate() {
            if let Some(hold) = body.pinned {
                body.pos = hold;
                body.vel = Vec2::ZERO;
                continue;
            }

            let mut velocity =
                (body.vel + scratch.forces[index] * (self.alpha * 0.14 * time_scale)) * decay;
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed * max_speed {
                velocity *= max_speed / speed_sq.sqrt();
            }
            body.vel = velocity;
            body.pos += velocity * time_scale;
            if velocity.length_sq() > 0.000_001 {
                any_motion = true;
            }
        }

        scratch.positions.clear();
        for body in bodies.iter() {
            scratch.positions.push(body.pos);
        }
        relax_collisions(
            &mut scratch.positions,
            &scratch.pinned,
            &scratch.radii,
            &scratch.charges,
            params.collision_padding,
            COLLISION_PASSES,
        );
        for (body, &resolved) in bodies.iter_mut().zip(scratch.positions.iter()) {
            if body.pinned.is_none() && body.pos != resolved {
                body.pos = resolved;
                any_motion = true;
            }
        }

        any_motion
    }
}

/// Initial placement for a body joining the simulation: a stable jittered
/// ring so identical keys land in identical spots across rebuilds.
pub fn seeded_position(jitter: (f32, f32), index: usize, count: usize) -> Vec2 {
    let angle = (index as f32 / count.max(1) as f32) * std::f32::consts::TAU;
    let ring = vec2(angle.cos(), angle.sin()) * 240.0;
    ring + vec2(jitter.0 * 90.0, jitter.1 * 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(count: usize) -> Vec<BodyState> {
        (0..count)
            .map(|index| BodyState {
                pos: seeded_position(
                    crate::util::stable_pair(&format!("N{index}")),
                    index,
                    count,
                ),
                vel: Vec2::ZERO,
                pinned: None,
                radius: 8.0,
                charge: 1.0,
                group: 0,
            })
            .collect()
    }

    #[test]
    fn alpha_is_monotone_without_reheat_and_stops_in_bounded_ticks() {
        let mut sim = ForceSimulation::new();
        let mut scratch = ForceScratch::default();
        let params = SimParams::default();
        let mut swarm = bodies(12);
        let links = vec![SpringLink {
            source: 0,
            target: 1,
            rest_length: 80.0,
            strength: 0.1,
        }];

        let mut previous = sim.alpha();
        let mut ticks = 0usize;
        while !sim.is_stopped() {
            sim.step(&mut swarm, &links, 1, &params, &mut scratch);
            assert!(sim.alpha() <= previous + 1e-6, "alpha must not increase");
            previous = sim.alpha();
            ticks += 1;
            assert!(ticks < 2000, "simulation must converge in bounded ticks");
        }
        // alpha_decay 0.028 reaches 0.001 in roughly ln(1000)/0.028 ticks.
        assert!(ticks > 100);
    }

    #[test]
    fn reheat_raises_alpha_and_resumes_a_stopped_sim() {
        let mut sim = ForceSimulation::new();
        let mut scratch = ForceScratch::default();
        let params = SimParams::default();
        let mut swarm = bodies(4);

        while !sim.is_stopped() {
            sim.step(&mut swarm, &[], 1, &params, &mut scratch);
        }

        sim.reheat();
        assert_eq!(sim.phase(), SimPhase::Running);
        assert!(sim.alpha() >= DRAG_ALPHA_TARGET);

        sim.cool();
        let mut ticks = 0;
        while !sim.is_stopped() {
            sim.step(&mut swarm, &[], 1, &params, &mut scratch);
            ticks += 1;
            assert!(ticks < 2000);
        }
    }

    #[test]
    fn stopped_step_is_a_no_op() {
        let mut sim = ForceSimulation::new();
        let mut scratch = ForceScratch::default();
        let params = SimParams::default();
        let mut swarm = bodies(4);
        while !sim.is_stopped() {
            sim.step(&mut swarm, &[], 1, &params, &mut scratch);
        }

        let before = swarm.iter().map(|body| body.pos).collect::<Vec<_>>();
        assert!(!sim.step(&mut swarm, &[], 1, &params, &mut scratch));
        let after = swarm.iter().map(|body| body.pos).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn pinned_body_holds_its_position() {
        let mut sim = ForceSimulation::new();
        let mut scratch = ForceScratch::default();
        let params = SimParams::default();
        let mut swarm = bodies(6);
        let hold = vec2(42.0, -17.0);
        swarm[0].pinned = Some(hold);

        for _ in 0..30 {
            sim.step(&mut swarm, &[], 1, &params, &mut scratch);
        }
        assert_eq!(swarm[0].pos, hold);
    }

    #[test]
    fn bodies_stay_within_the_boundary_eventually() {
        let mut sim = ForceSimulation::new();
        let mut scratch = ForceScratch::default();
        let params = SimParams {
            boundary_radius: 400.0,
            ..Default::default()
        };
        let mut swarm = bodies(20);
        for body in &mut swarm {
            body.pos *= 4.0;
        }

        while !sim.is_stopped() {
            sim.step(&mut swarm, &[], 1, &params, &mut scratch);
        }
        for body in &swarm {
            assert!(
                body.pos.length() < params.boundary_radius + 260.0,
                "body escaped containment: {:?}",
                body.pos
            );
        }
    }
}
