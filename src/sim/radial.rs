use std::f32::consts::TAU;

use eframe::egui::{vec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Golden-angle increment keeps adjacent member indices angularly apart.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Deterministic radial layout configuration. Packing is a pure function of
/// the seed; the retry budget and fallback are explicit so tests can force
/// either path.
#[derive(Clone, Copy, Debug)]
pub struct RadialParams {
    pub world_radius: f32,
    pub margin: f32,
    pub attempt_budget: usize,
    pub seed: u64,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            world_radius: 1000.0,
            margin: 24.0,
            attempt_budget: 1000,
            seed: 0x00c1_7e57,
        }
    }
}

/// Packed circular sub-region per group.
#[derive(Clone, Debug, Default)]
pub struct RegionLayout {
    pub centers: Vec<Vec2>,
    pub radii: Vec<f32>,
}

impl RegionLayout {
    pub fn region_count(&self) -> usize {
        self.centers.len()
    }

    /// Control points routing an inter-region edge through both region
    /// centers (the bundling spine shared by all edges of that pair).
    pub fn bundle_controls(&self, group_a: usize, group_b: usize) -> Option<(Vec2, Vec2)> {
        if group_a == group_b {
            return None;
        }
        Some((
            *self.centers.get(group_a)?,
            *self.centers.get(group_b)?,
        ))
    }
}

fn fallback_center(index: usize, group_count: usize, params: &RadialParams) -> Vec2 {
    let angle = (index as f32 / group_count.max(1) as f32) * TAU;
    vec2(angle.cos(), angle.sin()) * (params.world_radius * 0.62)
}

/// Rejection-sampled circle packing: each group gets the first sampled
/// center clearing every placed circle by the margin, or its even-angular
/// fallback slot once the attempt budget is spent.
pub fn pack_regions(group_sizes: &[usize], params: &RadialParams) -> RegionLayout {
    let group_count = group_sizes.len();
    if group_count == 0 {
        return RegionLayout::default();
    }

    let largest = group_sizes.iter().copied().max().unwrap_or(1).max(1) as f32;
    let base = params.world_radius * 0.30;
    let radii = group_sizes
        .iter()
        .map(|&size| {
            let scale = ((size.max(1) as f32) / largest).sqrt();
            (base * scale).max(params.world_radius * 0.05)
        })
        .collect::<Vec<_>>();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut centers: Vec<Vec2> = Vec::with_capacity(group_count);

    for (index, &radius) in radii.iter().enumerate() {
        let allowed = (params.world_radius - radius).max(0.0);
        let mut placed = None;

        for _ in 0..params.attempt_budget {
            let angle = rng.gen_range(0.0..TAU);
            let distance = allowed * rng.gen_range(0.0f32..1.0).sqrt();
            let candidate = vec2(angle.cos(), angle.sin()) * distance;

            let clear = centers.iter().zip(radii.iter()).all(|(&center, &other)| {
                (candidate - center).length() >= radius + other + params.margin
            });
            if clear {
                placed = Some(candidate);
                break;
            }
        }

        centers.push(placed.unwrap_or_else(|| fallback_center(index, group_count, params)));
    }

    RegionLayout { centers, radii }
}

/// Places every member inside its group region on a sqrt-radius golden
/// spiral, angle derived from the member's index within the group.
pub fn place_members(group_of: &[usize], regions: &RegionLayout) -> Vec<Vec2> {
    let mut member_counts = vec![0usize; regions.region_count()];
    for &group in group_of {
        if let Some(count) = member_counts.get_mut(group) {
            *count += 1;
        }
    }

    let mut placed_so_far = vec![0usize; regions.region_count()];
    group_of
        .iter()
        .map(|&group| {
            let (Some(&center), Some(&radius)) =
                (regions.centers.get(group), regions.radii.get(group))
            else {
                return Vec2::ZERO;
            };
            let members = member_counts[group].max(1);
            let index = placed_so_far[group];
            placed_so_far[group] += 1;

            if members == 1 {
                return center;
            }
            let angle = index as f32 * GOLDEN_ANGLE;
            let spread = radius * 0.85 * (((index as f32) + 0.5) / members as f32).sqrt();
            center + vec2(angle.cos(), angle.sin()) * spread
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_is_deterministic_for_a_seed() {
        let sizes = vec![12, 5, 9, 3, 20];
        let params = RadialParams::default();
        let first = pack_regions(&sizes, &params);
        let second = pack_regions(&sizes, &params);
        assert_eq!(first.centers, second.centers);
        assert_eq!(first.radii, second.radii);
    }

    #[test]
    fn packed_regions_do_not_overlap_when_sampling_succeeds() {
        let sizes = vec![10, 4, 2];
        let params = RadialParams::default();
        let regions = pack_regions(&sizes, &params);

        for a in 0..regions.region_count() {
            for b in (a + 1)..regions.region_count() {
                let distance = (regions.centers[a] - regions.centers[b]).length();
                assert!(
                    distance >= regions.radii[a] + regions.radii[b] + params.margin - 0.01,
                    "regions {a} and {b} overlap"
                );
            }
        }
    }

    #[test]
    fn exhausted_budget_falls_back_to_even_angles() {
        // A zero budget forces the deterministic fallback for every group.
        let sizes = vec![4, 4, 4, 4];
        let params = RadialParams {
            attempt_budget: 0,
            ..Default::default()
        };
        let regions = pack_regions(&sizes, &params);

        for (index, center) in regions.centers.iter().enumerate() {
            let expected = fallback_center(index, sizes.len(), &params);
            assert!((*center - expected).length() < 0.001);
        }
    }

    #[test]
    fn members_stay_inside_their_region() {
        let group_of = vec![0, 0, 0, 1, 1, 2, 0, 1, 2, 2, 2, 2];
        let sizes = vec![4usize, 3, 5];
        let params = RadialParams::default();
        let regions = pack_regions(&sizes, &params);
        let positions = place_members(&group_of, &regions);

        assert_eq!(positions.len(), group_of.len());
        for (position, &group) in positions.iter().zip(group_of.iter()) {
            let offset = (*position - regions.centers[group]).length();
            assert!(
                offset <= regions.radii[group] + 0.01,
                "member of group {group} left its region"
            );
        }
    }

    #[test]
    fn bundle_controls_only_exist_between_regions() {
        let regions = pack_regions(&[3, 3], &RadialParams::default());
        assert!(regions.bundle_controls(0, 1).is_some());
        assert!(regions.bundle_controls(0, 0).is_none());
        assert!(regions.bundle_controls(0, 9).is_none());
    }
}
