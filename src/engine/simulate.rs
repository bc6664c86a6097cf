use serde::Serialize;

use crate::banner::{BannerDb, BannerId};
use crate::engine::draw::{step_guaranteed, step_normal, DrawResult, TrackMemory};
use crate::rng::SeedStream;
use crate::route::RoutePlan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDraw {
    /// Index of the plan segment this draw belongs to.
    pub segment: usize,
    pub banner: BannerId,
    /// True for the pity draw closing a guaranteed segment.
    pub pity: bool,
    pub draw: DrawResult,
}

/// Why a replay stopped before the end of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    InsufficientData { cursor: u32 },
    UnknownBanner(BannerId),
    NoGuaranteedVariant(BannerId),
}

/// Scarce resources a plan spends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceUsage {
    pub special_draws: u32,
    pub guaranteed_segments: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Simulation {
    pub start: u32,
    pub draws: Vec<PlannedDraw>,
    pub end_cursor: u32,
    pub memory: TrackMemory,
    pub usage: ResourceUsage,
    pub stop: Option<StopReason>,
}

impl Simulation {
    #[inline]
    pub fn completed(&self) -> bool {
        self.stop.is_none()
    }
}

/// Replay `plan` draw by draw from `start` with `memory` as the initial
/// per-track state.
pub fn simulate_plan(
    plan: &RoutePlan,
    banners: &BannerDb,
    stream: &SeedStream,
    start: u32,
    memory: TrackMemory,
) -> Simulation {
    let mut sim = Simulation {
        start,
        draws: Vec::with_capacity(plan.total_draws() as usize),
        end_cursor: start,
        memory,
        usage: ResourceUsage::default(),
        stop: None,
    };

    for (seg_idx, seg) in plan.segments.iter().enumerate() {
        let Some(banner) = banners.get(seg.banner) else {
            sim.stop = Some(StopReason::UnknownBanner(seg.banner));
            return sim;
        };
        if seg.guaranteed && banner.guaranteed.is_none() {
            sim.stop = Some(StopReason::NoGuaranteedVariant(seg.banner));
            return sim;
        }

        let normal_rolls = if seg.guaranteed { seg.count.saturating_sub(1) } else { seg.count };
        for _ in 0..normal_rolls {
            let Some(draw) = step_normal(stream, sim.end_cursor, banner, &mut sim.memory) else {
                sim.stop = Some(StopReason::InsufficientData {
                    cursor: sim.end_cursor,
                });
                return sim;
            };
            sim.end_cursor = draw.next_cursor();
            if banner.special {
                sim.usage.special_draws += 1;
            }
            sim.draws.push(PlannedDraw {
                segment: seg_idx,
                banner: seg.banner,
                pity: false,
                draw,
            });
        }

        if seg.guaranteed {
            let Some(draw) = step_guaranteed(stream, sim.end_cursor, banner, &mut sim.memory) else {
                sim.stop = Some(StopReason::InsufficientData {
                    cursor: sim.end_cursor,
                });
                return sim;
            };
            sim.end_cursor = draw.next_cursor();
            if banner.special {
                sim.usage.special_draws += 1;
            }
            sim.usage.guaranteed_segments += 1;
            sim.draws.push(PlannedDraw {
                segment: seg_idx,
                banner: seg.banner,
                pity: true,
                draw,
            });
        }
    }

    sim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{BannerConfig, Character, GuaranteedVariant, Pools, RarityRates};

    fn db() -> BannerDb {
        let b = BannerConfig {
            id: 1,
            name: "one".into(),
            rates: RarityRates {
                rare: 10_000,
                ..RarityRates::default()
            },
            pools: Pools {
                rare: vec![Character::new(1, "a")],
                uber: vec![Character::new(9, "u")],
                ..Pools::default()
            },
            guaranteed: Some(GuaranteedVariant { normal_rolls: 6 }),
            special: true,
        };
        BannerDb::from_banners(vec![b]).unwrap()
    }

    #[test]
    fn guaranteed_segment_counts_pity() {
        let stream = SeedStream::generate(5, 64);
        let plan = RoutePlan::parse("1 2 1g 7");
        let sim = simulate_plan(&plan, &db(), &stream, 0, TrackMemory::default());
        assert!(sim.completed());
        assert_eq!(sim.draws.len(), 9);
        // Singleton rare pool: every normal draw is 2 seeds, pity is 1.
        assert_eq!(sim.end_cursor, 8 * 2 + 1);
        assert_eq!(sim.usage.guaranteed_segments, 1);
        assert_eq!(sim.usage.special_draws, 9);
        assert!(sim.draws.last().unwrap().pity);
    }

    #[test]
    fn unknown_banner_stops() {
        let stream = SeedStream::generate(5, 64);
        let sim = simulate_plan(&RoutePlan::parse("1 1 4 1"), &db(), &stream, 0, TrackMemory::default());
        assert_eq!(sim.stop, Some(StopReason::UnknownBanner(4)));
        assert_eq!(sim.end_cursor, 2);
    }

    #[test]
    fn short_stream_stops() {
        let stream = SeedStream::generate(5, 5);
        let sim = simulate_plan(&RoutePlan::parse("1 3"), &db(), &stream, 0, TrackMemory::default());
        assert_eq!(sim.stop, Some(StopReason::InsufficientData { cursor: 4 }));
    }
}
