use serde::Serialize;

use crate::banner::{BannerConfig, Character};
use crate::engine::draw::{resolve_normal_draw, step_guaranteed, step_normal, DrawResult, TrackMemory};
use crate::rng::SeedStream;

/// Every draw of one guaranteed segment: the normal rolls, then the pity draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuaranteedRun {
    pub normal: Vec<DrawResult>,
    pub pity: DrawResult,
}

impl GuaranteedRun {
    #[inline]
    pub fn end_cursor(&self) -> u32 {
        self.pity.next_cursor()
    }
}

/// Run `normal_rolls` chained normal draws then one pity draw from `start`,
/// folding every draw into `memory`. `None` if the stream runs out anywhere;
/// `memory` may then hold a partial update and should be discarded.
pub fn run_guaranteed_segment(
    stream: &SeedStream,
    start: u32,
    banner: &BannerConfig,
    memory: &mut TrackMemory,
    normal_rolls: u32,
) -> Option<GuaranteedRun> {
    let mut cursor = start;
    let mut normal = Vec::with_capacity(normal_rolls as usize);
    for _ in 0..normal_rolls {
        let d = step_normal(stream, cursor, banner, memory)?;
        cursor = d.next_cursor();
        normal.push(d);
    }
    let pity = step_guaranteed(stream, cursor, banner, memory)?;
    Some(GuaranteedRun { normal, pity })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookaheadOutcome {
    pub character: Option<Character>,
    pub next_cursor: u32,
}

impl From<&GuaranteedRun> for LookaheadOutcome {
    fn from(run: &GuaranteedRun) -> Self {
        Self {
            character: run.pity.final_character.clone(),
            next_cursor: run.end_cursor(),
        }
    }
}

/// Predicted pity-slot outcome from a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lookahead {
    pub primary: LookaheadOutcome,
    /// Outcome had the first draw not collided with the track's last draw.
    /// Present only when the first normal draw rerolls under `initial`.
    pub alternative: Option<LookaheadOutcome>,
}

/// Predict what a guaranteed segment started at `start` yields. `None` when
/// the stream is too short for the primary run or for the alternative.
pub fn lookahead_guaranteed(
    start: u32,
    banner: &BannerConfig,
    stream: &SeedStream,
    initial: &TrackMemory,
    normal_rolls: u32,
) -> Option<Lookahead> {
    let first_rerolls =
        normal_rolls > 0 && resolve_normal_draw(stream, start, banner, initial).is_rerolled;

    let mut memory = *initial;
    let primary = run_guaranteed_segment(stream, start, banner, &mut memory, normal_rolls)?;

    let alternative = if first_rerolls {
        let mut fresh = TrackMemory::default();
        let run = run_guaranteed_segment(stream, start, banner, &mut fresh, normal_rolls)?;
        Some(LookaheadOutcome::from(&run))
    } else {
        None
    };

    Some(Lookahead {
        primary: LookaheadOutcome::from(&primary),
        alternative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{Pools, RarityRates};
    use crate::engine::draw::LastDraw;
    use crate::types::{Rarity, Track};

    fn banner() -> BannerConfig {
        BannerConfig {
            id: 7,
            name: "g".into(),
            rates: RarityRates {
                rare: 10_000,
                ..RarityRates::default()
            },
            pools: Pools {
                rare: vec![Character::new(1, "a"), Character::new(2, "b")],
                uber: vec![Character::new(100, "u0"), Character::new(101, "u1")],
                ..Pools::default()
            },
            guaranteed: None,
            special: false,
        }
    }

    #[test]
    fn cursor_after_plain_rolls_and_pity() {
        let values = vec![0, 0, 0, 1, 0, 0, 0, 1, 4, 4, 4, 4];
        let s = SeedStream::from_values(0, values);
        let la = lookahead_guaranteed(0, &banner(), &s, &TrackMemory::default(), 2).unwrap();
        // Track A draws id 1 then id 2, no repeat; pity at 4.
        assert_eq!(la.primary.next_cursor, 5);
        assert!(la.alternative.is_none());
    }

    #[test]
    fn first_draw_reroll_produces_alternative() {
        let values = vec![0, 0, 1, 0, 1, 1, 1, 1, 1, 1];
        let s = SeedStream::from_values(0, values);
        let mut mem = TrackMemory::default();
        mem.set(
            Track::A,
            Some(LastDraw {
                rarity: Rarity::Rare,
                character: Some(1),
            }),
        );
        let la = lookahead_guaranteed(0, &banner(), &s, &mem, 1).unwrap();
        // Primary: reroll consumes 3, pity at 3.
        assert_eq!(la.primary.next_cursor, 4);
        // Alternative: plain draw consumes 2, pity at 2.
        let alt = la.alternative.expect("alternative route");
        assert_eq!(alt.next_cursor, 3);
    }

    #[test]
    fn short_alternative_drops_whole_lookahead() {
        let s = SeedStream::from_values(0, vec![2, 0, 2, 0, 0, 3, 2, 0, 0, 2, 3, 1, 1]);
        let mut mem = TrackMemory::default();
        mem.set(
            Track::A,
            Some(LastDraw {
                rarity: Rarity::Rare,
                character: Some(1),
            }),
        );
        // The rerolling primary run fits exactly; the fresh-memory run does not.
        let mut primary = mem;
        let run = run_guaranteed_segment(&s, 0, &banner(), &mut primary, 5).unwrap();
        assert_eq!(run.end_cursor(), 13);
        let mut fresh = TrackMemory::default();
        assert!(run_guaranteed_segment(&s, 0, &banner(), &mut fresh, 5).is_none());

        assert!(lookahead_guaranteed(0, &banner(), &s, &mem, 5).is_none());
    }

    #[test]
    fn insufficient_data_is_no_result() {
        let s = SeedStream::from_values(0, vec![0, 0, 0]);
        assert!(lookahead_guaranteed(0, &banner(), &s, &TrackMemory::default(), 2).is_none());
    }
}
