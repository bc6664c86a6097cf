use serde::Serialize;

use crate::banner::{BannerConfig, Character, CharacterId};
use crate::rng::SeedStream;
use crate::types::{Rarity, Track};

/// What a track remembers about its most recent draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LastDraw {
    pub rarity: Rarity,
    pub character: Option<CharacterId>,
}

/// Last-draw memory for both tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TrackMemory {
    a: Option<LastDraw>,
    b: Option<LastDraw>,
}

impl TrackMemory {
    #[inline]
    pub fn get(&self, track: Track) -> Option<LastDraw> {
        match track {
            Track::A => self.a,
            Track::B => self.b,
        }
    }

    #[inline]
    pub fn set(&mut self, track: Track, last: Option<LastDraw>) {
        match track {
            Track::A => self.a = last,
            Track::B => self.b = last,
        }
    }

    /// Remember a resolved draw on its own track. Exhausted results are ignored.
    #[inline]
    pub fn record(&mut self, draw: &DrawResult) {
        if draw.is_exhausted() {
            return;
        }
        self.set(
            draw.track,
            Some(LastDraw {
                rarity: draw.rarity,
                character: draw.final_character.as_ref().map(|c| c.id),
            }),
        );
    }
}

/// Outcome of resolving one draw at a stream position.
///
/// `seeds_consumed == 0` means the stream prefix ran out; every other field is
/// then meaningless and the caller must stop advancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    pub index: u32,
    pub track: Track,
    pub seeds_consumed: u32,
    pub rarity: Rarity,
    pub original_character: Option<Character>,
    pub final_character: Option<Character>,
    pub is_rerolled: bool,
}

impl DrawResult {
    #[inline]
    fn exhausted(index: u32) -> Self {
        Self {
            index,
            track: Track::of(index),
            seeds_consumed: 0,
            rarity: Rarity::Rare,
            original_character: None,
            final_character: None,
            is_rerolled: false,
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.seeds_consumed == 0
    }

    /// Cursor right after this draw.
    #[inline]
    pub fn next_cursor(&self) -> u32 {
        self.index + self.seeds_consumed
    }

    #[inline]
    pub fn character_id(&self) -> Option<CharacterId> {
        self.final_character.as_ref().map(|c| c.id)
    }
}

/// Resolve one normal draw at `index`: rarity from `stream[index]`, slot from
/// `stream[index + 1]`, and a one-character-exclusion reroll from
/// `stream[index + 2]` when a `rare` candidate repeats the character id of
/// the same track's last draw.
pub fn resolve_normal_draw(
    stream: &SeedStream,
    index: u32,
    banner: &BannerConfig,
    memory: &TrackMemory,
) -> DrawResult {
    let (Some(rarity_seed), Some(slot_seed)) = (stream.get(index), stream.get(index + 1)) else {
        return DrawResult::exhausted(index);
    };
    let track = Track::of(index);
    let rarity = banner.rates.rarity_for(rarity_seed % crate::banner::RATE_SCALE);
    let pool = banner.pool(rarity);

    if pool.is_empty() {
        return DrawResult {
            index,
            track,
            seeds_consumed: 2,
            rarity,
            original_character: None,
            final_character: None,
            is_rerolled: false,
        };
    }

    let candidate = &pool[(slot_seed % pool.len() as u32) as usize];

    let repeats_last =
        rarity == Rarity::Rare && memory.get(track).is_some_and(|last| last.character == Some(candidate.id));

    if repeats_last {
        let alt: Vec<&Character> = pool.iter().filter(|c| c.id != candidate.id).collect();
        if !alt.is_empty() {
            let Some(reroll_seed) = stream.get(index + 2) else {
                return DrawResult::exhausted(index);
            };
            let rerolled = alt[(reroll_seed % alt.len() as u32) as usize];
            return DrawResult {
                index,
                track,
                seeds_consumed: 3,
                rarity,
                original_character: Some(candidate.clone()),
                final_character: Some(rerolled.clone()),
                is_rerolled: true,
            };
        }
    }

    DrawResult {
        index,
        track,
        seeds_consumed: 2,
        rarity,
        original_character: Some(candidate.clone()),
        final_character: Some(candidate.clone()),
        is_rerolled: false,
    }
}

/// Resolve a pity draw at `index` over the uber pool. Consumes one seed and
/// never rerolls.
pub fn resolve_guaranteed_draw(stream: &SeedStream, index: u32, banner: &BannerConfig) -> DrawResult {
    let Some(seed) = stream.get(index) else {
        return DrawResult::exhausted(index);
    };
    let pool = banner.pool(Rarity::Uber);
    let character = if pool.is_empty() {
        None
    } else {
        Some(pool[(seed % pool.len() as u32) as usize].clone())
    };
    DrawResult {
        index,
        track: Track::of(index),
        seeds_consumed: 1,
        rarity: Rarity::Uber,
        original_character: character.clone(),
        final_character: character,
        is_rerolled: false,
    }
}

/// Resolve a normal draw at `cursor` and fold it into `memory`.
/// Returns `None` when the stream is exhausted; `memory` is then unchanged.
#[inline]
pub fn step_normal(
    stream: &SeedStream,
    cursor: u32,
    banner: &BannerConfig,
    memory: &mut TrackMemory,
) -> Option<DrawResult> {
    let draw = resolve_normal_draw(stream, cursor, banner, memory);
    if draw.is_exhausted() {
        return None;
    }
    memory.record(&draw);
    Some(draw)
}

/// Pity-draw counterpart of [`step_normal`].
#[inline]
pub fn step_guaranteed(
    stream: &SeedStream,
    cursor: u32,
    banner: &BannerConfig,
    memory: &mut TrackMemory,
) -> Option<DrawResult> {
    let draw = resolve_guaranteed_draw(stream, cursor, banner);
    if draw.is_exhausted() {
        return None;
    }
    memory.record(&draw);
    Some(draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{Pools, RarityRates};

    fn all_rare(pool: Vec<Character>) -> BannerConfig {
        BannerConfig {
            id: 1,
            name: "rare only".into(),
            rates: RarityRates {
                rare: 10_000,
                ..RarityRates::default()
            },
            pools: Pools {
                rare: pool,
                ..Pools::default()
            },
            guaranteed: None,
            special: false,
        }
    }

    fn fixed(values: Vec<u32>) -> SeedStream {
        SeedStream::from_values(0, values)
    }

    #[test]
    fn normal_draw_needs_two_values() {
        let b = all_rare(vec![Character::new(1, "a")]);
        let s = fixed(vec![5]);
        let d = resolve_normal_draw(&s, 0, &b, &TrackMemory::default());
        assert!(d.is_exhausted());
    }

    #[test]
    fn repeat_on_same_track_rerolls() {
        let b = all_rare(vec![Character::new(10, "a"), Character::new(11, "b")]);
        // slot 0 -> id 10; reroll picks from [11]
        let s = fixed(vec![0, 0, 7]);
        let mut mem = TrackMemory::default();
        mem.set(
            Track::A,
            Some(LastDraw {
                rarity: Rarity::Rare,
                character: Some(10),
            }),
        );
        let d = resolve_normal_draw(&s, 0, &b, &mem);
        assert!(d.is_rerolled);
        assert_eq!(d.seeds_consumed, 3);
        assert_eq!(d.original_character.map(|c| c.id), Some(10));
        assert_eq!(d.final_character.map(|c| c.id), Some(11));
    }

    #[test]
    fn repeat_on_other_track_does_not_reroll() {
        let b = all_rare(vec![Character::new(10, "a"), Character::new(11, "b")]);
        let s = fixed(vec![0, 0, 7]);
        let mut mem = TrackMemory::default();
        mem.set(
            Track::B,
            Some(LastDraw {
                rarity: Rarity::Rare,
                character: Some(10),
            }),
        );
        let d = resolve_normal_draw(&s, 0, &b, &mem);
        assert!(!d.is_rerolled);
        assert_eq!(d.seeds_consumed, 2);
    }

    #[test]
    fn repeat_compares_character_id_only() {
        let b = all_rare(vec![Character::new(10, "a"), Character::new(11, "b")]);
        let s = fixed(vec![0, 0, 7]);
        let mut mem = TrackMemory::default();
        // Same id reached through another tier, e.g. a what-if bonus in two pools.
        mem.set(
            Track::A,
            Some(LastDraw {
                rarity: Rarity::Super,
                character: Some(10),
            }),
        );
        let d = resolve_normal_draw(&s, 0, &b, &mem);
        assert!(d.is_rerolled);
        assert_eq!(d.character_id(), Some(11));
    }

    #[test]
    fn reroll_without_third_value_is_exhausted() {
        let b = all_rare(vec![Character::new(10, "a"), Character::new(11, "b")]);
        let s = fixed(vec![0, 0]);
        let mut mem = TrackMemory::default();
        mem.set(
            Track::A,
            Some(LastDraw {
                rarity: Rarity::Rare,
                character: Some(10),
            }),
        );
        assert!(resolve_normal_draw(&s, 0, &b, &mem).is_exhausted());
    }

    #[test]
    fn empty_pool_consumes_two() {
        let b = all_rare(Vec::new());
        let s = fixed(vec![1, 2, 3]);
        let d = resolve_normal_draw(&s, 0, &b, &TrackMemory::default());
        assert_eq!(d.seeds_consumed, 2);
        assert!(d.final_character.is_none());
    }

    #[test]
    fn guaranteed_draw_uses_uber_pool() {
        let mut b = all_rare(vec![Character::new(1, "r")]);
        b.pools.uber = vec![Character::new(50, "u0"), Character::new(51, "u1")];
        let s = fixed(vec![3]);
        let d = resolve_guaranteed_draw(&s, 0, &b);
        assert_eq!(d.seeds_consumed, 1);
        assert_eq!(d.rarity, Rarity::Uber);
        assert_eq!(d.character_id(), Some(51));
        assert!(!d.is_rerolled);
        assert!(resolve_guaranteed_draw(&s, 1, &b).is_exhausted());
    }
}
