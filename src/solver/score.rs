use std::collections::HashSet;

use crate::banner::{BannerId, CharacterId};
use crate::config::ScoreWeights;
use crate::types::Rarity;

/// What a search is aiming at; fixed for the whole call.
#[derive(Debug, Clone, Copy)]
pub struct Goals<'a> {
    pub target_index: u32,
    pub target_banner: BannerId,
    pub primary: Option<CharacterId>,
    pub limited: &'a HashSet<CharacterId>,
}

/// One expansion step as seen by the scorer.
#[derive(Debug, Clone, Copy)]
pub struct MoveFacts {
    pub banner: BannerId,
    pub previous_banner: Option<BannerId>,
    pub rarity: Rarity,
    pub character: Option<CharacterId>,
    pub seeds: u32,
    pub cursor_before: u32,
    pub guaranteed: bool,
}

#[inline]
fn banner_bonus(w: &ScoreWeights, goals: &Goals<'_>, banner: BannerId, previous: Option<BannerId>) -> i64 {
    if previous == Some(banner) {
        w.continuity
    } else if banner == goals.target_banner {
        w.target_banner
    } else {
        0
    }
}

/// Score added to the parent candidate's score by one beam move.
pub fn move_score(w: &ScoreWeights, goals: &Goals<'_>, mv: &MoveFacts) -> i64 {
    let mut s = banner_bonus(w, goals, mv.banner, mv.previous_banner);

    if let Some(id) = mv.character {
        if goals.primary == Some(id) {
            s += w.primary_character;
        }
        if goals.limited.contains(&id) {
            s += w.limited_character;
        }
    }

    if mv.rarity.is_top() {
        s += w.top_rarity;
    } else if mv.rarity.is_second() {
        s += w.second_rarity;
    }

    s += i64::from(mv.seeds);

    if goals.target_index > 0 {
        s += i64::from(mv.cursor_before) * w.progress_scale / i64::from(goals.target_index);
    }

    if mv.guaranteed {
        s -= w.guaranteed_penalty;
    }
    s
}

/// Greedy single-path ranking: banner preference, a bias for bigger jumps and
/// a penalty when the distance left can no longer be closed by plain
/// two-seed draws.
pub fn greedy_score(
    w: &ScoreWeights,
    goals: &Goals<'_>,
    banner: BannerId,
    previous: Option<BannerId>,
    seeds: u32,
    next_cursor: u32,
) -> i64 {
    let mut s = banner_bonus(w, goals, banner, previous) + i64::from(seeds);
    let remaining = goals.target_index.saturating_sub(next_cursor);
    if remaining % 2 == 1 {
        s -= w.parity_penalty;
    }
    s
}
