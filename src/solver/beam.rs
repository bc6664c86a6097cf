use std::hash::BuildHasherDefault;
use std::rc::Rc;
use std::time::{Duration, Instant};

use hashbrown::HashMap as HbHashMap;
use log::{debug, info};

use crate::banner::{BannerId, CharacterId};
use crate::config::{ScoreWeights, SearchLimits};
use crate::engine::draw::{step_normal, TrackMemory};
use crate::engine::lookahead::run_guaranteed_segment;
use crate::route::{RoutePlan, RouteSegment};
use crate::solver::score::{move_score, Goals, MoveFacts};
use crate::solver::{finish_plan, origin, path_caps, usable_banners, PathCaps, SearchContext, SearchRequest, Usable};

type FastHasher = BuildHasherDefault<ahash::AHasher>;

/// Shared-tail path so siblings don't copy their common history.
#[derive(Debug)]
struct PathNode {
    seg: RouteSegment,
    parent: Option<Rc<PathNode>>,
}

fn collect_path(tail: &Option<Rc<PathNode>>) -> Vec<RouteSegment> {
    let mut out = Vec::new();
    let mut cur = tail.as_ref();
    while let Some(node) = cur {
        out.push(node.seg);
        cur = node.parent.as_ref();
    }
    out.reverse();
    out
}

#[derive(Debug, Clone)]
struct Candidate {
    cursor: u32,
    path: Option<Rc<PathNode>>,
    memory: TrackMemory,
    last_banner: Option<BannerId>,
    last_character: Option<CharacterId>,
    score: i64,
    special_used: u32,
    guaranteed_used: u32,
}

impl Candidate {
    fn child(&self, seg: RouteSegment) -> Candidate {
        Candidate {
            path: Some(Rc::new(PathNode {
                seg,
                parent: self.path.clone(),
            })),
            last_banner: Some(seg.banner),
            ..self.clone()
        }
    }
}

type DedupKey = (u32, Option<CharacterId>, u32, u32);

/// Expansion results collapsed on `(cursor, last character, special used,
/// guaranteed used)`, keeping the best score. Insertion order is preserved so
/// ties resolve the same way on every run.
struct Frontier {
    items: Vec<Candidate>,
    slot: HbHashMap<DedupKey, usize, FastHasher>,
}

impl Frontier {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            slot: HbHashMap::default(),
        }
    }

    fn offer(&mut self, c: Candidate) {
        let key = (c.cursor, c.last_character, c.special_used, c.guaranteed_used);
        match self.slot.get(&key) {
            Some(&i) => {
                if c.score > self.items[i].score {
                    self.items[i] = c;
                }
            }
            None => {
                self.slot.insert(key, self.items.len());
                self.items.push(c);
            }
        }
    }
}

#[inline]
fn by_score_desc(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    b.score.cmp(&a.score)
}

/// Keep the best `ceil(width / 2)` of each parity class, then the best
/// `width` overall, so neither track starves the other.
fn prune_balanced(items: Vec<Candidate>, width: usize) -> Vec<Candidate> {
    let half = width.div_ceil(2);
    let (mut even, mut odd): (Vec<Candidate>, Vec<Candidate>) =
        items.into_iter().partition(|c| c.cursor % 2 == 0);
    even.sort_by(by_score_desc);
    odd.sort_by(by_score_desc);
    even.truncate(half);
    odd.truncate(half);
    let mut merged = even;
    merged.append(&mut odd);
    merged.sort_by(by_score_desc);
    merged.truncate(width);
    merged
}

fn expand(
    ctx: &SearchContext<'_>,
    goals: &Goals<'_>,
    weights: &ScoreWeights,
    caps: PathCaps,
    usable: &[Usable<'_>],
    cand: &Candidate,
    frontier: &mut Frontier,
) {
    for u in usable {
        let banner = u.cfg;

        if !banner.special || cand.special_used < caps.max_plat {
            let mut memory = cand.memory;
            if let Some(draw) = step_normal(ctx.stream, cand.cursor, banner, &mut memory) {
                let next = draw.next_cursor();
                if next <= goals.target_index {
                    let facts = MoveFacts {
                        banner: banner.id,
                        previous_banner: cand.last_banner,
                        rarity: draw.rarity,
                        character: draw.character_id(),
                        seeds: draw.seeds_consumed,
                        cursor_before: cand.cursor,
                        guaranteed: false,
                    };
                    let mut child = cand.child(RouteSegment::normal(banner.id, 1));
                    child.cursor = next;
                    child.memory = memory;
                    child.last_character = draw.character_id();
                    child.score = cand.score + move_score(weights, goals, &facts);
                    if banner.special {
                        child.special_used += 1;
                    }
                    frontier.offer(child);
                }
            }
        }

        let Some(rolls) = u.guaranteed_rolls else { continue };
        if cand.guaranteed_used >= caps.max_guaranteed {
            continue;
        }
        let draws = rolls + 1;
        if banner.special && cand.special_used + draws > caps.max_plat {
            continue;
        }
        let mut memory = cand.memory;
        let Some(run) = run_guaranteed_segment(ctx.stream, cand.cursor, banner, &mut memory, rolls) else {
            continue;
        };
        let next = run.end_cursor();
        if next > goals.target_index {
            continue;
        }
        let facts = MoveFacts {
            banner: banner.id,
            previous_banner: cand.last_banner,
            rarity: run.pity.rarity,
            character: run.pity.character_id(),
            seeds: next - cand.cursor,
            cursor_before: cand.cursor,
            guaranteed: true,
        };
        let mut child = cand.child(RouteSegment::guaranteed(banner.id, draws));
        child.cursor = next;
        child.memory = memory;
        child.last_character = run.pity.character_id();
        child.score = cand.score + move_score(weights, goals, &facts);
        child.guaranteed_used += 1;
        if banner.special {
            child.special_used += draws;
        }
        frontier.offer(child);
    }
}

/// Track-balanced beam search for a path landing exactly on
/// `req.target_index`. Returns the full plan (prefix, path, terminal draw).
pub fn beam_search(
    ctx: &SearchContext<'_>,
    req: &SearchRequest,
    limits: &SearchLimits,
    weights: &ScoreWeights,
) -> Option<RoutePlan> {
    let Some(caps) = path_caps(ctx, req) else {
        debug!("[beam] terminal draw alone exceeds resource caps");
        return None;
    };
    let start = origin(ctx, req)?;
    if start.usage.special_draws > caps.max_plat || start.usage.guaranteed_segments > caps.max_guaranteed {
        debug!("[beam] prefix already exceeds resource caps");
        return None;
    }
    if start.cursor == req.target_index {
        return Some(finish_plan(ctx, req, &[]));
    }

    let usable = usable_banners(ctx, &req.visible);
    let goals = Goals {
        target_index: req.target_index,
        target_banner: req.target_banner.id,
        primary: req.target_character,
        limited: &req.limited,
    };
    let deadline = limits.time_ms.map(|ms| Instant::now() + Duration::from_millis(ms));

    let mut beam = vec![Candidate {
        cursor: start.cursor,
        path: None,
        memory: start.memory,
        last_banner: start.last_banner,
        last_character: None,
        score: 0,
        special_used: start.usage.special_draws,
        guaranteed_used: start.usage.guaranteed_segments,
    }];

    for step in 0..limits.max_steps {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("[beam] time budget exhausted at step {step}");
            return None;
        }

        let mut frontier = Frontier::new();
        for cand in &beam {
            expand(ctx, &goals, weights, caps, &usable, cand, &mut frontier);
        }
        if frontier.items.is_empty() {
            info!("[beam] dead end at step {step} (target {})", req.target_index);
            return None;
        }

        let mut hits: Vec<&Candidate> = frontier
            .items
            .iter()
            .filter(|c| c.cursor == req.target_index)
            .collect();
        if !hits.is_empty() {
            hits.sort_by(|a, b| by_score_desc(a, b));
            let best = hits[0];
            info!(
                "[beam] reached {} at step {} score={} special={} guaranteed={}",
                req.target_index, step, best.score, best.special_used, best.guaranteed_used
            );
            return Some(finish_plan(ctx, req, &collect_path(&best.path)));
        }

        beam = prune_balanced(frontier.items, limits.beam_width);
        debug!(
            "[beam] step {} kept={} best_cursor={} best_score={}",
            step,
            beam.len(),
            beam.first().map_or(0, |c| c.cursor),
            beam.first().map_or(0, |c| c.score)
        );
    }

    info!(
        "[beam] gave up after {} steps (target {})",
        limits.max_steps, req.target_index
    );
    None
}
