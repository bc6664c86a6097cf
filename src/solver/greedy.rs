use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::{ScoreWeights, SearchLimits};
use crate::engine::draw::{step_normal, DrawResult, TrackMemory};
use crate::route::{RoutePlan, RouteSegment};
use crate::solver::score::{greedy_score, Goals};
use crate::solver::{finish_plan, origin, path_caps, usable_banners, SearchContext, SearchRequest, Usable};

/// Single-path search: at every step take the best-scoring single normal draw
/// among the visible banners. Never uses guaranteed segments and never
/// backtracks.
pub fn greedy_search(
    ctx: &SearchContext<'_>,
    req: &SearchRequest,
    limits: &SearchLimits,
    weights: &ScoreWeights,
) -> Option<RoutePlan> {
    let caps = path_caps(ctx, req)?;
    let start = origin(ctx, req)?;
    if start.usage.special_draws > caps.max_plat || start.usage.guaranteed_segments > caps.max_guaranteed {
        debug!("[greedy] prefix already exceeds resource caps");
        return None;
    }

    let usable = usable_banners(ctx, &req.visible);
    let goals = Goals {
        target_index: req.target_index,
        target_banner: req.target_banner.id,
        primary: req.target_character,
        limited: &req.limited,
    };
    let deadline = limits.time_ms.map(|ms| Instant::now() + Duration::from_millis(ms));

    let mut cursor = start.cursor;
    let mut memory = start.memory;
    let mut last_banner = start.last_banner;
    let mut special_used = start.usage.special_draws;
    let mut path: Vec<RouteSegment> = Vec::new();

    for step in 0..limits.max_steps {
        if cursor == req.target_index {
            info!("[greedy] reached {} after {} draws", req.target_index, path.len());
            return Some(finish_plan(ctx, req, &path));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("[greedy] time budget exhausted at step {step}");
            return None;
        }

        let mut best: Option<(i64, &Usable<'_>, DrawResult, TrackMemory)> = None;
        for u in &usable {
            if u.cfg.special && special_used >= caps.max_plat {
                continue;
            }
            let mut next_memory = memory;
            let Some(draw) = step_normal(ctx.stream, cursor, u.cfg, &mut next_memory) else {
                continue;
            };
            let next = draw.next_cursor();
            if next > req.target_index {
                continue;
            }
            let score = if next == req.target_index {
                i64::MAX
            } else {
                greedy_score(weights, &goals, u.cfg.id, last_banner, draw.seeds_consumed, next)
            };
            if best.as_ref().is_none_or(|(s, ..)| score > *s) {
                best = Some((score, u, draw, next_memory));
            }
        }

        let Some((_, u, draw, next_memory)) = best else {
            info!("[greedy] dead end at cursor {cursor} (target {})", req.target_index);
            return None;
        };
        cursor = draw.next_cursor();
        memory = next_memory;
        last_banner = Some(u.cfg.id);
        if u.cfg.special {
            special_used += 1;
        }
        path.push(RouteSegment::normal(u.cfg.id, 1));
    }

    if cursor == req.target_index {
        return Some(finish_plan(ctx, req, &path));
    }
    info!("[greedy] gave up after {} steps", limits.max_steps);
    None
}
