use std::collections::HashSet;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::banner::{BannerConfig, BannerDb, BannerId, BannerRef, CharacterId};
use crate::config::{EscalationCaps, SearchConfig};
use crate::engine::draw::TrackMemory;
use crate::engine::simulate::{simulate_plan, ResourceUsage};
use crate::rng::SeedStream;
use crate::route::{RoutePlan, RouteSegment};

pub mod beam;
pub mod greedy;
pub mod score;

pub use beam::beam_search;
pub use greedy::greedy_search;

/// Route-search algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Strategy {
    #[default]
    Beam,
    /// Single path, no backtracking. Can dead-end where beam search would not.
    Greedy,
}

/// Read-only inputs shared by every search over one stream.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub banners: &'a BannerDb,
    pub stream: &'a SeedStream,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub target_index: u32,
    /// Banner of the caller's own draw at `target_index`.
    pub target_banner: BannerRef,
    pub visible: Vec<BannerRef>,
    /// Existing plan to extend; the search starts where it ends.
    pub prefix: RoutePlan,
    /// Track memory in effect at stream index 0.
    pub initial_memory: TrackMemory,
    pub target_character: Option<CharacterId>,
    pub limited: HashSet<CharacterId>,
    pub max_plat: u32,
    pub max_guaranteed: u32,
}

impl SearchRequest {
    pub fn new(target_index: u32, target_banner: BannerRef, visible: Vec<BannerRef>) -> Self {
        Self {
            target_index,
            target_banner,
            visible,
            prefix: RoutePlan::new(),
            initial_memory: TrackMemory::default(),
            target_character: None,
            limited: HashSet::new(),
            max_plat: 0,
            max_guaranteed: 0,
        }
    }

    #[inline]
    pub fn with_caps(mut self, max_plat: u32, max_guaranteed: u32) -> Self {
        self.max_plat = max_plat;
        self.max_guaranteed = max_guaranteed;
        self
    }

    #[inline]
    pub fn with_prefix(mut self, prefix: RoutePlan) -> Self {
        self.prefix = prefix;
        self
    }
}

/// Where a search starts: the end of the caller's prefix.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Origin {
    pub cursor: u32,
    pub memory: TrackMemory,
    pub usage: ResourceUsage,
    pub last_banner: Option<BannerId>,
}

pub(crate) fn origin(ctx: &SearchContext<'_>, req: &SearchRequest) -> Option<Origin> {
    let sim = simulate_plan(&req.prefix, ctx.banners, ctx.stream, 0, req.initial_memory);
    if let Some(stop) = sim.stop {
        warn!("[search] prefix '{}' does not replay: {:?}", req.prefix, stop);
        return None;
    }
    if sim.end_cursor > req.target_index {
        debug!(
            "[search] prefix ends at {} past target {}",
            sim.end_cursor, req.target_index
        );
        return None;
    }
    Some(Origin {
        cursor: sim.end_cursor,
        memory: sim.memory,
        usage: sim.usage,
        last_banner: req.prefix.last().map(|s| s.banner),
    })
}

/// A visible banner resolved against master data.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Usable<'a> {
    pub cfg: &'a BannerConfig,
    /// Normal-roll count of the guaranteed move, when it is allowed.
    pub guaranteed_rolls: Option<u32>,
}

pub(crate) fn usable_banners<'a>(ctx: &SearchContext<'a>, visible: &[BannerRef]) -> Vec<Usable<'a>> {
    let mut out: Vec<Usable<'a>> = Vec::with_capacity(visible.len());
    for r in visible {
        let Some(cfg) = ctx.banners.get(r.id) else {
            debug!("[search] visible banner {} not in master data", r.id);
            continue;
        };
        let rolls = if r.guaranteed {
            cfg.guaranteed.map(|g| u32::from(g.normal_rolls))
        } else {
            None
        };
        match out.iter_mut().find(|u| u.cfg.id == r.id) {
            Some(u) => u.guaranteed_rolls = u.guaranteed_rolls.or(rolls),
            None => out.push(Usable {
                cfg,
                guaranteed_rolls: rolls,
            }),
        }
    }
    out
}

/// The caller's own draw at the target: a full guaranteed segment when the
/// target reference asks for one and the banner has it, else one plain draw.
pub(crate) fn terminal_segment(ctx: &SearchContext<'_>, req: &SearchRequest) -> RouteSegment {
    match (req.target_banner.guaranteed, ctx.banners.get(req.target_banner.id)) {
        (true, Some(BannerConfig { guaranteed: Some(g), .. })) => {
            RouteSegment::guaranteed(req.target_banner.id, g.segment_len())
        }
        _ => RouteSegment::normal(req.target_banner.id, 1),
    }
}

/// Resource caps left for the search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathCaps {
    pub max_plat: u32,
    pub max_guaranteed: u32,
}

/// Request caps minus what the terminal draw spends. `None` when the terminal
/// draw alone does not fit.
pub(crate) fn path_caps(ctx: &SearchContext<'_>, req: &SearchRequest) -> Option<PathCaps> {
    let terminal = terminal_segment(ctx, req);
    let special = ctx.banners.get(terminal.banner).is_some_and(|b| b.special);
    let plat_cost = if special { terminal.count } else { 0 };
    let guaranteed_cost = u32::from(terminal.guaranteed);
    let caps = PathCaps {
        max_plat: req.max_plat.checked_sub(plat_cost)?,
        max_guaranteed: req.max_guaranteed.checked_sub(guaranteed_cost)?,
    };
    Some(caps)
}

/// Prefix + search path + the caller's own draw at the target.
pub(crate) fn finish_plan(ctx: &SearchContext<'_>, req: &SearchRequest, path: &[RouteSegment]) -> RoutePlan {
    let mut plan = req.prefix.clone();
    for seg in path {
        plan.push(*seg);
    }
    plan.push(terminal_segment(ctx, req));
    plan
}

/// Run one search. `None` means no route under the request's caps and the
/// configured limits. The caps cover the whole returned plan, terminal draw
/// included.
pub fn find_route(
    strategy: Strategy,
    ctx: &SearchContext<'_>,
    req: &SearchRequest,
    cfg: &SearchConfig,
) -> Option<RoutePlan> {
    match strategy {
        Strategy::Beam => beam_search(ctx, req, &cfg.limits, &cfg.weights),
        Strategy::Greedy => greedy_search(ctx, req, &cfg.limits, &cfg.weights),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderOutcome {
    pub plan: RoutePlan,
    /// Caps of the rung that succeeded.
    pub max_plat: u32,
    pub max_guaranteed: u32,
}

/// Caps tried in order: nothing scarce, then guaranteed segments, then
/// special banners as well.
pub fn ladder_rungs(caps: &EscalationCaps) -> Vec<(u32, u32)> {
    let mut rungs = vec![(0, 0)];
    for rung in [(0, caps.max_guaranteed), (caps.max_plat, caps.max_guaranteed)] {
        if rungs.last() != Some(&rung) {
            rungs.push(rung);
        }
    }
    rungs
}

/// Retry with progressively larger resource caps until a route is found.
/// The request's own caps are ignored in favour of the ladder.
pub fn find_route_escalating(
    strategy: Strategy,
    ctx: &SearchContext<'_>,
    req: &SearchRequest,
    cfg: &SearchConfig,
) -> Option<LadderOutcome> {
    for (max_plat, max_guaranteed) in ladder_rungs(&cfg.caps) {
        let rung = req.clone().with_caps(max_plat, max_guaranteed);
        info!(
            "[ladder] target={} max_plat={} max_guaranteed={}",
            req.target_index, max_plat, max_guaranteed
        );
        if let Some(plan) = find_route(strategy, ctx, &rung, cfg) {
            return Some(LadderOutcome {
                plan,
                max_plat,
                max_guaranteed,
            });
        }
    }
    info!("[ladder] no route to {} on any rung", req.target_index);
    None
}

/// Escalating searches for several targets in parallel. Results keep the
/// order of `targets`.
pub fn plan_many(
    strategy: Strategy,
    ctx: &SearchContext<'_>,
    base: &SearchRequest,
    targets: &[u32],
    cfg: &SearchConfig,
) -> Vec<(u32, Option<LadderOutcome>)> {
    targets
        .par_iter()
        .map(|&t| {
            let mut req = base.clone();
            req.target_index = t;
            (t, find_route_escalating(strategy, ctx, &req, cfg))
        })
        .collect()
}
