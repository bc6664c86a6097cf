#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // may be revisited
#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::cast_possible_truncation)]

pub mod types;
pub mod rng;
pub mod banner;
pub mod route;
pub mod config;

pub mod engine {
    pub mod draw;
    pub mod lookahead;
    pub mod simulate;
    pub mod table;
}

pub mod solver;

// Re-exports: stable minimal API surface for external callers
pub use crate::banner::{
    load_banners_from_json, BannerConfig, BannerDb, BannerId, BannerRef, Character, CharacterId,
    GuaranteedVariant, MasterDataError, Pools, RarityRates,
};
pub use crate::config::{load_search_config, ConfigError, EscalationCaps, ScoreWeights, SearchConfig, SearchLimits};
pub use crate::engine::draw::{resolve_guaranteed_draw, resolve_normal_draw, DrawResult, LastDraw, TrackMemory};
pub use crate::engine::lookahead::{lookahead_guaranteed, Lookahead, LookaheadOutcome};
pub use crate::engine::simulate::{simulate_plan, ResourceUsage, Simulation, StopReason};
pub use crate::engine::table::{roll_table, TableRow};
pub use crate::rng::{generate, SeedStream, Xorshift32, STREAM_MARGIN};
pub use crate::route::{RoutePlan, RouteSegment};
pub use crate::solver::{
    find_route, find_route_escalating, plan_many, LadderOutcome, SearchContext, SearchRequest, Strategy,
};
pub use crate::types::{Rarity, Track};
