use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::info;
use seedroute::{
    find_route, find_route_escalating, load_banners_from_json, load_search_config, simulate_plan,
    BannerRef, CharacterId, LadderOutcome, RoutePlan, SearchConfig, SearchContext, SearchRequest,
    SeedStream, Strategy, TrackMemory,
};

#[derive(Debug, Clone, ValueEnum)]
enum StrategyOpt {
    Beam,
    Greedy,
}

#[derive(Debug, Parser)]
#[command(name = "route", about = "Find a draw route landing exactly on a seed-stream index")]
struct Args {
    /// Banner master data (JSON array)
    #[arg(long, default_value = "data/banners.json")]
    banners: PathBuf,

    /// Optional search config JSON; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial seed of the stream
    #[arg(long)]
    seed: u32,

    /// Stream index the caller wants to draw at
    #[arg(long)]
    target: u32,

    /// Banner of the draw at the target, e.g. 3 or 3g
    #[arg(long)]
    target_banner: BannerRef,

    /// Banners the route may use, comma separated; suffix g to allow the guaranteed variant
    #[arg(long, value_delimiter = ',', required = true)]
    visible: Vec<BannerRef>,

    /// Existing plan to extend, e.g. "3 4 5g 11"
    #[arg(long)]
    prefix: Option<String>,

    /// Character id the route should prefer to pass through
    #[arg(long)]
    character: Option<CharacterId>,

    /// Limited character ids, comma separated
    #[arg(long, value_delimiter = ',')]
    limited: Vec<CharacterId>,

    /// Override the escalation cap for special-banner draws
    #[arg(long)]
    max_plat: Option<u32>,

    /// Override the escalation cap for guaranteed segments
    #[arg(long)]
    max_guaranteed: Option<u32>,

    /// Search once with the caps as given instead of escalating
    #[arg(long)]
    no_escalate: bool,

    #[arg(long, value_enum, default_value_t = StrategyOpt::Beam)]
    strategy: StrategyOpt,

    /// Print a single JSON object instead of the plan text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let banners = load_banners_from_json(&args.banners)
        .map_err(|e| format!("Banner load error: {e}"))?;
    let mut cfg = match &args.config {
        Some(p) => load_search_config(p).map_err(|e| format!("Config error: {e}"))?,
        None => SearchConfig::default(),
    };
    if let Some(p) = args.max_plat {
        cfg.caps.max_plat = p;
    }
    if let Some(g) = args.max_guaranteed {
        cfg.caps.max_guaranteed = g;
    }
    info!(
        "[route] {} banners loaded, seed={} target={}",
        banners.len(),
        args.seed,
        args.target
    );

    let stream = SeedStream::for_target(args.seed, args.target);
    let ctx = SearchContext {
        banners: &banners,
        stream: &stream,
    };
    let strategy = match args.strategy {
        StrategyOpt::Beam => Strategy::Beam,
        StrategyOpt::Greedy => Strategy::Greedy,
    };

    let mut req = SearchRequest::new(args.target, args.target_banner, args.visible.clone());
    if let Some(text) = &args.prefix {
        req = req.with_prefix(RoutePlan::parse(text));
    }
    req.target_character = args.character;
    req.limited = args.limited.iter().copied().collect();

    let outcome = if args.no_escalate {
        let req = req.with_caps(cfg.caps.max_plat, cfg.caps.max_guaranteed);
        find_route(strategy, &ctx, &req, &cfg).map(|plan| LadderOutcome {
            plan,
            max_plat: req.max_plat,
            max_guaranteed: req.max_guaranteed,
        })
    } else {
        find_route_escalating(strategy, &ctx, &req, &cfg)
    };

    if args.json {
        let value = match &outcome {
            Some(o) => {
                let sim = simulate_plan(&o.plan, &banners, &stream, 0, TrackMemory::default());
                serde_json::json!({
                    "found": true,
                    "plan": o.plan.to_string(),
                    "max_plat": o.max_plat,
                    "max_guaranteed": o.max_guaranteed,
                    "draws": sim.draws,
                })
            }
            None => serde_json::json!({ "found": false, "target": args.target }),
        };
        println!("{}", serde_json::to_string(&value)?);
    } else {
        match &outcome {
            Some(o) => println!("{}", o.plan),
            None => eprintln!("[route] not found"),
        }
    }

    Ok(if outcome.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
