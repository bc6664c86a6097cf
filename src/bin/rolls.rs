use std::path::PathBuf;

use clap::Parser;
use seedroute::{load_banners_from_json, roll_table, BannerId, Character, Rarity, SeedStream};

#[derive(Debug, Parser)]
#[command(name = "rolls", about = "Print the draw table of one banner as JSON lines")]
struct Args {
    /// Banner master data (JSON array)
    #[arg(long, default_value = "data/banners.json")]
    banners: PathBuf,

    #[arg(long)]
    seed: u32,

    #[arg(long)]
    banner: BannerId,

    /// Table rows; row n covers stream indices 2n and 2n+1
    #[arg(long, default_value_t = 100)]
    rows: u32,

    /// What-if character prepended to a pool: rarity:id:name (repeatable)
    #[arg(long)]
    bonus: Vec<String>,
}

fn parse_bonus(s: &str) -> Result<(Rarity, Character), String> {
    let mut parts = s.splitn(3, ':');
    let rarity: Rarity = parts.next().unwrap_or_default().parse()?;
    let id = parts
        .next()
        .ok_or_else(|| format!("missing id in bonus '{s}'"))?
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid id in bonus '{s}': {e}"))?;
    let name = parts.next().unwrap_or("bonus").trim();
    Ok((rarity, Character::new(id, name)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let banners = load_banners_from_json(&args.banners)
        .map_err(|e| format!("Banner load error: {e}"))?;
    let mut banner = banners
        .get(args.banner)
        .ok_or_else(|| format!("Banner {} not found", args.banner))?
        .clone();
    for b in &args.bonus {
        let (rarity, ch) = parse_bonus(b)?;
        banner = banner.with_bonus(rarity, &[ch]);
    }

    // Each row needs two indices plus room for a full guaranteed segment.
    let stream = SeedStream::for_target(args.seed, args.rows.saturating_mul(2));
    for row in roll_table(&stream, &banner, args.rows) {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
