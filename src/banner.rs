use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Rarity;

pub type BannerId = u32;
pub type CharacterId = u32;

/// Rate denominator for rarity thresholds.
pub const RATE_SCALE: u32 = 10_000;

/// Normal-roll counts a guaranteed variant may require before its pity draw.
pub const GUARANTEED_ROLL_COUNTS: [u8; 3] = [6, 10, 14];

#[derive(Debug, Error)]
pub enum MasterDataError {
    #[error("failed to read banner data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse banner JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no banners in master data")]
    Empty,
    #[error("duplicate banner id {id} ('{first}' and '{second}')")]
    DuplicateId {
        id: BannerId,
        first: String,
        second: String,
    },
    #[error("duplicate banner name '{name}' for ids {first} and {second}")]
    DuplicateName {
        name: String,
        first: BannerId,
        second: BannerId,
    },
    #[error("banner {id} '{name}': {reason}")]
    Invalid {
        id: BannerId,
        name: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Per-tier rates out of [`RATE_SCALE`], accumulated in tier order when a
/// draw is resolved. Whatever is left over falls back to `rare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RarityRates {
    #[serde(default)]
    pub rare: u32,
    #[serde(default, rename = "super")]
    pub super_: u32,
    #[serde(default)]
    pub uber: u32,
    #[serde(default)]
    pub legend: u32,
}

impl RarityRates {
    #[inline]
    pub fn get(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Rare => self.rare,
            Rarity::Super => self.super_,
            Rarity::Uber => self.uber,
            Rarity::Legend => self.legend,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.rare + self.super_ + self.uber + self.legend
    }

    /// Map a roll in `0..RATE_SCALE` onto a tier.
    pub fn rarity_for(&self, roll: u32) -> Rarity {
        let mut acc = 0u32;
        for rarity in Rarity::all() {
            acc = acc.saturating_add(self.get(rarity));
            if roll < acc {
                return rarity;
            }
        }
        Rarity::Rare
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pools {
    #[serde(default)]
    pub rare: Vec<Character>,
    #[serde(default, rename = "super")]
    pub super_: Vec<Character>,
    #[serde(default)]
    pub uber: Vec<Character>,
    #[serde(default)]
    pub legend: Vec<Character>,
}

impl Pools {
    #[inline]
    pub fn get(&self, rarity: Rarity) -> &[Character] {
        match rarity {
            Rarity::Rare => &self.rare,
            Rarity::Super => &self.super_,
            Rarity::Uber => &self.uber,
            Rarity::Legend => &self.legend,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, rarity: Rarity) -> &mut Vec<Character> {
        match rarity {
            Rarity::Rare => &mut self.rare,
            Rarity::Super => &mut self.super_,
            Rarity::Uber => &mut self.uber,
            Rarity::Legend => &mut self.legend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteedVariant {
    /// Normal draws taken before the single pity draw over the uber pool.
    pub normal_rolls: u8,
}

impl GuaranteedVariant {
    /// Draws in a full guaranteed segment, pity draw included.
    #[inline]
    pub fn segment_len(&self) -> u32 {
        u32::from(self.normal_rolls) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerConfig {
    pub id: BannerId,
    pub name: String,
    pub rates: RarityRates,
    #[serde(default)]
    pub pools: Pools,
    #[serde(default)]
    pub guaranteed: Option<GuaranteedVariant>,
    /// Platinum/special banners draw from a scarce resource.
    #[serde(default)]
    pub special: bool,
}

impl BannerConfig {
    #[inline]
    pub fn pool(&self, rarity: Rarity) -> &[Character] {
        self.pools.get(rarity)
    }

    /// Clone with `extra` prepended to the `rarity` pool. The receiver is left
    /// untouched so shared master data never sees what-if overrides.
    pub fn with_bonus(&self, rarity: Rarity, extra: &[Character]) -> BannerConfig {
        let mut cfg = self.clone();
        let pool = cfg.pools.get_mut(rarity);
        let mut merged = Vec::with_capacity(extra.len() + pool.len());
        merged.extend_from_slice(extra);
        merged.append(pool);
        *pool = merged;
        cfg
    }
}

fn validate_banner(b: &BannerConfig) -> Result<(), MasterDataError> {
    let invalid = |reason: String| MasterDataError::Invalid {
        id: b.id,
        name: b.name.clone(),
        reason,
    };
    if b.rates.total() > RATE_SCALE {
        return Err(invalid(format!(
            "rates sum to {} (must be <= {RATE_SCALE})",
            b.rates.total()
        )));
    }
    if let Some(g) = b.guaranteed {
        if !GUARANTEED_ROLL_COUNTS.contains(&g.normal_rolls) {
            return Err(invalid(format!(
                "guaranteed normal_rolls {} not one of {:?}",
                g.normal_rolls, GUARANTEED_ROLL_COUNTS
            )));
        }
    }
    Ok(())
}

/// Read-only banner master data, keyed by id in ascending order.
#[derive(Debug, Clone, Default)]
pub struct BannerDb {
    by_id: BTreeMap<BannerId, BannerConfig>,
    name_to_id: HashMap<String, BannerId>,
}

impl BannerDb {
    /// Build from already-parsed banners, applying the same checks as the
    /// JSON loader.
    pub fn from_banners(raw: Vec<BannerConfig>) -> Result<Self, MasterDataError> {
        if raw.is_empty() {
            return Err(MasterDataError::Empty);
        }
        let mut by_id: BTreeMap<BannerId, BannerConfig> = BTreeMap::new();
        let mut name_to_id: HashMap<String, BannerId> = HashMap::with_capacity(raw.len());

        for b in raw {
            validate_banner(&b)?;
            if let Some(existing) = by_id.get(&b.id) {
                return Err(MasterDataError::DuplicateId {
                    id: b.id,
                    first: existing.name.clone(),
                    second: b.name,
                });
            }
            if let Some(prev) = name_to_id.insert(b.name.clone(), b.id) {
                return Err(MasterDataError::DuplicateName {
                    name: b.name,
                    first: prev,
                    second: b.id,
                });
            }
            for rarity in Rarity::all() {
                if b.rates.get(rarity) > 0 && b.pool(rarity).is_empty() {
                    warn!(
                        "[banners] banner {} '{}' has a {:?} rate but an empty pool",
                        b.id, b.name, rarity
                    );
                }
            }
            by_id.insert(b.id, b);
        }

        Ok(Self { by_id, name_to_id })
    }

    #[inline]
    pub fn get(&self, id: BannerId) -> Option<&BannerConfig> {
        self.by_id.get(&id)
    }

    #[inline]
    pub fn id_by_name(&self, name: &str) -> Option<BannerId> {
        self.name_to_id.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &BannerConfig> {
        self.by_id.values()
    }

    /// Clone of this db with one banner replaced by a bonus-augmented copy.
    pub fn with_bonus(&self, banner: BannerId, rarity: Rarity, extra: &[Character]) -> BannerDb {
        let mut db = self.clone();
        if let Some(b) = db.by_id.get_mut(&banner) {
            *b = b.with_bonus(rarity, extra);
        }
        db
    }
}

/// Load banner master data from a JSON array of banner objects.
pub fn load_banners_from_json<P: AsRef<Path>>(path: P) -> Result<BannerDb, MasterDataError> {
    let data = fs::read_to_string(path.as_ref())?;
    let raw: Vec<BannerConfig> = serde_json::from_str(&data)?;
    BannerDb::from_banners(raw)
}

/// A banner as named by a caller: `"<id>"`, or `"<id>g"` to allow its
/// guaranteed variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BannerRef {
    pub id: BannerId,
    pub guaranteed: bool,
}

impl BannerRef {
    #[inline]
    pub const fn normal(id: BannerId) -> Self {
        Self {
            id,
            guaranteed: false,
        }
    }

    #[inline]
    pub const fn guaranteed(id: BannerId) -> Self {
        Self {
            id,
            guaranteed: true,
        }
    }

    /// Split a trailing `g`/`G` off an id token.
    pub fn parse(token: &str) -> Option<Self> {
        let t = token.trim();
        let (digits, guaranteed) = match t.strip_suffix(['g', 'G']) {
            Some(rest) => (rest, true),
            None => (t, false),
        };
        digits.parse::<BannerId>().ok().map(|id| Self { id, guaranteed })
    }
}

impl FromStr for BannerRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid banner reference '{s}'"))
    }
}

impl fmt::Display for BannerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.guaranteed {
            write!(f, "{}g", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(id: BannerId, name: &str) -> BannerConfig {
        BannerConfig {
            id,
            name: name.to_string(),
            rates: RarityRates {
                rare: 7000,
                super_: 2500,
                uber: 470,
                legend: 30,
            },
            pools: Pools {
                rare: vec![Character::new(1, "one"), Character::new(2, "two")],
                ..Pools::default()
            },
            guaranteed: None,
            special: false,
        }
    }

    #[test]
    fn rarity_thresholds_accumulate() {
        let r = banner(1, "x").rates;
        assert_eq!(r.rarity_for(0), Rarity::Rare);
        assert_eq!(r.rarity_for(6999), Rarity::Rare);
        assert_eq!(r.rarity_for(7000), Rarity::Super);
        assert_eq!(r.rarity_for(9499), Rarity::Super);
        assert_eq!(r.rarity_for(9500), Rarity::Uber);
        assert_eq!(r.rarity_for(9970), Rarity::Legend);
        assert_eq!(r.rarity_for(9999), Rarity::Legend);
    }

    #[test]
    fn short_rates_fall_back_to_rare() {
        let r = RarityRates {
            rare: 0,
            super_: 0,
            uber: 100,
            legend: 0,
        };
        assert_eq!(r.rarity_for(50), Rarity::Uber);
        assert_eq!(r.rarity_for(5000), Rarity::Rare);
    }

    #[test]
    fn super_tier_uses_plain_json_key() {
        let rates: RarityRates =
            serde_json::from_str(r#"{"rare": 7000, "super": 2500, "uber": 500}"#).unwrap();
        assert_eq!(rates.get(Rarity::Super), 2500);
        let pools: Pools = serde_json::from_str(r#"{"super": [{"id": 7, "name": "s"}]}"#).unwrap();
        assert_eq!(pools.get(Rarity::Super)[0].id, 7);
        let back = serde_json::to_value(rates).unwrap();
        assert_eq!(back["super"], 2500);
    }

    #[test]
    fn bonus_does_not_touch_master() {
        let master = banner(1, "x");
        let what_if = master.with_bonus(Rarity::Rare, &[Character::new(99, "bonus")]);
        assert_eq!(master.pool(Rarity::Rare).len(), 2);
        assert_eq!(what_if.pool(Rarity::Rare).len(), 3);
        assert_eq!(what_if.pool(Rarity::Rare)[0].id, 99);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = BannerDb::from_banners(vec![banner(1, "a"), banner(1, "b")]).unwrap_err();
        assert!(matches!(err, MasterDataError::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn bad_guaranteed_count_rejected() {
        let mut b = banner(1, "a");
        b.guaranteed = Some(GuaranteedVariant { normal_rolls: 9 });
        assert!(matches!(
            BannerDb::from_banners(vec![b]),
            Err(MasterDataError::Invalid { .. })
        ));
    }

    #[test]
    fn banner_ref_parsing() {
        assert_eq!(BannerRef::parse("12"), Some(BannerRef::normal(12)));
        assert_eq!(BannerRef::parse("12g"), Some(BannerRef::guaranteed(12)));
        assert_eq!(BannerRef::parse("g"), None);
        assert_eq!(BannerRef::parse("x1"), None);
        assert_eq!(BannerRef::guaranteed(3).to_string(), "3g");
    }
}
