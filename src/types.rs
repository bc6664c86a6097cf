use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rarity tiers in the fixed order thresholds are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Rare,
    Super,
    Uber,
    Legend,
}

impl Rarity {
    #[inline]
    pub fn all() -> [Rarity; 4] {
        [Rarity::Rare, Rarity::Super, Rarity::Uber, Rarity::Legend]
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Rarity::Rare => 0,
            Rarity::Super => 1,
            Rarity::Uber => 2,
            Rarity::Legend => 3,
        }
    }

    #[inline]
    pub fn is_top(self) -> bool {
        self == Rarity::Legend
    }

    #[inline]
    pub fn is_second(self) -> bool {
        self == Rarity::Uber
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rare" => Ok(Rarity::Rare),
            "super" => Ok(Rarity::Super),
            "uber" => Ok(Rarity::Uber),
            "legend" => Ok(Rarity::Legend),
            other => Err(format!("unknown rarity '{other}'")),
        }
    }
}

/// Stream-index parity. Each track keeps its own repeat-detection memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    A,
    B,
}

impl Track {
    /// A = even index, B = odd index.
    #[inline]
    pub fn of(index: u32) -> Self {
        if index % 2 == 0 {
            Track::A
        } else {
            Track::B
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_parity() {
        assert_eq!(Track::of(0), Track::A);
        assert_eq!(Track::of(7), Track::B);
    }

    #[test]
    fn rarity_order_is_walk_order() {
        let idx: Vec<usize> = Rarity::all().iter().map(|r| r.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!("Uber".parse::<Rarity>(), Ok(Rarity::Uber));
        assert!("mythic".parse::<Rarity>().is_err());
    }
}
