use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::banner::{BannerId, BannerRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSegment {
    pub banner: BannerId,
    /// Draws in this segment. For a guaranteed segment this includes the pity draw.
    pub count: u32,
    pub guaranteed: bool,
}

impl RouteSegment {
    #[inline]
    pub const fn normal(banner: BannerId, count: u32) -> Self {
        Self {
            banner,
            count,
            guaranteed: false,
        }
    }

    #[inline]
    pub const fn guaranteed(banner: BannerId, count: u32) -> Self {
        Self {
            banner,
            count,
            guaranteed: true,
        }
    }

    #[inline]
    fn merges_with(&self, next: &RouteSegment) -> bool {
        !self.guaranteed && !next.guaranteed && self.banner == next.banner
    }
}

/// Ordered banner/count segments describing a sequence of draws.
/// Text form: `"<id>[g] <count> <id>[g] <count> ..."`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub segments: Vec<RouteSegment>,
}

impl RoutePlan {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient parse, token by token: an unparseable token is dropped on its
    /// own so later pairs stay aligned. Zero counts and a dangling final
    /// token are skipped too.
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut segments = Vec::with_capacity(tokens.len() / 2);
        let mut i = 0;
        while i + 1 < tokens.len() {
            let Some(bref) = BannerRef::parse(tokens[i]) else {
                i += 1;
                continue;
            };
            let Ok(count) = tokens[i + 1].parse::<u32>() else {
                i += 1;
                continue;
            };
            i += 2;
            if count == 0 {
                continue;
            }
            segments.push(RouteSegment {
                banner: bref.id,
                count,
                guaranteed: bref.guaranteed,
            });
        }
        Self { segments }
    }

    /// Merge runs of the same non-guaranteed banner. Guaranteed segments keep
    /// their own slot.
    pub fn compress(raw: &[RouteSegment]) -> Self {
        let mut plan = Self::new();
        for seg in raw {
            plan.push(*seg);
        }
        plan
    }

    /// Append, merging into the last segment when both are plain draws on the
    /// same banner.
    pub fn push(&mut self, seg: RouteSegment) {
        if seg.count == 0 {
            return;
        }
        if let Some(last) = self.segments.last_mut() {
            if last.merges_with(&seg) {
                last.count += seg.count;
                return;
            }
        }
        self.segments.push(seg);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&RouteSegment> {
        self.segments.last()
    }

    pub fn total_draws(&self) -> u32 {
        self.segments.iter().map(|s| s.count).sum()
    }

    pub fn guaranteed_segments(&self) -> u32 {
        self.segments.iter().filter(|s| s.guaranteed).count() as u32
    }

    #[inline]
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RoutePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let g = if seg.guaranteed { "g" } else { "" };
            write!(f, "{}{} {}", seg.banner, g, seg.count)?;
        }
        Ok(())
    }
}

impl FromStr for RoutePlan {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
