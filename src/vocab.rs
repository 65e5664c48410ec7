//! Vocabulary mastery snapshot and weighted practice sampling.
//!
//! The snapshot is a point-in-time copy of flashcard review intervals,
//! written as JSON by an external refresher. It is an explicit value: it is
//! loaded once at startup and replaced wholesale by [`MasterySnapshot::refresh`].
//!
//! ## Tiers
//!
//! | Interval (days) | Tier     |
//! |-----------------|----------|
//! | 0               | new      |
//! | 1..=7           | learning |
//! | 8..=21          | young    |
//! | > 21            | mature   |

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, VocabError};

/// Spaced-repetition maturity of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    #[default]
    New,
    Learning,
    Young,
    Mature,
}

impl MasteryTier {
    /// Fixed iteration order used for weighting and redistribution.
    pub const ALL: [MasteryTier; 4] = [Self::New, Self::Learning, Self::Young, Self::Mature];

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Young => "young",
            Self::Mature => "mature",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::New => 0,
            Self::Learning => 1,
            Self::Young => 2,
            Self::Mature => 3,
        }
    }
}

impl fmt::Display for MasteryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Classify a review interval into its tier.
///
/// Negative intervals are cards still in learning steps (measured in
/// seconds rather than days).
pub fn classify_tier(interval_days: i64) -> MasteryTier {
    match interval_days {
        0 => MasteryTier::New,
        ..=7 => MasteryTier::Learning,
        8..=21 => MasteryTier::Young,
        _ => MasteryTier::Mature,
    }
}

/// One vocabulary item with its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabMastery {
    /// Taken from the snapshot key.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub transliteration: String,
    #[serde(default)]
    pub meaning: String,
    /// Course unit that introduced the item.
    #[serde(default)]
    pub unit: i64,
    /// Derived from `interval_days` on load.
    #[serde(default)]
    pub tier: MasteryTier,
    #[serde(default)]
    pub interval_days: i64,
}

impl VocabMastery {
    pub fn new(id: impl Into<String>, unit: i64, interval_days: i64) -> Self {
        Self {
            id: id.into(),
            transliteration: String::new(),
            meaning: String::new(),
            unit,
            tier: classify_tier(interval_days),
            interval_days,
        }
    }
}

/// Point-in-time mastery data keyed by vocab id.
#[derive(Debug, Clone, Default)]
pub struct MasterySnapshot {
    entries: BTreeMap<String, VocabMastery>,
    loaded: bool,
}

impl MasterySnapshot {
    /// A snapshot that was never loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = VocabMastery>) -> Self {
        Self {
            entries: entries.into_iter().map(|v| (v.id.clone(), v)).collect(),
            loaded: true,
        }
    }

    /// Parse snapshot JSON; tiers are recomputed from the intervals.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, VocabMastery> = serde_json::from_str(text)?;
        Ok(Self::from_entries(raw.into_iter().map(|(id, mut vocab)| {
            vocab.id = id;
            vocab.tier = classify_tier(vocab.interval_days);
            vocab
        })))
    }

    /// Load the snapshot at `path`. A missing file is an empty, unloaded
    /// snapshot rather than an error.
    pub fn load(path: &Path) -> Result<Self, VocabError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no mastery snapshot yet");
                return Ok(Self::empty());
            }
            Err(e) => {
                return Err(VocabError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        let snapshot = Self::from_json(&text).map_err(|e| VocabError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(items = snapshot.len(), "loaded mastery snapshot");
        Ok(snapshot)
    }

    /// Replace this snapshot with the file's current contents. On error the
    /// old snapshot is kept.
    pub fn refresh(&mut self, path: &Path) -> Result<(), VocabError> {
        *self = Self::load(path)?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VocabMastery> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabMastery> {
        self.entries.values()
    }

    /// Items of `tier`, limited to units up to `unit` when given.
    pub fn by_tier(&self, tier: MasteryTier, unit: Option<i64>) -> Vec<&VocabMastery> {
        self.iter()
            .filter(|v| v.tier == tier && unit.is_none_or(|u| v.unit <= u))
            .collect()
    }
}

/// Share of a practice set drawn from each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub new: f64,
    pub learning: f64,
    pub young: f64,
    pub mature: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            new: 0.10,
            learning: 0.40,
            young: 0.35,
            mature: 0.15,
        }
    }
}

impl TierWeights {
    pub fn get(&self, tier: MasteryTier) -> f64 {
        match tier {
            MasteryTier::New => self.new,
            MasteryTier::Learning => self.learning,
            MasteryTier::Young => self.young,
            MasteryTier::Mature => self.mature,
        }
    }

    /// Reject negative or non-finite weights and scale the rest to sum to
    /// 1.0. All-zero weights fall back to the defaults.
    pub fn normalized(&self) -> Result<Self, ConfigError> {
        for tier in MasteryTier::ALL {
            let value = self.get(tier);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    tier: tier.to_string(),
                    value,
                });
            }
        }
        let sum: f64 = MasteryTier::ALL.iter().map(|t| self.get(*t)).sum();
        if sum == 0.0 {
            tracing::warn!("all tier weights are zero, using defaults");
            return Ok(Self::default());
        }
        if (sum - 1.0).abs() < 1e-9 {
            return Ok(*self);
        }
        tracing::debug!(sum, "normalising tier weights");
        Ok(Self {
            new: self.new / sum,
            learning: self.learning / sum,
            young: self.young / sum,
            mature: self.mature / sum,
        })
    }
}

/// Absorbs float error so `20 * 0.35` floors to 7.
const SHARE_EPSILON: f64 = 1e-9;

/// How many items to take from each tier, given pool sizes.
///
/// Each tier first gets `floor(count * weight)` capped at its pool; the
/// shortfall is then handed out new → learning → young → mature up to each
/// pool's remaining capacity.
pub fn tier_counts(count: usize, weights: &TierWeights, available: [usize; 4]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    let mut remaining = count;
    for tier in MasteryTier::ALL {
        let i = tier.index();
        let share = (count as f64 * weights.get(tier) + SHARE_EPSILON).floor() as usize;
        counts[i] = share.min(available[i]);
        remaining = remaining.saturating_sub(counts[i]);
    }
    for i in 0..counts.len() {
        if remaining == 0 {
            break;
        }
        let add = remaining.min(available[i] - counts[i]);
        counts[i] += add;
        remaining -= add;
    }
    counts
}

/// Draw a practice set of up to `count` items from units `<= current_unit`.
///
/// Returns exactly `count` distinct items when the eligible pool is large
/// enough, otherwise every eligible item. The result is shuffled.
pub fn practice_set<R: Rng + ?Sized>(
    snapshot: &MasterySnapshot,
    current_unit: i64,
    count: usize,
    weights: &TierWeights,
    rng: &mut R,
) -> Vec<VocabMastery> {
    let pools: [Vec<&VocabMastery>; 4] =
        MasteryTier::ALL.map(|tier| snapshot.by_tier(tier, Some(current_unit)));
    let counts = tier_counts(count, weights, pools.each_ref().map(Vec::len));

    let mut picked: Vec<VocabMastery> = Vec::with_capacity(count);
    for (pool, n) in pools.iter().zip(counts) {
        picked.extend(pool.choose_multiple(rng, n).map(|v| (*v).clone()));
    }
    picked.shuffle(rng);
    picked.truncate(count);
    picked
}
