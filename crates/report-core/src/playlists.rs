//! Rank tiers, discipline categories and the playlist catalog that maps one
//! to the other.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

// ── Rank ──────────────────────────────────────────────────────────────────────

/// Benchmark rank tier. One report page is produced per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Jade,
    Master,
    Grandmaster,
}

impl Rank {
    /// Every tier, lowest first.
    pub const ALL: [Rank; 9] = [
        Rank::Iron,
        Rank::Bronze,
        Rank::Silver,
        Rank::Gold,
        Rank::Platinum,
        Rank::Diamond,
        Rank::Jade,
        Rank::Master,
        Rank::Grandmaster,
    ];

    /// Lowercase key used in the catalog document and in page file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Iron => "iron",
            Rank::Bronze => "bronze",
            Rank::Silver => "silver",
            Rank::Gold => "gold",
            Rank::Platinum => "platinum",
            Rank::Diamond => "diamond",
            Rank::Jade => "jade",
            Rank::Master => "master",
            Rank::Grandmaster => "grandmaster",
        }
    }

    /// Capitalised name for navigation labels.
    pub fn title(&self) -> &'static str {
        match self {
            Rank::Iron => "Iron",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
            Rank::Jade => "Jade",
            Rank::Master => "Master",
            Rank::Grandmaster => "Grandmaster",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Rank::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| ReportError::UnknownRank(s.to_string()))
    }
}

// ── Discipline ────────────────────────────────────────────────────────────────

/// Graph colours for one discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartStyle {
    /// Marker colour for each merged session.
    pub dots: &'static str,
    /// Colour of the smoothed score line.
    pub continuous: &'static str,
    /// Colour of the dashed moving-average line.
    pub average: &'static str,
    /// Figure and axes background.
    pub background: &'static str,
}

const GRAPH_BACKGROUND: &str = "#7F00FF";

/// Skill focus of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Tracking,
    Clicking,
    Switching,
}

impl Discipline {
    /// Report section order.
    pub const ALL: [Discipline; 3] = [
        Discipline::Tracking,
        Discipline::Clicking,
        Discipline::Switching,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Tracking => "tracking",
            Discipline::Clicking => "clicking",
            Discipline::Switching => "switching",
        }
    }

    /// Section heading.
    pub fn title(&self) -> &'static str {
        match self {
            Discipline::Tracking => "Tracking",
            Discipline::Clicking => "Clicking",
            Discipline::Switching => "Switching",
        }
    }

    /// Graph colours for scenarios of this discipline.
    pub fn style(&self) -> ChartStyle {
        match self {
            Discipline::Tracking => ChartStyle {
                dots: "#E0FFFF",
                continuous: "#00FFFF",
                average: "#87CEFA",
                background: GRAPH_BACKGROUND,
            },
            Discipline::Clicking => ChartStyle {
                dots: "#FBCEB1",
                continuous: "#E62020",
                average: "#A52A2A",
                background: GRAPH_BACKGROUND,
            },
            Discipline::Switching => ChartStyle {
                dots: "#dcbaff",
                continuous: "#7f00ff",
                average: "#a055ed",
                background: GRAPH_BACKGROUND,
            },
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Scenario names of one rank tier, grouped by discipline. Order within each
/// list is the order scenarios appear in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPlaylist {
    #[serde(default)]
    pub tracking: Vec<String>,
    #[serde(default)]
    pub clicking: Vec<String>,
    #[serde(default)]
    pub switching: Vec<String>,
}

impl RankPlaylist {
    /// Scenario names for `discipline`.
    pub fn scenarios(&self, discipline: Discipline) -> &[String] {
        match discipline {
            Discipline::Tracking => &self.tracking,
            Discipline::Clicking => &self.clicking,
            Discipline::Switching => &self.switching,
        }
    }

    /// Total number of scenarios across all disciplines.
    pub fn len(&self) -> usize {
        self.tracking.len() + self.clicking.len() + self.switching.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The scenario definition document, loaded once per run and shared by
/// reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistCatalog {
    ranks: BTreeMap<Rank, RankPlaylist>,
}

impl PlaylistCatalog {
    /// Parse a catalog from its JSON text.
    ///
    /// Every key must be a rank name.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, RankPlaylist> = serde_json::from_str(text)?;
        let mut ranks = BTreeMap::new();
        for (key, playlist) in raw {
            ranks.insert(key.parse::<Rank>()?, playlist);
        }
        Ok(Self { ranks })
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Playlist for `rank`, if the catalog defines one.
    pub fn rank(&self, rank: Rank) -> Option<&RankPlaylist> {
        self.ranks.get(&rank)
    }

    /// Defined tiers, lowest first.
    pub fn ranks(&self) -> impl Iterator<Item = (Rank, &RankPlaylist)> {
        self.ranks.iter().map(|(rank, playlist)| (*rank, playlist))
    }
}
