//! # Domain Model: Hunts, Phases, and the Milestone Clock
//!
//! A [`Hunt`] is the unit of persistence: a counter, some descriptive metadata,
//! and an append-only log of [`Phase`] entries. Everything that changes a hunt
//! goes through the methods in this module so that the counter rules live in
//! one place, no matter which caller (API, CLI, import) issued the change.
//!
//! ## The Milestone Clock
//!
//! `encounters_since_milestone` counts encounters since the last phase. It is
//! derived state:
//!
//! | Operation        | Counter            | Milestone clock                          |
//! |------------------|--------------------|------------------------------------------|
//! | increment        | `+1`               | `+1`                                     |
//! | decrement        | `-1` (floor 0)     | `-1` only while positive                 |
//! | set counter      | clamp `>= 0`       | `+ (new - old)`, clamp `>= 0`            |
//! | append phase     | unchanged          | reset to `0`                             |
//! | remove phase     | unchanged          | `count - last.at_count`, or `count`      |
//!
//! The clock is never trusted across phase-list changes; it is recomputed from
//! the remaining phases.
//!
//! ## On-Disk Shape
//!
//! Records serialize as camelCase JSON. The milestone clock is written as
//! `encountersSinceLastShiny` and also read back from
//! `encountersSinceLastMilestone`.
//!
//! ## Typed Updates
//!
//! Metadata edits are expressed as [`HuntUpdate`] variants instead of an
//! open-ended partial-record merge. The counter and phase log have no update
//! variant; they change only through the dedicated operations above.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HuntError, Result};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generates `<prefix>_<unix millis>_<9 random alphanumerics>`.
///
/// The millisecond prefix keeps IDs roughly creation-ordered; the suffix makes
/// collisions within the same millisecond vanishingly unlikely.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{}_{}_{}", prefix, millis, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odds {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for Odds {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 4096,
        }
    }
}

impl Odds {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(HuntError::Invalid(
                "odds denominator must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    #[serde(default)]
    pub shiny_charm: bool,
    #[serde(default)]
    pub masuda: bool,
    #[serde(default)]
    pub chain_tier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub hunt_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub encounters: u64,
    pub encounters_per_hour: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntStats {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub pace_eph: f64,
}

/// A milestone entry. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub at_count: u64,
    pub species: String,
    pub is_target: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunt {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub method: String,
    pub target_species: String,
    #[serde(default)]
    pub base_odds: Odds,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub count: u64,
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub notes: String,
    #[serde(
        default,
        rename = "encountersSinceLastShiny",
        alias = "encountersSinceLastMilestone"
    )]
    pub encounters_since_milestone: u64,
    #[serde(default)]
    pub stats: HuntStats,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub app_version: String,
}

/// Input for [`Hunt::new`]: the caller-supplied part of a fresh hunt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHunt {
    pub name: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub method: String,
    pub target_species: String,
    #[serde(default)]
    pub base_odds: Odds,
    #[serde(default)]
    pub modifiers: Option<Modifiers>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewHunt {
    pub fn new(name: impl Into<String>, target_species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_species: target_species.into(),
            ..Default::default()
        }
    }
}

/// A single typed metadata edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum HuntUpdate {
    Name(String),
    Game(String),
    Method(String),
    TargetSpecies(String),
    BaseOdds(Odds),
    Modifiers(Modifiers),
    Notes(String),
    Archived(bool),
    Stats(HuntStats),
}

impl Hunt {
    pub fn new(data: NewHunt) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("hunt"),
            name: data.name,
            game: data.game,
            method: data.method,
            target_species: data.target_species,
            base_odds: data.base_odds,
            modifiers: data.modifiers.unwrap_or_default(),
            count: 0,
            phases: Vec::new(),
            notes: data.notes.unwrap_or_default(),
            encounters_since_milestone: 0,
            stats: HuntStats::default(),
            archived: false,
            created_at: now,
            updated_at: now,
            app_version: APP_VERSION.to_string(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn last_phase(&self) -> Option<&Phase> {
        self.phases.last()
    }

    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
        self.encounters_since_milestone = self.encounters_since_milestone.saturating_add(1);
    }

    /// Returns `false` (and changes nothing) when the counter is already zero.
    pub fn decrement(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        if self.encounters_since_milestone > 0 {
            self.encounters_since_milestone -= 1;
        }
        true
    }

    /// Sets the counter, clamping negatives to zero, and shifts the milestone
    /// clock by the same signed delta.
    pub fn set_count(&mut self, new_count: i64) {
        let new_count = new_count.max(0) as u64;
        let delta = new_count as i128 - self.count as i128;
        let clock = (self.encounters_since_milestone as i128 + delta).max(0);
        self.count = new_count;
        self.encounters_since_milestone = clock as u64;
    }

    pub fn push_phase(
        &mut self,
        species: impl Into<String>,
        is_target: bool,
        notes: Option<String>,
    ) -> &Phase {
        let phase = Phase {
            id: generate_id("phase"),
            at_count: self.count,
            species: species.into(),
            is_target,
            notes: notes.unwrap_or_default(),
            created_at: Utc::now(),
        };
        self.phases.push(phase);
        self.encounters_since_milestone = 0;
        &self.phases[self.phases.len() - 1]
    }

    /// Removes a phase by ID and recomputes the milestone clock.
    /// Returns `false` when no phase has that ID.
    pub fn remove_phase(&mut self, phase_id: &str) -> bool {
        let before = self.phases.len();
        self.phases.retain(|p| p.id != phase_id);
        if self.phases.len() == before {
            return false;
        }
        self.recompute_milestone_clock();
        true
    }

    pub fn recompute_milestone_clock(&mut self) {
        self.encounters_since_milestone = match self.phases.last() {
            Some(last) => self.count.saturating_sub(last.at_count),
            None => self.count,
        };
    }

    pub fn apply(&mut self, update: HuntUpdate) -> Result<()> {
        match update {
            HuntUpdate::Name(name) => {
                if name.trim().is_empty() {
                    return Err(HuntError::Invalid("hunt name cannot be empty".to_string()));
                }
                self.name = name;
            }
            HuntUpdate::Game(game) => self.game = game,
            HuntUpdate::Method(method) => self.method = method,
            HuntUpdate::TargetSpecies(species) => self.target_species = species,
            HuntUpdate::BaseOdds(odds) => {
                self.base_odds = Odds::new(odds.numerator, odds.denominator)?;
            }
            HuntUpdate::Modifiers(modifiers) => self.modifiers = modifiers,
            HuntUpdate::Notes(notes) => self.notes = notes,
            HuntUpdate::Archived(flag) => self.archived = flag,
            HuntUpdate::Stats(stats) => self.stats = stats,
        }
        Ok(())
    }
}
