//! Core domain types for the arrest session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Session phase and UI sub-state
//! - Event categories
//! - Drug and hypothermia enumerations
//! - Checklist items (reversible causes, post-ROSC, post-mortem)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level status of the resuscitation episode.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArrestPhase {
    #[default]
    Pending,
    Active,
    Rosc,
    Ended,
}

impl fmt::Display for ArrestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArrestPhase::Pending => "PENDING",
            ArrestPhase::Active => "ACTIVE",
            ArrestPhase::Rosc => "ROSC",
            ArrestPhase::Ended => "ENDED",
        };
        f.write_str(s)
    }
}

/// Sub-state active only while the session is in `Active`/`Rosc`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiState {
    #[default]
    Default,
    Analyzing,
    ShockAdvised,
}

/// Category of a logged clinical event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Status,
    Cpr,
    Shock,
    Analysis,
    Rhythm,
    Drug,
    Airway,
    Etco2,
    Cause,
}

/// Which antiarrhythmic has been committed to for this episode.
///
/// Amiodarone and lidocaine are mutually exclusive; once one is given
/// the other stays unavailable until reset.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AntiarrhythmicDrug {
    #[default]
    None,
    Amiodarone,
    Lidocaine,
}

/// Temperature banding for the hypothermia reversible cause.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HypothermiaStatus {
    #[default]
    None,
    Severe,
    Moderate,
    Normothermic,
}

impl fmt::Display for HypothermiaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HypothermiaStatus::None => "NONE",
            HypothermiaStatus::Severe => "SEVERE",
            HypothermiaStatus::Moderate => "MODERATE",
            HypothermiaStatus::Normothermic => "NORMOTHERMIC",
        };
        f.write_str(s)
    }
}

/// Broad patient age banding used by the dosage policy table.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientAgeCategory {
    Adult,
    Paediatric,
    Neonate,
}

impl fmt::Display for PatientAgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatientAgeCategory::Adult => "Adult",
            PatientAgeCategory::Paediatric => "Paediatric",
            PatientAgeCategory::Neonate => "Neonate",
        };
        f.write_str(s)
    }
}

/// One entry in a clinical checklist.
///
/// `hypothermia_status` is meaningful only for the single item with id
/// `"hypothermia"`; for every other item it stays `None`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub id: String,
    pub name: String,
    pub is_completed: bool,
    #[serde(default)]
    pub hypothermia_status: HypothermiaStatus,
}

impl ChecklistItem {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_completed: false,
            hypothermia_status: HypothermiaStatus::None,
        }
    }
}

/// Audible/haptic cue emitted by the CPR cycle countdown.
///
/// `NearingEnd` re-fires on every tick while the countdown sits in the
/// final 10 seconds of the cycle; that matches the observed upstream
/// behaviour and is deliberate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CprCue {
    NearingEnd,
    CycleComplete,
}
