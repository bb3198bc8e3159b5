//! Drug eligibility and reminder rules.
//!
//! Pure derived views over the session counters. Nothing here is
//! cached or stored: callers recompute on every read so the flags can
//! never drift from the counters they are derived from.

use crate::{AntiarrhythmicDrug, HypothermiaStatus, Session, Settings};

/// Snapshot of which drugs may be given right now and which reminders
/// should display.
#[derive(Clone, Debug, PartialEq)]
pub struct DrugStatus {
    /// Adrenaline is withheld entirely in severe hypothermia.
    pub adrenaline_available: bool,
    pub amiodarone_available: bool,
    pub lidocaine_available: bool,
    /// Seconds until the next adrenaline dose is due; `None` before
    /// the first dose, non-positive once due.
    pub adrenaline_due_in: Option<f64>,
    /// Second amiodarone dose reminder: fires once two further shocks
    /// have been delivered since the first dose.
    pub show_amiodarone_reminder: bool,
    pub show_amiodarone_first_dose_prompt: bool,
    /// Prompt for the first adrenaline dose after the third shock.
    pub show_adrenaline_prompt: bool,
}

/// Compute the current eligibility flags from the session and settings.
pub fn evaluate(session: &Session, settings: &Settings) -> DrugStatus {
    let hypothermia = session.hypothermia_status();
    let adrenaline_available = hypothermia != HypothermiaStatus::Severe;

    let amiodarone_shock_gate = (session.shock_count >= 3 && session.amiodarone_count == 0)
        || (session.shock_count >= 5 && session.amiodarone_count == 1);
    let amiodarone_available = amiodarone_shock_gate
        && session.antiarrhythmic_given != AntiarrhythmicDrug::Lidocaine
        && adrenaline_available;

    let lidocaine_shock_gate = (session.shock_count >= 3 && session.lidocaine_count == 0)
        || (session.shock_count >= 5 && session.lidocaine_count == 1);
    let lidocaine_available =
        lidocaine_shock_gate && session.antiarrhythmic_given != AntiarrhythmicDrug::Amiodarone;

    // Moderate hypothermia doubles the dosing interval.
    let interval = if hypothermia == HypothermiaStatus::Moderate {
        settings.adrenaline_interval_seconds * 2.0
    } else {
        settings.adrenaline_interval_seconds
    };
    let adrenaline_due_in = session
        .last_adrenaline_time
        .map(|last| interval - (session.total_time() - last));

    let show_amiodarone_reminder = session.amiodarone_count == 1
        && session
            .shock_count_at_first_amiodarone
            .map_or(false, |at_first| session.shock_count >= at_first + 2);

    DrugStatus {
        adrenaline_available,
        amiodarone_available,
        lidocaine_available,
        adrenaline_due_in,
        show_amiodarone_reminder,
        show_amiodarone_first_dose_prompt: amiodarone_available && session.amiodarone_count == 0,
        show_adrenaline_prompt: session.shock_count >= 3
            && session.adrenaline_count == 0
            && adrenaline_available,
    }
}
