//! The arrest session state machine.
//!
//! `ArrestEngine` owns the `Session` aggregate, the event log, the
//! undo history, and the persistence gateway, and orchestrates every
//! mutating clinical action. Each action follows the same sequence:
//! push an undo snapshot, mutate the session, append an event, request
//! a best-effort save. The 1 Hz `tick` recomputes elapsed time from
//! wall-clock deltas and drives the CPR cycle countdown.
//!
//! The engine is single-threaded by design: one action at a time, no
//! locking. Persistence failures are logged and absorbed; only
//! phase-precondition violations surface as errors.

use crate::clock::{elapsed_seconds, Clock};
use crate::persistence::{ArrestDocument, PersistenceGateway};
use crate::policy::{self, DrugStatus};
use crate::undo::{Snapshot, UndoHistory};
use crate::{
    summary, templates, AntiarrhythmicDrug, ArrestPhase, ChecklistItem, CprCue, Error, Event,
    EventKind, EventLog, HypothermiaStatus, PatientAgeCategory, Result, Settings, UiState,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Countdown tolerance for tick jitter: a cycle is complete once the
/// remaining time drops below -0.9 s, not exactly at zero.
const CYCLE_COMPLETE_TOLERANCE: f64 = -0.9;

/// Seconds before cycle end at which the nearing-end cue starts.
const NEARING_END_WINDOW: f64 = 10.0;

/// The central session aggregate. Owned exclusively by the engine;
/// external code reads it through `ArrestEngine::session`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub phase: ArrestPhase,
    pub ui_state: UiState,
    /// Wall-clock instant the episode started; captured once per
    /// episode, shifted back by any pre-entered offset.
    pub started_at: Option<DateTime<Utc>>,
    /// Whole seconds since `started_at`, recomputed on every tick.
    pub elapsed_seconds: f64,
    /// Operator-entered manual adjustment (pre-arrival time).
    pub time_offset_seconds: f64,
    /// Displayed CPR countdown, in seconds.
    pub cpr_countdown: f64,
    /// `total_time` at which the current CPR cycle began.
    pub cpr_cycle_anchor: f64,
    pub shock_count: u32,
    pub adrenaline_count: u32,
    pub amiodarone_count: u32,
    pub lidocaine_count: u32,
    pub last_adrenaline_time: Option<f64>,
    pub antiarrhythmic_given: AntiarrhythmicDrug,
    pub shock_count_at_first_amiodarone: Option<u32>,
    pub airway_placed: bool,
    pub reversible_causes: Vec<ChecklistItem>,
    pub post_rosc_tasks: Vec<ChecklistItem>,
    pub post_mortem_tasks: Vec<ChecklistItem>,
    pub patient_age_category: Option<PatientAgeCategory>,
}

impl Session {
    /// A pending session with all counters zeroed and checklists at
    /// their template defaults.
    pub fn fresh(settings: &Settings) -> Self {
        Self {
            phase: ArrestPhase::Pending,
            ui_state: UiState::Default,
            started_at: None,
            elapsed_seconds: 0.0,
            time_offset_seconds: 0.0,
            cpr_countdown: settings.cpr_cycle_duration_seconds,
            cpr_cycle_anchor: 0.0,
            shock_count: 0,
            adrenaline_count: 0,
            amiodarone_count: 0,
            lidocaine_count: 0,
            last_adrenaline_time: None,
            antiarrhythmic_given: AntiarrhythmicDrug::None,
            shock_count_at_first_amiodarone: None,
            airway_placed: false,
            reversible_causes: templates::reversible_causes(),
            post_rosc_tasks: templates::post_rosc_tasks(),
            post_mortem_tasks: templates::post_mortem_tasks(),
            patient_age_category: None,
        }
    }

    /// Total clinical time: elapsed plus the manual offset.
    pub fn total_time(&self) -> f64 {
        self.elapsed_seconds + self.time_offset_seconds
    }

    /// Temperature banding from the hypothermia reversible cause.
    pub fn hypothermia_status(&self) -> HypothermiaStatus {
        self.reversible_causes
            .iter()
            .find(|c| c.id == "hypothermia")
            .map(|c| c.hypothermia_status)
            .unwrap_or_default()
    }
}

/// State machine driving one resuscitation episode.
pub struct ArrestEngine<C: Clock, G: PersistenceGateway> {
    clock: C,
    gateway: G,
    settings: Settings,
    session: Session,
    events: EventLog,
    undo: UndoHistory,
}

impl<C: Clock, G: PersistenceGateway> ArrestEngine<C, G> {
    pub fn new(clock: C, gateway: G, settings: Settings) -> Self {
        let session = Session::fresh(&settings);
        Self {
            clock,
            gateway,
            settings,
            session,
            events: EventLog::new(),
            undo: UndoHistory::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn total_time(&self) -> f64 {
        self.session.total_time()
    }

    /// Derived drug eligibility and reminders. Recomputed on every
    /// call; never cached.
    pub fn drug_status(&self) -> DrugStatus {
        policy::evaluate(&self.session, &self.settings)
    }

    /// Plain-text event summary for clipboard export.
    pub fn summary_text(&self) -> String {
        summary::render(self.session.total_time(), &self.events)
    }

    /// Full document for the persistence gateway.
    pub fn document(&self) -> ArrestDocument {
        let s = &self.session;
        let final_outcome = match s.phase {
            ArrestPhase::Rosc => "ROSC",
            ArrestPhase::Ended => "Deceased",
            _ => "Incomplete",
        };
        ArrestDocument {
            start_time: s.started_at,
            total_duration: s.total_time(),
            final_outcome: final_outcome.into(),
            events: self.events.clone(),
            arrest_state: s.phase,
            ui_state: s.ui_state,
            elapsed_seconds: s.elapsed_seconds,
            time_offset: s.time_offset_seconds,
            cpr_countdown: Some(s.cpr_countdown),
            cpr_cycle_anchor: s.cpr_cycle_anchor,
            shock_count: s.shock_count,
            adrenaline_count: s.adrenaline_count,
            amiodarone_count: s.amiodarone_count,
            lidocaine_count: s.lidocaine_count,
            airway_placed: s.airway_placed,
            antiarrhythmic_given: s.antiarrhythmic_given,
            last_adrenaline_time: s.last_adrenaline_time,
            shock_count_at_first_amiodarone: s.shock_count_at_first_amiodarone,
            reversible_causes: Some(s.reversible_causes.clone()),
            post_rosc_tasks: Some(s.post_rosc_tasks.clone()),
            post_mortem_tasks: Some(s.post_mortem_tasks.clone()),
            patient_age_category: s.patient_age_category,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restore a stored document, but only into a fresh session: local
    /// phase must still be `Pending` with no start instant, and the
    /// stored document must belong to a started episode. An in-progress
    /// local session is never clobbered.
    pub fn hydrate(&mut self) {
        let doc = match self.gateway.load_once() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Failed to load stored session: {}. Starting fresh.", e);
                None
            }
        };
        let Some(doc) = doc else { return };

        if self.session.phase != ArrestPhase::Pending
            || self.session.started_at.is_some()
            || doc.start_time.is_none()
        {
            tracing::debug!("Local session not fresh or stored episode never started; skipping restore");
            return;
        }

        let s = &mut self.session;
        s.phase = doc.arrest_state;
        s.ui_state = doc.ui_state;
        s.started_at = doc.start_time;
        s.elapsed_seconds = doc.elapsed_seconds;
        s.time_offset_seconds = doc.time_offset;
        s.cpr_countdown = doc
            .cpr_countdown
            .unwrap_or(self.settings.cpr_cycle_duration_seconds);
        s.cpr_cycle_anchor = doc.cpr_cycle_anchor;
        s.shock_count = doc.shock_count;
        s.adrenaline_count = doc.adrenaline_count;
        s.amiodarone_count = doc.amiodarone_count;
        s.lidocaine_count = doc.lidocaine_count;
        s.airway_placed = doc.airway_placed;
        s.antiarrhythmic_given = doc.antiarrhythmic_given;
        s.last_adrenaline_time = doc.last_adrenaline_time;
        s.shock_count_at_first_amiodarone = doc.shock_count_at_first_amiodarone;
        s.reversible_causes = doc
            .reversible_causes
            .unwrap_or_else(templates::reversible_causes);
        s.post_rosc_tasks = doc.post_rosc_tasks.unwrap_or_else(templates::post_rosc_tasks);
        s.post_mortem_tasks = doc
            .post_mortem_tasks
            .unwrap_or_else(templates::post_mortem_tasks);
        s.patient_age_category = doc.patient_age_category;
        self.events = doc.events;
        tracing::info!("Restored in-progress session from storage");
    }

    /// Replace the live timing parameters. A change while `Pending`
    /// resets the displayed countdown; during active CPR the countdown
    /// is recalculated as the new duration minus time already elapsed
    /// in the cycle.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        match self.session.phase {
            ArrestPhase::Pending => {
                self.session.cpr_countdown = self.settings.cpr_cycle_duration_seconds;
            }
            ArrestPhase::Active if self.session.ui_state == UiState::Default => {
                let elapsed_in_cycle = self.session.total_time() - self.session.cpr_cycle_anchor;
                self.session.cpr_countdown =
                    self.settings.cpr_cycle_duration_seconds - elapsed_in_cycle;
            }
            _ => {}
        }
    }

    /// Periodic 1 Hz tick. Recomputes elapsed time from the wall clock
    /// (tolerant of missed ticks) and advances the CPR cycle while the
    /// session is in active CPR. No-op in `Pending`/`Ended`, so calling
    /// it on a stopped session is always safe.
    pub fn tick(&mut self) -> Option<CprCue> {
        if !matches!(self.session.phase, ArrestPhase::Active | ArrestPhase::Rosc) {
            return None;
        }
        let start = self.session.started_at?;
        self.session.elapsed_seconds = elapsed_seconds(start, self.clock.now());

        if self.session.phase == ArrestPhase::Active && self.session.ui_state == UiState::Default {
            let total = self.session.total_time();
            let remaining =
                self.settings.cpr_cycle_duration_seconds - (total - self.session.cpr_cycle_anchor);

            if remaining < CYCLE_COMPLETE_TOLERANCE {
                self.log_event("CPR Cycle Complete", EventKind::Cpr, total);
                self.session.cpr_cycle_anchor = total;
                self.session.cpr_countdown = self.settings.cpr_cycle_duration_seconds;
                return Some(CprCue::CycleComplete);
            }

            self.session.cpr_countdown = remaining;
            if remaining > 0.0 && remaining <= NEARING_END_WINDOW {
                // Window check, not edge detection: the cue re-fires on
                // every tick spent inside the final 10 seconds.
                return Some(CprCue::NearingEnd);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Phase transitions
    // ------------------------------------------------------------------

    /// Begin the episode. The start instant is shifted back by any
    /// pre-entered offset, and the start event is stamped at the offset
    /// value rather than zero.
    pub fn start_arrest(&mut self) -> Result<()> {
        self.require(self.session.phase == ArrestPhase::Pending, "start_arrest")?;
        self.push_undo();

        let now = self.clock.now();
        let offset = self.session.time_offset_seconds;
        self.session.started_at = Some(now - Duration::milliseconds((offset * 1000.0) as i64));
        self.session.phase = ArrestPhase::Active;
        self.session.cpr_cycle_anchor = offset;
        self.session.cpr_countdown = self.settings.cpr_cycle_duration_seconds;

        self.log_event(
            format!("Arrest Started at {}", now.format("%H:%M:%S")),
            EventKind::Status,
            offset,
        );
        Ok(())
    }

    /// Pause CPR for rhythm analysis.
    pub fn analyse_rhythm(&mut self) -> Result<()> {
        self.require(
            self.session.phase == ArrestPhase::Active && self.session.ui_state == UiState::Default,
            "analyse_rhythm",
        )?;
        self.push_undo();
        self.session.ui_state = UiState::Analyzing;
        self.log_event(
            "Rhythm analysis. Pausing CPR.",
            EventKind::Analysis,
            self.session.total_time(),
        );
        Ok(())
    }

    /// Record the analysed rhythm. Shockable rhythms advance to
    /// shock-advised; otherwise CPR resumes immediately.
    pub fn log_rhythm(&mut self, rhythm: &str, shockable: bool) -> Result<()> {
        self.require(
            self.session.phase == ArrestPhase::Active
                && self.session.ui_state == UiState::Analyzing,
            "log_rhythm",
        )?;
        self.push_undo();
        self.log_event(
            format!("Rhythm is {rhythm}"),
            EventKind::Rhythm,
            self.session.total_time(),
        );
        if shockable {
            self.session.ui_state = UiState::ShockAdvised;
            self.persist();
        } else {
            self.resume_cpr();
        }
        Ok(())
    }

    /// Deliver a defibrillation shock and resume CPR.
    pub fn deliver_shock(&mut self) -> Result<()> {
        self.require(
            self.session.phase == ArrestPhase::Active
                && self.session.ui_state == UiState::ShockAdvised,
            "deliver_shock",
        )?;
        self.push_undo();
        self.session.shock_count += 1;
        self.log_event(
            format!("Shock {} Delivered", self.session.shock_count),
            EventKind::Shock,
            self.session.total_time(),
        );
        self.resume_cpr();
        Ok(())
    }

    /// Return of spontaneous circulation.
    pub fn achieve_rosc(&mut self) -> Result<()> {
        self.require(self.session.phase == ArrestPhase::Active, "achieve_rosc")?;
        self.push_undo();
        self.session.phase = ArrestPhase::Rosc;
        self.session.ui_state = UiState::Default;
        self.log_event(
            "Return of Spontaneous Circulation (ROSC)",
            EventKind::Status,
            self.session.total_time(),
        );
        Ok(())
    }

    /// The patient re-arrests after ROSC. The CPR cycle anchor is
    /// recomputed from a fresh clock read, not the last tick's value,
    /// since the action can land between ticks.
    pub fn re_arrest(&mut self) -> Result<()> {
        self.require(self.session.phase == ArrestPhase::Rosc, "re_arrest")?;
        self.push_undo();
        self.session.phase = ArrestPhase::Active;
        self.refresh_elapsed();
        let total = self.session.total_time();
        self.session.cpr_cycle_anchor = total;
        self.session.cpr_countdown = self.settings.cpr_cycle_duration_seconds;
        self.log_event("Patient Re-Arrested. CPR Resumed.", EventKind::Status, total);
        Ok(())
    }

    /// End the episode. Terminal for the episode; only `perform_reset`
    /// leaves this phase.
    pub fn end_arrest(&mut self) -> Result<()> {
        self.require(
            matches!(self.session.phase, ArrestPhase::Active | ArrestPhase::Rosc),
            "end_arrest",
        )?;
        self.push_undo();
        self.session.phase = ArrestPhase::Ended;
        self.log_event(
            "Arrest Ended (Patient Deceased)",
            EventKind::Status,
            self.session.total_time(),
        );
        Ok(())
    }

    /// Add operator-entered pre-arrival time. The event is stamped at
    /// the pre-addition total: the offset shifts future computation,
    /// not its own log entry.
    pub fn add_time_offset(&mut self, seconds: f64) -> Result<()> {
        self.require(
            matches!(self.session.phase, ArrestPhase::Pending | ArrestPhase::Active),
            "add_time_offset",
        )?;
        if seconds <= 0.0 {
            return Err(Error::InvalidAction(
                "time offset must be a positive number of seconds".into(),
            ));
        }
        self.push_undo();
        let stamp = self.session.total_time();
        self.session.time_offset_seconds += seconds;
        self.log_event(
            format!("Time offset added: +{} min", seconds / 60.0),
            EventKind::Status,
            stamp,
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drug and intervention logging
    // ------------------------------------------------------------------

    pub fn log_adrenaline(&mut self, dosage: Option<&str>) -> Result<()> {
        self.require_in_arrest("log_adrenaline")?;
        self.push_undo();
        self.session.adrenaline_count += 1;
        let total = self.session.total_time();
        self.session.last_adrenaline_time = Some(total);
        let message = format!(
            "Adrenaline{} Given - Dose {}",
            self.dosage_text(dosage),
            self.session.adrenaline_count
        );
        self.log_event(message, EventKind::Drug, total);
        Ok(())
    }

    pub fn log_amiodarone(&mut self, dosage: Option<&str>) -> Result<()> {
        self.require_in_arrest("log_amiodarone")?;
        self.push_undo();
        self.session.amiodarone_count += 1;
        self.session.antiarrhythmic_given = AntiarrhythmicDrug::Amiodarone;
        if self.session.amiodarone_count == 1 {
            // First dose: remember the shock count so the second-dose
            // reminder can trigger two shocks later.
            self.session.shock_count_at_first_amiodarone = Some(self.session.shock_count);
        }
        let message = format!(
            "Amiodarone{} Given - Dose {}",
            self.dosage_text(dosage),
            self.session.amiodarone_count
        );
        self.log_event(message, EventKind::Drug, self.session.total_time());
        Ok(())
    }

    pub fn log_lidocaine(&mut self, dosage: Option<&str>) -> Result<()> {
        self.require_in_arrest("log_lidocaine")?;
        self.push_undo();
        self.session.lidocaine_count += 1;
        self.session.antiarrhythmic_given = AntiarrhythmicDrug::Lidocaine;
        let message = format!(
            "Lidocaine{} Given - Dose {}",
            self.dosage_text(dosage),
            self.session.lidocaine_count
        );
        self.log_event(message, EventKind::Drug, self.session.total_time());
        Ok(())
    }

    pub fn log_other_drug(&mut self, drug: &str, dosage: Option<&str>) -> Result<()> {
        self.require_in_arrest("log_other_drug")?;
        self.push_undo();
        let message = format!("{drug}{} Given", self.dosage_text(dosage));
        self.log_event(message, EventKind::Drug, self.session.total_time());
        Ok(())
    }

    /// Record advanced airway placement. One-way within an episode.
    pub fn log_airway_placed(&mut self) -> Result<()> {
        self.require_in_arrest("log_airway_placed")?;
        self.push_undo();
        self.session.airway_placed = true;
        self.log_event(
            "Advanced Airway Placed",
            EventKind::Airway,
            self.session.total_time(),
        );
        Ok(())
    }

    /// Record an end-tidal CO2 reading. Empty or non-positive input is
    /// silently discarded: no event, no error.
    pub fn log_etco2(&mut self, value: &str) -> Result<()> {
        self.require_in_arrest("log_etco2")?;
        self.push_undo();
        let value = value.trim();
        if value.parse::<f64>().map_or(false, |v| v > 0.0) {
            self.log_event(
                format!("ETCO2: {value} mmHg"),
                EventKind::Etco2,
                self.session.total_time(),
            );
        } else {
            tracing::debug!("Discarding invalid ETCO2 reading {:?}", value);
        }
        Ok(())
    }

    /// Remember the age band confirmed with a dose. Cleared only by
    /// reset.
    pub fn set_patient_age_category(&mut self, age: PatientAgeCategory) {
        self.session.patient_age_category = Some(age);
    }

    // ------------------------------------------------------------------
    // Checklists
    // ------------------------------------------------------------------

    pub fn toggle_reversible_cause(&mut self, id: &str) -> Result<()> {
        let (name, completed) = Self::toggle_precheck(&self.session.reversible_causes, id)?;
        self.push_undo();
        Self::set_completed(&mut self.session.reversible_causes, id, completed);
        let state = if completed { "checked" } else { "unchecked" };
        self.log_event(
            format!("{name} {state}"),
            EventKind::Cause,
            self.session.total_time(),
        );
        Ok(())
    }

    /// Set the hypothermia temperature band. Completion of the
    /// checklist item is derived: any non-`None` status marks it done.
    pub fn set_hypothermia_status(&mut self, status: HypothermiaStatus) -> Result<()> {
        let index = self
            .session
            .reversible_causes
            .iter()
            .position(|c| c.id == "hypothermia")
            .ok_or_else(|| Error::Other("hypothermia checklist item missing".into()))?;
        self.push_undo();
        let item = &mut self.session.reversible_causes[index];
        item.hypothermia_status = status;
        item.is_completed = status != HypothermiaStatus::None;
        self.log_event(
            format!("Hypothermia status set to: {status}"),
            EventKind::Cause,
            self.session.total_time(),
        );
        Ok(())
    }

    pub fn toggle_post_rosc_task(&mut self, id: &str) -> Result<()> {
        let (name, completed) = Self::toggle_precheck(&self.session.post_rosc_tasks, id)?;
        self.push_undo();
        Self::set_completed(&mut self.session.post_rosc_tasks, id, completed);
        let state = if completed { "checked" } else { "unchecked" };
        self.log_event(
            format!("Post-ROSC task: {name} {state}"),
            EventKind::Status,
            self.session.total_time(),
        );
        Ok(())
    }

    pub fn toggle_post_mortem_task(&mut self, id: &str) -> Result<()> {
        let (name, completed) = Self::toggle_precheck(&self.session.post_mortem_tasks, id)?;
        self.push_undo();
        Self::set_completed(&mut self.session.post_mortem_tasks, id, completed);
        let state = if completed { "checked" } else { "unchecked" };
        self.log_event(
            format!("Post-mortem task: {name} {state}"),
            EventKind::Status,
            self.session.total_time(),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Undo and reset
    // ------------------------------------------------------------------

    /// Step back to the state before the most recent mutating action.
    /// Returns `false` (a no-op, not an error) when the history is
    /// empty.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(snapshot) => {
                self.session = snapshot.session;
                self.events = snapshot.events;
                self.persist();
                true
            }
            None => {
                tracing::debug!("Undo requested with empty history");
                false
            }
        }
    }

    /// Return the session to its pending defaults, optionally archiving
    /// the finished episode and/or returning the summary text for
    /// export. Archive and storage failures are logged and never block
    /// the reset itself.
    pub fn perform_reset(
        &mut self,
        should_archive: bool,
        should_export_summary: bool,
    ) -> Option<String> {
        let summary = should_export_summary.then(|| self.summary_text());

        if should_archive && self.session.started_at.is_some() {
            if let Err(e) = self.gateway.archive(&self.document()) {
                tracing::warn!("Failed to archive episode: {}", e);
            }
        }
        if let Err(e) = self.gateway.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }

        self.session = Session::fresh(&self.settings);
        self.events.clear();
        self.undo.clear();
        tracing::info!("Session reset to pending defaults");
        summary
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resume CPR after analysis or a shock. Reads the clock afresh so
    /// the new cycle anchor is exact even when no tick has fired since
    /// the last action.
    fn resume_cpr(&mut self) {
        self.session.ui_state = UiState::Default;
        self.refresh_elapsed();
        let total = self.session.total_time();
        self.session.cpr_cycle_anchor = total;
        self.session.cpr_countdown = self.settings.cpr_cycle_duration_seconds;
        self.log_event("Resuming CPR.", EventKind::Cpr, total);
    }

    fn refresh_elapsed(&mut self) {
        if let Some(start) = self.session.started_at {
            self.session.elapsed_seconds = elapsed_seconds(start, self.clock.now());
        }
    }

    fn push_undo(&mut self) {
        self.undo.push(Snapshot {
            session: self.session.clone(),
            events: self.events.clone(),
        });
    }

    fn log_event(&mut self, message: impl Into<String>, kind: EventKind, timestamp: f64) {
        self.events.append(Event::new(message, kind, timestamp));
        self.persist();
    }

    /// Best-effort save; storage failures never reach the caller.
    fn persist(&self) {
        if let Err(e) = self.gateway.save(&self.document()) {
            tracing::warn!("Failed to persist arrest document: {}", e);
        }
    }

    fn dosage_text(&self, dosage: Option<&str>) -> String {
        match dosage {
            Some(d) if self.settings.show_dosage_prompts => format!(" ({d})"),
            _ => String::new(),
        }
    }

    fn require(&self, permitted: bool, action: &str) -> Result<()> {
        if permitted {
            Ok(())
        } else {
            Err(Error::InvalidAction(format!(
                "{action} not permitted in phase {} ({:?})",
                self.session.phase, self.session.ui_state
            )))
        }
    }

    fn require_in_arrest(&self, action: &str) -> Result<()> {
        self.require(
            matches!(self.session.phase, ArrestPhase::Active | ArrestPhase::Rosc),
            action,
        )
    }

    fn toggle_precheck(items: &[ChecklistItem], id: &str) -> Result<(String, bool)> {
        let item = items
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::InvalidAction(format!("unknown checklist item '{id}'")))?;
        Ok((item.name.clone(), !item.is_completed))
    }

    fn set_completed(items: &mut [ChecklistItem], id: &str, completed: bool) {
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.is_completed = completed;
        }
    }
}
