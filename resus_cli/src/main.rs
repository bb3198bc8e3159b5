use clap::{Parser, Subcommand};
use resus_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "eresus")]
#[command(about = "Cardiac arrest timer and event logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the arrest episode
    Start,

    /// Refresh the session clock and CPR cycle
    Tick,

    /// Show the current session state
    Status,

    /// Pause CPR for rhythm analysis
    Analyse,

    /// Record the analysed rhythm
    Rhythm {
        /// Rhythm name (e.g. VF, VT, PEA, Asystole)
        rhythm: String,

        /// The rhythm is shockable
        #[arg(long)]
        shockable: bool,
    },

    /// Deliver a defibrillation shock
    Shock,

    /// Log an adrenaline dose
    Adrenaline {
        /// Patient age band (adult, paediatric, neonate) for the dosage hint
        #[arg(long)]
        age: Option<String>,
    },

    /// Log an amiodarone dose
    Amiodarone {
        /// Patient age band (adult, paediatric, neonate) for the dosage hint
        #[arg(long)]
        age: Option<String>,
    },

    /// Log a lidocaine dose
    Lidocaine,

    /// List the medications offered by the other-drug picker
    Drugs,

    /// Log any other drug by name
    Drug {
        /// Drug name
        name: String,

        /// Free-text dosage to embed in the event
        #[arg(long)]
        dosage: Option<String>,
    },

    /// Record advanced airway placement
    Airway,

    /// Record an end-tidal CO2 reading (mmHg)
    Etco2 { value: String },

    /// Record return of spontaneous circulation
    Rosc,

    /// Record a re-arrest after ROSC
    Rearrest,

    /// End the arrest (patient deceased)
    End,

    /// Add pre-arrival time to the session clock
    Offset {
        /// Minutes to add
        minutes: f64,
    },

    /// Toggle a reversible cause (4H/4T) checklist item
    Cause {
        /// Item id (e.g. hypoxia, toxins, tamponade)
        id: String,
    },

    /// Set the hypothermia temperature band
    Hypothermia {
        /// One of: none, severe, moderate, normothermic
        status: String,
    },

    /// Toggle a post-ROSC task
    RoscTask { id: String },

    /// Toggle a post-mortem task
    MortemTask { id: String },

    /// Undo the most recent action
    Undo,

    /// Print the plain-text event summary
    Summary,

    /// Reset the session to pending defaults
    Reset {
        /// Append the finished episode to the archive first
        #[arg(long)]
        archive: bool,

        /// Print the event summary before clearing
        #[arg(long)]
        summary: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    resus_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let device_id = load_device_id(&data_dir)?;
    let gateway = FileGateway::new(&data_dir, &device_id);
    let undo_path = data_dir.join(&device_id).join("undo.json");

    let mut engine = ArrestEngine::new(SystemClock, gateway, config.session.clone());
    engine.hydrate();
    // Every invocation refreshes the clock before acting, so a command
    // issued after a long gap still sees accurate elapsed time.
    let cue = engine.tick();

    // Captured up front, written into the undo slot only once the
    // action succeeds. A rejected action must not overwrite the slot:
    // that would replace the prior real action's snapshot with a copy
    // of the live state and make it un-undoable.
    let pre_action = engine.document();

    match cli.command {
        Commands::Start => {
            engine.start_arrest()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Arrest started");
            print_status(&engine);
        }
        Commands::Tick => {
            match cue {
                Some(CprCue::CycleComplete) => println!("✓ CPR cycle complete - rotate compressor"),
                Some(CprCue::NearingEnd) => println!("! CPR cycle nearing end"),
                None => {}
            }
            print_status(&engine);
        }
        Commands::Status => print_status(&engine),
        Commands::Analyse => {
            engine.analyse_rhythm()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Analysing rhythm - CPR paused");
        }
        Commands::Rhythm { rhythm, shockable } => {
            engine.log_rhythm(&rhythm, shockable)?;
            save_undo_slot(&undo_path, &pre_action)?;
            if shockable {
                println!("✓ Rhythm logged: {} - shock advised", rhythm);
            } else {
                println!("✓ Rhythm logged: {} - resuming CPR", rhythm);
            }
        }
        Commands::Shock => {
            engine.deliver_shock()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Shock {} delivered - resuming CPR", engine.session().shock_count);
        }
        Commands::Adrenaline { age } => {
            let dose = resolve_age(&mut engine, age.as_deref())?
                .map(dosage::adrenaline_dose);
            engine.log_adrenaline(dose)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!(
                "✓ Adrenaline logged - dose {}",
                engine.session().adrenaline_count
            );
        }
        Commands::Amiodarone { age } => {
            let dose_number = engine.session().amiodarone_count + 1;
            let dose = match resolve_age(&mut engine, age.as_deref())? {
                Some(age) => dosage::amiodarone_dose(age, dose_number),
                None => None,
            };
            engine.log_amiodarone(dose)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!(
                "✓ Amiodarone logged - dose {}",
                engine.session().amiodarone_count
            );
        }
        Commands::Lidocaine => {
            engine.log_lidocaine(None)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!(
                "✓ Lidocaine logged - dose {}",
                engine.session().lidocaine_count
            );
        }
        Commands::Drugs => {
            for drug in templates::OTHER_DRUGS.iter() {
                println!("  {}", drug);
            }
        }
        Commands::Drug { name, dosage } => {
            engine.log_other_drug(&name, dosage.as_deref())?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ {} logged", name);
        }
        Commands::Airway => {
            engine.log_airway_placed()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Advanced airway placed");
        }
        Commands::Etco2 { value } => {
            engine.log_etco2(&value)?;
            save_undo_slot(&undo_path, &pre_action)?;
            // Invalid readings are dropped without an event; say so.
            if value.trim().parse::<f64>().map_or(true, |v| v <= 0.0) {
                println!("Ignored non-positive ETCO2 reading");
            } else {
                println!("✓ ETCO2 {} mmHg logged", value.trim());
            }
        }
        Commands::Rosc => {
            engine.achieve_rosc()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ ROSC achieved");
            print_status(&engine);
        }
        Commands::Rearrest => {
            engine.re_arrest()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Re-arrest recorded - CPR resumed");
        }
        Commands::End => {
            engine.end_arrest()?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Arrest ended");
        }
        Commands::Offset { minutes } => {
            engine.add_time_offset(minutes * 60.0)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Added {} min to the session clock", minutes);
            print_status(&engine);
        }
        Commands::Cause { id } => {
            engine.toggle_reversible_cause(&id)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Toggled reversible cause '{}'", id);
        }
        Commands::Hypothermia { status } => {
            let status = parse_hypothermia(&status)?;
            engine.set_hypothermia_status(status)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Hypothermia status set to {}", status);
        }
        Commands::RoscTask { id } => {
            engine.toggle_post_rosc_task(&id)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Toggled post-ROSC task '{}'", id);
        }
        Commands::MortemTask { id } => {
            engine.toggle_post_mortem_task(&id)?;
            save_undo_slot(&undo_path, &pre_action)?;
            println!("✓ Toggled post-mortem task '{}'", id);
        }
        Commands::Undo => cmd_undo(&undo_path, engine.gateway())?,
        Commands::Summary => println!("{}", engine.summary_text()),
        Commands::Reset { archive, summary } => {
            if let Some(text) = engine.perform_reset(archive, summary) {
                println!("{}\n", text);
            }
            // A reset also invalidates the cross-invocation undo slot.
            if undo_path.exists() {
                std::fs::remove_file(&undo_path)?;
            }
            println!("✓ Session reset");
        }
    }

    Ok(())
}

/// Write the pre-action document into the one-deep undo slot so the
/// next `undo` invocation can step back across processes. Each
/// successful mutating command overwrites it.
fn save_undo_slot(undo_path: &Path, doc: &ArrestDocument) -> Result<()> {
    if let Some(parent) = undo_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(undo_path, serde_json::to_string(doc)?)?;
    Ok(())
}

fn cmd_undo(undo_path: &Path, gateway: &FileGateway) -> Result<()> {
    if !undo_path.exists() {
        println!("Nothing to undo.");
        return Ok(());
    }

    let contents = std::fs::read_to_string(undo_path)?;
    let doc: ArrestDocument = serde_json::from_str(&contents)?;
    gateway.save(&doc)?;
    std::fs::remove_file(undo_path)?;
    println!("✓ Last action undone");
    Ok(())
}

/// Parse an age band and remember it on the session. Dosage hints only
/// appear when the age is known and dosage prompts are enabled.
fn resolve_age<C: Clock, G: PersistenceGateway>(
    engine: &mut ArrestEngine<C, G>,
    age: Option<&str>,
) -> Result<Option<PatientAgeCategory>> {
    let category = match age {
        Some(a) => Some(parse_age(a)?),
        None => engine.session().patient_age_category,
    };
    if let Some(category) = category {
        engine.set_patient_age_category(category);
    }
    Ok(category)
}

fn parse_age(value: &str) -> Result<PatientAgeCategory> {
    match value.to_lowercase().as_str() {
        "adult" => Ok(PatientAgeCategory::Adult),
        "paediatric" | "pediatric" | "child" => Ok(PatientAgeCategory::Paediatric),
        "neonate" => Ok(PatientAgeCategory::Neonate),
        other => Err(Error::InvalidAction(format!(
            "unknown age category '{}' (expected adult, paediatric, or neonate)",
            other
        ))),
    }
}

fn parse_hypothermia(value: &str) -> Result<HypothermiaStatus> {
    match value.to_lowercase().as_str() {
        "none" => Ok(HypothermiaStatus::None),
        "severe" => Ok(HypothermiaStatus::Severe),
        "moderate" => Ok(HypothermiaStatus::Moderate),
        "normothermic" => Ok(HypothermiaStatus::Normothermic),
        other => Err(Error::InvalidAction(format!(
            "unknown hypothermia status '{}' (expected none, severe, moderate, or normothermic)",
            other
        ))),
    }
}

fn print_status<C: Clock, G: PersistenceGateway>(engine: &ArrestEngine<C, G>) {
    let session = engine.session();
    println!();
    println!("  Phase:       {}", session.phase);
    println!("  Total time:  {}", summary::format_clock(session.total_time()));

    if session.phase == ArrestPhase::Active {
        if session.ui_state == UiState::Default {
            println!(
                "  CPR cycle:   {} remaining",
                summary::format_clock(session.cpr_countdown)
            );
        } else {
            println!("  CPR paused:  {:?}", session.ui_state);
        }
    }

    println!("  Shocks:      {}", session.shock_count);
    println!("  Adrenaline:  {}", session.adrenaline_count);
    if session.airway_placed {
        println!("  Airway:      placed");
    }

    let status = engine.drug_status();
    if let Some(due_in) = status.adrenaline_due_in {
        if due_in <= 0.0 {
            println!("  ! Adrenaline due now");
        } else {
            println!("  Next adrenaline in {}", summary::format_clock(due_in));
        }
    }
    if status.show_adrenaline_prompt {
        println!("  ! Consider adrenaline (3 shocks delivered)");
    }
    if status.show_amiodarone_first_dose_prompt {
        println!("  ! Consider amiodarone (first dose)");
    }
    if status.show_amiodarone_reminder {
        println!("  ! Consider second amiodarone dose");
    }
    if !status.adrenaline_available {
        println!("  ! Adrenaline withheld (severe hypothermia)");
    }
    println!();
}
