use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use epifriend_lib::commands::{journal, medications, report, settings};
use epifriend_lib::config;
use epifriend_lib::core_state::AppState;
use epifriend_lib::models::{
    DetailLevel, EmergencyPatch, EpisodePatch, MedicalPatch, MedicationPatch, NewEpisode,
    NewMedication, ProfilePatch,
};
use epifriend_lib::report::ReportOptions;

#[derive(Parser)]
#[command(name = "epifriend", version)]
#[command(about = "Epilepsy journal, medication schedule and clinician reports", long_about = None)]
struct Cli {
    /// Data directory (defaults to ~/EpiFriend)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and review episodes
    #[command(subcommand)]
    Episode(EpisodeCommand),
    /// Manage medications and missed doses
    #[command(subcommand)]
    Med(MedCommand),
    /// Profile, contacts, medical info and language
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Bundled medicine catalogue
    #[command(subcommand)]
    Medicines(MedicinesCommand),
    /// Clinician report
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
enum EpisodeCommand {
    Add(EpisodeFields),
    List {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: EpisodeFields,
    },
}

#[derive(Args)]
struct EpisodeFields {
    /// When it happened (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,
    #[arg(short = 't', long = "type")]
    episode_type: Option<String>,
    #[arg(long)]
    severity: Option<String>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long, value_delimiter = ',')]
    warning: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    during: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    after: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    triggers: Option<Vec<String>>,
    #[arg(long)]
    witnessed: Option<bool>,
    #[arg(long)]
    emergency_called: Option<bool>,
    #[arg(long)]
    hospital: Option<bool>,
    #[arg(long)]
    notes: Option<String>,
}

impl EpisodeFields {
    fn into_new(self) -> NewEpisode {
        NewEpisode {
            timestamp: self.at,
            episode_type: self.episode_type,
            severity: self.severity,
            duration: self.duration,
            warning_symptoms: self.warning.unwrap_or_default(),
            during_symptoms: self.during.unwrap_or_default(),
            after_symptoms: self.after.unwrap_or_default(),
            triggers: self.triggers.unwrap_or_default(),
            someone_witnessed: self.witnessed.unwrap_or(false),
            emergency_called: self.emergency_called.unwrap_or(false),
            went_to_hospital: self.hospital.unwrap_or(false),
            notes: self.notes,
        }
    }

    fn into_patch(self) -> EpisodePatch {
        EpisodePatch {
            timestamp: self.at,
            episode_type: self.episode_type,
            severity: self.severity,
            duration: self.duration,
            warning_symptoms: self.warning,
            during_symptoms: self.during,
            after_symptoms: self.after,
            triggers: self.triggers,
            someone_witnessed: self.witnessed,
            emergency_called: self.emergency_called,
            went_to_hospital: self.hospital,
            notes: self.notes,
        }
    }
}

#[derive(Subcommand)]
enum MedCommand {
    Add {
        name: String,
        dosage: String,
        #[arg(short, long, default_value = "1")]
        frequency: u32,
        /// Dose times as HH:MM
        #[arg(long, value_delimiter = ',')]
        times: Vec<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(short, long)]
        frequency: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        times: Option<Vec<String>>,
    },
    Stop {
        id: String,
    },
    List {
        /// Include stopped medications
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a dose as missed
    Miss(DoseArgs),
    /// Mark a missed dose as taken after all
    Unmiss(DoseArgs),
    /// Show each dose of a day and whether it was missed
    Missed {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Args)]
struct DoseArgs {
    id: String,
    /// Dose number within the day, starting at 1
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    dose: u32,
    /// YYYY-MM-DD; defaults to today
    #[arg(long)]
    date: Option<String>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Profile {
        #[arg(long)]
        name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        dob: Option<String>,
    },
    Emergency {
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        contact_phone: Option<String>,
        #[arg(long)]
        contact_relation: Option<String>,
        #[arg(long)]
        doctor_name: Option<String>,
        #[arg(long)]
        doctor_phone: Option<String>,
        #[arg(long)]
        neurologist_name: Option<String>,
        #[arg(long)]
        neurologist_phone: Option<String>,
    },
    Medical {
        #[arg(long)]
        notes: Option<String>,
    },
    Language {
        code: String,
    },
    AllergyAdd {
        allergy: String,
    },
    AllergyRemove {
        /// Position in the allergy list, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },
}

#[derive(Subcommand)]
enum MedicinesCommand {
    Search {
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    Export {
        /// Report options as JSON (`includeEpisodes`, `episodeDetailLevel`,
        /// `dateRange`, ...); the flags below override it
        #[arg(long)]
        options: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Date, time and type only
        #[arg(long)]
        basic: bool,
        #[arg(long)]
        no_episodes: bool,
        #[arg(long)]
        no_missed: bool,
        #[arg(long)]
        no_patient_info: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(state: &mut AppState, command: Commands) -> Result<std::result::Result<(), String>> {
    let outcome = match command {
        Commands::Episode(cmd) => match cmd {
            EpisodeCommand::Add(fields) => {
                journal::record_episode(state, fields.into_new()).map(|id| println!("{id}"))
            }
            EpisodeCommand::List { limit } => {
                print_json(&journal::recent_episodes(state, limit))?;
                Ok(())
            }
            EpisodeCommand::Update { id, fields } => {
                journal::update_episode(state, &id, fields.into_patch()).map(|_| ())
            }
        },

        Commands::Med(cmd) => match cmd {
            MedCommand::Add {
                name,
                dosage,
                frequency,
                times,
            } => {
                let med = NewMedication {
                    name,
                    dosage,
                    frequency,
                    times,
                };
                medications::add_medication(state, med).map(|id| println!("{id}"))
            }
            MedCommand::Update {
                id,
                name,
                dosage,
                frequency,
                times,
            } => {
                let patch = MedicationPatch {
                    name,
                    dosage,
                    frequency,
                    times,
                };
                medications::update_medication(state, &id, patch).map(|_| ())
            }
            MedCommand::Stop { id } => medications::stop_medication(state, &id).map(|_| ()),
            MedCommand::List { all } => {
                print_json(&medications::list_medications(state, !all))?;
                Ok(())
            }
            MedCommand::Miss(dose) => {
                medications::mark_missed(state, &dose.id, dose.dose - 1, dose.date.as_deref())
            }
            MedCommand::Unmiss(dose) => {
                medications::mark_taken(state, &dose.id, dose.dose - 1, dose.date.as_deref())
                    .map(|_| ())
            }
            MedCommand::Missed { id, date } => {
                match medications::day_overview(state, &id, date.as_deref()) {
                    Ok(overview) => {
                        print_json(&overview)?;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        },

        Commands::Settings(cmd) => match cmd {
            SettingsCommand::Show => {
                print_json(&settings::get_settings(state))?;
                Ok(())
            }
            SettingsCommand::Profile { name, dob } => settings::update_profile(
                state,
                ProfilePatch {
                    name,
                    date_of_birth: dob,
                },
            ),
            SettingsCommand::Emergency {
                contact_name,
                contact_phone,
                contact_relation,
                doctor_name,
                doctor_phone,
                neurologist_name,
                neurologist_phone,
            } => settings::update_emergency(
                state,
                EmergencyPatch {
                    contact_name,
                    contact_phone,
                    contact_relation,
                    doctor_name,
                    doctor_phone,
                    neurologist_name,
                    neurologist_phone,
                },
            ),
            SettingsCommand::Medical { notes } => settings::update_medical(
                state,
                MedicalPatch {
                    notes,
                    ..MedicalPatch::default()
                },
            ),
            SettingsCommand::Language { code } => settings::set_language(state, &code),
            SettingsCommand::AllergyAdd { allergy } => {
                settings::add_allergy(state, &allergy).map(|_| ())
            }
            SettingsCommand::AllergyRemove { position } => {
                if settings::remove_allergy(state, position as usize - 1).is_none() {
                    state.toasts.info(format!("No allergy at position {position}"));
                }
                Ok(())
            }
        },

        Commands::Medicines(MedicinesCommand::Search { query }) => {
            print_json(&medications::search_medicines(state, &query))?;
            Ok(())
        }

        Commands::Report(ReportCommand::Export {
            options,
            from,
            to,
            basic,
            no_episodes,
            no_missed,
            no_patient_info,
        }) => {
            let mut options = options
                .as_deref()
                .map(ReportOptions::from_json)
                .unwrap_or_default();
            if from.is_some() || to.is_some() {
                let mut range = options.date_range.unwrap_or_default();
                range.from = from.or(range.from);
                range.to = to.or(range.to);
                options.date_range = Some(range);
            }
            if basic {
                options.episode_detail_level = DetailLevel::Basic;
            }
            options.include_episodes &= !no_episodes;
            options.include_missed_meds &= !no_missed;
            options.include_patient_info &= !no_patient_info;
            report::export_report(state, options).map(|outcome| {
                println!("{}", outcome.path.display());
            })
        }
    };
    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    epifriend_lib::init_tracing();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(config::app_data_dir);
    let mut state = AppState::open(&data_dir)
        .with_context(|| format!("Cannot open data directory {}", data_dir.display()))?;

    let outcome = run(&mut state, cli.command)?;

    // Failures already posted an error toast.
    for toast in state.toasts.drain() {
        eprintln!("[{}] {}", toast.toast_type, toast.message);
    }

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}
