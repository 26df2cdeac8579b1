#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for inspecting outdoor map unit batches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use outdoor_map_cli::{
    CliError, format_details, format_groups, format_summary, format_unit_table, load_addresses,
    load_snapshot,
};
use outdoor_map_repository::{StatusFilter, UnitDetails, UnitFilter};
use outdoor_map_search::{SuggestionQuery, project};
use outdoor_map_service_group::ServiceGroups;
use outdoor_map_unit_models::{Language, UnitId};

#[derive(Parser)]
#[command(name = "outdoor_map", about = "Outdoor map unit repository tool")]
struct Cli {
    /// Display language (fi, sv, en)
    #[arg(long, global = true, env = "OUTDOOR_MAP_LANG", default_value = "fi")]
    lang: Language,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the size of every derived index
    Summary {
        /// Normalized unit batch (JSON)
        batch: PathBuf,
    },
    /// List units on the map
    List {
        /// Normalized unit batch (JSON)
        batch: PathBuf,
        /// Sport index to show (all, iceskate, ski, `open_now`)
        #[arg(long, default_value = "all")]
        sport: UnitFilter,
        /// Status narrowing (all, `open_now`)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show details of one unit
    Show {
        /// Normalized unit batch (JSON)
        batch: PathBuf,
        /// Unit id
        id: UnitId,
    },
    /// Search units by name, and addresses by label
    Search {
        /// Normalized unit batch (JSON)
        batch: PathBuf,
        /// Search phrase
        phrase: String,
        /// JSON array of address suggestions from a geocoder
        #[arg(long)]
        addresses: Option<PathBuf>,
        /// Maximum number of results per list
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the built-in service groups
    Groups,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let lang = cli.lang.as_ref();

    match cli.command {
        Commands::Summary { batch } => {
            let snapshot = load_snapshot(&batch)?;
            println!("{}", format_summary(&snapshot));
        }
        Commands::List {
            batch,
            sport,
            status,
        } => {
            let snapshot = load_snapshot(&batch)?;
            let units = snapshot.visible_units(sport, status);
            println!("{}", format_unit_table(&units, lang));
            println!();
            println!("{} units", units.len());
        }
        Commands::Show { batch, id } => {
            let snapshot = load_snapshot(&batch)?;
            let unit = snapshot.unit(id).ok_or(CliError::UnknownUnit { id })?;
            println!("{}", format_details(&UnitDetails::new(unit, lang)));
        }
        Commands::Search {
            batch,
            phrase,
            addresses,
            limit,
        } => {
            let snapshot = load_snapshot(&batch)?;
            let addresses = addresses
                .as_deref()
                .map(load_addresses)
                .transpose()?
                .unwrap_or_default();

            let mut query = SuggestionQuery::new(phrase, cli.lang);
            if let Some(limit) = limit {
                query = query.with_unit_limit(limit).with_address_limit(limit);
            }

            let suggestions = project(&snapshot, &query, &addresses);
            if suggestions.is_empty() {
                println!("No matches.");
                return Ok(());
            }

            println!("{}", format_unit_table(&suggestions.units, lang));
            if !suggestions.addresses.is_empty() {
                println!();
                println!("ADDRESSES");
                println!("{}", "-".repeat(60));
                for address in &suggestions.addresses {
                    match address.location {
                        Some(location) => {
                            let [lat, lng] = location.lat_lng();
                            println!("{:<40} {lat:.5}, {lng:.5}", address.label);
                        }
                        None => println!("{}", address.label),
                    }
                }
            }
        }
        Commands::Groups => {
            println!("{}", format_groups(ServiceGroups::builtin()));
        }
    }

    Ok(())
}
