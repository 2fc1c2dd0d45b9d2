//! CLI interface for stowage.
//!
//! Each subcommand is one gesture against the board: the depot is opened,
//! the board loaded, the gesture applied, and the process exits. That keeps
//! every mutation a discrete, serialized user action — there is never a
//! second gesture in flight against the same voyage.
//!
//! Voyages and cargo items are referenced by full UUID or unambiguous
//! prefix; catalog entries also resolve by exact display value.

mod format;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::board::{Board, Card};
use crate::config::Config;
use crate::depot::Depot;
use crate::identity::{IdSource, RandomIds};
use crate::model::Auto;

use format::{format_card, short_id};

/// Stowage — voyages, vehicles, and the cargo loaded on them.
#[derive(Debug, Parser)]
#[command(name = "stowage", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: planning a delivery
  1. stowage destination add Riga
  2. stowage auto add KL-403 --class lorry
  3. stowage voyage new --destination Riga --auto KL-403
     → prints a voyage ID (e.g. a3b0fc12)
  4. stowage cargo add a3b --name Timber --size 5
  5. stowage board

Moving cargo between voyages (same destination only):
  stowage cargo move e4f --to c7d";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every voyage with its remaining capacity and cargo.
    Board,

    /// Manage voyages: create, re-route, delete.
    Voyage {
        #[command(subcommand)]
        command: VoyageCommand,
    },

    /// Manage cargo items: add, change, drop, move.
    Cargo {
        #[command(subcommand)]
        command: CargoCommand,
    },

    /// Manage the destination catalog.
    Destination {
        #[command(subcommand)]
        command: DestinationCommand,
    },

    /// Manage the auto catalog.
    Auto {
        #[command(subcommand)]
        command: AutoCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum VoyageCommand {
    /// Create a new voyage. Prints the voyage ID.
    New {
        /// Destination: UUID, prefix, or display value.
        #[arg(long)]
        destination: String,

        /// Auto: UUID, prefix, or display value.
        #[arg(long)]
        auto: String,
    },

    /// Change a voyage's destination and/or auto, as one edit.
    Set {
        /// Voyage: UUID or prefix.
        voyage: String,

        /// New destination: UUID, prefix, or display value.
        #[arg(long)]
        destination: Option<String>,

        /// New auto: UUID, prefix, or display value.
        #[arg(long)]
        auto: Option<String>,
    },

    /// Delete a voyage and all cargo loaded on it.
    Delete {
        /// Voyage: UUID or prefix.
        voyage: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CargoCommand {
    /// Load a new cargo item onto a voyage. Prints the cargo ID.
    Add {
        /// Voyage: UUID or prefix.
        voyage: String,

        /// Cargo name.
        #[arg(long)]
        name: String,

        /// Size in capacity units.
        #[arg(long)]
        size: String,
    },

    /// Change a cargo item's name and/or size.
    Set {
        /// Voyage: UUID or prefix.
        voyage: String,

        /// Cargo item: UUID or prefix.
        cargo: String,

        /// New name.
        #[arg(long)]
        name: Option<String>,

        /// New size in capacity units.
        #[arg(long)]
        size: Option<String>,
    },

    /// Remove a cargo item from its voyage and delete it.
    Drop {
        /// Voyage: UUID or prefix.
        voyage: String,

        /// Cargo item: UUID or prefix.
        cargo: String,
    },

    /// Move a cargo item to another voyage with the same destination.
    Move {
        /// Cargo item: UUID or prefix, found across all voyages.
        cargo: String,

        /// Target voyage: UUID or prefix.
        #[arg(long)]
        to: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DestinationCommand {
    /// Add a destination. Prints its ID.
    Add {
        /// Display value, e.g. a city name.
        value: String,
    },

    /// List all destinations.
    List,
}

#[derive(Debug, Subcommand)]
pub enum AutoCommand {
    /// Add an auto to the catalog. Prints its ID.
    Add {
        /// Display value, e.g. a registration plate.
        value: String,

        /// Vehicle class, which fixes the capacity.
        #[arg(long, value_enum)]
        class: AutoClassArg,
    },

    /// List all autos.
    List,
}

/// CLI-facing vehicle class, mapped to the capacity-table label.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AutoClassArg {
    /// 4 capacity units.
    Van,
    /// 8 capacity units.
    Lorry,
    /// 16 capacity units.
    Semi,
}

impl AutoClassArg {
    fn label(self) -> &'static str {
        match self {
            Self::Van => "van",
            Self::Lorry => "lorry",
            Self::Semi => "semi",
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let path = config
        .depot
        .clone()
        .or_else(Depot::default_path)
        .ok_or("could not determine home directory")?;
    let depot = Depot::open(path).map_err(|e| format!("failed to open depot: {e}"))?;

    // Seeding the auto catalog is a depot-level operation; the board treats
    // autos as read-only.
    if let Command::Auto {
        command: AutoCommand::Add { value, class },
    } = &cli.command
    {
        return cmd_auto_add(&depot, value, *class);
    }

    let mut board = Board::load(depot, Box::new(RandomIds)).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Board => cmd_board(&board),
        Command::Voyage { command } => match command {
            VoyageCommand::New { destination, auto } => {
                cmd_voyage_new(&mut board, &destination, &auto)
            }
            VoyageCommand::Set {
                voyage,
                destination,
                auto,
            } => cmd_voyage_set(&mut board, &voyage, destination.as_deref(), auto.as_deref()),
            VoyageCommand::Delete { voyage } => cmd_voyage_delete(&mut board, &voyage),
        },
        Command::Cargo { command } => match command {
            CargoCommand::Add { voyage, name, size } => {
                cmd_cargo_add(&mut board, &voyage, &name, &size)
            }
            CargoCommand::Set {
                voyage,
                cargo,
                name,
                size,
            } => cmd_cargo_set(&mut board, &voyage, &cargo, name.as_deref(), size.as_deref()),
            CargoCommand::Drop { voyage, cargo } => cmd_cargo_drop(&mut board, &voyage, &cargo),
            CargoCommand::Move { cargo, to } => cmd_cargo_move(&mut board, &cargo, &to),
        },
        Command::Destination { command } => match command {
            DestinationCommand::Add { value } => {
                let id = board.add_destination(&value).map_err(|e| e.to_string())?;
                println!("{id}");
                Ok(())
            }
            DestinationCommand::List => {
                for d in board.destinations().map_err(|e| e.to_string())? {
                    println!("{}  {}", short_id(d.id), d.value);
                }
                Ok(())
            }
        },
        Command::Auto { command } => match command {
            AutoCommand::List => {
                for a in board.autos().map_err(|e| e.to_string())? {
                    println!("{}  {}  [{}]", short_id(a.id), a.value, a.kind);
                }
                Ok(())
            }
            AutoCommand::Add { .. } => unreachable!("handled before the board is loaded"),
        },
    }
}

fn cmd_auto_add(depot: &Depot, value: &str, class: AutoClassArg) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("field 'auto' must be filled in".to_string());
    }
    let auto = Auto {
        id: RandomIds.mint(),
        value: value.to_string(),
        kind: class.label().to_string(),
    };
    depot
        .create_auto(&auto)
        .map_err(|e| format!("failed to add auto: {e}"))?;
    println!("{}", auto.id);
    Ok(())
}

fn cmd_board(board: &Board<Depot>) -> Result<(), String> {
    if board.cards().is_empty() {
        println!("No voyages");
        return Ok(());
    }
    for card in board.cards() {
        println!("{}", format_card(card));
    }
    Ok(())
}

fn cmd_voyage_new(board: &mut Board<Depot>, destination: &str, auto: &str) -> Result<(), String> {
    let destination = resolve_destination(board, destination)?;
    let auto = resolve_auto(board, auto)?;
    let id = board
        .new_voyage(destination, auto)
        .map_err(|e| e.to_string())?;
    println!("{id}");
    Ok(())
}

fn cmd_voyage_set(
    board: &mut Board<Depot>,
    voyage: &str,
    destination: Option<&str>,
    auto: Option<&str>,
) -> Result<(), String> {
    if destination.is_none() && auto.is_none() {
        return Err("specify --destination and/or --auto".to_string());
    }
    let voyage = resolve_voyage(board, voyage)?;
    let destination = destination
        .map(|d| resolve_destination(board, d))
        .transpose()?;
    let auto = auto.map(|a| resolve_auto(board, a)).transpose()?;

    board.edit_info(voyage).map_err(|e| e.to_string())?;
    board
        .stage_info(voyage, destination, auto)
        .map_err(|e| e.to_string())?;
    board.approve_info(voyage).map_err(|e| e.to_string())?;

    eprintln!("Voyage {} updated", short_id(voyage));
    Ok(())
}

fn cmd_voyage_delete(board: &mut Board<Depot>, voyage: &str) -> Result<(), String> {
    let voyage = resolve_voyage(board, voyage)?;
    board.delete_voyage(voyage).map_err(|e| e.to_string())?;
    eprintln!("Voyage {} deleted", short_id(voyage));
    Ok(())
}

fn cmd_cargo_add(
    board: &mut Board<Depot>,
    voyage: &str,
    name: &str,
    size: &str,
) -> Result<(), String> {
    let voyage = resolve_voyage(board, voyage)?;
    let row = board.add_row(voyage).map_err(|e| e.to_string())?;
    board
        .stage_row(voyage, row, Some(name), Some(size))
        .map_err(|e| e.to_string())?;
    if let Err(e) = board.approve_row(voyage, row) {
        // The row was never persisted; discard it as a cancel would.
        let _ = board.cancel_row(voyage, row);
        return Err(e.to_string());
    }
    println!("{row}");
    Ok(())
}

fn cmd_cargo_set(
    board: &mut Board<Depot>,
    voyage: &str,
    cargo: &str,
    name: Option<&str>,
    size: Option<&str>,
) -> Result<(), String> {
    if name.is_none() && size.is_none() {
        return Err("specify --name and/or --size".to_string());
    }
    let voyage = resolve_voyage(board, voyage)?;
    let cargo = resolve_cargo(board.card(voyage).map_err(|e| e.to_string())?, cargo)?;

    board.edit_row(voyage, cargo).map_err(|e| e.to_string())?;
    board
        .stage_row(voyage, cargo, name, size)
        .map_err(|e| e.to_string())?;
    board.approve_row(voyage, cargo).map_err(|e| e.to_string())?;

    eprintln!("Cargo {} updated", short_id(cargo));
    Ok(())
}

fn cmd_cargo_drop(board: &mut Board<Depot>, voyage: &str, cargo: &str) -> Result<(), String> {
    let voyage = resolve_voyage(board, voyage)?;
    let cargo = resolve_cargo(board.card(voyage).map_err(|e| e.to_string())?, cargo)?;
    board.delete_row(voyage, cargo).map_err(|e| e.to_string())?;
    eprintln!("Cargo {} dropped", short_id(cargo));
    Ok(())
}

fn cmd_cargo_move(board: &mut Board<Depot>, cargo: &str, to: &str) -> Result<(), String> {
    let target = resolve_voyage(board, to)?;
    let (source, cargo) = find_cargo(board, cargo)?;

    let ticket = board.begin_drag(source, cargo).map_err(|e| e.to_string())?;
    board
        .complete_drag(&ticket, target)
        .map_err(|e| e.to_string())?;

    eprintln!(
        "Cargo {} moved to voyage {}",
        short_id(cargo),
        short_id(target)
    );
    Ok(())
}

// ── Reference resolution ──

/// Resolve a voyage reference (full UUID or unambiguous prefix).
fn resolve_voyage(board: &Board<Depot>, reference: &str) -> Result<Uuid, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        board.card(id).map_err(|e| e.to_string())?;
        return Ok(id);
    }

    let matches: Vec<Uuid> = board
        .cards()
        .iter()
        .map(|c| c.voyage_id)
        .filter(|id| id.to_string().starts_with(reference))
        .collect();
    pick_match(matches, "voyage", reference)
}

/// Resolve a cargo reference within one card (full UUID or prefix).
fn resolve_cargo(card: &Card, reference: &str) -> Result<Uuid, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return Ok(id);
    }

    let matches: Vec<Uuid> = card
        .rows()
        .iter()
        .map(|r| r.id)
        .filter(|id| id.to_string().starts_with(reference))
        .collect();
    pick_match(matches, "cargo item", reference)
}

/// Find a cargo item across all cards, returning its voyage and id.
fn find_cargo(board: &Board<Depot>, reference: &str) -> Result<(Uuid, Uuid), String> {
    let matches: Vec<(Uuid, Uuid)> = board
        .cards()
        .iter()
        .flat_map(|c| {
            c.rows()
                .iter()
                .filter(|r| {
                    let id = r.id.to_string();
                    id == reference || id.starts_with(reference)
                })
                .map(|r| (c.voyage_id, r.id))
        })
        .collect();

    match matches.len() {
        0 => Err(format!("no cargo item matching '{reference}'")),
        1 => Ok(matches[0]),
        n => Err(format!("'{reference}' is ambiguous — matches {n} cargo items")),
    }
}

/// Resolve a destination by UUID, prefix, or exact display value.
fn resolve_destination(board: &Board<Depot>, reference: &str) -> Result<Uuid, String> {
    let entries = board.destinations().map_err(|e| e.to_string())?;
    resolve_catalog(
        entries.iter().map(|d| (d.id, d.value.as_str())),
        "destination",
        reference,
    )
}

/// Resolve an auto by UUID, prefix, or exact display value.
fn resolve_auto(board: &Board<Depot>, reference: &str) -> Result<Uuid, String> {
    let entries = board.autos().map_err(|e| e.to_string())?;
    resolve_catalog(
        entries.iter().map(|a| (a.id, a.value.as_str())),
        "auto",
        reference,
    )
}

fn resolve_catalog<'a>(
    entries: impl Iterator<Item = (Uuid, &'a str)>,
    what: &str,
    reference: &str,
) -> Result<Uuid, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return Ok(id);
    }

    let matches: Vec<Uuid> = entries
        .filter(|(id, value)| *value == reference || id.to_string().starts_with(reference))
        .map(|(id, _)| id)
        .collect();
    pick_match(matches, what, reference)
}

fn pick_match(matches: Vec<Uuid>, what: &str, reference: &str) -> Result<Uuid, String> {
    match matches.len() {
        0 => Err(format!("no {what} matching '{reference}'")),
        1 => Ok(matches[0]),
        n => {
            let ids: Vec<String> = matches.iter().map(|id| short_id(*id)).collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} {what}s: {}",
                ids.join(", ")
            ))
        }
    }
}
