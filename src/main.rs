//! tagsheet - replay sheet edits and evaluate formulas from the command line

mod config;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tagsheet_core::document::{Action, FormulaRuntime, create_sheet_with_column, replay};
use tagsheet_engine::builtins::BUILTINS;
use tagsheet_engine::engine::{Sandbox, Sheet};
use uuid::Uuid;

use config::Config;

#[derive(Parser)]
#[command(name = "tagsheet", version, about = "Tagged spreadsheets with Rhai formulas")]
struct Cli {
    /// Config file (default: <config dir>/tagsheet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a JSON array of actions to a sheet and print the result
    Replay {
        sheet: PathBuf,
        actions: PathBuf,
        /// Write the resulting sheet here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate every formula cell of a sheet
    Eval { sheet: PathBuf },
    /// Print a new sheet with one text column
    New { name: String },
    /// List the built-in formula functions
    Functions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.log_level);

    match cli.command {
        Command::Replay {
            sheet,
            actions,
            out,
        } => run_replay(&sheet, &actions, out.as_deref()),
        Command::Eval { sheet } => run_eval(&sheet, &config),
        Command::New { name } => {
            let sheet = create_sheet_with_column(
                &Uuid::new_v4().to_string(),
                &name,
                &Uuid::new_v4().to_string(),
            );
            println!("{}", serde_json::to_string_pretty(&sheet)?);
            Ok(())
        }
        Command::Functions => {
            for builtin in BUILTINS {
                println!("{:<50} {}", builtin.signature, builtin.description);
            }
            Ok(())
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn run_replay(sheet_path: &Path, actions_path: &Path, out: Option<&Path>) -> Result<()> {
    let sheet: Sheet = read_json(sheet_path)?;
    let actions: Vec<Action> = read_json(actions_path)?;
    tracing::info!(sheet = %sheet.id, actions = actions.len(), "replaying");

    let result = match replay(&sheet, &actions, chrono::Utc::now()) {
        Ok(result) => result,
        Err((index, e)) => bail!("action {} ({}) failed: {}", index, actions[index].name(), e),
    };

    let json = serde_json::to_string_pretty(&result)?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_eval(sheet_path: &Path, config: &Config) -> Result<()> {
    let sheet: Sheet = read_json(sheet_path)?;
    let mut runtime =
        FormulaRuntime::with_timeout(Arc::new(Sandbox::new()), config.formula_timeout());
    let computed = runtime.compute(&sheet);

    for row in &sheet.rows {
        let Some(results) = computed.get(&row.id) else {
            continue;
        };
        for column in sheet.columns.iter().filter(|c| c.is_formula()) {
            match results.get(&column.id) {
                Some(Ok(value)) => println!("{}\t{}\t{}", row.id, column.id, value),
                Some(Err(e)) => println!("{}\t{}\t#ERR: {}", row.id, column.id, e),
                None => {}
            }
        }
    }
    Ok(())
}
