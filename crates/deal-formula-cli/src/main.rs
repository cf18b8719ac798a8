use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deal_formula::{
    build_formula_context, check_formula, evaluate_formula, validate_formula, variables,
    CustomCalculator, DefaultMatch, FormulaContext, FormulaSettings, FormulaSlot, FormulaState,
    UnderwritingInputs, VariableId,
};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "deal-formula")]
#[command(about = "Validate and evaluate deal underwriting formulas.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a formula and print the verdict as JSON. Exits 1 when invalid.
    Validate {
        formula: String,
    },
    /// Evaluate a formula and print the result.
    Eval {
        formula: String,
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Print the canonical rendering of a valid formula.
    Format {
        formula: String,
    },
    /// Print the variable registry as JSON.
    Variables,
    /// Print the three named formulas with their values.
    Defaults {
        #[command(flatten)]
        inputs: InputArgs,

        /// Persisted formula state (JSON). Defaults to the built-in formulas.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Ignore whitespace when deciding whether a saved formula is still the default.
        #[arg(long)]
        ignore_whitespace: bool,
    },
    /// Evaluate a custom calculator definition (JSON).
    Calculator {
        definition: PathBuf,

        /// Input value as `variable=number` (e.g. `arv=250000`). Repeatable.
        #[arg(long = "value", value_parser = parse_assignment)]
        values: Vec<(VariableId, f64)>,
    },
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    /// Underwriting inputs (JSON, camelCase keys); `-` reads stdin. Without it, registry
    /// default values are used.
    #[arg(long)]
    inputs: Option<PathBuf>,
}

impl InputArgs {
    fn context(&self) -> Result<FormulaContext> {
        match &self.inputs {
            None => Ok(FormulaContext::from_defaults()),
            Some(path) => {
                let text = read_text(path)?;
                let inputs: UnderwritingInputs = serde_json::from_str(&text)
                    .with_context(|| format!("parse underwriting inputs {}", path.display()))?;
                Ok(build_formula_context(&inputs))
            }
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(VariableId, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected variable=number, got {raw:?}"))?;
    let id: VariableId = name.trim().parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number for {id}: {value:?}"))?;
    Ok((id, value))
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotReport<'a> {
    slot: FormulaSlot,
    name: &'a str,
    expression: &'a str,
    is_default: bool,
    value: f64,
}

/// Writes to stdout, treating a closed pipe as success.
fn emit(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{text}").and_then(|()| stdout.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("write stdout"),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Validate { formula } => {
            let verdict = validate_formula(&formula);
            emit(&serde_json::to_string(&verdict)?)?;
            Ok(if verdict.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Eval { formula, inputs } => {
            let ctx = inputs.context()?;
            emit(&evaluate_formula(&formula, &ctx).to_string())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Format { formula } => {
            let checked = check_formula(&formula).context("invalid formula")?;
            emit(&checked.expr().to_string())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Variables => {
            emit(&serde_json::to_string_pretty(variables())?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Defaults {
            inputs,
            state,
            ignore_whitespace,
        } => {
            let settings = FormulaSettings {
                default_match: if ignore_whitespace {
                    DefaultMatch::IgnoreWhitespace
                } else {
                    DefaultMatch::Exact
                },
            };
            let state = match state {
                Some(path) => FormulaState::from_json_str(&read_text(&path)?, settings)
                    .with_context(|| format!("load formula state {}", path.display()))?,
                None => FormulaState::with_settings(settings),
            };
            let ctx = inputs.context()?;
            let reports: Vec<SlotReport<'_>> = FormulaSlot::ALL
                .into_iter()
                .map(|slot| {
                    let formula = state.formula(slot);
                    SlotReport {
                        slot,
                        name: formula.name(),
                        expression: formula.expression(),
                        is_default: formula.is_default(),
                        value: state.evaluate(slot, &ctx),
                    }
                })
                .collect();
            emit(&serde_json::to_string_pretty(&reports)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Calculator { definition, values } => {
            let calc = CustomCalculator::from_json_str(&read_text(&definition)?)
                .with_context(|| format!("load calculator {}", definition.display()))?;
            for id in calc.unbound_variables() {
                eprintln!("note: {id} is not a calculator input; using its registry default");
            }
            emit(&calc.evaluate(values).to_string())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
