//! fraudguard: thin runner around the FraudGuard engine.
//!
//! Usage:
//!   fraudguard --csv data.csv evaluate --user 97051 --amount 350
//!   fraudguard --db history.db score --user 2708
//!   fraudguard --synthetic 42 kpi
//!   fraudguard --csv data.csv profile --user 2708
//!   fraudguard import --csv data.csv --db history.db
//!   fraudguard --csv data.csv --ipc-mode

use anyhow::{bail, Context, Result};
use fraudguard_core::{
    config::RuleConfig,
    decision::validate_candidate,
    ingest,
    sample::SyntheticHistory,
    store::{TransactionStore, TxnLedger},
    types::UserId,
    FraudGuard, GuardError,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Evaluate { user_id: UserId, amount: f64 },
    Score { user_id: UserId },
    Kpi,
    Profile { user_id: UserId },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let command = first_command(&args);

    if command == Some("import") {
        return run_import(&args);
    }

    let rules = RuleConfig::load(data_dir)?;
    let store = open_source(&args)?;
    log::info!("loaded {} transactions (store v{})", store.len(), store.version());
    let guard = FraudGuard::new(store, rules);

    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop(&guard);
    }

    match command {
        Some("evaluate") => {
            let user_id = required::<UserId>(&args, "--user")?;
            let amount = required::<f64>(&args, "--amount")?;
            report(run_evaluate(&guard, user_id, amount));
        }
        Some("score") => {
            let user_id = required::<UserId>(&args, "--user")?;
            report(guard.user_fraud_score(user_id).map(|s| {
                format!(
                    "User {} has {:.2}% of fraud detection in {} analyzed transactions.",
                    s.user_id, s.percentage, s.sample_size
                )
            }));
        }
        Some("kpi") => {
            report(guard.global_kpi().map(|k| {
                format!("{:.2}% of Fraud Score in the last {} days.", k.percentage, k.day_span)
            }));
        }
        Some("profile") => {
            let user_id = required::<UserId>(&args, "--user")?;
            report(
                guard
                    .user_profile(user_id)
                    .and_then(|p| serde_json::to_string_pretty(&p).map_err(GuardError::from)),
            );
        }
        Some(other) => bail!("unknown command '{other}'"),
        None => bail!("no command given (evaluate | score | kpi | profile | import)"),
    }
    Ok(())
}

/// Pick the dataset: --csv, then --db, else a synthetic batch.
fn open_source(args: &[String]) -> Result<TransactionStore> {
    if let Some(path) = flag_value(args, "--csv") {
        return ingest::load_csv(path).with_context(|| format!("loading {path}"));
    }
    if let Some(path) = flag_value(args, "--db") {
        let ledger = TxnLedger::open(path)?;
        ledger.migrate()?;
        return Ok(ledger.load_store()?);
    }
    let seed = parse_arg(args, "--synthetic", 42u64);
    log::warn!("no --csv or --db given, using synthetic history (seed {seed})");
    Ok(TransactionStore::from_transactions(SyntheticHistory::default().generate(seed)))
}

fn run_import(args: &[String]) -> Result<()> {
    let csv = flag_value(args, "--csv").context("import needs --csv PATH")?;
    let db = flag_value(args, "--db").context("import needs --db PATH")?;

    let store = ingest::load_csv(csv).with_context(|| format!("loading {csv}"))?;
    let mut ledger = TxnLedger::open(db)?;
    ledger.migrate()?;
    let written = ledger.insert_transactions(store.transactions())?;
    println!("Imported {written} transactions into {db} ({} total).", ledger.count()?);
    Ok(())
}

fn run_evaluate(guard: &FraudGuard, user_id: UserId, amount: f64) -> Result<String, GuardError> {
    validate_candidate(user_id, amount)?;
    Ok(guard.evaluate(user_id, amount)?.reason)
}

/// Engine failures are user-facing messages, not process errors.
fn report(result: Result<String, GuardError>) {
    match result {
        Ok(line) => println!("{line}"),
        Err(GuardError::UserNotFound { .. }) => println!("Error: User id not found."),
        Err(e) => println!("Error: {e}"),
    }
}

fn run_ipc_loop(guard: &FraudGuard) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Evaluate { user_id, amount } => validate_candidate(user_id, amount)
                .and_then(|_| guard.evaluate(user_id, amount))
                .and_then(|v| Ok(serde_json::to_value(v)?)),
            IpcCommand::Score { user_id } => guard
                .user_fraud_score(user_id)
                .and_then(|s| Ok(serde_json::to_value(s)?)),
            IpcCommand::Kpi => guard.global_kpi().and_then(|k| Ok(serde_json::to_value(k)?)),
            IpcCommand::Profile { user_id } => guard
                .user_profile(user_id)
                .and_then(|p| Ok(serde_json::to_value(p)?)),
        };

        let line = match reply {
            Ok(value) => value,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// First positional argument that is neither a flag nor a flag's value.
fn first_command(args: &[String]) -> Option<&str> {
    const VALUE_FLAGS: [&str; 6] = ["--csv", "--db", "--synthetic", "--data-dir", "--user", "--amount"];
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            return Some(arg.as_str());
        }
    }
    None
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn required<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<T> {
    let raw = flag_value(args, flag).with_context(|| format!("missing {flag}"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {flag}: '{raw}'"))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
