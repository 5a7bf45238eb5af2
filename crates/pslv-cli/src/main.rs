use std::sync::Arc;

use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use pslv_core::{
    format_status_message, to_json_response, CommandContext, CommandInfo, CommandStatus,
    ExecutionOutcome, GlobalOptions, SharedEffects, SystemEffects,
};
use serde_json::Value;

mod cli;
mod dispatch;
mod style;

use cli::PslvCli;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PslvCli::parse();
    init_tracing(cli.trace, cli.verbose);

    if cli.offline {
        std::env::set_var("PSLV_ONLINE", "0");
    }

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };

    let effects: SharedEffects = Arc::new(SystemEffects::new());
    let ctx = CommandContext::new(&global, effects).map_err(|err| eyre!("{err:?}"))?;
    let (info, outcome) = dispatch::dispatch_command(&ctx, &cli.command)?;
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("pslv={level},pslv_core={level},pslv_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &PslvCli, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    };

    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        let message = format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            let hint_line = format!("Hint: {hint}");
            println!("{}", style.info(&hint_line));
        }
        if let Some(warning) = warning_from_details(&outcome.details) {
            let warning_line = format!("Warning: {warning}");
            println!("{}", style.info(&warning_line));
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn warning_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("warning"))
        .and_then(Value::as_str)
}
