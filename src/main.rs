mod cli;

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use bugfinder::{
    config::Config,
    execution::{ExecutionReport, Pipeline, Status},
    explain,
    logging::{self, LogTarget},
    printer::{self, MarkdownPrinter, TextPrinter, Tone},
    tui, utils,
};
use is_terminal::IsTerminal;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    // Load config; CLI flags override it
    let mut cfg = Config::load();
    if let Some(python) = &args.python {
        cfg.set("BUGFINDER_PYTHON", python.clone());
    }
    if let Some(secs) = args.timeout {
        cfg.set("BUGFINDER_TIMEOUT", secs.to_string());
    }

    // Explanation table shortcuts
    if args.list_explanations {
        for (name, text) in explain::entries() {
            println!("{:<20} {}", name, text);
        }
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(name) = &args.explain {
        println!("{}", explain::explain(name.trim()));
        return Ok(ExitCode::SUCCESS);
    }

    let stdin_is_tty = io::stdin().is_terminal();
    let source = resolve_source(&args, stdin_is_tty)?;

    if args.tui || source.is_none() {
        if !io::stdout().is_terminal() {
            bail!(no_terminal_message(&args));
        }
        let _guard = logging::init(&cfg, LogTarget::File);
        tui::run_tui(&cfg, source).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let _guard = logging::init(&cfg, LogTarget::Stderr);
    let source = source.unwrap_or_default();
    let pipeline = Pipeline::from_config(&cfg);
    let report = pipeline
        .analyze(&source)
        .await
        .context("analysis could not run")?;

    let md = if args.no_md {
        false
    } else if args.md {
        true
    } else {
        cfg.get_bool("PRETTIFY_MARKDOWN")
    };
    if args.json {
        println!("{}", printer::render_json(&report)?);
    } else if md {
        MarkdownPrinter::default().print(&printer::render_markdown(&report, args.trace));
    } else {
        print_text(&report, args.trace);
    }

    Ok(exit_code(report.status()))
}

/// Code from -c, FILE ("-" = stdin), or piped stdin; None means "open the editor".
fn resolve_source(args: &cli::Cli, stdin_is_tty: bool) -> Result<Option<String>> {
    if let Some(code) = &args.code {
        return Ok(Some(code.clone()));
    }
    match &args.file {
        Some(path) if path.as_os_str() == "-" => Ok(Some(read_stdin()?)),
        Some(path) => Ok(Some(utils::read_source(path)?)),
        None if !stdin_is_tty && !args.tui => Ok(Some(read_stdin()?)),
        None => Ok(None),
    }
}

/// Why the editor cannot open when stdout is not a terminal.
fn no_terminal_message(args: &cli::Cli) -> &'static str {
    if args.tui {
        "--tui needs a terminal on stdout"
    } else {
        "no code given: pass FILE, -c CODE, or pipe code on stdin"
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading code from stdin")?;
    Ok(buf)
}

fn print_text(report: &ExecutionReport, with_trace: bool) {
    let tone = Tone::from(report.status());
    TextPrinter::for_tone(tone).print(printer::render_report(report).trim_end());
    if let (true, Some(info)) = (with_trace, report.failure()) {
        if !info.trace.is_empty() {
            println!();
            TextPrinter { color: Some("dimmed") }.print(info.trace.trim_end());
        }
    }
}

fn exit_code(status: Status) -> ExitCode {
    match status {
        Status::Success => ExitCode::SUCCESS,
        Status::Failure => ExitCode::from(1),
        Status::InvalidInput => ExitCode::from(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> cli::Cli {
        cli::Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn tui_without_terminal_names_the_terminal() {
        let args = parse(&["bugfinder", "--tui", "snippet.py"]);
        assert_eq!(no_terminal_message(&args), "--tui needs a terminal on stdout");
    }

    #[test]
    fn missing_code_without_terminal_asks_for_code() {
        let args = parse(&["bugfinder"]);
        assert!(no_terminal_message(&args).starts_with("no code given"));
    }

    #[test]
    fn inline_code_wins_over_stdin() {
        let args = parse(&["bugfinder", "-c", "print(1)"]);
        assert_eq!(resolve_source(&args, false).unwrap().as_deref(), Some("print(1)"));
    }
}
