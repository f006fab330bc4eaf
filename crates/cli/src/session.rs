//! Interactive count session.
//!
//! Reads one operator command per line and runs it to completion before reading
//! the next. All state lives in the `CountSession` owned by this loop.

use std::io::{BufRead, Write};

use chrono::{NaiveDate, Utc};

use cyclecount_core::{Aggregate, AggregateRoot, DomainError, SessionId, Sku};
use cyclecount_infra::SkuScanner;
use cyclecount_inventory::{
    CountSession, OpenScanner, RecordScan, Reset, SessionCommand, SessionEvent, SubmitCount,
};

use crate::commands::{export_list, produce_report};
use crate::context::{AppContext, DailyBatch};
use crate::output::{write_batch, write_counts};

const HELP: &str = "\
Commands:
  scan                  capture a SKU with the scanner (pre-fills the next count)
  count [SKU] <QTY>     record a physical count (SKU defaults to the last scan)
  list                  show counts recorded so far
  report                compute variances and export the report and chart
  reset                 discard all counts of this session
  help                  show this help
  quit                  end the session";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Scan,
    Count { sku: Option<String>, qty: String },
    List,
    Report,
    Reset,
    Help,
    Quit,
    Blank,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if word.is_empty() {
        return Input::Blank;
    }

    match word.to_ascii_lowercase().as_str() {
        "scan" => Input::Scan,
        "count" | "c" => {
            // The SKU is everything between the command word and the quantity, as typed.
            let rest = rest.trim();
            match rest.rsplit_once(char::is_whitespace) {
                Some((sku, qty)) => Input::Count {
                    sku: Some(sku.trim_end().to_string()),
                    qty: qty.to_string(),
                },
                None if !rest.is_empty() => Input::Count {
                    sku: None,
                    qty: rest.to_string(),
                },
                None => Input::Unknown(line.to_string()),
            }
        }
        "list" | "ls" => Input::List,
        "report" => Input::Report,
        "reset" => Input::Reset,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Run a session for `date` until `quit` or end of input.
///
/// Exports the daily list at start-up and returns the final session state.
pub fn run_session<R: BufRead>(
    ctx: &mut AppContext,
    date: NaiveDate,
    input: R,
    out: &mut dyn Write,
    scanner: &mut dyn SkuScanner,
) -> anyhow::Result<CountSession> {
    let batch = ctx.daily_batch(date)?;
    write_batch(out, ctx.output, &batch)?;
    match export_list(ctx, &batch) {
        Ok(path) => writeln!(out, "Daily list saved: {}", path.display())?,
        Err(e) => writeln!(out, "error: {e:#}")?,
    }

    let mut session = CountSession::open(SessionId::new(), batch.day, Utc::now());
    tracing::info!(
        session = %session.id(),
        day = batch.day,
        opened_at = %session.opened_at(),
        "count session started"
    );
    writeln!(
        out,
        "Session opened {} for day {} of {}. Type 'help' for commands.",
        session.opened_at().format("%Y-%m-%d %H:%M UTC"),
        batch.day,
        batch.days
    )?;

    for line in input.lines() {
        let line = line?;
        match parse_input(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Scan => scan(&mut session, scanner, out)?,
            Input::Count { sku, qty } => count(&mut session, &batch, sku, &qty, out)?,
            Input::List => write_counts(out, ctx.output, session.counted())?,
            Input::Report => {
                if let Err(e) = produce_report(ctx, &batch, session.counted(), out) {
                    writeln!(out, "error: {e:#}")?;
                }
            }
            Input::Reset => {
                let reset = SessionCommand::Reset(Reset {
                    occurred_at: Utc::now(),
                });
                let events = execute(&mut session, reset)?;
                if let Some(SessionEvent::SessionReset(e)) = events.first() {
                    writeln!(out, "Session reset; {} count(s) discarded.", e.discarded)?;
                }
            }
            Input::Unknown(text) => {
                writeln!(out, "Unknown command '{text}'. Type 'help' for commands.")?
            }
        }
    }

    tracing::info!(
        session = %session.id(),
        counted = session.counted().len(),
        "count session ended"
    );
    Ok(session)
}

fn scan(
    session: &mut CountSession,
    scanner: &mut dyn SkuScanner,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let open = SessionCommand::OpenScanner(OpenScanner {
        occurred_at: Utc::now(),
    });
    execute(session, open)?;
    writeln!(out, "Scanner open (attempt {}).", session.scan_attempts())?;

    let code = scanner.capture();
    let events = execute(
        session,
        SessionCommand::RecordScan(RecordScan {
            code,
            occurred_at: Utc::now(),
        }),
    )?;
    match events.first() {
        Some(SessionEvent::SkuScanned(e)) => writeln!(out, "Scanned: {}", e.code)?,
        _ => writeln!(out, "No barcode read.")?,
    }
    Ok(())
}

fn count(
    session: &mut CountSession,
    batch: &DailyBatch,
    sku: Option<String>,
    qty: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let Ok(counted_qty) = qty.parse::<i64>() else {
        writeln!(out, "error: quantity '{qty}' is not a whole number")?;
        return Ok(());
    };

    let command = SessionCommand::SubmitCount(SubmitCount {
        sku,
        counted_qty,
        occurred_at: Utc::now(),
    });
    match execute(session, command) {
        Ok(events) => {
            if let Some(SessionEvent::CountSubmitted(e)) = events.first() {
                writeln!(out, "Recorded: {} - {}", e.record.sku, e.record.counted_qty)?;
                if !in_batch(batch, &e.record.sku) {
                    writeln!(
                        out,
                        "note: {} is not in today's batch and will not appear in the report",
                        e.record.sku
                    )?;
                }
            }
        }
        Err(e) => writeln!(out, "error: {e}")?,
    }
    Ok(())
}

fn execute(
    session: &mut CountSession,
    command: SessionCommand,
) -> Result<Vec<SessionEvent>, DomainError> {
    let events = session.execute(&command)?;
    for event in &events {
        tracing::debug!(event = event.event_type(), "session event applied");
    }
    Ok(events)
}

fn in_batch(batch: &DailyBatch, sku: &Sku) -> bool {
    batch.records.iter().any(|r| &r.sku == sku)
}
