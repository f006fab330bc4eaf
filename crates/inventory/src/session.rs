//! Count session aggregate.
//!
//! One operator's in-progress recount: the ordered submissions, the scanner toggle
//! and the last scanned code that pre-fills the SKU field. The session is created
//! at start-up and passed explicitly to every handler; nothing here is global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cyclecount_core::{Aggregate, AggregateRoot, DomainError, SessionId, Sku};

use crate::record::CountedRecord;

/// Aggregate root: CountSession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSession {
    id: SessionId,
    plan_day: u32,
    opened_at: DateTime<Utc>,
    counted: Vec<CountedRecord>,
    scanner_visible: bool,
    scan_attempts: u32,
    last_scanned: Option<String>,
    version: u64,
}

impl CountSession {
    pub fn open(id: SessionId, plan_day: u32, opened_at: DateTime<Utc>) -> Self {
        Self {
            id,
            plan_day,
            opened_at,
            counted: Vec::new(),
            scanner_visible: false,
            scan_attempts: 0,
            last_scanned: None,
            version: 0,
        }
    }

    pub fn plan_day(&self) -> u32 {
        self.plan_day
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Submissions in the order they were made (duplicates included).
    pub fn counted(&self) -> &[CountedRecord] {
        &self.counted
    }

    pub fn scanner_visible(&self) -> bool {
        self.scanner_visible
    }

    pub fn scan_attempts(&self) -> u32 {
        self.scan_attempts
    }

    /// Default value for the SKU field.
    pub fn last_scanned(&self) -> Option<&str> {
        self.last_scanned.as_deref()
    }
}

impl AggregateRoot for CountSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenScanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenScanner {
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordScan. `code` is whatever the scanner capability returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordScan {
    pub code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitCount. A missing or blank `sku` falls back to the last scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCount {
    pub sku: Option<String>,
    pub counted_qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reset {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    OpenScanner(OpenScanner),
    RecordScan(RecordScan),
    SubmitCount(SubmitCount),
    Reset(Reset),
}

/// Event: ScannerOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerOpened {
    pub attempt: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SkuScanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuScanned {
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ScanMissed (scanner returned nothing usable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMissed {
    pub occurred_at: DateTime<Utc>,
}

/// Event: CountSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSubmitted {
    pub record: CountedRecord,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SessionReset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReset {
    pub discarded: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ScannerOpened(ScannerOpened),
    SkuScanned(SkuScanned),
    ScanMissed(ScanMissed),
    CountSubmitted(CountSubmitted),
    SessionReset(SessionReset),
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::ScannerOpened(_) => "session.scanner.opened",
            SessionEvent::SkuScanned(_) => "session.scanner.scanned",
            SessionEvent::ScanMissed(_) => "session.scanner.missed",
            SessionEvent::CountSubmitted(_) => "session.count.submitted",
            SessionEvent::SessionReset(_) => "session.reset",
        }
    }
}

impl Aggregate for CountSession {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SessionEvent::ScannerOpened(e) => {
                self.scanner_visible = true;
                self.scan_attempts = e.attempt;
            }
            SessionEvent::SkuScanned(e) => {
                self.last_scanned = Some(e.code.clone());
                self.scanner_visible = false;
            }
            SessionEvent::ScanMissed(_) => {
                self.scanner_visible = false;
            }
            SessionEvent::CountSubmitted(e) => {
                self.counted.push(e.record.clone());
            }
            SessionEvent::SessionReset(_) => {
                self.counted.clear();
                self.last_scanned = None;
                self.scanner_visible = false;
                self.scan_attempts = 0;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SessionCommand::OpenScanner(cmd) => Ok(vec![SessionEvent::ScannerOpened(ScannerOpened {
                attempt: self.scan_attempts + 1,
                occurred_at: cmd.occurred_at,
            })]),
            SessionCommand::RecordScan(cmd) => Ok(vec![self.handle_scan(cmd)]),
            SessionCommand::SubmitCount(cmd) => self.handle_submit(cmd),
            SessionCommand::Reset(cmd) => Ok(vec![SessionEvent::SessionReset(SessionReset {
                discarded: self.counted.len(),
                occurred_at: cmd.occurred_at,
            })]),
        }
    }
}

impl CountSession {
    fn handle_scan(&self, cmd: &RecordScan) -> SessionEvent {
        match cmd.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => SessionEvent::SkuScanned(SkuScanned {
                code: code.to_string(),
                occurred_at: cmd.occurred_at,
            }),
            _ => SessionEvent::ScanMissed(ScanMissed {
                occurred_at: cmd.occurred_at,
            }),
        }
    }

    fn handle_submit(&self, cmd: &SubmitCount) -> Result<Vec<SessionEvent>, DomainError> {
        let raw = cmd
            .sku
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.last_scanned.as_deref())
            .ok_or_else(|| DomainError::validation("no SKU entered or scanned"))?;

        let record = CountedRecord::new(Sku::parse(raw)?, cmd.counted_qty)?;

        Ok(vec![SessionEvent::CountSubmitted(CountSubmitted {
            record,
            occurred_at: cmd.occurred_at,
        })])
    }
}
