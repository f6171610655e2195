//! Append-only audit journal for emitted events.
//!
//! Each event is persisted as one canonical JSON line in `events.jsonl`
//! under the journal directory, giving auditors a replayable history that
//! mirrors the in-memory event log.  Journal failures never abort a domain
//! operation; the controller captures them for later inspection.

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const JOURNAL_FILE: &str = "events.jsonl";

/// Handle to an on-disk event journal.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Opens (creating if needed) a journal rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| LedgerError::Journal(err.to_string()))?;
        Ok(Self {
            path: dir.join(JOURNAL_FILE),
        })
    }

    /// Path of the backing journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event as a JSON line.
    pub fn record(&mut self, event: &LedgerEvent) -> Result<(), LedgerError> {
        let line =
            serde_json::to_string(event).map_err(|err| LedgerError::Journal(err.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| LedgerError::Journal(err.to_string()))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|err| LedgerError::Journal(err.to_string()))
    }

    /// Reads the full event history back in append order.  A missing file
    /// is an empty history; a malformed line is a defined parse error.
    pub fn replay(&self) -> Result<Vec<LedgerEvent>, LedgerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LedgerError::Journal(err.to_string())),
        };
        let mut events = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: LedgerEvent = serde_json::from_str(line)
                .map_err(|err| LedgerError::Journal(format!("line {}: {err}", idx + 1)))?;
            events.push(event);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::Journal;
    use crate::event::LedgerEvent;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("surge_house_{tag}_{unique}"))
    }

    #[test]
    fn test_journal_replays_in_order() {
        let dir = temp_dir("journal");
        let mut journal = Journal::open(&dir).unwrap();
        journal.record(&LedgerEvent::DemandRecorded(1)).unwrap();
        journal.record(&LedgerEvent::SupplyRecorded(1)).unwrap();
        journal.record(&LedgerEvent::PricingComputed(1)).unwrap();
        let replayed = journal.replay().unwrap();
        assert_eq!(
            replayed,
            vec![
                LedgerEvent::DemandRecorded(1),
                LedgerEvent::SupplyRecorded(1),
                LedgerEvent::PricingComputed(1),
            ]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_journal_is_empty_history() {
        let dir = temp_dir("journal_empty");
        let journal = Journal::open(&dir).unwrap();
        assert!(journal.replay().unwrap().is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_line_is_a_parse_error() {
        let dir = temp_dir("journal_bad");
        let mut journal = Journal::open(&dir).unwrap();
        journal.record(&LedgerEvent::DemandRecorded(1)).unwrap();
        fs::write(journal.path(), "{\"DemandRecorded\":1}\nnot json\n").unwrap();
        let err = journal.replay().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
