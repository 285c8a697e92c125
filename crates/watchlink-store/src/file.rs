use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::relation::Relation;
use crate::traits::{Record, TableBackend};

/// Separator between the key and value of an on-disk record.
const RECORD_DELIMITER: char = '=';

/// Flush/sync strategy for table writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// `fsync` the new table before it replaces the old one.
    #[default]
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    OsDefault,
}

/// File-per-relation backend rooted at a data directory.
///
/// On-disk format, one record per line:
/// ```text
/// world:10:64:-3=world:10:64:-13
/// ```
///
/// A table is replaced by writing `<name>.tmp` next to it and renaming it
/// over the live file, so a crash mid-write leaves the previous table intact.
#[derive(Clone, Debug)]
pub struct FileBackend {
    dir: PathBuf,
    sync_mode: SyncMode,
}

impl FileBackend {
    /// Backend storing its tables in `dir`. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sync_mode: SyncMode::default(),
        }
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Path of the live table for `relation`.
    pub fn table_path(&self, relation: Relation) -> PathBuf {
        self.dir.join(relation.file_name())
    }

    fn parse(relation: Relation, text: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let malformed = || StoreError::MalformedRecord {
                relation,
                line: idx + 1,
                raw: line.to_string(),
            };
            let (key, value) = line.split_once(RECORD_DELIMITER).ok_or_else(malformed)?;
            if value.contains(RECORD_DELIMITER) {
                return Err(malformed());
            }
            records.push((key.to_string(), value.to_string()));
        }
        Ok(records)
    }
}

impl TableBackend for FileBackend {
    fn read_table(&self, relation: Relation) -> Result<Vec<Record>> {
        let path = self.table_path(relation);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no table yet; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records = Self::parse(relation, &text)?;
        debug!(%relation, records = records.len(), "table loaded");
        Ok(records)
    }

    fn write_table(&mut self, relation: Relation, records: &[Record]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.table_path(relation);
        let tmp = path.with_extension("txt.tmp");

        let mut writer = BufWriter::new(File::create(&tmp)?);
        for (key, value) in records {
            writeln!(writer, "{key}{RECORD_DELIMITER}{value}")?;
        }
        writer.flush()?;
        if self.sync_mode == SyncMode::EveryWrite {
            writer.get_ref().sync_all()?;
        }
        drop(writer);

        fs::rename(&tmp, &path)?;

        debug!(%relation, records = records.len(), path = %path.display(), "table saved");
        Ok(())
    }
}
