use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::core::error::Result;
use crate::core::types::{GenerationId, LaneId};
use crate::stats::{GenerationSummary, StatsAggregator};

pub const CSV_HEADER: &str =
    "lane,generation,specie,speed,damage,protection,winner_remaining_health,turns";

const AVERAGE_FILE: &str = "average_stats.csv";
const BEST_FILE: &str = "best_stats.csv";

/// Writes average and best summaries to `average_stats.csv` / `best_stats.csv`
///
/// Appends from parallel lanes are serialised by an internal lock so rows
/// never interleave.
pub struct CsvExporter<'a> {
    dir: PathBuf,
    stats: &'a StatsAggregator,
    write_lock: Mutex<()>,
}

impl<'a> CsvExporter<'a> {
    pub fn new(dir: impl Into<PathBuf>, stats: &'a StatsAggregator) -> Self {
        Self {
            dir: dir.into(),
            stats,
            write_lock: Mutex::new(()),
        }
    }

    pub fn average_path(&self) -> PathBuf {
        self.dir.join(AVERAGE_FILE)
    }

    pub fn best_path(&self) -> PathBuf {
        self.dir.join(BEST_FILE)
    }

    /// Create the export dir and truncate both files to their header
    pub fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.dir)?;
        write_file(&self.average_path(), &[])?;
        write_file(&self.best_path(), &[])?;
        Ok(())
    }

    /// Append the summaries of one finished generation
    ///
    /// Returns false if the generation has no summary (it produced no fights).
    pub fn append(&self, lane: LaneId, generation: GenerationId) -> Result<bool> {
        let (Some(average), Some(best)) = (
            self.stats.average(lane, generation)?,
            self.stats.best(lane, generation)?,
        ) else {
            return Ok(false);
        };

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_row(&self.average_path(), &average)?;
        append_row(&self.best_path(), &best)?;
        tracing::debug!(lane = lane.0, generation = generation.0, "exported generation");
        Ok(true)
    }

    /// Rewrite both files from everything the aggregator holds
    pub fn write_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.dir)?;
        write_file(&self.average_path(), &self.stats.averages())?;
        write_file(&self.best_path(), &self.stats.bests())?;
        Ok(())
    }
}

fn write_file(path: &Path, rows: &[GenerationSummary]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", CSV_HEADER)?;
    for row in rows {
        writeln!(writer, "{}", csv_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn append_row(path: &Path, row: &GenerationSummary) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", csv_row(row))?;
    Ok(())
}

fn csv_row(s: &GenerationSummary) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        s.lane.0, s.generation.0, s.specie, s.speed, s.damage, s.protection, s.winner_remaining_health, s.turns
    )
}
