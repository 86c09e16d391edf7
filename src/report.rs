use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::stats::RunStatistics;

pub const USER_BASED_LOG: &str = "userBasedLog.txt";
pub const ITEM_BASED_LOG: &str = "itemBasedLog.txt";

/// One finished experiment, as written to the experiment logs.
#[derive(Clone, Debug)]
pub struct RunRecord {
    pub title: String,
    pub stats: RunStatistics,
    pub run_time: Duration,
}

impl RunRecord {
    /// Log block in the experiment log layout.
    pub fn render(&self) -> String {
        let stats = &self.stats;
        format!(
            "
  Experiment: {}
  Total Predictions: {}
  Predictions Less Than 1: {}
  Predictions Greater Than 5: {}
  No Valid Neighbours Cases: {}
  Average Neighbourhood Size: {}
  MAE: {}
  Run Time: {:.2} seconds
  -----------------------------------
  ",
            self.title,
            stats.predictions_made,
            stats.r_less_than_one,
            stats.r_greater_five,
            stats.no_valid_neighbours,
            stats.average_neighbourhood_size(),
            stats.mae,
            self.run_time.as_secs_f64(),
        )
    }

    /// Log file the record belongs to, picked from the title.
    pub fn log_file(&self) -> &'static str {
        if self.title.contains("user-based") {
            USER_BASED_LOG
        } else {
            ITEM_BASED_LOG
        }
    }
}

/// Appends the record to its log file inside `log_dir`, creating the directory
/// and file as needed.
pub fn append_record(log_dir: impl AsRef<Path>, record: &RunRecord) -> Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(record.log_file());

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(record.render().as_bytes())?;
    debug!(path = %path.display(), title = %record.title, "appended run record");
    Ok(path)
}
