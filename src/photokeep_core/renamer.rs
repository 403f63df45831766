use crate::photokeep_core::error::{PhotokeepError, Result};
use crate::photokeep_core::time_extractor::TimeExtractor;
use std::path::{Path, PathBuf};
use time::format_description::FormatItem;
use time::macros::format_description;

/// Target path template: year/month partition plus a timestamp stem.
const TARGET_PATH_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]/[month]/[year][month][day]_[hour][minute][second]");

/// Maximum two-digit disambiguation suffix.
const MAX_SUFFIX: u32 = 99;

/// Computes canonical library-relative target paths from capture times.
///
/// Holds an ordered list of [`TimeExtractor`] strategies and tries them in
/// priority order; new extraction strategies plug in without changes here.
pub struct Renamer {
    time_extractors: Vec<Box<dyn TimeExtractor>>,
}

impl Renamer {
    pub fn new(time_extractors: Vec<Box<dyn TimeExtractor>>) -> Self {
        Renamer { time_extractors }
    }

    /// The canonical target path for a file: `YYYY/MM/YYYYMMDD_HHMMSS` with
    /// the original extension lower-cased, regardless of the file's original
    /// directory. `None` means no extractor yielded a timestamp and the file
    /// cannot be placed.
    pub fn get_path(&mut self, path: &Path) -> Result<Option<PathBuf>> {
        for extractor in &mut self.time_extractors {
            let Some(timestamp) = extractor.get_time(path)? else {
                continue;
            };
            let stem = timestamp
                .format(TARGET_PATH_FORMAT)
                .map_err(|e| PhotokeepError::InvalidDateFormat(e.to_string()))?;
            let target = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) => format!("{}.{}", stem, ext.to_lowercase()),
                None => stem,
            };
            return Ok(Some(PathBuf::from(target)));
        }

        Ok(None)
    }

    /// Append a two-digit zero-padded disambiguation suffix to the filename
    /// stem, preserving the extension. Suffixes above 99 exhaust the
    /// disambiguation space and are a hard error.
    pub fn suffix_path(path: &Path, suffix: u32) -> Result<PathBuf> {
        if suffix > MAX_SUFFIX {
            return Err(PhotokeepError::DisambiguationExhausted(path.to_path_buf()));
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}_{:02}.{}", stem, suffix, ext),
            None => format!("{}_{:02}", stem, suffix),
        };

        Ok(path.with_file_name(name))
    }
}
