use crate::photokeep_core::error::{PhotokeepError, Result};
use crate::photokeep_core::exif::MetadataReader;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A strategy for deriving a capture timestamp from a file.
///
/// Returns `Ok(None)` when no time can be confidently derived; it never
/// guesses. Errors are reserved for genuine faults (subprocess failure,
/// unreadable file), not for "no timestamp found".
pub trait TimeExtractor {
    fn get_time(&mut self, path: &Path) -> Result<Option<PrimitiveDateTime>>;
}

const FILENAME_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

const FILENAME_DATE_FORMAT_DASH: &[FormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

/// Known filename timestamp templates, in match order.
const KNOWN_PATTERNS: &[(&str, &[FormatItem<'static>])] = &[
    ("%Y%m%d_%H%M%S", FILENAME_DATE_FORMAT),
    ("%Y%m%d-%H%M%S", FILENAME_DATE_FORMAT_DASH),
];

/// Extracts the capture time from timestamp patterns in the file name,
/// e.g. `IMG_20200801_091355.jpg`.
pub struct FileNameTimeExtractor {
    patterns: Vec<(Regex, &'static [FormatItem<'static>])>,
}

impl FileNameTimeExtractor {
    pub fn new() -> Self {
        let patterns = KNOWN_PATTERNS
            .iter()
            .map(|(template, format)| {
                // Known templates always compile to valid regexes
                let regex = Regex::new(&template_to_regex(template)).unwrap();
                (regex, *format)
            })
            .collect();
        FileNameTimeExtractor { patterns }
    }
}

impl Default for FileNameTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeExtractor for FileNameTimeExtractor {
    fn get_time(&mut self, path: &Path) -> Result<Option<PrimitiveDateTime>> {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();

        for (regex, format) in &self.patterns {
            let matches: Vec<&str> = regex.find_iter(&file_name).map(|m| m.as_str()).collect();
            match matches.len() {
                0 => continue,
                1 => {
                    return match PrimitiveDateTime::parse(matches[0], *format) {
                        Ok(timestamp) => Ok(Some(timestamp)),
                        Err(e) => {
                            log::debug!(
                                "Matched digits in {} are not a valid timestamp: {}",
                                file_name,
                                e
                            );
                            Ok(None)
                        }
                    };
                }
                _ => {
                    // Ambiguous file names never silently pick one match
                    log::warn!(
                        "Multiple time pattern matches in the file name: {}",
                        file_name
                    );
                    continue;
                }
            }
        }

        Ok(None)
    }
}

/// Compile a timestamp template into a fixed-width digit-run regex:
/// `%Y` becomes four digits, the other fields two, and literal separators
/// are preserved verbatim.
fn template_to_regex(template: &str) -> String {
    let mut pattern = String::new();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            pattern.push_str(&regex::escape(&c.to_string()));
            continue;
        }
        match chars.next() {
            Some('Y') => pattern.push_str(r"\d{4}"),
            Some('m' | 'd' | 'H' | 'M' | 'S') => pattern.push_str(r"\d{2}"),
            Some(other) => pattern.push_str(&regex::escape(&other.to_string())),
            None => {}
        }
    }
    pattern
}

const EXIF_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

const EXIF_DATE_OFFSET_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]:[month]:[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

/// Preferred metadata date fields, in priority order, with whether the
/// field carries a timezone offset.
const PREFERRED_DATE_FIELDS: &[(&str, bool)] = &[
    ("EXIF:DateTimeOriginal", false),
    ("QuickTime:CreationDate", true),
    ("QuickTime:MediaCreateDate", false),
];

/// Lower-confidence fallback fields; their use is logged as unreliable.
const BACKUP_DATE_FIELDS: &[(&str, bool)] = &[("File:FileModifyDate", true)];

/// Extracts the capture time from file metadata via the exiftool
/// collaborator.
pub struct MetadataTimeExtractor {
    reader: MetadataReader,
}

impl MetadataTimeExtractor {
    pub fn new() -> Self {
        MetadataTimeExtractor {
            reader: MetadataReader::new(),
        }
    }
}

impl Default for MetadataTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeExtractor for MetadataTimeExtractor {
    fn get_time(&mut self, path: &Path) -> Result<Option<PrimitiveDateTime>> {
        let metadata = self.reader.extract_metadata(path)?;
        log::debug!("{}: {:?}", path.display(), metadata);
        time_from_metadata(path, &metadata)
    }
}

/// Walk the date field chain over an already-extracted metadata map.
///
/// A preferred field that is present but unparseable ends the search with
/// no result; only an absent field falls through to the next candidate.
fn time_from_metadata(
    path: &Path,
    metadata: &HashMap<String, String>,
) -> Result<Option<PrimitiveDateTime>> {
    for (field, with_offset) in PREFERRED_DATE_FIELDS {
        let Some(value) = metadata.get(*field) else {
            continue;
        };
        return Ok(parse_exif_date(value, *with_offset).ok());
    }

    for (field, with_offset) in BACKUP_DATE_FIELDS {
        if let Some(value) = metadata.get(*field) {
            log::warn!(
                "Unreliable date {} used for {} = {}",
                field,
                path.display(),
                value
            );
            return parse_exif_date(value, *with_offset).map(Some);
        }
    }

    Ok(None)
}

/// Parse an EXIF-style date value. Offset-bearing values contribute their
/// wall clock reading; the offset is not converted away.
fn parse_exif_date(value: &str, with_offset: bool) -> Result<PrimitiveDateTime> {
    if with_offset {
        let dt = OffsetDateTime::parse(value, EXIF_DATE_OFFSET_FORMAT)
            .map_err(|e| PhotokeepError::InvalidDateFormat(e.to_string()))?;
        Ok(PrimitiveDateTime::new(dt.date(), dt.time()))
    } else {
        PrimitiveDateTime::parse(value, EXIF_DATE_FORMAT)
            .map_err(|e| PhotokeepError::InvalidDateFormat(e.to_string()))
    }
}
