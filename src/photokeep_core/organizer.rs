use crate::photokeep_core::cache::Cache;
use crate::photokeep_core::config::Config;
use crate::photokeep_core::counter::Counters;
use crate::photokeep_core::error::{PhotokeepError, Result};
use crate::photokeep_core::hasher::Hasher;
use crate::photokeep_core::library::{Library, ScannedFile};
use crate::photokeep_core::renamer::Renamer;
use crate::photokeep_core::time_extractor::{FileNameTimeExtractor, MetadataTimeExtractor};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// One move computed during merge. Ephemeral: it becomes a cache record only
/// after the physical move succeeds.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    /// Incoming-relative source path.
    pub from: String,
    /// Library-relative target path.
    pub to: String,
    pub fingerprint: String,
    pub size: u64,
}

/// Outcome of one merge invocation.
#[derive(Debug, Default)]
pub struct MergeReport {
    pub planned: Vec<PlannedMove>,
    pub moved: usize,
    pub duplicates_skipped: usize,
    pub unable_to_rename: usize,
    pub failed: usize,
    pub preview: bool,
    pub aborted: bool,
}

/// Orchestrates the three operating modes (setup, audit, merge) over the
/// cache, hasher, library scanner and renamer.
///
/// One Organizer session exclusively owns the cache connection for its
/// lifetime; the connection is released when the session drops.
pub struct Organizer {
    config: Config,
    cache: Cache,
    hasher: Hasher,
    library: Library,
    renamer: Renamer,
}

impl Organizer {
    /// Create a session with the default extractor chain: filename patterns
    /// first, then file metadata.
    pub fn new(config: Config) -> Result<Self> {
        let renamer = Renamer::new(vec![
            Box::new(FileNameTimeExtractor::new()),
            Box::new(MetadataTimeExtractor::new()),
        ]);
        Self::with_renamer(config, renamer)
    }

    /// Create a session with a caller-supplied renamer.
    pub fn with_renamer(config: Config, renamer: Renamer) -> Result<Self> {
        log::debug!("Setting up Organizer");
        let cache = Cache::open(&config.working_dir)?;
        let hasher = Hasher::new(config.hash_size_threshold);
        let library = Library::new(&config);
        Ok(Organizer {
            config,
            cache,
            hasher,
            library,
            renamer,
        })
    }

    /// Setup mode: refresh the fingerprint index against the library tree.
    pub fn setup(&mut self) -> Result<()> {
        let mut counters = Counters::new();
        let result = self.refresh_index(&mut counters);
        counters.dump();
        result.map(|_| ())
    }

    /// Audit mode: read-only consistency check over the cache contents.
    pub fn audit(&mut self) -> Result<()> {
        let mut counters = Counters::new();
        let result = self.run_audit(&mut counters);
        counters.dump();
        result
    }

    /// Merge mode: deduplicate, rename and relocate incoming files.
    ///
    /// In non-preview mode the `confirm` gate is consulted once, after the
    /// plan is computed; a negative answer aborts with no filesystem or
    /// cache mutation.
    pub fn merge(
        &mut self,
        preview: bool,
        confirm: impl FnOnce(&MergeReport) -> bool,
    ) -> Result<MergeReport> {
        let mut counters = Counters::new();
        let result = self.run_merge(preview, confirm, &mut counters);
        counters.dump();
        result
    }

    /// Bring the cache in line with the library tree: drop records for files
    /// that no longer exist, fingerprint files not yet indexed. Idempotent.
    /// Returns the current library files for reuse by the caller.
    fn refresh_index(&mut self, counters: &mut Counters) -> Result<Vec<ScannedFile>> {
        log::info!(
            "Refreshing index against {}",
            self.config.library_root.display()
        );

        let library_files = self.library.get_all_library_paths()?;
        let key_set: HashSet<&str> = library_files.iter().map(|f| f.key.as_str()).collect();

        for record in self.cache.get_all()? {
            if !key_set.contains(record.path.as_str()) {
                log::info!("Removing stale record: {}", record.path);
                self.cache.delete_by_path(&record.path)?;
                counters.inc("Stale records removed");
            }
        }

        for file in &library_files {
            if self.cache.get_by_path(&file.key)?.is_some() {
                continue;
            }
            // Hash the real on-disk path; the key is only a cache identity
            let abs = self.config.library_root.join(&file.rel_path);
            match self.fingerprint_file(&abs) {
                Ok((fingerprint, size)) => {
                    self.cache.upsert(&file.key, &fingerprint, size)?;
                    log::debug!("Hashed to {}: {}", fingerprint, file.key);
                    counters.inc("Files hashed");
                }
                Err(e) => {
                    log::error!("Failed to hash {}: {}", abs.display(), e);
                    counters.inc("Failures");
                }
            }
        }

        Ok(library_files)
    }

    fn run_audit(&mut self, counters: &mut Counters) -> Result<()> {
        let records = self.cache.get_all()?;
        let mut issues = 0;

        // Duplicate content: groups of records sharing a fingerprint
        let mut by_fingerprint: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for record in &records {
            by_fingerprint
                .entry(record.fingerprint.as_str())
                .or_default()
                .push(record.path.as_str());
        }
        for (fingerprint, paths) in &by_fingerprint {
            if paths.len() >= 2 {
                issues += 1;
                counters.inc("Duplicate content groups");
                log::warn!(
                    "Duplicate content (fingerprint {}): {}",
                    fingerprint,
                    paths.join(", ")
                );
            }
        }

        // Duplicate naming: groups of records sharing a base filename
        let mut by_name: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for record in &records {
            let name = Path::new(&record.path)
                .file_name()
                .map(|f| f.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            by_name.entry(name).or_default().push(record.path.as_str());
        }
        for (name, paths) in &by_name {
            if paths.len() >= 2 {
                issues += 1;
                counters.inc("Duplicate name groups");
                log::warn!("Duplicate file name {}: {}", name, paths.join(", "));
            }
        }

        // Modified content: cached size no longer matches the file on disk.
        // Cache keys are lower-cased, so map them back to real paths first.
        let on_disk: HashMap<String, ScannedFile> = self
            .library
            .get_all_library_paths()?
            .into_iter()
            .map(|f| (f.key.clone(), f))
            .collect();
        for record in &records {
            let abs = match on_disk.get(&record.path) {
                Some(file) => self.config.library_root.join(&file.rel_path),
                None => self.config.library_root.join(&record.path),
            };
            match fs::metadata(&abs) {
                Ok(meta) if meta.len() == record.size => {}
                Ok(meta) => {
                    issues += 1;
                    counters.inc("Size mismatches");
                    log::warn!(
                        "Size changed after hashing: {} (cached {}, on disk {})",
                        record.path,
                        record.size,
                        meta.len()
                    );
                }
                Err(e) => {
                    issues += 1;
                    counters.inc("Size mismatches");
                    log::warn!("Cannot stat {}: {}", record.path, e);
                }
            }
            counters.inc("Records audited");
        }

        if issues > 0 {
            Err(PhotokeepError::AuditIssuesFound(issues))
        } else {
            log::info!("Audit passed: {} records consistent", records.len());
            Ok(())
        }
    }

    fn run_merge(
        &mut self,
        preview: bool,
        confirm: impl FnOnce(&MergeReport) -> bool,
        counters: &mut Counters,
    ) -> Result<MergeReport> {
        let library_files = self.refresh_index(counters)?;
        let incoming = self.library.get_all_incoming_paths()?;
        log::info!("Merging {} incoming file(s)", incoming.len());

        // Claimed targets compare by key so collisions are caught regardless
        // of the casing on disk
        let mut claimed_paths: HashSet<String> =
            library_files.into_iter().map(|f| f.key).collect();
        let mut claimed_fingerprints: HashSet<String> = HashSet::new();
        let mut report = MergeReport {
            preview,
            ..Default::default()
        };

        for file in &incoming {
            let rel = rel_string(&file.rel_path);
            let abs = self.config.incoming_root.join(&file.rel_path);
            let (fingerprint, size) = match self.fingerprint_file(&abs) {
                Ok(v) => v,
                Err(e) => {
                    log::error!("Failed to hash incoming {}: {}", abs.display(), e);
                    counters.inc("Failures");
                    report.failed += 1;
                    continue;
                }
            };
            counters.inc("Incoming files hashed");

            // Duplicates are reported and left in place, never deleted
            if claimed_fingerprints.contains(&fingerprint)
                || !self.cache.get_by_fingerprint(&fingerprint)?.is_empty()
            {
                log::info!("Duplicate content, skipping: {}", rel);
                counters.inc("Duplicates skipped");
                report.duplicates_skipped += 1;
                continue;
            }

            let base_target = match self.renamer.get_path(&abs) {
                Ok(Some(target)) => target,
                Ok(None) => {
                    log::warn!("Unable to derive a timestamp for {}", rel);
                    counters.inc("Unable to rename");
                    report.unable_to_rename += 1;
                    continue;
                }
                Err(e) => {
                    log::error!("Failed to compute target for {}: {}", rel, e);
                    counters.inc("Failures");
                    report.failed += 1;
                    continue;
                }
            };

            let target = match resolve_collision(&base_target, &claimed_paths) {
                Ok(target) => target,
                Err(e) => {
                    log::error!("Skipping {}: {}", rel, e);
                    counters.inc("Failures");
                    report.failed += 1;
                    continue;
                }
            };

            claimed_fingerprints.insert(fingerprint.clone());
            claimed_paths.insert(target.clone());
            report.planned.push(PlannedMove {
                from: rel.clone(),
                to: target,
                fingerprint,
                size,
            });
        }

        if preview {
            for planned in &report.planned {
                log::info!("[preview] {} -> {}", planned.from, planned.to);
            }
            counters.add("Planned moves", report.planned.len() as u64);
            return Ok(report);
        }

        if report.planned.is_empty() {
            log::info!("Nothing to merge");
            return Ok(report);
        }

        if !confirm(&report) {
            log::warn!("Merge aborted, no files were touched");
            report.aborted = true;
            return Ok(report);
        }

        // Moves apply one at a time; a failure partway leaves already-moved
        // files correctly recorded and the rest untouched.
        let mut moved = 0;
        let mut failed = 0;
        for planned in &report.planned {
            let from = self.config.incoming_root.join(&planned.from);
            let to = self.config.library_root.join(&planned.to);
            match self.library.move_file(&from, &to) {
                Ok(()) => {
                    self.cache
                        .upsert(&planned.to, &planned.fingerprint, planned.size)?;
                    log::debug!("Moved {} -> {}", planned.from, planned.to);
                    counters.inc("Files moved");
                    moved += 1;
                }
                Err(e) => {
                    log::error!(
                        "Failed to move {} -> {}: {}",
                        from.display(),
                        to.display(),
                        e
                    );
                    counters.inc("Failures");
                    failed += 1;
                }
            }
        }
        report.moved = moved;
        report.failed += failed;

        Ok(report)
    }

    fn fingerprint_file(&self, path: &Path) -> Result<(String, u64)> {
        let size = fs::metadata(path)?.len();
        let fingerprint = self.hasher.get_hash(path)?;
        Ok((fingerprint, size))
    }
}

/// Starting from the base target, count a zero-based suffix upward until a
/// path is found that neither an existing library file nor an earlier
/// planned move has claimed. The suffix space caps at 99.
fn resolve_collision(base_target: &Path, claimed: &HashSet<String>) -> Result<String> {
    let base = rel_string(base_target);
    if !claimed.contains(&base) {
        return Ok(base);
    }

    let mut suffix = 0;
    loop {
        let candidate = rel_string(&Renamer::suffix_path(base_target, suffix)?);
        if !claimed.contains(&candidate) {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

fn rel_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photokeep_core::cache::MediaRecord;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    // Extractable name for the fixed content "SomeRandomContent"
    const INCOMING_NAME: &str = "img_20200801_091355.jpg";
    const TARGET: &str = "2020/08/20200801_091355.jpg";

    fn make_organizer(temp_dir: &TempDir) -> Organizer {
        temp_dir.child("incoming").create_dir_all().unwrap();
        temp_dir.child(".photokeep").create_dir_all().unwrap();
        let config = Config {
            library_root: temp_dir.path().to_path_buf(),
            incoming_root: temp_dir.path().join("incoming"),
            ignore_dirs: vec![],
            working_dir: temp_dir.path().join(".photokeep"),
            hash_size_threshold: 100 * 1024 * 1024,
        };
        // Filename extraction only, so tests never spawn exiftool
        let renamer = Renamer::new(vec![Box::new(FileNameTimeExtractor::new())]);
        Organizer::with_renamer(config, renamer).unwrap()
    }

    fn cache_snapshot(organizer: &Organizer) -> Vec<MediaRecord> {
        organizer.cache.get_all().unwrap()
    }

    #[test]
    fn test_setup_indexes_library_files() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("ContentA").unwrap();
        temp_dir.child("2021/b.jpg").write_str("ContentB").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        organizer.setup().unwrap();

        let records = cache_snapshot(&organizer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "2020/a.jpg");
        assert_eq!(records[1].path, "2021/b.jpg");
        assert_ne!(records[0].fingerprint, records[1].fingerprint);
    }

    #[test]
    fn test_setup_indexes_uppercase_names() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("2020/IMG_1234.JPG")
            .write_str("ContentA")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        organizer.setup().unwrap();

        let records = cache_snapshot(&organizer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "2020/img_1234.jpg");
    }

    #[test]
    fn test_setup_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("ContentA").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        organizer.setup().unwrap();
        let first = cache_snapshot(&organizer);
        organizer.setup().unwrap();
        let second = cache_snapshot(&organizer);

        assert_eq!(first, second);
    }

    #[test]
    fn test_setup_removes_stale_records() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("ContentA").unwrap();
        temp_dir.child("2020/b.jpg").write_str("ContentB").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        std::fs::remove_file(temp_dir.path().join("2020/b.jpg")).unwrap();
        organizer.setup().unwrap();

        let records = cache_snapshot(&organizer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "2020/a.jpg");
    }

    #[test]
    fn test_audit_passes_on_consistent_cache() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("ContentA").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        assert!(organizer.audit().is_ok());
    }

    #[test]
    fn test_audit_stats_files_with_uppercase_names() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("2020/IMG_5678.JPG")
            .write_str("ContentA")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        assert!(organizer.audit().is_ok());
    }

    #[test]
    fn test_audit_reports_one_group_per_shared_fingerprint() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("same-bytes").unwrap();
        temp_dir.child("2020/b.jpg").write_str("same-bytes").unwrap();
        temp_dir.child("2020/c.jpg").write_str("other-bytes").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        let result = organizer.audit();
        assert!(matches!(result, Err(PhotokeepError::AuditIssuesFound(1))));
    }

    #[test]
    fn test_audit_reports_duplicate_base_names() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/1.jpg").write_str("ContentA").unwrap();
        temp_dir.child("2021/1.jpg").write_str("ContentB").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        let result = organizer.audit();
        assert!(matches!(result, Err(PhotokeepError::AuditIssuesFound(1))));
    }

    #[test]
    fn test_audit_reports_size_change() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.child("2020/a.jpg");
        file.write_str("ContentA").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        file.write_str("ContentA plus more bytes").unwrap();

        let result = organizer.audit();
        assert!(matches!(result, Err(PhotokeepError::AuditIssuesFound(1))));
    }

    #[test]
    fn test_audit_collects_all_issues_before_signaling() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("2020/a.jpg").write_str("same-bytes").unwrap();
        temp_dir.child("2021/a.jpg").write_str("same-bytes").unwrap();
        let mut organizer = make_organizer(&temp_dir);
        organizer.setup().unwrap();

        // One content group and one name group
        let result = organizer.audit();
        assert!(matches!(result, Err(PhotokeepError::AuditIssuesFound(2))));
    }

    #[test]
    fn test_merge_moves_and_records() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("incoming/2020")
            .child(INCOMING_NAME)
            .write_str("SomeRandomContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 1);
        assert!(!temp_dir.path().join("incoming/2020").join(INCOMING_NAME).exists());
        assert!(temp_dir.path().join(TARGET).exists());
        let record = organizer.cache.get_by_path(TARGET).unwrap().unwrap();
        assert_eq!(record.size, 17);
    }

    #[test]
    fn test_merge_moves_uppercase_incoming_file() {
        let temp_dir = TempDir::new().unwrap();
        let incoming = temp_dir.child("incoming/2020/IMG_20200801_091355.JPG");
        incoming.write_str("SomeRandomContent").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.failed, 0);
        assert!(!incoming.exists());
        assert!(temp_dir.path().join(TARGET).exists());
        assert!(organizer.cache.get_by_path(TARGET).unwrap().is_some());
    }

    #[test]
    fn test_merge_preview_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let incoming = temp_dir.child("incoming/2020").child(INCOMING_NAME);
        incoming.write_str("SomeRandomContent").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer
            .merge(true, |_| panic!("confirm must not run in preview"))
            .unwrap();

        assert_eq!(report.planned.len(), 1);
        assert_eq!(report.planned[0].to, TARGET);
        assert_eq!(report.moved, 0);
        assert!(incoming.exists());
        assert!(!temp_dir.path().join(TARGET).exists());
        assert!(organizer.cache.get_by_path(TARGET).unwrap().is_none());
    }

    #[test]
    fn test_merge_skips_duplicate_of_library_file() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("2019/already_here.jpg")
            .write_str("SomeRandomContent")
            .unwrap();
        let incoming = temp_dir.child("incoming/2020").child(INCOMING_NAME);
        incoming.write_str("SomeRandomContent").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.moved, 0);
        assert!(incoming.exists());
        assert!(organizer.cache.get_by_path(TARGET).unwrap().is_none());
        assert_eq!(cache_snapshot(&organizer).len(), 1);
    }

    #[test]
    fn test_merge_skips_duplicate_within_batch() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("incoming/2020/img_20200801_091355.jpg")
            .write_str("SomeRandomContent")
            .unwrap();
        temp_dir
            .child("incoming/2020/img_20211231_235959.jpg")
            .write_str("SomeRandomContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.duplicates_skipped, 1);
    }

    #[test]
    fn test_merge_resolves_target_collisions() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child(TARGET)
            .write_str("DifferentLibraryContent")
            .unwrap();
        temp_dir
            .child("incoming/2020")
            .child(INCOMING_NAME)
            .write_str("SomeRandomContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 1);
        assert!(temp_dir.path().join("2020/08/20200801_091355_00.jpg").exists());
    }

    #[test]
    fn test_merge_collision_within_batch() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("incoming/2020/img_20200801_091355.jpg")
            .write_str("FirstContent")
            .unwrap();
        temp_dir
            .child("incoming/2020/vid_20200801_091355.mp4")
            .write_str("SecondContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        // Different extensions, so no collision; both land at the base name
        assert_eq!(report.moved, 2);
        assert!(temp_dir.path().join("2020/08/20200801_091355.jpg").exists());
        assert!(temp_dir.path().join("2020/08/20200801_091355.mp4").exists());
    }

    #[test]
    fn test_merge_suffixes_same_target_in_batch() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("incoming/2020/a_20200801_091355.jpg")
            .write_str("FirstContent")
            .unwrap();
        temp_dir
            .child("incoming/2020/b_20200801_091355.jpg")
            .write_str("SecondContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 2);
        assert!(temp_dir.path().join("2020/08/20200801_091355.jpg").exists());
        assert!(temp_dir.path().join("2020/08/20200801_091355_00.jpg").exists());
    }

    #[test]
    fn test_merge_skips_files_without_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let incoming = temp_dir.child("incoming/2020/nodate.jpg");
        incoming.write_str("SomeRandomContent").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.unable_to_rename, 1);
        assert_eq!(report.moved, 0);
        assert!(incoming.exists());
    }

    #[test]
    fn test_merge_abort_leaves_everything_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let incoming = temp_dir.child("incoming/2020").child(INCOMING_NAME);
        incoming.write_str("SomeRandomContent").unwrap();
        let mut organizer = make_organizer(&temp_dir);

        let report = organizer.merge(false, |_| false).unwrap();

        assert!(report.aborted);
        assert_eq!(report.moved, 0);
        assert!(incoming.exists());
        assert!(organizer.cache.get_by_path(TARGET).unwrap().is_none());
    }

    #[test]
    fn test_merge_is_safe_to_rerun() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir
            .child("incoming/2020")
            .child(INCOMING_NAME)
            .write_str("SomeRandomContent")
            .unwrap();
        let mut organizer = make_organizer(&temp_dir);

        organizer.merge(false, |_| true).unwrap();
        let report = organizer.merge(false, |_| true).unwrap();

        assert_eq!(report.moved, 0);
        assert_eq!(report.duplicates_skipped, 0);
        assert_eq!(cache_snapshot(&organizer).len(), 1);
    }

    #[test]
    fn test_resolve_collision_prefers_base() {
        let claimed = HashSet::new();
        let target = resolve_collision(Path::new("2020/08/20200801_093650.jpg"), &claimed);
        assert_eq!(target.unwrap(), "2020/08/20200801_093650.jpg");
    }

    #[test]
    fn test_resolve_collision_counts_upward() {
        let mut claimed = HashSet::new();
        claimed.insert("2020/08/20200801_093650.jpg".to_string());
        claimed.insert("2020/08/20200801_093650_00.jpg".to_string());
        let target = resolve_collision(Path::new("2020/08/20200801_093650.jpg"), &claimed);
        assert_eq!(target.unwrap(), "2020/08/20200801_093650_01.jpg");
    }

    #[test]
    fn test_resolve_collision_exhausts_at_99() {
        let mut claimed = HashSet::new();
        claimed.insert("1.jpg".to_string());
        for n in 0..=99 {
            claimed.insert(format!("1_{:02}.jpg", n));
        }
        let result = resolve_collision(Path::new("1.jpg"), &claimed);
        assert!(matches!(
            result,
            Err(PhotokeepError::DisambiguationExhausted(_))
        ));
    }
}
