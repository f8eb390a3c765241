//! Session log discovery and parsing.
//!
//! KovaaK's writes one CSV-like file per played scenario into its stats
//! folder, named `<scenario> - <descriptor> - <YYYY.MM.DD-HH.MM.SS> Stats.csv`.
//! [`StatsIndex`] lists those files once per run; [`parse_session`] turns one
//! file into a [`RawSessionRecord`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use report_core::error::{ReportError, Result};
use report_core::models::{accuracy, RawSessionRecord};
use tracing::{debug, warn};

/// Separator between the fields of a stats file name.
pub const FIELD_SEPARATOR: &str = " - ";

/// Literal suffix following the timestamp in a stats file name.
pub const STATS_SUFFIX: &str = " Stats";

/// `chrono` pattern of the timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H.%M.%S";

const WEAPON_HEADER: &str = "Weapon,Shots,Hits,Damage Done,Damage Possible";
const KILLS_LABEL: &str = "Kills:,";
const AVG_TTK_LABEL: &str = "Avg TTK:,";
const SCORE_LABEL: &str = "Score:,";

// ── StatsIndex ────────────────────────────────────────────────────────────────

/// Listing of the session logs in a stats folder, taken once and shared by
/// every scenario aggregation of a run.
#[derive(Debug, Clone)]
pub struct StatsIndex {
    dir: PathBuf,
    files: Vec<String>,
}

impl StatsIndex {
    /// List every `.csv` file (extension matched case-insensitively) directly
    /// inside `dir`, sorted by name.
    pub fn scan(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            warn!("Stats path does not exist: {}", dir.display());
            return Err(ReportError::DataPathNotFound(dir.to_path_buf()));
        }

        let files: Vec<String> = walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && has_csv_extension(entry.path()))
            .filter_map(|entry| match entry.file_name().to_str() {
                Some(name) => Some(name.to_string()),
                None => {
                    warn!("Skipping stats file with a non-UTF-8 name: {}", entry.path().display());
                    None
                }
            })
            .collect();

        debug!("Indexed {} stats files in {}", files.len(), dir.display());
        Ok(Self::from_files(dir, files))
    }

    /// Build an index from a listing the caller already has.
    pub fn from_files(dir: &Path, files: impl IntoIterator<Item = String>) -> Self {
        let mut files: Vec<String> = files.into_iter().collect();
        files.sort();
        Self {
            dir: dir.to_path_buf(),
            files,
        }
    }

    /// The indexed folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the logs whose first name field is exactly `scenario`, in
    /// index order.
    pub fn files_for(&self, scenario: &str) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|name| scenario_name(name) == scenario)
            .map(|name| self.dir.join(name))
            .collect()
    }

    /// Distinct scenario names present in the folder.
    pub fn scenario_names(&self) -> BTreeSet<&str> {
        self.files.iter().map(|name| scenario_name(name)).collect()
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

// ── File name fields ──────────────────────────────────────────────────────────

/// The scenario part of a stats file name (its first field).
pub fn scenario_name(file_name: &str) -> &str {
    file_name
        .split(FIELD_SEPARATOR)
        .next()
        .unwrap_or(file_name)
}

/// Parse the play time encoded in the third field of a stats file name.
pub fn parse_timestamp(file_name: &str) -> Result<NaiveDateTime> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let field = stem
        .split(FIELD_SEPARATOR)
        .nth(2)
        .ok_or_else(|| ReportError::parse(file_name, "file name has no timestamp field"))?;
    let field = field.strip_suffix(STATS_SUFFIX).unwrap_or(field).trim();

    NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT)
        .map_err(|e| ReportError::parse(file_name, format!("bad timestamp {field:?}: {e}")))
}

// ── Body parsing ──────────────────────────────────────────────────────────────

/// Fields collected while walking the blocks of a log body.
#[derive(Debug, Default)]
struct PartialRecord {
    shots: Option<u32>,
    hits: Option<u32>,
    damage_done: Option<f64>,
    damage_possible: Option<f64>,
    kills: Option<u32>,
    avg_time_to_kill: Option<f64>,
    score: Option<f64>,
}

impl PartialRecord {
    fn finish(self, file_name: &str, timestamp: NaiveDateTime) -> Result<RawSessionRecord> {
        let missing = |field: &str| ReportError::parse(file_name, format!("missing {field}"));

        let shots = self.shots.ok_or_else(|| missing("shots"))?;
        let hits = self.hits.ok_or_else(|| missing("hits"))?;
        Ok(RawSessionRecord {
            timestamp,
            shots,
            hits,
            accuracy: accuracy(shots, hits),
            damage_done: self.damage_done.ok_or_else(|| missing("damage done"))?,
            damage_possible: self.damage_possible.ok_or_else(|| missing("damage possible"))?,
            kills: self.kills.ok_or_else(|| missing("kills"))?,
            avg_time_to_kill: self.avg_time_to_kill.ok_or_else(|| missing("avg TTK"))?,
            score: self.score.ok_or_else(|| missing("score"))?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    file_name: &str,
    fields: &[&str],
    index: usize,
    what: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = fields
        .get(index)
        .ok_or_else(|| ReportError::parse(file_name, format!("{what} column missing")))?
        .trim();
    raw.parse::<T>()
        .map_err(|e| ReportError::parse(file_name, format!("bad {what} {raw:?}: {e}")))
}

/// Parse one session log into a record.
///
/// The body is split into blocks by blank lines. Block 2 holds the weapon
/// table (the last data row wins); block 3 holds the `Kills:`, `Avg TTK:`
/// and `Score:` lines (the last occurrence of each wins). Other blocks are
/// ignored.
pub fn parse_session(file_name: &str, content: &str) -> Result<RawSessionRecord> {
    let timestamp = parse_timestamp(file_name)?;

    let mut partial = PartialRecord::default();
    let mut block = 1;

    for line in content.lines() {
        if line.trim().is_empty() {
            block += 1;
            continue;
        }

        match block {
            2 => {
                if line.contains(WEAPON_HEADER) {
                    continue;
                }
                let fields: Vec<&str> = line.split(',').collect();
                partial.shots = Some(parse_field(file_name, &fields, 1, "shots")?);
                partial.hits = Some(parse_field(file_name, &fields, 2, "hits")?);
                partial.damage_done = Some(parse_field(file_name, &fields, 3, "damage done")?);
                partial.damage_possible =
                    Some(parse_field(file_name, &fields, 4, "damage possible")?);
            }
            3 => {
                let fields: Vec<&str> = line.split(',').collect();
                if line.contains(KILLS_LABEL) {
                    partial.kills = Some(parse_field(file_name, &fields, 1, "kills")?);
                } else if line.contains(AVG_TTK_LABEL) {
                    partial.avg_time_to_kill = Some(parse_field(file_name, &fields, 1, "avg TTK")?);
                } else if line.contains(SCORE_LABEL) {
                    partial.score = Some(parse_field(file_name, &fields, 1, "score")?);
                }
            }
            _ => {}
        }
    }

    partial.finish(file_name, timestamp)
}

/// Read and parse the session log at `path`.
///
/// I/O failures are [`ReportError::FileRead`]; a body that is not UTF-8 is a
/// [`ReportError::Parse`] like any other malformed log.
pub fn read_session(path: &Path) -> Result<RawSessionRecord> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ReportError::parse(path.display().to_string(), "file name is not UTF-8"))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| ReportError::parse(file_name, format!("body is not UTF-8: {e}")))?;

    let record = parse_session(file_name, &content)?;
    debug!(
        "Parsed {}: score {} at {}",
        file_name, record.score, record.timestamp
    );
    Ok(record)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    /// A log body in the four-block layout with the given summary values.
    pub(crate) fn sample_body(shots: u32, hits: u32, kills: u32, score: f64) -> String {
        format!(
            "Kill #,Timestamp,Bot,Weapon,TTK,Shots,Hits,Accuracy\n\
             1,09:00:01.000,Bot,Pistol,0.8s,3,2,0.66\n\
             \n\
             Weapon,Shots,Hits,Damage Done,Damage Possible,,Sens Scale\n\
             Pistol,{shots},{hits},{dd}.0,{dp}.0,,Overwatch\n\
             \n\
             Kills:,{kills}\n\
             Deaths:,0\n\
             Avg TTK:,0.850\n\
             Damage Done:,{dd}.0\n\
             Score:,{score}\n\
             \n\
             Input Lag:,0\n\
             Max FPS (config):,240\n",
            dd = hits * 10,
            dp = shots * 10,
        )
    }

    pub(crate) fn file_name(scenario: &str, stamp: &str) -> String {
        format!("{scenario} - Challenge - {stamp} Stats.csv")
    }

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    // ── parse_timestamp ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_timestamp_from_name() {
        let ts = parse_timestamp(&file_name("Pasu", "2024.01.15-09.30.05")).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_parse_timestamp_missing_field() {
        let err = parse_timestamp("Pasu - Challenge.csv").unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_parse_timestamp_bad_pattern() {
        let err = parse_timestamp(&file_name("Pasu", "2024-01-15 09:30")).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_scenario_name_is_first_field() {
        assert_eq!(
            scenario_name(&file_name("1wall6targets TE", "2024.01.15-09.30.05")),
            "1wall6targets TE"
        );
        assert_eq!(scenario_name("nodelimiter.csv"), "nodelimiter.csv");
    }

    // ── parse_session ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_session_basic() {
        let name = file_name("Pasu", "2024.01.15-09.00.00");
        let record = parse_session(&name, &sample_body(200, 150, 42, 812.5)).unwrap();
        assert_eq!(record.shots, 200);
        assert_eq!(record.hits, 150);
        assert!((record.accuracy - 0.75).abs() < 1e-12);
        assert_eq!(record.damage_done, 1500.0);
        assert_eq!(record.damage_possible, 2000.0);
        assert_eq!(record.kills, 42);
        assert_eq!(record.avg_time_to_kill, 0.85);
        assert_eq!(record.score, 812.5);
    }

    #[test]
    fn test_parse_session_zero_shots_is_full_accuracy() {
        let name = file_name("Pasu", "2024.01.15-09.00.00");
        let record = parse_session(&name, &sample_body(0, 0, 0, 0.0)).unwrap();
        assert_eq!(record.accuracy, 1.0);
    }

    #[test]
    fn test_parse_session_negative_score() {
        let name = file_name("Pasu", "2024.01.15-09.00.00");
        let record = parse_session(&name, &sample_body(10, 1, 0, -35.25)).unwrap();
        assert_eq!(record.score, -35.25);
    }

    #[test]
    fn test_parse_session_last_weapon_row_wins() {
        let body = "header\n\
                    \n\
                    Weapon,Shots,Hits,Damage Done,Damage Possible\n\
                    Pistol,10,5,50.0,100.0\n\
                    Rifle,30,20,200.0,300.0\n\
                    \n\
                    Kills:,3\n\
                    Avg TTK:,1.0\n\
                    Score:,10\n\
                    Score:,20\n";
        let record = parse_session(&file_name("Mix", "2024.02.01-10.00.00"), body).unwrap();
        assert_eq!(record.shots, 30);
        assert_eq!(record.hits, 20);
        assert_eq!(record.damage_possible, 300.0);
        assert_eq!(record.score, 20.0);
    }

    #[test]
    fn test_parse_session_handles_crlf() {
        let body = sample_body(100, 50, 5, 99.0).replace('\n', "\r\n");
        let record = parse_session(&file_name("Pasu", "2024.01.15-09.00.00"), &body).unwrap();
        assert_eq!(record.kills, 5);
        assert_eq!(record.score, 99.0);
    }

    #[test]
    fn test_parse_session_ignores_labels_outside_block_three() {
        // Score only appears in block 4, so it is missing.
        let body = "a\n\
                    \n\
                    Pistol,1,1,1.0,1.0\n\
                    \n\
                    Kills:,1\n\
                    Avg TTK:,1.0\n\
                    \n\
                    Score:,50\n";
        let err = parse_session(&file_name("Pasu", "2024.01.15-09.00.00"), body).unwrap_err();
        match err {
            ReportError::Parse { reason, .. } => assert!(reason.contains("score")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_session_missing_weapon_row() {
        let body = "a\n\nWeapon,Shots,Hits,Damage Done,Damage Possible\n\nKills:,1\nAvg TTK:,1\nScore:,1\n";
        let err = parse_session(&file_name("Pasu", "2024.01.15-09.00.00"), body).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_parse_session_bad_number() {
        let body = sample_body(100, 50, 5, 99.0).replace("Kills:,5", "Kills:,many");
        let err = parse_session(&file_name("Pasu", "2024.01.15-09.00.00"), &body).unwrap_err();
        match err {
            ReportError::Parse { reason, .. } => assert!(reason.contains("kills")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    // ── read_session ──────────────────────────────────────────────────────────

    #[test]
    fn test_read_session_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            &file_name("Pasu", "2024.01.15-09.00.00"),
            &sample_body(100, 60, 7, 321.0),
        );
        let record = read_session(&path).unwrap();
        assert_eq!(record.score, 321.0);
    }

    #[test]
    fn test_read_session_non_utf8_body_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name("Garbled", "2024.01.15-09.00.00"));
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = read_session(&path).unwrap_err();
        match err {
            ReportError::Parse { file, reason } => {
                assert!(file.starts_with("Garbled - "));
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_read_session_missing_file() {
        let err = read_session(Path::new("/tmp/no-such-stats-file-xyz.csv")).unwrap_err();
        assert!(matches!(err, ReportError::FileRead { .. }));
    }

    // ── StatsIndex ────────────────────────────────────────────────────────────

    #[test]
    fn test_scan_lists_csv_only_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), &file_name("Pasu", "2024.01.15-14.00.00"), "x");
        write_file(dir.path(), &file_name("Pasu", "2024.01.15-09.00.00"), "x");
        write_file(dir.path(), "Pasu - Challenge - 2024.01.15-10.00.00 Stats.CSV", "x");
        write_file(dir.path(), "notes.txt", "x");
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let index = StatsIndex::scan(dir.path()).unwrap();
        assert_eq!(index.len(), 3);
        let files = index.files_for("Pasu");
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "Pasu - Challenge - 2024.01.15-09.00.00 Stats.csv",
                "Pasu - Challenge - 2024.01.15-10.00.00 Stats.CSV",
                "Pasu - Challenge - 2024.01.15-14.00.00 Stats.csv",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        write_file(dir.path(), &file_name("Pasu", "2024.01.15-09.00.00"), "x");
        let raw = OsStr::from_bytes(b"Pasu - \xff - 2024.01.15-10.00.00 Stats.csv");
        if std::fs::write(dir.path().join(raw), "x").is_err() {
            // Some filesystems reject non-UTF-8 names outright.
            return;
        }

        let index = StatsIndex::scan(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.files_for("Pasu").len(), 1);
    }

    #[test]
    fn test_scan_missing_dir() {
        let err = StatsIndex::scan(Path::new("/tmp/does-not-exist-kovaaks-xyz")).unwrap_err();
        assert!(matches!(err, ReportError::DataPathNotFound(_)));
    }

    #[test]
    fn test_files_for_is_exact_match() {
        let index = StatsIndex::from_files(
            Path::new("/stats"),
            vec![
                file_name("Pasu", "2024.01.15-09.00.00"),
                file_name("Pasu Reload", "2024.01.15-09.05.00"),
                file_name("pasu", "2024.01.15-09.10.00"),
            ],
        );
        assert_eq!(index.files_for("Pasu").len(), 1);
        assert_eq!(index.files_for("Pasu Reload").len(), 1);
        assert!(index.files_for("Pas").is_empty());
    }

    #[test]
    fn test_scenario_names_distinct() {
        let index = StatsIndex::from_files(
            Path::new("/stats"),
            vec![
                file_name("B", "2024.01.15-09.00.00"),
                file_name("A", "2024.01.15-09.00.00"),
                file_name("A", "2024.01.16-09.00.00"),
            ],
        );
        let names: Vec<&str> = index.scenario_names().into_iter().collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
