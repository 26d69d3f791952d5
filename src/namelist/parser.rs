//! Splitting namelist text into records.
//!
//! A namelist file holds one or more sections:
//!
//! ```text
//! &model_runs
//! calendar=gregorian,
//! model_id=HadGEM3-GC5E-LL,
//! /
//! &model_runs
//! calendar=360_day,
//! model_id=HadGEM3-GC31-LL,
//! /
//! ```
//!
//! Each section becomes one comma-terminated `key=value` string.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{EvalprepError, Result};

/// Separator between records: a line holding only `/`.
pub const RECORD_DELIMITER: &str = "\n/\n";

/// Extension of namelist files.
pub const NAMELIST_EXTENSION: &str = "nl";

/// Split namelist text into one facet string per record.
///
/// Line wraps after a comma are collapsed, remaining newlines removed and
/// the `&<name>` header line dropped. Records that are empty once cleaned
/// (the remainder after the final delimiter) are discarded. CRLF line
/// endings are read as LF.
pub fn split_records(text: &str) -> Result<Vec<String>> {
    let text = text.replace("\r\n", "\n");
    if !text.contains(RECORD_DELIMITER) {
        return Err(EvalprepError::MalformedInput(
            "no record delimiter (a line containing only '/') found".to_string(),
        ));
    }

    let records: Vec<String> = text.split(RECORD_DELIMITER).filter_map(clean_record).collect();

    debug!(records = records.len(), "Split namelist records");
    Ok(records)
}

fn clean_record(raw: &str) -> Option<String> {
    let body = strip_header(raw);
    let cleaned = body.replace(",\n", ",").replace('\n', "");
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Drop a leading `&<name>` line, if present.
fn strip_header(raw: &str) -> &str {
    let trimmed = raw.trim_start_matches('\n');
    if !trimmed.starts_with('&') {
        return trimmed;
    }
    match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    }
}

/// The `<name>` of the first record's `&<name>` header, if any.
pub fn header_name(text: &str) -> Option<&str> {
    let first_line = text.trim_start_matches('\n').lines().next()?;
    first_line.strip_prefix('&').map(str::trim)
}

/// Find namelist files in `dir`, keyed by file stem.
///
/// Only regular files ending in `.nl` are returned, ordered by name.
pub fn discover_namelists(dir: &Path) -> Result<IndexMap<String, PathBuf>> {
    let pattern = format!(
        "{}/*.{NAMELIST_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let entries = glob::glob(&pattern)
        .map_err(|e| EvalprepError::Parse(format!("Invalid namelist pattern: {e}")))?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let context = format!("reading namelist entry {}", e.path().display());
            EvalprepError::io(context, e.into_error())
        })?;
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            found.push((stem.to_string_lossy().into_owned(), path));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    debug!(dir = %dir.display(), count = found.len(), "Discovered namelists");
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MODEL_RUNS: &str = "&model_runs
calendar=gregorian,
label_for_plots=HadGEM3-GC5E-LL N96ORCA1,
model_id=HadGEM3-GC5E-LL,
suite_id=u-cw673,
variant_label=r1i1p1f1,
/
&model_runs
calendar=360_day,
label_for_plots=HadGEM3-GC3.1 N96ORCA1,
model_id=HadGEM3-GC31-LL,
suite_id=u-bv526,
variant_label=r5i1p1f3,
/
";

    #[test]
    fn test_split_records() {
        let records = split_records(MODEL_RUNS).unwrap();
        assert_eq!(
            records,
            vec![
                "calendar=gregorian,label_for_plots=HadGEM3-GC5E-LL N96ORCA1,\
                 model_id=HadGEM3-GC5E-LL,suite_id=u-cw673,variant_label=r1i1p1f1,"
                    .to_string(),
                "calendar=360_day,label_for_plots=HadGEM3-GC3.1 N96ORCA1,\
                 model_id=HadGEM3-GC31-LL,suite_id=u-bv526,variant_label=r5i1p1f3,"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_wrapped_facets_on_one_line() {
        let text = "&model_runs\ncalendar=gregorian,model_id=X,\nvariant_label=r1,\n/\n";
        let records = split_records(text).unwrap();
        assert_eq!(records, vec!["calendar=gregorian,model_id=X,variant_label=r1,"]);
    }

    #[test]
    fn test_trailing_blank_record_is_discarded() {
        let text = "&runs\na=1,\n/\n\n";
        assert_eq!(split_records(text).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_delimiter_is_malformed() {
        let err = split_records("&runs\na=1,\n").unwrap_err();
        assert!(matches!(err, EvalprepError::MalformedInput(_)));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "&model_runs\r\ncalendar=gregorian,\r\nmodel_id=X,\r\n/\r\n";
        let records = split_records(text).unwrap();
        assert_eq!(records, vec!["calendar=gregorian,model_id=X,"]);
        assert_eq!(header_name(text), Some("model_runs"));
        assert_eq!(split_records(&MODEL_RUNS.replace('\n', "\r\n")).unwrap().len(), 2);
    }

    #[test]
    fn test_header_name() {
        assert_eq!(header_name(MODEL_RUNS), Some("model_runs"));
        assert_eq!(header_name("a=1,\n/\n"), None);
    }

    #[test]
    fn test_discover_namelists_ignores_other_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("this_two.nl"), MODEL_RUNS).unwrap();
        fs::write(dir.path().join("this_one.nl"), MODEL_RUNS).unwrap();
        fs::write(dir.path().join("not_this_one.txt"), "").unwrap();
        fs::create_dir(dir.path().join("subdir.nl")).unwrap();

        let found = discover_namelists(dir.path()).unwrap();
        let names: Vec<_> = found.keys().cloned().collect();
        assert_eq!(names, vec!["this_one", "this_two"]);
        assert_eq!(found["this_one"], dir.path().join("this_one.nl"));
    }
}
