//! Subcommand implementations

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use implace_core::stats::{count_types as type_counts_of, split_by_type};
use implace_core::{
    DedupConfig, DedupPipeline, LoadReport, Loader, PlaceRecord, ProgressObserver, RunSummary,
};
use implace_io::{
    audit_table, canonical_table, open_source, type_count_table, BoxedSource, IoResult,
    Publication,
};

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const EMPTY_TYPE_FILE: &str = "empty_type.csv";
pub const FILLED_TYPE_FILE: &str = "filled_type.csv";

/// Where `dedup` writes its tables
#[derive(Debug, Clone)]
pub struct DedupOutputs {
    pub canonical: PathBuf,
    pub audit: PathBuf,
    pub split_dir: Option<PathBuf>,
    pub type_counts: Option<PathBuf>,
}

/// Logs the proximity pass every 10%
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: usize,
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = done * 10 / total;
        if decile > self.last_decile {
            self.last_decile = decile;
            tracing::info!("Proximity pass {}% ({}/{})", decile * 10, done, total);
        }
    }
}

/// Read every input into one record set with a shared seen-id set
///
/// All inputs are opened before any is read, so an unknown extension or a
/// missing file fails the run up front.
fn read_inputs(loader: &Loader, inputs: &[PathBuf]) -> IoResult<(Vec<PlaceRecord>, LoadReport)> {
    let sources = inputs
        .iter()
        .map(open_source)
        .collect::<IoResult<Vec<BoxedSource>>>()?;

    let mut seen_ids = HashSet::new();
    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for source in &sources {
        tracing::info!("Reading {} ({})", source.path().display(), source.format_name());
        let loaded = source.read_records(loader, &mut seen_ids)?;
        records.extend(loaded.records);
        report.merge(&loaded.report);
    }
    Ok((records, report))
}

pub fn dedup(
    config: &DedupConfig,
    inputs: &[PathBuf],
    outputs: &DedupOutputs,
) -> CommandResult<RunSummary> {
    let pipeline = DedupPipeline::new(config)?;
    let (records, report) = read_inputs(pipeline.loader(), inputs)?;
    let outcome = pipeline.run_records(records, report, &mut LogProgress::default())?;

    let mut publication = Publication::new();
    publication
        .add(&outputs.canonical, canonical_table(&outcome.records)?)
        .add(&outputs.audit, audit_table(&outcome.audit)?);

    if let Some(path) = &outputs.type_counts {
        publication.add(path, type_count_table(&type_counts_of(&outcome.records))?);
    }

    let summary = outcome.summary;
    if let Some(dir) = &outputs.split_dir {
        let split = split_by_type(outcome.records);
        publication
            .add(dir.join(EMPTY_TYPE_FILE), canonical_table(&split.untyped)?)
            .add(dir.join(FILLED_TYPE_FILE), canonical_table(&split.typed)?);
    }

    for path in publication.commit()? {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(summary)
}

/// Returns the untyped and typed record counts
pub fn split(
    config: &DedupConfig,
    input: &Path,
    empty: &Path,
    filled: &Path,
) -> CommandResult<(usize, usize)> {
    let loader = Loader::new(&config.loader);
    let (records, _) = read_inputs(&loader, &[input.to_path_buf()])?;
    let split = split_by_type(records);

    let mut publication = Publication::new();
    publication
        .add(empty, canonical_table(&split.untyped)?)
        .add(filled, canonical_table(&split.typed)?);
    publication.commit()?;

    Ok((split.untyped.len(), split.typed.len()))
}

/// Writes the table to `output`, or returns it when there is no output path
pub fn count_types(
    config: &DedupConfig,
    input: &Path,
    output: Option<&Path>,
) -> CommandResult<Option<String>> {
    let loader = Loader::new(&config.loader);
    let (records, _) = read_inputs(&loader, &[input.to_path_buf()])?;
    let table = type_count_table(&type_counts_of(&records))?;

    match output {
        Some(path) => {
            let mut publication = Publication::new();
            publication.add(path, table);
            publication.commit()?;
            Ok(None)
        }
        None => Ok(Some(String::from_utf8(table)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const RAW: &str = r#"[
      {"place_id": "a", "name": "Farmacia Central", "types": ["pharmacy", "health"],
       "business_status": "OPERATIONAL", "user_ratings_total": 10,
       "geometry": {"location": {"lat": -24.79, "lng": -65.41}}},
      {"place_id": "b", "name": "Farmacia Centrall", "types": [],
       "business_status": "OPERATIONAL", "user_ratings_total": 2,
       "geometry": {"location": {"lat": -24.7895, "lng": -65.41}}},
      {"place_id": "c", "name": "Kiosco Sol", "types": ["point_of_interest"],
       "business_status": "OPERATIONAL",
       "geometry": {"location": {"lat": -24.80, "lng": -65.42}}}
    ]"#;

    #[test]
    fn test_log_progress_deciles() {
        let mut progress = LogProgress::default();
        for done in 1..=20 {
            progress.on_progress(done, 20);
        }
        assert_eq!(progress.last_decile, 10);
        progress.on_progress(0, 0);
    }

    #[test]
    fn test_dedup_writes_all_outputs() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw.json");
        fs::write(&raw, RAW).unwrap();

        let outputs = DedupOutputs {
            canonical: dir.path().join("places.csv"),
            audit: dir.path().join("removed.csv"),
            split_dir: Some(dir.path().join("types")),
            type_counts: Some(dir.path().join("counts.csv")),
        };
        let summary = dedup(&DedupConfig::default(), &[raw], &outputs).unwrap();

        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.surviving, 2);
        let places = fs::read_to_string(&outputs.canonical).unwrap();
        assert_eq!(places.lines().count(), 3);
        let removed = fs::read_to_string(&outputs.audit).unwrap();
        assert!(removed.contains("# PROXIMITY_DUPLICATE\nFarmacia Centrall,"));
        let empty = fs::read_to_string(dir.path().join("types").join(EMPTY_TYPE_FILE)).unwrap();
        assert!(empty.contains(",c\n"));
        let counts = fs::read_to_string(outputs.type_counts.as_ref().unwrap()).unwrap();
        assert_eq!(counts, "type,count\npharmacy,1\n");
    }

    #[test]
    fn test_unknown_input_extension_writes_nothing() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw.json");
        fs::write(&raw, RAW).unwrap();

        let outputs = DedupOutputs {
            canonical: dir.path().join("places.csv"),
            audit: dir.path().join("removed.csv"),
            split_dir: None,
            type_counts: None,
        };
        let inputs = [raw, dir.path().join("more.xlsx")];
        assert!(dedup(&DedupConfig::default(), &inputs, &outputs).is_err());
        assert!(!outputs.canonical.exists());
        assert!(!outputs.audit.exists());
    }

    #[test]
    fn test_count_types_to_stdout() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("places.csv");
        fs::write(
            &table,
            "Name,type,ratings,latitude,longitude,place_id\n\
             A,cafe,1,1.0,1.0,a\n\
             B,,1,2.0,2.0,b\n\
             C,cafe,1,3.0,3.0,c\n",
        )
        .unwrap();

        let out = count_types(&DedupConfig::default(), &table, None).unwrap();
        assert_eq!(out.as_deref(), Some("type,count\ncafe,2\n"));
    }
}
