//! Outer join of detector tables with monthly annotation files.
//!
//! Detection rows are keyed by the folder of their `file_name`, annotation
//! entries by their own `folder`. Every key seen on either side produces at
//! least one merged row; keys present on both sides pair every detection row
//! with every annotation entry.

use crate::constants::detections::MONTH_FILE_PREFIX;
use crate::constants::merged;
use crate::detections::{DetectionLayout, DetectionRow, DetectionTable};
use crate::error::{Error, Result};
use crate::frames::folder_key;
use crate::output::{MergedTable, MonthlyEntry, read_monthly, write_merged};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Columns appended after the detector's own columns.
const ANNOTATION_COLUMNS: [&str; 6] = [
    merged::FOLDER,
    merged::SPECIES,
    merged::COUNT,
    merged::SUMMARY,
    merged::INDIVIDUALS,
    merged::SAMPLE_IMAGE,
];

/// Row counts of one join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Keys present in both sources.
    pub matched: usize,
    /// Keys present only in the detection table.
    pub detection_only: usize,
    /// Keys present only in the annotation file.
    pub annotation_only: usize,
}

#[derive(Default)]
struct KeyedRows<'a> {
    detections: Vec<&'a DetectionRow>,
    annotations: Vec<&'a MonthlyEntry>,
}

/// Full outer join on folder key, ordered by key.
pub fn outer_join(
    table: &DetectionTable,
    entries: &[MonthlyEntry],
) -> Result<(MergedTable, JoinStats)> {
    // A detector column named like the join key is replaced by the key itself.
    let kept_columns: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, h)| h.as_str() != merged::FOLDER)
        .map(|(i, _)| i)
        .collect();

    let mut headers: Vec<String> = kept_columns
        .iter()
        .map(|&i| table.headers()[i].clone())
        .collect();
    headers.extend(ANNOTATION_COLUMNS.iter().map(ToString::to_string));

    let mut keyed: BTreeMap<String, KeyedRows<'_>> = BTreeMap::new();
    for row in table.rows() {
        keyed.entry(row.folder_key()).or_default().detections.push(row);
    }
    for entry in entries {
        keyed
            .entry(folder_key(Path::new(&entry.folder)))
            .or_default()
            .annotations
            .push(entry);
    }

    let mut stats = JoinStats::default();
    let mut rows = Vec::new();

    for (key, group) in &keyed {
        match (group.detections.is_empty(), group.annotations.is_empty()) {
            (false, false) => stats.matched += 1,
            (false, true) => stats.detection_only += 1,
            (true, false) => stats.annotation_only += 1,
            (true, true) => continue,
        }

        let detection_side: Vec<Vec<String>> = if group.detections.is_empty() {
            vec![vec![String::new(); kept_columns.len()]]
        } else {
            group
                .detections
                .iter()
                .map(|row| {
                    kept_columns
                        .iter()
                        .map(|&i| row.values.get(i).cloned().unwrap_or_default())
                        .collect()
                })
                .collect()
        };

        let annotation_side: Vec<Vec<String>> = if group.annotations.is_empty() {
            vec![vec![String::new(); ANNOTATION_COLUMNS.len() - 1]]
        } else {
            group
                .annotations
                .iter()
                .copied()
                .map(annotation_fields)
                .collect::<Result<_>>()?
        };

        for left in &detection_side {
            for right in &annotation_side {
                let mut row = Vec::with_capacity(headers.len());
                row.extend(left.iter().cloned());
                row.push(key.clone());
                row.extend(right.iter().cloned());
                rows.push(row);
            }
        }
    }

    Ok((MergedTable { headers, rows }, stats))
}

/// Annotation-derived columns, excluding the join key.
fn annotation_fields(entry: &MonthlyEntry) -> Result<Vec<String>> {
    let record = &entry.analysis;
    let individuals = serde_json::to_string(&record.individuals).map_err(|e| Error::Internal {
        message: format!("failed to serialize individuals of {}: {e}", entry.folder),
    })?;

    Ok(vec![
        record.species().join(", "),
        record.count.to_string(),
        record.summary.clone(),
        individuals,
        entry.sample_image().unwrap_or_default(),
    ])
}

/// Month key of a monthly annotation file, e.g. `202506.json` -> `202506`.
pub fn month_from_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let month = stem.strip_prefix(MONTH_FILE_PREFIX).unwrap_or(&stem);
    (!month.is_empty()).then(|| month.to_string())
}

/// Merge one month's annotations with its detection table.
///
/// Both inputs must exist. Returns the path of the merged table.
pub fn merge_month(month: &str, annotations: &Path, layout: &DetectionLayout) -> Result<PathBuf> {
    let entries = read_monthly(annotations)?;
    let table = DetectionTable::load(&layout.table_path(month))?;

    let (merged, stats) = outer_join(&table, &entries)?;
    let output = layout.merged_path(month);
    write_merged(&output, &merged)?;

    info!(
        "Merged {month}: {} row(s), {} matched, {} detection-only, {} annotation-only -> {}",
        merged.rows.len(),
        stats.matched,
        stats.detection_only,
        stats.annotation_only,
        output.display()
    );
    Ok(output)
}

/// Result of merging every month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeAllSummary {
    /// Merged tables written.
    pub merged: Vec<PathBuf>,
    /// Months skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Merge every monthly file in `annotations_dir`, skipping months that fail.
pub fn merge_all(annotations_dir: &Path, layout: &DetectionLayout) -> Result<MergeAllSummary> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(annotations_dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with('.'))
        })
        .collect();
    files.sort();

    let mut summary = MergeAllSummary::default();
    if files.is_empty() {
        info!("No JSON files found in {}", annotations_dir.display());
        return Ok(summary);
    }

    for file in files {
        let name = file.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let Some(month) = month_from_file(&file) else {
            warn!("Skipping {name}: no month key");
            summary.skipped.push((name, "no month key".to_string()));
            continue;
        };

        let table_path = layout.table_path(&month);
        if !table_path.exists() {
            let reason = format!("detection table not found: {}", table_path.display());
            warn!("Skipping {name}: {reason}");
            summary.skipped.push((month, reason));
            continue;
        }

        match merge_month(&month, &file, layout) {
            Ok(path) => summary.merged.push(path),
            Err(e) => {
                warn!("Skipping {name}: {e}");
                summary.skipped.push((month, e.to_string()));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::annotate::{AnnotationRecord, Individual};
    use crate::config::DetectionsConfig;
    use crate::output::{FolderMetadata, write_monthly};
    use std::fs;
    use tempfile::TempDir;

    fn individual(id: &str, species: &str) -> Individual {
        Individual {
            id: id.to_string(),
            species: species.to_string(),
            sex: "unknown".to_string(),
            approx_age: "adult".to_string(),
            health: "healthy".to_string(),
            activity: "grazing".to_string(),
            interaction: "none".to_string(),
            notes: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    fn entry(folder: &str, individuals: Vec<Individual>) -> MonthlyEntry {
        MonthlyEntry {
            folder: folder.to_string(),
            image_frames: vec!["f002.jpg".to_string(), "f006.jpg".to_string()],
            analysis: AnnotationRecord {
                count: u32::try_from(individuals.len()).unwrap(),
                individuals,
                summary: "Scene.".to_string(),
                ..AnnotationRecord::default()
            },
            metadata: FolderMetadata {
                total_images_in_folder: 9,
                sampled_images: 2,
            },
        }
    }

    fn table(dir: &Path, contents: &str) -> DetectionTable {
        let path = dir.join("table.csv");
        fs::write(&path, contents).unwrap();
        DetectionTable::load(&path).unwrap()
    }

    fn layout(dir: &Path) -> DetectionLayout {
        DetectionLayout::from_config(&DetectionsConfig {
            dir: dir.to_path_buf(),
            ..DetectionsConfig::default()
        })
    }

    #[test]
    fn test_outer_join_keeps_both_sides() {
        let dir = TempDir::new().unwrap();
        let table = table(
            dir.path(),
            "file_name,species,max_count\n\
             Frames/202506/siteA/f003.jpg,elk,2\n\
             Frames/202506/siteB/f001.jpg,deer,1\n",
        );
        let entries = vec![
            entry(
                "Frames/202506/siteA",
                vec![individual("elk_1", "elk"), individual("elk_2", "elk")],
            ),
            entry("./Frames/202506/siteC", vec![individual("bear_1", "black bear")]),
        ];

        let (merged, stats) = outer_join(&table, &entries).unwrap();
        assert_eq!(
            stats,
            JoinStats {
                matched: 1,
                detection_only: 1,
                annotation_only: 1
            }
        );
        assert_eq!(
            merged.headers,
            vec![
                "file_name",
                "species",
                "max_count",
                "folder",
                "gpt_species",
                "gpt_count",
                "gpt_summary",
                "gpt_individuals",
                "sample_image"
            ]
        );
        assert_eq!(merged.rows.len(), 3);

        assert_eq!(merged.value(0, "folder"), Some("Frames/202506/siteA"));
        assert_eq!(merged.value(0, "species"), Some("elk"));
        assert_eq!(merged.value(0, "gpt_species"), Some("elk"));
        assert_eq!(merged.value(0, "gpt_count"), Some("2"));
        assert_eq!(
            merged.value(0, "sample_image"),
            Some("Frames/202506/siteA/f002.jpg")
        );
        let individuals: Vec<Individual> =
            serde_json::from_str(merged.value(0, "gpt_individuals").unwrap()).unwrap();
        assert_eq!(individuals.len(), 2);

        assert_eq!(merged.value(1, "folder"), Some("Frames/202506/siteB"));
        assert_eq!(merged.value(1, "gpt_species"), Some(""));
        assert_eq!(merged.value(1, "gpt_count"), Some(""));

        assert_eq!(merged.value(2, "folder"), Some("Frames/202506/siteC"));
        assert_eq!(merged.value(2, "file_name"), Some(""));
        assert_eq!(merged.value(2, "gpt_species"), Some("black bear"));
    }

    #[test]
    fn test_every_folder_appears_once() {
        let dir = TempDir::new().unwrap();
        let table = table(
            dir.path(),
            "file_name,species\n\
             Frames/202506/a/f1.jpg,elk\n\
             Frames/202506/b/f1.jpg,elk\n\
             Frames/202506/c/f1.jpg,moose\n",
        );
        let entries = vec![
            entry("Frames/202506/b", vec![]),
            entry("Frames/202506/d", vec![]),
        ];

        let (merged, _) = outer_join(&table, &entries).unwrap();
        let folders: Vec<&str> = (0..merged.rows.len())
            .map(|i| merged.value(i, "folder").unwrap())
            .collect();
        assert_eq!(
            folders,
            vec![
                "Frames/202506/a",
                "Frames/202506/b",
                "Frames/202506/c",
                "Frames/202506/d"
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_pair_all_rows() {
        let dir = TempDir::new().unwrap();
        let table = table(
            dir.path(),
            "file_name,species\n\
             Frames/202506/a/f1.jpg,elk\n\
             Frames/202506/a/f9.jpg,deer\n",
        );
        let entries = vec![entry("Frames/202506/a", vec![])];

        let (merged, stats) = outer_join(&table, &entries).unwrap();
        assert_eq!(merged.rows.len(), 2);
        assert_eq!(stats.matched, 1);
    }

    #[test]
    fn test_detector_folder_column_is_replaced() {
        let dir = TempDir::new().unwrap();
        let table = table(
            dir.path(),
            "folder,file_name,species\nstale,Frames/202506/a/f1.jpg,elk\n",
        );
        let (merged, _) = outer_join(&table, &[]).unwrap();
        assert_eq!(merged.headers.iter().filter(|h| *h == "folder").count(), 1);
        assert_eq!(merged.value(0, "folder"), Some("Frames/202506/a"));
    }

    #[test]
    fn test_month_from_file() {
        assert_eq!(month_from_file(Path::new("lvlm/202506.json")).as_deref(), Some("202506"));
        assert_eq!(
            month_from_file(Path::new("predictions_202507.json")).as_deref(),
            Some("202507")
        );
        assert_eq!(month_from_file(Path::new("predictions_.json")), None);
    }

    #[test]
    fn test_merge_month_writes_next_to_table() {
        let lvlm = TempDir::new().unwrap();
        let batch = TempDir::new().unwrap();
        let month_dir = batch.path().join("predictions_202506_smoothed");
        fs::create_dir_all(&month_dir).unwrap();
        fs::write(
            month_dir.join("sequence_max_detections.csv"),
            "file_name,species\nFrames/202506/siteA/f1.jpg,elk\n",
        )
        .unwrap();
        let json = lvlm.path().join("202506.json");
        write_monthly(&json, &[entry("Frames/202506/siteA", vec![])]).unwrap();

        let output = merge_month("202506", &json, &layout(batch.path())).unwrap();
        assert_eq!(output, month_dir.join("merged_202506.csv"));

        let mut reader = csv::Reader::from_path(&output).unwrap();
        assert_eq!(reader.records().count(), 1);
    }

    #[test]
    fn test_merge_month_missing_inputs() {
        let lvlm = TempDir::new().unwrap();
        let batch = TempDir::new().unwrap();
        let json = lvlm.path().join("202506.json");

        assert!(matches!(
            merge_month("202506", &json, &layout(batch.path())),
            Err(Error::AnnotationFileNotFound { .. })
        ));

        write_monthly(&json, &[]).unwrap();
        assert!(matches!(
            merge_month("202506", &json, &layout(batch.path())),
            Err(Error::DetectionTableNotFound { .. })
        ));
    }

    #[test]
    fn test_merge_all_skips_months_without_tables() {
        let lvlm = TempDir::new().unwrap();
        let batch = TempDir::new().unwrap();
        let june = batch.path().join("predictions_202506_smoothed");
        fs::create_dir_all(&june).unwrap();
        fs::write(
            june.join("sequence_max_detections.csv"),
            "file_name,species\nFrames/202506/siteA/f1.jpg,elk\n",
        )
        .unwrap();

        write_monthly(&lvlm.path().join("202506.json"), &[]).unwrap();
        write_monthly(&lvlm.path().join("202507.json"), &[]).unwrap();
        fs::write(lvlm.path().join("wildlife_lvlm_log.txt"), "folder\n").unwrap();

        let summary = merge_all(lvlm.path(), &layout(batch.path())).unwrap();
        assert_eq!(summary.merged, vec![june.join("merged_202506.csv")]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, "202507");
    }

    #[test]
    fn test_merge_all_empty_dir() {
        let lvlm = TempDir::new().unwrap();
        let batch = TempDir::new().unwrap();
        let summary = merge_all(lvlm.path(), &layout(batch.path())).unwrap();
        assert!(summary.merged.is_empty());
        assert!(summary.skipped.is_empty());
    }
}
