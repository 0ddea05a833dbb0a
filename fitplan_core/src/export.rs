//! CSV export of activity logs.
//!
//! Exports append to an existing file. Rows whose id is already present are
//! skipped, so repeated exports to the same file never duplicate entries.

use crate::{ActivityLog, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CsvRow {
    id: String,
    date: String,
    activity_type: String,
    duration_minutes: u32,
    calories_burned: Option<u32>,
    plan_id: Option<String>,
    day_number: Option<u32>,
    exercises: String,
    weight_kg: Option<f64>,
    notes: Option<String>,
}

impl From<&ActivityLog> for CsvRow {
    fn from(log: &ActivityLog) -> Self {
        CsvRow {
            id: log.id.to_string(),
            date: log.date.to_rfc3339(),
            activity_type: log.activity_type.to_string(),
            duration_minutes: log.duration_minutes,
            calories_burned: log.calories_burned,
            plan_id: log.plan_id.map(|id| id.to_string()),
            day_number: log.day_number,
            exercises: log.completed_exercises.join(";"),
            weight_kg: log.weight_kg,
            notes: log.notes.clone(),
        }
    }
}

fn exported_ids(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CsvRow>()
        .map(|row| -> Result<String> { Ok(row?.id) })
        .collect()
}

/// Append activity logs to a CSV file, returning the number of rows written
///
/// Headers are written only when the file is new or empty. The file is
/// synced to disk before returning.
pub fn export_activities_csv(logs: &[ActivityLog], path: &Path) -> Result<usize> {
    let seen = exported_ids(path)?;
    let rows: Vec<CsvRow> = logs
        .iter()
        .filter(|log| !seen.contains(&log.id.to_string()))
        .map(CsvRow::from)
        .collect();

    if rows.is_empty() {
        tracing::info!("No new activities to export to {:?}", path);
        return Ok(0);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);
    for row in &rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    tracing::info!("Exported {} activities to {:?}", rows.len(), path);
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityType;
    use chrono::Utc;
    use uuid::Uuid;

    fn log(activity_type: ActivityType) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            date: Utc::now(),
            activity_type,
            duration_minutes: 25,
            calories_burned: Some(180),
            plan_id: None,
            day_number: None,
            completed_exercises: vec!["plank".into(), "lunges".into()],
            weight_kg: None,
            notes: Some("felt good, slept well".into()),
        }
    }

    #[test]
    fn test_export_creates_file_with_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/activities.csv");

        let count = export_activities_csv(&[log(ActivityType::Running)], &path).unwrap();
        assert_eq!(count, 1);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[2], "activity_type");

        let rows: Vec<CsvRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity_type, "running");
        assert_eq!(rows[0].exercises, "plank;lunges");
        assert_eq!(rows[0].notes.as_deref(), Some("felt good, slept well"));
    }

    #[test]
    fn test_export_appends_only_new_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activities.csv");

        let first = log(ActivityType::Walking);
        assert_eq!(export_activities_csv(&[first.clone()], &path).unwrap(), 1);

        let second = log(ActivityType::Yoga);
        assert_eq!(export_activities_csv(&[first, second], &path).unwrap(), 1);

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_export_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activities.csv");
        assert_eq!(export_activities_csv(&[], &path).unwrap(), 0);
        assert!(!path.exists());
    }
}
