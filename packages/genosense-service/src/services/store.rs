use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::libraries::trend::aggregate_by_date;
use crate::models::{ImageRecord, InfectionRecord, NewInfection, PredictionModel, TrendBucket};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS image_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        upload_date TEXT NOT NULL,
        processed INTEGER NOT NULL DEFAULT 0,
        result_path TEXT
    );
    CREATE TABLE IF NOT EXISTS infection_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        infection_level REAL NOT NULL,
        date_recorded TEXT NOT NULL,
        source_image_id INTEGER REFERENCES image_data(id)
    );
    CREATE TABLE IF NOT EXISTS prediction_model (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        model_type TEXT NOT NULL,
        created_date TEXT NOT NULL,
        accuracy REAL,
        active INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_infection_date ON infection_data(date_recorded);
";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,

    #[error("image {0} not found")]
    ImageNotFound(i64),

    #[error("image {0} has already been processed")]
    AlreadyProcessed(i64),
}

/// Persistent collection of infection observations.
pub trait InfectionRepository {
    /// Insert a batch of observations, returning how many were stored
    fn add_points(&self, batch: &[NewInfection]) -> Result<usize, StoreError>;

    /// Every stored observation, oldest id first
    fn list_all_points(&self) -> Result<Vec<InfectionRecord>, StoreError>;

    /// Count and average level per calendar day, ascending by date
    fn trend_by_date(&self) -> Result<Vec<TrendBucket>, StoreError> {
        Ok(aggregate_by_date(&self.list_all_points()?))
    }
}

/// SQLite-backed store for images, infection points and model metadata.
///
/// A single connection is shared behind a mutex, which also serializes the
/// insert-points-then-mark-processed sequence of an upload.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Record a freshly uploaded image, unprocessed
    pub fn create_image(&self, filename: &str) -> Result<ImageRecord, StoreError> {
        let conn = self.lock()?;
        let upload_date = Utc::now();
        conn.execute(
            "INSERT INTO image_data (filename, upload_date, processed) VALUES (?1, ?2, 0)",
            params![filename, upload_date],
        )?;

        Ok(ImageRecord {
            id: conn.last_insert_rowid(),
            filename: filename.to_string(),
            upload_date,
            processed: false,
            result_path: None,
        })
    }

    pub fn get_image(&self, id: i64) -> Result<Option<ImageRecord>, StoreError> {
        let conn = self.lock()?;
        let image = conn
            .query_row(
                "SELECT id, filename, upload_date, processed, result_path
                 FROM image_data WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ImageRecord {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        upload_date: row.get(2)?,
                        processed: row.get(3)?,
                        result_path: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(image)
    }

    /// Store the points produced for an image and mark it processed.
    ///
    /// Both writes commit together; an image can only be completed once.
    pub fn complete_image_processing(
        &self,
        image_id: i64,
        points: &[NewInfection],
        result_path: Option<&str>,
    ) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let processed: Option<bool> = tx
            .query_row(
                "SELECT processed FROM image_data WHERE id = ?1",
                params![image_id],
                |row| row.get(0),
            )
            .optional()?;
        match processed {
            None => return Err(StoreError::ImageNotFound(image_id)),
            Some(true) => return Err(StoreError::AlreadyProcessed(image_id)),
            Some(false) => {}
        }

        let inserted = insert_points(&tx, points)?;
        tx.execute(
            "UPDATE image_data SET processed = 1, result_path = ?2 WHERE id = ?1",
            params![image_id, result_path],
        )?;
        tx.commit()?;

        debug!("Image {} processed with {} points", image_id, inserted);
        Ok(inserted)
    }

    pub fn add_models(&self, models: &[PredictionModel]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for model in models {
            tx.execute(
                "INSERT INTO prediction_model (name, model_type, created_date, accuracy, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    model.name,
                    model.model_type,
                    model.created_date,
                    model.accuracy,
                    model.active
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list_models(&self) -> Result<Vec<PredictionModel>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, model_type, created_date, accuracy, active
             FROM prediction_model ORDER BY id",
        )?;
        let models = stmt
            .query_map([], |row| {
                Ok(PredictionModel {
                    name: row.get(0)?,
                    model_type: row.get(1)?,
                    created_date: row.get(2)?,
                    accuracy: row.get(3)?,
                    active: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(models)
    }

    pub fn count_models(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(1) FROM prediction_model", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn count_points(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(1) FROM infection_data", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl InfectionRepository for SqliteStore {
    fn add_points(&self, batch: &[NewInfection]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let inserted = insert_points(&tx, batch)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn list_all_points(&self) -> Result<Vec<InfectionRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, latitude, longitude, infection_level, date_recorded, source_image_id
             FROM infection_data ORDER BY id",
        )?;
        let records = stmt
            .query_map([], infection_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn insert_points(conn: &Connection, points: &[NewInfection]) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare(
        "INSERT INTO infection_data
            (latitude, longitude, infection_level, date_recorded, source_image_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for new in points {
        stmt.execute(params![
            new.point.latitude,
            new.point.longitude,
            new.point.level,
            new.recorded_at,
            new.source_image_id
        ])?;
    }
    Ok(points.len())
}

fn infection_from_row(row: &Row<'_>) -> rusqlite::Result<InfectionRecord> {
    let recorded_at: DateTime<Utc> = row.get(4)?;
    Ok(InfectionRecord {
        id: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        level: row.get(3)?,
        recorded_at,
        source_image_id: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InfectionPoint;
    use chrono::TimeZone;

    fn dated(lat: f64, level: f64, day: u32) -> NewInfection {
        NewInfection {
            point: InfectionPoint::new(lat, 101.0, level),
            recorded_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 30, 0).unwrap(),
            source_image_id: None,
        }
    }

    #[test]
    fn test_add_and_list_points() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list_all_points().unwrap().is_empty());

        let inserted = store
            .add_points(&[dated(3.0, 0.2, 1), dated(3.1, 0.4, 1)])
            .unwrap();
        assert_eq!(inserted, 2);

        let records = store.list_all_points().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude, 3.0);
        assert_eq!(records[0].level, 0.2);
        assert_eq!(records[1].day(), "2024-01-01");
        assert!(records[0].id < records[1].id);
        assert_eq!(store.count_points().unwrap(), 2);
    }

    #[test]
    fn test_trend_by_date() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .add_points(&[dated(3.0, 0.6, 2), dated(3.0, 0.2, 1), dated(3.0, 0.4, 1)])
            .unwrap();

        let trend = store.trend_by_date().unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, "2024-01-01");
        assert_eq!(trend[0].count, 2);
        assert!((trend[0].avg_level - 0.3).abs() < 1e-12);
        assert_eq!(trend[1].date, "2024-01-02");
        assert_eq!(trend[1].count, 1);
    }

    #[test]
    fn test_image_processing_commits_points_and_flag() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = store.create_image("block_a.png").unwrap();
        assert!(!image.processed);

        let points = vec![
            NewInfection::from_image(InfectionPoint::new(1.0, 101.0, 0.3), image.id),
            NewInfection::from_image(InfectionPoint::new(1.1, 101.1, 0.7), image.id),
        ];
        let inserted = store
            .complete_image_processing(image.id, &points, Some("uploads/block_a.png"))
            .unwrap();
        assert_eq!(inserted, 2);

        let stored = store.get_image(image.id).unwrap().unwrap();
        assert!(stored.processed);
        assert_eq!(stored.result_path.as_deref(), Some("uploads/block_a.png"));

        let records = store.list_all_points().unwrap();
        assert!(records.iter().all(|r| r.source_image_id == Some(image.id)));
    }

    #[test]
    fn test_image_cannot_be_processed_twice() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = store.create_image("twice.jpg").unwrap();
        let points = vec![NewInfection::from_image(
            InfectionPoint::new(1.0, 101.0, 0.3),
            image.id,
        )];

        store
            .complete_image_processing(image.id, &points, None)
            .unwrap();
        let err = store
            .complete_image_processing(image.id, &points, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyProcessed(id) if id == image.id));
        assert_eq!(store.count_points().unwrap(), 1);
    }

    #[test]
    fn test_unknown_image() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_image(42).unwrap().is_none());
        let err = store.complete_image_processing(42, &[], None).unwrap_err();
        assert!(matches!(err, StoreError::ImageNotFound(42)));
    }

    #[test]
    fn test_models_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.count_models().unwrap(), 0);

        store
            .add_models(&[
                PredictionModel::new("UNet Segmentation", "UNet", 0.89),
                PredictionModel::new("ANN Classifier", "ANN", 0.92),
            ])
            .unwrap();

        let models = store.list_models().unwrap();
        assert_eq!(store.count_models().unwrap(), 2);
        assert_eq!(models[0].name, "UNet Segmentation");
        assert_eq!(models[1].accuracy, Some(0.92));
        assert!(models[1].active);
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genosense.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.add_points(&[dated(2.5, 0.5, 3)]).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let records = reopened.list_all_points().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].day(), "2024-01-03");
    }
}
