use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use uuid::Uuid;

use crate::config::DatabaseArgs;
use crate::models::{LevelCounts, RiskLevel, StudentInput, StudentRecord};
use crate::risk;
use crate::sentiment::PolarityAnalyzer;

/// Persistence for scored student records.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert(&self, record: &StudentRecord) -> anyhow::Result<()>;

    /// Every stored record, oldest first.
    async fn find_all(&self) -> anyhow::Result<Vec<StudentRecord>>;

    /// Records whose `level` matches exactly.
    async fn find_by_level(&self, level: RiskLevel) -> anyhow::Result<Vec<StudentRecord>>;
}

pub async fn connect(args: &DatabaseArgs) -> anyhow::Result<PgPool> {
    let database_url = args
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(args.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<StudentRecord> {
        let level: String = row.try_get("level")?;
        Ok(StudentRecord {
            attendance: row.try_get("attendance")?,
            grades: row.try_get("grades")?,
            assignments: row.try_get("assignments")?,
            mood: row.try_get("mood")?,
            risk: row.try_get("risk")?,
            level: level.parse()?,
        })
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn insert(&self, record: &StudentRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dropout_risk.student_records
            (id, attendance, grades, assignments, mood, risk, level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.attendance)
        .bind(record.grades)
        .bind(record.assignments)
        .bind(&record.mood)
        .bind(record.risk)
        .bind(record.level.as_str())
        .execute(&self.pool)
        .await
        .context("failed to insert student record")?;

        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<StudentRecord>> {
        let rows = sqlx::query(
            "SELECT attendance, grades, assignments, mood, risk, level \
             FROM dropout_risk.student_records \
             ORDER BY recorded_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::record_from_row).collect()
    }

    async fn find_by_level(&self, level: RiskLevel) -> anyhow::Result<Vec<StudentRecord>> {
        let rows = sqlx::query(
            "SELECT attendance, grades, assignments, mood, risk, level \
             FROM dropout_risk.student_records \
             WHERE level = $1 \
             ORDER BY recorded_at, id",
        )
        .bind(level.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::record_from_row).collect()
    }
}

pub fn sample_inputs() -> Vec<StudentInput> {
    vec![
        StudentInput {
            attendance: 85.0,
            grades: 78.0,
            assignments: 90.0,
            mood: "Feeling good and motivated".to_string(),
        },
        StudentInput {
            attendance: 55.0,
            grades: 62.0,
            assignments: 45.0,
            mood: "A bit tired but managing".to_string(),
        },
        StudentInput {
            attendance: 40.0,
            grades: 35.0,
            assignments: 30.0,
            mood: "I feel hopeless and want to give up".to_string(),
        },
    ]
}

/// Scores and stores an input, returning the stored record.
pub async fn record_input(
    store: &dyn StudentStore,
    analyzer: &dyn PolarityAnalyzer,
    input: StudentInput,
) -> anyhow::Result<StudentRecord> {
    let result = risk::score(&input, analyzer);
    let record = StudentRecord::from_scored(input, result);
    store.insert(&record).await?;
    Ok(record)
}

pub async fn seed(
    store: &dyn StudentStore,
    analyzer: &dyn PolarityAnalyzer,
) -> anyhow::Result<Vec<StudentRecord>> {
    let mut inserted = Vec::new();
    for input in sample_inputs() {
        inserted.push(record_input(store, analyzer, input).await?);
    }
    Ok(inserted)
}

pub async fn level_counts(store: &dyn StudentStore) -> anyhow::Result<LevelCounts> {
    let records = store.find_all().await?;
    Ok(LevelCounts::tally(&records))
}

pub async fn import_csv(
    store: &dyn StudentStore,
    analyzer: &dyn PolarityAnalyzer,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_from_reader(store, analyzer, reader).await
}

async fn import_from_reader<R: std::io::Read>(
    store: &dyn StudentStore,
    analyzer: &dyn PolarityAnalyzer,
    mut reader: csv::Reader<R>,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        attendance: f64,
        grades: f64,
        assignments: f64,
        mood: String,
    }

    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", line + 1))?;
        record_input(
            store,
            analyzer,
            StudentInput {
                attendance: row.attendance,
                grades: row.grades,
                assignments: row.assignments,
                mood: row.mood,
            },
        )
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}
