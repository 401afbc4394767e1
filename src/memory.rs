use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::StudentStore;
use crate::models::{RiskLevel, StudentRecord};

/// Process-local store for `serve --in-memory` and tests.
#[derive(Default)]
pub struct MemoryStudentStore {
    records: RwLock<Vec<StudentRecord>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, record: &StudentRecord) -> anyhow::Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<StudentRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_level(&self, level: RiskLevel) -> anyhow::Result<Vec<StudentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect())
    }
}
