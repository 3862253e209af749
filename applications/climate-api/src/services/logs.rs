use crate::error::{AppError, Result};
use crate::models::{
    CreateLogResponse, DashboardResponse, DeleteLogResponse, EntryResponse, LatestLogResponse,
    LogListResponse, NewLogEntry, PageParams, PaginatedLogsResponse, StatisticsResponse,
    SummaryResponse,
};
use crate::repositories::LogRepository;
use chrono::Utc;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 1000;
const DASHBOARD_HISTORY_SIZE: i64 = 50;

#[derive(Clone)]
pub struct LogService {
    repository: LogRepository,
}

impl LogService {
    pub fn new(repository: LogRepository) -> Self {
        Self { repository }
    }

    pub async fn list_all(&self) -> Result<LogListResponse> {
        let data = self.repository.list_all().await?;
        if data.is_empty() {
            return Err(AppError::NotFound("No sensor data found".to_string()));
        }
        Ok(LogListResponse {
            success: true,
            count: data.len(),
            data,
        })
    }

    pub async fn create(&self, entry: NewLogEntry) -> Result<CreateLogResponse> {
        if entry.is_empty() {
            return Err(AppError::Validation("No data provided".to_string()));
        }
        let ts = entry.timestamp.unwrap_or_else(Utc::now);
        let stored = self.repository.insert(&entry, ts).await?;
        tracing::info!(key = %stored.id, "stored hourly log");
        Ok(CreateLogResponse {
            success: true,
            key: stored.id,
            data: stored,
        })
    }

    pub async fn latest(&self) -> Result<LatestLogResponse> {
        let entry = self
            .repository
            .latest()
            .await?
            .ok_or_else(|| AppError::NotFound("No sensor data available".to_string()))?;
        Ok(LatestLogResponse {
            success: true,
            timestamp: entry.ts,
            data: entry,
        })
    }

    pub async fn paginated(&self, params: PageParams) -> Result<PaginatedLogsResponse> {
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        let offset = params.offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation("offset must not be negative".to_string()));
        }

        let total = self.repository.count().await?;
        let data = self.repository.page(limit, offset).await?;
        Ok(PaginatedLogsResponse {
            success: true,
            count: data.len(),
            data,
            total,
            offset,
            limit,
        })
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse> {
        let (statistics, total_entries) = self.repository.statistics().await?;
        if total_entries == 0 {
            return Err(AppError::NotFound(
                "No sensor data available for statistics".to_string(),
            ));
        }
        Ok(StatisticsResponse {
            success: true,
            statistics,
            total_entries,
        })
    }

    pub async fn get(&self, key: Uuid) -> Result<EntryResponse> {
        let entry = self
            .repository
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound("Log entry not found".to_string()))?;
        Ok(EntryResponse {
            success: true,
            key,
            data: entry,
        })
    }

    pub async fn update(&self, key: Uuid, entry: NewLogEntry) -> Result<EntryResponse> {
        if entry.is_empty() {
            return Err(AppError::Validation("No data provided".to_string()));
        }
        let updated = self
            .repository
            .update(key, &entry)
            .await?
            .ok_or_else(|| AppError::NotFound("Log entry not found".to_string()))?;
        Ok(EntryResponse {
            success: true,
            key,
            data: updated,
        })
    }

    pub async fn delete(&self, key: Uuid) -> Result<DeleteLogResponse> {
        if !self.repository.delete(key).await? {
            return Err(AppError::NotFound("Log entry not found".to_string()));
        }
        tracing::info!(%key, "deleted hourly log");
        Ok(DeleteLogResponse {
            success: true,
            key,
            message: "Log entry deleted successfully".to_string(),
        })
    }

    /// Newest reading plus recent history in chronological order.
    pub async fn dashboard(&self) -> Result<DashboardResponse> {
        let total_entries = self.repository.count().await?;
        let mut history = self.repository.recent(DASHBOARD_HISTORY_SIZE).await?;
        let current = history.first().cloned();
        history.reverse();
        Ok(DashboardResponse {
            success: true,
            current,
            history,
            total_entries,
        })
    }

    pub async fn summary(&self) -> Result<SummaryResponse> {
        let latest = self.repository.latest().await?;
        let (statistics, total_entries) = self.repository.statistics().await?;
        Ok(SummaryResponse {
            success: true,
            latest,
            statistics,
            status: "online".to_string(),
            total_entries,
        })
    }
}
