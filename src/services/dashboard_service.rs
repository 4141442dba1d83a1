// src/services/dashboard_service.rs

use chrono::{DateTime, Utc};

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary, AppError> {
        self.repo.get_summary(now.date_naive()).await
    }
}
