use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::error::LeaveError;
use crate::model::tenant::TenantId;

pub type HolidaySet = Arc<HashSet<NaiveDate>>;

/// Source of public holidays for a country and year.
///
/// Implementations must fail with [`LeaveError::DependencyUnavailable`]
/// when the data cannot be obtained; an empty set means "no holidays".
#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    async fn holidays(
        &self,
        tenant: TenantId,
        country_code: &str,
        year: i32,
    ) -> Result<HolidaySet, LeaveError>;
}

/// Reads the `public_holidays` table kept in sync by the holiday importer,
/// with a short-lived per (tenant, country, year) cache.
#[derive(Clone)]
pub struct SqlHolidayCalendar {
    pool: MySqlPool,
    cache: Cache<(TenantId, String, i32), HolidaySet>,
}

impl SqlHolidayCalendar {
    pub fn new(pool: MySqlPool, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { pool, cache }
    }

    async fn load(
        &self,
        tenant: TenantId,
        country_code: &str,
        year: i32,
    ) -> Result<HolidaySet, sqlx::Error> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT date
            FROM public_holidays
            WHERE tenant_id = ? AND country_code = ? AND year = ?
            "#,
        )
        .bind(tenant)
        .bind(country_code)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(Arc::new(dates.into_iter().collect()))
    }

    /// Drops the cached set so the next lookup re-reads the table.
    pub async fn invalidate(&self, tenant: TenantId, country_code: &str, year: i32) {
        self.cache
            .invalidate(&(tenant, country_code.to_uppercase(), year))
            .await;
        tracing::debug!(%tenant, country = country_code, year, "Holiday cache entry dropped");
    }
}

#[async_trait]
impl HolidayCalendar for SqlHolidayCalendar {
    async fn holidays(
        &self,
        tenant: TenantId,
        country_code: &str,
        year: i32,
    ) -> Result<HolidaySet, LeaveError> {
        let key = (tenant, country_code.to_uppercase(), year);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let set = self.load(tenant, &key.1, year).await.map_err(|e| {
            tracing::error!(error = %e, %tenant, country = %key.1, year, "Holiday lookup failed");
            LeaveError::DependencyUnavailable(format!(
                "public holidays for {} {} could not be loaded",
                key.1, year
            ))
        })?;

        self.cache.insert(key, set.clone()).await;
        Ok(set)
    }
}
