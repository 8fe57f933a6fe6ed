//! Database query and pool metrics.
//!
//! - `database_query_duration_seconds{query, outcome}` histogram
//! - `database_query_errors_total{query}` counter
//! - `database_connections_{active,idle,total}` gauges

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record connection pool gauges. Called on every metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_class_by_id");
/// let result = sqlx::query_as::<_, ClassEntity>(...).fetch_optional(&pool).await;
/// timer.record_result(&result);
/// result
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the call with its outcome; errors also bump the error counter.
    pub fn record_result<T>(self, result: &Result<T, sqlx::Error>) {
        match result {
            Ok(_) => self.observe("ok"),
            Err(_) => {
                counter!("database_query_errors_total", "query" => self.query).increment(1);
                self.observe("error");
            }
        }
    }

    fn observe(self, outcome: &'static str) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_classes");
        assert_eq!(timer.query, "list_classes");
    }

    #[test]
    fn test_record_result_without_recorder() {
        // No recorder installed: both paths are no-ops.
        QueryTimer::new("upsert_attendance_record").record_result(&Ok::<_, sqlx::Error>(()));
        QueryTimer::new("upsert_attendance_record")
            .record_result(&Err::<(), _>(sqlx::Error::RowNotFound));
    }
}
