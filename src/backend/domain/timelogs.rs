/**
 * Timelogs
 *
 * A timelog is opened by `timelog:start` (alias of create) and closed by
 * `timelog:stop` (alias of update). Duration is stored in whole minutes once
 * both ends are known.
 *
 * `GET /api/timelogs` lists them newest first, filtered by task, user
 * (admins only) and a start-time window.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::tasks::Pagination;
use super::{DomainError, DomainResult, EntityId};
use crate::shared::{Identity, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimelogRow {
    pub id: EntityId,
    pub task_id: EntityId,
    pub user_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
}

const TIMELOG_COLUMNS: &str = "id, task_id, user_id, start_time, end_time, duration";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimelog {
    pub task_id: EntityId,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// Body of `timelog:update` / `timelog:stop`; `endTime` defaults to now
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelogPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Query string of `GET /api/timelogs`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub task_id: Option<EntityId>,
    pub user_id: Option<UserId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TimelogQuery {
    pub fn page(&self) -> i64 {
        Pagination::page_of(self.page)
    }

    pub fn limit(&self) -> i64 {
        Pagination::limit_of(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// User filter actually applied: non-admins are pinned to themselves
    pub fn scoped_user(&self, actor: &Identity) -> Option<UserId> {
        if actor.is_admin() {
            self.user_id
        } else {
            Some(actor.user_id)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelogList {
    pub timelogs: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

/// Whole minutes between two instants
///
/// `InvalidPayload` when the end precedes the start.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<i32> {
    let minutes = (end - start).num_minutes();
    if minutes < 0 {
        return Err(DomainError::InvalidPayload("endTime precedes startTime".into()));
    }
    i32::try_from(minutes).map_err(|_| DomainError::InvalidPayload("timelog too long".into()))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TimelogQuery, actor: &Identity) {
    builder.push(" WHERE TRUE");
    if let Some(user_id) = query.scoped_user(actor) {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(task_id) = query.task_id {
        builder.push(" AND task_id = ").push_bind(task_id);
    }
    if let Some(start) = query.start_date {
        builder.push(" AND start_time >= ").push_bind(start);
    }
    if let Some(end) = query.end_date {
        builder.push(" AND start_time <= ").push_bind(end);
    }
}

pub(super) async fn list(
    pool: &PgPool,
    query: &TimelogQuery,
    actor: &Identity,
) -> DomainResult<TimelogList> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM timelogs");
    push_filters(&mut count, query, actor);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select =
        QueryBuilder::<Postgres>::new(format!("SELECT {} FROM timelogs", TIMELOG_COLUMNS));
    push_filters(&mut select, query, actor);
    select
        .push(" ORDER BY start_time DESC, id DESC LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    let rows: Vec<TimelogRow> = select.build_query_as().fetch_all(pool).await?;
    let timelogs = rows
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TimelogList {
        timelogs,
        pagination: Pagination::new(query.page(), query.limit(), total),
    })
}

pub(super) async fn find(pool: &PgPool, id: EntityId) -> DomainResult<Option<TimelogRow>> {
    let row = sqlx::query_as::<_, TimelogRow>(&format!(
        "SELECT {} FROM timelogs WHERE id = $1",
        TIMELOG_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub(super) async fn insert(
    pool: &PgPool,
    input: NewTimelog,
    owner: UserId,
) -> DomainResult<TimelogRow> {
    let start = input.start_time.unwrap_or_else(Utc::now);
    let duration = input
        .end_time
        .map(|end| duration_minutes(start, end))
        .transpose()?;

    let row = sqlx::query_as::<_, TimelogRow>(&format!(
        r#"
        INSERT INTO timelogs (task_id, user_id, start_time, end_time, duration)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        TIMELOG_COLUMNS
    ))
    .bind(input.task_id)
    .bind(owner)
    .bind(start)
    .bind(input.end_time)
    .bind(duration)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Close (or adjust) a timelog, recomputing its duration
pub(super) async fn update(
    pool: &PgPool,
    existing: TimelogRow,
    patch: TimelogPatch,
) -> DomainResult<TimelogRow> {
    let start = patch.start_time.unwrap_or(existing.start_time);
    let end = patch.end_time.or(existing.end_time).unwrap_or_else(Utc::now);
    let duration = duration_minutes(start, end)?;

    let row = sqlx::query_as::<_, TimelogRow>(&format!(
        r#"
        UPDATE timelogs SET start_time = $2, end_time = $3, duration = $4
        WHERE id = $1
        RETURNING {}
        "#,
        TIMELOG_COLUMNS
    ))
    .bind(existing.id)
    .bind(start)
    .bind(end)
    .bind(duration)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    sqlx::query("DELETE FROM timelogs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
