use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use ca_core::{Category, Error, NewUpdate, Result, UpdateQuery, UpdateRecord, UpdateStorage};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;
use uuid::Uuid;

use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "updates.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS updates (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        link TEXT NOT NULL,
        content TEXT NOT NULL,
        summary TEXT NOT NULL,
        source TEXT NOT NULL,
        source_url TEXT NOT NULL,
        source_slug TEXT NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS updates_link_category ON updates (link, category)",
    "CREATE INDEX IF NOT EXISTS updates_created_at ON updates (created_at)",
];

pub struct SQLiteStorage {
    pool: SqlitePool,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable (set DATABASE_URL or --database-url)"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        match url {
            Some(url) if url.starts_with("sqlite:") => Self::new_with_url(url).await,
            Some(path) => Self::new_with_path(Path::new(path)).await,
            None => Self::new_with_path(&PathBuf::from(DEFAULT_DB_PATH)).await,
        }
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::open(options, 5).await
    }

    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_error("Invalid database URL"))?
            .create_if_missing(true);
        // every connection to an in-memory database gets its own copy
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        Self::open(options, max_connections).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool })
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse timestamp '{}': {}", raw, e)))
}

fn record_from_row(row: &SqliteRow) -> Result<UpdateRecord> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column).map_err(db_error("Failed to read row"))
    };

    Ok(UpdateRecord {
        id: get("id")?,
        title: get("title")?,
        link: get("link")?,
        content: get("content")?,
        summary: get("summary")?,
        source: get("source")?,
        source_url: get("source_url")?,
        source_slug: get("source_slug")?,
        category: get("category")?.parse()?,
        date: get("date")?,
        created_at: parse_timestamp(&get("created_at")?)?,
        updated_at: parse_timestamp(&get("updated_at")?)?,
    })
}

#[async_trait]
impl UpdateStorage for SQLiteStorage {
    async fn exists(&self, link: &str, category: Option<Category>) -> Result<bool> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM updates WHERE link = ");
        builder.push_bind(link);
        if let Some(category) = category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        builder.push(")");

        let found: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check for existing update"))?;
        Ok(found != 0)
    }

    async fn save(&self, update: NewUpdate) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        let last: Option<String> = sqlx::query_scalar("SELECT MAX(created_at) FROM updates")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to read latest timestamp"))?;
        let now = Utc::now();
        let created_at = match last.as_deref().map(parse_timestamp).transpose()? {
            Some(last) if last > now => last,
            _ => now,
        };
        let created_at = format_timestamp(created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO updates
            (id, title, link, content, summary, source, source_url, source_slug, category, date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&update.title)
        .bind(&update.link)
        .bind(&update.content)
        .bind(&update.summary)
        .bind(&update.source)
        .bind(&update.source_url)
        .bind(&update.source_slug)
        .bind(update.category.as_str())
        .bind(&update.date)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(id = %id, link = %update.link, "stored update");
                Ok(id)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::Duplicate(update.link))
            }
            Err(e) => Err(Error::Persist(e.to_string())),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<UpdateRecord>> {
        let row = sqlx::query("SELECT * FROM updates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load update"))?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn query(&self, query: &UpdateQuery) -> Result<Vec<UpdateRecord>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM updates WHERE 1 = 1");
        if let Some(category) = query.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(source) = &query.source {
            builder.push(" AND source = ").push_bind(source.clone());
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            builder
                .push(" AND (LOWER(title) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(summary) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(source) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(query.effective_limit() as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to query updates"))?;
        rows.iter().map(record_from_row).collect()
    }
}
