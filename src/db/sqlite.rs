use crate::db::location::{DatabaseLocation, OpenMode};
use crate::db::models::{ColumnInfo, DbAccount, JobPosting, NewAccount, SiteSettings};
use crate::db::schema::{SQLITE_INIT, TABLES, TableSpec};
use crate::error::OpsError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, user_type, is_active, created_at";

/// Open a pool on `location`. With `OpenMode::MustExist` a missing file is
/// an error instead of a new empty database.
pub async fn connect(location: &DatabaseLocation, mode: OpenMode) -> Result<SqlitePool, OpsError> {
    let pool = match location {
        // Every in-memory connection is its own database; keep a single one.
        DatabaseLocation::Memory => {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        }
        DatabaseLocation::File(path) => {
            match mode {
                OpenMode::MustExist if !path.is_file() => {
                    return Err(OpsError::DatabaseNotFound(path.clone()));
                }
                OpenMode::CreateIfMissing => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                OpenMode::MustExist => {}
            }
            let connect_opts = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(mode == OpenMode::CreateIfMissing);
            SqlitePoolOptions::new().connect_with(connect_opts).await?
        }
    };
    debug!(database = %location.describe(), ?mode, "database pool opened");
    Ok(pool)
}

/// Execute a bundle of `;`-separated statements one by one
/// (sqlx::query only takes a single statement).
pub async fn exec_script(conn: &mut SqliteConnection, script: &str) -> Result<(), OpsError> {
    for stmt in script.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&mut *conn).await?;
    }
    Ok(())
}

pub async fn create_tables(conn: &mut SqliteConnection) -> Result<(), OpsError> {
    exec_script(conn, SQLITE_INIT).await
}

/// Drop every managed table, referencing tables first.
pub async fn drop_tables(conn: &mut SqliteConnection) -> Result<Vec<&'static str>, OpsError> {
    let mut dropped = Vec::with_capacity(TABLES.len());
    for table in TABLES.iter().rev() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.quoted()))
            .execute(&mut *conn)
            .await?;
        dropped.push(table.name);
    }
    Ok(dropped)
}

/// Select every expected column of `table`; fails if the table or any
/// column is missing.
pub async fn probe_table(conn: &mut SqliteConnection, table: &TableSpec) -> Result<(), sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} LIMIT 1",
        table.columns.join(", "),
        table.quoted()
    );
    sqlx::query(&sql).fetch_optional(&mut *conn).await?;
    Ok(())
}

pub async fn ping(conn: &mut SqliteConnection) -> Result<(), OpsError> {
    sqlx::query("SELECT 1").execute(&mut *conn).await?;
    Ok(())
}

pub async fn count(conn: &mut SqliteConnection, table: &TableSpec) -> Result<i64, OpsError> {
    let rec: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table.quoted()))
        .fetch_one(&mut *conn)
        .await?;
    Ok(rec.0)
}

pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &TableSpec,
) -> Result<Vec<ColumnInfo>, OpsError> {
    let cols = sqlx::query_as::<_, ColumnInfo>(&format!("PRAGMA table_info({})", table.quoted()))
        .fetch_all(&mut *conn)
        .await?;
    Ok(cols)
}

pub async fn add_column(
    conn: &mut SqliteConnection,
    table: &TableSpec,
    column: &str,
    definition: &str,
) -> Result<(), OpsError> {
    sqlx::query(&format!(
        "ALTER TABLE {} ADD COLUMN {column} {definition}",
        table.quoted()
    ))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_account_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<DbAccount>, OpsError> {
    let account = sqlx::query_as::<_, DbAccount>(&format!(
        r#"SELECT {ACCOUNT_COLUMNS} FROM "user" WHERE email = ?"#
    ))
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(account)
}

/// Accounts whose `user_type` equals (or, with `negate`, differs from) `user_type`.
pub async fn list_accounts_by_type(
    conn: &mut SqliteConnection,
    user_type: &str,
    negate: bool,
) -> Result<Vec<DbAccount>, OpsError> {
    let op = if negate { "!=" } else { "=" };
    let accounts = sqlx::query_as::<_, DbAccount>(&format!(
        r#"SELECT {ACCOUNT_COLUMNS} FROM "user" WHERE user_type {op} ? ORDER BY id"#
    ))
    .bind(user_type)
    .fetch_all(&mut *conn)
    .await?;
    Ok(accounts)
}

/// Insert a new account and return its row id.
pub async fn insert_account(
    conn: &mut SqliteConnection,
    account: &NewAccount<'_>,
) -> Result<i64, OpsError> {
    let res = sqlx::query(
        r#"
        INSERT INTO "user" (
            email, password_hash, first_name, last_name, user_type, is_active, created_at
        ) VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(account.email)
    .bind(account.password_hash)
    .bind(account.first_name)
    .bind(account.last_name)
    .bind(account.user_type)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn set_user_type(
    conn: &mut SqliteConnection,
    id: i64,
    user_type: &str,
) -> Result<(), OpsError> {
    sqlx::query(r#"UPDATE "user" SET user_type = ? WHERE id = ?"#)
        .bind(user_type)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_job_posting(
    conn: &mut SqliteConnection,
    job: &JobPosting,
) -> Result<i64, OpsError> {
    let res = sqlx::query(
        r#"
        INSERT INTO job_offer (
            title, company, location, contract_type, experience_level, salary_range,
            description, requirements, benefits, department, is_active, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.title)
    .bind(job.company)
    .bind(job.location)
    .bind(job.contract_type)
    .bind(job.experience_level)
    .bind(job.salary_range)
    .bind(job.description)
    .bind(job.requirements)
    .bind(job.benefits)
    .bind(job.department)
    .bind(job.is_active)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn insert_site_settings(
    conn: &mut SqliteConnection,
    settings: &SiteSettings,
) -> Result<i64, OpsError> {
    let res = sqlx::query(
        r#"
        INSERT INTO site_settings (
            site_name, site_description, contact_email, contact_phone, address,
            hero_title, hero_subtitle
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(settings.site_name)
    .bind(settings.site_description)
    .bind(settings.contact_email)
    .bind(settings.contact_phone)
    .bind(settings.address)
    .bind(settings.hero_title)
    .bind(settings.hero_subtitle)
    .execute(&mut *conn)
    .await?;
    Ok(res.last_insert_rowid())
}
