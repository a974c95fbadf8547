use mondrh_ops::config::AdminSeed;
use mondrh_ops::db::{self, DatabaseLocation, OpenMode, RecoveryPolicy, SchemaOutcome, SqlitePool, repair};
use mondrh_ops::service::{self, PasswordHasher, ProvisionOutcome, SeedCollection, SeedOutcome};
use mondrh_ops::OpsError;
use tempfile::TempDir;

async fn temp_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let location = DatabaseLocation::File(dir.path().join("monderh.db"));
    let pool = db::connect(&location, OpenMode::CreateIfMissing)
        .await
        .expect("failed to open database");
    (dir, pool)
}

async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(sql)
        .fetch_one(pool)
        .await
        .expect("count query failed");
    n
}

fn admin_seed() -> AdminSeed {
    AdminSeed {
        email: "admin@example.test".to_string(),
        password: Some("correct horse battery".to_string()),
        ..AdminSeed::default()
    }
}

#[tokio::test]
async fn fresh_database_is_bootstrapped_provisioned_and_seeded() {
    let (_dir, pool) = temp_db().await;

    let outcome = db::ensure_schema(&pool, RecoveryPolicy::Refuse)
        .await
        .expect("schema bootstrap failed");
    assert_eq!(outcome, SchemaOutcome::Ready);

    let hasher = PasswordHasher::with_iterations(1000);
    let provisioned = service::ensure_admin(&pool, &admin_seed(), &hasher)
        .await
        .expect("admin provisioning failed");
    assert!(matches!(provisioned, ProvisionOutcome::Created { .. }));

    let seeded = service::seed_all(&pool).await;
    assert!(matches!(seeded[0], (SeedCollection::JobPostings, Ok(SeedOutcome::Inserted(2)))));
    assert!(matches!(seeded[1], (SeedCollection::SiteSettings, Ok(SeedOutcome::Inserted(1)))));

    assert_eq!(count(&pool, r#"SELECT COUNT(*) FROM "user" WHERE user_type = 'admin'"#).await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM job_offer").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM site_settings").await, 1);

    // A second full run changes nothing.
    assert_eq!(
        db::ensure_schema(&pool, RecoveryPolicy::Refuse).await.expect("rerun failed"),
        SchemaOutcome::Ready
    );
    let again = service::ensure_admin(&pool, &admin_seed(), &hasher)
        .await
        .expect("admin rerun failed");
    assert!(matches!(again, ProvisionOutcome::AlreadyAdmin { .. }));
    let reseeded = service::seed_all(&pool).await;
    assert!(matches!(reseeded[0].1, Ok(SeedOutcome::Skipped { existing: 2 })));
    assert!(matches!(reseeded[1].1, Ok(SeedOutcome::Skipped { existing: 1 })));
    assert_eq!(count(&pool, r#"SELECT COUNT(*) FROM "user""#).await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM job_offer").await, 2);
}

#[tokio::test]
async fn bootstrap_on_valid_schema_keeps_rows_even_with_recovery_enabled() {
    let (_dir, pool) = temp_db().await;
    db::ensure_schema(&pool, RecoveryPolicy::Refuse)
        .await
        .expect("schema bootstrap failed");
    service::seed_all(&pool).await;

    let outcome = db::ensure_schema(&pool, RecoveryPolicy::DropAndRecreate)
        .await
        .expect("second bootstrap failed");
    assert_eq!(outcome, SchemaOutcome::Ready);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM job_offer").await, 2);
}

const OLD_APPLICATION_TABLE: &str = r#"
CREATE TABLE application (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NULL REFERENCES "user"(id),
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    email VARCHAR(120) NOT NULL,
    phone VARCHAR(20) NULL,
    position VARCHAR(200) NULL,
    cv_filename VARCHAR(255) NULL,
    cover_letter TEXT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
)
"#;

#[tokio::test]
async fn old_application_table_gets_late_columns_without_losing_rows() {
    let (_dir, pool) = temp_db().await;
    sqlx::query(OLD_APPLICATION_TABLE)
        .execute(&pool)
        .await
        .expect("failed to create old table");
    sqlx::query(
        "INSERT INTO application (first_name, last_name, email, created_at) \
         VALUES ('Awa', 'Diop', 'awa@example.test', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .expect("failed to insert application");

    let outcome = db::ensure_schema(&pool, RecoveryPolicy::Refuse)
        .await
        .expect("bootstrap failed");
    assert_eq!(
        outcome,
        SchemaOutcome::Repaired {
            added: vec![
                "application.job_offer_id".to_string(),
                "application.google_drive_link".to_string(),
            ]
        }
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM application").await, 1);

    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    let added = repair::repair_columns(&mut conn)
        .await
        .expect("second repair failed");
    assert!(added.is_empty());
}

async fn break_job_offer_schema(pool: &SqlitePool) {
    db::ensure_schema(pool, RecoveryPolicy::Refuse)
        .await
        .expect("schema bootstrap failed");
    service::seed_if_empty(pool, SeedCollection::JobPostings)
        .await
        .expect("seeding failed");
    sqlx::query("ALTER TABLE job_offer RENAME COLUMN title TO headline")
        .execute(pool)
        .await
        .expect("failed to rename column");
}

#[tokio::test]
async fn broken_schema_is_left_untouched_without_opt_in() {
    let (_dir, pool) = temp_db().await;
    break_job_offer_schema(&pool).await;

    let err = db::ensure_schema(&pool, RecoveryPolicy::Refuse)
        .await
        .expect_err("verification should fail");
    assert!(matches!(
        err,
        OpsError::SchemaVerificationFailed { table: "job_offer", .. }
    ));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM job_offer").await, 2);
}

#[tokio::test]
async fn broken_schema_is_recreated_empty_with_opt_in() {
    let (_dir, pool) = temp_db().await;
    break_job_offer_schema(&pool).await;

    let outcome = db::ensure_schema(&pool, RecoveryPolicy::DropAndRecreate)
        .await
        .expect("destructive recovery failed");
    let SchemaOutcome::Recreated { dropped } = outcome else {
        panic!("expected a recreate, got {outcome:?}");
    };
    assert_eq!(dropped.len(), db::schema::TABLES.len());
    assert!(dropped.contains(&"job_offer"));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM job_offer").await, 0);
}
