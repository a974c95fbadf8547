use mondrh_ops::config::AdminSeed;
use mondrh_ops::db::models::NewAccount;
use mondrh_ops::db::{self, DatabaseLocation, OpenMode, RecoveryPolicy, SqlitePool, sqlite};
use mondrh_ops::service::seed::SAMPLE_JOBS;
use mondrh_ops::service::{
    self, LoginCheck, PasswordHasher, ProvisionOutcome, SeedCollection, SeedOutcome,
};
use mondrh_ops::OpsError;
use tempfile::TempDir;

async fn bootstrapped_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let location = DatabaseLocation::File(dir.path().join("monderh.db"));
    let pool = db::connect(&location, OpenMode::CreateIfMissing)
        .await
        .expect("failed to open database");
    db::ensure_schema(&pool, RecoveryPolicy::Refuse)
        .await
        .expect("schema bootstrap failed");
    (dir, pool)
}

fn seed_with(password: Option<&str>) -> AdminSeed {
    AdminSeed {
        email: "admin@example.test".to_string(),
        password: password.map(str::to_string),
        ..AdminSeed::default()
    }
}

async fn user_count(pool: &SqlitePool) -> i64 {
    let (n,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "user""#)
        .fetch_one(pool)
        .await
        .expect("count query failed");
    n
}

#[tokio::test]
async fn ensure_admin_twice_leaves_one_admin() {
    let (_dir, pool) = bootstrapped_db().await;
    let hasher = PasswordHasher::with_iterations(1000);
    let seed = seed_with(Some("first-password"));

    let first = service::ensure_admin(&pool, &seed, &hasher)
        .await
        .expect("first run failed");
    let ProvisionOutcome::Created { id } = first else {
        panic!("expected creation, got {first:?}");
    };
    let second = service::ensure_admin(&pool, &seed, &hasher)
        .await
        .expect("second run failed");
    assert_eq!(second, ProvisionOutcome::AlreadyAdmin { id });
    assert_eq!(user_count(&pool).await, 1);
}

#[tokio::test]
async fn existing_candidate_is_promoted_in_place() {
    let (_dir, pool) = bootstrapped_db().await;
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    let id = sqlite::insert_account(
        &mut conn,
        &NewAccount {
            email: "admin@example.test",
            password_hash: "legacy-hash",
            first_name: "Fatou",
            last_name: "Sow",
            user_type: "candidate",
        },
    )
    .await
    .expect("failed to insert candidate");
    drop(conn);

    let hasher = PasswordHasher::with_iterations(1000);
    let outcome = service::ensure_admin(&pool, &seed_with(Some("ignored")), &hasher)
        .await
        .expect("promotion failed");
    assert_eq!(
        outcome,
        ProvisionOutcome::Promoted {
            id,
            previous: "candidate".to_string()
        }
    );

    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    let account = sqlite::find_account_by_email(&mut conn, "admin@example.test")
        .await
        .expect("lookup failed")
        .expect("account vanished");
    assert_eq!(account.user_type, "admin");
    assert_eq!(account.password_hash, "legacy-hash");
    assert_eq!(account.first_name, "Fatou");
    assert_eq!(user_count(&pool).await, 1);
}

#[tokio::test]
async fn missing_password_is_a_config_error_and_writes_nothing() {
    let (_dir, pool) = bootstrapped_db().await;
    let err = service::ensure_admin(&pool, &seed_with(None), &PasswordHasher::with_iterations(1000))
        .await
        .expect_err("provisioning without a password must fail");
    assert!(matches!(err, OpsError::MissingConfig("MONDRH_ADMIN__PASSWORD")));
    assert_eq!(user_count(&pool).await, 0);
}

#[tokio::test]
async fn seeding_skips_a_collection_with_any_row() {
    let (_dir, pool) = bootstrapped_db().await;
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    sqlite::insert_job_posting(&mut conn, &SAMPLE_JOBS[0])
        .await
        .expect("failed to insert posting");
    drop(conn);

    let outcome = service::seed_if_empty(&pool, SeedCollection::JobPostings)
        .await
        .expect("seeding failed");
    assert_eq!(outcome, SeedOutcome::Skipped { existing: 1 });

    let settings = service::seed_if_empty(&pool, SeedCollection::SiteSettings)
        .await
        .expect("seeding failed");
    assert_eq!(settings, SeedOutcome::Inserted(1));
}

#[tokio::test]
async fn login_check_detects_a_changed_password() {
    let (_dir, pool) = bootstrapped_db().await;
    let hasher = PasswordHasher::with_iterations(1000);
    service::ensure_admin(&pool, &seed_with(Some("stored-password")), &hasher)
        .await
        .expect("provisioning failed");

    let check = service::check_admin_login(&pool, &seed_with(Some("other-password")), &hasher)
        .await
        .expect("login check failed");
    assert_eq!(check, LoginCheck::WrongPassword);

    let check = service::check_admin_login(&pool, &seed_with(Some("stored-password")), &hasher)
        .await
        .expect("login check failed");
    assert_eq!(check, LoginCheck::Verified);

    let check = service::check_admin_login(&pool, &seed_with(None), &hasher)
        .await
        .expect("login check failed");
    assert_eq!(check, LoginCheck::Skipped);
}

#[tokio::test]
async fn diagnose_lists_other_users_only_without_admins() {
    let (_dir, pool) = bootstrapped_db().await;
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    sqlite::insert_account(
        &mut conn,
        &NewAccount {
            email: "candidate@example.test",
            password_hash: "x",
            first_name: "Moussa",
            last_name: "Ba",
            user_type: "candidate",
        },
    )
    .await
    .expect("failed to insert candidate");
    drop(conn);

    let diagnosis = service::diagnose(&pool).await.expect("diagnose failed");
    assert!(!diagnosis.has_admin());
    assert_eq!(diagnosis.total_users, 1);
    assert_eq!(diagnosis.others.len(), 1);
    assert!(diagnosis.columns.iter().any(|c| c.name == "user_type"));

    let hasher = PasswordHasher::with_iterations(1000);
    service::ensure_admin(&pool, &seed_with(Some("pw")), &hasher)
        .await
        .expect("provisioning failed");
    let diagnosis = service::diagnose(&pool).await.expect("diagnose failed");
    assert_eq!(diagnosis.admins.len(), 1);
    assert!(diagnosis.others.is_empty());
    assert_eq!(diagnosis.total_users, 2);
}

#[tokio::test]
async fn created_admin_hash_is_readable_by_the_web_application() {
    let (_dir, pool) = bootstrapped_db().await;
    let hasher = PasswordHasher::with_iterations(1000);
    service::ensure_admin(&pool, &seed_with(Some("admin124")), &hasher)
        .await
        .expect("provisioning failed");

    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    let account = sqlite::find_account_by_email(&mut conn, "admin@example.test")
        .await
        .expect("lookup failed")
        .expect("admin missing");
    assert!(account.password_hash.starts_with("pbkdf2:sha256:1000$"));
    assert_eq!(account.password_hash.split('$').count(), 3);
}

#[tokio::test]
async fn hash_written_by_the_web_application_verifies() {
    let (_dir, pool) = bootstrapped_db().await;
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    sqlite::insert_account(
        &mut conn,
        &NewAccount {
            email: "admin@example.test",
            password_hash: "pbkdf2:sha256:1000$pSODvn6f8KQHgZK4$1e2f3d6b9bbbb5ba3e991cf45df28e3281b385c68538279c4d8b86ae0306ee22",
            first_name: "Admin",
            last_name: "MondeRH",
            user_type: "admin",
        },
    )
    .await
    .expect("failed to insert admin");
    drop(conn);

    let hasher = PasswordHasher::default();
    let check = service::check_admin_login(&pool, &seed_with(Some("admin124")), &hasher)
        .await
        .expect("login check failed");
    assert_eq!(check, LoginCheck::Verified);
}

#[tokio::test]
async fn argon2_hash_is_reported_as_unsupported() {
    let (_dir, pool) = bootstrapped_db().await;
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    sqlite::insert_account(
        &mut conn,
        &NewAccount {
            email: "admin@example.test",
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            first_name: "Admin",
            last_name: "MondeRH",
            user_type: "admin",
        },
    )
    .await
    .expect("failed to insert admin");
    drop(conn);

    let check = service::check_admin_login(&pool, &seed_with(Some("x")), &PasswordHasher::default())
        .await
        .expect("login check failed");
    assert_eq!(check, LoginCheck::UnsupportedHash);
}

#[tokio::test]
async fn failed_admin_insert_errors_and_leaves_no_account() {
    let (_dir, pool) = bootstrapped_db().await;
    sqlx::query(
        r#"CREATE TRIGGER reject_accounts BEFORE INSERT ON "user"
           BEGIN SELECT RAISE(ABORT, 'rejected'); END"#,
    )
    .execute(&pool)
    .await
    .expect("failed to create trigger");

    let err = service::ensure_admin(&pool, &seed_with(Some("pw")), &PasswordHasher::with_iterations(1000))
        .await
        .expect_err("insert should have been rejected");
    assert!(err.to_string().contains("rejected"), "{err}");
    assert_eq!(user_count(&pool).await, 0);
}

#[tokio::test]
async fn partially_failed_seed_rolls_back_every_posting() {
    let (_dir, pool) = bootstrapped_db().await;
    sqlx::query(
        "CREATE TRIGGER reject_second_posting BEFORE INSERT ON job_offer \
         WHEN NEW.title = 'Consultant en Formation' \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(&pool)
    .await
    .expect("failed to create trigger");

    service::seed_if_empty(&pool, SeedCollection::JobPostings)
        .await
        .expect_err("second posting should have been rejected");
    let (postings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_offer")
        .fetch_one(&pool)
        .await
        .expect("count query failed");
    assert_eq!(postings, 0);

    // One failing collection does not stop the others.
    let seeded = service::seed_all(&pool).await;
    assert!(seeded[0].1.is_err());
    assert_eq!(seeded[1].1.as_ref().ok(), Some(&SeedOutcome::Inserted(1)));
}

#[tokio::test]
async fn missing_database_file_is_not_created() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("instance").join("monderh.db");

    let err = db::connect(&DatabaseLocation::File(path.clone()), OpenMode::MustExist)
        .await
        .expect_err("opening a missing database should fail");
    assert!(matches!(err, OpsError::DatabaseNotFound(ref p) if *p == path));
    assert!(!path.exists());
    assert!(!dir.path().join("instance").exists());
}
