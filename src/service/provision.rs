use sqlx::SqliteConnection;
use tracing::{error, info, warn};

use crate::config::AdminSeed;
use crate::db::models::{ColumnInfo, DbAccount, NewAccount, Role};
use crate::db::schema::USER;
use crate::db::sqlite::{self, SqlitePool};
use crate::error::OpsError;
use crate::service::hashing::{PasswordCheck, PasswordHasher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created { id: i64 },
    /// The account existed with another type and was promoted in place.
    Promoted { id: i64, previous: String },
    AlreadyAdmin { id: i64 },
}

/// Guarantee one admin account with `seed.email`.
///
/// Absent: inserted with a freshly hashed password. Present but not admin:
/// promoted in place, password untouched. Already admin: nothing changes.
/// Runs in a single transaction that is rolled back on any error.
pub async fn ensure_admin(
    pool: &SqlitePool,
    seed: &AdminSeed,
    hasher: &PasswordHasher,
) -> Result<ProvisionOutcome, OpsError> {
    let mut tx = pool.begin().await?;
    match ensure_admin_in(&mut tx, seed, hasher).await {
        Ok(outcome) => {
            tx.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            error!(email = %seed.email, error = %e, "admin provisioning failed; rolling back");
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn ensure_admin_in(
    conn: &mut SqliteConnection,
    seed: &AdminSeed,
    hasher: &PasswordHasher,
) -> Result<ProvisionOutcome, OpsError> {
    match sqlite::find_account_by_email(conn, &seed.email).await? {
        Some(account) if account.role() == Role::Admin => {
            info!(email = %seed.email, id = account.id, "admin account already present");
            Ok(ProvisionOutcome::AlreadyAdmin { id: account.id })
        }
        Some(account) => {
            sqlite::set_user_type(conn, account.id, Role::ADMIN_TYPE).await?;
            info!(
                email = %seed.email,
                id = account.id,
                previous = %account.user_type,
                "account promoted to admin"
            );
            Ok(ProvisionOutcome::Promoted {
                id: account.id,
                previous: account.user_type,
            })
        }
        None => {
            let password_hash = hasher.hash(seed.password()?);
            let id = sqlite::insert_account(
                conn,
                &NewAccount {
                    email: &seed.email,
                    password_hash: &password_hash,
                    first_name: &seed.first_name,
                    last_name: &seed.last_name,
                    user_type: Role::ADMIN_TYPE,
                },
            )
            .await?;
            info!(email = %seed.email, id, "admin account created");
            Ok(ProvisionOutcome::Created { id })
        }
    }
}

/// Whether the configured admin credentials would let someone log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCheck {
    Verified,
    WrongPassword,
    UnsupportedHash,
    NotAdmin { user_type: String },
    NoAccount,
    /// No password configured, so nothing to compare against.
    Skipped,
}

#[derive(Debug)]
pub struct AdminDiagnosis {
    pub total_users: i64,
    pub admins: Vec<DbAccount>,
    /// Only populated when there is no admin at all.
    pub others: Vec<DbAccount>,
    pub columns: Vec<ColumnInfo>,
}

impl AdminDiagnosis {
    pub fn has_admin(&self) -> bool {
        !self.admins.is_empty()
    }
}

pub async fn diagnose(pool: &SqlitePool) -> Result<AdminDiagnosis, OpsError> {
    let mut conn = pool.acquire().await?;
    sqlite::ping(&mut conn).await?;

    let total_users = sqlite::count(&mut conn, &USER).await?;
    let admins = sqlite::list_accounts_by_type(&mut conn, Role::ADMIN_TYPE, false).await?;
    let others = if admins.is_empty() {
        sqlite::list_accounts_by_type(&mut conn, Role::ADMIN_TYPE, true).await?
    } else {
        Vec::new()
    };
    let columns = sqlite::table_columns(&mut conn, &USER).await?;

    Ok(AdminDiagnosis {
        total_users,
        admins,
        others,
        columns,
    })
}

/// Compare the configured admin password with the stored hash.
pub async fn check_admin_login(
    pool: &SqlitePool,
    seed: &AdminSeed,
    hasher: &PasswordHasher,
) -> Result<LoginCheck, OpsError> {
    let Ok(password) = seed.password() else {
        return Ok(LoginCheck::Skipped);
    };
    let mut conn = pool.acquire().await?;
    let Some(account) = sqlite::find_account_by_email(&mut conn, &seed.email).await? else {
        return Ok(LoginCheck::NoAccount);
    };
    if account.role() != Role::Admin {
        return Ok(LoginCheck::NotAdmin {
            user_type: account.user_type,
        });
    }
    Ok(match hasher.verify(&account.password_hash, password) {
        PasswordCheck::Matches => LoginCheck::Verified,
        PasswordCheck::Mismatch => LoginCheck::WrongPassword,
        PasswordCheck::UnsupportedHash => LoginCheck::UnsupportedHash,
    })
}
