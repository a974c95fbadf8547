use mimalloc::MiMalloc;
use std::process::ExitCode;

use mondrh_ops::db::{self, OpenMode};
use mondrh_ops::report;
use mondrh_ops::runtime;
use mondrh_ops::service::{self, LoginCheck, PasswordHasher, ProvisionOutcome};
use mondrh_ops::service::provision::AdminDiagnosis;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match runtime::init_or_exit() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    report::banner("Admin account diagnostics");

    let pool = match db::open(&cfg, OpenMode::MustExist).await {
        Ok(pool) => pool,
        Err(e) => {
            report::error("database connection", &e);
            return report::finish(false, "", "diagnostics failed");
        }
    };

    report::section("Accounts");
    let diagnosis = match service::diagnose(&pool).await {
        Ok(d) => d,
        Err(e) => {
            report::error("diagnostics", &e);
            return report::finish(false, "", "diagnostics failed");
        }
    };
    print_diagnosis(&diagnosis);

    let hasher = PasswordHasher::default();
    if !diagnosis.has_admin() {
        report::section("Creating admin account");
        match service::ensure_admin(&pool, &cfg.admin, &hasher).await {
            Ok(ProvisionOutcome::Created { .. }) => report::ok(format!("created {}", cfg.admin.email)),
            Ok(ProvisionOutcome::Promoted { previous, .. }) => {
                report::ok(format!("{} promoted to admin (was {previous})", cfg.admin.email))
            }
            Ok(ProvisionOutcome::AlreadyAdmin { .. }) => report::ok("already admin"),
            Err(e) => {
                report::error("admin provisioning", &e);
                return report::finish(false, "", "admin account creation failed");
            }
        }
    }

    report::section("Admin login check");
    let login = match service::check_admin_login(&pool, &cfg.admin, &hasher).await {
        Ok(login) => login,
        Err(e) => {
            report::error("login check", &e);
            return report::finish(false, "", "login check failed");
        }
    };
    let success = match &login {
        LoginCheck::Verified => {
            report::ok("password matches; admin account usable");
            true
        }
        LoginCheck::WrongPassword => {
            report::fail("password does not match the stored hash");
            false
        }
        LoginCheck::UnsupportedHash => {
            report::fail("stored password hash has an unknown format; the application cannot check it");
            false
        }
        LoginCheck::NotAdmin { user_type } => {
            report::fail(format!("{} is not an admin (type: {user_type})", cfg.admin.email));
            false
        }
        LoginCheck::NoAccount => {
            report::fail(format!("no account with email {}", cfg.admin.email));
            false
        }
        LoginCheck::Skipped => {
            report::warn("MONDRH_ADMIN__PASSWORD not set; password not checked");
            diagnosis.has_admin()
        }
    };

    report::finish(
        success,
        "admin accounts working",
        "problem detected with the admin accounts",
    )
}

fn print_diagnosis(d: &AdminDiagnosis) {
    report::info(format!("total users: {}", d.total_users));
    report::info(format!("admin users: {}", d.admins.len()));
    for (i, admin) in d.admins.iter().enumerate() {
        report::detail(format!("{}. {}", i + 1, admin.email));
        report::detail(format!("   name: {}", admin.display_name()));
        report::detail(format!("   type: {}", admin.user_type));
        report::detail(format!("   active: {}", admin.is_active));
        report::detail(format!("   created: {}", admin.created_at));
        report::detail(format!("   hash: {}", report::truncate(&admin.password_hash, 50)));
    }
    if !d.has_admin() {
        report::fail("no admin account found");
        for user in &d.others {
            report::detail(format!("- {} (type: {})", user.email, user.user_type));
        }
    }

    report::section("User table structure");
    for col in &d.columns {
        let null = if col.not_null { " NOT NULL" } else { "" };
        report::detail(format!("- {}: {}{null}", col.name, col.data_type));
    }
}
