//! SQL DDL and table metadata for the job-board database.
//! SQLite-first; table and column names follow the web application's models.

/// One statement per table, `IF NOT EXISTS` so re-running never touches data.
/// `"user"` is quoted everywhere because it is a keyword in other engines.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email VARCHAR(120) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    phone VARCHAR(20) NULL,
    user_type VARCHAR(20) NOT NULL DEFAULT 'candidate',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS job_offer (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(200) NOT NULL,
    company VARCHAR(100) NOT NULL,
    location VARCHAR(100) NOT NULL,
    contract_type VARCHAR(50) NOT NULL,
    experience_level VARCHAR(50) NULL,
    salary_range VARCHAR(100) NULL,
    description TEXT NOT NULL,
    requirements TEXT NULL,
    benefits TEXT NULL,
    department VARCHAR(100) NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS application (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NULL REFERENCES "user"(id),
    job_offer_id INTEGER NULL REFERENCES job_offer(id),
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    email VARCHAR(120) NOT NULL,
    phone VARCHAR(20) NULL,
    position VARCHAR(200) NULL,
    cv_filename VARCHAR(255) NULL,
    cover_letter TEXT NULL,
    google_drive_link VARCHAR(500) NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS appointment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NULL REFERENCES "user"(id),
    name VARCHAR(100) NOT NULL,
    email VARCHAR(120) NOT NULL,
    phone VARCHAR(20) NULL,
    appointment_date TEXT NOT NULL,
    subject VARCHAR(200) NULL,
    message TEXT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS newsletter (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email VARCHAR(120) NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    subscribed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS site_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_name VARCHAR(100) NOT NULL,
    site_description TEXT NULL,
    contact_email VARCHAR(120) NULL,
    contact_phone VARCHAR(20) NULL,
    address TEXT NULL,
    hero_title VARCHAR(200) NULL,
    hero_subtitle TEXT NULL
);

CREATE TABLE IF NOT EXISTS google_token (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NULL REFERENCES "user"(id),
    access_token TEXT NOT NULL,
    refresh_token TEXT NULL,
    token_uri TEXT NULL,
    scopes TEXT NULL, -- JSON array, serialized as text
    expiry TEXT NULL, -- RFC3339
    created_at TEXT NOT NULL
);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    /// Label used in reports.
    pub label: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSpec {
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.name)
    }
}

pub const USER: TableSpec = TableSpec {
    name: "user",
    label: "User",
    columns: &[
        "id", "email", "password_hash", "first_name", "last_name", "phone", "user_type",
        "is_active", "created_at",
    ],
};

pub const JOB_OFFER: TableSpec = TableSpec {
    name: "job_offer",
    label: "JobOffer",
    columns: &[
        "id", "title", "company", "location", "contract_type", "experience_level",
        "salary_range", "description", "requirements", "benefits", "department", "is_active",
        "created_at",
    ],
};

pub const APPLICATION: TableSpec = TableSpec {
    name: "application",
    label: "Application",
    columns: &[
        "id", "user_id", "job_offer_id", "first_name", "last_name", "email", "phone",
        "position", "cv_filename", "cover_letter", "google_drive_link", "status", "created_at",
    ],
};

pub const APPOINTMENT: TableSpec = TableSpec {
    name: "appointment",
    label: "Appointment",
    columns: &[
        "id", "user_id", "name", "email", "phone", "appointment_date", "subject", "message",
        "status", "created_at",
    ],
};

pub const NEWSLETTER: TableSpec = TableSpec {
    name: "newsletter",
    label: "Newsletter",
    columns: &["id", "email", "is_active", "subscribed_at"],
};

pub const SITE_SETTINGS: TableSpec = TableSpec {
    name: "site_settings",
    label: "SiteSettings",
    columns: &[
        "id", "site_name", "site_description", "contact_email", "contact_phone", "address",
        "hero_title", "hero_subtitle",
    ],
};

pub const GOOGLE_TOKEN: TableSpec = TableSpec {
    name: "google_token",
    label: "GoogleToken",
    columns: &[
        "id", "user_id", "access_token", "refresh_token", "token_uri", "scopes", "expiry",
        "created_at",
    ],
};

/// Every managed table, parents before the tables that reference them.
pub const TABLES: &[TableSpec] = &[
    USER,
    JOB_OFFER,
    APPLICATION,
    APPOINTMENT,
    NEWSLETTER,
    SITE_SETTINGS,
    GOOGLE_TOKEN,
];

/// A column added to the application after its first deployment. Older
/// databases lack it and get it through `ALTER TABLE ... ADD COLUMN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateColumn {
    pub table: TableSpec,
    pub column: &'static str,
    pub definition: &'static str,
}

pub const LATE_COLUMNS: &[LateColumn] = &[
    LateColumn {
        table: APPLICATION,
        column: "job_offer_id",
        definition: "INTEGER NULL REFERENCES job_offer(id)",
    },
    LateColumn {
        table: APPLICATION,
        column: "google_drive_link",
        definition: "VARCHAR(500) NULL",
    },
];
