use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Account role as far as these tools care. The application stores other
/// non-privileged types (`candidate`, `recruiter`, ...); all of them are
/// `Standard` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Standard,
    Admin,
}

impl Role {
    pub const ADMIN_TYPE: &'static str = "admin";

    pub fn from_user_type(user_type: &str) -> Self {
        if user_type == Self::ADMIN_TYPE {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Standard => f.write_str("standard"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbAccount {
    pub fn role(&self) -> Role {
        Role::from_user_type(&self.user_type)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for `"user"`.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub user_type: &'a str,
}

/// Insert payload for `job_offer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub contract_type: &'static str,
    pub experience_level: &'static str,
    pub salary_range: &'static str,
    pub description: &'static str,
    pub requirements: &'static str,
    pub benefits: &'static str,
    pub department: &'static str,
    pub is_active: bool,
}

/// Insert payload for the `site_settings` singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub site_name: &'static str,
    pub site_description: &'static str,
    pub contact_email: &'static str,
    pub contact_phone: &'static str,
    pub address: &'static str,
    pub hero_title: &'static str,
    pub hero_subtitle: &'static str,
}

/// A row of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnInfo {
    pub name: String,
    #[sqlx(rename = "type")]
    pub data_type: String,
    #[sqlx(rename = "notnull")]
    pub not_null: bool,
}
