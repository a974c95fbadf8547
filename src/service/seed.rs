use sqlx::SqliteConnection;
use std::fmt;
use tracing::{info, warn};

use crate::db::models::{JobPosting, SiteSettings};
use crate::db::schema::{JOB_OFFER, SITE_SETTINGS, TableSpec};
use crate::db::sqlite::{self, SqlitePool};
use crate::error::OpsError;
use crate::report;

pub const SAMPLE_JOBS: &[JobPosting] = &[
    JobPosting {
        title: "Responsable RH",
        company: "MonDRH",
        location: "Dakar, Sénégal",
        contract_type: "CDI",
        experience_level: "Senior",
        salary_range: "50000-70000€",
        description: "Nous recherchons un Responsable RH expérimenté pour piloter notre département Ressources Humaines et contribuer à la croissance de notre entreprise.",
        requirements: "• 5+ ans d'expérience en RH\n• Formation en Gestion des RH\n• Connaissance du droit social\n• Capacités managériales\n• Maîtrise des outils RH",
        benefits: "• Poste à responsabilités\n• Équipe dynamique\n• Formation continue\n• Avantages sociaux",
        department: "Ressources Humaines",
        is_active: true,
    },
    JobPosting {
        title: "Consultant en Formation",
        company: "MonDRH",
        location: "Dakar, Sénégal",
        contract_type: "CDD",
        experience_level: "Confirmé",
        salary_range: "35000-50000€",
        description: "Rejoignez notre équipe de consultants en formation pour accompagner nos clients dans le développement des compétences de leurs équipes.",
        requirements: "• 3+ ans d'expérience en formation\n• Certifications en formation\n• Capacités pédagogiques\n• Mobilité géographique",
        benefits: "• Missions variées\n• Développement professionnel\n• Travail en équipe\n• Horaires flexibles",
        department: "Formation",
        is_active: true,
    },
];

pub const DEFAULT_SITE_SETTINGS: SiteSettings = SiteSettings {
    site_name: "MondeRH",
    site_description: "Votre partenaire en ressources humaines",
    contact_email: "contact@monderh.fr",
    contact_phone: "+33 1 23 45 67 89",
    address: "123 Avenue des Ressources Humaines, 75001 Paris",
    hero_title: "Trouvez votre carrière idéale",
    hero_subtitle: "Nous vous accompagnons dans votre parcours professionnel",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedCollection {
    JobPostings,
    SiteSettings,
}

impl SeedCollection {
    pub const ALL: [SeedCollection; 2] = [SeedCollection::JobPostings, SeedCollection::SiteSettings];

    pub fn table(self) -> TableSpec {
        match self {
            SeedCollection::JobPostings => JOB_OFFER,
            SeedCollection::SiteSettings => SITE_SETTINGS,
        }
    }
}

impl fmt::Display for SeedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedCollection::JobPostings => f.write_str("job postings"),
            SeedCollection::SiteSettings => f.write_str("site settings"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(usize),
    /// The collection already had rows; nothing was written.
    Skipped { existing: i64 },
}

/// Insert the fixed records for `collection` only if it is empty.
///
/// Not an upsert: a single existing row skips the whole collection.
pub async fn seed_if_empty(
    pool: &SqlitePool,
    collection: SeedCollection,
) -> Result<SeedOutcome, OpsError> {
    let mut tx = pool.begin().await?;
    let existing = sqlite::count(&mut tx, &collection.table()).await?;
    if existing > 0 {
        info!(%collection, existing, "collection not empty; seeding skipped");
        return Ok(SeedOutcome::Skipped { existing });
    }

    match insert_fixed(&mut tx, collection).await {
        Ok(inserted) => {
            tx.commit().await?;
            info!(%collection, inserted, "collection seeded");
            Ok(SeedOutcome::Inserted(inserted))
        }
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn insert_fixed(
    conn: &mut SqliteConnection,
    collection: SeedCollection,
) -> Result<usize, OpsError> {
    match collection {
        SeedCollection::JobPostings => {
            for job in SAMPLE_JOBS {
                sqlite::insert_job_posting(conn, job).await?;
            }
            Ok(SAMPLE_JOBS.len())
        }
        SeedCollection::SiteSettings => {
            sqlite::insert_site_settings(conn, &DEFAULT_SITE_SETTINGS).await?;
            Ok(1)
        }
    }
}

/// Seed every collection independently; a failure in one does not stop the next.
pub async fn seed_all(pool: &SqlitePool) -> Vec<(SeedCollection, Result<SeedOutcome, OpsError>)> {
    let mut results = Vec::with_capacity(SeedCollection::ALL.len());
    for collection in SeedCollection::ALL {
        let outcome = seed_if_empty(pool, collection).await;
        if let Err(e) = &outcome {
            warn!(%collection, error = %e, "seeding failed");
        }
        results.push((collection, outcome));
    }
    results
}

pub fn print_results(results: &[(SeedCollection, Result<SeedOutcome, OpsError>)]) {
    for (collection, outcome) in results {
        match outcome {
            Ok(SeedOutcome::Inserted(n)) => report::ok(format!("{collection}: {n} record(s) added")),
            Ok(SeedOutcome::Skipped { existing }) => {
                report::ok(format!("{collection}: {existing} already present"))
            }
            Err(e) => report::error(format!("{collection} seeding (non-fatal)"), e),
        }
    }
}
