//! Certificate issuance, lookup, and listing.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Utc};
use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::{
    models::Certificate,
    storage::{keys, Store},
};

const ID_PREFIX: &str = "CT";

/// Identifier suffixes are random in [0, 9999), so collisions are possible;
/// a bounded re-roll against the store keeps the observable format while
/// making an overwrite effectively impossible.
const MAX_ID_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStats {
    pub total: usize,
    pub average_score: u8,
}

#[derive(Clone)]
pub struct CertificateRegistry {
    store: Arc<dyn Store>,
}

impl CertificateRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Writes a new certificate record. Certificates are append-only: every
    /// passing attempt earns a fresh record under a fresh identifier.
    pub fn issue(
        &self,
        course_id: &str,
        course_name: &str,
        score: u8,
        holder_name: &str,
    ) -> Result<Certificate> {
        let id = self.generate_id(course_id)?;
        let certificate = Certificate {
            id: id.clone(),
            course_id: course_id.to_string(),
            course_name: course_name.to_string(),
            score,
            date: Utc::now(),
            user_name: holder_name.to_string(),
        };

        let payload = serde_json::to_string(&certificate)
            .context("failed to serialize certificate")?;
        self.store
            .set(&keys::certificate(&id), &payload)
            .with_context(|| format!("failed to persist certificate {id}"))?;

        info!("Issued certificate {id} for course {course_id} (score {score})");
        Ok(certificate)
    }

    fn generate_id(&self, course_id: &str) -> Result<String> {
        let year = Utc::now().year();
        let course = course_id.to_uppercase();

        for _ in 0..MAX_ID_ATTEMPTS {
            let suffix = rand::thread_rng().gen_range(0..10_000);
            let id = format!("{ID_PREFIX}-{year}-{course}-{suffix}");
            if self.store.get(&keys::certificate(&id))?.is_none() {
                return Ok(id);
            }
        }

        bail!("exhausted certificate id candidates for course {course_id}")
    }

    /// Reads a certificate by identifier. A missing record (invalid link,
    /// cleared storage) is `None`, not an error.
    pub fn lookup(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        let raw = match self.store.get(&keys::certificate(certificate_id))? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let certificate = serde_json::from_str(&raw)
            .with_context(|| format!("certificate {certificate_id} is corrupt"))?;
        Ok(Some(certificate))
    }

    /// Scans the certificate namespace. Corrupt or unreadable entries are
    /// skipped with a warning so one bad record cannot hide the rest.
    pub fn list_all(&self) -> Result<Vec<Certificate>> {
        let mut certificates = Vec::new();

        for key in self.store.list_keys(keys::CERTIFICATE_PREFIX)? {
            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Skipping unreadable entry {key}: {err}");
                    continue;
                }
            };

            match serde_json::from_str::<Certificate>(&raw) {
                Ok(certificate) => certificates.push(certificate),
                Err(err) => warn!("Skipping corrupt certificate entry {key}: {err}"),
            }
        }

        Ok(certificates)
    }

    pub fn stats(&self) -> Result<CertificateStats> {
        let certificates = self.list_all()?;
        Ok(stats_for(&certificates))
    }
}

pub(crate) fn stats_for(certificates: &[Certificate]) -> CertificateStats {
    let total = certificates.len();
    let average_score = if total == 0 {
        0
    } else {
        let sum: u32 = certificates.iter().map(|c| c.score as u32).sum();
        (sum as f64 / total as f64).round() as u8
    };

    CertificateStats {
        total,
        average_score,
    }
}
