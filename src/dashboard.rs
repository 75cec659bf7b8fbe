//! Aggregated view over earned certificates and course progress.

use std::sync::Arc;

use anyhow::Result;
use log::warn;
use serde::Serialize;

use crate::{
    catalog::Catalog,
    certificates::{stats_for, CertificateRegistry, CertificateStats},
    models::Certificate,
    progress::ProgressTracker,
    storage::{keys, Store},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInProgress {
    pub course_id: String,
    pub title: String,
    pub percent: u8,
    pub videos_watched: usize,
    pub total_videos: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_certificates: usize,
    pub average_score: u8,
    pub courses_in_progress: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub certificates: Vec<Certificate>,
    pub in_progress: Vec<CourseInProgress>,
    pub stats: DashboardStats,
}

#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn Store>,
    catalog: Arc<Catalog>,
    certificates: CertificateRegistry,
    progress: ProgressTracker,
}

impl Dashboard {
    pub fn new(
        store: Arc<dyn Store>,
        catalog: Arc<Catalog>,
        certificates: CertificateRegistry,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            store,
            catalog,
            certificates,
            progress,
        }
    }

    pub fn overview(&self) -> Result<DashboardOverview> {
        let certificates = self.certificates.list_all()?;
        let in_progress = self.in_progress()?;

        let CertificateStats {
            total,
            average_score,
        } = stats_for(&certificates);

        Ok(DashboardOverview {
            stats: DashboardStats {
                total_certificates: total,
                average_score,
                courses_in_progress: in_progress.len(),
            },
            certificates,
            in_progress,
        })
    }

    /// Every course with at least one watched video, joined against the
    /// catalog. Progress entries for courses no longer in the catalog are
    /// skipped.
    fn in_progress(&self) -> Result<Vec<CourseInProgress>> {
        let mut courses = Vec::new();

        for key in self.store.list_keys(keys::COURSE_PROGRESS_PREFIX)? {
            let course_id = match keys::course_id_from_progress_key(&key) {
                Some(course_id) => course_id,
                None => continue,
            };

            let course = match self.catalog.course(course_id) {
                Some(course) => course,
                None => {
                    warn!("Skipping progress entry for unknown course {course_id}");
                    continue;
                }
            };

            let watched = self.progress.watched(course_id);
            if watched.is_empty() {
                continue;
            }

            courses.push(CourseInProgress {
                course_id: course.id.clone(),
                title: course.title.clone(),
                percent: ProgressTracker::compute_progress(course, &watched),
                videos_watched: watched.len(),
                total_videos: course.total_videos(),
            });
        }

        Ok(courses)
    }
}
