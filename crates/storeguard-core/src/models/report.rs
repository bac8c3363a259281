use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{EvidenceFile, ReportSubmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InReview,
    Resolved,
    Dismissed,
}

/// What is kept about an evidence file once the report is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EvidenceMetadata {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
}

impl From<&EvidenceFile> for EvidenceMetadata {
    fn from(file: &EvidenceFile) -> Self {
        EvidenceMetadata {
            file_name: file.file_name.clone(),
            content_type: file.media_type(),
            size_bytes: file.size(),
            sha256: hex::encode(Sha256::digest(&file.data)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub store_id: i64,
    pub reason: String,
    pub evidence: EvidenceMetadata,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// New pending report from a validated submission.
    pub fn from_submission(submission: &ReportSubmission) -> Self {
        Report {
            id: Uuid::new_v4(),
            store_id: submission.store_id,
            reason: submission.reason.clone(),
            evidence: EvidenceMetadata::from(&submission.evidence),
            status: ReportStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub store_id: i64,
    pub reason: String,
    pub evidence: EvidenceMetadata,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        ReportResponse {
            id: report.id,
            store_id: report.store_id,
            reason: report.reason,
            evidence: report.evidence,
            status: report.status,
            created_at: report.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_submission_is_pending() {
        let submission = ReportSubmission {
            store_id: 9,
            reason: "Counterfeit goods sold".to_string(),
            evidence: EvidenceFile::new("shot.PNG", "IMAGE/PNG", b"abc".to_vec()),
        };
        let report = Report::from_submission(&submission);
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.store_id, 9);
        assert_eq!(report.evidence.content_type, "image/png");
        assert_eq!(report.evidence.size_bytes, 3);
        assert_eq!(
            report.evidence.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_report_response_serializes_status_snake_case() {
        let submission = ReportSubmission {
            store_id: 1,
            reason: "0123456789".to_string(),
            evidence: EvidenceFile::new("a.pdf", "application/pdf", Vec::new()),
        };
        let response = ReportResponse::from(Report::from_submission(&submission));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["evidence"]["size_bytes"], 0);
    }
}
