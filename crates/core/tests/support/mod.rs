//! Shared test helpers for `hireflow-core` integration tests.
//!
//! In-memory doubles for every port so orchestrator and credential tests
//! can focus on behaviour instead of boilerplate.

pub mod calendar;
pub mod credentials;
pub mod mail;
pub mod repositories;

use chrono::{DateTime, TimeZone, Utc};
use hireflow_domain::{CandidateRank, CredentialRecord, SchedulingConfig, VacancyClosed};

/// 2025-06-02 (a Monday) at the given time, UTC.
pub fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).single().expect("valid time")
}

pub fn candidate(id: &str, rank: u32) -> CandidateRank {
    CandidateRank {
        candidate_id: id.to_string(),
        full_name: format!("Candidate {id}"),
        email: format!("{id}@example.com"),
        rank,
    }
}

pub fn closure_event(vacancy_id: &str, shortlist: Vec<CandidateRank>) -> VacancyClosed {
    VacancyClosed {
        vacancy_id: vacancy_id.to_string(),
        vacancy_title: "Backend Engineer".to_string(),
        principal: "manager@example.com".to_string(),
        shortlist,
    }
}

pub fn credential(principal: &str, expires_at: DateTime<Utc>) -> CredentialRecord {
    CredentialRecord {
        principal: principal.to_string(),
        access_token: "stored-token".to_string(),
        refresh_token: Some("stored-refresh".to_string()),
        expires_at,
        calendar_id: "primary".to_string(),
        is_active: true,
        updated_at: monday(0, 0),
    }
}

/// One-day window anchored at Monday 08:00, hour slots, 9-17 working hours.
pub fn test_config() -> SchedulingConfig {
    SchedulingConfig {
        horizon_days: 1,
        slot_minutes: 60,
        max_candidates: 5,
        work_start_hour: 9,
        work_end_hour: 17,
        refresh_margin_seconds: 60,
    }
}
