//! Notification message composition
//!
//! Builds the per-candidate invitation and the manager's run summary. The
//! orchestrator sends these through the [`NotificationGateway`] port and
//! persists sent markers so each (interview, recipient) pair gets at most
//! one delivered message.
//!
//! [`NotificationGateway`]: crate::scheduling::ports::NotificationGateway

use hireflow_domain::InterviewRecord;

/// An outbound email-shaped notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Invitation sent to a candidate for their committed slot.
pub fn candidate_invitation(record: &InterviewRecord, vacancy_title: &str) -> NotificationMessage {
    NotificationMessage {
        to: record.candidate_email.clone(),
        subject: format!("Interview invitation: {vacancy_title}"),
        body: format!(
            "Hello {name},\n\n\
             You have been shortlisted for the {title} position. Your interview \
             is scheduled for {start} (until {end}).\n\n\
             If this time does not work for you, please reply to this email.\n",
            name = record.candidate_name,
            title = vacancy_title,
            start = record.start.format(TIME_FORMAT),
            end = record.end.format(TIME_FORMAT),
        ),
    }
}

/// Per-run summary sent to the hiring manager listing every scheduled slot.
pub fn manager_summary(
    principal: &str,
    vacancy_title: &str,
    records: &[InterviewRecord],
) -> NotificationMessage {
    let mut lines = String::new();
    for record in records {
        lines.push_str(&format!(
            "  - {name} <{email}>: {start}\n",
            name = record.candidate_name,
            email = record.candidate_email,
            start = record.start.format(TIME_FORMAT),
        ));
    }

    NotificationMessage {
        to: principal.to_string(),
        subject: format!("Interviews scheduled for {vacancy_title}"),
        body: format!(
            "The vacancy {title} has been closed and {count} interview(s) were \
             scheduled on your calendar:\n\n{lines}",
            title = vacancy_title,
            count = records.len(),
        ),
    }
}
