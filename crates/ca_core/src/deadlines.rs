use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::DeadlineEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Time left until `deadline`, or `None` once it has passed.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let remaining = (deadline - now).num_seconds();
        if remaining <= 0 {
            return None;
        }
        Some(Self {
            days: remaining / 86_400,
            hours: remaining % 86_400 / 3_600,
            minutes: remaining % 3_600 / 60,
            seconds: remaining % 60,
        })
    }
}

/// The nearest event whose deadline is still ahead of `now`.
pub fn next_deadline(events: &[DeadlineEvent], now: DateTime<Utc>) -> Option<&DeadlineEvent> {
    events
        .iter()
        .filter(|e| e.deadline.is_some_and(|d| d > now))
        .min_by_key(|e| e.deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(title: &str, deadline: Option<DateTime<Utc>>) -> DeadlineEvent {
        DeadlineEvent {
            title: title.to_string(),
            summary: String::new(),
            deadline,
            category: "Registration".to_string(),
            link: None,
        }
    }

    #[test]
    fn countdown_splits_remaining_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let deadline = now + Duration::days(3) + Duration::hours(4) + Duration::minutes(5) + Duration::seconds(6);
        assert_eq!(
            Countdown::until(deadline, now),
            Some(Countdown { days: 3, hours: 4, minutes: 5, seconds: 6 })
        );
        assert_eq!(Countdown::until(now, now), None);
        assert_eq!(Countdown::until(now - Duration::seconds(1), now), None);
    }

    #[test]
    fn next_deadline_skips_past_and_undated_events() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let events = vec![
            event("past", Some(now - Duration::days(1))),
            event("undated", None),
            event("later", Some(now + Duration::days(30))),
            event("sooner", Some(now + Duration::days(2))),
        ];
        assert_eq!(next_deadline(&events, now).unwrap().title, "sooner");
        assert!(next_deadline(&events[..2], now).is_none());
    }
}
