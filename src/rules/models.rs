use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Audit event vocabulary. The serialized names are part of the stored
/// activity trail format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityEvent {
    Created,
    #[serde(rename = "Re-Enabled")]
    ReEnabled,
    Disabled,
    Modified,
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityEvent::Created => "Created",
            ActivityEvent::ReEnabled => "Re-Enabled",
            ActivityEvent::Disabled => "Disabled",
            ActivityEvent::Modified => "Modified",
        };
        f.write_str(name)
    }
}

/// One immutable entry in a rule's activity trail. Entries are only ever
/// appended, never reordered or deleted, and live and die with their rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Assigned by the store on first persist; 0 until then.
    pub id: u64,
    pub event: ActivityEvent,
    pub info: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Back-reference to the owning rule, filled in by the store.
    pub rule_id: u64,
}

impl Activity {
    fn new(event: ActivityEvent, info: Option<String>) -> Self {
        Self {
            id: 0,
            event,
            info,
            timestamp: Utc::now(),
            rule_id: 0,
        }
    }
}

/// Structured input for creating a rule: all fields supplied together and
/// validated as a unit, independent of whatever surface collected them.
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub pattern: String,
    pub ticket: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub application: Option<String>,
    pub reason: Option<String>,
    /// Explicit expiration; when absent the default policy applies.
    pub expiration: Option<NaiveDate>,
    pub permanent: bool,
}

/// One do-not-scan exemption. The pattern is opaque to this system; it is
/// the token emitted verbatim to scanning tooling. Everything else is
/// ownership and expiry metadata plus the append-only activity trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Assigned by the store on creation; 0 until then.
    pub id: u64,
    pub pattern: String,
    pub ticket: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub application: Option<String>,
    pub reason: Option<String>,
    /// Permanent rules are renewed through the annual true-up instead of a
    /// fixed expiration; their December 31 date acts as the renewal deadline.
    pub permanent: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Never absent: defaulted at creation when not supplied.
    pub expiration: NaiveDate,
    #[serde(default)]
    pub activity: Vec<Activity>,
}

impl Rule {
    /// Build a new rule from structured input. The rule starts active with a
    /// seeded Created entry and a computed expiration when none was given.
    pub fn create(input: NewRule) -> Result<Self> {
        if input.pattern.trim().is_empty() {
            return Err(Error::Validation("rule pattern must not be empty".to_string()));
        }

        let created_at = Utc::now();
        let expiration = input
            .expiration
            .unwrap_or_else(|| default_expiration(created_at.date_naive(), input.permanent));

        Ok(Self {
            id: 0,
            pattern: input.pattern,
            ticket: input.ticket,
            requester_name: input.requester_name,
            requester_email: input.requester_email,
            application: input.application,
            reason: input.reason,
            permanent: input.permanent,
            active: true,
            created_at,
            expiration,
            activity: vec![Activity::new(ActivityEvent::Created, None)],
        })
    }

    /// Set the rule active so it is included in list generation again.
    /// Always appends a Re-Enabled entry, even when the rule was already
    /// active: the trail records intent, not just state deltas.
    pub fn reactivate(&mut self) {
        self.active = true;
        self.activity.push(Activity::new(ActivityEvent::ReEnabled, None));
    }

    /// Set the rule inactive so list generation skips it regardless of any
    /// other setting. Same always-append behavior as `reactivate`.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.activity.push(Activity::new(ActivityEvent::Disabled, None));
    }

    /// Re-up the expiration. Used when a rule is still needed past its
    /// expiration and for the yearly true-up of permanent rules. Leaves the
    /// active flag untouched.
    pub fn true_up(&mut self, expiration: NaiveDate) {
        self.expiration = expiration;
        self.activity.push(Activity::new(
            ActivityEvent::Modified,
            Some(format!("Expiration set to {}", expiration.format("%Y-%m-%d"))),
        ));
    }
}

/// Expiration applied when a new rule carries no explicit date: temporary
/// rules get two weeks, permanent rules run to the end of the creation year.
pub fn default_expiration(today: NaiveDate, permanent: bool) -> NaiveDate {
    if permanent {
        end_of_year(today.year())
    } else {
        today + Duration::days(14)
    }
}

/// Renewal date for a true-up: a renewal in the second half of the year
/// grants through the end of next year rather than a partial one.
pub fn renewal_expiration(today: NaiveDate) -> NaiveDate {
    if today.month() > 6 {
        end_of_year(today.year() + 1)
    } else {
        end_of_year(today.year())
    }
}

fn end_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).expect("December 31 exists in every year")
}
