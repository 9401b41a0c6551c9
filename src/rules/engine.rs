use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::models::{renewal_expiration, NewRule, Rule};
use super::query::Criterion;
use super::storage::RuleStore;
use crate::error::{Error, Result};
use crate::notify::Notifier;

/// The lifecycle engine: owns the record store and the notification
/// collaborator and exposes the operational surface. Constructed once by the
/// entry point and passed to whatever drives it.
pub struct RuleEngine {
    store: RuleStore,
    notifier: Arc<dyn Notifier>,
}

impl RuleEngine {
    pub fn new(store: RuleStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Validate and persist a new rule with its seeded activity in one
    /// commit.
    pub fn add_rule(&self, input: NewRule) -> Result<Rule> {
        let rule = Rule::create(input)?;
        let rule = self.store.create(rule)?;
        info!(id = rule.id, pattern = %rule.pattern, "rule created");
        Ok(rule)
    }

    pub fn get_rule(&self, id: u64) -> Result<Rule> {
        self.store.get(id)
    }

    /// Rules matching every given criterion (AND, never OR). An empty
    /// criteria set is rejected rather than silently matching everything.
    pub fn search_rules(&self, criteria: &[Criterion]) -> Result<Vec<Rule>> {
        if criteria.is_empty() {
            return Err(Error::Validation(
                "search requires at least one field=value criterion".to_string(),
            ));
        }
        let rules = self.store.list(true, true)?;
        Ok(rules
            .into_iter()
            .filter(|rule| criteria.iter().all(|c| c.matches(rule)))
            .collect())
    }

    pub fn list_rules(&self, include_active: bool, include_inactive: bool) -> Result<Vec<Rule>> {
        self.store.list(include_active, include_inactive)
    }

    pub fn activate(&self, id: u64) -> Result<Rule> {
        let mut rule = self.store.get(id)?;
        rule.reactivate();
        self.store.update(&rule)
    }

    pub fn deactivate(&self, id: u64) -> Result<Rule> {
        let mut rule = self.store.get(id)?;
        rule.deactivate();
        self.store.update(&rule)
    }

    /// Renew a rule for the next annual period.
    pub fn true_up(&self, id: u64) -> Result<Rule> {
        self.true_up_as_of(id, Utc::now().date_naive())
    }

    /// `true_up` with an explicit evaluation date.
    pub fn true_up_as_of(&self, id: u64, today: NaiveDate) -> Result<Rule> {
        let mut rule = self.store.get(id)?;
        rule.true_up(renewal_expiration(today));
        self.store.update(&rule)
    }

    /// Derive the do-not-scan list: one pattern per line for every active,
    /// unexpired rule. A rule found expired while still active gets a
    /// best-effort expiry notice and is deactivated in the same pass, so a
    /// second run emits nothing new for it.
    pub fn generate_exemption_list(&self) -> Result<String> {
        self.generate_exemption_list_as_of(Utc::now().date_naive())
    }

    /// `generate_exemption_list` with an explicit evaluation date.
    pub fn generate_exemption_list_as_of(&self, today: NaiveDate) -> Result<String> {
        let mut list = String::new();
        for rule in self.store.list(true, true)? {
            if !rule.active {
                continue;
            }
            if rule.expiration >= today {
                list.push_str(&rule.pattern);
                list.push('\n');
            } else {
                debug!(id = rule.id, expiration = %rule.expiration, "rule expired, deactivating");
                self.notify_expired(&rule);
                let mut rule = rule;
                rule.deactivate();
                self.store.update(&rule)?;
            }
        }
        Ok(list)
    }

    /// Annual true-up pass over the permanent rules: each requester is asked
    /// whether the exemption is still needed. Confirmations come back as
    /// explicit `true_up` calls; unconfirmed rules lapse at their December 31
    /// expiration and the next generation pass deactivates them. Returns the
    /// rules under audit.
    pub fn rule_audit(&self) -> Result<Vec<Rule>> {
        let rules: Vec<Rule> = self
            .store
            .list(true, true)?
            .into_iter()
            .filter(|rule| rule.permanent)
            .collect();

        for rule in &rules {
            let Some(to) = rule.requester_email.as_deref() else {
                warn!(id = rule.id, "permanent rule has no requester email, skipping audit request");
                continue;
            };
            let subject = format!("Annual review of do-not-scan exemption: {}", rule.pattern);
            let body = audit_body(rule);
            if let Err(err) = self.notifier.send(to, &subject, &body) {
                warn!(id = rule.id, %err, "failed to deliver audit request");
            }
        }

        Ok(rules)
    }

    /// Expiry mail is best effort: a transport failure is logged and the
    /// deactivation still goes through.
    fn notify_expired(&self, rule: &Rule) {
        let Some(to) = rule.requester_email.as_deref() else {
            warn!(id = rule.id, "expired rule has no requester email, skipping notification");
            return;
        };
        let subject = format!("Do-not-scan exemption expired: {}", rule.pattern);
        let body = expiry_body(rule);
        if let Err(err) = self.notifier.send(to, &subject, &body) {
            warn!(id = rule.id, %err, "failed to deliver expiration notice");
        }
    }
}

fn rule_details(rule: &Rule) -> String {
    format!(
        "Pattern:     {}\n\
         Ticket:      {}\n\
         Application: {}\n\
         Reason:      {}\n\
         Expiration:  {}\n",
        rule.pattern,
        rule.ticket.as_deref().unwrap_or("-"),
        rule.application.as_deref().unwrap_or("-"),
        rule.reason.as_deref().unwrap_or("-"),
        rule.expiration.format("%Y-%m-%d"),
    )
}

fn expiry_body(rule: &Rule) -> String {
    format!(
        "Hello,\n\n\
         The do-not-scan exemption below has expired and has been deactivated.\n\
         Its pattern is no longer excluded from security scanning.\n\n\
         {}\n\
         If the exemption is still required, please have the rule renewed and\n\
         re-enabled.\n",
        rule_details(rule)
    )
}

fn audit_body(rule: &Rule) -> String {
    format!(
        "Hello,\n\n\
         As part of the annual review, please confirm whether the permanent\n\
         do-not-scan exemption below is still needed.\n\n\
         {}\n\
         Unconfirmed rules lapse at their expiration date and will be removed\n\
         from the do-not-scan list.\n",
        rule_details(rule)
    )
}
