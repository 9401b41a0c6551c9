use crate::rules::Rule;

pub fn format_rule_table(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "No rules found.\n".to_string();
    }

    let mut output = String::new();

    // Table header
    output.push_str("┌──────┬─────────────────────────────────┬─────────────────┬────────────┬─────────────────────┬──────────┐\n");
    output.push_str("│ Id   │ Pattern                         │ Ticket          │ Expiration │ Requester           │ Status   │\n");
    output.push_str("├──────┼─────────────────────────────────┼─────────────────┼────────────┼─────────────────────┼──────────┤\n");

    // Table rows
    for rule in rules {
        let pattern = truncate(&rule.pattern, 31);
        let ticket = truncate(rule.ticket.as_deref().unwrap_or("-"), 15);
        let expiration = if rule.permanent {
            "PERMANENT".to_string()
        } else {
            rule.expiration.format("%Y-%m-%d").to_string()
        };
        let requester = truncate(rule.requester_name.as_deref().unwrap_or("-"), 19);
        let status = if rule.active { "Active" } else { "Inactive" };

        output.push_str(&format!(
            "│ {:<4} │ {:<31} │ {:<15} │ {:<10} │ {:<19} │ {:<8} │\n",
            rule.id, pattern, ticket, expiration, requester, status
        ));
    }

    // Table footer
    output.push_str("└──────┴─────────────────────────────────┴─────────────────┴────────────┴─────────────────────┴──────────┘\n");

    output
}

/// Full detail for one rule, activity trail included.
pub fn format_rule_detail(rule: &Rule) -> String {
    let mut output = String::new();

    output.push_str(&format!("Rule #{}\n", rule.id));
    output.push_str(&format!("  Pattern:     {}\n", rule.pattern));
    output.push_str(&format!(
        "  Ticket:      {}\n",
        rule.ticket.as_deref().unwrap_or("-")
    ));

    let requester = match (&rule.requester_name, &rule.requester_email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => "-".to_string(),
    };
    output.push_str(&format!("  Requester:   {}\n", requester));

    output.push_str(&format!(
        "  Application: {}\n",
        rule.application.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "  Reason:      {}\n",
        rule.reason.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "  Status:      {}\n",
        if rule.active { "Active" } else { "Inactive" }
    ));
    output.push_str(&format!(
        "  Permanent:   {}\n",
        if rule.permanent { "yes" } else { "no" }
    ));
    output.push_str(&format!(
        "  Created:     {}\n",
        rule.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!(
        "  Expiration:  {}\n",
        rule.expiration.format("%Y-%m-%d")
    ));

    output.push_str("  Activity:\n");
    for activity in &rule.activity {
        let when = activity.timestamp.format("%Y-%m-%d %H:%M:%S");
        match &activity.info {
            Some(info) => output.push_str(&format!("    {} {} ({})\n", when, activity.event, info)),
            None => output.push_str(&format!("    {} {}\n", when, activity.event)),
        }
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 1).collect();
        format!("{}…", cut)
    }
}
