use super::helpers::TestWorkspace;

#[test]
fn test_new_and_list() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.1.2.3", &["--ticket", "SEC-1", "--name", "Alex Doe"]);

    let listing = ws.stdout(&["list"]);
    assert!(listing.contains("10.1.2.3"));
    assert!(listing.contains("SEC-1"));
    assert!(listing.contains("Active"));
}

#[test]
fn test_search_is_and_combined() {
    let ws = TestWorkspace::new();

    ws.add_rule(
        "10.0.0.1",
        &["--ticket", "SEC-1", "--application", "Payroll"],
    );
    ws.add_rule(
        "10.0.0.2",
        &["--ticket", "SEC-1", "--application", "Billing"],
    );

    let hits = ws.stdout(&["search", "ticket=SEC-1", "application=Payroll"]);
    assert!(hits.contains("10.0.0.1"));
    assert!(!hits.contains("10.0.0.2"));
}

#[test]
fn test_search_rejects_unknown_field() {
    let ws = TestWorkspace::new();
    ws.add_rule("10.0.0.1", &[]);

    let output = ws.run(&["search", "severity=high"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown search field"));
}

#[test]
fn test_deactivate_hides_rule_from_default_listing() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &[]);
    ws.stdout(&["deactivate", "1"]);

    let active_only = ws.stdout(&["list"]);
    assert!(!active_only.contains("10.0.0.1"));

    let everything = ws.stdout(&["list", "--all"]);
    assert!(everything.contains("10.0.0.1"));
    assert!(everything.contains("Inactive"));

    ws.stdout(&["activate", "1"]);
    let active_again = ws.stdout(&["list"]);
    assert!(active_again.contains("10.0.0.1"));
}

#[test]
fn test_generate_emits_active_patterns_only() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &[]);
    ws.add_rule("10.0.0.2", &[]);
    ws.stdout(&["deactivate", "2"]);

    let list = ws.stdout(&["generate"]);
    assert_eq!(list, "10.0.0.1\n");
}

#[test]
fn test_generate_deactivates_expired_rule() {
    let ws = TestWorkspace::new();

    ws.add_rule(
        "10.0.0.1",
        &["--expires", "2020-01-01", "--email", "alex@example.com"],
    );
    ws.add_rule("10.0.0.2", &[]);

    // First pass drops the expired pattern and disables the rule.
    let list = ws.stdout(&["generate"]);
    assert_eq!(list, "10.0.0.2\n");

    let detail = ws.stdout(&["show", "1"]);
    assert!(detail.contains("Inactive"));
    assert!(detail.contains("Disabled"));

    // Second pass is identical.
    let second = ws.stdout(&["generate"]);
    assert_eq!(second, "10.0.0.2\n");
}

#[test]
fn test_show_includes_activity_trail() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &[]);
    ws.stdout(&["deactivate", "1"]);
    ws.stdout(&["activate", "1"]);

    let detail = ws.stdout(&["show", "1"]);
    assert!(detail.contains("Created"));
    assert!(detail.contains("Disabled"));
    assert!(detail.contains("Re-Enabled"));
}

#[test]
fn test_trueup_extends_expiration() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &["--permanent"]);
    let renewed = ws.stdout(&["trueup", "1"]);
    assert!(renewed.contains("renewed through"));
    assert!(renewed.contains("12-31"));
}

#[test]
fn test_permanent_rule_listed_as_permanent() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.0/8", &["--permanent"]);
    let listing = ws.stdout(&["list"]);
    assert!(listing.contains("PERMANENT"));
}

#[test]
fn test_audit_reports_permanent_rule_count() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &[]);
    ws.add_rule("10.0.0.2", &["--permanent", "--email", "a@example.com"]);
    ws.add_rule("10.0.0.3", &["--permanent", "--email", "b@example.com"]);

    let output = ws.stdout(&["audit"]);
    assert!(output.contains("2 permanent rule(s)"));
}

#[test]
fn test_json_output_parses() {
    let ws = TestWorkspace::new();

    ws.add_rule("10.0.0.1", &["--ticket", "SEC-9"]);

    let json = ws.stdout(&["list", "--format", "json"]);
    let rules: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(rules[0]["pattern"], "10.0.0.1");
    assert_eq!(rules[0]["ticket"], "SEC-9");
}

#[test]
fn test_operations_on_missing_rule_fail() {
    let ws = TestWorkspace::new();

    for args in [
        ["show", "99"],
        ["activate", "99"],
        ["deactivate", "99"],
        ["trueup", "99"],
    ] {
        let output = ws.run(&args);
        assert!(!output.status.success(), "{:?} unexpectedly succeeded", args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not found"), "stderr was: {}", stderr);
    }
}
