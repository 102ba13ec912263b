mod helpers;

use helpers::{assertions, CliTestHarness, TestFixtures};
use predicates::prelude::*;

fn short(id: &str) -> &str {
    &id[..8]
}

#[test]
fn test_help_lists_commands() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("event"))
        .stdout(predicate::str::contains("shift"));
}

#[test]
fn test_client_add_and_list() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&TestFixtures::sample_client_args())
        .stdout(assertions::added_successfully());

    harness
        .run_success(&["client", "list"])
        .stdout(predicate::str::contains("Tanaka"))
        .stdout(predicate::str::contains("Care level 2"))
        .stdout(predicate::str::contains("1-2-3 Chuo"));
    assert!(harness.data_path().exists());
}

#[test]
fn test_empty_lists() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["event", "list", "--month", "2026-02"])
        .stdout(predicate::str::contains("No events found."));
    harness
        .run_success(&["client", "list"])
        .stdout(predicate::str::contains("No clients found."));
}

#[test]
fn test_builtin_categories_are_listed() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("Monitoring"))
        .stdout(predicate::str::contains("Assessment"))
        .stdout(predicate::str::contains("Care conference"))
        .stdout(predicate::str::contains("#0ea5e9"));
}

#[test]
fn test_weekly_series_listing() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_client_args());
    harness
        .run_success(&TestFixtures::sample_weekly_args())
        .stdout(predicate::str::contains("weekly series"));

    let listing = harness.stdout(&["event", "list", "--month", "2026-02"]);
    assert!(assertions::has_event_table_headers().eval(listing.as_str()));
    // Tuesdays 3, 10, 17, 24 and Thursdays 5, 12, 19, 26
    assert_eq!(listing.matches("Tanaka: Monitoring").count(), 8);
    assert!(listing.contains("09:00-10:00"));

    // One stored template, not eight events
    assert_eq!(harness.event_ids("Tanaka").len(), 1);
}

#[test]
fn test_weekly_edit_this_then_delete_following() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_client_args());
    harness.run_success(&TestFixtures::sample_weekly_args());
    let template_id = harness.event_ids("Tanaka")[0].clone();

    harness
        .run_success(&[
            "event", "edit", short(&template_id), "--date", "2026-02-10", "--scope", "this", "--start", "13:00",
            "--end", "14:00",
        ])
        .stdout(predicate::str::contains("Updated occurrence on 2026-02-10"));

    let listing = harness.stdout(&["event", "list", "--month", "2026-02"]);
    assert_eq!(listing.matches("Tanaka: Monitoring").count(), 8);
    assert_eq!(listing.matches("13:00-14:00").count(), 1);
    assert_eq!(harness.event_ids("Tanaka").len(), 2);

    harness.run_success(&[
        "event", "delete", short(&template_id), "--date", "2026-02-17", "--scope", "following", "--force",
    ]);

    // 3, 5 and 12 from the template plus the moved occurrence on the 10th
    let listing = harness.stdout(&["event", "list", "--month", "2026-02"]);
    assert_eq!(listing.matches("Tanaka: Monitoring").count(), 4);
    assert!(!listing.contains("2026-02-17"));
    assert!(!listing.contains("2026-02-26"));
}

#[test]
fn test_weekly_occurrence_requires_date() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_client_args());
    harness.run_success(&TestFixtures::sample_weekly_args());
    let template_id = harness.event_ids("Tanaka")[0].clone();

    harness
        .run_failure(&["event", "delete", short(&template_id), "--scope", "this", "--force"])
        .stderr(predicate::str::contains("--date"));

    harness
        .run_failure(&[
            "event", "delete", short(&template_id), "--date", "2026-02-04", "--scope", "this", "--force",
        ])
        .stderr(predicate::str::contains("no occurrence on 2026-02-04"));
}

#[test]
fn test_monthly_series_spans_twelve_months() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&TestFixtures::sample_monthly_args())
        .stdout(predicate::str::contains("12 events"))
        .stdout(predicate::str::contains("2026-02-03 to 2027-01-05"));

    assert_eq!(harness.event_ids("Care conference").len(), 12);
    harness
        .run_success(&["event", "list", "--month", "2026-06"])
        .stdout(predicate::str::contains("2026-06-02"));
}

#[test]
fn test_monthly_delete_entire_series() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_monthly_args());
    let ids = harness.event_ids("Care conference");

    harness.run_success(&["event", "delete", short(&ids[3]), "--scope", "all", "--force"]);
    assert!(harness.event_ids("Care conference").is_empty());
}

#[test]
fn test_monthly_delete_this_and_following() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_monthly_args());
    let ids = harness.event_ids("Care conference");

    // Fifth instance: 2026-06-02
    harness.run_success(&["event", "delete", short(&ids[4]), "--scope", "following", "--force"]);
    assert_eq!(harness.event_ids("Care conference").len(), 4);
}

#[test]
fn test_single_event_edit_moves_date() {
    let harness = CliTestHarness::new();
    harness.run_success(&["event", "add", "assessment", "--date", "2026-03-02", "--start", "14:00", "--end", "15:00"]);
    let id = harness.event_ids("Assessment")[0].clone();

    harness.run_success(&["event", "edit", short(&id), "--move-to", "2026-03-04", "--notes", "bring forms"]);

    let listing = harness.stdout(&["event", "list", "--month", "2026-03"]);
    assert!(listing.contains("2026-03-04"));
    assert!(!listing.contains("2026-03-02"));
    assert!(listing.contains("bring forms"));
    assert_eq!(harness.event_ids("Assessment"), vec![id]);
}

#[test]
fn test_unknown_client_is_rejected() {
    let harness = CliTestHarness::new();
    harness
        .run_failure(&["event", "add", "monitoring", "--client", "Nobody", "--date", "2026-02-03"])
        .stderr(assertions::has_error());
}

#[test]
fn test_invalid_month_is_rejected() {
    let harness = CliTestHarness::new();
    harness
        .run_failure(&["event", "list", "--month", "2026-13"])
        .stderr(predicate::str::contains("YYYY-MM"));
}

#[test]
fn test_short_id_too_short() {
    let harness = CliTestHarness::new();
    harness
        .run_failure(&["event", "delete", "a", "--force"])
        .stderr(predicate::str::contains("at least 2 characters"));
}

#[test]
fn test_manager_filter_limits_listing() {
    let harness = CliTestHarness::new();
    harness.run_success(&["manager", "add", "Sato"]);
    harness.run_success(&["manager", "add", "Suzuki"]);
    harness.run_success(&["client", "add", "Tanaka", "--manager", "Sato"]);
    harness.run_success(&["client", "add", "Ito", "--manager", "Suzuki"]);
    harness.run_success(&["event", "add", "monitoring", "--client", "Tanaka", "--date", "2026-02-03"]);
    harness.run_success(&["event", "add", "monitoring", "--client", "Ito", "--date", "2026-02-04"]);
    harness.run_success(&["event", "add", "other", "--owner", "Sato", "--date", "2026-02-05"]);

    let listing = harness.stdout(&["event", "list", "--month", "2026-02", "--manager", "Sato"]);
    assert!(listing.contains("Tanaka: Monitoring"));
    assert!(listing.contains("Other"));
    assert!(!listing.contains("Ito"));

    harness
        .run_success(&["client", "list", "--manager", "Suzuki"])
        .stdout(predicate::str::contains("Ito"))
        .stdout(predicate::str::contains("Tanaka").not());

    harness
        .run_failure(&["event", "list", "--manager", "Nobody"])
        .stderr(predicate::str::contains("No care manager named"));
}

#[test]
fn test_client_filter_shows_one_schedule() {
    let harness = CliTestHarness::new();
    harness.run_success(&["client", "add", "Tanaka"]);
    harness.run_success(&["client", "add", "Ito"]);
    harness.run_success(&TestFixtures::sample_weekly_args());
    harness.run_success(&["event", "add", "assessment", "--client", "Ito", "--date", "2026-02-04"]);
    harness.run_success(&["event", "add", "other", "--date", "2026-02-05"]);

    let listing = harness.stdout(&["event", "list", "--month", "2026-02", "--client", "Ito"]);
    assert!(listing.contains("Ito: Assessment"));
    assert!(!listing.contains("Tanaka"));
    assert!(!listing.contains("Other"));

    let listing = harness.stdout(&["event", "list", "--month", "2026-02", "--client", "tanaka"]);
    assert_eq!(listing.matches("Tanaka: Monitoring").count(), 8);
    assert!(!listing.contains("Ito"));

    harness
        .run_failure(&["event", "list", "--client", "Nobody"])
        .stderr(assertions::has_error());
}

#[test]
fn test_removed_client_is_listed_by_id() {
    let harness = CliTestHarness::new();
    harness.run_success(&["client", "add", "Tanaka"]);
    harness.run_success(&["event", "add", "monitoring", "--client", "Tanaka", "--date", "2026-02-03"]);
    let client_id = harness.document()["clients"][0]["id"]
        .as_str()
        .expect("client id")
        .to_string();

    harness.run_success(&["client", "delete", "Tanaka", "--force"]);
    harness
        .run_success(&["event", "list", "--month", "2026-02"])
        .stdout(predicate::str::contains("Client"))
        .stdout(predicate::str::contains(client_id));
}

#[test]
fn test_default_end_before_given_start_is_rejected() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_client_args());
    harness
        .run_failure(&["event", "add", "other", "--date", "2026-02-03", "--start", "14:00"])
        .stderr(predicate::str::contains("before start time"));
    assert!(harness.event_ids("Other").is_empty());

    harness
        .run_success(&["event", "add", "other", "--date", "2026-02-03", "--start", "09:00"])
        .stdout(assertions::added_successfully());
}

#[test]
fn test_category_lifecycle() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["category", "add", "Home visit", "--color", "#22c55e", "--start", "13:00", "--end", "14:30"])
        .stdout(assertions::added_successfully());
    harness.run_success(&["event", "add", "home visit", "--date", "2026-02-03"]);

    harness
        .run_success(&["event", "list", "--month", "2026-02"])
        .stdout(predicate::str::contains("Home visit"))
        .stdout(predicate::str::contains("13:00-14:30"));

    harness
        .run_failure(&["category", "add", "Home visit"])
        .stderr(assertions::has_error());
    harness
        .run_failure(&["category", "add", "Bad colour", "--color", "green"])
        .stderr(assertions::has_error());

    harness.run_success(&["category", "delete", "Home visit"]);
    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("Home visit").not());
    // The event keeps its copied label
    harness
        .run_success(&["event", "list", "--month", "2026-02"])
        .stdout(predicate::str::contains("Home visit"));
}

#[test]
fn test_client_edit_and_delete() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::sample_client_args());
    harness.run_success(&["client", "edit", "Tanaka", "--care-level", "Care level 3", "--notes", "Prefers mornings"]);
    harness
        .run_success(&["client", "list"])
        .stdout(predicate::str::contains("Care level 3"))
        .stdout(predicate::str::contains("Prefers mornings"));

    harness.run_success(&["client", "delete", "Tanaka", "--force"]);
    harness
        .run_success(&["client", "list"])
        .stdout(predicate::str::contains("No clients found."));
}

#[test]
fn test_holidays_are_idempotent() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["holiday", "add", "2026-02-11"])
        .stdout(predicate::str::contains("Added holiday 2026-02-11"));
    harness
        .run_success(&["holiday", "add", "2026-02-11"])
        .stdout(predicate::str::contains("already a holiday"));
    harness.run_success(&["holiday", "add", "2026-03-20"]);

    let listing = harness.stdout(&["holiday", "list", "--month", "2026-02"]);
    assert!(listing.contains("2026-02-11"));
    assert!(!listing.contains("2026-03-20"));

    harness.run_success(&["holiday", "remove", "2026-02-11"]);
    harness
        .run_success(&["holiday", "remove", "2026-02-11"])
        .stdout(predicate::str::contains("not a holiday"));
}

const SHIFT_CONFIG: &str = r#"
[shift]
staff = ["Sato", "Suzuki", "Takahashi"]
legal_holidays = 4
legal_out_holidays = 5
"#;

#[test]
fn test_shift_manual_cells() {
    let harness = CliTestHarness::with_config(SHIFT_CONFIG);

    harness
        .run_success(&["shift", "--month", "2026-02", "cycle", "Sato", "1"])
        .stdout(predicate::str::contains("hope_holiday"));
    harness
        .run_success(&["shift", "--month", "2026-02", "cycle", "Sato", "1"])
        .stdout(predicate::str::contains("fixed_work"));
    harness
        .run_success(&["shift", "--month", "2026-02", "set", "2", "3", "paid"])
        .stdout(predicate::str::contains("paid_leave"));
    harness
        .run_success(&["shift", "--month", "2026-02", "telework", "Takahashi", "4"])
        .stdout(predicate::str::contains("remotely"));
    harness
        .run_success(&["shift", "--month", "2026-02", "oncall", "5", "Suzuki"])
        .stdout(predicate::str::contains("is on call on day 5"));

    let doc = harness.document();
    let grid = &doc["shifts"]["2026-02"];
    assert_eq!(grid["shifts"]["0-0"], "fixed_work");
    assert_eq!(grid["shifts"]["1-2"], "paid_leave");
    assert_eq!(grid["onCall"]["4"], "1");
    assert!(grid["updatedAt"].is_string());

    harness
        .run_failure(&["shift", "--month", "2026-02", "cycle", "Sato", "29"])
        .stderr(predicate::str::contains("outside 2026-02"));
    harness
        .run_failure(&["shift", "--month", "2026-02", "cycle", "Tanaka", "1"])
        .stderr(predicate::str::contains("No staff member"));
}

#[test]
fn test_shift_auto_plan_fills_grid_and_keeps_requests() {
    let harness = CliTestHarness::with_config(SHIFT_CONFIG);
    harness.run_success(&["shift", "--month", "2026-02", "set", "Sato", "1", "hope_holiday"]);
    harness.run_success(&["shift", "--month", "2026-02", "set", "Suzuki", "2", "fixed_work"]);

    harness
        .run_success(&["shift", "--month", "2026-02", "auto", "--seed", "7"])
        .stdout(predicate::str::contains("Planned 2026-02"))
        .stdout(predicate::str::contains("On call"));

    let doc = harness.document();
    let cells = doc["shifts"]["2026-02"]["shifts"].as_object().unwrap();
    assert_eq!(cells.len(), 3 * 28);
    assert_eq!(cells["0-0"], "hope_holiday");
    assert_eq!(cells["1-1"], "fixed_work");

    for staff in 0..3 {
        let off = (0..28)
            .filter(|day| {
                let state = cells[&format!("{}-{}", staff, day)].as_str().unwrap();
                matches!(state, "hope_holiday" | "paid_leave" | "legal_holiday" | "legal_out_holiday")
            })
            .count();
        assert_eq!(off, 9, "staff {} has {} days off", staff, off);
    }
}

#[test]
fn test_shift_clear() {
    let harness = CliTestHarness::with_config(SHIFT_CONFIG);
    harness.run_success(&["shift", "--month", "2026-02", "auto", "--seed", "1"]);
    harness
        .run_success(&["shift", "--month", "2026-02", "clear", "--force"])
        .stdout(predicate::str::contains("Cleared shifts of 2026-02"));
    harness
        .run_success(&["shift", "--month", "2026-02", "clear", "--force"])
        .stdout(predicate::str::contains("No shifts stored"));
}

#[test]
fn test_corrupt_data_file_fails_loudly() {
    let harness = CliTestHarness::new();
    std::fs::create_dir_all(harness.data_path().parent().unwrap()).unwrap();
    std::fs::write(harness.data_path(), "{ not json").unwrap();

    harness
        .run_failure(&["client", "list"])
        .stderr(predicate::str::contains("could not be read"));
}
