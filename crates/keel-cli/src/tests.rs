use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use keel_core::models::{snapshot_of, DayPin, ResearchTask, TodoTask};
use keel_core::store::FileStore;

use crate::commands::common::{
    day_view, format_relative_time, live_sorted, normalize_task_identifier, normalize_title,
    parse_due_date, resolve_record_id, short_id, AppContext, SyncReport,
};
use crate::config::CliProfile;
use crate::error::CliError;

fn test_context(dir: &tempfile::TempDir) -> AppContext {
    AppContext {
        kv: FileStore::new(dir.path()),
        profile: CliProfile {
            owner_id: Some("test-owner".to_string()),
            ..CliProfile::default()
        },
    }
}

#[test]
fn normalize_title_joins_and_rejects_empty() {
    assert_eq!(
        normalize_title(&["buy".to_string(), "stamps".to_string()]).unwrap(),
        "buy stamps"
    );
    assert!(normalize_title(&[" ".to_string()]).is_err());
    assert!(normalize_title(&[]).is_err());
}

#[test]
fn normalize_task_identifier_rejects_empty() {
    assert!(normalize_task_identifier("  ").is_err());
    assert_eq!(normalize_task_identifier(" abc ").unwrap(), "abc");
}

#[test]
fn parse_due_date_requires_iso_day() {
    assert_eq!(
        parse_due_date("2026-04-01").unwrap(),
        "2026-04-01".parse::<chrono::NaiveDate>().unwrap()
    );
    assert!(parse_due_date("April 1st").is_err());
}

#[test]
fn resolve_record_id_matches_exact_and_prefix() {
    let records = snapshot_of([
        TodoTask::seeded("abc-123", "one"),
        TodoTask::seeded("abd-456", "two"),
    ]);

    assert_eq!(resolve_record_id(&records, "abc-123").unwrap(), "abc-123");
    assert_eq!(resolve_record_id(&records, "abd").unwrap(), "abd-456");
}

#[test]
fn resolve_record_id_reports_ambiguity_and_absence() {
    let records = snapshot_of([
        TodoTask::seeded("abc-123", "one"),
        TodoTask::seeded("abc-456", "two"),
    ]);

    assert!(matches!(
        resolve_record_id(&records, "abc"),
        Err(CliError::AmbiguousTaskId(_))
    ));
    assert!(matches!(
        resolve_record_id(&records, "zzz"),
        Err(CliError::TaskNotFound(_))
    ));
}

#[test]
fn resolve_record_id_skips_tombstones() {
    let mut gone = TodoTask::seeded("abc-123", "gone");
    gone.mark_deleted();
    let records = snapshot_of([gone, TodoTask::seeded("abd-456", "live")]);

    assert_eq!(resolve_record_id(&records, "ab").unwrap(), "abd-456");
}

#[test]
fn format_relative_time_units() {
    let now = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
    assert_eq!(format_relative_time(Some(now - Duration::seconds(30)), now), "just now");
    assert_eq!(format_relative_time(Some(now - Duration::minutes(2)), now), "2m ago");
    assert_eq!(format_relative_time(Some(now - Duration::hours(2)), now), "2h ago");
    assert_eq!(format_relative_time(Some(now - Duration::days(3)), now), "3d ago");
    assert_eq!(format_relative_time(None, now), "seeded");
}

#[test]
fn short_id_takes_leading_prefix() {
    assert_eq!(short_id("0195f7a2-aaaa-bbbb"), "0195f7a2");
}

#[test]
fn live_sorted_orders_newest_first_and_drops_tombstones() {
    let old = TodoTask {
        updated_at: Some(Utc.with_ymd_and_hms(2026, 3, 5, 10, 0, 0).unwrap()),
        ..TodoTask::seeded("old", "old")
    };
    let new = TodoTask {
        updated_at: Some(Utc.with_ymd_and_hms(2026, 3, 5, 11, 0, 0).unwrap()),
        ..TodoTask::seeded("new", "new")
    };
    let mut gone = TodoTask::new("gone");
    gone.mark_deleted();

    let records = snapshot_of([old, new, gone]);
    let live = live_sorted(&records);
    let ids: Vec<&str> = live.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);
}

#[test]
fn context_roundtrips_collections_per_owner() {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&dir);
    let owner = context.owner();
    assert_eq!(owner, "test-owner");

    let task = TodoTask::new("persisted");
    let mut todos = context.load_todos(&owner);
    assert!(todos.is_empty());
    todos.insert(task.id.clone(), task.clone());
    context.save_todos(&owner, &todos);

    let reloaded = context.load_todos(&owner);
    assert_eq!(reloaded.get(&task.id), Some(&task));

    // A different owner partition sees nothing.
    assert!(context.load_todos("someone-else").is_empty());
}

#[test]
fn day_view_joins_pins_with_task_titles() {
    let today = "2026-03-05".parse().unwrap();
    let todo = TodoTask::seeded("todo-1", "Water the plants");
    let research = ResearchTask::seeded("res-1", "Read merge papers");

    let mut unpinned = DayPin::new("gone-task", today);
    unpinned.mark_deleted();
    let pins = snapshot_of([
        DayPin::new("todo-1", today),
        DayPin::new("res-1", today),
        DayPin::new("todo-1", "2026-03-01".parse().unwrap()),
        unpinned,
    ]);

    let items = day_view(
        &pins,
        &snapshot_of([todo]),
        &snapshot_of([research]),
        today,
    );

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Read merge papers");
    assert_eq!(items[0].kind, "research");
    assert_eq!(items[1].title, "Water the plants");
    assert_eq!(items[1].kind, "todo");
}

#[test]
fn sync_report_line_is_compact() {
    let report = SyncReport {
        kind: keel_core::EntityKind::TodoTask,
        status: keel_core::sync::SyncStatus::Synced,
        records: 4,
        pushed: 2,
    };
    assert_eq!(report.line(), "todo-tasks: synced (4 records, pushed 2)");
}
