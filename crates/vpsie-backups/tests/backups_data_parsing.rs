//! Integration tests for parsing backup policy data.

use std::fs;
use std::path::PathBuf;
use vpsie_backups::models::BackupPolicy;
use vpsie_core::ids::VmId;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_policy() -> BackupPolicy {
    let fixture_path = fixtures_dir().join("backup_policy.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read policy fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize backup policy: {e}"))
}

#[test]
fn test_policy_schedule() {
    let policy = load_policy();

    assert_eq!(policy.name, "daily-keep-7");
    assert_eq!(policy.backup_plan.as_deref(), Some("daily"));
    assert_eq!(policy.plan_every, Some(1));
    assert_eq!(policy.keep, Some(7));
    assert!(!policy.is_disabled());
    assert_eq!(policy.user_id, Some(5521));
}

#[test]
fn test_policy_vms() {
    let policy = load_policy();

    assert_eq!(policy.vms.len(), 2);
    assert!(policy
        .vms
        .contains(&VmId::new("a1b2c3d4-0000-4000-8000-000000000002")));
}
