mod common;

use anyhow::Result;
use cir::errors::RegistryError;
use cir::paths::strip_root;
use cir::registry::RestoreAction;
use common::{TestRepo, arg, last_commit_subject};

#[test]
fn test_register_then_status_round_trip() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "data\n")?;

    let registered = registry.register(&[arg(&file)], None)?;
    assert_eq!(registered, vec![file.clone()]);

    let status = registry.status(&[arg(&file)])?;
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].file_path, file);
    assert!(!status[0].diff(registry.diff_options())?.changed());
    Ok(())
}

#[test]
fn test_register_twice_raises_already_registered() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "data\n")?;

    registry.register(&[arg(&file)], None)?;
    let before = registry.status(&[])?.len();

    let err = registry.register(&[arg(&file)], None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::AlreadyRegistered(_))
    ));

    // The failed call must not grow the tracked file set.
    assert_eq!(registry.status(&[])?.len(), before);
    Ok(())
}

#[test]
fn test_deregister_clears_metadata_and_stored_copy() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "data\n")?;

    registry.register(&[arg(&file)], None)?;
    let stored = registry.root().join(strip_root(&file));
    assert!(stored.exists());

    registry.deregister(&[arg(&file)], None)?;
    assert!(!registry.registered(file.to_str().unwrap())?);
    assert!(!stored.exists());
    Ok(())
}

#[test]
fn test_aborted_register_batch_leaves_no_staged_imports() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let a = repo.temp_dir.path().join("a.conf");
    let b = repo.temp_dir.path().join("b.conf");
    std::fs::write(&a, "a\n")?;
    std::fs::write(&b, "b\n")?;

    registry.register(&[arg(&a)], None)?;

    // b is imported before the batch aborts on the already-tracked a; the
    // import must be undone, not left staged for a later commit to adopt.
    assert!(registry.register(&[arg(&b), arg(&a)], None).is_err());
    assert!(!registry.root().join(strip_root(&b)).exists());

    let c = repo.temp_dir.path().join("c.conf");
    std::fs::write(&c, "c\n")?;
    registry.register(&[arg(&c)], None)?;

    let subject = last_commit_subject(registry.root());
    assert!(subject.contains("c.conf"));
    assert!(!subject.contains("b.conf"));
    Ok(())
}

#[test]
fn test_aborted_deregister_batch_removes_nothing() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "data\n")?;

    registry.register(&[arg(&file)], None)?;

    let err = registry
        .deregister(&[arg(&file), "/never/registered".to_string()], None)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::NotRegistered(_))
    ));

    // The tracked file ahead of the unknown one keeps its stored copy.
    assert!(registry.registered(file.to_str().unwrap())?);
    assert!(registry.root().join(strip_root(&file)).exists());
    Ok(())
}

#[test]
fn test_deregister_unknown_path_fails() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;

    let err = registry
        .deregister(&["/never/registered".to_string()], None)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::NotRegistered(_))
    ));
    Ok(())
}

#[test]
fn test_status_unknown_path_raises_not_registered() -> Result<()> {
    let repo = TestRepo::new()?;
    let registry = repo.registry;

    let err = registry
        .status(&["/never/registered".to_string()])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::NotRegistered(_))
    ));
    Ok(())
}

#[test]
fn test_divergence_is_detected_and_cleared_by_update() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "A\n")?;

    registry.register(&[arg(&file)], None)?;
    std::fs::write(&file, "B\n")?;

    let status = registry.status(&[arg(&file)])?;
    assert!(status[0].diff(registry.diff_options())?.changed());

    let updated = registry.update(&[arg(&file)], None)?;
    assert_eq!(updated, vec![file.clone()]);

    let status = registry.status(&[arg(&file)])?;
    assert!(!status[0].diff(registry.diff_options())?.changed());
    Ok(())
}

#[test]
fn test_update_is_idempotent_and_skips_empty_commits() -> Result<()> {
    let repo = TestRepo::new()?;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "A\n")?;

    let mut registry = repo.registry;
    registry.register(&[arg(&file)], None)?;

    std::fs::write(&file, "B\n")?;
    assert_eq!(registry.update(&[], None)?.len(), 1);
    let commits = common::commit_count(registry.root());

    // No intervening edits: no diff, no new revision.
    assert!(registry.update(&[], None)?.is_empty());
    assert_eq!(common::commit_count(registry.root()), commits);
    Ok(())
}

#[test]
fn test_update_commit_message_lists_affected_paths() -> Result<()> {
    let repo = TestRepo::new()?;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "A\n")?;

    let mut registry = repo.registry;
    registry.register(&[arg(&file)], None)?;

    std::fs::write(&file, "B\n")?;
    registry.update(&[], None)?;

    let subject = last_commit_subject(registry.root());
    assert!(subject.starts_with("Affected files:"));
    assert!(subject.contains("app.conf"));
    Ok(())
}

#[test]
fn test_caller_message_takes_precedence() -> Result<()> {
    let repo = TestRepo::new()?;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "A\n")?;

    let mut registry = repo.registry;
    registry.register(&[arg(&file)], Some("track app.conf"))?;

    assert_eq!(last_commit_subject(registry.root()), "track app.conf");
    Ok(())
}

#[test]
fn test_restore_asymmetry_between_scoped_and_unscoped() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let f1 = repo.temp_dir.path().join("one.conf");
    let f2 = repo.temp_dir.path().join("two.conf");
    std::fs::write(&f1, "one v1\n")?;
    std::fs::write(&f2, "two v1\n")?;

    registry.register(&[arg(&f1), arg(&f2)], None)?;
    std::fs::write(&f1, "one edited\n")?;
    std::fs::write(&f2, "two edited\n")?;

    // Unscoped, unforced: both diverged files are skipped, edits survive.
    let outcomes = registry.restore(&[], false)?;
    assert!(outcomes.iter().all(|o| o.action == RestoreAction::Skipped));
    assert_eq!(std::fs::read_to_string(&f1)?, "one edited\n");
    assert_eq!(std::fs::read_to_string(&f2)?, "two edited\n");

    // Explicit path list: overwriting is always permitted, but only for
    // the named file.
    let outcomes = registry.restore(&[arg(&f1)], false)?;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, RestoreAction::Restored);
    assert_eq!(std::fs::read_to_string(&f1)?, "one v1\n");
    assert_eq!(std::fs::read_to_string(&f2)?, "two edited\n");
    Ok(())
}

#[test]
fn test_unscoped_restore_with_force_overwrites() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut registry = repo.registry;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "v1\n")?;

    registry.register(&[arg(&file)], None)?;
    std::fs::write(&file, "edited\n")?;

    let outcomes = registry.restore(&[], true)?;
    assert_eq!(outcomes[0].action, RestoreAction::Restored);
    assert_eq!(std::fs::read_to_string(&file)?, "v1\n");
    Ok(())
}

#[test]
fn test_restore_never_commits() -> Result<()> {
    let repo = TestRepo::new()?;
    let file = repo.temp_dir.path().join("app.conf");
    std::fs::write(&file, "v1\n")?;

    let mut registry = repo.registry;
    registry.register(&[arg(&file)], None)?;

    let commits = common::commit_count(registry.root());
    std::fs::write(&file, "edited\n")?;
    registry.restore(&[arg(&file)], false)?;

    assert_eq!(common::commit_count(registry.root()), commits);
    Ok(())
}

#[test]
fn test_batch_register_issues_single_commit() -> Result<()> {
    let repo = TestRepo::new()?;
    let f1 = repo.temp_dir.path().join("one.conf");
    let f2 = repo.temp_dir.path().join("two.conf");
    std::fs::write(&f1, "one\n")?;
    std::fs::write(&f2, "two\n")?;

    let mut registry = repo.registry;
    let before = common::commit_count(registry.root());
    registry.register(&[arg(&f1), arg(&f2)], None)?;

    assert_eq!(common::commit_count(registry.root()), before + 1);

    let subject = last_commit_subject(registry.root());
    assert!(subject.contains("one.conf"));
    assert!(subject.contains("two.conf"));
    Ok(())
}
