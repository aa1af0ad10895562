#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for config materialization.
//!
//! These tests drive [`materialize`] against real temporary directories and
//! check the destination state it leaves behind: content, permission bits,
//! symlink targets, and convergence across repeated runs.

mod common;

use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;

use common::TestContextBuilder;
use homestead::config::entries::{ConfigEntry, PlacementMode};
use homestead::exec::SystemExecutor;
use homestead::logging::Logger;
use homestead::materialize::{EntryOutcome, MaterializeReport, ResolvedPaths, materialize};

fn entry() -> Vec<ConfigEntry> {
    vec![ConfigEntry::new("a/x.conf", ".config/app/x.conf")]
}

fn run(entries: &[ConfigEntry], paths: &ResolvedPaths, mode: PlacementMode) -> MaterializeReport {
    materialize(entries, paths, mode, &SystemExecutor, &Logger::detached())
}

fn mode_bits(path: &Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

#[test]
fn copy_preserves_content_and_permission_bits() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    let source = ctx.root_path().join("a/x.conf");
    std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o640)).unwrap();

    let report = run(&entry(), &ctx.paths(), PlacementMode::Copy);

    let dest = ctx.home_path().join(".config/app/x.conf");
    assert!(report.is_success());
    assert_eq!(report.outcomes[0].1, EntryOutcome::Placed);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "foo");
    assert_eq!(mode_bits(&dest), 0o640);
    assert!(!dest.symlink_metadata().unwrap().is_symlink());
}

#[test]
fn copy_preserves_modification_time() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    let source = ctx.root_path().join("a/x.conf");

    run(&entry(), &ctx.paths(), PlacementMode::Copy);

    let dest = ctx.home_path().join(".config/app/x.conf");
    assert_eq!(
        std::fs::metadata(&dest).unwrap().modified().unwrap(),
        std::fs::metadata(&source).unwrap().modified().unwrap()
    );
}

#[test]
fn symlink_points_at_absolute_source() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();

    let report = run(&entry(), &ctx.paths(), PlacementMode::Symlink);

    let dest = ctx.home_path().join(".config/app/x.conf");
    assert!(report.is_success());
    assert!(dest.symlink_metadata().unwrap().is_symlink());
    let target = std::fs::read_link(&dest).unwrap();
    assert!(target.is_absolute());
    assert_eq!(target, ctx.root_path().join("a/x.conf"));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "foo");
}

#[test]
fn second_run_yields_identical_state() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    let dest = ctx.home_path().join(".config/app/x.conf");

    for mode in [PlacementMode::Copy, PlacementMode::Symlink] {
        let first = run(&entry(), &ctx.paths(), mode);
        let after_first = (
            std::fs::read_to_string(&dest).unwrap(),
            dest.symlink_metadata().unwrap().is_symlink(),
            mode_bits(&dest),
        );

        let second = run(&entry(), &ctx.paths(), mode);
        let after_second = (
            std::fs::read_to_string(&dest).unwrap(),
            dest.symlink_metadata().unwrap().is_symlink(),
            mode_bits(&dest),
        );

        assert_eq!(first, second, "{mode}");
        assert_eq!(after_first, after_second, "{mode}");
    }
}

#[test]
fn dangling_symlink_is_replaced() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    let dest = ctx.home_path().join(".config/app/x.conf");
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(ctx.root_path().join("gone"), &dest).unwrap();

    let report = run(&entry(), &ctx.paths(), PlacementMode::Copy);

    assert!(report.is_success());
    assert!(!dest.symlink_metadata().unwrap().is_symlink());
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "foo");
}

#[test]
fn existing_file_is_overwritten() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    common::write_file(&ctx.home_path().join(".config/app/x.conf"), "local edits");

    run(&entry(), &ctx.paths(), PlacementMode::Copy);

    assert_eq!(
        std::fs::read_to_string(ctx.home_path().join(".config/app/x.conf")).unwrap(),
        "foo"
    );
}

#[test]
fn empty_directory_at_destination_is_replaced() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    std::fs::create_dir_all(ctx.home_path().join(".config/app/x.conf")).unwrap();

    let report = run(&entry(), &ctx.paths(), PlacementMode::Symlink);

    assert!(report.is_success());
    assert!(
        ctx.home_path()
            .join(".config/app/x.conf")
            .symlink_metadata()
            .unwrap()
            .is_symlink()
    );
}

#[test]
fn missing_source_is_skipped_and_others_placed() {
    let ctx = TestContextBuilder::new().with_source("a/x.conf", "foo").build();
    let entries = vec![
        ConfigEntry::new("nope/absent.conf", ".absent.conf"),
        ConfigEntry::new("a/x.conf", ".config/app/x.conf"),
    ];

    let report = run(&entries, &ctx.paths(), PlacementMode::Copy);

    assert!(report.is_success());
    assert_eq!(report.outcomes[0].1, EntryOutcome::SkippedMissingSource);
    assert_eq!(report.outcomes[1].1, EntryOutcome::Placed);
    assert!(!ctx.home_path().join(".absent.conf").exists());
    assert!(ctx.home_path().join(".config/app/x.conf").exists());
}
