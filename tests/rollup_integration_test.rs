mod common;

use common::{assert_close, fixture_data_dir, SITE};
use pretty_assertions::assert_eq;
use siteprogress::config::{FetchConfig, SiteProgressConfig};
use siteprogress::snapshot::{aggregate_site, AggregationOutcome, JsonDirSource, ReportCache};
use siteprogress::ExclusionReason;
use std::fs;

fn sequential_config() -> SiteProgressConfig {
    SiteProgressConfig {
        fetch: FetchConfig::sequential(),
        ..Default::default()
    }
}

#[test]
fn test_fixture_site_rolls_up_both_tracks() {
    let data = fixture_data_dir();
    let outcome = aggregate_site(
        JsonDirSource::new(data.path()),
        SITE,
        &SiteProgressConfig::default(),
    );

    let AggregationOutcome::Ready { report, stats, .. } = outcome else {
        panic!("expected a ready outcome");
    };

    // Local track: trench (200) and grid-scoped cable pull (100)
    let site = &report.site_wide.totals;
    assert_close(site.qc, 150.0);
    assert_close(site.unverified, 80.0);
    assert_close(site.scope, 300.0);
    assert_close(site.percentage.value(), 50.0);

    let categories = report.by_main_category();
    assert_eq!(
        categories.keys().cloned().collect::<Vec<_>>(),
        vec!["civil-works".to_string(), "electrical".to_string()]
    );
    assert_close(categories["civil-works"].percentage.value(), 25.0);
    assert_close(categories["electrical"].percentage.value(), 100.0);
    assert_eq!(report.category_name("civil-works"), "Civil Works");

    // BOQ track: trench (250) and backfill (40)
    let boq = &report.boq_only;
    assert_close(boq.totals.qc, 60.0);
    assert_close(boq.totals.scope, 290.0);
    assert_eq!(boq.activities_with_boq, 2);
    assert_eq!(boq.activities_without_boq, 1);
    assert_close(boq.by_main_category["civil-works"].scope, 290.0);

    assert_eq!(report.diagnostics.activities_scanned, 4);
    assert_eq!(report.diagnostics.excluded[&ExclusionReason::Handoff], 1);
    assert_eq!(report.diagnostics.excluded[&ExclusionReason::NoLocalScope], 1);
    assert_eq!(stats.skipped_records, 1);
    assert_eq!(stats.activity_batches, 1);
}

#[test]
fn test_assignees_resolve_by_id_and_external_id() {
    let data = fixture_data_dir();
    let outcome = aggregate_site(JsonDirSource::new(data.path()), SITE, &sequential_config());
    let report = outcome.report().expect("ready outcome");

    let order: Vec<&str> = report
        .by_assignee
        .iter()
        .map(|a| a.user_id.as_str())
        .collect();
    assert_eq!(order, vec!["U2", "U1"]);

    let ana = report.assignee("U1").unwrap();
    assert_eq!(ana.activity_count, 1);
    assert_close(ana.totals.percentage.value(), 25.0);
    assert_eq!(ana.by_task.len(), 1);
    assert_eq!(ana.by_task[0].display_name, "PV-1 / B1");
    assert_eq!(ana.by_task[0].sub_category, "Trenching");
    assert_close(ana.boq.percentage.value(), 50.0 / 290.0 * 100.0);

    let ben = report.assignee("U2").unwrap();
    assert_close(ben.totals.scope, 100.0);
    assert_eq!(ben.by_task[0].display_name, "Task T2");
    assert!(ben.boq.is_zero());
}

#[test]
fn test_missing_collection_makes_site_unavailable() {
    let data = fixture_data_dir();
    fs::remove_file(data.path().join(SITE).join("users.json")).unwrap();

    let outcome = aggregate_site(JsonDirSource::new(data.path()), SITE, &sequential_config());

    match outcome {
        AggregationOutcome::Unavailable { site, reason } => {
            assert_eq!(site, SITE);
            assert!(reason.contains("users.json"), "reason: {reason}");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[test]
fn test_site_without_tasks_reports_zero() {
    let data = fixture_data_dir();
    fs::write(data.path().join(SITE).join("tasks.json"), "[]").unwrap();

    let outcome = aggregate_site(JsonDirSource::new(data.path()), SITE, &sequential_config());
    let report = outcome.report().expect("ready outcome");

    assert!(report.is_empty());
    assert!(report.by_assignee.is_empty());
    assert_eq!(report.diagnostics.activities_scanned, 0);
    assert_eq!(report.boq_only.activities_with_boq, 0);
}

#[test]
fn test_small_batches_give_same_report() {
    let data = fixture_data_dir();
    let single = aggregate_site(JsonDirSource::new(data.path()), SITE, &sequential_config());

    let batched_config = SiteProgressConfig {
        fetch: FetchConfig {
            batch_size: 1,
            parallel: true,
            max_concurrency: Some(2),
        },
        ..Default::default()
    };
    let batched = aggregate_site(JsonDirSource::new(data.path()), SITE, &batched_config);

    let AggregationOutcome::Ready { stats, .. } = &batched else {
        panic!("expected a ready outcome");
    };
    assert_eq!(stats.activity_batches, 2);
    assert_eq!(single.report(), batched.report());
}

#[test]
fn test_cache_serves_repeat_requests() {
    let data = fixture_data_dir();
    let source = JsonDirSource::new(data.path());
    let config = sequential_config();
    let cache = ReportCache::from_config(&config.report);

    let first = cache.get_or_load(SITE, || aggregate_site(&source, SITE, &config));
    fs::remove_file(data.path().join(SITE).join("tasks.json")).unwrap();
    let second = cache.get_or_load(SITE, || aggregate_site(&source, SITE, &config));

    assert!(second.is_ready());
    assert_eq!(first, second);

    cache.invalidate(SITE);
    let third = cache.get_or_load(SITE, || aggregate_site(&source, SITE, &config));
    assert!(!third.is_ready());
}
