//! End-to-end tests: observatory client against a mock server, through the
//! join/aggregate pipeline.

mod common;

use common::{datapoint, mock_observatory, mock_raw_mev, mock_validators, validator};
use mev_analysis::{build_report, BarPoint, ReportOutcome};
use mev_data::HeightRange;

/// The documented two-block scenario: one matched proposer, one unmatched.
#[tokio::test]
async fn joins_mev_with_validator_monikers() {
    let (mut server, client) = mock_observatory().await;
    let mev = mock_raw_mev(
        &mut server,
        100,
        101,
        vec![
            datapoint(100, "2000000", "abc"),
            datapoint(101, "500000", "xyz"),
        ],
    )
    .await;
    let validators = mock_validators(&mut server, vec![validator("abc", "ValidatorA")], 1).await;

    let outcome = build_report(HeightRange::new(100, 101), &client, &client)
        .await
        .expect("pipeline should succeed");

    mev.assert_async().await;
    validators.assert_async().await;

    let ReportOutcome::Report(report) = outcome else {
        panic!("expected report, got no data");
    };

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].scaled_value, 2.0);
    assert_eq!(report.records[0].moniker.as_deref(), Some("ValidatorA"));
    assert_eq!(report.records[1].scaled_value, 0.5);
    assert_eq!(report.records[1].moniker, None);

    assert_eq!(
        report.per_block,
        vec![
            BarPoint {
                height: 100,
                scaled_value: 2.0,
                moniker: Some("ValidatorA".to_string()),
            },
            BarPoint {
                height: 101,
                scaled_value: 0.5,
                moniker: None,
            },
        ]
    );
    assert_eq!(report.top, report.per_block);
    assert_eq!(report.stats.unmatched_records, 1);
}

/// No samples means no validator request and a no-data outcome.
#[tokio::test]
async fn empty_window_reports_no_data_without_validator_fetch() {
    let (mut server, client) = mock_observatory().await;
    let mev = mock_raw_mev(&mut server, 5, 9, vec![]).await;
    let validators = mock_validators(&mut server, vec![validator("abc", "ValidatorA")], 0).await;

    let range = HeightRange::new(5, 9);
    let outcome = build_report(range, &client, &client).await.unwrap();

    mev.assert_async().await;
    validators.assert_async().await;
    assert_eq!(outcome, ReportOutcome::NoData { range });
}

/// An inverted window is sent as-is rather than swapped or rejected.
#[tokio::test]
async fn inverted_window_is_passed_through() {
    let (mut server, client) = mock_observatory().await;
    let mev = mock_raw_mev(&mut server, 200, 100, vec![]).await;
    let validators = mock_validators(&mut server, vec![], 0).await;

    let range = HeightRange::new(200, 100);
    let outcome = build_report(range, &client, &client).await.unwrap();

    mev.assert_async().await;
    validators.assert_async().await;
    assert!(matches!(outcome, ReportOutcome::NoData { .. }));
}

/// Per-block length equals sample count; top view is capped at 15 and holds
/// the largest values.
#[tokio::test]
async fn views_cover_every_sample() {
    let (mut server, client) = mock_observatory().await;
    let datapoints = (0..40u64)
        .map(|i| {
            let value = ((i * 37) % 41) * 100_000;
            datapoint(1_000 + i, &value.to_string(), if i % 2 == 0 { "abc" } else { "def" })
        })
        .collect();
    let _mev = mock_raw_mev(&mut server, 1_000, 1_039, datapoints).await;
    let _validators = mock_validators(&mut server, vec![validator("abc", "ValidatorA")], 1).await;

    let outcome = build_report(HeightRange::new(1_000, 1_039), &client, &client)
        .await
        .unwrap();
    let ReportOutcome::Report(report) = outcome else {
        panic!("expected report");
    };

    assert_eq!(report.records.len(), 40);
    assert_eq!(report.per_block.len(), 40);
    assert!(report
        .per_block
        .windows(2)
        .all(|pair| pair[0].height <= pair[1].height));

    assert_eq!(report.top.len(), 15);
    assert!(report
        .top
        .windows(2)
        .all(|pair| pair[0].scaled_value >= pair[1].scaled_value));
    let floor = report.top.last().unwrap().scaled_value;
    let excluded = report
        .per_block
        .iter()
        .filter(|p| !report.top.iter().any(|t| t.height == p.height));
    assert!(excluded.into_iter().all(|p| p.scaled_value <= floor));

    assert_eq!(report.stats.unmatched_records, 20);
    assert_eq!(report.stats.distinct_proposers, 2);
}

/// Repeated heights are not merged; they show up as adjacent bars.
#[tokio::test]
async fn repeated_heights_stay_separate() {
    let (mut server, client) = mock_observatory().await;
    let _mev = mock_raw_mev(
        &mut server,
        7,
        8,
        vec![
            datapoint(8, "1000000", "abc"),
            datapoint(7, "3000000", "abc"),
            datapoint(8, "2000000", "abc"),
        ],
    )
    .await;
    let _validators = mock_validators(&mut server, vec![validator("abc", "ValidatorA")], 1).await;

    let outcome = build_report(HeightRange::new(7, 8), &client, &client)
        .await
        .unwrap();
    let ReportOutcome::Report(report) = outcome else {
        panic!("expected report");
    };

    let bars: Vec<(u64, f64)> = report
        .per_block
        .iter()
        .map(|p| (p.height, p.scaled_value))
        .collect();
    assert_eq!(bars, vec![(7, 3.0), (8, 1.0), (8, 2.0)]);
}

/// A failing validator endpoint aborts the report with context.
#[tokio::test]
async fn validator_outage_is_reported() {
    let (mut server, client) = mock_observatory().await;
    let _mev = mock_raw_mev(&mut server, 1, 1, vec![datapoint(1, "10", "abc")]).await;
    let _mock = server
        .mock("GET", "/api/v1/validator")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let err = build_report(HeightRange::new(1, 1), &client, &client)
        .await
        .unwrap_err();

    let chain = format!("{err:#}");
    assert!(chain.contains("failed to fetch validator directory"));
    assert!(chain.contains("502"));
}
