// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Range query behaviour against a mock endpoint.

use fortibit_breach::{BreachOutcome, BreachQueryUnit, RangeClient, RangeSettings};
use fortibit_core::EntryId;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// SHA-1("password")
const PASSWORD_SHA1: &str = "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8";
// SHA-1("correct horse battery staple")
const STAPLE_SHA1: &str = "BFD3617727EAB0E800E62A776C76381DEFBC4145";

fn client_for(server: &MockServer, concurrency: usize) -> RangeClient {
    RangeClient::new(&RangeSettings {
        api_url: format!("{}/range", server.uri()),
        timeout_secs: 1,
        concurrency,
    })
    .unwrap()
}

#[tokio::test]
async fn only_prefix_leaves_the_process() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/5BAA6"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("1e4c9b93f3f0682250b6cf8331b7ee68fd8:9\n"),
        )
        .mount(&server)
        .await;

    let unit = BreachQueryUnit::from_hash(EntryId::from(1), PASSWORD_SHA1).unwrap();
    let reports = client_for(&server, 1).check_all(vec![unit]).await;
    assert_eq!(reports[0].outcome, BreachOutcome::Occurrences { count: 9 });

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let url = requests[0].url.to_string();
    assert!(url.ends_with("/range/5BAA6"), "unexpected url {url}");
    assert!(!url.to_uppercase().contains(&PASSWORD_SHA1[5..]));
}

#[tokio::test]
async fn absent_suffix_reports_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/BFD36"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "0000000000000000000000000000000000A:12\n1111111111111111111111111111111111B:0\n",
        ))
        .mount(&server)
        .await;

    let unit = BreachQueryUnit::from_hash(EntryId::from(2), STAPLE_SHA1).unwrap();
    let reports = client_for(&server, 1).check_all(vec![unit]).await;
    assert_eq!(reports[0].outcome, BreachOutcome::Occurrences { count: 0 });
    assert!(!reports[0].is_exposed());
}

#[tokio::test]
async fn failures_are_scoped_to_one_entry_and_order_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/5BAA6"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("1E4C9B93F3F0682250B6CF8331B7EE68FD8:3\n"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/range/BFD36"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let units = vec![
        BreachQueryUnit::from_hash(EntryId::from("staple"), STAPLE_SHA1).unwrap(),
        BreachQueryUnit::from_secret(EntryId::from(7), "password"),
        BreachQueryUnit::from_hash(EntryId::from(8), PASSWORD_SHA1).unwrap(),
    ];
    let reports = client_for(&server, 3).check_all(units).await;

    let ids: Vec<String> = reports.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["staple", "7", "8"]);
    assert!(matches!(reports[0].outcome, BreachOutcome::Failed { .. }));
    assert_eq!(reports[1].outcome, BreachOutcome::Occurrences { count: 3 });
    assert_eq!(reports[2].outcome, BreachOutcome::Occurrences { count: 3 });
}

#[tokio::test]
async fn slow_endpoint_times_out_per_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("")
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let unit = BreachQueryUnit::from_hash(EntryId::from(1), PASSWORD_SHA1).unwrap();
    let reports = client_for(&server, 1).check_all(vec![unit]).await;
    assert!(
        matches!(&reports[0].outcome, BreachOutcome::Failed { reason } if reason.contains("timed out")),
        "got {:?}",
        reports[0].outcome
    );
}
