use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use soxguard_core::AppResult;
use soxguard_domain::{ControlPlaneEndpoint, HttpMethod, ResourceGroupRef};

use crate::test_support::ScriptedTokenProvider;
use crate::{
    ControlPlaneClient, GovernancePolicy, HttpResponse, HttpSender, OutboundRequest,
    SoxGovernanceService,
};

use super::{GovernanceBatchRunner, GovernanceBatchSummary};

/// Answers every PUT after a short delay and tracks how many are in flight.
#[derive(Default)]
struct SlowControlPlane {
    rejected_groups: Vec<&'static str>,
    crashing_group: Option<&'static str>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    puts: AtomicUsize,
}

impl SlowControlPlane {
    fn targets(url: &str, group: &str) -> bool {
        url.contains(format!("/resourceGroups/{group}/").as_str())
    }
}

#[async_trait]
impl HttpSender for SlowControlPlane {
    async fn send(&self, request: OutboundRequest) -> AppResult<HttpResponse> {
        if let Some(group) = self.crashing_group
            && Self::targets(request.url.as_str(), group)
        {
            panic!("control plane connection reset for {group}");
        }

        if request.method == HttpMethod::Get {
            return Ok(HttpResponse::new(404, "{}"));
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.puts.fetch_add(1, Ordering::SeqCst);

        let rejected = self
            .rejected_groups
            .iter()
            .any(|group| Self::targets(request.url.as_str(), group));
        if rejected {
            return Ok(HttpResponse::new(409, "{\"error\":{\"code\":\"ScopeLocked\"}}"));
        }

        Ok(HttpResponse::new(200, "{}"))
    }
}

fn runner(control_plane: Arc<SlowControlPlane>, max_concurrency: usize) -> GovernanceBatchRunner {
    let client = ControlPlaneClient::new(
        ControlPlaneEndpoint::azure_public().unwrap_or_else(|_| unreachable!()),
        Arc::new(ScriptedTokenProvider::with_tokens(&["tok123"])),
        control_plane,
    );
    let policy = GovernancePolicy::default().with_default_action_group_id("ag1");

    GovernanceBatchRunner::new(SoxGovernanceService::new(client, policy), max_concurrency)
}

fn targets(names: &[&str]) -> Vec<ResourceGroupRef> {
    names
        .iter()
        .map(|name| ResourceGroupRef::new("sub1", *name))
        .collect()
}

#[tokio::test]
async fn counts_failures_and_bounds_concurrency() {
    let control_plane = Arc::new(SlowControlPlane {
        rejected_groups: vec!["rg2", "rg5"],
        ..SlowControlPlane::default()
    });
    let runner = runner(control_plane.clone(), 2);

    let summary = runner
        .govern_all(targets(&["rg1", "rg2", "rg3", "rg4", "rg5"]))
        .await;

    assert_eq!(
        summary,
        GovernanceBatchSummary {
            total: 5,
            governed: 3,
            failed: 2,
        }
    );
    assert_eq!(control_plane.peak_in_flight.load(Ordering::SeqCst), 2);
    // Three governed groups send alert and lock, the two rejected ones stop after the alert.
    assert_eq!(control_plane.puts.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn panicking_runs_count_as_failures() {
    let control_plane = Arc::new(SlowControlPlane {
        crashing_group: Some("rg2"),
        ..SlowControlPlane::default()
    });
    let runner = runner(control_plane, 4);

    let summary = runner.govern_all(targets(&["rg1", "rg2", "rg3"])).await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.governed, 2);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn zero_concurrency_still_governs_every_target() {
    let control_plane = Arc::new(SlowControlPlane::default());
    let runner = runner(control_plane.clone(), 0);

    let summary = runner.govern_all(targets(&["rg1", "rg2"])).await;

    assert_eq!(runner.max_concurrency(), 1);
    assert_eq!(summary.governed, 2);
    assert_eq!(control_plane.peak_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_batches_do_nothing() {
    let control_plane = Arc::new(SlowControlPlane::default());
    let runner = runner(control_plane.clone(), 3);

    let summary = runner.govern_all(Vec::new()).await;

    assert_eq!(
        summary,
        GovernanceBatchSummary {
            total: 0,
            governed: 0,
            failed: 0,
        }
    );
    assert_eq!(control_plane.puts.load(Ordering::SeqCst), 0);
}
