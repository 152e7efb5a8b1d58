mod support;

use std::collections::HashSet;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;

use incidentdesk::application::dashboard::AggregateKey;
use incidentdesk::cache::{
    METRIC_CACHE_COMPUTE_ERROR, METRIC_CACHE_COMPUTE_MS, METRIC_CACHE_ENTRIES, METRIC_CACHE_HIT,
    METRIC_CACHE_MISS,
};

use support::{cache, dashboard, seventy_percent_complete};

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let repo = Arc::new(seventy_percent_complete());
    let service = dashboard(repo.clone(), cache(30));

    service
        .aggregate(AggregateKey::ActionPlanDonut)
        .await
        .expect("miss");
    service
        .aggregate(AggregateKey::ActionPlanDonut)
        .await
        .expect("hit");

    repo.set_fail_reads(true);
    service
        .aggregate(AggregateKey::DepartmentPieChart)
        .await
        .expect_err("compute error");

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        METRIC_CACHE_HIT,
        METRIC_CACHE_MISS,
        METRIC_CACHE_COMPUTE_ERROR,
        METRIC_CACHE_COMPUTE_MS,
        METRIC_CACHE_ENTRIES,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let labelled_with_key = snapshot
        .iter()
        .filter(|(composite_key, _, _, _)| composite_key.key().name() == METRIC_CACHE_HIT)
        .all(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .any(|label| label.key() == "key" && label.value() == "action-plan-donut")
        });
    assert!(labelled_with_key);
}
