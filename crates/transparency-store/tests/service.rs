//! End-to-end behavior of the service facade over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use transparency_core::error::TransparencyError;
use transparency_core::model::{MemberId, ProjectId};
use transparency_core::service::TransparencyService;
use transparency_store::{ManualClock, MemoryStore};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 8, 9, 0, 0).unwrap()
}

fn service() -> (TransparencyService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    (TransparencyService::new(store), clock)
}

#[tokio::test]
async fn timeline_carries_forward_latest_scores() {
    let (svc, clock) = service();
    let project = svc.create_project("Apollo", "https://docs/apollo").await.unwrap();
    let a = svc.create_member(project.id, "A", "Member", None).await.unwrap();
    let b = svc.create_member(project.id, "B", "PL", None).await.unwrap();

    svc.submit_score(a.id, 80.0, None).await.unwrap();
    clock.advance(Duration::days(1));
    svc.submit_score(b.id, 40.0, None).await.unwrap();
    clock.advance(Duration::days(1));
    svc.submit_score(a.id, 60.0, None).await.unwrap();

    let dashboard = svc.get_dashboard(project.id).await.unwrap();
    let points: Vec<(String, f64)> = dashboard
        .timeline
        .iter()
        .map(|p| (p.date.to_string(), p.weighted_average))
        .collect();
    assert_eq!(
        points,
        vec![
            ("2024-11-08".to_string(), 80.0),
            ("2024-11-09".to_string(), 50.0),
            ("2024-11-10".to_string(), 45.0),
        ]
    );
    assert_eq!(dashboard.weighted_average, Some(45.0));
    assert_eq!(dashboard.last_updated, Some(start() + Duration::days(2)));
    assert_eq!(dashboard.members_summary.len(), 2);
    assert_eq!(dashboard.members_summary[1].weight, 3);
}

#[tokio::test]
async fn empty_project_has_no_average_and_no_timeline() {
    let (svc, _) = service();
    let project = svc.create_project("Empty", "https://docs/empty").await.unwrap();
    svc.create_member(project.id, "Idle", "PM", None).await.unwrap();

    let dashboard = svc.get_dashboard(project.id).await.unwrap();
    assert_eq!(dashboard.weighted_average, None);
    assert_eq!(dashboard.last_updated, None);
    assert!(dashboard.timeline.is_empty());
    assert_eq!(dashboard.members_summary.len(), 1);
    assert!(dashboard.members_summary[0].latest_score.is_none());

    let json = serde_json::to_value(&dashboard).unwrap();
    assert!(json.get("weighted_average").is_none());
}

#[tokio::test]
async fn unscored_member_does_not_move_the_average() {
    let (svc, _) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let a = svc.create_member(project.id, "A", "PM", None).await.unwrap();
    svc.submit_score(a.id, 72.5, None).await.unwrap();
    let before = svc.get_dashboard(project.id).await.unwrap();

    svc.create_member(project.id, "Newcomer", "PL", None).await.unwrap();
    let after = svc.get_dashboard(project.id).await.unwrap();

    assert_eq!(before.weighted_average, after.weighted_average);
    assert_eq!(before.timeline, after.timeline);
}

#[tokio::test]
async fn identical_scores_average_to_that_score() {
    let (svc, _) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    for (name, role) in [("A", "PL"), ("B", "PM"), ("C", "Member")] {
        let member = svc.create_member(project.id, name, role, None).await.unwrap();
        svc.submit_score(member.id, 63.0, None).await.unwrap();
    }
    let dashboard = svc.get_dashboard(project.id).await.unwrap();
    assert_eq!(dashboard.weighted_average, Some(63.0));
}

#[tokio::test]
async fn submitted_score_is_immediately_visible() {
    let (svc, _) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let member = svc
        .create_member(project.id, "Ada", "pm", Some("ada@example.com".into()))
        .await
        .unwrap();

    let score = svc
        .submit_score(member.id, 88.8, Some("solid week".into()))
        .await
        .unwrap();
    assert_eq!(score.value.get(), 88.8);

    let members = svc.list_members(project.id).await.unwrap();
    assert_eq!(members[0].latest_score, Some(score.value));
    assert_eq!(members[0].latest_score_at, Some(score.created_at));

    let dashboard = svc.get_dashboard(project.id).await.unwrap();
    assert_eq!(dashboard.weighted_average, Some(88.8));
    assert_eq!(
        dashboard.members_summary[0].latest_comment.as_deref(),
        Some("solid week")
    );
}

#[tokio::test]
async fn out_of_range_scores_are_rejected() {
    let (svc, _) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let member = svc.create_member(project.id, "Ada", "PL", None).await.unwrap();

    for bad in [-0.1, 100.01, f64::NAN, f64::INFINITY] {
        let err = svc.submit_score(member.id, bad, None).await.unwrap_err();
        assert!(matches!(err, TransparencyError::Validation(_)), "{bad}");
    }
    for good in [0.0, 100.0] {
        let score = svc.submit_score(member.id, good, None).await.unwrap();
        assert_eq!(score.value.get(), good);
    }
    assert_eq!(svc.list_scores(member.id).await.unwrap().scores.len(), 2);
}

#[tokio::test]
async fn invalid_inputs_are_validation_errors() {
    let (svc, _) = service();
    assert_eq!(
        svc.create_project("", "https://x").await.unwrap_err().status_code(),
        422
    );
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let err = svc
        .create_member(project.id, "Ada", "Director", None)
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert!(svc.get_project(project.id).await.unwrap().members.is_empty());
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (svc, _) = service();
    let missing_project = ProjectId(999);
    let missing_member = MemberId(999);

    assert_eq!(svc.get_project(missing_project).await.unwrap_err().status_code(), 404);
    assert_eq!(svc.get_dashboard(missing_project).await.unwrap_err().status_code(), 404);
    assert_eq!(svc.list_members(missing_project).await.unwrap_err().status_code(), 404);
    assert_eq!(
        svc.create_member(missing_project, "Ada", "PL", None)
            .await
            .unwrap_err()
            .status_code(),
        404
    );
    assert_eq!(
        svc.submit_score(missing_member, 50.0, None)
            .await
            .unwrap_err()
            .status_code(),
        404
    );
    assert_eq!(svc.list_scores(missing_member).await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn projects_are_scoped() {
    let (svc, clock) = service();
    let first = svc.create_project("First", "https://1").await.unwrap();
    clock.advance(Duration::minutes(1));
    let second = svc.create_project("Second", "https://2").await.unwrap();

    let a = svc.create_member(first.id, "A", "PL", None).await.unwrap();
    let b = svc.create_member(second.id, "B", "Member", None).await.unwrap();
    svc.submit_score(a.id, 90.0, None).await.unwrap();
    svc.submit_score(b.id, 10.0, None).await.unwrap();

    assert_eq!(
        svc.get_dashboard(first.id).await.unwrap().weighted_average,
        Some(90.0)
    );
    assert_eq!(
        svc.get_dashboard(second.id).await.unwrap().weighted_average,
        Some(10.0)
    );
    let detail = svc.get_project(first.id).await.unwrap();
    assert_eq!(detail.members.len(), 1);
    assert_eq!(detail.members[0].name, "A");

    let listed: Vec<_> = svc
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(listed, vec!["Second", "First"]);
}

#[tokio::test]
async fn score_history_is_oldest_first() {
    let (svc, clock) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let member = svc.create_member(project.id, "Ada", "PL", None).await.unwrap();
    for v in [10.0, 20.0, 30.0] {
        svc.submit_score(member.id, v, None).await.unwrap();
        clock.advance(Duration::hours(6));
    }

    let history = svc.list_scores(member.id).await.unwrap();
    assert_eq!(history.member.name, "Ada");
    let values: Vec<f64> = history.scores.iter().map(|s| s.value.get()).collect();
    assert_eq!(values, vec![10.0, 20.0, 30.0]);
}

#[tokio::test]
async fn concurrent_submissions_are_totally_ordered() {
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let svc = Arc::new(TransparencyService::new(store));
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let member = svc.create_member(project.id, "Ada", "PL", None).await.unwrap();

    let member_id = member.id;
    let tasks = (0..20).map(|i| {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.submit_score(member_id, f64::from(i), None).await })
    });
    let results = futures::future::join_all(tasks).await;
    let mut submitted: Vec<_> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    submitted.sort_by_key(|s| s.order_key());

    let history = svc.list_scores(member.id).await.unwrap().scores;
    assert_eq!(history.len(), 20);
    assert!(history.windows(2).all(|w| w[0].order_key() < w[1].order_key()));
    assert_eq!(history, submitted);

    let latest = svc.list_members(project.id).await.unwrap()[0].latest_score;
    assert_eq!(latest, history.last().map(|s| s.value));
}

#[tokio::test]
async fn clock_stepping_back_never_reorders_history() {
    let (svc, clock) = service();
    let project = svc.create_project("Apollo", "https://x").await.unwrap();
    let member = svc.create_member(project.id, "Ada", "PL", None).await.unwrap();

    svc.submit_score(member.id, 40.0, None).await.unwrap();
    clock.set(start() - Duration::days(3));
    svc.submit_score(member.id, 70.0, None).await.unwrap();

    let history = svc.list_scores(member.id).await.unwrap().scores;
    assert_eq!(history[0].created_at, history[1].created_at);
    assert_eq!(
        svc.get_dashboard(project.id).await.unwrap().weighted_average,
        Some(70.0)
    );
}
