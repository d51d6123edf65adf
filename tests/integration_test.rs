use speed_challenge::models::loaders::load_catalog;
use speed_challenge::models::session::{EndKind, Lifecycle, SessionEvent};
use speed_challenge::models::Operation;
use speed_challenge::services::{ProgressStore, SessionRecorder};
use speed_challenge::{ChallengeSession, Config, SessionCtx};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;

fn temp_progress(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "speed_challenge_it_{}_{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn current_answer(session: &ChallengeSession<ProgressStore>) -> i64 {
    session
        .snapshot()
        .current_problem
        .expect("应该有当前题目")
        .answer
}

fn ended_kinds(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<EndKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Ended(reason) = event {
            kinds.push(reason.kind);
        }
    }
    kinds
}

#[tokio::test(start_paused = true)]
async fn test_win_is_persisted() {
    let path = temp_progress("win");
    let config = Config {
        rng_seed: Some(7),
        ..Config::default()
    };
    let store = ProgressStore::open(&path).unwrap();
    let ctx = SessionCtx::new("timed-addition-challenge", Operation::Addition);
    let session = ChallengeSession::from_config(&config, ctx, store).unwrap();
    let mut events = session.subscribe();

    session.start_game(false);
    for _ in 0..config.warmup_count {
        session.submit_answer(current_answer(&session));
    }
    assert_eq!(session.snapshot().lifecycle, Lifecycle::Playing);

    for _ in 0..config.winning_score {
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.submit_answer(current_answer(&session));
    }

    let state = session.snapshot();
    assert_eq!(state.lifecycle, Lifecycle::End);
    assert_eq!(ended_kinds(&mut events), vec![EndKind::Win]);
    assert!(!session.has_active_countdown());

    drop(session);
    let reopened = ProgressStore::open(&path).unwrap();
    assert!(reopened.has_completed("timed-addition-challenge"));
    assert_eq!(reopened.streak(), 90);
    let stats = reopened.topic_stats("timed-addition-challenge").unwrap();
    assert_eq!(stats.completions, 1);
    assert_eq!(stats.longest_streak, 90);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_records_failure() {
    let path = temp_progress("timeout");
    let config = Config {
        rng_seed: Some(11),
        ..Config::default()
    };
    let store = ProgressStore::open(&path).unwrap();
    let ctx = SessionCtx::new("timed-subtraction-challenge", Operation::Subtraction);
    let session = ChallengeSession::from_config(&config, ctx, store).unwrap();
    let mut events = session.subscribe();

    session.start_game(false);
    for _ in 0..config.warmup_count {
        session.submit_answer(current_answer(&session));
    }
    assert_eq!(session.snapshot().time_budget_ms, 20_000);

    tokio::time::sleep(Duration::from_millis(20_100)).await;

    let state = session.snapshot();
    assert_eq!(state.lifecycle, Lifecycle::End);
    assert_eq!(state.time_left_ms, 0);
    assert_eq!(ended_kinds(&mut events), vec![EndKind::Timeout]);

    drop(session);
    let reopened = ProgressStore::open(&path).unwrap();
    assert!(!reopened.has_completed("timed-subtraction-challenge"));
    let stats = reopened.topic_stats("timed-subtraction-challenge").unwrap();
    assert_eq!(stats.failures, 1);
    // 超时不清零连胜
    assert_eq!(reopened.streak(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_test_mode_accepts_anything() {
    let path = temp_progress("test_mode");
    let config = Config {
        test_mode: true,
        ..Config::default()
    };
    let store = ProgressStore::open(&path).unwrap();
    let ctx = SessionCtx::new("timed-multiplication-challenge", Operation::Multiplication);
    let session = ChallengeSession::from_config(&config, ctx, store).unwrap();

    session.start_game(false);
    for _ in 0..(config.warmup_count + config.winning_score) {
        session.submit_answer(-1);
    }

    assert_eq!(session.snapshot().lifecycle, Lifecycle::End);
    assert!(session.with_recorder(|s| s.has_completed("timed-multiplication-challenge")));
}

#[tokio::test(start_paused = true)]
async fn test_wrong_answer_resets_streak() {
    let path = temp_progress("wrong");
    let config = Config {
        rng_seed: Some(3),
        ..Config::default()
    };
    let store = ProgressStore::open(&path).unwrap();
    let ctx = SessionCtx::new("timed-division-challenge", Operation::Division);
    let session = ChallengeSession::from_config(&config, ctx, store).unwrap();

    session.start_game(false);
    for _ in 0..5 {
        session.submit_answer(current_answer(&session));
    }
    let warmup = session.snapshot().division_warmup.unwrap();
    assert_eq!((warmup.phase, warmup.progress), (1, 5));

    session.submit_answer(current_answer(&session) + 1);

    let state = session.snapshot();
    assert_eq!(state.lifecycle, Lifecycle::End);
    let reason = state.end_reason.unwrap();
    assert_eq!(reason.kind, EndKind::Incorrect);
    assert!(reason.was_warming_up);
    assert_eq!(reason.division_phase_at_end, Some(1));
    assert_eq!(reason.division_progress_at_end, Some(5));
    assert_eq!(session.with_recorder(|s| s.streak()), 0);
}

#[test]
fn test_bundled_catalog() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/catalog.toml");
    let catalog = tokio_test::block_on(load_catalog(&path)).expect("加载目录失败");

    assert_eq!(catalog.challenges().count(), 4);
    let (topic, op) = catalog.challenge("timed-division-challenge").unwrap();
    assert_eq!(topic.icon.as_deref(), Some("➗"));
    assert_eq!(op, Operation::Division);
    assert!(catalog.challenge("decomposition-subtraction").is_err());
    assert!(catalog.challenge("no-such-topic").is_err());

    let default_topic = Config::default().topic_id;
    assert_eq!(
        catalog.challenge(&default_topic).unwrap().1,
        Operation::Subtraction
    );
}
