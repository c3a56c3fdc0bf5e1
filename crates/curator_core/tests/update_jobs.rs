use std::sync::Once;

use chrono::{DateTime, TimeDelta, Utc};
use curator_core::{
    update, AppState, Collection, Company, Effect, JobId, JobStatus, Msg, NotificationKind, Page,
    Rejection, TransferJob, TransferRequest, TransferSelection, LOG_CAPACITY, TIMEOUT_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(curator_logging::initialize_for_tests);
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + TimeDelta::seconds(secs)
}

fn collections() -> Vec<Collection> {
    vec![
        Collection {
            id: "all".into(),
            name: "All Companies".to_string(),
            total: 120,
        },
        Collection {
            id: "fav".into(),
            name: "Liked Companies".to_string(),
            total: 4,
        },
    ]
}

/// Catalog loaded, "All Companies" selected and its first page delivered.
fn ready_state() -> AppState {
    let (state, effects) = update(AppState::new(), Msg::CollectionsLoaded(collections()), at(0));
    let generation = match effects.as_slice() {
        [Effect::FetchPage(request)] => request.generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            generation,
            page: Page {
                collection_id: "all".into(),
                collection_name: "All Companies".to_string(),
                offset: 0,
                companies: (1..=50)
                    .map(|id| Company {
                        id,
                        name: format!("Company {id}"),
                        liked: false,
                    })
                    .collect(),
                total: 120,
            },
        },
        at(0),
    );
    state
}

fn start(
    state: AppState,
    job: &str,
    selection: TransferSelection,
    now: DateTime<Utc>,
) -> (AppState, Vec<Effect>) {
    let (state, effects) = update(
        state,
        Msg::TransferRequested {
            target: "fav".into(),
            selection,
        },
        now,
    );
    let request = match effects.as_slice() {
        [Effect::StartTransfer(request)] => request.clone(),
        other => panic!("expected StartTransfer, got {other:?}"),
    };
    update(
        state,
        Msg::TransferStarted {
            job_id: job.into(),
            request,
        },
        now,
    )
}

fn snapshot(
    job: &str,
    status: JobStatus,
    processed: u64,
    inserted: u64,
    skipped: u64,
) -> TransferJob {
    TransferJob {
        job_id: job.into(),
        status,
        total_count: 3,
        processed_count: processed,
        inserted_count: inserted,
        skipped_count: skipped,
        failed_count: 0,
        error: None,
    }
}

#[test]
fn selected_transfer_completes_into_history_with_one_refresh() {
    init_logging();
    let state = ready_state();
    let (state, _) = update(state, Msg::SelectionToggled(1), at(0));
    let (state, _) = update(state, Msg::SelectionToggled(2), at(0));
    let (state, _) = update(state, Msg::SelectionToggled(3), at(0));

    let (state, effects) = update(
        state,
        Msg::TransferSelectedRequested {
            target: "fav".into(),
        },
        at(0),
    );
    let request = TransferRequest {
        source: "all".into(),
        target: "fav".into(),
        selection: TransferSelection::Ids(vec![1, 2, 3]),
    };
    assert_eq!(effects, vec![Effect::StartTransfer(request.clone())]);

    let (state, effects) = update(
        state,
        Msg::TransferStarted {
            job_id: "job-1".into(),
            request,
        },
        at(0),
    );
    assert_eq!(effects, vec![Effect::StartPolling]);
    let view = state.view();
    assert_eq!(view.selected_count, 0);
    assert_eq!(view.jobs.len(), 1);
    assert_eq!(view.jobs[0].status, JobStatus::Queued);
    assert_eq!(view.jobs[0].total, 3);
    assert_eq!(view.jobs[0].processed, 0);
    assert_eq!(view.jobs[0].target_name, "Liked Companies");

    let (state, effects) = update(state, Msg::PollTick, at(1));
    assert_eq!(effects, vec![Effect::PollJobs(vec![JobId::new("job-1")])]);

    let (state, effects) = update(
        state,
        Msg::JobPolled(snapshot("job-1", JobStatus::Completed, 3, 2, 1)),
        at(1),
    );
    assert_eq!(effects, vec![Effect::RefreshCollections]);
    let view = state.view();
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].count, 2);
    assert_eq!(view.history[0].source_list, "All Companies");
    assert_eq!(view.jobs[0].status, JobStatus::Completed);
    assert_eq!(view.notifications[0].kind, NotificationKind::Success);

    // A late duplicate result for the settled job changes nothing.
    let (state, effects) = update(
        state,
        Msg::JobPolled(snapshot("job-1", JobStatus::Completed, 3, 2, 1)),
        at(2),
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().history.len(), 1);

    let (state, effects) = update(state, Msg::PollTick, at(2));
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert!(!state.is_polling());
}

#[test]
fn transfer_all_estimates_from_collection_total() {
    init_logging();
    let (state, _) = start(ready_state(), "job-all", TransferSelection::All, at(0));
    let view = state.view();
    assert_eq!(view.jobs[0].total, 120);
}

#[test]
fn second_job_does_not_start_a_second_poller() {
    init_logging();
    let (state, effects) = start(ready_state(), "a", TransferSelection::Ids(vec![1]), at(0));
    assert_eq!(effects, vec![Effect::StartPolling]);
    let (state, effects) = start(state, "b", TransferSelection::Ids(vec![2]), at(0));
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::PollTick, at(1));
    assert_eq!(
        effects,
        vec![Effect::PollJobs(vec![JobId::new("a"), JobId::new("b")])]
    );
}

#[test]
fn status_never_moves_backwards() {
    init_logging();
    let (state, _) = start(ready_state(), "job", TransferSelection::Ids(vec![1, 2, 3]), at(0));
    let (state, _) = update(
        state,
        Msg::JobPolled(snapshot("job", JobStatus::Running, 1, 1, 0)),
        at(1),
    );
    let (state, _) = update(
        state,
        Msg::JobPolled(snapshot("job", JobStatus::Queued, 0, 0, 0)),
        at(2),
    );

    let job = &state.view().jobs[0];
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.processed, 1);
}

#[test]
fn failed_job_stays_visible_until_dismissed() {
    init_logging();
    let (state, _) = start(ready_state(), "job", TransferSelection::Ids(vec![1, 2, 3]), at(0));
    let failed = TransferJob {
        error: Some("constraint violation".to_string()),
        ..snapshot("job", JobStatus::Failed, 1, 0, 0)
    };
    let (state, effects) = update(state, Msg::JobPolled(failed), at(1));
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.jobs[0].status, JobStatus::Failed);
    assert!(view.history.is_empty());
    assert_eq!(view.notifications[0].kind, NotificationKind::Error);
    assert!(view.notifications[0].message.contains("constraint violation"));

    let (state, effects) = update(state, Msg::PollTick, at(1));
    assert_eq!(effects, vec![Effect::StopPolling]);

    let (state, _) = update(state, Msg::JobDismissed("job".into()), at(2));
    assert!(state.view().jobs.is_empty());
}

#[test]
fn poll_errors_leave_the_job_untouched() {
    init_logging();
    let (state, _) = start(ready_state(), "job", TransferSelection::Ids(vec![1]), at(0));
    let before = state.view().jobs;
    let (state, effects) = update(
        state,
        Msg::JobPollFailed {
            job_id: "job".into(),
            message: "connection reset".to_string(),
        },
        at(1),
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().jobs, before);

    let (_state, effects) = update(state, Msg::PollTick, at(2));
    assert_eq!(effects, vec![Effect::PollJobs(vec![JobId::new("job")])]);
}

#[test]
fn jobs_past_the_deadline_fail_locally() {
    init_logging();
    let (state, _) = start(ready_state(), "slow", TransferSelection::Ids(vec![1]), at(0));
    let (state, effects) = update(state, Msg::PollTick, at(31));
    assert_eq!(effects, vec![Effect::StopPolling]);

    let view = state.view();
    assert_eq!(view.jobs[0].status, JobStatus::Failed);
    assert_eq!(view.jobs[0].error.as_deref(), Some(TIMEOUT_MESSAGE));
    assert!(view.notifications[0].message.contains("timed out"));

    // The server finishing afterwards is ignored.
    let (state, effects) = update(
        state,
        Msg::JobPolled(snapshot("slow", JobStatus::Completed, 1, 1, 0)),
        at(32),
    );
    assert!(effects.is_empty());
    assert!(state.view().history.is_empty());
}

#[test]
fn non_terminal_result_after_deadline_times_out() {
    init_logging();
    let (state, _) = start(ready_state(), "slow", TransferSelection::Ids(vec![1]), at(0));
    let (state, _) = update(
        state,
        Msg::JobPolled(snapshot("slow", JobStatus::Running, 0, 0, 0)),
        at(45),
    );
    assert_eq!(state.view().jobs[0].status, JobStatus::Failed);
    assert!(!state.jobs().has_active());
}

#[test]
fn history_keeps_the_ten_newest() {
    init_logging();
    let mut state = ready_state();
    for n in 0..12 {
        let job = format!("job-{n}");
        let (next, _) = start(state, &job, TransferSelection::Ids(vec![1]), at(n));
        let (next, _) = update(
            next,
            Msg::JobPolled(TransferJob {
                inserted_count: n as u64,
                ..snapshot(&job, JobStatus::Completed, 1, 0, 0)
            }),
            at(n),
        );
        state = next;
    }

    let view = state.view();
    assert_eq!(view.history.len(), LOG_CAPACITY);
    assert_eq!(view.history[0].id, JobId::new("job-11"));
    assert_eq!(view.history[9].id, JobId::new("job-2"));
    assert!(view.notifications.len() <= LOG_CAPACITY);
}

#[test]
fn invalid_transfer_requests_are_rejected() {
    init_logging();
    let state = ready_state();
    let (state, effects) = update(
        state,
        Msg::TransferSelectedRequested {
            target: "fav".into(),
        },
        at(0),
    );
    assert_eq!(effects, vec![Effect::Reject(Rejection::EmptySelection)]);

    let (_state, effects) = update(
        state,
        Msg::TransferRequested {
            target: "all".into(),
            selection: TransferSelection::All,
        },
        at(0),
    );
    assert_eq!(effects, vec![Effect::Reject(Rejection::SameCollection)]);
}

#[test]
fn failed_start_never_enters_the_board() {
    init_logging();
    let (state, effects) = update(
        ready_state(),
        Msg::TransferStartFailed {
            message: "Source and target lists must differ.".to_string(),
        },
        at(0),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.jobs.is_empty());
    assert!(!view.polling);
    assert!(view.notifications[0].message.starts_with("Transfer failed"));
}
