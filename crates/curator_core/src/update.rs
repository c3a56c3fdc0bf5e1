use chrono::{DateTime, Utc};

use crate::jobs::{JobTransition, TrackedJob};
use crate::optimistic::Liked;
use crate::{
    AppState, CollectionId, Effect, Failure, Msg, Rejection, TransferJob, TransferRequest,
    TransferSelection,
};

const UNKNOWN_COLLECTION: &str = "Unknown";

/// Pure update function: applies a message to state and returns any effects.
///
/// `now` stamps notifications and history entries and drives the job
/// timeout; callers pass the wall clock, tests pass fixed instants.
pub fn update(mut state: AppState, msg: Msg, now: DateTime<Utc>) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CollectionsRequested => vec![Effect::LoadCollections],
        Msg::CollectionsLoaded(collections) => {
            state.catalog.replace(collections);
            state.mark_dirty();
            let still_known = state
                .pages
                .collection_id()
                .is_some_and(|id| state.catalog.get(id).is_some());
            if still_known {
                Vec::new()
            } else {
                match state.catalog.first().map(|c| c.id.clone()) {
                    Some(first) => fetch_effects(state.pages.set_collection(first)),
                    None => {
                        state.pages.clear_collection();
                        Vec::new()
                    }
                }
            }
        }
        Msg::CollectionsLoadFailed(message) => {
            state.notifications.error(Failure::Fetch(message).to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CollectionSelected(id) => {
            state.mark_dirty();
            fetch_effects(state.pages.set_collection(id))
        }
        Msg::PageRequested(page) => match state.pages.set_page(page) {
            Ok(request) => {
                state.mark_dirty();
                fetch_effects(request)
            }
            Err(err) => vec![Effect::Reject(err.into())],
        },
        Msg::NextPage => {
            let request = state.pages.next_page();
            if request.is_some() {
                state.mark_dirty();
            }
            fetch_effects(request)
        }
        Msg::PreviousPage => {
            let request = state.pages.previous_page();
            if request.is_some() {
                state.mark_dirty();
            }
            fetch_effects(request)
        }
        Msg::SearchChanged(term) => {
            state.mark_dirty();
            fetch_effects(state.pages.set_search_term(term))
        }
        Msg::PageLoaded { generation, page } => {
            if state.pages.apply_page(generation, page) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PageLoadFailed {
            generation,
            message,
        } => {
            if state.pages.fail_fetch(generation) {
                state.notifications.error(Failure::Fetch(message).to_string(), now);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAll => {
            state.pages.select_all();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectNone => {
            state.pages.select_none();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectionToggled(company_id) => {
            state.pages.toggle_selected(company_id);
            state.mark_dirty();
            Vec::new()
        }
        Msg::FavoriteToggled { company_id, liked } => {
            let pending = state
                .pages
                .current_mut()
                .and_then(|page| state.favorites.apply::<Liked>(page, company_id, liked));
            match pending {
                Some(pending) => {
                    state.mark_dirty();
                    vec![Effect::ToggleFavorite {
                        ticket: pending.ticket,
                        favorites_list_id: state.favorites_collection.clone(),
                        company_id,
                        liked,
                    }]
                }
                None => vec![Effect::Reject(Rejection::UnknownCompany(company_id))],
            }
        }
        Msg::FavoriteConfirmed { ticket } => {
            let page = state.pages.current_mut();
            if state.favorites.confirm::<Liked>(page, ticket).is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FavoriteRejected { ticket, message } => {
            let page = state.pages.current_mut();
            if let Some(pending) = state.favorites.rollback::<Liked>(page, ticket) {
                let failure = Failure::Mutation {
                    company_id: pending.company_id,
                    message,
                };
                state.notifications.error(failure.to_string(), now);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TransferRequested { target, selection } => request_transfer(&state, target, selection),
        Msg::TransferSelectedRequested { target } => {
            let ids = state.pages.selection().snapshot();
            request_transfer(&state, target, TransferSelection::Ids(ids))
        }
        Msg::TransferStarted { job_id, request } => {
            start_job(&mut state, job_id, request, now);
            state.mark_dirty();
            if state.polling {
                Vec::new()
            } else {
                state.polling = true;
                vec![Effect::StartPolling]
            }
        }
        Msg::TransferStartFailed { message } => {
            state
                .notifications
                .error(Failure::TransferStart(message).to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PollTick => {
            for job_id in state.jobs.expire(now) {
                state
                    .notifications
                    .error(Failure::Timeout { job_id }.to_string(), now);
                state.mark_dirty();
            }
            let ids = state.jobs.active_ids();
            if ids.is_empty() {
                state.polling = false;
                vec![Effect::StopPolling]
            } else {
                vec![Effect::PollJobs(ids)]
            }
        }
        Msg::JobPolled(job) => apply_job_status(&mut state, job, now),
        // Transient: the job keeps its last known status until the next tick.
        Msg::JobPollFailed { .. } => Vec::new(),
        Msg::JobDismissed(job_id) => {
            if state.jobs.dismiss(&job_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CreateCollectionRequested(name) => match state.catalog.validate_new_name(&name) {
            Ok(name) => vec![Effect::CreateCollection(name)],
            Err(err) => vec![Effect::Reject(err.into())],
        },
        Msg::CollectionCreated { message, .. } => {
            state.notifications.success(message, now);
            state.mark_dirty();
            vec![Effect::LoadCollections]
        }
        Msg::CollectionCreateFailed(message) => {
            let failure = Failure::Collection {
                action: "create collection",
                message,
            };
            state.notifications.error(failure.to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteCollectionRequested(id) => match state.catalog.check_deletable(&id) {
            Ok(_) => vec![Effect::DeleteCollection(id)],
            Err(err) => vec![Effect::Reject(err.into())],
        },
        Msg::CollectionDeleted { id, message } => {
            state.notifications.success(message, now);
            if state.pages.collection_id() == Some(&id) {
                state.pages.clear_collection();
            }
            state.mark_dirty();
            vec![Effect::LoadCollections]
        }
        Msg::CollectionDeleteFailed(message) => {
            let failure = Failure::Collection {
                action: "delete collection",
                message,
            };
            state.notifications.error(failure.to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RemoveCompaniesRequested(company_ids) => request_removal(&state, company_ids),
        Msg::RemoveSelectedRequested => {
            let ids = state.pages.selection().snapshot();
            request_removal(&state, ids)
        }
        Msg::CompaniesRemoved {
            collection_id,
            message,
            ..
        } => {
            state.notifications.success(message, now);
            state.mark_dirty();
            let mut effects = Vec::new();
            if state.pages.collection_id() == Some(&collection_id) {
                state.pages.select_none();
                effects.extend(fetch_effects(state.pages.fetch()));
            }
            effects.push(Effect::LoadCollections);
            effects
        }
        Msg::CompaniesRemoveFailed(message) => {
            let failure = Failure::Collection {
                action: "remove companies",
                message,
            };
            state.notifications.error(failure.to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
        Msg::NotificationDismissed(id) => {
            if state.notifications.dismiss(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn fetch_effects(request: Option<crate::PageRequest>) -> Vec<Effect> {
    request.map(Effect::FetchPage).into_iter().collect()
}

fn request_transfer(
    state: &AppState,
    target: CollectionId,
    selection: TransferSelection,
) -> Vec<Effect> {
    let Some(source) = state.pages.collection_id().cloned() else {
        return vec![Effect::Reject(Rejection::NoCollection)];
    };
    if source == target {
        return vec![Effect::Reject(Rejection::SameCollection)];
    }
    if matches!(&selection, TransferSelection::Ids(ids) if ids.is_empty()) {
        return vec![Effect::Reject(Rejection::EmptySelection)];
    }
    vec![Effect::StartTransfer(TransferRequest {
        source,
        target,
        selection,
    })]
}

fn request_removal(state: &AppState, company_ids: Vec<crate::CompanyId>) -> Vec<Effect> {
    let Some(collection_id) = state.pages.collection_id().cloned() else {
        return vec![Effect::Reject(Rejection::NoCollection)];
    };
    if company_ids.is_empty() {
        return vec![Effect::Reject(Rejection::EmptySelection)];
    }
    vec![Effect::RemoveCompanies {
        collection_id,
        company_ids,
    }]
}

fn start_job(
    state: &mut AppState,
    job_id: crate::JobId,
    request: TransferRequest,
    now: DateTime<Utc>,
) {
    let total_count = match &request.selection {
        TransferSelection::Ids(ids) => ids.len() as u64,
        TransferSelection::All => estimated_total(state, &request.source),
    };
    let source_name = collection_name(state, &request.source);
    let target_name = collection_name(state, &request.target);

    state.jobs.insert(TrackedJob {
        job: TransferJob::queued(job_id, total_count),
        source: request.source,
        source_name,
        target: request.target,
        target_name: target_name.clone(),
        started_at: now,
    });
    state.notifications.info(
        format!("Transfer of {total_count} companies to {target_name} queued"),
        now,
    );

    if matches!(request.selection, TransferSelection::Ids(_)) {
        state.pages.select_none();
    }
}

fn estimated_total(state: &AppState, source: &CollectionId) -> u64 {
    if let Some(collection) = state.catalog.get(source) {
        return collection.total;
    }
    match state.pages.current() {
        Some(page) if &page.collection_id == source => page.total,
        _ => 0,
    }
}

fn collection_name(state: &AppState, id: &CollectionId) -> String {
    if let Some(name) = state.catalog.name_of(id) {
        return name.to_string();
    }
    match state.pages.current() {
        Some(page) if &page.collection_id == id => page.collection_name.clone(),
        _ => UNKNOWN_COLLECTION.to_string(),
    }
}

fn apply_job_status(state: &mut AppState, job: TransferJob, now: DateTime<Utc>) -> Vec<Effect> {
    let job_id = job.job_id.clone();
    match state.jobs.apply_status(job, now) {
        JobTransition::Stale | JobTransition::Regressed => Vec::new(),
        JobTransition::Progressed => {
            state.mark_dirty();
            Vec::new()
        }
        JobTransition::Completed(entry) => {
            state.notifications.success(
                format!(
                    "Transferred {} companies to {} successfully",
                    entry.count, entry.target_list
                ),
                now,
            );
            state.mark_dirty();
            vec![Effect::RefreshCollections]
        }
        JobTransition::Failed { error } => {
            let message = error.unwrap_or_else(|| "unknown error".to_string());
            state
                .notifications
                .error(format!("Transfer job {job_id} failed: {message}"), now);
            state.mark_dirty();
            Vec::new()
        }
        JobTransition::TimedOut => {
            state
                .notifications
                .error(Failure::Timeout { job_id }.to_string(), now);
            state.mark_dirty();
            Vec::new()
        }
    }
}
