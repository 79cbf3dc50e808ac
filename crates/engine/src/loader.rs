use std::sync::Arc;
use std::time::Duration;

use agenda_client::AgendaSource;
use agenda_core::{
    errors::AgendaResult,
    models::{
        backend::{ConstraintRecord, CreateAssignmentRequest, GroupRecord, PersonRecord},
        ids::{AssignmentId, GroupRef, PersonRef, RemoteAssignmentId, SessionId},
    },
};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    agenda::SharedAgenda,
    fetch::{FetchOnce, bounded},
    table::{AssignmentChange, Reconcile},
};

/// What an initial load brought in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub timeslots: usize,
    pub sessions: usize,
    pub assignments: usize,
    pub constraint_failures: usize,
    pub groups: usize,
    pub people: usize,
    pub revision: u64,
}

/// Moves data between the backend and a [`SharedAgenda`].
///
/// Fetches run without holding the agenda lock; each result is applied in
/// one synchronous step afterwards. Per-key fetches (constraints, groups,
/// people) go through [`FetchOnce`], so concurrent requests for the same
/// key share one backend call.
pub struct ScheduleLoader {
    source: Arc<dyn AgendaSource>,
    timeout: Duration,
    constraints: FetchOnce<SessionId, Vec<ConstraintRecord>>,
    groups: FetchOnce<GroupRef, GroupRecord>,
    people: FetchOnce<PersonRef, PersonRecord>,
}

impl ScheduleLoader {
    pub fn new(source: Arc<dyn AgendaSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            constraints: FetchOnce::new(),
            groups: FetchOnce::new(),
            people: FetchOnce::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bulk load: timeslots, sessions and assignments in parallel, then
    /// every session's constraints, then the groups and people they
    /// reference, then one full recompute.
    pub async fn load_schedule(&self, agenda: &SharedAgenda) -> AgendaResult<LoadSummary> {
        let (timeslots, sessions, assignments) = tokio::try_join!(
            bounded(self.timeout, "timeslot list", self.source.fetch_timeslots()),
            bounded(self.timeout, "session list", self.source.fetch_sessions()),
            bounded(self.timeout, "assignment list", self.source.fetch_assignments()),
        )?;

        let mut summary = LoadSummary {
            timeslots: timeslots.len(),
            sessions: sessions.len(),
            ..LoadSummary::default()
        };
        let session_ids = {
            let mut agenda = agenda.write().await;
            agenda.load_timeslots(timeslots);
            agenda.load_sessions(sessions);
            summary.assignments = agenda.load_assignments(assignments);
            agenda.sessions_missing_constraints()
        };

        let loaded = join_all(
            session_ids
                .into_iter()
                .map(|session| self.ensure_constraints(agenda, session)),
        )
        .await;
        summary.constraint_failures = loaded.into_iter().filter(|ok| !ok).count();

        let (groups, people) = {
            let agenda = agenda.read().await;
            (agenda.store().unloaded_groups(), agenda.store().unloaded_people())
        };
        summary.groups = groups.len();
        summary.people = people.len();
        join_all(groups.into_iter().map(|href| self.ensure_group(agenda, href))).await;
        join_all(people.into_iter().map(|href| self.ensure_person(agenda, href))).await;

        summary.revision = agenda.write().await.recalculate_all();
        info!(
            "Schedule loaded: {} timeslots, {} sessions, {} assignments, {} constraint failures",
            summary.timeslots, summary.sessions, summary.assignments, summary.constraint_failures
        );
        Ok(summary)
    }

    /// Loads a session's constraints once and recomputes around it.
    ///
    /// A failed fetch is logged and the session continues with no
    /// constraints. Returns whether the backend answered.
    pub async fn ensure_constraints(&self, agenda: &SharedAgenda, session: SessionId) -> bool {
        let source = Arc::clone(&self.source);
        let limit = self.timeout;
        let fetch = self.constraints.fetch(session, move || async move {
            let what = format!("constraints of {session}");
            bounded(limit, &what, source.fetch_constraints(session)).await
        });

        match fetch.await {
            Ok(records) => {
                agenda.write().await.apply_constraints(session, records);
                true
            }
            Err(failure) => {
                warn!("Loading constraints of {} failed: {}", session, failure);
                agenda.write().await.apply_constraints(session, Vec::new());
                false
            }
        }
    }

    /// Fills in a group placeholder. Failures mark the group as loaded with
    /// an error rather than surfacing.
    pub async fn ensure_group(&self, agenda: &SharedAgenda, href: GroupRef) {
        if agenda
            .read()
            .await
            .store()
            .group(&href)
            .is_some_and(|group| group.loaded)
        {
            return;
        }

        let source = Arc::clone(&self.source);
        let limit = self.timeout;
        let key = href.clone();
        let fetch = self.groups.fetch(href.clone(), move || async move {
            let what = format!("group {key}");
            bounded(limit, &what, source.fetch_group(key.clone())).await
        });

        match fetch.await {
            Ok(record) => agenda.write().await.apply_group(record),
            Err(failure) => {
                warn!("Loading group {} failed: {}", href, failure);
                agenda.write().await.mark_group_failed(&href);
            }
        }
    }

    pub async fn ensure_person(&self, agenda: &SharedAgenda, href: PersonRef) {
        if agenda
            .read()
            .await
            .store()
            .person(&href)
            .is_some_and(|person| person.loaded)
        {
            return;
        }

        let source = Arc::clone(&self.source);
        let limit = self.timeout;
        let key = href.clone();
        let fetch = self.people.fetch(href.clone(), move || async move {
            let what = format!("person {key}");
            bounded(limit, &what, source.fetch_person(key.clone())).await
        });

        match fetch.await {
            Ok(record) => agenda.write().await.apply_person(record),
            Err(failure) => {
                warn!("Loading person {} failed: {}", href, failure);
                agenda.write().await.mark_person_failed(&href);
            }
        }
    }

    /// Mirrors a locally applied change to the backend.
    ///
    /// Removed rows are deleted first, then new rows are created in order so
    /// an extension's primary already has its server id. If a local
    /// assignment was moved away again before its create request returned,
    /// the row the server just made is deleted.
    pub async fn sync_change(
        &self,
        agenda: &SharedAgenda,
        change: &AssignmentChange,
    ) -> AgendaResult<()> {
        for removed in &change.removed {
            let Some(remote) = removed.remote_id else {
                debug!("{} never reached the backend, nothing to delete", removed.id);
                continue;
            };
            let what = format!("delete of {remote}");
            bounded(self.timeout, &what, self.source.delete_assignment(remote)).await?;
        }

        for created in &change.created {
            let extendedfrom_id = match created.extendedfrom {
                Some(primary) => {
                    let remote = agenda.read().await.remote_id(primary);
                    if remote.is_none() {
                        warn!("{} extends {} which has no backend row yet", created.id, primary);
                    }
                    remote
                }
                None => None,
            };
            let request = CreateAssignmentRequest {
                session_id: created.session,
                timeslot_id: created.timeslot,
                extendedfrom_id,
            };
            let what = format!("create of {} in {}", created.session, created.timeslot);
            let record = bounded(self.timeout, &what, self.source.create_assignment(request)).await?;
            self.reconcile(agenda, created.id, record.assignment_id).await?;
        }
        Ok(())
    }

    async fn reconcile(
        &self,
        agenda: &SharedAgenda,
        local: AssignmentId,
        remote: RemoteAssignmentId,
    ) -> AgendaResult<()> {
        let outcome = agenda.write().await.confirm_assignment(local, remote);
        if let Reconcile::Orphaned(stale) = outcome {
            warn!("Deleting stale backend row {} for removed {}", stale, local);
            let what = format!("delete of stale {stale}");
            bounded(self.timeout, &what, self.source.delete_assignment(stale)).await?;
        }
        Ok(())
    }

    /// Mirrors a pin toggle. Assignments without a backend row are only
    /// pinned locally.
    pub async fn sync_pin(
        &self,
        agenda: &SharedAgenda,
        assignment: AssignmentId,
        pinned: bool,
    ) -> AgendaResult<()> {
        let Some(remote) = agenda.read().await.remote_id(assignment) else {
            debug!("{} has no backend row, pin stays local", assignment);
            return Ok(());
        };
        let what = format!("pin update of {remote}");
        bounded(self.timeout, &what, self.source.set_pinned(remote, pinned)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ScheduleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleLoader")
            .field("timeout", &self.timeout)
            .field("constraints", &self.constraints.len())
            .field("groups", &self.groups.len())
            .field("people", &self.people.len())
            .finish()
    }
}
