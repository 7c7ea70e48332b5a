use std::collections::HashSet;

use uuid::Uuid;

use crate::constants::*;
use crate::error::{ClientError, ClientResult};
use crate::generation::{Generation, Ticket};
use crate::models::{Collaborator, TripId};
use crate::ports::CollaboratorDirectory;
use crate::utils::{looks_like_email, normalize_email};

/// Collaborator list being edited alongside a trip form.
///
/// Edits are local. Entries added here get a `temp-` id until the trip is
/// saved and [`reconcile`] pushes the list to the backend.
///
/// Only a list seeded from the server describes the full desired set. An
/// unseeded list on an existing trip can add people but never removes any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingCollaborators {
    entries: Vec<Collaborator>,
    seeded: bool,
}

impl PendingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the backend's list when editing an existing trip.
    pub fn from_server(collaborators: Vec<Collaborator>) -> Self {
        Self {
            entries: collaborators,
            seeded: true,
        }
    }

    /// True when the list started from the backend's current set.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn entries(&self) -> &[Collaborator] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        let wanted = normalize_email(email);
        self.entries
            .iter()
            .any(|c| normalize_email(&c.email) == wanted)
    }

    /// Emails in list order; what [`reconcile`] should converge to.
    pub fn desired_emails(&self) -> Vec<String> {
        self.entries.iter().map(|c| c.email.clone()).collect()
    }

    /// Add a collaborator after checking the account exists.
    ///
    /// An email already in the list (ignoring case) is rejected rather than
    /// silently skipped.
    pub async fn add(
        &mut self,
        directory: &dyn CollaboratorDirectory,
        email: &str,
    ) -> ClientResult<&Collaborator> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(ClientError::Validation(ERR_INVALID_EMAIL.to_string()));
        }
        if self.contains(email) {
            return Err(ClientError::Duplicate(ERR_ALREADY_COLLABORATOR.to_string()));
        }

        let lookup = directory.verify_user(email).await?;
        if !lookup.exists {
            return Err(ClientError::UserNotFound(ERR_USER_NOT_FOUND.to_string()));
        }

        // The lookup is async, so re-check before inserting.
        if self.contains(email) {
            return Err(ClientError::Duplicate(ERR_ALREADY_COLLABORATOR.to_string()));
        }

        self.entries.push(Collaborator {
            id: format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()),
            email: email.to_string(),
            first_name: lookup.first_name,
            last_name: lookup.last_name,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove by id (temporary or server-assigned). Returns the removed entry.
    pub fn remove(&mut self, id: &str) -> Option<Collaborator> {
        let index = self.entries.iter().position(|c| c.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn remove_email(&mut self, email: &str) -> Option<Collaborator> {
        let wanted = normalize_email(email);
        let index = self
            .entries
            .iter()
            .position(|c| normalize_email(&c.email) == wanted)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seeded = false;
    }
}

/// Calls needed to turn the server set into the desired set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub removals: Vec<String>,
    pub additions: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Diff two email sets, comparing case-insensitively.
///
/// Removals keep the server's order, additions keep the desired order, and
/// duplicates in `desired` collapse to a single addition.
pub fn plan_reconciliation(current: &[String], desired: &[String]) -> ReconcilePlan {
    let current_set: HashSet<String> = current.iter().map(|e| normalize_email(e)).collect();
    let desired_set: HashSet<String> = desired.iter().map(|e| normalize_email(e)).collect();

    let removals = current
        .iter()
        .filter(|email| !desired_set.contains(&normalize_email(email)))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let additions = desired
        .iter()
        .map(|email| email.trim())
        .filter(|email| {
            let key = normalize_email(email);
            !current_set.contains(&key) && seen.insert(key)
        })
        .map(str::to_string)
        .collect();

    ReconcilePlan {
        removals,
        additions,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOp {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileFailure {
    pub op: ReconcileOp,
    pub email: String,
    pub error: ClientError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub trip_id: TripId,
    pub removed: Vec<String>,
    pub added: Vec<Collaborator>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// First failure worth showing to the user, if any.
    pub fn first_error_message(&self) -> Option<String> {
        self.failures.first().map(|f| {
            let fallback = match f.op {
                ReconcileOp::Add => ERR_ADD_COLLABORATOR,
                ReconcileOp::Remove => ERR_REMOVE_COLLABORATOR,
            };
            format!("{}: {}", f.email, f.error.user_message(fallback))
        })
    }
}

/// Converge the trip's collaborators on the backend to `desired`.
///
/// All removals run before any addition. A failed call is logged and
/// recorded in the report; the remaining calls still run and nothing is
/// rolled back. Only failing to read the current set aborts the pass.
pub async fn reconcile(
    directory: &dyn CollaboratorDirectory,
    trip_id: TripId,
    desired: &[String],
) -> ClientResult<ReconcileReport> {
    converge(directory, trip_id, desired, true).await
}

/// Add whatever in `desired` the trip lacks, leaving everyone else in place.
pub async fn add_missing(
    directory: &dyn CollaboratorDirectory,
    trip_id: TripId,
    desired: &[String],
) -> ClientResult<ReconcileReport> {
    converge(directory, trip_id, desired, false).await
}

async fn converge(
    directory: &dyn CollaboratorDirectory,
    trip_id: TripId,
    desired: &[String],
    with_removals: bool,
) -> ClientResult<ReconcileReport> {
    let current: Vec<String> = directory
        .list_collaborators(trip_id)
        .await
        .inspect_err(|e| tracing::warn!(trip_id, error = %e, "failed to fetch collaborators"))?
        .into_iter()
        .map(|c| c.email)
        .collect();

    let mut plan = plan_reconciliation(&current, desired);
    if !with_removals {
        plan.removals.clear();
    }
    let mut report = ReconcileReport {
        trip_id,
        ..ReconcileReport::default()
    };
    if plan.is_empty() {
        tracing::debug!(trip_id, "collaborators already in sync");
        return Ok(report);
    }

    for email in plan.removals {
        match directory.remove_collaborator(trip_id, &email).await {
            Ok(()) => report.removed.push(email),
            Err(error) => {
                tracing::warn!(trip_id, %email, error = %error, "failed to remove collaborator");
                report.failures.push(ReconcileFailure {
                    op: ReconcileOp::Remove,
                    email,
                    error,
                });
            }
        }
    }

    for email in plan.additions {
        match add_verified(directory, trip_id, &email).await {
            Ok(collaborator) => report.added.push(collaborator),
            Err(error) => {
                tracing::warn!(trip_id, %email, error = %error, "failed to add collaborator");
                report.failures.push(ReconcileFailure {
                    op: ReconcileOp::Add,
                    email,
                    error,
                });
            }
        }
    }

    tracing::info!(
        trip_id,
        removed = report.removed.len(),
        added = report.added.len(),
        failed = report.failures.len(),
        "collaborators reconciled"
    );
    Ok(report)
}

async fn add_verified(
    directory: &dyn CollaboratorDirectory,
    trip_id: TripId,
    email: &str,
) -> ClientResult<Collaborator> {
    let lookup = directory.verify_user(email).await?;
    if !lookup.exists {
        return Err(ClientError::UserNotFound(ERR_USER_NOT_FOUND.to_string()));
    }
    directory.add_collaborator(trip_id, email).await
}

/// Loads a trip's collaborators for editing, ignoring loads that finish
/// after the user moved on to another trip.
#[derive(Debug, Default)]
pub struct CollaboratorLoader {
    generation: Generation,
    target: Option<TripId>,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadTicket {
    ticket: Ticket,
    pub trip_id: TripId,
}

impl CollaboratorLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<TripId> {
        self.target
    }

    pub fn begin(&mut self, trip_id: TripId) -> LoadTicket {
        self.target = Some(trip_id);
        LoadTicket {
            ticket: self.generation.next(),
            trip_id,
        }
    }

    /// Stop caring about any load in flight (form reset, navigation).
    pub fn cancel(&mut self) {
        self.target = None;
        self.generation.invalidate();
    }

    /// `None` when the load is stale and must be dropped.
    pub fn finish(
        &self,
        load: LoadTicket,
        result: ClientResult<Vec<Collaborator>>,
    ) -> Option<ClientResult<PendingCollaborators>> {
        if !self.generation.is_current(load.ticket) || self.target != Some(load.trip_id) {
            tracing::debug!(trip_id = load.trip_id, "discarding stale collaborator load");
            return None;
        }
        Some(
            result
                .inspect_err(|e| {
                    tracing::warn!(trip_id = load.trip_id, error = %e, "failed to load collaborators")
                })
                .map(PendingCollaborators::from_server),
        )
    }

    pub async fn load(
        &mut self,
        directory: &dyn CollaboratorDirectory,
        trip_id: TripId,
    ) -> Option<ClientResult<PendingCollaborators>> {
        let load = self.begin(trip_id);
        let result = directory.list_collaborators(trip_id).await;
        self.finish(load, result)
    }
}
