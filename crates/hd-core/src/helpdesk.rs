use crate::directory::DirectoryRepository;
use crate::error::{AuthError, DirectoryError, HelpdeskError, SessionError};
use crate::events::EventRepository;
use crate::policy::{authorize, gate, Action, Decision};
use crate::sessions::SessionRepository;
use crate::store::Store;
use crate::transitions::{append_note, format_note_entry, plan_updates, NoteAuthor, SessionPatch};
use crate::types::event::ClaimPath;
use crate::types::io::{
    AppendNoteInput, AssignStatusInput, CreateHelpSessionInput, Dashboard, ListSessionsQuery,
    Page, PageQuery, Pagination, SearchResults, SearchSessionsQuery, SessionFilter, SessionPage,
    TechnicianSessionsQuery, UpdateHelpSessionInput, UpdateTypeInput,
};
use crate::types::{
    AccountId, Actor, CompletedByPeriod, EventBody, HelpSession, HelpSessionId, NewHelpSession,
    NewSpecialist, NewUser, SessionStatus, SessionStatusRow, SessionSummary, SortOrder,
    Specialist, SpecialistId, User, UserId,
};
use crate::validation::{
    parse_status_filter, validate_assignment_status, validate_create, validate_note_text,
    validate_updates,
};
use chrono::{DateTime, Duration, Utc};
use hd_events::bus::EventBus;
use hd_events::types::{EventRecord, EventSource};
use std::str::FromStr;

/// Who is calling and how the call arrived.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: Actor,
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(actor: Actor, source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            actor,
            source,
            correlation_id,
        }
    }
}

pub struct Helpdesk<S: Store> {
    store: S,
    event_bus: EventBus,
}

impl<S: Store> Helpdesk<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    pub fn sessions(&self) -> SessionsApi<'_, S> {
        SessionsApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn directory(&self) -> DirectoryApi<'_, S> {
        DirectoryApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs `f` in one transaction, appends the events it returns, and
    /// publishes them once the transaction has committed.
    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, HelpdeskError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), HelpdeskError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

pub struct SessionsApi<'a, S: Store> {
    core: &'a Helpdesk<S>,
}

impl<'a, S: Store> SessionsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateHelpSessionInput,
    ) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::Create)?;
        let valid = validate_create(input)?;
        let Some(user_id) = ctx.actor.user_id().cloned() else {
            return Err(SessionError::forbidden("only users can create help sessions").into());
        };
        let session = self.core.with_events(ctx, |store| {
            let user = store
                .directory()
                .get_user(&user_id)?
                .ok_or(SessionError::UserNotFound)?;
            let specialist = match &valid.specialist {
                Some(id) => Some(
                    store
                        .directory()
                        .get_specialist(id)?
                        .ok_or(SessionError::SpecialistNotFound)?
                        .snapshot(),
                ),
                None => None,
            };
            let session = store.sessions().create(NewHelpSession {
                user: user.snapshot(),
                specialist,
                instapay_reference: valid.instapay_reference,
                note: valid.note,
                steps: valid.steps,
                description: valid.description,
                image_url: valid.image_url,
            })?;
            let mut events = vec![EventBody::SessionCreated {
                session: session.clone(),
            }];
            if let Some(specialist_id) = session.assigned_specialist() {
                events.push(EventBody::SessionClaimed {
                    session_id: session.id.clone(),
                    specialist_id: specialist_id.clone(),
                    previous_specialist_id: None,
                    path: ClaimPath::Creation,
                });
            }
            Ok((session, events))
        })?;
        tracing::info!(session_id = %session.id, actor = %ctx.actor, "help session created");
        Ok(session)
    }

    pub fn get(&self, ctx: &RequestContext, id: &str) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::Read)?;
        let session = load(self.core.store(), id)?;
        check_relation(ctx, Action::Read, &session)?;
        Ok(session)
    }

    /// Pending sessions, newest first.
    pub fn list_pending(
        &self,
        ctx: &RequestContext,
        query: PageQuery,
    ) -> Result<SessionPage, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let filter = SessionFilter {
            status: Some(SessionStatus::Pending),
            ..SessionFilter::default()
        };
        self.page(&filter, SortOrder::Desc, query.into())
    }

    pub fn list(
        &self,
        ctx: &RequestContext,
        query: ListSessionsQuery,
    ) -> Result<SessionPage, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let filter = SessionFilter {
            status: parse_status_filter(query.status.as_deref())?,
            ..SessionFilter::default()
        };
        let page = PageQuery {
            page: query.page,
            limit: query.limit,
        };
        self.page(&filter, SortOrder::Desc, page.into())
    }

    /// Accepted and rejected listings are scoped to one technician; other
    /// statuses are filtered by status alone.
    pub fn list_by_technician(
        &self,
        ctx: &RequestContext,
        query: TechnicianSessionsQuery,
    ) -> Result<SessionPage, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let status = parse_status_filter(query.status.as_deref())?;
        let mut filter = SessionFilter {
            status,
            ..SessionFilter::default()
        };
        if matches!(
            status,
            Some(SessionStatus::Accepted | SessionStatus::Rejected)
        ) {
            let technician = match query.technician_id.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => SpecialistId::from_str(raw)
                    .map_err(|err| SessionError::invalid(format!("technician_id: {err}")))?,
                _ => ctx.actor.specialist_id().cloned().ok_or_else(|| {
                    SessionError::invalid("technician_id is required for this status")
                })?,
            };
            filter.specialist_id = Some(technician);
        }
        let page = PageQuery {
            page: query.page,
            limit: query.limit,
        };
        self.page(&filter, SortOrder::Desc, page.into())
    }

    pub fn dashboard(&self, ctx: &RequestContext) -> Result<Dashboard, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let store = self.core.store();
        let filter = SessionFilter::default();
        let total = store.sessions().count(&filter)?;
        let sessions = store
            .sessions()
            .find_many(&filter, SortOrder::Desc, 0, None)?;
        Ok(Dashboard {
            total,
            sessions: sessions.iter().map(SessionSummary::from).collect(),
        })
    }

    /// Completed sessions opened today (UTC), in the last 7 days and in the
    /// last 30 days.
    pub fn completed_by_period(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<CompletedByPeriod, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| HelpdeskError::internal("invalid start of day"))?;
        let completed_since = |from: DateTime<Utc>, to: Option<DateTime<Utc>>| {
            let filter = SessionFilter {
                status: Some(SessionStatus::Completed),
                created_from: Some(from),
                created_to: to,
                ..SessionFilter::default()
            };
            self.core
                .store()
                .sessions()
                .find_many(&filter, SortOrder::Desc, 0, None)
                .map(|sessions| {
                    sessions
                        .iter()
                        .map(SessionStatusRow::from)
                        .collect::<Vec<_>>()
                })
        };
        Ok(CompletedByPeriod {
            day: completed_since(start_of_day, Some(start_of_day + Duration::days(1)))?,
            week: completed_since(now - Duration::days(7), None)?,
            month: completed_since(now - Duration::days(30), None)?,
        })
    }

    /// Case-insensitive substring search over reference, username and
    /// specialist name.
    pub fn search(
        &self,
        ctx: &RequestContext,
        query: SearchSessionsQuery,
    ) -> Result<SearchResults, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        let filter = SessionFilter {
            search: query
                .search
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty()),
            ..SessionFilter::default()
        };
        let page = Page::from(PageQuery {
            page: query.page,
            limit: query.limit,
        });
        let result = self.page(&filter, query.sort.unwrap_or_default(), page)?;
        Ok(SearchResults {
            current_page: result.pagination.page,
            total_pages: result.pagination.pages,
            total_requests: result.pagination.total,
            requests: result.sessions,
        })
    }

    /// General update path for admins and the assigned specialist. A
    /// specialist updating an unassigned session claims it first.
    pub fn update_status(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: UpdateHelpSessionInput,
    ) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::UpdateStatus)?;
        let updates = input.into_updates();
        validate_updates(&updates)?;
        let author = note_author(&ctx.actor)?;
        let session = self.core.with_events(ctx, |store| {
            let current = load(store, id)?;
            let decision = check_relation(ctx, Action::UpdateStatus, &current)?;
            let mut patch = plan_updates(&current, &updates, &author, Utc::now());
            let mut events = Vec::new();
            if decision == Decision::ClaimThenAllow {
                let specialist = claimant(store, &ctx.actor)?;
                events.push(EventBody::SessionClaimed {
                    session_id: current.id.clone(),
                    specialist_id: specialist.id.clone(),
                    previous_specialist_id: None,
                    path: ClaimPath::AutoAssign,
                });
                patch.specialist = Some(specialist.snapshot());
            }
            let updated = store.sessions().update_by_id(&current.id, &patch)?;
            if updated.status != current.status {
                events.push(EventBody::SessionStatusChanged {
                    session_id: updated.id.clone(),
                    from: current.status,
                    to: updated.status,
                });
            }
            events.push(EventBody::SessionUpdated {
                session: updated.clone(),
            });
            Ok((updated, events))
        })?;
        tracing::info!(
            session_id = %session.id,
            actor = %ctx.actor,
            status = %session.status,
            "help session updated"
        );
        Ok(session)
    }

    /// Accept or reject, attaching the calling specialist regardless of any
    /// current assignment.
    pub fn assign_and_set_status(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: AssignStatusInput,
    ) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::AssignAndSetStatus)?;
        validate_assignment_status(input.status)?;
        let session = self.core.with_events(ctx, |store| {
            let current = load(store, id)?;
            check_relation(ctx, Action::AssignAndSetStatus, &current)?;
            let specialist = match ctx.actor.specialist_id() {
                Some(specialist_id) => store
                    .directory()
                    .get_specialist(specialist_id)?
                    .ok_or(SessionError::SpecialistNotFound)?,
                None => return Err(SessionError::SpecialistNotFound.into()),
            };
            let patch = SessionPatch {
                status: Some(input.status),
                specialist: Some(specialist.snapshot()),
                ..SessionPatch::default()
            };
            let updated = store.sessions().update_by_id(&current.id, &patch)?;
            let events = vec![
                EventBody::SessionClaimed {
                    session_id: updated.id.clone(),
                    specialist_id: specialist.id.clone(),
                    previous_specialist_id: current.assigned_specialist().cloned(),
                    path: ClaimPath::AcceptReject,
                },
                EventBody::SessionStatusChanged {
                    session_id: updated.id.clone(),
                    from: current.status,
                    to: updated.status,
                },
            ];
            Ok((updated, events))
        })?;
        tracing::info!(
            session_id = %session.id,
            actor = %ctx.actor,
            status = %session.status,
            "help session assigned"
        );
        Ok(session)
    }

    pub fn update_type(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: UpdateTypeInput,
    ) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::UpdateType)?;
        let session = self.core.with_events(ctx, |store| {
            let current = load(store, id)?;
            check_relation(ctx, Action::UpdateType, &current)?;
            let patch = SessionPatch {
                session_type: Some(input.session_type),
                ..SessionPatch::default()
            };
            let updated = store.sessions().update_by_id(&current.id, &patch)?;
            let events = vec![EventBody::SessionUpdated {
                session: updated.clone(),
            }];
            Ok((updated, events))
        })?;
        tracing::info!(session_id = %session.id, actor = %ctx.actor, "help session type set");
        Ok(session)
    }

    pub fn append_note(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: AppendNoteInput,
    ) -> Result<HelpSession, HelpdeskError> {
        check_gate(ctx, Action::AppendNote)?;
        let text = validate_note_text(input.note.as_deref())?;
        let author = note_author(&ctx.actor)?;
        let session = self.core.with_events(ctx, |store| {
            let current = load(store, id)?;
            check_relation(ctx, Action::AppendNote, &current)?;
            let entry = format_note_entry(&author, &text, Utc::now());
            let patch = SessionPatch {
                note: Some(append_note(&current.note, &entry)),
                ..SessionPatch::default()
            };
            let updated = store.sessions().update_by_id(&current.id, &patch)?;
            let events = vec![EventBody::NoteAppended {
                session_id: updated.id.clone(),
                entry,
            }];
            Ok((updated, events))
        })?;
        tracing::info!(session_id = %session.id, actor = %ctx.actor, "note appended");
        Ok(session)
    }

    pub fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), HelpdeskError> {
        check_gate(ctx, Action::Delete)?;
        let session_id = self.core.with_events(ctx, |store| {
            let current = load(store, id)?;
            check_relation(ctx, Action::Delete, &current)?;
            if !store.sessions().delete_by_id(&current.id)? {
                return Err(SessionError::NotFound.into());
            }
            let events = vec![EventBody::SessionDeleted {
                session_id: current.id.clone(),
            }];
            Ok((current.id, events))
        })?;
        tracing::info!(session_id = %session_id, actor = %ctx.actor, "help session deleted");
        Ok(())
    }

    fn page(
        &self,
        filter: &SessionFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<SessionPage, HelpdeskError> {
        let store = self.core.store();
        let total = store.sessions().count(filter)?;
        let sessions = store
            .sessions()
            .find_many(filter, sort, page.skip(), Some(page.limit))?;
        Ok(SessionPage {
            sessions,
            pagination: Pagination::new(total, page),
        })
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Helpdesk<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn list(
        &self,
        ctx: &RequestContext,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, HelpdeskError> {
        check_gate(ctx, Action::List)?;
        self.core.store.events().list(after, limit)
    }
}

pub struct DirectoryApi<'a, S: Store> {
    core: &'a Helpdesk<S>,
}

impl<'a, S: Store> DirectoryApi<'a, S> {
    pub fn add_user(&self, input: NewUser) -> Result<User, HelpdeskError> {
        require_field("username", &input.username)?;
        require_field("email", &input.email)?;
        let user = self
            .core
            .store
            .with_tx(|store| store.directory().add_user(input))?;
        tracing::info!(user_id = %user.id, admin = user.is_admin, "user registered");
        Ok(user)
    }

    pub fn add_specialist(&self, input: NewSpecialist) -> Result<Specialist, HelpdeskError> {
        require_field("name", &input.name)?;
        require_field("email", &input.email)?;
        let specialist = self
            .core
            .store
            .with_tx(|store| store.directory().add_specialist(input))?;
        tracing::info!(specialist_id = %specialist.id, "specialist registered");
        Ok(specialist)
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>, HelpdeskError> {
        self.core.store.directory().get_user(id)
    }

    pub fn get_specialist(&self, id: &SpecialistId) -> Result<Option<Specialist>, HelpdeskError> {
        self.core.store.directory().get_specialist(id)
    }

    /// Maps a credential subject to an actor; users are consulted before
    /// specialists.
    pub fn resolve(&self, account: &AccountId) -> Result<Actor, HelpdeskError> {
        let directory = self.core.store.directory();
        let actor = match account {
            AccountId::User(id) => directory.get_user(id)?.map(|user| Actor::from_user(&user)),
            AccountId::Specialist(id) => directory
                .get_specialist(id)?
                .map(|specialist| Actor::Specialist(specialist.id)),
        };
        actor.ok_or_else(|| AuthError::UnknownSubject.into())
    }
}

fn require_field(name: &str, value: &str) -> Result<(), DirectoryError> {
    if value.trim().is_empty() {
        return Err(DirectoryError::InvalidInput {
            message: format!("{name} is required"),
        });
    }
    Ok(())
}

fn check_gate(ctx: &RequestContext, action: Action) -> Result<(), SessionError> {
    gate(action, &ctx.actor).inspect_err(|err| {
        tracing::warn!(actor = %ctx.actor, action = action.as_str(), error = %err, "denied");
    })
}

fn check_relation(
    ctx: &RequestContext,
    action: Action,
    session: &HelpSession,
) -> Result<Decision, SessionError> {
    authorize(action, &ctx.actor, session).inspect_err(|err| {
        tracing::warn!(
            actor = %ctx.actor,
            session_id = %session.id,
            action = action.as_str(),
            error = %err,
            "denied"
        );
    })
}

/// Malformed ids cannot name a stored session.
fn load<S: Store>(store: &S, id: &str) -> Result<HelpSession, HelpdeskError> {
    let id = HelpSessionId::from_str(id).map_err(|_| SessionError::NotFound)?;
    store
        .sessions()
        .find(&id)?
        .ok_or_else(|| SessionError::NotFound.into())
}

fn claimant<S: Store>(store: &S, actor: &Actor) -> Result<Specialist, HelpdeskError> {
    let missing = || SessionError::forbidden("specialist not found in directory");
    let id = actor.specialist_id().ok_or_else(missing)?;
    Ok(store.directory().get_specialist(id)?.ok_or_else(missing)?)
}

fn note_author(actor: &Actor) -> Result<NoteAuthor, SessionError> {
    match actor {
        Actor::Specialist(id) => Ok(NoteAuthor::Technician(id.clone())),
        Actor::Admin(id) => Ok(NoteAuthor::Admin(id.clone())),
        Actor::User(_) => Err(SessionError::forbidden("users cannot write notes")),
    }
}

fn build_event_record(ctx: &RequestContext, body: EventBody) -> Result<EventRecord, HelpdeskError> {
    let value = serde_json::to_value(body).map_err(HelpdeskError::internal)?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        actor: Some(ctx.actor.to_string()),
        body: value,
    })
}
