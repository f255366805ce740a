//! # Session Store
//!
//! Holds at most one app draft per room, together with the users who contributed to it.
//! Every operation is atomic for its room; different rooms never block each other.

use crate::application::templates::TemplateRegistry;
use crate::domain::types::{Field, Session, UnknownField};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no such template")]
    NoSuchTemplate,
    #[error("no active session")]
    NoActiveSession,
    #[error("invalid field '{0}'")]
    InvalidField(String),
}

impl From<UnknownField> for SessionError {
    fn from(e: UnknownField) -> Self {
        SessionError::InvalidField(e.0)
    }
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    templates: TemplateRegistry,
}

impl SessionStore {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            sessions: DashMap::new(),
            templates,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Starts a draft for `room`. Returns false, leaving the existing draft alone, if one exists.
    pub fn create(&self, room: &str) -> bool {
        match self.sessions.entry(room.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Session::new(self.templates.first()));
                tracing::debug!("Session created for {}", room);
                true
            }
        }
    }

    /// Ensures a session exists and lists `user` as a participant.
    pub fn touch(&self, room: &str, user: &str) -> Session {
        self.with_session(room, user, |session| session.clone())
    }

    pub fn exists(&self, room: &str) -> bool {
        self.sessions.contains_key(room)
    }

    pub fn get(&self, room: &str) -> Option<Session> {
        self.sessions.get(room).map(|session| session.value().clone())
    }

    pub fn end(&self, room: &str) -> bool {
        let removed = self.sessions.remove(room).is_some();
        if removed {
            tracing::debug!("Session ended for {}", room);
        }
        removed
    }

    pub fn cancel(&self, room: &str) -> Result<(), SessionError> {
        if self.end(room) {
            Ok(())
        } else {
            Err(SessionError::NoActiveSession)
        }
    }

    pub fn set_field(&self, room: &str, user: &str, field: Field, value: &str) {
        self.with_session(room, user, |session| {
            session.draft.configuration.set(field, value.to_string())
        })
    }

    /// Selects the first template starting with `candidate` (case-insensitive).
    /// The session is touched even when nothing matches.
    pub fn set_flavor(&self, room: &str, user: &str, candidate: &str) -> Result<String, SessionError> {
        let matched = self.templates.find_prefix(candidate);
        self.with_session(room, user, |session| match matched {
            Some(template) => {
                session.draft.flavor = Some(template.clone());
                Ok(template)
            }
            None => Err(SessionError::NoSuchTemplate),
        })
    }

    fn with_session<R>(&self, room: &str, user: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        if !self.exists(room) {
            self.create(room);
        }
        // The draft may have been ended since; the entry puts a fresh one back.
        let mut session = self
            .sessions
            .entry(room.to_string())
            .or_insert_with(|| Session::new(self.templates.first()));
        if session.add_participant(user) {
            tracing::debug!("{} joined the draft in {}", user, room);
        }
        f(session.value_mut())
    }
}
