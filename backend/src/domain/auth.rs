//! Authentication primitives: login credentials and session state.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to the auth gateway.
//! Session state lives in an explicit [`SessionWatch`] object constructed
//! once at application start, never in a module-level singleton.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials passed to the auth gateway.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use anonbox_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin@example.com", "hunter2").unwrap();
/// assert_eq!(creds.email(), "admin@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used for the provider lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Authenticated admin identity returned by the auth provider.
///
/// There are no roles beyond authenticated-or-not; holding a session is the
/// only capability the review flows check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    uid: String,
    email: Option<String>,
}

impl AdminSession {
    /// Build a session from the provider-assigned uid and optional email.
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }

    /// Provider-assigned stable identifier.
    pub fn uid(&self) -> &str {
        self.uid.as_str()
    }

    /// Email on record with the provider, if any.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

type SessionCallback = Arc<dyn Fn(Option<&AdminSession>) + Send + Sync>;

struct WatchInner {
    current: Option<AdminSession>,
    subscribers: HashMap<u64, SessionCallback>,
    next_id: u64,
}

/// Observable session state: `{ current: Option<AdminSession> }` plus an
/// explicit subscribe/unsubscribe contract.
///
/// Subscribers are invoked synchronously on every [`SessionWatch::replace`]
/// call, after the new value is stored. Dropping the returned
/// [`SessionSubscription`] unsubscribes.
///
/// # Examples
/// ```
/// use anonbox_backend::domain::{AdminSession, SessionWatch};
///
/// let watch = SessionWatch::new();
/// let _sub = watch.subscribe(|session| {
///     let _ = session.is_some();
/// });
/// watch.replace(Some(AdminSession::new("uid-1", None)));
/// assert!(watch.current().is_some());
/// ```
#[derive(Clone)]
pub struct SessionWatch {
    inner: Arc<Mutex<WatchInner>>,
}

impl SessionWatch {
    /// Create an empty session watch (no active session).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(WatchInner {
                current: None,
                subscribers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Snapshot of the current session, if any.
    pub fn current(&self) -> Option<AdminSession> {
        match self.inner.lock() {
            Ok(inner) => inner.current.clone(),
            Err(poisoned) => poisoned.into_inner().current.clone(),
        }
    }

    /// Replace the current session and notify every subscriber.
    ///
    /// Callbacks run outside the internal lock, so a callback may call back
    /// into the watch (including subscribing or unsubscribing).
    pub fn replace(&self, session: Option<AdminSession>) {
        let (snapshot, callbacks) = {
            let mut inner = match self.inner.lock() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            inner.current = session;
            let callbacks: Vec<SessionCallback> = inner.subscribers.values().cloned().collect();
            (inner.current.clone(), callbacks)
        };
        for callback in callbacks {
            callback(snapshot.as_ref());
        }
    }

    /// Register a callback fired on every session change.
    ///
    /// The returned handle unsubscribes when dropped; keep it alive for as
    /// long as notifications are wanted.
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<&AdminSession>) + Send + Sync + 'static,
    ) -> SessionSubscription {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, Arc::new(callback));
        SessionSubscription {
            id,
            watch: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for SessionWatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer handle returned by [`SessionWatch::subscribe`].
pub struct SessionSubscription {
    id: u64,
    watch: Weak<Mutex<WatchInner>>,
}

impl SessionSubscription {
    /// Explicitly unsubscribe; equivalent to dropping the handle.
    pub fn dispose(self) {}
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.watch.upgrade() {
            let mut inner = match inner.lock() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            inner.subscribers.remove(&self.id);
        }
    }
}
