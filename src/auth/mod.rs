use tokio::sync::watch;

/// The authenticated user, used by the engine only as the ownership token
/// scoping which persisted drafts a caller may read or modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Source of the current identity plus session-change notification.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// In-memory session suitable for embedding hosts and tests. The real
/// identity backend sits behind the embedding application; the engine only
/// observes it.
pub struct SessionIdentity {
    tx: watch::Sender<Option<Identity>>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn signed_in(identity: Identity) -> Self {
        let (tx, _) = watch::channel(Some(identity));
        Self { tx }
    }

    pub fn sign_in(&self, identity: Identity) {
        let _ = self.tx.send(Some(identity));
    }

    pub fn sign_out(&self) {
        let _ = self.tx.send(None);
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}
