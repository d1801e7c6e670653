use tokio::sync::watch;

/// The authenticated user behind an [`crate::HttpService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

/// Login state shared between the HTTP client and anything that wants to
/// react to sign-in/sign-out, backed by a watch channel so observers see
/// the latest state without polling.
#[derive(Clone)]
pub struct SessionHandle {
    tx: watch::Sender<Option<Identity>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn set(&self, identity: Identity) {
        self.tx.send_replace(Some(identity));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
