use crate::{
    api::{Question, User, UsersApi},
    form::{FormEvent, FormError, FormKind, FormSession, Mount},
    notify::{Notification, Notifier, Severity},
    Error,
};
use codebites_core::TokenStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const WELCOME_MESSAGE: &str = "Welcome!";

/// Top-level client state: who is signed in, the cached user list and the
/// current notification.
pub struct App<A, S>
where
    A: UsersApi + 'static,
    S: TokenStore,
{
    api: Arc<A>,
    store: S,
    notifier: Notifier,
    is_authenticated: bool,
    users: Arc<Mutex<Vec<User>>>,
    refreshing: Option<JoinHandle<()>>,
}

impl<A, S> App<A, S>
where
    A: UsersApi + 'static,
    S: TokenStore,
{
    /// A stored token from an earlier run counts as signed in.
    pub fn new(api: A, store: S, notifier: Notifier) -> Self {
        let is_authenticated = match store.get() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!("could not read the stored token: {}", e);
                false
            }
        };
        Self {
            api: Arc::new(api),
            store,
            notifier,
            is_authenticated,
            users: Arc::new(Mutex::new(Vec::new())),
            refreshing: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// The user list as of the last finished refresh.
    pub fn users(&self) -> Vec<User> {
        lock(&self.users).clone()
    }

    pub fn mount_form(&self, kind: FormKind) -> Mount {
        FormSession::mount(kind, self.is_authenticated)
    }

    /// Marks the session as signed in and starts a user-list refresh in the
    /// background. Must be called from within a tokio runtime.
    pub fn login_user(&mut self, token: &str) {
        if let Err(e) = self.store.set(token) {
            // The session still works for this run, it just won't survive a restart.
            error!("could not persist the session token: {}", e);
        }
        self.is_authenticated = true;
        info!("signed in");
        self.create_message(WELCOME_MESSAGE, Severity::Success);
        self.start_refresh();
    }

    pub async fn signout_user(&mut self) {
        match self.store.get() {
            Ok(Some(token)) => {
                if let Err(e) = self.api.signout(&token).await {
                    warn!("remote signout failed: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("could not read the stored token: {}", e),
        }
        if let Some(task) = self.refreshing.take() {
            task.abort();
        }
        if let Err(e) = self.store.clear() {
            error!("could not clear the session token: {}", e);
        }
        self.is_authenticated = false;
        info!("signed out");
    }

    /// Exchanges the form's credentials for a token.
    ///
    /// Fails only when the form may not be submitted. A rejected or failed
    /// exchange is reported through a notification and hands the form back
    /// in the editing state with its values intact.
    pub async fn submit(&mut self, form: &FormSession) -> Result<FormSession, FormError> {
        let submitting = form.reduce(FormEvent::SubmitStarted)?;
        let kind = submitting.kind();

        match self.api.exchange(kind, &submitting.payload()).await {
            Ok(token) => {
                let done = submitting.reduce(FormEvent::SubmitSucceeded)?;
                self.login_user(&token);
                Ok(done)
            }
            Err(e) => {
                if e.is_rejection() {
                    warn!(%kind, "credential exchange rejected: {}", e);
                } else {
                    error!(%kind, "credential exchange failed: {}", e);
                }
                self.create_message(kind.failure_message(), Severity::Danger);
                submitting.reduce(FormEvent::SubmitFailed)
            }
        }
    }

    /// Refreshes the user list and waits for it. Keeps the previous list if
    /// the service can't be reached.
    pub async fn refresh_users(&mut self) {
        self.start_refresh();
        self.users_refreshed().await;
    }

    /// Waits for a refresh started by `login_user`, if one is still running.
    pub async fn users_refreshed(&mut self) {
        if let Some(task) = self.refreshing.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("user refresh task failed: {}", e);
                }
            }
        }
    }

    fn start_refresh(&mut self) {
        let token = self.store.get().ok().flatten();
        let api = Arc::clone(&self.api);
        let users = Arc::clone(&self.users);
        let task = tokio::spawn(async move {
            match api.users(token.as_deref()).await {
                Ok(fresh) => {
                    debug!(count = fresh.len(), "user list refreshed");
                    *lock(&users) = fresh;
                }
                Err(e) => error!("could not refresh users: {}", e),
            }
        });
        // Only the newest refresh may write the list.
        if let Some(previous) = self.refreshing.replace(task) {
            previous.abort();
        }
    }

    pub async fn current_user(&self) -> Result<Option<User>, Error> {
        match self.token()? {
            Some(token) => Ok(Some(self.api.current_user(&token).await?)),
            None => Ok(None),
        }
    }

    pub async fn questions(&self) -> Result<Option<Vec<Question>>, Error> {
        match self.token()? {
            Some(token) => Ok(Some(self.api.questions(&token).await?)),
            None => Ok(None),
        }
    }

    pub fn create_message(&self, text: &str, severity: Severity) {
        self.notifier.create_message(text, severity);
    }

    pub fn remove_message(&self) {
        self.notifier.remove_message();
    }

    pub fn message(&self) -> Option<Notification> {
        self.notifier.message()
    }

    fn token(&self) -> Result<Option<String>, Error> {
        if !self.is_authenticated {
            return Ok(None);
        }
        Ok(self.store.get()?)
    }
}

fn lock(users: &Mutex<Vec<User>>) -> MutexGuard<'_, Vec<User>> {
    users.lock().unwrap_or_else(|e| e.into_inner())
}
