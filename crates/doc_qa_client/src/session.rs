//! Session state for one question box: the current query, the last response,
//! and the busy flag. Submissions never fail; errors become the fallback reply.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::QueryClient;
use crate::messages::QueryResponse;

/// Point-in-time copy of a session's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub query: String,
    pub response: Option<QueryResponse>,
    pub busy: bool,
}

/// One question box bound to a backend.
///
/// Methods take `&self` so a caller may observe [`Session::is_busy`] while a
/// submission is pending. Overlapping submissions are not serialized: the one
/// that settles last owns the response.
pub struct Session {
    client: QueryClient,
    state: Mutex<SessionState>,
}

/// Clears the busy flag when the submission scope ends, however it ends.
struct BusyGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a Mutex<SessionState>) -> Self {
        lock(state).busy = true;
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).busy = false;
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    /// Replace the current input text.
    pub fn set_query(&self, text: impl Into<String>) {
        lock(&self.state).query = text.into();
    }

    pub fn response(&self) -> Option<QueryResponse> {
        lock(&self.state).response.clone()
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.state).busy
    }

    pub fn snapshot(&self) -> SessionState {
        lock(&self.state).clone()
    }

    /// Submit the current query verbatim (empty and whitespace-only included).
    pub async fn submit(&self) -> QueryResponse {
        let question = self.query();
        self.submit_question(&question).await
    }

    /// Submit `question` and store whatever comes back as the response.
    pub async fn submit_question(&self, question: &str) -> QueryResponse {
        let _busy = BusyGuard::acquire(&self.state);

        let response = match self.client.submit(question).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "query failed");
                QueryResponse::fallback()
            }
        };

        lock(&self.state).response = Some(response.clone());
        response
    }
}
