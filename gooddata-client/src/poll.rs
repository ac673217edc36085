//! Polling of asynchronous server-side tasks
//!
//! Operations that start a long-running task on the server return a
//! [`FutureResult`]. It repeatedly GETs a polling URI until the server stops
//! answering `202 Accepted`, then hands the final response to a
//! [`PollHandler`] which turns it into the operation's result.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{RawResponse, RestClient};

/// Knows where to poll and how to read the outcome of one kind of task
#[async_trait]
pub trait PollHandler: Send + Sync {
    type Output: Send;

    /// URI polled until the task finishes
    fn polling_uri(&self) -> &str;

    /// Whether a response with `status` ends polling
    fn is_finished(&self, status: StatusCode) -> bool {
        status != StatusCode::ACCEPTED
    }

    /// Read the result from a finished response
    ///
    /// `Ok(None)` keeps polling, for tasks whose state lives in the body
    /// rather than in the status.
    async fn handle_result(
        &self,
        client: &RestClient,
        response: RawResponse,
    ) -> Result<Option<Self::Output>>;

    /// Translate an error raised while polling
    fn handle_error(&self, error: Error) -> Error {
        error
    }
}

enum State<T> {
    Pending,
    Done(T),
    Cancelled,
}

/// Result of a task still running on the server
pub struct FutureResult<T> {
    client: RestClient,
    handler: Box<dyn PollHandler<Output = T>>,
    state: State<T>,
}

impl<T: Send> fmt::Debug for FutureResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Pending => "pending",
            State::Done(_) => "done",
            State::Cancelled => "cancelled",
        };
        f.debug_struct("FutureResult")
            .field("polling_uri", &self.handler.polling_uri())
            .field("state", &state)
            .finish()
    }
}

impl<T: Send + 'static> FutureResult<T> {
    pub fn new(client: RestClient, handler: impl PollHandler<Output = T> + 'static) -> Self {
        Self {
            client,
            handler: Box::new(handler),
            state: State::Pending,
        }
    }

    pub fn polling_uri(&self) -> &str {
        self.handler.polling_uri()
    }

    /// Poll once and report whether the task has finished
    ///
    /// A finished result is kept; [`get`](Self::get) returns it without
    /// polling again.
    pub async fn is_done(&mut self) -> Result<bool> {
        match self.state {
            State::Done(_) => Ok(true),
            State::Cancelled => Err(Error::Cancelled),
            State::Pending => match self.poll_once().await? {
                Some(value) => {
                    self.state = State::Done(value);
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    /// Stop polling. Waiting afterwards fails with [`Error::Cancelled`].
    pub fn cancel(&mut self) {
        debug!(uri = self.polling_uri(), "polling cancelled");
        self.state = State::Cancelled;
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, State::Cancelled)
    }

    /// Wait for the result, polling for as long as it takes
    pub async fn get(self) -> Result<T> {
        self.wait(None).await
    }

    /// Wait for the result, failing with [`Error::Timeout`] once `timeout`
    /// has elapsed
    pub async fn get_with_timeout(self, timeout: Duration) -> Result<T> {
        self.wait(Some(timeout)).await
    }

    async fn wait(mut self, timeout: Option<Duration>) -> Result<T> {
        match std::mem::replace(&mut self.state, State::Pending) {
            State::Done(value) => return Ok(value),
            State::Cancelled => return Err(Error::Cancelled),
            State::Pending => {}
        }

        let poll_sleep = self.client.settings().poll_sleep;
        let start = Instant::now();

        loop {
            if let Some(value) = self.poll_once().await? {
                return Ok(value);
            }

            let elapsed = start.elapsed();
            let sleep = match timeout {
                Some(timeout) if elapsed >= timeout => {
                    return Err(Error::Timeout {
                        uri: self.polling_uri().to_string(),
                        elapsed,
                    });
                }
                Some(timeout) => poll_sleep.min(timeout - elapsed),
                None => poll_sleep,
            };

            debug!(uri = self.polling_uri(), "task still running, next poll in {sleep:?}");
            tokio::time::sleep(sleep).await;
        }
    }

    async fn poll_once(&self) -> Result<Option<T>> {
        let uri = self.handler.polling_uri();
        let outcome = async {
            let response = self.client.execute(Method::GET, uri, &[], None).await?;
            if !self.handler.is_finished(response.status()) {
                return Ok(None);
            }
            self.handler.handle_result(&self.client, response).await
        }
        .await;

        outcome.map_err(|e| self.handler.handle_error(e))
    }
}
