//! In-memory [`Transport`] for tests.
//!
//! Routes are matched in registration order against a readable form of
//! the request URL (`host/path?key=value&...` with query values
//! percent-decoded), so tests can match on `typeName=cbs:buurten2023`
//! instead of its encoded form. Each route replays its replies in order
//! and keeps repeating the last one. Unmatched requests get a 404.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{FetchError, Transport, TransportResponse, Url};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
enum Reply {
    Response(TransportResponse),
    Fail(String),
}

struct Route {
    matches: Predicate,
    replies: Mutex<VecDeque<Reply>>,
}

/// Scripted transport recording every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    log: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    /// Creates a transport with no routes (every request gets a 404).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route answering `status`/`body` to URLs containing `needle`.
    #[must_use]
    pub fn respond(self, needle: &str, status: u16, body: &str) -> Self {
        let needle = needle.to_string();
        self.route(
            Box::new(move |described| described.contains(&needle)),
            Reply::Response(TransportResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    /// Adds a route answering `status`/`body` when every needle is
    /// contained in the request.
    #[must_use]
    pub fn respond_all(self, needles: &[&str], status: u16, body: &str) -> Self {
        let needles: Vec<String> = needles.iter().map(|n| (*n).to_string()).collect();
        self.route(
            Box::new(move |described| needles.iter().all(|n| described.contains(n.as_str()))),
            Reply::Response(TransportResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    /// Adds a route failing with a transport error.
    #[must_use]
    pub fn fail(self, needle: &str, message: &str) -> Self {
        let needle = needle.to_string();
        self.route(
            Box::new(move |described| described.contains(&needle)),
            Reply::Fail(message.to_string()),
        )
    }

    /// Queues another reply on the most recently added route.
    ///
    /// # Panics
    ///
    /// Panics if no route has been added yet.
    #[must_use]
    pub fn then(self, status: u16, body: &str) -> Self {
        self.push_reply(Reply::Response(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    /// Queues a transport failure on the most recently added route.
    ///
    /// # Panics
    ///
    /// Panics if no route has been added yet.
    #[must_use]
    pub fn then_fail(self, message: &str) -> Self {
        self.push_reply(Reply::Fail(message.to_string()))
    }

    /// Readable form of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock_log().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock_log().len()
    }

    /// Clock reading at each request (respects paused test time).
    #[must_use]
    pub fn request_times(&self) -> Vec<Instant> {
        self.lock_log().iter().map(|(_, at)| *at).collect()
    }

    fn route(mut self, matches: Predicate, reply: Reply) -> Self {
        self.routes.push(Route {
            matches,
            replies: Mutex::new(VecDeque::from([reply])),
        });
        self
    }

    fn push_reply(self, reply: Reply) -> Self {
        let Some(route) = self.routes.last() else {
            panic!("then() needs a route registered before it");
        };
        route
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<(String, Instant)>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders `url` as `host/path?key=value&...` with decoded values.
#[must_use]
pub fn describe(url: &Url) -> String {
    let query: Vec<String> = url
        .query_pairs()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!(
        "{}{}?{}",
        url.host_str().unwrap_or_default(),
        url.path(),
        query.join("&")
    )
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, FetchError> {
        let described = describe(url);
        self.lock_log().push((described.clone(), Instant::now()));

        let Some(route) = self.routes.iter().find(|r| (r.matches)(&described)) else {
            return Ok(TransportResponse {
                status: 404,
                body: String::new(),
            });
        };

        let reply = {
            let mut replies = route.replies.lock().unwrap_or_else(PoisonError::into_inner);
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(FetchError::Transport { message }),
            None => Ok(TransportResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
