//! Commentary client
//!
//! Turns a request into a line of text without ever failing: validation and
//! rate limiting happen up front, the backend call races a timeout, and every
//! failure path ends in a canned line for the requested language.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable, Either, FutureExt, LocalBoxFuture, select};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::fallback;
use super::rate_limit::RateLimiter;
use super::request::{CommentaryRequest, Lang, ValidationError};
use super::sanitize::sanitize;
use crate::platform::{Clock, Timer};

/// Default time allowed for a backend call
pub const COMMENTARY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommentaryError {
    #[error("request rejected: {0}")]
    Invalid(#[from] ValidationError),
    #[error("rate limit exceeded for {0}")]
    RateLimited(String),
    #[error("no commentary backend configured")]
    NoBackend,
    #[error("commentary timed out after {0}ms")]
    Timeout(u32),
    #[error("commentary backend failed: {0}")]
    Backend(String),
    #[error("commentary was empty after sanitizing")]
    Empty,
}

/// A remote text generator
pub trait CommentaryBackend {
    /// Produce raw (unsanitized) text for a request
    fn generate(&self, request: &CommentaryRequest) -> LocalBoxFuture<'static, Result<String, CommentaryError>>;
}

/// Where a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentarySource {
    Generated,
    Fallback,
}

/// A line ready to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub text: String,
    pub lang: Lang,
    pub source: CommentarySource,
}

impl Commentary {
    fn fallback(lang: Lang, line: &str) -> Self {
        Self {
            text: line.to_string(),
            lang,
            source: CommentarySource::Fallback,
        }
    }
}

/// An in-flight commentary request
///
/// Resolves to `None` only if aborted.
pub struct CommentaryTask {
    future: Abortable<LocalBoxFuture<'static, Commentary>>,
    handle: AbortHandle,
}

impl CommentaryTask {
    fn new(future: LocalBoxFuture<'static, Commentary>) -> Self {
        let (handle, registration) = AbortHandle::new_pair();
        Self {
            future: Abortable::new(future, registration),
            handle,
        }
    }

    /// Handle for cancelling the task from elsewhere
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }
}

impl Future for CommentaryTask {
    type Output = Option<Commentary>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.future).poll(cx).map(Result::ok)
    }
}

pub struct CommentaryClient {
    backend: Option<Rc<dyn CommentaryBackend>>,
    timer: Rc<dyn Timer>,
    limiter: RateLimiter,
    timeout_ms: u32,
    rng: Pcg32,
}

impl CommentaryClient {
    pub fn new(
        backend: Option<Rc<dyn CommentaryBackend>>,
        timer: Rc<dyn Timer>,
        limiter: RateLimiter,
        timeout_ms: u32,
        seed: u64,
    ) -> Self {
        Self {
            backend,
            timer,
            limiter,
            timeout_ms,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Client with default limits and no backend (always falls back)
    pub fn offline(clock: Rc<dyn Clock>, timer: Rc<dyn Timer>, seed: u64) -> Self {
        Self::new(
            None,
            timer,
            RateLimiter::with_defaults(clock),
            COMMENTARY_TIMEOUT_MS,
            seed,
        )
    }

    /// A random commentary language
    pub fn pick_lang(&mut self) -> Lang {
        Lang::ALL[self.rng.random_range(0..Lang::ALL.len())]
    }

    /// Drop expired rate-limit windows
    pub fn sweep(&mut self) -> usize {
        self.limiter.sweep()
    }

    /// Start a request
    ///
    /// Validation, rate limiting and the fallback pick happen now; the
    /// returned task only waits on the backend and the timeout.
    pub fn request(&mut self, request: CommentaryRequest) -> CommentaryTask {
        let lang = request.lang;
        let fallback_line = fallback::pick(lang, &mut self.rng);

        let call = match self.start_call(&request) {
            Ok(call) => call,
            Err(e) => {
                log::warn!("Commentary skipped: {}", e);
                return CommentaryTask::new(
                    futures::future::ready(Commentary::fallback(lang, fallback_line)).boxed_local(),
                );
            }
        };

        let timeout_ms = self.timeout_ms;
        let timeout = self.timer.sleep(timeout_ms);
        let future = async move {
            let outcome = match select(call, timeout).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(CommentaryError::Timeout(timeout_ms)),
            };
            match outcome.and_then(|text| sanitize(&text).ok_or(CommentaryError::Empty)) {
                Ok(text) => Commentary {
                    text,
                    lang,
                    source: CommentarySource::Generated,
                },
                Err(e) => {
                    log::warn!("Commentary fell back: {}", e);
                    Commentary::fallback(lang, fallback_line)
                }
            }
        };
        CommentaryTask::new(future.boxed_local())
    }

    fn start_call(
        &mut self,
        request: &CommentaryRequest,
    ) -> Result<LocalBoxFuture<'static, Result<String, CommentaryError>>, CommentaryError> {
        request.validate()?;
        let key = request.rate_limit_key();
        if !self.limiter.check(&key) {
            return Err(CommentaryError::RateLimited(key));
        }
        let backend = self.backend.as_ref().ok_or(CommentaryError::NoBackend)?;
        Ok(backend.generate(request))
    }
}

impl std::fmt::Debug for CommentaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentaryClient")
            .field("has_backend", &self.backend.is_some())
            .field("limiter", &self.limiter)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::rate_limit::tests::ManualClock;
    use futures::executor::block_on;
    use std::cell::Cell;

    /// Backend that answers immediately with fixed text
    struct Canned(Result<String, CommentaryError>, Rc<Cell<u32>>);

    impl CommentaryBackend for Canned {
        fn generate(&self, _request: &CommentaryRequest) -> LocalBoxFuture<'static, Result<String, CommentaryError>> {
            self.1.set(self.1.get() + 1);
            futures::future::ready(self.0.clone()).boxed_local()
        }
    }

    /// Backend that never answers
    struct Hung;

    impl CommentaryBackend for Hung {
        fn generate(&self, _request: &CommentaryRequest) -> LocalBoxFuture<'static, Result<String, CommentaryError>> {
            futures::future::pending().boxed_local()
        }
    }

    /// Timer that fires immediately
    struct Instant;

    impl Timer for Instant {
        fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
            futures::future::ready(()).boxed_local()
        }
    }

    /// Timer that never fires
    struct Never;

    impl Timer for Never {
        fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
            futures::future::pending().boxed_local()
        }
    }

    fn client(backend: Option<Rc<dyn CommentaryBackend>>, timer: Rc<dyn Timer>) -> CommentaryClient {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::default());
        CommentaryClient::new(
            backend,
            timer,
            RateLimiter::with_defaults(clock),
            COMMENTARY_TIMEOUT_MS,
            11,
        )
    }

    fn request(lang: Lang) -> CommentaryRequest {
        CommentaryRequest::new(300, 2, 4, lang)
    }

    #[test]
    fn test_generated_text_is_sanitized() {
        let calls = Rc::new(Cell::new(0));
        let backend = Canned(Ok("  <i>Weak</i> aim  ".to_string()), calls.clone());
        let mut client = client(Some(Rc::new(backend)), Rc::new(Never));

        let line = block_on(client.request(request(Lang::En))).unwrap();
        assert_eq!(line.text, "Weak aim");
        assert_eq!(line.source, CommentarySource::Generated);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_timeout_falls_back() {
        for lang in Lang::ALL {
            let mut client = client(Some(Rc::new(Hung)), Rc::new(Instant));
            let line = block_on(client.request(request(lang))).unwrap();
            assert_eq!(line.source, CommentarySource::Fallback);
            assert_eq!(line.lang, lang);
            assert!(!line.text.is_empty());
            assert!(fallback::lines(lang).contains(&line.text.as_str()));
        }
    }

    #[test]
    fn test_backend_error_falls_back() {
        let calls = Rc::new(Cell::new(0));
        let backend = Canned(Err(CommentaryError::Backend("quota".into())), calls);
        let mut client = client(Some(Rc::new(backend)), Rc::new(Never));

        let line = block_on(client.request(request(Lang::Hi))).unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
        assert!(fallback::lines(Lang::Hi).contains(&line.text.as_str()));
    }

    #[test]
    fn test_empty_output_falls_back() {
        let calls = Rc::new(Cell::new(0));
        let backend = Canned(Ok("<script>x()</script>".into()), calls);
        let mut client = client(Some(Rc::new(backend)), Rc::new(Never));

        let line = block_on(client.request(request(Lang::En))).unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
    }

    #[test]
    fn test_invalid_request_never_calls_out() {
        let calls = Rc::new(Cell::new(0));
        let backend = Canned(Ok("hi".into()), calls.clone());
        let mut client = client(Some(Rc::new(backend)), Rc::new(Never));

        let bad = CommentaryRequest::new(2_000_000, 0, 1, Lang::En);
        let line = block_on(client.request(bad)).unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_rate_limit_suppresses_call() {
        let calls = Rc::new(Cell::new(0));
        let backend = Canned(Ok("ok".into()), calls.clone());
        let mut client = client(Some(Rc::new(backend)), Rc::new(Never));

        for _ in 0..10 {
            let line = block_on(client.request(request(Lang::En))).unwrap();
            assert_eq!(line.source, CommentarySource::Generated);
        }
        let line = block_on(client.request(request(Lang::En))).unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
        assert_eq!(calls.get(), 10);
    }

    #[test]
    fn test_no_backend_falls_back() {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::default());
        let mut client = CommentaryClient::offline(clock, Rc::new(Never), 5);
        let line = block_on(client.request(request(Lang::Rj))).unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
    }

    #[test]
    fn test_abort_resolves_to_none() {
        let mut client = client(Some(Rc::new(Hung)), Rc::new(Never));
        let task = client.request(request(Lang::En));
        task.abort_handle().abort();
        assert_eq!(block_on(task), None);
    }
}
