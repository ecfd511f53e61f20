//! Client-side view controller for the quote page.
//!
//! Owns the view state bundle and sequences the two proxy calls. Overlapping
//! fetches are neither cancelled nor queued; instead every issued fetch takes
//! a monotonically increasing ticket and a completion is applied only while
//! its ticket is still the newest issued one, so a stale response can never
//! overwrite a newer one.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::constants::{IMAGE_FETCH_FAILED, NO_QUOTE_FOUND, QUOTE_FETCH_FAILED};
use crate::error::QuoteCardError;
use crate::theme::Theme;

/// Where the quote request currently stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// A generate call is outstanding.
    Loading,
    /// The last generate call produced a quote.
    Success,
    /// The last generate call failed.
    Error,
}

/// The in-memory bundle of quote, loading, error, theme and background image
/// held by the view.
#[derive(Clone, Debug)]
pub struct ViewState {
    /// The current quote, if any.
    pub quote: Option<String>,
    /// True while a generate call is outstanding.
    pub loading: bool,
    /// True when the last generate call failed.
    pub error: bool,
    /// Currently selected theme.
    pub theme: Theme,
    /// Background image URL for the current theme, if any.
    pub background_url: Option<String>,
}

impl ViewState {
    fn new(theme: Theme) -> Self {
        Self {
            quote: None,
            loading: false,
            error: false,
            theme,
            background_url: None,
        }
    }

    /// Collapses the flags into the view phase.
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error {
            Phase::Error
        } else if self.quote.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }
}

/// The two calls the view makes against the proxy endpoints.
pub trait QuoteApi: Clone + Send + Sync + 'static {
    /// Asks the quote proxy for a quote; yields the raw `quote` field.
    fn generate_quote(
        &self,
        prompt: String,
    ) -> impl Future<Output = Result<Option<String>, QuoteCardError>> + Send;

    /// Asks the image proxy for a background URL for the theme.
    fn theme_image(
        &self,
        theme: Theme,
    ) -> impl Future<Output = Result<Option<String>, QuoteCardError>> + Send;
}

/// Client orchestrator: owns the shared view state and sequences the proxy
/// calls against it.
#[derive(Clone)]
pub struct QuoteView<C: QuoteApi> {
    api: C,
    state: Arc<RwLock<ViewState>>,
    quote_seq: Arc<AtomicU64>,
    image_seq: Arc<AtomicU64>,
}

impl<C: QuoteApi> QuoteView<C> {
    /// Creates a view over the given API, starting idle on `theme`. The first
    /// background fetch happens on the first [`QuoteView::set_theme`] or
    /// [`QuoteView::refresh_background`] call.
    pub fn new(api: C, theme: Theme) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ViewState::new(theme))),
            quote_seq: Arc::new(AtomicU64::new(0)),
            image_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of the current view state.
    pub async fn state(&self) -> ViewState {
        self.state.read().await.clone()
    }

    /// Selects a theme and spawns a background-image refresh for it,
    /// fire-and-forget. Quote state is left alone.
    pub async fn set_theme(&self, theme: Theme) {
        self.state.write().await.theme = theme;
        let view = self.clone();
        tokio::spawn(async move { view.refresh_background().await });
    }

    /// Fetches the background image URL for the current theme. The result is
    /// applied only while no newer refresh has been issued; a failed fetch
    /// leaves the previous background untouched.
    pub async fn refresh_background(&self) {
        let ticket = self.image_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let theme = self.state.read().await.theme;

        match self.api.theme_image(theme).await {
            Ok(url) => {
                if self.image_seq.load(Ordering::SeqCst) == ticket {
                    self.state.write().await.background_url = url;
                } else {
                    debug!("Discarding stale background response for {theme}");
                }
            }
            Err(err) => error!("Error fetching background image: {err}"),
        }
    }

    /// Requests a quote for the current theme. A call made while another is
    /// already loading is a no-op; a response from a superseded call is
    /// discarded without touching any state.
    pub async fn generate(&self) {
        let (ticket, prompt) = {
            let mut state = self.state.write().await;
            if state.loading {
                return;
            }
            state.loading = true;
            state.error = false;
            state.quote = None;
            let ticket = self.quote_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, state.theme.prompt())
        };

        let result = self.api.generate_quote(prompt).await;

        if self.quote_seq.load(Ordering::SeqCst) != ticket {
            debug!("Discarding stale quote response");
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(quote) => {
                state.quote = Some(match quote {
                    Some(text) if !text.is_empty() => text,
                    _ => NO_QUOTE_FOUND.to_string(),
                });
            }
            Err(err) => {
                error!("Error fetching quote: {err}");
                state.error = true;
            }
        }
        state.loading = false;
    }
}

/// Calls the proxy endpoints over HTTP, the way the quote page does.
#[derive(Clone, Debug)]
pub struct ProxyClient {
    http: reqwest::Client,
    base: String,
}

impl ProxyClient {
    /// Points the client at a running proxy server, e.g.
    /// `http://127.0.0.1:9000`.
    pub fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl QuoteApi for ProxyClient {
    async fn generate_quote(&self, prompt: String) -> Result<Option<String>, QuoteCardError> {
        let response = self
            .http
            .post(format!("{}/api/quote", self.base))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|err| QuoteCardError::internal(QUOTE_FETCH_FAILED, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteCardError::internal(
                QUOTE_FETCH_FAILED,
                format!("quote proxy returned {status}"),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| QuoteCardError::internal(QUOTE_FETCH_FAILED, err.to_string()))?;

        Ok(body.get("quote").and_then(Value::as_str).map(str::to_string))
    }

    async fn theme_image(&self, theme: Theme) -> Result<Option<String>, QuoteCardError> {
        let response = self
            .http
            .post(format!("{}/api/theme-image", self.base))
            .json(&json!({ "theme": theme.label() }))
            .send()
            .await
            .map_err(|err| QuoteCardError::internal(IMAGE_FETCH_FAILED, err.to_string()))?;

        // The page never checked this response's status; an error body simply
        // carries no image URL.
        let body: Value = response
            .json()
            .await
            .map_err(|err| QuoteCardError::internal(IMAGE_FETCH_FAILED, err.to_string()))?;

        Ok(body
            .get("imageUrl")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Semaphore;

    /// One scripted reply: whether to wait for a permit first, and what to
    /// answer.
    type Scripted = (bool, Result<Option<String>, QuoteCardError>);

    #[derive(Clone, Default)]
    struct StubApi {
        inner: Arc<StubInner>,
    }

    struct StubInner {
        quote_calls: AtomicUsize,
        image_calls: AtomicUsize,
        quote_replies: Mutex<VecDeque<Scripted>>,
        image_replies: Mutex<VecDeque<Scripted>>,
        gate: Semaphore,
    }

    impl Default for StubInner {
        fn default() -> Self {
            Self {
                quote_calls: AtomicUsize::default(),
                image_calls: AtomicUsize::default(),
                quote_replies: Mutex::default(),
                image_replies: Mutex::default(),
                gate: Semaphore::new(0),
            }
        }
    }

    impl StubApi {
        fn quote_reply(&self, gated: bool, reply: Result<Option<String>, QuoteCardError>) {
            self.inner
                .quote_replies
                .lock()
                .expect("lock quote replies")
                .push_back((gated, reply));
        }

        fn image_reply(&self, gated: bool, reply: Result<Option<String>, QuoteCardError>) {
            self.inner
                .image_replies
                .lock()
                .expect("lock image replies")
                .push_back((gated, reply));
        }

        fn open_gate(&self) {
            self.inner.gate.add_permits(1);
        }

        fn quote_calls(&self) -> usize {
            self.inner.quote_calls.load(Ordering::SeqCst)
        }

        fn image_calls(&self) -> usize {
            self.inner.image_calls.load(Ordering::SeqCst)
        }

        fn answer(&self, replies: &Mutex<VecDeque<Scripted>>) -> Scripted {
            replies
                .lock()
                .expect("lock replies")
                .pop_front()
                .expect("scripted reply available")
        }
    }

    impl QuoteApi for StubApi {
        async fn generate_quote(&self, _prompt: String) -> Result<Option<String>, QuoteCardError> {
            self.inner.quote_calls.fetch_add(1, Ordering::SeqCst);
            let (gated, reply) = self.answer(&self.inner.quote_replies);
            if gated {
                let permit = self.inner.gate.acquire().await.expect("gate open");
                permit.forget();
            }
            reply
        }

        async fn theme_image(&self, _theme: Theme) -> Result<Option<String>, QuoteCardError> {
            self.inner.image_calls.fetch_add(1, Ordering::SeqCst);
            let (gated, reply) = self.answer(&self.inner.image_replies);
            if gated {
                let permit = self.inner.gate.acquire().await.expect("gate open");
                permit.forget();
            }
            reply
        }
    }

    async fn wait_until<F, Fut>(check: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..200 {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn generate_success_enters_success_state() {
        let api = StubApi::default();
        api.quote_reply(false, Ok(Some("Love is patient.".to_string())));
        let view = QuoteView::new(api, Theme::Love);

        view.generate().await;

        let state = view.state().await;
        assert_eq!(state.quote.as_deref(), Some("Love is patient."));
        assert!(!state.loading);
        assert!(!state.error);
        assert_eq!(state.phase(), Phase::Success);
    }

    #[tokio::test]
    async fn generate_failure_enters_error_state() {
        let api = StubApi::default();
        api.quote_reply(
            false,
            Err(QuoteCardError::internal(QUOTE_FETCH_FAILED, "boom")),
        );
        let view = QuoteView::new(api, Theme::Business);

        view.generate().await;

        let state = view.state().await;
        assert_eq!(state.quote, None);
        assert!(state.error);
        assert!(!state.loading);
        assert_eq!(state.phase(), Phase::Error);
    }

    #[tokio::test]
    async fn empty_quote_falls_back_to_placeholder() {
        let api = StubApi::default();
        api.quote_reply(false, Ok(Some(String::new())));
        api.quote_reply(false, Ok(None));
        let view = QuoteView::new(api.clone(), Theme::Humour);

        view.generate().await;
        assert_eq!(view.state().await.quote.as_deref(), Some(NO_QUOTE_FOUND));

        view.generate().await;
        assert_eq!(view.state().await.quote.as_deref(), Some(NO_QUOTE_FOUND));
        assert_eq!(api.quote_calls(), 2);
    }

    #[tokio::test]
    async fn generate_while_loading_is_a_no_op() {
        let api = StubApi::default();
        api.quote_reply(true, Ok(Some("slow quote".to_string())));
        let view = QuoteView::new(api.clone(), Theme::Motivational);

        let pending = {
            let view = view.clone();
            tokio::spawn(async move { view.generate().await })
        };
        wait_until(|| async { api.quote_calls() == 1 }).await;
        assert_eq!(view.state().await.phase(), Phase::Loading);

        // Second trigger while the first is still in flight.
        view.generate().await;
        assert_eq!(api.quote_calls(), 1);

        api.open_gate();
        pending.await.expect("first generate finishes");
        assert_eq!(view.state().await.quote.as_deref(), Some("slow quote"));
    }

    #[tokio::test]
    async fn theme_change_refreshes_background_without_touching_quote() {
        let api = StubApi::default();
        api.quote_reply(false, Ok(Some("stay put".to_string())));
        api.image_reply(false, Ok(Some("https://example.com/love.jpg".to_string())));
        let view = QuoteView::new(api.clone(), Theme::Inspirational);

        view.generate().await;
        view.set_theme(Theme::Love).await;
        wait_until(|| async { view.state().await.background_url.is_some() }).await;

        let state = view.state().await;
        assert_eq!(state.theme, Theme::Love);
        assert_eq!(
            state.background_url.as_deref(),
            Some("https://example.com/love.jpg")
        );
        assert_eq!(state.quote.as_deref(), Some("stay put"));
        assert!(!state.error);
    }

    #[tokio::test]
    async fn background_failure_keeps_previous_url() {
        let api = StubApi::default();
        api.image_reply(false, Ok(Some("https://example.com/old.jpg".to_string())));
        api.image_reply(
            false,
            Err(QuoteCardError::internal(IMAGE_FETCH_FAILED, "down")),
        );
        let view = QuoteView::new(api, Theme::Business);

        view.refresh_background().await;
        view.refresh_background().await;

        let state = view.state().await;
        assert_eq!(
            state.background_url.as_deref(),
            Some("https://example.com/old.jpg")
        );
        assert!(!state.error);
    }

    #[tokio::test]
    async fn stale_background_response_is_discarded() {
        let api = StubApi::default();
        api.image_reply(true, Ok(Some("https://example.com/stale.jpg".to_string())));
        api.image_reply(false, Ok(Some("https://example.com/fresh.jpg".to_string())));
        let view = QuoteView::new(api.clone(), Theme::Love);

        let stale = {
            let view = view.clone();
            tokio::spawn(async move { view.refresh_background().await })
        };
        wait_until(|| async { api.image_calls() == 1 }).await;

        // A newer refresh completes while the first is still blocked.
        view.refresh_background().await;
        assert_eq!(
            view.state().await.background_url.as_deref(),
            Some("https://example.com/fresh.jpg")
        );

        api.open_gate();
        stale.await.expect("stale refresh finishes");
        assert_eq!(
            view.state().await.background_url.as_deref(),
            Some("https://example.com/fresh.jpg")
        );
    }
}
