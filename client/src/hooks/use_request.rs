use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::api_client::{APIClient, ClientError};
use crate::request::{RequestConfig, RequestKey};
use crate::state::ResultSnapshot;

/// Request hook return type
pub struct RequestHookReturn<T> {
    pub data: Option<T>,
    pub error: Option<ClientError>,
    pub loading: bool,
    pub invoke: Invoker<T>,
}

/// Tracks the state of one request against the backend.
///
/// The hook is associated with a path and a [`RequestConfig`]. Nothing is
/// sent until [`Invoker::invoke`] (or [`RequestHook::invoke_on_change`])
/// runs. Each invocation moves the shared [`ResultSnapshot`] to `Loading`
/// and then to `Success` or `Failure`.
///
/// Overlapping invocations are not de-duplicated: each one writes the
/// snapshot when it completes, so the last to finish wins.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() {
/// use std::rc::Rc;
/// use client::{APIClient, RequestConfig, RequestHook};
/// use payloads::Sensor;
///
/// let api_client = Rc::new(APIClient::new("http://localhost:8000"));
/// let mut hook =
///     RequestHook::<Vec<Sensor>>::new(api_client, "/", RequestConfig::get());
///
/// // Fires on the first call and again only when path or config change.
/// hook.invoke_on_change("/", RequestConfig::get()).await;
///
/// match hook.snapshot().data() {
///     Some(sensors) => println!("{} sensors", sensors.len()),
///     None => println!("no data"),
/// }
/// # }
/// ```
pub struct RequestHook<T> {
    client: Rc<APIClient>,
    state: Rc<RefCell<ResultSnapshot<T>>>,
    invoker: Invoker<T>,
    last_invoked: Option<RequestKey>,
}

impl<T> RequestHook<T> {
    pub fn new(
        client: Rc<APIClient>,
        path: &str,
        config: RequestConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(ResultSnapshot::Idle));
        let invoker = Invoker::new(client.clone(), state.clone(), path, config);
        Self {
            client,
            state,
            invoker,
            last_invoked: None,
        }
    }

    /// Re-associate the hook with `path` and `config`.
    ///
    /// Returns true if the request key changed, in which case a new
    /// invocation function replaces the old one. With an unchanged key
    /// the existing invocation function is kept, so clones handed out
    /// earlier still compare equal to [`RequestHook::invoker`].
    pub fn render(&mut self, path: &str, config: RequestConfig) -> bool {
        if self.invoker.matches(path, &config) {
            return false;
        }
        tracing::debug!(path, method = config.method(), "request changed");
        self.invoker =
            Invoker::new(self.client.clone(), self.state.clone(), path, config);
        true
    }

    /// The current invocation function.
    pub fn invoker(&self) -> Invoker<T> {
        self.invoker.clone()
    }

    pub fn key(&self) -> &RequestKey {
        self.invoker.key()
    }
}

impl<T: DeserializeOwned> RequestHook<T> {
    pub async fn invoke(&self) {
        self.invoker.invoke().await
    }

    /// Render with `path` and `config`, then invoke if the request key
    /// differs from the one last invoked through this method.
    ///
    /// Returns whether a request was issued.
    pub async fn invoke_on_change(
        &mut self,
        path: &str,
        config: RequestConfig,
    ) -> bool {
        self.render(path, config);
        if self.last_invoked.as_ref() == Some(self.invoker.key()) {
            return false;
        }
        self.last_invoked = Some(self.invoker.key().clone());
        self.invoker.invoke().await;
        true
    }
}

impl<T: Clone> RequestHook<T> {
    pub fn snapshot(&self) -> ResultSnapshot<T> {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> RequestHookReturn<T> {
        let snapshot = self.snapshot();
        RequestHookReturn {
            loading: snapshot.is_loading(),
            error: snapshot.error().cloned(),
            data: snapshot.data().cloned(),
            invoke: self.invoker(),
        }
    }
}

/// Invocation function of a [`RequestHook`].
///
/// Cheap to clone. Two invokers are equal only if they come from the same
/// render, i.e. the same path and configuration fingerprint.
pub struct Invoker<T> {
    inner: Rc<InvokerInner<T>>,
}

struct InvokerInner<T> {
    client: Rc<APIClient>,
    state: Rc<RefCell<ResultSnapshot<T>>>,
    key: RequestKey,
    config: RequestConfig,
}

impl<T> Invoker<T> {
    fn new(
        client: Rc<APIClient>,
        state: Rc<RefCell<ResultSnapshot<T>>>,
        path: &str,
        config: RequestConfig,
    ) -> Self {
        Self {
            inner: Rc::new(InvokerInner {
                client,
                state,
                key: RequestKey::new(path, &config),
                config,
            }),
        }
    }

    pub fn key(&self) -> &RequestKey {
        &self.inner.key
    }

    fn matches(&self, path: &str, config: &RequestConfig) -> bool {
        self.inner.key.path == path
            && self.inner.key.fingerprint == config.fingerprint()
    }
}

impl<T: DeserializeOwned> Invoker<T> {
    /// Run the request once and record its outcome.
    #[tracing::instrument(
        name = "invoke",
        skip(self),
        fields(path = %self.inner.key.path)
    )]
    pub async fn invoke(&self) {
        let inner = &self.inner;
        inner.state.replace(ResultSnapshot::Loading);

        let outcome =
            inner.client.request::<T>(&inner.key.path, &inner.config).await;
        if let Err(e) = &outcome {
            tracing::warn!("request failed: {e}");
        }

        inner.state.replace(outcome.into());
    }
}

impl<T> Clone for Invoker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PartialEq for Invoker<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> std::fmt::Debug for Invoker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker").field("key", &self.inner.key).finish()
    }
}
