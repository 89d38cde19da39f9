//! Event routing.
//!
//! The [`EventRouter`] maps every catalogued [`EventName`] to a route that
//! decodes the envelope body into the name's payload type and invokes the
//! handler. Routes start as no-ops; a bot overrides only the events it cares
//! about:
//!
//! ```rust,ignore
//! let router = EventRouter::builder()
//!     .on_ping(|event, _cancel| async move {
//!         tracing::info!(time = %event.event_time, "pong");
//!     })
//!     .on_message_created(|event, _cancel| async move {
//!         handle(event.message).await
//!     })
//!     .build();
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalogue::{EventName, default_routes};
use crate::envelope::Envelope;
use crate::error::{DispatchError, HandlerError};

// ============================================================================
// IntoHandlerResult - Handler return values
// ============================================================================

/// Converts a handler's return value into the router's result type.
pub trait IntoHandlerResult: Send {
    /// Performs the conversion.
    fn into_handler_result(self) -> Result<(), HandlerError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<HandlerError> + Send,
{
    fn into_handler_result(self) -> Result<(), HandlerError> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Routes
// ============================================================================

/// A decoded-and-invoked handler. Decoding happens synchronously so that a
/// bad body is reported before anything runs.
pub(crate) type RouteFn = Box<
    dyn Fn(Value, CancellationToken) -> Result<BoxFuture<'static, Result<(), HandlerError>>, serde_json::Error>
        + Send
        + Sync,
>;

type InitFn = Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

pub(crate) fn route_fn<P, F, Fut, R>(handler: F) -> RouteFn
where
    P: DeserializeOwned + Send + 'static,
    F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerResult,
{
    Box::new(move |body, cancel| {
        let payload: P = serde_json::from_value(body)?;
        let fut = handler(payload, cancel);
        Ok(Box::pin(async move { fut.await.into_handler_result() }))
    })
}

/// What [`EventRouter::dispatch`] did with an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The body decoded and the handler completed.
    Handled(EventName),
    /// The name is not catalogued. Logged and skipped.
    Unhandled,
}

// ============================================================================
// EventRouter
// ============================================================================

/// Immutable table from event name to handler.
pub struct EventRouter {
    routes: HashMap<EventName, RouteFn>,
    initialize: Option<InitFn>,
}

impl EventRouter {
    /// Creates a router where every event is a no-op.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a router.
    pub fn builder() -> EventRouterBuilder {
        EventRouterBuilder::new()
    }

    /// Runs the initialization hook, if one was set.
    pub async fn initialize(&self, cancel: &CancellationToken) -> Result<(), HandlerError> {
        match &self.initialize {
            Some(init) => init(cancel.clone()).await,
            None => Ok(()),
        }
    }

    /// Decodes and handles one envelope, awaiting the handler to completion.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Decode`] if the body does not fit the payload type.
    /// - [`DispatchError::Handler`] if the handler returned an error.
    pub async fn dispatch(
        &self,
        envelope: Envelope,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (name, request_id, body) = envelope.into_parts();

        let Some((event, route)) =
            EventName::from_wire(&name).and_then(|event| Some((event, self.routes.get(&event)?)))
        else {
            warn!(event = %name, request_id = ?request_id, "No handler for event, skipping");
            return Ok(DispatchOutcome::Unhandled);
        };

        debug!(event = %event, request_id = ?request_id, "Dispatching event");

        let handling = route(body, cancel.clone()).map_err(|source| DispatchError::Decode {
            event: event.as_str(),
            source,
        })?;
        handling.await.map_err(|source| DispatchError::Handler {
            event: event.as_str(),
            source,
        })?;

        Ok(DispatchOutcome::Handled(event))
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("routes", &self.routes.len())
            .field("has_initialize", &self.initialize.is_some())
            .finish()
    }
}

/// Builder for [`EventRouter`].
///
/// The typed `on_*` methods are generated from the event catalogue.
pub struct EventRouterBuilder {
    routes: HashMap<EventName, RouteFn>,
    initialize: Option<InitFn>,
}

impl EventRouterBuilder {
    fn new() -> Self {
        Self {
            routes: default_routes(),
            initialize: None,
        }
    }

    pub(crate) fn route(mut self, event: EventName, route: RouteFn) -> Self {
        self.routes.insert(event, route);
        self
    }

    /// Sets the hook run once before the first event is pulled.
    pub fn on_initialize<F, Fut, R>(mut self, hook: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        self.initialize = Some(Arc::new(move |cancel| {
            let fut = hook(cancel);
            Box::pin(async move { fut.await.into_handler_result() })
        }));
        self
    }

    /// Finishes the router.
    pub fn build(self) -> EventRouter {
        EventRouter {
            routes: self.routes,
            initialize: self.initialize,
        }
    }
}

impl Default for EventRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
