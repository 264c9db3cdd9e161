use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::auth::SessionUser;
use crate::AppState;

/// Comment heartbeats keep idle proxies from dropping the connection.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Real-time order event stream
///
/// Each bus event becomes a named SSE message (`ORDER_CREATED`,
/// `ORDER_UPDATED`, `ORDER_CLOSED`) whose data line is the JSON payload.
/// Filtering — admin-only display, ignoring the acting session's own
/// events — is the client's job; the gateway forwards everything.
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    summary = "Order event stream",
    description = "text/event-stream of order lifecycle events with 30s comment heartbeats",
    responses(
        (status = 200, description = "SSE stream opened"),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Notifications"
)]
pub async fn stream(
    State(state): State<AppState>,
    user: SessionUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(user_id = user.id, "notification stream opened");

    // Subscribing here ties the bus registration to the response stream:
    // when the client disconnects the stream drops and the receiver with it.
    let receiver = state.event_bus.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event.payload) {
                Ok(data) => Some(Ok(Event::default().event(event.kind.to_string()).data(data))),
                Err(err) => {
                    warn!(error = %err, "failed to serialize order event, skipping");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                // Slow consumer: drop the backlog, the client refetches on
                // the next event it does see.
                warn!(skipped, "notification subscriber lagged");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEPALIVE_INTERVAL)
            .text("heartbeat"),
    )
}
