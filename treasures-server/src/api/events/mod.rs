//! Change event stream
//!
//! `GET /api/events` streams every [`shared::ChangeEvent`] as a
//! server-sent event named `change`. A client that falls behind receives a
//! `resync` event and should reload everything.

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(stream))
}

async fn stream(State(state): State<ServerState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.receiver();
    let shutdown = state.shutdown.clone();
    tracing::debug!("Event stream opened");

    let events = futures::stream::unfold((rx, shutdown), |(mut rx, shutdown)| async move {
        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => return None,
                received = rx.recv() => received,
            };
            match received {
                Ok(change) => match Event::default().event("change").json_data(&change) {
                    Ok(event) => return Some((Ok(event), (rx, shutdown))),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode change event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event stream lagged");
                    let event = Event::default().event("resync").data(skipped.to_string());
                    return Some((Ok(event), (rx, shutdown)));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
