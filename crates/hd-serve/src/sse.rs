use crate::routes::with_helpdesk;
use crate::AppState;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, StreamExt};
use hd_core::RequestContext;
use hd_events::types::EventRecord;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

/// Replays stored events after `after`, then follows the live bus.
///
/// The live receiver is taken before history is read so nothing committed
/// in between is lost; duplicates are dropped by sequence number.
pub async fn subscribe(state: AppState, ctx: RequestContext, after: Option<i64>) -> Response {
    let receiver = state.event_bus.subscribe();
    let history = match with_helpdesk(&state, &ctx, |helpdesk| {
        helpdesk.events().list(&ctx, after, None)
    }) {
        Ok(events) => events,
        Err(response) => return response,
    };
    let high_water = history
        .last()
        .map(|event| event.seq)
        .or(after)
        .unwrap_or(0);
    tracing::debug!(
        correlation_id = ?ctx.correlation_id,
        replayed = history.len(),
        subscribers = state.event_bus.subscriber_count(),
        "event subscriber attached"
    );

    let history_stream = stream::iter(history.into_iter().map(to_sse));
    let live_stream = BroadcastStream::new(receiver).filter_map(move |item| async move {
        match item {
            Ok(event) if event.seq > high_water => Some(to_sse(event)),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "event subscriber lagged");
                None
            }
        }
    });

    Sse::new(history_stream.chain(live_stream))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn to_sse(event: EventRecord) -> Result<Event, Infallible> {
    let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().id(event.seq.to_string()).data(json))
}
