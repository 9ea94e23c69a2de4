use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use showtime_core::{SeatEvent, SeatEventKind};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/{show_id}/stream", get(show_stream))
}

fn event_name(kind: SeatEventKind) -> &'static str {
    match kind {
        SeatEventKind::Held => "seat_held",
        SeatEventKind::Confirmed => "seat_confirmed",
        SeatEventKind::Released => "seat_released",
    }
}

fn to_sse(event: &SeatEvent) -> Result<Event, axum::Error> {
    Event::default().event(event_name(event.kind)).json_data(event)
}

/// GET /api/shows/{show_id}/stream
/// Live seat availability changes for one show
async fn show_stream(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.engine.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.show_id == show_id => Some(to_sse(&event)),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(%show_id, skipped, "Seat stream subscriber lagging");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
