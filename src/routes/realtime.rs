use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::response::AppError;
use crate::state::AppState;

static SSE_CONNECTION_COUNT: AtomicUsize = AtomicUsize::new(0);

struct SseGuard;
impl Drop for SseGuard {
    fn drop(&mut self) {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:id/events", get(sse_handler))
}

/// 推送某个会话的逐帧结果（`frame` 事件），会话结束或服务关闭时断开。
pub async fn sse_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut events = state.registry().subscribe(id).await?;

    let max_sse = state.config().sessions.max_sse_connections;
    let current = SSE_CONNECTION_COUNT.fetch_add(1, Ordering::SeqCst);
    if current >= max_sse {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests(
            "TOO_MANY_CONNECTIONS",
            "Too many SSE connections",
        ));
    }
    let guard = SseGuard;

    let mut shutdown_rx = state.shutdown_rx();
    tracing::debug!(session_id = %id, "sse subscriber attached");

    let stream = async_stream::stream! {
        let _guard = guard;
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(outcome) => {
                        if let Ok(json) = serde_json::to_string(&outcome) {
                            yield Ok(Event::default()
                                .event("frame")
                                .id(outcome.frame_index.to_string())
                                .data(json));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(session_id = %id, skipped, "sse subscriber lagged");
                    }
                    Err(RecvError::Closed) => {
                        yield Ok(Event::default().event("end").data(id.to_string()));
                        break;
                    }
                },
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
