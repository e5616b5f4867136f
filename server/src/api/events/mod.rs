//! 资源变更推送 (SSE)
//!
//! 把同步总线上的 [`shared::SyncPayload`] 转成 Server-Sent Events。
//! 客户端订阅后即可在预订/时段/菜单变更时实时刷新视图。

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use tokio::sync::broadcast;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(stream))
}

/// GET /api/events - 订阅资源变更
///
/// 每条消息的 event 名为资源类型，data 为 SyncPayload JSON。
/// 慢速订阅者丢失的消息只记日志，不中断流。
async fn stream(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sync_bus.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(payload) => {
                    match Event::default()
                        .event(payload.resource.clone())
                        .json_data(&payload)
                    {
                        Ok(event) => return Some((Ok(event), rx)),
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to encode sync event");
                            continue;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged behind sync bus");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
