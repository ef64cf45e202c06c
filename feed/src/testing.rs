//! Local OHLC endpoint for exercising the client over a real socket.

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::routing::get;
use tokio::net::TcpListener;

pub(crate) type Params = HashMap<String, String>;

pub(crate) struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl Reply {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serves `GET /market/ohlc` with `respond(query)`; returns the base URL.
pub(crate) async fn serve_ohlc(respond: fn(&Params) -> Reply) -> String {
    let app = Router::new().route(
        "/market/ohlc",
        get(move |Query(params): Query<Params>| async move {
            let reply = respond(&params);
            tokio::time::sleep(reply.delay).await;
            (
                reply.status,
                [(header::CONTENT_TYPE, "application/json")],
                reply.body,
            )
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
