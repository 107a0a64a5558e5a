use crate::bridge::model::{parse_event_count, AnalyzeRequest, ErrorBody, HealthReport};
use crate::workflow::runner::Runner;
use anyhow::Context;
use log::{error, info, warn};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const BODY_LIMIT: u64 = 16 * 1024;

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: message.into(),
        }),
        status,
    )
    .into_response()
}

async fn analyze_events(
    request: AnalyzeRequest,
    runner: Arc<Runner>,
) -> Result<Response, Rejection> {
    let count = match parse_event_count(request.num_events.as_ref(), runner.max_events()) {
        Ok(count) => count,
        Err(err) => {
            warn!("rejected analyze_events request: {}", err);
            return Ok(error_reply(StatusCode::BAD_REQUEST, err.to_string()));
        }
    };

    info!("analyzing {} events", count);
    // The batch issues blocking HTTP calls; keep it off the reactor.
    match tokio::task::spawn_blocking(move || runner.run_batch(count)).await {
        Ok(rows) => Ok(warp::reply::json(&rows).into_response()),
        Err(err) => {
            error!("batch task failed: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "batch processing failed",
            ))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(cause) = err.find::<BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid request body: {}", cause),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body too large".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "content-length required".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected application/json".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };
    Ok(error_reply(status, message))
}

/// HTTP surface for batch classification.
pub struct HttpBridge {
    runner: Arc<Runner>,
    model: String,
}

impl HttpBridge {
    pub fn new(runner: Arc<Runner>, model: impl Into<String>) -> Self {
        Self {
            runner,
            model: model.into(),
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let analyze_route = warp::path("analyze_events")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(BODY_LIMIT))
            .and(warp::body::json())
            .and(runner_filter.clone())
            .and_then(analyze_events);

        let model = self.model.clone();
        let health_route = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(runner_filter)
            .map(move |runner: Arc<Runner>| {
                warp::reply::json(&HealthReport {
                    status: "ok",
                    model: model.clone(),
                    layout: runner.layout().to_string(),
                    metrics: runner.metrics(),
                })
            });

        analyze_route.or(health_route).recover(handle_rejection)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding HTTP bridge to {}", addr))?;
        info!("HTTP bridge listening on http://{}", bound);
        server.await;
        info!("HTTP bridge stopped");
        Ok(())
    }
}
