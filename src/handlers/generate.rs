use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics::{
    FRAGMENTS_RELAYED, REQUEST_TOTAL, STREAM_SETUP_LATENCY, THROTTLED_TOTAL, UPSTREAM_FAILURES,
};
use crate::models::GenerateRequest;
use crate::state::AppState;
use crate::{relay, template};

// Validate, consult the cooldown gate, then relay the upstream completion
// stream as `data: {"content": …}` records. Everything up to the first
// fragment can still fail into a JSON error response; after that the
// stream just ends.
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    REQUEST_TOTAL.inc();
    payload.validate()?;

    // gate is consulted only for well-formed requests, so an invalid
    // request cannot burn a caller's cooldown window
    let gate = state.throttle.check(None);
    if gate.limited {
        THROTTLED_TOTAL.inc();
        warn!(
            remaining_seconds = gate.remaining_seconds,
            "request rejected by cooldown gate"
        );
        return Err(ApiError::Throttled {
            remaining_seconds: gate.remaining_seconds,
        });
    }

    let start = Instant::now();
    let template = template::load(&state.template_path).await?;
    let prompt = template::build_prompt(&template, &payload.requirement);

    let upstream = match relay::open_stream(&state.client, &state.provider, &prompt).await {
        Ok(upstream) => upstream,
        Err(err) => {
            UPSTREAM_FAILURES.inc();
            return Err(ApiError::Upstream(err));
        }
    };
    STREAM_SETUP_LATENCY.observe(start.elapsed().as_secs_f64());
    info!(
        requirement_chars = payload.requirement.chars().count(),
        "streaming generated prompt"
    );

    let stream = relay::fragment_stream(upstream).map(|content| {
        FRAGMENTS_RELAYED.inc();
        Ok::<_, Infallible>(Event::default().data(json!({ "content": content }).to_string()))
    });
    Ok(Sse::new(stream))
}
