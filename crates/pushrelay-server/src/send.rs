//! The `POST /send` handler.
//!
//! Pipeline per request: validate parameters → build the notification →
//! deliver (skipped for empty tokens) → classify → respond, count the
//! outcome, emit one structured log line. Each request runs the
//! pipeline exactly once; there is no retry and no shared state beyond
//! the outcome counters.

use std::collections::HashMap;

use axum::extract::{Form, FromRequest, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

use crate::router::AppState;
use pushrelay_core::{Notification, classify};

/// Return the named parameter or a ready-to-send 400 response.
///
/// An empty value counts as missing, matching form semantics where an
/// absent key and an empty key are indistinguishable.
fn require_param(params: &HashMap<String, String>, name: &str) -> Result<String, Response> {
    match params.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("missing param \"{name}\"\n"),
        )
            .into_response()),
    }
}

fn optional_param<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
    params.get(name).map_or("", String::as_str)
}

/// Whether the request asked for its log line at info severity.
///
/// The `debug` parameter is a request-scoped display knob, not a
/// logger setting: absent or `"0"` keeps the line at debug severity,
/// any other value raises it to info.
fn verbose_logging(params: &HashMap<String, String>) -> bool {
    !matches!(optional_param(params, "debug"), "" | "0")
}

/// Merge query parameters and form body into one map.
///
/// Form values win on key collision, matching the precedence of the
/// usual form-value lookup in HTTP frameworks.
fn merge_params(
    query: HashMap<String, String>,
    form: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = query;
    params.extend(form);
    params
}

/// Handle `POST /send`.
///
/// Parameters are read from the query string and the form-encoded
/// body; a request lacking either (or both) still parses, with form
/// values taking precedence.
pub async fn handle_send(State(state): State<AppState>, req: Request) -> Response {
    let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();
    let form = Form::<HashMap<String, String>>::from_request(req, &())
        .await
        .map(|Form(f)| f)
        .unwrap_or_default();
    let params = merge_params(query, form);

    // Validating: abort before the builder on a missing required param.
    let title = match require_param(&params, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match require_param(&params, "body") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let token = optional_param(&params, "token");
    let username = optional_param(&params, "username");
    let kind = optional_param(&params, "type");

    if !kind.is_empty() && !state.channels.contains(kind) {
        return (
            StatusCode::BAD_REQUEST,
            format!("invalid type \"{kind}\": must be one of {}\n", state.channels),
        )
            .into_response();
    }

    // Building.
    let notification = Notification::new(&title, &body, token, kind, username);

    // Delivering: an empty token never reaches the backend; the
    // EmptyToken outcome is synthesized so operators can count
    // recipients without a registered device.
    let delivery = if token.is_empty() {
        None
    } else {
        Some(state.deliverer.deliver(&notification).await)
    };

    // Classifying.
    let (receipt, delivery_err) = match delivery {
        Some(Ok(receipt)) => (Some(receipt), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };
    let (outcome, status) = classify(token, delivery_err.as_ref());

    // Responding: receipt on success, status and error text otherwise.
    let response_body = match (&receipt, &delivery_err) {
        (Some(receipt), _) => format!("{receipt}\n"),
        (None, Some(err)) => format!("{status}: {err}\n"),
        (None, None) => format!("{status}: empty token\n"),
    };

    state.outcomes.record(outcome);

    // One log line per request, at the severity the request asked for.
    if verbose_logging(&params) {
        info!(
            method = "POST",
            path = "/send",
            outcome = %outcome,
            status,
            username,
            title = %title,
            notification_type = kind,
            has_body = !body.is_empty(),
            has_token = !token.is_empty(),
            "notification processed"
        );
    } else {
        debug!(
            method = "POST",
            path = "/send",
            outcome = %outcome,
            status,
            username,
            title = %title,
            notification_type = kind,
            has_body = !body.is_empty(),
            has_token = !token.is_empty(),
            "notification processed"
        );
    }

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, response_body).into_response()
}
