/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use hyper::{
    Response, StatusCode,
    body::Bytes,
    header::{CONTENT_TYPE, HeaderValue},
};
use http_body_util::Full;
use serde::Serialize;

pub type HttpResponse = Response<Full<Bytes>>;

// Every response carries permissive CORS headers so that browser clients
// on any origin can call the API directly.
fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("*"),
    );
    response
}

pub fn json_response(status: StatusCode, body: &impl Serialize) -> HttpResponse {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    with_cors(
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Full::new(Bytes::from(bytes)))
            .unwrap_or_default(),
    )
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

pub fn error_response(status: StatusCode, detail: impl Into<String>) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            detail: detail.into(),
        },
    )
}

pub fn preflight_response() -> HttpResponse {
    with_cors(
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Full::new(Bytes::new()))
            .unwrap_or_default(),
    )
}

pub fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
