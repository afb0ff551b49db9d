/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    Server,
    response::{HttpResponse, error_response, json_response, not_found, preflight_response},
};
use classifier::Label;
use http_body_util::BodyExt;
use hyper::{Method, Request, StatusCode, body::Incoming};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Label,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub text: String,
    pub label: Label,
}

impl Server {
    pub async fn route(&self, req: Request<Incoming>) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if method == Method::OPTIONS {
            return preflight_response();
        }

        match (&method, path.as_str()) {
            (&Method::GET, "/") => json_response(
                StatusCode::OK,
                &json!({"message": "Inbox Shield API is running"}),
            ),
            (&Method::POST, "/predict") | (&Method::POST, "/report") => {
                let body = match req.into_body().collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(err) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read request body: {err}"),
                        );
                    }
                };

                if path == "/predict" {
                    self.handle_predict(&body)
                } else {
                    self.handle_report(&body)
                }
            }
            _ => not_found(),
        }
    }

    fn handle_predict(&self, body: &[u8]) -> HttpResponse {
        let request = match serde_json::from_slice::<PredictRequest>(body) {
            Ok(request) => request,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
        };

        match self
            .inner
            .pipeline
            .predict(&request.text, &self.inner.model)
        {
            Ok(prediction) => json_response(
                StatusCode::OK,
                &PredictResponse {
                    prediction: prediction.label,
                    // Confidence is a sigmoid of the decision margin, not a
                    // calibrated probability.
                    confidence: round2(prediction.confidence),
                },
            ),
            Err(err) => {
                tracing::error!(error = %err, "prediction failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }

    fn handle_report(&self, body: &[u8]) -> HttpResponse {
        let request = match serde_json::from_slice::<ReportRequest>(body) {
            Ok(request) => request,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
        };

        let mut writer = self.inner.feedback.lock();
        if let Err(err) = writer
            .write_record([request.label.as_str(), request.text.as_str()])
            .and_then(|_| writer.flush().map_err(Into::into))
        {
            tracing::error!(error = %err, "failed to log feedback");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }

        json_response(
            StatusCode::OK,
            &json!({"message": "Feedback received. The sample will be used for retraining."}),
        )
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
