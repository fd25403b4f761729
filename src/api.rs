//! HTTP calls to the recording / segmentation service.
//!
//! Every JSON endpoint answers with `{success: bool, ...}` plus a payload or
//! an `error`/`message` string. Non-2xx status, unparseable JSON and
//! `success: false` all become `ApiError`.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use crate::codec::payload::{PayloadAccumulator, SpectrogramPayload};
use crate::config::Endpoints;
use crate::error::ApiError;
use crate::segments::edit::{BoundsBody, CreateBody};
use crate::types::{Segment, TimeRange, WaveformData};

#[derive(Debug, Deserialize)]
struct WaveformResponse {
    duration: f64,
    waveform: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct SegmentResponse {
    segment: Segment,
}

#[derive(Debug, Deserialize)]
struct SegmentsResponse {
    #[serde(default)]
    segments: Vec<Segment>,
}

/// Interpret a response body under the shared envelope.
pub fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    let ok_status = (200..300).contains(&status);
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) if !ok_status => return Err(ApiError::Status(status)),
        Err(e) => return Err(ApiError::Malformed(e)),
    };
    let success = value.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
    if !ok_status || !success {
        let message = ["error", "message"]
            .iter()
            .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string);
        return Err(match message {
            Some(m) => ApiError::Rejected(m),
            None if !ok_status => ApiError::Status(status),
            None => ApiError::Rejected("request rejected by server".to_string()),
        });
    }
    Ok(serde_json::from_value(value)?)
}

pub fn parse_waveform(status: u16, body: &str) -> Result<WaveformData, ApiError> {
    let resp: WaveformResponse = parse_envelope(status, body)?;
    Ok(WaveformData { samples: resp.waveform, duration_secs: resp.duration })
}

pub fn parse_segment(status: u16, body: &str) -> Result<Segment, ApiError> {
    parse_envelope::<SegmentResponse>(status, body).map(|r| r.segment)
}

pub fn parse_segments(status: u16, body: &str) -> Result<Vec<Segment>, ApiError> {
    parse_envelope::<SegmentsResponse>(status, body).map(|r| r.segments)
}

fn window() -> Result<web_sys::Window, ApiError> {
    web_sys::window().ok_or(ApiError::NoWindow)
}

async fn fetch_response(request: &web_sys::Request) -> Result<web_sys::Response, ApiError> {
    let resp_value = JsFuture::from(window()?.fetch_with_request(request))
        .await
        .map_err(ApiError::from_js)?;
    resp_value
        .dyn_into()
        .map_err(|_| ApiError::Network("response cast failed".to_string()))
}

/// Send a request and return `(status, body text)`.
async fn send(method: &str, url: &str, json_body: Option<String>) -> Result<(u16, String), ApiError> {
    let init = web_sys::RequestInit::new();
    init.set_method(method);
    if let Some(body) = &json_body {
        init.set_body(&wasm_bindgen::JsValue::from_str(body));
    }
    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(ApiError::from_js)?;
    if json_body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(ApiError::from_js)?;
    }

    let resp = fetch_response(&request).await?;
    let status = resp.status();
    let text = JsFuture::from(resp.text().map_err(ApiError::from_js)?)
        .await
        .map_err(ApiError::from_js)?;
    Ok((status, text.as_string().unwrap_or_default()))
}

pub async fn fetch_waveform(endpoints: &Endpoints) -> Result<WaveformData, ApiError> {
    let (status, body) = send("GET", &endpoints.waveform(), None).await?;
    parse_waveform(status, &body)
}

/// Stream the spectrogram payload, reporting progress after each chunk.
pub async fn fetch_spectrogram(
    endpoints: &Endpoints,
    on_progress: impl Fn(Option<f32>),
) -> Result<SpectrogramPayload, ApiError> {
    let request = web_sys::Request::new_with_str(&endpoints.spectrogram()).map_err(ApiError::from_js)?;
    let resp = fetch_response(&request).await?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    let expected_len = resp
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|v| v.trim().parse::<usize>().ok());
    let mut acc = PayloadAccumulator::new(expected_len);

    let Some(stream) = resp.body() else {
        // No streaming body (e.g. 204); decode whatever there is
        return Ok(acc.finish()?);
    };
    let reader: web_sys::ReadableStreamDefaultReader = stream
        .get_reader()
        .dyn_into()
        .map_err(|_| ApiError::Network("stream reader cast failed".to_string()))?;

    loop {
        let chunk = JsFuture::from(reader.read()).await.map_err(ApiError::from_js)?;
        let done = js_sys::Reflect::get(&chunk, &"done".into())
            .map_err(ApiError::from_js)?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&chunk, &"value".into()).map_err(ApiError::from_js)?;
        let bytes = js_sys::Uint8Array::new(&value);
        acc.push(&bytes.to_vec());
        on_progress(acc.progress());
    }

    log::info!("Spectrogram payload received: {} bytes", acc.received());
    Ok(acc.finish()?)
}

pub async fn create_segment(endpoints: &Endpoints, body: &CreateBody) -> Result<Segment, ApiError> {
    let json = serde_json::to_string(body)?;
    let (status, text) = send("POST", &endpoints.create_segment(), Some(json)).await?;
    parse_segment(status, &text)
}

pub async fn update_segment(endpoints: &Endpoints, id: i64, body: &BoundsBody) -> Result<Segment, ApiError> {
    let json = serde_json::to_string(body)?;
    let (status, text) = send("POST", &endpoints.update_segment(id), Some(json)).await?;
    parse_segment(status, &text)
}

pub async fn delete_segment(endpoints: &Endpoints, id: i64) -> Result<(), ApiError> {
    let (status, text) = send("POST", &endpoints.delete_segment(id), None).await?;
    parse_envelope::<IgnoredAny>(status, &text).map(|_| ())
}

pub async fn fetch_segments_in_range(endpoints: &Endpoints, range: TimeRange) -> Result<Vec<Segment>, ApiError> {
    let url = endpoints.segments_in_range(range.start, range.end);
    let (status, text) = send("GET", &url, None).await?;
    parse_segments(status, &text)
}
