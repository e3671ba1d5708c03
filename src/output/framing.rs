//! Sentinel-framed JSON payloads
//!
//! Payloads are written on their own line between a start and an end marker
//! so a parent process can pick them out of otherwise free-form output.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::errors::{AnalysisError, Result};

/// Kind of framed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    AccountInfo,
    AnalysisResults,
}

impl Frame {
    pub fn start_marker(&self) -> &'static str {
        match self {
            Frame::AccountInfo => "ACCOUNT_INFO_JSON_START",
            Frame::AnalysisResults => "ANALYSIS_RESULTS_JSON_START",
        }
    }

    pub fn end_marker(&self) -> &'static str {
        match self {
            Frame::AccountInfo => "ACCOUNT_INFO_JSON_END",
            Frame::AnalysisResults => "ANALYSIS_RESULTS_JSON_END",
        }
    }
}

/// Serialize `value` as compact JSON wrapped in the frame's markers
pub fn frame_json<T: Serialize>(frame: Frame, value: &T) -> Result<String> {
    let payload = serde_json::to_string(value)?;
    Ok(format!(
        "{}\n{}\n{}",
        frame.start_marker(),
        payload,
        frame.end_marker()
    ))
}

/// Recover a framed value from mixed output
///
/// Returns `Ok(None)` when the markers are absent.
pub fn extract_framed<T: DeserializeOwned>(output: &str, frame: Frame) -> Result<Option<T>> {
    let Some(start) = output.find(frame.start_marker()) else {
        return Ok(None);
    };
    let body_start = start + frame.start_marker().len();
    let Some(body_len) = output[body_start..].find(frame.end_marker()) else {
        return Ok(None);
    };

    let body = output[body_start..body_start + body_len].trim();
    if body.is_empty() {
        return Err(AnalysisError::MalformedOutput(format!(
            "empty payload between {} and {}",
            frame.start_marker(),
            frame.end_marker()
        )));
    }

    Ok(Some(serde_json::from_str(body)?))
}
