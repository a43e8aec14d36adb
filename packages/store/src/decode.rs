//! Decoders from raw server JSON to [`Report`] values.
//!
//! Every field goes through the validators in [`pothole_map_validation`].
//! Decoding is all-or-nothing: the first invalid field aborts the record,
//! and the first invalid record aborts the batch.

use pothole_map_api::WireContract;
use pothole_map_report_models::Report;
use pothole_map_validation::{
    ValidationError, expect_array, expect_boolean, expect_date, expect_number, expect_string,
    expect_uuid, optional,
};
use serde_json::Value;

use crate::FieldNaming;

/// Decoded body of a query response.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Reports in response order.
    pub reports: Vec<Report>,
    /// Whether the server dropped matches because of the limit.
    pub truncated: bool,
}

/// Decodes a `[lat, lng]` pair.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is not an array or either of
/// its first two elements is not a number.
pub fn decode_coordinates(value: &Value) -> Result<[f64; 2], ValidationError> {
    let items = expect_array(value)?;
    let at = |i: usize| items.get(i).unwrap_or(&Value::Null);
    let lat = expect_number(at(0)).map_err(|e| e.at(0))?;
    let lng = expect_number(at(1)).map_err(|e| e.at(1))?;
    Ok([lat, lng])
}

/// Decodes a single report object.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first invalid field, with the
/// field name prefixed to its message.
pub fn decode_report(value: &Value, naming: FieldNaming) -> Result<Report, ValidationError> {
    let device_key = naming.device_name();
    let photo_key = naming.photo_url();

    Ok(Report {
        id: expect_uuid(&value["id"]).map_err(|e| e.at("id"))?,
        device_name: expect_string(&value[device_key]).map_err(|e| e.at(device_key))?,
        timestamp: expect_date(&value["timestamp"]).map_err(|e| e.at("timestamp"))?,
        confidence: expect_number(&value["confidence"]).map_err(|e| e.at("confidence"))?,
        coordinates: decode_coordinates(&value["coordinates"]).map_err(|e| e.at("coordinates"))?,
        photo_url: optional(&value[photo_key], expect_string).map_err(|e| e.at(photo_key))?,
    })
}

/// Decodes an array of report objects.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is not an array or any element
/// fails [`decode_report`]; the element index is prefixed to the message.
pub fn decode_reports(value: &Value, naming: FieldNaming) -> Result<Vec<Report>, ValidationError> {
    expect_array(value)?
        .iter()
        .enumerate()
        .map(|(i, item)| decode_report(item, naming).map_err(|e| e.at(format!("[{i}]"))))
        .collect()
}

/// Decodes a query response body according to the wire contract.
///
/// # Errors
///
/// Returns [`ValidationError`] if the body does not have the shape the
/// contract prescribes or any report is invalid.
pub fn decode_query_response(
    value: &Value,
    contract: WireContract,
    naming: FieldNaming,
) -> Result<QueryResponse, ValidationError> {
    match contract {
        WireContract::Post => Ok(QueryResponse {
            reports: decode_reports(&value["potholes"], naming).map_err(|e| e.at("potholes"))?,
            truncated: expect_boolean(&value["truncated"]).map_err(|e| e.at("truncated"))?,
        }),
        WireContract::Get => Ok(QueryResponse {
            reports: decode_reports(value, naming)?,
            truncated: false,
        }),
    }
}
