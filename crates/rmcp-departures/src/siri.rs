//! SIRI stop-monitoring payloads, as served by PRIM.
//!
//! PRIM (and the SIRI-Lite gateways in general) are loose about casing and
//! about whether a plural element is sent as an object or an array, so every
//! level here accepts both. Keys are looked up in order and the first one
//! holding something wins, which also copes with a payload carrying both
//! casings of the same key.

use serde_json::{Map, Value};
use thiserror::Error;

/// The envelope had a container where an object was required.
#[derive(Debug, Error)]
#[error("expected {0} to be an object")]
pub struct ShapeError(&'static str);

/// Where the visit list was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitSource {
    /// `Siri.ServiceDelivery.StopMonitoringDelivery[].MonitoredStopVisit`
    Nested,
    /// `MonitoredStopVisit` at the document root.
    TopLevel,
}

#[derive(Debug, Default)]
pub struct StopMonitoringResponse {
    root: Value,
}

/// First of `keys` whose value is neither null nor empty.
fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            _ => true,
        })
}

/// A single element stands for a one-element list.
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn expect_object<'a>(value: &'a Value, what: &'static str) -> Result<&'a Map<String, Value>, ShapeError> {
    value.as_object().ok_or(ShapeError(what))
}

impl StopMonitoringResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_str(body)?,
        })
    }

    /// Resolves the raw visit records, nested delivery first and the
    /// top-level list as fallback. `Ok(None)` when neither holds anything;
    /// a document that is not an object carries no visits.
    pub fn resolve_visits(&self) -> Result<Option<(VisitSource, Vec<&Value>)>, ShapeError> {
        let Some(root) = self.root.as_object() else {
            return Ok(None);
        };

        let nested = self.nested_visits(root)?;
        if !nested.is_empty() {
            return Ok(Some((VisitSource::Nested, nested)));
        }

        let top_level = lookup(root, &["MonitoredStopVisit", "monitoredStopVisit"])
            .map(one_or_many)
            .unwrap_or_default();

        Ok((!top_level.is_empty()).then_some((VisitSource::TopLevel, top_level)))
    }

    fn nested_visits<'a>(&self, root: &'a Map<String, Value>) -> Result<Vec<&'a Value>, ShapeError> {
        let Some(siri) = lookup(root, &["Siri"]) else {
            return Ok(Vec::new());
        };
        let siri = expect_object(siri, "Siri")?;

        let Some(delivery) = lookup(siri, &["ServiceDelivery", "serviceDelivery"]) else {
            return Ok(Vec::new());
        };
        let delivery = expect_object(delivery, "ServiceDelivery")?;

        let mut visits = Vec::new();
        if let Some(smds) = lookup(delivery, &["StopMonitoringDelivery", "stopMonitoringDelivery"]) {
            for smd in one_or_many(smds) {
                let smd = expect_object(smd, "StopMonitoringDelivery")?;
                if let Some(found) = lookup(smd, &["MonitoredStopVisit", "monitoredStopVisit"]) {
                    visits.extend(one_or_many(found));
                }
            }
        }
        Ok(visits)
    }
}

/// Destination identifier of a journey. Only an object's `value` / `#text`
/// or a bare string count; anything else never matches a filter.
fn destination_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(fields) => lookup(fields, &["value", "#text"])
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// The parts of a monitored stop visit the departure board cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopVisit {
    pub destination_ref: Option<String>,
    /// Empty when the visit carries no expected departure.
    pub expected_departure: String,
}

impl StopVisit {
    /// Extracts a visit from a raw `MonitoredStopVisit` element.
    ///
    /// When the element has no `MonitoredVehicleJourney`, the element itself
    /// is read as the journey. Non-object elements yield `None`.
    pub fn from_value(visit: &Value) -> Option<Self> {
        let visit = visit.as_object()?;
        let journey = lookup(visit, &["MonitoredVehicleJourney", "monitoredVehicleJourney"])
            .and_then(Value::as_object)
            .unwrap_or(visit);

        let destination_ref = lookup(journey, &["DestinationRef", "destinationRef", "Destination"])
            .and_then(destination_id);

        let expected_departure = lookup(journey, &["MonitoredCall", "monitoredCall"])
            .and_then(Value::as_object)
            .and_then(|call| lookup(call, &["ExpectedDepartureTime", "expectedDepartureTime"]))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            destination_ref,
            expected_departure,
        })
    }
}
