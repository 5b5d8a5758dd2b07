use std::time::Duration;

use chrono_tz::Tz;
use tracing::{debug, error, info};

use crate::config::{Config, MonitoringRequest};
use crate::departure::{render_board, DepartureTime};
use crate::error::PredictorError;
use crate::siri::{StopMonitoringResponse, StopVisit};

pub const NO_VISITS_MESSAGE: &str = "⚠️ No monitored visits found in API response.";

/// Longest slice of an error response body echoed back to the caller.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct DeparturePredictor {
    client: reqwest::Client,
    origin_name: String,
    destination_name: String,
    timezone: Tz,
    timeout: Duration,
}

impl DeparturePredictor {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin_name: config.origin_name.clone(),
            destination_name: config.destination_name.clone(),
            timezone: config.timezone,
            timeout: config.timeout,
        }
    }

    /// Fetches predictions for `request` and renders the departure board.
    ///
    /// Never fails: transport, status and payload errors come back as a
    /// one-line description.
    pub async fn get_next_departures(&self, request: &MonitoringRequest) -> String {
        match self.fetch(request).await {
            Ok(body) => self.report(&body, &request.destination_ref),
            Err(e) => e.to_string(),
        }
    }

    async fn fetch(&self, request: &MonitoringRequest) -> Result<String, PredictorError> {
        info!(url = %request.endpoint, "Requesting PRIM API");

        let response = self
            .client
            .get(&request.endpoint)
            .header("apikey", &request.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network/request error");
                PredictorError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "HTTP error from PRIM API");
            return Err(PredictorError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read PRIM response body");
            PredictorError::Transport(e)
        })
    }

    /// Renders the board for an already fetched response body.
    pub fn report(&self, body: &str, destination_ref: &str) -> String {
        match self.build_report(body, destination_ref) {
            Ok(report) => report,
            Err(e) => {
                error!(error = ?e, "Processing error");
                e.to_string()
            }
        }
    }

    fn build_report(&self, body: &str, destination_ref: &str) -> Result<String, PredictorError> {
        let response = StopMonitoringResponse::from_json(body)?;
        let Some((source, visits)) = response.resolve_visits()? else {
            return Ok(NO_VISITS_MESSAGE.to_string());
        };

        let mut departures: Vec<DepartureTime> = visits
            .iter()
            .filter_map(|visit| StopVisit::from_value(visit))
            .filter(|visit| visit.destination_ref.as_deref() == Some(destination_ref))
            .map(|visit| DepartureTime::parse(&visit.expected_departure, self.timezone))
            .collect();

        debug!(
            ?source,
            visits = visits.len(),
            matched = departures.len(),
            "Resolved monitored visits"
        );

        if departures.is_empty() {
            return Ok(format!(
                "⚠️ No upcoming departures to {} found.",
                self.destination_name
            ));
        }

        departures.sort();

        Ok(render_board(
            &self.origin_name,
            &self.destination_name,
            &departures,
            self.timezone,
        ))
    }
}
