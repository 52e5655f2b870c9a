//! Twilio REST client for outbound calls

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("Twilio request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Twilio rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected Twilio response: {0}")]
    MalformedResponse(String),
}

/// Twilio account settings
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Caller ID for outbound calls, E.164
    pub phone_number: String,
    pub api_base: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TwilioConfig {
    /// Returns `None` unless account SID, auth token and phone number are all set
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            account_sid: get("TWILIO_ACCOUNT_SID")?,
            auth_token: get("TWILIO_AUTH_TOKEN")?,
            phone_number: get("TWILIO_PHONE_NUMBER")?,
            api_base: get("TWILIO_API_BASE").unwrap_or_else(|| TWILIO_API_BASE.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: String,
}

pub struct TwilioClient {
    http: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, TelephonyError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn phone_number(&self) -> &str {
        &self.config.phone_number
    }

    /// Place a call to `to`. Twilio fetches TwiML from `twiml_url` once answered.
    ///
    /// Returns the call SID.
    pub async fn create_call(&self, to: &str, twiml_url: &str) -> Result<String, TelephonyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        );

        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.phone_number.as_str()),
                ("Url", twiml_url),
                ("Method", "POST"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TwilioErrorBody>(&body)
                .map_or(body, |error| error.message);
            return Err(TelephonyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let call: CallResource = serde_json::from_str(&body)
            .map_err(|e| TelephonyError::MalformedResponse(format!("{e}: {body}")))?;

        tracing::info!(call_sid = %call.sid, to, "Outbound call created");
        Ok(call.sid)
    }
}
