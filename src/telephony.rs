//! Twilio voice integration
//!
//! Twilio transcribes the caller's speech and posts it to our webhooks; we answer
//! with TwiML telling it what to say next. Outbound calls go through the Twilio
//! REST API.

mod client;
mod twiml;

pub use client::{TelephonyError, TwilioClient, TwilioConfig};
pub use twiml::{Twiml, VOICE, VOICE_LANGUAGE};
