//! Voice Agent - keyword dialogue agent for browser speech and phone calls
//!
//! A pure rules engine answers greetings, time, date, jokes and farewells.
//! Anything it does not recognise can be handed to an OpenAI-compatible
//! model, and the same agent answers Twilio voice webhooks.

pub mod agent;
pub mod api;
pub mod config;
pub mod dialogue;
pub mod llm;
pub mod telephony;
