//! Rule-based dialogue responder
//!
//! Classifies an utterance into an [`Intent`] with an ordered keyword table and
//! maps it to a reply. [`respond`] is pure: the conversation state goes in by
//! value and comes back out, and the only sources of variation (wall-clock time
//! and joke/greeting sampling) are passed in by the caller.

mod clock;
mod intent;
mod respond;
mod state;

#[cfg(test)]
mod proptests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use intent::{classify, normalize, Intent};
pub use respond::{respond, CAPABILITY_REPLY, FALLBACK_REPLY, FAREWELL_REPLY, GREETINGS, JOKES};
pub use state::{ConversationState, ReplyResult};
