//! Pure reply function
//!
//! Given the same utterance, state, time and random generator state, [`respond`]
//! always produces the same reply and the same new state.

use super::{classify, normalize, ConversationState, Intent, ReplyResult};
use chrono::NaiveDateTime;
use rand::Rng;

pub const FAREWELL_REPLY: &str = "Goodbye! Thanks for talking with me.";

pub const CAPABILITY_REPLY: &str = "I can greet you, tell you the time or today's date, \
     share a joke, and say goodbye when you're done. Anything else, I'll pass along to my \
     language model if one is connected.";

pub const FALLBACK_REPLY: &str = "I didn't catch that. Could you please say it another way?";

/// Greeting replies, sampled uniformly per greeting
pub const GREETINGS: &[&str] = &[
    "Hello! How can I help you today?",
    "Hi there! What can I do for you?",
    "Hey! Good to hear from you. What's on your mind?",
];

/// Jokes, sampled uniformly without repeating the previous one
pub const JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything.",
    "I told my computer I needed a break, and it said: no problem, I'll go to sleep.",
    "Why did the scarecrow win an award? Because he was outstanding in his field.",
    "What do you call a fake noodle? An impasta.",
    "Why do programmers prefer dark mode? Because light attracts bugs.",
];

/// Run one dialogue turn.
///
/// Never fails: empty, whitespace-only or control-character input classifies
/// as [`Intent::Unknown`]. A state that already has `should_exit` set is
/// answered like any other.
pub fn respond<R: Rng + ?Sized>(
    utterance: &str,
    state: ConversationState,
    now: NaiveDateTime,
    rng: &mut R,
) -> ReplyResult {
    let intent = classify(&normalize(utterance));
    let mut last_joke = state.last_joke;

    let reply = match intent {
        Intent::Farewell => FAREWELL_REPLY.to_string(),
        Intent::AskTime => format!("It's {} right now.", now.format("%-I:%M %p")),
        Intent::AskDate => format!("Today is {}.", now.format("%A, %B %-d, %Y")),
        Intent::AskJoke => {
            let index = pick_index(rng, JOKES.len(), state.last_joke);
            last_joke = Some(index);
            JOKES[index].to_string()
        }
        Intent::AskCapability => CAPABILITY_REPLY.to_string(),
        Intent::Greeting => GREETINGS[pick_index(rng, GREETINGS.len(), None)].to_string(),
        Intent::Unknown => FALLBACK_REPLY.to_string(),
    };

    let should_exit = intent == Intent::Farewell;
    let state = ConversationState {
        last_intent: Some(intent),
        turn_count: state.turn_count.saturating_add(1),
        should_exit,
        last_joke,
    };

    ReplyResult {
        reply,
        state,
        should_exit,
    }
}

/// Uniform index in `0..len`, skipping `avoid` when there is anything else to pick
fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize, avoid: Option<usize>) -> usize {
    match avoid {
        _ if len <= 1 => 0,
        Some(avoid) if avoid < len => {
            let index = rng.gen_range(0..len - 1);
            if index >= avoid {
                index + 1
            } else {
                index
            }
        }
        _ => rng.gen_range(0..len),
    }
}
