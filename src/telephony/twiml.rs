//! TwiML document builder

use std::fmt::Write;

pub const VOICE: &str = "Polly.Joanna";
pub const VOICE_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verb {
    Say(String),
    /// Collect speech and POST the transcript to `action`
    Gather { action: String },
    Redirect(String),
    Hangup,
}

/// A `<Response>` document built verb by verb
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Twiml {
    verbs: Vec<Verb>,
}

impl Twiml {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    #[must_use]
    pub fn gather(mut self, action: impl Into<String>) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.into(),
        });
        self
    }

    #[must_use]
    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect(url.into()));
        self
    }

    #[must_use]
    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn render(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            // Writing into a String cannot fail
            let _ = match verb {
                Verb::Say(text) => write!(
                    xml,
                    "<Say voice=\"{VOICE}\" language=\"{VOICE_LANGUAGE}\">{}</Say>",
                    escape(text)
                ),
                Verb::Gather { action } => write!(
                    xml,
                    "<Gather input=\"speech\" action=\"{}\" method=\"POST\" \
                     speechTimeout=\"auto\" language=\"{VOICE_LANGUAGE}\"/>",
                    escape(action)
                ),
                Verb::Redirect(url) => {
                    write!(xml, "<Redirect method=\"POST\">{}</Redirect>", escape(url))
                }
                Verb::Hangup => xml.write_str("<Hangup/>"),
            };
        }
        xml.push_str("</Response>");
        xml
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response() {
        assert_eq!(
            Twiml::new().render(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>"
        );
    }

    #[test]
    fn test_say_gather_redirect() {
        let xml = Twiml::new()
            .say("Hello!")
            .gather("https://example.test/twilio/gather")
            .say("Still there?")
            .redirect("https://example.test/twilio/listen")
            .render();

        assert!(xml.contains(
            "<Say voice=\"Polly.Joanna\" language=\"en-US\">Hello!</Say>\
             <Gather input=\"speech\" action=\"https://example.test/twilio/gather\" \
             method=\"POST\" speechTimeout=\"auto\" language=\"en-US\"/>"
        ));
        assert!(xml.ends_with(
            "<Redirect method=\"POST\">https://example.test/twilio/listen</Redirect></Response>"
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = Twiml::new()
            .say("Tom & Jerry say \"<hi>\" it's fine")
            .gather("https://x.test/g?a=1&b=2")
            .render();
        assert!(xml.contains("Tom &amp; Jerry say &quot;&lt;hi&gt;&quot; it&apos;s fine"));
        assert!(xml.contains("action=\"https://x.test/g?a=1&amp;b=2\""));
        assert!(!xml.contains("<hi>"));
    }

    #[test]
    fn test_hangup() {
        let xml = Twiml::new().say("Goodbye!").hangup().render();
        assert!(xml.ends_with("Goodbye!</Say><Hangup/></Response>"));
    }
}
