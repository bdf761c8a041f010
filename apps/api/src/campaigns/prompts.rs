// Campaign script prompt templates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptChannel {
    Whatsapp,
    Voice,
}

pub const WHATSAPP_SCRIPT_PROMPT: &str = "Generate a professional WhatsApp message template \
for college admission outreach. The message should be personalized, engaging, and encourage \
prospective students to learn more about our programs. Include placeholders for {name}, \
{course}, and {college_name}. Keep it under 160 characters.";

pub const VOICE_SCRIPT_PROMPT: &str = "Generate a professional voice call script for college \
admission outreach. The script should be conversational, welcoming, and informative. Include \
placeholders for {name}, {course}, and {college_name}. The script should be around 30-45 \
seconds when spoken.";

pub fn script_prompt(channel: ScriptChannel) -> &'static str {
    match channel {
        ScriptChannel::Whatsapp => WHATSAPP_SCRIPT_PROMPT,
        ScriptChannel::Voice => VOICE_SCRIPT_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_placeholders() {
        for channel in [ScriptChannel::Whatsapp, ScriptChannel::Voice] {
            let prompt = script_prompt(channel);
            for placeholder in ["{name}", "{course}", "{college_name}"] {
                assert!(prompt.contains(placeholder), "{channel:?} missing {placeholder}");
            }
        }
    }

    #[test]
    fn test_whatsapp_prompt_limits_length() {
        assert!(script_prompt(ScriptChannel::Whatsapp).contains("160 characters"));
        assert!(script_prompt(ScriptChannel::Voice).contains("30-45 seconds"));
    }
}
