//! Required environment keys and how they are looked up

use std::collections::HashMap;

/// One environment key the fleet needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRequirement {
    pub key: String,
    pub description: String,
    /// Value must never be shown in full
    pub sensitive: bool,
}

impl ConfigRequirement {
    pub fn new(key: impl Into<String>, description: impl Into<String>, sensitive: bool) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            sensitive,
        }
    }
}

/// Credential catalog for the agent and voice pipeline
pub fn default_requirements() -> Vec<ConfigRequirement> {
    vec![
        ConfigRequirement::new("GROQ_API_KEY", "Groq API key for the conversational agent", true),
        ConfigRequirement::new("DEEPGRAM_API_KEY", "Deepgram API key for speech-to-text", true),
        ConfigRequirement::new("CARTESIA_API_KEY", "Cartesia API key for text-to-speech", true),
        ConfigRequirement::new("LIVEKIT_URL", "LiveKit server URL for voice transport", false),
        ConfigRequirement::new("LIVEKIT_API_KEY", "LiveKit API key", true),
        ConfigRequirement::new("LIVEKIT_API_SECRET", "LiveKit API secret", true),
    ]
}

/// Source of environment values
pub trait EnvSource {
    /// Returns the value of `key`, if set
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
