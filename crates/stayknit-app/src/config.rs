//! Demo configuration from command-line arguments

/// Demo options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Document URL
    pub url: String,

    /// Messages shown one by one in the message list
    pub messages: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            messages: ["Hello", "Hi there", "Ahoy", "Howdy", "Greetings", "Salut"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AppConfig {
    /// `stayknit [URL] [MESSAGE...]`. Messages given here replace the defaults.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = Self::default();
        let mut args = args.into_iter();

        if let Some(url) = args.next() {
            config.url = url;
        }
        let messages: Vec<String> = args.collect();
        if !messages.is_empty() {
            config.messages = messages;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.messages.len(), 6);
    }

    #[test]
    fn test_url_only_keeps_default_messages() {
        let config = parse(&["https://example.com"]);
        assert_eq!(config.url, "https://example.com");
        assert_eq!(config.messages, AppConfig::default().messages);
    }

    #[test]
    fn test_url_and_messages() {
        let config = parse(&["https://example.com", "one", "two"]);
        assert_eq!(config.url, "https://example.com");
        assert_eq!(config.messages, vec!["one", "two"]);
    }
}
