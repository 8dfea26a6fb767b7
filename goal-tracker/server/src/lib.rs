pub mod config {
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Bearer credential for the completion notification channel.
        #[serde(default)]
        pub slack_api: Option<String>,
        #[serde(default = "default_slack_channel")]
        pub slack_channel: String,
        #[serde(default = "default_slack_endpoint")]
        pub slack_endpoint: String,
        #[serde(default = "default_notification_timeout_secs")]
        pub notification_timeout_secs: u64,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Upper bound for delivering a single notification.
        pub fn notification_timeout(&self) -> Duration {
            Duration::from_secs(self.notification_timeout_secs)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_slack_channel() -> String {
        "C05769EL4RF".to_string()
    }

    fn default_slack_endpoint() -> String {
        "https://slack.com/api/chat.postMessage".to_string()
    }

    fn default_notification_timeout_secs() -> u64 {
        5
    }

}
pub mod entities;
pub mod goal;
pub mod notification;
pub mod record;
pub mod task;
pub mod web;
