pub mod config {
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        /// Directory holding the `tasks.json`, `sessions.json` and `notes.json` files.
        #[serde(default = "default_data_dir")]
        pub data_dir: PathBuf,
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
    }

    fn default_port() -> u16 {
        5000
    }

    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn can_fall_back_to_defaults() {
            let config: Config = serde_json::from_value(serde_json::json!({})).unwrap();

            assert_eq!(config.port, 5000);
            assert_eq!(config.data_dir, PathBuf::from("data"));
        }

        #[test]
        fn can_override_port_and_data_dir() {
            let config: Config = serde_json::from_value(
                serde_json::json!({"port": 8080, "data_dir": "/var/lib/study"}),
            )
            .unwrap();

            assert_eq!(config.port, 8080);
            assert_eq!(config.data_dir, PathBuf::from("/var/lib/study"));
        }
    }
}

pub mod note;
pub mod session;
pub mod storage;
pub mod task;
pub mod timestamp;
pub mod web;
