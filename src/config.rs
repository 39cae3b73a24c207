/// Feature-flag driven operating mode (spec.md §4.8 / §6): which of
/// publish-events and direct-triggers are active, plus a maintenance kill
/// switch for the categorization consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// publish on, direct triggers off.
    EventsOnly,
    /// publish on, direct triggers on — consumers and legacy path both run.
    Shadow,
    /// publish off, direct triggers on.
    Legacy,
    /// both off, testing only.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: std::net::SocketAddr,
    pub publish_events: bool,
    pub direct_triggers: bool,
    pub categorization_disabled: bool,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is not set".to_string())?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| format!("Invalid BIND_ADDR: {e}"))?;

        Ok(Self {
            database_url,
            bind_addr,
            publish_events: parse_bool_env("PUBLISH_EVENTS", true),
            direct_triggers: parse_bool_env("DIRECT_TRIGGERS", false),
            categorization_disabled: parse_bool_env("CATEGORIZATION_DISABLED", false),
            max_retries: std::env::var("MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }

    pub fn operating_mode(&self) -> OperatingMode {
        match (self.publish_events, self.direct_triggers) {
            (true, false) => OperatingMode::EventsOnly,
            (true, true) => OperatingMode::Shadow,
            (false, true) => OperatingMode::Legacy,
            (false, false) => OperatingMode::Disabled,
        }
    }
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operating_mode_matches_flag_combination() {
        let base = Config {
            database_url: "postgres://x".into(),
            bind_addr: "0.0.0.0:3000".parse().unwrap(),
            publish_events: true,
            direct_triggers: false,
            categorization_disabled: false,
            max_retries: 5,
        };
        assert_eq!(base.operating_mode(), OperatingMode::EventsOnly);

        let shadow = Config {
            direct_triggers: true,
            ..base.clone()
        };
        assert_eq!(shadow.operating_mode(), OperatingMode::Shadow);

        let legacy = Config {
            publish_events: false,
            direct_triggers: true,
            ..base.clone()
        };
        assert_eq!(legacy.operating_mode(), OperatingMode::Legacy);

        let disabled = Config {
            publish_events: false,
            direct_triggers: false,
            ..base
        };
        assert_eq!(disabled.operating_mode(), OperatingMode::Disabled);
    }
}
