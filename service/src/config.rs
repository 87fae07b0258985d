use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

const DEFAULT_HUB_PATH: &str = "/chathub";
const DEFAULT_USERNAME_PARAM: &str = "username";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

fn parse_route_path(path: &str) -> Result<String, String> {
    if path.starts_with('/') && path.len() > 1 {
        Ok(path.to_string())
    } else {
        Err(format!("route path must start with '/' and name a route, got {path:?}"))
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Route clients connect to for the chat hub WebSocket
    #[arg(long, env, default_value = DEFAULT_HUB_PATH, value_parser = parse_route_path)]
    hub_path: String,

    /// Query string parameter carrying the participant's display name on connect
    #[arg(long, env, default_value = DEFAULT_USERNAME_PARAM)]
    username_param: String,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    /// `interface:port` to bind the listener to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.interface(), self.port)
    }

    pub fn hub_path(&self) -> &str {
        &self.hub_path
    }

    pub fn username_param(&self) -> &str {
        &self.username_param
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::parse_from(["chathub"]);

        assert_eq!(config.listen_address(), "127.0.0.1:4000");
        assert_eq!(config.hub_path(), "/chathub");
        assert_eq!(config.username_param(), "username");
        assert_eq!(config.log_level_filter, LevelFilter::Info);
        assert!(!config.is_production());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "chathub",
            "--interface",
            "0.0.0.0",
            "--port",
            "8080",
            "--hub-path",
            "/hub",
            "--username-param",
            "name",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "production",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ]);

        assert_eq!(config.listen_address(), "0.0.0.0:8080");
        assert_eq!(config.hub_path(), "/hub");
        assert_eq!(config.username_param(), "name");
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert!(config.is_production());
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn hub_path_must_be_absolute() {
        let result = Config::try_parse_from(["chathub", "--hub-path", "chathub"]);
        assert!(result.is_err(), "relative hub path should be rejected");
    }

    #[test]
    fn rust_env_parses_case_insensitively() {
        assert_eq!("STAGING".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("bogus".parse::<RustEnv>(), Err(RustEnvParseError));
        assert_eq!(RustEnv::Production.to_string(), "production");
    }
}
