use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = ".getit";
const LOG_SUBDIR: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => write!(f, "dev"),
            BuildMode::Production => write!(f, "prod"),
        }
    }
}

impl std::str::FromStr for BuildMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(BuildMode::Development),
            "prod" | "production" => Ok(BuildMode::Production),
            _ => Err(format!("unknown mode: {s} (valid: dev, prod)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub mode: BuildMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: crate::logging::default_log_level().to_string(),
            mode: BuildMode::default(),
        }
    }
}

impl Config {
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_SUBDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_mode_from_str() {
        assert_eq!("dev".parse::<BuildMode>().unwrap(), BuildMode::Development);
        assert_eq!("PROD".parse::<BuildMode>().unwrap(), BuildMode::Production);
        assert_eq!(
            "development".parse::<BuildMode>().unwrap(),
            BuildMode::Development
        );
        assert!("staging".parse::<BuildMode>().is_err());
    }

    #[test]
    fn display_round_trip_build_mode() {
        for mode in [BuildMode::Development, BuildMode::Production] {
            assert_eq!(mode.to_string().parse::<BuildMode>().unwrap(), mode);
        }
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from(".getit"));
        assert_eq!(config.mode, BuildMode::Production);
        assert_eq!(config.log_dir(), PathBuf::from(".getit").join("logs"));
    }
}
