use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "ion.yaml";

/// Settings read from `ion.yaml`. Command line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output assembly file
    pub output: Option<String>,
    /// Symbol map file
    pub symbols: Option<String>,
    pub verbose: bool,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Explicit path, else `ion.yaml` when present, else defaults
    pub fn discover(path: Option<&str>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Output path, defaulting to the input path with `.asm` appended
    pub fn output_for(&self, input: &str) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.asm", input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let config = Config::parse("verbose: true\n").unwrap();
        assert!(config.verbose);
        assert_eq!(config.output, None);
        assert_eq!(config.output_for("main.ion"), "main.ion.asm");
    }

    #[test]
    fn explicit_output() {
        let config = Config::parse("output: out.asm\nsymbols: out.yaml\n").unwrap();
        assert_eq!(config.output_for("main.ion"), "out.asm");
        assert_eq!(config.symbols.as_deref(), Some("out.yaml"));
        assert!(!config.verbose);
    }

    #[test]
    fn malformed_config() {
        assert!(matches!(
            Config::parse("verbose: [1, 2"),
            Err(Error::Config(_))
        ));
    }
}
