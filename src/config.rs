use std::path::PathBuf;
use std::str::FromStr;

const PORT_DEFAULT: u16 = 3000;
const TARGETS_PATH_DEFAULT: &'static str = "targets.json";
const MAX_BODY_BYTES_DEFAULT: usize = 5 * 1024 * 1024;
const REQUEST_TIMEOUT_SECS_DEFAULT: u64 = 30;
const STRIP_OUTPUT_SUFFIX_DEFAULT: &'static str = "_Stripped_";

/// Service settings, read once at start-up from the environment or `.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub port: u16,
  pub targets_path: PathBuf,
  pub max_body_bytes: usize,
  pub request_timeout_secs: u64,
  pub output_suffix: String,
}

fn env_string(key: &str, default_value: &str) -> String {
  if let Ok(value) = dotenv::var(key) {
    if value.trim().len() > 0 {
      return value.trim().to_owned();
    }
  }
  default_value.to_owned()
}

fn env_number<T: FromStr>(key: &str, default_value: T) -> T {
  if let Ok(value) = dotenv::var(key) {
    if let Ok(num) = value.trim().parse::<T>() {
      return num;
    }
  }
  default_value
}

impl Config {
  pub fn from_env() -> Self {
    Config {
      port: env_number("PORT", PORT_DEFAULT),
      targets_path: PathBuf::from(env_string("TARGETS_PATH", TARGETS_PATH_DEFAULT)),
      max_body_bytes: env_number("MAX_BODY_BYTES", MAX_BODY_BYTES_DEFAULT),
      request_timeout_secs: env_number("REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS_DEFAULT),
      output_suffix: env_string("STRIP_OUTPUT_SUFFIX", STRIP_OUTPUT_SUFFIX_DEFAULT),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      port: PORT_DEFAULT,
      targets_path: PathBuf::from(TARGETS_PATH_DEFAULT),
      max_body_bytes: MAX_BODY_BYTES_DEFAULT,
      request_timeout_secs: REQUEST_TIMEOUT_SECS_DEFAULT,
      output_suffix: STRIP_OUTPUT_SUFFIX_DEFAULT.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unset_variables_fall_back_to_defaults() {
    assert_eq!(env_number("HTMLSTRIPPER_TEST_UNSET_NUMBER", 42u16), 42);
    assert_eq!(env_string("HTMLSTRIPPER_TEST_UNSET_STRING", "x"), "x");
  }

  #[test]
  fn test_bad_numbers_fall_back_to_defaults() {
    std::env::set_var("HTMLSTRIPPER_TEST_BAD_PORT", "not-a-port");
    assert_eq!(env_number("HTMLSTRIPPER_TEST_BAD_PORT", 3000u16), 3000);
    std::env::set_var("HTMLSTRIPPER_TEST_GOOD_PORT", " 8080 ");
    assert_eq!(env_number("HTMLSTRIPPER_TEST_GOOD_PORT", 3000u16), 8080);
  }

  #[test]
  fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.port, 3000);
    assert_eq!(config.targets_path, PathBuf::from("targets.json"));
    assert_eq!(config.output_suffix, "_Stripped_");
  }
}
