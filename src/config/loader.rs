//! Loading configurations from YAML files

use std::fs;
use std::path::Path;

use super::schema::GanTrainConfig;
use super::validate::validate_config;
use crate::error::{Error, Result};

/// Load and validate a training configuration from a YAML file
///
/// # Example
///
/// ```no_run
/// use eegan::config::load_config;
///
/// let cfg = load_config("gan.yaml")?;
/// println!("loss: {}", cfg.loss.name);
/// # Ok::<(), eegan::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<GanTrainConfig> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    let cfg = parse_config(&yaml_content)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Parse a configuration without validating it
pub fn parse_config(yaml: &str) -> Result<GanTrainConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "loss:\n  name: wgangp-mode\n  phi: 2.0\nschedule:\n  n_critic: 5\n  max_iter: 100\ndata:\n  gen_batch_size: 8"
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.loss.phi, 2.0);
        assert_eq!(cfg.schedule.n_critic, 5);
        assert_eq!(cfg.decay_end_step(), Some(500));
    }

    #[test]
    fn test_load_rejects_unknown_loss() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "loss:\n  name: softplus").unwrap();
        assert!(matches!(load_config(file.path()), Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/gan.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(parse_config("loss: [unclosed"), Err(Error::ConfigError(_))));
    }
}
