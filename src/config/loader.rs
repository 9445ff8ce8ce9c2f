//! YAML loading for `ClientOptions`

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::ClientOptions;

/// Load and validate client options from a YAML file
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use dydx_v3::config::load_config;
///
/// let options = load_config(Path::new("dydx.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<ClientOptions, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let options: ClientOptions = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    options.validate()?;

    tracing::info!(
        phase = "init",
        path = %path.display(),
        host = %options.host,
        network_id = ?options.network_id,
        "Client options loaded"
    );

    Ok(options)
}

/// Load client options from a YAML string
pub fn load_config_from_str(yaml_content: &str) -> Result<ClientOptions, AppError> {
    let options: ClientOptions = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    options.validate()?;

    Ok(options)
}
