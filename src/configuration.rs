use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub webdriver: WebdriverSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebdriverSettings {
    pub url: String,
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub directory: PathBuf,
}

impl OutputSettings {
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

/// Every setting has a default so the binary runs with no configuration file.
/// An optional `configuration.yaml` next to the binary or `POKEDEX__`
/// environment variables (e.g. `POKEDEX__WEBDRIVER__URL`) override them.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("webdriver.url", "http://localhost:9515")?
        .set_default("webdriver.headless", true)?
        .set_default("output.directory", ".")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("POKEDEX")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
