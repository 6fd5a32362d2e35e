pub mod toml_config;

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::ServiceConfig;
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "septic-lookup")]
    #[command(about = "Answers whether a property uses a septic system, caching upstream lookups")]
    pub struct CliConfig {
        #[arg(long, short, help = "TOML configuration file")]
        pub config: Option<PathBuf>,

        #[arg(long, help = "Address to listen on, overrides server.bind")]
        pub bind: Option<String>,

        #[arg(long, help = "Directory for the store snapshot, overrides storage.path")]
        pub store_path: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl CliConfig {
        /// 載入設定檔並套用命令列覆寫值
        pub fn load(&self) -> Result<ServiceConfig> {
            let mut config = match &self.config {
                Some(path) => ServiceConfig::from_file(path)?,
                None => ServiceConfig::default(),
            };

            if let Some(bind) = &self.bind {
                config.server.bind = bind.clone();
            }
            if let Some(path) = &self.store_path {
                config.storage.path = Some(path.clone());
            }

            config.validate()?;
            Ok(config)
        }
    }

}

#[cfg(feature = "cli")]
pub use cli::CliConfig;
