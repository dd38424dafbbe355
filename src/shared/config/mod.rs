pub mod cli;
pub mod model;

pub use cli::Cli;
pub use model::{
    ClickHouseConfig, ConnectPolicy, DaemonConfig, LoggingConfig, Settings, load_settings,
};
