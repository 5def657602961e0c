use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "inquest",
    about = "Inquest: build and run table-validation pipelines over MCP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the validation session over MCP stdio
    Serve {
        /// MCP server name
        #[arg(long, default_value = "inquest-mcp")]
        server_name: String,

        /// MCP server version
        #[arg(long, default_value = "0.1.0")]
        server_version: String,
    },
}
