use std::path::PathBuf;

use bloom_core::ShippingMethod;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bloom-quote")]
#[command(about = "Price Bloom storefront carts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Store config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "BLOOM_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Price a cart file
    Quote {
        /// JSON cart: {"items": [{"product_id", "unit_price" (cents), "quantity"}]}
        #[arg(long)]
        cart: PathBuf,

        /// Promotion code to apply
        #[arg(long)]
        code: Option<String>,

        /// standard, express or overnight
        #[arg(long, default_value = "standard")]
        shipping: ShippingMethod,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// List shipping options
    Shipping,

    /// Check whether a promotion code is recognised
    Promo {
        /// The code as a customer would type it
        code: String,
    },

    /// Show or create the store configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
