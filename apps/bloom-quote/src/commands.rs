//! Subcommand handlers.
//!
//! Handlers return the text to print so they can be tested without
//! capturing stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bloom_config::StoreConfig;
use bloom_core::shipping::ShippingOption;
use bloom_core::{Cart, Money, PricingEngine, Quote, ShippingMethod};
use tracing::info;

use crate::cli::{Cli, Commands, ConfigCommands};

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.config;

    let output = match cli.command {
        Commands::Quote {
            cart,
            code,
            shipping,
            json,
        } => {
            let config = load_config(config_path)?;
            quote(&config, &cart, code.as_deref(), shipping, json)?
        }
        Commands::Shipping => shipping(&load_config(config_path)?)?,
        Commands::Promo { code } => promo(&load_config(config_path)?, &code)?,
        Commands::Config(ConfigCommands::Show) => load_config(config_path)?.to_toml()?,
        Commands::Config(ConfigCommands::Init { force }) => init_config(config_path, force)?,
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<StoreConfig> {
    StoreConfig::load(path).context("Failed to load store configuration")
}

// =============================================================================
// quote
// =============================================================================

pub fn read_cart(path: &Path) -> Result<Cart> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cart file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Cart file {} is not a valid cart", path.display()))
}

pub fn quote(
    config: &StoreConfig,
    cart_path: &Path,
    code: Option<&str>,
    method: ShippingMethod,
    json: bool,
) -> Result<String> {
    let cart = read_cart(cart_path)?;
    let engine = config.pricing_engine()?;
    let quote = engine
        .quote(&cart, code, method)
        .context("Cart cannot be priced")?;

    info!(
        items = cart.len(),
        total = %quote.total(),
        promotion_applied = quote.promotion_applied,
        "Cart priced"
    );

    if json {
        Ok(serde_json::to_string_pretty(&quote)?)
    } else {
        Ok(render_quote(config, &engine, &cart, &quote))
    }
}

/// The order summary as the checkout page lays it out.
pub fn render_quote(config: &StoreConfig, engine: &PricingEngine, cart: &Cart, quote: &Quote) -> String {
    let symbol = config.store.currency_symbol.as_str();
    let b = &quote.breakdown;
    let mut lines = vec![format!("{} order summary", config.store.name), String::new()];

    for item in cart.items() {
        let name = match &item.variant_label {
            Some(variant) => format!("{} ({})", item.product_id, variant),
            None => item.product_id.clone(),
        };
        lines.push(row(
            &format!("{} x{}", name, item.quantity),
            &money(item.line_total(), symbol),
        ));
    }
    lines.push(String::new());

    lines.push(row("Subtotal", &money(b.subtotal, symbol)));
    if let Some(code) = &quote.applied_code {
        lines.push(row(
            &format!("Discount ({})", code),
            &money(-b.discount_amount, symbol),
        ));
    }
    let shipping = if b.shipping_cost.is_zero() {
        "FREE".to_string()
    } else {
        money(b.shipping_cost, symbol)
    };
    lines.push(row(&format!("Shipping ({})", quote.shipping_method), &shipping));
    lines.push(row(&format!("Tax ({})", engine.tax_rate()), &money(b.tax_amount, symbol)));
    lines.push(row("Total", &money(b.total, symbol)));

    if quote.promotion_rejected() {
        lines.push(String::new());
        lines.push(format!(
            "Invalid promo code: {}",
            quote.submitted_code.as_deref().unwrap_or_default()
        ));
    }

    if let Some(progress) = quote.free_shipping.filter(|p| !p.qualifies) {
        lines.push(String::new());
        lines.push(format!(
            "Add {} more for free shipping ({}% of the way)",
            money(progress.remaining, symbol),
            progress.percent
        ));
    }

    lines.join("\n")
}

// =============================================================================
// shipping / promo
// =============================================================================

pub fn shipping(config: &StoreConfig) -> Result<String> {
    let engine = config.pricing_engine()?;
    let symbol = config.store.currency_symbol.as_str();

    let lines: Vec<String> = engine
        .shipping()
        .options()
        .iter()
        .map(|option| describe_shipping(option, symbol))
        .collect();
    Ok(lines.join("\n"))
}

fn describe_shipping(option: &ShippingOption, symbol: &str) -> String {
    let cost = money(option.flat_cost(), symbol);
    match option.free_threshold() {
        Some(threshold) => row(
            option.method().label(),
            &format!("{} (free from {})", cost, money(threshold, symbol)),
        ),
        None => row(option.method().label(), &cost),
    }
}

pub fn promo(config: &StoreConfig, code: &str) -> Result<String> {
    let engine = config.pricing_engine()?;

    match engine.promotions().resolve(code) {
        Some(promotion) => Ok(format!(
            "{}: {} off",
            promotion.code(),
            promotion.discount_rate()
        )),
        None => Ok(format!("{}: not a valid promo code", code.trim())),
    }
}

// =============================================================================
// config
// =============================================================================

fn init_config(path: Option<PathBuf>, force: bool) -> Result<String> {
    let path = match path.or_else(StoreConfig::default_config_path) {
        Some(path) => path,
        None => bail!("No config directory available; pass --config"),
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let written = StoreConfig::default().save(Some(path))?;
    Ok(format!("Wrote {}", written.display()))
}

// =============================================================================
// Formatting
// =============================================================================

fn money(amount: Money, symbol: &str) -> String {
    amount.to_string().replacen('$', symbol, 1)
}

fn row(label: &str, value: &str) -> String {
    format!("{:<32}{:>12}", label, value)
}
