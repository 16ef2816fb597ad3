//! Shop commands

use clap::{Args, Subcommand};
use reviews_core::report;
use reviews_core::Config;

/// Shop commands
#[derive(Args, Debug)]
pub struct ShopArgs {
    #[command(subcommand)]
    pub command: ShopCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShopCommand {
    /// List a shop's products with their rating aggregates
    Products {
        /// Shop identifier
        shop_id: String,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ShopArgs {
    /// Execute the shop command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match &self.command {
            ShopCommand::Products { shop_id, json } => list_products(shop_id, *json, config).await,
        }
    }
}

async fn list_products(shop_id: &str, json: bool, config: &Config) -> anyhow::Result<()> {
    let store = super::open_store(config).await?;
    let listing = report::shop_report(store.as_ref(), shop_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.products.is_empty() {
        println!("No products found for shop {}", shop_id);
        return Ok(());
    }

    println!("{:<24} {:>8} {:>8}", "PRODUCT", "RATING", "REVIEWS");
    for product in &listing.products {
        println!(
            "{:<24} {:>8.2} {:>8}",
            product.external_id, product.average_rating, product.reviews_quantity
        );
    }

    Ok(())
}
