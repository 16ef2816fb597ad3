//! Product commands

use clap::{Args, Subcommand};
use reviews_core::report::{self, ProductReport};
use reviews_core::{Config, ReviewStore, SynthesisState};

/// Product commands
#[derive(Args, Debug)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Show a product's summary, keywords and reviews
    Show {
        /// External product id
        external_id: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ProductArgs {
    /// Execute the product command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match &self.command {
            ProductCommand::Show { external_id, json } => {
                show_product(external_id, *json, config).await
            }
        }
    }
}

async fn show_product(external_id: &str, json: bool, config: &Config) -> anyhow::Result<()> {
    let store = super::open_store(config).await?;
    let report = report::product_report(store.as_ref(), external_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let state = match store.get_product(external_id).await? {
        Some(product) => {
            let reviews = store.get_reviews(external_id).await?;
            Some(SynthesisState::of(&product, &reviews))
        }
        None => None,
    };

    print_report(&report, state);
    Ok(())
}

fn print_report(report: &ProductReport, state: Option<SynthesisState>) {
    println!("Product {}", report.external_id);
    println!(
        "  Rating: {:.2} ({} reviews)",
        report.average_rating, report.reviews_quantity
    );
    if let Some(state) = state {
        println!("  Synthesis: {}", state);
    }
    if let Some(summary) = &report.ai_summary {
        println!("  Summary: {}", summary);
    }
    if !report.keywords.is_empty() {
        println!("  Keywords: {}", report.keywords.join(", "));
    }

    if report.reviews.is_empty() {
        println!();
        println!("No reviews yet.");
        return;
    }

    println!();
    for review in &report.reviews {
        println!(
            "[{}] {} by {} ({})",
            review.rating, review.title, review.author, review.review_date
        );
        println!("    {}", review.content);
    }
}
