//! Review commands

use clap::{Args, Subcommand};
use reviews_core::{Config, NewReview, SynthesisOutcome};

/// Review commands
#[derive(Args, Debug)]
pub struct ReviewArgs {
    #[command(subcommand)]
    pub command: ReviewCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Submit a review, creating the product if needed
    Add {
        /// External product id
        external_id: String,

        /// Shop the product belongs to
        #[arg(short, long)]
        shop: String,

        /// Review author
        #[arg(short, long)]
        author: String,

        /// Review title
        #[arg(short, long)]
        title: String,

        /// Review text
        #[arg(short, long)]
        content: String,

        /// Rating
        #[arg(short, long)]
        rating: i32,
    },
}

impl ReviewArgs {
    /// Execute the review command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        match &self.command {
            ReviewCommand::Add {
                external_id,
                shop,
                author,
                title,
                content,
                rating,
            } => {
                let review = NewReview::new(author, title, content, *rating);
                add_review(external_id, shop, review, verbose, config).await
            }
        }
    }
}

async fn add_review(
    external_id: &str,
    shop: &str,
    review: NewReview,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let store = super::open_store(config).await?;
    let handler = super::submission_handler(config, store)?;

    let receipt = handler.submit(external_id, shop, review).await?;

    println!("Review #{} added to {}", receipt.review_id, external_id);
    if receipt.product_created {
        println!("  Created product {} in shop {}", external_id, shop);
    }
    print_outcome("Summary", &receipt.summary, verbose);
    print_outcome("Keywords", &receipt.keywords, verbose);

    Ok(())
}

fn print_outcome(label: &str, outcome: &SynthesisOutcome, verbose: bool) {
    if outcome.generated() || verbose {
        println!("  {}: {}", label, outcome);
    }
}
