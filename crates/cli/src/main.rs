//! Critter Games CLI - Database migrations and checkout maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run checkout database migrations
//! cg-cli migrate
//!
//! # Seed catalog records
//! cg-cli catalog add-edition --name "Azul: Deluxe Edition"
//! cg-cli catalog add-package --animal "red panda" --name "Gold Adoption"
//! cg-cli catalog remove --game-edition 1
//!
//! # Put a catalog record on sale
//! cg-cli product create --game-edition 1 --price 39.99
//!
//! # Inspect or repair an order
//! cg-cli order show 3F2A9C...
//! cg-cli order recalc 3F2A9C...
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run checkout database migrations
//! - `catalog` - Add and remove game editions and adoption packages
//! - `product` - Create, list, look up and reprice products
//! - `order` - Show orders, recompute totals, look up by payment id or profile

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use critter_games_core::{
    AdoptionPackageId, GameEditionId, Money, OrderNumber, ProductId, Sku, UserProfileId,
};

mod commands;

#[derive(Parser)]
#[command(name = "cg-cli")]
#[command(author, version, about = "Critter Games checkout CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checkout database migrations
    Migrate,
    /// Manage catalog records
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Inspect and maintain orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Add a game edition
    AddEdition {
        /// Full display name of the edition
        #[arg(short, long)]
        name: String,
    },
    /// Add an animal adoption package
    AddPackage {
        /// Animal the package is for
        #[arg(short, long)]
        animal: String,

        /// Package name, e.g. "Gold Adoption"
        #[arg(short, long)]
        name: String,
    },
    /// Delete a catalog record, its products and their line items
    Remove {
        /// Game edition ID
        #[arg(long, conflicts_with = "adoption_package", required_unless_present = "adoption_package")]
        game_edition: Option<GameEditionId>,

        /// Adoption package ID
        #[arg(long)]
        adoption_package: Option<AdoptionPackageId>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product for a catalog record
    Create {
        /// Game edition ID
        #[arg(long, conflicts_with = "adoption_package", required_unless_present = "adoption_package")]
        game_edition: Option<GameEditionId>,

        /// Adoption package ID
        #[arg(long)]
        adoption_package: Option<AdoptionPackageId>,

        /// Price, e.g. 19.99
        #[arg(short, long)]
        price: Money,
    },
    /// List all products
    List,
    /// Show the product with a SKU
    Show {
        /// Product SKU
        sku: Sku,
    },
    /// Change a product's price
    SetPrice {
        /// Product ID
        id: ProductId,

        /// New price
        #[arg(short, long)]
        price: Money,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Show an order and its line items
    Show {
        /// Order number
        order_number: OrderNumber,
    },
    /// Re-price line items and recompute the order total
    Recalc {
        /// Order number
        order_number: OrderNumber,
    },
    /// Find the order created for a payment
    FindPayment {
        /// Payment-processor transaction id
        stripe_pid: String,
    },
    /// List a user profile's orders
    History {
        /// User profile ID
        user_profile_id: UserProfileId,
    },
}

#[tokio::main]
async fn main() {
    // Pick up RUST_LOG from .env as well
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("critter_games=info,cg_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Catalog { action } => match action {
            CatalogAction::AddEdition { name } => commands::catalog::add_edition(&name).await?,
            CatalogAction::AddPackage { animal, name } => {
                commands::catalog::add_package(&animal, &name).await?;
            }
            CatalogAction::Remove {
                game_edition,
                adoption_package,
            } => commands::catalog::remove(game_edition, adoption_package).await?,
        },
        Commands::Product { action } => match action {
            ProductAction::Create {
                game_edition,
                adoption_package,
                price,
            } => commands::product::create(game_edition, adoption_package, price).await?,
            ProductAction::List => commands::product::list().await?,
            ProductAction::Show { sku } => commands::product::show(&sku).await?,
            ProductAction::SetPrice { id, price } => commands::product::set_price(id, price).await?,
        },
        Commands::Order { action } => match action {
            OrderAction::Show { order_number } => commands::order::show(&order_number).await?,
            OrderAction::Recalc { order_number } => commands::order::recalc(&order_number).await?,
            OrderAction::FindPayment { stripe_pid } => {
                commands::order::find_payment(&stripe_pid).await?;
            }
            OrderAction::History { user_profile_id } => {
                commands::order::history(user_profile_id).await?;
            }
        },
    }
    Ok(())
}
