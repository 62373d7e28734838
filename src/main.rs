//! Wanderkart CLI

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::error;

use wanderkart::{
    config::{CartConfig, LoggingConfig},
    items::{ItemKind, LineItem},
    money::format_amount,
    notifications::TracingNotifier,
    observability::init_logging,
    persistence::FileStorage,
    store::CartStore,
    summary::CartSummary,
};

#[derive(Debug, Parser)]
#[command(name = "wanderkart", about = "Travel booking cart", long_about = None)]
struct Cli {
    #[command(flatten)]
    cart: CartConfig,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add an item, merging with an existing line for the same product
    Add(AddArgs),

    /// Remove the line for a product id
    Remove {
        /// Product id
        id: String,
    },

    /// Set a line's quantity
    Quantity {
        /// Product id
        id: String,

        /// New quantity; values below one become one
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Apply a discount code to the current subtotal
    Discount {
        /// Discount code
        code: String,
    },

    /// Remove the applied discount
    RemoveDiscount,

    /// Empty the cart
    Clear,

    /// Print the cart
    Show,

    /// List the available discount codes
    Codes,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    #[arg(long)]
    id: String,

    /// Product kind (hotel, flight, tour, restaurant, activity, transfer)
    #[arg(long)]
    kind: ItemKind,

    /// Display title
    #[arg(long)]
    title: String,

    /// Unit price
    #[arg(long)]
    price: Decimal,

    /// Quantity to add
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    quantity: i64,

    /// Currency code; defaults to the cart's currency
    #[arg(long)]
    currency: Option<String>,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Location label
    #[arg(long)]
    location: Option<String>,
}

type Store = CartStore<FileStorage, TracingNotifier>;

/// Wanderkart entry point
pub fn main() -> Result<()> {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.logging)?;

    if let Err(err) = run(cli) {
        error!(error = %err, "command failed");
        return Err(err);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut store = Store::open(
        cli.cart.persistence(),
        TracingNotifier,
        cli.cart.reducer(),
    );

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Add(args) => {
            let currency = args
                .currency
                .unwrap_or_else(|| store.state().currency().to_string());

            let mut item = LineItem::new(args.id, args.kind, args.title, args.price, currency)
                .with_quantity(args.quantity);

            item.location = args.location;

            if let Some(image) = args.image {
                item = item.with_image(image);
            }

            store.add_item(item);
        }
        Commands::Remove { id } => {
            if store.remove_item(&id).is_unchanged() {
                writeln!(out, "No item with id {id} in the cart.")?;
            }
        }
        Commands::Quantity { id, quantity } => {
            if store.update_quantity(&id, quantity).is_unchanged() {
                writeln!(out, "No item with id {id} in the cart.")?;
            }
        }
        Commands::Discount { code } => {
            let table = cli
                .cart
                .discount_table()
                .context("failed to load discount codes")?;

            let amount = store.apply_discount_code(&code, &table)?;

            writeln!(
                out,
                "Applied {} for {} off.",
                code.trim().to_ascii_uppercase(),
                format_amount(amount, store.state().currency())
            )?;
        }
        Commands::RemoveDiscount => {
            store.remove_discount();
        }
        Commands::Clear => {
            store.clear_cart();
        }
        Commands::Show => {}
        Commands::Codes => {
            let table = cli
                .cart
                .discount_table()
                .context("failed to load discount codes")?;

            for (code, percentage) in table.entries() {
                let points = (percentage * Decimal::ONE_HUNDRED).normalize();

                writeln!(out, "{code:<12} {points}%")?;
            }

            return Ok(());
        }
    }

    CartSummary::new(store.state()).write_to(&mut out)?;

    Ok(())
}
