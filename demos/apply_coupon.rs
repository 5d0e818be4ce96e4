//! Apply Coupon Example
//!
//! Loads a fixture set, applies a coupon to its cart and prints the discounted lines.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to pick the coupon code
//! Use `-n` to specify the number of items to add to the cart
//!
//! Set `RUST_LOG=cartwheel=trace` to see each discounted item.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use tracing_subscriber::EnvFilter;

use cartwheel::{cart::Cart, fixtures::Fixture, pricing::to_money};

/// Arguments for the coupon example
#[derive(Debug, Parser)]
struct Args {
    /// Number of items to add to the cart
    #[clap(short, long)]
    n: Option<usize>,

    /// Fixture set to load products, items & coupons from
    #[clap(short, long, default_value = "domains")]
    fixture: String,

    /// Coupon code to apply
    #[clap(short, long, default_value = "BUY_ONE_GET_CLONE")]
    coupon: String,
}

/// Apply Coupon Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cartwheel=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let coupon = fixture.coupon(&args.coupon)?;

    let mut cart = fixture.cart(args.n)?;

    coupon.calculate_discount(&mut cart);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "\n{}", cart_table(&cart)?)?;
    writeln!(handle, "Coupon:   {}", coupon.code())?;
    writeln!(handle, "Subtotal: {}", cart.subtotal()?)?;
    writeln!(handle, "Tax:      {}", cart.total_tax()?)?;
    writeln!(handle, "Discount: {}", cart.total_discount()?)?;
    writeln!(handle, "Total:    {}", cart.total()?)?;

    Ok(())
}

fn cart_table(cart: &Cart) -> Result<String> {
    let currency = cart.currency();
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Term", "Price", "Discount", "Final"]);

    for (index, item) in cart.iter().enumerate() {
        let term = match (item.term(), item.unit()) {
            (Some(term), Some(unit)) => format!("{} {unit}", term.period()),
            _ => String::new(),
        };

        builder.push_record([
            format!("#{}", index + 1),
            item.title().unwrap_or_default().to_string(),
            term,
            to_money(item.price(), currency)?.to_string(),
            to_money(item.discount(), currency)?.to_string(),
            to_money(item.price_with_discount()?, currency)?.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    Ok(table.to_string())
}
