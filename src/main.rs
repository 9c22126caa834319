// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use laptop_scout::{aggregate, load_csv, recommend, FilterCriteria, LoadReport};

const DEFAULT_DATA_PATH: &str = "data/laptop_prices.csv";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut summary_mode = false;
    let mut data_path = PathBuf::from(DEFAULT_DATA_PATH);

    for arg in &args[1..] {
        if arg == "summary" {
            summary_mode = true;
        } else {
            data_path = PathBuf::from(arg);
        }
    }

    if summary_mode {
        run_summary(&data_path)?;
    } else {
        run_ui_mode(&data_path)?;
    }

    Ok(())
}

fn load_report(data_path: &Path) -> Result<LoadReport> {
    println!("📂 Loading {}...", data_path.display());
    let report = load_csv(data_path)?;
    println!("✓ Loaded {} listings", report.store.len());

    if !report.rejected.is_empty() {
        println!("⚠ Dropped {} invalid rows:", report.rejected.len());
        for rejected in &report.rejected {
            println!("   {}", rejected);
        }
    }

    Ok(report)
}

/// Print the default view (overview, per-platform table, top-2 picks)
/// to stdout without starting the TUI.
fn run_summary(data_path: &Path) -> Result<()> {
    println!("💻 Laptop Scout - Price Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let report = load_report(data_path)?;
    let filtered = laptop_scout::filter(&report.store, &FilterCriteria::default())?;

    println!("\n📊 Default view (city: Bhopal, all brands, all platforms)");

    match aggregate::overview(&filtered) {
        Some(o) => {
            println!("   Listings: {}", o.count);
            println!("   Average price: ₹{:.0}", o.mean_price);
            println!("   Lowest price:  ₹{:.0}", o.min_price);
            println!("   Highest price: ₹{:.0}", o.max_price);
        }
        None => {
            println!("   No data for the default filters.");
            return Ok(());
        }
    }

    let mut platforms = aggregate::by_platform(&filtered);
    platforms.sort_by(|a, b| a.mean_price.total_cmp(&b.mean_price));

    println!("\n🏪 By platform:");
    for s in &platforms {
        println!(
            "   {:<20} {:>4} listings  avg ₹{:<10.0} min ₹{:.0}",
            s.key, s.count, s.mean_price, s.min_price
        );
    }

    println!("\n🏆 Recommended (cheapest by average price):");
    for (i, pick) in recommend(&platforms).iter().enumerate() {
        println!(
            "   #{} {} - avg ₹{:.0}, from ₹{:.0} ({} listings)",
            i + 1,
            pick.platform,
            pick.mean_price,
            pick.min_price,
            pick.count
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(data_path: &Path) -> Result<()> {
    println!("🖥️  Loading Laptop Scout dashboard...\n");

    if !data_path.exists() {
        eprintln!("❌ Dataset not found at {}", data_path.display());
        eprintln!("   Pass the CSV path as the first argument, or place it at");
        eprintln!("   {}", DEFAULT_DATA_PATH);
        std::process::exit(1);
    }

    let report = load_report(data_path)?;

    if report.store.is_empty() {
        eprintln!("❌ No valid listings in the dataset.");
        std::process::exit(1);
    }

    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(report.store);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(data_path: &Path) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the summary: cargo run -- summary {}", data_path.display());
    std::process::exit(1);
}
