use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::Path;

// Use library instead of local modules
use seriea_dashboard::{
    get_season_stats, insert_standings, load_csv, open_read_only, setup_database, verify_count,
    StandingsStore,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("import") if args.len() == 4 => run_import(Path::new(&args[2]), Path::new(&args[3])),
        Some("check") if args.len() == 3 => run_check(Path::new(&args[2])),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("⚽ Serie A Standings Dashboard v{}", seriea_dashboard::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  seriea-dashboard import <standings.csv> <standings.db>");
    println!("  seriea-dashboard check <standings.db>");
    println!();
    println!("To serve the dashboard:");
    println!("  cargo run --bin seriea-server --features server -- <standings.db>");
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("🗄️  Standings Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let records = load_csv(csv_path)?;
    println!("✓ Loaded {} standings rows from CSV", records.len());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert records
    println!("\n💾 Inserting standings...");
    insert_standings(&conn, &records)?;

    // 4. Verify count
    println!("\n🔍 Verifying database...");
    let count = verify_count(&conn)?;
    println!("✓ Database contains {} standings rows", count);

    // 5. Check the dataset is actually servable
    drop(conn);
    run_check(db_path)
}

fn run_check(db_path: &Path) -> Result<()> {
    println!("\n🔍 Checking dataset at {:?}...", db_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: seriea-dashboard import <standings.csv> {:?}", db_path);
        std::process::exit(1);
    }

    let conn = open_read_only(db_path)?;

    // Loading the store runs the rank-invariant validation on every
    // (season, matchday) slice
    let store = StandingsStore::load(&conn)?;

    if store.is_empty() {
        println!("⚠️  Dataset is empty - the dashboard will have nothing to show");
        return Ok(());
    }

    println!("✓ Rank invariant holds for all {} records", store.record_count());

    let stats = get_season_stats(&conn)?;
    println!("\nSeason          Teams  Matchdays  Rows");
    println!("─────────────────────────────────────────");
    for stat in stats {
        println!(
            "{:<15} {:>5} {:>10} {:>5}",
            stat.season, stat.team_count, stat.matchday_count, stat.record_count
        );
    }

    println!("\n✅ Dataset OK");
    Ok(())
}
