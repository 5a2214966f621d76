use anyhow::{bail, Context, Result};
use church_roster::entities::church::church_exists;
use church_roster::entities::member::today;
use church_roster::{
    by_gender, by_range, import_members, load_members_csv, open_database, search_members, Bucket,
    Config,
};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: church-roster <init | import <csv> <church_id> | search <name> | report [church_id]>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("church_roster=info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env().context("Failed to load configuration")?;

    match args.first().map(String::as_str) {
        Some("init") => run_init(&config),
        Some("import") => match (args.get(1), args.get(2)) {
            (Some(csv), Some(church_id)) => run_import(&config, Path::new(csv), church_id),
            _ => bail!(USAGE),
        },
        Some("search") => match args.get(1) {
            Some(name) => run_search(&config, name),
            None => bail!(USAGE),
        },
        Some("report") => run_report(&config, args.get(1).map(String::as_str)),
        _ => bail!(USAGE),
    }
}

fn run_init(config: &Config) -> Result<()> {
    open_database(&config.database_path)
        .with_context(|| format!("Failed to initialize {:?}", config.database_path))?;
    println!("✓ Database ready at {:?}", config.database_path);
    Ok(())
}

fn run_import(config: &Config, csv_path: &Path, church_id: &str) -> Result<()> {
    println!("📂 Loading {:?}...", csv_path);
    let records = load_members_csv(csv_path).context("Failed to read member CSV")?;
    println!("✓ Loaded {} rows", records.len());

    let conn = open_database(&config.database_path)?;
    let report = import_members(&conn, church_id, &records)?;

    println!("✓ Inserted: {} members", report.inserted);
    for (row, errors) in &report.rejected {
        let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        println!("✗ Row {}: {}", row, reasons.join("; "));
    }

    Ok(())
}

fn run_search(config: &Config, name: &str) -> Result<()> {
    let conn = open_database(&config.database_path)?;
    let members = search_members(&conn, name)?;

    if members.is_empty() {
        println!("No members match {:?}", name);
    }
    for member in members {
        println!(
            "{}  {:<40} {}",
            member.id,
            member.full_name(),
            member.status_name()
        );
    }

    Ok(())
}

fn print_buckets(title: &str, buckets: &[Bucket]) {
    println!("\n{}", title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for bucket in buckets {
        println!("{:<20} {:>6}", bucket.label, bucket.count);
    }
}

fn run_report(config: &Config, church_id: Option<&str>) -> Result<()> {
    let conn = open_database(&config.database_path)?;

    if let Some(church_id) = church_id {
        if !church_exists(&conn, church_id)? {
            bail!("church not found: {}", church_id);
        }
    }

    print_buckets("📊 Edades", &by_range(&conn, church_id, today())?);
    print_buckets("📊 Género", &by_gender(&conn, church_id)?);

    Ok(())
}
