use booking::{BookingRequest, Resolver};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use core_types::VehicleType;
// Import database helpers directly from the database crate
use database::connection::{connect, run_migrations};
use database::PgStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Autorent reservation application.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file, if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = configuration::load_config().expect("Failed to load config.toml");

    // Initialize the database connection and run migrations
    let db_pool = connect().await.expect("Failed to connect to the database");
    run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");
    let resolver = Resolver::new(Arc::new(PgStore::new(db_pool)));

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => {
            if let Err(e) = web_server::run_server(settings, resolver).await {
                eprintln!("Server error: {}", e);
            }
        }
        Commands::Reserve(args) => {
            if let Err(e) = handle_reserve(args, resolver).await {
                eprintln!("Error creating reservation: {}", e);
            }
        }
        Commands::Reservations(args) => {
            if let Err(e) = handle_reservations(args, resolver).await {
                eprintln!("Error listing reservations: {}", e);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A conflict-safe reservation service for a car-rental fleet.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reservation HTTP API.
    Serve,
    /// Book a vehicle type for a window of days (staff-side booking).
    Reserve(ReserveArgs),
    /// List a user's reservations, newest first.
    Reservations(ReservationsArgs),
}

#[derive(Parser)]
struct ReserveArgs {
    /// The user the reservation is booked for.
    #[arg(long)]
    user: String,

    /// The vehicle type to book (e.g., "suv").
    #[arg(long)]
    vehicle_type: String,

    /// The pickup date (format: YYYY-MM-DD).
    #[arg(long)]
    pickup_date: NaiveDate,

    /// The return date (format: YYYY-MM-DD).
    #[arg(long)]
    return_date: NaiveDate,

    /// Quoted total price for the rental.
    #[arg(long)]
    price: Option<Decimal>,

    /// Free-form note attached to the reservation.
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Parser)]
struct ReservationsArgs {
    /// The user whose reservations to list.
    #[arg(long)]
    user: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Handles a staff-side booking from the command line.
async fn handle_reserve(args: ReserveArgs, resolver: Resolver) -> anyhow::Result<()> {
    let reservation = resolver
        .reserve(BookingRequest {
            requester_id: args.user,
            vehicle_type: VehicleType::new(args.vehicle_type),
            pickup_date: args.pickup_date,
            return_date: args.return_date,
            price: args.price,
            notes: args.notes,
        })
        .await?;

    println!(
        "Reservation confirmed: {} ({} from {} to {})",
        reservation.id, reservation.vehicle_type, reservation.pickup_date, reservation.return_date
    );
    Ok(())
}

/// Prints a user's reservations as a table, newest first.
async fn handle_reservations(args: ReservationsArgs, resolver: Resolver) -> anyhow::Result<()> {
    let reservations = resolver.reservations_for_user(&args.user).await?;

    if reservations.is_empty() {
        println!("No reservations found for {}", args.user);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID", "Vehicle", "Pickup", "Return", "Status", "Price", "Created",
        ]);
    for r in &reservations {
        table.add_row(vec![
            r.id.to_string(),
            r.vehicle_type.to_string(),
            r.pickup_date.to_string(),
            r.return_date.to_string(),
            r.status.to_string(),
            r.price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}
