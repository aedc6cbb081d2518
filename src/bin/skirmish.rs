//! Seeds two dominions and resolves one invasion, printing the outcome.
//!
//! Useful for eyeballing balance changes:
//!
//! ```text
//! cargo run --bin skirmish -- --attacker-units 3000 --seed 42
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use warspire::core::types::{DominionId, RealmId, RoundId, WarFooting};
use warspire::dominion::{Dominion, Race};
use warspire::external::memory::{CollectingSink, FixedClock, InMemoryRepository, StaticGovernment};
use warspire::resolve::{ConflictResolver, InvasionOrder};

#[derive(Parser, Debug)]
#[command(about = "Resolve a single invasion between two seeded dominions")]
struct Args {
    /// RNG seed for the resolution
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Attacker's land
    #[arg(long, default_value_t = 1000)]
    attacker_land: i64,

    /// Defender's land
    #[arg(long, default_value_t = 900)]
    defender_land: i64,

    /// Offensive specialists the attacker sends
    #[arg(long, default_value_t = 3000)]
    attacker_units: i64,

    /// Defensive specialists the defender holds
    #[arg(long, default_value_t = 2000)]
    defender_units: i64,

    /// Resolve under mutual war
    #[arg(long)]
    war: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut attacker = Dominion::seeded(
        DominionId(1),
        RealmId(1),
        RoundId(1),
        "Ironhold",
        Race::legion(),
        args.attacker_land,
    );
    attacker.military.units = [args.attacker_units, args.attacker_units, 0, 0];
    attacker.resources.boats = 500.0;

    let mut defender = Dominion::seeded(
        DominionId(2),
        RealmId(2),
        RoundId(1),
        "Mirefen",
        Race::legion(),
        args.defender_land,
    );
    defender.military.units = [0, args.defender_units, 0, 0];

    let repo = InMemoryRepository::new();
    repo.insert(attacker)?;
    repo.insert(defender)?;

    let footing = if args.war { WarFooting::MutualWar } else { WarFooting::None };
    let resolver = ConflictResolver::new(
        repo,
        StaticGovernment(footing),
        FixedClock::midround(),
        CollectingSink::new(),
        args.seed,
    );

    let outcome = resolver.resolve_invasion(&InvasionOrder {
        attacker: DominionId(1),
        defender: DominionId(2),
        sent: [args.attacker_units, 0, 0, 0],
    })?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
