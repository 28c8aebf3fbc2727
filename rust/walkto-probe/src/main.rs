use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use walkto_core::db::Database;
use walkto_core::options::DirectionOrder;
use walkto_core::pathfinder::SearchOutcome;
use walkto_core::{BfsPathfinder, ObjectFootprint, PathRequest, SearchOptions, Tile, TraversalType};

#[derive(Parser, Debug)]
#[command(name = "walkto-probe", version, about = "Route one request against a walkto world database")]
struct Args {
    /// World database (collision, object_defs, objects)
    #[arg(long = "sqlite", value_name = "PATH")]
    sqlite_path: PathBuf,

    /// Start tile as x,z
    #[arg(long, value_parser = parse_tile)]
    from: Tile,

    /// Destination tile as x,z
    #[arg(long, value_parser = parse_tile, conflicts_with = "object")]
    to: Option<Tile>,

    /// Route to the object with this id anchored at --at instead of a tile
    #[arg(long, requires = "at")]
    object: Option<u32>,

    #[arg(long, value_parser = parse_tile)]
    at: Option<Tile>,

    #[arg(long, default_value_t = 0)]
    height: i32,

    #[arg(long = "max-expansions", default_value_t = walkto_core::options::DEFAULT_MAX_EXPANSIONS)]
    max_expansions: u64,

    /// Use Manhattan distance for the local direction reorder
    #[arg(long)]
    manhattan: bool,

    /// Search the projectile layer instead of the walk layer
    #[arg(long)]
    projectile: bool,

    /// Include every tile the search discovered
    #[arg(long)]
    explored: bool,
}

fn parse_tile(s: &str) -> std::result::Result<Tile, String> {
    let (x, z) = s.split_once(',').ok_or_else(|| format!("expected x,z, got {s:?}"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("x: {e}"))?;
    let z = z.trim().parse::<i32>().map_err(|e| format!("z: {e}"))?;
    Ok(Tile::new(x, z))
}

#[derive(Serialize)]
struct Report {
    success: bool,
    expanded: u64,
    path: Vec<Tile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border: Option<Vec<Tile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explored: Option<Vec<Tile>>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).context("set tracing subscriber")?;

    let args = Args::parse();
    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(args: &Args) -> Result<Report> {
    let db = Database::open_read_only(&args.sqlite_path)
        .with_context(|| format!("open {}", args.sqlite_path.display()))?;
    let grid = db.load_collision(args.height).context("load collision")?;
    info!(tiles = grid.len(), height = args.height, "collision loaded");

    let options = SearchOptions {
        max_expansions: args.max_expansions,
        order: if args.manhattan { DirectionOrder::Manhattan } else { DirectionOrder::Chebyshev },
        ..SearchOptions::default()
    };
    let from = Tile::with_height(args.from.x, args.from.z, args.height);
    let traversal = if args.projectile { TraversalType::Projectile } else { TraversalType::Walk };
    let pathfinder = BfsPathfinder::new(&grid, &options);

    let (outcome, border): (SearchOutcome, Option<Vec<Tile>>) = match (args.object, args.at, args.to) {
        (Some(id), Some(at), _) => {
            let at = Tile::with_height(at.x, at.z, args.height);
            let object = db
                .objects_at(at)?
                .into_iter()
                .find(|o| o.id == id)
                .with_context(|| format!("no object {id} at {at}"))?;
            let def = db.fetch_object_def(id)?.with_context(|| format!("object {id} has no definition"))?;
            let footprint = ObjectFootprint::resolve(&object, &def, &grid);
            let (w, l) = footprint.size();
            let request = PathRequest::new(from, at).with_target_size(w, l).with_traversal(traversal);
            let outcome = pathfinder.search(&request, |t| footprint.accepts(t));
            (outcome, Some(footprint.border_tiles()))
        }
        (None, _, Some(to)) => {
            let request = PathRequest::new(from, Tile::with_height(to.x, to.z, args.height)).with_traversal(traversal);
            (pathfinder.search(&request, |_| true), None)
        }
        _ => bail!("pass either --to or --object with --at"),
    };

    info!(success = outcome.route.success, steps = outcome.route.len(), expanded = outcome.route.expanded, "route computed");
    Ok(Report {
        success: outcome.route.success,
        expanded: outcome.route.expanded,
        path: outcome.route.path,
        border,
        explored: args.explored.then_some(outcome.explored),
    })
}
