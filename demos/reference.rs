use std::collections::BTreeMap;

use clap::Parser;
use log::info;

use access_validator::graph::{EdgeSpec, Graph};
use access_validator::interval::{Border, Interval};
use access_validator::predicate::Predicate;
use access_validator::solver::{Solver, SolverConfig, VertexReuse};
use access_validator::types::VertexId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search for access in the reference 3-vertex graph")]
struct Cli {
    /// Vertex to make accessible.
    #[arg(short, long, default_value_t = 0)]
    target: u32,

    /// Log level.
    #[arg(long, default_value = "info")]
    log_level: simplelog::LevelFilter,

    /// Keep changed values when backtracking.
    #[arg(long)]
    no_restore: bool,

    /// Never change a vertex twice on one search path.
    #[arg(long)]
    strict_reuse: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        cli.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let inf = f64::INFINITY;
    let predicates = vec![
        Predicate::new([Interval::closed(0.0, 1.0)]),
        Predicate::new([Interval::new(2.0, 3.0, Border::LeftClosed)]),
        Predicate::new([
            Interval::new(-inf, -4.0, Border::RightClosed),
            Interval::open(6.0, inf),
        ]),
    ];
    for (k, p) in predicates.iter().enumerate() {
        info!("p{} = {}", k, p);
    }

    let edges = [EdgeSpec::new(0, 1, 0), EdgeSpec::new(0, 2, 1), EdgeSpec::new(1, 2, 2)];
    let values: BTreeMap<u32, f64> = BTreeMap::from([(0, 3.12), (1, 2.17), (2, 5.0)]);
    let mut graph = Graph::build(&edges, values, predicates)?;

    for vertex in graph.vertices() {
        println!("{}", vertex);
        for class in vertex.classes() {
            println!("    {}", class);
        }
    }
    println!("{}", graph);

    let config = SolverConfig {
        restore_on_backtrack: !cli.no_restore,
        vertex_reuse: if cli.strict_reuse {
            VertexReuse::Never
        } else {
            VertexReuse::AfterOther
        },
        ..Default::default()
    };
    let mut solver = Solver::new(config);
    match solver.solve(&mut graph, VertexId::new(cli.target)) {
        Some(trace) => {
            println!("SUCCESS! Changes made are (in reverse order):");
            for change in trace.reversed() {
                println!("{}", change);
            }
        }
        None => println!("No access to {}", cli.target),
    }
    info!("{}", solver.stats());
    println!("{}", graph);

    Ok(())
}
