use clap::Parser;

use synth_rs::alphabet::Proposition;
use synth_rs::bdd::BddConfig;
use synth_rs::fixpoint::{GameSpec, Solver, SolverConfig};
use synth_rs::formula::Formula;
use synth_rs::manager::Manager;
use synth_rs::translate::Translator;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// BDD size (in bits, so the actual size is `2^size` nodes).
    #[clap(long, value_name = "INT", default_value = "20")]
    size: usize,

    /// Operation cache size (in bits).
    #[clap(long, value_name = "INT", default_value = "16")]
    cache_bits: usize,

    /// Do not reclaim unreachable nodes.
    #[clap(long)]
    no_gc: bool,

    /// Give up after this many fixpoint iterations.
    #[clap(long, value_name = "INT")]
    max_iterations: Option<usize>,

    /// Show debug logs.
    #[clap(long)]
    verbose: bool,
}

struct Game {
    name: &'static str,
    formula: Formula,
    inputs: Vec<&'static str>,
}

fn catalogue() -> Vec<Game> {
    let atom = Formula::atom;
    vec![
        Game {
            name: "eventually p",
            formula: atom("p").eventually(),
            inputs: vec![],
        },
        Game {
            name: "p and not p",
            formula: atom("p") & !atom("p"),
            inputs: vec![],
        },
        Game {
            name: "next next p",
            formula: atom("p").tomorrow().tomorrow(),
            inputs: vec![],
        },
        Game {
            name: "response",
            formula: atom("req").implies(atom("grant")).always(),
            inputs: vec!["req"],
        },
        Game {
            name: "environment-controlled safety",
            formula: atom("i").always(),
            inputs: vec!["i"],
        },
        Game {
            name: "mirror",
            formula: atom("i").iff(atom("o")).always(),
            inputs: vec!["i"],
        },
        Game {
            name: "delayed grant",
            formula: (atom("req") & atom("grant").weak_tomorrow()).eventually(),
            inputs: vec!["req"],
        },
    ]
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);

    let mut config = SolverConfig::default().with_garbage_collection(!args.no_gc);
    if let Some(max) = args.max_iterations {
        config = config.with_max_iterations(max);
    }

    for game in catalogue() {
        let time = std::time::Instant::now();
        let mgr = Manager::with_config(
            BddConfig::default()
                .with_storage_bits(args.size)
                .with_cache_bits(args.cache_bits),
        );

        let automaton = Translator::new(&mgr)
            .with_garbage_collection(!args.no_gc)
            .encode(&game.formula);
        let inputs: Vec<Proposition> = game.inputs.iter().map(|&name| Proposition::letter(name)).collect();
        let outputs: Vec<Proposition> = automaton
            .letters()
            .iter()
            .filter(|p| !inputs.contains(p))
            .cloned()
            .collect();

        println!("\n{}: {}", game.name, game.formula);
        println!(
            "  inputs = {:?}, outputs = {:?}, state variables = {}",
            inputs.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            outputs.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            automaton.variables().len()
        );

        let spec = GameSpec::new(automaton, inputs, outputs);
        let solver = Solver::with_config(&mgr, &spec, config);
        let outcome = solver.run();
        println!("  verdict = {} after {} iterations", outcome.verdict, outcome.iterations);

        if spec.inputs().is_empty() {
            if let Some(trace) = solver.witness(&outcome) {
                for (t, step) in trace.iter().enumerate() {
                    let letters: Vec<String> = step
                        .iter()
                        .map(|(p, value)| if *value { p.to_string() } else { format!("!{}", p) })
                        .collect();
                    println!("  t = {}: {}", t, letters.join(" "));
                }
            }
        }

        println!("  {:?}, done in {:.3} s", mgr, time.elapsed().as_secs_f64());
    }

    Ok(())
}
