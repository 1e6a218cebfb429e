use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use joinopt::config::Config;
use joinopt::query::graph::{load_query_graph, GraphShape, GraphSpec};
use joinopt::query::optimizer::{EnumeratorRegistry, JoinOrderOptimizer};
use joinopt::utils::logging;

#[derive(Parser)]
#[clap(version = "0.1.0", author = "joinopt contributors")]
enum Cli {
    /// Optimize the join order of a query graph
    Plan {
        /// Query graph description (TOML)
        #[clap(short, long)]
        graph: PathBuf,
        /// Enumeration algorithm, overrides the config file
        #[clap(short, long)]
        algorithm: Option<String>,
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Write the join tree as Graphviz DOT
        #[clap(long)]
        dot: Option<PathBuf>,
        /// Print every plan table entry
        #[clap(long)]
        show_table: bool,
        /// Print the result as JSON
        #[clap(long)]
        json: bool,
    },
    /// Run every registered algorithm on a query graph
    Compare {
        #[clap(short, long)]
        graph: PathBuf,
        #[clap(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate a random connected query graph
    Generate {
        /// chain, cycle, star, clique or random
        #[clap(short, long, default_value = "chain")]
        shape: String,
        #[clap(short, long, default_value = "6")]
        relations: usize,
        #[clap(long, default_value = "42")]
        seed: u64,
        /// Output file, stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// List registered algorithms
    List,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) -> Result<()> {
    logging::init(&config.log).map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))
}

fn run_plan(
    graph_path: &Path,
    algorithm: Option<String>,
    config: Config,
    dot: Option<PathBuf>,
    show_table: bool,
    json: bool,
) -> Result<()> {
    let mut optimizer_config = config.optimizer;
    if let Some(algorithm) = algorithm {
        optimizer_config = optimizer_config.with_algorithm(algorithm);
    }
    let optimizer = JoinOrderOptimizer::new(optimizer_config);
    let (graph, result) = optimizer
        .optimize_file(graph_path)
        .with_context(|| format!("无法优化查询图 {}", graph_path.display()))?;

    if json {
        let output = serde_json::json!({
            "algorithm": result.algorithm,
            "total_cost": result.total_cost,
            "cardinality": result.cardinality,
            "plan_table_entries": result.plan_table.len(),
            "elapsed_us": result.elapsed.as_micros() as u64,
            "tree": result.tree,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("algorithm:   {}", result.algorithm);
        println!("join tree:   {}", result.tree);
        println!("cost:        {:.2}", result.total_cost);
        println!("cardinality: {:.0}", result.cardinality);
        println!("entries:     {}", result.plan_table.len());
        println!("elapsed:     {:?}", result.elapsed);
    }

    if show_table {
        let estimator = optimizer.create_estimator()?;
        print!("{}", result.plan_table.dump(&graph, estimator.as_ref()));
    }

    if let Some(path) = dot {
        fs::write(&path, result.tree.to_dot())
            .with_context(|| format!("无法写入 {}", path.display()))?;
    }
    Ok(())
}

fn run_compare(graph_path: &Path, config: Config) -> Result<()> {
    let graph = load_query_graph(graph_path)
        .with_context(|| format!("无法加载查询图 {}", graph_path.display()))?;
    let optimizer = JoinOrderOptimizer::new(config.optimizer);

    println!(
        "{:<14} {:>16} {:>16} {:>8} {:>12}",
        "algorithm", "cost", "cardinality", "entries", "elapsed"
    );
    for name in EnumeratorRegistry::names() {
        match optimizer.optimize_with(&graph, &name) {
            Ok(result) => println!(
                "{:<14} {:>16.2} {:>16.0} {:>8} {:>12?}",
                name,
                result.total_cost,
                result.cardinality,
                result.plan_table.len(),
                result.elapsed
            ),
            Err(e) => println!("{:<14} {}", name, e),
        }
    }
    Ok(())
}

fn run_generate(shape: &str, relations: usize, seed: u64, output: Option<PathBuf>) -> Result<()> {
    let shape: GraphShape = shape.parse()?;
    let text = GraphSpec::random(shape, relations, seed).to_toml()?;
    match output {
        Some(path) => fs::write(&path, text)
            .with_context(|| format!("无法写入 {}", path.display()))?,
        None => print!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli {
        Cli::Plan {
            graph,
            algorithm,
            config,
            dot,
            show_table,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            init_logging(&config)?;
            run_plan(&graph, algorithm, config, dot, show_table, json)
        }
        Cli::Compare { graph, config } => {
            let config = load_config(config.as_deref())?;
            init_logging(&config)?;
            run_compare(&graph, config)
        }
        Cli::Generate {
            shape,
            relations,
            seed,
            output,
        } => run_generate(&shape, relations, seed, output),
        Cli::List => {
            for name in EnumeratorRegistry::names() {
                let exhaustive = EnumeratorRegistry::get(&name)
                    .map(|e| e.is_exhaustive())
                    .unwrap_or(false);
                println!("{:<14} {}", name, if exhaustive { "exhaustive" } else { "heuristic" });
            }
            Ok(())
        }
    };

    logging::shutdown();
    result
}
