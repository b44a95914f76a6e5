use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::engine::Engine;
use crate::interpreter::types::{Condition, Event, Execute, Merge, Split, Val, When, Where};
use crate::logging;
use crate::skeletons::{Program, Skeleton};

#[derive(Parser)]
#[command(name = "sinew")]
#[command(about = "Sinew - parallel skeletons over a worker pool", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of workers (overrides config file and env vars)
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Log filter, e.g. "debug" or "sinew_core=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipe, fork and conditional sample programs
    Demo,

    /// Sort a JSON list of numbers with a divide-and-conquer merge sort
    Dac {
        /// Input list, e.g. "[5, 3, 9, 1]"
        #[arg(long)]
        input: String,

        /// Lists of at most this many elements are sorted directly
        #[arg(long, default_value = "1")]
        threshold: usize,
    },

    /// Print the effective configuration
    Config,
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    // Eagerly load and validate configuration before executing any command
    let config = Config::builder()
        .config_path(cli.config)
        .workers(cli.workers)
        .log_level(cli.log_level)
        .build()?;
    logging::init_tracing(&config.logging.level)?;

    match cli.command {
        Commands::Demo => {
            let engine = Engine::new(config.engine);

            let pipe = Program::compile(&double_then_increment());
            let out = engine.run(&pipe, Val::Num(3.0)).await?;
            println!("pipe(double, increment)(3) = {}", render(&out));

            let fork = Program::compile(&sum_of_squares());
            let input = Val::List(vec![Val::Num(1.0), Val::Num(2.0), Val::Num(3.0)]);
            let out = engine.run(&fork, input).await?;
            println!("fork(square x3, sum)([1,2,3]) = {}", render(&out));

            let abs = Program::compile(&absolute_value());
            for x in [-5.0, 5.0] {
                let out = engine.run(&abs, Val::Num(x)).await?;
                println!("if(x<0, negate, identity)({}) = {}", x, render(&out));
            }
        }

        Commands::Dac { input, threshold } => {
            let json: JsonValue =
                serde_json::from_str(&input).context("Input must be a JSON list")?;
            let input = Val::from(&json);
            if input.as_list().is_none() {
                return Err(anyhow!("Input must be a JSON list, got {}", input.type_name()));
            }

            let engine = Engine::new(config.engine);
            let divisions = Arc::new(AtomicUsize::new(0));
            let counter = divisions.clone();
            engine.listeners().add_generic_listener(move |event: &Event| {
                if event.is(When::After, Where::Condition) && event.payload == Val::Bool(true) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            });

            let program = Program::compile(&merge_sort(threshold));
            let started = Instant::now();
            let out = engine.run(&program, input).await?;

            println!("{}", render(&out));
            println!(
                "divisions: {}, elapsed: {:.2}ms",
                divisions.load(Ordering::Relaxed),
                started.elapsed().as_secs_f64() * 1000.0
            );
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn render(val: &Val) -> String {
    JsonValue::from(val).to_string()
}

/* ===================== Sample programs ===================== */

fn num(v: &Val) -> Result<f64, crate::error::MuscleError> {
    v.as_num()
        .ok_or_else(|| format!("expected a number, got {}", v.type_name()).into())
}

fn nums(v: Val) -> Result<Vec<f64>, crate::error::MuscleError> {
    let items = v
        .into_list()
        .map_err(|other| format!("expected a list, got {}", other.type_name()))?;
    items.iter().map(num).collect()
}

fn to_list(xs: Vec<f64>) -> Val {
    Val::List(xs.into_iter().map(Val::Num).collect())
}

pub fn double_then_increment() -> Skeleton {
    Skeleton::pipe(
        Skeleton::seq(Execute::new("double", |v| Ok(Val::Num(num(&v)? * 2.0)))),
        Skeleton::seq(Execute::new("increment", |v| Ok(Val::Num(num(&v)? + 1.0)))),
    )
}

pub fn sum_of_squares() -> Skeleton {
    let square = || Skeleton::seq(Execute::new("square", |v| Ok(Val::Num(num(&v)?.powi(2)))));
    Skeleton::fork(
        Split::new("identity", |v| {
            v.into_list()
                .map_err(|other| format!("expected a list, got {}", other.type_name()).into())
        }),
        vec![square(), square(), square()],
        Merge::new("sum", |parts| {
            Ok(Val::Num(parts.iter().map(num).sum::<Result<f64, _>>()?))
        }),
    )
}

pub fn absolute_value() -> Skeleton {
    Skeleton::if_else(
        Condition::new("negative", |v| Ok(num(v)? < 0.0)),
        Skeleton::seq(Execute::new("negate", |v| Ok(Val::Num(-num(&v)?)))),
        Skeleton::seq(Execute::new("identity", Ok)),
    )
}

pub fn merge_sort(threshold: usize) -> Skeleton {
    let threshold = threshold.max(1);
    Skeleton::dac(
        Condition::new("longer-than-threshold", move |v| {
            Ok(v.as_list().map_or(false, |xs| xs.len() > threshold))
        }),
        Split::new("halve", |v| {
            let mut left = nums(v)?;
            let right = left.split_off(left.len() / 2);
            Ok(vec![to_list(left), to_list(right)])
        }),
        Skeleton::seq(Execute::new("sort", |v| {
            let mut xs = nums(v)?;
            xs.sort_by(f64::total_cmp);
            Ok(to_list(xs))
        })),
        Merge::new("merge-sorted", |parts| {
            let mut merged: Vec<f64> = Vec::new();
            for part in parts {
                let part = nums(part)?;
                let mut out = Vec::with_capacity(merged.len() + part.len());
                let (mut i, mut j) = (0, 0);
                while i < merged.len() && j < part.len() {
                    if merged[i] <= part[j] {
                        out.push(merged[i]);
                        i += 1;
                    } else {
                        out.push(part[j]);
                        j += 1;
                    }
                }
                out.extend_from_slice(&merged[i..]);
                out.extend_from_slice(&part[j..]);
                merged = out;
            }
            Ok(to_list(merged))
        }),
    )
}
