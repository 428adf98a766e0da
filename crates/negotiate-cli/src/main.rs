// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use negotiate_app::{DashboardState, DemoSeed, JsonFileSeed, SeedProvider, demo_seed};
use runtime::LocalRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    if options.print_demo_seed {
        println!("{}", demo_seed().to_json_pretty()?);
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `negotiate --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let provider = seed_provider(options.seed_path.clone().or_else(|| config.seed_path()));
    let seed = provider.load()?;
    let mut state = DashboardState::from_seed(seed, config.default_filter())
        .with_context(|| format!("build dashboard from {}", provider.describe()))?;
    state.show_summary = config.show_summary();
    let poll_interval = config.poll_interval()?;

    if options.check_only {
        println!(
            "ok: {} influencers, {} messages from {}",
            state.influencers().len(),
            state.messages().len(),
            provider.describe()
        );
        return Ok(());
    }

    let log_dir = config.log_dir()?;
    let _logging = logging::init(&log_dir, config.log_level())?;
    tracing::info!(
        config = %options.config_path.display(),
        seed = %provider.describe(),
        influencers = state.influencers().len(),
        messages = state.messages().len(),
        "starting dashboard"
    );

    let mut runtime = LocalRuntime::new();
    let result = negotiate_tui::run_app(&mut state, &mut runtime, poll_interval);
    tracing::info!(sent = runtime.sent(), "dashboard closed");
    result
}

fn seed_provider(path: Option<PathBuf>) -> Box<dyn SeedProvider> {
    match path {
        Some(path) => Box::new(JsonFileSeed::new(path)),
        None => Box::new(DemoSeed),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    seed_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    print_demo_seed: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        seed_path: None,
        print_config_path: false,
        print_example: false,
        print_demo_seed: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a JSON file path"))?;
                options.seed_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-demo-seed" => {
                options.print_demo_seed = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("negotiate: campaign negotiations dashboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --seed <path>            Load influencers and messages from a JSON seed");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --print-demo-seed        Print the built-in campaign as a JSON seed");
    println!("  --check                  Validate config + seed and exit");
    println!("  --help                   Show this help");
}
