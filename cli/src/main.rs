//! CLI entrypoint for warroom
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use warroom_application::{
    AgentRunner, BatchScheduler, CompositeProgressNotifier, ConsultAgentUseCase, ConsultInput,
    ExecutionParams, LearningStore, NoLearningStore, NoResponseCache, PhaseExecutor,
    ProgressNotifier, ProviderRouter, ResponseCache, RoutingPolicy, WorkflowConfig, WorkflowInput,
    WorkflowOrchestrator,
};
use warroom_domain::{AgentCatalog, Language, OutputFormat, PhasePlan, Task};
use warroom_infrastructure::{
    Catalog, ConfigLoader, FileConfig, FileLearningConfig, JsonlEventLogger, JsonlLearningStore,
    MemoryLearningStore, MemoryResponseCache, build_backends, load_templates, offline_backends,
};
use warroom_presentation::{
    AskArgs, Cli, Command, ConsoleFormatter, OutputFormatter, ProgressReporter, RunArgs,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    info!("Starting warroom");

    let config = load_config(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
        return Ok(());
    }

    check_config(&config)?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Run(args) => run(args, &config).await,
        Command::Ask(args) => ask(args, &config).await,
        Command::Agents => {
            let catalog = Catalog::load(config.catalog.agents.as_deref())?;
            print!("{}", ConsoleFormatter::format_agents(&catalog.agents));
            Ok(())
        }
        Command::Phases => {
            let catalog = Catalog::load(config.catalog.agents.as_deref())?;
            print!("{}", ConsoleFormatter::format_phases(&catalog.plan, &catalog.agents));
            Ok(())
        }
    }
}

/// Stderr logging from the `-v` count (RUST_LOG wins), plus an optional
/// daily rolling file. The returned guard must live until exit.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "warroom.log"));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")
}

fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{}", issue);
        } else {
            warn!("{}", issue);
        }
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("Configuration has {} error(s)", errors);
    }
    Ok(())
}

/// Everything shared by `run` and `ask`.
struct Engine {
    catalog: Arc<AgentCatalog>,
    plan: Arc<PhasePlan>,
    router: Arc<ProviderRouter>,
    runner: Arc<AgentRunner>,
    params: ExecutionParams,
}

fn build_engine(config: &FileConfig, offline: bool) -> Result<Engine> {
    let params = config.to_execution_params();

    let catalog = Catalog::load(config.catalog.agents.as_deref()).context("Failed to load agent catalog")?;
    let templates = load_templates(config.catalog.templates.as_deref())
        .context("Failed to load fallback templates")?;

    let (backends, policy) = if offline {
        (offline_backends(), RoutingPolicy::default())
    } else {
        (
            build_backends(&config.effective_providers())?,
            config.routing.to_policy(),
        )
    };

    let cache: Arc<dyn ResponseCache> = if config.cache.enabled {
        Arc::new(MemoryResponseCache::new(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.max_entries,
        ))
    } else {
        Arc::new(NoResponseCache)
    };

    let router = Arc::new(ProviderRouter::new(backends, policy, cache)?);
    info!("Backends: {}", router.backend_names().join(", "));
    let runner = Arc::new(AgentRunner::new(Arc::clone(&router), Arc::new(templates), params.runner.clone()));

    Ok(Engine {
        catalog: Arc::new(catalog.agents),
        plan: Arc::new(catalog.plan),
        router,
        runner,
        params,
    })
}

fn build_learning(config: &FileLearningConfig) -> Result<Arc<dyn LearningStore>> {
    if !config.enabled {
        return Ok(Arc::new(NoLearningStore));
    }
    match &config.path {
        Some(path) => {
            let store = JsonlLearningStore::open(path, config.capacity, config.match_threshold)
                .with_context(|| format!("Failed to open learning store {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryLearningStore::new(config.capacity, config.match_threshold))),
    }
}

fn resolve_language(cli_code: Option<&str>, config: &FileConfig) -> Language {
    match cli_code {
        Some(code) => code.parse().unwrap_or_default(),
        None => config.orchestration.language(),
    }
}

async fn run(args: RunArgs, config: &FileConfig) -> Result<()> {
    let engine = build_engine(config, args.offline)?;
    let learning = build_learning(&config.learning)?;

    let scheduler = BatchScheduler::new(Arc::clone(&engine.runner), engine.params.batch);
    let executor = PhaseExecutor::new(Arc::clone(&engine.catalog), scheduler, engine.params.selection);
    let orchestrator = WorkflowOrchestrator::new(executor, engine.plan, learning, &engine.params)?;

    let phases = if args.phases.is_empty() {
        config.orchestration.phases.clone()
    } else {
        args.phases
    };
    let mut workflow = WorkflowConfig::default()
        .with_phases(phases)
        .with_language(resolve_language(args.language.as_deref(), config))
        .with_deep_analysis(args.deep || config.orchestration.deep_analysis);
    if let Some(max) = args.max_iterations {
        workflow = workflow.with_max_iterations(max);
    }
    let task = Task::new(args.task).context("A task description is required")?;
    let input = WorkflowInput::new(task).with_config(workflow);

    // Ctrl-C cancels at the next phase boundary
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping at the next phase boundary");
            signal_cancel.cancel();
        }
    });

    let reporter = ProgressReporter::new();
    let events = args.events_log.as_ref().and_then(|path| JsonlEventLogger::new(path));
    let mut delegates: Vec<&dyn ProgressNotifier> = Vec::new();
    if !args.quiet && config.output.show_progress {
        delegates.push(&reporter);
    }
    if let Some(logger) = &events {
        delegates.push(logger);
    }
    let progress = CompositeProgressNotifier::new(delegates);

    let report = orchestrator
        .execute_with_progress(input, &progress, &cancel)
        .await
        .context("Workflow did not complete")?;

    for backend in engine.router.stats_snapshot() {
        info!(
            "Backend {} ({}): {} requests, {} ok, {} failed, {} cached, {:.0}ms mean, score {:.2}",
            backend.name,
            backend.model,
            backend.requests,
            backend.successes,
            backend.failures,
            backend.cache_hits,
            backend.mean_latency_ms,
            backend.score
        );
    }

    let format = args.output.map(OutputFormat::from).unwrap_or(config.output.format);
    println!("{}", ConsoleFormatter.render(&report, format));
    Ok(())
}

async fn ask(args: AskArgs, config: &FileConfig) -> Result<()> {
    let engine = build_engine(config, args.offline)?;
    let use_case = ConsultAgentUseCase::new(engine.catalog, engine.runner);

    let mut input = ConsultInput::new(args.agent, args.question)
        .with_language(resolve_language(args.language.as_deref(), config));
    if let Some(context) = args.context {
        input = input.with_context(context);
    }

    let response = use_case.execute(input).await?;
    print!("{}", ConsoleFormatter::format_consult(&response));
    Ok(())
}
