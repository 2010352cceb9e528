use std::env;
use std::io::Write;
use std::path::Path;
use std::process;

use env_logger::Builder;

use dslab_lambda::config::{Config, ConfigParamResolvers, WorkerConfig};
use dslab_lambda::error::Result;
use dslab_lambda::scheduler::InvocationScheduler;
use dslab_lambda::trace::{ScheduleTrace, Trace};

fn default_config() -> Config {
    Config {
        workers: vec![
            WorkerConfig {
                total_memory: 512,
                cpu_capacity: 1000,
            };
            5
        ],
        ..Default::default()
    }
}

fn format_functions(functions: &[usize]) -> String {
    if functions.is_empty() {
        return "no warm functions".to_string();
    }
    functions
        .iter()
        .map(|f| format!("func{}", f))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run(config: Config) -> Result<()> {
    let trace = ScheduleTrace::periodic(10, 3, 50.0);
    let mut sim = InvocationScheduler::new(config)?;
    // requests go one by one so that the warm status is observed right after each of them
    for request in trace.request_iter() {
        sim.send_invocation_request(request.function_type, request.time)?;
        sim.run()?;
        println!("warm function status at time {}:", request.time);
        for (worker_id, functions) in sim.status_snapshot(request.time) {
            println!("  worker {}: {}", worker_id, format_functions(&functions));
        }
    }
    for outcome in sim.outcomes() {
        println!(
            "request {} executed on worker {} ({}), finish time {}",
            outcome.request.id,
            outcome.worker_id.unwrap_or_default(),
            if outcome.is_cold() { "cold" } else { "warm" },
            outcome.finish_time.unwrap_or_default()
        );
    }
    for request in trace.request_iter() {
        let usage: Vec<String> = sim
            .pool()
            .iter()
            .map(|w| format!("{}", sim.ledger().usage_at(w.id, request.time)))
            .collect();
        println!("memory usage at time {}: [{}] MB", request.time, usage.join(", "));
    }
    let stats = sim.stats();
    println!(
        "invocations = {}, cold starts = {}, warm ratio = {:.3}",
        stats.global.invocations,
        stats.global.cold_starts,
        stats.global.warm_ratio()
    );
    Ok(())
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
    let config = match env::args().nth(1) {
        Some(path) => Config::from_yaml(Path::new(&path), &ConfigParamResolvers::default()),
        None => Ok(default_config()),
    };
    if let Err(e) = config.and_then(run) {
        log::error!("{}", e);
        process::exit(1);
    }
}
