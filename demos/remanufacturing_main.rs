use remansim::remanufacturing::buffers::BufferKind;
use remansim::remanufacturing::config::{LineParameters, DEFAULT_HORIZON};
use remansim::remanufacturing::replications::run_replications;
use remansim::{run_simulation, SimulationReport};
use std::env;
use std::fs;

// Usage: remanufacturing_main [PARAMS.json] [HORIZON] [REPLICATIONS]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let params = match args.first() {
        Some(path) => LineParameters::from_json_str(&fs::read_to_string(path)?)?,
        None => LineParameters::default(),
    };
    let horizon = match args.get(1) {
        Some(value) => value.parse::<f64>()?,
        None => DEFAULT_HORIZON,
    };
    let replications = match args.get(2) {
        Some(value) => value.parse::<u64>()?,
        None => 1,
    };

    println!("Remanufacturing line simulation");
    println!("  Horizon: {} minutes", horizon);
    println!("  Seed: {}", params.options.random_seed);
    println!(
        "  Warm-up: {}  Repair stations: {}  Max repair attempts: {}",
        params.options.warmup_period, params.component_repair.capacity, params.component_repair.max_repair_attempts
    );
    println!();

    if replications > 1 {
        let base = params.options.random_seed;
        let seeds: Vec<u64> = (0..replications).map(|i| base + i).collect();
        let (_, summary) = run_replications(horizon, &params, &seeds)?;
        println!("Replications: {}", summary.replications);
        println!("  {:<20} {:>12} {:>12} {:>12}", "", "mean", "min", "max");
        for (name, spread) in [
            ("total_cost", summary.total_cost),
            ("total_income", summary.total_income),
            ("fulfilled_requests", summary.fulfilled_requests),
            ("delayed_requests", summary.delayed_requests),
            ("mean_delay_time", summary.mean_delay_time),
        ] {
            println!("  {:<20} {:>12.2} {:>12.2} {:>12.2}", name, spread.mean, spread.min, spread.max);
        }
        return Ok(());
    }

    let report = run_simulation(horizon, &params)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("Results (run {}):", report.run_id);
    println!("{}", report.results);
    println!();

    let costs = &report.costs;
    println!("Costs:");
    println!("  Delay penalties: {:.2}", costs.delay_penalties);
    println!("  Operating:       {:.2} ({:.1} busy hours)", costs.operating, report.busy_hours);
    println!("  Cores:           {:.2} ({} purchased)", costs.cores, report.cores_purchased);
    println!("  Components:      {:.2} ({} purchased)", costs.components, report.components_purchased);
    println!();

    println!("Buffers:");
    println!("  {:<28} {:>8} {:>6} {:>6} {:>6}", "buffer", "mean", "min", "max", "final");
    for summary in &report.buffer_summary_total {
        println!(
            "  {:<28} {:>8.2} {:>6} {:>6} {:>6}",
            summary.buffer.name(),
            summary.mean_count,
            summary.min_count,
            summary.max_count,
            report.final_level(summary.buffer)
        );
    }
    if !report.buffer_summary_by_type.is_empty() {
        println!();
        println!("Component buffers by type:");
        for summary in &report.buffer_summary_by_type {
            if let Some(component_type) = summary.component_type {
                println!(
                    "  {:<28} {:<12} {:>8.2} {:>6} {:>6}",
                    summary.buffer.name(),
                    component_type.to_string(),
                    summary.mean_count,
                    summary.min_count,
                    summary.max_count
                );
            }
        }
    }

    let flow = &report.flow;
    println!();
    println!("Flow:");
    println!(
        "  Cores received {} / disassembled {} / discarded {}",
        flow.cores_received,
        flow.cores_disassembled,
        report.final_level(BufferKind::DiscardedCores)
    );
    println!(
        "  Components created {} / replenished {} / consumed {} / repair attempts {}",
        flow.components_created, flow.components_replenished, flow.components_consumed, flow.repair_attempts
    );
    println!("  Products assembled {} / shipped {}", flow.products_assembled, flow.products_shipped);
}
