use gridplan::config::{Config, OutputFormat};
use gridplan::report::{format_policies, format_utilities, PlanSummary};
use gridplan::{find_path, GridWorld, PlanError, ValueIterationSolver};

fn main() {
    env_logger::init();

    let config = Config::load();
    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), PlanError> {
    let mut world = GridWorld::from_config(&config.grid)?;
    let solver = ValueIterationSolver::new(&config.solver)?;
    let start = config.search.start();

    if config.output.format == OutputFormat::Table {
        println!("Calculating utilities for gamma = {:.1}...", solver.discount());
    }

    let report = solver.solve(&mut world)?;
    let outcome = find_path(&world, start);

    if config.output.format == OutputFormat::Json {
        let found = outcome.as_ref().ok();
        let summary = PlanSummary::new(&world, &report, found);
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| PlanError::invalid(format!("failed to serialize summary: {}", e)))?;
        println!("{}", json);
        return outcome.map(|_| ());
    }

    println!("\nFinished after {} sweeps!\n", report.iterations);
    println!("Calculated expected utilities for each state");
    println!("---------------------------------------------\n");
    println!("{}", format_utilities(&world));
    println!("Policy for each state");
    println!("------------------------\n");
    println!("{}", format_policies(&world));

    let path = outcome?;
    for cell in &path.cells {
        println!("Step through {},{}", cell.row, cell.col);
    }
    println!("Goal node found!\n");
    if let Some(goal) = path.goal() {
        println!("Position: {},{}", goal.row, goal.col);
    }

    Ok(())
}
