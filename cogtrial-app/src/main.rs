mod app;
mod catalog;
mod cli;
mod export;
mod hooks;
mod logging;
mod participant;
mod presets;

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::Cli;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, cli.verbose);

    let report = App::new(cli)?.run()?;
    for (block, summary) in &report.summaries {
        info!(
            %block,
            accuracy_percent = summary.accuracy_percent(),
            mean_rt_ms = ?summary.mean_rt_ms(),
            "finished"
        );
    }
    match &report.exported {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("session finished without an export"),
    }
    Ok(())
}
