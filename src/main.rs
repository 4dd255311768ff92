use clap::Parser;

use downselect::cli::{Args, run};

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args = Args::parse();
    match run(&args) {
        Ok(outcome) => {
            log::info!(
                "Selected {} items, result in {}",
                outcome.ranked.len(),
                outcome.result_path.display()
            );
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
