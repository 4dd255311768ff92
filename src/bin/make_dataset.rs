use clap::Parser;

use downselect::cli::{MakeDatasetArgs, make_dataset};

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args = MakeDatasetArgs::parse();
    if let Err(e) = make_dataset(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
