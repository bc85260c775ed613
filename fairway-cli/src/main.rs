//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = fairway_cli::run() {
        eprintln!("fairway: {err}");
        std::process::exit(1);
    }
}
