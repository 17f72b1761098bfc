use pansync_core::logging;

mod cli;
mod manifest;
mod render;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the
    // state dir is unwritable.
    if logging::init().is_err() {
        logging::init_stderr();
    }

    if let Err(err) = cli::run_from_args() {
        eprintln!("pansync error: {:#}", err);
        std::process::exit(1);
    }
}
