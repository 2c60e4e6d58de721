use std::process;

fn main() {
    if let Err(e) = taskchain::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
