#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() {
    if let Err(err) = sky_watcher::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
