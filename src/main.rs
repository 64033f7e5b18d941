//! Wildscene CLI entry point.

#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

fn main() {
    if let Err(e) = wildscene::run() {
        eprintln!("error: {e}");
        for cause in e.causes() {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}
