//! # Kassa Terminal Entry Point
//!
//! Runs a scripted sale against the demo catalog and prints every command
//! response as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! RUST_LOG=kassa_core=trace KASSA_STACKING=exclude_best kassa-terminal
//! ```

fn main() {
    // The actual setup is in lib.rs for better testability
    if let Err(e) = kassa_terminal::run() {
        eprintln!("kassa-terminal: {}", e);
        std::process::exit(1);
    }
}
