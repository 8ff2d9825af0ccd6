//! `icall info` — Display version and environment info.

use icall_sdk::{FLAG_RAW, FLAG_WRAPPED, MAX_ARITY};

pub fn execute() -> anyhow::Result<()> {
    println!("icall v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Platform:     {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    println!("Max arity:    {}", MAX_ARITY);
    println!("Flags:        wrapped = {}, raw = {}", FLAG_WRAPPED, FLAG_RAW);

    println!();
    println!("Environment:");
    print_env("  ICALL_LOG", "ICALL_LOG");
    print_env("  NO_COLOR", "NO_COLOR");

    Ok(())
}

fn print_env(label: &str, var: &str) {
    match std::env::var(var) {
        Ok(val) => println!("{} = {}", label, val),
        Err(_) => println!("{} = (default)", label),
    }
}
