use std::{env, env::VarError};

/// The server takes no arguments, so any argument at all means "show me the help".
/// Returns true when help was printed and the caller should exit.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // An explicit whitelist, so a future secret-bearing variable is never printed by accident
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "SRG_HOST",
        "SRG_PORT",
        "SRG_DATABASE_URL",
        "SRG_PAYMENT_WINDOW_SECONDS",
        "SRG_EXPIRY_POLL_SECONDS",
        "SRG_EXPIRY_SWEEP_SECONDS",
        "SRG_DISABLE_EXPIRY_WORKER",
    ];

    println!("Current environment values:");
    for name in DISPLAY_ENVS {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<30} {val}");
    }
}
