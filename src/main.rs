//! Earth Shell executable
//! Opens the shell window and keeps it in step with the YAML files under the
//! config directory (`EARTH_SHELL_CONFIG_DIR`, default `config/`).

use earth_shell::{run_app, ShellConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Earth Shell...");

    let config = ShellConfig::from_env();

    if let Err(e) = run_app(config) {
        log::error!("Shell error: {:#}", e);
        std::process::exit(1);
    }
}
