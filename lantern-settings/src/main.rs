use clap::Parser;
use lantern_settings::cli::{init_simple_tracing, SettingsCli, SettingsCliRunner};

fn main() {
    let cli = SettingsCli::parse();
    init_simple_tracing(cli.log_level.as_deref());

    if let Err(e) = SettingsCliRunner::run(cli) {
        tracing::error!(error = %e, "lantern-settings failed");
        std::process::exit(1);
    }
}
