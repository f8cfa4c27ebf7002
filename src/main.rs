use tab_lineage::cli;

fn main() {
    // Process CLI arguments first (before logging init for cleaner output)
    let (options, command) = match cli::process_cli() {
        cli::CliResult::Exit(code) => std::process::exit(code),
        cli::CliResult::Run(options, command) => (options, command),
    };

    // Routes all log::info!() etc. to /tmp/tab_lineage_debug.log.
    // When RUST_LOG is set, also mirrors to stderr.
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied later).
    tab_lineage::debug::init_log_bridge(options.log_level);

    log::info!("Starting tab-lineage {}", tab_lineage::VERSION);

    let code = cli::run(&options, command);
    log::logger().flush();
    if code != 0 {
        std::process::exit(code);
    }
}
