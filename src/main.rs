fn main() {
    #[cfg(feature = "cli")]
    dvpl::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("dvpl: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
