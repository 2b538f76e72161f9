fn main() {
    #[cfg(feature = "cli")]
    lzwin::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("lzwin: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
