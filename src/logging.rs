/// starts the logger from `RUST_LOG`, with the verbosity flags setting the
/// level for every module
pub fn init(verbose: bool, debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();

    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Info);
    }

    builder.init();
}
