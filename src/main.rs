fn main() {
    if let Err(err) = listing_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
