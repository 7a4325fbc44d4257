fn main() {
    if let Err(err) = artist_metro::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
