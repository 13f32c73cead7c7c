fn main() {
    if let Err(e) = perfplan::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
