fn main() {
    if let Err(err) = order_sync::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
