fn main() {
    if let Err(err) = xmg_viewer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
