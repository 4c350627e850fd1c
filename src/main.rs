fn main() {
    if let Err(err) = hwreport::cli::run() {
        hwreport::ui::eprintln_error(&err);
        std::process::exit(hwreport::exit::exit_code(&err));
    }
}
