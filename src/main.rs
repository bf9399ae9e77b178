mod cli;
mod load;

fn main() {
    let matches = cli::app().get_matches();
    let _logger = match cli::init_logger(matches.occurrences_of("verbose")) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {}", e);
            None
        }
    };
    let errs = cli::run(&matches);
    if !errs.is_empty() {
        eprint!("{}", errs);
    }
    if errs.is_fatal() {
        std::process::exit(1);
    }
}
