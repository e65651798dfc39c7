use clap::Parser;
use flatcalc::config::Config;
use flatcalc::toplevel;
use std::io::{stdin, stdout};
use std::process;

fn main() {
    env_logger::init();
    let config = Config::parse();

    let stdin = stdin();
    let stdout = stdout();
    if let Err(e) = toplevel::main_loop(&config, &mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("error: {}", e.report());
        process::exit(1);
    }
}
