use clap::Parser;

fn main() {
    use sekimori::util::cli::*;

    dotenv::dotenv().ok();

    let opts = Options::parse();
    run_cli_action(opts);
}
