use std::process::ExitCode;

fn main() -> ExitCode {
    netprice_cli::run()
}
