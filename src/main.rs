//! bufstage - Stage Protobuf sources into a Buf workspace and run buf

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = bufstage::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
