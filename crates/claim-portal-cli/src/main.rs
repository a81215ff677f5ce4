#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    claim_portal_cli::main_entry()
}
