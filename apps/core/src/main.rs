use omnisearch_core::runtime::{self, RuntimeError};

fn main() {
    match runtime::run() {
        Ok(()) => {}
        Err(RuntimeError::Usage(error)) => error.exit(),
        Err(error) => {
            eprintln!("[omnisearch-core] runtime failed: {error}");
            std::process::exit(1);
        }
    }
}
