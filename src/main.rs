use agrinova::utils::errors::{AgriError, ErrorCode};

fn main() -> Result<(), AgriError> {
    tokio::runtime::Builder::new_multi_thread()
        // Cap the number of blocking threads - argon hashing of passwords and OTPs runs there, so
        // under heavy load this stops an explosion of threads.
        .max_blocking_threads(num_cpus::get())
        .enable_all()
        .build()
        .map_err(|err| ErrorCode::IOError.with_msg(&format!("Unable to start the runtime: {}", err)))?
        .block_on(async {
            agrinova::lib_main().await
        })
}
