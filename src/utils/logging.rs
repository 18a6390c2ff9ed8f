//! Process-wide logging setup.
//!
//! The library only talks to the `log` facade; the binary calls [`init`] once
//! at startup to install an `env_logger` sink on stderr.

use env_logger::{Builder, Env};
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the stderr logger.
///
/// `RUST_LOG` wins over `default_level`. Calling this more than once is a no-op.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let env = Env::default().default_filter_or(default_level);
        let result = Builder::from_env(env)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                    record.level(),
                    record.args()
                )
            })
            .try_init();
        if let Err(e) = result {
            eprintln!("Warning: logger already installed: {}", e);
        }
    });
}
