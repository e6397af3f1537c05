//! Inicialización del logger de la aplicación (`env_logger`).
//! `RUST_LOG` manda; sin él, `info` (o `debug` con `--verbose`).

use env_logger::Env;

/// Devuelve `false` si ya había un logger instalado.
pub fn init_logging(verbose: bool) -> bool {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default)).format_timestamp_millis()
                                                                            .try_init()
                                                                            .is_ok()
}
