//! # Mostrador
//!
//! ```bash
//! mostrador                                    # 127.0.0.1:8080, platform data dir
//! MOSTRADOR_PORT=9000 RUST_LOG=debug mostrador
//! MOSTRADOR_CONFIG=./mostrador.toml mostrador
//! ```

use mostrador_web::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mostrador_web::init_tracing();

    let config = AppConfig::load()?;
    mostrador_web::run(config).await
}
