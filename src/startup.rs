use crate::config::Config;
use crate::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[cfg(feature = "web-interface")]
use crate::components::automation::RecordingDriver;
#[cfg(feature = "web-interface")]
use crate::components::credentials::{EncryptedFileStore, InMemorySecretStore, SecretStore};
#[cfg(feature = "web-interface")]
use crate::server::{self, AppState};
#[cfg(feature = "web-interface")]
use std::sync::Arc;

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Serve the automation API until a shutdown signal arrives
#[cfg(feature = "web-interface")]
pub async fn serve(config: Config) -> miette::Result<()> {
    let addr = config.socket_addr()?;

    if config.portal_url.is_empty() {
        warn!("PORTAL_URL is not set");
    }
    info!("Using dry-run portal driver (step delay {}ms)", config.step_delay_ms);
    let driver = Box::new(RecordingDriver::new(config.portal_url.clone(), config.headless));
    let secrets = secret_store(&config)?;
    let state = AppState::new(config, secrets, driver);
    let shutdown_driver = Arc::clone(&state.driver);

    let app = server::router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    // Close the browser session once no run holds it
    if let Err(e) = shutdown_driver.lock().await.close().await {
        error!("Error closing browser session: {:?}", e);
    } else {
        info!("Browser session closed");
    }

    Ok(())
}

/// Pick the login store: an encrypted file when a passphrase is configured
#[cfg(feature = "web-interface")]
pub fn secret_store(config: &Config) -> miette::Result<Arc<dyn SecretStore>> {
    match &config.credentials_key {
        Some(passphrase) => {
            let store = EncryptedFileStore::new(&config.credentials_file, passphrase)?;
            info!("Keeping credentials in {}", store.path().display());
            Ok(Arc::new(store))
        }
        None => {
            warn!("CREDENTIALS_KEY is not set; credentials are kept in memory only");
            Ok(Arc::new(InMemorySecretStore::default()))
        }
    }
}

#[cfg(all(test, feature = "web-interface"))]
mod tests {
    use super::*;
    use crate::components::credentials::Credentials;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_configured_passphrase_persists_credentials() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            credentials_file: dir.path().join("login.enc").display().to_string(),
            credentials_key: Some("correct horse".to_string()),
            ..Config::default()
        };

        let store = secret_store(&config).unwrap();
        assert!(store.save(&Credentials::new("ana@example.com", "s3cret")).await);
        drop(store);

        let restarted = secret_store(&config).unwrap();
        let loaded = restarted.load().await.unwrap();
        assert_eq!(loaded.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_without_passphrase_nothing_is_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.enc");
        let config = Config {
            credentials_file: path.display().to_string(),
            ..Config::default()
        };

        let store = secret_store(&config).unwrap();
        assert!(store.save(&Credentials::new("ana@example.com", "s3cret")).await);
        assert!(!path.exists());
    }
}
