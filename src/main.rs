use {
    pfos::{
        AppState,
        adapters::{
            http, images::SniffingImageIntake, sandbox::SandboxChargeProcessor,
            stripe_client::StripeChargeProcessor,
        },
        config::Config,
        domain::{
            ports::{Notifier, PaymentStore},
            provider::ChargeProcessor,
        },
        infra::{
            memory::{InMemoryOutbox, InMemoryPaymentStore},
            postgres::{email_queue::PgEmailQueue, payment_repo::PgPaymentStore},
        },
        services::payment_pipeline::PaymentPipeline,
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::signal,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("invalid configuration");

    let (store, notifier): (Arc<dyn PaymentStore>, Arc<dyn Notifier>) = match &config.database_url
    {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(20)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
                .expect("failed to connect to database");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("failed to run migrations");
            (
                Arc::new(PgPaymentStore::new(pool.clone())),
                Arc::new(PgEmailQueue::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, payments are kept in memory only");
            (
                Arc::new(InMemoryPaymentStore::new()),
                Arc::new(InMemoryOutbox::new()),
            )
        }
    };

    let processor: Arc<dyn ChargeProcessor> = match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeChargeProcessor::new(key)),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, using the sandbox charge processor");
            Arc::new(SandboxChargeProcessor::new())
        }
    };

    let pipeline = PaymentPipeline::new(
        store,
        processor,
        Arc::new(SniffingImageIntake::new(config.max_logo_bytes)),
        notifier,
        config.pipeline.clone(),
    );
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = http::router(state, config.http);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind address");
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
