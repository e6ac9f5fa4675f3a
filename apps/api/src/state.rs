use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::documents::pdf::PdfRenderer;
use crate::ingest::enrich::JobEnricher;
use crate::profile::CandidateProfile;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Enrichment queue for batch-ingested jobs.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable enrichment backend. Default: LlmJobEnricher.
    pub enricher: Arc<dyn JobEnricher>,
    pub renderer: Arc<dyn PdfRenderer>,
    pub profile: Arc<CandidateProfile>,
}

#[cfg(test)]
impl AppState {
    /// State whose pool and Redis client never connect until first use.
    pub(crate) fn for_tests(enricher: Arc<dyn JobEnricher>) -> Self {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
        use sqlx::postgres::PgPoolOptions;

        use crate::documents::pdf::testing::StaticPdfRenderer;

        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let redis = RedisClient::open(config.redis_url.clone()).unwrap();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .endpoint_url(&config.s3_endpoint)
            .build();

        AppState {
            db,
            redis,
            s3: S3Client::from_conf(s3_config),
            config,
            enricher,
            renderer: Arc::new(StaticPdfRenderer),
            profile: Arc::new(crate::profile::sample_profile()),
        }
    }
}
