use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::extract::mediainfo::MediaInfoCli;
use crate::extract::MetadataExtractor;
use crate::output::{Presentation, ReportContext};
use crate::sampler::Sampler;
use crate::sources::ResolverRegistry;
use crate::utils::filename_from_url;
use crate::Result;

/// One analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub url: String,
    pub format: OutputFormat,
}

impl SourceRequest {
    pub fn new(url: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }
}

/// Resolve, sample, analyze and render a media URL
pub struct AnalysisPipeline {
    resolvers: ResolverRegistry,
    sampler: Sampler,
    extractor: Arc<dyn MetadataExtractor>,
}

impl AnalysisPipeline {
    /// Create a pipeline backed by the mediainfo CLI
    pub fn new(config: &Config) -> Result<Self> {
        let extractor = Arc::new(MediaInfoCli::from_config(config));
        Self::with_extractor(config, extractor)
    }

    /// Create a pipeline with a custom extractor
    pub fn with_extractor(config: &Config, extractor: Arc<dyn MetadataExtractor>) -> Result<Self> {
        Ok(Self {
            resolvers: ResolverRegistry::new(),
            sampler: Sampler::new(config)?,
            extractor,
        })
    }

    pub fn extractor(&self) -> &dyn MetadataExtractor {
        self.extractor.as_ref()
    }

    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    pub fn max_sample_bytes(&self) -> u64 {
        self.sampler.max_bytes()
    }

    /// Run the whole pipeline for one request
    ///
    /// The sample is deleted before this returns, whether analysis succeeded or not.
    pub async fn analyze(&self, request: &SourceRequest) -> Result<Presentation> {
        let resolution = self.resolvers.resolve(&request.url)?;
        let sample = self.sampler.fetch_first(&resolution).await?;

        tracing::info!(
            "Analyzing {} byte sample with {}",
            sample.len(),
            self.extractor.name()
        );
        let analysis = self.extractor.extract(sample.path()).await;

        let context = ReportContext {
            filename: sample
                .suggested_name()
                .map(str::to_string)
                .unwrap_or_else(|| filename_from_url(&resolution.original_url)),
            declared_length: sample.declared_length(),
            sample_length: sample.len(),
        };
        sample.close();

        let tracks = analysis?;
        tracing::info!("Rendering {} tracks for {} as {}", tracks.len(), context.filename, request.format);

        Ok(Presentation::render(&context, &tracks, request.format))
    }
}
