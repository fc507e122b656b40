//! Store command handlers.

use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use vellum::{
    ContentDescriptor, ContentEntity, ContentId, ContentStream, ContentSubject, MediaType,
    PlainTextToHtml, PlanOrigin, RenditionRegistryBuilder, Resolution, Resolver, StoreHandle,
    StoreRegistry, VellumConfig, VellumResult, parse_accept, stream_from_bytes,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Content addressed from the command line by id and declared media type.
struct CliBlob {
    content: ContentDescriptor,
}

impl ContentSubject for CliBlob {
    fn descriptor(&self) -> Option<ContentDescriptor> {
        Some(self.content.clone())
    }
}

impl ContentEntity for CliBlob {}

/// One configured store wired for the command line.
pub struct StoreSession {
    resolver: Resolver,
    store: Arc<StoreHandle>,
}

impl StoreSession {
    /// Build the backend for `name` and register it for command-line blobs.
    ///
    /// Stores with renditions enabled get the plain text to HTML rule.
    #[tracing::instrument(skip(config))]
    pub fn open(config: &VellumConfig, name: &str) -> VellumResult<Self> {
        let store_config = config.store(name)?;

        let mut stores = StoreRegistry::builder();
        stores.register(store_config.handle_for::<CliBlob>(name)?)?;

        let mut renditions = RenditionRegistryBuilder::new();
        if store_config.renditions {
            renditions = renditions.register(name, PlainTextToHtml::rule());
        }

        let resolver = Resolver::new(Arc::new(stores.build()), Arc::new(renditions.build()));
        let store = Arc::clone(resolver.stores().lookup::<CliBlob>()?);
        Ok(Self { resolver, store })
    }

    /// Store a file and print `<content id>\t<length>`.
    pub async fn put(&self, file: &Path, id: Option<&str>) -> CliResult<()> {
        let bytes = tokio::fs::read(file).await?;
        let id = id.map(ContentId::new);
        let stored = self
            .store
            .backend()
            .set_resource(id.as_ref(), stream_from_bytes(bytes))
            .await?;
        println!("{}\t{}", stored.content_id, stored.length);
        Ok(())
    }

    /// Write the stored bytes to `output` or stdout.
    pub async fn get(&self, id: &str, output: Option<&Path>) -> CliResult<()> {
        let resource = self
            .store
            .backend()
            .get_resource(&ContentId::new(id))
            .await?;
        let written = write_stream(resource.into_stream(), output).await?;
        tracing::debug!(written, "Wrote content");
        Ok(())
    }

    /// Delete the stored bytes.
    pub async fn delete(&self, id: &str) -> CliResult<()> {
        self.store
            .backend()
            .delete_resource(&ContentId::new(id))
            .await?;
        println!("deleted {}", id);
        Ok(())
    }

    /// Print whether bytes are stored under `id`.
    pub async fn exists(&self, id: &str) -> CliResult<()> {
        let exists = self.store.backend().exists(&ContentId::new(id)).await?;
        println!("{}", exists);
        Ok(())
    }

    /// Resolve `id`, stored as `media_type`, against `accept` and write the result.
    ///
    /// The resolved media type and whether it is a rendition go to stderr.
    pub async fn resolve(
        &self,
        id: &str,
        media_type: &str,
        accept: &str,
        output: Option<&Path>,
    ) -> CliResult<()> {
        let blob = CliBlob {
            content: ContentDescriptor::new()
                .with_content_id(ContentId::new(id))
                .with_media_type(media_type.parse::<MediaType>()?),
        };
        let mut accept = parse_accept(accept)?;
        if accept.is_empty() {
            accept.push(MediaType::all());
        }

        match self.resolver.resolve(&self.store, &blob, &accept).await? {
            Resolution::Resolved(plan) => {
                match plan.origin() {
                    PlanOrigin::Stored => eprintln!("{}", plan.media_type()),
                    PlanOrigin::Rendition { source } => {
                        eprintln!("{} (rendered from {})", plan.media_type(), source)
                    }
                }
                write_stream(plan.into_stream(), output).await?;
                Ok(())
            }
            Resolution::NotApplicable => Err(format!("{} carries no content", id).into()),
            Resolution::NotFound => {
                Err(format!("no representation of {} satisfies '{}'", id, media_list(&accept)).into())
            }
        }
    }
}

/// Print every configured store.
pub fn list_stores(config: &VellumConfig) {
    for (name, store) in &config.stores {
        let location = match (&store.path, &store.endpoint) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(endpoint)) => endpoint.clone(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{}\t{}\t{}\trenditions={}",
            name, store.backend, location, store.renditions
        );
    }
}

fn media_list(media_types: &[MediaType]) -> String {
    media_types
        .iter()
        .map(MediaType::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn write_stream(mut body: ContentStream, output: Option<&Path>) -> CliResult<u64> {
    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match output {
        Some(path) => Box::new(tokio::fs::File::create(path).await?),
        None => Box::new(tokio::io::stdout()),
    };

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}
