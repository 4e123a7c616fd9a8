pub mod collapsible;
pub mod config;
pub mod dom;
pub mod images;
pub mod parser;
pub mod toc;
pub mod writer;

use config::Config;
use dom::Document;
pub use images::{data_uri, FsImageLoader, ImageLoader};

/// Parse, transform and serialize a user guide, reading images from disk.
pub fn preprocess(html: &str, config: &Config) -> Result<String, PreprocessError> {
    let loader = FsImageLoader::new(config.images.base_dir.clone());
    preprocess_with_loader(html, config, &loader)
}

/// Full pipeline with an external image loader (for WASM JS callbacks).
pub fn preprocess_with_loader(
    html: &str,
    config: &Config,
    loader: &dyn ImageLoader,
) -> Result<String, PreprocessError> {
    let mut doc = parser::parse(html)?;
    let report = transform_document(&mut doc, config, loader)?;
    log::debug!("{report:?}");
    Ok(writer::serialize(&doc)?)
}

/// Counts from one run of [`transform_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub toc_entries: usize,
    pub collapsible_controls: usize,
    pub images_inlined: usize,
    pub images_failed: usize,
}

/// Rebuild the table of contents, inject collapsible controls, then inline
/// images. Nothing is mutated if the container or body cannot be found.
pub fn transform_document(
    doc: &mut Document,
    config: &Config,
    loader: &dyn ImageLoader,
) -> Result<Report, PreprocessError> {
    let toc = &config.toc;
    let container = doc
        .find_by_id(&toc.container_tag, &toc.container_id)
        .ok_or_else(|| PreprocessError::MissingTocContainer {
            tag: toc.container_tag.clone(),
            id: toc.container_id.clone(),
        })?;
    let body = doc.find_element("body").ok_or(PreprocessError::MissingBody)?;

    doc.clear(container);
    doc.set_attribute(container, "id", &toc.container_id);
    let toc_entries = toc::build_table_of_contents(doc, toc, container, Some(body), 1);
    log::debug!("table of contents rebuilt with {toc_entries} entries");

    let collapsible_controls = collapsible::inject_controls(doc, &config.collapsible);

    let images = images::inline_images(doc, &config.images, container, loader);

    Ok(Report {
        toc_entries,
        collapsible_controls,
        images_inlined: images.inlined,
        images_failed: images.failed,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
    #[error("Unable to locate the Table of Contents root (//{tag}[@id='{id}'])")]
    MissingTocContainer { tag: String, id: String },
    #[error("Unable to locate the document <body>")]
    MissingBody,
    #[error("Failed to serialize document: {0}")]
    Write(#[from] writer::WriteError),
}
