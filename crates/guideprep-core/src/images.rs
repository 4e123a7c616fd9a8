use crate::config::{ImageOptions, ImageScope};
use crate::dom::*;
use base64::Engine;
use std::io;
use std::path::PathBuf;

/// Source of image bytes, keyed by the `src` attribute.
pub trait ImageLoader {
    fn load(&self, src: &str) -> io::Result<Vec<u8>>;
}

/// Reads images from the local file system. Relative paths resolve against
/// `base_dir`, or the working directory when unset.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    pub base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, src: &str) -> io::Result<Vec<u8>> {
        let path = match &self.base_dir {
            Some(base) => base.join(src),
            None => PathBuf::from(src),
        };
        std::fs::read(&path).map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    }
}

/// `data:<mime>;base64,<payload>` for the given bytes.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineSummary {
    pub inlined: usize,
    pub failed: usize,
}

/// Replace the `src` of every `<img>` under the configured scope with a data
/// URI. A load failure is recorded on the element (`src="about:blank"` plus
/// an `error` attribute) and does not stop the pass.
///
/// `toc_root` is the search root for [`ImageScope::TableOfContents`].
pub fn inline_images(
    doc: &mut Document,
    options: &ImageOptions,
    toc_root: NodeId,
    loader: &dyn ImageLoader,
) -> InlineSummary {
    let root = match options.scope {
        ImageScope::Document => doc.root(),
        ImageScope::TableOfContents => toc_root,
    };
    let targets: Vec<(NodeId, String)> = doc
        .select(root, |d, n| d.is_element(n, "img"))
        .into_iter()
        .filter_map(|n| doc.attribute(n, "src").map(|src| (n, src.to_string())))
        .filter(|(_, src)| !src.starts_with("data:"))
        .collect();

    let mut summary = InlineSummary::default();
    for (img, src) in targets {
        match loader.load(&src) {
            Ok(bytes) => {
                log::debug!("inlined {src} ({} bytes)", bytes.len());
                doc.set_attribute(img, "src", &data_uri(&options.mime_type, &bytes));
                summary.inlined += 1;
            }
            Err(e) => {
                log::warn!("could not inline image {src}: {e}");
                doc.set_attribute(img, "error", &e.to_string());
                doc.set_attribute(img, "src", "about:blank");
                summary.failed += 1;
            }
        }
    }
    summary
}
