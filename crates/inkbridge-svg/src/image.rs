//! Vector image: a loaded SVG document plus its editable handle.

use std::fmt;

use inkbridge_core::shapes::Bitmap;
use uuid::Uuid;

use crate::error::{SvgError, SvgResult};
use crate::loader::SourceLoader;
use crate::rasterize::{parse_document, rasterize};
use crate::tree::SvgTree;

/// Identity of a vector image for the lifetime of the process.
pub type ImageId = Uuid;

/// A loaded SVG.
///
/// Owns two views of the same document: the editable [`SvgTree`] handle
/// and the parsed usvg render tree. The render tree is rebuilt from the
/// handle by [`apply_edit`](Self::apply_edit) and [`refresh`](Self::refresh).
pub struct VectorImage {
    id: ImageId,
    source_url: Option<String>,
    handle: SvgTree,
    document: usvg::Tree,
}

impl VectorImage {
    /// Fetch `url` through `loader` and parse it.
    pub async fn load(loader: &dyn SourceLoader, url: &str) -> SvgResult<Self> {
        let data = loader.fetch(url).await?;
        let mut image = Self::from_data(&data)?;
        image.source_url = Some(url.to_string());
        log::debug!("Loaded vector image {} from {}", image.id, url);
        Ok(image)
    }

    /// Parse raw SVG bytes.
    pub fn from_data(data: &[u8]) -> SvgResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| SvgError::Parse(format!("SVG is not UTF-8: {}", e)))?;
        Self::from_str(text)
    }

    /// Parse SVG text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> SvgResult<Self> {
        Self::from_tree(SvgTree::parse(text)?)
    }

    /// Wrap an existing tree. Fails if the tree does not render as SVG.
    pub fn from_tree(handle: SvgTree) -> SvgResult<Self> {
        let document = parse_document(&handle.to_svg_string())?;
        Ok(Self {
            id: Uuid::new_v4(),
            source_url: None,
            handle,
            document,
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    /// URL the image was loaded from, if any.
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Parsed render tree.
    pub fn document(&self) -> &usvg::Tree {
        &self.document
    }

    /// Editable handle.
    pub fn handle(&self) -> &SvgTree {
        &self.handle
    }

    /// Mutable handle. Call [`refresh`](Self::refresh) after editing so the
    /// render tree follows.
    pub fn handle_mut(&mut self) -> &mut SvgTree {
        &mut self.handle
    }

    /// Replace the handle with `tree`. On error nothing changes.
    pub fn apply_edit(&mut self, tree: SvgTree) -> SvgResult<()> {
        self.document = parse_document(&tree.to_svg_string())?;
        self.handle = tree;
        Ok(())
    }

    /// Rebuild the render tree from the current handle.
    pub fn refresh(&mut self) -> SvgResult<()> {
        self.document = parse_document(&self.handle.to_svg_string())?;
        Ok(())
    }

    /// Declared (width, height) in pixels.
    ///
    /// Each dimension comes from the root attribute, then the `viewBox`,
    /// then the size usvg resolved for the document.
    pub fn declared_size(&self) -> (f64, f64) {
        declared_size_of(&self.handle, &self.document)
    }

    /// Rasterize the current handle at its declared size, rounded up.
    pub fn to_raster(&self) -> SvgResult<Bitmap> {
        let document = parse_document(&self.handle.to_svg_string())?;
        let (width, height) = declared_size_of(&self.handle, &document);
        rasterize(&document, pixel_extent(width), pixel_extent(height))
    }

    /// Rasterize and encode as a `data:image/png;base64,...` URL.
    pub fn to_raster_data_url(&self) -> SvgResult<String> {
        let bitmap = self.to_raster()?;
        inkbridge_render::png_data_url(&bitmap).map_err(|e| SvgError::Encode(e.to_string()))
    }
}

fn declared_size_of(handle: &SvgTree, document: &usvg::Tree) -> (f64, f64) {
    let size = document.size();
    (
        handle.declared_width().unwrap_or(size.width() as f64),
        handle.declared_height().unwrap_or(size.height() as f64),
    )
}

fn pixel_extent(length: f64) -> u32 {
    if length.is_finite() && length > 0.0 {
        length.ceil().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

impl fmt::Debug for VectorImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorImage")
            .field("id", &self.id)
            .field("source_url", &self.source_url)
            .field("declared_size", &self.declared_size())
            .finish_non_exhaustive()
    }
}
