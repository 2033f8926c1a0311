//! The `InkBridge` facade.
//!
//! Ties together the canvas bridge, the grid overlay, keyboard focus and a
//! renderer for whole-canvas snapshots.

use inkbridge_core::shapes::{Bitmap, RasterImage};
use inkbridge_core::{
    Canvas, CanvasOptions, GridChange, GridOptions, GridOverlay, InputState, KeyEvent,
};
use inkbridge_render::{RenderContext, Renderer, SkiaRenderer, encode_png, png_data_url};
use inkbridge_svg::{DefaultLoader, ImageId, SourceLoader, SvgTree, VectorImage};
use kurbo::Point;

use crate::bridge::{CanvasBridge, SyncOutcome};
use crate::config::BridgeConfig;
use crate::error::BridgeResult;

/// Callback run on key-up while the canvas has focus.
pub type KeyHandler = Box<dyn FnMut(&KeyEvent)>;

/// SVG images mirrored as rasters on a canvas, with an optional grid.
pub struct InkBridge {
    bridge: CanvasBridge,
    grid: GridOverlay,
    grid_options: GridOptions,
    input: InputState,
    key_handler: Option<KeyHandler>,
    loader: Box<dyn SourceLoader>,
    renderer: SkiaRenderer,
}

impl InkBridge {
    /// Create a bridge over a fresh canvas.
    pub fn new(options: CanvasOptions) -> Self {
        log::info!(
            "Creating canvas {:?} ({}x{})",
            options.name,
            options.width,
            options.height
        );
        Self {
            bridge: CanvasBridge::new(Canvas::with_options(&options)),
            grid: GridOverlay::new(),
            grid_options: GridOptions::default(),
            input: InputState::new(),
            key_handler: None,
            loader: Box::new(DefaultLoader::new()),
            renderer: SkiaRenderer::new(),
        }
    }

    /// Create a bridge from config, showing the grid if asked to.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let mut bridge = Self::new(config.canvas.clone());
        bridge.grid_options = config.grid.clone();
        if config.show_grid {
            bridge.set_grid_visibility(true, config.grid.clone())?;
        }
        Ok(bridge)
    }

    /// Use `loader` for subsequent loads.
    pub fn with_loader(mut self, loader: Box<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    // --- Images ---

    /// Load the SVG at `url` and put its mirror on the canvas.
    pub async fn load_from_url(&mut self, url: &str) -> BridgeResult<VectorImage> {
        let image = VectorImage::load(self.loader.as_ref(), url).await?;
        let (width, height) = image.declared_size();
        log::info!("Loaded {} ({}x{})", url, width, height);
        self.bridge.sync(&image)?;
        Ok(image)
    }

    /// Load `url` and pass the image to `on_load`.
    ///
    /// Failures are logged and `on_load` is never called for them.
    pub async fn load_from_url_with<F>(&mut self, url: &str, on_load: F)
    where
        F: FnOnce(VectorImage),
    {
        match self.load_from_url(url).await {
            Ok(image) => on_load(image),
            Err(e) => log::warn!("Failed to load {}: {}", url, e),
        }
    }

    /// Replace the image's tree with `tree` and refresh its mirror.
    pub fn apply_edit(&mut self, image: &mut VectorImage, tree: SvgTree) -> BridgeResult<SyncOutcome> {
        image.apply_edit(tree)?;
        self.bridge.sync(image)
    }

    /// Refresh the mirror after editing the image through `handle_mut`.
    pub fn resync(&mut self, image: &VectorImage) -> BridgeResult<SyncOutcome> {
        self.bridge.sync(image)
    }

    /// Take the image's mirror off the canvas. Returns whether one existed.
    pub fn remove(&mut self, image: &VectorImage) -> bool {
        self.bridge.remove(image.id()).is_some()
    }

    /// The image's mirror on the canvas.
    pub fn raster_mirror(&self, image: &VectorImage) -> Option<&RasterImage> {
        self.bridge.mirror(image.id())
    }

    pub fn raster_mirror_mut(&mut self, image: &VectorImage) -> Option<&mut RasterImage> {
        self.bridge.mirror_mut(image.id())
    }

    /// Topmost image whose mirror covers `point`.
    pub fn image_at(&self, point: Point) -> Option<ImageId> {
        self.canvas()
            .document
            .shapes_at_point(point, 0.0)
            .into_iter()
            .find_map(|id| self.bridge.image_for(id))
    }

    // --- Canvas ---

    pub fn canvas(&self) -> &Canvas {
        self.bridge.canvas()
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        self.bridge.canvas_mut()
    }

    pub fn bridge(&self) -> &CanvasBridge {
        &self.bridge
    }

    /// Resize the canvas. A visible grid is rebuilt on its next enable.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_mut().set_size(width, height);
    }

    // --- Grid ---

    /// Show or hide the grid using `options`.
    pub fn set_grid_visibility(&mut self, visible: bool, options: GridOptions) -> BridgeResult<GridChange> {
        let change = self
            .grid
            .set_visible(self.bridge.canvas_mut(), visible, &options)?;
        log::debug!("Grid visibility {} -> {:?}", visible, change);
        self.grid_options = options;
        Ok(change)
    }

    /// Show or hide the grid with the options it was last given.
    ///
    /// Before any call to [`set_grid_visibility`](Self::set_grid_visibility)
    /// these are the config's grid options.
    pub fn toggle_grid(&mut self, visible: bool) -> BridgeResult<GridChange> {
        self.set_grid_visibility(visible, self.grid_options.clone())
    }

    pub fn grid_visible(&self) -> bool {
        self.grid.is_visible()
    }

    /// Options last used for the grid.
    pub fn grid_options(&self) -> &GridOptions {
        &self.grid_options
    }

    pub fn grid(&self) -> &GridOverlay {
        &self.grid
    }

    // --- Keyboard ---

    /// Set the callback for key-up events.
    pub fn set_key_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&KeyEvent) + 'static,
    {
        self.key_handler = Some(Box::new(handler));
    }

    pub fn clear_key_handler(&mut self) {
        self.key_handler = None;
    }

    /// Record a key press.
    pub fn handle_key_down(&mut self, event: &KeyEvent) {
        self.input.handle_key_event(event);
    }

    /// Record a key release and run the key handler if the canvas has focus.
    ///
    /// Returns whether the handler ran.
    pub fn handle_key_up(&mut self, event: &KeyEvent) -> bool {
        self.input.handle_key_event(event);
        if !event.is_release() || !self.canvas().is_focused() {
            return false;
        }
        match self.key_handler.as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    /// Give or take keyboard focus. Losing focus forgets held keys.
    pub fn set_focus(&mut self, focused: bool) {
        self.canvas_mut().set_focused(focused);
        if !focused {
            self.input.clear();
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    // --- Snapshots ---

    /// Composite the whole canvas.
    pub fn render(&mut self) -> BridgeResult<Bitmap> {
        let ctx = RenderContext::new(self.bridge.canvas());
        Ok(self.renderer.render(&ctx)?)
    }

    /// Composite the canvas and encode it as PNG.
    pub fn export_png(&mut self) -> BridgeResult<Vec<u8>> {
        Ok(encode_png(&self.render()?)?)
    }

    /// Composite the canvas as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&mut self) -> BridgeResult<String> {
        Ok(png_data_url(&self.render()?)?)
    }
}

impl Default for InkBridge {
    fn default() -> Self {
        Self::new(CanvasOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use inkbridge_svg::{MemoryLoader, SvgError};
    use pollster::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect id="r" width="10" height="10" fill="#ff0000"/>
    </svg>"##;

    fn small() -> CanvasOptions {
        CanvasOptions {
            width: 30.0,
            height: 20.0,
            ..CanvasOptions::default()
        }
    }

    fn ink() -> InkBridge {
        let loader = MemoryLoader::new();
        loader.insert("mem://red", RED).unwrap();
        loader.insert("mem://broken", "<svg").unwrap();
        InkBridge::new(small()).with_loader(Box::new(loader))
    }

    fn raster_count(ink: &InkBridge) -> usize {
        ink.canvas()
            .document
            .shapes_ordered()
            .filter(|s| s.as_raster().is_some())
            .count()
    }

    fn group_count(ink: &InkBridge) -> usize {
        ink.canvas()
            .document
            .shapes_ordered()
            .filter(|s| s.is_group())
            .count()
    }

    #[test]
    fn test_load_puts_one_mirror_on_canvas() {
        let mut ink = ink();
        let image = block_on(ink.load_from_url("mem://red")).unwrap();

        assert_eq!(raster_count(&ink), 1);
        let mirror = ink.raster_mirror(&image).unwrap();
        assert_eq!(mirror.source().dimensions(), (10, 10));
        assert_eq!(ink.bridge().len(), 1);
    }

    #[test]
    fn test_load_failure_is_an_error() {
        let mut ink = ink();
        let result = block_on(ink.load_from_url("mem://broken"));
        assert!(matches!(result, Err(BridgeError::Svg(SvgError::Parse(_)))));
        assert!(ink.canvas().document.is_empty());
    }

    #[test]
    fn test_load_with_callback() {
        let mut ink = ink();
        let mut loaded = None;
        block_on(ink.load_from_url_with("mem://red", |image| loaded = Some(image)));
        let image = loaded.unwrap();
        assert!(ink.raster_mirror(&image).is_some());
    }

    #[test]
    fn test_failed_load_never_calls_back() {
        let mut ink = ink();
        let mut calls = 0;
        block_on(ink.load_from_url_with("mem://broken", |_| calls += 1));
        block_on(ink.load_from_url_with("mem://missing", |_| calls += 1));
        assert_eq!(calls, 0);
        assert!(ink.canvas().document.is_empty());
    }

    #[test]
    fn test_apply_edit_twice_keeps_one_mirror() {
        let mut ink = ink();
        let mut image = block_on(ink.load_from_url("mem://red")).unwrap();
        let mirror_id = ink.bridge().mirror_id(image.id()).unwrap();

        for fill in ["#00ff00", "#0000ff"] {
            let mut tree = image.handle().clone();
            tree.find_by_id_mut("r").unwrap().set_attr("fill", fill);
            let outcome = ink.apply_edit(&mut image, tree).unwrap();
            assert_eq!(outcome, SyncOutcome::Replaced(mirror_id));
        }

        assert_eq!(raster_count(&ink), 1);
        let mirror = ink.raster_mirror(&image).unwrap();
        assert_eq!(mirror.source().pixel(5, 5), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_apply_edit_failure_keeps_mirror() {
        let mut ink = ink();
        let mut image = block_on(ink.load_from_url("mem://red")).unwrap();
        let broken = SvgTree::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="-1" height="-1"/>"#,
        )
        .unwrap();

        assert!(ink.apply_edit(&mut image, broken).is_err());
        assert!(image.handle().find_by_id("r").is_some());
        let mirror = ink.raster_mirror(&image).unwrap();
        assert_eq!(mirror.source().pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_resync_after_in_place_edit() {
        let mut ink = ink();
        let mut image = block_on(ink.load_from_url("mem://red")).unwrap();
        image.handle_mut().root_mut().set_attr("width", 20);
        image.handle_mut().find_by_id_mut("r").unwrap().set_attr("width", 20);

        let outcome = ink.resync(&image).unwrap();
        assert!(matches!(outcome, SyncOutcome::Replaced(_)));
        assert_eq!(ink.raster_mirror(&image).unwrap().source().dimensions(), (20, 10));
    }

    #[test]
    fn test_remove_clears_mirror() {
        let mut ink = ink();
        let image = block_on(ink.load_from_url("mem://red")).unwrap();
        assert!(ink.remove(&image));
        assert!(!ink.remove(&image));
        assert!(ink.raster_mirror(&image).is_none());
        assert!(ink.bridge().is_empty());
        assert_eq!(raster_count(&ink), 0);
    }

    #[test]
    fn test_image_at_hits_topmost_mirror() {
        let mut ink = ink();
        let below = block_on(ink.load_from_url("mem://red")).unwrap();
        let above = block_on(ink.load_from_url("mem://red")).unwrap();
        ink.raster_mirror_mut(&above).unwrap().position = Point::new(5.0, 0.0);

        assert_eq!(ink.image_at(Point::new(7.0, 5.0)), Some(above.id()));
        assert_eq!(ink.image_at(Point::new(2.0, 5.0)), Some(below.id()));
        assert_eq!(ink.image_at(Point::new(25.0, 15.0)), None);
    }

    #[test]
    fn test_grid_enable_twice_builds_once() {
        let mut ink = ink();
        let options = GridOptions::default().with_tile_size(10.0);
        assert_eq!(ink.set_grid_visibility(true, options.clone()).unwrap(), GridChange::Built);
        assert_eq!(
            ink.set_grid_visibility(true, options).unwrap(),
            GridChange::AlreadyVisible
        );
        assert_eq!(group_count(&ink), 1);
        assert!(ink.grid_visible());
    }

    #[test]
    fn test_grid_sits_behind_existing_images() {
        let mut ink = ink();
        let image = block_on(ink.load_from_url("mem://red")).unwrap();
        ink.set_grid_visibility(true, GridOptions::default().with_tile_size(10.0))
            .unwrap();

        let z = ink.canvas().document.z_order();
        assert_eq!(Some(z[0]), ink.grid().group_id());
        assert_eq!(Some(z[1]), ink.bridge().mirror_id(image.id()));
    }

    #[test]
    fn test_grid_rebuilt_after_resize() {
        let mut ink = ink();
        let options = GridOptions::default().with_tile_size(10.0);
        ink.set_grid_visibility(true, options.clone()).unwrap();
        let old = ink.grid().group_id().unwrap();

        ink.set_canvas_size(50.0, 20.0);
        assert_eq!(ink.set_grid_visibility(true, options).unwrap(), GridChange::Built);

        let new = ink.grid().group_id().unwrap();
        assert_ne!(old, new);
        assert_eq!(group_count(&ink), 1);
        let group = ink.canvas().document.get_shape(new).unwrap();
        assert_eq!(group.bounds().width(), 50.0);
    }

    #[test]
    fn test_grid_hide_then_show_reuses_group() {
        let mut ink = ink();
        let options = GridOptions::default().with_tile_size(10.0);
        ink.set_grid_visibility(true, options.clone()).unwrap();
        let id = ink.grid().group_id().unwrap();

        assert_eq!(ink.set_grid_visibility(false, options.clone()).unwrap(), GridChange::Hidden);
        assert_eq!(group_count(&ink), 0);
        assert_eq!(ink.set_grid_visibility(true, options).unwrap(), GridChange::Reused);
        assert_eq!(ink.grid().group_id(), Some(id));
    }

    #[test]
    fn test_grid_errors_surface() {
        let mut ink = ink();
        let bad = GridOptions::default().with_tile_size(0.0);
        assert!(matches!(ink.set_grid_visibility(true, bad), Err(BridgeError::Grid(_))));
        assert!(!ink.grid_visible());
    }

    #[test]
    fn test_from_config_shows_grid() {
        let config = BridgeConfig::from_json(
            r#"{ "canvas": { "width": 40, "height": 40 }, "grid": { "tile_size": 10 }, "show_grid": true }"#,
        )
        .unwrap();
        let ink = InkBridge::from_config(&config).unwrap();
        assert!(ink.grid_visible());
        assert_eq!(ink.grid_options().tile_size, 10.0);
        assert_eq!(ink.canvas().width(), 40.0);
    }

    #[test]
    fn test_toggle_grid_uses_config_options() {
        let config = BridgeConfig::from_json(
            r#"{ "canvas": { "width": 40, "height": 40 }, "grid": { "tile_size": 10 } }"#,
        )
        .unwrap();
        let mut ink = InkBridge::from_config(&config).unwrap();
        assert!(!ink.grid_visible());

        let line_count = |ink: &InkBridge| {
            let id = ink.grid().group_id().unwrap();
            let shape = ink.canvas().document.get_shape(id).unwrap();
            shape.as_group().unwrap().children().len()
        };
        assert_eq!(ink.toggle_grid(true).unwrap(), GridChange::Built);
        assert_eq!(line_count(&ink), 6);

        ink.set_canvas_size(20.0, 40.0);
        assert_eq!(ink.toggle_grid(true).unwrap(), GridChange::Built);
        assert_eq!(line_count(&ink), 4);
        assert_eq!(ink.toggle_grid(false).unwrap(), GridChange::Hidden);
    }

    #[test]
    fn test_toggle_grid_follows_last_options() {
        let mut ink = ink();
        ink.set_grid_visibility(false, GridOptions::default().with_tile_size(0.0))
            .unwrap();
        assert!(matches!(ink.toggle_grid(true), Err(BridgeError::Grid(_))));

        ink.set_grid_visibility(false, GridOptions::default().with_tile_size(10.0))
            .unwrap();
        assert_eq!(ink.toggle_grid(true).unwrap(), GridChange::Built);
    }

    #[test]
    fn test_key_handler_requires_focus() {
        let mut ink = ink();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ink.set_key_handler(move |event| sink.borrow_mut().push(event.key().to_string()));

        let up = KeyEvent::Released("g".to_string());
        assert!(!ink.handle_key_up(&up));

        ink.set_focus(true);
        assert!(ink.handle_key_up(&up));
        assert!(!ink.handle_key_up(&KeyEvent::Pressed("h".to_string())));
        assert_eq!(*seen.borrow(), vec!["g".to_string()]);

        ink.clear_key_handler();
        assert!(!ink.handle_key_up(&up));
    }

    #[test]
    fn test_losing_focus_clears_held_keys() {
        let mut ink = ink();
        ink.set_focus(true);
        ink.handle_key_down(&KeyEvent::Pressed("Shift".to_string()));
        assert!(ink.input().is_key_pressed("Shift"));
        ink.set_focus(false);
        assert!(!ink.input().is_key_pressed("Shift"));
    }

    #[test]
    fn test_render_composites_mirror() {
        let mut ink = ink();
        let image = block_on(ink.load_from_url("mem://red")).unwrap();
        ink.raster_mirror_mut(&image).unwrap().position = Point::new(10.0, 0.0);

        let frame = ink.render().unwrap();
        assert_eq!(frame.dimensions(), (30, 20));
        assert_eq!(frame.pixel(15, 5), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(2, 5), Some([255, 255, 255, 255]));

        assert!(ink.export_png().unwrap().starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(ink.to_data_url().unwrap().starts_with("data:image/png;base64,"));
    }
}
