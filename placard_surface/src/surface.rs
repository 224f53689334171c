// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use placard::kurbo::Point;
use placard::{Container, Hit, Layout, StyledText};
use tiny_skia::Pixmap;

use crate::interaction::{interpret, Gesture, Interaction};
use crate::{raster, CrossFade, RenderOptions, SurfaceConfig, WorkerPool};

/// Where a surface is in its update cycle.
///
/// Any state goes back to `Pending` when a new request is made. A worker
/// only moves a request to `Rendering` while it is the latest one.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Nothing has been requested yet.
    Idle,
    /// A request is queued.
    Pending,
    /// A worker is laying out or rasterizing the latest request.
    Rendering,
    /// The frame of the latest request is applied.
    Applied,
}

impl Phase {
    /// Packs the phase with the generation it belongs to.
    fn with_generation(self, generation: u64) -> u64 {
        (generation << 8) | self as u64
    }

    fn from_state(state: u64) -> Self {
        match state & 0xff {
            1 => Self::Pending,
            2 => Self::Rendering,
            3 => Self::Applied,
            _ => Self::Idle,
        }
    }
}

/// A layout and its rasterized pixels.
#[derive(Clone, Debug)]
pub struct Frame {
    generation: u64,
    layout: Layout,
    pixmap: Option<Arc<Pixmap>>,
    scale: f64,
    relayout: bool,
}

impl Frame {
    /// Returns the generation of the request that produced the frame.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the pixels, or `None` if the layout covers less than a pixel
    /// or could not be rasterized.
    pub fn pixmap(&self) -> Option<&Arc<Pixmap>> {
        self.pixmap.as_ref()
    }

    /// Returns the number of pixels per layout unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Receives notifications from a [`Surface`] on the display thread.
pub trait SurfaceObserver {
    /// Called after the frame for the latest request has been applied.
    ///
    /// Hosts typically update their intrinsic size from
    /// [`Layout::bounding_size`] here.
    fn on_layout_applied(&mut self, layout: &Layout);
}

impl<F: FnMut(&Layout)> SurfaceObserver for F {
    fn on_layout_applied(&mut self, layout: &Layout) {
        self(layout);
    }
}

/// State shared between a surface and the workers rendering for it.
struct SurfaceShared {
    generation: AtomicU64,
    /// Phase of the request it was last set for, see [`Phase::with_generation`].
    state: AtomicU64,
    inbox: Mutex<Vec<Frame>>,
    posted: Condvar,
}

impl SurfaceShared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn set_phase(&self, generation: u64, phase: Phase) {
        self.state
            .store(phase.with_generation(generation), Ordering::Release);
    }

    /// Moves the pending request `generation` to rendering. Fails once a
    /// newer request has been made.
    fn begin_rendering(&self, generation: u64) -> bool {
        self.state
            .compare_exchange(
                Phase::Pending.with_generation(generation),
                Phase::Rendering.with_generation(generation),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn phase(&self) -> Phase {
        Phase::from_state(self.state.load(Ordering::Acquire))
    }

    fn post(&self, frame: Frame) {
        self.inbox.lock().push(frame);
        self.posted.notify_all();
    }
}

/// A snapshot of everything needed to produce one frame.
struct Request {
    generation: u64,
    text: StyledText,
    container: Arc<Container>,
    layout: Option<Layout>,
    options: RenderOptions,
    active_highlight: Option<usize>,
}

impl Request {
    fn layout(&mut self) -> Layout {
        match self.layout.take() {
            Some(layout) => layout,
            None => Layout::new(&self.text, &self.container),
        }
    }

    fn finish(&self, layout: Layout, relayout: bool) -> Frame {
        let pixmap = match raster::rasterize(&layout, &self.options, self.active_highlight) {
            Ok(pixmap) => pixmap.map(Arc::new),
            Err(err) => {
                log::warn!("generation {} has no pixels: {err}", self.generation);
                None
            }
        };
        Frame {
            generation: self.generation,
            layout,
            pixmap,
            scale: self.options.scale,
            relayout,
        }
    }

    /// Renders on a worker, giving up as soon as a newer request exists.
    fn run(mut self, shared: &SurfaceShared) {
        let started = Instant::now();
        if !shared.begin_rendering(self.generation) {
            log::debug!("skipping stale request {}", self.generation);
            return;
        }
        let relayout = self.layout.is_none();
        let layout = self.layout();
        if !shared.is_current(self.generation) {
            log::debug!("dropping layout of stale request {}", self.generation);
            return;
        }
        let frame = self.finish(layout, relayout);
        log::trace!(
            "rendered generation {} in {:?}",
            self.generation,
            started.elapsed()
        );
        shared.post(frame);
    }
}

/// The display side of a label: its content, its container and the frame
/// currently shown.
///
/// Every change makes a new request identified by an increasing generation.
/// Only the frame of the latest generation is ever applied, whatever order
/// workers finish in. A surface is driven from one thread, which calls
/// [`poll`](Self::poll) to pick up finished frames.
pub struct Surface {
    shared: Arc<SurfaceShared>,
    pool: Option<Arc<WorkerPool>>,
    config: SurfaceConfig,
    content: StyledText,
    container: Arc<Container>,
    active_highlight: Option<usize>,
    current: Option<Frame>,
    fade: Option<CrossFade>,
    observer: Option<Box<dyn SurfaceObserver>>,
}

impl Surface {
    /// Creates an empty surface rendering on `pool`.
    pub fn new(pool: Arc<WorkerPool>, config: SurfaceConfig) -> Self {
        Self::with_pool(Some(pool), config)
    }

    /// Creates an empty surface that always renders inline.
    pub fn synchronous(config: SurfaceConfig) -> Self {
        Self::with_pool(None, config)
    }

    fn with_pool(pool: Option<Arc<WorkerPool>>, config: SurfaceConfig) -> Self {
        Self {
            shared: Arc::new(SurfaceShared {
                generation: AtomicU64::new(0),
                state: AtomicU64::new(Phase::Idle.with_generation(0)),
                inbox: Mutex::new(Vec::new()),
                posted: Condvar::new(),
            }),
            pool,
            config,
            content: StyledText::default(),
            container: Arc::default(),
            active_highlight: None,
            current: None,
            fade: None,
            observer: None,
        }
    }

    /// Sets the observer notified when frames are applied.
    pub fn set_observer(&mut self, observer: impl SurfaceObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Returns the text being displayed.
    pub fn content(&self) -> &StyledText {
        &self.content
    }

    /// Returns the container text is laid out in.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Replaces the text and requests a new layout. Clears the active
    /// highlight.
    pub fn set_content(&mut self, content: StyledText) -> u64 {
        self.content = content;
        self.active_highlight = None;
        self.request_layout()
    }

    /// Replaces the container and requests a new layout.
    pub fn set_container(&mut self, container: Container) -> u64 {
        self.container = Arc::new(container);
        self.request_layout()
    }

    /// Switches between rendering on the pool and inline, then requests a
    /// new layout.
    pub fn set_async(&mut self, enabled: bool) -> u64 {
        self.config.async_rendering = enabled;
        self.request_layout()
    }

    /// Sets whether pressing and releasing highlights cross-fades.
    pub fn set_fade_on_highlight(&mut self, enabled: bool) {
        self.config.fade_on_highlight = enabled;
    }

    /// Turns cross-fading on or off, then requests a new layout.
    pub fn set_fade_on_update(&mut self, enabled: bool) -> u64 {
        self.config.fade_on_update = enabled;
        self.request_layout()
    }

    /// Sets whether the current frame is dropped when an asynchronous
    /// request is made.
    pub fn set_clear_contents_before_async(&mut self, enabled: bool) {
        self.config.clear_contents_before_async = enabled;
    }

    /// Replaces the raster options and requests a new layout.
    pub fn set_render_options(&mut self, options: RenderOptions) -> u64 {
        self.config.render = options;
        self.request_layout()
    }

    /// Returns the index of the highlight drawn with its active colors.
    pub fn active_highlight(&self) -> Option<usize> {
        self.active_highlight
    }

    /// Draws the highlight at `index` with its active colors, or none.
    ///
    /// When the current frame is up to date it is rasterized again without
    /// laying the text out anew.
    pub fn set_active_highlight(&mut self, index: Option<usize>) -> u64 {
        if index == self.active_highlight {
            return self.generation();
        }
        self.active_highlight = index;
        let layout = self
            .current
            .as_ref()
            .filter(|frame| frame.generation == self.generation())
            .map(|frame| frame.layout.clone());
        self.submit(layout)
    }

    /// Activates the highlight under `point`, as when a press begins.
    ///
    /// Returns the index of the activated highlight.
    pub fn press(&mut self, point: Point) -> Option<usize> {
        let index = self.hit_test(point)?.highlight?.index;
        self.set_active_highlight(Some(index));
        Some(index)
    }

    /// Deactivates the highlight, as when a press ends.
    pub fn release(&mut self) {
        self.set_active_highlight(None);
    }

    /// Lays out and rasterizes the current content and container.
    ///
    /// Returns the generation of the request. In asynchronous mode the
    /// frame is applied by a later [`poll`](Self::poll); otherwise it is
    /// applied before this returns.
    pub fn request_layout(&mut self) -> u64 {
        self.submit(None)
    }

    /// Returns the generation of the latest request.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Returns where the surface is in its update cycle.
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Returns `true` if the applied frame belongs to the latest request.
    pub fn is_current(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|frame| frame.generation == self.generation())
    }

    fn request(&self, generation: u64, layout: Option<Layout>) -> Request {
        Request {
            generation,
            text: self.content.clone(),
            container: Arc::clone(&self.container),
            layout,
            options: self.config.render.clone(),
            active_highlight: self.active_highlight,
        }
    }

    /// Makes a request that reuses `layout` if given.
    fn submit(&mut self, layout: Option<Layout>) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.shared.set_phase(generation, Phase::Pending);
        let relayout = layout.is_none();

        if self.config.async_rendering {
            if let Some(pool) = &self.pool {
                if relayout && self.config.clear_contents_before_async {
                    self.current = None;
                    self.fade = None;
                }
                let request = self.request(generation, layout.clone());
                let shared = Arc::clone(&self.shared);
                match pool.submit(move || request.run(&shared)) {
                    Ok(()) => return generation,
                    Err(err) => log::warn!("rendering generation {generation} inline: {err}"),
                }
            }
        }

        let mut request = self.request(generation, layout);
        let layout = request.layout();
        let frame = request.finish(layout, relayout);
        self.apply(frame);
        generation
    }

    fn apply(&mut self, frame: Frame) {
        let from = self.current.as_ref().and_then(|current| current.pixmap.clone());
        let duration = if frame.relayout {
            self.config.fade_on_update.then_some(self.config.fade_duration)
        } else {
            self.config
                .fade_on_highlight
                .then_some(self.config.highlight_fade_duration)
        };
        self.fade = match (from, &frame.pixmap, duration) {
            (Some(from), Some(to), Some(duration)) => {
                Some(CrossFade::new(from, Arc::clone(to), Instant::now(), duration))
            }
            _ => None,
        };
        self.shared.set_phase(frame.generation, Phase::Applied);
        let frame = self.current.insert(frame);
        if let Some(observer) = &mut self.observer {
            observer.on_layout_applied(&frame.layout);
        }
    }

    /// Applies the frame of the latest request if a worker has posted it and
    /// drops any older frames.
    ///
    /// Returns `true` if a frame was applied.
    pub fn poll(&mut self) -> bool {
        let frames = core::mem::take(&mut *self.shared.inbox.lock());
        let generation = self.generation();
        let mut applied = false;
        for frame in frames {
            if frame.generation == generation {
                self.apply(frame);
                applied = true;
            } else {
                log::debug!(
                    "discarding stale frame {} (current {generation})",
                    frame.generation
                );
            }
        }
        applied
    }

    /// Returns the number of frames posted but not yet polled.
    #[cfg(test)]
    pub(crate) fn queued_frames(&self) -> usize {
        self.shared.inbox.lock().len()
    }

    /// Blocks until the frame of the latest request is posted or `timeout`
    /// passes, then polls.
    ///
    /// Returns [`is_current`](Self::is_current).
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        {
            let mut inbox = self.shared.inbox.lock();
            loop {
                let generation = self.generation();
                if self.is_current() || inbox.iter().any(|frame| frame.generation == generation) {
                    break;
                }
                if self.shared.posted.wait_until(&mut inbox, deadline).timed_out() {
                    break;
                }
            }
        }
        self.poll();
        self.is_current()
    }

    /// Returns the applied frame.
    pub fn frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// Returns the layout of the applied frame.
    pub fn layout(&self) -> Option<&Layout> {
        self.current.as_ref().map(|frame| &frame.layout)
    }

    /// Returns `true` while a cross-fade is running at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.fade.as_ref().is_some_and(|fade| !fade.is_finished(now))
    }

    /// Returns the pixels to show at `now`, blending frames while a
    /// cross-fade runs.
    pub fn contents(&mut self, now: Instant) -> Option<Arc<Pixmap>> {
        if let Some(fade) = &self.fade {
            if !fade.is_finished(now) {
                if let Some(pixmap) = fade.compose(now) {
                    return Some(Arc::new(pixmap));
                }
            }
            self.fade = None;
        }
        self.current.as_ref()?.pixmap.clone()
    }

    /// Maps a point in layout coordinates to the text of the applied frame.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        self.layout()?.hit_test(point)
    }

    /// Maps a gesture at `point` to an interaction with the applied frame.
    pub fn interpret(&self, gesture: Gesture, point: Point) -> Option<Interaction> {
        let hit = self.hit_test(point)?;
        Some(interpret(gesture, &hit))
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("generation", &self.generation())
            .field("phase", &self.phase())
            .field("config", &self.config)
            .field("active_highlight", &self.active_highlight)
            .field("current", &self.current.as_ref().map(Frame::generation))
            .finish_non_exhaustive()
    }
}

impl Drop for Surface {
    // Queued requests see a newer generation and skip their work.
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
    }
}
