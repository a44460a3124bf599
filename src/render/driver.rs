//! Session state machine tying tracking input, display geometry and the per-eye passes together.

use crate::camera::virtual_camera::VirtualCamera;
use crate::display::resolver::{ConvergencePlane, EyeSetup, StereoGeometry, resolve};
use crate::foundation::core::{DVec3, Eye, Pose, Resolution};
use crate::foundation::error::{LdiError, LdiResult};
use crate::refine::passes::render_view;
use crate::refine::quality::{QualityController, RefineMode};
use crate::render::frame::FrameRGBA;
use crate::render::opts::RenderOpts;
use crate::render::params::DrawParams;
use crate::render::smoothing::PoseSmoother;
use crate::scene::model::{LayeredScene, View};

/// Lifecycle of a [`RenderDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// No scene.
    Idle,
    /// A scene is being loaded; nothing renders.
    Loading,
    /// A scene is loaded; frames render in stereo while a session is active, in 2D otherwise.
    Rendering,
    /// A stereo session just ended; the next frame renders in 2D.
    SessionEnd,
}

/// Tracked viewer position for one frame, device space millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Viewpoint {
    /// Head (mid-eye) position.
    Head(DVec3),
    /// Per-eye poses from a stereo device.
    Eyes { left: Pose, right: Pose },
}

impl Viewpoint {
    fn head(&self) -> DVec3 {
        match self {
            Self::Head(p) => *p,
            Self::Eyes { left, right } => (left.position + right.position) * 0.5,
        }
    }
}

/// Owns all mutable per-frame state: pose smoothing, quality feedback and session geometry.
#[derive(Debug)]
pub struct RenderDriver {
    opts: RenderOpts,
    state: DriverState,
    scene: Option<LayeredScene>,
    content_depth: f64,
    geometry: Option<StereoGeometry>,
    smoother: PoseSmoother,
    quality: QualityController,
    eye_half_offset: DVec3,
    pool: Option<rayon::ThreadPool>,
}

impl RenderDriver {
    pub fn new(opts: RenderOpts) -> LdiResult<Self> {
        opts.validate()?;
        let pool = match opts.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| LdiError::setup(format!("failed to build rayon thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            smoother: PoseSmoother::new(opts.smoothing.clone()),
            quality: QualityController::new(opts.quality.clone()),
            eye_half_offset: DVec3::new(opts.display.ipd_mm * 0.5, 0.0, 0.0),
            state: DriverState::Idle,
            scene: None,
            content_depth: 0.0,
            geometry: None,
            pool,
            opts,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    pub fn scene(&self) -> Option<&LayeredScene> {
        self.scene.as_ref()
    }

    /// Geometry of the active stereo session.
    pub fn geometry(&self) -> Option<&StereoGeometry> {
        self.geometry.as_ref()
    }

    /// Mode the next frame renders with.
    pub fn refine_mode(&self) -> RefineMode {
        self.opts.refine_mode.unwrap_or_else(|| self.quality.mode())
    }

    /// Drop any loaded scene and session and wait for [`Self::finish_loading`].
    pub fn begin_loading(&mut self) {
        self.scene = None;
        self.geometry = None;
        self.smoother.reset();
        self.state = DriverState::Loading;
    }

    /// Install a decoded scene. Failure is fatal for the scene and returns the driver to `Idle`.
    #[tracing::instrument(skip_all, fields(views = scene.views().len()))]
    pub fn finish_loading(&mut self, scene: LayeredScene) -> LdiResult<()> {
        if self.state != DriverState::Loading {
            return Err(LdiError::validation(format!(
                "finish_loading requires the Loading state, driver is {:?}",
                self.state
            )));
        }
        match self.opts.display.content_depth(&scene) {
            Ok(depth) => {
                tracing::info!(
                    stereo = scene.is_stereo(),
                    content_depth = depth,
                    "scene loaded"
                );
                self.content_depth = depth;
                self.scene = Some(scene);
                self.state = DriverState::Rendering;
                Ok(())
            }
            Err(e) => {
                self.state = DriverState::Idle;
                Err(LdiError::setup(format!("scene rejected: {e}")))
            }
        }
    }

    /// Resolve device geometry and switch to stereo rendering.
    #[tracing::instrument(skip_all)]
    pub fn start_session(&mut self, left: &EyeSetup, right: &EyeSetup) -> LdiResult<&StereoGeometry> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| LdiError::validation("start_session requires a loaded scene"))?;
        let geometry = resolve(left, right, scene, &self.opts.display)?;
        self.eye_half_offset = (right.pose.position - left.pose.position) * 0.5;
        self.smoother.reset();
        self.state = DriverState::Rendering;
        Ok(&*self.geometry.insert(geometry))
    }

    /// Leave stereo rendering; the next frame is 2D.
    pub fn end_session(&mut self) {
        if self.geometry.take().is_some() {
            tracing::info!("stereo session ended");
        }
        self.smoother.reset();
        if self.scene.is_some() {
            self.state = DriverState::SessionEnd;
        }
    }

    /// Render one frame: two eyes during a session, one 2D frame otherwise.
    ///
    /// `last_frame_ms` is the measured duration of the previous frame and drives the quality
    /// controller. A `None` viewpoint reuses the last smoothed one.
    #[tracing::instrument(skip(self, viewpoint), fields(state = ?self.state))]
    pub fn render_frame(
        &mut self,
        viewpoint: Option<Viewpoint>,
        last_frame_ms: Option<f64>,
    ) -> LdiResult<Vec<FrameRGBA>> {
        if !matches!(self.state, DriverState::Rendering | DriverState::SessionEnd) {
            return Err(LdiError::validation(format!(
                "render_frame requires a loaded scene, driver is {:?}",
                self.state
            )));
        }
        if let Some(ms) = last_frame_ms {
            self.quality.observe(ms);
        }
        if let Some(Viewpoint::Eyes { left, right }) = viewpoint {
            self.eye_half_offset = (right.position - left.position) * 0.5;
        }
        let head = self.smoother.update(viewpoint.map(|v| v.head()));
        let mode = self.refine_mode();

        let frames = match (&self.geometry, &self.scene) {
            (Some(geo), Some(scene)) => {
                let head = head.unwrap_or_else(|| nominal_head(&geo.plane));
                [(Eye::Left, -1.0), (Eye::Right, 1.0)]
                    .into_iter()
                    .map(|(eye, side)| {
                        let view = scene.view_for(Some(eye));
                        let camera = geo.eye_camera(eye, head + self.eye_half_offset * side, view);
                        self.draw(view, self.params(camera, Some(eye), mode))
                    })
                    .collect::<LdiResult<Vec<_>>>()?
            }
            (None, Some(scene)) => {
                let view = scene.view_for(None);
                let res = self.output_resolution(view);
                let camera = match head {
                    Some(h) => self.desktop_camera(h, view, res),
                    None => VirtualCamera::from_view(view, res),
                };
                vec![self.draw(view, self.params(camera, None, mode))?]
            }
            (_, None) => return Err(LdiError::validation("no scene loaded")),
        };

        if self.state == DriverState::SessionEnd {
            self.state = DriverState::Rendering;
        }
        Ok(frames)
    }

    /// Render `count` viewpoints spaced `spacing_mm` apart along the screen's x axis, centered on
    /// the current head position, for multi-view panels.
    #[tracing::instrument(skip(self))]
    pub fn render_multiview(&mut self, count: usize, spacing_mm: f64) -> LdiResult<Vec<FrameRGBA>> {
        if count == 0 {
            return Err(LdiError::validation("multiview count must be >= 1"));
        }
        if !spacing_mm.is_finite() {
            return Err(LdiError::validation("multiview spacing must be finite"));
        }
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| LdiError::validation("render_multiview requires a loaded scene"))?;
        let view = scene.view_for(None);
        let res = self.output_resolution(view);
        let plane = ConvergencePlane::desktop(&self.opts.display);
        let head = self.smoother.last().unwrap_or_else(|| nominal_head(&plane));
        let mode = self.refine_mode();
        let center = (count as f64 - 1.0) * 0.5;

        (0..count)
            .map(|i| {
                let offset = DVec3::new((i as f64 - center) * spacing_mm, 0.0, 0.0);
                let camera = self.desktop_camera(head + offset, view, res);
                self.draw(view, self.params(camera, None, mode))
            })
            .collect()
    }

    fn params(&self, camera: VirtualCamera, eye: Option<Eye>, mode: RefineMode) -> DrawParams {
        DrawParams {
            camera,
            eye,
            background: self.opts.background,
            reveal: self.opts.reveal,
            depth_in_alpha: self.opts.depth_in_alpha,
            mode,
            parallel: self.opts.parallel,
        }
    }

    fn draw(&self, view: &View, params: DrawParams) -> LdiResult<FrameRGBA> {
        match &self.pool {
            Some(pool) => pool.install(|| render_view(view, &params)),
            None => render_view(view, &params),
        }
    }

    fn output_resolution(&self, view: &View) -> Resolution {
        self.opts.output.unwrap_or_else(|| view.resolution())
    }

    fn desktop_camera(&self, head: DVec3, view: &View, res: Resolution) -> VirtualCamera {
        ConvergencePlane::desktop(&self.opts.display).eye_camera(
            head,
            view,
            res,
            self.opts.display.ipd_mm,
            self.content_depth,
        )
    }
}

/// Head position at the plane's nominal viewing distance, on its axis.
fn nominal_head(plane: &ConvergencePlane) -> DVec3 {
    plane.position + plane.orientation * DVec3::new(0.0, 0.0, plane.distance)
}

#[cfg(test)]
#[path = "../../tests/unit/render/driver.rs"]
mod tests;
