//! Resize orchestrator.
//!
//! `ResizeEngine` owns the live scene and drives a resize through
//!
//! ```text
//! Idle → Resizing → Attempt(strategy)* → Settled
//! ```
//!
//! 1. Empty scene: change the viewport and settle.
//! 2. Ask the recommender for a strategy, confidence and padding.
//! 3. Resize the viewport before touching any object.
//! 4. Try the recommended strategy, then Intelligent Scaling, then
//!    Emergency Repositioning (which cannot fail).
//! 5. Render, reclassify overflow, record a history snapshot.
//! 6. Schedule the deferred feedback event.
//!
//! Each non-terminal attempt runs against a checkpoint of the objects and
//! is rolled back on failure, so fallbacks never start from a half-applied
//! layout. Panics inside a non-terminal strategy count as a failure on
//! native targets only: `wasm32` builds abort on panic, so there
//! `catch_unwind` never sees one. If Emergency Repositioning itself fails,
//! the scene, viewport and phase are put back as they were before the call.
//!
//! The engine is not reentrant; at most one resize is in flight.

use crate::feedback::{FeedbackEvent, FeedbackScheduler, NoFeedback};
use crate::history::HistoryLog;
use crate::overflow::{OverflowClassifier, OverflowReport};
use crate::recommend::{HeuristicRecommender, Recommendation, Recommender, ResizeContext};
use crate::strategy::{Strategy, StrategyError, StrategyInput};
use cr_core::{
    ConfigError, DrawableObject, ObjectId, ResizeConfig, Scene, Snapshot, SnapshotError,
    Viewport,
};
use smallvec::SmallVec;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;
use thiserror::Error;

/// The drawing-surface collaborator: repaints after the engine settles.
pub trait RenderSurface {
    fn render_all(&mut self, scene: &Scene);
}

/// Surface that draws nothing (headless use, tests).
#[derive(Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render_all(&mut self, _scene: &Scene) {}
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid viewport size {width}×{height}")]
    InvalidSize { width: f32, height: f32 },

    #[error("no object with id '{0}'")]
    UnknownObject(ObjectId),

    /// Non-finite or negative size; no strategy can lay it out.
    #[error("object '{0}' has malformed geometry")]
    MalformedObject(ObjectId),

    /// Emergency Repositioning failed to contain the layout. A bug, not a
    /// runtime condition.
    #[error("layout defect: emergency repositioning left objects outside: {0}")]
    LayoutDefect(StrategyError),

    /// A history snapshot could not be captured or applied.
    #[error("history error: {0}")]
    History(#[from] SnapshotError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePhase {
    Idle,
    Resizing,
    Attempt(Strategy),
    Settled,
}

/// What a settled resize did.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    /// Strategy that produced the final layout; `None` for an empty scene.
    pub strategy: Option<Strategy>,
    /// Every strategy tried, in order.
    pub attempts: SmallVec<[Strategy; 3]>,
    pub recommendation: Option<Recommendation>,
    pub report: OverflowReport,
}

pub struct ResizeEngine {
    scene: Scene,
    history: HistoryLog,
    classifier: OverflowClassifier,
    config: ResizeConfig,
    /// `None` uses a `HeuristicRecommender` built from the live config.
    recommender: Option<Box<dyn Recommender>>,
    surface: Box<dyn RenderSurface>,
    feedback: Box<dyn FeedbackScheduler>,
    phase: ResizePhase,
    actions: u64,
}

impl ResizeEngine {
    /// Engine with the built-in recommender, no surface and no feedback.
    pub fn new(scene: Scene) -> Result<Self, EngineError> {
        Self::with_config(scene, ResizeConfig::default())
    }

    pub fn with_config(scene: Scene, config: ResizeConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut engine = Self {
            scene,
            history: HistoryLog::new(config.history_capacity),
            classifier: OverflowClassifier::from_config(&config),
            recommender: None,
            config,
            surface: Box::new(NullSurface),
            feedback: Box::new(NoFeedback),
            phase: ResizePhase::Idle,
            actions: 0,
        };
        engine.classifier.classify_scene(&mut engine.scene);
        engine.history.record(engine.scene.snapshot()?);
        Ok(engine)
    }

    pub fn with_recommender(mut self, recommender: impl Recommender + 'static) -> Self {
        self.recommender = Some(Box::new(recommender));
        self
    }

    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    pub fn with_feedback(mut self, scheduler: impl FeedbackScheduler + 'static) -> Self {
        self.feedback = Box::new(scheduler);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.scene.viewport
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    pub fn phase(&self) -> ResizePhase {
        self.phase
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    pub fn resize_to(&mut self, width: f32, height: f32) -> Result<ResizeOutcome, EngineError> {
        check_size(width, height)?;

        let old = self.scene.viewport;
        let new = Viewport::new(width, height);
        let prior_phase = self.phase;
        self.set_phase(ResizePhase::Resizing);

        if self.scene.is_empty() {
            self.scene.viewport = new;
            return self.settle(None, SmallVec::new(), None);
        }

        let mut context = ResizeContext::new(old, new, self.scene.object_tags());
        let recommendation = match &self.recommender {
            Some(recommender) => recommender.recommend(&context),
            None => HeuristicRecommender::from_config(&self.config).recommend(&context),
        }
        .sanitized();
        context.strategy = Some(recommendation.strategy);
        context.confidence = recommendation.confidence;
        context.suggested_padding = recommendation.suggested_padding;
        log::debug!(
            "resize {}×{} → {}×{}: {} ({:.2}), {}",
            old.width,
            old.height,
            width,
            height,
            recommendation.strategy,
            recommendation.confidence,
            recommendation.reasoning
        );

        let original_positions = self.scene.placements();
        self.scene.viewport = new;

        let input = StrategyInput {
            old,
            new,
            padding: recommendation.suggested_padding,
            confidence: recommendation.confidence,
        };

        let mut attempts: SmallVec<[Strategy; 3]> = SmallVec::new();
        let mut chain: SmallVec<[Strategy; 2]> = SmallVec::new();
        chain.push(recommendation.strategy);
        if recommendation.strategy == Strategy::SmartRearrange {
            chain.push(Strategy::IntelligentScaling);
        }

        let mut applied = None;
        for strategy in chain {
            if strategy == Strategy::EmergencyRepositioning {
                break;
            }
            attempts.push(strategy);
            if self.attempt(strategy, &input) {
                applied = Some(strategy);
                break;
            }
        }

        let applied = match applied {
            Some(strategy) => strategy,
            None => {
                let strategy = Strategy::EmergencyRepositioning;
                attempts.push(strategy);
                self.set_phase(ResizePhase::Attempt(strategy));
                let checkpoint = self.scene.objects.clone();
                if let Err(e) = strategy.run(&mut self.scene.objects, &input, &self.config) {
                    log::error!("emergency repositioning failed: {e}");
                    self.scene.objects = checkpoint;
                    self.scene.viewport = old;
                    self.set_phase(prior_phase);
                    return Err(EngineError::LayoutDefect(e));
                }
                strategy
            }
        };

        let outcome = self.settle(Some(applied), attempts, Some(recommendation.clone()))?;

        self.actions += 1;
        let event = FeedbackEvent {
            action_id: format!("resize_{}", self.actions),
            strategy: applied,
            confidence: recommendation.confidence,
            reasoning: recommendation.reasoning,
            context,
            original_positions,
        };
        self.feedback
            .schedule(Duration::from_millis(self.config.feedback_delay_ms), event);

        Ok(outcome)
    }

    /// Run one non-terminal strategy against a checkpoint. On failure the
    /// objects are restored and `false` is returned.
    fn attempt(&mut self, strategy: Strategy, input: &StrategyInput) -> bool {
        self.set_phase(ResizePhase::Attempt(strategy));
        let checkpoint: Vec<DrawableObject> = self.scene.objects.clone();

        let objects = &mut self.scene.objects;
        let config = &self.config;
        let result = catch_unwind(AssertUnwindSafe(|| strategy.run(objects, input, config)));

        match result {
            Ok(Ok(())) => true,
            Ok(Err(StrategyError::Inapplicable(reason))) => {
                log::debug!("{strategy} skipped: {reason}");
                self.scene.objects = checkpoint;
                false
            }
            Ok(Err(e)) => {
                log::warn!("{strategy} failed, falling back: {e}");
                self.scene.objects = checkpoint;
                false
            }
            Err(_) => {
                log::warn!("{strategy} panicked, falling back");
                self.scene.objects = checkpoint;
                false
            }
        }
    }

    fn settle(
        &mut self,
        strategy: Option<Strategy>,
        attempts: SmallVec<[Strategy; 3]>,
        recommendation: Option<Recommendation>,
    ) -> Result<ResizeOutcome, EngineError> {
        self.surface.render_all(&self.scene);
        let report = self.classifier.classify_scene(&mut self.scene);
        self.history.record(self.scene.snapshot()?);
        self.set_phase(ResizePhase::Settled);

        log::info!(
            "resize settled at {}×{} via {}",
            self.scene.viewport.width,
            self.scene.viewport.height,
            strategy.map_or("viewport only", |s| s.as_str())
        );

        Ok(ResizeOutcome {
            strategy,
            attempts,
            recommendation,
            report,
        })
    }

    fn set_phase(&mut self, phase: ResizePhase) {
        log::trace!("phase {:?} → {:?}", self.phase, phase);
        self.phase = phase;
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one snapshot. `Ok(false)` at the oldest entry.
    ///
    /// A snapshot that fails to decode leaves the scene and cursor where
    /// they were and is reported as `EngineError::History`.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.apply_snapshot(&snapshot) {
            self.history.redo();
            return Err(e);
        }
        Ok(true)
    }

    /// Step forward one snapshot. `Ok(false)` at the newest entry.
    pub fn redo(&mut self) -> Result<bool, EngineError> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.apply_snapshot(&snapshot) {
            self.history.undo();
            return Err(e);
        }
        Ok(true)
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        self.scene.restore(snapshot).map_err(|e| {
            log::error!("history: {e}");
            EngineError::History(e)
        })?;
        self.surface.render_all(&self.scene);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Overflow ────────────────────────────────────────────────────────

    pub fn has_overflow(&self) -> bool {
        self.classifier.has_overflow(&self.scene)
    }

    /// Pull fully-outside objects back in. Records a snapshot when anything moved.
    pub fn recenter_overflow(&mut self) -> Result<usize, EngineError> {
        let moved = self.classifier.recenter_overflowing(&mut self.scene);
        if moved > 0 {
            self.surface.render_all(&self.scene);
            self.history.record(self.scene.snapshot()?);
        }
        Ok(moved)
    }

    // ─── Structural mutations ────────────────────────────────────────────

    /// Rejects objects whose size is non-finite or negative.
    pub fn add_object(&mut self, object: DrawableObject) -> Result<(), EngineError> {
        if !object.is_well_formed() {
            return Err(EngineError::MalformedObject(object.id));
        }
        self.scene.add(object);
        self.commit()
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<DrawableObject, EngineError> {
        let removed = self
            .scene
            .remove(id)
            .ok_or(EngineError::UnknownObject(id))?;
        self.commit()?;
        Ok(removed)
    }

    pub fn move_object(&mut self, id: ObjectId, x: f32, y: f32) -> Result<(), EngineError> {
        self.modify_object(id, |o| o.set_position(x, y))
    }

    pub fn modify_object(
        &mut self,
        id: ObjectId,
        edit: impl FnOnce(&mut DrawableObject),
    ) -> Result<(), EngineError> {
        let object = self
            .scene
            .get_mut(id)
            .ok_or(EngineError::UnknownObject(id))?;
        edit(object);
        self.commit()
    }

    /// Reclassify, render and record the current scene as one undo step.
    pub fn commit(&mut self) -> Result<(), EngineError> {
        self.classifier.classify_scene(&mut self.scene);
        self.surface.render_all(&self.scene);
        self.history.record(self.scene.snapshot()?);
        Ok(())
    }

    /// Replace the scene wholesale and start a fresh history from it.
    /// The current scene is kept if the new one has an invalid viewport or
    /// a malformed object.
    pub fn load_scene(&mut self, scene: Scene) -> Result<(), EngineError> {
        check_size(scene.viewport.width, scene.viewport.height)?;
        if let Some(bad) = scene.objects.iter().find(|o| !o.is_well_formed()) {
            return Err(EngineError::MalformedObject(bad.id));
        }
        self.scene = scene;
        self.history.clear();
        self.phase = ResizePhase::Idle;
        self.commit()
    }

    /// Encode the live scene for the host to persist.
    pub fn save_snapshot(&self) -> Result<Snapshot, EngineError> {
        Ok(self.scene.snapshot()?)
    }

    /// Load a scene previously produced by `save_snapshot`.
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        self.load_scene(snapshot.decode()?)
    }

    /// Swap the configuration. A smaller history capacity evicts the
    /// oldest entries straight away.
    pub fn set_config(&mut self, config: ResizeConfig) -> Result<(), EngineError> {
        config.validate()?;
        self.classifier = OverflowClassifier::from_config(&config);
        self.history.set_capacity(config.history_capacity);
        self.config = config;
        Ok(())
    }
}

fn check_size(width: f32, height: f32) -> Result<(), EngineError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSize { width, height })
    }
}
