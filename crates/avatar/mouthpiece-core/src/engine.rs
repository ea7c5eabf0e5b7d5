//! Engine: owns the mounted avatar's channel table and clip state, and runs
//! the per-frame update.
//!
//! Frame order is fixed: message handover, clip transitions and playback,
//! expression targets, viseme targets, then one blend step per channel
//! written into every bound morph slot.

use std::sync::Arc;

use log::{debug, info};

use crate::asset::{AssetCache, AssetLoader, AvatarAsset};
use crate::blend::Smoother;
use crate::config::Config;
use crate::error::MouthpieceError;
use crate::expression::{ExpressionDriver, FacialExpression};
use crate::inputs::{Inputs, MessageUpdate};
use crate::lipsync::LipSyncDriver;
use crate::message::Message;
use crate::outputs::{CoreEvent, Outputs};
use crate::registry::MorphChannelRegistry;
use crate::state_machine::{AnimationState, AnimationStateMachine, ClipLibrary};

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    asset: Option<Arc<AvatarAsset>>,

    registry: MorphChannelRegistry,
    expressions: ExpressionDriver,
    lipsync: LipSyncDriver,
    clips: AnimationStateMachine,

    message: Option<Arc<Message>>,
    expression: Option<FacialExpression>,
    render_ready_sent: bool,

    // Events raised outside update() (mount), delivered with the next frame.
    pending: Vec<CoreEvent>,
    outputs: Outputs,
}

impl Engine {
    /// Create an engine with no avatar mounted.
    pub fn new(cfg: Config) -> Self {
        let clips = AnimationStateMachine::new(ClipLibrary::default(), &cfg);
        Self {
            cfg,
            asset: None,
            registry: MorphChannelRegistry::new(),
            expressions: ExpressionDriver::default(),
            lipsync: LipSyncDriver::default(),
            clips,
            message: None,
            expression: None,
            render_ready_sent: false,
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Like `new`, rejecting an invalid config.
    pub fn try_new(cfg: Config) -> Result<Self, MouthpieceError> {
        cfg.validate()?;
        Ok(Self::new(cfg))
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Bind an avatar: build the channel table, bind the drivers, and start
    /// the clip the current message (or idle) asks for.
    pub fn mount(&mut self, asset: Arc<AvatarAsset>) {
        let mut registry = MorphChannelRegistry::new();
        for mesh in &asset.meshes {
            registry.register_mesh(&mesh.name, &mesh.targets, &mesh.influences);
        }
        self.expressions = ExpressionDriver::bind(&registry);
        self.lipsync = LipSyncDriver::bind(&registry);
        self.lipsync
            .set_track(self.message.as_ref().and_then(|m| m.lip_sync.as_ref()));
        self.registry = registry;

        self.clips = AnimationStateMachine::new(ClipLibrary::new(&asset.clips), &self.cfg);
        let wanted = self.message.as_ref().and_then(|m| m.animation_name());
        if let Some(ev) = self.clips.request(wanted) {
            self.pending.push(ev.into());
        }

        debug!(
            "mounted avatar '{}': {} channels, {} expressions, {} visemes, {} clips",
            asset.name,
            self.registry.len(),
            self.expressions.channels().len(),
            self.lipsync.channels().len(),
            self.clips.library().len()
        );
        self.asset = Some(asset);
        self.render_ready_sent = false;
    }

    /// Mount through the cache. A failed load leaves the avatar unrendered.
    pub fn mount_cached(
        &mut self,
        cache: &mut AssetCache,
        key: &str,
        loader: &mut dyn AssetLoader,
    ) -> bool {
        match cache.get_or_load(key, loader) {
            Some(asset) => {
                self.mount(asset);
                true
            }
            None => false,
        }
    }

    pub fn unmount(&mut self) {
        self.asset = None;
        self.registry = MorphChannelRegistry::new();
        self.expressions = ExpressionDriver::default();
        self.lipsync = LipSyncDriver::default();
        self.clips = AnimationStateMachine::new(ClipLibrary::default(), &self.cfg);
        self.render_ready_sent = false;
        self.pending.clear();
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.asset.is_some()
    }

    pub fn asset(&self) -> Option<&Arc<AvatarAsset>> {
        self.asset.as_ref()
    }

    pub fn registry(&self) -> &MorphChannelRegistry {
        &self.registry
    }

    pub fn clips(&self) -> &AnimationStateMachine {
        &self.clips
    }

    pub fn state(&self) -> AnimationState {
        self.clips.state()
    }

    pub fn message(&self) -> Option<&Arc<Message>> {
        self.message.as_ref()
    }

    pub fn expression(&self) -> Option<FacialExpression> {
        self.expression
    }

    /// Outputs of the last update.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    fn apply_message(&mut self, update: MessageUpdate) {
        match update {
            MessageUpdate::Replace(msg) => {
                debug!("message '{}' replaces current", msg.id);
                self.expression = msg.facial_expression.as_deref().and_then(|name| {
                    let e = FacialExpression::from_name(name);
                    if e.is_none() {
                        debug!("unknown facial expression '{name}', using neutral");
                    }
                    e
                });
                self.lipsync.set_track(msg.lip_sync.as_ref());
                // No animation on the message keeps the current clip.
                if let Some(name) = msg.animation_name() {
                    if let Some(ev) = self.clips.request(Some(name)) {
                        self.outputs.push_event(ev.into());
                    }
                }
                self.outputs
                    .push_event(CoreEvent::MessageReplaced { id: msg.id.clone() });
                self.message = Some(msg);
            }
            MessageUpdate::Clear => {
                debug!("message cleared");
                self.message = None;
                self.expression = None;
                self.lipsync.set_track(None);
                if let Some(ev) = self.clips.request(None) {
                    self.outputs.push_event(ev.into());
                }
                self.outputs.push_event(CoreEvent::MessageCleared);
            }
        }
    }

    /// Step the engine by `dt` seconds.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        self.outputs.events.append(&mut self.pending);

        if let Some(update) = inputs.message {
            self.apply_message(update);
        }

        if let Some(asset) = self.asset.as_ref() {
            if !self.render_ready_sent {
                info!("avatar '{}' ready to render", asset.name);
                self.render_ready_sent = true;
                self.outputs.push_event(CoreEvent::RenderReady {
                    avatar: asset.name.clone(),
                });
            }
        }

        // 1) clip transitions and playback
        if let Some(ev) = self.clips.advance(dt) {
            self.outputs.push_event(ev.into());
        }
        self.outputs.clips.extend(self.clips.clip_weights());

        if self.cfg.setup_mode {
            return &self.outputs;
        }

        // 2) expressions
        self.expressions
            .drive(self.expression, &mut self.registry, self.cfg.expression_rate);

        // 3) visemes
        self.lipsync.drive(
            inputs.playback_time,
            &mut self.registry,
            self.cfg.viseme_attack_rate,
            self.cfg.viseme_release_rate,
        );

        // 4) blend and write slots
        let smoother = Smoother::new(self.cfg.smoothing, dt);
        self.registry.step_all(&smoother);

        &self.outputs
    }
}
