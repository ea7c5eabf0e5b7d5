use std::sync::Arc;

use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use bevy_mouthpiece::{
    AudioPlaybackTime, AvatarMessage, AvatarRenderReady, AvatarRoot, ClipMixerState,
    MeshBindings, MouthpieceEngine, MouthpiecePlugin,
};
use mouthpiece_core::{AvatarAsset, LipSync, Message, MessageUpdate};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn app_with_orc() -> (App, Entity, Entity) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(MouthpiecePlugin::default());

    let asset: AvatarAsset = mouthpiece_test_fixtures::avatars::load("orc").expect("orc fixture");
    app.world_mut()
        .resource_mut::<MouthpieceEngine>()
        .0
        .mount(Arc::new(asset));

    let root = app.world_mut().spawn(AvatarRoot).id();
    let head = app
        .world_mut()
        .spawn((
            Name::new("Wolf3D_Head"),
            MorphWeights::new(vec![0.0; 22], None).unwrap(),
        ))
        .id();
    let teeth = app
        .world_mut()
        .spawn((
            Name::new("Wolf3D_Teeth"),
            MorphWeights::new(vec![0.0; 4], None).unwrap(),
        ))
        .id();
    app.world_mut().entity_mut(root).add_child(head);
    app.world_mut().entity_mut(head).add_child(teeth);
    (app, head, teeth)
}

fn send(app: &mut App, msg: Message) {
    app.world_mut()
        .send_event(AvatarMessage(MessageUpdate::Replace(Arc::new(msg))));
}

#[test]
fn plugin_inserts_resources() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(MouthpiecePlugin::default());
    assert!(app.world().get_resource::<MouthpieceEngine>().is_some());
    assert!(app.world().get_resource::<AudioPlaybackTime>().is_some());
    assert!(app.world().get_resource::<ClipMixerState>().is_some());
    app.update();
}

#[test]
fn binds_nested_meshes_by_name() {
    let (mut app, head, teeth) = app_with_orc();
    app.update();
    let bindings = app.world().resource::<MeshBindings>();
    assert_eq!(bindings.map.len(), 2);
    assert!(bindings.map.values().any(|e| *e == head));
    assert!(bindings.map.values().any(|e| *e == teeth));
}

#[test]
fn expression_reaches_morph_weights() {
    let (mut app, head, teeth) = app_with_orc();
    send(&mut app, Message::new("m").with_expression("Joy"));
    app.update();

    // Joy is influence 14 on the head and 3 on the teeth.
    let w = app.world().get::<MorphWeights>(head).unwrap().weights();
    approx(w[14], 0.1, 1e-6);
    assert_eq!(w[20], 0.1);
    let w = app.world().get::<MorphWeights>(teeth).unwrap().weights();
    approx(w[3], 0.1, 1e-6);

    for _ in 0..5 {
        app.update();
    }
    let w = app.world().get::<MorphWeights>(head).unwrap().weights();
    approx(w[14], 1.0 - 0.9f32.powi(6), 1e-5);
}

#[test]
fn audio_time_drives_visemes() {
    let (mut app, head, _) = app_with_orc();
    send(
        &mut app,
        Message::new("m").with_lip_sync(LipSync::new(2.0).with_cue(1.0, 1.5, "A")),
    );
    app.world_mut().resource_mut::<AudioPlaybackTime>().0 = 1.2;
    app.update();
    // viseme_PP is influence 0.
    approx(app.world().get::<MorphWeights>(head).unwrap().weights()[0], 0.2, 1e-6);
}

#[test]
fn render_ready_sent_once() {
    #[derive(Resource, Default)]
    struct Ready(Vec<String>);

    fn count_ready(mut events: EventReader<AvatarRenderReady>, mut ready: ResMut<Ready>) {
        for e in events.read() {
            ready.0.push(e.avatar.clone());
        }
    }

    let (mut app, _, _) = app_with_orc();
    app.init_resource::<Ready>()
        .add_systems(PostUpdate, count_ready);
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(app.world().resource::<Ready>().0, vec!["orc".to_string()]);
}

#[test]
fn clip_mixer_state_tracks_active_clip() {
    let (mut app, _, _) = app_with_orc();
    app.update();
    assert_eq!(
        app.world().resource::<ClipMixerState>().weight("Animation_Idle_Orc"),
        1.0
    );

    send(&mut app, Message::new("m").with_animation("Action_Sad"));
    app.update();
    let mixer = app.world().resource::<ClipMixerState>();
    assert!(mixer.clips.iter().any(|c| c.clip == "Action_Sad"));
    assert!(mixer.clips.iter().all(|c| (0.0..=1.0).contains(&c.weight)));
}
