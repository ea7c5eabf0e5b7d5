use mouthpiece_core::{
    asset::{AssetCache, AssetLoader, AvatarAsset, ManifestFileLoader},
    config::Config,
    engine::Engine,
    inputs::Inputs,
    message::{AudioSource, Message, Role},
    playback::{AudioTransport, PlaybackClock},
    viseme::Viseme,
};
use mouthpiece_test_fixtures::{avatars, messages};

#[test]
fn all_message_fixtures_parse() {
    for key in messages::keys() {
        let json = messages::json(&key).unwrap();
        Message::from_json_str(&json).unwrap_or_else(|e| panic!("{key}: {e}"));
    }
}

#[test]
fn greeting_fixture_fields() {
    let msg: Message = messages::load("greeting").unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.rephrased, Some(false));
    assert!(matches!(msg.audio_source(), Some(AudioSource::Url(_))));

    let sad: Message = messages::load("sad-no-animation").unwrap();
    assert!(sad
        .audio_source()
        .unwrap()
        .as_str()
        .starts_with("data:audio/mp3;base64,"));
}

#[test]
fn cache_mounts_from_manifest_files() {
    let mut loader = ManifestFileLoader::new(avatars::dir());
    let mut cache = AssetCache::new();
    let key = avatars::file_name("orc").unwrap();

    let mut engine = Engine::new(Config::default());
    assert!(engine.mount_cached(&mut cache, &key, &mut loader));
    assert!(engine.update(1.0 / 60.0, Inputs::at(0.0)).render_ready());
    assert_eq!(engine.clips().library().len(), 5);
    assert_eq!(cache.len(), 1);

    // Second mount reuses the cached asset.
    let before = cache.get(&key).unwrap();
    let mut other = Engine::new(Config::default());
    assert!(other.mount_cached(&mut cache, &key, &mut loader));
    assert!(std::sync::Arc::ptr_eq(&before, other.asset().unwrap()));
}

#[test]
fn broken_avatar_stays_unrendered() {
    let mut loader = ManifestFileLoader::new(avatars::dir());
    assert!(loader.load(&avatars::file_name("broken").unwrap()).is_err());

    let mut cache = AssetCache::new();
    let key = avatars::file_name("broken").unwrap();
    let mut engine = Engine::new(Config::default());
    assert!(!engine.mount_cached(&mut cache, &key, &mut loader));
    assert!(!engine.mount_cached(&mut cache, &key, &mut loader));
    assert!(cache.failure(&key).is_some());
    assert!(!engine.is_mounted());
    for _ in 0..10 {
        assert!(!engine.update(1.0 / 60.0, Inputs::at(0.0)).render_ready());
    }
}

#[test]
fn avatar_without_clips_still_blends_face() {
    let asset = AvatarAsset::from_json_str(
        r#"{ "name": "bust", "meshes": [ { "name": "Head", "targets": ["viseme_kk"] } ] }"#,
    )
    .unwrap();
    let mut engine = Engine::new(Config::default());
    engine.mount(asset.into());
    let msg: Message = messages::load("greeting").unwrap();
    let out = engine.update(1.0 / 60.0, Inputs::at(0.4).with_message(msg));
    assert!(out.clips.is_empty());
    assert_eq!(
        engine.registry().target_by_name(Viseme::kk.channel_name()),
        Some(1.0)
    );
}

#[test]
fn transport_drives_lip_sync() {
    let mut engine = Engine::new(Config::default());
    engine.mount(avatars::load::<AvatarAsset>("orc").unwrap().into());
    let msg: Message = messages::load("greeting").unwrap();
    let mut audio = AudioTransport::with_duration(msg.lip_sync.as_ref().unwrap().duration);
    assert!(audio.play());

    let dt = 0.05;
    engine.update(dt, Inputs::at(audio.current_time()).with_message(msg));
    let mut pp_seen = false;
    while !audio.is_paused() {
        audio.advance(dt);
        engine.update(dt, Inputs::at(audio.current_time()));
        let t = audio.current_time();
        if (1.05..1.45).contains(&t) {
            pp_seen = true;
            assert_eq!(
                engine.registry().target_by_name(Viseme::PP.channel_name()),
                Some(1.0),
                "t={t}"
            );
        }
    }
    assert!(pp_seen);
    assert_eq!(audio.current_time(), 2.0);
}
