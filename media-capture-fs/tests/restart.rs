//! Captures through the filesystem host: a multi-shot capture interrupted
//! by a process restart, and recorder results with reserved characters.

use std::fs;
use std::sync::Arc;

use parking_lot::Mutex;

use media_capture_core::models::capability::Capability;
use media_capture_core::processing::uri;
use media_capture_core::traits::resolution_sink::ResolutionSink;
use media_capture_core::{
    CallbackToken, CaptureOptions, CaptureOrchestrator, CaptureOutcome, ErrorCode, ExternalResult, MediaStore,
    PermissionOutcome, RequestRegistry,
};
use media_capture_fs::{capture_host, DirectoryMediaStore, FsHostConfig, PolicyPermissionGate, QueuedCaptureSurface};

const DECLARED: [Capability; 3] = [Capability::ReadStorage, Capability::WriteStorage, Capability::Camera];

type Delivered = Arc<Mutex<Vec<(CallbackToken, CaptureOutcome)>>>;

struct Host {
    gate: Arc<PolicyPermissionGate>,
    surface: Arc<QueuedCaptureSurface>,
    delivered: Delivered,
    orchestrator: CaptureOrchestrator,
}

fn start_host(config: &FsHostConfig, gate: PolicyPermissionGate) -> Host {
    let gate = Arc::new(gate);
    let surface = Arc::new(QueuedCaptureSurface::supporting_all());
    let delivered: Delivered = Arc::default();

    let sink_log = Arc::clone(&delivered);
    let sink: Arc<dyn ResolutionSink> = Arc::new(move |token: &CallbackToken, outcome: CaptureOutcome| {
        sink_log.lock().push((token.clone(), outcome));
    });
    let host = capture_host(config, gate.clone(), surface.clone()).unwrap();
    Host {
        gate,
        surface,
        delivered,
        orchestrator: CaptureOrchestrator::new(Arc::new(RequestRegistry::new(sink)), host),
    }
}

fn config(dir: &tempfile::TempDir) -> FsHostConfig {
    FsHostConfig {
        media_root: dir.path().join("media"),
        snapshot_path: dir.path().join("state/pending.json"),
        local_url_prefix: Some("app://media".into()),
    }
}

/// Stand-in for the camera writing a still into its target.
fn shoot(target: &str, marker: u8) {
    fs::write(uri::to_local_path(target), [0xFF, 0xD8, marker, 0xFF, 0xD9]).unwrap();
}

#[test]
fn photos_survive_restart_between_shots() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let options = CaptureOptions {
        limit: 2,
        image: true,
        ..Default::default()
    };

    // first process: one of two photos taken, then killed mid-capture
    let id = {
        let host = start_host(&config, PolicyPermissionGate::granting_all(&DECLARED));
        let id = host
            .orchestrator
            .capture_image_or_video(options, CallbackToken::from("original"))
            .unwrap();

        let first = host.surface.take_launches().remove(0);
        shoot(first.image_target.as_deref().unwrap(), 1);
        host.orchestrator.on_external_result(id, ExternalResult::Ok { uri: None });
        assert!(host.delivered.lock().is_empty());
        assert_eq!(host.surface.pending(), 1);

        config
            .snapshot_store()
            .save(&host.orchestrator.registry().snapshot())
            .unwrap();
        id
    };

    // second process: the camera finishes the shot that was in flight
    let host = start_host(&config, PolicyPermissionGate::granting_all(&DECLARED));
    let snapshot = config.snapshot_store().load().unwrap().unwrap();
    let restored = host
        .orchestrator
        .restore(snapshot, Some(CallbackToken::from("resumed")))
        .unwrap();
    assert_eq!(restored, vec![id]);

    let handle = host.orchestrator.registry().get(id).unwrap();
    let target = handle.lock().targets.image.clone().unwrap();
    drop(handle);
    shoot(&target, 2);
    host.orchestrator.on_external_result(id, ExternalResult::Ok { uri: None });

    let delivered = host.delivered.lock().clone();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, CallbackToken::from("resumed"));
    let files = match &delivered[0].1 {
        CaptureOutcome::Success(files) => files.clone(),
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(files.len(), 2);
    for file in &files {
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.size, 5);
        assert!(file.local_url.as_deref().unwrap().starts_with("app://media/images/"));
    }
    assert_eq!(fs::read(files[0].local_path()).unwrap()[2], 1);
    assert_eq!(fs::read(files[1].local_path()).unwrap()[2], 2);

    // raw captures were dropped as duplicates of their committed copies
    let store = DirectoryMediaStore::open(&config.media_root).unwrap();
    let entries = store.image_entries().unwrap();
    assert_eq!(entries, files.iter().map(|f| f.full_path.clone()).collect::<Vec<_>>());

    assert!(host.orchestrator.registry().is_empty());
    config.snapshot_store().clear().unwrap();
    assert_eq!(config.snapshot_store().load().unwrap(), None);
}

#[test]
fn denied_prompt_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let id = {
        let host = start_host(&config, PolicyPermissionGate::new(&DECLARED));
        let id = host
            .orchestrator
            .capture_audio(CaptureOptions::default(), CallbackToken::from("mic"))
            .unwrap();
        assert_eq!(host.gate.take_prompts().len(), 1);
        config
            .snapshot_store()
            .save(&host.orchestrator.registry().snapshot())
            .unwrap();
        id
    };

    let host = start_host(&config, PolicyPermissionGate::new(&DECLARED));
    let snapshot = config.snapshot_store().load().unwrap().unwrap();
    host.orchestrator.restore(snapshot, None).unwrap();

    host.orchestrator
        .on_permission_result(id, &PermissionOutcome::denied(&[Capability::ReadStorage]));

    let delivered = host.delivered.lock().clone();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, CallbackToken::from("mic"));
    assert_eq!(delivered[0].1.to_payload()["code"], ErrorCode::PermissionDenied.code());
    assert_eq!(host.surface.pending(), 0);
}

#[test]
fn missing_snapshot_restores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    assert!(config.snapshot_store().load().unwrap().is_none());
}

#[test]
fn recording_with_encoded_uri_is_described() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let host = start_host(&config, PolicyPermissionGate::granting_all(&DECLARED));
    let id = host
        .orchestrator
        .capture_audio(CaptureOptions::default(), CallbackToken::from("rec"))
        .unwrap();
    assert_eq!(host.surface.take_launches().len(), 1);

    let recording = dir.path().join("my clip.wav");
    fs::write(&recording, b"RIFF....WAVE").unwrap();
    let item = uri::file_uri(&recording).unwrap();
    assert!(item.ends_with("/my%20clip.wav"));
    host.orchestrator.on_external_result(id, ExternalResult::Ok { uri: Some(item.clone()) });

    let delivered = host.delivered.lock().clone();
    assert_eq!(delivered.len(), 1);
    let files = match &delivered[0].1 {
        CaptureOutcome::Success(files) => files.clone(),
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(files[0].name, "my clip.wav");
    assert_eq!(files[0].full_path, item);
    assert_eq!(files[0].size, 12);
    assert!(files[0].last_modified_date > 0);
    assert_eq!(files[0].local_path(), recording);
}
