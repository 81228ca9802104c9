use huntapp::model::{Hunt, NewHunt};
use huntapp::recovery::RecoveryOutcome;
use huntapp::store::backend::StorageBackend;
use huntapp::store::fs_backend::FsBackend;
use huntapp::store::snapshot::snapshot_name;
use huntapp::store::HuntStore;
use huntapp::test_utils::TestEnv;
use std::fs;
use std::path::PathBuf;

fn record_path(env: &TestEnv, id: &str) -> PathBuf {
    env.hunts_dir().join(format!("{}.json", id))
}

fn temp_path(env: &TestEnv, id: &str) -> PathBuf {
    env.hunts_dir().join(format!("{}.tmp", id))
}

fn with_count(hunt: &Hunt, count: i64) -> Vec<u8> {
    let mut copy = hunt.clone();
    copy.set_count(count);
    serde_json::to_vec_pretty(&copy).unwrap()
}

#[test]
fn truncated_temp_write_leaves_committed_record_intact() {
    let mut env = TestEnv::new().unwrap();
    let hunt = env.ctx.api.create_hunt(NewHunt::new("Charm", "Ralts")).unwrap();
    let hunt = env.ctx.api.set_count(&hunt.id, 17).unwrap();
    let committed = fs::read(record_path(&env, &hunt.id)).unwrap();

    // A crash halfway through the temp write of the next commit.
    let next = with_count(&hunt, 18);
    fs::write(temp_path(&env, &hunt.id), &next[..next.len() / 2]).unwrap();

    env.restart().unwrap();

    assert!(env.ctx.report.is_clean());
    assert_eq!(env.ctx.report.stray_temps_removed, 1);
    assert_eq!(fs::read(record_path(&env, &hunt.id)).unwrap(), committed);
    assert!(!temp_path(&env, &hunt.id).exists());
    assert_eq!(env.ctx.api.get_hunt(&hunt.id).unwrap().count, 17);
}

#[test]
fn complete_temp_beats_snapshots() {
    let mut env = TestEnv::new().unwrap();
    let hunt = env.ctx.api.create_hunt(NewHunt::new("Charm", "Ralts")).unwrap();
    let hunt = env.ctx.api.set_count(&hunt.id, 30).unwrap();
    assert!(!env.ctx.api.snapshots(&hunt.id).unwrap().is_empty());

    fs::write(temp_path(&env, &hunt.id), with_count(&hunt, 31)).unwrap();
    fs::write(record_path(&env, &hunt.id), b"{\"id\": \"hunt_").unwrap();

    env.restart().unwrap();

    assert_eq!(
        env.ctx.report.outcomes,
        vec![(hunt.id.clone(), RecoveryOutcome::Promoted)]
    );
    assert_eq!(env.ctx.api.get_hunt(&hunt.id).unwrap().count, 31);
    assert!(!temp_path(&env, &hunt.id).exists());
}

#[test]
fn newest_snapshot_wins_without_temp() {
    let mut env = TestEnv::new().unwrap();
    let hunt = env.ctx.api.create_hunt(NewHunt::new("Charm", "Ralts")).unwrap();

    let older = snapshot_name("2024-01-01T10-00-00-000Z", &hunt.id);
    let newer = snapshot_name("2024-06-01T10-00-00-000Z", &hunt.id);
    fs::write(env.snapshots_dir().join(&older), with_count(&hunt, 30)).unwrap();
    fs::write(env.snapshots_dir().join(&newer), with_count(&hunt, 60)).unwrap();
    // The snapshot taken at creation is newer than both; drop it.
    for name in env.ctx.api.snapshots(&hunt.id).unwrap() {
        if name != older && name != newer {
            fs::remove_file(env.snapshots_dir().join(name)).unwrap();
        }
    }
    fs::write(record_path(&env, &hunt.id), b"").unwrap();

    env.restart().unwrap();

    assert_eq!(
        env.ctx.report.outcomes,
        vec![(hunt.id.clone(), RecoveryOutcome::RestoredFromSnapshot(newer))]
    );
    let restored = env.ctx.api.get_hunt(&hunt.id).unwrap();
    assert_eq!(restored.count, 60);
    assert!(restored.updated_at > hunt.updated_at);
}

#[test]
fn unrecoverable_record_is_left_untouched_and_others_still_load() {
    let mut env = TestEnv::new().unwrap();
    let keep = env.ctx.api.create_hunt(NewHunt::new("Keep", "Eevee")).unwrap();
    fs::write(env.hunts_dir().join("hunt_1_lost.json"), b"\x00garbage").unwrap();

    env.restart().unwrap();

    assert_eq!(env.ctx.report.corrupted, vec!["hunt_1_lost".to_string()]);
    assert_eq!(env.ctx.report.unrecoverable(), vec!["hunt_1_lost"]);
    assert_eq!(
        fs::read(env.hunts_dir().join("hunt_1_lost.json")).unwrap(),
        b"\x00garbage"
    );

    let listed: Vec<String> = env.ctx.api.list_hunts().into_iter().map(|h| h.id).collect();
    assert_eq!(listed, vec![keep.id]);
}

#[test]
fn list_skips_corrupted_files_without_recovering_them() {
    let env = TestEnv::new().unwrap();
    let hunt = env.ctx.api.create_hunt(NewHunt::new("Charm", "Ralts")).unwrap();
    fs::write(env.hunts_dir().join("hunt_2_bad.json"), b"[1, 2").unwrap();

    let listed = env.ctx.api.list_hunts();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, hunt.id);
    assert_eq!(
        fs::read(env.hunts_dir().join("hunt_2_bad.json")).unwrap(),
        b"[1, 2"
    );
}

#[test]
fn fs_store_scan_is_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(dir.path());
    backend.ensure_layout().unwrap();
    let store = HuntStore::with_backend(backend);

    let a = store.create(NewHunt::new("A", "Ralts")).unwrap();
    let b = store.create(NewHunt::new("B", "Eevee")).unwrap();
    fs::write(store.backend().canonical_path(&a.id), b"{").unwrap();

    let report = store.scan_and_recover();
    // Restored from the snapshot taken at creation.
    assert_eq!(report.recovered, vec![a.id.clone()]);
    assert_eq!(store.get(&a.id).unwrap().name, "A");
    assert_eq!(store.get(&b.id).unwrap().name, "B");
    assert!(store.backend().read_temp(&b.id).unwrap().is_none());
}
