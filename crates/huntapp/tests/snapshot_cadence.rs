use huntapp::model::NewHunt;
use huntapp::store::fs_backend::FsBackend;
use huntapp::store::mem_backend::MemBackend;
use huntapp::store::snapshot::{Retention, SnapshotPolicy, SnapshotTrigger};
use huntapp::store::HuntStore;

#[test]
fn observed_cadence_end_to_end() {
    let store = HuntStore::with_backend(MemBackend::new());
    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();
    // Count 0 is a multiple of the interval.
    assert_eq!(store.backend().snapshot_write_count(), 1);

    for _ in 1..30 {
        store.increment_counter(&hunt.id).unwrap();
    }
    assert_eq!(store.backend().snapshot_write_count(), 1);

    store.increment_counter(&hunt.id).unwrap();
    assert_eq!(store.backend().snapshot_write_count(), 2);

    store.append_phase(&hunt.id, "Zubat", false, None).unwrap();
    assert_eq!(store.backend().snapshot_write_count(), 3);

    // With a phase present every save snapshots.
    for expected in 4..=8 {
        store.increment_counter(&hunt.id).unwrap();
        assert_eq!(store.backend().snapshot_write_count(), expected);
    }
}

#[test]
fn phase_changed_cadence_end_to_end() {
    let store = HuntStore::with_backend(MemBackend::new()).with_policy(SnapshotPolicy {
        trigger: SnapshotTrigger::PhaseChanged,
        ..Default::default()
    });
    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();
    store.set_counter(&hunt.id, 31).unwrap();
    let before = store.backend().snapshot_write_count();

    store.append_phase(&hunt.id, "Zubat", false, None).unwrap();
    assert_eq!(store.backend().snapshot_write_count(), before + 1);

    store.increment_counter(&hunt.id).unwrap();
    store.increment_counter(&hunt.id).unwrap();
    assert_eq!(store.backend().snapshot_write_count(), before + 1);
}

#[test]
fn decrement_at_zero_writes_nothing() {
    let store = HuntStore::with_backend(MemBackend::new());
    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();
    let commits = store.backend().commit_count();
    let snapshots = store.backend().snapshot_write_count();

    for _ in 0..3 {
        let same = store.decrement_counter(&hunt.id).unwrap().unwrap();
        assert_eq!(same.count, 0);
    }
    assert_eq!(store.backend().commit_count(), commits);
    assert_eq!(store.backend().snapshot_write_count(), snapshots);
}

#[test]
fn phase_removal_recomputes_the_clock() {
    let store = HuntStore::with_backend(MemBackend::new());
    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();

    let mut phase_ids = Vec::new();
    for at in [5, 12, 20] {
        store.set_counter(&hunt.id, at).unwrap();
        let h = store.append_phase(&hunt.id, "Zubat", false, None).unwrap().unwrap();
        phase_ids.push(h.phases.last().unwrap().id.clone());
    }
    store.set_counter(&hunt.id, 26).unwrap();

    let h = store.remove_phase(&hunt.id, &phase_ids[2]).unwrap().unwrap();
    assert_eq!(h.encounters_since_milestone, 26 - 12);

    store.remove_phase(&hunt.id, &phase_ids[0]).unwrap();
    let h = store.remove_phase(&hunt.id, &phase_ids[1]).unwrap().unwrap();
    assert!(h.phases.is_empty());
    assert_eq!(h.encounters_since_milestone, 26);
    assert_eq!(store.get(&hunt.id).unwrap().encounters_since_milestone, 26);
}

#[test]
fn keep_last_retention_bounds_snapshots() {
    let store = HuntStore::with_backend(MemBackend::new()).with_policy(SnapshotPolicy {
        retention: Retention::KeepLast(2),
        ..Default::default()
    });
    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();
    store.append_phase(&hunt.id, "Zubat", false, None).unwrap();
    for _ in 0..5 {
        store.increment_counter(&hunt.id).unwrap();
    }
    assert!(store.snapshots(&hunt.id).unwrap().len() <= 2);
}

#[test]
fn keep_last_retention_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(dir.path());
    backend.ensure_layout().unwrap();
    let store = HuntStore::with_backend(backend).with_policy(SnapshotPolicy {
        retention: Retention::KeepLast(1),
        ..Default::default()
    });

    let hunt = store.create(NewHunt::new("Charm", "Ralts")).unwrap();
    store.append_phase(&hunt.id, "Zubat", false, None).unwrap();
    store.increment_counter(&hunt.id).unwrap();

    let files = std::fs::read_dir(store.backend().snapshots_dir())
        .unwrap()
        .count();
    assert_eq!(files, 1);
}
