//! Integration tests for the lock service against a file-backed database
//!
//! Each test opens a fresh store in a temporary directory, the way the game
//! server does at startup.

use sticky_locks::{
    BlockFace, BlockPos, BlockSnapshot, Config, LockService, PlayerIdentity, StaticCatalog,
    StorageError, StructureKind,
};
use tempfile::TempDir;
use uuid::Uuid;

const WORLD: &str = "world";

/// Helper to create a LockService with a temporary storage directory
fn create_service() -> (LockService, Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        storage_dir: temp_dir.path().to_path_buf(),
        protectables: vec![
            "CHEST".to_string(),
            "WOODEN_DOOR".to_string(),
            "FURNACE".to_string(),
            "STICK".to_string(),
        ],
        ..Config::default()
    };
    let service = LockService::initialize(&config, &StaticCatalog::with_defaults()).unwrap();
    (service, config, temp_dir)
}

fn player(name: &str) -> PlayerIdentity {
    PlayerIdentity::new(Uuid::new_v4(), name)
}

/// The two halves of a double chest along the x axis
fn double_chest(x: i32, y: i32, z: i32) -> (BlockSnapshot, BlockSnapshot) {
    let anchor = BlockPos::new(x, y, z);
    let kind = StructureKind::Container {
        anchor: Some(anchor),
    };
    let left = BlockSnapshot::new(WORLD, anchor, "CHEST").with_structure(kind);
    let right = BlockSnapshot::new(WORLD, anchor.relative(BlockFace::East), "CHEST")
        .with_structure(kind);
    (left, right)
}

/// The lower and upper cells of a door standing on grass
fn door(x: i32, y: i32, z: i32) -> (BlockSnapshot, BlockSnapshot) {
    let lower_pos = BlockPos::new(x, y, z);
    let lower = BlockSnapshot::new(WORLD, lower_pos, "WOODEN_DOOR")
        .with_structure(StructureKind::Door)
        .with_neighbor(BlockFace::Down, "GRASS")
        .with_neighbor(BlockFace::Up, "WOODEN_DOOR");
    let upper = BlockSnapshot::new(WORLD, lower_pos.relative(BlockFace::Up), "WOODEN_DOOR")
        .with_structure(StructureKind::Door)
        .with_neighbor(BlockFace::Down, "WOODEN_DOOR")
        .with_neighbor(BlockFace::Up, "AIR");
    (lower, upper)
}

#[test]
fn test_item_materials_are_not_protectable() {
    let (service, _config, _temp) = create_service();

    let names: Vec<&str> = service.protectables().iter().collect();
    assert_eq!(names, vec!["CHEST", "FURNACE", "WOODEN_DOOR"]);
}

#[test]
fn test_lock_unlock_round_trip() {
    let (service, _config, _temp) = create_service();
    let alice = player("Alice");
    service.upsert_player(&alice).unwrap();
    let furnace = BlockSnapshot::new(WORLD, BlockPos::new(0, 70, 0), "FURNACE");

    service.lock_block(&furnace, &alice).unwrap();
    let protection = service.get_protection(&furnace).unwrap();
    assert!(protection.locked);
    assert_eq!(protection.owner, Some(alice.id));
    assert_eq!(protection.owner_name.as_deref(), Some("Alice"));

    service.unlock_block(&furnace).unwrap();
    assert!(!service.get_protection(&furnace).unwrap().locked);
}

#[test]
fn test_unlock_twice_is_harmless() {
    let (service, _config, _temp) = create_service();
    let furnace = BlockSnapshot::new(WORLD, BlockPos::new(1, 70, 1), "FURNACE");
    service.lock_block(&furnace, &player("Alice")).unwrap();

    assert!(service.unlock_block(&furnace).unwrap());
    assert!(!service.unlock_block(&furnace).unwrap());
    assert!(!service.get_protection(&furnace).unwrap().locked);
    assert_eq!(service.stats().unwrap().protection_count, 0);
}

#[test]
fn test_double_chest_halves_share_protection() {
    let (service, _config, _temp) = create_service();
    let alice = player("Alice");
    let bob = player("Bob");
    service.upsert_player(&alice).unwrap();
    service.upsert_player(&bob).unwrap();

    let (left, right) = double_chest(10, 64, 10);
    service.lock_block(&left, &alice).unwrap();
    let via_right = service.get_protection(&right).unwrap();
    assert!(via_right.locked);
    assert_eq!(via_right.owner, Some(alice.id));

    let (left, right) = double_chest(20, 64, 20);
    service.lock_block(&right, &bob).unwrap();
    assert_eq!(service.get_protection(&left).unwrap().owner, Some(bob.id));
    assert_eq!(service.get_owner(&left).unwrap(), Some(bob.id));

    // One row per structure
    assert_eq!(service.stats().unwrap().protection_count, 2);
}

#[test]
fn test_door_halves_share_protection() {
    let (service, _config, _temp) = create_service();
    let alice = player("Alice");

    let (lower, upper) = door(5, 64, 5);
    service.lock_block(&upper, &alice).unwrap();
    assert_eq!(
        service.get_protection(&lower).unwrap(),
        service.get_protection(&upper).unwrap()
    );
    assert!(service.get_protection(&lower).unwrap().locked);

    let (lower, upper) = door(8, 64, 8);
    service.lock_block(&lower, &alice).unwrap();
    assert_eq!(service.get_owner(&upper).unwrap(), Some(alice.id));

    // Unlocking through either half removes the lock
    service.unlock_block(&upper).unwrap();
    assert!(!service.get_protection(&lower).unwrap().locked);
}

#[test]
fn test_relock_replaces_owner() {
    let (service, _config, _temp) = create_service();
    let alice = player("Alice");
    let bob = player("Bob");
    let furnace = BlockSnapshot::new(WORLD, BlockPos::new(2, 70, 2), "FURNACE");

    service.lock_block(&furnace, &alice).unwrap();
    service.lock_block(&furnace, &bob).unwrap();

    assert_eq!(service.get_owner(&furnace).unwrap(), Some(bob.id));
    assert_eq!(service.count_locks(&alice.id).unwrap(), 0);
}

#[test]
fn test_unconfigured_material_is_never_locked() {
    let (service, _config, _temp) = create_service();
    let alice = player("Alice");
    let pos = BlockPos::new(3, 70, 3);

    // A row exists at the coordinates, but for a configured material
    service
        .lock_block(&BlockSnapshot::new(WORLD, pos, "CHEST"), &alice)
        .unwrap();

    let jukebox = BlockSnapshot::new(WORLD, pos, "JUKEBOX");
    let protection = service.get_protection(&jukebox).unwrap();
    assert!(!protection.locked);
    assert_eq!(protection.material, None);
    assert_eq!(protection.owner, None);
}

#[test]
fn test_notify_survives_rejoin_and_restart() {
    let (service, config, _temp) = create_service();
    let alice = player("Alice");

    service.upsert_player(&alice).unwrap();
    assert!(service.set_notify(&alice.id, true).unwrap());

    // Rejoin under a new name
    service
        .upsert_player(&PlayerIdentity::new(alice.id, "Alice2"))
        .unwrap();
    assert_eq!(service.get_notify(&alice.id).unwrap(), Some(true));

    service.shutdown().unwrap();

    let reopened = LockService::initialize(&config, &StaticCatalog::with_defaults()).unwrap();
    reopened.upsert_player(&alice).unwrap();
    assert_eq!(reopened.get_notify(&alice.id).unwrap(), Some(true));
    assert_eq!(reopened.display_name(&alice.id).unwrap().as_deref(), Some("Alice"));
}

#[test]
fn test_protections_survive_restart() {
    let (service, config, _temp) = create_service();
    let alice = player("Alice");
    let (left, right) = double_chest(30, 64, 30);
    service.lock_block(&left, &alice).unwrap();
    service.shutdown().unwrap();

    let reopened = LockService::initialize(&config, &StaticCatalog::with_defaults()).unwrap();
    assert_eq!(reopened.get_owner(&right).unwrap(), Some(alice.id));
}

#[test]
fn test_group_requires_known_player() {
    let (service, _config, _temp) = create_service();
    let owner = player("Owner");

    let err = service.add_member(&owner.id, "friends", "Alice").unwrap_err();
    assert!(matches!(err, StorageError::UnknownPlayer(_)));
    assert_eq!(err.to_string(), "Player Alice is not known");
    assert_eq!(service.stats().unwrap().membership_count, 0);

    service.upsert_player(&player("Alice")).unwrap();
    service.add_member(&owner.id, "friends", "Alice").unwrap();
    assert_eq!(
        service.list_members(&owner.id, "friends").unwrap(),
        vec!["Alice".to_string()]
    );
}

#[test]
fn test_rename_preserves_membership() {
    let (service, _config, _temp) = create_service();
    let owner = player("Owner");
    let alice = player("Alice");
    for p in [&alice, &player("Bob"), &player("carol")] {
        service.upsert_player(p).unwrap();
    }
    for name in ["carol", "Alice", "Bob"] {
        service.add_member(&owner.id, "friends", name).unwrap();
    }
    service.add_member(&owner.id, "builders", "Bob").unwrap();

    let before = service.list_members(&owner.id, "friends").unwrap();
    assert_eq!(before, vec!["Alice", "Bob", "carol"]);

    service.rename_group(&owner.id, "friends", "pals").unwrap();

    assert_eq!(service.list_members(&owner.id, "pals").unwrap(), before);
    assert!(service.list_members(&owner.id, "friends").unwrap().is_empty());
    assert_eq!(
        service.list_group_names(&owner.id).unwrap(),
        vec!["builders", "pals"]
    );
    assert!(service.is_member(&owner.id, "PALS", &alice.id).unwrap());
}

#[test]
fn test_rename_of_missing_group_is_reported() {
    let (service, _config, _temp) = create_service();

    let err = service
        .rename_group(&Uuid::new_v4(), "nobody", "somebody")
        .unwrap_err();
    assert!(err.is_domain());
    assert!(matches!(err, StorageError::GroupNotFound(_)));
}

#[test]
fn test_member_rename_shows_in_listing() {
    let (service, _config, _temp) = create_service();
    let owner = player("Owner");
    let alice = player("Alice");
    service.upsert_player(&alice).unwrap();
    service.add_member(&owner.id, "friends", "Alice").unwrap();

    service
        .upsert_player(&PlayerIdentity::new(alice.id, "Alicia"))
        .unwrap();

    assert_eq!(
        service.list_members(&owner.id, "friends").unwrap(),
        vec!["Alicia"]
    );
    // Old name no longer resolves
    assert!(service.remove_member(&owner.id, "friends", "Alice").is_err());
    assert!(service.remove_member(&owner.id, "friends", "alicia").unwrap());
}
