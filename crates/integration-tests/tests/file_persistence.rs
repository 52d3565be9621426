//! Integration tests for carts persisted to a storage file.

#![allow(clippy::unwrap_used)]

use std::fs;

use techfix_core::Price;
use techfix_integration_tests::{Harness, dec, product};
use techfix_storefront::clock::ManualClock;
use techfix_storefront::config::StorefrontConfig;
use techfix_storefront::state::AppState;
use techfix_storefront::storage::{FileStorage, MemoryStorage, Storage, keys};
use tempfile::tempdir;

#[test]
fn test_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut h = Harness::with_storage(FileStorage::new(&path));
    h.store
        .add_to_cart(
            product("screen", "Screen Repair", 4900)
                .with_category("repairs")
                .with_image("/img/screen.png"),
        )
        .unwrap();
    h.store.add_to_cart(product("cable", "Cable", 499).with_quantity(3)).unwrap();
    h.store.update_quantity(&"screen".into(), 2).unwrap();

    let reloaded = Harness::with_storage(FileStorage::new(&path));

    assert_eq!(reloaded.store.cart(), h.store.cart());
    assert_eq!(reloaded.store.subtotal(), dec("112.97"));
    // The page-ready hook shows the restored count
    assert_eq!(reloaded.badge().text, "5");
}

#[test]
fn test_reload_keeps_exact_prices() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut h = Harness::with_storage(FileStorage::new(&path));
    for (id, cents) in [("nickel", 5), ("dime", 10), ("odd", 1_234_567_891), ("big", 90_071_992_547_409)] {
        h.store.add_to_cart(product(id, "Item", cents).with_quantity(7)).unwrap();
    }
    h.store
        .add_to_cart(product("max", "Item", 999_999_999_999_999).with_quantity(u32::MAX))
        .unwrap();

    let reloaded = Harness::with_storage(FileStorage::new(&path));

    assert_eq!(reloaded.store.cart(), h.store.cart());
    assert_eq!(reloaded.store.subtotal(), h.store.subtotal());
    let max = reloaded.store.get(&"max".into()).unwrap();
    assert_eq!(max.price, Price::MAX);
}

#[test]
fn test_sub_cent_price_in_file_loads_empty() {
    let storage = MemoryStorage::new();
    storage
        .set(keys::CART, r#"[{"id": "a", "title": "A", "price": 0.123456789, "quantity": 1}]"#)
        .unwrap();

    let h = Harness::with_storage(storage);
    assert!(h.store.is_empty());
}

#[test]
fn test_storage_file_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut h = Harness::with_storage(FileStorage::new(&path));
    h.store.add_to_cart(product("a", "Widget", 999)).unwrap();

    let file: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let cart: serde_json::Value =
        serde_json::from_str(file.get(keys::CART).unwrap().as_str().unwrap()).unwrap();
    assert_eq!(
        cart,
        serde_json::json!([{"id": "a", "title": "Widget", "price": 9.99, "quantity": 1}])
    );
}

#[test]
fn test_corrupt_file_loads_empty_cart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "{ not json").unwrap();

    let mut h = Harness::with_storage(FileStorage::new(&path));
    assert!(h.store.is_empty());

    // The next write replaces the corrupt file and keeps a copy of it
    h.store.add_to_cart(product("a", "Widget", 999)).unwrap();
    assert_eq!(h.reload().len(), 1);
    assert_eq!(
        fs::read_to_string(h.storage().corrupt_path()).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_malformed_cart_entry_loads_empty() {
    for raw in [
        r#"{"id": "a"}"#,
        r#"[{"id": "a", "title": "A", "price": -1, "quantity": 1}]"#,
        r#"[{"id": "a", "title": "A", "price": 1, "quantity": 0}]"#,
        r#"[{"title": "A", "price": 1, "quantity": 1}]"#,
    ] {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, raw).unwrap();
        let h = Harness::with_storage(storage);
        assert!(h.store.is_empty(), "{raw}");
        assert_eq!(h.badge().text, "0");
    }
}

#[test]
fn test_other_keys_survive_cart_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let storage = FileStorage::new(&path);
    storage.set("theme", "dark").unwrap();

    let mut h = Harness::with_storage(storage);
    h.store.add_to_cart(product("a", "Widget", 999)).unwrap();
    h.store.clear().unwrap();

    assert_eq!(h.storage().get("theme").unwrap().as_deref(), Some("dark"));
    assert_eq!(h.stored_json().as_deref(), Some("[]"));
}

#[test]
fn test_app_state_opens_configured_file() {
    let dir = tempdir().unwrap();
    let config = StorefrontConfig {
        storage_path: dir.path().join("nested").join("cart.json"),
        cart_key: "cart_v2".to_string(),
        ..StorefrontConfig::default()
    };

    let mut state = AppState::open(config.clone(), ManualClock::default().shared());
    state
        .store_mut()
        .add_to_cart(product("a", "Widget", 999))
        .unwrap();

    let reopened = AppState::open(config, ManualClock::default().shared());
    assert_eq!(reopened.store().total_items(), 1);
    assert!(
        FileStorage::new(dir.path().join("nested").join("cart.json"))
            .get(keys::CART)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_last_writer_wins_across_tabs() {
    let storage = std::rc::Rc::new(MemoryStorage::new());
    let mut first = Harness::with_storage(std::rc::Rc::clone(&storage));
    let mut second = Harness::with_storage(std::rc::Rc::clone(&storage));

    first.store.add_to_cart(product("a", "A", 100)).unwrap();
    second.store.add_to_cart(product("b", "B", 100)).unwrap();

    // The second tab never saw "a" and overwrote it
    let reloaded = first.reload();
    assert!(reloaded.get(&"a".into()).is_none());
    assert!(reloaded.get(&"b".into()).is_some());
}
