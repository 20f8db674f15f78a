mod common;

use common::{full_shipping, init_tracing};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use xcart::address_actor;
use xcart::clients::AddressClient;
use xcart::model::{Address, UserId};
use xcart::store::{load_json, MemorySnapshotStore, SnapshotKey, SnapshotStore};

async fn open_book() -> (AddressClient, Arc<MemorySnapshotStore>, UserId) {
    init_tracing();
    let store = Arc::new(MemorySnapshotStore::new());
    let (actor, client) = address_actor::new(16);
    tokio::spawn(actor.run(store.clone() as Arc<dyn SnapshotStore>));
    let owner = UserId::from("user_1");
    client.open(owner.clone()).await.unwrap();
    (client, store, owner)
}

fn address(label: &str) -> Address {
    Address::new(label, full_shipping())
}

#[tokio::test]
async fn test_first_address_becomes_default() {
    let (book, _store, owner) = open_book().await;

    let home = book.upsert(owner.clone(), address("Home")).await.unwrap();
    assert!(home.is_default);
    assert!(!home.id.is_empty());

    let work = book.upsert(owner.clone(), address("Work")).await.unwrap();
    assert!(!work.is_default);
    assert_eq!(book.default_address(owner).await.unwrap().unwrap().id, home.id);
}

#[tokio::test]
async fn test_saving_a_default_demotes_the_others() {
    let (book, _store, owner) = open_book().await;
    book.upsert(owner.clone(), address("Home")).await.unwrap();
    let work = book
        .upsert(owner.clone(), address("Work").as_default())
        .await
        .unwrap();

    let all = book.list(owner.clone()).await.unwrap();
    assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
    assert_eq!(book.default_address(owner).await.unwrap().unwrap().id, work.id);
}

#[tokio::test]
async fn test_edit_replaces_in_place() {
    let (book, _store, owner) = open_book().await;
    let home = book.upsert(owner.clone(), address("Home")).await.unwrap();
    book.upsert(owner.clone(), address("Work")).await.unwrap();

    let mut edited = home.clone();
    edited.shipping.city = "Mysuru".to_string();
    book.upsert(owner.clone(), edited).await.unwrap();

    let all = book.list(owner).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, home.id);
    assert_eq!(all[0].shipping.city, "Mysuru");
    assert!(all[0].is_default);
}

#[tokio::test]
async fn test_removing_default_promotes_first_remaining() {
    let (book, _store, owner) = open_book().await;
    let home = book.upsert(owner.clone(), address("Home")).await.unwrap();
    let work = book.upsert(owner.clone(), address("Work")).await.unwrap();
    let gym = book.upsert(owner.clone(), address("Gym")).await.unwrap();

    book.remove(owner.clone(), home.id).await.unwrap();
    let all = book.list(owner.clone()).await.unwrap();
    assert!(all.iter().find(|a| a.id == work.id).unwrap().is_default);
    assert!(!all.iter().find(|a| a.id == gym.id).unwrap().is_default);

    book.remove(owner.clone(), work.id).await.unwrap();
    book.remove(owner.clone(), gym.id).await.unwrap();
    let all = book.list(owner.clone()).await.unwrap();
    assert!(all.is_empty());
    assert_eq!(book.default_address(owner).await.unwrap(), None);
}

#[tokio::test]
async fn test_set_default_unknown_id_changes_nothing() {
    let (book, _store, owner) = open_book().await;
    book.upsert(owner.clone(), address("Home")).await.unwrap();
    let before = book.book(owner.clone()).await.unwrap();

    assert!(!book.set_default(owner.clone(), "nope".to_string()).await.unwrap());
    assert_eq!(book.book(owner.clone()).await.unwrap(), before);
    assert_eq!(book.remove(owner.clone(), "nope".to_string()).await.unwrap(), None);
    assert_eq!(book.book(owner).await.unwrap(), before);
}

#[tokio::test]
async fn test_exactly_one_default_after_any_sequence() {
    let (book, _store, owner) = open_book().await;
    let mut rng = StdRng::seed_from_u64(7);

    for step in 0..200 {
        let ids: Vec<String> = book
            .list(owner.clone())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();

        match rng.random_range(0..4) {
            0 | 1 => {
                let mut next = address(&format!("A{step}"));
                next.is_default = rng.random_bool(0.3);
                book.upsert(owner.clone(), next).await.unwrap();
            }
            2 if !ids.is_empty() => {
                let id = ids[rng.random_range(0..ids.len())].clone();
                book.remove(owner.clone(), id).await.unwrap();
            }
            3 if !ids.is_empty() => {
                let id = ids[rng.random_range(0..ids.len())].clone();
                book.set_default(owner.clone(), id).await.unwrap();
            }
            _ => {
                // Un-default an existing address by editing it
                if let Some(id) = ids.first() {
                    let snapshot = book.book(owner.clone()).await.unwrap();
                    let mut current = snapshot.get(id).cloned().unwrap();
                    current.is_default = false;
                    book.upsert(owner.clone(), current).await.unwrap();
                }
            }
        }

        let snapshot = book.book(owner.clone()).await.unwrap();
        let expected = usize::from(!snapshot.addresses.is_empty());
        assert_eq!(snapshot.default_count(), expected, "after step {step}");
    }
}

#[tokio::test]
async fn test_book_is_persisted_and_reloaded() {
    let (book, store, owner) = open_book().await;
    let home = book.upsert(owner.clone(), address("")).await.unwrap();
    assert_eq!(home.label, "Address 1");

    let key = SnapshotKey::Addresses.for_user(&owner);
    let stored: Vec<Address> = load_json(store.as_ref(), &key).await.unwrap().unwrap();
    assert_eq!(stored, vec![home.clone()]);

    // Someone else rewrites the snapshot; reload picks it up
    store.delete(&key).await.unwrap();
    let reloaded = book.reload(owner.clone()).await.unwrap();
    assert!(reloaded.addresses.is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_set_aside_and_opens_empty() {
    init_tracing();
    let store = Arc::new(MemorySnapshotStore::new());
    let owner = UserId::from("user_1");
    store
        .set(&SnapshotKey::Addresses.for_user(&owner), "[{oops".to_string())
        .await
        .unwrap();

    let (actor, book) = address_actor::new(16);
    tokio::spawn(actor.run(store.clone() as Arc<dyn SnapshotStore>));
    book.open(owner.clone()).await.unwrap();
    assert!(book.list(owner.clone()).await.unwrap().is_empty());

    // The next save replaces the snapshot, the backup keeps what was there
    book.upsert(owner.clone(), address("Home")).await.unwrap();
    let backup = store.get("user_1/userAddresses.corrupt").await.unwrap();
    assert_eq!(backup.as_deref(), Some("[{oops"));
    let saved: Vec<Address> = load_json(store.as_ref(), &SnapshotKey::Addresses.for_user(&owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_books_are_scoped_per_user() {
    let (book, _store, owner) = open_book().await;
    let other = UserId::from("user_2");
    book.open(other.clone()).await.unwrap();

    book.upsert(owner.clone(), address("Home")).await.unwrap();
    assert_eq!(book.list(owner).await.unwrap().len(), 1);
    assert!(book.list(other).await.unwrap().is_empty());
}
