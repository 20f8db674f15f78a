use actor_framework::{ActorEntity, Change, FrameworkError, ResourceActor};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Tally {
    owner: String,
    label: String,
    count: u32,
}

#[derive(Debug)]
struct TallyCreate {
    label: String,
}

#[derive(Debug)]
struct TallyUpdate {
    label: Option<String>,
}

#[derive(Debug)]
enum TallyAction {
    Bump,
    BumpBy(u32),
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum TallyError {
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("bump of zero")]
    ZeroBump,
}

/// Counts hook invocations so the test can see the lifecycle ran.
#[derive(Default)]
struct Hooks {
    created: AtomicUsize,
    deleted: AtomicUsize,
}

#[async_trait]
impl ActorEntity for Tally {
    type Id = String;
    type Create = TallyCreate;
    type Update = TallyUpdate;
    type Action = TallyAction;
    type ActionResult = u32;
    type Context = Arc<Hooks>;
    type Error = TallyError;

    fn from_create_params(owner: String, params: TallyCreate) -> Result<Self, Self::Error> {
        if params.label.is_empty() {
            return Err(TallyError::EmptyLabel);
        }
        Ok(Self {
            owner,
            label: params.label,
            count: 0,
        })
    }

    async fn on_create(&mut self, ctx: &Arc<Hooks>) -> Result<(), Self::Error> {
        ctx.created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: TallyUpdate,
        _ctx: &Arc<Hooks>,
    ) -> Result<(), Self::Error> {
        if let Some(label) = update.label {
            self.label = label;
        }
        Ok(())
    }

    async fn on_delete(&self, ctx: &Arc<Hooks>) -> Result<(), Self::Error> {
        ctx.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: TallyAction,
        _ctx: &Arc<Hooks>,
    ) -> Result<u32, Self::Error> {
        match action {
            TallyAction::Bump => self.count += 1,
            TallyAction::BumpBy(0) => return Err(TallyError::ZeroBump),
            TallyAction::BumpBy(n) => self.count += n,
        }
        Ok(self.count)
    }
}

fn spawn_tally() -> (actor_framework::ResourceClient<Tally>, Arc<Hooks>) {
    let hooks = Arc::new(Hooks::default());
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(hooks.clone()));
    (client, hooks)
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (client, hooks) = spawn_tally();

    // 1. Create under a caller-chosen id
    let id = client
        .create("user_1".into(), TallyCreate { label: "visits".into() })
        .await
        .unwrap();
    assert_eq!(id, "user_1");
    assert_eq!(hooks.created.load(Ordering::SeqCst), 1);

    // 2. Actions
    assert_eq!(client.perform_action(id.clone(), TallyAction::Bump).await.unwrap(), 1);
    assert_eq!(client.perform_action(id.clone(), TallyAction::BumpBy(4)).await.unwrap(), 5);

    // 3. Update
    let updated = client
        .update(id.clone(), TallyUpdate { label: Some("clicks".into()) })
        .await
        .unwrap();
    assert_eq!(updated.label, "clicks");
    assert_eq!(updated.count, 5);

    // 4. Delete
    client.delete(id.clone()).await.unwrap();
    assert_eq!(hooks.deleted.load(Ordering::SeqCst), 1);
    assert!(client.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let (client, _) = spawn_tally();
    client
        .create("user_1".into(), TallyCreate { label: "a".into() })
        .await
        .unwrap();

    let again = client
        .create("user_1".into(), TallyCreate { label: "b".into() })
        .await;
    assert!(matches!(again, Err(FrameworkError::AlreadyExists(id)) if id == "user_1"));

    // The original entity is untouched
    let tally = client.get("user_1".into()).await.unwrap().unwrap();
    assert_eq!(tally.label, "a");
}

#[tokio::test]
async fn test_entity_errors_round_trip_and_missing_ids() {
    let (client, _) = spawn_tally();

    let err = client
        .create("user_1".into(), TallyCreate { label: String::new() })
        .await
        .unwrap_err();
    assert_eq!(err.into_entity_error::<TallyError>().unwrap(), TallyError::EmptyLabel);

    let missing = client.perform_action("ghost".into(), TallyAction::Bump).await;
    assert!(matches!(missing, Err(FrameworkError::NotFound(id)) if id == "ghost"));

    let missing = client.delete("ghost".into()).await;
    assert!(matches!(missing, Err(FrameworkError::NotFound(_))));
}

#[tokio::test]
async fn test_requests_are_applied_in_order() {
    let (client, _) = spawn_tally();
    client
        .create("user_1".into(), TallyCreate { label: "hits".into() })
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.perform_action("user_1".into(), TallyAction::Bump).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let tally = client.get("user_1".into()).await.unwrap().unwrap();
    assert_eq!(tally.count, 50);
}

#[tokio::test]
async fn test_subscription_follows_one_entity() {
    let (client, _) = spawn_tally();
    client
        .create("user_1".into(), TallyCreate { label: "mine".into() })
        .await
        .unwrap();
    client
        .create("user_2".into(), TallyCreate { label: "theirs".into() })
        .await
        .unwrap();

    let mut sub = client.subscribe("user_1".into()).await.unwrap();

    client.perform_action("user_2".into(), TallyAction::Bump).await.unwrap();
    client.perform_action("user_1".into(), TallyAction::BumpBy(3)).await.unwrap();
    // Failed actions publish nothing
    let _ = client.perform_action("user_1".into(), TallyAction::BumpBy(0)).await;
    client.delete("user_1".into()).await.unwrap();

    match sub.recv().await {
        Some(Change::Upserted { item, .. }) => assert_eq!(item.count, 0),
        other => panic!("expected initial snapshot, got {other:?}"),
    }
    match sub.recv().await {
        Some(Change::Upserted { id, item }) => {
            assert_eq!(id, "user_1");
            assert_eq!(item.count, 3);
        }
        other => panic!("expected bump, got {other:?}"),
    }
    assert!(matches!(sub.recv().await, Some(Change::Removed { id }) if id == "user_1"));
}

#[tokio::test]
async fn test_subscription_on_missing_entity_waits_for_create() {
    let (client, _) = spawn_tally();
    let mut sub = client.subscribe("user_9".into()).await.unwrap();

    client
        .create("user_9".into(), TallyCreate { label: "late".into() })
        .await
        .unwrap();

    match sub.recv().await {
        Some(Change::Upserted { item, .. }) => assert_eq!(item.label, "late"),
        other => panic!("expected create, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unsubscribe_and_shutdown_end_the_feed() {
    let (client, _) = spawn_tally();
    client
        .create("user_1".into(), TallyCreate { label: "x".into() })
        .await
        .unwrap();

    let mut first = client.subscribe("user_1".into()).await.unwrap();
    first.unsubscribe();
    assert!(!first.is_active());
    assert!(first.recv().await.is_none());

    let mut second = client.subscribe("user_1".into()).await.unwrap();
    assert!(second.recv().await.is_some());

    // Last client gone: the actor stops and the feed closes
    drop(client);
    assert!(second.recv().await.is_none());
}

#[tokio::test]
async fn test_lagging_subscriber_skips_to_latest() {
    let (client, _) = spawn_tally();
    client
        .create("user_1".into(), TallyCreate { label: "busy".into() })
        .await
        .unwrap();

    let mut sub = client.subscribe("user_1".into()).await.unwrap();
    assert!(sub.recv().await.is_some());

    // Far more changes than the feed retains
    for _ in 0..100 {
        client.perform_action("user_1".into(), TallyAction::Bump).await.unwrap();
    }

    match sub.recv().await {
        Some(Change::Upserted { item, .. }) => assert_eq!(item.count, 100),
        other => panic!("expected latest state, got {other:?}"),
    }
}
