use order_store::{DocumentActor, StoreDocument, StoreError};

// --- Test Document ---

#[derive(Clone, Debug, PartialEq)]
struct Parcel {
    status: String,
    scans: u32,
}

#[derive(Debug)]
enum ParcelPatch {
    Scan,
    SetStatus(String),
}

#[derive(Debug, thiserror::Error)]
#[error("parcel already delivered")]
struct AlreadyDelivered;

impl StoreDocument for Parcel {
    type Id = String;
    type Patch = ParcelPatch;
    type Error = AlreadyDelivered;

    fn apply(&mut self, patch: ParcelPatch) -> Result<(), AlreadyDelivered> {
        if self.status == "delivered" {
            return Err(AlreadyDelivered);
        }
        match patch {
            ParcelPatch::Scan => self.scans += 1,
            ParcelPatch::SetStatus(status) => self.status = status,
        }
        Ok(())
    }
}

fn parcel(status: &str) -> Parcel {
    Parcel {
        status: status.to_string(),
        scans: 0,
    }
}

#[tokio::test]
async fn test_get_put_patch_delete() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    let handle = tokio::spawn(actor.run());

    assert_eq!(client.get("p1".into()).await.unwrap(), None);

    client.put("p1".into(), parcel("received")).await.unwrap();
    let patched = client.patch("p1".into(), ParcelPatch::Scan).await.unwrap();
    assert_eq!(patched.scans, 1);

    let stored = client.get("p1".into()).await.unwrap().unwrap();
    assert_eq!(stored, patched);

    client.delete("p1".into()).await.unwrap();
    assert_eq!(client.get("p1".into()).await.unwrap(), None);
    assert!(matches!(
        client.delete("p1".into()).await,
        Err(StoreError::NotFound(_))
    ));

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_patch_on_missing_document_is_not_found() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    tokio::spawn(actor.run());

    let result = client.patch("ghost".into(), ParcelPatch::Scan).await;
    assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "ghost"));
}

#[tokio::test]
async fn test_rejected_patch_keeps_previous_version_and_notifies_nobody() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    tokio::spawn(actor.run());

    client.put("p1".into(), parcel("delivered")).await.unwrap();
    let mut sub = client.subscribe("p1".into()).await.unwrap();
    assert_eq!(sub.next().await, Some(Some(parcel("delivered"))));

    let result = client
        .patch("p1".into(), ParcelPatch::SetStatus("received".into()))
        .await;
    assert!(matches!(result, Err(StoreError::Rejected(_))));
    assert_eq!(client.get("p1".into()).await.unwrap(), Some(parcel("delivered")));

    // The next notification is the delete, not the rejected patch.
    client.delete("p1".into()).await.unwrap();
    assert_eq!(sub.next().await, Some(None));
}

#[tokio::test]
async fn test_subscription_receives_initial_state_then_every_mutation_in_order() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    tokio::spawn(actor.run());

    let mut sub = client.subscribe("p1".into()).await.unwrap();
    assert_eq!(sub.next().await, Some(None), "missing document reported first");

    client.put("p1".into(), parcel("received")).await.unwrap();
    client.patch("p1".into(), ParcelPatch::Scan).await.unwrap();
    client
        .patch("p1".into(), ParcelPatch::SetStatus("delivered".into()))
        .await
        .unwrap();

    let seen: Vec<_> = [
        sub.next().await.unwrap().unwrap(),
        sub.next().await.unwrap().unwrap(),
        sub.next().await.unwrap().unwrap(),
    ]
    .into_iter()
    .map(|p| (p.status, p.scans))
    .collect();

    assert_eq!(
        seen,
        vec![
            ("received".to_string(), 0),
            ("received".to_string(), 1),
            ("delivered".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_subscriptions_are_scoped_to_one_document() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    tokio::spawn(actor.run());

    let mut first = client.subscribe("p1".into()).await.unwrap();
    let mut second = client.subscribe("p2".into()).await.unwrap();
    first.next().await;
    second.next().await;

    client.put("p2".into(), parcel("received")).await.unwrap();
    assert_eq!(second.next().await, Some(Some(parcel("received"))));

    client.put("p1".into(), parcel("confirmed")).await.unwrap();
    assert_eq!(first.next().await, Some(Some(parcel("confirmed"))));
}

#[tokio::test]
async fn test_feed_closes_when_store_shuts_down() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    let handle = tokio::spawn(actor.run());

    let mut sub = client.subscribe("p1".into()).await.unwrap();
    assert_eq!(sub.next().await, Some(None));
    assert_eq!(sub.document_id(), "p1");

    // A live subscription does not keep the collection running.
    drop(client);
    handle.await.unwrap();
    assert_eq!(sub.next().await, None);
}

#[tokio::test]
async fn test_dropped_subscription_stops_receiving() {
    let (actor, client) = DocumentActor::<Parcel>::new(8);
    tokio::spawn(actor.run());

    let sub = client.subscribe("p1".into()).await.unwrap();
    drop(sub);

    let mut other = client.subscribe("p1".into()).await.unwrap();
    other.next().await;
    client.put("p1".into(), parcel("received")).await.unwrap();
    assert_eq!(other.next().await, Some(Some(parcel("received"))));
}
