use std::time::Duration;

use anyhow::Result;
use hub::contacts::{self, NewContact};
use hub::organisations::{NewOrganisation, OrganisationPatch, Organisations};
use hub::relationships::{LinkDetails, NewRelationship, RelationshipPatch};
use hub::{CollectionStore, ListQuery, RelationshipStore, SearchDebouncer};
use hub_tests::TestContext;

#[tokio::test]
async fn collection_store_tracks_crud() -> Result<()> {
    let ctx = TestContext::new().await?;
    let store = CollectionStore::<Organisations>::new(ctx.shared());
    let mut updates = store.subscribe();

    let acme = store.create(NewOrganisation::named("Acme")).await?;
    store.create(NewOrganisation::named("Bolt")).await?;
    assert!(updates.has_changed()?);
    assert_eq!(store.snapshot().items.len(), 2);

    store.fetch(acme.id).await?;
    assert_eq!(store.snapshot().selected.map(|o| o.id), Some(acme.id));

    store
        .update(
            acme.id,
            OrganisationPatch {
                organisation_name: Some("Acme Holdings".into()),
                ..OrganisationPatch::default()
            },
        )
        .await?;
    let state = store.snapshot();
    assert_eq!(
        state.selected.as_ref().map(|o| o.organisation_name.as_str()),
        Some("Acme Holdings")
    );
    assert!(state.items.iter().any(|o| o.organisation_name == "Acme Holdings"));

    assert!(store.delete(acme.id).await?);
    let state = store.snapshot();
    assert!(state.selected.is_none());
    assert_eq!(state.items.len(), 1);
    assert!(!state.loading);

    let hits = store.search("bolt").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(store.fetch_all(&ListQuery::new()).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn collection_store_records_failures() -> Result<()> {
    let ctx = TestContext::new().await?;
    let store = CollectionStore::<Organisations>::new(ctx.shared());

    let err = store
        .update(uuid::Uuid::new_v4(), OrganisationPatch::default())
        .await
        .unwrap_err();
    assert!(err.not_found);
    let state = store.snapshot();
    assert_eq!(state.error.as_ref(), Some(&err));
    assert!(!state.loading);

    store.clear_error();
    assert!(store.snapshot().error.is_none());

    let invalid = store.create(NewOrganisation::named("  ")).await;
    assert!(invalid.is_err());
    assert!(store.snapshot().items.is_empty());
    Ok(())
}

#[tokio::test]
async fn relationship_store_reloads_open_panels() -> Result<()> {
    let ctx = TestContext::new().await?;
    let orgs = CollectionStore::<Organisations>::new(ctx.shared());
    let acme = orgs.create(NewOrganisation::named("Acme")).await?;
    let bolt = orgs.create(NewOrganisation::named("Bolt")).await?;
    let jane = contacts::create(
        ctx.db(),
        NewContact {
            first_name: "Jane".into(),
            ..NewContact::default()
        },
    )
    .await?;

    let store = RelationshipStore::new(ctx.shared());
    store.load_for_contact(jane.id).await?;
    store.load_for_organisation(acme.id).await?;

    let first = store
        .add(NewRelationship {
            organisation_id: acme.id,
            contact_id: jane.id,
            role: "owner".into(),
            is_primary: true,
            priority: None,
        })
        .await?;
    let state = store.snapshot();
    assert_eq!(state.contacts.len(), 1);
    assert_eq!(state.organisations.len(), 1);

    store
        .create_organisation(
            jane.id,
            NewOrganisation::named("Doe Plumbing"),
            LinkDetails {
                role: "owner".into(),
                is_primary: true,
                priority: None,
            },
        )
        .await?;
    let state = store.snapshot();
    assert_eq!(state.organisations.len(), 2);
    assert!(state.organisations[0].is_primary);
    assert_eq!(state.organisations[0].organisation_name, "Doe Plumbing");
    assert!(!state.contacts[0].is_primary, "acme link was demoted");

    store
        .update(
            first.id,
            RelationshipPatch {
                role: Some("director".into()),
                ..RelationshipPatch::default()
            },
        )
        .await?;
    assert_eq!(store.snapshot().contacts[0].role, "director");

    assert!(store.remove(first.id).await?);
    let state = store.snapshot();
    assert!(state.contacts.is_empty());
    assert_eq!(state.organisations.len(), 1);

    let missing = store
        .add(NewRelationship {
            organisation_id: bolt.id,
            contact_id: uuid::Uuid::new_v4(),
            role: "owner".into(),
            is_primary: false,
            priority: None,
        })
        .await
        .unwrap_err();
    assert!(missing.not_found);
    assert_eq!(store.snapshot().error, Some(missing));
    Ok(())
}

#[tokio::test]
async fn available_search_is_debounced() -> Result<()> {
    let ctx = TestContext::new().await?;
    let orgs = CollectionStore::<Organisations>::new(ctx.shared());
    orgs.create(NewOrganisation::named("Acme North")).await?;
    orgs.create(NewOrganisation::named("Acme South")).await?;
    let jane = contacts::create(
        ctx.db(),
        NewContact {
            first_name: "Jane".into(),
            ..NewContact::default()
        },
    )
    .await?;

    let store = RelationshipStore::with_debouncer(
        ctx.shared(),
        SearchDebouncer::new(Duration::from_millis(50)),
    );
    let (stale, latest) = tokio::join!(store.search_available(jane.id, "ac"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.search_available(jane.id, "acme s").await
    });
    assert!(stale.is_none());
    let hits = latest.expect("latest search runs")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].organisation_name, "Acme South");

    let state = store.snapshot();
    assert_eq!(state.available, hits);
    assert!(!state.searching);
    Ok(())
}
