use anyhow::Result;
use chrono::Utc;
use entity::field_values::{self as field_entity, FieldType};
use hub::field_values::{self, FieldValuePatch, NewFieldValue};
use hub::{FieldValuesStore, HubError};
use hub_tests::TestContext;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};

#[tokio::test]
async fn seeding_is_idempotent_and_keeps_edits() -> Result<()> {
    let ctx = TestContext::new().await?;
    let inserted = field_values::seed_defaults(ctx.db()).await?;
    let expected: usize = field_values::ALL_FIELD_TYPES
        .iter()
        .map(|field_type| field_values::default_options(*field_type).len())
        .sum();
    assert_eq!(inserted as usize, expected);

    let statuses = field_values::list(ctx.db(), FieldType::OrganisationStatuses).await?;
    let active = statuses.iter().find(|o| o.value == "active").expect("active option");
    assert!(active.is_default);
    field_values::update(
        ctx.db(),
        active.id,
        FieldValuePatch {
            label: Some("Current".into()),
            ..FieldValuePatch::default()
        },
    )
    .await?;

    assert_eq!(field_values::seed_defaults(ctx.db()).await?, 0);
    let relabelled = field_values::get(ctx.db(), active.id).await?.expect("option");
    assert_eq!(relabelled.label, "Current");
    assert_eq!(relabelled.value, "active");
    Ok(())
}

#[tokio::test]
async fn values_are_slugs_unique_per_type() -> Result<()> {
    let ctx = TestContext::new().await?;
    let created =
        field_values::create(ctx.db(), NewFieldValue::new(FieldType::LeadSources, "Trade Show")).await?;
    assert_eq!(created.value, "trade_show");
    assert_eq!(created.sort_order, 0);

    let clash =
        field_values::create(ctx.db(), NewFieldValue::new(FieldType::LeadSources, "trade show")).await;
    assert!(matches!(clash, Err(HubError::Conflict(_))));

    let other_type =
        field_values::create(ctx.db(), NewFieldValue::new(FieldType::WebsiteTypes, "Trade Show")).await?;
    assert_eq!(other_type.value, "trade_show");

    let symbols = field_values::create(ctx.db(), NewFieldValue::new(FieldType::LeadSources, "!!")).await;
    assert!(matches!(symbols, Err(HubError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn only_one_default_per_type() -> Result<()> {
    let ctx = TestContext::new().await?;
    let first = field_values::create(
        ctx.db(),
        NewFieldValue {
            is_default: true,
            ..NewFieldValue::new(FieldType::ContactStatuses, "Active")
        },
    )
    .await?;
    let second = field_values::create(
        ctx.db(),
        NewFieldValue {
            is_default: true,
            ..NewFieldValue::new(FieldType::ContactStatuses, "Dormant")
        },
    )
    .await?;
    let defaults = |rows: Vec<entity::field_values::Model>| {
        rows.into_iter()
            .filter(|o| o.is_default)
            .map(|o| o.id)
            .collect::<Vec<_>>()
    };
    let rows = field_values::list(ctx.db(), FieldType::ContactStatuses).await?;
    assert_eq!(defaults(rows), vec![second.id]);

    field_values::set_default(ctx.db(), first.id).await?;
    let rows = field_values::list(ctx.db(), FieldType::ContactStatuses).await?;
    assert_eq!(defaults(rows), vec![first.id]);
    Ok(())
}

#[tokio::test]
async fn store_caches_and_resolves_options() -> Result<()> {
    let ctx = TestContext::new().await?;
    field_values::seed_defaults(ctx.db()).await?;
    let store = FieldValuesStore::new(ctx.shared());

    let default = store.default_option(FieldType::LeadStatuses).await?;
    assert_eq!(default.map(|o| o.value), Some("new".to_string()));
    assert!(store.snapshot().options.contains_key(&FieldType::LeadStatuses));

    let existing = store.resolve_or_add(FieldType::LeadSources, "REFERRAL").await?;
    assert_eq!(existing.value, "referral");

    let added = store.resolve_or_add(FieldType::LeadSources, "Podcast").await?;
    assert_eq!(added.value, "podcast");
    let cached = store.options(FieldType::LeadSources).await?;
    assert!(cached.iter().any(|o| o.id == added.id));
    Ok(())
}

#[tokio::test]
async fn failed_store_write_is_rolled_back() -> Result<()> {
    let ctx = TestContext::new().await?;
    let store = FieldValuesStore::new(ctx.shared());
    store.add_option(FieldType::WebsiteTypes, "Blog").await?;

    let err = store
        .add_option(FieldType::WebsiteTypes, "blog")
        .await
        .unwrap_err();
    assert!(!err.not_found);

    let state = store.snapshot();
    assert_eq!(state.error, Some(err));
    assert!(!state.loading);
    let labels: Vec<_> = state.options[&FieldType::WebsiteTypes]
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(labels, ["Blog"]);
    Ok(())
}

#[tokio::test]
async fn store_removal_and_default_follow_the_table() -> Result<()> {
    let ctx = TestContext::new().await?;
    let store = FieldValuesStore::new(ctx.shared());
    let blog = store.add_option(FieldType::WebsiteTypes, "Blog").await?;
    let shop = store.add_option(FieldType::WebsiteTypes, "Shop").await?;

    store.set_default(FieldType::WebsiteTypes, shop.id).await?;
    let default = store.default_option(FieldType::WebsiteTypes).await?;
    assert_eq!(default.map(|o| o.id), Some(shop.id));

    assert!(store.remove_option(FieldType::WebsiteTypes, blog.id).await?);
    let remaining = store.options(FieldType::WebsiteTypes).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, shop.id);
    Ok(())
}

#[tokio::test]
async fn unique_index_violations_surface_as_conflicts() -> Result<()> {
    let ctx = TestContext::new().await?;
    let created = field_values::create(
        ctx.db(),
        NewFieldValue::new(FieldType::LeadSources, "Referral"),
    )
    .await?;

    let duplicate = field_entity::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        field_type: Set(FieldType::LeadSources),
        value: Set(created.value.clone()),
        label: Set("Referral (copy)".into()),
        is_default: Set(false),
        sort_order: Set(99),
        created_at: Set(Utc::now().into()),
    }
    .insert(ctx.db())
    .await
    .map_err(HubError::from);
    assert!(matches!(duplicate, Err(HubError::Conflict(_))), "{duplicate:?}");
    Ok(())
}
