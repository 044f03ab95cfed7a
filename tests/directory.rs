use anyhow::Result;
use hub::contacts::{self, ContactPatch, NewContact};
use hub::organisations::{self, Address, NewOrganisation, OrganisationPatch};
use hub::{Filter, FilterOp, HubError, ListQuery, SortDirection};
use hub_tests::TestContext;

fn jane() -> NewContact {
    NewContact {
        first_name: "Jane".into(),
        last_name: Some("Doe".into()),
        email: Some("jane@acme.com".into()),
        phone: Some("02 9999 0000".into()),
        ..NewContact::default()
    }
}

#[tokio::test]
async fn organisation_create_trims_and_defaults() -> Result<()> {
    let ctx = TestContext::new().await?;
    let created = organisations::create(
        ctx.db(),
        NewOrganisation {
            organisation_name: "  Acme Pty Ltd ".into(),
            industry: Some("   ".into()),
            billing_address: Address {
                suburb: Some("Newtown".into()),
                state: Some("NSW".into()),
                ..Address::default()
            },
            ..NewOrganisation::default()
        },
    )
    .await?;
    assert_eq!(created.organisation_name, "Acme Pty Ltd");
    assert_eq!(created.status, organisations::DEFAULT_STATUS);
    assert_eq!(created.industry, None);
    assert_eq!(Address::billing(&created).state.as_deref(), Some("NSW"));
    assert_eq!(Address::shipping(&created), Address::default());
    Ok(())
}

#[tokio::test]
async fn organisation_validation_reports_every_field() -> Result<()> {
    let ctx = TestContext::new().await?;
    let err = organisations::create(
        ctx.db(),
        NewOrganisation {
            organisation_name: " ".into(),
            email: Some("not-an-email".into()),
            ..NewOrganisation::default()
        },
    )
    .await
    .unwrap_err();
    let HubError::Validation(message) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(message.contains("organisationName"), "{message}");
    assert!(message.contains("email"), "{message}");
    Ok(())
}

#[tokio::test]
async fn organisation_patch_keeps_omitted_fields_and_clears_blank_ones() -> Result<()> {
    let ctx = TestContext::new().await?;
    let created = organisations::create(
        ctx.db(),
        NewOrganisation {
            industry: Some("Retail".into()),
            phone: Some("02 9999 0000".into()),
            ..NewOrganisation::named("Acme")
        },
    )
    .await?;
    let updated = organisations::update(
        ctx.db(),
        created.id,
        OrganisationPatch {
            phone: Some(String::new()),
            ..OrganisationPatch::default()
        },
    )
    .await?;
    assert_eq!(updated.industry.as_deref(), Some("Retail"));
    assert_eq!(updated.phone, None);
    Ok(())
}

#[tokio::test]
async fn organisation_list_filters_sorts_and_limits() -> Result<()> {
    let ctx = TestContext::new().await?;
    for (name, status) in [("Gamma", "active"), ("Alpha", "active"), ("Beta", "archived")] {
        organisations::create(
            ctx.db(),
            NewOrganisation {
                status: Some(status.into()),
                ..NewOrganisation::named(name)
            },
        )
        .await?;
    }

    let active = organisations::list(
        ctx.db(),
        &ListQuery::new()
            .filter(Filter::eq("status", "active"))
            .sort("organisationName", SortDirection::Desc),
    )
    .await?;
    let names: Vec<_> = active.iter().map(|o| o.organisation_name.as_str()).collect();
    assert_eq!(names, ["Gamma", "Alpha"]);

    let first = organisations::list(ctx.db(), &ListQuery::new().limit(1)).await?;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].organisation_name, "Alpha");

    let unknown = organisations::list(
        ctx.db(),
        &ListQuery::new().filter(Filter::new("secret", FilterOp::Eq, "x")),
    )
    .await;
    assert!(matches!(unknown, Err(HubError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn organisation_search_ignores_case_and_blank_terms() -> Result<()> {
    let ctx = TestContext::new().await?;
    organisations::create(ctx.db(), NewOrganisation::named("Acme Pty Ltd")).await?;
    organisations::create(ctx.db(), NewOrganisation::named("Bolt Electrical")).await?;

    let hits = organisations::search_by_name(ctx.db(), "ACME").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].organisation_name, "Acme Pty Ltd");
    assert!(organisations::search_by_name(ctx.db(), "   ").await?.is_empty());
    assert!(organisations::search_by_name(ctx.db(), "%").await?.is_empty());
    assert!(organisations::search_by_name(ctx.db(), "Zebra").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn organisation_search_matches_wildcard_characters_literally() -> Result<()> {
    let ctx = TestContext::new().await?;
    organisations::create(ctx.db(), NewOrganisation::named("100% Solar")).await?;
    organisations::create(ctx.db(), NewOrganisation::named("acme_tools")).await?;
    organisations::create(ctx.db(), NewOrganisation::named("Acme Tools")).await?;

    let percent = organisations::search_by_name(ctx.db(), "100% Solar").await?;
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].organisation_name, "100% Solar");

    let underscore = organisations::search_by_name(ctx.db(), "acme_tools").await?;
    let names: Vec<_> = underscore.iter().map(|o| o.organisation_name.as_str()).collect();
    assert_eq!(names, ["acme_tools"]);

    let contains = organisations::list(
        ctx.db(),
        &ListQuery::new().filter(Filter::new("organisationName", FilterOp::Contains, "_")),
    )
    .await?;
    assert_eq!(contains.len(), 1);
    assert_eq!(contains[0].organisation_name, "acme_tools");
    Ok(())
}

#[tokio::test]
async fn missing_records_are_not_found() -> Result<()> {
    let ctx = TestContext::new().await?;
    let id = uuid::Uuid::new_v4();
    assert!(organisations::get(ctx.db(), id).await?.is_none());
    let err = organisations::update(ctx.db(), id, OrganisationPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::NotFound { .. }));
    assert!(!organisations::delete(ctx.db(), id).await?);
    Ok(())
}

#[tokio::test]
async fn contact_search_matches_name_or_email() -> Result<()> {
    let ctx = TestContext::new().await?;
    contacts::create(ctx.db(), jane()).await?;
    contacts::create(
        ctx.db(),
        NewContact {
            first_name: "Sam".into(),
            email: Some("sam@bolt.com.au".into()),
            ..NewContact::default()
        },
    )
    .await?;

    let by_last = contacts::search_by_name(ctx.db(), "doe").await?;
    assert_eq!(by_last.len(), 1);
    assert_eq!(by_last[0].display_name(), "Jane Doe");

    let by_email = contacts::search_by_name(ctx.db(), "bolt").await?;
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].first_name, "Sam");
    Ok(())
}

#[tokio::test]
async fn contact_requires_first_name_and_valid_phone() -> Result<()> {
    let ctx = TestContext::new().await?;
    let err = contacts::create(
        ctx.db(),
        NewContact {
            first_name: String::new(),
            mobile: Some("12".into()),
            ..NewContact::default()
        },
    )
    .await
    .unwrap_err();
    let HubError::Validation(message) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(message.contains("firstName"), "{message}");
    assert!(message.contains("mobile"), "{message}");

    let created = contacts::create(ctx.db(), jane()).await?;
    let err = contacts::update(
        ctx.db(),
        created.id,
        ContactPatch {
            email: Some("broken@".into()),
            ..ContactPatch::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, HubError::Validation(_)));

    let padded = contacts::update(
        ctx.db(),
        created.id,
        ContactPatch {
            email: Some("  jane.doe@acme.com ".into()),
            phone: Some(" 02 9999 1111 ".into()),
            ..ContactPatch::default()
        },
    )
    .await?;
    assert_eq!(padded.email.as_deref(), Some("jane.doe@acme.com"));
    assert_eq!(padded.phone.as_deref(), Some("02 9999 1111"));
    Ok(())
}
