use anyhow::Result;
use chrono::NaiveDate;
use entity::leads::ContactPerson;
use entity::quotes::{LineItem, Status};
use hub::leads::{self, LeadPatch, NewLead};
use hub::quotes::{self, NewQuote, QuotePatch};
use hub::websites::{self, NewWebsite, WebsitePatch};
use hub::{Filter, HubError, ListQuery};
use hub_tests::TestContext;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn item(description: &str, quantity: f64, unit_price_cents: i64) -> LineItem {
    LineItem {
        description: description.into(),
        quantity,
        unit_price_cents,
    }
}

fn quote(subject: &str) -> NewQuote {
    NewQuote {
        subject: subject.into(),
        issue_date: Some(date(2024, 5, 1)),
        ..NewQuote::default()
    }
}

#[tokio::test]
async fn quote_totals_follow_line_items() -> Result<()> {
    let ctx = TestContext::new().await?;
    let created = quotes::create(
        ctx.db(),
        NewQuote {
            line_items: vec![item("Design", 3.0, 12_000), item("Hosting", 12.0, 2_500)],
            ..quote("Website rebuild")
        },
    )
    .await?;
    assert_eq!(created.total_cents, 66_000);
    assert_eq!(created.status, Status::Draft);

    let updated = quotes::update(
        ctx.db(),
        created.id,
        QuotePatch {
            line_items: Some(vec![item("Design", 1.5, 12_000)]),
            ..QuotePatch::default()
        },
    )
    .await?;
    assert_eq!(updated.total_cents, 18_000);
    assert_eq!(updated.line_items.0.len(), 1);
    Ok(())
}

#[tokio::test]
async fn quote_numbers_are_sequential_and_unique() -> Result<()> {
    let ctx = TestContext::new().await?;
    let first = quotes::create(ctx.db(), quote("One")).await?;
    let manual = quotes::create(
        ctx.db(),
        NewQuote {
            quote_number: Some("Q-00041".into()),
            ..quote("Imported")
        },
    )
    .await?;
    let next = quotes::create(ctx.db(), quote("Two")).await?;
    assert_eq!(first.quote_number, "Q-00001");
    assert_eq!(manual.quote_number, "Q-00041");
    assert_eq!(next.quote_number, "Q-00042");

    let taken = quotes::create(
        ctx.db(),
        NewQuote {
            quote_number: Some("Q-00041".into()),
            ..quote("Clash")
        },
    )
    .await;
    assert!(matches!(taken, Err(HubError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn quote_numbering_survives_large_hand_entered_numbers() -> Result<()> {
    let ctx = TestContext::new().await?;
    let number = |value: &str| NewQuote {
        quote_number: Some(value.into()),
        ..quote("Imported")
    };
    quotes::create(ctx.db(), number("Q-4294967295")).await?;
    let next = quotes::create(ctx.db(), quote("Auto")).await?;
    assert_eq!(next.quote_number, "Q-4294967296");

    quotes::create(ctx.db(), number(&format!("Q-{}", u64::MAX))).await?;
    let exhausted = quotes::create(ctx.db(), quote("Auto")).await;
    assert!(matches!(exhausted, Err(HubError::Conflict(_))), "{exhausted:?}");
    Ok(())
}

#[tokio::test]
async fn quote_total_that_overflows_is_rejected() -> Result<()> {
    let ctx = TestContext::new().await?;
    let huge = || item("Licence", 1.0, i64::MAX / 2);
    let err = quotes::create(
        ctx.db(),
        NewQuote {
            line_items: vec![huge(), huge(), huge()],
            ..quote("Enterprise")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, HubError::Validation(_)), "{err:?}");

    let created = quotes::create(ctx.db(), quote("Small")).await?;
    let err = quotes::update(
        ctx.db(),
        created.id,
        QuotePatch {
            line_items: Some(vec![huge(), huge(), huge()]),
            ..QuotePatch::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, HubError::Validation(_)), "{err:?}");
    let stored = quotes::get(ctx.db(), created.id).await?.expect("quote");
    assert_eq!(stored.total_cents, 0);
    Ok(())
}

#[tokio::test]
async fn quote_rejects_expiry_before_issue() -> Result<()> {
    let ctx = TestContext::new().await?;
    let err = quotes::create(
        ctx.db(),
        NewQuote {
            expiry_date: Some(date(2024, 4, 1)),
            ..quote("Backdated")
        },
    )
    .await
    .unwrap_err();
    let HubError::Validation(message) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(message.contains("expiryDate"), "{message}");
    Ok(())
}

#[tokio::test]
async fn overdue_sent_quotes_expire() -> Result<()> {
    let ctx = TestContext::new().await?;
    let overdue = quotes::create(
        ctx.db(),
        NewQuote {
            status: Some(Status::Sent),
            expiry_date: Some(date(2024, 5, 31)),
            ..quote("Overdue")
        },
    )
    .await?;
    let current = quotes::create(
        ctx.db(),
        NewQuote {
            status: Some(Status::Sent),
            expiry_date: Some(date(2024, 7, 1)),
            ..quote("Current")
        },
    )
    .await?;
    let draft = quotes::create(
        ctx.db(),
        NewQuote {
            expiry_date: Some(date(2024, 5, 2)),
            ..quote("Draft")
        },
    )
    .await?;

    let expired = quotes::expire_overdue(ctx.db(), date(2024, 6, 15)).await?;
    assert_eq!(expired, 1);
    for (id, expected) in [
        (overdue.id, Status::Expired),
        (current.id, Status::Sent),
        (draft.id, Status::Draft),
    ] {
        let stored = quotes::get(ctx.db(), id).await?.expect("quote");
        assert_eq!(stored.status, expected, "{}", stored.subject);
    }
    Ok(())
}

#[tokio::test]
async fn lead_defaults_and_organisation_clearing() -> Result<()> {
    let ctx = TestContext::new().await?;
    let org = hub::organisations::create(
        ctx.db(),
        hub::organisations::NewOrganisation::named("Acme"),
    )
    .await?;
    let lead = leads::create(
        ctx.db(),
        NewLead {
            contact_person: ContactPerson {
                first_name: " Jane ".into(),
                email: Some("jane@acme.com".into()),
                ..ContactPerson::default()
            },
            company_name: Some("Acme".into()),
            organisation_id: Some(org.id),
            ..NewLead::default()
        },
    )
    .await?;
    assert_eq!(lead.status, leads::DEFAULT_STATUS);
    assert_eq!(lead.contact_person.first_name, "Jane");

    let updated = leads::update(
        ctx.db(),
        lead.id,
        LeadPatch {
            status: Some("qualified".into()),
            clear_organisation: true,
            ..LeadPatch::default()
        },
    )
    .await?;
    assert_eq!(updated.status, "qualified");
    assert_eq!(updated.organisation_id, None);
    assert_eq!(updated.company_name.as_deref(), Some("Acme"));

    let qualified = leads::list(
        ctx.db(),
        &ListQuery::new().filter(Filter::eq("status", "qualified")),
    )
    .await?;
    assert_eq!(qualified.len(), 1);
    Ok(())
}

#[tokio::test]
async fn lead_needs_a_contact_first_name() -> Result<()> {
    let ctx = TestContext::new().await?;
    let err = leads::create(ctx.db(), NewLead::default()).await.unwrap_err();
    let HubError::Validation(message) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(message.contains("contactPerson.firstName"), "{message}");
    Ok(())
}

#[tokio::test]
async fn website_crud_and_search() -> Result<()> {
    let ctx = TestContext::new().await?;
    let site = websites::create(
        ctx.db(),
        NewWebsite {
            name: "Acme Store".into(),
            url: "https://shop.acme.com.au".into(),
            launch_date: Some(date(2023, 11, 1)),
            ..NewWebsite::default()
        },
    )
    .await?;
    websites::create(
        ctx.db(),
        NewWebsite {
            name: "Bolt".into(),
            url: "bolt.net.au".into(),
            ..NewWebsite::default()
        },
    )
    .await?;

    let by_url = websites::search_by_name(ctx.db(), "shop.acme").await?;
    assert_eq!(by_url.len(), 1);
    assert_eq!(by_url[0].id, site.id);

    let bad = websites::update(
        ctx.db(),
        site.id,
        WebsitePatch {
            url: Some("not a url".into()),
            ..WebsitePatch::default()
        },
    )
    .await;
    assert!(matches!(bad, Err(HubError::Validation(_))));

    assert!(websites::delete(ctx.db(), site.id).await?);
    assert!(websites::get(ctx.db(), site.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn quote_and_website_references_can_be_cleared() -> Result<()> {
    let ctx = TestContext::new().await?;
    let org = hub::organisations::create(
        ctx.db(),
        hub::organisations::NewOrganisation::named("Acme"),
    )
    .await?;
    let created = quotes::create(
        ctx.db(),
        NewQuote {
            expiry_date: Some(date(2024, 6, 1)),
            organisation_id: Some(org.id),
            ..quote("Retainer")
        },
    )
    .await?;
    let cleared = quotes::update(
        ctx.db(),
        created.id,
        QuotePatch {
            expiry_date: Some(date(2024, 7, 1)),
            clear_expiry_date: true,
            clear_organisation: true,
            ..QuotePatch::default()
        },
    )
    .await?;
    assert_eq!(cleared.expiry_date, None);
    assert_eq!(cleared.organisation_id, None);

    let site = websites::create(
        ctx.db(),
        NewWebsite {
            name: "Acme".into(),
            url: "acme.com.au".into(),
            organisation_id: Some(org.id),
            launch_date: Some(date(2023, 11, 1)),
            ..NewWebsite::default()
        },
    )
    .await?;
    let kept = websites::update(ctx.db(), site.id, WebsitePatch::default()).await?;
    assert_eq!(kept.organisation_id, Some(org.id));
    assert_eq!(kept.launch_date, Some(date(2023, 11, 1)));

    let detached = websites::update(
        ctx.db(),
        site.id,
        WebsitePatch {
            clear_organisation: true,
            clear_launch_date: true,
            ..WebsitePatch::default()
        },
    )
    .await?;
    assert_eq!(detached.organisation_id, None);
    assert_eq!(detached.launch_date, None);
    Ok(())
}
