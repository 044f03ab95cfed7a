use std::sync::Arc;

use entity::{organisation_contacts, organisations};
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use uuid::Uuid;

use crate::debounce::SearchDebouncer;
use crate::organisations::NewOrganisation;
use crate::relationships::{self, LinkDetails, NewRelationship, RelationshipPatch};
use crate::store::{StoreError, tracked};

/// State behind the "organisations of a contact" and "contacts of an
/// organisation" panels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipState {
    pub organisation_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    /// Associations of `organisation_id`.
    pub contacts: Vec<organisation_contacts::Model>,
    /// Associations of `contact_id`.
    pub organisations: Vec<organisation_contacts::Model>,
    /// Search hits the contact is not linked to yet.
    pub available: Vec<organisations::Model>,
    pub loading: bool,
    pub searching: bool,
    pub error: Option<StoreError>,
}

fn begin(state: &mut RelationshipState) {
    state.loading = true;
    state.error = None;
}

fn fail(state: &mut RelationshipState, error: StoreError) {
    state.error = Some(error);
    state.loading = false;
    state.searching = false;
}

pub struct RelationshipStore {
    db: Arc<DatabaseConnection>,
    state: watch::Sender<RelationshipState>,
    debouncer: SearchDebouncer,
}

impl RelationshipStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::with_debouncer(db, SearchDebouncer::default())
    }

    pub fn with_debouncer(db: Arc<DatabaseConnection>, debouncer: SearchDebouncer) -> Self {
        let (state, _) = watch::channel(RelationshipState::default());
        Self {
            db,
            state,
            debouncer,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RelationshipState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RelationshipState {
        self.state.borrow().clone()
    }

    pub async fn load_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> Result<Vec<organisation_contacts::Model>, StoreError> {
        tracked(
            &self.state,
            "relationships fetch contacts",
            relationships::fetch_contacts_by_organisation(self.db.as_ref(), organisation_id),
            begin,
            |state, rows: &Vec<organisation_contacts::Model>| {
                state.organisation_id = Some(organisation_id);
                state.contacts = rows.clone();
                state.loading = false;
            },
            fail,
        )
        .await
    }

    pub async fn load_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<organisation_contacts::Model>, StoreError> {
        tracked(
            &self.state,
            "relationships fetch organisations",
            relationships::fetch_organisations_by_contact(self.db.as_ref(), contact_id),
            begin,
            |state, rows: &Vec<organisation_contacts::Model>| {
                if state.contact_id != Some(contact_id) {
                    state.available.clear();
                }
                state.contact_id = Some(contact_id);
                state.organisations = rows.clone();
                state.loading = false;
            },
            fail,
        )
        .await
    }

    /// Re-reads whichever panels are open. A write can reorder or demote
    /// sibling rows, so the lists are never patched locally.
    async fn reload(&self) -> Result<(), StoreError> {
        let (organisation_id, contact_id) = {
            let state = self.state.borrow();
            (state.organisation_id, state.contact_id)
        };
        if let Some(id) = organisation_id {
            self.load_for_organisation(id).await?;
        }
        if let Some(id) = contact_id {
            self.load_for_contact(id).await?;
        }
        Ok(())
    }

    pub async fn add(
        &self,
        input: NewRelationship,
    ) -> Result<organisation_contacts::Model, StoreError> {
        let created = tracked(
            &self.state,
            "relationships add",
            relationships::add_contact_to_organisation(&self.db, input),
            begin,
            |state, link: &organisation_contacts::Model| {
                state.available.retain(|org| org.id != link.organisation_id);
                state.loading = false;
            },
            fail,
        )
        .await?;
        self.reload().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: RelationshipPatch,
    ) -> Result<organisation_contacts::Model, StoreError> {
        let updated = tracked(
            &self.state,
            "relationships update",
            relationships::update_relationship(&self.db, id, patch),
            begin,
            |state, _: &organisation_contacts::Model| state.loading = false,
            fail,
        )
        .await?;
        self.reload().await?;
        Ok(updated)
    }

    pub async fn remove(&self, relationship_id: Uuid) -> Result<bool, StoreError> {
        let removed = tracked(
            &self.state,
            "relationships remove",
            relationships::remove_contact_from_organisation(self.db.as_ref(), relationship_id),
            begin,
            |state, _: &bool| {
                state.contacts.retain(|row| row.id != relationship_id);
                state.organisations.retain(|row| row.id != relationship_id);
                state.loading = false;
            },
            fail,
        )
        .await?;
        Ok(removed)
    }

    pub async fn create_organisation(
        &self,
        contact_id: Uuid,
        organisation: NewOrganisation,
        link: LinkDetails,
    ) -> Result<(organisations::Model, organisation_contacts::Model), StoreError> {
        let created = tracked(
            &self.state,
            "relationships create organisation",
            relationships::create_organisation_for_contact(&self.db, contact_id, organisation, link),
            begin,
            |state, _: &(organisations::Model, organisation_contacts::Model)| {
                state.loading = false;
            },
            fail,
        )
        .await?;
        self.reload().await?;
        Ok(created)
    }

    /// Debounced search for organisations the contact can be linked to.
    /// Returns `None` when a newer keystroke superseded this one.
    pub async fn search_available(
        &self,
        contact_id: Uuid,
        term: &str,
    ) -> Option<Result<Vec<organisations::Model>, StoreError>> {
        let term = term.to_string();
        self.debouncer
            .run(|| async move {
                tracked(
                    &self.state,
                    "relationships search",
                    relationships::search_unlinked_organisations(
                        self.db.as_ref(),
                        contact_id,
                        &term,
                    ),
                    |state| {
                        state.searching = true;
                        state.error = None;
                    },
                    |state, hits: &Vec<organisations::Model>| {
                        state.available = hits.clone();
                        state.searching = false;
                    },
                    fail,
                )
                .await
            })
            .await
    }
}
