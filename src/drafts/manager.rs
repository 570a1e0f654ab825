use super::store::{DraftStore, UpdateOutcome};
use super::types::Draft;
use crate::auth::IdentityProvider;
use crate::error::DraftError;
use crate::paper::Section;
use std::sync::Arc;

/// Ownership-scoped draft operations: validation lives here, records in the
/// store.
pub struct DraftManager {
    store: Arc<dyn DraftStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl DraftManager {
    pub fn new(store: Arc<dyn DraftStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn owner(&self) -> Result<String, DraftError> {
        self.identity
            .current()
            .map(|who| who.id)
            .ok_or(DraftError::AuthRequired)
    }

    /// Persist a new snapshot of `sections` under the signed-in identity.
    pub async fn save(&self, title: &str, sections: &[Section]) -> Result<Draft, DraftError> {
        if title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let owner = self.owner()?;
        self.store.insert(&owner, title.trim(), sections).await
    }

    /// Re-title and re-snapshot a draft the identity owns. A zero-match
    /// outcome is reported as such, never upgraded to an error or folded into
    /// success.
    pub async fn update(
        &self,
        draft_id: &str,
        title: &str,
        sections: &[Section],
    ) -> Result<UpdateOutcome, DraftError> {
        if title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let owner = self.owner()?;
        let outcome = self
            .store
            .update(draft_id, &owner, title.trim(), sections)
            .await?;
        if outcome == UpdateOutcome::NoMatch {
            tracing::warn!(draft = draft_id, "update matched no records: unknown id or different owner");
        }
        Ok(outcome)
    }

    /// Fetch a draft for wholesale installation as the new working set.
    pub async fn load(&self, draft_id: &str) -> Result<Vec<Section>, DraftError> {
        let owner = self.owner()?;
        let draft = self
            .store
            .fetch(draft_id, &owner)
            .await?
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
        Ok(draft.sections)
    }

    /// The signed-in identity's drafts, newest first.
    pub async fn list(&self) -> Result<Vec<Draft>, DraftError> {
        let owner = self.owner()?;
        self.store.list_for_owner(&owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, SessionIdentity};
    use crate::drafts::store::SqliteDraftStore;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> Arc<SqliteDraftStore> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        let store = SqliteDraftStore::attach(pool);
        store.init_schema().await.expect("schema");
        Arc::new(store)
    }

    fn signed_in(id: &str) -> Arc<SessionIdentity> {
        Arc::new(SessionIdentity::signed_in(Identity::new(
            id,
            format!("{id}@example.edu"),
        )))
    }

    fn sample_sections() -> Vec<Section> {
        vec![Section::new("Intro").with_content("- A\n- B")]
    }

    #[tokio::test]
    async fn save_requires_a_title() {
        let manager = DraftManager::new(memory_store().await, signed_in("user-1"));
        let err = manager.save("   ", &sample_sections()).await;
        assert!(matches!(err, Err(DraftError::EmptyTitle)));
    }

    #[tokio::test]
    async fn save_requires_an_identity() {
        let manager = DraftManager::new(
            memory_store().await,
            Arc::new(SessionIdentity::signed_out()),
        );
        let err = manager.save("Paper", &sample_sections()).await;
        assert!(matches!(err, Err(DraftError::AuthRequired)));
    }

    #[tokio::test]
    async fn load_then_save_persists_identical_content() {
        let store = memory_store().await;
        let manager = DraftManager::new(Arc::clone(&store) as _, signed_in("user-1"));

        let original = sample_sections();
        let saved = manager.save("Round Trip", &original).await.expect("save");

        let loaded = manager.load(&saved.id).await.expect("load");
        assert_eq!(loaded, original);

        // Saving what was just loaded persists content identical by value.
        let resaved = manager.save("Round Trip", &loaded).await.expect("resave");
        let reloaded = manager.load(&resaved.id).await.expect("reload");
        assert_eq!(reloaded, original);
    }

    #[tokio::test]
    async fn update_under_a_different_identity_is_a_distinct_no_op() {
        let store = memory_store().await;
        let owner_manager = DraftManager::new(Arc::clone(&store) as _, signed_in("user-1"));
        let saved = owner_manager
            .save("Mine", &sample_sections())
            .await
            .expect("save");

        let intruder_manager = DraftManager::new(Arc::clone(&store) as _, signed_in("user-2"));
        let outcome = intruder_manager
            .update(&saved.id, "Stolen", &[])
            .await
            .expect("call succeeds");
        assert_eq!(outcome, UpdateOutcome::NoMatch);

        // The record is untouched for its real owner.
        let kept = owner_manager.load(&saved.id).await.expect("load");
        assert_eq!(kept, saved.sections);
        let listed = owner_manager.list().await.expect("list");
        assert_eq!(listed[0].title, "Mine");
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_identity() {
        let store = memory_store().await;
        let mine = DraftManager::new(Arc::clone(&store) as _, signed_in("user-1"));
        let theirs = DraftManager::new(Arc::clone(&store) as _, signed_in("user-2"));

        mine.save("A", &[]).await.expect("save");
        theirs.save("B", &[]).await.expect("save");

        let listed = mine.list().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "A");
    }

    #[tokio::test]
    async fn load_of_unknown_id_is_not_found() {
        let manager = DraftManager::new(memory_store().await, signed_in("user-1"));
        let err = manager.load("missing").await;
        assert!(matches!(err, Err(DraftError::NotFound(_))));
    }
}
