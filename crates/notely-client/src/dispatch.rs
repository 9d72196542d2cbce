//! Send a prompt note to its provider and record the reply.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use notely_core::{
    CredentialResolver, Error, HistoryEntry, Note, NoteId, NoteStore, Provider, Result,
};
use notely_inference::{ProviderClient, ProviderRegistry};

/// A reply that was both received and recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub provider: Provider,
    pub reply: String,
    /// The note's history after the reply was appended.
    pub history: Vec<HistoryEntry>,
}

/// Routes prompt notes to providers.
#[derive(Clone)]
pub struct AiDispatcher {
    store: Arc<dyn NoteStore>,
    registry: ProviderRegistry,
    provider_client: ProviderClient,
    credentials: Arc<dyn CredentialResolver>,
}

impl AiDispatcher {
    pub fn new(
        store: Arc<dyn NoteStore>,
        registry: ProviderRegistry,
        provider_client: ProviderClient,
        credentials: Arc<dyn CredentialResolver>,
    ) -> Self {
        Self {
            store,
            registry,
            provider_client,
            credentials,
        }
    }

    /// Send `note.content` to the note's prompt target.
    ///
    /// The provider is not called when the target has no endpoint or no
    /// credential. A reply that cannot be appended comes back as
    /// [`Error::SentNotRecorded`].
    pub async fn dispatch_to_provider(&self, note: &Note) -> Result<DispatchOutcome> {
        let start = Instant::now();
        let endpoint = self.registry.resolve(note.prompt_target.as_ref())?;
        let provider = note
            .prompt_target
            .clone()
            .ok_or_else(|| Error::UnknownProvider("(none)".to_string()))?;

        let api_key = self
            .credentials
            .resolve_credential(&provider)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                warn!(
                    subsystem = "client",
                    component = "dispatch",
                    note_id = note.id,
                    provider = %provider,
                    "No API key configured"
                );
                Error::MissingCredential(provider.to_string())
            })?;

        let reply = self
            .provider_client
            .send(endpoint, &api_key, &note.content)
            .await?;

        let history = match self.store.append_ai_response(note.id, &reply).await {
            Ok(history) => history,
            Err(source) => {
                error!(
                    subsystem = "client",
                    component = "dispatch",
                    note_id = note.id,
                    provider = %provider,
                    error = %source,
                    "Provider replied but the reply was not recorded"
                );
                return Err(Error::SentNotRecorded {
                    provider: provider.to_string(),
                    reply,
                    source: Box::new(source),
                });
            }
        };

        info!(
            subsystem = "client",
            component = "dispatch",
            op = "dispatch",
            note_id = note.id,
            provider = %provider,
            response_len = reply.len(),
            history_len = history.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Reply recorded"
        );
        Ok(DispatchOutcome {
            provider,
            reply,
            history,
        })
    }

    /// Look the note up in the current list, then dispatch it.
    pub async fn dispatch_note_id(&self, id: NoteId) -> Result<DispatchOutcome> {
        let notes = self.store.list_notes().await?;
        let note = notes
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
        self.dispatch_to_provider(&note).await
    }
}
